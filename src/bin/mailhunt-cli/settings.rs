#[cfg(feature = "with-config")]
use anyhow::Context;
use anyhow::{Result, bail};
use std::time::Duration;

#[cfg(feature = "with-config")]
use mailhunt_lib::ConfigFile;
use mailhunt_lib::{
    DEFAULT_TOTAL_PARTS, DefaultCheckPolicy, DelayRange, Density, Partition, ValidationOptions,
};

use crate::args::{Cli, RunArgs};

/// Defaults, then the configuration file, then command-line flags.
pub struct Settings {
    #[cfg(feature = "with-config")]
    file: Option<ConfigFile>,
}

impl Settings {
    #[cfg(feature = "with-config")]
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = cli
            .config
            .as_deref()
            .map(|path| {
                ConfigFile::load(path)
                    .with_context(|| format!("chargement de {}", path.display()))
            })
            .transpose()?;
        Ok(Self { file })
    }

    #[cfg(not(feature = "with-config"))]
    pub fn load(cli: &Cli) -> Result<Self> {
        if cli.config.is_some() {
            bail!("--config nécessite la feature 'with-config'");
        }
        Ok(Self {})
    }

    pub fn debug_level(&self, cli: &Cli) -> u8 {
        #[cfg(feature = "with-config")]
        let from_file = self.file.as_ref().and_then(ConfigFile::debug_level);
        #[cfg(not(feature = "with-config"))]
        let from_file = None;
        cli.debug.or(from_file).unwrap_or(0)
    }

    pub fn density(&self, level: Option<u8>) -> Result<Density> {
        if let Some(level) = level {
            return Ok(Density::try_from(level)?);
        }
        #[cfg(feature = "with-config")]
        if let Some(file) = &self.file {
            if let Some(density) = file.density()? {
                return Ok(density);
            }
        }
        Ok(Density::default())
    }

    pub fn validation_options(&self, cli: &Cli, run: &RunArgs) -> Result<ValidationOptions> {
        let mut options = ValidationOptions::default();
        #[cfg(feature = "with-config")]
        if let Some(file) = &self.file {
            file.apply(&mut options)?;
        }

        if let Some(sender) = &run.sender_email {
            options.probe.sender = sender.trim().to_string();
        }
        if options.probe.sender.is_empty() {
            bail!("--sender-email est requis (ou `sender` dans la section [smtp] du fichier de configuration)");
        }
        if let Some(helo) = &run.helo {
            options.probe.helo_domain = helo.trim().to_string();
        }
        if let Some(port) = run.port {
            options.probe.port = port;
        }
        if let Some(secs) = run.connect_timeout {
            options.probe.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = run.command_timeout {
            options.probe.command_timeout = Duration::from_secs(secs);
        }
        if let Some(policy) = run.starttls {
            options.probe.starttls = policy.into();
        }
        if run.ipv6 {
            options.probe.ipv6 = true;
        }
        if let Some(max) = run.max_mx {
            options.max_exchangers = max;
        }
        if let Some(delay) = &run.delay {
            if let [min, max] = delay.as_slice() {
                options.delay = DelayRange::from_secs_f64(*min, *max)?;
            }
        }
        if let Some(part) = run.part {
            let total = run.total_parts.unwrap_or(DEFAULT_TOTAL_PARTS);
            options.partition = Some(Partition::new(part, total)?);
        }
        if run.no_check {
            options.default_check = DefaultCheckPolicy::Skip;
        }
        if run.gate {
            options.default_check = DefaultCheckPolicy::Gate;
        }
        if let Some(address) = &run.check_email {
            options.default_address = Some(address.trim().to_string());
        }
        options.verbosity = self.debug_level(cli);

        options.validate()?;
        Ok(options)
    }
}
