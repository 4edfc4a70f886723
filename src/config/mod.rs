//! Optional TOML configuration (`with-config` feature).
//!
//! Values found in the file override the built-in defaults; the CLI then
//! overrides the file with whatever flags were given. Consistency of the
//! merged result is checked by [`ValidationOptions::validate`].

mod file;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

pub use file::ConfigFile;

use crate::address::parse_address;
use crate::permutation::{Density, PermutationError};
use crate::validate::{
    DEFAULT_TOTAL_PARTS, DelayRange, OptionsError, Partition, ValidationOptions,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error(transparent)]
    Density(#[from] PermutationError),
    #[error("total_parts is set without part")]
    PartMissing,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overlay the file's values on `options`.
    pub fn apply(&self, options: &mut ValidationOptions) -> Result<(), ConfigError> {
        let smtp = &self.smtp;
        if let Some(sender) = &smtp.sender {
            let sender = parse_address(sender).map_err(OptionsError::InvalidSender)?;
            options.probe.sender = sender.to_string();
        }
        if let Some(helo) = &smtp.helo_domain {
            options.probe.helo_domain = helo.trim().to_string();
        }
        if let Some(port) = smtp.port {
            options.probe.port = port;
        }
        if let Some(secs) = smtp.connect_timeout {
            options.probe.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = smtp.command_timeout {
            options.probe.command_timeout = Duration::from_secs(secs);
        }
        if let Some(policy) = smtp.starttls {
            options.probe.starttls = policy;
        }
        if let Some(ipv6) = smtp.ipv6 {
            options.probe.ipv6 = ipv6;
        }
        if let Some(max) = smtp.max_exchangers {
            options.max_exchangers = max;
        }

        let pacing = &self.pacing;
        if pacing.min_delay.is_some() || pacing.max_delay.is_some() {
            let min = pacing
                .min_delay
                .unwrap_or_else(|| options.delay.min().as_secs_f64());
            let max = pacing.max_delay.unwrap_or(min.max(options.delay.max().as_secs_f64()));
            options.delay = DelayRange::from_secs_f64(min, max)?;
        }

        if let Some(policy) = self.default_check.policy {
            options.default_check = policy;
        }
        if let Some(address) = &self.default_check.address {
            options.default_address = Some(address.trim().to_string());
        }

        if let Some(partition) = self.partition()? {
            options.partition = Some(partition);
        }
        if let Some(level) = self.run.debug {
            options.verbosity = level;
        }
        Ok(())
    }

    pub fn density(&self) -> Result<Option<Density>, ConfigError> {
        self.run
            .density
            .map(Density::try_from)
            .transpose()
            .map_err(ConfigError::from)
    }

    pub fn partition(&self) -> Result<Option<Partition>, ConfigError> {
        match (self.run.part, self.run.total_parts) {
            (Some(part), total) => Ok(Some(Partition::new(
                part,
                total.unwrap_or(DEFAULT_TOTAL_PARTS),
            )?)),
            (None, Some(_)) => Err(ConfigError::PartMissing),
            (None, None) => Ok(None),
        }
    }

    pub fn sender(&self) -> Option<&str> {
        self.smtp.sender.as_deref()
    }

    pub fn debug_level(&self) -> Option<u8> {
        self.run.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smtp::StartTlsPolicy;
    use crate::validate::DefaultCheckPolicy;

    const FULL: &str = r#"
[smtp]
sender = "ops@sender.example"
helo_domain = "mx.sender.example"
port = 2525
connect_timeout = 5
command_timeout = 7
starttls = "opportunistic"
ipv6 = true
max_exchangers = 2

[pacing]
min_delay = 1.5
max_delay = 3.0

[default_check]
policy = "gate"
address = "contact"

[run]
density = 2
part = 2
total_parts = 3
debug = 1
"#;

    #[test]
    fn full_file_overrides_defaults() {
        let config = ConfigFile::parse(FULL).expect("parse");
        let mut options = ValidationOptions::default();
        config.apply(&mut options).expect("apply");

        assert_eq!(options.probe.sender, "ops@sender.example");
        assert_eq!(options.probe.helo_name(), "mx.sender.example");
        assert_eq!(options.probe.port, 2525);
        assert_eq!(options.probe.connect_timeout, Duration::from_secs(5));
        assert_eq!(options.probe.command_timeout, Duration::from_secs(7));
        assert_eq!(options.probe.starttls, StartTlsPolicy::Opportunistic);
        assert!(options.probe.ipv6);
        assert_eq!(options.max_exchangers, 2);
        assert_eq!(options.delay.min(), Duration::from_millis(1500));
        assert_eq!(options.delay.max(), Duration::from_secs(3));
        assert_eq!(options.default_check, DefaultCheckPolicy::Gate);
        assert_eq!(options.default_address.as_deref(), Some("contact"));
        assert_eq!(options.partition, Some(Partition::new(2, 3).unwrap()));
        assert_eq!(options.verbosity, 1);
        assert!(options.validate().is_ok());
        assert_eq!(config.density().unwrap(), Some(Density::Medium));
        assert_eq!(config.debug_level(), Some(1));
    }

    #[test]
    fn empty_file_keeps_defaults() {
        let config = ConfigFile::parse("").expect("parse");
        let mut options = ValidationOptions::new("ops@sender.example").unwrap();
        let before = options.clone();
        config.apply(&mut options).expect("apply");
        assert_eq!(options, before);
        assert_eq!(config.density().unwrap(), None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ConfigFile::parse("[smtp]\nsendr = \"x@y.example\"\n").is_err());
        assert!(ConfigFile::parse("[scraping]\npages = 2\n").is_err());
    }

    #[test]
    fn part_alone_defaults_to_four_parts() {
        let config = ConfigFile::parse("[run]\npart = 3\n").expect("parse");
        assert_eq!(config.partition().unwrap(), Some(Partition::new(3, 4).unwrap()));
        let config = ConfigFile::parse("[run]\ntotal_parts = 3\n").expect("parse");
        assert!(matches!(config.partition(), Err(ConfigError::PartMissing)));
    }

    #[test]
    fn invalid_values_surface_as_errors() {
        let mut options = ValidationOptions::new("ops@sender.example").unwrap();
        let config = ConfigFile::parse("[pacing]\nmin_delay = 5.0\nmax_delay = 1.0\n").unwrap();
        assert!(matches!(
            config.apply(&mut options),
            Err(ConfigError::Options(OptionsError::InvalidDelay { .. }))
        ));
        let config = ConfigFile::parse("[run]\ndensity = 4\n").unwrap();
        assert!(matches!(config.density(), Err(ConfigError::Density(_))));
        let config = ConfigFile::parse("[smtp]\nsender = \"nope\"\n").unwrap();
        assert!(matches!(
            config.apply(&mut options),
            Err(ConfigError::Options(OptionsError::InvalidSender(_)))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ConfigFile::load(Path::new("/nonexistent/mailhunt.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
