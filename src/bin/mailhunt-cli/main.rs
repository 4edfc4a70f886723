mod args;
mod output;
mod settings;

use anyhow::{Context, Result};
use std::io::{self, BufRead};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use mailhunt_lib::{
    PermutationRequest, generate, resolve_exchangers, validate_addresses, validate_permutations,
};

use args::{Cli, Commands};
use settings::Settings;

fn init_tracing(level: u8) {
    let default = match level {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mailhunt_lib={default},mailhunt_cli={default}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;
    init_tracing(settings.debug_level(&cli));

    // codes de sortie : 0 au moins une adresse valide, 2 aucune, 1 fatal
    let found = match &cli.cmd {
        Commands::Permute(name) => {
            let density = settings.density(name.level)?;
            let candidates = generate(&name.first_name, &name.last_name, &name.domain, density)?;
            output::write_candidates(&candidates, &cli)?;
            true
        }
        Commands::Mx { domain } => {
            let exchangers = resolve_exchangers(domain)?;
            output::write_exchangers(domain, &exchangers, &cli)?;
            true
        }
        Commands::Validate { name, run } => {
            let options = settings.validation_options(&cli, run)?;
            let request = PermutationRequest::new(
                &name.first_name,
                &name.last_name,
                &name.domain,
                settings.density(name.level)?,
            );
            let report = validate_permutations(&request, &options)?;
            output::write_run(&report, &cli)?;
            report.summary.has_valid()
        }
        Commands::Verify {
            addresses,
            stdin,
            run,
        } => {
            let options = settings.validation_options(&cli, run)?;
            let mut inputs = addresses.clone();
            if *stdin {
                for line in io::stdin().lock().lines() {
                    let line = line.context("read stdin")?;
                    if !line.trim().is_empty() {
                        inputs.push(line);
                    }
                }
            }
            let report = validate_addresses(&inputs, &options)?;
            output::write_run(&report, &cli)?;
            report.summary.has_valid()
        }
    };

    if !found {
        std::process::exit(2);
    }
    Ok(())
}
