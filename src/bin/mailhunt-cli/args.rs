use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mailhunt_lib::StartTlsPolicy;

#[derive(Parser)]
#[command(name = "mailhunt-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// format: human|json|ndjson|csv
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long, global = true)]
    pub out: Option<String>,

    /// niveau de détail: 0 (warn), 1 (info), 2 (debug + transcripts SMTP)
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub debug: Option<u8>,

    /// fichier de configuration TOML (feature `with-config`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// génère les permutations sans aucun accès réseau
    Permute(NameArgs),
    /// génère puis valide les permutations via SMTP
    Validate {
        #[command(flatten)]
        name: NameArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// valide des adresses déjà connues (arguments ou stdin)
    Verify {
        /// adresses à tester
        addresses: Vec<String>,
        /// lit des adresses depuis stdin (une par ligne)
        #[arg(long)]
        stdin: bool,
        #[command(flatten)]
        run: RunArgs,
    },
    /// affiche les serveurs MX d'un domaine
    Mx {
        /// domaine à résoudre
        domain: String,
    },
}

#[derive(Args)]
pub struct NameArgs {
    /// prénom
    #[arg(long = "first-name")]
    pub first_name: String,
    /// nom de famille
    #[arg(long = "last-name")]
    pub last_name: String,
    /// domaine cible
    #[arg(long)]
    pub domain: String,
    /// densité des permutations: 1 (light), 2 (medium), 3 (heavy)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub level: Option<u8>,
}

#[derive(Args)]
pub struct RunArgs {
    /// adresse utilisée dans MAIL FROM
    #[arg(long = "sender-email")]
    pub sender_email: Option<String>,
    /// nom annoncé dans EHLO/HELO (par défaut le domaine de l'expéditeur)
    #[arg(long)]
    pub helo: Option<String>,
    /// délai aléatoire entre deux sondes, en secondes (min max)
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    pub delay: Option<Vec<f64>>,
    /// partie à valider (1-based)
    #[arg(long)]
    pub part: Option<usize>,
    /// nombre total de parties (4 par défaut avec --part)
    #[arg(long = "total-parts", requires = "part")]
    pub total_parts: Option<usize>,
    /// ne teste pas l'adresse par défaut (info@domaine)
    #[arg(long = "no-check", conflicts_with = "gate")]
    pub no_check: bool,
    /// adresse (ou partie locale) testée à la place de info@domaine
    #[arg(long = "check-email")]
    pub check_email: Option<String>,
    /// ne sonde pas les candidats si l'adresse par défaut est refusée
    #[arg(long)]
    pub gate: bool,
    /// port SMTP
    #[arg(long)]
    pub port: Option<u16>,
    /// timeout de connexion (s)
    #[arg(long = "connect-timeout")]
    pub connect_timeout: Option<u64>,
    /// timeout par commande SMTP (s)
    #[arg(long = "timeout")]
    pub command_timeout: Option<u64>,
    /// politique STARTTLS
    #[arg(long, value_enum)]
    pub starttls: Option<StartTlsArg>,
    /// autorise IPv6
    #[arg(long)]
    pub ipv6: bool,
    /// nombre maximum d'MX interrogés
    #[arg(long = "max-mx")]
    pub max_mx: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StartTlsArg {
    Never,
    Opportunistic,
    Required,
}

impl From<StartTlsArg> for StartTlsPolicy {
    fn from(arg: StartTlsArg) -> Self {
        match arg {
            StartTlsArg::Never => Self::Never,
            StartTlsArg::Opportunistic => Self::Opportunistic,
            StartTlsArg::Required => Self::Required,
        }
    }
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn validate_accepts_full_flag_set() {
        let cli = Cli::try_parse_from([
            "mailhunt-cli",
            "--debug",
            "2",
            "validate",
            "--first-name",
            "John",
            "--last-name",
            "Doe",
            "--domain",
            "example.com",
            "--sender-email",
            "ops@sender.example",
            "--level",
            "3",
            "--part",
            "2",
            "--delay",
            "1",
            "2.5",
        ])
        .expect("parse");
        assert_eq!(cli.debug, Some(2));
        let Commands::Validate { name, run } = cli.cmd else {
            panic!("expected validate");
        };
        assert_eq!(name.level, Some(3));
        assert_eq!(run.part, Some(2));
        assert_eq!(run.delay, Some(vec![1.0, 2.5]));
    }

    #[test]
    fn out_of_range_levels_are_refused() {
        assert!(
            Cli::try_parse_from([
                "mailhunt-cli", "permute", "--first-name", "a", "--last-name", "b", "--domain",
                "example.com", "--level", "4",
            ])
            .is_err()
        );
        assert!(Cli::try_parse_from(["mailhunt-cli", "--debug", "3", "mx", "example.com"]).is_err());
    }
}
