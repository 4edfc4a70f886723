//! Structure of the TOML configuration file.

use serde::Deserialize;

use crate::smtp::StartTlsPolicy;
use crate::validate::DefaultCheckPolicy;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub(crate) smtp: SmtpSection,
    #[serde(default)]
    pub(crate) pacing: PacingSection,
    #[serde(default)]
    pub(crate) default_check: DefaultCheckSection,
    #[serde(default)]
    pub(crate) run: RunSection,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct SmtpSection {
    pub(crate) sender: Option<String>,
    pub(crate) helo_domain: Option<String>,
    pub(crate) port: Option<u16>,
    /// Seconds.
    pub(crate) connect_timeout: Option<u64>,
    /// Seconds.
    pub(crate) command_timeout: Option<u64>,
    pub(crate) starttls: Option<StartTlsPolicy>,
    pub(crate) ipv6: Option<bool>,
    pub(crate) max_exchangers: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct PacingSection {
    pub(crate) min_delay: Option<f64>,
    pub(crate) max_delay: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct DefaultCheckSection {
    pub(crate) policy: Option<DefaultCheckPolicy>,
    pub(crate) address: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct RunSection {
    pub(crate) density: Option<u8>,
    pub(crate) part: Option<usize>,
    pub(crate) total_parts: Option<usize>,
    pub(crate) debug: Option<u8>,
}
