use std::borrow::Cow;
use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::address::sender_domain;

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartTlsPolicy {
    /// Stay in clear text.
    #[default]
    Never,
    /// Upgrade when the server advertises STARTTLS.
    Opportunistic,
    /// Give up on servers that do not offer STARTTLS.
    Required,
}

/// Configuration knobs for [`SmtpProber`](crate::SmtpProber).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub port: u16,
    /// Envelope originator used in `MAIL FROM`.
    pub sender: String,
    /// Name announced in `EHLO`; the sender's domain when empty.
    pub helo_domain: String,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub starttls: StartTlsPolicy,
    pub ipv6: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            sender: String::new(),
            helo_domain: String::new(),
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(10),
            starttls: StartTlsPolicy::Never,
            ipv6: false,
        }
    }
}

impl ProbeOptions {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            ..Self::default()
        }
    }

    /// Returns the hostname used in the `EHLO` command.
    pub fn helo_name(&self) -> Cow<'_, str> {
        if !self.helo_domain.trim().is_empty() {
            return Cow::Borrowed(self.helo_domain.trim());
        }
        sender_domain(&self.sender)
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Borrowed("localhost"))
    }

    pub fn mail_from_command(&self) -> String {
        format!("MAIL FROM:<{}>", self.sender.trim())
    }
}
