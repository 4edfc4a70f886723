use std::time::Duration;

use rand::Rng;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use super::{OptionsError, Partition};
use crate::address::{EmailAddress, normalize_domain, parse_address};
use crate::smtp::ProbeOptions;

/// Local part probed by the default-mailbox check unless overridden.
pub const DEFAULT_MAILBOX: &str = "info";

/// Closed interval the pause between two probes is drawn from.
#[cfg_attr(feature = "with-serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(20),
            max: Duration::from_secs(30),
        }
    }
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Result<Self, OptionsError> {
        if min > max {
            return Err(OptionsError::InvalidDelay {
                min: format!("{}", min.as_secs_f64()),
                max: format!("{}", max.as_secs_f64()),
                reason: "minimum exceeds maximum",
            });
        }
        Ok(Self { min, max })
    }

    /// Build a range from seconds, as typed by an operator.
    pub fn from_secs_f64(min: f64, max: f64) -> Result<Self, OptionsError> {
        let invalid = |reason: &'static str| OptionsError::InvalidDelay {
            min: min.to_string(),
            max: max.to_string(),
            reason,
        };
        if !min.is_finite() || !max.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if min < 0.0 || max < 0.0 {
            return Err(invalid("bounds must not be negative"));
        }
        let min_duration =
            Duration::try_from_secs_f64(min).map_err(|_| invalid("bounds out of range"))?;
        let max_duration =
            Duration::try_from_secs_f64(max).map_err(|_| invalid("bounds out of range"))?;
        Self::new(min_duration, max_duration)
    }

    /// No pause at all.
    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample(&self) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        let secs = rand::thread_rng().gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs).clamp(self.min, self.max)
    }
}

/// What to do with the result of probing the domain's default mailbox.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultCheckPolicy {
    /// Do not probe the default mailbox.
    Skip,
    /// Probe it and report the outcome; candidates are probed regardless.
    #[default]
    Inform,
    /// Probe it and leave the candidates unprobed unless it was accepted.
    Gate,
}

/// Everything a validation run needs besides its input.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOptions {
    pub probe: ProbeOptions,
    pub delay: DelayRange,
    pub partition: Option<Partition>,
    pub default_check: DefaultCheckPolicy,
    /// Mailbox for the default check: a bare local part or a full address.
    pub default_address: Option<String>,
    /// 0 quiet, 1 progress, 2 SMTP transcripts attached to records.
    pub verbosity: u8,
    /// How many exchangers, in preference order, a probe may fall back to.
    pub max_exchangers: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            probe: ProbeOptions::default(),
            delay: DelayRange::default(),
            partition: None,
            default_check: DefaultCheckPolicy::default(),
            default_address: None,
            verbosity: 0,
            max_exchangers: 3,
        }
    }
}

impl ValidationOptions {
    /// Defaults with `sender` as the `MAIL FROM` identity.
    pub fn new(sender: &str) -> Result<Self, OptionsError> {
        let sender = parse_address(sender).map_err(OptionsError::InvalidSender)?;
        Ok(Self {
            probe: ProbeOptions::new(sender.to_string()),
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        parse_address(&self.probe.sender).map_err(OptionsError::InvalidSender)?;
        let helo = self.probe.helo_domain.trim();
        if !helo.is_empty() {
            normalize_domain(helo).map_err(|source| OptionsError::InvalidHelo {
                input: helo.to_string(),
                source,
            })?;
        }
        if self.probe.connect_timeout.is_zero() {
            return Err(OptionsError::InvalidTimeout { stage: "connect" });
        }
        if self.probe.command_timeout.is_zero() {
            return Err(OptionsError::InvalidTimeout { stage: "command" });
        }
        if self.max_exchangers == 0 {
            return Err(OptionsError::NoExchangerAllowed);
        }
        if self.verbosity > 2 {
            return Err(OptionsError::InvalidVerbosity(self.verbosity));
        }
        if let Some(input) = &self.default_address {
            self.default_mailbox_for(input, "example.com")?;
        }
        Ok(())
    }

    pub(crate) fn keep_transcripts(&self) -> bool {
        self.verbosity >= 2
    }

    /// Address probed by the default-mailbox check for `domain`.
    pub fn default_mailbox(&self, domain: &str) -> Result<EmailAddress, OptionsError> {
        let input = self.default_address.as_deref().unwrap_or(DEFAULT_MAILBOX);
        self.default_mailbox_for(input, domain)
    }

    fn default_mailbox_for(&self, input: &str, domain: &str) -> Result<EmailAddress, OptionsError> {
        let input = input.trim();
        let full = if input.contains('@') {
            input.to_string()
        } else {
            format!("{input}@{domain}")
        };
        parse_address(&full).map_err(|source| OptionsError::InvalidDefaultAddress {
            input: input.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_rejects_inverted_and_negative_bounds() {
        assert!(DelayRange::from_secs_f64(2.0, 1.0).is_err());
        assert!(DelayRange::from_secs_f64(-1.0, 1.0).is_err());
        assert!(DelayRange::from_secs_f64(f64::NAN, 1.0).is_err());
        let range = DelayRange::from_secs_f64(0.5, 1.5).unwrap();
        assert_eq!(range.min(), Duration::from_millis(500));
    }

    #[test]
    fn delay_samples_stay_in_range() {
        let range = DelayRange::from_secs_f64(1.0, 2.0).unwrap();
        for _ in 0..200 {
            let pause = range.sample();
            assert!(pause >= range.min() && pause <= range.max(), "{pause:?}");
        }
        let fixed = DelayRange::from_secs_f64(3.0, 3.0).unwrap();
        assert_eq!(fixed.sample(), Duration::from_secs(3));
    }

    #[test]
    fn new_checks_sender() {
        assert!(matches!(
            ValidationOptions::new("not-an-address"),
            Err(OptionsError::InvalidSender(_))
        ));
        let options = ValidationOptions::new("Ops@Sender.Example").unwrap();
        assert_eq!(options.probe.sender, "Ops@sender.example");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn default_mailbox_accepts_local_part_or_address() {
        let mut options = ValidationOptions::new("ops@sender.example").unwrap();
        assert_eq!(
            options.default_mailbox("example.com").unwrap().to_string(),
            "info@example.com"
        );
        options.default_address = Some("contact".into());
        assert_eq!(
            options.default_mailbox("example.com").unwrap().to_string(),
            "contact@example.com"
        );
        options.default_address = Some("postmaster@other.example".into());
        assert_eq!(
            options.default_mailbox("example.com").unwrap().to_string(),
            "postmaster@other.example"
        );
        options.default_address = Some("bad address".into());
        assert!(matches!(
            options.validate(),
            Err(OptionsError::InvalidDefaultAddress { .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_exchangers_and_high_verbosity() {
        let mut options = ValidationOptions::new("ops@sender.example").unwrap();
        options.max_exchangers = 0;
        assert_eq!(options.validate(), Err(OptionsError::NoExchangerAllowed));
        options.max_exchangers = 1;
        options.verbosity = 3;
        assert_eq!(options.validate(), Err(OptionsError::InvalidVerbosity(3)));
    }

    #[test]
    fn validate_rejects_zero_timeouts() {
        let mut options = ValidationOptions::new("ops@sender.example").unwrap();
        options.probe.connect_timeout = Duration::ZERO;
        assert_eq!(
            options.validate(),
            Err(OptionsError::InvalidTimeout { stage: "connect" })
        );
        options.probe.connect_timeout = Duration::from_secs(5);
        options.probe.command_timeout = Duration::ZERO;
        assert_eq!(
            options.validate(),
            Err(OptionsError::InvalidTimeout { stage: "command" })
        );
        options.probe.command_timeout = Duration::from_millis(1);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn validate_checks_helo_as_host_name() {
        let mut options = ValidationOptions::new("ops@sender.example").unwrap();
        options.probe.helo_domain = " mx.sender.example ".into();
        assert!(options.validate().is_ok());
        for bad in ["sender.example\r\nDATA", "two words.example", "<mx.example>"] {
            options.probe.helo_domain = bad.into();
            assert!(
                matches!(options.validate(), Err(OptionsError::InvalidHelo { .. })),
                "{bad:?}"
            );
        }
    }
}
