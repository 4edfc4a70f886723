use std::fmt;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStage {
    Connect,
    Greeting,
    Ehlo,
    Helo,
    StartTls,
    MailFrom,
    RcptTo,
    Rset,
    Quit,
}

impl fmt::Display for AttemptStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::Helo => "HELO",
            Self::StartTls => "STARTTLS",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Rset => "RSET",
            Self::Quit => "QUIT",
        };
        f.write_str(name)
    }
}

/// RFC 3463 enhanced status code (`class.subject.detail`).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnhancedStatus {
    pub class: u8,
    pub subject: u16,
    pub detail: u16,
}

impl EnhancedStatus {
    fn parse(token: &str) -> Option<Self> {
        let mut parts = token.split('.');
        let class = parts.next()?.parse::<u8>().ok()?;
        let subject = parts.next()?.parse::<u16>().ok()?;
        let detail = parts.next()?.parse::<u16>().ok()?;
        if parts.next().is_some() || !matches!(class, 2 | 4 | 5) {
            return None;
        }
        Some(Self {
            class,
            subject,
            detail,
        })
    }
}

impl fmt::Display for EnhancedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.class, self.subject, self.detail)
    }
}

/// A raw SMTP reply, preserving the numeric status code and message lines.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn new(code: u16, text: &str) -> Self {
        Self {
            code,
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }

    pub fn message(&self) -> String {
        self.lines.join(" ")
    }

    /// Enhanced status code leading the first line, when the server sends one.
    pub fn enhanced_status(&self) -> Option<EnhancedStatus> {
        let first = self.lines.first()?;
        let token = first.split_whitespace().next()?;
        EnhancedStatus::parse(token)
    }

    pub fn has_capability(&self, cap: &str) -> bool {
        self.lines.iter().any(|line| {
            line.split_whitespace()
                .next()
                .is_some_and(|token| token.eq_ignore_ascii_case(cap))
        })
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lines.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.message())
        }
    }
}

/// A recorded SMTP transcript event used for diagnostics.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpEvent {
    Sent {
        stage: AttemptStage,
        command: String,
    },
    Received {
        stage: AttemptStage,
        reply: SmtpReply,
    },
    Error {
        stage: AttemptStage,
        message: String,
    },
}

impl fmt::Display for SmtpEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent { command, .. } => write!(f, "C: {command}"),
            Self::Received { reply, .. } => write!(f, "S: {reply}"),
            Self::Error { stage, message } => write!(f, "!  {stage}: {message}"),
        }
    }
}

/// Why a probe could not give a definitive answer.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownCause {
    /// No socket address, refused or unreachable.
    ConnectionRefused,
    /// The server hung up after the connection was established.
    ConnectionLost,
    /// Greeting or `EHLO` answered with a non-2xx code.
    ServiceUnavailable,
    /// `MAIL FROM` refused.
    SenderRejected,
    /// 4xx on `RCPT TO` (greylisting, rate limiting, mailbox busy).
    TemporaryFailure,
    /// 5.7.x on `RCPT TO`: the client is blocked, not the mailbox.
    PolicyBlock,
    /// 5xx on `RCPT TO` outside the mailbox-unknown class.
    PermanentFailure,
    /// STARTTLS required but missing, or the handshake failed.
    TlsFailure,
    /// Malformed reply or unexpected sequence.
    ProtocolError,
    /// Reply code outside the 2xx/4xx/5xx buckets.
    Unrecognized,
}

impl fmt::Display for UnknownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ConnectionRefused => "connection refused",
            Self::ConnectionLost => "connection lost",
            Self::ServiceUnavailable => "service unavailable",
            Self::SenderRejected => "sender rejected",
            Self::TemporaryFailure => "temporary failure",
            Self::PolicyBlock => "blocked by policy",
            Self::PermanentFailure => "permanent failure",
            Self::TlsFailure => "TLS failure",
            Self::ProtocolError => "protocol error",
            Self::Unrecognized => "unrecognized reply",
        };
        f.write_str(text)
    }
}

/// Closed classification of one probe.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Accepted,
    Rejected,
    Unknown(UnknownCause),
    Timeout(AttemptStage),
}

impl ProbeOutcome {
    pub fn is_conclusive(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// Failures that say nothing about the mailbox and justify trying the
    /// next exchanger.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::Unknown(UnknownCause::ConnectionRefused | UnknownCause::ServiceUnavailable)
                | Self::Timeout(AttemptStage::Connect | AttemptStage::Greeting)
        )
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected => f.write_str("rejected"),
            Self::Unknown(cause) => write!(f, "unknown ({cause})"),
            Self::Timeout(stage) => write!(f, "timeout during {stage}"),
        }
    }
}

/// Result of a single probe against one exchanger.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub address: String,
    pub exchange: String,
    pub peer: Option<String>,
    pub outcome: ProbeOutcome,
    /// Reply that decided the outcome, when one was received.
    pub reply: Option<SmtpReply>,
    /// Error text when the outcome was not decided by a reply.
    pub detail: Option<String>,
    pub transcript: Vec<SmtpEvent>,
}

impl ProbeResult {
    pub fn new(address: impl Into<String>, exchange: impl Into<String>, outcome: ProbeOutcome) -> Self {
        Self {
            address: address.into(),
            exchange: exchange.into(),
            peer: None,
            outcome,
            reply: None,
            detail: None,
            transcript: Vec::new(),
        }
    }

    pub fn with_reply(mut self, reply: SmtpReply) -> Self {
        self.reply = Some(reply);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Raw server text if any, otherwise the failure description.
    pub fn diagnostic(&self) -> String {
        match (&self.reply, &self.detail) {
            (Some(reply), _) => reply.to_string(),
            (None, Some(detail)) => detail.clone(),
            (None, None) => self.outcome.to_string(),
        }
    }
}
