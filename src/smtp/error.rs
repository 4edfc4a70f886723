use std::io;

use thiserror::Error;

use super::types::{AttemptStage, ProbeOutcome, UnknownCause};

/// Transport-level failure inside a session. Never leaves the crate: the
/// prober folds it into a [`ProbeOutcome`].
#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("timed out: {source}")]
    Timeout {
        #[source]
        source: io::Error,
    },
    #[error("connection refused: {source}")]
    Refused {
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
    #[error("TLS handshake failed: {0}")]
    Tls(String),
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<io::Error> for SessionError {
    fn from(source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout { source },
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::AddrNotAvailable => Self::Refused { source },
            io::ErrorKind::InvalidData => Self::Protocol(source.to_string()),
            _ => Self::Io { source },
        }
    }
}

#[derive(Debug, Error)]
#[error("{stage}: {source}")]
pub(crate) struct StageError {
    pub stage: AttemptStage,
    #[source]
    pub source: SessionError,
}

impl StageError {
    pub(crate) fn new(stage: AttemptStage, source: impl Into<SessionError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    pub(crate) fn outcome(&self) -> ProbeOutcome {
        let connecting = self.stage == AttemptStage::Connect;
        match &self.source {
            SessionError::Timeout { .. } => ProbeOutcome::Timeout(self.stage),
            SessionError::Refused { .. } | SessionError::Io { .. } if connecting => {
                ProbeOutcome::Unknown(UnknownCause::ConnectionRefused)
            }
            SessionError::Refused { .. } | SessionError::Io { .. } => {
                ProbeOutcome::Unknown(UnknownCause::ConnectionLost)
            }
            SessionError::Tls(_) => ProbeOutcome::Unknown(UnknownCause::TlsFailure),
            SessionError::Protocol(_) => ProbeOutcome::Unknown(UnknownCause::ProtocolError),
        }
    }
}
