use std::net::{SocketAddr, ToSocketAddrs};

use native_tls::TlsConnector;
use tracing::{debug, trace};

use super::classify::classify_rcpt;
use super::error::{SessionError, StageError};
use super::options::{ProbeOptions, StartTlsPolicy};
use super::session::SmtpSession;
use super::types::{AttemptStage, ProbeOutcome, ProbeResult, SmtpReply, UnknownCause};
use crate::address::parse_address;
use crate::mx::MailExchanger;

/// Seam between the orchestration layer and the network: one call, one
/// connection, one closed outcome.
pub(crate) trait MailboxProbe {
    fn probe(&self, exchanger: &MailExchanger, address: &str) -> ProbeResult;
}

/// Synchronous `RCPT TO` prober. Never sends `DATA`.
#[derive(Debug, Clone)]
pub struct SmtpProber {
    options: ProbeOptions,
}

impl SmtpProber {
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    /// Ask `exchanger` whether it would accept mail for `address`.
    ///
    /// Opens a dedicated connection which is always closed before returning,
    /// including on timeouts and transport errors. Arguments that could not
    /// travel as a single command line are refused before connecting.
    pub fn probe_address(&self, exchanger: &MailExchanger, address: &str) -> ProbeResult {
        let host = exchanger.exchange.as_str();
        if let Some(detail) = self.unsendable(address) {
            debug!(host, %detail, "refusing to open a session");
            return ProbeResult::new(
                address,
                host,
                ProbeOutcome::Unknown(UnknownCause::ProtocolError),
            )
            .with_detail(detail);
        }
        let addresses = match self.socket_addrs(host) {
            Ok(addresses) => addresses,
            Err(detail) => {
                debug!(host, %detail, "exchanger has no usable address");
                return ProbeResult::new(
                    address,
                    host,
                    ProbeOutcome::Unknown(UnknownCause::ConnectionRefused),
                )
                .with_detail(detail);
            }
        };

        let mut session = match SmtpSession::connect(
            host,
            &addresses,
            self.options.connect_timeout,
            self.options.command_timeout,
        ) {
            Ok(session) => session,
            Err(err) => {
                debug!(host, error = %err, "connection failed");
                return ProbeResult::new(address, host, err.outcome()).with_detail(err.to_string());
            }
        };
        let peer = session.peer();

        let mut result = match self.converse(&mut session, address) {
            Ok(verdict) => {
                let transcript = session.finish();
                verdict.into_result(address, host, transcript)
            }
            Err(err) => {
                let transcript = session.take_events();
                drop(session);
                let mut result =
                    ProbeResult::new(address, host, err.outcome()).with_detail(err.to_string());
                result.transcript = transcript;
                result
            }
        };
        result.peer = Some(peer.to_string());
        trace!(host, address, outcome = %result.outcome, "probe finished");
        result
    }

    fn unsendable(&self, address: &str) -> Option<String> {
        if !is_command_argument(address) || parse_address(address).is_err() {
            return Some(format!("recipient {address:?} is not a plain mailbox"));
        }
        let sender = self.options.sender.trim();
        if !is_command_argument(sender) {
            return Some(format!("sender {sender:?} cannot be sent in MAIL FROM"));
        }
        let helo = self.options.helo_name();
        if !is_command_argument(&helo) {
            return Some(format!("HELO name {helo:?} cannot be sent in EHLO"));
        }
        None
    }

    fn socket_addrs(&self, host: &str) -> Result<Vec<SocketAddr>, String> {
        let resolved = (host, self.options.port)
            .to_socket_addrs()
            .map_err(|err| format!("cannot resolve {host}: {err}"))?;
        let addresses: Vec<SocketAddr> = resolved
            .filter(|addr| self.options.ipv6 || addr.is_ipv4())
            .collect();
        if addresses.is_empty() {
            return Err(format!("no usable address for {host}"));
        }
        Ok(addresses)
    }

    fn converse(&self, session: &mut SmtpSession, address: &str) -> Result<Verdict, StageError> {
        let greeting = session.read_greeting()?;
        if !greeting.is_positive_completion() {
            return Ok(Verdict::from_reply(UnknownCause::ServiceUnavailable, greeting));
        }

        let helo = self.options.helo_name().into_owned();
        let ehlo_command = format!("EHLO {helo}");
        let ehlo = session.command(AttemptStage::Ehlo, &ehlo_command)?;
        let extended = ehlo.is_positive_completion();
        if !extended {
            let fallback = session.command(AttemptStage::Helo, &format!("HELO {helo}"))?;
            if !fallback.is_positive_completion() {
                return Ok(Verdict::from_reply(UnknownCause::ServiceUnavailable, fallback));
            }
        }

        if self.options.starttls != StartTlsPolicy::Never {
            let required = self.options.starttls == StartTlsPolicy::Required;
            if extended && ehlo.has_capability("STARTTLS") {
                let connector = TlsConnector::new().map_err(|err| {
                    StageError::new(AttemptStage::StartTls, SessionError::Tls(err.to_string()))
                })?;
                let reply = session.starttls(&connector)?;
                if reply.is_positive_completion() {
                    let again = session.command(AttemptStage::Ehlo, &ehlo_command)?;
                    if !again.is_positive_completion() {
                        return Ok(Verdict::from_reply(UnknownCause::ServiceUnavailable, again));
                    }
                } else if required {
                    return Ok(Verdict::from_reply(UnknownCause::TlsFailure, reply));
                }
            } else if required {
                return Ok(Verdict::detail(
                    UnknownCause::TlsFailure,
                    "STARTTLS required but not offered",
                ));
            }
        }

        let mail = session.command(AttemptStage::MailFrom, &self.options.mail_from_command())?;
        if !mail.is_positive_completion() {
            return Ok(Verdict::from_reply(UnknownCause::SenderRejected, mail));
        }

        let rcpt = session.command(AttemptStage::RcptTo, &format!("RCPT TO:<{address}>"))?;
        Ok(Verdict {
            outcome: classify_rcpt(&rcpt),
            reply: Some(rcpt),
            detail: None,
        })
    }
}

impl MailboxProbe for SmtpProber {
    fn probe(&self, exchanger: &MailExchanger, address: &str) -> ProbeResult {
        self.probe_address(exchanger, address)
    }
}

/// No line breaks, blanks or angle brackets: the value stays one argument
/// of one command line.
fn is_command_argument(value: &str) -> bool {
    !value
        .chars()
        .any(|c| c.is_control() || c.is_whitespace() || c == '<' || c == '>')
}

struct Verdict {
    outcome: ProbeOutcome,
    reply: Option<SmtpReply>,
    detail: Option<String>,
}

impl Verdict {
    fn from_reply(cause: UnknownCause, reply: SmtpReply) -> Self {
        Self {
            outcome: ProbeOutcome::Unknown(cause),
            reply: Some(reply),
            detail: None,
        }
    }

    fn detail(cause: UnknownCause, detail: &str) -> Self {
        Self {
            outcome: ProbeOutcome::Unknown(cause),
            reply: None,
            detail: Some(detail.to_string()),
        }
    }

    fn into_result(
        self,
        address: &str,
        host: &str,
        transcript: Vec<super::types::SmtpEvent>,
    ) -> ProbeResult {
        ProbeResult {
            address: address.to_string(),
            exchange: host.to_string(),
            peer: None,
            outcome: self.outcome,
            reply: self.reply,
            detail: self.detail,
            transcript,
        }
    }
}

/// Probe `address` against `exchangers` in preference order, moving on only
/// while the failure is a connection-level one.
///
/// Returns `None` when `exchangers` is empty.
pub(crate) fn probe_exchangers<P>(
    prober: &P,
    exchangers: &[MailExchanger],
    address: &str,
) -> Option<ProbeResult>
where
    P: MailboxProbe + ?Sized,
{
    let mut last = None;
    for exchanger in exchangers {
        let result = prober.probe(exchanger, address);
        if !result.outcome.is_connection_failure() {
            return Some(result);
        }
        debug!(
            exchange = %exchanger.exchange,
            address,
            outcome = %result.outcome,
            "trying next exchanger"
        );
        last = Some(result);
    }
    last
}
