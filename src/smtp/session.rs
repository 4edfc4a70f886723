use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use native_tls::{HandshakeError, TlsConnector, TlsStream};
use tracing::trace;

use super::error::{SessionError, StageError};
use super::types::{AttemptStage, SmtpEvent, SmtpReply};

const MAX_LINE_LEN: usize = 4096;
const MAX_REPLY_LINES: usize = 128;

#[derive(Debug)]
enum StreamState {
    Plain(TcpStream),
    Tls(TlsStream<TcpStream>),
    Invalid,
}

#[derive(Debug)]
struct SmtpStream {
    state: StreamState,
    buffer: Vec<u8>,
}

impl SmtpStream {
    fn connect(
        addr: &SocketAddr,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, SessionError> {
        let stream = TcpStream::connect_timeout(addr, connect_timeout)?;
        stream.set_read_timeout(Some(command_timeout))?;
        stream.set_write_timeout(Some(command_timeout))?;
        Ok(Self {
            state: StreamState::Plain(stream),
            buffer: Vec::new(),
        })
    }

    fn upgrade_tls(&mut self, domain: &str, connector: &TlsConnector) -> Result<(), SessionError> {
        let state = std::mem::replace(&mut self.state, StreamState::Invalid);
        let plain = match state {
            StreamState::Plain(stream) => stream,
            StreamState::Tls(stream) => {
                self.state = StreamState::Tls(stream);
                return Ok(());
            }
            StreamState::Invalid => {
                return Err(SessionError::Protocol("invalid stream state".into()));
            }
        };
        // anything buffered before the handshake belongs to the clear-text session
        self.buffer.clear();
        let tls = match connector.connect(domain, plain) {
            Ok(tls) => tls,
            Err(HandshakeError::Failure(err)) => return Err(SessionError::Tls(err.to_string())),
            Err(HandshakeError::WouldBlock(_)) => {
                return Err(SessionError::Timeout {
                    source: std::io::Error::from(std::io::ErrorKind::TimedOut),
                });
            }
        };
        self.state = StreamState::Tls(tls);
        Ok(())
    }

    fn write_line(&mut self, command: &str) -> Result<(), SessionError> {
        let mut data = command.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        match &mut self.state {
            StreamState::Plain(stream) => {
                stream.write_all(&data)?;
                stream.flush()?;
            }
            StreamState::Tls(stream) => {
                stream.write_all(&data)?;
                stream.flush()?;
            }
            StreamState::Invalid => {
                return Err(SessionError::Protocol("invalid stream state".into()));
            }
        }
        Ok(())
    }

    fn read_reply(&mut self) -> Result<SmtpReply, SessionError> {
        let mut lines = Vec::new();
        let mut code: Option<u16> = None;
        loop {
            if lines.len() >= MAX_REPLY_LINES {
                return Err(SessionError::Protocol("reply has too many lines".into()));
            }
            let line = self.read_line()?;
            if line.len() < 3 || !line.is_char_boundary(3) {
                return Err(SessionError::Protocol(format!("invalid reply: {line}")));
            }
            let parsed_code = line[..3]
                .parse::<u16>()
                .map_err(|_| SessionError::Protocol(format!("invalid code in line: {line}")))?;
            match code {
                Some(existing) if existing != parsed_code => {
                    return Err(SessionError::Protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed_code}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed_code),
            }
            let is_last = line.as_bytes().get(3) != Some(&b'-');
            let text = line.get(4..).unwrap_or_default().to_string();
            lines.push(text);
            if is_last {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.unwrap_or_default(),
            lines,
        })
    }

    fn read_line(&mut self) -> Result<String, SessionError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
                let mut line = self.buffer.drain(..=pos).collect::<Vec<_>>();
                line.pop();
                if line.ends_with(b"\r") {
                    line.pop();
                }
                // les bannières Latin-1 existent encore ; seul le code compte
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }
            if self.buffer.len() > MAX_LINE_LEN {
                return Err(SessionError::Protocol("reply line too long".into()));
            }

            let mut buf = [0u8; 512];
            let read = match &mut self.state {
                StreamState::Plain(stream) => stream.read(&mut buf)?,
                StreamState::Tls(stream) => stream.read(&mut buf)?,
                StreamState::Invalid => {
                    return Err(SessionError::Protocol("invalid stream state".into()));
                }
            };
            if read == 0 {
                return Err(SessionError::Io {
                    source: std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "connection closed",
                    ),
                });
            }
            self.buffer.extend_from_slice(&buf[..read]);
        }
    }

    fn shutdown(&mut self) {
        match &mut self.state {
            StreamState::Plain(stream) => {
                stream.shutdown(Shutdown::Both).ok();
            }
            StreamState::Tls(stream) => {
                stream.shutdown().ok();
                stream.get_ref().shutdown(Shutdown::Both).ok();
            }
            StreamState::Invalid => {}
        }
        self.state = StreamState::Invalid;
    }
}

/// One SMTP conversation over one exclusively owned connection.
///
/// The socket is shut down when the session is dropped, whatever state the
/// conversation reached; [`SmtpSession::finish`] additionally aborts an open
/// transaction with `RSET` and says `QUIT`.
pub(crate) struct SmtpSession {
    host: String,
    peer: SocketAddr,
    stream: SmtpStream,
    events: Vec<SmtpEvent>,
    transaction_open: bool,
}

impl SmtpSession {
    pub(crate) fn connect(
        host: &str,
        addresses: &[SocketAddr],
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, StageError> {
        let mut last_err = None;
        for addr in addresses {
            trace!(host, %addr, "connecting");
            match SmtpStream::connect(addr, connect_timeout, command_timeout) {
                Ok(stream) => {
                    return Ok(Self {
                        host: host.to_string(),
                        peer: *addr,
                        stream,
                        events: Vec::new(),
                        transaction_open: false,
                    });
                }
                Err(err) => last_err = Some(err),
            }
        }
        let source = last_err.unwrap_or_else(|| SessionError::Refused {
            source: std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "no socket address available",
            ),
        });
        Err(StageError::new(AttemptStage::Connect, source))
    }

    pub(crate) fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub(crate) fn read_greeting(&mut self) -> Result<SmtpReply, StageError> {
        self.receive(AttemptStage::Greeting)
    }

    pub(crate) fn command(
        &mut self,
        stage: AttemptStage,
        command: &str,
    ) -> Result<SmtpReply, StageError> {
        trace!(host = %self.host, "C: {command}");
        self.events.push(SmtpEvent::Sent {
            stage,
            command: command.to_string(),
        });
        if let Err(err) = self.stream.write_line(command) {
            return Err(self.fail(stage, err));
        }
        let reply = self.receive(stage)?;
        if stage == AttemptStage::MailFrom && reply.is_positive_completion() {
            self.transaction_open = true;
        }
        Ok(reply)
    }

    pub(crate) fn starttls(
        &mut self,
        connector: &TlsConnector,
    ) -> Result<SmtpReply, StageError> {
        let reply = self.command(AttemptStage::StartTls, "STARTTLS")?;
        if !reply.is_positive_completion() {
            return Ok(reply);
        }
        let host = self.host.clone();
        if let Err(err) = self.stream.upgrade_tls(&host, connector) {
            return Err(self.fail(AttemptStage::StartTls, err));
        }
        Ok(reply)
    }

    /// Abort any open transaction, say goodbye and hand back the transcript.
    /// Failures here are recorded but never change the probe outcome.
    pub(crate) fn finish(mut self) -> Vec<SmtpEvent> {
        if self.transaction_open {
            self.command(AttemptStage::Rset, "RSET").ok();
            self.transaction_open = false;
        }
        self.command(AttemptStage::Quit, "QUIT").ok();
        std::mem::take(&mut self.events)
    }

    /// Transcript so far, for sessions abandoned on a transport error.
    pub(crate) fn take_events(&mut self) -> Vec<SmtpEvent> {
        std::mem::take(&mut self.events)
    }

    fn receive(&mut self, stage: AttemptStage) -> Result<SmtpReply, StageError> {
        match self.stream.read_reply() {
            Ok(reply) => {
                trace!(host = %self.host, "S: {reply}");
                self.events.push(SmtpEvent::Received {
                    stage,
                    reply: reply.clone(),
                });
                Ok(reply)
            }
            Err(err) => Err(self.fail(stage, err)),
        }
    }

    fn fail(&mut self, stage: AttemptStage, err: SessionError) -> StageError {
        self.events.push(SmtpEvent::Error {
            stage,
            message: err.to_string(),
        });
        StageError::new(stage, err)
    }
}

impl Drop for SmtpSession {
    fn drop(&mut self) {
        self.stream.shutdown();
    }
}
