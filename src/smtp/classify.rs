use super::types::{ProbeOutcome, SmtpReply, UnknownCause};

/// Map the `RCPT TO` reply onto the closed outcome set.
///
/// Only numeric data is consulted: the basic reply code and, when present,
/// the RFC 3463 enhanced status. 5.7.x always means the client was blocked,
/// which says nothing about the mailbox.
pub(crate) fn classify_rcpt(reply: &SmtpReply) -> ProbeOutcome {
    match reply.code {
        200..=299 => ProbeOutcome::Accepted,
        400..=499 => ProbeOutcome::Unknown(UnknownCause::TemporaryFailure),
        500..=599 => match reply.enhanced_status() {
            Some(status) if status.class == 5 && status.subject == 7 => {
                ProbeOutcome::Unknown(UnknownCause::PolicyBlock)
            }
            Some(status) if status.class == 5 && status.subject == 1 => ProbeOutcome::Rejected,
            _ if is_mailbox_unknown(reply.code) => ProbeOutcome::Rejected,
            _ => ProbeOutcome::Unknown(UnknownCause::PermanentFailure),
        },
        _ => ProbeOutcome::Unknown(UnknownCause::Unrecognized),
    }
}

fn is_mailbox_unknown(code: u16) -> bool {
    matches!(code, 550 | 551 | 553)
}
