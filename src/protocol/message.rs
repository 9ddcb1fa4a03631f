//! Authentication request/reply line grammar.
//!
//! The verifier speaks a line-oriented protocol with positional
//! correlation: requests go out as `HALF <clientId> <challenge> <response>`
//! and replies come back one line per request, oldest first, with no
//! request identifier. `YES` grants; any other line denies.
//!
//! Fields are opaque space-free tokens. The protocol defines no escaping,
//! so a caller that embeds whitespace corrupts the line grammar upstream
//! of this crate.

use tokio::sync::oneshot;

/// Keyword opening every request line.
pub const REQUEST_KEYWORD: &str = "HALF";

/// The single reply line that grants a request.
pub const REPLY_GRANTED: &str = "YES";

/// One in-flight authentication request.
///
/// Resolution is exactly-once by construction: granting or denying
/// consumes the request, and a request dropped unresolved (connection
/// teardown, supervisor shutdown) denies itself. A submitter is never
/// left waiting.
#[derive(Debug)]
pub struct AuthRequest {
    client_id: String,
    challenge: String,
    response: String,
    reply: Option<oneshot::Sender<bool>>,
}

impl AuthRequest {
    /// Build a request plus the receiver its verdict arrives on.
    pub fn new(
        client_id: impl Into<String>,
        challenge: impl Into<String>,
        response: impl Into<String>,
    ) -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        let request = Self {
            client_id: client_id.into(),
            challenge: challenge.into(),
            response: response.into(),
            reply: Some(tx),
        };
        (request, rx)
    }

    /// Client identifier this request authenticates.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Serialize to the wire line, without the trailing newline.
    pub fn request_line(&self) -> String {
        format!(
            "{REQUEST_KEYWORD} {} {} {}",
            self.client_id, self.challenge, self.response
        )
    }

    /// Resolve the request as verified.
    pub fn grant(self) {
        self.resolve(true);
    }

    /// Resolve the request as rejected or failed.
    pub fn deny(self) {
        self.resolve(false);
    }

    fn resolve(mut self, verdict: bool) {
        if let Some(reply) = self.reply.take() {
            // A submitter that stopped listening is not an error.
            let _ = reply.send(verdict);
        }
    }
}

impl Drop for AuthRequest {
    fn drop(&mut self) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(false);
        }
    }
}

/// Classification of one verifier reply line.
///
/// The wire conflates explicit denial with garbage: anything but `YES`
/// denies. The raw line is kept on the denied arm so diagnostics can tell
/// the two apart even though callers only see the boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Granted,
    Denied(String),
}

impl Verdict {
    /// Classify a reply line. Grants iff the line is exactly `YES`.
    pub fn from_line(line: &str) -> Self {
        if line == REPLY_GRANTED {
            Verdict::Granted
        } else {
            Verdict::Denied(line.to_string())
        }
    }

    /// Boolean form delivered to submitters.
    pub fn is_granted(&self) -> bool {
        matches!(self, Verdict::Granted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line_is_space_separated() {
        let (request, _rx) = AuthRequest::new("router-7", "c9f2", "ab31");
        assert_eq!(request.request_line(), "HALF router-7 c9f2 ab31");
    }

    #[test]
    fn test_grant_delivers_true_exactly_once() {
        let (request, mut rx) = AuthRequest::new("id", "ch", "re");
        request.grant();
        assert!(rx.try_recv().unwrap());
    }

    #[test]
    fn test_deny_delivers_false() {
        let (request, mut rx) = AuthRequest::new("id", "ch", "re");
        request.deny();
        assert!(!rx.try_recv().unwrap());
    }

    #[test]
    fn test_dropped_request_denies_itself() {
        let (request, mut rx) = AuthRequest::new("id", "ch", "re");
        drop(request);
        assert!(!rx.try_recv().unwrap());
    }

    #[test]
    fn test_only_exact_yes_grants() {
        assert!(Verdict::from_line("YES").is_granted());
        for line in ["NO", "", "YES ", " YES", "yes", "MAYBE", "NOPE"] {
            let verdict = Verdict::from_line(line);
            assert!(!verdict.is_granted());
            assert_eq!(verdict, Verdict::Denied(line.to_string()));
        }
    }
}
