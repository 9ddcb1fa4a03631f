//! Verifier link: relay authentication challenges over one TCP connection.
//!
//! Agents forward authentication challenges; a separate local verifier
//! process owns the credential database. This service multiplexes every
//! in-flight challenge over a single line-oriented connection and
//! correlates replies positionally — the wire carries no request IDs, so
//! replies resolve pending requests strictly in send order.
//!
//! The connection is established lazily on first use and re-established on
//! demand after a failure. All state lives in one supervisor task;
//! [`AuthClient`] is a cheap cloneable handle over a channel, so the
//! pending and queued lists never need locking.
//!
//! Failure policy is fail-closed: any connection-level problem (connect
//! failure, loss, watchdog abort, unparseable traffic) denies every
//! request it strands. Submitters always get exactly one verdict.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::{ProtocolError, Result};
use crate::protocol::message::{AuthRequest, Verdict};
use crate::utils::timeout::with_deadline;

/// Handle to the verifier link.
///
/// Cloning is cheap; all clones feed the same supervisor. Dropping every
/// clone shuts the supervisor down once its outstanding work is resolved.
#[derive(Debug, Clone)]
pub struct AuthClient {
    submissions: mpsc::UnboundedSender<AuthRequest>,
}

impl AuthClient {
    /// Spawn the supervisor task and return a handle to it.
    ///
    /// No connection is made until the first submission arrives.
    pub fn spawn(config: AuthConfig) -> Self {
        let (submissions, rx) = mpsc::unbounded_channel();
        tokio::spawn(supervise(config, rx));
        Self { submissions }
    }

    /// Submit an authentication challenge for verification.
    ///
    /// Returns a ticket that resolves exactly once: `true` if the verifier
    /// granted the request, `false` on denial or any connection-level
    /// failure. Tickets resolve strictly in submission order.
    pub fn submit(
        &self,
        client_id: impl Into<String>,
        challenge: impl Into<String>,
        response: impl Into<String>,
    ) -> AuthTicket {
        let (request, verdict) = AuthRequest::new(client_id, challenge, response);
        if let Err(mpsc::error::SendError(request)) = self.submissions.send(request) {
            // Supervisor already shut down; fail closed.
            request.deny();
        }
        AuthTicket { verdict }
    }

    /// Submit and await the verdict.
    pub async fn verify(
        &self,
        client_id: impl Into<String>,
        challenge: impl Into<String>,
        response: impl Into<String>,
    ) -> bool {
        self.submit(client_id, challenge, response).await
    }
}

/// Pending verdict of one submitted request. Resolves exactly once.
#[derive(Debug)]
pub struct AuthTicket {
    verdict: oneshot::Receiver<bool>,
}

impl Future for AuthTicket {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        // A vanished supervisor counts as denial.
        Pin::new(&mut self.verdict)
            .poll(cx)
            .map(|verdict| verdict.unwrap_or(false))
    }
}

/// Supervisor loop: lazily connect, hand the accumulated queue to a live
/// connection, return to disconnected on any failure.
async fn supervise(config: AuthConfig, mut submissions: mpsc::UnboundedReceiver<AuthRequest>) {
    loop {
        // Disconnected until something needs the verifier.
        let Some(first) = submissions.recv().await else {
            return;
        };
        let mut queue = vec![first];

        // Connecting: exactly one attempt in flight; submissions arriving
        // meanwhile only enqueue.
        match connect(&config, &mut queue, &mut submissions).await {
            Ok(Some(stream)) => {
                info!(peer = %config.verifier_addr, queued = queue.len(), "connected to verifier");
                Connection::new(stream, config.watchdog_timeout)
                    .run(queue, &mut submissions)
                    .await;
            }
            // All handles dropped mid-attempt; dropping the queue denies it.
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, queued = queue.len(), "verifier connect failed");
                for request in queue {
                    request.deny();
                }
            }
        }
    }
}

/// One bounded connect attempt, queueing submissions that arrive while it
/// is in flight. `Ok(None)` means every client handle was dropped.
async fn connect(
    config: &AuthConfig,
    queue: &mut Vec<AuthRequest>,
    submissions: &mut mpsc::UnboundedReceiver<AuthRequest>,
) -> Result<Option<TcpStream>> {
    let attempt = with_deadline(
        config.connect_timeout,
        ProtocolError::ConnectionFailed("connect attempt timed out".into()),
        async {
            TcpStream::connect(config.verifier_addr.as_str())
                .await
                .map_err(|e| ProtocolError::ConnectionFailed(e.to_string()))
        },
    );
    tokio::pin!(attempt);

    loop {
        tokio::select! {
            result = &mut attempt => return result.map(Some),
            submission = submissions.recv() => match submission {
                Some(request) => queue.push(request),
                None => return Ok(None),
            },
        }
    }
}

/// A reply-activity check scheduled at flush time.
struct Watchdog {
    deadline: Instant,
    /// Received-reply count when the check was scheduled.
    seen: u64,
}

enum Event {
    Submission(Option<AuthRequest>),
    Line(Option<std::result::Result<String, LinesCodecError>>),
    WatchdogFired,
}

/// One live connection to the verifier.
///
/// Sole owner of the pending list; replies resolve it FIFO. Every flushed
/// batch schedules a watchdog check; a check that fires with the received
/// counter unchanged aborts the connection.
struct Connection {
    framed: Framed<TcpStream, LinesCodec>,
    pending: VecDeque<AuthRequest>,
    received: u64,
    watchdogs: VecDeque<Watchdog>,
    watchdog_timeout: Duration,
}

impl Connection {
    fn new(stream: TcpStream, watchdog_timeout: Duration) -> Self {
        Self {
            framed: Framed::new(stream, LinesCodec::new()),
            pending: VecDeque::new(),
            received: 0,
            watchdogs: VecDeque::new(),
            watchdog_timeout,
        }
    }

    /// Drive the connection until it dies. Flushes the pre-connect queue
    /// first; every request still owned here is denied before returning.
    async fn run(
        mut self,
        queue: Vec<AuthRequest>,
        submissions: &mut mpsc::UnboundedReceiver<AuthRequest>,
    ) {
        let mut batch = queue;
        loop {
            if let Err(e) = self.flush(batch).await {
                warn!(error = %e, "write to verifier failed");
                break;
            }
            batch = Vec::new();

            match self.next_event(submissions).await {
                Event::Submission(Some(request)) => {
                    // Coalesce a burst of submissions into one flush, so the
                    // batch shares a single watchdog check.
                    batch.push(request);
                    while let Ok(more) = submissions.try_recv() {
                        batch.push(more);
                    }
                }
                Event::Submission(None) => {
                    debug!("all client handles dropped, closing verifier link");
                    break;
                }
                Event::Line(Some(Ok(line))) => {
                    if let Err(e) = self.reply_received(line) {
                        warn!(error = %e, "aborting verifier connection");
                        break;
                    }
                }
                Event::Line(Some(Err(e))) => {
                    warn!(error = %ProtocolError::from(e), "read from verifier failed");
                    break;
                }
                Event::Line(None) => {
                    warn!(error = %ProtocolError::ConnectionLost, "verifier closed the connection");
                    break;
                }
                Event::WatchdogFired => {
                    warn!(
                        error = %ProtocolError::WatchdogTimeout,
                        pending = self.pending.len(),
                        "aborting verifier connection"
                    );
                    break;
                }
            }
        }
        self.teardown();
    }

    /// Wait for the next actionable event. Watchdog checks whose batch saw
    /// reply activity in the meantime are discarded here.
    async fn next_event(
        &mut self,
        submissions: &mut mpsc::UnboundedReceiver<AuthRequest>,
    ) -> Event {
        loop {
            let next_check = self.watchdogs.front().map(|w| w.deadline);
            tokio::select! {
                submission = submissions.recv() => return Event::Submission(submission),
                line = self.framed.next() => return Event::Line(line),
                () = tokio::time::sleep_until(next_check.unwrap_or_else(Instant::now)),
                    if next_check.is_some() =>
                {
                    if let Some(watchdog) = self.watchdogs.pop_front() {
                        if watchdog.seen == self.received {
                            return Event::WatchdogFired;
                        }
                    }
                    // Replies arrived since this check was scheduled.
                }
            }
        }
    }

    /// Serialize a batch onto the wire in submission order, move it into
    /// the pending list, and schedule a watchdog check for it.
    async fn flush(&mut self, batch: Vec<AuthRequest>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        debug!(requests = batch.len(), "flushing requests to verifier");

        let lines: Vec<String> = batch.iter().map(AuthRequest::request_line).collect();
        self.pending.extend(batch);
        for line in lines {
            self.framed.feed(line).await?;
        }
        SinkExt::<String>::flush(&mut self.framed).await?;

        self.watchdogs.push_back(Watchdog {
            deadline: Instant::now() + self.watchdog_timeout,
            seen: self.received,
        });
        Ok(())
    }

    /// Correlate one reply line with the oldest pending request.
    fn reply_received(&mut self, line: String) -> Result<()> {
        self.received += 1;
        let Some(request) = self.pending.pop_front() else {
            return Err(ProtocolError::ProtocolViolation(format!(
                "reply line {line:?} with no pending request"
            )));
        };
        match Verdict::from_line(&line) {
            Verdict::Granted => {
                debug!(client = request.client_id(), "verifier granted");
                request.grant();
            }
            Verdict::Denied(raw) => {
                debug!(client = request.client_id(), line = %raw, "verifier denied");
                request.deny();
            }
        }
        Ok(())
    }

    /// Deny everything still pending on this connection.
    fn teardown(&mut self) {
        if !self.pending.is_empty() {
            info!(
                pending = self.pending.len(),
                "denying requests stranded on dead connection"
            );
        }
        for request in self.pending.drain(..) {
            request.deny();
        }
        self.watchdogs.clear();
    }
}
