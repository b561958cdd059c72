//! Graceful-receive helpers for `tokio::sync::mpsc`, shared by every mailbox
//! drain in this codebase so timeout and close handling stay in one place
//! instead of being re-derived at each call site.

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Outcome of a single bounded receive attempt.
#[derive(Debug)]
pub enum RecvOutcome<T> {
	/// A message arrived before the deadline.
	Message(T),
	/// The sender half was dropped and the channel is drained.
	Closed,
	/// No message arrived before the timeout elapsed.
	Timeout,
}

impl<T> RecvOutcome<T> {
	/// True if a message was received.
	pub fn is_message(&self) -> bool {
		matches!(self, Self::Message(_))
	}

	/// Unwraps the message, discarding `Closed`/`Timeout`.
	pub fn into_option(self) -> Option<T> {
		match self {
			Self::Message(msg) => Some(msg),
			_ => None,
		}
	}
}

/// Extension trait adding timeout-aware, logged receives to bounded mpsc receivers.
pub trait ReceiverExt<T> {
	/// Receive the next message, logging and returning `Closed` once the sender drops.
	fn recv_graceful(&mut self, context: &str) -> impl std::future::Future<Output = RecvOutcome<T>> + Send;

	/// Receive the next message within `timeout`, returning `Timeout` if none arrives.
	fn recv_timeout(&mut self, timeout: Duration, context: &str) -> impl std::future::Future<Output = RecvOutcome<T>> + Send;
}

impl<T> ReceiverExt<T> for mpsc::Receiver<T>
where
	T: Send,
{
	async fn recv_graceful(&mut self, context: &str) -> RecvOutcome<T> {
		match self.recv().await {
			Some(msg) => RecvOutcome::Message(msg),
			None => {
				debug!(context, "mailbox closed: sender dropped");
				RecvOutcome::Closed
			}
		}
	}

	async fn recv_timeout(&mut self, timeout: Duration, context: &str) -> RecvOutcome<T> {
		if timeout.is_zero() {
			return match self.try_recv() {
				Ok(msg) => RecvOutcome::Message(msg),
				Err(mpsc::error::TryRecvError::Empty) => RecvOutcome::Timeout,
				Err(mpsc::error::TryRecvError::Disconnected) => {
					debug!(context, "mailbox closed: sender dropped");
					RecvOutcome::Closed
				}
			};
		}

		match tokio::time::timeout(timeout, self.recv()).await {
			Ok(Some(msg)) => RecvOutcome::Message(msg),
			Ok(None) => {
				debug!(context, "mailbox closed: sender dropped");
				RecvOutcome::Closed
			}
			Err(_) => {
				debug!(context, timeout_ms = timeout.as_millis(), "mailbox receive timed out");
				RecvOutcome::Timeout
			}
		}
	}
}
