use thiserror::Error;
use tw_transport::TransportError;

/// The taxonomy of failures a TW-actor can surface.
#[derive(Debug, Error, Clone)]
pub enum KernelError {
	/// `Behavior::init` returned an error or panicked; the actor never started.
	#[error("actor init failed: {0}")]
	InitFailure(String),

	/// `Behavior::handle_event` returned an error or panicked. The kernel
	/// rolls back to the last-observed GVT and emits any anti-events owed to
	/// peers before surfacing this as the actor's exit reason.
	#[error("event handler failed: {0}")]
	HandlerFailure(String),

	/// A kernel-internal invariant was violated. Always a bug; unrecoverable.
	#[error("kernel invariant violated: {0}")]
	InvariantViolation(String),

	/// A message arrived through the transport that was not a well-formed event.
	#[error("unexpected non-event message discarded")]
	UnexpectedMessage,

	/// The transport failed to deliver or register a mailbox.
	#[error("transport error: {0}")]
	Transport(#[from] TransportError),
}

/// Result type used throughout the kernel.
pub type Result<T> = std::result::Result<T, KernelError>;

/// The reason a TW-actor terminated, handed to `terminate` and, for linked
/// actors, to the spawner's exit watch.
#[derive(Debug, Clone)]
pub enum ExitReason {
	/// A `Stop` event reached the head of the dispatch loop.
	Stopped(String),
	/// The actor failed; carries the underlying [`KernelError`].
	Failed(KernelError),
}

impl ExitReason {
	#[must_use]
	pub fn is_failure(&self) -> bool {
		matches!(self, ExitReason::Failed(_))
	}
}

impl std::fmt::Display for ExitReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ExitReason::Stopped(reason) => write!(f, "stopped: {reason}"),
			ExitReason::Failed(err) => write!(f, "failed: {err}"),
		}
	}
}
