use thiserror::Error;

/// Transport-agnostic error type returned by [`crate::Transport`] implementations.
#[derive(Debug, Error, Clone)]
pub enum TransportError {
	/// The target mailbox has no registered receiver (never opened, or already closed).
	#[error("mailbox {0} not found")]
	MailboxNotFound(String),

	/// The receiving end of a mailbox has been dropped.
	#[error("mailbox {0} closed")]
	MailboxClosed(String),

	/// Send failed for a reason specific to the underlying channel.
	#[error("failed to deliver to mailbox {0}: {1}")]
	SendFailed(String, String),
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
