use crate::actor_id::ActorId;
use crate::error::Result;

/// Core transport interface the kernel depends on rather than any concrete
/// networking stack. A transport owns the mapping from [`ActorId`] to a
/// per-actor mailbox and must deliver messages asynchronously while
/// preserving per-sender FIFO ordering; no ordering across distinct senders
/// is required.
#[async_trait::async_trait]
pub trait Transport<M>: Clone + Send + Sync + 'static
where
	M: Send + 'static,
{
	/// The receiving half of a mailbox this transport hands out.
	type Receiver: Send + 'static;

	/// Registers a mailbox for `actor` and returns its receiving half.
	/// Calling this twice for the same id replaces the previous mailbox.
	fn open_mailbox(&self, actor: ActorId) -> Self::Receiver;

	/// Removes the mailbox for `actor`, if any. Pending sends afterwards fail.
	fn close_mailbox(&self, actor: &ActorId);

	/// Delivers a single message to `actor`'s mailbox.
	async fn send(&self, actor: &ActorId, msg: M) -> Result<()>;

	/// True if `actor` currently has a registered mailbox.
	fn has_mailbox(&self, actor: &ActorId) -> bool;
}
