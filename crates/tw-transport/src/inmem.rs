//! In-process transport built on `tokio::sync::mpsc`.
//!
//! Suitable for single-process simulations and for the kernel's own test
//! suite. Each actor's mailbox is a bounded mpsc channel keyed by
//! [`ActorId`] in a shared `DashMap`, so any clone of the transport can
//! deliver to any mailbox registered through it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::actor_id::ActorId;
use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// In-memory, `mpsc`-backed [`Transport`].
#[derive(Clone)]
pub struct InMemTransport<M>
where
	M: Send + 'static,
{
	mailboxes: Arc<DashMap<ActorId, mpsc::Sender<M>>>,
	capacity: usize,
}

impl<M> InMemTransport<M>
where
	M: Send + 'static,
{
	/// Creates a transport whose mailboxes are bounded to `capacity` messages.
	#[must_use]
	pub fn new(capacity: usize) -> Self {
		Self {
			mailboxes: Arc::new(DashMap::new()),
			capacity,
		}
	}
}

#[async_trait::async_trait]
impl<M> Transport<M> for InMemTransport<M>
where
	M: Send + 'static,
{
	type Receiver = mpsc::Receiver<M>;

	fn open_mailbox(&self, actor: ActorId) -> Self::Receiver {
		let (tx, rx) = mpsc::channel(self.capacity.max(1));
		self.mailboxes.insert(actor, tx);
		rx
	}

	fn close_mailbox(&self, actor: &ActorId) {
		self.mailboxes.remove(actor);
	}

	async fn send(&self, actor: &ActorId, msg: M) -> Result<()> {
		let Some(sender) = self.mailboxes.get(actor).map(|entry| entry.clone()) else {
			return Err(TransportError::MailboxNotFound(actor.to_string()));
		};
		sender.send(msg).await.map_err(|_| TransportError::MailboxClosed(actor.to_string()))
	}

	fn has_mailbox(&self, actor: &ActorId) -> bool {
		self.mailboxes.contains_key(actor)
	}
}
