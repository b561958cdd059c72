use std::time::Duration;

use tokio::sync::mpsc;
use tracing::warn;
use tw_transport::{ReceiverExt, RecvOutcome};

use crate::buffer::EventBuffer;
use crate::event::Event;

/// What actually travels over the wire for one transport delivery: always a
/// batch, so `notify(ref, one_or_many)` reaches the mailbox as a single
/// message regardless of how many events the caller handed it.
#[derive(Debug)]
pub struct MailboxMessage<P>(pub Vec<Event<P>>);

impl<P> MailboxMessage<P> {
	#[must_use]
	pub fn one(event: Event<P>) -> Self {
		Self(vec![event])
	}

	#[must_use]
	pub fn many(events: Vec<Event<P>>) -> Self {
		Self(events)
	}
}

/// Drains `rx` into `buffer`: waits up to `initial_timeout` for the first
/// message, then keeps collecting with a zero-timeout pass for as long as
/// messages keep arriving, coalescing a burst into one dispatch-loop pass.
///
/// Returns `false` if the sender half was dropped (the actor's transport
/// registration is gone and no more events will ever arrive).
pub(crate) async fn drain<P: Send + 'static>(rx: &mut mpsc::Receiver<MailboxMessage<P>>, initial_timeout: Duration, buffer: &mut EventBuffer<P>) -> bool {
	match rx.recv_timeout(initial_timeout, "tw-actor-mailbox").await {
		RecvOutcome::Message(MailboxMessage(events)) => buffer.extend(events),
		RecvOutcome::Timeout => return true,
		RecvOutcome::Closed => return false,
	}

	loop {
		match rx.recv_timeout(Duration::ZERO, "tw-actor-mailbox").await {
			RecvOutcome::Message(MailboxMessage(events)) => buffer.extend(events),
			RecvOutcome::Timeout => break,
			RecvOutcome::Closed => {
				warn!("mailbox sender dropped mid-drain");
				break;
			}
		}
	}

	true
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::time::Lvt;

	#[tokio::test]
	async fn drain_returns_immediately_on_empty_mailbox_with_zero_timeout() {
		let (_tx, mut rx) = mpsc::channel::<MailboxMessage<u8>>(8);
		let mut buffer = EventBuffer::new();

		let alive = drain(&mut rx, Duration::ZERO, &mut buffer).await;

		assert!(alive);
		assert!(buffer.is_empty());
	}

	#[tokio::test]
	async fn drain_coalesces_a_burst_of_messages() {
		let (tx, mut rx) = mpsc::channel(8);
		tx.send(MailboxMessage::one(Event::new(Lvt::new(1), 0u8))).await.unwrap();
		tx.send(MailboxMessage::one(Event::new(Lvt::new(2), 0u8))).await.unwrap();
		tx.send(MailboxMessage::many(vec![Event::new(Lvt::new(3), 0u8)])).await.unwrap();

		let mut buffer = EventBuffer::new();
		let alive = drain(&mut rx, Duration::from_millis(50), &mut buffer).await;

		assert!(alive);
		assert_eq!(buffer.len(), 3);
	}

	#[tokio::test]
	async fn drain_reports_dead_when_sender_dropped() {
		let (tx, mut rx) = mpsc::channel::<MailboxMessage<u8>>(8);
		drop(tx);
		let mut buffer = EventBuffer::new();

		let alive = drain(&mut rx, Duration::from_millis(10), &mut buffer).await;

		assert!(!alive);
	}
}
