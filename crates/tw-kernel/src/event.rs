use std::fmt;

use tw_transport::ActorId;
use uuid::Uuid;

use crate::time::Lvt;

/// Globally unique, opaque event identity. Anti-event/positive-event
/// matching relies only on equality of this id, never on structural
/// equality of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(Uuid);

impl EventId {
	#[must_use]
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for EventId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for EventId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// The content carried by an [`Event`]. `Stop` and `GvtUpdate` are the two
/// sentinel payloads the dispatch loop special-cases; neither is ever stored
/// in the past-event log or subject to rollback replay.
#[derive(Debug, Clone)]
pub enum Payload<P> {
	/// Ordinary application event, handed to `handle_event`.
	User(P),
	/// Tells the actor to terminate with the given reason once dequeued.
	Stop(String),
	/// Advances the actor's notion of GVT, triggering fossil collection.
	GvtUpdate(Lvt),
}

impl<P> Payload<P> {
	#[must_use]
	pub fn is_user(&self) -> bool {
		matches!(self, Payload::User(_))
	}
}

/// An immutable event (or anti-event) flowing through the kernel.
///
/// Anti-events are the cancellation twin of a previously sent event: same
/// `id`, same `lvt`, same payload, `is_event = false`, `link` cleared.
#[derive(Debug, Clone)]
pub struct Event<P> {
	pub lvt: Lvt,
	pub id: EventId,
	pub is_event: bool,
	pub link: Option<ActorId>,
	pub payload: Payload<P>,
}

impl<P> Event<P> {
	/// Builds a non-causal positive event; id is auto-generated.
	#[must_use]
	pub fn new(lvt: Lvt, payload: P) -> Self {
		Self {
			lvt,
			id: EventId::new(),
			is_event: true,
			link: None,
			payload: Payload::User(payload),
		}
	}

	/// Builds a causally-linked positive event, tagged with its originating actor.
	#[must_use]
	pub fn new_linked(origin: ActorId, lvt: Lvt, payload: P) -> Self {
		Self {
			lvt,
			id: EventId::new(),
			is_event: true,
			link: Some(origin),
			payload: Payload::User(payload),
		}
	}

	/// Builds the reserved `Stop` event; bypasses normal lvt ordering in the
	/// dispatch loop (see the kernel's handling of rule 2).
	#[must_use]
	pub fn stop(reason: impl Into<String>) -> Self {
		Self {
			lvt: Lvt::ZERO,
			id: EventId::new(),
			is_event: true,
			link: None,
			payload: Payload::Stop(reason.into()),
		}
	}

	/// Builds the reserved `GvtUpdate` event carrying the newly observed GVT.
	#[must_use]
	pub fn gvt_update(gvt: Lvt) -> Self {
		Self {
			lvt: gvt,
			id: EventId::new(),
			is_event: true,
			link: None,
			payload: Payload::GvtUpdate(gvt),
		}
	}

	/// Returns the anti-event twin of this event: same id, same lvt, same
	/// payload, the event bit flipped off, and the causal link cleared.
	/// Idempotent — calling it again on the result returns an equivalent event.
	#[must_use]
	pub fn antievent(&self) -> Self
	where
		P: Clone,
	{
		Self {
			lvt: self.lvt,
			id: self.id,
			is_event: false,
			link: None,
			payload: self.payload.clone(),
		}
	}

	/// Sort key for the ordered event buffer: `(lvt, is_event, id)` ascending.
	/// The `is_event` component extends the `(lvt, id)` primary key from the
	/// design so an anti-event always sorts immediately before the positive
	/// event it would annihilate, rather than relying on insertion order.
	#[must_use]
	pub fn order_key(&self) -> (Lvt, bool, EventId) {
		(self.lvt, self.is_event, self.id)
	}

	/// The identity used to detect re-delivery of the exact same event (not
	/// shared with its anti-event twin, which carries the same `id` but the
	/// opposite `is_event`).
	#[must_use]
	pub fn dedup_key(&self) -> (EventId, bool) {
		(self.id, self.is_event)
	}
}
