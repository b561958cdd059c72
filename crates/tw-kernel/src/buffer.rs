use std::collections::{BTreeMap, HashMap};

use crate::event::{Event, EventId};
use crate::time::Lvt;

type Key = (Lvt, bool, EventId);

/// Pending events ordered by `(lvt, is_event, id)` ascending.
///
/// The `is_event` component means an anti-event always sorts immediately
/// before the positive event it cancels when both share an `(lvt, id)` —
/// this is what lets the dispatch loop's annihilation rule just look at the
/// buffer's head instead of scanning for a match. A positive event and its
/// anti-event legitimately share an `id` at the same time (that's the whole
/// point of annihilation); what stays unique per `id` is each of the two
/// classes individually, which is what `by_id` dedups on.
///
/// Backed by a `BTreeMap` keyed on the full order key plus a side index from
/// `(id, is_event)` to that key, so inserting a re-delivered event or
/// annihilating an anti-event's positive twin are both O(log n).
#[derive(Debug)]
pub struct EventBuffer<P> {
	by_key: BTreeMap<Key, Event<P>>,
	by_id: HashMap<(EventId, bool), Key>,
}

impl<P> Default for EventBuffer<P> {
	fn default() -> Self {
		Self::new()
	}
}

impl<P> EventBuffer<P> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			by_key: BTreeMap::new(),
			by_id: HashMap::new(),
		}
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.by_key.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.by_key.len()
	}

	/// True if either a positive event or an anti-event with this id is pending.
	#[must_use]
	pub fn contains_id(&self, id: &EventId) -> bool {
		self.by_id.contains_key(&(*id, true)) || self.by_id.contains_key(&(*id, false))
	}

	/// Inserts `event`, preserving ascending order. A re-delivery of the same
	/// event (same id, same class) is treated as set-union and ignored; a
	/// positive event and its anti-event twin (same id, opposite class) both
	/// coexist until the dispatch loop annihilates them.
	pub fn insert(&mut self, event: Event<P>) {
		let dedup_key = event.dedup_key();
		if self.by_id.contains_key(&dedup_key) {
			return;
		}
		let key = event.order_key();
		self.by_id.insert(dedup_key, key);
		self.by_key.insert(key, event);
	}

	/// Inserts every event in `events`, same semantics as [`Self::insert`].
	pub fn extend(&mut self, events: impl IntoIterator<Item = Event<P>>) {
		for event in events {
			self.insert(event);
		}
	}

	/// Merges `other` into `self`, consuming it (ordered-set union).
	pub fn union(&mut self, other: EventBuffer<P>) {
		self.extend(other.by_key.into_values());
	}

	/// The lowest-ordered pending event, if any.
	#[must_use]
	pub fn peek_head(&self) -> Option<&Event<P>> {
		self.by_key.values().next()
	}

	/// Removes and returns the lowest-ordered pending event.
	pub fn pop_head(&mut self) -> Option<Event<P>> {
		let key = *self.by_key.keys().next()?;
		self.remove_by_key(&key)
	}

	/// Removes every entry (positive and/or anti) sharing `id`. Used by
	/// anti-event annihilation: at most one entry of each class can match.
	pub fn remove_by_id(&mut self, id: &EventId) -> Vec<Event<P>> {
		let mut removed = Vec::with_capacity(2);
		for is_event in [true, false] {
			if let Some(key) = self.by_id.remove(&(*id, is_event)) {
				if let Some(event) = self.by_key.remove(&key) {
					removed.push(event);
				}
			}
		}
		removed
	}

	fn remove_by_key(&mut self, key: &Key) -> Option<Event<P>> {
		let event = self.by_key.remove(key)?;
		self.by_id.remove(&event.dedup_key());
		Some(event)
	}

	/// Removes and returns every event matching `predicate`, preserving
	/// ascending order in the result.
	pub fn extract_if(&mut self, mut predicate: impl FnMut(&Event<P>) -> bool) -> Vec<Event<P>> {
		let matching: Vec<Key> = self.by_key.iter().filter(|(_, e)| predicate(e)).map(|(k, _)| *k).collect();
		matching.into_iter().filter_map(|key| self.remove_by_key(&key)).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ev(lvt: u64) -> Event<u8> {
		Event::new(Lvt::new(lvt), 0)
	}

	#[test]
	fn insert_keeps_ascending_order() {
		let mut buf = EventBuffer::new();
		buf.insert(ev(5));
		buf.insert(ev(1));
		buf.insert(ev(3));

		let lvts: Vec<u64> = std::iter::from_fn(|| buf.pop_head()).map(|e| e.lvt.get()).collect();
		assert_eq!(lvts, vec![1, 3, 5]);
	}

	#[test]
	fn duplicate_id_is_ignored() {
		let mut buf = EventBuffer::new();
		let e = ev(1);
		let id = e.id;
		buf.insert(e.clone());
		buf.insert(e);

		assert_eq!(buf.len(), 1);
		assert!(buf.contains_id(&id));
	}

	#[test]
	fn remove_by_id_drops_matching_entry_only() {
		let mut buf = EventBuffer::new();
		let a = ev(1);
		let b = ev(2);
		let a_id = a.id;
		buf.insert(a);
		buf.insert(b);

		let removed = buf.remove_by_id(&a_id);
		assert_eq!(removed.len(), 1);
		assert_eq!(removed[0].id, a_id);
		assert_eq!(buf.len(), 1);
	}

	#[test]
	fn anti_event_sorts_before_its_positive_twin_at_the_same_lvt() {
		let mut buf = EventBuffer::new();
		let positive = ev(1);
		let anti = positive.antievent();
		buf.insert(positive.clone());
		buf.insert(anti);

		assert_eq!(buf.len(), 2);
		let head = buf.peek_head().unwrap();
		assert!(!head.is_event);
		assert_eq!(head.id, positive.id);
	}

	#[test]
	fn remove_by_id_annihilates_both_the_anti_event_and_its_positive_twin() {
		let mut buf = EventBuffer::new();
		let positive = ev(1);
		let anti = positive.antievent();
		let id = positive.id;
		buf.insert(positive);
		buf.insert(anti);
		buf.insert(ev(2));

		let removed = buf.remove_by_id(&id);
		assert_eq!(removed.len(), 2);
		assert_eq!(buf.len(), 1);
	}

	#[test]
	fn union_merges_and_dedupes() {
		let mut a = EventBuffer::new();
		let shared = ev(1);
		a.insert(shared.clone());
		a.insert(ev(2));

		let mut b = EventBuffer::new();
		b.insert(shared);
		b.insert(ev(3));

		a.union(b);
		assert_eq!(a.len(), 3);
	}
}
