use std::collections::VecDeque;

use crate::event::Event;
use crate::time::Lvt;

/// Processed events, descending by `lvt`. Serves as the replay source for
/// rollback; user events only (`Stop`/`GvtUpdate` are never pushed here).
#[derive(Debug)]
pub struct PastEventLog<P> {
	entries: VecDeque<Event<P>>,
}

impl<P> Default for PastEventLog<P> {
	fn default() -> Self {
		Self::new()
	}
}

impl<P> PastEventLog<P> {
	#[must_use]
	pub fn new() -> Self {
		Self { entries: VecDeque::new() }
	}

	/// Records a just-applied event. Must be called with an lvt no larger
	/// than any entry already present, preserving descending order.
	pub fn push(&mut self, event: Event<P>) {
		debug_assert!(
			self.entries.front().map(|head| event.lvt <= head.lvt).unwrap_or(true),
			"past-event log must stay descending by lvt"
		);
		self.entries.push_front(event);
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn iter(&self) -> impl Iterator<Item = &Event<P>> {
		self.entries.iter()
	}

	/// Splits the log at `target`, consuming `self`. Returns `(replay, new_past)`:
	/// `replay` holds every entry with `lvt >= target`, ascending by lvt
	/// (ready to merge back into the event buffer); `new_past` holds the
	/// remainder, with `lvt < target`, still descending.
	#[must_use]
	pub fn split_for_rollback(mut self, target: Lvt) -> (Vec<Event<P>>, PastEventLog<P>) {
		let mut replay = Vec::new();
		while let Some(front) = self.entries.front() {
			if front.lvt < target {
				break;
			}
			replay.push(self.entries.pop_front().unwrap());
		}
		replay.reverse();
		(replay, self)
	}

	/// Drops every entry with `lvt < t` — used by GVT fossil collection.
	pub fn truncate_below(&mut self, t: Lvt) {
		while self.entries.back().map(|e| e.lvt < t).unwrap_or(false) {
			self.entries.pop_back();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ev(lvt: u64) -> Event<u8> {
		Event::new(Lvt::new(lvt), 0)
	}

	#[test]
	fn push_maintains_descending_order() {
		let mut log = PastEventLog::new();
		log.push(ev(1));
		log.push(ev(2));
		log.push(ev(3));

		let lvts: Vec<u64> = log.iter().map(|e| e.lvt.get()).collect();
		assert_eq!(lvts, vec![3, 2, 1]);
	}

	#[test]
	fn truncate_below_drops_old_entries() {
		let mut log = PastEventLog::new();
		for lvt in [0, 1, 2, 3] {
			log.push(ev(lvt));
		}
		log.truncate_below(Lvt::new(2));
		let lvts: Vec<u64> = log.iter().map(|e| e.lvt.get()).collect();
		assert_eq!(lvts, vec![3, 2]);
	}
}

#[cfg(test)]
mod proptests {
	use proptest::prelude::*;

	use super::*;

	proptest! {
		/// After any sequence of pushes, the log stays descending by lvt;
		/// after `truncate_below(floor)`, exactly the entries with
		/// `lvt >= floor` remain, still descending.
		#[test]
		fn truncate_below_retains_exactly_entries_at_or_above_floor(
			lvts in prop::collection::hash_set(0u64..500, 0..40),
			floor in 0u64..500,
		) {
			let mut sorted: Vec<u64> = lvts.into_iter().collect();
			sorted.sort_unstable_by(|a, b| b.cmp(a));

			let mut log = PastEventLog::new();
			for lvt in &sorted {
				log.push(Event::new(Lvt::new(*lvt), 0u8));
			}

			let before: Vec<u64> = log.iter().map(|e| e.lvt.get()).collect();
			prop_assert_eq!(&before, &sorted, "push must preserve descending call order");

			log.truncate_below(Lvt::new(floor));

			let remaining: Vec<u64> = log.iter().map(|e| e.lvt.get()).collect();
			let expected: Vec<u64> = sorted.iter().copied().filter(|&lvt| lvt >= floor).collect();
			prop_assert_eq!(remaining, expected);
		}
	}
}
