use std::collections::VecDeque;

use crate::error::KernelError;
use crate::time::Lvt;

/// Saved `(lvt, user_state)` pairs, strictly descending by `lvt`. Always
/// non-empty once an actor has run `init`; the front entry is the state
/// snapshot at the actor's current LVT.
#[derive(Debug)]
pub struct StateHistory<S> {
	entries: VecDeque<(Lvt, S)>,
}

impl<S> StateHistory<S> {
	/// Seeds the history with the initial `(lvt, state)` from `init`.
	#[must_use]
	pub fn new(lvt: Lvt, state: S) -> Self {
		Self {
			entries: VecDeque::from([(lvt, state)]),
		}
	}

	/// The current (most recent) `(lvt, state)` pair. Never empty once created.
	#[must_use]
	pub fn head(&self) -> &(Lvt, S) {
		self.entries.front().expect("state history is never empty")
	}

	#[must_use]
	pub fn head_lvt(&self) -> Lvt {
		self.head().0
	}

	#[must_use]
	pub fn head_state(&self) -> &S {
		&self.head().1
	}

	#[must_use]
	pub fn oldest_lvt(&self) -> Lvt {
		self.entries.back().expect("state history is never empty").0
	}

	/// Records a new `(lvt, state)` pair.
	///
	/// - `lvt == head.lvt` replaces the head (same-tick update).
	/// - `lvt > head.lvt` prepends a new entry.
	/// - `lvt < head.lvt` is a programming error: the dispatch loop never
	///   appends an older lvt than the current head, so this returns
	///   [`KernelError::InvariantViolation`] rather than silently corrupting order.
	pub fn append(&mut self, lvt: Lvt, state: S) -> Result<(), KernelError> {
		let head_lvt = self.head_lvt();
		if lvt < head_lvt {
			return Err(KernelError::InvariantViolation(format!(
				"state history append with lvt {lvt} older than head {head_lvt}"
			)));
		}
		if lvt == head_lvt {
			self.entries[0] = (lvt, state);
		} else {
			self.entries.push_front((lvt, state));
		}
		Ok(())
	}

	/// Drops every entry with `lvt < t` — used by GVT fossil collection.
	/// Always leaves at least one entry, even if that entry's lvt is below `t`.
	pub fn truncate_below(&mut self, t: Lvt) {
		while self.entries.len() > 1 && self.entries.back().map(|(lvt, _)| *lvt < t).unwrap_or(false) {
			self.entries.pop_back();
		}
	}

	/// Drops every entry with `lvt > t`. Always leaves at least one entry.
	pub fn truncate_above(&mut self, t: Lvt) {
		while self.entries.len() > 1 && self.entries.front().map(|(lvt, _)| *lvt > t).unwrap_or(false) {
			self.entries.pop_front();
		}
	}

	/// Drops every entry with `lvt >= t`, used by rollback. Unlike
	/// [`Self::truncate_above`], this also discards a snapshot saved at
	/// exactly `t`: a rollback to `t` means the event that produced that
	/// exact snapshot is itself about to be replayed (the rollback engine's
	/// replay set is inclusive of `t`, per its own contract), so keeping that
	/// snapshot as the restore baseline would double-count its effect.
	/// Always leaves at least one entry.
	pub fn rollback_before(&mut self, t: Lvt) {
		while self.entries.len() > 1 && self.entries.front().map(|(lvt, _)| *lvt >= t).unwrap_or(false) {
			self.entries.pop_front();
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn append_newer_lvt_prepends() {
		let mut h = StateHistory::new(Lvt::new(0), "a");
		h.append(Lvt::new(1), "b").unwrap();
		assert_eq!(h.head(), &(Lvt::new(1), "b"));
		assert_eq!(h.len(), 2);
	}

	#[test]
	fn append_same_lvt_replaces_head() {
		let mut h = StateHistory::new(Lvt::new(0), "a");
		h.append(Lvt::new(0), "a2").unwrap();
		assert_eq!(h.head(), &(Lvt::new(0), "a2"));
		assert_eq!(h.len(), 1);
	}

	#[test]
	fn append_older_lvt_is_invariant_violation() {
		let mut h = StateHistory::new(Lvt::new(5), "a");
		let err = h.append(Lvt::new(3), "b").unwrap_err();
		assert!(matches!(err, KernelError::InvariantViolation(_)));
	}

	#[test]
	fn truncate_below_drops_stale_entries_but_keeps_one() {
		let mut h = StateHistory::new(Lvt::new(0), "a");
		h.append(Lvt::new(10), "b").unwrap();
		h.append(Lvt::new(20), "c").unwrap();

		h.truncate_below(Lvt::new(15));
		assert_eq!(h.len(), 2);
		assert_eq!(h.oldest_lvt(), Lvt::new(10));

		h.truncate_below(Lvt::new(1000));
		assert_eq!(h.len(), 1, "truncate never empties the history");
	}

	#[test]
	fn truncate_above_restores_head_at_or_below_target() {
		let mut h = StateHistory::new(Lvt::new(0), "a");
		h.append(Lvt::new(5), "b").unwrap();
		h.append(Lvt::new(10), "c").unwrap();

		h.truncate_above(Lvt::new(5));
		assert_eq!(h.head_lvt(), Lvt::new(5));
	}

	#[test]
	fn rollback_before_also_drops_the_snapshot_saved_exactly_at_target() {
		let mut h = StateHistory::new(Lvt::new(0), "a");
		h.append(Lvt::new(5), "b").unwrap();
		h.append(Lvt::new(10), "c").unwrap();

		h.rollback_before(Lvt::new(5));
		assert_eq!(h.head_lvt(), Lvt::new(0), "the entry saved exactly at the rollback target must not survive");
	}

	#[test]
	fn rollback_before_never_empties_the_history() {
		let mut h = StateHistory::new(Lvt::new(0), "a");
		h.rollback_before(Lvt::new(0));
		assert_eq!(h.len(), 1);
	}
}
