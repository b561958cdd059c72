use crate::event::Event;
use crate::past_log::PastEventLog;
use crate::time::Lvt;

/// Events a rollback produced, partitioned by whether they are safe to
/// replay locally or must instead be cancelled at their originating actor.
pub struct RollbackOutcome<P> {
	/// Events with no causal link: re-inject into the event buffer for replay.
	pub to_replay: Vec<Event<P>>,
	/// Events with a causal link: the original is dropped and its anti-event
	/// must be sent to the linked origin instead of replaying it locally.
	pub to_cancel: Vec<Event<P>>,
}

/// Splits `past` at `target` and partitions the replay set by causal link.
///
/// `rollback(target, past) = (outcome, new_past)` where `new_past` holds
/// exactly the events with `lvt < target` (still descending), and every
/// event with `lvt >= target` is returned in `outcome`, ascending by lvt,
/// routed to `to_replay` (no link) or `to_cancel` (linked to an origin).
#[must_use]
pub fn rollback<P>(target: Lvt, past: PastEventLog<P>) -> (RollbackOutcome<P>, PastEventLog<P>) {
	let (replay, new_past) = past.split_for_rollback(target);

	let mut to_replay = Vec::new();
	let mut to_cancel = Vec::new();
	for event in replay {
		if event.link.is_some() {
			to_cancel.push(event);
		} else {
			to_replay.push(event);
		}
	}

	(RollbackOutcome { to_replay, to_cancel }, new_past)
}


#[cfg(test)]
mod proptests {
	use std::collections::HashSet;

	use proptest::prelude::*;
	use tw_transport::ActorId;

	use super::*;

	proptest! {
		/// `rollback(target, past)` always partitions `past` without gaps or
		/// overlaps: every entry lands in exactly one of `to_replay`,
		/// `to_cancel`, or `new_past`, routed by lvt and causal link, with
		/// `to_replay`/`to_cancel` covering `lvt >= target` and `new_past`
		/// covering `lvt < target`, and both halves keep their own ordering.
		#[test]
		fn rollback_partitions_the_past_log_without_gaps_or_overlaps(
			lvts in prop::collection::hash_set(0u64..500, 0..40),
			target in 0u64..500,
			link_seed in any::<u8>(),
		) {
			let mut sorted: Vec<u64> = lvts.into_iter().collect();
			sorted.sort_unstable_by(|a, b| b.cmp(a));

			let origin = ActorId::new();
			let mut past = PastEventLog::new();
			for (i, lvt) in sorted.iter().enumerate() {
				let linked = (link_seed as usize + i) % 3 == 0;
				let event = if linked { Event::new_linked(origin, Lvt::new(*lvt), 0u8) } else { Event::new(Lvt::new(*lvt), 0u8) };
				past.push(event);
			}
			let total_before = past.len();

			let (outcome, new_past) = rollback(Lvt::new(target), past);

			prop_assert_eq!(outcome.to_replay.len() + outcome.to_cancel.len() + new_past.len(), total_before);

			let mut seen_ids = HashSet::new();
			for e in outcome.to_replay.iter().chain(outcome.to_cancel.iter()) {
				prop_assert!(e.lvt >= Lvt::new(target));
				prop_assert!(seen_ids.insert(e.id));
			}
			for e in new_past.iter() {
				prop_assert!(e.lvt < Lvt::new(target));
				prop_assert!(seen_ids.insert(e.id));
			}

			for e in &outcome.to_replay {
				prop_assert!(e.link.is_none());
			}
			for e in &outcome.to_cancel {
				prop_assert!(e.link.is_some());
			}

			for w in outcome.to_replay.windows(2) {
				prop_assert!(w[0].lvt <= w[1].lvt, "to_replay must be ascending");
			}
			for w in outcome.to_cancel.windows(2) {
				prop_assert!(w[0].lvt <= w[1].lvt, "to_cancel must be ascending");
			}
			let remaining_lvts: Vec<Lvt> = new_past.iter().map(|e| e.lvt).collect();
			for w in remaining_lvts.windows(2) {
				prop_assert!(w[0] >= w[1], "new_past must stay descending");
			}
		}
	}
}
