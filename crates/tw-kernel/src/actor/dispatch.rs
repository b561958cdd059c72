use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};
use tw_transport::{ActorId, Transport};

use crate::behavior::{catch_panic, Behavior, CausalEffect};
use crate::buffer::EventBuffer;
use crate::config::KernelConfig;
use crate::error::{ExitReason, KernelError};
use crate::event::{Event, Payload};
use crate::history::StateHistory;
use crate::mailbox::{self, MailboxMessage};
use crate::past_log::PastEventLog;
use crate::rollback::rollback;
use crate::time::Lvt;

/// Everything the dispatch loop owns for the lifetime of one actor. Not
/// exposed outside the crate — callers only ever see an [`super::ActorRef`].
struct Dispatch<B: Behavior, T: Transport<MailboxMessage<B::Payload>>> {
	id: ActorId,
	behavior: B,
	transport: T,
	current_lvt: Lvt,
	state: B::State,
	buffer: EventBuffer<B::Payload>,
	history: StateHistory<B::State>,
	past: PastEventLog<B::Payload>,
	last_gvt: Lvt,
}

impl<B, T> Dispatch<B, T>
where
	B: Behavior,
	T: Transport<MailboxMessage<B::Payload>, Receiver = mpsc::Receiver<MailboxMessage<B::Payload>>>,
{
	/// Runs the dispatch loop to completion, returning the actor's exit reason.
	async fn run(mut self, mailbox_rx: &mut T::Receiver, config: &KernelConfig) -> ExitReason {
		loop {
			if self.buffer.is_empty() {
				let alive = mailbox::drain(mailbox_rx, config.initial_drain_timeout, &mut self.buffer).await;
				if !alive {
					self.behavior.terminate(self.state.clone()).await;
					return ExitReason::Stopped("transport mailbox closed".to_string());
				}
				if self.buffer.is_empty() {
					if let Err(reason) = self.tick_tock().await {
						self.behavior.terminate(self.state.clone()).await;
						return ExitReason::Failed(KernelError::HandlerFailure(reason));
					}
				}
				continue;
			}

			let head_payload_kind = self.buffer.peek_head().expect("buffer non-empty").payload_kind_for_log();
			debug!(actor = %self.id, lvt = %self.current_lvt, head = head_payload_kind, "dispatch tick");

			match self.dispatch_one().await {
				Loop::Continue => continue,
				Loop::Exit(reason) => return reason,
			}
		}
	}

	async fn tick_tock(&mut self) -> Result<(), String> {
		let (next_lvt, next_state) = catch_panic(self.behavior.tick_tock(self.current_lvt, self.state.clone())).await?;
		self
			.history
			.append(next_lvt, next_state.clone())
			.map_err(|e| format!("tick_tock produced an invalid history append: {e}"))?;
		self.current_lvt = next_lvt;
		self.state = next_state;
		Ok(())
	}

	async fn dispatch_one(&mut self) -> Loop {
		let head = self.buffer.peek_head().expect("buffer non-empty");
		let is_stop = matches!(head.payload, Payload::Stop(_));
		let gvt_value = match head.payload {
			Payload::GvtUpdate(g) => Some(g),
			_ => None,
		};
		let is_straggler = !is_stop && gvt_value.is_none() && head.lvt < self.current_lvt;
		let is_anti_event = !is_stop && gvt_value.is_none() && !is_straggler && !head.is_event;

		if is_stop {
			self.handle_stop().await
		} else if let Some(gvt) = gvt_value {
			self.handle_gvt_update(gvt).await
		} else if is_straggler {
			self.handle_straggler().await
		} else if is_anti_event {
			self.handle_annihilation()
		} else {
			self.handle_apply().await
		}
	}

	async fn handle_stop(&mut self) -> Loop {
		let event = self.buffer.pop_head().expect("head checked above");
		let reason = match event.payload {
			Payload::Stop(reason) => reason,
			_ => unreachable!("matched on Stop above"),
		};
		info!(actor = %self.id, %reason, "actor stopping");
		self.behavior.terminate(self.state.clone()).await;
		Loop::Exit(ExitReason::Stopped(reason))
	}

	async fn handle_gvt_update(&mut self, gvt: Lvt) -> Loop {
		if gvt < self.last_gvt {
			debug!(actor = %self.id, %gvt, last_gvt = %self.last_gvt, "dropping stale gvt update");
			self.buffer.pop_head();
			return Loop::Continue;
		}

		let head_lvt = self.buffer.peek_head().expect("head checked above").lvt;
		if self.current_lvt >= head_lvt {
			self.history.truncate_below(gvt);
			self.past.truncate_below(gvt);
			self.last_gvt = gvt;
			self.buffer.pop_head();
			self.behavior.on_fossil_collect(gvt);
			debug!(actor = %self.id, %gvt, "fossil collection complete");
			return Loop::Continue;
		}

		// Not yet actionable: the actor hasn't reached the announced floor. Advance
		// spontaneously, same as the idle-advance rule, without consuming the event.
		if let Err(reason) = self.tick_tock().await {
			self.behavior.terminate(self.state.clone()).await;
			return Loop::Exit(ExitReason::Failed(KernelError::HandlerFailure(reason)));
		}
		Loop::Continue
	}

	async fn handle_straggler(&mut self) -> Loop {
		let target = self.buffer.peek_head().expect("head checked above").lvt;
		let (outcome, new_past) = rollback(target, std::mem::take(&mut self.past));
		self.past = new_past;

		info!(actor = %self.id, %target, replayed = outcome.to_replay.len(), cancelled = outcome.to_cancel.len(), "straggler rollback");

		self.emit_anti_events(outcome.to_cancel).await;
		self.buffer.extend(outcome.to_replay);
		self.history.rollback_before(target);
		self.current_lvt = target;
		self.state = self.history.head_state().clone();
		Loop::Continue
	}

	fn handle_annihilation(&mut self) -> Loop {
		let head = self.buffer.peek_head().expect("head checked above");
		let id = head.id;
		let removed = self.buffer.remove_by_id(&id);
		debug!(actor = %self.id, event = %id, annihilated = removed.len(), "anti-event annihilation");
		Loop::Continue
	}

	async fn handle_apply(&mut self) -> Loop {
		let event = self.buffer.pop_head().expect("head checked above");
		let event_lvt = event.lvt;
		let payload = match &event.payload {
			Payload::User(p) => p.clone(),
			_ => unreachable!("matched on User above"),
		};

		match catch_panic(self.behavior.handle_event(self.current_lvt, event_lvt, payload, self.state.clone())).await {
			Ok(Ok((new_state, effects))) => {
				if let Err(e) = self.history.append(event_lvt, new_state.clone()) {
					return self.invariant_violation(e);
				}
				self.current_lvt = event_lvt;
				self.state = new_state;
				self.past.push(event);
				self.apply_causal_effects(event_lvt, effects).await;
				Loop::Continue
			}
			Ok(Err(reason)) | Err(reason) => self.handler_failed(reason).await,
		}
	}

	/// Sends each causal effect's child event to its target and records a
	/// shadow entry in our own past log so a future rollback past
	/// `trigger_lvt` knows to un-send it (see the dispatch loop's apply rule).
	///
	/// The shadow entry is *not* the same event the target receives: the
	/// wire copy carries `link = Some(self.id)` (this actor is the child
	/// event's causal origin, same convention as any other linked event a
	/// peer receives from us), but our own copy needs `link = Some(target)`
	/// so that if we roll back past `trigger_lvt`, our rollback partitioning
	/// knows to send the anti-event to the target rather than to ourselves.
	async fn apply_causal_effects(&mut self, trigger_lvt: Lvt, mut effects: Vec<CausalEffect<B::Payload>>) {
		effects.sort_by_key(|effect| effect.lvt);
		for effect in effects {
			if effect.lvt < trigger_lvt {
				warn!(actor = %self.id, effect_lvt = %effect.lvt, %trigger_lvt, "causal effect lvt precedes its trigger, dropping");
				continue;
			}
			let child = Event::new_linked(self.id, effect.lvt, effect.payload);
			let mut shadow = child.clone();
			shadow.link = Some(effect.target);
			if let Err(e) = self.transport.send(&effect.target, MailboxMessage::one(child)).await {
				warn!(actor = %self.id, target = %effect.target, error = %e, "failed to deliver causal effect");
			}
			self.past.push(shadow);
		}
	}

	async fn handler_failed(&mut self, reason: String) -> Loop {
		warn!(actor = %self.id, %reason, "handler failed, rolling back to last gvt");
		let (outcome, new_past) = rollback(self.last_gvt, std::mem::take(&mut self.past));
		self.past = new_past;
		self.emit_anti_events(outcome.to_cancel).await;
		self.history.rollback_before(self.last_gvt);
		self.state = self.history.head_state().clone();
		self.behavior.terminate(self.state.clone()).await;
		Loop::Exit(ExitReason::Failed(KernelError::HandlerFailure(reason)))
	}

	/// A kernel-internal invariant was violated — always a bug, never a
	/// consequence of user input. Logs at error level, then panics in debug
	/// builds (so the bug surfaces immediately in development) and exits
	/// the actor with `ExitReason::Failed` in release builds (so a host
	/// running under `panic = "abort"` or without debug assertions degrades
	/// to a clean actor failure instead of taking the process down).
	fn invariant_violation(&self, err: KernelError) -> Loop {
		error!(actor = %self.id, error = %err, "kernel invariant violated");
		if cfg!(debug_assertions) {
			panic!("kernel invariant violated: {err}");
		}
		Loop::Exit(ExitReason::Failed(err))
	}

	async fn emit_anti_events(&self, cancelled: Vec<Event<B::Payload>>) {
		for event in cancelled {
			let Some(origin) = event.link else {
				continue;
			};
			let anti = event.antievent();
			if let Err(e) = self.transport.send(&origin, MailboxMessage::one(anti)).await {
				warn!(actor = %self.id, target = %origin, error = %e, "failed to deliver anti-event");
			}
		}
	}
}

enum Loop {
	Continue,
	Exit(ExitReason),
}

impl<P> Event<P> {
	fn payload_kind_for_log(&self) -> &'static str {
		match &self.payload {
			Payload::Stop(_) => "stop",
			Payload::GvtUpdate(_) => "gvt_update",
			Payload::User(_) if self.is_event => "event",
			Payload::User(_) => "anti_event",
		}
	}
}

/// Entry point spawned as a detached `tokio::task` by [`super::handle::spawn`].
#[instrument(skip_all, fields(actor = %id))]
pub(crate) async fn run<B, T>(
	id: ActorId,
	mut behavior: B,
	transport: T,
	mut mailbox_rx: T::Receiver,
	config: KernelConfig,
	arg: B::InitArg,
	ready_tx: oneshot::Sender<Result<(), KernelError>>,
	exit_tx: Option<oneshot::Sender<ExitReason>>,
) where
	B: Behavior,
	T: Transport<MailboxMessage<B::Payload>, Receiver = mpsc::Receiver<MailboxMessage<B::Payload>>>,
{
	let state = match catch_panic(behavior.init(arg)).await {
		Ok(Ok(state)) => state,
		Ok(Err(reason)) | Err(reason) => {
			let _ = ready_tx.send(Err(KernelError::InitFailure(reason)));
			return;
		}
	};

	if ready_tx.send(Ok(())).is_err() {
		// Spawner dropped the ready channel; no one is waiting on us, but we still
		// run so any peer already holding an ActorRef can reach us.
		debug!(actor = %id, "spawner gone before init acknowledgement");
	}

	info!(actor = %id, "actor started");

	let dispatch = Dispatch {
		id,
		behavior,
		transport,
		current_lvt: Lvt::ZERO,
		state: state.clone(),
		buffer: EventBuffer::new(),
		history: StateHistory::new(Lvt::ZERO, state),
		past: PastEventLog::new(),
		last_gvt: Lvt::ZERO,
	};

	let exit_reason = dispatch.run(&mut mailbox_rx, &config).await;
	info!(actor = %id, exit = %exit_reason, "actor terminated");

	if let Some(exit_tx) = exit_tx {
		let _ = exit_tx.send(exit_reason);
	}
}
