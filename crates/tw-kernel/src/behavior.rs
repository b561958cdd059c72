use tw_transport::ActorId;

use crate::time::Lvt;

/// A causal side effect of `handle_event`: a child event the behavior wants
/// delivered to another actor. The kernel records a matching shadow entry in
/// this actor's own past-event log (linked to `target`) so that a later
/// rollback past `lvt` knows to emit a real anti-event to `target` — the
/// behavior itself never talks to the transport directly.
#[derive(Debug, Clone)]
pub struct CausalEffect<P> {
	pub target: ActorId,
	pub lvt: Lvt,
	pub payload: P,
}

impl<P> CausalEffect<P> {
	#[must_use]
	pub fn new(target: ActorId, lvt: Lvt, payload: P) -> Self {
		Self { target, lvt, payload }
	}
}

/// The user-supplied behavior module. The kernel never inspects `State` or
/// `Payload` beyond moving them around and feeding them back through these
/// four operations — this is the only place the kernel executes user code.
#[async_trait::async_trait]
pub trait Behavior: Send + 'static {
	/// Opaque application payload carried by regular events.
	type Payload: Send + Clone + 'static;
	/// Opaque application state snapshot the kernel saves and restores.
	type State: Clone + Send + 'static;
	/// Argument passed to `init` when the actor is spawned.
	type InitArg: Send + 'static;

	/// Builds the initial state at `lvt = 0`. An error fails the spawn.
	async fn init(&mut self, arg: Self::InitArg) -> Result<Self::State, String>;

	/// Applies a regular event. `current_lvt` is the actor's LVT before the
	/// event; `event_lvt` is the event's own lvt (the new LVT on success).
	/// Besides the new state, a handler may return causal effects: events it
	/// wants delivered to other actors as a consequence of this one, which
	/// the kernel will later un-send via anti-event if this event is ever
	/// rolled back.
	async fn handle_event(&mut self, current_lvt: Lvt, event_lvt: Lvt, payload: Self::Payload, state: Self::State) -> Result<(Self::State, Vec<CausalEffect<Self::Payload>>), String>;

	/// Spontaneously advances virtual time when the actor is idle.
	/// `next_lvt` must be `>= current_lvt`.
	async fn tick_tock(&mut self, current_lvt: Lvt, state: Self::State) -> (Lvt, Self::State);

	/// Best-effort cleanup once a `Stop` event is honoured or the actor fails.
	async fn terminate(&mut self, state: Self::State);

	/// Called with the new retained-lvt floor whenever fossil collection
	/// prunes state history and past events below a GVT. Default is a no-op;
	/// a host can override this to drive its own allocator/arena reset, since
	/// the kernel itself has no equivalent of a forced generational GC to
	/// request from the runtime.
	fn on_fossil_collect(&mut self, _floor: Lvt) {}
}

/// Runs a user callback future, converting a panic into `Err(reason)` so a
/// misbehaving `Behavior` implementation cannot take the dispatch loop down
/// with it. This is the only place the kernel treats user code as possibly
/// throwing.
pub(crate) async fn catch_panic<T>(fut: impl std::future::Future<Output = T>) -> Result<T, String> {
	use futures::FutureExt;
	std::panic::AssertUnwindSafe(fut).catch_unwind().await.map_err(|panic| {
		panic
			.downcast_ref::<&str>()
			.map(|s| (*s).to_string())
			.or_else(|| panic.downcast_ref::<String>().cloned())
			.unwrap_or_else(|| "behavior callback panicked".to_string())
	})
}
