use tokio::sync::{mpsc, oneshot};
use tw_transport::{ActorId, Transport};

use super::dispatch;
use crate::behavior::Behavior;
use crate::config::KernelConfig;
use crate::error::{ExitReason, KernelError, Result};
use crate::event::Event;
use crate::mailbox::MailboxMessage;
use crate::time::Lvt;

/// A cheap, `Clone`-able reference to a running TW-actor: its id plus the
/// transport used to reach it. Dropping every `ActorRef` does not stop the
/// actor — only a `Stop` event or the mailbox's sender side being dropped does.
pub struct ActorRef<P, T: Transport<MailboxMessage<P>>> {
	id: ActorId,
	transport: T,
	_payload: std::marker::PhantomData<fn(P)>,
}

impl<P, T: Transport<MailboxMessage<P>>> Clone for ActorRef<P, T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			transport: self.transport.clone(),
			_payload: std::marker::PhantomData,
		}
	}
}

impl<P, T> ActorRef<P, T>
where
	P: Send + 'static,
	T: Transport<MailboxMessage<P>>,
{
	fn new(id: ActorId, transport: T) -> Self {
		Self {
			id,
			transport,
			_payload: std::marker::PhantomData,
		}
	}

	/// This actor's id.
	#[must_use]
	pub fn id(&self) -> ActorId {
		self.id
	}

	/// Delivers one or many events as a single transport message.
	pub async fn notify(&self, events: impl Into<MailboxMessage<P>>) -> Result<()> {
		self.transport.send(&self.id, events.into()).await.map_err(KernelError::from)
	}

	/// Enqueues a `Stop` event, honoured the next time it reaches the dispatch
	/// loop's head (bypassing normal lvt ordering).
	pub async fn stop(&self, reason: impl Into<String>) -> Result<()> {
		self.notify(Event::stop(reason)).await
	}

	/// Enqueues a `GvtUpdate` carrying the newly observed GVT.
	pub async fn gvt(&self, t: Lvt) -> Result<()> {
		self.notify(Event::gvt_update(t)).await
	}
}

impl<P> From<Event<P>> for MailboxMessage<P> {
	fn from(event: Event<P>) -> Self {
		MailboxMessage::one(event)
	}
}

impl<P> From<Vec<Event<P>>> for MailboxMessage<P> {
	fn from(events: Vec<Event<P>>) -> Self {
		MailboxMessage::many(events)
	}
}

/// A linked actor's terminal exit reason, delivered once the actor's
/// dispatch loop returns. Mirrors this codebase's linked-actor pattern for
/// failure propagation, but over a plain `oneshot` rather than a supervision
/// tree.
pub struct ExitWatch {
	rx: oneshot::Receiver<ExitReason>,
}

impl ExitWatch {
	fn new(rx: oneshot::Receiver<ExitReason>) -> Self {
		Self { rx }
	}

	/// Waits for the actor to terminate. Resolves to `ExitReason::Failed` with
	/// an `InvariantViolation` if the actor task was dropped without sending
	/// its exit reason (should not happen outside a panic that unwinds past
	/// the dispatch loop's own panic boundary).
	pub async fn wait(self) -> ExitReason {
		self.rx.await.unwrap_or_else(|_| ExitReason::Failed(KernelError::InvariantViolation("actor task ended without reporting an exit reason".to_string())))
	}
}

/// Starts a TW-actor's dispatch loop as a detached `tokio::task` and returns
/// its handle once `init` has acknowledged readiness (or failed).
pub async fn spawn<B, T>(transport: T, behavior: B, arg: B::InitArg, config: KernelConfig) -> Result<ActorRef<B::Payload, T>>
where
	B: Behavior,
	T: Transport<MailboxMessage<B::Payload>, Receiver = mpsc::Receiver<MailboxMessage<B::Payload>>>,
{
	let (actor_ref, _watch) = spawn_inner(transport, behavior, arg, config, false).await?;
	Ok(actor_ref)
}

/// Like [`spawn`], but additionally returns an [`ExitWatch`] that resolves
/// once the actor terminates, for failure propagation back to the caller.
pub async fn spawn_linked<B, T>(transport: T, behavior: B, arg: B::InitArg, config: KernelConfig) -> Result<(ActorRef<B::Payload, T>, ExitWatch)>
where
	B: Behavior,
	T: Transport<MailboxMessage<B::Payload>, Receiver = mpsc::Receiver<MailboxMessage<B::Payload>>>,
{
	let (actor_ref, watch) = spawn_inner(transport, behavior, arg, config, true).await?;
	Ok((actor_ref, watch.expect("spawn_inner(linked=true) always returns a watch")))
}

async fn spawn_inner<B, T>(transport: T, behavior: B, arg: B::InitArg, config: KernelConfig, linked: bool) -> Result<(ActorRef<B::Payload, T>, Option<ExitWatch>)>
where
	B: Behavior,
	T: Transport<MailboxMessage<B::Payload>, Receiver = mpsc::Receiver<MailboxMessage<B::Payload>>>,
{
	let id = ActorId::new();
	let mailbox_rx = transport.open_mailbox(id);
	let (ready_tx, ready_rx) = oneshot::channel();
	let (exit_tx, exit_rx) = if linked {
		let (tx, rx) = oneshot::channel();
		(Some(tx), Some(rx))
	} else {
		(None, None)
	};

	let dispatch_transport = transport.clone();
	tokio::spawn(dispatch::run(id, behavior, dispatch_transport, mailbox_rx, config, arg, ready_tx, exit_tx));

	match ready_rx.await {
		Ok(Ok(())) => Ok((ActorRef::new(id, transport), exit_rx.map(ExitWatch::new))),
		Ok(Err(err)) => Err(err),
		Err(_) => Err(KernelError::InitFailure("actor task ended before signalling readiness".to_string())),
	}
}
