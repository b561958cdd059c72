//! Jefferson Time Warp optimistic discrete-event simulation kernel for a
//! single actor: virtual-time dispatch, rollback-on-straggler, anti-event
//! cancellation, and GVT-driven fossil collection, built on top of a pluggable
//! [`tw_transport::Transport`].

pub mod actor;
mod behavior;
mod buffer;
mod config;
mod error;
mod event;
mod history;
mod mailbox;
mod past_log;
mod rollback;
mod time;

pub use actor::{spawn, spawn_linked, ActorRef, ExitWatch};
pub use behavior::{Behavior, CausalEffect};
pub use config::KernelConfig;
pub use error::{ExitReason, KernelError, Result};
pub use event::{Event, EventId, Payload};
pub use mailbox::MailboxMessage;
pub use time::Lvt;

pub use tw_transport::{ActorId, InMemTransport, Transport, TransportError};
