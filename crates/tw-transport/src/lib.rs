//! Transport abstraction consumed by the Time Warp kernel.
//!
//! The kernel never talks to a concrete networking stack directly — it
//! depends on the [`Transport`] trait so an in-process simulation, a NATS
//! deployment, or a test harness can all stand in. This crate ships the
//! trait, a few shared mpsc receive helpers, and one concrete
//! implementation, [`InMemTransport`].

mod actor_id;
mod error;
mod inmem;
mod recv;
mod traits;

pub use actor_id::ActorId;
pub use error::{Result, TransportError};
pub use inmem::InMemTransport;
pub use recv::{ReceiverExt, RecvOutcome};
pub use traits::Transport;
