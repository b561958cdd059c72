pub mod dispatch;
pub mod handle;

pub use handle::{spawn, spawn_linked, ActorRef, ExitWatch};
