use std::fmt;
use uuid::Uuid;

/// Opaque address of a mailbox within a [`crate::Transport`].
///
/// `ActorId` doubles as the wire-level identity TW-actors use to address one
/// another (the `link` field on an event), so it lives here rather than in
/// the kernel crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(Uuid);

impl ActorId {
	/// Generate a fresh, random actor id.
	#[must_use]
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}

	#[must_use]
	pub fn as_uuid(&self) -> Uuid {
		self.0
	}
}

impl Default for ActorId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for ActorId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
