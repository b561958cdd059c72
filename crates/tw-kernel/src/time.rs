use std::fmt;

/// Local virtual time: a monotonic, non-negative integer with no relation to
/// wall-clock time. Ordering over `Lvt` drives every scheduling decision in
/// the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Lvt(u64);

impl Lvt {
	pub const ZERO: Lvt = Lvt(0);

	#[must_use]
	pub const fn new(value: u64) -> Self {
		Self(value)
	}

	#[must_use]
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for Lvt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u64> for Lvt {
	fn from(value: u64) -> Self {
		Self(value)
	}
}
