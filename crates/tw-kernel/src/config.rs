use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Tunables for an actor's mailbox and idle-time behavior. Overridable via
/// environment variables when a host binary parses this with `clap`.
#[derive(Parser, Clone, Debug, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct KernelConfig {
	/// Capacity of the bounded mpsc channel backing each actor's mailbox.
	#[arg(long, env = "TW_MAILBOX_CAPACITY", default_value = "256")]
	pub mailbox_capacity: usize,

	/// How long the dispatch loop waits for the first message of a drain
	/// before giving up and falling back to `tick_tock`.
	#[arg(
        long,
        env = "TW_INITIAL_DRAIN_TIMEOUT_MS",
        default_value = "50",
        value_parser = parse_millis,
    )]
	pub initial_drain_timeout: Duration,

	/// Upper bound a `Behavior::tick_tock` implementation is expected to
	/// respect between idle advances; purely advisory, the kernel does not
	/// enforce it, but exposes it so behaviors can self-throttle.
	#[arg(
        long,
        env = "TW_MAX_IDLE_TICK_MS",
        default_value = "1000",
        value_parser = parse_millis,
    )]
	pub max_idle_tick: Duration,
}

impl KernelConfig {
	#[must_use]
	pub fn new() -> Self {
		Self::parse()
	}
}

impl Default for KernelConfig {
	fn default() -> Self {
		Self {
			mailbox_capacity: 256,
			initial_drain_timeout: Duration::from_millis(50),
			max_idle_tick: Duration::from_millis(1000),
		}
	}
}

#[cfg(test)]
impl KernelConfig {
	/// Fast-converging config for tests: tiny timeouts so scenarios reach
	/// quiescence quickly instead of waiting on production-sized windows.
	#[must_use]
	pub fn test() -> Self {
		Self {
			mailbox_capacity: 64,
			initial_drain_timeout: Duration::from_millis(5),
			max_idle_tick: Duration::from_millis(10),
		}
	}
}

fn parse_millis(s: &str) -> Result<Duration, std::num::ParseIntError> {
	s.parse::<u64>().map(Duration::from_millis)
}
