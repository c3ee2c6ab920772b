//! Latch
//!
//! A one-shot gate that starts closed and can be opened
//! exactly once, releasing all waiting threads.

// Imports
use parking_lot::{Condvar, Mutex};

/// Latch
///
/// Waiters block until [`open`](Self::open) is called; once
/// open, the latch stays open and waits return immediately.
pub struct Latch {
	/// Whether the latch is open
	open: Mutex<bool>,

	/// Waiter condition
	cond: Condvar,
}

impl Latch {
	/// Creates a new, closed latch
	#[must_use]
	pub const fn new() -> Self {
		Self {
			open: Mutex::new(false),
			cond: Condvar::new(),
		}
	}

	/// Opens the latch, waking all waiters.
	///
	/// Opening an already-open latch is a no-op.
	pub fn open(&self) {
		let mut open = self.open.lock();
		*open = true;
		self.cond.notify_all();
	}

	/// Blocks until the latch is open
	pub fn wait(&self) {
		let mut open = self.open.lock();
		while !*open {
			self.cond.wait(&mut open);
		}
	}

	/// Returns whether the latch is open
	#[must_use]
	pub fn is_open(&self) -> bool {
		*self.open.lock()
	}
}

impl Default for Latch {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	// Imports
	use {super::*, std::sync::Arc, std::thread};

	#[test]
	fn open_releases_waiters() {
		let latch = Arc::new(Latch::new());
		assert!(!latch.is_open(), "Latch was open before `open`");

		let waiter = thread::spawn({
			let latch = Arc::clone(&latch);
			move || latch.wait()
		});

		latch.open();
		waiter.join().expect("Waiter panicked");
		assert!(latch.is_open(), "Latch wasn't open after `open`");
	}

	#[test]
	fn wait_after_open_returns() {
		let latch = Latch::new();
		latch.open();
		latch.open();
		latch.wait();
	}
}
