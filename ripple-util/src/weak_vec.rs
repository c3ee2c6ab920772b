//! Weak vector
//!
//! A vector of weak references that sweeps dead entries
//! by a load-factor heuristic instead of on every mutation,
//! to amortize the cost of cleanup over many accesses.

// Imports
use std::sync::{Arc, Weak};

/// Below this many live entries, sweeping is decided by
/// the absolute size of the vector instead of the ratio.
const SMALL_SET: usize = 10;

/// Weak vector
pub struct WeakVec<T: ?Sized> {
	/// Entries
	entries: Vec<Weak<T>>,
}

impl<T: ?Sized> WeakVec<T> {
	/// Creates a new, empty vector
	#[must_use]
	pub const fn new() -> Self {
		Self { entries: vec![] }
	}

	/// Pushes a new entry
	pub fn push(&mut self, entry: Weak<T>) {
		self.entries.push(entry);
	}

	/// Upgrades all live entries.
	///
	/// Sweeps dead entries once they dominate the vector:
	/// with fewer than [`SMALL_SET`] live entries, once the total
	/// exceeds twice that; otherwise once less than half the
	/// entries are live.
	pub fn upgraded(&mut self) -> Vec<Arc<T>> {
		let live = self.entries.iter().filter_map(Weak::upgrade).collect::<Vec<_>>();

		let should_sweep = match live.len() < SMALL_SET {
			true => self.entries.len() > SMALL_SET * 2,
			false => self.entries.len() / live.len() > 2,
		};
		if should_sweep {
			self.sweep();
		}

		live
	}

	/// Removes all dead entries
	pub fn sweep(&mut self) {
		self.entries.retain(|entry| entry.strong_count() > 0);
	}

	/// Returns the number of entries, dead or alive
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether the vector has no entries
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<T: ?Sized> Default for WeakVec<T> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	// Imports
	use super::*;

	#[test]
	fn upgrades_live_entries() {
		let mut vec = WeakVec::new();
		let live = (0..3).map(Arc::new).collect::<Vec<_>>();
		for entry in &live {
			vec.push(Arc::downgrade(entry));
		}
		vec.push(Arc::downgrade(&Arc::new(100)));

		let upgraded = vec.upgraded();
		assert_eq!(upgraded.len(), 3, "Dead entry was upgraded");
		assert_eq!(vec.len(), 4, "Small vector was swept early");
	}

	#[test]
	fn sweeps_once_dead_entries_dominate() {
		let mut vec = WeakVec::new();
		let live = Arc::new(0);
		vec.push(Arc::downgrade(&live));
		for value in 0..SMALL_SET * 2 {
			vec.push(Arc::downgrade(&Arc::new(value)));
		}

		assert_eq!(vec.len(), SMALL_SET * 2 + 1);
		let upgraded = vec.upgraded();
		assert_eq!(upgraded.len(), 1, "Live entry was lost");
		assert_eq!(vec.len(), 1, "Dead entries weren't swept");
	}

	#[test]
	fn keeps_mostly_live_vectors() {
		let mut vec = WeakVec::new();
		let live = (0..SMALL_SET + 5).map(Arc::new).collect::<Vec<_>>();
		for entry in &live {
			vec.push(Arc::downgrade(entry));
		}
		for value in 0..5 {
			vec.push(Arc::downgrade(&Arc::new(value)));
		}

		// 15 live of 20 total, under the 1/2 dead ratio
		_ = vec.upgraded();
		assert_eq!(vec.len(), SMALL_SET + 10, "Mostly-live vector was swept");
	}
}
