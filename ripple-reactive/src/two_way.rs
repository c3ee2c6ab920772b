//! Two-way mapped cells
//!
//! A two-way cell reads like a mapped cell and writes through a
//! reverse mapping onto its upstream cells. A write never touches
//! the cell's own cache directly: it updates the upstreams, and
//! ordinary forward propagation recomputes the visible value.

// Imports
use {
	crate::{
		CellId, Listener, MutableObservable, Observable, Value,
		dependent::WeakDependent,
		mapped::Mapped,
		shared::SharedMutableObservable,
		subscription::Subscription,
	},
	core::fmt,
	std::sync::Arc,
};

/// Two-way mapped cell
pub struct TwoWayMapped<T: Value> {
	/// Forward cell
	mapped: Mapped<T>,

	/// Reverse write
	write: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T: Value> TwoWayMapped<T> {
	/// Creates a new two-way cell over an already-registered forward cell
	pub(crate) fn new<W>(mapped: Mapped<T>, write: W) -> Self
	where
		W: Fn(T) + Send + Sync + 'static,
	{
		Self {
			mapped,
			write: Arc::new(write),
		}
	}
}

impl<T: Value> Observable<T> for TwoWayMapped<T> {
	fn value(&self) -> T {
		self.mapped.value()
	}

	fn on_change_boxed(&self, listener: Listener<T>) -> Subscription {
		self.mapped.on_change_boxed(listener)
	}

	fn add_dependent(&self, dependent: WeakDependent) {
		self.mapped.add_dependent(dependent);
	}

	fn notify_change(&self) {
		self.mapped.notify_change();
	}

	fn id(&self) -> CellId {
		self.mapped.id()
	}
}

impl<T: Value> MutableObservable<T> for TwoWayMapped<T> {
	fn set(&self, value: T) {
		(self.write)(value);
	}
}

impl<T: Value> Clone for TwoWayMapped<T> {
	fn clone(&self) -> Self {
		Self {
			mapped: self.mapped.clone(),
			write:  Arc::clone(&self.write),
		}
	}
}

impl<T: Value> PartialEq for TwoWayMapped<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T: Value> Eq for TwoWayMapped<T> {}

impl<T: Value + fmt::Debug> fmt::Debug for TwoWayMapped<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TwoWayMapped").field("forward", &self.mapped).finish_non_exhaustive()
	}
}

/// Joins an ordered list of mutable cells two-ways.
///
/// The reverse mapping turns an aggregate into one value per joined
/// cell, applied positionally.
///
/// # Panics
/// Writing panics if the reverse mapping doesn't produce exactly one
/// value per cell.
pub fn two_way_join_all<T, U, M, R>(
	cells: &[SharedMutableObservable<T>],
	forward: M,
	reverse: R,
) -> TwoWayMapped<U>
where
	T: Value,
	U: Value,
	M: Fn(&[T]) -> U + Send + Sync + 'static,
	R: Fn(U) -> Vec<T> + Send + Sync + 'static,
{
	let mapped = {
		let cells = cells.to_vec();
		Mapped::new(move || {
			let values = cells.iter().map(|cell| cell.value()).collect::<Vec<_>>();
			forward(&values)
		})
	};
	for cell in cells {
		cell.add_dependent(mapped.as_dependent());
	}

	let write = {
		let cells = cells.to_vec();
		move |value: U| {
			let values = reverse(value);
			assert_eq!(
				values.len(),
				cells.len(),
				"Reverse mapping must produce one value per joined cell"
			);
			for (cell, value) in cells.iter().zip(values) {
				cell.set(value);
			}
		}
	};
	TwoWayMapped::new(mapped, write)
}
