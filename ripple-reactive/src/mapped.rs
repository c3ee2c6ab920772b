//! Mapped cells
//!
//! A mapped cell derives its value from one or more upstream cells
//! through a pure recompute function. The value is memoized; an
//! upstream notification recomputes it, but the walk only continues
//! past this cell when the recomputed value actually differs.

// Imports
use {
	crate::{
		CellId, Listener, Observable, Value,
		base::ObservableBase,
		dependent::{Dependent, WeakDependent},
		shared::SharedObservable,
		subscription::Subscription,
	},
	core::fmt,
	parking_lot::Mutex,
	std::sync::{Arc, Weak},
};

/// Inner
pub(crate) struct Inner<T> {
	/// Recompute function
	getter: Box<dyn Fn() -> T + Send + Sync>,

	/// Cached value, `None` until first computed
	cached: Mutex<Option<T>>,

	/// Base
	base: ObservableBase<T>,
}

impl<T: Value> Inner<T> {
	/// Reads the cached value, computing it on first read
	fn value(&self) -> T {
		let mut cached = self.cached.lock();
		match &*cached {
			Some(value) => value.clone(),
			None => {
				let value = (self.getter)();
				*cached = Some(value.clone());
				value
			},
		}
	}
}

impl<T: Value> Dependent for Inner<T> {
	fn notify_change(&self) {
		self.base.notify_if_changed(|| {
			let value = (self.getter)();

			// A first computation establishes the baseline; only a value
			// differing from a previously-cached one continues the walk.
			let mut cached = self.cached.lock();
			let changed = cached.as_ref().is_some_and(|cached| *cached != value);
			*cached = Some(value.clone());
			drop(cached);

			if !changed {
				tracing::trace!("Recomputed value unchanged, stopping walk");
			}
			changed.then_some(value)
		});
	}
}

/// Mapped cell
pub struct Mapped<T: Value> {
	/// Inner
	inner: Arc<Inner<T>>,
}

impl<T: Value> Mapped<T> {
	/// Creates a new mapped cell from its recompute function.
	///
	/// The function is opaque, so the caller must register the cell
	/// as a dependent of every upstream the function reads.
	pub(crate) fn new<F>(getter: F) -> Self
	where
		F: Fn() -> T + Send + Sync + 'static,
	{
		let inner = Inner {
			getter: Box::new(getter),
			cached: Mutex::new(None),
			base:   ObservableBase::new(),
		};
		Self { inner: Arc::new(inner) }
	}

	/// Returns a weak dependent edge to this cell
	pub(crate) fn as_dependent(&self) -> WeakDependent {
		let weak = Arc::downgrade(&self.inner);
		let weak: Weak<dyn Dependent> = weak;
		WeakDependent::new(weak)
	}
}

impl<T: Value> Observable<T> for Mapped<T> {
	fn value(&self) -> T {
		self.inner.value()
	}

	fn on_change_boxed(&self, listener: Listener<T>) -> Subscription {
		self.inner.base.subscribe(listener)
	}

	fn add_dependent(&self, dependent: WeakDependent) {
		self.inner.base.add_dependent(dependent);
	}

	fn notify_change(&self) {
		Dependent::notify_change(&*self.inner);
	}

	fn id(&self) -> CellId {
		CellId::of(&self.inner)
	}
}

impl<T: Value> Clone for Mapped<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T: Value> PartialEq for Mapped<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T: Value> Eq for Mapped<T> {}

impl<T: Value + fmt::Debug> fmt::Debug for Mapped<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Mapped")
			.field("cached", &*self.inner.cached.lock())
			.finish_non_exhaustive()
	}
}

/// Joins an ordered list of cells into one derived cell over all
/// of their current values
pub fn join_all<T, U, M>(cells: &[SharedObservable<T>], f: M) -> Mapped<U>
where
	T: Value,
	U: Value,
	M: Fn(&[T]) -> U + Send + Sync + 'static,
{
	let mapped = {
		let cells = cells.to_vec();
		Mapped::new(move || {
			let values = cells.iter().map(|cell| cell.value()).collect::<Vec<_>>();
			f(&values)
		})
	};
	for cell in cells {
		cell.add_dependent(mapped.as_dependent());
	}
	mapped
}
