//! Source cells
//!
//! A source cell is a mutable value written directly by callers;
//! it is where every notification walk originates.

// Imports
use {
	crate::{
		CellId, Listener, MutableObservable, Observable, Value,
		base::ObservableBase,
		dependent::WeakDependent,
		subscription::Subscription,
	},
	core::fmt,
	parking_lot::Mutex,
	std::sync::Arc,
};

/// Inner
struct Inner<T> {
	/// Value
	value: Mutex<T>,

	/// Base
	base: ObservableBase<T>,
}

/// Source cell
///
/// Writing an equal value is a complete no-op; writing a different
/// one stores it and walks dependents and listeners synchronously
/// before the write returns. Concurrent writes to the same cell
/// serialize; writes to unrelated cells propagate concurrently.
pub struct Source<T: Value> {
	/// Inner
	inner: Arc<Inner<T>>,
}

impl<T: Value> Source<T> {
	/// Creates a new source cell
	#[must_use]
	pub fn new(value: T) -> Self {
		let inner = Inner {
			value: Mutex::new(value),
			base:  ObservableBase::new(),
		};
		Self { inner: Arc::new(inner) }
	}
}

impl<T: Value> Observable<T> for Source<T> {
	fn value(&self) -> T {
		self.inner.value.lock().clone()
	}

	fn on_change_boxed(&self, listener: Listener<T>) -> Subscription {
		self.inner.base.subscribe(listener)
	}

	fn add_dependent(&self, dependent: WeakDependent) {
		self.inner.base.add_dependent(dependent);
	}

	fn notify_change(&self) {
		let inner = &self.inner;
		inner.base.notify_if_changed(|| Some(inner.value.lock().clone()));
	}

	fn id(&self) -> CellId {
		CellId::of(&self.inner)
	}
}

impl<T: Value> MutableObservable<T> for Source<T> {
	fn set(&self, value: T) {
		let inner = &self.inner;
		inner.base.notify_if_changed(|| {
			let mut current = inner.value.lock();
			if *current == value {
				return None;
			}
			*current = value.clone();
			drop(current);

			Some(value)
		});
	}
}

impl<T: Value> Clone for Source<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T: Value> PartialEq for Source<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T: Value> Eq for Source<T> {}

impl<T: Value + fmt::Debug> fmt::Debug for Source<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Source")
			.field("value", &*self.inner.value.lock())
			.finish_non_exhaustive()
	}
}
