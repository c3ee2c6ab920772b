//! Type-erased cell handles
//!
//! Flat-mapping and list joins need to hold cells of differing
//! concrete kinds behind one type; these handles erase the kind
//! while keeping the underlying cell's identity.

// Imports
use {
	crate::{
		CellId, Listener, MutableObservable, Observable, Value,
		dependent::WeakDependent,
		subscription::Subscription,
	},
	core::{
		fmt,
		hash::{Hash, Hasher},
	},
	std::sync::Arc,
};

/// A cheap, cloneable, type-erased handle to any observable cell.
///
/// Equality and hashing follow the underlying cell's identity,
/// which is what flat-mapping uses to detect delegate switches.
pub struct SharedObservable<T: Value> {
	/// Inner
	inner: Arc<dyn Observable<T>>,
}

impl<T: Value> SharedObservable<T> {
	/// Wraps a cell handle
	#[must_use]
	pub fn new<O: Observable<T>>(observable: O) -> Self {
		Self {
			inner: Arc::new(observable),
		}
	}
}

impl<T: Value> Observable<T> for SharedObservable<T> {
	fn value(&self) -> T {
		self.inner.value()
	}

	fn on_change_boxed(&self, listener: Listener<T>) -> Subscription {
		self.inner.on_change_boxed(listener)
	}

	fn add_dependent(&self, dependent: WeakDependent) {
		self.inner.add_dependent(dependent);
	}

	fn notify_change(&self) {
		self.inner.notify_change();
	}

	fn id(&self) -> CellId {
		self.inner.id()
	}
}

impl<T: Value> Clone for SharedObservable<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T: Value> PartialEq for SharedObservable<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T: Value> Eq for SharedObservable<T> {}

impl<T: Value> Hash for SharedObservable<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl<T: Value> fmt::Debug for SharedObservable<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SharedObservable")
			.field("id", &self.id())
			.finish_non_exhaustive()
	}
}

/// A cheap, cloneable, type-erased handle to any mutable observable cell
pub struct SharedMutableObservable<T: Value> {
	/// Inner
	inner: Arc<dyn MutableObservable<T>>,
}

impl<T: Value> SharedMutableObservable<T> {
	/// Wraps a cell handle
	#[must_use]
	pub fn new<O: MutableObservable<T>>(observable: O) -> Self {
		Self {
			inner: Arc::new(observable),
		}
	}
}

impl<T: Value> Observable<T> for SharedMutableObservable<T> {
	fn value(&self) -> T {
		self.inner.value()
	}

	fn on_change_boxed(&self, listener: Listener<T>) -> Subscription {
		self.inner.on_change_boxed(listener)
	}

	fn add_dependent(&self, dependent: WeakDependent) {
		self.inner.add_dependent(dependent);
	}

	fn notify_change(&self) {
		self.inner.notify_change();
	}

	fn id(&self) -> CellId {
		self.inner.id()
	}
}

impl<T: Value> MutableObservable<T> for SharedMutableObservable<T> {
	fn set(&self, value: T) {
		self.inner.set(value);
	}
}

impl<T: Value> Clone for SharedMutableObservable<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T: Value> PartialEq for SharedMutableObservable<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T: Value> Eq for SharedMutableObservable<T> {}

impl<T: Value> Hash for SharedMutableObservable<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl<T: Value> fmt::Debug for SharedMutableObservable<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SharedMutableObservable")
			.field("id", &self.id())
			.finish_non_exhaustive()
	}
}
