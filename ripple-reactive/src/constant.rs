//! Constant cells

// Imports
use {
	crate::{
		CellId, Listener, Observable, Value,
		dependent::WeakDependent,
		subscription::Subscription,
	},
	core::fmt,
	std::sync::Arc,
};

/// Inner
struct Inner<T> {
	/// Value
	value: T,
}

/// Constant cell
///
/// Never changes: listeners never fire and dependent edges are
/// discarded, so deriving from a constant is free.
pub struct Constant<T: Value> {
	/// Inner
	inner: Arc<Inner<T>>,
}

impl<T: Value> Constant<T> {
	/// Creates a new constant cell
	#[must_use]
	pub fn new(value: T) -> Self {
		let inner = Inner { value };
		Self { inner: Arc::new(inner) }
	}
}

impl<T: Value> Observable<T> for Constant<T> {
	fn value(&self) -> T {
		self.inner.value.clone()
	}

	fn on_change_boxed(&self, _listener: Listener<T>) -> Subscription {
		Subscription::inert()
	}

	fn add_dependent(&self, _dependent: WeakDependent) {}

	fn notify_change(&self) {}

	fn id(&self) -> CellId {
		CellId::of(&self.inner)
	}
}

impl<T: Value> Clone for Constant<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T: Value + fmt::Debug> fmt::Debug for Constant<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Constant").field("value", &self.inner.value).finish()
	}
}
