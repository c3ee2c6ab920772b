//! Flat-mapped cells
//!
//! A flat-mapped cell resolves its upstream value to *another cell*
//! and mirrors that delegate. The delegate pointer is explicit and
//! swapped under the cell's own lock; the old edge's listener is
//! torn down before the new one is installed, so no stale edge can
//! leak through a closure.

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

/// Currently-selected delegate
struct Delegate<T: Value> {
	/// Delegate cell
	cell: SharedObservable<T>,

	/// Subscription forwarding the delegate's notifications
	subscription: Subscription,
}

/// Inner
struct Inner<T: Value> {
	/// Delegate selection function
	getter: Box<dyn Fn() -> SharedObservable<T> + Send + Sync>,

	/// Current delegate, `None` until first resolved
	delegate: Mutex<Option<Delegate<T>>>,

	/// Self reference for delegate subscriptions
	weak_self: Weak<Inner<T>>,

	/// Base
	base: ObservableBase<T>,
}

impl<T: Value> Inner<T> {
	/// Subscribes to `cell`, forwarding its notifications to this
	/// cell's own dependents and listeners.
	///
	/// The listener only holds a weak self-reference, so the delegate's
	/// listener set never keeps this cell alive.
	fn subscribe_delegate(&self, cell: &SharedObservable<T>) -> Subscription {
		let weak = Weak::clone(&self.weak_self);
		cell.on_change_boxed(Box::new(move |_value: &T| {
			if let Some(inner) = weak.upgrade() {
				inner.forward();
			}
		}))
	}

	/// Resolves the delegate if it hasn't been yet
	fn resolve<'a>(&self, delegate: &'a mut Option<Delegate<T>>) -> &'a mut Delegate<T> {
		delegate.get_or_insert_with(|| {
			let cell = (self.getter)();
			let subscription = self.subscribe_delegate(&cell);
			Delegate { cell, subscription }
		})
	}

	/// Reads the current delegate's value
	fn value(&self) -> T {
		let cell = {
			let mut delegate = self.delegate.lock();
			self.resolve(&mut delegate).cell.clone()
		};
		cell.value()
	}

	/// Forwards the current delegate's value to dependents and listeners,
	/// without re-resolving the selection
	fn forward(&self) {
		self.base.notify_if_changed(|| Some(self.value()));
	}
}

impl<T: Value> Dependent for Inner<T> {
	fn notify_change(&self) {
		self.base.notify_if_changed(|| {
			let new_cell = (self.getter)();

			let mut delegate = self.delegate.lock();
			match &mut *delegate {
				// Same delegate: a selection that didn't change can't
				// have changed the value either.
				Some(current) if current.cell.id() == new_cell.id() => None,

				// Switch: tear the old edge down before installing the
				// new one, and notify only if the values differ.
				Some(current) => {
					let new_value = new_cell.value();
					let changed = current.cell.value() != new_value;
					tracing::trace!(old = %current.cell.id(), new = %new_cell.id(), changed, "Switching delegate");

					current.subscription.release();
					let subscription = self.subscribe_delegate(&new_cell);
					*current = Delegate {
						cell: new_cell,
						subscription,
					};

					changed.then_some(new_value)
				},

				// Not yet resolved: install and notify with the first value
				None => {
					let new_value = new_cell.value();
					let subscription = self.subscribe_delegate(&new_cell);
					*delegate = Some(Delegate {
						cell: new_cell,
						subscription,
					});

					Some(new_value)
				},
			}
		});
	}
}

impl<T: Value> Drop for Inner<T> {
	fn drop(&mut self) {
		// The delegate outlives us; leave no entry of ours in its
		// listener set.
		if let Some(delegate) = self.delegate.get_mut().take() {
			delegate.subscription.release();
		}
	}
}

/// Flat-mapped cell
pub struct FlatMapped<T: Value> {
	/// Inner
	inner: Arc<Inner<T>>,
}

impl<T: Value> FlatMapped<T> {
	/// Creates a new flat-mapped cell from its selection function.
	///
	/// The caller must register the cell as a dependent of every
	/// upstream the function reads, then call [`init`](Self::init).
	pub(crate) fn new<F>(getter: F) -> Self
	where
		F: Fn() -> SharedObservable<T> + Send + Sync + 'static,
	{
		let inner = Arc::new_cyclic(|weak_self| Inner {
			getter:    Box::new(getter),
			delegate:  Mutex::new(None),
			weak_self: Weak::clone(weak_self),
			base:      ObservableBase::new(),
		});
		Self { inner }
	}

	/// Resolves and subscribes the initial delegate
	pub(crate) fn init(&self) {
		let mut delegate = self.inner.delegate.lock();
		_ = self.inner.resolve(&mut delegate);
	}

	/// Returns a weak dependent edge to this cell
	pub(crate) fn as_dependent(&self) -> WeakDependent {
		let weak = Arc::downgrade(&self.inner);
		let weak: Weak<dyn Dependent> = weak;
		WeakDependent::new(weak)
	}
}

impl<T: Value> Observable<T> for FlatMapped<T> {
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

impl<T: Value> Clone for FlatMapped<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T: Value> PartialEq for FlatMapped<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T: Value> Eq for FlatMapped<T> {}

impl<T: Value> fmt::Debug for FlatMapped<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FlatMapped").field("id", &self.id()).finish_non_exhaustive()
	}
}
