//! Store-backed cells
//!
//! A store cell is a mutable observable whose value is loaded from
//! and persisted to a durable key-value backend. Loading happens on
//! a background thread; reads block until the first value arrived,
//! so the cell always yields a real value. Writes notify first and
//! persist behind, on the factory's writer thread.

// Imports
use {
	crate::{StoreBackend, factory::WriteQueue},
	core::fmt,
	parking_lot::Mutex,
	ripple_reactive::{
		CellId, Listener, MutableObservable, Observable, ObservableBase, Subscription, Value, WeakDependent,
	},
	ripple_util::Latch,
	serde::{Serialize, de::DeserializeOwned},
	std::{sync::Arc, thread},
};

/// Values persistable through a store cell
pub trait StoreValue: Value + Serialize + DeserializeOwned {}

impl<T: Value + Serialize + DeserializeOwned> StoreValue for T {}

/// Inner
pub(crate) struct Inner<T> {
	/// Fully-namespaced backend key
	key: String,

	/// Value, `None` until first loaded
	state: Mutex<Option<T>>,

	/// Opened once the first value is available
	ready: Latch,

	/// Write-behind queue
	writer: WriteQueue,

	/// Base
	base: ObservableBase<T>,
}

impl<T: Value> Inner<T> {
	/// Creates a new, unloaded inner
	pub(crate) fn new(key: String, writer: WriteQueue) -> Self {
		Self {
			key,
			state: Mutex::new(None),
			ready: Latch::new(),
			writer,
			base: ObservableBase::new(),
		}
	}
}

/// Store-backed cell
///
/// Cells for the same (namespace, key) pair share one instance
/// through a process-wide weak registry.
pub struct StoreCell<T: Value> {
	/// Inner
	inner: Arc<Inner<T>>,
}

impl<T: StoreValue> StoreCell<T> {
	/// Creates a cell over `inner`
	pub(crate) fn from_inner(inner: Arc<Inner<T>>) -> Self {
		Self { inner }
	}

	/// Loads the cell's first value on a background thread.
	///
	/// Missing keys, unreadable backends and malformed values all
	/// fall back to `default`. The first load never notifies, there
	/// is no previous value it could have changed from.
	pub(crate) fn spawn_load(inner: &Arc<Inner<T>>, backend: Arc<dyn StoreBackend>, default: T) {
		let inner = Arc::clone(inner);
		thread::Builder::new()
			.name("ripple-store-load".to_owned())
			.spawn(move || {
				let value = match backend.read(&inner.key) {
					Ok(Some(raw)) => match serde_json::from_str(&raw) {
						Ok(value) => value,
						Err(err) => {
							tracing::error!(key = %inner.key, error = %err, "Malformed store value, using the default");
							default
						},
					},
					Ok(None) => default,
					Err(err) => {
						tracing::error!(key = %inner.key, error = %err, "Unable to read store value, using the default");
						default
					},
				};

				tracing::debug!(key = %inner.key, "Loaded store value");
				*inner.state.lock() = Some(value);
				inner.ready.open();
			})
			.expect("Unable to spawn store load thread");
	}
}

impl<T: StoreValue> Observable<T> for StoreCell<T> {
	/// Reads the current value, blocking until the first value
	/// has been loaded.
	fn value(&self) -> T {
		self.inner.ready.wait();
		self.inner
			.state
			.lock()
			.clone()
			.expect("Store cell was ready without a value")
	}

	fn on_change_boxed(&self, listener: Listener<T>) -> Subscription {
		self.inner.base.subscribe(listener)
	}

	fn add_dependent(&self, dependent: WeakDependent) {
		self.inner.base.add_dependent(dependent);
	}

	fn notify_change(&self) {
		self.inner.ready.wait();
		let inner = &self.inner;
		inner.base.notify_if_changed(|| {
			Some(
				inner
					.state
					.lock()
					.clone()
					.expect("Store cell was ready without a value"),
			)
		});
	}

	fn id(&self) -> CellId {
		CellId::of(&self.inner)
	}
}

impl<T: StoreValue> MutableObservable<T> for StoreCell<T> {
	fn set(&self, value: T) {
		self.inner.ready.wait();
		let inner = &self.inner;
		inner.base.notify_if_changed(|| {
			let mut state = inner.state.lock();
			let current = state.as_mut().expect("Store cell was ready without a value");
			if *current == value {
				return None;
			}
			*current = value.clone();
			drop(state);

			match serde_json::to_string(&value) {
				Ok(raw) => inner.writer.enqueue(&inner.key, raw),
				Err(err) => tracing::error!(key = %inner.key, error = %err, "Unable to serialize store value"),
			}

			Some(value)
		});
	}
}

impl<T: Value> Clone for StoreCell<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T: StoreValue> PartialEq for StoreCell<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl<T: StoreValue> Eq for StoreCell<T> {}

impl<T: Value> fmt::Debug for StoreCell<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StoreCell")
			.field("key", &self.inner.key)
			.field("ready", &self.inner.ready.is_open())
			.finish_non_exhaustive()
	}
}
