//! Store factories
//!
//! A factory binds a namespace to a backend and owns the writer
//! thread that drains write-behind requests in order.

// Imports
use {
	crate::{
		StoreBackend,
		registry,
		store_cell::{self, StoreCell, StoreValue},
	},
	core::fmt,
	std::{
		sync::{Arc, mpsc},
		thread,
	},
};

/// Write-behind request
struct WriteRequest {
	/// Fully-namespaced key
	key: String,

	/// Serialized value
	value: String,
}

/// Write-behind queue.
///
/// All writes of a factory drain on one thread, in order, so a
/// later write can never be overtaken by an earlier one.
#[derive(Clone)]
pub(crate) struct WriteQueue {
	/// Request sender
	sender: mpsc::Sender<WriteRequest>,
}

impl WriteQueue {
	/// Spawns the writer thread for `backend`
	fn spawn(backend: Arc<dyn StoreBackend>) -> Self {
		let (sender, receiver) = mpsc::channel::<WriteRequest>();

		thread::Builder::new()
			.name("ripple-store-write".to_owned())
			.spawn(move || {
				// Exits once the factory and all of its cells are gone
				while let Ok(request) = receiver.recv() {
					if let Err(err) = backend.write(&request.key, &request.value) {
						tracing::error!(key = %request.key, error = %err, "Unable to persist store value");
					}
				}
			})
			.expect("Unable to spawn store write thread");

		Self { sender }
	}

	/// Enqueues a write
	pub(crate) fn enqueue(&self, key: &str, value: String) {
		let request = WriteRequest {
			key: key.to_owned(),
			value,
		};
		if self.sender.send(request).is_err() {
			tracing::warn!(key, "Store writer is gone, dropping write");
		}
	}
}

/// Store factory
pub struct StoreFactory {
	/// Namespace prefixed to every cell key
	namespace: String,

	/// Backend
	backend: Arc<dyn StoreBackend>,

	/// Write-behind queue
	writer: WriteQueue,
}

impl StoreFactory {
	/// Creates a new factory over `backend`, spawning its writer thread
	#[must_use]
	pub fn new(namespace: impl Into<String>, backend: Arc<dyn StoreBackend>) -> Self {
		let writer = WriteQueue::spawn(Arc::clone(&backend));
		Self {
			namespace: namespace.into(),
			backend,
			writer,
		}
	}

	/// Returns the cell stored under `key`.
	///
	/// Callers asking for the same (namespace, key) share one cell.
	/// A newly created cell starts loading in the background and
	/// falls back to `default` when the key is missing; reading it
	/// blocks until that load finished.
	pub fn cell<T>(&self, key: &str, default: T) -> StoreCell<T>
	where
		T: StoreValue,
	{
		let inner = registry::get_or_create(&self.namespace, key, || {
			let backend_key = format!("{}/{key}", self.namespace);
			let inner = Arc::new(store_cell::Inner::new(backend_key, self.writer.clone()));
			StoreCell::spawn_load(&inner, Arc::clone(&self.backend), default);
			inner
		});
		StoreCell::from_inner(inner)
	}
}

impl Clone for StoreFactory {
	fn clone(&self) -> Self {
		Self {
			namespace: self.namespace.clone(),
			backend:   Arc::clone(&self.backend),
			writer:    self.writer.clone(),
		}
	}
}

impl fmt::Debug for StoreFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StoreFactory")
			.field("namespace", &self.namespace)
			.finish_non_exhaustive()
	}
}
