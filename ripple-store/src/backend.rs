//! Store backends

// Imports
use {
	parking_lot::Mutex,
	std::{collections::HashMap, error::Error as StdError},
};

/// Store error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// Read failure
	#[error("Unable to read key {key:?}")]
	Read {
		/// Key being read
		key: String,

		/// Underlying error
		#[source]
		source: Box<dyn StdError + Send + Sync>,
	},

	/// Write failure
	#[error("Unable to write key {key:?}")]
	Write {
		/// Key being written
		key: String,

		/// Underlying error
		#[source]
		source: Box<dyn StdError + Send + Sync>,
	},
}

/// Durable key-value store.
///
/// Reads and writes may be arbitrarily slow; the adapter only calls
/// them from dedicated threads, never from a notification walk.
pub trait StoreBackend: Send + Sync + 'static {
	/// Reads the raw value stored under `key`
	fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

	/// Writes `value` under `key`
	fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory backend
#[derive(Default)]
pub struct MemoryBackend {
	/// Entries
	entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
	/// Creates a new, empty backend
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the raw value stored under `key`, if any
	#[must_use]
	pub fn get(&self, key: &str) -> Option<String> {
		self.entries.lock().get(key).cloned()
	}
}

impl StoreBackend for MemoryBackend {
	fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.get(key))
	}

	fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.entries.lock().insert(key.to_owned(), value.to_owned());
		Ok(())
	}
}
