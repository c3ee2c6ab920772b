//! Cell registry
//!
//! A process-wide registry of store cells keyed by (namespace, key,
//! value type), so every caller asking for the same key shares one
//! cell. Entries are weakly held; a key nobody uses anymore is
//! collectible, and dead entries are pruned on insertion.

// Imports
use {
	crate::store_cell,
	core::any::{Any, TypeId},
	parking_lot::Mutex,
	std::{
		collections::HashMap,
		sync::{Arc, LazyLock, Weak},
	},
};

/// The process-wide registry
static REGISTRY: LazyLock<Mutex<HashMap<RegistryKey, Weak<dyn Any + Send + Sync>>>> =
	LazyLock::new(|| Mutex::new(HashMap::new()));

/// Registry key
#[derive(PartialEq, Eq, Clone, Hash, Debug)]
struct RegistryKey {
	/// Namespace
	namespace: String,

	/// Key within the namespace
	key: String,

	/// Value type
	type_id: TypeId,
}

/// Returns the shared cell for `(namespace, key)`, creating it
/// through `create` on first use
pub(crate) fn get_or_create<T, F>(namespace: &str, key: &str, create: F) -> Arc<store_cell::Inner<T>>
where
	T: store_cell::StoreValue,
	F: FnOnce() -> Arc<store_cell::Inner<T>>,
{
	let registry_key = RegistryKey {
		namespace: namespace.to_owned(),
		key:       key.to_owned(),
		type_id:   TypeId::of::<T>(),
	};

	let mut registry = REGISTRY.lock();
	if let Some(existing) = registry.get(&registry_key).and_then(Weak::upgrade) {
		let Ok(inner) = existing.downcast::<store_cell::Inner<T>>() else {
			unreachable!("Registry entry had the wrong type for its key");
		};
		return inner;
	}

	// Dropped cells leave dead entries behind; prune them while
	// we're inserting anyway.
	registry.retain(|_key, cell| cell.strong_count() > 0);

	let inner = create();
	let weak = Arc::downgrade(&inner);
	let weak: Weak<dyn Any + Send + Sync> = weak;
	registry.insert(registry_key, weak);

	inner
}
