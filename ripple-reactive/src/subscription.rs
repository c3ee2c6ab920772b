//! Subscriptions
//!
//! A subscription is the handle for one registered listener
//! on one cell. It deregisters the listener on release and
//! nothing else; dropping the handle keeps the listener alive.

// Imports
use {
	core::{
		fmt,
		sync::atomic::{AtomicBool, AtomicU64, Ordering},
	},
	std::sync::{Arc, Weak},
};

/// Next subscription identifier
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Subscription identifier
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
	/// Allocates the next identifier
	pub(crate) fn next() -> Self {
		Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
	}
}

/// Targets a subscription can deregister from
pub(crate) trait Unsubscribe: Send + Sync {
	/// Removes the listener registered under `id`
	fn unsubscribe(&self, id: SubscriptionId);
}

/// Subscription inner
struct Inner {
	/// Listener set this subscription is registered on.
	///
	/// Weak: a subscription must never keep its cell alive.
	target: Weak<dyn Unsubscribe>,

	/// Identifier within the listener set
	id: SubscriptionId,

	/// Whether this subscription was released
	released: AtomicBool,
}

/// Subscription
///
/// Active until explicitly released, or until the cell it
/// observes is gone. Releasing twice is a no-op. A release
/// only prevents future deliveries, never one already in
/// flight.
pub struct Subscription {
	/// Inner
	inner: Arc<Inner>,
}

impl Subscription {
	/// Creates a new, active subscription
	pub(crate) fn new(target: Weak<dyn Unsubscribe>, id: SubscriptionId) -> Self {
		let inner = Inner {
			target,
			id,
			released: AtomicBool::new(false),
		};
		Self { inner: Arc::new(inner) }
	}

	/// Creates a subscription that never delivers and releases to a no-op
	#[must_use]
	pub fn inert() -> Self {
		/// Target without listeners
		struct Never;

		impl Unsubscribe for Never {
			fn unsubscribe(&self, _id: SubscriptionId) {}
		}

		let target: Weak<Never> = Weak::new();
		Self::new(target, SubscriptionId::next())
	}

	/// Releases this subscription, deregistering its listener.
	///
	/// Repeated releases are no-ops.
	pub fn release(&self) {
		if self.inner.released.swap(true, Ordering::AcqRel) {
			return;
		}

		if let Some(target) = self.inner.target.upgrade() {
			target.unsubscribe(self.inner.id);
		}
	}

	/// Returns whether this subscription can no longer deliver
	#[must_use]
	pub fn is_released(&self) -> bool {
		self.inner.released.load(Ordering::Acquire) || self.inner.target.strong_count() == 0
	}
}

impl Clone for Subscription {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.inner.id)
			.field("released", &self.is_released())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// Imports
	use super::*;

	#[test]
	fn inert_release_is_noop() {
		let subscription = Subscription::inert();
		assert!(subscription.is_released(), "Inert subscription had a live target");

		subscription.release();
		subscription.release();
	}
}
