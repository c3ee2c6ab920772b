//! Base cell machinery
//!
//! [`ObservableBase`] owns the three shared pieces every cell kind
//! embeds: the listener set, the weak dependent set and the per-cell
//! notification lock. Cells drive their walks exclusively through
//! [`ObservableBase::notify_if_changed`].

// Imports
use {
	crate::{
		Listener, Value,
		dependent::{Dependent, WeakDependent},
		subscription::{Subscription, SubscriptionId, Unsubscribe},
	},
	parking_lot::{Condvar, Mutex},
	ripple_util::WeakVec,
	std::{
		sync::{Arc, Weak},
		thread::{self, ThreadId},
	},
};

/// A cell's listener set
struct ListenerSet<T> {
	/// Entries
	entries: Mutex<Vec<ListenerEntry<T>>>,
}

/// One registered listener
struct ListenerEntry<T> {
	/// Identifier
	id: SubscriptionId,

	/// Listener
	listener: Arc<dyn Fn(&T) + Send + Sync>,
}

impl<T> ListenerSet<T> {
	/// Creates an empty set
	fn new() -> Self {
		Self {
			entries: Mutex::new(vec![]),
		}
	}

	/// Inserts a listener, returning its identifier
	fn insert(&self, listener: Listener<T>) -> SubscriptionId {
		let id = SubscriptionId::next();
		self.entries.lock().push(ListenerEntry {
			id,
			listener: Arc::from(listener),
		});
		id
	}

	/// Returns a point-in-time snapshot of the registered listeners
	fn snapshot(&self) -> Vec<Arc<dyn Fn(&T) + Send + Sync>> {
		self.entries
			.lock()
			.iter()
			.map(|entry| Arc::clone(&entry.listener))
			.collect()
	}
}

impl<T: 'static> Unsubscribe for ListenerSet<T> {
	fn unsubscribe(&self, id: SubscriptionId) {
		self.entries.lock().retain(|entry| entry.id != id);
	}
}

/// Per-cell notification lock.
///
/// Serializes mutate-and-notify sequences across threads, and
/// detects re-entrant notification from the owning thread itself,
/// which indicates a dependency cycle or a listener writing the
/// cell it is being notified from.
struct WalkLock {
	/// State
	state: Mutex<WalkState>,

	/// Waiters
	cond: Condvar,
}

/// Walk state
struct WalkState {
	/// Thread currently walking this cell
	owner: Option<ThreadId>,

	/// Whether the owner is inside the dependents walk
	in_dependents: bool,
}

impl WalkLock {
	/// Creates a new, unheld lock
	const fn new() -> Self {
		Self {
			state: Mutex::new(WalkState {
				owner:         None,
				in_dependents: false,
			}),
			cond:  Condvar::new(),
		}
	}

	/// Begins a walk, blocking while another thread walks this cell.
	///
	/// # Panics
	/// Panics if the calling thread is already walking this cell.
	fn begin(&self) -> WalkGuard<'_> {
		let current = thread::current().id();
		let mut state = self.state.lock();
		assert!(
			state.owner != Some(current),
			"Cannot notify a cell from within its own notification"
		);
		while state.owner.is_some() {
			self.cond.wait(&mut state);
		}
		state.owner = Some(current);

		WalkGuard { lock: self }
	}

	/// Panics if the calling thread is inside this cell's dependents walk
	fn assert_not_walking_dependents(&self) {
		let state = self.state.lock();
		assert!(
			!(state.in_dependents && state.owner == Some(thread::current().id())),
			"Cannot add a dependent to a cell that is notifying its dependents"
		);
	}
}

/// Walk guard.
///
/// Releases the walk on drop, including on unwind, so a panicking
/// recompute or listener doesn't wedge the cell.
struct WalkGuard<'a> {
	/// Lock
	lock: &'a WalkLock,
}

impl WalkGuard<'_> {
	/// Marks the walk as inside the dependents traversal
	fn enter_dependents(&self) {
		self.lock.state.lock().in_dependents = true;
	}

	/// Unmarks the dependents traversal
	fn exit_dependents(&self) {
		self.lock.state.lock().in_dependents = false;
	}
}

impl Drop for WalkGuard<'_> {
	fn drop(&mut self) {
		{
			let mut state = self.lock.state.lock();
			state.owner = None;
			state.in_dependents = false;
		}
		self.lock.cond.notify_one();
	}
}

/// Base of every observable cell
pub struct ObservableBase<T> {
	/// Listeners.
	///
	/// In its own allocation so subscriptions can point at it
	/// without keeping the cell alive.
	listeners: Arc<ListenerSet<T>>,

	/// Dependents
	dependents: Mutex<WeakVec<dyn Dependent>>,

	/// Walk lock
	walk: WalkLock,
}

impl<T: Value> ObservableBase<T> {
	/// Creates a new base with no listeners or dependents
	#[must_use]
	pub fn new() -> Self {
		Self {
			listeners:  Arc::new(ListenerSet::new()),
			dependents: Mutex::new(WeakVec::new()),
			walk:       WalkLock::new(),
		}
	}

	/// Registers `listener`, to be invoked with each future value
	pub fn subscribe(&self, listener: Listener<T>) -> Subscription {
		let id = self.listeners.insert(listener);
		let target = Arc::downgrade(&self.listeners);
		let target: Weak<dyn Unsubscribe> = target;
		Subscription::new(target, id)
	}

	/// Registers a weakly-held dependent edge.
	///
	/// # Panics
	/// Panics if called from within this cell's own dependents walk.
	pub fn add_dependent(&self, dependent: WeakDependent) {
		self.walk.assert_not_walking_dependents();
		self.dependents.lock().push(dependent.into_inner());
	}

	/// Runs `f` under this cell's notification lock and, when it
	/// yields a value, walks the live dependents depth-first and
	/// then invokes a snapshot of the listeners with the value.
	///
	/// Blocks while another thread is walking this cell; unrelated
	/// cells walk concurrently.
	///
	/// # Panics
	/// Panics if the calling thread is already walking this cell.
	pub fn notify_if_changed<F>(&self, f: F)
	where
		F: FnOnce() -> Option<T>,
	{
		let guard = self.walk.begin();
		let Some(value) = f() else { return };

		// Snapshot the live edges, then recurse outside of the set
		// lock so callbacks may register further cells. Dead edges
		// are swept by the snapshot once they dominate the set.
		guard.enter_dependents();
		let dependents = self.dependents.lock().upgraded();
		tracing::trace!(dependents = dependents.len(), "Walking dependents");
		for dependent in &dependents {
			dependent.notify_change();
		}
		guard.exit_dependents();

		// Listeners run on a point-in-time snapshot: one releasing
		// itself or a sibling doesn't affect this pass.
		let listeners = self.listeners.snapshot();
		for listener in &listeners {
			listener(&value);
		}
	}
}

impl<T: Value> Default for ObservableBase<T> {
	fn default() -> Self {
		Self::new()
	}
}
