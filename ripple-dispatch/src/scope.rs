//! Teardown scopes
//!
//! A scope is a host lifecycle hook: callbacks registered on it run
//! when the scope ends. Tying a subscription to a scope releases it
//! automatically, the way a UI screen releases its bindings when it
//! is torn down.

// Imports
use {crate::Task, parking_lot::Mutex, ripple_reactive::Subscription};

/// A lifecycle hook running callbacks when its scope ends
pub trait Scope {
	/// Registers `task` to run when the scope ends.
	///
	/// A scope that has already ended runs `task` immediately.
	fn on_teardown(&self, task: Task);
}

/// Scope-tied release for subscriptions
#[extend::ext(name = SubscriptionScopeExt)]
pub impl Subscription {
	/// Releases this subscription when `scope` ends
	fn release_on<S: Scope + ?Sized>(&self, scope: &S) {
		let subscription = self.clone();
		scope.on_teardown(Box::new(move || subscription.release()));
	}
}

/// A scope that tears down on [`teardown`](Self::teardown) or drop,
/// whichever comes first, running each callback exactly once
#[derive(Default)]
pub struct TeardownScope {
	/// Pending callbacks, `None` once torn down
	tasks: Mutex<Option<Vec<Task>>>,
}

impl TeardownScope {
	/// Creates a new, live scope
	#[must_use]
	pub fn new() -> Self {
		Self {
			tasks: Mutex::new(Some(vec![])),
		}
	}

	/// Ends the scope, running all registered callbacks.
	///
	/// Repeated teardowns are no-ops.
	pub fn teardown(&self) {
		let tasks = self.tasks.lock().take();
		if let Some(tasks) = tasks {
			for task in tasks {
				task();
			}
		}
	}
}

impl Scope for TeardownScope {
	fn on_teardown(&self, task: Task) {
		let mut tasks = self.tasks.lock();
		match &mut *tasks {
			Some(tasks) => tasks.push(task),
			None => {
				drop(tasks);
				task();
			},
		}
	}
}

impl Drop for TeardownScope {
	fn drop(&mut self) {
		self.teardown();
	}
}
