//! Dispatchers
//!
//! A dispatcher marshals listener invocations onto another thread,
//! typically a UI thread. The cell's own walk stays synchronous;
//! only the listener body is re-posted, with an owned copy of the
//! value.

// Imports
use {
	crate::Task,
	ripple_reactive::{Observable, ObservableExt, Subscription, Value},
	std::{
		sync::{Arc, mpsc},
		thread,
	},
};

/// A single-thread executor for posted callbacks
pub trait Dispatcher: Send + Sync + 'static {
	/// Posts `task` to run on the dispatcher's thread
	fn post(&self, task: Task);
}

/// Dispatching listener registration
pub trait ObservableDispatchExt<T: Value>: Observable<T> {
	/// Registers a listener whose invocations are posted onto
	/// `dispatcher` with an owned copy of the value
	fn on_change_via<D, F>(&self, dispatcher: &Arc<D>, listener: F) -> Subscription
	where
		D: Dispatcher + ?Sized,
		F: Fn(T) + Send + Sync + 'static,
	{
		self.on_change_boxed(Box::new(self::posted(dispatcher, listener)))
	}

	/// As [`ObservableExt::run_and_on_change`], with every invocation,
	/// including the initial one, posted onto `dispatcher`
	fn run_and_on_change_via<D, F>(&self, dispatcher: &Arc<D>, listener: F) -> Subscription
	where
		D: Dispatcher + ?Sized,
		F: Fn(T) + Send + Sync + 'static,
	{
		self.run_and_on_change(self::posted(dispatcher, listener))
	}
}

impl<T: Value, O: Observable<T> + ?Sized> ObservableDispatchExt<T> for O {}

/// Wraps `listener` to post each invocation onto `dispatcher`
fn posted<T, D, F>(dispatcher: &Arc<D>, listener: F) -> impl Fn(&T) + Send + Sync + 'static
where
	T: Value,
	D: Dispatcher + ?Sized,
	F: Fn(T) + Send + Sync + 'static,
{
	let dispatcher = Arc::clone(dispatcher);
	let listener = Arc::new(listener);
	move |value: &T| {
		let value = value.clone();
		let listener = Arc::clone(&listener);
		dispatcher.post(Box::new(move || listener(value)));
	}
}

/// A dispatcher backed by a dedicated worker thread, draining
/// posted tasks in order.
///
/// The worker exits once every handle to the dispatcher is gone.
pub struct ThreadDispatcher {
	/// Task sender
	sender: mpsc::Sender<Task>,
}

impl ThreadDispatcher {
	/// Creates a new dispatcher, spawning its worker thread
	#[must_use]
	pub fn new() -> Self {
		let (sender, receiver) = mpsc::channel::<Task>();

		thread::Builder::new()
			.name("ripple-dispatch".to_owned())
			.spawn(move || {
				while let Ok(task) = receiver.recv() {
					task();
				}
			})
			.expect("Unable to spawn dispatcher thread");

		Self { sender }
	}
}

impl Dispatcher for ThreadDispatcher {
	fn post(&self, task: Task) {
		if self.sender.send(task).is_err() {
			tracing::warn!("Dispatcher thread is gone, dropping task");
		}
	}
}

impl Default for ThreadDispatcher {
	fn default() -> Self {
		Self::new()
	}
}
