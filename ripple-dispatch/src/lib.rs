//! Dispatch adapters for `ripple`
//!
//! Thin adapters between the synchronous notification core and a
//! host application: marshalling listener invocations onto a
//! single-thread dispatcher, and releasing subscriptions when a
//! host scope ends.

// Modules
pub mod dispatcher;
pub mod scope;

// Exports
pub use self::{
	dispatcher::{Dispatcher, ObservableDispatchExt, ThreadDispatcher},
	scope::{Scope, SubscriptionScopeExt, TeardownScope},
};

/// A callback posted to a dispatcher or scope
pub type Task = Box<dyn FnOnce() + Send>;
