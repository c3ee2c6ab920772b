//! Reactivity core for `ripple`
//!
//! A graph of value cells: mutable [`Source`] cells, derived
//! [`Mapped`]/[`FlatMapped`]/[`TwoWayMapped`] cells, and the
//! synchronous notification walk between them. A write to a source
//! walks its weakly-held dependents depth-first, each recomputing
//! and continuing the walk only when its own value actually changed,
//! and then invokes the registered listeners.
//!
//! Propagation is synchronous on the writing thread. Each cell
//! serializes its own mutate-and-notify sequence under a per-cell
//! lock; unrelated cells propagate concurrently. A derived cell
//! joining two sources written concurrently from different threads
//! may therefore observe a momentarily-inconsistent combination of
//! upstream values; making that impossible would need a global
//! ordering, which this crate deliberately does not have.
//!
//! The walk is not glitch-free: in a diamond-shaped graph a cell
//! reachable over two paths recomputes once per path. The equality
//! gate keeps listeners from firing twice with equal values.

// Modules
pub mod base;
pub mod constant;
pub mod dependent;
pub mod flat_mapped;
pub mod mapped;
pub mod observable;
pub mod shared;
pub mod source;
pub mod subscription;
pub mod two_way;

// Exports
pub use self::{
	base::ObservableBase,
	constant::Constant,
	dependent::{Dependent, WeakDependent},
	flat_mapped::FlatMapped,
	mapped::{Mapped, join_all},
	observable::{
		CellId,
		Listener,
		MutableObservable,
		MutableObservableExt,
		Observable,
		ObservableExt,
		ObservableFlatten,
		Value,
	},
	shared::{SharedMutableObservable, SharedObservable},
	source::Source,
	subscription::{Subscription, SubscriptionId},
	two_way::{TwoWayMapped, two_way_join_all},
};
