//! Observable cells
//!
//! The [`Observable`] trait is the object-safe surface every cell
//! kind implements; [`ObservableExt`] and [`MutableObservableExt`]
//! add the combinators (mapping, joining, flat-mapping, two-way
//! mapping) on top of it.
//!
//! ## Examples
//! ```rust
//! use ripple_reactive::{MutableObservable, Observable, ObservableExt, Source};
//!
//! let name = Source::new("world".to_owned());
//! let greeting = name.map(|name| format!("hello, {name}"));
//! assert_eq!(greeting.value(), "hello, world");
//!
//! name.set("ripple".to_owned());
//! assert_eq!(greeting.value(), "hello, ripple");
//! ```

// Imports
use {
	crate::{
		dependent::WeakDependent,
		flat_mapped::FlatMapped,
		mapped::Mapped,
		shared::{SharedMutableObservable, SharedObservable},
		subscription::Subscription,
		two_way::TwoWayMapped,
	},
	core::sync::atomic::{AtomicBool, Ordering},
	ripple_util::Latch,
	std::sync::{Arc, OnceLock},
};

/// Types usable as cell values.
///
/// Structural equality is what suppresses redundant notifications,
/// so every value type must be comparable.
pub trait Value: Clone + PartialEq + Send + Sync + 'static {}

impl<T: Clone + PartialEq + Send + Sync + 'static> Value for T {}

/// Boxed change listener
pub type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Cell identifier.
///
/// Unique among all live cells; cloning or type-erasing a cell
/// handle retains the id.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
#[derive(derive_more::Display)]
#[display("{_0:#x}")]
pub struct CellId(usize);

impl CellId {
	/// Creates an id from a cell's inner allocation
	#[must_use]
	pub fn of<T: ?Sized>(inner: &Arc<T>) -> Self {
		Self(Arc::as_ptr(inner).cast::<()>().addr())
	}
}

/// Observable cell
pub trait Observable<T: Value>: Send + Sync + 'static {
	/// Reads the current value.
	///
	/// Derived cells compute and cache on first read.
	fn value(&self) -> T;

	/// Registers a boxed listener, invoked with each future value,
	/// never the current one.
	///
	/// Prefer [`ObservableExt::on_change`].
	fn on_change_boxed(&self, listener: Listener<T>) -> Subscription;

	/// Registers a weakly-held dependent edge.
	///
	/// The edge never keeps the dependent alive; it is swept once
	/// the dependent is dropped.
	///
	/// # Panics
	/// Panics if called from within this cell's own dependents walk.
	fn add_dependent(&self, dependent: WeakDependent);

	/// Recomputes this cell and notifies dependents and listeners
	/// with the current value.
	///
	/// # Panics
	/// Panics if the cell is already notifying on the calling thread.
	fn notify_change(&self);

	/// Returns this cell's identity
	fn id(&self) -> CellId;
}

/// Mutable observable cell
pub trait MutableObservable<T: Value>: Observable<T> {
	/// Writes a new value.
	///
	/// Writing an equal value is a complete no-op; a different value
	/// is stored and then walked through dependents and listeners
	/// before this returns.
	fn set(&self, value: T);
}

/// Combinators over any observable cell
pub trait ObservableExt<T: Value>: Observable<T> {
	/// Registers a listener invoked with each future value
	fn on_change<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&T) + Send + Sync + 'static,
	{
		self.on_change_boxed(Box::new(listener))
	}

	/// Invokes `listener` once with the current value, then registers
	/// it for future changes.
	///
	/// The listener is registered *before* the initial call and gated
	/// until it returns, so a write racing in from another thread is
	/// queued and delivered afterwards instead of lost.
	fn run_and_on_change<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&T) + Send + Sync + 'static,
	{
		let gate = Arc::new(Latch::new());
		let listener = Arc::new(listener);

		let subscription = self.on_change_boxed(Box::new({
			let gate = Arc::clone(&gate);
			let listener = Arc::clone(&listener);
			move |value: &T| {
				gate.wait();
				listener(value);
			}
		}));

		listener(&self.value());
		gate.open();

		subscription
	}

	/// Registers a listener that releases its own subscription once
	/// it returns `true`
	fn on_change_until<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&T) -> bool + Send + Sync + 'static,
	{
		let slot = Arc::new(OnceLock::new());

		let subscription = self.on_change_boxed(Box::new({
			let slot = Arc::clone(&slot);
			move |value: &T| {
				if listener(value) {
					if let Some(subscription) = slot.get() {
						Subscription::release(subscription);
					}
				}
			}
		}));

		_ = slot.set(subscription.clone());
		subscription
	}

	/// Invokes `listener` once with the current value, then behaves as
	/// [`on_change_until`](Self::on_change_until). An initial call that
	/// returns `true` releases the subscription on the next notification.
	fn run_and_on_change_until<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&T) -> bool + Send + Sync + 'static,
	{
		let gate = Arc::new(Latch::new());
		let done = Arc::new(AtomicBool::new(false));
		let listener = Arc::new(listener);

		let subscription = self.on_change_until({
			let gate = Arc::clone(&gate);
			let done = Arc::clone(&done);
			let listener = Arc::clone(&listener);
			move |value: &T| {
				gate.wait();
				done.load(Ordering::Acquire) || listener(value)
			}
		});

		done.store(listener(&self.value()), Ordering::Release);
		gate.open();

		subscription
	}

	/// Derives a cell by mapping this cell's value
	fn map<U, F>(&self, f: F) -> Mapped<U>
	where
		Self: Sized + Clone,
		U: Value,
		F: Fn(&T) -> U + Send + Sync + 'static,
	{
		let mapped = {
			let upstream = self.clone();
			Mapped::new(move || f(&upstream.value()))
		};
		self.add_dependent(mapped.as_dependent());
		mapped
	}

	/// Derives a cell by resolving this cell's value to another cell.
	///
	/// The derived cell re-subscribes whenever the selected cell's
	/// identity changes, and notifies for the switch itself only if
	/// the two delegates' values differ.
	fn flat_map<U, F>(&self, select: F) -> FlatMapped<U>
	where
		Self: Sized + Clone,
		U: Value,
		F: Fn(&T) -> SharedObservable<U> + Send + Sync + 'static,
	{
		let flat = {
			let upstream = self.clone();
			FlatMapped::new(move || select(&upstream.value()))
		};
		self.add_dependent(flat.as_dependent());
		flat.init();
		flat
	}

	/// Derives a cell from this cell and `other`
	fn join<B, U, OB, M>(&self, other: &OB, f: M) -> Mapped<U>
	where
		Self: Sized + Clone,
		B: Value,
		U: Value,
		OB: Observable<B> + Clone,
		M: Fn(&T, &B) -> U + Send + Sync + 'static,
	{
		let mapped = {
			let (a, b) = (self.clone(), other.clone());
			Mapped::new(move || f(&a.value(), &b.value()))
		};
		self.add_dependent(mapped.as_dependent());
		other.add_dependent(mapped.as_dependent());
		mapped
	}

	/// Derives a cell from this cell and 2 others
	fn join3<B, C, U, OB, OC, M>(&self, other_b: &OB, other_c: &OC, f: M) -> Mapped<U>
	where
		Self: Sized + Clone,
		B: Value,
		C: Value,
		U: Value,
		OB: Observable<B> + Clone,
		OC: Observable<C> + Clone,
		M: Fn(&T, &B, &C) -> U + Send + Sync + 'static,
	{
		let mapped = {
			let (a, b, c) = (self.clone(), other_b.clone(), other_c.clone());
			Mapped::new(move || f(&a.value(), &b.value(), &c.value()))
		};
		self.add_dependent(mapped.as_dependent());
		other_b.add_dependent(mapped.as_dependent());
		other_c.add_dependent(mapped.as_dependent());
		mapped
	}

	/// Derives a cell from this cell and 3 others
	fn join4<B, C, D, U, OB, OC, OD, M>(&self, other_b: &OB, other_c: &OC, other_d: &OD, f: M) -> Mapped<U>
	where
		Self: Sized + Clone,
		B: Value,
		C: Value,
		D: Value,
		U: Value,
		OB: Observable<B> + Clone,
		OC: Observable<C> + Clone,
		OD: Observable<D> + Clone,
		M: Fn(&T, &B, &C, &D) -> U + Send + Sync + 'static,
	{
		let mapped = {
			let (a, b, c, d) = (self.clone(), other_b.clone(), other_c.clone(), other_d.clone());
			Mapped::new(move || f(&a.value(), &b.value(), &c.value(), &d.value()))
		};
		self.add_dependent(mapped.as_dependent());
		other_b.add_dependent(mapped.as_dependent());
		other_c.add_dependent(mapped.as_dependent());
		other_d.add_dependent(mapped.as_dependent());
		mapped
	}

	/// Derives a cell from this cell and 4 others
	fn join5<B, C, D, E, U, OB, OC, OD, OE, M>(
		&self,
		other_b: &OB,
		other_c: &OC,
		other_d: &OD,
		other_e: &OE,
		f: M,
	) -> Mapped<U>
	where
		Self: Sized + Clone,
		B: Value,
		C: Value,
		D: Value,
		E: Value,
		U: Value,
		OB: Observable<B> + Clone,
		OC: Observable<C> + Clone,
		OD: Observable<D> + Clone,
		OE: Observable<E> + Clone,
		M: Fn(&T, &B, &C, &D, &E) -> U + Send + Sync + 'static,
	{
		let mapped = {
			let (a, b, c, d, e) = (
				self.clone(),
				other_b.clone(),
				other_c.clone(),
				other_d.clone(),
				other_e.clone(),
			);
			Mapped::new(move || f(&a.value(), &b.value(), &c.value(), &d.value(), &e.value()))
		};
		self.add_dependent(mapped.as_dependent());
		other_b.add_dependent(mapped.as_dependent());
		other_c.add_dependent(mapped.as_dependent());
		other_d.add_dependent(mapped.as_dependent());
		other_e.add_dependent(mapped.as_dependent());
		mapped
	}

	/// Type-erases this cell into a cheap shared handle
	fn to_shared(&self) -> SharedObservable<T>
	where
		Self: Sized + Clone,
	{
		SharedObservable::new(self.clone())
	}
}

impl<T: Value, O: Observable<T> + ?Sized> ObservableExt<T> for O {}

/// Combinators over mutable observable cells
pub trait MutableObservableExt<T: Value>: MutableObservable<T> {
	/// Derives a mutable cell pairing a forward mapping with a reverse
	/// mapping that pushes writes back onto this cell.
	///
	/// The reverse mapping receives the current upstream value and the
	/// newly assigned output; the derived cell's visible value afterwards
	/// is whatever the forward mapping recomputes from the updated
	/// upstream, not necessarily what was written.
	fn two_way_map<U, M, R>(&self, forward: M, reverse: R) -> TwoWayMapped<U>
	where
		Self: Sized + Clone,
		U: Value,
		M: Fn(&T) -> U + Send + Sync + 'static,
		R: Fn(&T, U) -> T + Send + Sync + 'static,
	{
		let mapped = {
			let upstream = self.clone();
			Mapped::new(move || forward(&upstream.value()))
		};
		self.add_dependent(mapped.as_dependent());

		let write = {
			let upstream = self.clone();
			move |value: U| {
				let current = upstream.value();
				upstream.set(reverse(&current, value));
			}
		};
		TwoWayMapped::new(mapped, write)
	}

	/// Derives a mutable cell from this cell and another
	fn two_way_join<B, U, OB, M, R>(&self, other: &OB, forward: M, reverse: R) -> TwoWayMapped<U>
	where
		Self: Sized + Clone,
		B: Value,
		U: Value,
		OB: MutableObservable<B> + Clone,
		M: Fn(&T, &B) -> U + Send + Sync + 'static,
		R: Fn(&T, &B, U) -> (T, B) + Send + Sync + 'static,
	{
		let mapped = {
			let (a, b) = (self.clone(), other.clone());
			Mapped::new(move || forward(&a.value(), &b.value()))
		};
		self.add_dependent(mapped.as_dependent());
		other.add_dependent(mapped.as_dependent());

		let write = {
			let (a, b) = (self.clone(), other.clone());
			move |value: U| {
				let (new_a, new_b) = reverse(&a.value(), &b.value(), value);
				a.set(new_a);
				b.set(new_b);
			}
		};
		TwoWayMapped::new(mapped, write)
	}

	/// Derives a mutable cell from this cell and 2 others
	fn two_way_join3<B, C, U, OB, OC, M, R>(
		&self,
		other_b: &OB,
		other_c: &OC,
		forward: M,
		reverse: R,
	) -> TwoWayMapped<U>
	where
		Self: Sized + Clone,
		B: Value,
		C: Value,
		U: Value,
		OB: MutableObservable<B> + Clone,
		OC: MutableObservable<C> + Clone,
		M: Fn(&T, &B, &C) -> U + Send + Sync + 'static,
		R: Fn(&T, &B, &C, U) -> (T, B, C) + Send + Sync + 'static,
	{
		let mapped = {
			let (a, b, c) = (self.clone(), other_b.clone(), other_c.clone());
			Mapped::new(move || forward(&a.value(), &b.value(), &c.value()))
		};
		self.add_dependent(mapped.as_dependent());
		other_b.add_dependent(mapped.as_dependent());
		other_c.add_dependent(mapped.as_dependent());

		let write = {
			let (a, b, c) = (self.clone(), other_b.clone(), other_c.clone());
			move |value: U| {
				let (new_a, new_b, new_c) = reverse(&a.value(), &b.value(), &c.value(), value);
				a.set(new_a);
				b.set(new_b);
				c.set(new_c);
			}
		};
		TwoWayMapped::new(mapped, write)
	}

	/// Derives a mutable cell from this cell and 3 others
	fn two_way_join4<B, C, D, U, OB, OC, OD, M, R>(
		&self,
		other_b: &OB,
		other_c: &OC,
		other_d: &OD,
		forward: M,
		reverse: R,
	) -> TwoWayMapped<U>
	where
		Self: Sized + Clone,
		B: Value,
		C: Value,
		D: Value,
		U: Value,
		OB: MutableObservable<B> + Clone,
		OC: MutableObservable<C> + Clone,
		OD: MutableObservable<D> + Clone,
		M: Fn(&T, &B, &C, &D) -> U + Send + Sync + 'static,
		R: Fn(&T, &B, &C, &D, U) -> (T, B, C, D) + Send + Sync + 'static,
	{
		let mapped = {
			let (a, b, c, d) = (self.clone(), other_b.clone(), other_c.clone(), other_d.clone());
			Mapped::new(move || forward(&a.value(), &b.value(), &c.value(), &d.value()))
		};
		self.add_dependent(mapped.as_dependent());
		other_b.add_dependent(mapped.as_dependent());
		other_c.add_dependent(mapped.as_dependent());
		other_d.add_dependent(mapped.as_dependent());

		let write = {
			let (a, b, c, d) = (self.clone(), other_b.clone(), other_c.clone(), other_d.clone());
			move |value: U| {
				let (new_a, new_b, new_c, new_d) = reverse(&a.value(), &b.value(), &c.value(), &d.value(), value);
				a.set(new_a);
				b.set(new_b);
				c.set(new_c);
				d.set(new_d);
			}
		};
		TwoWayMapped::new(mapped, write)
	}

	/// Derives a mutable cell from this cell and 4 others
	fn two_way_join5<B, C, D, E, U, OB, OC, OD, OE, M, R>(
		&self,
		other_b: &OB,
		other_c: &OC,
		other_d: &OD,
		other_e: &OE,
		forward: M,
		reverse: R,
	) -> TwoWayMapped<U>
	where
		Self: Sized + Clone,
		B: Value,
		C: Value,
		D: Value,
		E: Value,
		U: Value,
		OB: MutableObservable<B> + Clone,
		OC: MutableObservable<C> + Clone,
		OD: MutableObservable<D> + Clone,
		OE: MutableObservable<E> + Clone,
		M: Fn(&T, &B, &C, &D, &E) -> U + Send + Sync + 'static,
		R: Fn(&T, &B, &C, &D, &E, U) -> (T, B, C, D, E) + Send + Sync + 'static,
	{
		let mapped = {
			let (a, b, c, d, e) = (
				self.clone(),
				other_b.clone(),
				other_c.clone(),
				other_d.clone(),
				other_e.clone(),
			);
			Mapped::new(move || forward(&a.value(), &b.value(), &c.value(), &d.value(), &e.value()))
		};
		self.add_dependent(mapped.as_dependent());
		other_b.add_dependent(mapped.as_dependent());
		other_c.add_dependent(mapped.as_dependent());
		other_d.add_dependent(mapped.as_dependent());
		other_e.add_dependent(mapped.as_dependent());

		let write = {
			let (a, b, c, d, e) = (
				self.clone(),
				other_b.clone(),
				other_c.clone(),
				other_d.clone(),
				other_e.clone(),
			);
			move |value: U| {
				let (new_a, new_b, new_c, new_d, new_e) =
					reverse(&a.value(), &b.value(), &c.value(), &d.value(), &e.value(), value);
				a.set(new_a);
				b.set(new_b);
				c.set(new_c);
				d.set(new_d);
				e.set(new_e);
			}
		};
		TwoWayMapped::new(mapped, write)
	}

	/// Type-erases this cell into a cheap shared mutable handle
	fn to_shared_mut(&self) -> SharedMutableObservable<T>
	where
		Self: Sized + Clone,
	{
		SharedMutableObservable::new(self.clone())
	}
}

impl<T: Value, O: MutableObservable<T> + ?Sized> MutableObservableExt<T> for O {}

/// Flattening of nested observable cells
pub trait ObservableFlatten<T: Value> {
	/// Derives a cell that follows the currently-held inner cell
	fn flatten(&self) -> FlatMapped<T>;
}

impl<T, O> ObservableFlatten<T> for O
where
	T: Value,
	O: Observable<SharedObservable<T>> + Clone,
{
	fn flatten(&self) -> FlatMapped<T> {
		self.flat_map(Clone::clone)
	}
}
