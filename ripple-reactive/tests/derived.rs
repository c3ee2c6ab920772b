//! Mapped and joined cell tests

// Imports
use {
	core::sync::atomic::{AtomicUsize, Ordering},
	parking_lot::Mutex,
	ripple_reactive::{MutableObservable, Observable, ObservableExt, Source, join_all},
	std::sync::Arc,
};

#[test]
fn map_notifies_only_when_the_mapped_value_changes() {
	let observable = Source::new("test".to_owned());
	let mapped = observable.map(|value: &String| value.len());

	let source_count = Arc::new(AtomicUsize::new(0));
	let mapped_count = Arc::new(AtomicUsize::new(0));
	let _s1 = observable.on_change({
		let source_count = Arc::clone(&source_count);
		move |_value: &String| {
			source_count.fetch_add(1, Ordering::Relaxed);
		}
	});
	let _s2 = mapped.on_change({
		let mapped_count = Arc::clone(&mapped_count);
		move |_value: &usize| {
			mapped_count.fetch_add(1, Ordering::Relaxed);
		}
	});

	assert_eq!(mapped.value(), 4);

	observable.set("test2".to_owned());
	assert_eq!(source_count.load(Ordering::Relaxed), 1);
	assert_eq!(mapped_count.load(Ordering::Relaxed), 1);
	assert_eq!(mapped.value(), 5);

	// Same length: the source notifies, the mapped cell must not
	observable.set("2test".to_owned());
	assert_eq!(source_count.load(Ordering::Relaxed), 2);
	assert_eq!(mapped_count.load(Ordering::Relaxed), 1, "Mapped cell notified on an unchanged value");
	assert_eq!(mapped.value(), 5);
}

#[test]
fn maps_chain() {
	let observable = Source::new(String::new());
	let mapped1 = observable.map(|value: &String| format!("{value} one"));
	let mapped2 = mapped1.map(|value: &String| format!("{value} two"));
	let mapped3 = mapped2.map(|value: &String| format!("{value} three"));

	assert_eq!(observable.value(), "");
	assert_eq!(mapped1.value(), " one");
	assert_eq!(mapped2.value(), " one two");
	assert_eq!(mapped3.value(), " one two three");

	observable.set("zero".to_owned());

	assert_eq!(observable.value(), "zero");
	assert_eq!(mapped1.value(), "zero one");
	assert_eq!(mapped2.value(), "zero one two");
	assert_eq!(mapped3.value(), "zero one two three");
}

#[test]
fn optional_values_chain() {
	let observable = Source::new(None::<String>);
	let mapped1 = observable.map(|value: &Option<String>| value.as_ref().map(|value| format!("{value} one")));
	let mapped2 = mapped1.map(|value: &Option<String>| value.as_ref().map(|value| format!("{value} two")));

	let last = Arc::new(Mutex::new(Some("nothing".to_owned())));
	let _subscription = mapped2.on_change({
		let last = Arc::clone(&last);
		move |value: &Option<String>| *last.lock() = value.clone()
	});

	assert_eq!(mapped1.value(), None);
	assert_eq!(mapped2.value(), None);
	assert_eq!(*last.lock(), Some("nothing".to_owned()));

	observable.set(Some("zero".to_owned()));
	assert_eq!(mapped1.value(), Some("zero one".to_owned()));
	assert_eq!(mapped2.value(), Some("zero one two".to_owned()));
	assert_eq!(*last.lock(), Some("zero one two".to_owned()));

	observable.set(None);
	assert_eq!(*last.lock(), None);
}

#[test]
fn lazy_first_compute() {
	let observable = Source::new(2);
	let computes = Arc::new(AtomicUsize::new(0));
	let mapped = observable.map({
		let computes = Arc::clone(&computes);
		move |value: &i32| {
			computes.fetch_add(1, Ordering::Relaxed);
			value * 10
		}
	});

	assert_eq!(computes.load(Ordering::Relaxed), 0, "Mapped cell computed eagerly");
	assert_eq!(mapped.value(), 20);
	assert_eq!(computes.load(Ordering::Relaxed), 1);
	assert_eq!(mapped.value(), 20);
	assert_eq!(computes.load(Ordering::Relaxed), 1, "Memoized value was recomputed");
}

#[test]
fn join_notifies_only_when_the_joined_value_changes() {
	let o1 = Source::new(false);
	let o2 = Source::new(false);
	let joined = o1.join(&o2, |&a: &bool, &b: &bool| a && b);

	let notified = Arc::new(AtomicUsize::new(0));
	let _subscription = joined.on_change({
		let notified = Arc::clone(&notified);
		move |_value: &bool| {
			notified.fetch_add(1, Ordering::Relaxed);
		}
	});

	assert_eq!(notified.load(Ordering::Relaxed), 0);

	o1.set(true);
	assert_eq!(notified.load(Ordering::Relaxed), 0, "Join notified while its value was unchanged");

	o2.set(true);
	assert_eq!(notified.load(Ordering::Relaxed), 1);

	o1.set(false);
	assert_eq!(notified.load(Ordering::Relaxed), 2);
}

#[test]
fn join_reads_both_upstreams() {
	let o1 = Source::new("test".to_owned());
	let o2 = Source::new(5);
	let joined = o1.join(&o2, |a: &String, b: &i32| format!("{a} - {b}"));
	let summed = o1.join(&o2, |a: &String, b: &i32| {
		i64::try_from(a.len()).expect("Length overflow") + i64::from(*b)
	});

	let last_joined = Arc::new(Mutex::new(String::new()));
	let summed_count = Arc::new(AtomicUsize::new(0));
	let _s1 = joined.on_change({
		let last_joined = Arc::clone(&last_joined);
		move |value: &String| *last_joined.lock() = value.clone()
	});
	let _s2 = summed.on_change({
		let summed_count = Arc::clone(&summed_count);
		move |_value: &i64| {
			summed_count.fetch_add(1, Ordering::Relaxed);
		}
	});

	assert_eq!(joined.value(), "test - 5");
	assert_eq!(summed.value(), 9);

	// Writing one upstream recomputes without a write to the other
	o1.set("test2".to_owned());
	assert_eq!(*last_joined.lock(), "test2 - 5");
	assert_eq!(summed.value(), 10);
	assert_eq!(summed_count.load(Ordering::Relaxed), 1);

	o2.set(12);
	assert_eq!(*last_joined.lock(), "test2 - 12");
	assert_eq!(summed.value(), 17);
	assert_eq!(summed_count.load(Ordering::Relaxed), 2);

	// Same length: the sum is unchanged and must not notify
	o1.set("2test".to_owned());
	assert_eq!(*last_joined.lock(), "2test - 12");
	assert_eq!(summed.value(), 17);
	assert_eq!(summed_count.load(Ordering::Relaxed), 2, "Join notified on an unchanged value");
}

#[test]
fn wider_joins_recompute_on_any_upstream() {
	let a = Source::new(1i64);
	let b = Source::new(2i64);
	let c = Source::new(3i64);
	let d = Source::new(4i64);
	let e = Source::new(5i64);

	let sum3 = a.join3(&b, &c, |&a: &i64, &b: &i64, &c: &i64| a + b + c);
	let sum5 = a.join5(&b, &c, &d, &e, |&a: &i64, &b: &i64, &c: &i64, &d: &i64, &e: &i64| {
		a + b + c + d + e
	});

	assert_eq!(sum3.value(), 6);
	assert_eq!(sum5.value(), 15);

	b.set(20);
	assert_eq!(sum3.value(), 24);
	assert_eq!(sum5.value(), 33);

	e.set(50);
	assert_eq!(sum3.value(), 24);
	assert_eq!(sum5.value(), 78);
}

#[test]
fn list_join_recomputes_on_any_member() {
	let members = [
		Source::new("I".to_owned()),
		Source::new("am".to_owned()),
		Source::new("here.".to_owned()),
	];
	let cells = members.iter().map(ObservableExt::to_shared).collect::<Vec<_>>();
	let joined = join_all(&cells, |values: &[String]| values.join(" "));

	assert_eq!(joined.value(), "I am here.");

	members[2].set("there.".to_owned());
	assert_eq!(joined.value(), "I am there.");

	members[0].set("You".to_owned());
	members[1].set("are".to_owned());
	assert_eq!(joined.value(), "You are there.");
}

#[test]
fn dropped_derived_cells_stop_recomputing() {
	let observable = Source::new(1);
	let computes = Arc::new(AtomicUsize::new(0));
	let mapped = observable.map({
		let computes = Arc::clone(&computes);
		move |value: &i32| {
			computes.fetch_add(1, Ordering::Relaxed);
			value * 2
		}
	});

	assert_eq!(mapped.value(), 2);
	observable.set(2);
	assert_eq!(computes.load(Ordering::Relaxed), 2);

	drop(mapped);
	observable.set(3);
	assert_eq!(computes.load(Ordering::Relaxed), 2, "Dropped derived cell was recomputed");
}
