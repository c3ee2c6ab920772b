//! Flat-mapped cell tests

// Imports
use {
	core::sync::atomic::{AtomicUsize, Ordering},
	parking_lot::Mutex,
	ripple_reactive::{
		Constant, MutableObservable, Observable, ObservableExt, ObservableFlatten, SharedObservable, Source,
		join_all,
	},
	std::sync::Arc,
};

#[test]
fn follows_the_selected_delegate() {
	let selector = Source::new(0);
	let positive = Source::new("it is true".to_owned());
	let negative = Source::new("that is not true".to_owned());

	let mapped = selector.flat_map({
		let (positive, negative) = (positive.clone(), negative.clone());
		move |value: &i32| match *value > 0 {
			true => positive.to_shared(),
			false => negative.to_shared(),
		}
	});

	let switches = Arc::new(AtomicUsize::new(0));
	let last = Arc::new(Mutex::new(String::new()));
	let _subscription = mapped.on_change({
		let switches = Arc::clone(&switches);
		let last = Arc::clone(&last);
		move |value: &String| {
			switches.fetch_add(1, Ordering::Relaxed);
			*last.lock() = value.clone();
		}
	});

	assert_eq!(mapped.value(), "that is not true");

	// The unselected branch must not propagate
	positive.set("it is almost true".to_owned());
	assert_eq!(switches.load(Ordering::Relaxed), 0, "Unselected delegate propagated");
	assert_eq!(mapped.value(), "that is not true");

	// The selected branch must
	negative.set("it is not really true".to_owned());
	assert_eq!(switches.load(Ordering::Relaxed), 1);
	assert_eq!(*last.lock(), "it is not really true");

	// Switching fires exactly once, with the new delegate's value
	selector.set(1);
	assert_eq!(switches.load(Ordering::Relaxed), 2, "Delegate switch didn't fire exactly once");
	assert_eq!(*last.lock(), "it is almost true");
	assert_eq!(mapped.value(), "it is almost true");

	// A selector change that keeps the delegate is silent
	selector.set(2);
	assert_eq!(switches.load(Ordering::Relaxed), 2, "Unchanged delegate fired");

	// After the switch the roles are reversed
	negative.set("it is not yet true".to_owned());
	assert_eq!(switches.load(Ordering::Relaxed), 2, "Unselected delegate propagated");

	positive.set("it is still true".to_owned());
	assert_eq!(switches.load(Ordering::Relaxed), 3);
	assert_eq!(*last.lock(), "it is still true");
}

#[test]
fn switching_to_an_equal_value_is_silent() {
	let selector = Source::new(false);
	let left = Source::new("same".to_owned());
	let right = Source::new("same".to_owned());

	let mapped = selector.flat_map({
		let (left, right) = (left.clone(), right.clone());
		move |value: &bool| match *value {
			true => right.to_shared(),
			false => left.to_shared(),
		}
	});

	let notified = Arc::new(AtomicUsize::new(0));
	let _subscription = mapped.on_change({
		let notified = Arc::clone(&notified);
		move |_value: &String| {
			notified.fetch_add(1, Ordering::Relaxed);
		}
	});

	// Both delegates hold equal values, so the switch must not notify
	selector.set(true);
	assert_eq!(notified.load(Ordering::Relaxed), 0, "Equal-valued switch notified");

	// But changes through the new delegate propagate
	right.set("different".to_owned());
	assert_eq!(notified.load(Ordering::Relaxed), 1);
}

#[test]
fn released_subscriptions_stop_while_others_continue() {
	let o1 = Source::new("one".to_owned());
	let o2 = Source::new(1);
	let selector = Source::new(false);

	let mapped = selector.flat_map({
		let (o1, o2) = (o1.clone(), o2.clone());
		move |value: &bool| match *value {
			true => o1.to_shared(),
			false => o2.map(|value: &i32| value.to_string()).to_shared(),
		}
	});

	let ref1 = Arc::new(Mutex::new(String::new()));
	let ref2 = Arc::new(Mutex::new(String::new()));
	let s1 = mapped.run_and_on_change({
		let ref1 = Arc::clone(&ref1);
		move |value: &String| *ref1.lock() = value.clone()
	});
	let s2 = mapped.run_and_on_change({
		let ref2 = Arc::clone(&ref2);
		move |value: &String| *ref2.lock() = value.clone()
	});

	assert_eq!(*ref1.lock(), "1");
	assert_eq!(*ref2.lock(), "1");
	assert_eq!(mapped.value(), "1");

	selector.set(true);
	assert_eq!(*ref1.lock(), "one");
	assert_eq!(*ref2.lock(), "one");

	o1.set("two".to_owned());
	assert_eq!(*ref1.lock(), "two");
	assert_eq!(*ref2.lock(), "two");

	s1.release();
	o1.set("three".to_owned());
	assert_eq!(*ref1.lock(), "two", "Released listener was invoked");
	assert_eq!(*ref2.lock(), "three");

	s2.release();
}

#[test]
fn flattens_a_list_of_cells() {
	let list: Source<Vec<SharedObservable<String>>> = Source::new(vec![]);

	let joined = list.flat_map(|cells: &Vec<SharedObservable<String>>| {
		join_all(cells, |values: &[String]| values.join(", ")).to_shared()
	});
	let rendered = joined.map(|value: &String| format!(" - {value}"));

	let last = Arc::new(Mutex::new(String::new()));
	let _subscription = rendered.run_and_on_change({
		let last = Arc::clone(&last);
		move |value: &String| *last.lock() = value.clone()
	});

	assert_eq!(*last.lock(), " - ");

	let push = |cell: SharedObservable<String>| {
		let mut cells = list.value();
		cells.push(cell);
		list.set(cells);
	};

	push(Constant::new("Hello".to_owned()).to_shared());
	assert_eq!(*last.lock(), " - Hello");

	push(Constant::new("World".to_owned()).to_shared());
	assert_eq!(*last.lock(), " - Hello, World");

	let mut expected = " - Hello, World".to_owned();
	for value in 0..40 {
		expected = format!("{expected}, {value}");
		push(Constant::new(value.to_string()).to_shared());
		assert_eq!(*last.lock(), expected);
	}
}

#[test]
fn flatten_follows_the_inner_cell() {
	let inner1 = Source::new(1);
	let inner2 = Source::new(2);
	let outer = Source::new(inner1.to_shared());

	let flattened = outer.flatten();
	assert_eq!(flattened.value(), 1);

	inner1.set(10);
	assert_eq!(flattened.value(), 10);

	outer.set(inner2.to_shared());
	assert_eq!(flattened.value(), 2);

	// The previously-selected cell no longer propagates
	let notified = Arc::new(AtomicUsize::new(0));
	let _subscription = flattened.on_change({
		let notified = Arc::clone(&notified);
		move |_value: &i32| {
			notified.fetch_add(1, Ordering::Relaxed);
		}
	});
	inner1.set(100);
	assert_eq!(notified.load(Ordering::Relaxed), 0, "Unselected cell propagated");
	inner2.set(20);
	assert_eq!(notified.load(Ordering::Relaxed), 1);
}
