use std::{
	sync::{
		atomic::{
			AtomicUsize,
			Ordering,
		},
		mpsc,
		Arc,
	},
	thread,
	time::Duration,
};

use serde_json::json;

use super::fixtures::{
	palette,
	Shape,
	Swatch,
};
use crate::{
	ComponentContext,
	ComponentContextExt,
	Container,
	InstanceSharing,
	RegistrationBuilder,
	RegistrationDescription,
	RegistrationError,
	ResolutionError,
	ServiceDescriptor,
};

struct Chicken;
struct Egg;

struct Painter {
	colors: Vec<String>,
	shapes: Vec<Arc<dyn Shape>>,
}

#[test]
fn resolves_typed_and_named_services() {
	let container = Container::new();
	container.register(
		RegistrationBuilder::instance(Swatch::new("primary"))
			.as_self()
			.named("primary")
			.named_as::<dyn Shape>("primary", |swatch| swatch as Arc<dyn Shape>)
			.build()
	).unwrap();

	assert_eq!(container.resolve::<Swatch>().unwrap().name, "primary");
	assert_eq!(container.resolve_named::<Swatch>("primary").unwrap().name, "primary");
	assert_eq!(container.resolve_named::<dyn Shape>("primary").unwrap().name(), "primary");
	assert!(container.is_registered_type::<Swatch>());
	assert!(container.is_registered_with_key::<Swatch, String>(String::from("primary")));
	assert!(!container.is_registered_type::<dyn Shape>());
	assert!(container.try_resolve::<dyn Shape>().unwrap().is_none());
	assert!(container.try_resolve_keyed::<Swatch, String>(String::from("secondary")).unwrap().is_none());
}

#[test]
fn registration_without_services_exposes_itself() {
	let container = Container::new();
	container.register(RegistrationBuilder::instance(Swatch::new("plain")).build()).unwrap();
	assert_eq!(container.resolve::<Swatch>().unwrap().name, "plain");
}

#[test]
fn sharing_modes() {
	let container = Container::new();
	container.register(
		RegistrationBuilder::new(|_| Ok(Swatch::new("shared")))
			.named("shared")
			.single_instance()
			.build()
	).unwrap();
	container.register(
		RegistrationBuilder::new(|_| Ok(Swatch::new("fresh")))
			.named("fresh")
			.single_instance()
			.instance_per_dependency()
			.build()
	).unwrap();

	let first = container.resolve_named::<Swatch>("shared").unwrap();
	let second = container.resolve_named::<Swatch>("shared").unwrap();
	assert!(Arc::ptr_eq(&first, &second));

	let first = container.resolve_named::<Swatch>("fresh").unwrap();
	let second = container.resolve_named::<Swatch>("fresh").unwrap();
	assert!(!Arc::ptr_eq(&first, &second));
	assert_eq!(first, second);
}

#[test]
fn later_registrations_become_the_default() {
	let container = Container::new();
	for name in ["first", "second"] {
		container.register(
			RegistrationBuilder::instance(Swatch::new(name))
				.as_self()
				.keyed_as::<dyn Shape, u8>(1, |swatch| swatch as Arc<dyn Shape>)
				.build()
		).unwrap();
	}

	assert_eq!(container.resolve::<Swatch>().unwrap().name, "second");
	assert_eq!(container.registrations().len(), 2);

	let index = container.keyed_index::<u8, dyn Shape>().unwrap();
	assert_eq!(index.count(), 2);
	assert_eq!(index.get(&1).unwrap().name(), "second");
	assert_eq!(index.keys().collect::<Vec<_>>(), vec![1, 1]);

	// Each match resolves through the context, which answers with the default
	let names: Vec<String> = index.values().map(|shape| String::from(shape.unwrap().name())).collect();
	assert_eq!(names, vec!["second", "second"]);
}

#[test]
fn activators_resolve_dependencies_and_indexes() {
	let container = palette();
	container.register(
		RegistrationBuilder::new(|context| {
			let palette = context.keyed_index::<String, dyn Shape>()?;
			let mut colors: Vec<String> = palette.keys().collect();
			colors.sort();
			let shapes = palette.values().collect::<Result<Vec<_>, _>>()?;
			return Ok(Painter { colors, shapes });
		}).build()
	).unwrap();

	let painter = container.resolve::<Painter>().unwrap();
	assert_eq!(painter.colors, vec!["blue", "green", "red"]);
	assert_eq!(painter.shapes.len(), 3);
}

#[test]
fn circular_dependencies_are_detected() {
	let container = Container::new();
	container.register(
		RegistrationBuilder::new(|context| {
			context.resolve::<Egg>()?;
			return Ok(Chicken);
		}).build()
	).unwrap();
	container.register(
		RegistrationBuilder::new(|context| {
			context.resolve::<Chicken>()?;
			return Ok(Egg);
		}).single_instance().build()
	).unwrap();

	match container.resolve::<Chicken>() {
		Err(ResolutionError::CircularDependency { service, chain }) => {
			assert_eq!(service, ServiceDescriptor::typed::<Chicken>());
			assert_eq!(chain.len(), 3);
			assert!(chain[1].ends_with("Egg"));
		},
		Err(other) => panic!("Unexpected error: {}", other),
		Ok(_) => panic!("Resolved a circular dependency"),
	}

	// A failed operation leaves nothing behind for the next one
	assert!(matches!(container.resolve::<Egg>(), Err(ResolutionError::CircularDependency { .. })));
}

#[test]
fn missing_dependencies_propagate_unchanged() {
	let container = Container::new();
	container.register(
		RegistrationBuilder::new(|context| {
			context.resolve::<Egg>()?;
			return Ok(Chicken);
		}).build()
	).unwrap();

	match container.resolve::<Chicken>() {
		Err(ResolutionError::NotRegistered(service)) => assert_eq!(service, ServiceDescriptor::typed::<Egg>()),
		Err(other) => panic!("Unexpected error: {}", other),
		Ok(_) => panic!("Resolved without a dependency"),
	}
}

#[test]
fn dispose_releases_shared_components() {
	let container = Container::new();
	container.register(
		RegistrationBuilder::new(|_| Ok(Swatch::new("shared")))
			.single_instance()
			.build()
	).unwrap();

	let shared = Arc::downgrade(&container.resolve::<Swatch>().unwrap());
	assert!(shared.upgrade().is_some());

	container.dispose();
	assert!(shared.upgrade().is_none());
	assert!(container.is_disposed());
	assert!(!container.is_registered_type::<Swatch>());
	assert!(container.registrations().is_empty());
	assert!(matches!(container.resolve::<Swatch>(), Err(ResolutionError::ContextDisposed)));
	assert!(matches!(container.try_resolve::<Swatch>(), Err(ResolutionError::ContextDisposed)));
	assert!(matches!(
		container.register(RegistrationBuilder::instance(Swatch::new("late")).build()),
		Err(RegistrationError::ContainerDisposed)
	));
}

#[test]
fn describes_registrations() {
	let container = Container::new();
	let id = container.register(
		RegistrationBuilder::instance(Swatch::new("red"))
			.keyed_as::<dyn Shape, String>(String::from("red"), |swatch| swatch as Arc<dyn Shape>)
			.single_instance()
			.build()
	).unwrap();

	let descriptions = container.describe();
	assert_eq!(descriptions.len(), 1);
	assert_eq!(descriptions[0].id, id);
	assert_eq!(descriptions[0].sharing, InstanceSharing::SingleInstance);
	assert!(descriptions[0].component.ends_with("Swatch"));
	assert_eq!(descriptions[0].services.len(), 1);
	assert!(descriptions[0].services[0].ends_with("Shape (key \"red\")"));

	let value = serde_json::to_value(&descriptions[0]).unwrap();
	assert_eq!(value["id"], json!(id.to_string()));
	assert_eq!(value["sharing"], json!({ "type": "SingleInstance" }));
	assert_eq!(value["services"], json!(descriptions[0].services));

	let parsed: RegistrationDescription = serde_json::from_value(value).unwrap();
	assert_eq!(parsed, descriptions[0]);
}

#[test]
fn shared_cycles_across_threads_fail_instead_of_blocking() {
	let container = Arc::new(Container::new());
	container.register(
		RegistrationBuilder::new(|context| {
			thread::sleep(Duration::from_millis(100));
			context.resolve::<Egg>()?;
			return Ok(Chicken);
		}).single_instance().build()
	).unwrap();
	container.register(
		RegistrationBuilder::new(|context| {
			thread::sleep(Duration::from_millis(100));
			context.resolve::<Chicken>()?;
			return Ok(Egg);
		}).single_instance().build()
	).unwrap();

	let (sender, receiver) = mpsc::channel();
	let chicken_sender = sender.clone();
	let chicken_container = Arc::clone(&container);
	thread::spawn(move || {
		let result = chicken_container.resolve::<Chicken>().map(|_| ());
		let _ = chicken_sender.send(result);
	});
	let egg_container = Arc::clone(&container);
	thread::spawn(move || {
		let result = egg_container.resolve::<Egg>().map(|_| ());
		let _ = sender.send(result);
	});

	for _ in 0..2 {
		let result = receiver.recv_timeout(Duration::from_secs(5)).expect("Resolution blocked on a shared cycle");
		assert!(matches!(result, Err(ResolutionError::CircularDependency { .. })));
	}
}

#[test]
fn racing_resolutions_share_one_component() {
	let container = Arc::new(Container::new());
	let activations = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&activations);
	container.register(
		RegistrationBuilder::new(move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
			return Ok(Swatch::new("shared"));
		}).single_instance().build()
	).unwrap();

	let resolved: Vec<Arc<Swatch>> = thread::scope(|scope| {
		let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| container.resolve::<Swatch>().unwrap())).collect();
		return handles.into_iter().map(|handle| handle.join().unwrap()).collect();
	});

	// Racing threads may each activate, but all of them receive the stored component
	assert!(activations.load(Ordering::SeqCst) >= 1);
	assert!(resolved.iter().all(|swatch| Arc::ptr_eq(swatch, &resolved[0])));
	assert!(Arc::ptr_eq(&resolved[0], &container.resolve::<Swatch>().unwrap()));
}
