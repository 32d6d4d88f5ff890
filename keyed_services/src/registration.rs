use std::{
	any::Any,
	fmt,
	marker::PhantomData,
	sync::{
		Arc,
		Mutex,
		PoisonError,
	},
};

use serde::{
	Serialize,
	Deserialize,
};
use uuid::Uuid;

use crate::{
	instance::{
		into_instance,
		Instance,
	},
	ComponentContext,
	ComponentRegistration,
	ServiceDescriptor,
	ServiceKey,
};

type Component = Arc<dyn Any + Send + Sync>;
type Activator = Box<dyn Fn(&dyn ComponentContext) -> anyhow::Result<Component> + Send + Sync>;
type Projector = Box<dyn Fn(&Component) -> Option<Instance> + Send + Sync>;


/// Controls how many component instances a registration hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstanceSharing {
	/// A new component is activated for every resolution
	InstancePerDependency,

	/// The first activation is kept and returned for every later resolution
	/// until the owning container is disposed
	SingleInstance,
}

impl Default for InstanceSharing {
	fn default() -> Self {
		return InstanceSharing::InstancePerDependency;
	}
}


/// A component registration held by a `Container`.
///
/// Each exposed service carries a projector that turns the activated component
/// into the `Arc<V>` the service is exposed as.
pub struct Registration {
	id: Uuid,
	component_name: &'static str,
	services: Vec<ServiceDescriptor>,
	projectors: Vec<Projector>,
	sharing: InstanceSharing,
	activator: Activator,
	shared: Mutex<Option<Component>>,
}

impl Registration {

	pub fn sharing(&self) -> InstanceSharing {
		return self.sharing;
	}

	pub fn component_name(&self) -> &'static str {
		return self.component_name;
	}

	/// Finds the position of `service` among the services this registration exposes
	pub(crate) fn position_of(&self, service: &ServiceDescriptor) -> Option<usize> {
		return self.services.iter().position(|exposed| exposed == service);
	}

	pub(crate) fn activate(&self, context: &dyn ComponentContext) -> anyhow::Result<Component> {
		return (self.activator)(context);
	}

	/// Gets the shared component, activating it through `activate` on first use.
	///
	/// The lock is not held while `activate` runs, so two threads may both
	/// activate a component. The first one stored wins and the other is dropped.
	pub(crate) fn shared_component<F>(&self, activate: F) -> anyhow::Result<Component>
	where
		F: FnOnce() -> anyhow::Result<Component>,
	{
		if let Some(ref component) = *self.shared.lock().unwrap_or_else(PoisonError::into_inner) {
			return Ok(Arc::clone(component));
		}

		let component = activate()?;

		let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
		return Ok(Arc::clone(shared.get_or_insert(component)));
	}

	/// Projects a component onto the service at `position`
	pub(crate) fn project(&self, position: usize, component: &Component) -> Option<Instance> {
		return self.projectors.get(position).and_then(|projector| projector(component));
	}

	/// Drops the shared component, if one was activated
	pub(crate) fn release(&self) {
		self.shared.lock().unwrap_or_else(PoisonError::into_inner).take();
	}

	pub fn describe(&self) -> RegistrationDescription {
		return RegistrationDescription {
			id: self.id,
			component: String::from(self.component_name),
			sharing: self.sharing,
			services: self.services.iter().map(|service| service.to_string()).collect(),
		};
	}

}

impl ComponentRegistration for Registration {
	fn id(&self) -> Uuid {
		return self.id;
	}

	fn services(&self) -> &[ServiceDescriptor] {
		return &self.services;
	}
}

impl fmt::Debug for Registration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.debug_struct("Registration")
			.field("id", &self.id)
			.field("component", &self.component_name)
			.field("services", &self.services)
			.field("sharing", &self.sharing)
			.finish();
	}
}


/// Self-documenting summary of a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDescription {
	pub id: Uuid,
	pub component: String,
	pub sharing: InstanceSharing,
	pub services: Vec<String>,
}


/// Builds a `Registration` for the component type `T`.
///
/// ```ignore
/// let registration = RegistrationBuilder::new(|_| Ok(Circle::new(2.0)))
/// 	.keyed_as::<dyn Shape, _>("circle", |circle| circle)
/// 	.single_instance()
/// 	.build();
/// ```
pub struct RegistrationBuilder<T> {
	activator: Activator,
	services: Vec<ServiceDescriptor>,
	projectors: Vec<Projector>,
	sharing: InstanceSharing,
	_component: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> RegistrationBuilder<T> {

	/// Starts a registration whose components are built by `activator`.
	/// The activator receives the context performing the resolution so it can
	/// resolve its own dependencies.
	pub fn new<F>(activator: F) -> RegistrationBuilder<T>
	where
		F: Fn(&dyn ComponentContext) -> anyhow::Result<T> + Send + Sync + 'static,
	{
		return RegistrationBuilder {
			activator: Box::new(move |context: &dyn ComponentContext| -> anyhow::Result<Component> {
				let component: Component = Arc::new(activator(context)?);
				return Ok(component);
			}),
			services: Vec::new(),
			projectors: Vec::new(),
			sharing: InstanceSharing::default(),
			_component: PhantomData,
		};
	}

	/// Registers a component that always hands out clones of `value`
	pub fn instance(value: T) -> RegistrationBuilder<T>
	where
		T: Clone,
	{
		return RegistrationBuilder::new(move |_| Ok(value.clone()));
	}

	fn expose<V: ?Sized + Send + Sync + 'static>(mut self, service: ServiceDescriptor, upcast: fn(Arc<T>) -> Arc<V>) -> Self {
		self.services.push(service);
		self.projectors.push(Box::new(move |component: &Component| -> Option<Instance> {
			let component = Arc::clone(component).downcast::<T>().ok()?;
			return Some(into_instance::<V>(upcast(component)));
		}));
		return self;
	}

	/// Exposes the component as its own type
	pub fn as_self(self) -> Self {
		return self.as_type::<T>(|component| component);
	}

	/// Exposes the component as `V`, usually a trait object
	pub fn as_type<V: ?Sized + Send + Sync + 'static>(self, upcast: fn(Arc<T>) -> Arc<V>) -> Self {
		return self.expose(ServiceDescriptor::typed::<V>(), upcast);
	}

	/// Exposes the component as its own type under `key`
	pub fn keyed<K: ServiceKey>(self, key: K) -> Self {
		return self.keyed_as::<T, K>(key, |component| component);
	}

	/// Exposes the component as `V` under `key`
	pub fn keyed_as<V: ?Sized + Send + Sync + 'static, K: ServiceKey>(self, key: K, upcast: fn(Arc<T>) -> Arc<V>) -> Self {
		return self.expose(ServiceDescriptor::keyed::<V, K>(key), upcast);
	}

	/// Exposes the component as its own type under a `String` name
	pub fn named(self, name: impl Into<String>) -> Self {
		return self.keyed::<String>(name.into());
	}

	/// Exposes the component as `V` under a `String` name
	pub fn named_as<V: ?Sized + Send + Sync + 'static>(self, name: impl Into<String>, upcast: fn(Arc<T>) -> Arc<V>) -> Self {
		return self.keyed_as::<V, String>(name.into(), upcast);
	}

	pub fn single_instance(mut self) -> Self {
		self.sharing = InstanceSharing::SingleInstance;
		return self;
	}

	/// Restores the default sharing mode, activating a new component per resolution
	pub fn instance_per_dependency(mut self) -> Self {
		self.sharing = InstanceSharing::InstancePerDependency;
		return self;
	}

	pub fn build(self) -> Registration {
		let builder = if self.services.is_empty() { self.as_self() } else { self };
		return Registration {
			id: Uuid::new_v4(),
			component_name: std::any::type_name::<T>(),
			services: builder.services,
			projectors: builder.projectors,
			sharing: builder.sharing,
			activator: builder.activator,
			shared: Mutex::new(None),
		};
	}

}
