use std::{
	cell::RefCell,
	sync::{
		atomic::{
			AtomicBool,
			Ordering,
		},
		Arc,
		PoisonError,
		RwLock,
	},
};

use log::{
	debug,
	trace,
	warn,
};
use rustc_hash::FxHashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::{
	instance::Instance,
	registration::{
		InstanceSharing,
		Registration,
		RegistrationDescription,
	},
	ComponentContext,
	ComponentRegistration,
	ResolutionError,
	ServiceDescriptor,
};


/// An error returned when adding a registration to a `Container`
#[derive(Debug, Error)]
pub enum RegistrationError {
	#[error("Cannot register components with a disposed container.")]
	ContainerDisposed,
}


#[derive(Default)]
struct RegistryState {
	/// Every registration, in the order it was added
	registrations: Vec<Arc<Registration>>,

	/// The registration that answers requests for each service. Later
	/// registrations replace earlier ones here but stay enumerable.
	defaults: FxHashMap<ServiceDescriptor, Arc<Registration>>,
}


/// # In-process component container
///
/// Holds registrations and activates them on request. Registrations may be
/// added at any time, including while other threads are resolving.
///
/// Each top-level request runs in its own resolve operation, which tracks the
/// registrations currently being activated so dependency cycles fail instead
/// of recursing forever.
pub struct Container {
	state: RwLock<RegistryState>,
	disposed: AtomicBool,
}

impl Container {

	pub fn new() -> Container {
		return Container {
			state: RwLock::new(RegistryState::default()),
			disposed: AtomicBool::new(false),
		};
	}

	/// Adds a registration and makes it the default for every service it exposes
	pub fn register(&self, registration: Registration) -> Result<Uuid, RegistrationError> {
		if self.is_disposed() {
			return Err(RegistrationError::ContainerDisposed);
		}

		let registration = Arc::new(registration);
		let id = registration.id();

		let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
		for service in registration.services() {
			state.defaults.insert(service.clone(), Arc::clone(&registration));
		}
		state.registrations.push(Arc::clone(&registration));
		drop(state);

		debug!("Registered {} ({}) as {} service(s)", registration.component_name(), id, registration.services().len());
		return Ok(id);
	}

	/// Describes every registration, in registration order
	pub fn describe(&self) -> Vec<RegistrationDescription> {
		let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
		return state.registrations.iter().map(|registration| registration.describe()).collect();
	}

	/// Releases shared components and stops serving requests
	pub fn dispose(&self) {
		if self.disposed.swap(true, Ordering::SeqCst) {
			return;
		}

		let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
		for registration in state.registrations.drain(..) {
			registration.release();
		}
		state.defaults.clear();
		drop(state);

		debug!("Container disposed");
	}

	fn default_for(&self, service: &ServiceDescriptor) -> Option<Arc<Registration>> {
		let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
		return state.defaults.get(service).map(Arc::clone);
	}

}

impl Default for Container {
	fn default() -> Self {
		return Container::new();
	}
}

impl ComponentContext for Container {
	fn resolve_service(&self, service: &ServiceDescriptor) -> Result<Instance, ResolutionError> {
		return ResolveOperation::new(self).resolve_service(service);
	}

	fn try_resolve_service(&self, service: &ServiceDescriptor) -> Result<Option<Instance>, ResolutionError> {
		return ResolveOperation::new(self).try_resolve_service(service);
	}

	fn is_registered(&self, service: &ServiceDescriptor) -> bool {
		return !self.is_disposed() && self.default_for(service).is_some();
	}

	fn registrations(&self) -> Vec<Arc<dyn ComponentRegistration>> {
		let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
		return state.registrations.iter()
			.map(|registration| Arc::clone(registration) as Arc<dyn ComponentRegistration>)
			.collect();
	}

	fn is_disposed(&self) -> bool {
		return self.disposed.load(Ordering::SeqCst);
	}
}


/// A single resolution request and everything it activates along the way.
///
/// Activators receive the operation as their `ComponentContext`, so nested
/// resolutions share the activation stack.
struct ResolveOperation<'a> {
	container: &'a Container,
	activating: RefCell<Vec<(Uuid, ServiceDescriptor)>>,
}

impl<'a> ResolveOperation<'a> {

	fn new(container: &'a Container) -> ResolveOperation<'a> {
		return ResolveOperation {
			container,
			activating: RefCell::new(Vec::new()),
		};
	}

	fn check_for_cycle(&self, registration: &Registration, service: &ServiceDescriptor) -> Result<(), ResolutionError> {
		let activating = self.activating.borrow();
		if !activating.iter().any(|(id, _)| *id == registration.id()) {
			return Ok(());
		}

		let mut chain: Vec<String> = activating.iter().map(|(_, service)| service.to_string()).collect();
		chain.push(service.to_string());
		warn!("Circular dependency detected: {}", chain.join(" -> "));
		return Err(ResolutionError::CircularDependency {
			service: service.clone(),
			chain,
		});
	}

	fn activate(&self, registration: &Registration, service: &ServiceDescriptor) -> Result<Instance, ResolutionError> {
		let position = registration.position_of(service).ok_or_else(|| ResolutionError::NotRegistered(service.clone()))?;
		self.check_for_cycle(registration, service)?;

		trace!("Activating {} for {}", registration.component_name(), service);
		self.activating.borrow_mut().push((registration.id(), service.clone()));
		let component = match registration.sharing() {
			InstanceSharing::SingleInstance => registration.shared_component(|| registration.activate(self)),
			InstanceSharing::InstancePerDependency => registration.activate(self),
		};
		self.activating.borrow_mut().pop();

		let component = component.map_err(|error| {
			// Failures from nested resolutions surface as they were raised
			return match error.downcast::<ResolutionError>() {
				Ok(nested) => nested,
				Err(error) => ResolutionError::Activation {
					service: service.clone(),
					source: error.into(),
				},
			};
		})?;

		return registration.project(position, &component).ok_or_else(|| ResolutionError::TypeMismatch {
			service: service.clone(),
		});
	}

}

impl<'a> ComponentContext for ResolveOperation<'a> {
	fn resolve_service(&self, service: &ServiceDescriptor) -> Result<Instance, ResolutionError> {
		return match self.try_resolve_service(service)? {
			Some(instance) => Ok(instance),
			None => Err(ResolutionError::NotRegistered(service.clone())),
		};
	}

	fn try_resolve_service(&self, service: &ServiceDescriptor) -> Result<Option<Instance>, ResolutionError> {
		if self.container.is_disposed() {
			return Err(ResolutionError::ContextDisposed);
		}
		return match self.container.default_for(service) {
			Some(registration) => self.activate(&registration, service).map(Some),
			None => Ok(None),
		};
	}

	fn is_registered(&self, service: &ServiceDescriptor) -> bool {
		return self.container.is_registered(service);
	}

	fn registrations(&self) -> Vec<Arc<dyn ComponentRegistration>> {
		return self.container.registrations();
	}

	fn is_disposed(&self) -> bool {
		return self.container.is_disposed();
	}
}
