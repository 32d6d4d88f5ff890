use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::{
	instance::{
		downcast_instance,
		Instance,
	},
	index::{
		ConstructionError,
		KeyedServiceIndex,
	},
	ServiceDescriptor,
	ServiceKey,
};


/// An error raised while resolving a service from a `ComponentContext`
#[derive(Debug, Error)]
pub enum ResolutionError {
	#[error("The requested service '{0}' has not been registered.")]
	NotRegistered(ServiceDescriptor),

	#[error("Circular component dependency detected while resolving '{service}': {}", format_chain(.chain))]
	CircularDependency {
		service: ServiceDescriptor,
		chain: Vec<String>,
	},

	#[error("An error occurred while activating '{service}': {source}")]
	Activation {
		service: ServiceDescriptor,
		#[source]
		source: Box<dyn std::error::Error + Send + Sync + 'static>,
	},

	#[error("The instance resolved for '{service}' was not of the requested type.")]
	TypeMismatch {
		service: ServiceDescriptor,
	},

	#[error("The component context has been disposed.")]
	ContextDisposed,
}

fn format_chain(chain: &[String]) -> String {
	return chain.join(" -> ");
}


/// A registration as seen through a `ComponentContext`
pub trait ComponentRegistration: Send + Sync {

	/// Gets the unique ID assigned to the registration
	fn id(&self) -> Uuid;

	/// Gets the services this registration can satisfy
	fn services(&self) -> &[ServiceDescriptor];

}


/// Locates and activates services.
///
/// This is the capability `KeyedServiceIndex` reads through. It is object safe,
/// so activators and indexes can work against `&dyn ComponentContext`. Typed
/// helpers live on `ComponentContextExt`.
pub trait ComponentContext {

	/// Resolves `service`, failing with `ResolutionError::NotRegistered` when
	/// nothing provides it.
	fn resolve_service(&self, service: &ServiceDescriptor) -> Result<Instance, ResolutionError>;

	/// Resolves `service` if it is registered. Activation errors are still
	/// returned as `Err`.
	fn try_resolve_service(&self, service: &ServiceDescriptor) -> Result<Option<Instance>, ResolutionError>;

	/// Checks whether `service` is registered without activating anything
	fn is_registered(&self, service: &ServiceDescriptor) -> bool;

	/// Takes a snapshot of every registration, in registration order
	fn registrations(&self) -> Vec<Arc<dyn ComponentRegistration>>;

	/// Indicates that the context can no longer serve requests
	fn is_disposed(&self) -> bool {
		return false;
	}

}


/// Statically-typed helpers over any `ComponentContext`
pub trait ComponentContextExt: ComponentContext {

	fn resolve<V: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<V>, ResolutionError> {
		let service = ServiceDescriptor::typed::<V>();
		let instance = self.resolve_service(&service)?;
		return downcast_instance::<V>(instance, &service);
	}

	fn resolve_keyed<V: ?Sized + Send + Sync + 'static, K: ServiceKey>(&self, key: K) -> Result<Arc<V>, ResolutionError> {
		let service = ServiceDescriptor::keyed::<V, K>(key);
		let instance = self.resolve_service(&service)?;
		return downcast_instance::<V>(instance, &service);
	}

	fn resolve_named<V: ?Sized + Send + Sync + 'static>(&self, name: impl Into<String>) -> Result<Arc<V>, ResolutionError> {
		return self.resolve_keyed::<V, String>(name.into());
	}

	fn try_resolve<V: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<V>>, ResolutionError> {
		let service = ServiceDescriptor::typed::<V>();
		return match self.try_resolve_service(&service)? {
			Some(instance) => downcast_instance::<V>(instance, &service).map(Some),
			None => Ok(None),
		};
	}

	fn try_resolve_keyed<V: ?Sized + Send + Sync + 'static, K: ServiceKey>(&self, key: K) -> Result<Option<Arc<V>>, ResolutionError> {
		let service = ServiceDescriptor::keyed::<V, K>(key);
		return match self.try_resolve_service(&service)? {
			Some(instance) => downcast_instance::<V>(instance, &service).map(Some),
			None => Ok(None),
		};
	}

	fn is_registered_type<V: ?Sized + 'static>(&self) -> bool {
		return self.is_registered(&ServiceDescriptor::typed::<V>());
	}

	fn is_registered_with_key<V: ?Sized + 'static, K: ServiceKey>(&self, key: K) -> bool {
		return self.is_registered(&ServiceDescriptor::keyed::<V, K>(key));
	}

	/// Creates a `KeyedServiceIndex` reading through this context
	fn keyed_index<K, V>(&self) -> Result<KeyedServiceIndex<'_, K, V, Self>, ConstructionError>
	where
		K: ServiceKey + Clone,
		V: ?Sized + Send + Sync + 'static,
	{
		return KeyedServiceIndex::new(self);
	}

}

impl<C: ComponentContext + ?Sized> ComponentContextExt for C {}
