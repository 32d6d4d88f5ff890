use std::{
	marker::PhantomData,
	sync::Arc,
	vec,
};

use thiserror::Error;

use crate::{
	instance::downcast_instance,
	ComponentContext,
	ComponentRegistration,
	KeyedServiceDescriptor,
	ResolutionError,
	ServiceDescriptor,
	ServiceKey,
};


/// An error returned when a `KeyedServiceIndex` cannot be bound to a context
#[derive(Debug, Error)]
pub enum ConstructionError {
	#[error("Cannot create a keyed service index over a disposed component context.")]
	ContextDisposed,
}


/// # Read-only map of keyed services
///
/// Presents every service exposed as `V` under a key of type `K` as a map
/// `K -> Arc<V>`. The index holds no state of its own: each call reads the
/// context's current registrations, so registrations added after the index was
/// created are visible immediately.
///
/// ## Key types
///
/// Keys are matched on their exact runtime type. An index over `String` keys
/// will not see services keyed by `&'static str`, and an index over a newtype
/// will not see services keyed by the wrapped type.
///
/// ## Threading
///
/// The index adds no synchronization. It can be shared between threads exactly
/// when the context can.
pub struct KeyedServiceIndex<'c, K, V, C>
where
	V: ?Sized,
	C: ?Sized,
{
	context: &'c C,
	_types: PhantomData<fn() -> (K, Arc<V>)>,
}

impl<'c, K, V, C> KeyedServiceIndex<'c, K, V, C>
where
	K: ServiceKey + Clone,
	V: ?Sized + Send + Sync + 'static,
	C: ComponentContext + ?Sized,
{

	/// Binds an index to `context`. Fails if the context has been disposed.
	pub fn new(context: &'c C) -> Result<KeyedServiceIndex<'c, K, V, C>, ConstructionError> {
		if context.is_disposed() {
			return Err(ConstructionError::ContextDisposed);
		}
		return Ok(KeyedServiceIndex {
			context,
			_types: PhantomData,
		});
	}

	fn descriptor(key: &K) -> ServiceDescriptor {
		return ServiceDescriptor::keyed::<V, K>(key.clone());
	}

	/// Resolves the service registered under `key`. Errors from the context,
	/// including `ResolutionError::NotRegistered`, are returned unchanged.
	pub fn get(&self, key: &K) -> Result<Arc<V>, ResolutionError> {
		let service = Self::descriptor(key);
		let instance = self.context.resolve_service(&service)?;
		return downcast_instance::<V>(instance, &service);
	}

	/// Checks whether a service is registered under `key` without activating it
	pub fn contains_key(&self, key: &K) -> bool {
		return self.context.is_registered(&Self::descriptor(key));
	}

	/// Resolves the service registered under `key`, returning `Ok(None)` if
	/// there is none. Activation failures are still returned as `Err`.
	pub fn try_get(&self, key: &K) -> Result<Option<Arc<V>>, ResolutionError> {
		let service = Self::descriptor(key);
		return match self.context.try_resolve_service(&service)? {
			Some(instance) => downcast_instance::<V>(instance, &service).map(Some),
			None => Ok(None),
		};
	}

	/// Lazily resolves every matching service as `(key, value)`.
	///
	/// Each call takes a fresh snapshot of the context's registrations. Services
	/// are activated as the iterator reaches them, and activation failures are
	/// yielded in place.
	pub fn entries(&self) -> Entries<'c, K, V, C> {
		return Entries {
			context: self.context,
			matches: Matches::new(self.context.registrations()),
		};
	}

	/// Lists the keys of every matching service without activating anything
	pub fn keys(&self) -> Keys<K, V> {
		return Keys(Matches::new(self.context.registrations()));
	}

	/// Lazily resolves every matching service. This activates each service just
	/// like `entries`.
	pub fn values(&self) -> Values<'c, K, V, C> {
		return Values(self.entries());
	}

	/// Counts the matching services without activating them
	pub fn count(&self) -> usize {
		return Matches::<K, V>::new(self.context.registrations()).count();
	}

	/// Checks whether any service matches, without activating anything
	pub fn is_empty(&self) -> bool {
		return self.count() == 0;
	}

}

impl<'c, K, V, C> Clone for KeyedServiceIndex<'c, K, V, C>
where
	V: ?Sized,
	C: ?Sized,
{
	fn clone(&self) -> Self {
		return KeyedServiceIndex {
			context: self.context,
			_types: PhantomData,
		};
	}
}

impl<'a, 'c, K, V, C> IntoIterator for &'a KeyedServiceIndex<'c, K, V, C>
where
	K: ServiceKey + Clone,
	V: ?Sized + Send + Sync + 'static,
	C: ComponentContext + ?Sized,
{
	type Item = Result<(K, Arc<V>), ResolutionError>;
	type IntoIter = Entries<'c, K, V, C>;

	fn into_iter(self) -> Self::IntoIter {
		return self.entries();
	}
}


/// Walks a registration snapshot and yields the keyed descriptors whose key
/// type is exactly `K` and whose service type is exactly `V`.
struct Matches<K, V: ?Sized> {
	registrations: vec::IntoIter<Arc<dyn ComponentRegistration>>,
	current: Option<Arc<dyn ComponentRegistration>>,
	position: usize,
	_types: PhantomData<fn() -> (K, Arc<V>)>,
}

impl<K, V> Matches<K, V>
where
	K: ServiceKey + Clone,
	V: ?Sized + 'static,
{
	fn new(registrations: Vec<Arc<dyn ComponentRegistration>>) -> Matches<K, V> {
		return Matches {
			registrations: registrations.into_iter(),
			current: None,
			position: 0,
			_types: PhantomData,
		};
	}
}

impl<K, V> Iterator for Matches<K, V>
where
	K: ServiceKey + Clone,
	V: ?Sized + 'static,
{
	type Item = (K, KeyedServiceDescriptor);

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(ref registration) = self.current {
				let services = registration.services();
				while self.position < services.len() {
					let service = &services[self.position];
					self.position += 1;
					if let Some(keyed) = service.as_keyed() {
						if let Some(key) = keyed.matches::<K, V>() {
							return Some((key, keyed.clone()));
						}
					}
				}
			}
			self.current = Some(self.registrations.next()?);
			self.position = 0;
		}
	}
}


/// Iterator returned by `KeyedServiceIndex::entries`
pub struct Entries<'c, K, V: ?Sized, C: ?Sized> {
	context: &'c C,
	matches: Matches<K, V>,
}

impl<'c, K, V, C> Iterator for Entries<'c, K, V, C>
where
	K: ServiceKey + Clone,
	V: ?Sized + Send + Sync + 'static,
	C: ComponentContext + ?Sized,
{
	type Item = Result<(K, Arc<V>), ResolutionError>;

	fn next(&mut self) -> Option<Self::Item> {
		let (key, keyed) = self.matches.next()?;
		let service = ServiceDescriptor::Keyed(keyed);
		let resolved = self.context.resolve_service(&service)
			.and_then(|instance| downcast_instance::<V>(instance, &service));
		return Some(resolved.map(|value| (key, value)));
	}
}


/// Iterator returned by `KeyedServiceIndex::keys`
pub struct Keys<K, V: ?Sized>(Matches<K, V>);

impl<K, V> Iterator for Keys<K, V>
where
	K: ServiceKey + Clone,
	V: ?Sized + 'static,
{
	type Item = K;

	fn next(&mut self) -> Option<K> {
		return self.0.next().map(|(key, _)| key);
	}
}


/// Iterator returned by `KeyedServiceIndex::values`
pub struct Values<'c, K, V: ?Sized, C: ?Sized>(Entries<'c, K, V, C>);

impl<'c, K, V, C> Iterator for Values<'c, K, V, C>
where
	K: ServiceKey + Clone,
	V: ?Sized + Send + Sync + 'static,
	C: ComponentContext + ?Sized,
{
	type Item = Result<Arc<V>, ResolutionError>;

	fn next(&mut self) -> Option<Self::Item> {
		return self.0.next().map(|entry| entry.map(|(_, value)| value));
	}
}
