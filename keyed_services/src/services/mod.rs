mod service_key;
mod service_type;

use std::{
	fmt,
	sync::Arc,
};

pub use service_key::ServiceKey;
pub use service_type::ServiceType;


/// Addresses one service inside a `ComponentContext`.
///
/// A registration can satisfy several descriptors at once. The container
/// recognizes plain typed services and keyed services; named services are
/// keyed services with a `String` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceDescriptor {
	Typed(ServiceType),
	Keyed(KeyedServiceDescriptor),
}

impl ServiceDescriptor {

	/// Describes the unkeyed service `V`
	pub fn typed<V: ?Sized + 'static>() -> ServiceDescriptor {
		return ServiceDescriptor::Typed(ServiceType::of::<V>());
	}

	/// Describes the service `V` registered under `key`
	pub fn keyed<V: ?Sized + 'static, K: ServiceKey>(key: K) -> ServiceDescriptor {
		return ServiceDescriptor::Keyed(KeyedServiceDescriptor::new::<V, K>(key));
	}

	/// Describes the service `V` registered under a `String` name
	pub fn named<V: ?Sized + 'static>(name: impl Into<String>) -> ServiceDescriptor {
		return ServiceDescriptor::keyed::<V, String>(name.into());
	}

	/// Gets the type the service is exposed as
	pub fn service_type(&self) -> ServiceType {
		return match self {
			ServiceDescriptor::Typed(service_type) => *service_type,
			ServiceDescriptor::Keyed(keyed) => keyed.service_type,
		};
	}

	pub fn as_keyed(&self) -> Option<&KeyedServiceDescriptor> {
		return match self {
			ServiceDescriptor::Keyed(keyed) => Some(keyed),
			ServiceDescriptor::Typed(_) => None,
		};
	}

}

impl fmt::Display for ServiceDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return match self {
			ServiceDescriptor::Typed(service_type) => write!(f, "{}", service_type),
			ServiceDescriptor::Keyed(keyed) => write!(f, "{}", keyed),
		};
	}
}


/// A service exposed as `service_type` and discriminated by a runtime-typed key.
#[derive(Debug, Clone, Hash)]
pub struct KeyedServiceDescriptor {
	key: Arc<dyn ServiceKey>,
	service_type: ServiceType,
}

impl KeyedServiceDescriptor {

	pub fn new<V: ?Sized + 'static, K: ServiceKey>(key: K) -> KeyedServiceDescriptor {
		return KeyedServiceDescriptor {
			key: Arc::new(key),
			service_type: ServiceType::of::<V>(),
		};
	}

	pub fn service_type(&self) -> ServiceType {
		return self.service_type;
	}

	/// Borrows the key as `K` if that is exactly its runtime type
	pub fn key_as<K: 'static>(&self) -> Option<&K> {
		return self.key.downcast_ref::<K>();
	}

	/// Projects this descriptor onto `(K, V)`.
	///
	/// Both the key's runtime type and the service type must match exactly.
	/// Keys of a convertible or wrapping type are not considered.
	pub fn matches<K: Clone + 'static, V: ?Sized + 'static>(&self) -> Option<K> {
		if !self.service_type.is::<V>() {
			return None;
		}
		return self.key_as::<K>().cloned();
	}

}

impl PartialEq for KeyedServiceDescriptor {
	fn eq(&self, other: &Self) -> bool {
		return *self.key == *other.key && self.service_type == other.service_type;
	}
}

impl Eq for KeyedServiceDescriptor {}

impl fmt::Display for KeyedServiceDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return write!(f, "{} (key {:?})", self.service_type, self.key);
	}
}
