use std::{
	any::Any,
	sync::Arc,
};

use crate::{
	ResolutionError,
	ServiceDescriptor,
};


/// A resolved service as handed out by a `ComponentContext`.
///
/// For a service exposed as `V`, the instance holds an `Arc<V>`. Wrapping the
/// `Arc` lets `V` be a trait object while still travelling through `Any`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Wraps a typed service so it can be returned from a context
pub fn into_instance<V: ?Sized + Send + Sync + 'static>(service: Arc<V>) -> Instance {
	return Arc::new(service);
}

/// Recovers the typed service from an instance resolved for `service`.
///
/// Fails with `ResolutionError::TypeMismatch` if the context produced
/// something other than an `Arc<V>`.
pub fn downcast_instance<V: ?Sized + Send + Sync + 'static>(instance: Instance, service: &ServiceDescriptor) -> Result<Arc<V>, ResolutionError> {
	return match instance.downcast_ref::<Arc<V>>() {
		Some(typed) => Ok(Arc::clone(typed)),
		None => Err(ResolutionError::TypeMismatch {
			service: service.clone(),
		}),
	};
}
