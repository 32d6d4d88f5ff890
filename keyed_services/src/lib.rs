// Mods
mod container;
mod context;
mod index;
mod instance;
mod registration;
mod services;

// Tests
#[cfg(test)]
mod tests;

// Re-exports
pub use services::{
	KeyedServiceDescriptor,
	ServiceDescriptor,
	ServiceKey,
	ServiceType,
};
pub use context::{
	ComponentContext,
	ComponentContextExt,
	ComponentRegistration,
	ResolutionError,
};
pub use index::{
	ConstructionError,
	Entries,
	KeyedServiceIndex,
	Keys,
	Values,
};
pub use instance::{
	downcast_instance,
	into_instance,
	Instance,
};
pub use registration::{
	InstanceSharing,
	Registration,
	RegistrationBuilder,
	RegistrationDescription,
};
pub use container::{
	Container,
	RegistrationError,
};
