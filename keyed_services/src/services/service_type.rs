use std::{
	any::{
		type_name,
		TypeId,
	},
	fmt,
	hash::{
		Hash,
		Hasher,
	},
};


/// Identifies the type a service is exposed as.
///
/// Equality only considers the `TypeId`. The name is kept for error messages
/// and self-documentation.
#[derive(Debug, Clone, Copy)]
pub struct ServiceType {
	id: TypeId,
	name: &'static str,
}

impl ServiceType {

	pub fn of<V: ?Sized + 'static>() -> ServiceType {
		return ServiceType {
			id: TypeId::of::<V>(),
			name: type_name::<V>(),
		};
	}

	pub fn name(&self) -> &'static str {
		return self.name;
	}

	pub fn is<V: ?Sized + 'static>(&self) -> bool {
		return self.id == TypeId::of::<V>();
	}

}

impl PartialEq for ServiceType {
	fn eq(&self, other: &Self) -> bool {
		return self.id == other.id;
	}
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Display for ServiceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.write_str(self.name);
	}
}
