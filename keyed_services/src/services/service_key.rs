use std::{
	any::{
		Any,
		TypeId,
	},
	fmt::Debug,
	hash::{
		Hash,
		Hasher,
	},
};


/// A type-erased service key.
///
/// Any `'static` value that can be compared, hashed and shared between threads
/// can key a service. The key keeps its concrete type at runtime, so a `String`
/// key and a `&'static str` key with the same text address different services.
pub trait ServiceKey: Any + Debug + Send + Sync {

	/// Borrows the key as `Any` so it can be downcast to its concrete type
	fn as_any(&self) -> &dyn Any;

	/// Compares two keys. Keys of different runtime types are never equal.
	fn eq_key(&self, other: &dyn ServiceKey) -> bool;

	/// Feeds the key's runtime type and value into `state`
	fn hash_key(&self, state: &mut dyn Hasher);

}

impl<T> ServiceKey for T
where
	T: Any + Debug + Eq + Hash + Send + Sync,
{
	fn as_any(&self) -> &dyn Any {
		return self;
	}

	fn eq_key(&self, other: &dyn ServiceKey) -> bool {
		return match other.as_any().downcast_ref::<T>() {
			Some(other) => self == other,
			None => false,
		};
	}

	fn hash_key(&self, mut state: &mut dyn Hasher) {
		TypeId::of::<T>().hash(&mut state);
		self.hash(&mut state);
	}
}

impl dyn ServiceKey {

	/// Downcasts the key to `K` if that is its exact runtime type
	pub fn downcast_ref<K: 'static>(&self) -> Option<&K> {
		return self.as_any().downcast_ref::<K>();
	}

}

impl PartialEq for dyn ServiceKey {
	fn eq(&self, other: &Self) -> bool {
		return self.eq_key(other);
	}
}

impl Eq for dyn ServiceKey {}

impl Hash for dyn ServiceKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.hash_key(state);
	}
}
