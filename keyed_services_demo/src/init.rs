use keyed_services::Container;

use crate::drivers;

/// Builds the container used by the demo
pub fn build_container() -> anyhow::Result<Container> {
	let container = Container::new();
	container.register(drivers::e131().build())?;
	container.register(drivers::open_dmx().build())?;
	container.register(drivers::router().build())?;
	return Ok(container);
}
