use std::sync::Arc;

use keyed_services::{
	ComponentContextExt,
	RegistrationBuilder,
};


/// An output transport that can carry DMX universes
pub trait OutputDriver: Send + Sync {
	fn id(&self) -> &str;
	fn describe(&self) -> String;
}

pub struct E131Driver {
	pub port: u16,
}

impl OutputDriver for E131Driver {
	fn id(&self) -> &str {
		return "e131";
	}

	fn describe(&self) -> String {
		return format!("E1.31/sACN output on UDP port {}", self.port);
	}
}

pub struct OpenDmxDriver;

impl OutputDriver for OpenDmxDriver {
	fn id(&self) -> &str {
		return "enttecopendmx";
	}

	fn describe(&self) -> String {
		return String::from("Enttec OpenDMX USB output");
	}
}

/// Routes universes to whichever drivers were registered at activation time
pub struct UniverseRouter {
	pub drivers: Vec<(String, Arc<dyn OutputDriver>)>,
}

pub fn e131() -> RegistrationBuilder<E131Driver> {
	return RegistrationBuilder::new(|_| Ok(E131Driver { port: 5568 }))
		.keyed_as::<dyn OutputDriver, String>(String::from("e131"), |driver| driver as Arc<dyn OutputDriver>)
		.single_instance();
}

pub fn open_dmx() -> RegistrationBuilder<OpenDmxDriver> {
	return RegistrationBuilder::new(|_| Ok(OpenDmxDriver))
		.keyed_as::<dyn OutputDriver, String>(String::from("enttecopendmx"), |driver| driver as Arc<dyn OutputDriver>);
}

pub fn router() -> RegistrationBuilder<UniverseRouter> {
	return RegistrationBuilder::new(|context| {
		let index = context.keyed_index::<String, dyn OutputDriver>()?;
		let drivers = index.entries().collect::<Result<Vec<_>, _>>()?;
		return Ok(UniverseRouter { drivers });
	});
}
