mod drivers;
mod init;

use log::info;

use keyed_services::{
	ComponentContextExt,
	KeyedServiceIndex,
};

use drivers::{
	OutputDriver,
	UniverseRouter,
};

fn main() -> anyhow::Result<()> {
	#[cfg(feature = "stderr-logging")]
	env_logger::init();

	let container = init::build_container()?;

	let outputs = KeyedServiceIndex::<String, dyn OutputDriver, _>::new(&container)?;
	info!("{} output driver(s) registered", outputs.count());
	for entry in &outputs {
		let (key, driver) = entry?;
		println!("{:<16}{}", key, driver.describe());
	}

	let missing = String::from("artnet");
	if !outputs.contains_key(&missing) {
		println!("{:<16}(not installed)", missing);
	}

	let router = container.resolve::<UniverseRouter>()?;
	let routed: Vec<&str> = router.drivers.iter().map(|(_, driver)| driver.id()).collect();
	println!("Router targets: {}", routed.join(", "));

	println!("{}", serde_json::to_string_pretty(&container.describe())?);

	container.dispose();
	return Ok(());
}
