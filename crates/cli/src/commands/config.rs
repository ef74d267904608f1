use ytb::BridgeConfig;

use crate::error::Result;

pub fn execute(config: &BridgeConfig) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(config)?);
	Ok(())
}
