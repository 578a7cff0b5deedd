use clap::Parser;
use nwbmeta_engine::config::EngineConfig;
use serde_json::json;

use crate::Status;

/// Arguments for `nwbmeta device-types`
#[derive(Debug, Parser)]
pub struct DeviceTypesArgs {
    /// Output as JSON instead of text
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

pub fn run_device_types(config: &EngineConfig, args: DeviceTypesArgs) -> anyhow::Result<Status> {
    let catalog = config.build_catalog()?;

    if args.json {
        let entries: Vec<_> = catalog
            .keys()
            .filter_map(|key| catalog.get(key).map(|device| (key, device)))
            .map(|(key, device)| {
                json!({
                    "name": key,
                    "shank_count": device.shank_count,
                    "channels_per_shank": device.channels.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for key in catalog.keys() {
            if let Some(device) = catalog.get(key) {
                println!(
                    "{key}\t{} shank(s) x {} channel(s)",
                    device.shank_count,
                    device.channels.len()
                );
            }
        }
    }
    Ok(Status::Success)
}
