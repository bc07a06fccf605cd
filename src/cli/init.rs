use super::config::{default_config_path, default_snapshot_path, CouncilConfig};
use std::path::PathBuf;

/// Write a default configuration seeded with the given controllers
///
/// Refuses to overwrite an existing config unless `force` is set. The
/// snapshot path defaults to `state.cbor` next to the config file.
pub async fn execute(
    config_path: Option<String>,
    controllers: Vec<String>,
    snapshot: Option<String>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    if config_path.exists() && !force {
        return Err(format!(
            "Config file '{}' already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    CouncilConfig::new(controllers.clone()).validate()?;

    let snapshot_path = snapshot
        .map(PathBuf::from)
        .unwrap_or_else(|| default_snapshot_path(&config_path));

    CouncilConfig::create_default(&config_path, &controllers, &snapshot_path)?;
    CouncilConfig::load(&config_path)?;

    println!("Created: {}", config_path.display());
    println!("Snapshot: {}", snapshot_path.display());
    println!("Initial controllers:");
    for controller in &controllers {
        println!("  {}", controller);
    }

    Ok(())
}
