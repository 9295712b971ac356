//! Init command - write an example configuration file

use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use toxeval::config::{CONFIG_FILE_NAME, EXAMPLE_CONFIG};

/// Run the init command
pub fn run(dir: &Path) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        println!(
            "{} Config already exists at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!(
        "\n  Next: {}",
        style("toxeval evaluate --model <checkpoint> --corpus <dir>").bold()
    );
    Ok(())
}
