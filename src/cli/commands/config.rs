//! Config command implementation
//!
//! Prints every effective setting with the layer it came from.

use std::collections::BTreeMap;

use anyhow::Result;

use super::json_emit::emit_config_json;
use crate::Config;

/// Execute the config command
pub fn execute_config_command(config: &Config, json: bool) -> Result<()> {
    let effective: BTreeMap<String, (String, String)> = config.effective_config().into_iter().collect();

    if json {
        println!("{}", emit_config_json(config.config_path.as_deref(), &effective)?);
        return Ok(());
    }

    match &config.config_path {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    let width = effective.keys().map(String::len).max().unwrap_or(0);
    for (key, (value, source)) in &effective {
        println!("  {key:<width$} = {value}  [{source}]");
    }
    Ok(())
}
