//! Phases command implementation

use anyhow::Result;

use tramite_phases::review_phases;

use super::json_emit::emit_phases_json;

/// Execute the phases command
pub fn execute_phases_command(json: bool) -> Result<()> {
    let phases = review_phases();

    if json {
        println!("{}", emit_phases_json(&phases)?);
        return Ok(());
    }

    for phase in &phases {
        println!("{}. {} - {}", phase.id, phase.name, phase.title);
        for item in &phase.items {
            println!("     • {item}");
        }
    }
    Ok(())
}
