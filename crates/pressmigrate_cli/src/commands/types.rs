//! Types command implementation.

use super::Source;
use pressmigrate_engine::ExportTransport;
use std::error::Error;

/// Runs the types command.
pub fn run(source: &Source, format: &str) -> Result<(), Box<dyn Error>> {
    let config = source.config(None)?;
    let types = source.transport(&config)?.fetch_types()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&types)?),
        _ => {
            if types.is_empty() {
                println!("No public content types.");
            }
            for t in &types {
                println!("{:<24} {}", t.slug, t.label);
            }
        }
    }
    Ok(())
}
