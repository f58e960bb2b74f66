//! Print the facade mapping tables.

use anyhow::Result;
use colored::Colorize;

use deskext_sdk::ERROR_CODE_CONTRACT_VERSION;
use deskext_sdk::api::all_mapping_tables;

pub fn execute(json: bool) -> Result<()> {
    let tables = all_mapping_tables();

    if json {
        let output = serde_json::json!({
            "errorCodeContractVersion": ERROR_CODE_CONTRACT_VERSION,
            "mappings": tables,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} (error codes v{})",
        "API Mappings".bold(),
        ERROR_CODE_CONTRACT_VERSION
    );
    println!("{}", "═".repeat(60));

    for table in &tables {
        println!();
        println!(
            "  {} {}",
            table.concept.cyan().bold(),
            format!("(unknown names report {})", table.invalid_code).dimmed()
        );
        for entry in &table.entries {
            let api = if entry.internal == entry.api.to_lowercase() {
                entry.api.normal()
            } else {
                entry.api.yellow()
            };
            println!("    {:<14} → {}", entry.internal, api);
        }
    }
    println!();

    Ok(())
}
