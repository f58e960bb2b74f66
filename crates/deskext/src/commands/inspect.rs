//! Inspect an extension directory.
//!
//! Loads the manifest into a throwaway host, activates it and drains its
//! command registrations, reporting what the host accepts.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use deskext_sdk::{ApiError, ExtensionHost, ExtensionInfoApi, ExtensionLoader};

use crate::config::Config;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectOutput {
    info: ExtensionInfoApi,
    strings: Vec<String>,
    accepted: Vec<AcceptedCommand>,
    rejected: Vec<RejectedCommand>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AcceptedCommand {
    name: String,
    caption: String,
    menu_path: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct RejectedCommand {
    name: String,
    error: ApiError,
}

pub async fn execute(dir: &Path, json: bool, config: &Config) -> Result<()> {
    let bundle = ExtensionLoader::default()
        .load_from_dir(dir)
        .await
        .with_context(|| format!("Failed to load extension from {}", dir.display()))?;

    let host = ExtensionHost::new(config.sdk.clone())?;
    let handle = host.load_bundle(&bundle);
    let ctx = host.activate(handle)?;
    let drained = host.drain_registrations(handle)?;

    let accepted = host
        .commands_for(handle)
        .iter()
        .map(|command| AcceptedCommand {
            name: command.name().to_string(),
            caption: host.command_caption(command),
            menu_path: command
                .default_menu_bar_item_position()
                .map(|position| position.menu_path.clone()),
        })
        .collect();
    let output = InspectOutput {
        info: ctx.self_info().clone(),
        strings: bundle.strings.iter().map(str::to_string).collect(),
        accepted,
        rejected: drained
            .rejected
            .into_iter()
            .map(|(name, error)| RejectedCommand { name, error })
            .collect(),
    };
    host.unload(handle)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_output(&output);
    Ok(())
}

fn print_output(output: &InspectOutput) {
    let info = &output.info;
    println!("{}", "Extension Details".bold());
    println!("{}", "═".repeat(60));
    println!("  {} {}/{}", "Name:".cyan(), info.publisher_name, info.name);
    println!("  {} {}", "Publisher type:".cyan(), info.publisher_type);
    println!("  {} {}", "Version:".cyan(), info.version);
    if !info.short_description.is_empty() {
        println!("  {} {}", "Description:".cyan(), info.short_description);
    }

    println!();
    println!("  {} ({})", "Strings".bold(), output.strings.len());
    for (index, string) in output.strings.iter().enumerate() {
        println!("    {:>3}  {}", index, string);
    }

    println!();
    println!("  {} ({})", "Commands".bold(), output.accepted.len());
    for command in &output.accepted {
        let menu = command
            .menu_path
            .as_ref()
            .map(|path| format!(" [{}]", path.join(" › ")))
            .unwrap_or_default();
        println!(
            "    {} {} {}{}",
            "●".green(),
            command.name.bold(),
            command.caption,
            menu.dimmed()
        );
    }

    if !output.rejected.is_empty() {
        println!();
        println!("  {} ({})", "Rejected".red().bold(), output.rejected.len());
        for rejected in &output.rejected {
            println!(
                "    {} {} {}",
                "✗".red(),
                rejected.name.bold(),
                rejected.error
            );
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, commands: serde_json::Value) {
        let manifest = serde_json::json!({
            "publisherType": "User",
            "publisherName": "desk",
            "name": "ticker",
            "version": "1.0.0",
            "strings": ["Show ticker"],
            "commands": commands,
        });
        std::fs::write(dir.join("manifest.json"), manifest.to_string()).unwrap();
    }

    #[test]
    fn test_inspect_valid_extension() {
        let temp = TempDir::new().unwrap();
        write_manifest(
            temp.path(),
            serde_json::json!([{ "name": "show", "defaultDisplayIndex": 0 }]),
        );
        let result = tokio_test::block_on(execute(temp.path(), true, &Config::default()));
        assert!(result.is_ok());
    }

    #[test]
    fn test_inspect_reports_rejections_without_failing() {
        let temp = TempDir::new().unwrap();
        write_manifest(
            temp.path(),
            serde_json::json!([{ "name": "hide", "defaultDisplayIndex": 4 }]),
        );
        let result = tokio_test::block_on(execute(temp.path(), false, &Config::default()));
        assert!(result.is_ok());
    }

    #[test]
    fn test_inspect_missing_manifest_fails() {
        let temp = TempDir::new().unwrap();
        let result = tokio_test::block_on(execute(temp.path(), true, &Config::default()));
        assert!(result.is_err());
    }
}
