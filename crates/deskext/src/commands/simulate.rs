//! Simulate one extension session against an in-process host.
//!
//! Loads the extension, creates content and one control of each kind, drives
//! every control through push, edit and commit, then unloads and prints the
//! teardown report.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;

use deskext_core::PushOutcome;
use deskext_sdk::factory::UiActionCapable;
use deskext_sdk::{
    Control, ControlOptions, ExtensionHost, ExtensionLoader, GridOptions, LabelOptions,
};

use crate::config::Config;

/// Push `pushed`, edit to `edited`, then commit the edit.
fn drive<T>(control: &Arc<Control<T>>, pushed: T, edited: T) -> Result<()>
where
    T: Clone + Send + Sync + Serialize + 'static,
{
    let kind = control.kind();
    control.action().push_value(Some(pushed.clone()));
    control.action().edit(Some(edited.clone()));
    let during_edit = control.action().push_value(Some(pushed));
    control
        .commit_value(Some(edited), "Explicit")
        .with_context(|| format!("commit on {kind} failed"))?;

    let held = match during_edit {
        PushOutcome::Applied => "applied",
        PushOutcome::Deferred => "held",
    };
    println!(
        "    {:<14} value={} state={} push-during-edit={}",
        kind.to_string(),
        control.value_json()?,
        control.state_api()?,
        held
    );
    Ok(())
}

pub async fn execute(dir: &Path, config: &Config) -> Result<()> {
    let bundle = ExtensionLoader::default()
        .load_from_dir(dir)
        .await
        .with_context(|| format!("Failed to load extension from {}", dir.display()))?;

    let host = ExtensionHost::new(config.sdk.clone())?;
    let handle = host.load_bundle(&bundle);
    let ctx = host.activate(handle)?;
    let drained = host.drain_registrations(handle)?;

    println!(
        "{} {} as {}",
        "Loaded".green().bold(),
        bundle.info.label(),
        handle
    );
    println!(
        "  commands: {} accepted, {} rejected",
        drained.accepted.len(),
        drained.rejected.len()
    );

    let content = ctx.content();
    content.create_label(LabelOptions {
        caption: ctx.self_info().short_description.clone(),
    })?;
    content.create_grid(GridOptions {
        headers: vec!["Key".into(), "Value".into()],
        rows: vec![vec!["version".into(), ctx.self_info().version.clone()]],
    })?;

    println!();
    println!("  {}", "Controls".bold());
    let controls = ctx.controls();
    drive(
        &controls.create_button(ControlOptions::captioned("Send"))?,
        false,
        true,
    )?;
    drive(
        &controls.create_checkbox(ControlOptions::captioned("Armed"))?,
        false,
        true,
    )?;
    drive(
        &controls.create_integer_input(ControlOptions::captioned("Quantity").required())?,
        100,
        250,
    )?;
    drive(
        &controls.create_number_input(ControlOptions::captioned("Price").required())?,
        10.5,
        10.25,
    )?;
    drive(
        &controls.create_text_input(ControlOptions::captioned("Symbol"))?,
        "BHP".to_string(),
        "CBA".to_string(),
    )?;
    let expiry = NaiveDate::from_ymd_opt(2026, 12, 18).context("invalid expiry date")?;
    drive(
        &controls.create_date_input(ControlOptions::captioned("Expiry"))?,
        expiry,
        expiry.succ_opt().unwrap_or(expiry),
    )?;

    ctx.storage().set_item("last-run", "simulate").await?;

    let report = host.unload(handle)?;
    println!();
    println!("{} {}", "Unloaded".yellow().bold(), handle);
    println!(
        "  destroyed {} objects, {} failed, {} pending registrations discarded, {} commands removed",
        report.teardown.destroyed,
        report.teardown.failed.len(),
        report.discarded_requests,
        report.removed_commands
    );
    for (id, message) in &report.teardown.failed {
        println!("    {} {} {}", "✗".red(), id, message);
    }

    let late = ctx.storage().get_item("last-run").await;
    println!(
        "  late storage read after unload: {}",
        match late {
            Ok(_) => "applied".red().to_string(),
            Err(e) => format!("{}", e.code).green().to_string(),
        }
    );

    Ok(())
}
