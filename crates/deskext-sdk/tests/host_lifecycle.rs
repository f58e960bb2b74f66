//! Full extension lifecycle through the public SDK surface.

use std::sync::{Arc, Mutex};

use deskext_core::{PushEvent, PushOutcome, UiActionCommitTypeId, ValueState};
use deskext_sdk::factory::UiActionCapable;
use deskext_sdk::{
    CommandApi, ControlOptions, ErrorCode, ExtensionHost, ExtensionLoader, LabelOptions,
    SDKConfig,
};
use tempfile::TempDir;

async fn write_extension(root: &std::path::Path) -> std::path::PathBuf {
    let dir = root.join("order-pad");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let manifest = serde_json::json!({
        "publisherType": "Organisation",
        "publisherName": "Acme Trading",
        "name": "order-pad",
        "version": "0.3.1",
        "shortDescription": "Quick order entry",
        "strings": ["Open order pad", "Close order pad"],
        "commands": [
            {
                "name": "open",
                "defaultDisplayIndex": 0,
                "defaultMenuBarItemPosition": { "menuPath": ["Trading"], "rank": 20.0 }
            },
            { "name": "close", "defaultDisplayIndex": 1 }
        ]
    });
    tokio::fs::write(dir.join("manifest.json"), manifest.to_string())
        .await
        .unwrap();
    dir
}

#[tokio::test]
async fn test_load_activate_interact_unload() {
    let temp = TempDir::new().unwrap();
    let dir = write_extension(temp.path()).await;

    let host = ExtensionHost::new(SDKConfig::default()).unwrap();
    let bundle = ExtensionLoader::default().load_from_dir(&dir).await.unwrap();
    let handle = host.load_bundle(&bundle);
    let ctx = host.activate(handle).unwrap();

    // Identity is API shaped
    assert_eq!(ctx.self_info().publisher_type, "Organisation");
    assert_eq!(ctx.self_info().name, "order-pad");

    // Manifest commands plus one registered at bootstrap
    ctx.commands()
        .register(CommandApi::new("flatten", 5))
        .unwrap();
    let drained = host.drain_registrations(handle).unwrap();
    assert_eq!(drained.accepted, vec!["open", "close"]);
    assert_eq!(drained.rejected[0].1.code, ErrorCode::InvalidCommandDisplayIndex);

    let menu = host.menu_commands(&["Trading".to_string()]);
    assert_eq!(menu.len(), 1);
    assert_eq!(host.command_caption(&menu[0]), "Open order pad");

    // Content and controls
    ctx.content()
        .create_label(LabelOptions {
            caption: "Order".into(),
        })
        .unwrap();
    let qty = ctx
        .controls()
        .create_integer_input(ControlOptions::captioned("Qty").required())
        .unwrap();

    let pushes = Arc::new(Mutex::new(Vec::new()));
    let sink = pushes.clone();
    qty.set_push_listener(Some(Arc::new(move |event: &PushEvent<i64>| {
        if let PushEvent::Value { value, edited } = event {
            sink.lock().unwrap().push((*value, *edited));
        }
    })));
    let commits = Arc::new(Mutex::new(Vec::new()));
    let sink = commits.clone();
    qty.set_commit_listener(Some(Arc::new(
        move |value: Option<&i64>, kind: UiActionCommitTypeId| {
            sink.lock().unwrap().push((value.copied(), kind));
        },
    )));

    // Host push, user edit, push during edit, commit
    assert_eq!(qty.action().push_value(Some(100)), PushOutcome::Applied);
    assert!(qty.action().edit(Some(150)));
    assert_eq!(qty.action().push_value(Some(120)), PushOutcome::Deferred);
    assert_eq!(qty.value().unwrap(), Some(150));
    assert_eq!(qty.value_state().unwrap(), ValueState::SetEdited);

    let err = qty.commit_value(None, "Explicit").unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueRequired);
    qty.commit_value(Some(150), "Explicit").unwrap();

    assert_eq!(qty.value_state().unwrap(), ValueState::SetClean);
    assert_eq!(*pushes.lock().unwrap(), vec![(Some(100), false)]);
    assert_eq!(
        *commits.lock().unwrap(),
        vec![(Some(150), UiActionCommitTypeId::Explicit)]
    );

    // Storage scoped to the extension
    ctx.storage().set_item("last-qty", "150").await.unwrap();
    assert_eq!(
        ctx.storage().get_item("last-qty").await.unwrap().as_deref(),
        Some("150")
    );

    // Unload cascade
    let report = host.unload(handle).unwrap();
    assert_eq!(report.teardown.destroyed, 2);
    assert!(report.teardown.is_clean());
    assert_eq!(report.removed_commands, 2);

    assert_eq!(host.lookup_string(handle, 0), "?");
    assert!(host.menu_commands(&["Trading".to_string()]).is_empty());
    assert_eq!(qty.action().subscriber_count(), 0);
    qty.action().push_value(Some(1));
    assert_eq!(pushes.lock().unwrap().len(), 1);

    assert_eq!(
        ctx.storage().get_item("last-qty").await.unwrap_err().code,
        ErrorCode::ExtensionUnloaded
    );
    assert_eq!(
        ctx.controls()
            .create_button(ControlOptions::default())
            .unwrap_err()
            .code,
        ErrorCode::ExtensionUnloaded
    );
}

#[tokio::test]
async fn test_unload_isolates_extensions() {
    let host = ExtensionHost::new(SDKConfig::default().with_initial_capacity(1)).unwrap();
    let temp = TempDir::new().unwrap();
    let bundle = ExtensionLoader::default()
        .load_from_dir(&write_extension(temp.path()).await)
        .await
        .unwrap();

    let first = host.load_bundle(&bundle);
    let second = host.load_bundle(&bundle);
    host.drain_registrations(first).unwrap();
    host.drain_registrations(second).unwrap();

    let first_ctx = host.activate(first).unwrap();
    let second_ctx = host.activate(second).unwrap();
    let kept = second_ctx
        .controls()
        .create_text_input(ControlOptions::captioned("Symbol"))
        .unwrap();
    first_ctx
        .controls()
        .create_text_input(ControlOptions::captioned("Symbol"))
        .unwrap();

    host.unload(first).unwrap();

    assert!(second_ctx.is_alive());
    assert_eq!(host.live_objects(second), Some((0, 1)));
    assert_eq!(host.commands_for(second).len(), 2);
    assert_eq!(host.lookup_string(second, 1), "Close order pad");
    assert_eq!(kept.action().subscriber_count(), 1);

    let reports = host.unload_all();
    assert_eq!(reports.len(), 1);
    assert!(host.loaded_handles().is_empty());
}
