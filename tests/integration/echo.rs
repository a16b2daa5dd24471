//! Notifications for artifacts the plugin wrote itself.

use anyhow::Result;
use ractive_bin::cache::ChangeOutcome;

use crate::common::Harness;

#[tokio::test]
async fn test_echo_of_own_write_does_not_recompile() -> Result<()> {
    let harness = Harness::redirected();
    harness.project.write("views/card.ract", "<card/>")?;
    let artifact = harness.plugin.resolve(&harness.id("views/card")).await?.unwrap();

    assert_eq!(harness.plugin.on_file_changed(&artifact).await, ChangeOutcome::EchoSuppressed);
    assert_eq!(harness.plugin.load(&artifact.to_string_lossy()).await?, None);
    assert_eq!(harness.compiler.invocations(), 1);
    Ok(())
}

#[tokio::test]
async fn test_second_notification_on_unchanged_artifact_redoes() -> Result<()> {
    let harness = Harness::redirected();
    harness.project.write("views/card.ract", "<card/>")?;
    let id = harness.id("views/card");
    let artifact = harness.plugin.resolve(&id).await?.unwrap();

    harness.plugin.on_file_changed(&artifact).await;
    let outcome = harness.plugin.on_file_changed(&artifact).await;

    assert_eq!(outcome, ChangeOutcome::Invalidated(vec![id]));
    harness.plugin.load(&artifact.to_string_lossy()).await?;
    assert_eq!(harness.compiler.invocations(), 2);

    // The rewrite is ours again.
    assert_eq!(harness.plugin.on_file_changed(&artifact).await, ChangeOutcome::EchoSuppressed);
    Ok(())
}

#[tokio::test]
async fn test_external_edit_of_artifact_is_overwritten() -> Result<()> {
    let harness = Harness::redirected();
    harness.project.write("views/card.ract", "<card/>")?;
    let artifact = harness.plugin.resolve(&harness.id("views/card")).await?.unwrap();
    let compiled = std::fs::read_to_string(&artifact)?;

    std::fs::write(&artifact, "// edited by hand")?;
    let outcome = harness.plugin.on_file_changed(&artifact).await;
    assert!(matches!(outcome, ChangeOutcome::Invalidated(_)));

    harness.plugin.load(&artifact.to_string_lossy()).await?;
    assert_eq!(std::fs::read_to_string(&artifact)?, compiled);
    assert_eq!(harness.compiler.invocations(), 2);
    Ok(())
}

#[tokio::test]
async fn test_deleted_artifact_is_rebuilt_on_resolve() -> Result<()> {
    let harness = Harness::redirected();
    harness.project.write("views/card.ract", "<card/>")?;
    let id = harness.id("views/card");
    let artifact = harness.plugin.resolve(&id).await?.unwrap();

    std::fs::remove_file(&artifact)?;
    harness.plugin.on_file_changed(&artifact).await;

    let again = harness.plugin.resolve(&id).await?.unwrap();
    assert_eq!(again, artifact);
    assert!(artifact.exists());
    assert_eq!(harness.compiler.invocations(), 2);
    Ok(())
}
