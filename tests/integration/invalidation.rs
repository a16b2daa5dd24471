//! Dependency tracking and recompilation after changes.

use anyhow::Result;
use ractive_bin::cache::ChangeOutcome;

use crate::common::Harness;

#[tokio::test]
async fn test_partial_change_marks_dependent_pending() -> Result<()> {
    let harness = Harness::in_memory();
    harness.project.write("a.ract", "<main>{{> shared/b.ract }}</main>")?;
    harness.project.write("shared/b.ract", "<b>v1</b>")?;
    let id = harness.id("a.ract");
    harness.plugin.load(&id).await?;

    let outcome = harness.edit("shared/b.ract", "<b>v2</b>").await;

    assert_eq!(outcome, ChangeOutcome::Invalidated(vec![id.clone()]));
    assert!(harness.plugin.with_cache(|cache| cache.source(&id).unwrap().pending_recompile));
    Ok(())
}

#[tokio::test]
async fn test_invalidated_template_recompiles_exactly_once() -> Result<()> {
    let harness = Harness::in_memory();
    harness.project.write("a.ract", "<main>{{> shared/b.ract }}</main>")?;
    harness.project.write("shared/b.ract", "<b>v1</b>")?;
    let id = harness.id("a.ract");
    harness.plugin.load(&id).await?;

    harness.edit("shared/b.ract", "<b>v2</b>").await;

    let code = harness.plugin.load(&id).await?.unwrap();
    assert!(code.contains("<b>v2</b>"));
    assert_eq!(harness.compiler.invocations(), 2);

    harness.plugin.load(&id).await?;
    harness.plugin.load(&id).await?;
    assert_eq!(harness.compiler.invocations(), 2);
    Ok(())
}

#[tokio::test]
async fn test_shared_partial_invalidates_every_dependent() -> Result<()> {
    let harness = Harness::in_memory();
    harness.project.write("a.ract", "{{> shared.ract }}")?;
    harness.project.write("b.ract", "{{> shared.ract }}")?;
    harness.project.write("c.ract", "<standalone/>")?;
    harness.project.write("shared.ract", "<s/>")?;
    let ids: Vec<String> = ["a.ract", "b.ract", "c.ract"].iter().map(|r| harness.id(r)).collect();
    for id in &ids {
        harness.plugin.load(id).await?;
    }

    let outcome = harness.edit("shared.ract", "<s2/>").await;

    let ChangeOutcome::Invalidated(mut invalidated) = outcome else {
        panic!("expected invalidation, got {outcome:?}");
    };
    invalidated.sort();
    assert_eq!(invalidated, vec![ids[0].clone(), ids[1].clone()]);
    assert!(!harness.plugin.with_cache(|cache| cache.needs_recompile(&ids[2])));
    Ok(())
}

#[tokio::test]
async fn test_dropped_partial_no_longer_invalidates() -> Result<()> {
    let harness = Harness::in_memory();
    harness.project.write("a.ract", "{{> old.ract }}")?;
    harness.project.write("old.ract", "<old/>")?;
    harness.project.write("new.ract", "<new/>")?;
    let id = harness.id("a.ract");
    harness.plugin.load(&id).await?;

    harness.edit("a.ract", "{{> new.ract }}").await;
    harness.plugin.load(&id).await?;

    assert_eq!(harness.edit("old.ract", "<older/>").await, ChangeOutcome::Unaffected);
    assert_eq!(harness.edit("new.ract", "<newer/>").await, ChangeOutcome::Invalidated(vec![id]));
    Ok(())
}

#[tokio::test]
async fn test_failed_recompile_keeps_previous_record() -> Result<()> {
    let harness = Harness::in_memory();
    harness.project.write("a.ract", "<p>v1</p>")?;
    let id = harness.id("a.ract");
    let original = harness.plugin.load(&id).await?.unwrap();

    harness.edit("a.ract", "{{> missing.ract }}").await;
    assert!(harness.plugin.load(&id).await.is_err());

    let (code, pending) = harness.plugin.with_cache(|cache| {
        let record = cache.source(&id).unwrap();
        (record.code().map(str::to_string), record.pending_recompile)
    });
    assert_eq!(code, Some(original));
    assert!(pending);

    harness.project.write("missing.ract", "<found/>")?;
    let code = harness.plugin.load(&id).await?.unwrap();
    assert!(code.contains("<found/>"));
    Ok(())
}

#[tokio::test]
async fn test_unrelated_change_is_unaffected() -> Result<()> {
    let harness = Harness::in_memory();
    harness.project.write("a.ract", "<p/>")?;
    harness.plugin.load(&harness.id("a.ract")).await?;

    assert_eq!(harness.edit("README.md", "# docs").await, ChangeOutcome::Unaffected);
    assert_eq!(harness.compiler.invocations(), 1);
    Ok(())
}

#[tokio::test]
async fn test_partial_change_sets_redo_on_artifact() -> Result<()> {
    let harness = Harness::redirected();
    harness.project.write("views/card.ract", "<card>{{> parts/title.ract }}</card>")?;
    harness.project.write("views/parts/title.ract", "<h1>v1</h1>")?;
    let artifact = harness.plugin.resolve(&harness.id("views/card")).await?.unwrap();

    harness.edit("views/parts/title.ract", "<h1>v2</h1>").await;
    let redo = harness.plugin.with_cache(|cache| cache.artifact(&artifact).unwrap().redo.clone());
    assert_eq!(redo, Some(harness.id("views/card")));

    assert_eq!(harness.plugin.load(&artifact.to_string_lossy()).await?, None);
    assert_eq!(harness.compiler.invocations(), 2);
    assert!(std::fs::read_to_string(&artifact)?.contains("<h1>v2</h1>"));

    let redo = harness.plugin.with_cache(|cache| cache.artifact(&artifact).unwrap().redo.clone());
    assert_eq!(redo, None);
    Ok(())
}
