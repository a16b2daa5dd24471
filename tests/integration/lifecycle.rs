//! Resolve and load through the plugin hooks.

use anyhow::Result;
use ractive_bin::config::PluginConfig;
use ractive_bin::core::RbinError;
use ractive_bin::plugin::Plugin;
use ractive_bin::test_utils::{RecordingHost, StubCompiler, TemplateProject};
use std::sync::Arc;

use crate::common::Harness;

#[tokio::test]
async fn test_root_and_extension_resolution() -> Result<()> {
    let project = TemplateProject::new()?;
    project.write("views/button.ract", "<button/>")?;
    project.write("lib/button.ract", "<button/>")?;
    let config = PluginConfig {
        root: project.path("views").to_string_lossy().into_owned(),
        extensions: vec![".ract".into()],
        ..Default::default()
    };
    let plugin = Plugin::new(config, StubCompiler::new(), Arc::new(RecordingHost::new()))?;

    let id = project.path("views/button").to_string_lossy().into_owned();
    assert_eq!(plugin.resolve(&id).await?, Some(project.path("views/button.ract")));

    let outside = project.path("lib/button").to_string_lossy().into_owned();
    assert_eq!(plugin.resolve(&outside).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_extension_priority_is_declaration_order() -> Result<()> {
    let harness = Harness::with_config(|config| {
        config.extensions = vec![".ract.html".into(), ".ractive".into(), ".ract".into()];
    });
    harness.project.write("views/list.ract", "<ul/>")?;
    harness.project.write("views/list.ractive", "<ol/>")?;

    let resolved = harness.plugin.resolve(&harness.id("views/list")).await?;
    assert_eq!(resolved, Some(harness.project.path("views/list.ractive")));
    Ok(())
}

#[tokio::test]
async fn test_in_memory_load_returns_code_and_registers_watches() -> Result<()> {
    let harness = Harness::in_memory();
    harness.project.write("a.ract", "<div>{{> shared/b.ract }}</div>")?;
    harness.project.write("shared/b.ract", "<b>shared</b>")?;

    let id = harness.id("a.ract");
    let code = harness.plugin.load(&id).await?.expect("template is loaded");

    assert!(code.contains("<b>shared</b>"));
    assert!(harness.host.is_watching(&harness.project.path("a.ract")));
    assert!(harness.host.is_watching(&harness.project.path("shared/b.ract")));

    let deps = harness.plugin.with_cache(|cache| cache.source(&id).map(|r| r.dependencies.clone()));
    assert_eq!(
        deps,
        Some(vec![harness.project.path("a.ract"), harness.project.path("shared/b.ract")])
    );
    Ok(())
}

#[tokio::test]
async fn test_unchanged_source_compiles_once() -> Result<()> {
    let harness = Harness::in_memory();
    harness.project.write("a.ract", "<p/>")?;
    let id = harness.id("a.ract");

    let first = harness.plugin.load(&id).await?;
    let second = harness.plugin.load(&id).await?;

    assert_eq!(first, second);
    assert_eq!(harness.compiler.invocations(), 1);
    Ok(())
}

#[tokio::test]
async fn test_redirected_compile_writes_artifact_and_records_pair() -> Result<()> {
    let harness = Harness::redirected();
    harness.project.write("views/card.ract", "<div class='card'/>")?;
    let id = harness.id("views/card");

    let artifact = harness.plugin.resolve(&id).await?.expect("template resolves");

    assert!(artifact.starts_with(harness.project.path("out")));
    assert!(artifact.ends_with("views/card.js"));
    let written = std::fs::read_to_string(&artifact)?;
    assert!(written.contains("card"));

    harness.plugin.with_cache(|cache| {
        let forward = cache.source(&id).expect("forward record");
        let reverse = cache.artifact(&artifact).expect("reverse record");
        assert_eq!(forward.artifact_path.as_ref(), Some(&artifact));
        assert_eq!(reverse.source_id, id);
        assert_eq!(reverse.watches, forward.dependencies);
        assert_eq!(reverse.redo, None);
    });

    assert_eq!(harness.plugin.load(&artifact.to_string_lossy()).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_compile_failure_is_fatal_and_not_cached() -> Result<()> {
    let project = TemplateProject::new()?;
    project.write("broken.ract", "{{#each}}")?;
    let host = Arc::new(RecordingHost::new());
    let compiler = StubCompiler::failing("Unexpected end of section");
    let config = PluginConfig {
        extensions: vec![".ract".into()],
        ..Default::default()
    };
    let plugin = Plugin::new(config, compiler.clone(), host.clone())?;

    let id = project.path("broken.ract").to_string_lossy().into_owned();
    let err = plugin.load(&id).await.unwrap_err();

    match err {
        RbinError::Compile {
            message, ..
        } => assert!(message.contains("Unexpected end of section")),
        other => panic!("expected compile error, got {other:?}"),
    }
    assert!(plugin.with_cache(|cache| cache.source(&id).is_none()));

    // Nothing was cached, so the next load tries again.
    assert!(plugin.load(&id).await.is_err());
    assert_eq!(compiler.invocations(), 2);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_loads_of_different_ids() -> Result<()> {
    let harness = Harness::in_memory();
    harness.project.write("a.ract", "<a/>{{> shared.ract }}")?;
    harness.project.write("b.ract", "<b/>{{> shared.ract }}")?;
    harness.project.write("shared.ract", "<s/>")?;
    let (a, b) = (harness.id("a.ract"), harness.id("b.ract"));

    let (code_a, code_b) = futures::try_join!(harness.plugin.load(&a), harness.plugin.load(&b))?;

    assert!(code_a.unwrap().contains("<a/><s/>"));
    assert!(code_b.unwrap().contains("<b/><s/>"));
    let dependents =
        harness.plugin.with_cache(|cache| cache.dependents_of(&harness.project.path("shared.ract")));
    assert_eq!(dependents.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_non_template_ids_are_declined() -> Result<()> {
    let harness = Harness::in_memory();
    harness.project.write("main.js", "export {}")?;

    assert_eq!(harness.plugin.resolve(&harness.id("main.js")).await?, None);
    assert_eq!(harness.plugin.load(&harness.id("main.js")).await?, None);
    assert_eq!(harness.compiler.invocations(), 0);
    Ok(())
}
