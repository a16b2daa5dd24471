//! The `ractive-bin` binary.

use anyhow::Result;
use predicates::prelude::*;
use ractive_bin::test_utils::TemplateProject;

use crate::common::{SH_COMPILER, ractive_bin};

fn project_with_config(extra: &str) -> Result<TemplateProject> {
    let project = TemplateProject::new()?;
    project.write(
        "ractive.toml",
        &format!("root = \"views\"\nextensions = [\".ract\"]\n{extra}"),
    )?;
    Ok(project)
}

#[test]
fn test_init_writes_default_config() -> Result<()> {
    let project = TemplateProject::new()?;

    ractive_bin(project.root())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized ractive.toml"));

    let content = project.read("ractive.toml")?;
    assert!(content.contains("[compiler]"));

    ractive_bin(project.root())
        .arg("init")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
    Ok(())
}

#[test]
fn test_resolve_prints_source_path() -> Result<()> {
    let project = project_with_config("")?;
    project.write("views/button.ract", "<button/>")?;

    ractive_bin(project.root())
        .args(["resolve", "views/button", "lib/other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("views/button -> views/button.ract"))
        .stdout(predicate::str::contains("lib/other -> declined"));
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let project = project_with_config("output_extension = \"js\"\n")?;

    ractive_bin(project.root())
        .args(["resolve", "views/button"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("output_extension"))
        .stderr(predicate::str::contains("suggestion"));
    Ok(())
}

#[test]
fn test_build_of_missing_id_fails() -> Result<()> {
    let project = project_with_config("")?;

    ractive_bin(project.root())
        .args(["build", "views/missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found: views/missing"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_build_writes_artifact_under_output_dir() -> Result<()> {
    let project = project_with_config(&format!("\n[compiler]\ncommand = {SH_COMPILER}\n"))?;
    project.write("views/card.ract", "<div class='card'/>")?;

    ractive_bin(project.root())
        .args(["build", "views/card", "--output-dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("views/card -> out/views/card.js"));

    assert_eq!(project.read("out/views/card.js")?, "export default 1;");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_build_in_memory_prints_code() -> Result<()> {
    let project = project_with_config(&format!("\n[compiler]\ncommand = {SH_COMPILER}\n"))?;
    project.write("views/card.ract", "<div/>")?;

    ractive_bin(project.root())
        .args(["build", "views/card"])
        .assert()
        .success()
        .stdout(predicate::str::contains("export default 1;"));

    assert!(!project.path("out").exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_compiler_failure_exits_with_error() -> Result<()> {
    let failing = r#"["sh", "-c", "read -r request; echo '{\"type\":\"failed\",\"message\":\"Unexpected template content\"}'"]"#;
    let project = project_with_config(&format!("\n[compiler]\ncommand = {failing}\n"))?;
    project.write("views/card.ract", "{{#if}}")?;

    ractive_bin(project.root())
        .args(["build", "views/card", "--output-dir", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unexpected template content"));

    assert!(!project.path("out/views/card.js").exists());
    Ok(())
}
