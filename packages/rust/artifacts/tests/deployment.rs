//! Package a site and validate the staged artifact end to end.

use std::fs;
use std::path::Path;

use demoindex_artifacts::{
    DeploymentPolicy, PackagerOptions, SilentProgress, prepare_documentation_artifact,
    validate_for_deployment,
};

const COMPLETE: &[&str] = &["index.wasm", "index.pck", "index.js"];

fn project(collection: &Path, rel: &str, export: &[&str]) {
    let dir = collection.join(rel);
    fs::create_dir_all(dir.join("exports/web")).unwrap();
    fs::write(dir.join("project.godot"), "").unwrap();
    fs::write(dir.join("exports/web/index.html"), "").unwrap();
    for f in export {
        fs::write(dir.join("exports/web").join(f), "x").unwrap();
    }
}

/// Site with 20 exported projects, `incomplete` of which only have a loader.
fn site(root: &Path, incomplete: usize) {
    fs::write(root.join("index.html"), "<html></html>").unwrap();
    fs::write(root.join("_sidebar.md"), "").unwrap();
    let collection = root.join("godot-demo-projects");
    for i in 0..20 {
        let files = if i < incomplete { &["index.js"][..] } else { COMPLETE };
        project(&collection, &format!("misc/demo_{i:02}"), files);
    }
}

fn package_and_validate(root: &Path) -> demoindex_artifacts::DeploymentReport {
    let out = root.join("staged");
    prepare_documentation_artifact(root, Some(&out), &PackagerOptions::default(), &SilentProgress)
        .unwrap();
    validate_for_deployment(&out, &DeploymentPolicy::default()).unwrap()
}

#[test]
fn one_incomplete_of_twenty_is_deployable() {
    let tmp = tempfile::tempdir().unwrap();
    site(tmp.path(), 1);

    let report = package_and_validate(tmp.path());

    assert!(report.is_deployable(), "issues: {:?}", report.issues);
    assert_eq!(report.total_projects, 20);
    assert_eq!(report.web_exports, 20);
    assert_eq!(
        report.warnings,
        vec!["Incomplete export: godot-demo-projects/misc/demo_00 (missing: WASM, PCK)"]
    );
}

#[test]
fn three_incomplete_of_twenty_blocks_deployment() {
    let tmp = tempfile::tempdir().unwrap();
    site(tmp.path(), 3);

    let report = package_and_validate(tmp.path());

    assert!(!report.is_deployable());
    assert_eq!(report.issues.len(), 3);
    assert!(report.issues.iter().all(|i| i.starts_with("Incomplete export: ")));
    assert!(report.warnings.is_empty());
}

#[test]
fn collection_without_exports_is_an_issue() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("index.html"), "").unwrap();
    fs::write(tmp.path().join("_sidebar.md"), "").unwrap();
    let dir = tmp.path().join("godot-demo-projects/2d/a");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("project.godot"), "").unwrap();

    let report = validate_for_deployment(tmp.path(), &DeploymentPolicy::default()).unwrap();
    assert_eq!(report.issues, vec!["No web exports found in projects"]);
}

#[test]
fn only_incomplete_exports_blocks_deployment() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("index.html"), "").unwrap();
    fs::write(tmp.path().join("_sidebar.md"), "").unwrap();
    let collection = tmp.path().join("godot-demo-projects");
    project(&collection, "misc/demo_00", &["index.js"]);
    for i in 1..20 {
        let dir = collection.join(format!("misc/demo_{i:02}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("project.godot"), "").unwrap();
    }

    let report = validate_for_deployment(tmp.path(), &DeploymentPolicy::default()).unwrap();

    assert_eq!(report.total_projects, 20);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.issues, vec!["No complete web exports found in projects"]);
    assert!(!report.is_deployable());
}

#[test]
fn leaked_binaries_are_warned() {
    let tmp = tempfile::tempdir().unwrap();
    site(tmp.path(), 0);
    let collection = tmp.path().join("godot-demo-projects");
    fs::write(collection.join("export_templates.tpz"), "").unwrap();
    fs::create_dir_all(collection.join("misc/demo_00/.godot/imported")).unwrap();

    let report = validate_for_deployment(tmp.path(), &DeploymentPolicy::default()).unwrap();

    assert!(report.is_deployable());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with("Found 2 items that should be excluded"));
}
