//! CLI tests for the `tl` binary

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A self-contained workspace: one local template repository plus a config
/// keeping the cache and clone directories inside the temp dir.
struct Workspace {
    temp: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let repo = temp.path().join("templates");
        fs::create_dir_all(repo.join("prompts")).expect("create repo dirs");

        fs::write(
            repo.join("prompts/py-helper.yml"),
            "id: py-helper\ntype: prompt\nname: Python Helper\nlabels:\n  - python\n  - cli\nsummary: helps write CLI scripts\ncontent: |\n  You are a Python expert.\n",
        )
        .expect("write template");
        fs::write(
            repo.join("prompts/deploy.yaml"),
            "id: deploy-ctx\ntype: context\nname: Deploy Context\nlabels:\n  - ops\ntargets:\n  - tool: claude\n    path: CLAUDE.md\n",
        )
        .expect("write template");

        let config = temp.path().join("templib.yml");
        let yaml = format!(
            "repos:\n  - name: main\n    path: {}\nstorage:\n  repos-dir: {}\n  cache-file: {}\n",
            repo.display(),
            temp.path().join("clones").display(),
            temp.path().join("cache/index.json").display(),
        );
        fs::write(&config, yaml).expect("write config");

        Self { temp, config }
    }

    /// Two repositories where "terraform" appears only inside a template
    /// body in `beta`, never in any indexed metadata field.
    fn two_repos() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let alpha = temp.path().join("alpha");
        fs::create_dir_all(&alpha).expect("create repo dirs");
        fs::write(
            alpha.join("py-helper.yml"),
            "id: py-helper\ntype: prompt\nname: Python Helper\nlabels:\n  - python\ncontent: |\n  You are a Python expert.\n",
        )
        .expect("write template");

        let beta = temp.path().join("beta");
        fs::create_dir_all(&beta).expect("create repo dirs");
        fs::write(
            beta.join("tf-notes.yml"),
            "id: tf-notes\ntype: prompt\nname: Infra Notes\nlabels:\n  - ops\ncontent: |\n  Review terraform plans before applying.\n",
        )
        .expect("write template");

        let config = temp.path().join("templib.yml");
        let yaml = format!(
            "repos:\n  - name: alpha\n    path: {}\n  - name: beta\n    path: {}\nstorage:\n  repos-dir: {}\n  cache-file: {}\n",
            alpha.display(),
            beta.display(),
            temp.path().join("clones").display(),
            temp.path().join("cache/index.json").display(),
        );
        fs::write(&config, yaml).expect("write config");

        Self { temp, config }
    }

    fn tl(&self) -> Command {
        let mut cmd = Command::cargo_bin("tl").expect("tl binary builds");
        cmd.arg("--config").arg(&self.config);
        cmd
    }
}

#[test]
fn test_index_rebuild_reports_count() {
    let ws = Workspace::new();

    ws.tl()
        .args(["index", "rebuild"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 2 templates"));

    assert!(ws.temp.path().join("cache/index.json").exists());
}

#[test]
fn test_search_finds_template_without_prior_rebuild() {
    let ws = Workspace::new();

    ws.tl()
        .args(["search", "python"])
        .assert()
        .success()
        .stdout(predicate::str::contains("py-helper"))
        .stdout(predicate::str::contains("(main)"))
        .stdout(predicate::str::contains("deploy-ctx").not());
}

#[test]
fn test_search_unknown_repo_exits_zero_with_note() {
    let ws = Workspace::new();

    ws.tl()
        .args(["search", "python", "--repo", "ghost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No templates found."))
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_search_type_filter() {
    let ws = Workspace::new();

    ws.tl()
        .args(["search", "deploy", "--type", "context"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy-ctx"))
        .stdout(predicate::str::contains("py-helper").not());
}

#[test]
fn test_list_json_is_parseable() {
    let ws = Workspace::new();

    let output = ws
        .tl()
        .args(["list", "--format", "json"])
        .output()
        .expect("run tl list");
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let array = results.as_array().expect("json array");
    assert_eq!(array.len(), 2);
    assert!(array.iter().all(|r| r["template"]["id"].is_string()));
    assert!(array.iter().all(|r| r["score"] == 1.0));
}

#[test]
fn test_show_prints_template_content() {
    let ws = Workspace::new();

    ws.tl()
        .args(["show", "py-helper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Python Helper"))
        .stdout(predicate::str::contains("You are a Python expert."));
}

#[test]
fn test_show_unknown_id_fails() {
    let ws = Workspace::new();

    ws.tl()
        .args(["show", "no-such-template"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No template found"));
}

#[test]
fn test_repo_list_shows_configured_checkout() {
    let ws = Workspace::new();

    ws.tl()
        .args(["repo", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main"))
        .stdout(predicate::str::contains("present"));
}

#[test]
fn test_repo_add_local_path_and_remove() {
    let ws = Workspace::new();
    let extra = ws.temp.path().join("extra-templates");
    fs::create_dir_all(&extra).expect("create extra repo");

    ws.tl()
        .args(["repo", "add"])
        .arg(&extra)
        .args(["--name", "extra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added repository 'extra'"));

    ws.tl()
        .args(["repo", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extra"));

    ws.tl()
        .args(["repo", "remove", "extra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed repository 'extra'"));

    ws.tl()
        .args(["repo", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extra").not());
}

#[test]
fn test_deep_search_reaches_template_content() {
    let ws = Workspace::new();

    // "expert" appears only inside the prompt body
    ws.tl()
        .args(["search", "expert", "--deep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("py-helper"));

    ws.tl()
        .args(["search", "expert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No templates found."));
}

#[test]
fn test_deep_search_respects_repo_filter() {
    let ws = Workspace::two_repos();

    // Without a repo filter the content-only match surfaces
    ws.tl()
        .args(["search", "terraform", "--deep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tf-notes"));

    // Restricting to the other repository hides it
    ws.tl()
        .args(["search", "terraform", "--repo", "alpha", "--deep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No templates found."))
        .stdout(predicate::str::contains("tf-notes").not());
}

#[test]
fn test_deep_search_respects_type_filter() {
    let ws = Workspace::two_repos();

    // tf-notes is a prompt, so a context search must not surface it
    ws.tl()
        .args(["search", "terraform", "--type", "context", "--deep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No templates found."))
        .stdout(predicate::str::contains("tf-notes").not());
}

#[test]
fn test_deep_search_skips_unknown_repo() {
    let ws = Workspace::two_repos();

    ws.tl()
        .args(["search", "terraform", "--repo", "ghost", "--deep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No templates found."))
        .stdout(predicate::str::contains("tf-notes").not())
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_index_stats_after_rebuild() {
    let ws = Workspace::new();

    ws.tl().args(["index", "rebuild"]).assert().success();

    ws.tl()
        .args(["index", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Templates: 2"));
}

fn git(dir: &std::path::Path, args: &[&str]) {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(output.status.success(), "git {:?} failed: {:?}", args, output);
}

#[test]
fn test_repo_update_surfaces_newly_pulled_templates() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let upstream = temp.path().join("upstream");
    fs::create_dir_all(upstream.join("prompts")).expect("create repo dirs");
    fs::write(
        upstream.join("prompts/one.yml"),
        "id: one\ntype: prompt\nname: First\ncontent: alpha\n",
    )
    .expect("write template");
    git(&upstream, &["init", "-b", "main"]);
    git(&upstream, &["config", "user.email", "test@test.com"]);
    git(&upstream, &["config", "user.name", "Test"]);
    git(&upstream, &["add", "-A"]);
    git(&upstream, &["commit", "-m", "one"]);

    let config = temp.path().join("templib.yml");
    let yaml = format!(
        "repos:\n  - name: main\n    url: file://{}\nstorage:\n  repos-dir: {}\n  cache-file: {}\n",
        upstream.display(),
        temp.path().join("clones").display(),
        temp.path().join("cache/index.json").display(),
    );
    fs::write(&config, yaml).expect("write config");

    let tl = |args: &[&str]| {
        let mut cmd = Command::cargo_bin("tl").expect("tl binary builds");
        cmd.arg("--config").arg(&config);
        cmd.args(args);
        cmd
    };

    // First update clones, first search builds the cache
    tl(&["repo", "update"]).assert().success();
    tl(&["search", "First"])
        .assert()
        .success()
        .stdout(predicate::str::contains("one"));

    // A new template lands upstream inside an already-indexed subdirectory,
    // so the checkout root mtime stays put after the pull
    fs::write(
        upstream.join("prompts/two.yml"),
        "id: two\ntype: prompt\nname: Second\ncontent: beta\n",
    )
    .expect("write template");
    git(&upstream, &["add", "-A"]);
    git(&upstream, &["commit", "-m", "two"]);

    tl(&["repo", "update"]).assert().success();
    tl(&["search", "Second"])
        .assert()
        .success()
        .stdout(predicate::str::contains("two"));
}
