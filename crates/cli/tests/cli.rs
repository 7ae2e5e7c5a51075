use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("lib.rs"), "pub fn answer() -> u32 { 42 }\n").unwrap();
    std::fs::write(src.join("main.rs"), "fn main() { answer(); }\n").unwrap();
    dir
}

fn coderag(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("coderag").unwrap();
    cmd.arg("--root").arg(root).env("RUST_LOG", "warn");
    cmd
}

fn json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn index_then_index_again_is_up_to_date() {
    let dir = corpus();

    let first = coderag(dir.path()).args(["index", "--json"]).output().unwrap();
    assert!(first.status.success());
    let report = json(&first.stdout);
    assert_eq!(report["outcome"], "rebuilt");
    assert_eq!(report["files"], 2);
    assert_eq!(report["embedding"], "hash");

    let second = coderag(dir.path()).args(["index", "--json"]).output().unwrap();
    assert!(second.status.success());
    assert_eq!(json(&second.stdout)["outcome"], "up_to_date");
}

#[test]
fn force_flag_rebuilds() {
    let dir = corpus();
    coderag(dir.path()).arg("index").assert().success();

    let out = coderag(dir.path())
        .args(["index", "--force", "--json"])
        .output()
        .unwrap();
    let report = json(&out.stdout);
    assert_eq!(report["outcome"], "rebuilt");
    assert_eq!(report["reasons"], serde_json::json!(["force_requested"]));
}

#[test]
fn status_does_not_write() {
    let dir = corpus();
    let out = coderag(dir.path()).args(["status", "--json"]).output().unwrap();
    assert!(out.status.success());

    let status = json(&out.stdout);
    assert_eq!(status["decision"]["required"], true);
    assert_eq!(status["artifacts"]["vector"], false);
    assert!(!dir.path().join(".coderag").exists());
}

#[test]
fn config_file_in_root_is_picked_up() {
    let dir = corpus();
    std::fs::write(
        dir.path().join("coderag.toml"),
        "vector_index_path = \"out/vectors\"\nembedding_dimension = 8\n",
    )
    .unwrap();

    coderag(dir.path()).arg("index").assert().success();
    assert!(dir.path().join("out/vectors/vectors.jsonl").exists());
}

#[test]
fn bridge_without_model_fails() {
    let dir = corpus();
    std::fs::write(dir.path().join("embed.py"), "print('x')\n").unwrap();
    std::fs::write(
        dir.path().join("coderag.toml"),
        "bridge_script_path = \"embed.py\"\n",
    )
    .unwrap();

    coderag(dir.path()).arg("index").assert().failure();
    assert!(!dir.path().join(".coderag").exists());
}
