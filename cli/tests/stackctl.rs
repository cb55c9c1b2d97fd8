use assert_cmd::Command;
use std::path::Path;

const STACK_VARS: [&str; 6] = [
    "APP_NAME",
    "AWS_ACCOUNT_ID",
    "AWS_REGION",
    "REGISTRY",
    "REPOSITORY",
    "TAG",
];

/// A `stackctl` command that ignores the caller's environment and reads `env_file` instead.
fn stackctl(env_file: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stackctl").unwrap();
    for var in STACK_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG")
        .arg("--env-file")
        .arg(env_file);
    cmd
}

#[test]
fn render_writes_root_and_modules() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("infra");
    stackctl(&dir.path().join("missing.env"))
        .env("APP_NAME", "demo")
        .arg("render")
        .arg("--dir")
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("main.tf.json").is_file());
    assert!(out.join("network/main.tf.json").is_file());
    assert!(out.join("cluster/main.tf.json").is_file());

    let root: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("main.tf.json")).unwrap()).unwrap();
    assert_eq!(
        root["output"]["cluster_endpoint"]["value"],
        "${module.cluster.cluster_endpoint}"
    );
    assert_eq!(
        root["module"]["cluster"]["depends_on"],
        serde_json::json!(["module.network"])
    );
}

#[test]
fn render_reads_env_file() {
    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join(".env");
    std::fs::write(&env_file, "APP_NAME=demo\nAWS_REGION=eu-west-1\n").unwrap();
    let output = stackctl(&env_file)
        .arg("render")
        .arg("--stdout")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("eu-west-1a"));
    assert!(stdout.contains("main.tf.json"));
}

#[test]
fn process_environment_wins_over_env_file() {
    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join(".env");
    std::fs::write(&env_file, "APP_NAME=from-file\n").unwrap();
    let output = stackctl(&env_file)
        .env("APP_NAME", "from-process")
        .arg("render")
        .arg("--stdout")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("from-process"));
    assert!(!stdout.contains("from-file"));
}

#[test]
fn empty_process_value_keeps_env_file_value() {
    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join(".env");
    std::fs::write(&env_file, "APP_NAME=from-file\n").unwrap();
    let output = stackctl(&env_file)
        .env("APP_NAME", "")
        .arg("render")
        .arg("--stdout")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("from-file"));
}

#[test]
fn missing_app_name_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = stackctl(&dir.path().join("missing.env"))
        .arg("render")
        .arg("--stdout")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("APP_NAME"));
}

#[test]
fn invalid_node_group_fails_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("stack.yaml");
    std::fs::write(
        &config,
        r#"
nodeGroups:
  cpu:
    desired_size: 5
    min_size: 1
    max_size: 3
    instance_types: ["m6i.large"]
"#,
    )
    .unwrap();
    let out = dir.path().join("infra");
    let output = stackctl(&dir.path().join("missing.env"))
        .env("APP_NAME", "demo")
        .arg("--config")
        .arg(&config)
        .arg("render")
        .arg("--dir")
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid node group 'cpu'"));
    assert!(!out.exists());
}

#[test]
fn push_image_requires_repository() {
    let dir = tempfile::tempdir().unwrap();
    let output = stackctl(&dir.path().join("missing.env"))
        .env("AWS_ACCOUNT_ID", "123456789012")
        .arg("push-image")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("REPOSITORY"));
}
