const KEYS: [&str; 3] = ["BRAVEPIPE_BRAVE_API_KEY", "BRAVE_API_KEY", "BRAVEPIPE_ENV_FILE"];

fn doctor(envs: &[(&str, &str)]) -> serde_json::Value {
    let bin = assert_cmd::cargo::cargo_bin!("bravepipe");
    let mut cmd = std::process::Command::new(bin);
    cmd.args(["doctor"]);
    for k in KEYS {
        cmd.env_remove(k);
    }
    for (k, v) in envs {
        cmd.env(k, v);
    }
    let out = cmd.output().expect("run bravepipe doctor");
    // Missing configuration is reported, never fatal.
    assert!(out.status.success(), "bravepipe doctor failed");
    let s = String::from_utf8_lossy(&out.stdout);
    serde_json::from_str(&s).expect("parse doctor json")
}

#[test]
fn doctor_without_key_reports_not_ok() {
    let v = doctor(&[]);
    assert_eq!(v["schema_version"].as_u64(), Some(1));
    assert_eq!(v["name"].as_str(), Some("bravepipe"));
    assert_eq!(v["ok"].as_bool(), Some(false));
    assert_eq!(v["configured"]["brave_api_key"].as_bool(), Some(false));
    assert_eq!(
        v["features"]["stdio"].as_bool(),
        Some(cfg!(feature = "stdio"))
    );
}

#[test]
fn doctor_never_prints_the_key() {
    let secret = "doctor-secret-value-123";
    let v = doctor(&[
        ("BRAVE_API_KEY", secret),
        ("BRAVEPIPE_SEARCH_TIMEOUT_MS", "2500"),
    ]);
    assert_eq!(v["ok"].as_bool(), Some(true));
    assert_eq!(v["configured"]["brave_api_key"].as_bool(), Some(true));
    assert_eq!(v["configured"]["search_timeout_ms"].as_u64(), Some(2500));
    assert_eq!(
        v["configured"]["brave_endpoint"].as_str(),
        Some("https://api.search.brave.com/res/v1")
    );
    assert!(!v.to_string().contains(secret));
}

#[test]
fn doctor_reads_the_env_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bravepipe.env");
    std::fs::write(&path, "# keys\nBRAVE_API_KEY = from-file\n\nnot a pair\n").expect("write env file");

    let bin = assert_cmd::cargo::cargo_bin!("bravepipe");
    let mut cmd = std::process::Command::new(bin);
    cmd.args(["doctor"]);
    for k in KEYS {
        cmd.env_remove(k);
    }
    let out = cmd
        .env("BRAVEPIPE_ENV_FILE", &path)
        .output()
        .expect("run bravepipe doctor");
    assert!(out.status.success());
    let v: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&out.stdout)).expect("parse doctor json");
    assert_eq!(v["configured"]["brave_api_key"].as_bool(), Some(true));
}
