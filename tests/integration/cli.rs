//! The `wsgi-charm` binary, end to end.

use predicates::prelude::*;
use serde_json::{Value, json};
use wsgi_charm::test_utils::RoleFixture;

use crate::common::TestCharm;

#[test]
fn test_resolve_prints_json() {
    let charm = TestCharm::with_role(&RoleFixture::basic()).unwrap();
    let runtime = charm.write("config.json", r#"{"app_name": "blog", "debug": false}"#).unwrap();

    let output = charm
        .cmd()
        .arg("resolve")
        .arg("--runtime-config")
        .arg(&runtime)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let config: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(config["static_dir"], json!("/srv/blog/static"));
    assert_eq!(config["debug"], json!(false));
}

#[test]
fn test_resolve_failure_exits_nonzero() {
    let charm = TestCharm::with_role(&RoleFixture::missing_variable()).unwrap();

    charm
        .cmd()
        .arg("resolve")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Undefined variables: db_host"));
}

#[test]
fn test_resolve_with_charm_dir_flag() {
    let charm = TestCharm::with_role(&RoleFixture::forward_reference()).unwrap();

    charm
        .cmd()
        .env_remove("CHARM_DIR")
        .arg("--charm-dir")
        .arg(charm.path())
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"listen\": \"0.0.0.0:8000\""));
}

#[test]
fn test_env_set_get_unset() {
    let charm = TestCharm::new().unwrap();

    charm.cmd().args(["env", "set", "WORKERS", "4"]).assert().success();
    charm.cmd().args(["env", "set", "NAME", "blog"]).assert().success();
    assert_eq!(charm.env_json().unwrap(), json!({"WORKERS": 4, "NAME": "blog"}));

    charm.cmd().args(["env", "get", "NAME"]).assert().success().stdout("blog\n");
    charm.cmd().args(["env", "get", "WORKERS"]).assert().success().stdout("4\n");

    charm.cmd().args(["env", "unset", "WORKERS"]).assert().success();
    charm.cmd().args(["env", "unset", "WORKERS"]).assert().success();
    assert_eq!(charm.env_json().unwrap(), json!({"NAME": "blog"}));

    charm
        .cmd()
        .args(["env", "get", "WORKERS"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not set"));
}

#[test]
fn test_env_log_lines_name_keys_without_color_codes() {
    let charm = TestCharm::new().unwrap();

    charm
        .cmd()
        .env("CLICOLOR_FORCE", "1")
        .args(["env", "set", "WORKERS", "4"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Set WORKERS"));
    charm
        .cmd()
        .env("CLICOLOR_FORCE", "1")
        .args(["env", "unset", "WORKERS"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unset WORKERS"));
}

#[test]
fn test_resolve_reports_conditional_set_as_unresolved() {
    let charm = TestCharm::new().unwrap();
    charm.write("roles/wsgi-app/defaults/main.yml", "flag: false\n").unwrap();
    charm
        .write(
            "roles/wsgi-app/vars/main.yml",
            "{% if flag %}{% set name = 'app' %}{% endif %}\nuser: \"{{ name }}\"\n",
        )
        .unwrap();

    charm
        .cmd()
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Undefined variables: name"))
        .stderr(predicate::str::contains("Variable `name` not found").not());
}

#[test]
fn test_env_list_on_fresh_charm() {
    let charm = TestCharm::new().unwrap();
    charm.cmd().args(["env", "list"]).assert().success().stdout("{}\n");
}

#[test]
fn test_env_list_with_corrupt_store() {
    let charm = TestCharm::new().unwrap();
    charm.write("env.json", "not json").unwrap();

    charm
        .cmd()
        .args(["env", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid environment store content"));
}

#[test]
fn test_env_respects_cache_dir_override() {
    let charm = TestCharm::new().unwrap();
    let cache = charm.path().join("cache");
    std::fs::create_dir(&cache).unwrap();

    charm
        .cmd()
        .env("WSGI_CHARM_CACHE_DIR", &cache)
        .args(["env", "set", "A", "1"])
        .assert()
        .success();

    assert!(cache.join("env.json").exists());
    assert!(!charm.path().join("env.json").exists());
}

#[test]
fn test_url_command() {
    let charm = TestCharm::new().unwrap();

    charm
        .cmd()
        .args([
            "url",
            "postgresql",
            "db.internal",
            "--port",
            "5432",
            "--username",
            "robin",
            "--password",
            "x",
            "--path",
            "app",
        ])
        .assert()
        .success()
        .stdout("postgresql://robin:x@db.internal:5432/app\n");
}

#[test]
fn test_pgsql_relation_lifecycle() {
    let charm = TestCharm::new().unwrap();

    // Not ready yet: no host
    charm
        .cmd()
        .args(["relation", "pgsql", "joined", "--database", "app"])
        .assert()
        .success();
    assert!(!charm.path().join("env.json").exists());

    charm
        .cmd()
        .args([
            "relation", "pgsql", "changed", "--database", "app", "--host", "10.0.0.5", "--user",
            "robin",
        ])
        .assert()
        .success();
    assert_eq!(
        charm.env_json().unwrap(),
        json!({"DATABASE_URL": "postgresql://robin@10.0.0.5/app"})
    );

    charm.cmd().args(["relation", "pgsql", "broken"]).assert().success();
    assert_eq!(charm.env_json().unwrap(), json!({}));
}

#[test]
fn test_unknown_relation_event_rejected() {
    let charm = TestCharm::new().unwrap();
    charm.cmd().args(["relation", "pgsql", "departed"]).assert().failure();
}
