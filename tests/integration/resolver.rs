//! Role resolution from a charm directory on disk.

use wsgi_charm::config::CharmSettings;
use wsgi_charm::core::{CharmError, ConfigMap, ConfigValue};
use wsgi_charm::resolver::{ConfigResolver, resolve_role_config};
use wsgi_charm::templating::TemplateSource;
use wsgi_charm::test_utils::{RoleFixture, init_test_logging};

use crate::common::TestCharm;

fn runtime(pairs: &[(&str, &str)]) -> ConfigMap {
    pairs.iter().map(|(k, v)| ((*k).to_string(), ConfigValue::from(*v))).collect()
}

fn role_sources(charm: &TestCharm) -> Vec<TemplateSource> {
    let role_dir = charm.path().join("roles/wsgi-app");
    ["defaults/main.yml", "vars/main.yml"]
        .iter()
        .map(|name| TemplateSource::load(&role_dir, name).unwrap())
        .collect()
}

#[test]
fn test_basic_role_resolves() {
    init_test_logging(None);
    let charm = TestCharm::with_role(&RoleFixture::basic()).unwrap();

    let config = resolve_role_config(
        charm.path(),
        &CharmSettings::default(),
        &runtime(&[("app_name", "blog")]),
    )
    .unwrap();

    assert_eq!(config["app_dir"], ConfigValue::from("/srv/blog"));
    assert_eq!(config["static_dir"], ConfigValue::from("/srv/blog/static"));
    assert_eq!(config["log_dir"], ConfigValue::from("/var/log/blog"));
    assert_eq!(config["workers"], ConfigValue::Integer(2));
    assert_eq!(config["charm_dir"], ConfigValue::from(charm.path().display().to_string()));
}

#[test]
fn test_defaults_wait_for_vars() {
    let charm = TestCharm::with_role(&RoleFixture::forward_reference()).unwrap();

    let resolution = ConfigResolver::new()
        .resolve_with_report(&role_sources(&charm), &ConfigMap::new())
        .unwrap();

    assert_eq!(resolution.config["listen"], ConfigValue::from("0.0.0.0:8000"));
    assert_eq!(resolution.rounds, 2);
}

#[test]
fn test_role_vars_override_runtime_config() {
    let charm = TestCharm::with_role(&RoleFixture::forward_reference()).unwrap();

    let config = resolve_role_config(
        charm.path(),
        &CharmSettings::default(),
        &runtime(&[("bind_host", "127.0.0.1")]),
    )
    .unwrap();

    // vars/main.yml is rendered after the runtime config is merged in
    assert_eq!(config["bind_host"], ConfigValue::from("0.0.0.0"));
    assert_eq!(config["listen"], ConfigValue::from("0.0.0.0:8000"));
}

#[test]
fn test_missing_variable_reported() {
    let charm = TestCharm::with_role(&RoleFixture::missing_variable()).unwrap();

    let err = resolve_role_config(charm.path(), &CharmSettings::default(), &ConfigMap::new())
        .unwrap_err();

    match err {
        CharmError::UnresolvedVariables {
            names,
            ..
        } => assert_eq!(names, vec!["db_host".to_string()]),
        other => panic!("expected unresolved variables, got {other:?}"),
    }
}

#[test]
fn test_missing_variable_supplied_by_runtime_config() {
    let charm = TestCharm::with_role(&RoleFixture::missing_variable()).unwrap();

    let config = resolve_role_config(
        charm.path(),
        &CharmSettings::default(),
        &runtime(&[("db_host", "10.0.0.5")]),
    )
    .unwrap();

    assert_eq!(config["database_url"], ConfigValue::from("postgresql://10.0.0.5/app"));
}

#[test]
fn test_cycle_fails_with_finite_rounds() {
    let charm = TestCharm::with_role(&RoleFixture::cyclic()).unwrap();
    let sources = role_sources(&charm);

    let err = ConfigResolver::new().resolve(&sources, &ConfigMap::new()).unwrap_err();

    match err {
        CharmError::UnresolvedVariables {
            names,
            rounds,
            ..
        } => {
            assert_eq!(names, vec!["x".to_string(), "y".to_string()]);
            // Two distinct referenced names
            assert!(rounds <= 2, "took {rounds} rounds");
        }
        other => panic!("expected unresolved variables, got {other:?}"),
    }
}

#[test]
fn test_repeat_resolution_is_identical() {
    let charm = TestCharm::with_role(&RoleFixture::basic()).unwrap();
    let settings = CharmSettings::default();
    let input = runtime(&[("app_name", "shop")]);

    let first = resolve_role_config(charm.path(), &settings, &input).unwrap();
    let second = resolve_role_config(charm.path(), &settings, &input).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_role_files_are_reread_every_call() {
    let charm = TestCharm::with_role(&RoleFixture::basic()).unwrap();
    let settings = CharmSettings::default();
    let input = runtime(&[("app_name", "shop")]);

    let before = resolve_role_config(charm.path(), &settings, &input).unwrap();
    charm.write("roles/wsgi-app/vars/main.yml", "workers: 8\n").unwrap();
    let after = resolve_role_config(charm.path(), &settings, &input).unwrap();

    assert_eq!(before["workers"], ConfigValue::Integer(2));
    assert_eq!(after["workers"], ConfigValue::Integer(8));
}

#[test]
fn test_invalid_syntax_is_reported_before_rendering() {
    let charm = TestCharm::with_role(&RoleFixture::invalid_syntax()).unwrap();

    let err = resolve_role_config(charm.path(), &CharmSettings::default(), &ConfigMap::new())
        .unwrap_err();

    match err {
        CharmError::TemplateSyntax {
            template,
            ..
        } => assert_eq!(template, "defaults/main.yml"),
        other => panic!("expected syntax error, got {other:?}"),
    }
}
