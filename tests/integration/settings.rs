//! Charm settings file and environment overrides.

use serial_test::serial;
use std::path::PathBuf;
use wsgi_charm::config::{CACHE_DIR_ENV, CharmSettings};
use wsgi_charm::core::CharmError;

use crate::common::TestCharm;

#[test]
#[serial]
fn test_load_reads_settings_file() {
    let charm = TestCharm::new().unwrap();
    charm
        .write(
            "wsgi-charm.toml",
            "role_path = \"ansible/app\"\nrole_templates = [\"main.yml\"]\n",
        )
        .unwrap();

    let settings = CharmSettings::load(charm.path()).unwrap();
    assert_eq!(settings.role_path, PathBuf::from("ansible/app"));
    assert_eq!(settings.role_templates, vec!["main.yml".to_string()]);
    assert_eq!(settings.cache_dir, None);
}

#[test]
#[serial]
fn test_cache_dir_env_override() {
    let charm = TestCharm::new().unwrap();
    charm.write("wsgi-charm.toml", "cache_dir = \"from-file\"\n").unwrap();

    unsafe {
        std::env::set_var(CACHE_DIR_ENV, "/tmp/wsgi-charm-cache");
    }
    let settings = CharmSettings::load(charm.path());
    unsafe {
        std::env::remove_var(CACHE_DIR_ENV);
    }

    assert_eq!(
        settings.unwrap().cache_dir_for(charm.path()),
        PathBuf::from("/tmp/wsgi-charm-cache")
    );
}

#[test]
#[serial]
fn test_malformed_settings_file() {
    let charm = TestCharm::new().unwrap();
    charm.write("wsgi-charm.toml", "role_templates = \"not a list\"\n").unwrap();

    let err = CharmSettings::load(charm.path()).unwrap_err();
    assert!(matches!(err, CharmError::Config { .. }));
}
