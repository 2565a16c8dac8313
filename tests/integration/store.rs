//! Environment store behavior across independent store instances.

use serde_json::{Value, json};
use wsgi_charm::store::{EnvStore, EnvVars};

use crate::common::TestCharm;

enum Op {
    Set(&'static str, Value),
    Delete(&'static str),
}

#[test]
fn test_store_matches_in_memory_replay() {
    let charm = TestCharm::new().unwrap();
    let ops = [
        Op::Set("A", json!(1)),
        Op::Set("B", json!("two")),
        Op::Delete("A"),
        Op::Delete("MISSING"),
        Op::Set("C", json!({"nested": [1, 2]})),
        Op::Set("B", json!(false)),
        Op::Set("A", json!(null)),
    ];

    let mut expected = EnvVars::new();
    for op in &ops {
        // A fresh handle each time: nothing is cached between calls
        let store = EnvStore::in_dir(charm.path());
        match op {
            Op::Set(key, value) => {
                store.set_one(key, value.clone()).unwrap();
                expected.insert((*key).to_string(), value.clone());
            }
            Op::Delete(key) => {
                store.delete_one(key).unwrap();
                expected.remove(*key);
            }
        }
        assert_eq!(store.get_all().unwrap(), expected);
    }

    assert_eq!(charm.env_json().unwrap(), Value::Object(expected));
}

#[test]
fn test_missing_file_reads_as_empty() {
    let charm = TestCharm::new().unwrap();
    let store = EnvStore::in_dir(charm.path().join("never-created"));

    assert!(store.get_all().unwrap().is_empty());
    assert_eq!(store.get("ANY").unwrap(), None);
}

#[test]
fn test_set_all_replaces_everything() {
    let charm = TestCharm::new().unwrap();
    let store = EnvStore::in_dir(charm.path());
    store.set_one("OLD", "x").unwrap();

    let mut vars = EnvVars::new();
    vars.insert("NEW".into(), json!("y"));
    store.set_all(&vars).unwrap();

    assert_eq!(charm.env_json().unwrap(), json!({"NEW": "y"}));
}
