use std::fs;

use serde::{Deserialize, Serialize};
use strata_fs::{ConfigStore, Error, io};
use tempfile::TempDir;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Store {
    name: String,
    count: i32,
}

#[test]
fn test_write_atomic_creates_parent_dirs() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/dir/out.env");

    io::write_text(&path, "A=1\n").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "A=1\n");
    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_concurrent_writers_to_one_file_do_not_collide() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.json");

    let writers: Vec<_> = (0..8)
        .map(|id| {
            let path = path.clone();
            std::thread::spawn(move || {
                let content = format!("writer-{id}\n").repeat(512);
                for _ in 0..20 {
                    io::write_text(&path, &content).unwrap();
                }
                content
            })
        })
        .collect();
    let written: Vec<String> = writers.into_iter().map(|h| h.join().unwrap()).collect();

    let final_content = fs::read_to_string(&path).unwrap();
    assert!(written.contains(&final_content));
    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_read_text_missing_is_file_not_found() {
    let temp = TempDir::new().unwrap();
    let err = io::read_text(&temp.path().join("nope.txt")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[rstest::rstest]
#[case("store.json", r#"{"name": "test", "count": 42}"#)]
#[case("store.yaml", "name: test\ncount: 42\n")]
#[case("store.toml", "name = \"test\"\ncount = 42\n")]
fn test_load_each_format(#[case] file: &str, #[case] content: &str) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(file);
    fs::write(&path, content).unwrap();

    let loaded: Store = ConfigStore::new().load(&path).unwrap();
    assert_eq!(
        loaded,
        Store {
            name: "test".into(),
            count: 42
        }
    );
}

#[test]
fn test_save_then_load_json() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.json");
    let store = ConfigStore::new();
    let value = Store {
        name: "x".into(),
        count: 1,
    };

    store.save(&path, &value).unwrap();

    assert!(fs::read_to_string(&path).unwrap().ends_with("}\n"));
    let back: Store = store.load(&path).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.ini");
    fs::write(&path, "a=1").unwrap();

    let err = ConfigStore::new().load::<Store>(&path).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { ref extension } if extension == "ini"));
}

#[test]
fn test_parse_error_names_format() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, "{not json").unwrap();

    let err = ConfigStore::new().load::<Store>(&path).unwrap_err();
    match err {
        Error::ConfigParse { format, .. } => assert_eq!(format, "JSON"),
        other => panic!("unexpected error: {:?}", other),
    }
}
