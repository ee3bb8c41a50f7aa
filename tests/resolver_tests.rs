//! Integration tests for layered resolution.
//!
//! Covers precedence, recursive and total replacement, sequence handling,
//! error locality, format parity and the reload policy.

use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use tempfile::TempDir;
use yaml_layers::config::{FileSpec, Resolver, SourceDeclaration, SourceSpec, load, load_files};
use yaml_layers::error::{ErrorCode, LoadError, ResolveError};

/// Helper to write a file into the temp dir and return its path.
fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

fn merged(files: &[PathBuf]) -> Value {
    let specs: Vec<FileSpec> = files.iter().cloned().map(FileSpec::new).collect();
    Value::Object(load_files(&specs).expect("Failed to merge"))
}

#[test]
fn test_later_file_wins_and_order_matters() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.yaml", "x:\n  y: from-a\n");
    let b = write(temp.path(), "b.yaml", "x:\n  y: from-b\n");

    assert_eq!(merged(&[a.clone(), b.clone()])["x"]["y"], json!("from-b"));
    assert_eq!(merged(&[b, a])["x"]["y"], json!("from-a"));
}

#[test]
fn test_recursive_merge_keeps_untouched_siblings() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.yaml", "db:\n  host: h1\n  port: 1\n");
    let b = write(temp.path(), "b.yaml", "db:\n  port: 2\n");

    assert_eq!(merged(&[a, b]), json!({"db": {"host": "h1", "port": 2}}));
}

#[test]
fn test_scalar_totally_replaces_mapping() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.yaml", "db:\n  host: h1\n");
    let b = write(temp.path(), "b.yaml", "db: disabled\n");

    assert_eq!(merged(&[a, b]), json!({"db": "disabled"}));
}

#[test]
fn test_sequences_are_replaced() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.yaml", "tags: [a, b]\n");
    let b = write(temp.path(), "b.yaml", "tags: [c]\n");

    assert_eq!(merged(&[a, b]), json!({"tags": ["c"]}));
}

#[test]
fn test_deeply_nested_structures_merge_at_every_level() {
    let temp = TempDir::new().unwrap();
    let a = write(
        temp.path(),
        "a.yaml",
        r#"
one:
  two:
    three:
      four:
        five:
          keep: a
          override: a
        sibling: a
"#,
    );
    let b = write(
        temp.path(),
        "b.json",
        r#"{"one": {"two": {"three": {"four": {"five": {"override": "b", "added": "b"}}}}}}"#,
    );

    assert_eq!(
        merged(&[a, b]),
        json!({
            "one": {"two": {"three": {"four": {
                "five": {"keep": "a", "override": "b", "added": "b"},
                "sibling": "a"
            }}}}
        })
    );
}

#[test]
fn test_three_layers_merge_key_path_by_key_path() {
    let temp = TempDir::new().unwrap();
    let defaults = write(
        temp.path(),
        "defaults.yaml",
        "server:\n  host: 0.0.0.0\n  port: 80\nlog: info\n",
    );
    let project = write(temp.path(), "project.yaml", "server:\n  port: 8080\n");
    let user = write(temp.path(), "user.json", r#"{"log": "debug", "extra": null}"#);

    assert_eq!(
        merged(&[defaults, project, user]),
        json!({
            "server": {"host": "0.0.0.0", "port": 8080},
            "log": "debug",
            "extra": null
        })
    );
}

#[test]
fn test_missing_file_fails_at_its_index_and_stops() {
    let temp = TempDir::new().unwrap();
    let good = write(temp.path(), "good.yaml", "a: 1\n");
    let missing = temp.path().join("missing.yaml");
    // A directory in place of good2 would also fail; it must never be reached.
    let never = temp.path().join("good2.yaml");
    fs::create_dir(&never).unwrap();

    let files = vec![
        FileSpec::new(&good),
        FileSpec::new(&missing),
        FileSpec::new(&never),
    ];
    let err = load_files(&files).unwrap_err();

    match &err {
        ResolveError::Load {
            index: 1,
            source: LoadError::FileNotFound { path, .. },
        } => assert_eq!(path, &missing),
        other => panic!("expected FileNotFound at index 1, got {other:?}"),
    }
    assert_eq!(err.code(), ErrorCode::FileNotFound);
    assert!(err.to_string().contains("missing.yaml"));
}

#[test]
fn test_parse_and_schema_errors_are_located() {
    let temp = TempDir::new().unwrap();
    let good = write(temp.path(), "good.yaml", "a: 1\n");
    let broken = write(temp.path(), "broken.json", "{\"a\": [1, 2}");
    let list = write(temp.path(), "list.yaml", "- 1\n- 2\n");

    let err = load_files(&[FileSpec::new(&good), FileSpec::new(&broken)]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ParseError);
    assert_eq!(err.index(), Some(1));
    assert_eq!(err.path(), Some(broken.as_path()));

    let err = load_files(&[FileSpec::new(&list), FileSpec::new(&good)]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::SchemaError);
    assert_eq!(err.index(), Some(0));
}

#[test]
fn test_json_and_yaml_files_decode_the_same() {
    let temp = TempDir::new().unwrap();
    let json_file = write(temp.path(), "a.json", r#"{"a": 1}"#);
    let yaml_file = write(temp.path(), "a.yaml", "a: 1\n");
    // Extension does not select the format.
    let yaml_in_json = write(temp.path(), "b.json", "a: 1\n");

    let from_json = load(&json_file).unwrap();
    assert_eq!(from_json, load(&yaml_file).unwrap());
    assert_eq!(from_json, load(&yaml_in_json).unwrap());
}

#[test]
fn test_no_reload_returns_same_result_despite_disk_changes() {
    let temp = TempDir::new().unwrap();
    let path = write(temp.path(), "settings.yaml", "value: 1\n");
    let resolver = Resolver::new(SourceSpec::new([path.clone()], false));

    let first = resolver.resolve().unwrap();
    fs::write(&path, "value: 2\n").unwrap();
    let second = resolver.resolve().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second["value"], json!(1));

    // Even a file that no longer parses goes unnoticed.
    fs::write(&path, "- now a list\n").unwrap();
    assert_eq!(resolver.resolve().unwrap()["value"], json!(1));
    assert_eq!(resolver.stats().loads, 1);
}

#[test]
fn test_reload_picks_up_changes() {
    let temp = TempDir::new().unwrap();
    let path = write(temp.path(), "settings.yaml", "value: 1\n");
    let resolver = Resolver::new(SourceSpec::new([path.clone()], true));

    assert_eq!(resolver.resolve().unwrap()["value"], json!(1));
    fs::write(&path, "value: 2\n").unwrap();
    assert_eq!(resolver.resolve().unwrap()["value"], json!(2));

    fs::write(&path, "[]\n").unwrap();
    assert_eq!(
        resolver.resolve().unwrap_err().code(),
        ErrorCode::SchemaError
    );

    fs::write(&path, "{}\n").unwrap();
    assert!(resolver.resolve().unwrap().is_empty());
    assert_eq!(resolver.stats().loads, 4);
}

#[test]
fn test_concurrent_first_resolution_computes_once() {
    const THREADS: usize = 8;

    let temp = TempDir::new().unwrap();
    let path = write(temp.path(), "settings.yaml", "value: 1\n");
    let resolver = Resolver::new(SourceSpec::new([path], false));
    let barrier = Barrier::new(THREADS);

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    resolver.resolve().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(resolver.stats().loads, 1);
    assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
}

#[test]
fn test_declared_spec_resolves() {
    let temp = TempDir::new().unwrap();
    let base = write(temp.path(), "base.yaml", "app:\n  name: demo\n  debug: false\n");
    let local = write(temp.path(), "local.yaml", "app:\n  debug: true\n");

    let defaults = SourceDeclaration::new()
        .with_files([base.clone()])
        .with_reload(false);
    let overrides = SourceDeclaration::new().with_files([
        FileSpec::new(&base),
        FileSpec::new(&local),
        FileSpec::new(temp.path().join("absent.yaml")).optional(),
    ]);

    let spec = SourceSpec::from_declarations(&overrides, &defaults).unwrap();
    assert!(!spec.reload);

    let resolver = Resolver::new(spec);
    assert_eq!(
        Value::Object((*resolver.resolve().unwrap()).clone()),
        json!({"app": {"name": "demo", "debug": true}})
    );
}
