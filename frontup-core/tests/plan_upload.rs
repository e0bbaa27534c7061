use std::collections::HashSet;
use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};

use frontup_core::{plan, ErrorKind, PlanError, SourceSpec};
use tempfile::{tempdir, TempDir};

const FILES: [&str; 3] = ["fA0.js", "fA1.html", "fB0.css"];

/// Builds the fixture tree below `<tmp>/data` and returns the temp dir guard.
///
/// ```text
/// data/dA0/{fA0.js, fA1.html, fB0.css, fB1.no-mime-type}
/// data/dA0/{dA0, dA1, dB0, dB1}/{fA0.js, fA1.html, fB0.css}
/// data/{dA1, dB0, dB1}/{fA0.js, fA1.html, fB0.css}
/// ```
fn create_test_tree() -> TempDir {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");
    let fill = |dir: &Path| {
        create_dir_all(dir).unwrap();
        for name in FILES {
            write(dir.join(name), name).unwrap();
        }
    };
    fill(&data.join("dA0"));
    write(data.join("dA0/fB1.no-mime-type"), "fB1").unwrap();
    for sub in ["dA0", "dA1", "dB0", "dB1"] {
        fill(&data.join("dA0").join(sub));
    }
    for sub in ["dA1", "dB0", "dB1"] {
        fill(&data.join(sub));
    }
    tmp
}

fn data(tmp: &TempDir) -> PathBuf {
    tmp.path().join("data")
}

fn slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn keys(source: &SourceSpec, destination: &str) -> Vec<String> {
    plan(destination, source)
        .expect("planning should succeed")
        .into_iter()
        .map(|i| i.destination_key)
        .collect()
}

#[test]
fn test_single_file_into_folder_uses_basename() {
    let tmp = create_test_tree();
    let file = data(&tmp).join("dA0/fA0.js");

    let planned = plan("test/data/", &SourceSpec::from(file.clone())).unwrap();

    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].destination_key, "test/data/fA0.js");
    assert_eq!(planned[0].source_path, file);
    assert_eq!(
        planned[0].content_type.as_ref().map(|m| m.essence_str()),
        Some("application/javascript")
    );
}

#[test]
fn test_single_file_into_object_key_is_verbatim() {
    let tmp = create_test_tree();
    let file = data(&tmp).join("dA0/fA1.html");

    let planned = plan("site/index.html", &SourceSpec::from(file)).unwrap();

    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].destination_key, "site/index.html");
    assert!(planned[0].is_text());
}

#[test]
fn test_file_without_known_extension_has_no_content_type() {
    let tmp = create_test_tree();
    let file = data(&tmp).join("dA0/fB1.no-mime-type");

    let planned = plan("test/data/", &SourceSpec::from(file)).unwrap();

    assert_eq!(planned[0].content_type, None);
    assert!(!planned[0].is_text());
}

#[test]
fn test_directory_requires_folder_destination() {
    let tmp = create_test_tree();
    let dir = data(&tmp).join("dA0/dA0");
    let dir_with_slash = PathBuf::from(format!("{}/", slash(&dir)));

    for source in [dir, dir_with_slash] {
        let err = plan("test/data", &SourceSpec::from(source)).unwrap_err();
        assert!(matches!(err, PlanError::NotAFolder { .. }), "got {err:?}");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

#[test]
fn test_directory_lists_every_file() {
    let tmp = create_test_tree();
    let dir = data(&tmp).join("dA0/dA0");

    let planned = plan("test/data/", &SourceSpec::from(dir.clone())).unwrap();

    assert_eq!(planned.len(), 3);
    assert!(planned
        .iter()
        .any(|i| i.destination_key == "test/data/fA0.js" && i.source_path == dir.join("fA0.js")));
}

#[test]
fn test_directory_lists_files_in_sub_directories() {
    let tmp = create_test_tree();

    let found = keys(&SourceSpec::from(data(&tmp)), "test/data/");

    assert_eq!(found.len(), 25);
    assert!(found.contains(&"test/data/dA0/dB1/fB0.css".to_string()));
}

#[test]
fn test_directory_key_replaces_source_root_with_destination() {
    let tmp = create_test_tree();
    let plain = data(&tmp);
    let trailing = PathBuf::from(format!("{}/", slash(&plain)));

    for source in [plain, trailing] {
        let planned = plan("test1/data2/", &SourceSpec::from(source)).unwrap();
        assert!(planned.iter().any(|i| {
            i.destination_key == "test1/data2/dA0/dA0/fA1.html"
                && slash(&i.source_path).ends_with("data/dA0/dA0/fA1.html")
        }));
    }
}

#[test]
fn test_missing_source_is_not_found() {
    let tmp = create_test_tree();
    let missing = tmp.path().join("there-is-no-file");

    let err = plan("test/data/", &SourceSpec::from(missing)).unwrap_err();

    assert!(matches!(err, PlanError::SourceNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_missing_file_inside_list_fails_whole_plan() {
    let tmp = create_test_tree();
    let source = SourceSpec::List(vec![
        SourceSpec::from(data(&tmp).join("dA0/fA0.js")),
        SourceSpec::from(tmp.path().join("nope.js")),
    ]);

    assert!(plan("test/data/", &source).is_err());
}

#[test]
fn test_list_preserves_order_and_concatenates() {
    let tmp = create_test_tree();
    let first = SourceSpec::from(data(&tmp).join("dA0/fA0.js"));
    let second = SourceSpec::from(data(&tmp).join("dA0/dB0"));

    let combined = plan("test/data/", &SourceSpec::List(vec![first.clone(), second.clone()])).unwrap();
    let mut expected = plan("test/data/", &first).unwrap();
    expected.extend(plan("test/data/", &second).unwrap());

    assert_eq!(combined, expected);
    assert_eq!(combined[0].destination_key, "test/data/fA0.js");
}

#[test]
fn test_list_of_files_creates_multiple_instructions() {
    let tmp = create_test_tree();
    let source = SourceSpec::List(vec![
        SourceSpec::from(data(&tmp).join("dA0/fA0.js")),
        SourceSpec::from(data(&tmp).join("dA0/fA1.html")),
    ]);

    let planned = plan("test/data/", &source).unwrap();

    assert_eq!(planned.len(), 2);
    assert_eq!(planned[0].destination_key, "test/data/fA0.js");
    assert_eq!(planned[1].destination_key, "test/data/fA1.html");
    assert_eq!(
        planned[1].content_type.as_ref().map(|m| m.essence_str()),
        Some("text/html")
    );
}

#[test]
fn test_exclude_by_single_expression() {
    let tmp = create_test_tree();
    let source =
        SourceSpec::with_exclude(SourceSpec::from(data(&tmp).join("dA0/dA0")), ["(js|html)$"]).unwrap();

    assert_eq!(keys(&source, "test/data/"), vec!["test/data/fB0.css".to_string()]);
}

#[test]
fn test_exclude_by_multiple_expressions() {
    let tmp = create_test_tree();
    let source =
        SourceSpec::with_exclude(SourceSpec::from(data(&tmp).join("dA0/dA0")), ["js$", "html$"]).unwrap();

    assert_eq!(keys(&source, "test/data/"), vec!["test/data/fB0.css".to_string()]);
}

#[test]
fn test_exclude_html_counts_match() {
    let tmp = create_test_tree();
    let all = plan("site/", &SourceSpec::from(data(&tmp))).unwrap();
    let html = all.iter().filter(|i| i.source_str().ends_with(".html")).count();

    let source = SourceSpec::with_exclude(SourceSpec::from(data(&tmp)), ["\\.html$"]).unwrap();
    let kept = plan("site/", &source).unwrap();

    assert_eq!(kept.len(), all.len() - html);
    assert!(kept.iter().all(|i| !i.source_str().ends_with(".html")));
}

#[test]
fn test_exclude_whole_directories() {
    let tmp = create_test_tree();
    let pattern = format!("^{}/", regex::escape(&slash(&data(&tmp).join("dA0"))));
    let source = SourceSpec::with_exclude(SourceSpec::from(data(&tmp)), [pattern]).unwrap();

    let found = keys(&source, "test/data/");

    assert_eq!(found.len(), 9);
    assert!(found.contains(&"test/data/dA1/fA0.js".to_string()));
    assert!(found.contains(&"test/data/dB0/fA1.html".to_string()));
    assert!(found.contains(&"test/data/dB1/fB0.css".to_string()));
}

#[test]
fn test_exclude_with_multiple_extensions() {
    let tmp = create_test_tree();
    let source = SourceSpec::with_exclude(
        SourceSpec::from(data(&tmp)),
        ["(js|html|no-mime-type)$"],
    )
    .unwrap();

    let found: HashSet<String> = keys(&source, "test/data/").into_iter().collect();

    let expected: HashSet<String> = [
        "test/data/dA0/fB0.css",
        "test/data/dA0/dA0/fB0.css",
        "test/data/dA0/dA1/fB0.css",
        "test/data/dA0/dB0/fB0.css",
        "test/data/dA0/dB1/fB0.css",
        "test/data/dA1/fB0.css",
        "test/data/dB0/fB0.css",
        "test/data/dB1/fB0.css",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(found, expected);
}

#[test]
fn test_exclude_matches_source_not_destination() {
    let tmp = create_test_tree();
    let source =
        SourceSpec::with_exclude(SourceSpec::from(data(&tmp).join("dA1")), ["^published/"]).unwrap();

    assert_eq!(keys(&source, "published/").len(), 3);
}

#[test]
fn test_planning_is_idempotent() {
    let tmp = create_test_tree();
    let source = SourceSpec::List(vec![
        SourceSpec::from(data(&tmp)),
        SourceSpec::with_exclude(SourceSpec::from(data(&tmp).join("dB0")), ["css$"]).unwrap(),
    ]);

    let first = plan("site/", &source).unwrap();
    let second = plan("site/", &source).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_bucket_root_folder_keys() {
    let tmp = create_test_tree();

    let dir_keys = keys(&SourceSpec::from(data(&tmp).join("dB1")), "/");
    let file_keys = keys(&SourceSpec::from(data(&tmp).join("dB1/fA0.js")), "/");

    // Directory listings drop the leading slash; a single file keeps the plain join.
    assert!(dir_keys.contains(&"fA0.js".to_string()));
    assert!(dir_keys.iter().all(|k| !k.starts_with('/')));
    assert_eq!(file_keys, vec!["/fA0.js".to_string()]);
}
