// tests/transforms.rs

#![cfg(unix)]

use std::path::PathBuf;
use std::time::Duration;

use assetdag::pipeline::Asset;
use assetdag::sink::{CommandSink, NotificationSink};
use assetdag::transform::{CommandTransform, ConcatTransform, RenameTransform, Transform};
use assetdag_test_utils::{init_tracing, with_timeout};
use tempfile::tempdir;

fn asset(path: &str, contents: &str) -> Asset {
    Asset::new(path, contents)
}

fn text(asset: &Asset) -> &str {
    std::str::from_utf8(&asset.contents).unwrap()
}

#[tokio::test]
async fn command_transform_filters_contents_and_swaps_extension() {
    init_tracing();
    let transform = CommandTransform::new("tr a-z A-Z", Some("css".to_string()));
    assert_eq!(transform.name(), "tr");

    let out = transform
        .apply(vec![asset("scss/main.scss", "body{}"), asset("scss/x.scss", "p{}")])
        .await
        .unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].path_str(), "scss/main.css");
    assert_eq!(text(&out[0]), "BODY{}");
    assert_eq!(text(&out[1]), "P{}");
    // Provenance is untouched by a 1:1 transform.
    assert_eq!(out[0].sources, vec![PathBuf::from("scss/main.scss")]);
}

#[tokio::test]
async fn command_transform_sees_the_relative_path() {
    let transform = CommandTransform::new("printf '%s' \"$ASSETDAG_FILE\"", None);
    let out = transform
        .apply(vec![asset("js/app.js", "ignored")])
        .await
        .unwrap();
    assert_eq!(text(&out[0]), "js/app.js");
    assert_eq!(out[0].path_str(), "js/app.js");
}

#[tokio::test]
async fn failing_command_reports_its_stderr() {
    let transform = CommandTransform::new("echo 'bad syntax' >&2; exit 2", None);
    let err = transform
        .apply(vec![asset("scss/broken.scss", "{")])
        .await
        .unwrap_err();

    let msg = format!("{err:#}");
    assert!(msg.contains("scss/broken.scss"), "{msg}");
    assert!(msg.contains("code 2"), "{msg}");
    assert!(msg.contains("bad syntax"), "{msg}");
}

#[tokio::test]
async fn rename_rewrites_matching_paths_only() {
    let transform = RenameTransform::new(r"\.js$", ".min.js").unwrap();
    let out = transform
        .apply(vec![asset("js/app.js", "a"), asset("js/app.css", "b")])
        .await
        .unwrap();
    assert_eq!(out[0].path_str(), "js/app.min.js");
    assert_eq!(out[1].path_str(), "js/app.css");
}

#[test]
fn rename_rejects_bad_patterns() {
    assert!(RenameTransform::new("(", "x").is_err());
}

#[tokio::test]
async fn concat_joins_in_order_and_merges_sources() {
    let transform = ConcatTransform::new("index.min.js");
    let out = transform
        .apply(vec![
            asset("js/a.js", "var a;"),
            asset("js/b.js", "var b;\n"),
            asset("js/c.js", "var c;"),
        ])
        .await
        .unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].path_str(), "index.min.js");
    assert_eq!(text(&out[0]), "var a;\nvar b;\nvar c;");
    assert_eq!(
        out[0].sources,
        vec![
            PathBuf::from("js/a.js"),
            PathBuf::from("js/b.js"),
            PathBuf::from("js/c.js")
        ]
    );
    assert!(out[0].source_map.is_none());
}

#[tokio::test]
async fn concat_of_nothing_is_nothing() {
    let out = ConcatTransform::new("index.min.js")
        .apply(Vec::new())
        .await
        .unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn command_sink_passes_changed_paths_to_its_command() {
    init_tracing();
    let dir = tempdir().unwrap();
    let out = dir.path().join("changed.txt");
    let sink = CommandSink::new(
        Some(format!("printf '%s' \"$ASSETDAG_CHANGED\" > '{}'", out.display())),
        None,
    );

    sink.notify(&[PathBuf::from("dist/a.css"), PathBuf::from("dist/b.css")]);
    // No reload command configured: nothing happens.
    sink.reload();

    let written = with_timeout(async {
        loop {
            if let Ok(text) = std::fs::read_to_string(&out) {
                if text.ends_with("b.css") {
                    return text;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert_eq!(written, "dist/a.css\ndist/b.css");
}

#[tokio::test]
async fn command_sink_runs_the_reload_command() {
    let dir = tempdir().unwrap();
    let marker = dir.path().join("reloaded");
    let sink = CommandSink::new(None, Some(format!("touch '{}'", marker.display())));

    sink.reload();

    with_timeout(async {
        while !marker.exists() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
}
