// tests/change_tracking.rs

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use assetdag::errors::AssetdagError;
use assetdag::pipeline::SourceSet;
use assetdag::transform::ConcatTransform;

use crate::common::{Fixture, ScriptedTransform, at, globs};

fn seed_site(fx: &Fixture) {
    fx.fs.add_file_at("app/index.html", "<h1>home</h1>", at(0));
    fx.fs.add_file_at("app/about/team.html", "<h1>team</h1>", at(0));
    fx.fs.add_file_at("app/css/main.scss", "body {}", at(0));
}

#[tokio::test]
async fn first_run_processes_every_matching_file() {
    let fx = Fixture::new();
    seed_site(&fx);
    fx.clock.set(at(10));

    let pipeline = fx.pipeline("html", globs("app", &["**/*.html"]), "dist");
    let report = pipeline.run_pipeline().await.unwrap();

    assert_eq!(report.matched, 2);
    assert_eq!(report.processed, 2);
    assert_eq!(
        report.written,
        vec![
            PathBuf::from("dist/about/team.html"),
            PathBuf::from("dist/index.html")
        ]
    );
    assert_eq!(fx.contents("dist/index.html"), "<h1>home</h1>");
    assert_eq!(fx.tracker.last_run("html"), Some(at(10)));
    assert_eq!(fx.sink.notifications(), vec![report.written.clone()]);
}

#[tokio::test]
async fn second_run_without_changes_does_nothing() {
    let fx = Fixture::new();
    seed_site(&fx);
    let transform = ScriptedTransform::new("copy");
    let pipeline = fx
        .pipeline("html", globs("app", &["**/*.html"]), "dist")
        .with_transform(transform.clone());

    fx.clock.set(at(10));
    pipeline.run_pipeline().await.unwrap();
    let files_after_first = fx.fs.file_paths();

    fx.clock.set(at(20));
    let second = pipeline.run_pipeline().await.unwrap();

    assert_eq!(second.matched, 2);
    assert_eq!(second.processed, 0);
    assert!(second.written.is_empty());
    assert_eq!(transform.calls().len(), 1, "transforms must not run again");
    assert_eq!(fx.sink.notifications().len(), 1, "no spurious notification");
    assert_eq!(fx.fs.file_paths(), files_after_first);
    // An empty run is not a successful run of anything; the marker stays.
    assert_eq!(fx.tracker.last_run("html"), Some(at(10)));
}

#[tokio::test]
async fn only_files_modified_strictly_after_last_run_are_processed() {
    let fx = Fixture::new();
    seed_site(&fx);
    let transform = ScriptedTransform::new("copy");
    let pipeline = fx
        .pipeline("html", globs("app", &["**/*.html"]), "dist")
        .with_transform(transform.clone());

    fx.clock.set(at(10));
    pipeline.run_pipeline().await.unwrap();

    fx.fs.add_file_at("app/index.html", "<h1>home v2</h1>", at(15));
    // Exactly at the recorded start time: already covered by the first run.
    fx.fs.touch("app/about/team.html", at(10)).unwrap();
    fx.clock.set(at(30));

    let report = pipeline.run_pipeline().await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.written, vec![PathBuf::from("dist/index.html")]);
    assert_eq!(transform.calls()[1], vec!["index.html".to_string()]);
    assert_eq!(fx.contents("dist/index.html"), "<h1>home v2</h1>");
    assert_eq!(fx.tracker.last_run("html"), Some(at(30)));
}

#[tokio::test]
async fn start_time_is_recorded_not_completion_time() {
    let fx = Fixture::new();
    seed_site(&fx);
    let pipeline = fx.pipeline("html", globs("app", &["**/*.html"]), "dist");

    fx.clock.set(at(10));
    pipeline.run_pipeline().await.unwrap();

    // A file saved at 11 while a run that started at 10 was still going
    // must be picked up by the next run.
    fx.fs.touch("app/index.html", at(11)).unwrap();
    fx.clock.set(at(12));
    let report = pipeline.run_pipeline().await.unwrap();
    assert_eq!(report.processed, 1);
}

#[tokio::test]
async fn editing_one_input_rebuilds_the_whole_bundle() {
    let fx = Fixture::new();
    fx.fs.add_file_at("app/js/a.js", "var a = 1;", at(0));
    fx.fs.add_file_at("app/js/b.js", "var b = 2;", at(0));
    let pipeline = fx
        .pipeline("js", globs("app", &["js/*.js"]), "dist")
        .with_transform(Arc::new(ConcatTransform::new("index.min.js")));

    fx.clock.set(at(10));
    pipeline.run_pipeline().await.unwrap();
    assert_eq!(fx.contents("dist/index.min.js"), "var a = 1;\nvar b = 2;");

    fx.fs.add_file_at("app/js/b.js", "var b = 3;", at(20));
    fx.clock.set(at(30));
    let report = pipeline.run_pipeline().await.unwrap();

    assert_eq!(report.matched, 2);
    assert_eq!(report.processed, 2);
    assert_eq!(report.written, vec![PathBuf::from("dist/index.min.js")]);
    assert_eq!(fx.contents("dist/index.min.js"), "var a = 1;\nvar b = 3;");
    assert_eq!(fx.tracker.last_run("js"), Some(at(30)));

    // Nothing fresh: the bundle is left alone.
    fx.clock.set(at(40));
    let idle = pipeline.run_pipeline().await.unwrap();
    assert_eq!(idle.processed, 0);
    assert_eq!(fx.tracker.last_run("js"), Some(at(30)));
}

#[tokio::test(flavor = "current_thread")]
async fn pipeline_runs_on_a_single_threaded_runtime() {
    let fx = Fixture::new();
    seed_site(&fx);
    fx.clock.set(at(10));
    let pipeline = Arc::new(fx.pipeline("html", globs("app", &["**/*.html"]), "dist"));

    let spawned = Arc::clone(&pipeline);
    let report = tokio::spawn(async move { spawned.run_pipeline().await })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(fx.contents("dist/about/team.html"), "<h1>team</h1>");
}

#[tokio::test]
async fn failed_transform_gives_no_partial_credit() {
    let fx = Fixture::new();
    seed_site(&fx);
    let transform = ScriptedTransform::new("minify");
    let pipeline = fx
        .pipeline("html", globs("app", &["**/*.html"]), "dist")
        .with_transform(transform.clone());

    fx.clock.set(at(10));
    pipeline.run_pipeline().await.unwrap();

    fx.fs.add_file_at("app/index.html", "<h1>broken</h1>", at(15));
    fx.clock.set(at(20));
    transform.set_failing(true);

    let err = pipeline.run_pipeline().await.unwrap_err();
    match &err {
        AssetdagError::Transform {
            pipeline,
            transform,
            ..
        } => {
            assert_eq!(pipeline, "html");
            assert_eq!(transform, "minify");
        }
        other => panic!("expected Transform error, got {other:?}"),
    }
    assert!(err.to_string().contains("minify exploded"));
    assert_eq!(fx.tracker.last_run("html"), Some(at(10)));
    assert_eq!(fx.contents("dist/index.html"), "<h1>home</h1>");

    // The next run retries the same input set.
    transform.set_failing(false);
    fx.clock.set(at(30));
    let report = pipeline.run_pipeline().await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(fx.contents("dist/index.html"), "<h1>broken</h1>");
    assert_eq!(fx.tracker.last_run("html"), Some(at(30)));
}

#[tokio::test]
async fn failure_on_first_run_leaves_no_record() {
    let fx = Fixture::new();
    seed_site(&fx);
    let pipeline = fx
        .pipeline("html", globs("app", &["**/*.html"]), "dist")
        .with_transform(ScriptedTransform::failing("compile"));

    assert!(pipeline.run_pipeline().await.is_err());
    assert_eq!(fx.tracker.last_run("html"), None);
    assert!(fx.sink.notifications().is_empty());
}

#[tokio::test]
async fn transforms_run_in_declared_order_and_stop_at_failure() {
    let fx = Fixture::new();
    seed_site(&fx);
    let first = ScriptedTransform::new("first");
    let second = ScriptedTransform::failing("second");
    let third = ScriptedTransform::new("third");
    let pipeline = fx
        .pipeline("html", globs("app", &["**/*.html"]), "dist")
        .with_transform(first.clone())
        .with_transform(second.clone())
        .with_transform(third.clone());

    assert!(pipeline.run_pipeline().await.is_err());
    assert_eq!(first.calls().len(), 1);
    assert_eq!(second.calls().len(), 1);
    assert!(third.calls().is_empty());
    assert!(!fx.fs.file_paths().iter().any(|p| p.starts_with("dist")));
}

#[tokio::test]
async fn trackers_are_keyed_by_pipeline() {
    let fx = Fixture::new();
    seed_site(&fx);
    let html = fx.pipeline("html", globs("app", &["**/*.html"]), "dist");
    let styles = fx.pipeline("scss", globs("app", &["**/*.scss"]), "dist");

    fx.clock.set(at(10));
    html.run_pipeline().await.unwrap();

    assert_eq!(fx.tracker.last_run("html"), Some(at(10)));
    assert_eq!(fx.tracker.last_run("scss"), None);

    fx.clock.set(at(20));
    let report = styles.run_pipeline().await.unwrap();
    assert_eq!(report.processed, 1);
}

#[tokio::test]
async fn empty_source_set_succeeds_without_side_effects() {
    let fx = Fixture::new();
    let pipeline = fx.pipeline("images", globs("app/images", &["**/*.png"]), "dist");

    let report = pipeline.run_pipeline().await.unwrap();

    assert_eq!(report.matched, 0);
    assert!(report.written.is_empty());
    assert!(report.diagnostic.is_none());
    assert!(fx.sink.notifications().is_empty());
}

#[tokio::test]
async fn exclude_patterns_filter_inputs() {
    let fx = Fixture::new();
    seed_site(&fx);
    let sources = SourceSet::Globs {
        base: "app".into(),
        include: vec!["**/*.html".to_string()],
        exclude: vec!["about/**".to_string()],
    };
    let report = fx.pipeline("html", sources, "dist").run_pipeline().await.unwrap();
    assert_eq!(report.written, vec![PathBuf::from("dist/index.html")]);
}

#[tokio::test]
async fn invalid_glob_is_a_glob_expansion_error() {
    let fx = Fixture::new();
    seed_site(&fx);
    let pipeline = fx.pipeline("broken", globs("app", &["**/*.{html"]), "dist");

    match pipeline.run_pipeline().await {
        Err(AssetdagError::GlobExpansion { pattern, .. }) => assert_eq!(pattern, "**/*.{html"),
        other => panic!("expected GlobExpansion, got {other:?}"),
    }
}
