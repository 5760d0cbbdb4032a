// tests/watch_patterns.rs

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use assetdag::dag::TaskGraphBuilder;
use assetdag::engine::WatchEvent;
use assetdag::errors::AssetdagError;
use assetdag::fs::FileSystem;
use assetdag::fs::mock::MockFileSystem;
use assetdag::sink::LogSink;
use assetdag::tasks::{CleanTask, WatchRuleSpec, WatchTask};
use assetdag::watch::event_handler::{SharedHashStore, prime_hashes, process_file_change};
use assetdag::watch::hash::compute_aggregate_hash;
use assetdag::watch::path_utils::join_pattern;
use assetdag::watch::watcher::spawn_watcher;
use assetdag::watch::{HashStore, MemoryHashStore, RuleProfile, collect_matching_files};
use tokio::sync::mpsc;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn profile(index: usize, task: &str, include: &[&str], exclude: &[&str], use_hash: bool) -> RuleProfile {
    RuleProfile::new(index, task, &strings(include), &strings(exclude), use_hash).unwrap()
}

fn store() -> SharedHashStore {
    Arc::new(Mutex::new(Box::new(MemoryHashStore::new()) as Box<dyn HashStore>))
}

fn seeded_fs() -> Arc<MockFileSystem> {
    let fs = MockFileSystem::new();
    fs.add_file("project/app/scss/main.scss", "body{}");
    fs.add_file("project/app/scss/_vars.scss", "$c: red;");
    fs.add_file("project/app/index.html", "<p>");
    fs.add_file("project/node_modules/jquery/dist/jquery.js", "jq");
    Arc::new(fs)
}

#[test]
fn join_pattern_drops_dot_and_empty_segments() {
    assert_eq!(join_pattern(["app", ".", "**/*.html"]), "app/**/*.html");
    assert_eq!(join_pattern(["app/", "scss", "**/*.scss"]), "app/scss/**/*.scss");
    assert_eq!(join_pattern([".", "", "node_modules", "jquery", "**/*"]), "node_modules/jquery/**/*");
}

#[test]
fn profiles_match_includes_minus_excludes() {
    let p = profile(0, "styles", &["app/**/*.scss"], &["app/**/_*.scss"], false);
    assert!(p.matches("app/scss/main.scss"));
    assert!(!p.matches("app/scss/_vars.scss"));
    assert!(!p.matches("app/index.html"));
    assert_eq!(p.task(), "styles");
    assert_eq!(p.hash_key(), "styles#0");
}

#[test]
fn invalid_patterns_are_rejected() {
    assert!(RuleProfile::new(0, "x", &strings(&["app/[*.js"]), &[], false).is_err());
}

#[test]
fn collect_matching_files_is_sorted_and_filtered() {
    let fs = seeded_fs();
    let p = profile(0, "styles", &["app/**/*.scss"], &[], true);

    let files = collect_matching_files(fs.as_ref(), Path::new("project"), &p).unwrap();
    assert_eq!(
        files,
        vec![
            PathBuf::from("project/app/scss/_vars.scss"),
            PathBuf::from("project/app/scss/main.scss"),
        ]
    );
}

#[test]
fn aggregate_hash_ignores_order_but_tracks_contents_and_names() {
    let fs = seeded_fs();
    let a = Path::new("project/app/scss/main.scss");
    let b = Path::new("project/app/scss/_vars.scss");

    let forward = compute_aggregate_hash(fs.as_ref(), &[a, b]).unwrap();
    let backward = compute_aggregate_hash(fs.as_ref(), &[b, a]).unwrap();
    assert_eq!(forward, backward);

    fs.write(a, b"body{color:blue}").unwrap();
    let edited = compute_aggregate_hash(fs.as_ref(), &[a, b]).unwrap();
    assert_ne!(forward, edited);

    let fewer = compute_aggregate_hash(fs.as_ref(), &[a]).unwrap();
    assert_ne!(edited, fewer);
}

#[tokio::test]
async fn matching_changes_become_path_events() {
    let fs = seeded_fs();
    let profiles = Arc::new(vec![
        profile(0, "styles", &["app/**/*.scss"], &[], false),
        profile(1, "html", &["app/**/*.html"], &[], false),
        profile(2, "reload", &["app/**/*"], &[], false),
    ]);
    let (tx, mut rx) = mpsc::channel(8);

    let open = process_file_change(
        fs.clone(),
        Path::new("project"),
        Path::new("project/app/scss/main.scss"),
        &profiles,
        &tx,
        store(),
    )
    .await;
    assert!(open);

    let mut rules = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            WatchEvent::PathChanged { rule, path } => {
                assert_eq!(path, "app/scss/main.scss");
                rules.push(rule);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(rules, vec![0, 2]);
}

#[tokio::test]
async fn paths_outside_the_root_are_ignored() {
    let fs = seeded_fs();
    let profiles = Arc::new(vec![profile(0, "any", &["**/*"], &[], false)]);
    let (tx, mut rx) = mpsc::channel(8);

    process_file_change(
        fs,
        Path::new("project"),
        Path::new("elsewhere/file.txt"),
        &profiles,
        &tx,
        store(),
    )
    .await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn hashed_rules_skip_saves_that_change_nothing() {
    let fs = seeded_fs();
    let root = PathBuf::from("project");
    let profiles = Arc::new(vec![profile(0, "styles", &["app/**/*.scss"], &[], true)]);
    let hashes = store();
    let (tx, mut rx) = mpsc::channel(8);

    prime_hashes(fs.clone(), root.clone(), profiles.clone(), hashes.clone()).await;

    // Saved without edits: same content, no event.
    let main = root.join("app/scss/main.scss");
    fs.write(&main, b"body{}").unwrap();
    process_file_change(fs.clone(), &root, &main, &profiles, &tx, hashes.clone()).await;
    assert!(rx.try_recv().is_err());

    // Real edit: one event, then the new hash is the baseline.
    fs.write(&main, b"body{margin:0}").unwrap();
    process_file_change(fs.clone(), &root, &main, &profiles, &tx, hashes.clone()).await;
    assert!(matches!(rx.try_recv(), Ok(WatchEvent::PathChanged { rule: 0, .. })));

    process_file_change(fs.clone(), &root, &main, &profiles, &tx, hashes).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn a_closed_engine_stops_forwarding() {
    let fs = seeded_fs();
    let profiles = Arc::new(vec![profile(0, "html", &["app/**/*.html"], &[], false)]);
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let open = process_file_change(
        fs,
        Path::new("project"),
        Path::new("project/app/index.html"),
        &profiles,
        &tx,
        store(),
    )
    .await;
    assert!(!open);
}

#[tokio::test]
async fn watching_a_missing_root_is_a_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let (tx, _rx) = mpsc::channel::<WatchEvent>(4);

    let err = spawn_watcher(
        &missing,
        vec![profile(0, "html", &["**/*.html"], &[], false)],
        tx,
        seeded_fs(),
    )
    .err()
    .expect("missing root must fail");

    match err {
        AssetdagError::WatchSetup { path, .. } => assert_eq!(path, missing),
        other => panic!("expected WatchSetup, got {other:?}"),
    }
}

#[tokio::test]
async fn watch_task_with_missing_root_fails_through_the_graph() {
    let dir = tempfile::tempdir().unwrap();
    let fs: Arc<dyn FileSystem> = seeded_fs();

    let watch = WatchTask::new(
        vec![WatchRuleSpec {
            task: "clean".into(),
            include: strings(&["app/**/*.html"]),
            exclude: Vec::new(),
            use_hash: false,
            debounce: std::time::Duration::from_millis(50),
        }],
        dir.path().join("missing"),
        1,
        Arc::clone(&fs),
        Arc::new(LogSink),
    );

    let mut builder = TaskGraphBuilder::new();
    builder
        .register("clean", Arc::new(CleanTask::new("dist", Arc::clone(&fs))))
        .unwrap();
    builder.register("watch", Arc::new(watch)).unwrap();
    let graph = Arc::new(builder.build().unwrap());

    let err = graph.run("watch").await.unwrap_err();
    assert!(
        matches!(err, AssetdagError::WatchSetup { .. }),
        "expected WatchSetup, got {err:?}"
    );
}
