// tests/sourcemaps.rs

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use assetdag::transform::{ConcatTransform, RenameTransform};
use serde_json::Value;

use crate::common::{Fixture, at, globs};

#[tokio::test]
async fn concatenated_bundle_gets_a_map_listing_every_source() {
    let fx = Fixture::new();
    fx.fs.add_file_at("app/js/a.js", "var a = 1;", at(0));
    fx.fs.add_file_at("app/js/b.js", "var b = 2;", at(0));

    let report = fx
        .pipeline("js", globs("app", &["js/**/*.js"]), "dist/assets/js")
        .with_sourcemaps(true)
        .with_transform(Arc::new(ConcatTransform::new("index.min.js")))
        .run_pipeline()
        .await
        .unwrap();

    assert_eq!(
        report.written,
        vec![
            PathBuf::from("dist/assets/js/index.min.js"),
            PathBuf::from("dist/assets/js/index.min.js.map"),
        ]
    );

    let bundle = fx.contents("dist/assets/js/index.min.js");
    assert_eq!(
        bundle,
        "var a = 1;\nvar b = 2;\n//# sourceMappingURL=index.min.js.map\n"
    );

    let map: Value = serde_json::from_str(&fx.contents("dist/assets/js/index.min.js.map")).unwrap();
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "index.min.js");
    assert_eq!(map["sources"], serde_json::json!(["js/a.js", "js/b.js"]));
}

#[tokio::test]
async fn maps_record_provenance_without_segment_mappings() {
    let fx = Fixture::new();
    fx.fs.add_file_at("app/js/a.js", "var a = 1;", at(0));

    fx.pipeline("js", globs("app", &["js/*.js"]), "dist")
        .with_sourcemaps(true)
        .run_pipeline()
        .await
        .unwrap();

    let map: Value = serde_json::from_str(&fx.contents("dist/js/a.js.map")).unwrap();
    assert_eq!(map["file"], "a.js");
    assert_eq!(map["sources"], serde_json::json!(["js/a.js"]));
    assert_eq!(map["mappings"], "");
    assert_eq!(map["names"], serde_json::json!([]));
}

#[tokio::test]
async fn stylesheet_map_follows_the_renamed_output() {
    let fx = Fixture::new();
    fx.fs.add_file_at("app/scss/main.scss", "body { color: red }", at(0));

    let rename = RenameTransform::new(r"^scss/(.*)\.scss$", "$1.css").unwrap();
    let report = fx
        .pipeline("scss", globs("app", &["scss/*.scss"]), "dist/assets/css")
        .with_sourcemaps(true)
        .with_transform(Arc::new(rename))
        .run_pipeline()
        .await
        .unwrap();

    assert_eq!(
        report.written,
        vec![
            PathBuf::from("dist/assets/css/main.css"),
            PathBuf::from("dist/assets/css/main.css.map"),
        ]
    );
    assert!(
        fx.contents("dist/assets/css/main.css")
            .ends_with("/*# sourceMappingURL=main.css.map */\n")
    );

    let map: Value = serde_json::from_str(&fx.contents("dist/assets/css/main.css.map")).unwrap();
    assert_eq!(map["file"], "main.css");
    assert_eq!(map["sources"], serde_json::json!(["scss/main.scss"]));
}

#[tokio::test]
async fn no_maps_unless_enabled() {
    let fx = Fixture::new();
    fx.fs.add_file_at("app/js/a.js", "var a = 1;", at(0));

    let report = fx
        .pipeline("js", globs("app", &["js/*.js"]), "dist")
        .run_pipeline()
        .await
        .unwrap();

    assert_eq!(report.written, vec![PathBuf::from("dist/js/a.js")]);
    assert_eq!(fx.contents("dist/js/a.js"), "var a = 1;");
}

#[tokio::test]
async fn maps_are_not_linked_from_other_file_types() {
    let fx = Fixture::new();
    fx.fs.add_file_at("app/index.html", "<p>hi</p>", at(0));

    let report = fx
        .pipeline("html", globs("app", &["*.html"]), "dist")
        .with_sourcemaps(true)
        .run_pipeline()
        .await
        .unwrap();

    assert_eq!(report.written.len(), 2);
    assert_eq!(fx.contents("dist/index.html"), "<p>hi</p>");
}
