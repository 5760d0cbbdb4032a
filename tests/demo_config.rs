// tests/demo_config.rs

use std::path::PathBuf;

use assetdag::config::load_and_validate;
use assetdag::dag::TaskNode;
use assetdag::types::CompositionMode;
use assetdag::wiring::Wiring;

fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos")
}

#[test]
fn demo_recipe_wires_into_a_graph() {
    let cfg = load_and_validate(demo_dir().join("Assetdag.toml")).unwrap();
    let graph = Wiring::new(demo_dir()).build(&cfg).unwrap();

    let tasks: Vec<&str> = graph.tasks().collect();
    assert_eq!(
        tasks,
        vec![
            "build", "clear", "default", "dev", "html", "images", "js", "live", "scss", "serve",
            "vendor", "watch"
        ]
    );

    match graph.node("default") {
        Some(TaskNode::Group { mode, children }) => {
            assert_eq!(*mode, CompositionMode::Series);
            assert_eq!(children, &vec!["build".to_string(), "live".to_string()]);
        }
        other => panic!("default should be a series, got {other:?}"),
    }

    let lines = graph.describe();
    let vendor = lines.iter().find(|l| l.starts_with("vendor:")).unwrap();
    assert!(vendor.contains("bootstrap") && vendor.contains("jquery"), "{vendor}");
    let serve = lines.iter().find(|l| l.starts_with("serve:")).unwrap();
    assert!(serve.contains("-p 3000"), "{serve}");
}
