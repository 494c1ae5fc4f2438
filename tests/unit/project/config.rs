use std::borrow::Cow;

use super::*;
use crate::foundation::core::EndOfLife;
use crate::foundation::error::MergeError;

fn tiny_gif() -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut enc = gif::Encoder::new(&mut out, 3, 2, &[0, 0, 255]).unwrap();
        let frame = gif::Frame {
            width: 3,
            height: 2,
            delay: 6,
            buffer: Cow::Owned(vec![0; 6]),
            ..Default::default()
        };
        enc.write_frame(&frame).unwrap();
    }
    out
}

#[test]
fn parses_items_with_flattened_overrides() {
    let project = Project::from_json(
        r#"{
            "canvas": { "width": 64, "height": 32 },
            "items": [
                { "path": "a.gif" },
                { "path": "b.gif", "z_index": -3, "scale_x": 0.5, "end_of_life": "hidden" }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(project.canvas, Some(Canvas::new(64, 32).unwrap()));
    assert_eq!(project.items.len(), 2);
    assert!(project.items[0].patch.is_empty());

    let b = &project.items[1].patch;
    assert_eq!(b.z_index, Some(-3));
    assert_eq!(b.scale_x, Some(0.5));
    assert_eq!(b.end_of_life, Some(EndOfLife::Hidden));
}

#[test]
fn canvas_is_optional_and_bad_json_is_reported() {
    let project = Project::from_json(r#"{ "items": [] }"#).unwrap();
    assert_eq!(project.canvas, None);

    let err = Project::from_json("{ items: ").unwrap_err();
    assert!(matches!(err, MergeError::Other(_)));
    assert!(err.to_string().contains("parse project JSON"));
}

#[test]
fn relative_paths_resolve_against_the_base() {
    let mut project = Project::from_json(r#"{ "items": [ { "path": "in/a.gif" } ] }"#).unwrap();
    let absolute = std::env::temp_dir().join("b.gif");
    project.items.push(ProjectItem {
        path: absolute.clone(),
        patch: ItemPatch::default(),
    });

    project.resolve_paths(Path::new("projects"));
    assert_eq!(project.items[0].path, Path::new("projects").join("in/a.gif"));
    assert_eq!(project.items[1].path, absolute);
}

#[test]
fn build_reads_sources_and_applies_the_canvas() {
    let dir = PathBuf::from("target").join("project_unit");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("tiny.gif"), tiny_gif()).unwrap();
    std::fs::write(
        dir.join("project.json"),
        r#"{
            "canvas": { "width": 10, "height": 4 },
            "items": [ { "path": "tiny.gif", "left": 2, "label": "tiny" } ]
        }"#,
    )
    .unwrap();

    let merger = Project::load(&dir.join("project.json"))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(merger.canvas(), Some(Canvas::new(10, 4).unwrap()));

    let item = merger.items().next().unwrap();
    assert_eq!(item.props().label, "tiny");
    assert_eq!(item.props().left, 2.0);
    assert_eq!(merger.duration(), 6);
}

#[test]
fn build_reports_missing_sources() {
    let project = Project {
        canvas: None,
        items: vec![ProjectItem {
            path: PathBuf::from("target/project_unit/missing.gif"),
            patch: ItemPatch::default(),
        }],
    };
    let err = project.build().unwrap_err();
    assert!(err.to_string().contains("missing.gif"));
}
