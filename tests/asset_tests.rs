// tests/asset_tests.rs

use macroquad_tile_editor::{ingest, EditorError, GridBackend, MapDocument, TilesetSpec};
use std::fs;
use std::path::PathBuf;

#[test]
fn shipped_assets_ingest_cleanly() {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("assets");
    path.push("map.json");
    let doc = MapDocument::from_file(&path).expect("shipped map should load");

    // The shipped tileset.png is a 256x256 sheet of 32px tiles.
    let mut backend = GridBackend::new();
    backend.register_tileset("tileset", TilesetSpec::new(8, Some(64), 32, 32));

    let active = ingest(&mut backend, None, &doc, "tileset").expect("shipped map should ingest");
    assert!(active.outcomes.iter().all(|o| o.result.is_ok()));
    assert!(active.interactive.is_some());
    assert!(active
        .layers
        .iter()
        .any(|l| l.name == "platforms" && l.collidable));
}

#[test]
fn integration_load_from_file_and_str() {
    let json = r#"
    {
        "width": 1,
        "height": 1,
        "tilewidth": 4,
        "tileheight": 4,
        "layers": [ { "name": "L", "width": 1, "height": 1, "data": [0] } ]
    }
    "#;
    let doc = MapDocument::from_json_str(json).expect("should parse inline JSON");
    assert_eq!(doc.width, 1);

    let mut path = PathBuf::from(std::env::temp_dir());
    path.push("tile_editor_integration_map.json");
    fs::write(&path, json).unwrap();
    let doc2 = MapDocument::from_file(&path).unwrap();
    assert_eq!(doc2.tilewidth, 4);
    fs::remove_file(&path).unwrap();
}

#[test]
fn integration_unsupported_format() {
    let err = MapDocument::from_file("foo.tmx").unwrap_err();
    match err {
        EditorError::UnsupportedFormat(path) => assert_eq!(path, "foo.tmx"),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}
