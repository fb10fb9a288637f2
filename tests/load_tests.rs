// tests/load_tests.rs

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use macroquad::prelude::*;
use macroquad_tile_batch::{
    decode_level_file_to_ir, ErrorKind, SubTextureRect, SubTextureTable, TextureRule,
    TextureSize, TileDesc, TileError, TileSet,
};

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("mq_tile_batch_{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

#[test]
fn rules_file_loads_with_whitespace_and_trailing_blanks() {
    let dir = temp_dir();
    let path = dir.join("atlas.txt");
    fs::write(&path, " 0, 0, 32, 32\n32,0,32,16 \n\n\n").unwrap();

    let table = SubTextureTable::load_rules(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(1).unwrap(), SubTextureRect::new(32.0, 0.0, 32.0, 16.0));
}

#[test]
fn rules_file_failures() {
    let dir = temp_dir();

    let empty = dir.join("empty.txt");
    fs::write(&empty, "\n\n").unwrap();
    let err = SubTextureTable::load_rules(&empty).unwrap_err();
    assert!(matches!(err, TileError::EmptyRules { .. }));
    assert_eq!(err.kind(), ErrorKind::Load);

    let bad = dir.join("bad.txt");
    fs::write(&bad, "0,0,32,32\n0,abc,32,32\n").unwrap();
    match SubTextureTable::load_rules(&bad).unwrap_err() {
        TileError::Parse { text } => assert_eq!(text, "abc"),
        other => panic!("expected Parse, got {:?}", other),
    }

    let short = dir.join("short.txt");
    fs::write(&short, "0,0,32\n").unwrap();
    let err = SubTextureTable::load_rules(&short).unwrap_err();
    assert!(matches!(err, TileError::MalformedRecord { line: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::Parse);

    let err = SubTextureTable::load_rules(dir.join("missing.txt")).unwrap_err();
    assert!(matches!(err, TileError::Io { .. }));
}

#[test]
fn swapping_in_a_rules_atlas_reloads_tiles() {
    let dir = temp_dir();
    let path = dir.join("atlas.txt");
    fs::write(&path, "0,0,16,16\n").unwrap();

    let mut set = TileSet::with_atlas(
        TextureSize(vec2(64.0, 16.0)),
        SubTextureTable::uniform(vec2(64.0, 16.0), 4),
    );
    set.add(TileDesc::textured(Vec2::ZERO, vec2(32.0, 32.0), 3, TextureRule::RepeatTexture))
        .unwrap();

    set.set_texture_with_rules(TextureSize(vec2(16.0, 16.0)), &path).unwrap();

    assert_eq!(set.sub_textures().len(), 1);
    assert_eq!(set.tile(0).unwrap().sub_texture_index(), Some(0));
    assert_eq!(set.vertex_count(0).unwrap(), 24);
    set.check_invariants().unwrap();
}

#[test]
fn json_atlas_loads() {
    let dir = temp_dir();
    let path = dir.join("atlas.json");
    fs::write(&path, "[[0, 0, 8, 8], [8, 0, 8, 8]]").unwrap();

    let table = SubTextureTable::load_json(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(1).unwrap().position(), vec2(8.0, 0.0));
}

#[test]
fn level_file_builds_a_tile_set() {
    let dir = temp_dir();
    fs::write(dir.join("atlas.txt"), "0,0,20,20\n20,0,20,20\n").unwrap();
    let level = dir.join("level.json");
    fs::write(
        &level,
        r#"{
          "texture": "atlas.png",
          "sub_textures": {"rules": "atlas.txt"},
          "tiles": [
            {"position": [0, 0], "size": [40, 20]},
            {"position": [0, 40], "size": [20, 20], "sub_texture": 1, "color": [0, 0, 255, 255]},
            {"position": [50, 50], "size": [10, 10], "sub_texture": null}
          ]
        }"#,
    )
    .unwrap();

    let (ir, base) = decode_level_file_to_ir(&level).unwrap();
    assert_eq!(base, dir);
    assert_eq!(ir.texture, Some(dir.join("atlas.png")));

    let set = TileSet::from_ir(&ir, Some(TextureSize(vec2(40.0, 20.0)))).unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(set.offsets(), &[0, 12, 18]);
    assert_eq!(set.color(1).unwrap(), Color::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(set.tile(2).unwrap().sub_texture_index(), None);
    assert_eq!(set.flush_count(), 1);
    set.check_invariants().unwrap();
}

#[test]
fn level_with_missing_rules_fails_to_build() {
    let dir = temp_dir();
    let level = dir.join("level.json");
    fs::write(&level, r#"{"sub_textures": {"rules": "nope.txt"}}"#).unwrap();

    let (ir, _) = decode_level_file_to_ir(&level).unwrap();
    let err = TileSet::from_ir(&ir, None::<TextureSize>).err().unwrap();
    assert!(matches!(err, TileError::Io { .. }));
}

#[test]
fn unsupported_level_format() {
    let err = decode_level_file_to_ir("level.tmx").unwrap_err();
    match err {
        TileError::UnsupportedFormat(path) => assert_eq!(path, "level.tmx"),
        other => panic!("expected UnsupportedFormat, got {:?}", other),
    }
}
