use std::fs;

use huff::session::Config;
use huff::{BitFormat, Error, Session, TreeFormat};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> Config {
    Config {
        tree_path: dir.path().join("tree.txt"),
        payload_path: dir.path().join("encoded.bin"),
        ..Config::default()
    }
}

#[test]
fn test_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("decoded.txt");
    let text = b"The quick brown fox jumps over the lazy dog. ".repeat(200);
    fs::write(&input, &text).unwrap();

    let mut session = Session::new(config_in(&dir));
    let report = session.encode_file(&input).unwrap();
    assert_eq!(report.input_bytes, text.len() as u64);
    assert!(session.tree().is_some());

    let payload_len = fs::metadata(dir.path().join("encoded.bin")).unwrap().len();
    assert!(payload_len < text.len() as u64);

    let mut fresh = Session::new(config_in(&dir));
    let decoded = fresh.decode_file(&output).unwrap();
    assert_eq!(decoded.output_bytes, text.len() as u64);
    assert_eq!(fs::read(&output).unwrap(), text);
}

#[test]
fn test_ascii_and_marker_roundtrip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("out.txt");
    fs::write(&input, b"mississippi river").unwrap();

    let config = Config {
        bit_format: BitFormat::Ascii,
        tree_format: TreeFormat::Marker,
        ..config_in(&dir)
    };
    Session::new(config.clone()).encode_file(&input).unwrap();

    let payload = fs::read(&config.payload_path).unwrap();
    assert!(payload[huff::container::HEADER_LEN..]
        .iter()
        .all(|&b| b == b'0' || b == b'1'));

    Session::new(config).decode_file(&output).unwrap();
    assert_eq!(fs::read(&output).unwrap(), b"mississippi river");
}

#[test]
fn test_single_symbol_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.bin");
    let output = dir.path().join("out.bin");
    fs::write(&input, vec![0x41u8; 1000]).unwrap();

    let mut session = Session::new(config_in(&dir));
    let report = session.encode_file(&input).unwrap();
    assert_eq!(report.header.bit_len, 0);
    assert_eq!(report.header.symbol_count, 1000);

    session.decode_file(&output).unwrap();
    assert_eq!(fs::read(&output).unwrap(), vec![0x41u8; 1000]);
}

#[test]
fn test_empty_input_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.txt");
    fs::write(&input, b"").unwrap();

    let config = config_in(&dir);
    let err = Session::new(config.clone()).encode_file(&input).unwrap_err();
    assert!(matches!(err, Error::EmptyInput));
    assert!(!config.tree_path.exists());
    assert!(!config.payload_path.exists());
}

#[test]
fn test_marker_collision_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("hash.txt");
    fs::write(&input, b"#include <stdio.h>").unwrap();

    let config = Config {
        tree_format: TreeFormat::Marker,
        ..config_in(&dir)
    };
    let err = Session::new(config.clone()).encode_file(&input).unwrap_err();
    assert!(matches!(err, Error::MarkerCollision));
    assert!(!config.tree_path.exists());
}

#[test]
fn test_truncated_payload_removes_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("out.txt");
    fs::write(&input, b"abracadabra alakazam").unwrap();

    let config = config_in(&dir);
    Session::new(config.clone()).encode_file(&input).unwrap();

    let mut payload = fs::read(&config.payload_path).unwrap();
    payload.truncate(payload.len() - 2);
    fs::write(&config.payload_path, &payload).unwrap();

    let err = Session::new(config).decode_file(&output).unwrap_err();
    assert!(matches!(err, Error::TruncatedPayload { .. }));
    assert!(!output.exists());
}

#[test]
fn test_truncated_tree_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, b"abracadabra").unwrap();

    let config = config_in(&dir);
    Session::new(config.clone()).encode_file(&input).unwrap();
    let tree = fs::read(&config.tree_path).unwrap();
    fs::write(&config.tree_path, &tree[..tree.len() - 1]).unwrap();

    let err = Session::new(config).load_tree().unwrap_err();
    assert!(matches!(err, Error::TruncatedTree { .. }));
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Session::new(config_in(&dir))
        .encode_file(&dir.path().join("nope"))
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
