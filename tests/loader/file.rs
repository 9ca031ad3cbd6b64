//! Construction from image files on disk.

use memexec::{ImageLimits, LoadedBinary, LoaderConfig, LoaderError};

use crate::common::test_data::*;
use crate::common::test_utils::*;

#[test]
fn test_from_file_loads_content() {
    let file = create_temp_file(ECHO_ARGS_SCRIPT);
    let binary = LoadedBinary::from_file(file.path()).unwrap();
    assert!(binary.is_open());
    assert_eq!(binary.image().as_bytes(), ECHO_ARGS_SCRIPT);
    assert_eq!(
        std::fs::read(binary.pseudo_path().unwrap()).unwrap(),
        ECHO_ARGS_SCRIPT
    );
}

#[test]
fn test_from_file_survives_source_removal() {
    let file = create_temp_file(EXIT_7_SCRIPT);
    let binary = LoadedBinary::from_file(file.path()).unwrap();
    file.close().unwrap();

    let status = binary
        .command(Vec::<String>::new())
        .unwrap()
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(7));
}

#[test]
fn test_from_empty_file() {
    let file = create_temp_file(b"");
    let result = LoadedBinary::from_file(file.path());
    assert!(matches!(result, Err(LoaderError::EmptyImage)));
}

#[test]
fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = LoadedBinary::from_file(dir.path().join("missing.bin"));
    assert!(matches!(result, Err(LoaderError::Io(_))));
}

#[test]
fn test_from_file_over_limit() {
    let file = create_temp_file(&[1u8; 4096]);
    let config = LoaderConfig {
        limits: ImageLimits {
            max_image_size: 1024,
        },
        ..Default::default()
    };
    let result = LoadedBinary::from_file_with_config(file.path(), config);
    assert!(matches!(
        result,
        Err(LoaderError::ImageTooLarge {
            size: 4096,
            limit: 1024
        })
    ));
}
