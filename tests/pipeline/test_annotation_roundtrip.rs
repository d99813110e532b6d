// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end pipeline tests with in-memory collaborators
//!
//! The stored artifact is decoded back and checked pixel by pixel, so these
//! tests pin down both the JSON detections and what was drawn.

use billboard_ml_service::pipeline::{PipelineError, UploadedImage};
use billboard_ml_service::vision::{BoundingBox, Detection};
use std::sync::Arc;

use crate::common::{
    decode_png, pipeline, png_bytes, solid_image, FixedDetector, RecordingStorage,
};

const GRAY: [u8; 3] = [128, 128, 128];
const GREEN: [u8; 3] = [0, 255, 0];
const RED: [u8; 3] = [255, 0, 0];

#[tokio::test]
async fn test_single_detection_is_drawn_and_reported() {
    let work_dir = tempfile::tempdir().unwrap();
    let detector = Arc::new(FixedDetector::new(vec![Detection::new(
        0,
        0.91,
        BoundingBox::new(10.0, 10.0, 50.0, 50.0),
    )]));
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = pipeline(detector.clone(), storage.clone(), work_dir.path());

    let input = solid_image(100, 100, GRAY);
    let outcome = pipeline
        .run(UploadedImage::new("board.png", png_bytes(&input)))
        .await
        .unwrap();

    assert_eq!(outcome.detections.len(), 1);
    assert_eq!(outcome.detections[0].class_id, 0);
    assert_eq!(outcome.detections[0].confidence, 0.91);
    assert_eq!(outcome.detections[0].bbox.as_xyxy(), [10.0, 10.0, 50.0, 50.0]);
    assert_eq!(outcome.annotated_image_url, "https://storage.test/annotated_board.png");

    let uploads = storage.uploads();
    assert_eq!(uploads.len(), 1);
    let annotated = decode_png(&uploads[0].bytes);
    assert_eq!(annotated.dimensions(), (100, 100));

    // Box edges in the class 0 color, one pixel either side of the edge
    for y in [20, 30, 45] {
        assert_eq!(annotated.get_pixel(9, y).0, GREEN);
        assert_eq!(annotated.get_pixel(10, y).0, GREEN);
        assert_eq!(annotated.get_pixel(11, y).0, GREEN);
        assert_eq!(annotated.get_pixel(50, y).0, GREEN);
    }
    assert_eq!(annotated.get_pixel(30, 50).0, GREEN);
    assert_eq!(annotated.get_pixel(30, 51).0, GREEN);

    // Interior and far corner untouched
    assert_eq!(annotated.get_pixel(30, 30).0, GRAY);
    assert_eq!(annotated.get_pixel(90, 90).0, GRAY);
    assert_eq!(annotated.get_pixel(8, 30).0, GRAY);

    // Label background sits above the box and contains white text
    let has_text = (0..10u32)
        .flat_map(|y| (10..100u32).map(move |x| (x, y)))
        .any(|(x, y)| annotated.get_pixel(x, y).0 == [255, 255, 255]);
    assert!(has_text, "label text should be drawn above the box");
}

#[tokio::test]
async fn test_zero_detections_upload_is_pixel_identical() {
    let work_dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = pipeline(
        Arc::new(FixedDetector::new(vec![])),
        storage.clone(),
        work_dir.path(),
    );

    let mut input = solid_image(64, 48, GRAY);
    input.put_pixel(3, 7, image::Rgb(RED));
    let outcome = pipeline
        .run(UploadedImage::new("plain.png", png_bytes(&input)))
        .await
        .unwrap();

    assert!(outcome.detections.is_empty());
    let uploads = storage.uploads();
    assert_eq!(decode_png(&uploads[0].bytes), input);
}

#[tokio::test]
async fn test_detections_returned_in_detector_order() {
    let work_dir = tempfile::tempdir().unwrap();
    let detections = vec![
        Detection::new(1, 0.4, BoundingBox::new(60.0, 60.0, 90.0, 90.0)),
        Detection::new(0, 0.9, BoundingBox::new(5.0, 20.0, 30.0, 40.0)),
    ];
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = pipeline(
        Arc::new(FixedDetector::new(detections.clone())),
        storage.clone(),
        work_dir.path(),
    );

    let outcome = pipeline
        .run(UploadedImage::new("two.png", png_bytes(&solid_image(100, 100, GRAY))))
        .await
        .unwrap();

    assert_eq!(outcome.detections, detections);

    // Class 1 is drawn in red
    let annotated = decode_png(&storage.uploads()[0].bytes);
    assert_eq!(annotated.get_pixel(60, 75).0, RED);
    assert_eq!(annotated.get_pixel(5, 30).0, GREEN);
}

#[tokio::test]
async fn test_gif_upload_stored_as_png() {
    let work_dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = pipeline(
        Arc::new(FixedDetector::new(vec![])),
        storage.clone(),
        work_dir.path(),
    );

    let input = image::DynamicImage::ImageRgb8(solid_image(8, 8, GRAY));
    let mut gif = std::io::Cursor::new(Vec::new());
    input.write_to(&mut gif, image::ImageFormat::Gif).unwrap();

    let outcome = pipeline
        .run(UploadedImage::new("anim.gif", gif.into_inner()))
        .await
        .unwrap();

    let bytes = &storage.uploads()[0].bytes;
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert!(outcome.annotated_image_url.ends_with("/annotated_anim.png"));
}

#[tokio::test]
async fn test_undecodable_payload_is_an_error() {
    let work_dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(RecordingStorage::default());
    let pipeline = pipeline(
        Arc::new(FixedDetector::new(vec![])),
        storage.clone(),
        work_dir.path(),
    );

    let result = pipeline
        .run(UploadedImage::new("notes.png", b"plain text, not pixels".to_vec()))
        .await;

    assert!(matches!(result, Err(PipelineError::Decode(_))));
    assert!(storage.uploads().is_empty());
}
