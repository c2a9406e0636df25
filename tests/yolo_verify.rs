//! End-to-end YOLO verification runs through the library API.

mod common;

use std::fs;

use annoverify::color::ColorMode;
use annoverify::dataset::DatasetLayout;
use annoverify::decode::AnnotationFormat;
use annoverify::error::VerifyError;
use annoverify::verify::{verify_dataset, CancelToken, IssueCode, VerifyOptions};
use common::{file_names, write_image, write_text, YoloFixture, BACKGROUND};

fn options(fixture: &YoloFixture) -> VerifyOptions {
    let layout = DatasetLayout::Split {
        annotations_dir: fixture.labels.clone(),
        images_dir: fixture.images.clone(),
    };
    let mut opts = VerifyOptions::new(AnnotationFormat::Center, layout, fixture.output.clone());
    opts.class_file = Some(fixture.classes.clone());
    opts
}

#[test]
fn draws_boxes_at_decoded_pixels() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("street.png"), 640, 480);
    write_text(&fixture.labels.join("street.txt"), "0 0.5 0.5 0.2 0.2\n");

    let mut opts = options(&fixture);
    opts.draw_labels = false;
    opts.thickness = Some(1);
    let report = verify_dataset(&opts, &CancelToken::new()).expect("run");
    assert_eq!(report.boxes_drawn, 1);

    let out = image::open(fixture.output.join("street.png"))
        .expect("open output")
        .to_rgb8();
    // Box (256, 192)-(384, 288): edges painted, interior untouched.
    assert_ne!(*out.get_pixel(256, 240), BACKGROUND);
    assert_ne!(*out.get_pixel(384, 240), BACKGROUND);
    assert_ne!(*out.get_pixel(320, 192), BACKGROUND);
    assert_ne!(*out.get_pixel(320, 288), BACKGROUND);
    assert_eq!(*out.get_pixel(320, 240), BACKGROUND);
    assert_eq!(*out.get_pixel(10, 10), BACKGROUND);
}

#[test]
fn missing_image_counts_zero_and_run_continues() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("b.jpg"), 100, 80);
    write_text(&fixture.labels.join("b.txt"), "1 0.5 0.5 0.5 0.5\n0 0.2 0.2 0.1 0.1\n");

    // "a" is listed but has no image; "b" must still be processed.
    let name_list = temp.path().join("names.txt");
    write_text(&name_list, "a\nb\n");

    let mut opts = options(&fixture);
    opts.name_list = Some(name_list);
    let report = verify_dataset(&opts, &CancelToken::new()).expect("run");

    assert_eq!(report.images_processed, 2);
    assert_eq!(report.images_failed, 1);
    assert_eq!(report.boxes_drawn, 2);
    assert_eq!(report.issues[0].id, "a");
    assert_eq!(report.issues[0].code, IssueCode::ImageNotFound);
    assert_eq!(file_names(&fixture.output), vec!["b.jpg".to_string()]);
}

#[test]
fn malformed_line_fails_only_that_image() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("bad.png"), 32, 32);
    write_image(&fixture.images.join("good.png"), 32, 32);
    write_text(&fixture.labels.join("bad.txt"), "0 0.5 0.5 0.2\n");
    write_text(&fixture.labels.join("good.txt"), "0 0.5 0.5 0.2 0.2\n");

    let report = verify_dataset(&options(&fixture), &CancelToken::new()).expect("run");
    assert_eq!(report.images_failed, 1);
    assert_eq!(report.images_annotated, 1);
    assert_eq!(report.issues[0].code, IssueCode::MalformedAnnotation);
    assert_eq!(file_names(&fixture.output), vec!["good.png".to_string()]);
}

#[test]
fn missing_label_file_is_reported() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("lonely.bmp"), 16, 16);

    let report = verify_dataset(&options(&fixture), &CancelToken::new()).expect("run");
    assert_eq!(report.images_failed, 1);
    assert_eq!(report.issues[0].code, IssueCode::AnnotationNotFound);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("scene.png"), 120, 90);
    write_text(
        &fixture.labels.join("scene.txt"),
        "0 0.5 0.5 0.4 0.4\n1 0.3 0.6 0.2 0.3\n",
    );

    let opts = options(&fixture);
    verify_dataset(&opts, &CancelToken::new()).expect("first run");
    let first = fs::read(fixture.output.join("scene.png")).expect("read first");
    verify_dataset(&opts, &CancelToken::new()).expect("second run");
    let second = fs::read(fixture.output.join("scene.png")).expect("read second");
    assert_eq!(first, second);
}

#[test]
fn seed_changes_colors() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("x.png"), 64, 64);
    write_text(&fixture.labels.join("x.txt"), "0 0.5 0.5 0.5 0.5\n");

    let mut opts = options(&fixture);
    opts.draw_labels = false;
    verify_dataset(&opts, &CancelToken::new()).expect("seed 42");
    let default_seed = image::open(fixture.output.join("x.png")).expect("open").to_rgb8();

    opts.color_mode = ColorMode::Seeded { seed: 7 };
    opts.output_dir = temp.path().join("out7");
    verify_dataset(&opts, &CancelToken::new()).expect("seed 7");
    let other_seed = image::open(temp.path().join("out7/x.png")).expect("open").to_rgb8();

    // Left edge of the box at x = 16.
    assert_ne!(default_seed.get_pixel(16, 32), other_seed.get_pixel(16, 32));
}

#[test]
fn foreign_file_in_labels_aborts_before_output_exists() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("a.png"), 8, 8);
    write_text(&fixture.labels.join("a.txt"), "0 0.5 0.5 0.5 0.5\n");
    write_image(&fixture.labels.join("stray.png"), 8, 8);

    let err = verify_dataset(&options(&fixture), &CancelToken::new()).unwrap_err();
    assert!(matches!(err, VerifyError::UnexpectedFile { .. }));
    assert!(err.is_fatal());
    assert!(!fixture.output.exists());
}

#[test]
fn extreme_coordinates_are_drawn_without_aborting() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("far.png"), 640, 480);
    write_text(
        &fixture.labels.join("far.txt"),
        "0 -1e10 0.5 0.1 0.1\n0 0.5 0.5 1e9 0.1\n1 1e300 -1e300 1e300 1e300\n",
    );
    write_image(&fixture.images.join("next.png"), 64, 64);
    write_text(&fixture.labels.join("next.txt"), "1 0.5 0.5 0.5 0.5\n");

    let mut opts = options(&fixture);
    opts.thickness = Some(u32::MAX);
    let report = verify_dataset(&opts, &CancelToken::new()).expect("run");

    assert_eq!(report.images_annotated, 2);
    assert_eq!(report.images_failed, 0);
    assert_eq!(report.boxes_drawn, 4);
    assert_eq!(
        file_names(&fixture.output),
        vec!["far.png".to_string(), "next.png".to_string()]
    );
}

#[test]
fn far_offscreen_box_leaves_pixels_untouched() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("far.png"), 64, 48);
    write_text(&fixture.labels.join("far.txt"), "0 -1e10 0.5 0.1 0.1\n");

    let report = verify_dataset(&options(&fixture), &CancelToken::new()).expect("run");
    assert_eq!(report.boxes_drawn, 1);

    let out = image::open(fixture.output.join("far.png"))
        .expect("open output")
        .to_rgb8();
    assert!(out.pixels().all(|p| *p == BACKGROUND));
}

#[test]
fn mixed_case_image_extensions_resolve() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_image(&fixture.images.join("a.Png"), 32, 32);
    write_image(&fixture.images.join("b.Jpeg"), 32, 32);
    write_text(&fixture.labels.join("a.txt"), "0 0.5 0.5 0.5 0.5\n");
    write_text(&fixture.labels.join("b.txt"), "1 0.5 0.5 0.5 0.5\n");

    let report = verify_dataset(&options(&fixture), &CancelToken::new()).expect("run");
    assert_eq!(report.images_failed, 0, "issues: {:?}", report.issues);
    assert_eq!(report.boxes_drawn, 2);
    assert_eq!(
        file_names(&fixture.output),
        vec!["a.Png".to_string(), "b.Jpeg".to_string()]
    );
}

#[test]
fn corrupt_image_fails_only_that_image() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(temp.path());
    write_text(&fixture.images.join("a.png"), "definitely not a png");
    write_image(&fixture.images.join("b.png"), 32, 32);
    write_text(&fixture.labels.join("a.txt"), "0 0.5 0.5 0.5 0.5\n");
    write_text(&fixture.labels.join("b.txt"), "0 0.5 0.5 0.5 0.5\n");

    let report = verify_dataset(&options(&fixture), &CancelToken::new()).expect("run");
    assert_eq!(report.images_processed, 2);
    assert_eq!(report.images_failed, 1);
    assert_eq!(report.boxes_drawn, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].id, "a");
    assert_eq!(report.issues[0].code, IssueCode::ImageUnreadable);
    assert_eq!(file_names(&fixture.output), vec!["b.png".to_string()]);
}
