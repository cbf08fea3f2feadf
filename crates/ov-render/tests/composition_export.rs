//! Integration tests: session → composition → pixels (ov-render).
//!
//! Glyph checks need a system font; they return early on machines
//! without one, while the font-independent checks always run.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use ov_core::model::{Color, ImageSource, LabelDefaults};
use ov_core::{Point, SessionState, Surface};
use ov_render::font::{default_font_paths, load_first_font};
use ov_render::{
    Composition, CompositionExporter, ExportConfig, ExportError, FsImageLoader, MemoryImageLoader,
};
use std::io::Cursor;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn png(img: RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn with_system_font() -> Option<CompositionExporter<FsImageLoader>> {
    let font = load_first_font(&default_font_paths())?;
    Some(CompositionExporter::with_font(
        FsImageLoader::default(),
        ExportConfig::default(),
        Some(font),
    ))
}

#[test]
fn background_is_cover_fitted_into_surface() {
    init_logging();
    // Left half blue, right half green, twice as wide as tall
    let mut img = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 255, 255]));
    for x in 100..200 {
        for y in 0..100 {
            img.put_pixel(x, y, Rgba([0, 255, 0, 255]));
        }
    }
    let mut loader = MemoryImageLoader::new();
    loader.insert("blob:split", png(img));

    let exporter = CompositionExporter::with_font(loader, ExportConfig::default(), None);
    let mut session = SessionState::new();
    session.set_surface(Surface::new(100.0, 100.0));
    session.set_image_source(ImageSource::Handle("blob:split".into()));

    let out = exporter.render(&Composition::capture(&session)).unwrap();
    assert_eq!(out.dimensions(), (100, 100));
    // Cropped to the middle: both halves visible, no letterbox rows
    assert_eq!(out.get_pixel(5, 50).0, [0, 0, 255, 255]);
    assert_eq!(out.get_pixel(95, 50).0, [0, 255, 0, 255]);
    assert_eq!(out.get_pixel(5, 0).0, [0, 0, 255, 255]);
}

#[test]
fn label_pixels_land_at_image_local_position() {
    init_logging();
    let Some(exporter) = with_system_font() else {
        return;
    };
    let mut session = SessionState::new();
    let defaults = LabelDefaults::default()
        .with_content("WWWW")
        .with_color("red")
        .unwrap()
        .without_shadow();
    session.labels_mut().add(Point::new(120.0, 80.0), &defaults);

    let out = exporter.render(&Composition::capture(&session)).unwrap();
    let is_red = |p: &Rgba<u8>| p.0[0] > 200 && p.0[1] < 80 && p.0[2] < 80;

    let inside = (120..200).flat_map(|x| (80..116).map(move |y| (x, y)));
    assert!(inside.into_iter().any(|(x, y)| is_red(out.get_pixel(x, y))));

    // Nothing red above or left of the label box (one pixel of slack for
    // side bearings)
    assert!((0..118).all(|x| (0..500).all(|y| !is_red(out.get_pixel(x, y)))));
    assert!((0..500).all(|x| (0..80).all(|y| !is_red(out.get_pixel(x, y)))));
}

#[test]
fn shadow_darkens_below_text() {
    init_logging();
    let Some(exporter) = with_system_font() else {
        return;
    };
    let render = |shadow: bool| {
        let mut session = SessionState::new();
        let mut defaults = LabelDefaults::default().with_content("Shadow");
        if !shadow {
            defaults = defaults.without_shadow();
        }
        session.labels_mut().add(Point::new(50.0, 50.0), &defaults);
        exporter.render(&Composition::capture(&session)).unwrap()
    };
    let luminance = |img: &RgbaImage| -> u64 { img.pixels().map(|p| p.0[0] as u64).sum() };

    assert!(luminance(&render(true)) < luminance(&render(false)));
}

#[test]
fn later_labels_paint_over_earlier_ones() {
    init_logging();
    let Some(exporter) = with_system_font() else {
        return;
    };
    let mut session = SessionState::new();
    let bottom = LabelDefaults::default()
        .with_content("WWW")
        .with_color("#0000FF")
        .unwrap()
        .without_shadow();
    let top = bottom.clone().with_color("lime").unwrap();
    session.labels_mut().add(Point::new(10.0, 10.0), &bottom);
    session.labels_mut().add(Point::new(10.0, 10.0), &top);

    let out = exporter.render(&Composition::capture(&session)).unwrap();
    let blue = out.pixels().filter(|p| p.0[2] > 200 && p.0[1] < 80).count();
    let green = out.pixels().filter(|p| p.0[1] > 200 && p.0[2] < 80).count();
    assert!(green > 0);
    assert!(green > blue);
}

#[test]
fn end_to_end_export_never_panics() {
    init_logging();
    let exporter = CompositionExporter::new(FsImageLoader::default(), ExportConfig::default());
    let session = SessionState::with_welcome_label();
    match exporter.export_session(&session) {
        Ok(bytes) => {
            assert!(!bytes.is_empty());
            let img = image::load_from_memory(&bytes).unwrap();
            assert_eq!((img.width(), img.height()), (500, 500));
        }
        Err(ExportError::FontUnavailable { labels }) => assert_eq!(labels, 1),
        Err(other) => panic!("unexpected export failure: {other}"),
    }
}

#[test]
fn placeholder_color_is_configurable() {
    let mut loader = FsImageLoader::default();
    loader.placeholder_color = Color::BLACK;
    let exporter = CompositionExporter::with_font(loader, ExportConfig::default(), None);
    let out = exporter
        .render(&Composition::capture(&SessionState::new()))
        .unwrap();
    assert_eq!(out.get_pixel(250, 250).0, [0, 0, 0, 255]);
}
