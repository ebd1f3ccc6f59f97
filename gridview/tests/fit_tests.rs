use gridview::config::{Resample, ViewConfig};
use gridview::fit::fitted_dimensions;
use gridview::{
    EncodingError, GridCanvasView, ImageSource, RgbaBufferSurface, Surface, SurfaceSize,
    decode_image,
};
use image::{Rgba, RgbaImage};

const GREEN: [u8; 4] = [0, 200, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn buffer(w: u32, h: u32) -> RgbaBufferSurface {
    RgbaBufferSurface::new(SurfaceSize::new(w, h))
}

fn nearest_config() -> ViewConfig {
    let mut config = ViewConfig::default();
    config.encoding.resample = Resample::Nearest;
    config
}

fn view(primary: (u32, u32), staging: (u32, u32)) -> GridCanvasView {
    GridCanvasView::new(buffer(primary.0, primary.1), 10, buffer(staging.0, staging.1))
        .expect("valid surfaces")
        .with_config(nearest_config())
}

fn decode_uri(uri: &str) -> RgbaImage {
    decode_image(&ImageSource::from(uri)).expect("output decodes")
}

fn checkerboard(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([10, 20, 30, 255])
        }
    })
}

#[test]
fn background_fit_clamps_width_only() {
    let mut view = view((100, 100), (20, 20))
        .with_background_staging(buffer(50, 50))
        .unwrap();
    let upload = RgbaImage::from_pixel(200, 30, Rgba(GREEN));

    let uri = view
        .resize_and_encode_background_image(&upload, "image/png")
        .unwrap();
    assert!(uri.starts_with("data:image/png;base64,"));

    let out = decode_uri(&uri);
    assert_eq!(out.dimensions(), (50, 50));
    assert_eq!(out.get_pixel(0, 0).0, GREEN);
    assert_eq!(out.get_pixel(49, 29).0, GREEN);
    assert_eq!(out.get_pixel(0, 30).0, CLEAR);
    assert_eq!(out.get_pixel(49, 49).0, CLEAR);
}

#[test]
fn background_fit_defaults_to_the_primary_surface() {
    let mut view = view((100, 100), (20, 20));
    view.clear();
    let upload = RgbaImage::from_pixel(30, 20, Rgba(GREEN));

    let uri = view
        .resize_and_encode_background_image(&upload, "image/png")
        .unwrap();
    let out = decode_uri(&uri);
    assert_eq!(out.dimensions(), (100, 100));
    assert_eq!(out.get_pixel(29, 19).0, GREEN);
    assert_eq!(out.get_pixel(30, 0).0, CLEAR);

    // The visible frame was used as scratch space until the next repaint.
    assert_eq!(view.primary().pixel(50, 50), Some(CLEAR));
    view.clear();
    assert_eq!(view.primary().pixel(50, 50), Some([0, 0, 0, 255]));
}

#[test]
fn image_that_fits_is_copied_unscaled_at_origin() {
    let mut view = view((100, 100), (50, 50));
    let upload = checkerboard(20, 10);

    let out = decode_uri(&view.resize_and_encode_image(&upload, "image/png").unwrap());
    assert_eq!(out.dimensions(), (50, 50));
    for y in 0..10 {
        for x in 0..20 {
            assert_eq!(out.get_pixel(x, y), upload.get_pixel(x, y), "pixel ({x}, {y})");
        }
    }
    assert_eq!(out.get_pixel(20, 0).0, CLEAR);
    assert_eq!(out.get_pixel(0, 10).0, CLEAR);
}

#[test]
fn double_width_is_clamped_independently_of_height() {
    let mut view = view((100, 100), (50, 50));

    let wide = RgbaImage::from_pixel(100, 10, Rgba(GREEN));
    let out = decode_uri(&view.resize_and_encode_image(&wide, "image/png").unwrap());
    assert_eq!(out.get_pixel(49, 9).0, GREEN);
    assert_eq!(out.get_pixel(49, 10).0, CLEAR);

    let tall = RgbaImage::from_pixel(10, 120, Rgba(GREEN));
    let out = decode_uri(&view.resize_and_encode_image(&tall, "image/png").unwrap());
    assert_eq!(out.get_pixel(9, 49).0, GREEN);
    assert_eq!(out.get_pixel(10, 49).0, CLEAR);

    assert_eq!(fitted_dimensions((100, 10), SurfaceSize::new(50, 50)), (50, 10));
}

#[test]
fn staging_is_overwritten_by_each_fit() {
    let mut view = view((100, 100), (50, 50));
    view.resize_and_encode_image(&RgbaImage::from_pixel(50, 50, Rgba(GREEN)), "image/png")
        .unwrap();
    let out = decode_uri(
        &view
            .resize_and_encode_image(&RgbaImage::from_pixel(5, 5, Rgba(GREEN)), "image/png")
            .unwrap(),
    );
    assert_eq!(out.get_pixel(4, 4).0, GREEN);
    assert_eq!(out.get_pixel(5, 5).0, CLEAR);
}

#[test]
fn unsupported_format_fails_without_touching_staging() {
    let mut view = view((100, 100), (50, 50));
    view.resize_and_encode_image(&checkerboard(8, 8), "image/png")
        .unwrap();
    let before = view.staging().frame().to_vec();

    let err = view
        .resize_and_encode_image(&RgbaImage::from_pixel(50, 50, Rgba(GREEN)), "image/x-tga")
        .unwrap_err();
    assert!(matches!(err, EncodingError::UnsupportedFormat(ref f) if f == "image/x-tga"));
    assert_eq!(view.staging().frame(), &before[..]);
}

#[test]
fn jpeg_output_covers_the_whole_staging_surface() {
    let mut view = view((100, 100), (32, 24));
    let uri = view
        .resize_and_encode_image(&RgbaImage::from_pixel(64, 8, Rgba(GREEN)), "image/jpeg")
        .unwrap();
    assert!(uri.starts_with("data:image/jpeg;base64,"));

    let out = decode_uri(&uri);
    assert_eq!(out.dimensions(), (32, 24));
    // Lossy, so only check that the painted band is green-dominant and the rest dark.
    let painted = out.get_pixel(16, 3).0;
    assert!(
        painted[1] > 120 && painted[1] > painted[0] + 60 && painted[1] > painted[2] + 60,
        "{painted:?}"
    );
    let unpainted = out.get_pixel(16, 20).0;
    assert!(unpainted[0] < 40 && unpainted[1] < 40 && unpainted[2] < 40, "{unpainted:?}");
}
