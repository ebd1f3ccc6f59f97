//! Encoding RGBA frames into data URIs.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, RgbaImage};

use crate::error::EncodingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Bmp,
}

impl OutputFormat {
    /// Resolves a MIME-style identifier (`"image/png"`, `"image/jpeg"`, ...).
    pub fn from_mime(identifier: &str) -> Result<Self, EncodingError> {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(OutputFormat::Png),
            "image/jpeg" | "image/jpg" => Ok(OutputFormat::Jpeg),
            "image/bmp" => Ok(OutputFormat::Bmp),
            _ => Err(EncodingError::UnsupportedFormat(identifier.to_string())),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Bmp => "image/bmp",
        }
    }
}

fn encode_err(format: OutputFormat) -> impl FnOnce(image::ImageError) -> EncodingError {
    move |e| EncodingError::Encode {
        format: format.mime(),
        reason: e.to_string(),
    }
}

pub fn encode_bytes(
    image: &RgbaImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, EncodingError> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            PngEncoder::new(&mut bytes)
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ColorType::Rgba8,
                )
                .map_err(encode_err(format))?;
        }
        OutputFormat::Jpeg => {
            // No alpha channel in JPEG: transparent pixels flatten to their (black) color.
            let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality);
            encoder
                .encode(
                    rgb_image.as_raw(),
                    rgb_image.width(),
                    rgb_image.height(),
                    ColorType::Rgb8,
                )
                .map_err(encode_err(format))?;
        }
        OutputFormat::Bmp => {
            let mut encoder = BmpEncoder::new(&mut bytes);
            encoder
                .encode(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ColorType::Rgba8,
                )
                .map_err(encode_err(format))?;
        }
    }
    Ok(bytes)
}

pub fn encode_data_uri(
    image: &RgbaImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<String, EncodingError> {
    let bytes = encode_bytes(image, format, jpeg_quality)?;
    Ok(format!(
        "data:{};base64,{}",
        format.mime(),
        STANDARD.encode(bytes)
    ))
}
