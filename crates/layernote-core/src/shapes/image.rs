//! Image object for embedded raster images.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// An image object placed on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    /// Original image width in pixels.
    pub source_width: u32,
    /// Original image height in pixels.
    pub source_height: u32,
    /// Uniform display scale applied to the source dimensions.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Image format.
    pub format: ImageFormat,
    /// Image data as a base64-encoded string for JSON transport.
    pub data_base64: String,
    /// Style properties (stroke used for an optional border).
    pub style: ShapeStyle,
}

fn default_scale() -> f64 {
    1.0
}

impl Image {
    /// Largest rendered dimension allowed for a freshly inserted image.
    pub const MAX_INSERT_DIMENSION: f64 = 400.0;

    /// Create a new image object from raw image data at its natural size.
    pub fn new(
        position: Point,
        data: &[u8],
        source_width: u32,
        source_height: u32,
        format: ImageFormat,
    ) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};

        Self {
            id: Uuid::new_v4(),
            position,
            source_width,
            source_height,
            scale: 1.0,
            format,
            data_base64: STANDARD.encode(data),
            style: ShapeStyle::default(),
        }
    }

    /// Scale the image down to fit within `max` units in both dimensions,
    /// preserving aspect ratio. Never upscales.
    pub fn fit_within(mut self, max: f64) -> Self {
        let w = f64::from(self.source_width.max(1));
        let h = f64::from(self.source_height.max(1));
        self.scale = (max / w).min(max / h).min(1.0);
        self
    }

    /// Rendered width in page units.
    pub fn width(&self) -> f64 {
        f64::from(self.source_width) * self.scale
    }

    /// Rendered height in page units.
    pub fn height(&self) -> f64 {
        f64::from(self.source_height) * self.scale
    }

    /// Get the raw image data (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        STANDARD.decode(&self.data_base64).ok()
    }

    /// Get the bounding rectangle.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width(),
            self.position.y + self.height(),
        )
    }
}

impl ShapeTrait for Image {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.as_rect().inflate(tolerance, tolerance);
        rect.contains(point)
    }

    fn to_path(&self) -> BezPath {
        // Bounding box as path (for selection rendering)
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        let coeffs = affine.as_coeffs();
        // The display scale stays uniform
        let factor = (coeffs[0].abs() + coeffs[3].abs()) / 2.0;
        self.scale *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection_magic_bytes() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ImageFormat::from_magic_bytes(&png_header), Some(ImageFormat::Png));

        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(ImageFormat::from_magic_bytes(&jpeg_header), Some(ImageFormat::Jpeg));

        assert_eq!(ImageFormat::from_magic_bytes(b"not an image"), None);
    }

    #[test]
    fn test_format_detection_extension() {
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("webp"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_fit_within_downscales() {
        let data = vec![0u8; 10];
        let img = Image::new(Point::ZERO, &data, 1000, 500, ImageFormat::Png)
            .fit_within(Image::MAX_INSERT_DIMENSION);

        // 1000x500 (2:1) into a 400 bound: scale 0.4 -> 400x200
        assert!((img.scale - 0.4).abs() < 1e-9);
        assert!((img.width() - 400.0).abs() < 1e-9);
        assert!((img.height() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_within_never_upscales() {
        let data = vec![0u8; 10];
        let img = Image::new(Point::ZERO, &data, 200, 100, ImageFormat::Jpeg)
            .fit_within(Image::MAX_INSERT_DIMENSION);

        assert!((img.scale - 1.0).abs() < f64::EPSILON);
        assert!((img.width() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let data = vec![0u8; 10];
        let img = Image::new(Point::new(10.0, 20.0), &data, 100, 50, ImageFormat::Png);
        let bounds = img.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_data_round_trip() {
        let data = vec![1u8, 2, 3, 4, 5];
        let img = Image::new(Point::ZERO, &data, 1, 1, ImageFormat::Png);
        assert_eq!(img.data(), Some(data));
    }
}
