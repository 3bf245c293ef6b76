//! QR codes for shared recipe links.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("payload cannot be encoded as a QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("failed to write QR image: {0}")]
    Image(#[from] image::ImageError),
}

/// Module grid of an encoded QR code, for callers that paint it themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    pub fn encode(payload: &str) -> Result<Self, QrError> {
        let code = QrCode::new(payload.as_bytes())?;
        let width = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();
        Ok(Self { width, modules })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Out-of-range coordinates read as light, like the quiet zone.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.width {
            return false;
        }
        self.modules[y * self.width + x]
    }
}

/// Encodes `payload` as a PNG at least `min_size` pixels wide.
pub fn qr_png(payload: &str, min_size: u32) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(payload.as_bytes())?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(min_size, min_size)
        .build();

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = "http://127.0.0.1:8443/objects/recipes/recipe-1.pdf";

    #[test]
    fn matrix_has_finder_patterns_in_the_corners() {
        let matrix = QrMatrix::encode(LINK).expect("encode");
        let w = matrix.width();
        assert!(w >= 21);
        assert!(matrix.is_dark(0, 0));
        assert!(matrix.is_dark(w - 1, 0));
        assert!(matrix.is_dark(0, w - 1));
        assert!(!matrix.is_dark(w, 0));
    }

    #[test]
    fn png_output_has_png_signature() {
        let bytes = qr_png(LINK, 200).expect("png");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let payload = "x".repeat(8000);
        assert!(matches!(
            QrMatrix::encode(&payload),
            Err(QrError::Encode(_))
        ));
    }
}
