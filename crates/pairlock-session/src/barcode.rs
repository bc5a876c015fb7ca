//! QR code rendering for pairing codes and links.
//!
//! Stateless and unrelated to the handshake: text in, PNG bytes out. No key
//! material should ever be passed through here.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode, types::QrError};

use crate::ServiceError;

/// Configuration for barcode rendering.
#[derive(Debug, Clone)]
pub struct BarcodeConfig {
    /// Error correction level (default: Low, maximizes capacity)
    pub ec_level: EcLevel,
    /// Module size in pixels (default: 8)
    pub module_size: u32,
    /// Whether to surround the code with a quiet zone (default: true)
    pub quiet_zone: bool,
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self { ec_level: EcLevel::L, module_size: 8, quiet_zone: true }
    }
}

/// Render `text` as a grayscale QR code PNG.
///
/// # Errors
///
/// - `Barcode`: text does not fit in a QR code at the configured level
/// - `Render`: PNG encoding failed
pub fn encode_png(text: &str, config: &BarcodeConfig) -> Result<Vec<u8>, ServiceError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), config.ec_level)
        .map_err(|e| match e {
            QrError::DataTooLong => {
                ServiceError::Barcode(format!("{} bytes do not fit in a QR code", text.len()))
            },
            other => ServiceError::Barcode(other.to_string()),
        })?;

    let image = code
        .render::<Luma<u8>>()
        .quiet_zone(config.quiet_zone)
        .module_dimensions(config.module_size, config.module_size)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ServiceError::Render(e.to_string()))?;

    Ok(png)
}
