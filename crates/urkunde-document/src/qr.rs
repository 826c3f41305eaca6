// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR codes — encode a document's verification URL as a PNG image.

use std::io::Cursor;

use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use tracing::{debug, instrument};
use urkunde_core::error::{GenerationError, Result};

/// Renders verification URLs as PNG QR codes.
#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    /// Minimum edge length of the output image in pixels.
    min_size: u32,
    ec_level: EcLevel,
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self {
            min_size: 240,
            ec_level: EcLevel::M,
        }
    }
}

impl QrEncoder {
    pub fn new(min_size: u32) -> Self {
        Self {
            min_size,
            ..Self::default()
        }
    }

    /// Encode `data` and return PNG bytes.
    #[instrument(skip_all, fields(data_len = data.len()))]
    pub fn encode_png(&self, data: &str) -> Result<Vec<u8>> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), self.ec_level)
            .map_err(|err| GenerationError::QrGenerationFailure(err.to_string()))?;

        let image = code
            .render::<Luma<u8>>()
            .min_dimensions(self.min_size, self.min_size)
            .quiet_zone(true)
            .build();

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|err| GenerationError::QrGenerationFailure(err.to_string()))?;

        debug!(
            width = image.width(),
            modules = code.width(),
            bytes = png.len(),
            "QR code encoded"
        );
        Ok(png)
    }
}
