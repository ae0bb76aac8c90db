//! Resource limits applied while decoding items.

use crate::CodecError;

/// Resource limits for decode operations.
///
/// Used to prevent DoS attacks and resource exhaustion from untrusted
/// containers. All limits are optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u64>,
    /// Maximum image height in pixels.
    pub max_height: Option<u64>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum decoded allocation in bytes.
    pub max_memory_bytes: Option<u64>,
    /// Maximum size of an encoded item in bytes.
    pub max_input_bytes: Option<u64>,
}

impl Limits {
    /// Create a new Limits with no restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if dimensions are within limits.
    pub fn check_dimensions(&self, width: u64, height: u64) -> Result<(), CodecError> {
        if let Some(max_width) = self.max_width {
            if width > max_width {
                return Err(exceeded("width", width, max_width));
            }
        }

        if let Some(max_height) = self.max_height {
            if height > max_height {
                return Err(exceeded("height", height, max_height));
            }
        }

        if let Some(max_pixels) = self.max_pixels {
            let pixels = width.saturating_mul(height);
            if pixels > max_pixels {
                return Err(exceeded("pixel count", pixels, max_pixels));
            }
        }

        Ok(())
    }

    /// Check if a decoded allocation is within limits.
    pub fn check_memory(&self, bytes: u64) -> Result<(), CodecError> {
        match self.max_memory_bytes {
            Some(max) if bytes > max => Err(exceeded("memory allocation", bytes, max)),
            _ => Ok(()),
        }
    }

    /// Check if an encoded item is within limits.
    pub fn check_input(&self, bytes: usize) -> Result<(), CodecError> {
        let bytes = bytes as u64;
        match self.max_input_bytes {
            Some(max) if bytes > max => Err(exceeded("input size", bytes, max)),
            _ => Ok(()),
        }
    }
}

fn exceeded(what: &str, value: u64, max: u64) -> CodecError {
    CodecError::LimitExceeded(format!("{what} {value} exceeds limit {max}"))
}
