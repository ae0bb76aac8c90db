//! Typed pixel buffers.
//!
//! Uses `imgref::ImgVec` for 2D pixel data with typed pixels from the `rgb` crate.

pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::{Gray, Rgb, Rgba};

use crate::CodecError;

/// Grey value with alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GrayAlpha<T> {
    pub v: T,
    pub a: T,
}

impl<T> GrayAlpha<T> {
    pub const fn new(v: T, a: T) -> Self {
        Self { v, a }
    }
}

/// Image pixels in one of the supported channel layouts and bit depths.
#[derive(Clone, Debug)]
pub enum PixelData {
    Gray8(ImgVec<Gray<u8>>),
    Gray16(ImgVec<Gray<u16>>),
    GrayAlpha8(ImgVec<GrayAlpha<u8>>),
    GrayAlpha16(ImgVec<GrayAlpha<u16>>),
    Rgb8(ImgVec<Rgb<u8>>),
    Rgb16(ImgVec<Rgb<u16>>),
    Rgba8(ImgVec<Rgba<u8>>),
    Rgba16(ImgVec<Rgba<u16>>),
}

impl PixelData {
    pub fn width(&self) -> u32 {
        let w = match self {
            PixelData::Gray8(img) => img.width(),
            PixelData::Gray16(img) => img.width(),
            PixelData::GrayAlpha8(img) => img.width(),
            PixelData::GrayAlpha16(img) => img.width(),
            PixelData::Rgb8(img) => img.width(),
            PixelData::Rgb16(img) => img.width(),
            PixelData::Rgba8(img) => img.width(),
            PixelData::Rgba16(img) => img.width(),
        };
        w as u32
    }

    pub fn height(&self) -> u32 {
        let h = match self {
            PixelData::Gray8(img) => img.height(),
            PixelData::Gray16(img) => img.height(),
            PixelData::GrayAlpha8(img) => img.height(),
            PixelData::GrayAlpha16(img) => img.height(),
            PixelData::Rgb8(img) => img.height(),
            PixelData::Rgb16(img) => img.height(),
            PixelData::Rgba8(img) => img.height(),
            PixelData::Rgba16(img) => img.height(),
        };
        h as u32
    }

    /// Samples per pixel.
    pub fn channels(&self) -> u8 {
        match self {
            PixelData::Gray8(_) | PixelData::Gray16(_) => 1,
            PixelData::GrayAlpha8(_) | PixelData::GrayAlpha16(_) => 2,
            PixelData::Rgb8(_) | PixelData::Rgb16(_) => 3,
            PixelData::Rgba8(_) | PixelData::Rgba16(_) => 4,
        }
    }

    /// Bits per sample, 8 or 16.
    pub fn bit_depth(&self) -> u8 {
        match self {
            PixelData::Gray8(_)
            | PixelData::GrayAlpha8(_)
            | PixelData::Rgb8(_)
            | PixelData::Rgba8(_) => 8,
            _ => 16,
        }
    }

    /// Short layout name, e.g. `rgba16`.
    pub fn layout(&self) -> &'static str {
        match self {
            PixelData::Gray8(_) => "gray8",
            PixelData::Gray16(_) => "gray16",
            PixelData::GrayAlpha8(_) => "grayalpha8",
            PixelData::GrayAlpha16(_) => "grayalpha16",
            PixelData::Rgb8(_) => "rgb8",
            PixelData::Rgb16(_) => "rgb16",
            PixelData::Rgba8(_) => "rgba8",
            PixelData::Rgba16(_) => "rgba16",
        }
    }

    /// Row-major samples with stride padding removed, 16-bit samples little-endian.
    ///
    /// Two buffers with the same layout, size and `canonical_bytes` hold the
    /// same image.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.sample_bytes(u16::to_le_bytes)
    }

    /// Same as [`canonical_bytes`](Self::canonical_bytes) with big-endian
    /// 16-bit samples, as PNG stores them.
    #[cfg(feature = "png")]
    pub(crate) fn big_endian_bytes(&self) -> Vec<u8> {
        self.sample_bytes(u16::to_be_bytes)
    }

    fn sample_bytes(&self, wide: fn(u16) -> [u8; 2]) -> Vec<u8> {
        let len = self.width() as usize
            * self.height() as usize
            * self.channels() as usize
            * (self.bit_depth() as usize / 8);
        let mut out = Vec::with_capacity(len);
        let push16 = |s: u16, out: &mut Vec<u8>| out.extend_from_slice(&wide(s));
        match self {
            PixelData::Gray8(img) => {
                for row in img.rows() {
                    out.extend(row.iter().map(|p| p.value()));
                }
            }
            PixelData::Gray16(img) => {
                for row in img.rows() {
                    row.iter().for_each(|p| push16(p.value(), &mut out));
                }
            }
            PixelData::GrayAlpha8(img) => {
                for row in img.rows() {
                    row.iter().for_each(|p| out.extend_from_slice(&[p.v, p.a]));
                }
            }
            PixelData::GrayAlpha16(img) => {
                for row in img.rows() {
                    for p in row {
                        push16(p.v, &mut out);
                        push16(p.a, &mut out);
                    }
                }
            }
            PixelData::Rgb8(img) => {
                for row in img.rows() {
                    row.iter().for_each(|p| out.extend_from_slice(&[p.r, p.g, p.b]));
                }
            }
            PixelData::Rgb16(img) => {
                for row in img.rows() {
                    for p in row {
                        [p.r, p.g, p.b].into_iter().for_each(|s| push16(s, &mut out));
                    }
                }
            }
            PixelData::Rgba8(img) => {
                for row in img.rows() {
                    row.iter()
                        .for_each(|p| out.extend_from_slice(&[p.r, p.g, p.b, p.a]));
                }
            }
            PixelData::Rgba16(img) => {
                for row in img.rows() {
                    for p in row {
                        [p.r, p.g, p.b, p.a]
                            .into_iter()
                            .for_each(|s| push16(s, &mut out));
                    }
                }
            }
        }
        out
    }

    /// Build pixels from packed big-endian samples.
    #[cfg(feature = "png")]
    pub(crate) fn from_big_endian(
        channels: u8,
        bit_depth: u8,
        width: u32,
        height: u32,
        samples: &[u8],
    ) -> Result<Self, CodecError> {
        let w = width as usize;
        let h = height as usize;
        let bytes_per_sample = match bit_depth {
            8 => 1,
            16 => 2,
            other => {
                return Err(CodecError::InvalidInput(format!(
                    "unsupported bit depth {other}"
                )));
            }
        };
        let expected = w * h * channels as usize * bytes_per_sample;
        if samples.len() != expected {
            return Err(CodecError::InvalidInput(format!(
                "expected {expected} sample bytes for {width}x{height}, got {}",
                samples.len()
            )));
        }

        let wide: Vec<u16> = if bit_depth == 16 {
            samples
                .chunks_exact(2)
                .map(|s| u16::from_be_bytes([s[0], s[1]]))
                .collect()
        } else {
            Vec::new()
        };

        let pixels = match (channels, bit_depth) {
            (1, 8) => PixelData::Gray8(ImgVec::new(
                samples.iter().map(|&g| Gray::new(g)).collect(),
                w,
                h,
            )),
            (1, 16) => PixelData::Gray16(ImgVec::new(wide.iter().map(|&g| Gray::new(g)).collect(), w, h)),
            (2, 8) => PixelData::GrayAlpha8(ImgVec::new(
                samples.chunks_exact(2).map(|s| GrayAlpha::new(s[0], s[1])).collect(),
                w,
                h,
            )),
            (2, 16) => PixelData::GrayAlpha16(ImgVec::new(
                wide.chunks_exact(2).map(|s| GrayAlpha::new(s[0], s[1])).collect(),
                w,
                h,
            )),
            (3, 8) => PixelData::Rgb8(ImgVec::new(
                samples
                    .chunks_exact(3)
                    .map(|s| Rgb { r: s[0], g: s[1], b: s[2] })
                    .collect(),
                w,
                h,
            )),
            (3, 16) => PixelData::Rgb16(ImgVec::new(
                wide.chunks_exact(3)
                    .map(|s| Rgb { r: s[0], g: s[1], b: s[2] })
                    .collect(),
                w,
                h,
            )),
            (4, 8) => PixelData::Rgba8(ImgVec::new(
                samples
                    .chunks_exact(4)
                    .map(|s| Rgba { r: s[0], g: s[1], b: s[2], a: s[3] })
                    .collect(),
                w,
                h,
            )),
            (4, 16) => PixelData::Rgba16(ImgVec::new(
                wide.chunks_exact(4)
                    .map(|s| Rgba { r: s[0], g: s[1], b: s[2], a: s[3] })
                    .collect(),
                w,
                h,
            )),
            (other, _) => {
                return Err(CodecError::InvalidInput(format!(
                    "unsupported channel count {other}"
                )));
            }
        };
        Ok(pixels)
    }
}

impl PartialEq for PixelData {
    fn eq(&self, other: &Self) -> bool {
        self.layout() == other.layout()
            && self.width() == other.width()
            && self.height() == other.height()
            && self.canonical_bytes() == other.canonical_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_bytes_are_little_endian() {
        let img = ImgVec::new(vec![Gray::new(0x0102u16), Gray::new(0xA0B0)], 2, 1);
        let pixels = PixelData::Gray16(img);
        assert_eq!(pixels.canonical_bytes(), vec![0x02, 0x01, 0xB0, 0xA0]);
        assert_eq!(pixels.big_endian_bytes(), vec![0x01, 0x02, 0xA0, 0xB0]);
    }

    #[test]
    fn canonical_bytes_skip_stride_padding() {
        let buf = vec![
            Rgb { r: 1, g: 2, b: 3 },
            Rgb { r: 4, g: 5, b: 6 },
            Rgb { r: 0, g: 0, b: 0 },
            Rgb { r: 7, g: 8, b: 9 },
            Rgb { r: 10, g: 11, b: 12 },
            Rgb { r: 0, g: 0, b: 0 },
        ];
        let padded = ImgVec::new_stride(buf, 2, 2, 3);
        let packed = ImgVec::new(
            vec![
                Rgb { r: 1, g: 2, b: 3 },
                Rgb { r: 4, g: 5, b: 6 },
                Rgb { r: 7, g: 8, b: 9 },
                Rgb { r: 10, g: 11, b: 12 },
            ],
            2,
            2,
        );
        assert_eq!(PixelData::Rgb8(padded), PixelData::Rgb8(packed));
    }

    #[cfg(feature = "png")]
    #[test]
    fn from_big_endian_builds_layout() {
        let pixels = PixelData::from_big_endian(4, 16, 1, 1, &[0, 1, 0, 2, 0, 3, 1, 0]).unwrap();
        assert_eq!(pixels.layout(), "rgba16");
        assert_eq!(pixels.channels(), 4);
        assert_eq!(pixels.bit_depth(), 16);
        assert_eq!(pixels.big_endian_bytes(), vec![0, 1, 0, 2, 0, 3, 1, 0]);
    }

    #[cfg(feature = "png")]
    #[test]
    fn from_big_endian_checks_length() {
        assert!(PixelData::from_big_endian(3, 8, 2, 2, &[0; 11]).is_err());
        assert!(PixelData::from_big_endian(5, 8, 1, 1, &[0; 5]).is_err());
    }

    #[test]
    fn layouts_differ_even_with_equal_bytes() {
        let gray = PixelData::Gray8(ImgVec::new(vec![Gray::new(1u8), Gray::new(2)], 2, 1));
        let ga = PixelData::GrayAlpha8(ImgVec::new(vec![GrayAlpha::new(1u8, 2)], 1, 1));
        assert_eq!(gray.canonical_bytes(), ga.canonical_bytes());
        assert_ne!(gray, ga);
    }
}
