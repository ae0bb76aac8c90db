//! PNG image items using the png crate.

use std::io::Cursor;

use crate::codec::ContentHasher;
use crate::{CodecError, ItemCodec, ItemValue, Limits, NativeType, PixelData};

/// PNG codec for pixel buffers.
///
/// Decoding keeps 16-bit depth and the grey/colour/alpha layout; palettes,
/// transparency chunks and sub-byte depths are expanded. The hash covers
/// layout, size and decompressed samples, so compression level and filter
/// choice never change it.
#[derive(Clone, Debug)]
pub struct PngCodec {
    compression: png::Compression,
    filter: png::Filter,
    limits: Limits,
}

impl PngCodec {
    /// Create a default PNG codec.
    #[must_use]
    pub fn new() -> Self {
        Self {
            compression: png::Compression::default(),
            filter: png::Filter::default(),
            limits: Limits::none(),
        }
    }

    /// Set PNG compression level directly.
    #[must_use]
    pub fn with_compression(mut self, compression: png::Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set PNG row filter type directly.
    #[must_use]
    pub fn with_filter(mut self, filter: png::Filter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    fn pixels<'a>(&self, value: &'a ItemValue) -> Result<&'a PixelData, CodecError> {
        value
            .as_image()
            .ok_or_else(|| CodecError::mismatch(self.name(), NativeType::Image, value.native_type()))
    }
}

impl Default for PngCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemCodec for PngCodec {
    fn name(&self) -> &'static str {
        "png"
    }

    fn native_type(&self) -> NativeType {
        NativeType::Image
    }

    fn encode(&self, value: &ItemValue) -> Result<Vec<u8>, CodecError> {
        let pixels = self.pixels(value)?;
        let color = match pixels.channels() {
            1 => png::ColorType::Grayscale,
            2 => png::ColorType::GrayscaleAlpha,
            3 => png::ColorType::Rgb,
            _ => png::ColorType::Rgba,
        };
        let depth = if pixels.bit_depth() == 16 {
            png::BitDepth::Sixteen
        } else {
            png::BitDepth::Eight
        };
        let samples = pixels.big_endian_bytes();

        let mut output = Vec::new();
        let mut encoder = png::Encoder::new(&mut output, pixels.width(), pixels.height());
        encoder.set_color(color);
        encoder.set_depth(depth);
        encoder.set_compression(self.compression);
        encoder.set_filter(self.filter);

        let mut writer = encoder
            .write_header()
            .map_err(|e| CodecError::from_codec(self.name(), e))?;

        writer
            .write_image_data(&samples)
            .map_err(|e| CodecError::from_codec(self.name(), e))?;

        writer
            .finish()
            .map_err(|e| CodecError::from_codec(self.name(), e))?;

        Ok(output)
    }

    fn decode(&self, data: &[u8]) -> Result<ItemValue, CodecError> {
        self.limits.check_input(data.len())?;

        let mut decoder = png::Decoder::new(Cursor::new(data));
        decoder.set_transformations(png::Transformations::EXPAND);

        let mut reader = decoder
            .read_info()
            .map_err(|e| CodecError::from_codec(self.name(), e))?;

        let info = reader.info();
        let width = info.width;
        let height = info.height;
        self.limits
            .check_dimensions(u64::from(width), u64::from(height))?;

        let buffer_size = reader
            .output_buffer_size()
            .ok_or_else(|| CodecError::InvalidInput("cannot determine PNG output buffer size".into()))?;
        self.limits.check_memory(buffer_size as u64)?;
        let mut raw_pixels = vec![0u8; buffer_size];

        let output_info = reader
            .next_frame(&mut raw_pixels)
            .map_err(|e| CodecError::from_codec(self.name(), e))?;

        raw_pixels.truncate(output_info.buffer_size());

        let (color, depth) = reader.output_color_type();
        let channels = match color {
            png::ColorType::Grayscale => 1,
            png::ColorType::GrayscaleAlpha => 2,
            png::ColorType::Rgb => 3,
            png::ColorType::Rgba => 4,
            png::ColorType::Indexed => {
                return Err(CodecError::InvalidInput("indexed PNG was not expanded".into()));
            }
        };
        let bit_depth = match depth {
            png::BitDepth::Sixteen => 16,
            _ => 8,
        };

        let pixels = PixelData::from_big_endian(channels, bit_depth, width, height, &raw_pixels)?;
        Ok(ItemValue::Image(pixels))
    }

    fn hash(&self, value: &ItemValue) -> Result<String, CodecError> {
        let pixels = self.pixels(value)?;
        let mut hasher = ContentHasher::new();
        hasher
            .field(pixels.layout().as_bytes())
            .update(&pixels.width().to_le_bytes())
            .update(&pixels.height().to_le_bytes())
            .field(&pixels.canonical_bytes());
        Ok(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{Gray, ImgVec, Rgb, Rgba};

    fn gradient(width: usize, height: usize) -> PixelData {
        let pixels = (0..width * height)
            .map(|i| Rgb {
                r: (i % 251) as u8,
                g: (i * 7 % 256) as u8,
                b: (i / width) as u8,
            })
            .collect();
        PixelData::Rgb8(ImgVec::new(pixels, width, height))
    }

    #[test]
    fn encodes_png_signature() {
        let data = PngCodec::new()
            .encode(&ItemValue::Image(gradient(8, 8)))
            .unwrap();
        assert_eq!(
            &data[0..8],
            &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
        );
    }

    #[test]
    fn roundtrip_each_layout() {
        let codec = PngCodec::new();
        let images = [
            gradient(5, 3),
            PixelData::Gray8(ImgVec::new(vec![Gray::new(7u8); 6], 3, 2)),
            PixelData::Gray16(ImgVec::new(vec![Gray::new(0xBEEFu16); 4], 2, 2)),
            PixelData::Rgba8(ImgVec::new(
                vec![
                    Rgba {
                        r: 100,
                        g: 150,
                        b: 200,
                        a: 128,
                    };
                    9
                ],
                3,
                3,
            )),
            PixelData::Rgb16(ImgVec::new(
                vec![
                    Rgb {
                        r: 1u16,
                        g: 300,
                        b: 65535,
                    };
                    2
                ],
                2,
                1,
            )),
        ];
        for image in images {
            let value = ItemValue::Image(image);
            let back = codec.decode(&codec.encode(&value).unwrap()).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn hash_ignores_compression_level() {
        let image = ItemValue::Image(gradient(32, 16));
        let fast = PngCodec::new().with_compression(png::Compression::Fast);
        let high = PngCodec::new().with_compression(png::Compression::High);

        let a = fast.decode(&fast.encode(&image).unwrap()).unwrap();
        let b = high.decode(&high.encode(&image).unwrap()).unwrap();
        assert_eq!(fast.hash(&a).unwrap(), high.hash(&b).unwrap());
        assert_eq!(fast.hash(&a).unwrap(), fast.hash(&image).unwrap());
    }

    #[test]
    fn hash_detects_pixel_change() {
        let codec = PngCodec::new();
        let a = gradient(4, 4);
        let mut b = a.clone();
        if let PixelData::Rgb8(img) = &mut b {
            img.buf_mut()[5].g ^= 1;
        }
        assert_ne!(
            codec.hash(&ItemValue::Image(a)).unwrap(),
            codec.hash(&ItemValue::Image(b)).unwrap()
        );
    }

    #[test]
    fn dimension_limit() {
        let data = PngCodec::new()
            .encode(&ItemValue::Image(gradient(16, 2)))
            .unwrap();
        let codec = PngCodec::new().with_limits(Limits {
            max_width: Some(8),
            ..Limits::none()
        });
        assert!(matches!(codec.decode(&data), Err(CodecError::LimitExceeded(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            PngCodec::new().decode(b"not a png"),
            Err(CodecError::Codec { codec: "png", .. })
        ));
    }
}
