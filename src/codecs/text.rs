//! Encoded text items.

use core::fmt;

use crate::codec::sha256_hex;
use crate::{CodecError, ItemCodec, ItemValue, Limits, NativeType};

/// Byte encoding of text items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Charset {
    #[default]
    Utf8,
    /// ISO-8859-1.
    Latin1,
    Ascii,
}

impl Charset {
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Latin1 => "latin-1",
            Charset::Ascii => "ascii",
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, CodecError> {
        match self {
            Charset::Utf8 => Ok(text.as_bytes().to_vec()),
            Charset::Latin1 => text.chars().map(|c| narrow(self, c, 0xFF)).collect(),
            Charset::Ascii => text.chars().map(|c| narrow(self, c, 0x7F)).collect(),
        }
    }

    pub fn decode(self, data: &[u8]) -> Result<String, CodecError> {
        match self {
            Charset::Utf8 => String::from_utf8(data.to_vec())
                .map_err(|e| CodecError::InvalidInput(format!("text is not utf-8: {e}"))),
            Charset::Latin1 => Ok(data.iter().map(|&b| char::from(b)).collect()),
            Charset::Ascii => match data.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(CodecError::InvalidInput(format!(
                    "non-ascii byte 0x{:02x} at offset {pos}",
                    data[pos]
                ))),
                None => Ok(data.iter().map(|&b| char::from(b)).collect()),
            },
        }
    }
}

fn narrow(charset: Charset, c: char, max: u32) -> Result<u8, CodecError> {
    let code = u32::from(c);
    if code > max {
        return Err(CodecError::Unencodable {
            charset,
            detail: format!("character {c:?} (U+{code:04X})"),
        });
    }
    Ok(code as u8)
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Plain text codec with a configurable charset.
///
/// The hash is taken over the UTF-8 form of the text, so the same text
/// stored under different charsets hashes identically.
#[derive(Clone, Debug, Default)]
pub struct TextCodec {
    charset: Charset,
    limits: Limits,
}

impl TextCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    fn text<'a>(&self, value: &'a ItemValue) -> Result<&'a str, CodecError> {
        value
            .as_text()
            .ok_or_else(|| CodecError::mismatch(self.name(), NativeType::Text, value.native_type()))
    }
}

impl ItemCodec for TextCodec {
    fn name(&self) -> &'static str {
        "text"
    }

    fn native_type(&self) -> NativeType {
        NativeType::Text
    }

    fn encode(&self, value: &ItemValue) -> Result<Vec<u8>, CodecError> {
        self.charset.encode(self.text(value)?)
    }

    fn decode(&self, data: &[u8]) -> Result<ItemValue, CodecError> {
        self.limits.check_input(data.len())?;
        Ok(ItemValue::Text(self.charset.decode(data)?))
    }

    fn hash(&self, value: &ItemValue) -> Result<String, CodecError> {
        Ok(sha256_hex(self.text(value)?.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_roundtrip() {
        let codec = TextCodec::new();
        let value = ItemValue::from("Temperatur: 21 °C\nok");
        let back = codec.decode(&codec.encode(&value).unwrap()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn latin1_encodes_one_byte_per_char() {
        let codec = TextCodec::new().with_charset(Charset::Latin1);
        let data = codec.encode(&ItemValue::from("°C")).unwrap();
        assert_eq!(data, vec![0xB0, b'C']);
        assert_eq!(codec.decode(&data).unwrap(), ItemValue::from("°C"));
    }

    #[test]
    fn hash_independent_of_charset() {
        let utf8 = TextCodec::new();
        let latin1 = TextCodec::new().with_charset(Charset::Latin1);
        let value = ItemValue::from("Ölfilm");
        assert_ne!(utf8.encode(&value).unwrap(), latin1.encode(&value).unwrap());
        assert_eq!(utf8.hash(&value).unwrap(), latin1.hash(&value).unwrap());
    }

    #[test]
    fn unencodable_characters() {
        let ascii = TextCodec::new().with_charset(Charset::Ascii);
        assert!(matches!(
            ascii.encode(&ItemValue::from("µ")),
            Err(CodecError::Unencodable {
                charset: Charset::Ascii,
                ..
            })
        ));
        let latin1 = TextCodec::new().with_charset(Charset::Latin1);
        assert!(latin1.encode(&ItemValue::from("€")).is_err());
    }

    #[test]
    fn invalid_input() {
        assert!(TextCodec::new().decode(&[0xFF, 0xFE]).is_err());
        let ascii = TextCodec::new().with_charset(Charset::Ascii);
        assert!(matches!(
            ascii.decode(&[b'a', 0x80]),
            Err(CodecError::InvalidInput(_))
        ));
    }
}
