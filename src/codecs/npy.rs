//! NumPy `.npy` array items.
//!
//! Writes format version 1.0 (2.0 when the header outgrows 64 KiB) and reads
//! 1.0 through 3.0. Only C-order arrays of plain numeric dtypes are supported.

use crate::array::{byte_len, swap_elements};
use crate::codec::ContentHasher;
use crate::{CodecError, DType, ItemCodec, ItemValue, Limits, NativeType, NdArray};

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;

/// Codec for numeric arrays in NumPy's `.npy` format.
///
/// The hash covers dtype, shape and little-endian element data, so header
/// padding, format version and stored byte order never change it.
#[derive(Clone, Debug, Default)]
pub struct NpyCodec {
    limits: Limits,
}

impl NpyCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    fn array<'a>(&self, value: &'a ItemValue) -> Result<&'a NdArray, CodecError> {
        value
            .as_array()
            .ok_or_else(|| CodecError::mismatch(self.name(), NativeType::Array, value.native_type()))
    }
}

impl ItemCodec for NpyCodec {
    fn name(&self) -> &'static str {
        "npy"
    }

    fn native_type(&self) -> NativeType {
        NativeType::Array
    }

    fn encode(&self, value: &ItemValue) -> Result<Vec<u8>, CodecError> {
        let array = self.array(value)?;
        let dict = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
            array.dtype().descr(),
            shape_tuple(array.shape())
        );

        // Version 1.0 has a u16 header length, 2.0 a u32.
        let (major, prefix) = if MAGIC.len() + 4 + dict.len() + ALIGN <= usize::from(u16::MAX) {
            (1u8, MAGIC.len() + 4)
        } else {
            (2u8, MAGIC.len() + 6)
        };
        let unpadded = prefix + dict.len() + 1;
        let header_len = dict.len() + 1 + (ALIGN - unpadded % ALIGN) % ALIGN;

        let mut out = Vec::with_capacity(prefix + header_len + array.as_bytes().len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[major, 0]);
        if major == 1 {
            out.extend_from_slice(&(header_len as u16).to_le_bytes());
        } else {
            out.extend_from_slice(&(header_len as u32).to_le_bytes());
        }
        out.extend_from_slice(dict.as_bytes());
        out.resize(prefix + header_len - 1, b' ');
        out.push(b'\n');
        out.extend_from_slice(array.as_bytes());
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<ItemValue, CodecError> {
        self.limits.check_input(data.len())?;
        if data.len() < MAGIC.len() + 4 || &data[..MAGIC.len()] != MAGIC {
            return Err(invalid("missing npy magic"));
        }
        let major = data[6];
        let (header_len, start) = match major {
            1 => (usize::from(u16::from_le_bytes([data[8], data[9]])), 10),
            2 | 3 => {
                let len = data
                    .get(8..12)
                    .ok_or_else(|| invalid("truncated npy preamble"))?;
                (u32::from_le_bytes([len[0], len[1], len[2], len[3]]) as usize, 12)
            }
            other => return Err(invalid(&format!("unsupported npy version {other}"))),
        };
        let header = data
            .get(start..start + header_len)
            .ok_or_else(|| invalid("truncated npy header"))?;
        let header = core::str::from_utf8(header).map_err(|_| invalid("npy header is not text"))?;
        let header = Header::parse(header)?;

        if header.fortran_order {
            return Err(invalid("fortran-ordered arrays are not supported"));
        }
        let expected = byte_len(header.dtype, &header.shape)?;
        self.limits.check_memory(expected as u64)?;

        let body = &data[start + header_len..];
        if body.len() != expected {
            return Err(invalid(&format!(
                "npy data is {} bytes, shape {:?} needs {expected}",
                body.len(),
                header.shape
            )));
        }
        let mut body = body.to_vec();
        if header.big_endian {
            swap_elements(&mut body, header.dtype.itemsize());
        }
        Ok(ItemValue::Array(NdArray::new(header.dtype, header.shape, body)?))
    }

    fn hash(&self, value: &ItemValue) -> Result<String, CodecError> {
        let array = self.array(value)?;
        let mut hasher = ContentHasher::new();
        hasher.field(array.dtype().code().as_bytes());
        hasher.update(&(array.ndim() as u64).to_le_bytes());
        for &dim in array.shape() {
            hasher.update(&(dim as u64).to_le_bytes());
        }
        hasher.field(array.as_bytes());
        Ok(hasher.finish())
    }
}

fn invalid(msg: &str) -> CodecError {
    CodecError::InvalidInput(msg.to_owned())
}

/// Python tuple literal: `()`, `(3,)`, `(2, 3)`.
fn shape_tuple(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_owned(),
        [n] => format!("({n},)"),
        dims => {
            let inner: Vec<String> = dims.iter().map(usize::to_string).collect();
            format!("({})", inner.join(", "))
        }
    }
}

/// Parsed npy header dictionary.
#[derive(Debug, PartialEq)]
struct Header {
    dtype: DType,
    big_endian: bool,
    fortran_order: bool,
    shape: Vec<usize>,
}

impl Header {
    fn parse(text: &str) -> Result<Self, CodecError> {
        let text = text.trim_end();
        if !text.starts_with('{') || !text.ends_with('}') {
            return Err(invalid("npy header is not a dictionary"));
        }

        let descr = quoted(entry(text, "descr")?)?;
        let (order, code) = match descr.chars().next() {
            Some(c @ ('<' | '>' | '|' | '=')) => (c, &descr[1..]),
            _ => ('=', descr),
        };
        let dtype = DType::from_code(code)
            .ok_or_else(|| invalid(&format!("unsupported npy dtype '{descr}'")))?;
        let big_endian = order == '>' || (order == '=' && cfg!(target_endian = "big"));

        let fortran = entry(text, "fortran_order")?;
        let fortran_order = if fortran.starts_with("True") {
            true
        } else if fortran.starts_with("False") {
            false
        } else {
            return Err(invalid("npy fortran_order is not a boolean"));
        };

        let shape = entry(text, "shape")?;
        let inner = shape
            .strip_prefix('(')
            .and_then(|s| s.split_once(')'))
            .map(|(inner, _)| inner)
            .ok_or_else(|| invalid("npy shape is not a tuple"))?;
        let shape = inner
            .split(',')
            .map(str::trim)
            .filter(|dim| !dim.is_empty())
            .map(|dim| {
                dim.trim_end_matches('L')
                    .parse::<usize>()
                    .map_err(|_| invalid(&format!("bad npy dimension '{dim}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            dtype,
            big_endian,
            fortran_order,
            shape,
        })
    }
}

/// Text following `'key':` in the header dictionary.
fn entry<'a>(text: &'a str, key: &str) -> Result<&'a str, CodecError> {
    let pos = [format!("'{key}'"), format!("\"{key}\"")]
        .iter()
        .find_map(|k| text.find(k.as_str()).map(|p| p + k.len()))
        .ok_or_else(|| invalid(&format!("npy header has no '{key}'")))?;
    text[pos..]
        .trim_start()
        .strip_prefix(':')
        .map(str::trim_start)
        .ok_or_else(|| invalid(&format!("npy header key '{key}' has no value")))
}

/// Leading single- or double-quoted string.
fn quoted(text: &str) -> Result<&str, CodecError> {
    let quote = text
        .chars()
        .next()
        .filter(|&c| c == '\'' || c == '"')
        .ok_or_else(|| invalid("npy descr is not a plain string"))?;
    text[1..]
        .split_once(quote)
        .map(|(s, _)| s)
        .ok_or_else(|| invalid("unterminated string in npy header"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npy_v1(dict: &str, body: &[u8]) -> Vec<u8> {
        let mut header = dict.to_owned();
        while (10 + header.len() + 1) % 64 != 0 {
            header.push(' ');
        }
        header.push('\n');
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn header_layout() {
        let codec = NpyCodec::new();
        let array = NdArray::from_slice(&[2, 3], &[1i32, 2, 3, 4, 5, 6]).unwrap();
        let data = codec.encode(&ItemValue::Array(array)).unwrap();

        assert_eq!(&data[..8], b"\x93NUMPY\x01\x00");
        let header_len = u16::from_le_bytes([data[8], data[9]]) as usize;
        assert_eq!((10 + header_len) % 64, 0);
        let header = core::str::from_utf8(&data[10..10 + header_len]).unwrap();
        assert!(header.starts_with("{'descr': '<i4', 'fortran_order': False, 'shape': (2, 3), }"));
        assert!(header.ends_with('\n'));
        assert_eq!(data.len(), 10 + header_len + 24);
    }

    #[test]
    fn roundtrip_shapes() {
        let codec = NpyCodec::new();
        for shape in [vec![], vec![4], vec![2, 2], vec![1, 2, 2]] {
            let n: usize = shape.iter().product();
            let values: Vec<f32> = (0..n).map(|i| i as f32 * 0.5).collect();
            let value = ItemValue::Array(NdArray::from_slice(&shape, &values).unwrap());
            let back = codec.decode(&codec.encode(&value).unwrap()).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn empty_array_roundtrip() {
        let codec = NpyCodec::new();
        let value = ItemValue::Array(NdArray::from_slice::<u16>(&[0, 3], &[]).unwrap());
        let back = codec.decode(&codec.encode(&value).unwrap()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn big_endian_input_hashes_like_little_endian() {
        let codec = NpyCodec::new();
        let little = npy_v1(
            "{'descr': '<u2', 'fortran_order': False, 'shape': (2,), }",
            &[0x01, 0x00, 0x00, 0x01],
        );
        let big = npy_v1(
            "{'descr': '>u2', 'fortran_order': False, 'shape': (2,), }",
            &[0x00, 0x01, 0x01, 0x00],
        );
        let a = codec.decode(&little).unwrap();
        let b = codec.decode(&big).unwrap();
        assert_eq!(a, b);
        assert_eq!(codec.hash(&a).unwrap(), codec.hash(&b).unwrap());
        assert_eq!(a.as_array().unwrap().to_vec::<u16>().unwrap(), vec![1, 256]);
    }

    #[test]
    fn hash_depends_on_shape_and_dtype() {
        let codec = NpyCodec::new();
        let flat = ItemValue::Array(NdArray::from_slice(&[4], &[1u8, 2, 3, 4]).unwrap());
        let square = ItemValue::Array(NdArray::from_slice(&[2, 2], &[1u8, 2, 3, 4]).unwrap());
        let signed = ItemValue::Array(NdArray::from_slice(&[4], &[1i8, 2, 3, 4]).unwrap());
        let h = |v: &ItemValue| codec.hash(v).unwrap();
        assert_ne!(h(&flat), h(&square));
        assert_ne!(h(&flat), h(&signed));
    }

    #[test]
    fn rejects_unsupported_headers() {
        let codec = NpyCodec::new();
        let fortran = npy_v1(
            "{'descr': '<u1', 'fortran_order': True, 'shape': (1,), }",
            &[0],
        );
        let object = npy_v1(
            "{'descr': '|O', 'fortran_order': False, 'shape': (1,), }",
            &[0; 8],
        );
        let short = npy_v1(
            "{'descr': '<u2', 'fortran_order': False, 'shape': (3,), }",
            &[0; 4],
        );
        for data in [fortran, object, short] {
            assert!(matches!(codec.decode(&data), Err(CodecError::InvalidInput(_))));
        }
        assert!(codec.decode(b"PK\x03\x04").is_err());
    }

    #[test]
    fn parses_legacy_shape_suffix() {
        let header = Header::parse("{'descr': '<i8', 'fortran_order': False, 'shape': (3L, 2L), }")
            .unwrap();
        assert_eq!(header.shape, vec![3, 2]);
        assert_eq!(header.dtype, DType::I64);
        assert!(!header.big_endian);
    }

    #[test]
    fn memory_limit() {
        let codec = NpyCodec::new().with_limits(Limits {
            max_memory_bytes: Some(8),
            ..Limits::none()
        });
        let value = ItemValue::Array(NdArray::from_slice(&[4], &[0u32; 4]).unwrap());
        let data = NpyCodec::new().encode(&value).unwrap();
        assert!(matches!(codec.decode(&data), Err(CodecError::LimitExceeded(_))));
    }
}
