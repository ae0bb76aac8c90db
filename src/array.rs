//! Numeric n-dimensional arrays.
//!
//! Data is always held contiguous, C-order and little-endian so equal arrays
//! compare and hash equal regardless of the byte order they were loaded from.

use crate::CodecError;

/// Element type of an [`NdArray`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn itemsize(self) -> usize {
        match self {
            DType::Bool | DType::U8 | DType::I8 => 1,
            DType::U16 | DType::I16 => 2,
            DType::U32 | DType::I32 | DType::F32 => 4,
            DType::U64 | DType::I64 | DType::F64 => 8,
        }
    }

    /// Type character and size without byte-order prefix, e.g. `f8`.
    pub fn code(self) -> &'static str {
        match self {
            DType::Bool => "b1",
            DType::U8 => "u1",
            DType::I8 => "i1",
            DType::U16 => "u2",
            DType::I16 => "i2",
            DType::U32 => "u4",
            DType::I32 => "i4",
            DType::U64 => "u8",
            DType::I64 => "i8",
            DType::F32 => "f4",
            DType::F64 => "f8",
        }
    }

    /// Little-endian array-protocol descriptor, e.g. `<f8` or `|u1`.
    pub fn descr(self) -> String {
        let order = if self.itemsize() == 1 { '|' } else { '<' };
        format!("{order}{}", self.code())
    }

    #[cfg(feature = "npy")]
    pub(crate) fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "b1" => DType::Bool,
            "u1" => DType::U8,
            "i1" => DType::I8,
            "u2" => DType::U16,
            "i2" => DType::I16,
            "u4" => DType::U32,
            "i4" => DType::I32,
            "u8" => DType::U64,
            "i8" => DType::I64,
            "f4" => DType::F32,
            "f8" => DType::F64,
            _ => return None,
        })
    }
}

/// Primitive element types that can be viewed as array data.
pub trait Element: bytemuck::Pod {
    const DTYPE: DType;
}

macro_rules! element {
    ($($t:ty => $d:ident),* $(,)?) => {
        $(impl Element for $t {
            const DTYPE: DType = DType::$d;
        })*
    };
}

element!(
    u8 => U8, i8 => I8, u16 => U16, i16 => I16, u32 => U32, i32 => I32,
    u64 => U64, i64 => I64, f32 => F32, f64 => F64,
);

/// Dense numeric array with a shape and an element type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NdArray {
    dtype: DType,
    shape: Vec<usize>,
    data: Vec<u8>,
}

impl NdArray {
    /// Build an array from little-endian element bytes.
    pub fn new(dtype: DType, shape: Vec<usize>, data: Vec<u8>) -> Result<Self, CodecError> {
        let expected = byte_len(dtype, &shape)?;
        if data.len() != expected {
            return Err(CodecError::InvalidInput(format!(
                "array of shape {shape:?} and dtype {} needs {expected} bytes, got {}",
                dtype.code(),
                data.len()
            )));
        }
        if dtype == DType::Bool && data.iter().any(|&b| b > 1) {
            return Err(CodecError::InvalidInput("boolean element not 0 or 1".into()));
        }
        Ok(Self { dtype, shape, data })
    }

    /// Build an array by copying typed elements.
    pub fn from_slice<T: Element>(shape: &[usize], values: &[T]) -> Result<Self, CodecError> {
        let mut data = bytemuck::cast_slice::<T, u8>(values).to_vec();
        if cfg!(target_endian = "big") {
            swap_elements(&mut data, T::DTYPE.itemsize());
        }
        Self::new(T::DTYPE, shape.to_vec(), data)
    }

    /// Build a boolean array.
    pub fn from_bools(shape: &[usize], values: &[bool]) -> Result<Self, CodecError> {
        let data = values.iter().map(|&b| u8::from(b)).collect();
        Self::new(DType::Bool, shape.to_vec(), data)
    }

    /// Copy the elements out as `T`. Fails if `T` does not match the dtype.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, CodecError> {
        if T::DTYPE != self.dtype {
            return Err(CodecError::InvalidInput(format!(
                "array dtype is {}, requested {}",
                self.dtype.code(),
                T::DTYPE.code()
            )));
        }
        if cfg!(target_endian = "big") {
            let mut native = self.data.clone();
            swap_elements(&mut native, self.dtype.itemsize());
            return Ok(bytemuck::pod_collect_to_vec(&native));
        }
        Ok(bytemuck::pod_collect_to_vec(&self.data))
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element data, C-order, little-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Total data size for `shape`, rejecting overflow.
pub(crate) fn byte_len(dtype: DType, shape: &[usize]) -> Result<usize, CodecError> {
    shape
        .iter()
        .try_fold(dtype.itemsize(), |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| CodecError::InvalidInput(format!("array shape {shape:?} overflows")))
}

/// Reverse the byte order of every `itemsize`-wide element in place.
pub(crate) fn swap_elements(data: &mut [u8], itemsize: usize) {
    if itemsize > 1 {
        for element in data.chunks_exact_mut(itemsize) {
            element.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_roundtrip() {
        let values = [1.5f64, -2.0, 3.25, 0.0, 1e300, -7.5];
        let array = NdArray::from_slice(&[2, 3], &values).unwrap();
        assert_eq!(array.dtype(), DType::F64);
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array.len(), 6);
        assert_eq!(array.as_bytes().len(), 48);
        assert_eq!(array.to_vec::<f64>().unwrap(), values);
    }

    #[test]
    fn data_is_little_endian() {
        let array = NdArray::from_slice(&[1], &[0x0102u16]).unwrap();
        assert_eq!(array.as_bytes(), &[0x02, 0x01]);
    }

    #[test]
    fn shape_mismatch_rejected() {
        let err = NdArray::from_slice(&[4], &[1i32, 2, 3]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidInput(_)));
    }

    #[test]
    fn wrong_element_type_rejected() {
        let array = NdArray::from_slice(&[2], &[1i32, 2]).unwrap();
        assert!(array.to_vec::<u32>().is_err());
    }

    #[test]
    fn zero_dimensional_array_holds_one_element() {
        let array = NdArray::from_slice(&[], &[42u8]).unwrap();
        assert_eq!(array.ndim(), 0);
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn descriptors() {
        assert_eq!(DType::U8.descr(), "|u1");
        assert_eq!(DType::F32.descr(), "<f4");
    }

    #[cfg(feature = "npy")]
    #[test]
    fn descriptor_codes() {
        assert_eq!(DType::from_code("i8"), Some(DType::I64));
        assert_eq!(DType::from_code("c16"), None);
    }

    #[test]
    fn bools_must_be_zero_or_one() {
        assert!(NdArray::from_bools(&[3], &[true, false, true]).is_ok());
        assert!(NdArray::new(DType::Bool, vec![1], vec![2]).is_err());
    }
}
