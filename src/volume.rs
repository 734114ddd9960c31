//! Volumes whose sample type is only known at runtime

use crate::element::{decode_payload, VoxelElement};
use crate::error::{NrrdError, Result};
use crate::header::NrrdHeader;
use crate::types::{DataType, ValueRange};
use ndarray::Array3;
use num_traits::ToPrimitive;

/// A 3D volume holding whichever sample type the file declared
#[derive(Debug, Clone, PartialEq)]
pub enum DynVolume {
    I8(Array3<i8>),
    U8(Array3<u8>),
    I16(Array3<i16>),
    U16(Array3<u16>),
    I32(Array3<i32>),
    U32(Array3<u32>),
    I64(Array3<i64>),
    U64(Array3<u64>),
    F32(Array3<f32>),
    F64(Array3<f64>),
}

macro_rules! dispatch {
    ($volume:expr, $array:ident => $body:expr) => {
        match $volume {
            DynVolume::I8($array) => $body,
            DynVolume::U8($array) => $body,
            DynVolume::I16($array) => $body,
            DynVolume::U16($array) => $body,
            DynVolume::I32($array) => $body,
            DynVolume::U32($array) => $body,
            DynVolume::I64($array) => $body,
            DynVolume::U64($array) => $body,
            DynVolume::F32($array) => $body,
            DynVolume::F64($array) => $body,
        }
    };
}

impl DynVolume {
    /// Decode a payload into the variant matching `header.data_type`
    pub fn from_payload(header: &NrrdHeader, payload: &[u8]) -> Result<Self> {
        Ok(match header.data_type {
            DataType::I8 => DynVolume::I8(to_array(header, payload)?),
            DataType::U8 => DynVolume::U8(to_array(header, payload)?),
            DataType::I16 => DynVolume::I16(to_array(header, payload)?),
            DataType::U16 => DynVolume::U16(to_array(header, payload)?),
            DataType::I32 => DynVolume::I32(to_array(header, payload)?),
            DataType::U32 => DynVolume::U32(to_array(header, payload)?),
            DataType::I64 => DynVolume::I64(to_array(header, payload)?),
            DataType::U64 => DynVolume::U64(to_array(header, payload)?),
            DataType::F32 => DynVolume::F32(to_array(header, payload)?),
            DataType::F64 => DynVolume::F64(to_array(header, payload)?),
        })
    }

    pub fn data_type(&self) -> DataType {
        match self {
            DynVolume::I8(_) => DataType::I8,
            DynVolume::U8(_) => DataType::U8,
            DynVolume::I16(_) => DataType::I16,
            DynVolume::U16(_) => DataType::U16,
            DynVolume::I32(_) => DataType::I32,
            DynVolume::U32(_) => DataType::U32,
            DynVolume::I64(_) => DataType::I64,
            DynVolume::U64(_) => DataType::U64,
            DynVolume::F32(_) => DataType::F32,
            DynVolume::F64(_) => DataType::F64,
        }
    }

    /// Shape in C order: `(slices, rows, columns)`
    pub fn shape(&self) -> [usize; 3] {
        dispatch!(self, array => {
            let (d0, d1, d2) = array.dim();
            [d0, d1, d2]
        })
    }

    /// Smallest and largest sample, ignoring NaN; `None` when no sample compares
    pub fn value_range(&self) -> Option<ValueRange> {
        dispatch!(self, array => value_range(array))
    }

    /// Widen every sample to `f64`
    pub fn to_f64(&self) -> Array3<f64> {
        dispatch!(self, array => array.mapv(|v| v as f64))
    }

    /// Take the typed array out, failing when `T` is not the stored type
    pub fn into_array<T: VoxelElement>(self) -> Result<Array3<T>> {
        let found = self.data_type();
        let mismatch = || NrrdError::TypeMismatch {
            expected: T::DATA_TYPE.to_string(),
            found: found.to_string(),
        };
        dispatch!(self, array => {
            let boxed: Box<dyn std::any::Any> = Box::new(array);
            boxed.downcast::<Array3<T>>().map(|a| *a).map_err(|_| mismatch())
        })
    }
}

/// Decode a 3D payload and shape it in C order
pub(crate) fn to_array<T: VoxelElement>(header: &NrrdHeader, payload: &[u8]) -> Result<Array3<T>> {
    if header.dimension != 3 {
        return Err(NrrdError::ShapeMismatch(format!(
            "expected a 3-dimensional volume, file has dimension {}",
            header.dimension
        )));
    }
    let values = decode_payload::<T>(payload, header)?;
    let shape = header.array_shape();
    Ok(Array3::from_shape_vec((shape[0], shape[1], shape[2]), values)?)
}

fn value_range<T: VoxelElement>(array: &Array3<T>) -> Option<ValueRange> {
    let mut range: Option<(T, T)> = None;
    for &value in array.iter() {
        // NaN compares false with itself
        if value.partial_cmp(&value).is_none() {
            continue;
        }
        range = Some(match range {
            None => (value, value),
            Some((lo, hi)) => (
                if value < lo { value } else { lo },
                if value > hi { value } else { hi },
            ),
        });
    }
    range.and_then(|(lo, hi)| Some(ValueRange::new(lo.to_f64()?, hi.to_f64()?)))
}
