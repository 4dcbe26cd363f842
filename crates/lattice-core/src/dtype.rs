use num::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The closed catalog of element types an [`NdArray`](crate::NdArray) can hold.
///
/// Every other component asks the catalog for validity, storage width and zero
/// values rather than re-deriving them.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Default,
    Hash,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum DType {
    #[default]
    #[strum(to_string = "float64")]
    #[serde(rename = "float64")]
    F64,
    #[strum(to_string = "float32")]
    #[serde(rename = "float32")]
    F32,
    #[strum(to_string = "int32")]
    #[serde(rename = "int32")]
    I32,
    #[strum(to_string = "uint32")]
    #[serde(rename = "uint32")]
    U32,
    #[strum(to_string = "int16")]
    #[serde(rename = "int16")]
    I16,
    #[strum(to_string = "uint16")]
    #[serde(rename = "uint16")]
    U16,
    #[strum(to_string = "int8")]
    #[serde(rename = "int8")]
    I8,
    #[strum(to_string = "uint8")]
    #[serde(rename = "uint8")]
    U8,
    #[strum(to_string = "uint8c", serialize = "uint8-clamped")]
    #[serde(rename = "uint8c", alias = "uint8-clamped")]
    U8C,
    #[strum(to_string = "complex128")]
    #[serde(rename = "complex128")]
    C128,
    #[strum(to_string = "complex64")]
    #[serde(rename = "complex64")]
    C64,
    #[strum(to_string = "generic")]
    #[serde(rename = "generic")]
    Generic,
}

impl DType {
    pub const ALL: [DType; 12] = [
        DType::F64,
        DType::F32,
        DType::I32,
        DType::U32,
        DType::I16,
        DType::U16,
        DType::I8,
        DType::U8,
        DType::U8C,
        DType::C128,
        DType::C64,
        DType::Generic,
    ];

    /// Number of storage slots occupied by one logical element.
    pub fn storage_multiplier(self) -> usize {
        match self {
            DType::C128 | DType::C64 => 2,
            _ => 1,
        }
    }

    /// Returns the size of one storage slot in bytes.
    ///
    /// Generic buffers are not byte addressable and report 0.
    pub fn size_of(self) -> usize {
        match self {
            DType::F64 | DType::C128 => 8,
            DType::F32 | DType::I32 | DType::U32 | DType::C64 => 4,
            DType::I16 | DType::U16 => 2,
            DType::I8 | DType::U8 | DType::U8C => 1,
            DType::Generic => 0,
        }
    }

    /// The real dtype held by each storage slot.
    pub fn storage_type(self) -> DType {
        match self {
            DType::C128 => DType::F64,
            DType::C64 => DType::F32,
            DType::U8C => DType::U8,
            dt => dt,
        }
    }

    pub fn is_complex(self) -> bool {
        matches!(self, DType::C128 | DType::C64)
    }

    pub fn zero_value(self) -> Scalar {
        match self {
            DType::F64 => Scalar::F64(0.0),
            DType::F32 => Scalar::F32(0.0),
            DType::I32 => Scalar::I32(0),
            DType::U32 => Scalar::U32(0),
            DType::I16 => Scalar::I16(0),
            DType::U16 => Scalar::U16(0),
            DType::I8 => Scalar::I8(0),
            DType::U8 => Scalar::U8(0),
            DType::U8C => Scalar::U8C(0),
            DType::C128 => Scalar::C128(Complex::zero()),
            DType::C64 => Scalar::C64(Complex::zero()),
            DType::Generic => Scalar::Generic(serde_json::Value::from(0)),
        }
    }

    pub fn iter() -> impl Iterator<Item = DType> {
        <DType as IntoEnumIterator>::iter()
    }
}

pub fn is_valid_dtype(tag: &str) -> bool {
    tag.parse::<DType>().is_ok()
}

/// A single logical element read out of a buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    F64(f64),
    F32(f32),
    I32(i32),
    U32(u32),
    I16(i16),
    U16(u16),
    I8(i8),
    U8(u8),
    U8C(u8),
    C128(Complex<f64>),
    C64(Complex<f32>),
    Generic(serde_json::Value),
}

impl Scalar {
    pub fn dt(&self) -> DType {
        match self {
            Scalar::F64(_) => DType::F64,
            Scalar::F32(_) => DType::F32,
            Scalar::I32(_) => DType::I32,
            Scalar::U32(_) => DType::U32,
            Scalar::I16(_) => DType::I16,
            Scalar::U16(_) => DType::U16,
            Scalar::I8(_) => DType::I8,
            Scalar::U8(_) => DType::U8,
            Scalar::U8C(_) => DType::U8C,
            Scalar::C128(_) => DType::C128,
            Scalar::C64(_) => DType::C64,
            Scalar::Generic(_) => DType::Generic,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Scalar::F64(v) => v.is_zero(),
            Scalar::F32(v) => v.is_zero(),
            Scalar::I32(v) => v.is_zero(),
            Scalar::U32(v) => v.is_zero(),
            Scalar::I16(v) => v.is_zero(),
            Scalar::U16(v) => v.is_zero(),
            Scalar::I8(v) => v.is_zero(),
            Scalar::U8(v) | Scalar::U8C(v) => v.is_zero(),
            Scalar::C128(v) => v.is_zero(),
            Scalar::C64(v) => v.is_zero(),
            Scalar::Generic(v) => v.as_f64() == Some(0.0),
        }
    }
}

impl From<&Scalar> for serde_json::Value {
    fn from(scalar: &Scalar) -> Self {
        use serde_json::Value;
        match scalar {
            Scalar::F64(v) => Value::from(*v),
            Scalar::F32(v) => Value::from(*v),
            Scalar::I32(v) => Value::from(*v),
            Scalar::U32(v) => Value::from(*v),
            Scalar::I16(v) => Value::from(*v),
            Scalar::U16(v) => Value::from(*v),
            Scalar::I8(v) => Value::from(*v),
            Scalar::U8(v) | Scalar::U8C(v) => Value::from(*v),
            Scalar::C128(c) => Value::from(vec![c.re, c.im]),
            Scalar::C64(c) => Value::from(vec![c.re, c.im]),
            Scalar::Generic(v) => v.clone(),
        }
    }
}

/// Conversion rule for `uint8c` storage: NaN maps to 0, values saturate at the
/// ends of the range and ties round to even.
pub fn clamp_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

pub trait TensorDType:
    Clone + std::fmt::Debug + PartialEq + 'static + num_traits::Zero + Send + Sync + bytemuck::Pod
{
    fn dt() -> DType;
}

macro_rules! map_type {
    ($t:ty, $v:ident) => {
        impl TensorDType for $t {
            fn dt() -> DType {
                DType::$v
            }
        }
    };
}

map_type!(f64, F64);
map_type!(f32, F32);
map_type!(i32, I32);
map_type!(u32, U32);
map_type!(i16, I16);
map_type!(u16, U16);
map_type!(i8, I8);
map_type!(u8, U8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_catalog_tags() {
        for dt in DType::ALL {
            let parsed: DType = dt.to_string().parse().unwrap();
            assert_eq!(parsed, dt);
        }
        assert_eq!("uint8-clamped".parse::<DType>().unwrap(), DType::U8C);
        assert_eq!(DType::U8C.as_ref(), "uint8c");
    }

    #[test]
    fn rejects_unknown_tags() {
        for tag in ["not-a-type", "", "Float64", "float16", "bool", "5"] {
            assert!(!is_valid_dtype(tag), "{tag} should be rejected");
        }
    }

    #[test]
    fn catalog_is_exhaustive() {
        assert_eq!(DType::iter().count(), DType::ALL.len());
        assert!(DType::iter().all(|dt| DType::ALL.contains(&dt)));
    }

    #[test]
    fn multipliers() {
        for dt in DType::ALL {
            let expected = if dt.is_complex() { 2 } else { 1 };
            assert_eq!(dt.storage_multiplier(), expected);
        }
        assert_eq!(DType::C128.storage_type().size_of(), 8);
        assert_eq!(DType::C64.storage_type().size_of(), 4);
    }

    #[test]
    fn zero_values_are_zero() {
        for dt in DType::ALL {
            let zero = dt.zero_value();
            assert_eq!(zero.dt(), dt);
            assert!(zero.is_zero());
        }
    }

    #[test]
    fn clamped_conversion() {
        assert_eq!(clamp_u8(-3.0), 0);
        assert_eq!(clamp_u8(300.0), 255);
        assert_eq!(clamp_u8(f64::NAN), 0);
        assert_eq!(clamp_u8(2.5), 2);
        assert_eq!(clamp_u8(3.5), 4);
        assert_eq!(clamp_u8(127.2), 127);
    }
}
