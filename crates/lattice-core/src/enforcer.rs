use serde_json::{Map, Value};

use crate::{ArrayMeta, DType, Order, RVec, Shape, Strides};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("First argument must be an ndarray-like object. Value: `{0}`.")]
    InvalidInputDescriptor(String),
    #[error("Options argument must be an object. Value: `{0}`.")]
    InvalidConfiguration(String),
    #[error("Unrecognized data type. Value: `{0}`.")]
    InvalidDtype(String),
    #[error("Unrecognized order. Value: `{0}`.")]
    InvalidOrder(String),
    #[error("Shape must be a nonnegative integer or an array of nonnegative integers. Value: `{0}`.")]
    InvalidShape(String),
    #[error("Shape and strides must have the same length, {shape} != {strides}.")]
    ShapeStridesLengthMismatch { shape: usize, strides: usize },
    #[error("Buffer size overflows the address space ({bytes:?} bytes).")]
    BufferTooLarge { bytes: Option<usize> },
    #[error("DType mismatch, expected {expected:?}, got {actual:?}.")]
    BufferDTypeMismatch { expected: DType, actual: DType },
}

/// # Enforcer
///
/// Turns untyped caller input into catalog values, failing on the first
/// invalid field.
pub struct Enforcer;

impl Enforcer {
    pub fn check_dtype(tag: &str) -> Result<DType, LayoutError> {
        tag.parse()
            .map_err(|_| LayoutError::InvalidDtype(tag.to_string()))
    }

    pub fn check_order(tag: &str) -> Result<Order, LayoutError> {
        tag.parse()
            .map_err(|_| LayoutError::InvalidOrder(tag.to_string()))
    }

    /// Accepts a single nonnegative integer, normalised to one dimension, or an
    /// array of nonnegative integers.
    pub fn check_shape(value: &Value) -> Result<Shape, LayoutError> {
        let invalid = || LayoutError::InvalidShape(value.to_string());
        match value {
            Value::Number(_) => Self::check_dim(value).map(Shape::from).ok_or_else(invalid),
            Value::Array(dims) => dims
                .iter()
                .map(Self::check_dim)
                .collect::<Option<RVec<usize>>>()
                .map(Shape::new)
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }

    /// A nonnegative integer. Integral floats such as `2.0` are accepted.
    pub fn check_dim(value: &Value) -> Option<usize> {
        if let Some(dim) = value.as_u64() {
            return usize::try_from(dim).ok();
        }
        let dim = value.as_f64()?;
        if dim >= 0.0 && dim.fract() == 0.0 && dim < usize::MAX as f64 {
            Some(dim as usize)
        } else {
            None
        }
    }

    pub fn check_options(value: &Value) -> Result<&Map<String, Value>, LayoutError> {
        value
            .as_object()
            .ok_or_else(|| LayoutError::InvalidConfiguration(value.to_string()))
    }

    /// Reads the `{dtype, shape, order}` contract of an ndarray-like object.
    ///
    /// Only the presence and JSON types of the fields are checked here; the
    /// dtype and order tags are validated against the catalog when used.
    pub fn check_descriptor(value: &Value) -> Result<ArrayMeta, LayoutError> {
        let invalid = || LayoutError::InvalidInputDescriptor(value.to_string());
        let object = value.as_object().ok_or_else(invalid)?;
        let dtype = object
            .get("dtype")
            .and_then(Value::as_str)
            .ok_or_else(invalid)?;
        let order = object
            .get("order")
            .and_then(Value::as_str)
            .ok_or_else(invalid)?;
        let shape = object
            .get("shape")
            .filter(|shape| shape.is_array())
            .ok_or_else(invalid)?;
        let shape = Self::check_shape(shape).map_err(|_| invalid())?;
        Ok(ArrayMeta::new(dtype.to_string(), shape, order.to_string()))
    }

    pub fn check_strides_len(shape: &Shape, strides: &Strides) -> Result<(), LayoutError> {
        if shape.len() != strides.len() {
            return Err(LayoutError::ShapeStridesLengthMismatch {
                shape: shape.len(),
                strides: strides.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{shape, ArrayLike};
    use serde_json::json;

    #[test]
    fn shape_normalisation() {
        assert_eq!(Enforcer::check_shape(&json!(4)).unwrap(), shape![4]);
        assert_eq!(Enforcer::check_shape(&json!([2, 2])).unwrap(), shape![2, 2]);
        assert_eq!(Enforcer::check_shape(&json!([3.0, 0])).unwrap(), shape![3, 0]);
        assert_eq!(Enforcer::check_shape(&json!([])).unwrap(), shape![]);
    }

    #[test]
    fn invalid_shapes() {
        let values = [
            json!(-1),
            json!(2.5),
            json!([-1]),
            json!([1, 2.5]),
            json!(["5"]),
            json!([null]),
            json!("5"),
            json!(true),
            json!(null),
            json!({}),
            json!([[1]]),
        ];
        for value in values {
            let err = Enforcer::check_shape(&value).unwrap_err();
            assert!(
                matches!(err, LayoutError::InvalidShape(_)),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_tags() {
        assert_eq!(
            Enforcer::check_dtype("not-a-type").unwrap_err(),
            LayoutError::InvalidDtype("not-a-type".to_string())
        );
        assert_eq!(
            Enforcer::check_order("diagonal").unwrap_err(),
            LayoutError::InvalidOrder("diagonal".to_string())
        );
    }

    #[test]
    fn options_must_be_objects() {
        for value in [json!("5"), json!(5), json!(true), json!(null), json!([])] {
            assert!(matches!(
                Enforcer::check_options(&value),
                Err(LayoutError::InvalidConfiguration(_))
            ));
        }
        assert!(Enforcer::check_options(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn descriptor_contract() {
        let meta = Enforcer::check_descriptor(&json!({
            "dtype": "int16",
            "shape": [3, 2],
            "order": "column-major"
        }))
        .unwrap();
        assert_eq!(meta.shape(), &shape![3, 2]);

        let values = [
            json!("5"),
            json!(5),
            json!(true),
            json!(null),
            json!([]),
            json!({}),
            json!({ "data": true }),
            json!({ "dtype": "int16", "shape": 3, "order": "row-major" }),
            json!({ "dtype": 1, "shape": [3], "order": "row-major" }),
            json!({ "dtype": "int16", "shape": [-3], "order": "row-major" }),
        ];
        for value in values {
            assert!(
                matches!(
                    Enforcer::check_descriptor(&value),
                    Err(LayoutError::InvalidInputDescriptor(_))
                ),
                "{value} should be rejected"
            );
        }
    }
}
