use derive_new::new;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Enforcer, LayoutError, Shape};

/// The minimal surface read from a source array: its dtype tag, shape and
/// order tag.
///
/// Tags are plain strings so foreign descriptors can be passed through; they
/// are validated against the catalog when a new array is built from them.
pub trait ArrayLike {
    fn dtype_tag(&self) -> &str;

    fn shape(&self) -> &Shape;

    fn order_tag(&self) -> &str;
}

/// A bare `{dtype, shape, order}` record, e.g. read from JSON.
#[derive(new, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayMeta {
    dtype: String,
    #[serde(deserialize_with = "deserialize_shape")]
    shape: Shape,
    order: String,
}

impl ArrayMeta {
    pub fn from_json(value: &Value) -> Result<Self, LayoutError> {
        Enforcer::check_descriptor(value)
    }
}

fn deserialize_shape<'de, D>(deserializer: D) -> Result<Shape, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Vec::<usize>::deserialize(deserializer).map(Shape::from)
}

impl ArrayLike for ArrayMeta {
    fn dtype_tag(&self) -> &str {
        &self.dtype
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn order_tag(&self) -> &str {
        &self.order
    }
}

impl<T: ArrayLike + ?Sized> ArrayLike for &T {
    fn dtype_tag(&self) -> &str {
        (**self).dtype_tag()
    }

    fn shape(&self) -> &Shape {
        (**self).shape()
    }

    fn order_tag(&self) -> &str {
        (**self).order_tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;
    use serde_json::json;

    #[test]
    fn from_json_and_serde_agree() {
        let value = json!({ "dtype": "uint16", "shape": [4, 1], "order": "row-major" });
        let parsed = ArrayMeta::from_json(&value).unwrap();
        let deserialized: ArrayMeta = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, deserialized);
        assert_eq!(parsed.dtype_tag(), "uint16");
        assert_eq!(parsed.shape(), &shape![4, 1]);
        assert_eq!(parsed.order_tag(), "row-major");
    }

    #[test]
    fn unknown_tags_are_carried() {
        let meta = ArrayMeta::new("bfloat16".into(), shape![2], "diagonal".into());
        assert_eq!(meta.dtype_tag(), "bfloat16");
        assert_eq!(meta.order_tag(), "diagonal");
    }
}
