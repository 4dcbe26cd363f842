use serde::Serialize;

use crate::{ArrayLike, Buffer, DType, Enforcer, LayoutError, Order, Scalar, Shape, Strides};

/// A strided view over an exclusively owned buffer.
///
/// The logical element at multi-index `(i0, .., ik)` lives at buffer position
/// `offset + sum(ij * strides[j])`. Nothing about a descriptor can change after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    dtype: DType,
    buffer: Buffer,
    shape: Shape,
    strides: Strides,
    offset: usize,
    order: Order,
    numel: usize,
}

impl NdArray {
    pub fn new(
        dtype: DType,
        buffer: Buffer,
        shape: Shape,
        strides: Strides,
        offset: usize,
        order: Order,
    ) -> Result<Self, LayoutError> {
        Enforcer::check_strides_len(&shape, &strides)?;
        let numel = shape
            .numel()
            .ok_or(LayoutError::BufferTooLarge { bytes: None })?;
        if buffer.dtype() != dtype {
            return Err(LayoutError::BufferDTypeMismatch {
                expected: dtype,
                actual: buffer.dtype(),
            });
        }
        Ok(Self {
            dtype,
            buffer,
            shape,
            strides,
            offset,
            order,
            numel,
        })
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &Strides {
        &self.strides
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn ndims(&self) -> usize {
        self.shape.rank()
    }

    pub fn numel(&self) -> usize {
        self.numel
    }

    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Buffer position of the element at `index`, or `None` if the index has
    /// the wrong rank or is out of bounds.
    pub fn linear_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.ndims() {
            return None;
        }
        let mut position = self.offset as isize;
        for ((&i, &dim), &stride) in index.iter().zip(self.shape.iter()).zip(self.strides.iter()) {
            if i >= dim {
                return None;
            }
            position += i as isize * stride;
        }
        usize::try_from(position).ok()
    }

    pub fn get(&self, index: &[usize]) -> Option<Scalar> {
        self.buffer.get(self.linear_index(index)?)
    }

    pub fn summary(&self) -> NdArraySummary {
        NdArraySummary::from(self)
    }
}

impl ArrayLike for NdArray {
    fn dtype_tag(&self) -> &str {
        self.dtype.as_ref()
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn order_tag(&self) -> &str {
        self.order.as_ref()
    }
}

/// Serializable description of an [`NdArray`]; buffer contents are included
/// for small buffers only.
#[derive(Debug, Clone, Serialize)]
pub struct NdArraySummary {
    pub dtype: DType,
    pub shape: Shape,
    pub strides: Strides,
    pub offset: usize,
    pub order: Order,
    pub numel: usize,
    pub buffer_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<serde_json::Value>>,
}

impl NdArraySummary {
    const MAX_DATA_SLOTS: usize = 64;
}

impl From<&NdArray> for NdArraySummary {
    fn from(array: &NdArray) -> Self {
        let buffer = array.buffer();
        let data = (buffer.n_slots() <= Self::MAX_DATA_SLOTS).then(|| {
            buffer
                .iter()
                .map(|x| serde_json::Value::from(&x))
                .collect()
        });
        Self {
            dtype: array.dtype(),
            shape: array.shape().clone(),
            strides: array.strides().clone(),
            offset: array.offset(),
            order: array.order(),
            numel: array.numel(),
            buffer_len: buffer.n_slots(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{shape, shape2strides};

    fn descriptor(dtype: DType, shape: Shape, order: Order) -> NdArray {
        let strides = shape2strides(&shape, order);
        let buffer = Buffer::zeros(dtype, shape.numel().unwrap()).unwrap();
        NdArray::new(dtype, buffer, shape, strides, 0, order).unwrap()
    }

    #[test]
    fn linear_index_row_major() {
        let x = descriptor(DType::F32, shape![2, 3], Order::RowMajor);
        assert_eq!(x.linear_index(&[0, 0]), Some(0));
        assert_eq!(x.linear_index(&[1, 2]), Some(5));
        assert_eq!(x.linear_index(&[0, 1]), Some(1));
        assert_eq!(x.linear_index(&[2, 0]), None);
        assert_eq!(x.linear_index(&[0]), None);
    }

    #[test]
    fn linear_index_column_major() {
        let x = descriptor(DType::F32, shape![2, 3], Order::ColumnMajor);
        assert_eq!(x.linear_index(&[1, 0]), Some(1));
        assert_eq!(x.linear_index(&[0, 1]), Some(2));
        assert_eq!(x.linear_index(&[1, 2]), Some(5));
    }

    #[test]
    fn reversed_view_indexes_from_offset() {
        let shape = shape![2, 3];
        let strides = Strides::from(vec![-3, 1]);
        let offset = crate::strides2offset(&shape, &strides).unwrap();
        let buffer = Buffer::zeros(DType::I8, 6).unwrap();
        let x = NdArray::new(DType::I8, buffer, shape, strides, offset, Order::RowMajor).unwrap();
        assert_eq!(x.linear_index(&[0, 0]), Some(3));
        assert_eq!(x.linear_index(&[1, 2]), Some(2));
        assert_eq!(x.get(&[1, 2]), Some(Scalar::I8(0)));
    }

    #[test]
    fn zero_dimensional_indexing() {
        let x = descriptor(DType::U32, shape![], Order::RowMajor);
        assert_eq!(x.ndims(), 0);
        assert_eq!(x.numel(), 1);
        assert_eq!(x.linear_index(&[]), Some(0));
        assert_eq!(x.get(&[]), Some(Scalar::U32(0)));
    }

    #[test]
    fn rejects_mismatched_parts() {
        let buffer = Buffer::zeros(DType::F64, 4).unwrap();
        let err = NdArray::new(
            DType::F64,
            buffer.clone(),
            shape![2, 2],
            Strides::from(vec![1]),
            0,
            Order::RowMajor,
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::ShapeStridesLengthMismatch { .. }));

        let err = NdArray::new(
            DType::F32,
            buffer,
            shape![2, 2],
            Strides::from(vec![2, 1]),
            0,
            Order::RowMajor,
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::BufferDTypeMismatch {
                expected: DType::F32,
                actual: DType::F64
            }
        );
    }

    #[test]
    fn rejects_overflowing_shape() {
        let buffer = Buffer::zeros(DType::U8, 0).unwrap();
        let shape = shape![usize::MAX, 2];
        let strides = Strides::from(&shape);
        let err = NdArray::new(DType::U8, buffer, shape, strides, 0, Order::RowMajor).unwrap_err();
        assert_eq!(err, LayoutError::BufferTooLarge { bytes: None });
    }

    #[test]
    fn summary_serializes_tags() {
        let x = descriptor(DType::C64, shape![2], Order::ColumnMajor);
        let json = serde_json::to_value(x.summary()).unwrap();
        assert_eq!(json["dtype"], "complex64");
        assert_eq!(json["order"], "column-major");
        assert_eq!(json["shape"], serde_json::json!([2]));
        assert_eq!(json["strides"], serde_json::json!([1]));
        assert_eq!(json["buffer_len"], 4);
        assert_eq!(json["data"], serde_json::json!([[0.0, 0.0], [0.0, 0.0]]));
    }
}
