use serde_json::Value;

use crate::{
    shape2strides, strides2offset, ArrayLike, Buffer, DType, Enforcer, LayoutError, NdArray, Order,
    Shape,
};

/// Per-field overrides for [`zeros_like`].
///
/// Each field left as `None` is inherited from the source array on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZerosLikeOptions {
    pub dtype: Option<DType>,
    pub shape: Option<Shape>,
    pub order: Option<Order>,
}

impl ZerosLikeOptions {
    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    pub fn shape(mut self, shape: impl Into<Shape>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Reads overrides from a JSON object with optional `dtype`, `shape` and
    /// `order` keys. A key that is present must hold a valid value, `null`
    /// included.
    pub fn from_json(value: &Value) -> Result<Self, LayoutError> {
        let options = Enforcer::check_options(value)?;
        let mut opts = Self::default();
        if let Some(shape) = options.get("shape") {
            opts.shape = Some(Enforcer::check_shape(shape)?);
        }
        if let Some(order) = options.get("order") {
            let tag = order
                .as_str()
                .ok_or_else(|| LayoutError::InvalidOrder(order.to_string()))?;
            opts.order = Some(Enforcer::check_order(tag)?);
        }
        if let Some(dtype) = options.get("dtype") {
            let tag = dtype
                .as_str()
                .ok_or_else(|| LayoutError::InvalidDtype(dtype.to_string()))?;
            opts.dtype = Some(Enforcer::check_dtype(tag)?);
        }
        Ok(opts)
    }
}

/// Creates a zero-filled array of `dtype` with standard strides for `order`.
pub fn zeros(dtype: DType, shape: impl Into<Shape>, order: Order) -> Result<NdArray, LayoutError> {
    let shape = shape.into();
    let numel = shape
        .numel()
        .ok_or(LayoutError::BufferTooLarge { bytes: None })?;
    log::debug!(
        "Allocating zeros: dtype={} shape={:?} order={} numel={}",
        dtype,
        shape,
        order,
        numel
    );
    let buffer = Buffer::zeros(dtype, numel)?;
    let strides = shape2strides(&shape, order);
    let offset = strides2offset(&shape, &strides)?;
    NdArray::new(dtype, buffer, shape, strides, offset, order)
}

/// [`zeros`] for untyped input.
///
/// `shape` is a nonnegative integer or an array of them. Fields are checked in
/// the order shape, order, dtype and the first failure is returned.
pub fn zeros_from_json(dtype: &str, shape: &Value, order: &str) -> Result<NdArray, LayoutError> {
    let shape = Enforcer::check_shape(shape)?;
    let order = Enforcer::check_order(order)?;
    let dtype = Enforcer::check_dtype(dtype)?;
    zeros(dtype, shape, order)
}

/// Creates a zero-filled array shaped like `x`, with a freshly allocated buffer.
pub fn zeros_like<A: ArrayLike + ?Sized>(
    x: &A,
    options: ZerosLikeOptions,
) -> Result<NdArray, LayoutError> {
    let ZerosLikeOptions {
        dtype,
        shape,
        order,
    } = options;
    let shape = shape.unwrap_or_else(|| x.shape().clone());
    let order = match order {
        Some(order) => order,
        None => Enforcer::check_order(x.order_tag())?,
    };
    let dtype = match dtype {
        Some(dtype) => dtype,
        None => Enforcer::check_dtype(x.dtype_tag())?,
    };
    zeros(dtype, shape, order)
}

/// [`zeros_like`] with overrides given as an optional JSON object.
pub fn zeros_like_json<A: ArrayLike + ?Sized>(
    x: &A,
    options: Option<&Value>,
) -> Result<NdArray, LayoutError> {
    let options = options
        .map(ZerosLikeOptions::from_json)
        .transpose()?
        .unwrap_or_default();
    zeros_like(x, options)
}
