mod cpu_buffer;
mod generic_buffer;

pub use cpu_buffer::*;
pub use generic_buffer::*;

use crate::{DType, Enforcer, LayoutError, Scalar};

/// Backing storage of an [`NdArray`](crate::NdArray).
///
/// The variant is fixed at allocation time: numeric dtypes get one homogeneous
/// block, `generic` gets a sequence of dynamically typed values.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    Typed(CPUBuffer),
    Generic(GenericBuffer),
}

impl Buffer {
    /// Allocates `numel` zero-valued logical elements of `dtype`.
    pub fn zeros(dtype: DType, numel: usize) -> Result<Self, LayoutError> {
        let buffer = match dtype {
            DType::Generic => Buffer::Generic(GenericBuffer::zeros(numel)?),
            dt => Buffer::Typed(CPUBuffer::zeros(dt, numel)?),
        };
        Ok(buffer)
    }

    pub fn dtype(&self) -> DType {
        match self {
            Buffer::Typed(c) => c.dtype(),
            Buffer::Generic(_) => DType::Generic,
        }
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        match self {
            Buffer::Typed(c) => c.len(),
            Buffer::Generic(g) => g.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of physical storage slots, `len() * dtype().storage_multiplier()`.
    pub fn n_slots(&self) -> usize {
        match self {
            Buffer::Typed(c) => c.n_slots(),
            Buffer::Generic(g) => g.len(),
        }
    }

    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            Buffer::Typed(c) => c.get(index),
            Buffer::Generic(g) => g.get(index).cloned().map(Scalar::Generic),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub fn try_typed(&self) -> Option<&CPUBuffer> {
        match self {
            Buffer::Typed(c) => Some(c),
            Buffer::Generic(_) => None,
        }
    }

    pub fn try_generic(&self) -> Option<&GenericBuffer> {
        match self {
            Buffer::Generic(g) => Some(g),
            Buffer::Typed(_) => None,
        }
    }

    pub fn dump(&self, full: bool) -> String {
        match self {
            Buffer::Typed(c) => c.dump(full),
            Buffer::Generic(g) => format!("{:?}", g.as_slice()),
        }
    }
}

/// Allocates a zero-filled buffer for a dtype given by its catalog tag.
///
/// Unrecognised tags are reported as [`LayoutError::InvalidDtype`] without
/// allocating anything.
pub fn buffer(dtype: &str, numel: usize) -> Result<Buffer, LayoutError> {
    let dtype = Enforcer::check_dtype(dtype)?;
    Buffer::zeros(dtype, numel)
}
