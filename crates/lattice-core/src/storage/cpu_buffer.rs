use num::Complex;

use crate::{DType, LayoutError, Scalar, TensorDType};

use std::{alloc::Layout, fmt::Debug};

/// One zero-initialised heap allocation.
///
/// A zero-sized layout never touches the allocator and holds a null pointer.
#[derive(Debug, PartialEq, Eq)]
pub struct RawCPUBuffer(*mut u8, Layout);

impl RawCPUBuffer {
    pub fn into_raw_parts(&self) -> (*mut u8, Layout) {
        (self.0, self.1)
    }

    pub fn n_bytes(&self) -> usize {
        self.1.size()
    }

    pub fn as_bytes(&self) -> &[u8] {
        if self.0.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.0, self.1.size()) }
    }

    /// Allocates `size` zeroed bytes. Allocator exhaustion is returned as
    /// [`LayoutError::BufferTooLarge`] and leaves nothing allocated.
    pub fn zeroed(size: usize, alignment: usize) -> Result<Self, LayoutError> {
        let layout = Layout::from_size_align(size, alignment)
            .map_err(|_| LayoutError::BufferTooLarge { bytes: Some(size) })?;
        let data = if size == 0 {
            std::ptr::null_mut()
        } else {
            let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
            if ptr.is_null() {
                log::warn!("Allocator refused {} bytes", size);
                return Err(LayoutError::BufferTooLarge { bytes: Some(size) });
            }
            ptr
        };
        log::trace!("Zeroed {} bytes at {:p}", size, data);
        Ok(Self(data, layout))
    }
}

impl Clone for RawCPUBuffer {
    fn clone(&self) -> Self {
        let (ptr, layout) = self.into_raw_parts();
        let data = if layout.size() == 0 {
            std::ptr::null_mut()
        } else {
            let data = unsafe { std::alloc::alloc(layout) };
            if data.is_null() {
                std::alloc::handle_alloc_error(layout);
            }
            unsafe { ptr.copy_to_nonoverlapping(data, layout.size()) };
            data
        };
        log::trace!("Cloning: {:p} -> {:p}", ptr, data);
        Self(data, layout)
    }
}

impl Drop for RawCPUBuffer {
    fn drop(&mut self) {
        if !self.0.is_null() && self.1.size() > 0 {
            unsafe { std::alloc::dealloc(self.0, self.1) }
        }
    }
}

/// Homogeneous numeric storage for every dtype except `generic`.
///
/// `len` counts logical elements; complex dtypes interleave real and imaginary
/// parts, so they occupy `2 * len` storage slots.
#[derive(Clone)]
pub struct CPUBuffer {
    inner: RawCPUBuffer,
    dtype: DType,
    len: usize,
}

unsafe impl Send for CPUBuffer {}
unsafe impl Sync for CPUBuffer {}

impl CPUBuffer {
    pub(crate) fn zeros(dtype: DType, len: usize) -> Result<Self, LayoutError> {
        let slot_size = dtype.size_of().max(1);
        let n_bytes = len
            .checked_mul(dtype.storage_multiplier())
            .and_then(|slots| slots.checked_mul(slot_size))
            .ok_or(LayoutError::BufferTooLarge { bytes: None })?;
        let inner = RawCPUBuffer::zeroed(n_bytes, slot_size)?;
        Ok(Self { inner, dtype, len })
    }

    pub fn inner(&self) -> &RawCPUBuffer {
        &self.inner
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn n_slots(&self) -> usize {
        self.len * self.dtype.storage_multiplier()
    }

    pub fn n_bytes(&self) -> usize {
        self.inner.n_bytes()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Storage slots viewed as `T`, if `T` is the dtype's slot type.
    pub fn as_slice<T: TensorDType>(&self) -> Option<&[T]> {
        if T::dt() != self.dtype.storage_type() {
            return None;
        }
        let bytes = self.as_bytes();
        if bytes.is_empty() {
            return Some(&[]);
        }
        bytemuck::try_cast_slice(bytes).ok()
    }

    /// Reads the logical element at `index`.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        fn slot<T: TensorDType>(buf: &CPUBuffer, index: usize) -> Option<T> {
            buf.as_slice::<T>()?.get(index).copied()
        }

        fn pair<T: TensorDType>(buf: &CPUBuffer, index: usize) -> Option<Complex<T>> {
            let slots = buf.as_slice::<T>()?;
            let re = *slots.get(2 * index)?;
            let im = *slots.get(2 * index + 1)?;
            Some(Complex::new(re, im))
        }

        match self.dtype {
            DType::F64 => slot(self, index).map(Scalar::F64),
            DType::F32 => slot(self, index).map(Scalar::F32),
            DType::I32 => slot(self, index).map(Scalar::I32),
            DType::U32 => slot(self, index).map(Scalar::U32),
            DType::I16 => slot(self, index).map(Scalar::I16),
            DType::U16 => slot(self, index).map(Scalar::U16),
            DType::I8 => slot(self, index).map(Scalar::I8),
            DType::U8 => slot(self, index).map(Scalar::U8),
            DType::U8C => slot(self, index).map(Scalar::U8C),
            DType::C128 => pair(self, index).map(Scalar::C128),
            DType::C64 => pair(self, index).map(Scalar::C64),
            DType::Generic => None,
        }
    }

    pub fn dump(&self, full: bool) -> String {
        fn dump_inner<T: TensorDType>(data: &[T], full: bool) -> String {
            let length = if data.len() < 64 { data.len() } else { 64 };
            if full || data.len() <= 2 * length {
                format!("{:?}", data)
            } else {
                format!("{:?}...{:?}", &data[..length], &data[data.len() - length..])
            }
        }
        match self.dtype.storage_type() {
            DType::F64 => self.as_slice::<f64>().map(|d| dump_inner(d, full)),
            DType::F32 => self.as_slice::<f32>().map(|d| dump_inner(d, full)),
            DType::I32 => self.as_slice::<i32>().map(|d| dump_inner(d, full)),
            DType::U32 => self.as_slice::<u32>().map(|d| dump_inner(d, full)),
            DType::I16 => self.as_slice::<i16>().map(|d| dump_inner(d, full)),
            DType::U16 => self.as_slice::<u16>().map(|d| dump_inner(d, full)),
            DType::I8 => self.as_slice::<i8>().map(|d| dump_inner(d, full)),
            DType::U8 => self.as_slice::<u8>().map(|d| dump_inner(d, full)),
            _ => None,
        }
        .unwrap_or_default()
    }
}

impl Debug for CPUBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPUBuffer")
            .field("dtype", &self.dtype)
            .field("len", &self.len)
            .field("data", &self.dump(false))
            .finish()
    }
}

impl PartialEq for CPUBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.dtype == other.dtype && self.len == other.len && self.as_bytes() == other.as_bytes()
    }
}
