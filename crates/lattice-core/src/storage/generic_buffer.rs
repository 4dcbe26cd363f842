use serde_json::Value;

use crate::LayoutError;

/// Dynamically typed storage backing the `generic` dtype.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericBuffer(Vec<Value>);

impl GenericBuffer {
    /// `len` copies of the number `0`. A length the allocator cannot hold is
    /// returned as [`LayoutError::BufferTooLarge`].
    pub fn zeros(len: usize) -> Result<Self, LayoutError> {
        let bytes = len
            .checked_mul(std::mem::size_of::<Value>())
            .filter(|&bytes| bytes <= isize::MAX as usize);
        let Some(bytes) = bytes else {
            return Err(LayoutError::BufferTooLarge { bytes: None });
        };
        let mut values = Vec::new();
        values
            .try_reserve_exact(len)
            .map_err(|_| LayoutError::BufferTooLarge { bytes: Some(bytes) })?;
        values.resize(len, Value::from(0));
        log::trace!("Zeroed {} generic elements", len);
        Ok(Self(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }
}

impl From<Vec<Value>> for GenericBuffer {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}
