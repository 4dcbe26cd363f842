use crate::{Enforcer, LayoutError, Order, RVec, Shape};
use serde::Serialize;

/// Per-dimension step sizes, in elements.
#[derive(Clone, PartialEq, Eq, Default, Hash, Serialize)]
pub struct Strides(RVec<isize>);

impl Strides {
    pub fn new(strides: RVec<isize>) -> Self {
        Self(strides)
    }

    /// Standard strides for `shape` laid out in `order`.
    ///
    /// Products saturate: they can only exceed `isize::MAX` when some extent is
    /// zero, and then the array has no element to address.
    pub fn from_shape(shape: &Shape, order: Order) -> Self {
        fn step(stride: isize, size: usize) -> isize {
            stride.saturating_mul(isize::try_from(size).unwrap_or(isize::MAX))
        }

        let mut strides: RVec<isize> = RVec::with_capacity(shape.rank());
        let mut stride = 1isize;
        match order {
            Order::RowMajor => {
                for size in shape.inner().iter().rev() {
                    strides.push(stride);
                    stride = step(stride, *size);
                }
                strides.reverse();
            }
            Order::ColumnMajor => {
                for size in shape.iter() {
                    strides.push(stride);
                    stride = step(stride, *size);
                }
            }
        }
        Self(strides)
    }

    pub fn to_vec(&self) -> Vec<isize> {
        self.0.to_vec()
    }

    pub fn as_slice(&self) -> &[isize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &isize> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Strides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(first) = self.0.first() else {
            return write!(f, "[]");
        };
        let mut strides = format!("[{}", first);
        for stride in self.0.iter().skip(1) {
            strides.push_str(&format!("x{}", stride));
        }
        write!(f, "{}]", strides)
    }
}

impl std::ops::Index<usize> for Strides {
    type Output = isize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<&Shape> for Strides {
    fn from(shape: &Shape) -> Self {
        Self::from_shape(shape, Order::RowMajor)
    }
}

impl From<Vec<isize>> for Strides {
    fn from(strides: Vec<isize>) -> Self {
        Self(strides.into())
    }
}

impl From<&[isize]> for Strides {
    fn from(slice: &[isize]) -> Self {
        Self(slice.into())
    }
}

pub fn shape2strides(shape: &Shape, order: Order) -> Strides {
    Strides::from_shape(shape, order)
}

/// Linear index of the logical origin for `shape` traversed with `strides`.
///
/// Each dimension with a negative stride moves the origin to that dimension's
/// last element, so every valid multi-index maps to a non-negative position.
pub fn strides2offset(shape: &Shape, strides: &Strides) -> Result<usize, LayoutError> {
    Enforcer::check_strides_len(shape, strides)?;
    let offset = shape
        .iter()
        .zip(strides.iter())
        .filter(|(_, stride)| **stride < 0)
        .map(|(&dim, &stride)| dim.saturating_sub(1).saturating_mul(stride.unsigned_abs()))
        .fold(0usize, usize::saturating_add);
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;
    use proptest::prelude::*;
    use test_strategy::proptest;

    #[test]
    fn test_strides() {
        let shape = shape![2, 3, 4];
        let strides = Strides::from(&shape);
        assert_eq!(strides.to_vec(), vec![12, 4, 1]);
    }

    #[test]
    fn column_major_strides() {
        let strides = shape2strides(&shape![2, 3, 4], Order::ColumnMajor);
        assert_eq!(strides.to_vec(), vec![1, 2, 6]);
    }

    #[test]
    fn unit_dims_keep_their_stride() {
        assert_eq!(
            shape2strides(&shape![3, 1, 2], Order::RowMajor).to_vec(),
            vec![2, 2, 1]
        );
        assert_eq!(
            shape2strides(&shape![3, 1, 2], Order::ColumnMajor).to_vec(),
            vec![1, 3, 3]
        );
    }

    #[test]
    fn zero_extent_carries_through() {
        assert_eq!(
            shape2strides(&shape![2, 0, 3], Order::RowMajor).to_vec(),
            vec![0, 3, 1]
        );
        assert_eq!(
            shape2strides(&shape![2, 0, 3], Order::ColumnMajor).to_vec(),
            vec![1, 2, 0]
        );
    }

    #[test]
    fn zero_dimensional() {
        assert!(shape2strides(&shape![], Order::RowMajor).is_empty());
        assert_eq!(strides2offset(&shape![], &Strides::default()).unwrap(), 0);
    }

    #[test]
    fn debug_fmt() {
        assert_eq!(format!("{:?}", Strides::from(vec![12, 4, 1])), "[12x4x1]");
        assert_eq!(format!("{:?}", Strides::default()), "[]");
    }

    #[test]
    fn negative_stride_offset() {
        let shape = shape![2, 3];
        let strides = Strides::from(vec![-3, 1]);
        assert_eq!(strides2offset(&shape, &strides).unwrap(), 3);

        let strides = Strides::from(vec![-3, -1]);
        assert_eq!(strides2offset(&shape, &strides).unwrap(), 5);

        let strides = Strides::from(vec![3, -1]);
        assert_eq!(strides2offset(&shape, &strides).unwrap(), 2);
    }

    #[test]
    fn negative_stride_over_empty_dim() {
        let strides = Strides::from(vec![-1, 1]);
        assert_eq!(strides2offset(&shape![0, 4], &strides).unwrap(), 0);
    }

    #[test]
    fn offset_length_mismatch() {
        let err = strides2offset(&shape![2, 2], &Strides::from(vec![1])).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::ShapeStridesLengthMismatch {
                shape: 2,
                strides: 1
            }
        ));
    }

    #[proptest(cases = 64)]
    fn standard_strides_have_zero_offset(
        #[strategy(proptest::collection::vec(0..8usize, 0..5))] dims: Vec<usize>,
        column_major: bool,
    ) {
        let order = if column_major {
            Order::ColumnMajor
        } else {
            Order::RowMajor
        };
        let shape = Shape::from(dims);
        let strides = shape2strides(&shape, order);
        prop_assert_eq!(strides.len(), shape.len());
        prop_assert!(strides.iter().all(|&s| s >= 0));
        prop_assert_eq!(strides2offset(&shape, &strides).unwrap(), 0);
    }

    #[proptest(cases = 64)]
    fn strides_follow_recurrence(
        #[strategy(proptest::collection::vec(0..8usize, 1..5))] dims: Vec<usize>,
    ) {
        let shape = Shape::from(dims);
        let n = shape.len();
        let row = shape2strides(&shape, Order::RowMajor);
        let col = shape2strides(&shape, Order::ColumnMajor);
        prop_assert_eq!(row[n - 1], 1);
        prop_assert_eq!(col[0], 1);
        for i in 0..n - 1 {
            prop_assert_eq!(row[i], row[i + 1] * shape[i + 1] as isize);
            prop_assert_eq!(col[i + 1], col[i] * shape[i] as isize);
        }
    }
}
