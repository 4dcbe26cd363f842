mod array_like;
mod dtype;
mod enforcer;
mod order;
mod shape;
mod storage;
mod strides;
mod view;
mod zeros;

pub use array_like::*;
pub use dtype::*;
pub use enforcer::*;
pub use order::*;
pub use shape::*;
pub use storage::*;
pub use strides::*;
pub use view::*;
pub use zeros::*;

use smallvec::SmallVec;
pub type RVec<T> = SmallVec<[T; 4]>;

//https://github.com/sonos/tract/blob/main/data/src/macros.rs#L2
#[macro_export]
macro_rules! rvec {
    (@one $x:expr) => (1usize);
    ($elem:expr; $n:expr) => ({
        $crate::RVec::from_elem($elem, $n)
    });
    ($($x:expr),*$(,)*) => ({
        let count = 0usize $(+ $crate::rvec![@one $x])*;
        #[allow(unused_mut)]
        let mut vec = $crate::RVec::new();
        if count <= vec.inline_size() {
            $(vec.push($x);)*
            vec
        } else {
            $crate::RVec::from_vec(vec![$($x,)*])
        }
    });
}

#[macro_export]
macro_rules! shape {
    ($($x:expr),*$(,)*) => ({
        use $crate::rvec;
        $crate::Shape::new(rvec![$($x,)*])
    });
}

pub mod prelude {
    pub use crate::{
        rvec, shape, zeros, zeros_like, ArrayLike, DType, NdArray, Order, Shape, Strides,
        ZerosLikeOptions,
    };
}
