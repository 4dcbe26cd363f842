use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Memory order of an array.
///
/// Row-major (C-style) varies the last index fastest, column-major
/// (Fortran-style) varies the first index fastest.
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
    Serialize,
    Deserialize,
)]
pub enum Order {
    #[default]
    #[strum(to_string = "row-major")]
    #[serde(rename = "row-major")]
    RowMajor,
    #[strum(to_string = "column-major")]
    #[serde(rename = "column-major")]
    ColumnMajor,
}
