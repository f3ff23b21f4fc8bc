//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellReference`] - A location plus `$` fixed markers per axis
//! - [`CellRange`] - A rectangular range of cells (e.g., "A1:B10")
//! - [`CellValue`] and [`ErrorCode`] - Scalars and error codes

mod address;
mod value;

pub use address::{
    adjust_range, adjust_reference, expand_range, format_address, parse_address, CellAddress,
    CellRange, CellRangeIterator, CellReference, StructuralEdit,
};
pub use value::{CellValue, ErrorCode};
