//! # gridcalc-core
//!
//! Core data structures for the gridcalc formula engine.
//!
//! This crate provides the fundamental types used throughout gridcalc:
//! - [`CellAddress`], [`CellReference`] and [`CellRange`] - Cell addressing and ranges
//! - [`CellValue`] - The scalar a literal cell holds or a formula produces
//! - [`ErrorCode`] - The externally visible error vocabulary (`#CYCLE!`, `#REF!`, ...)
//! - [`StructuralEdit`] - Row/column insertion and deletion for reference adjustment
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellAddress, CellReference, CellRange};
//!
//! let reference = CellReference::parse("$B$2").unwrap();
//! assert_eq!(reference.address, CellAddress::new(1, 1));
//! assert!(reference.col_fixed && reference.row_fixed);
//!
//! let range = CellRange::parse("A1:B2").unwrap();
//! assert_eq!(range.cells().count(), 4);
//! ```

pub mod cell;
pub mod error;

// Re-exports for convenience
pub use cell::{
    adjust_range, adjust_reference, expand_range, format_address, parse_address, CellAddress,
    CellRange, CellReference, CellValue, ErrorCode, StructuralEdit,
};
pub use error::{Error, Result};

/// Maximum number of rows a sheet may have
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns a sheet may have
pub const MAX_COLS: u32 = 16_384;

/// Row extent of a newly created sheet
pub const DEFAULT_ROWS: u32 = 1000;

/// Column extent of a newly created sheet (A-Z)
pub const DEFAULT_COLS: u32 = 26;
