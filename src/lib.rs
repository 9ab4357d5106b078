//! The `fieldgrid` crate provides dense regular grids for accumulating sampled
//! fields and interpolating them anywhere in the grid domain.
pub mod error;
pub mod geometry;
pub mod grid;
pub mod interpolation;
pub mod num;
pub mod report;
pub mod storage;
