//! Conversion between flat indices, multi-indices and coordinates.

use super::GridGeometry;
use crate::{
    error::{GridError, GridResult},
    num::{fgr, snap_to_integer, wrap_periodic_offset},
};

/// Coordinates of a grid point together with its flat index and multi-index.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPoint {
    pub index: usize,
    pub indices: Vec<usize>,
    pub coords: Vec<fgr>,
}

/// The grid cell containing a point, given by the multi-index of its lower
/// corner and the fractional position of the point inside the cell along
/// each axis, in the range `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    pub indices: Vec<usize>,
    pub offsets: Vec<fgr>,
}

/// Converts a flat index into a multi-index for a grid with the given shape,
/// with the first axis varying fastest.
pub fn convert_index_to_indices(index: usize, shape: &[usize], indices: &mut [usize]) {
    let mut remainder = index;
    for (dim, &size) in shape.iter().enumerate() {
        indices[dim] = remainder % size;
        remainder /= size;
    }
}

impl GridGeometry {
    /// Points along a non-periodic axis this far outside the bounds,
    /// in units of the grid spacing, are moved onto the boundary.
    pub const BOUNDARY_TOLERANCE: fgr = 1e-6;

    fn require_bounds(&self) -> GridResult<()> {
        if self.has_bounds() {
            Ok(())
        } else {
            Err(GridError::invariant("Grid bounds have not been set"))
        }
    }

    fn check_point_dimension(&self, point: &[fgr]) -> GridResult<()> {
        if point.len() == self.dimension() {
            Ok(())
        } else {
            Err(GridError::index(format!(
                "Point has {} coordinates but grid is {}D",
                point.len(),
                self.dimension()
            )))
        }
    }

    /// Computes the position of a coordinate along an axis in units of the grid
    /// spacing, measured from the lower bound.
    ///
    /// Periodic coordinates are wrapped into `[0, n)`. Non-periodic coordinates
    /// within the boundary tolerance are clamped into `[0, n - 1]`, and farther
    /// out is an error.
    fn scaled_offset(&self, dim: usize, coord: fgr) -> GridResult<fgr> {
        if !coord.is_finite() {
            return Err(GridError::domain(format!(
                "Coordinate {} along axis {} is not finite",
                coord, dim
            )));
        }
        let size = self.shape[dim];
        let spacing = self.cell_extents[dim];
        let offset = coord - self.lower_bounds[dim];

        if self.is_periodic[dim] {
            let scaled = snap_to_integer(wrap_periodic_offset(offset, self.extent(dim)) / spacing);
            Ok(if scaled >= size as fgr { 0.0 } else { scaled })
        } else {
            let scaled = snap_to_integer(offset / spacing);
            let last = (size - 1) as fgr;
            if scaled < -Self::BOUNDARY_TOLERANCE || scaled > last + Self::BOUNDARY_TOLERANCE {
                Err(GridError::domain(format!(
                    "Coordinate {} is outside [{}, {}] along axis {}",
                    coord, self.lower_bounds[dim], self.upper_bounds[dim], dim
                )))
            } else {
                Ok(scaled.max(0.0).min(last))
            }
        }
    }

    /// Computes the multi-index of the given flat index.
    pub fn indices_from_index(&self, index: usize) -> GridResult<Vec<usize>> {
        self.require_bounds()?;
        if index >= self.number_of_points {
            return Err(GridError::index(format!(
                "Grid point {} requested but grid has {} points",
                index, self.number_of_points
            )));
        }
        let mut indices = vec![0; self.dimension()];
        convert_index_to_indices(index, &self.shape, &mut indices);
        Ok(indices)
    }

    /// Computes the flat index of the given multi-index.
    pub fn index_from_indices(&self, indices: &[usize]) -> GridResult<usize> {
        self.require_bounds()?;
        if indices.len() != self.dimension() {
            return Err(GridError::index(format!(
                "Got {} indices for a {}D grid",
                indices.len(),
                self.dimension()
            )));
        }
        let mut index = 0;
        for (dim, &idx) in indices.iter().enumerate() {
            if idx >= self.shape[dim] {
                return Err(GridError::index(format!(
                    "Index {} along axis {} exceeds size {}",
                    idx, dim, self.shape[dim]
                )));
            }
            index += idx * self.strides[dim];
        }
        Ok(index)
    }

    /// Computes the multi-index of the grid point at or below the given
    /// coordinates, wrapping around periodic axes.
    pub fn indices_from_point(&self, point: &[fgr]) -> GridResult<Vec<usize>> {
        self.require_bounds()?;
        self.check_point_dimension(point)?;
        point
            .iter()
            .enumerate()
            .map(|(dim, &coord)| Ok(self.scaled_offset(dim, coord)?.floor() as usize))
            .collect()
    }

    /// Computes the flat index of the grid point at or below the given coordinates.
    pub fn index_from_point(&self, point: &[fgr]) -> GridResult<usize> {
        let indices = self.indices_from_point(point)?;
        self.index_from_indices(&indices)
    }

    /// Computes the coordinates of the grid point with the given flat index.
    pub fn grid_point(&self, index: usize) -> GridResult<GridPoint> {
        let indices = self.indices_from_index(index)?;
        let coords = indices
            .iter()
            .enumerate()
            .map(|(dim, &idx)| self.lower_bounds[dim] + (idx as fgr) * self.cell_extents[dim])
            .collect();
        Ok(GridPoint {
            index,
            indices,
            coords,
        })
    }

    /// Returns the given point with periodic coordinates wrapped into
    /// `[min, max)` and non-periodic coordinates within the boundary
    /// tolerance moved onto the boundary.
    pub fn wrap_point(&self, point: &[fgr]) -> GridResult<Vec<fgr>> {
        self.require_bounds()?;
        self.check_point_dimension(point)?;
        point
            .iter()
            .enumerate()
            .map(|(dim, &coord)| {
                Ok(self.lower_bounds[dim]
                    + self.scaled_offset(dim, coord)? * self.cell_extents[dim])
            })
            .collect()
    }

    /// Finds the grid cell containing the given point, wrapping around periodic axes.
    ///
    /// Along a non-periodic axis a point on the upper boundary is assigned to the
    /// last cell, with an offset of one.
    pub fn find_grid_cell(&self, point: &[fgr]) -> GridResult<GridCell> {
        self.require_bounds()?;
        self.check_point_dimension(point)?;
        let dimension = self.dimension();
        let mut indices = Vec::with_capacity(dimension);
        let mut offsets = Vec::with_capacity(dimension);
        for (dim, &coord) in point.iter().enumerate() {
            let scaled = self.scaled_offset(dim, coord)?;
            let mut idx = scaled.floor() as usize;
            if !self.is_periodic[dim] && idx == self.shape[dim] - 1 {
                idx -= 1;
            }
            indices.push(idx);
            offsets.push((scaled - idx as fgr).max(0.0).min(1.0));
        }
        Ok(GridCell { indices, offsets })
    }
}
