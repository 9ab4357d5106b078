//! Enumeration of grid points in the neighborhood of a point or cell.

use super::{indexing::convert_index_to_indices, GridGeometry};
use crate::{
    error::{GridError, GridResult},
    num::fgr,
};

impl GridGeometry {
    /// Finds the flat indices of all grid points in an axis-aligned window
    /// around the grid point at or below the given coordinates.
    ///
    /// See `neighbors_of_indices` for how the window is formed.
    pub fn neighbors(&self, point: &[fgr], half_widths: &[usize]) -> GridResult<Vec<usize>> {
        let indices = self.indices_from_point(point)?;
        self.neighbors_of_indices(&indices, half_widths)
    }

    /// Finds the flat indices of all grid points whose multi-index differs from
    /// the given one by at most `half_widths[i]` along each axis `i`.
    ///
    /// Along periodic axes the window wraps around, so windows wider than the
    /// axis visit some points more than once. These duplicates are kept, so
    /// that each entry corresponds to one offset within the window. Periodic
    /// half widths larger than the axis size are reduced to the axis size.
    /// Along non-periodic axes the window is truncated at the boundaries.
    ///
    /// The first axis varies fastest in the returned list.
    pub fn neighbors_of_indices(
        &self,
        indices: &[usize],
        half_widths: &[usize],
    ) -> GridResult<Vec<usize>> {
        let center = self.index_from_indices(indices)?;
        let dimension = self.dimension();
        if half_widths.len() != dimension {
            return Err(GridError::index(format!(
                "Got {} half widths for a {}D grid",
                half_widths.len(),
                dimension
            )));
        }

        let windows: Vec<Vec<usize>> = (0..dimension)
            .map(|dim| self.window_along_axis(dim, indices[dim], half_widths[dim]))
            .collect();
        let window_shape: Vec<usize> = windows.iter().map(Vec::len).collect();
        let number_of_neighbors: usize = window_shape.iter().product();

        let mut window_indices = vec![0; dimension];
        let mut neighbors: Vec<usize> = Vec::with_capacity(number_of_neighbors);
        for window_index in 0..number_of_neighbors {
            convert_index_to_indices(window_index, &window_shape, &mut window_indices);
            neighbors.push(
                window_indices
                    .iter()
                    .enumerate()
                    .map(|(dim, &offset)| windows[dim][offset] * self.strides[dim])
                    .sum(),
            );
        }
        debug_assert!(number_of_neighbors == 0 || neighbors.contains(&center));
        Ok(neighbors)
    }

    fn window_along_axis(&self, dim: usize, idx: usize, half_width: usize) -> Vec<usize> {
        let size = self.shape[dim];
        if self.is_periodic[dim] {
            let half_width = usize::min(half_width, size);
            let start = idx + size - half_width;
            (0..=2 * half_width)
                .map(|offset| (start + offset) % size)
                .collect()
        } else {
            let start = idx.saturating_sub(half_width);
            let end = usize::min(idx.saturating_add(half_width), size - 1);
            (start..=end).collect()
        }
    }

    /// Finds the flat indices of the `2^dimension` corners of the grid cell whose
    /// lower corner has the given flat index.
    ///
    /// Corner `i` is offset by one along axis `j` if bit `j` of `i` is set.
    /// Along periodic axes the upper corner wraps around to the first point,
    /// which for an axis with a single point makes both corners coincide.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the corner indices.
    /// - `Err`: The cell index is invalid, or the cell would extend past a non-periodic boundary.
    pub fn spline_neighbors(&self, cell_index: usize) -> GridResult<Vec<usize>> {
        let lower_corner = self.indices_from_index(cell_index)?;
        let dimension = self.dimension();

        let mut upper_corner = Vec::with_capacity(dimension);
        for (dim, &idx) in lower_corner.iter().enumerate() {
            let upper = idx + 1;
            if upper < self.shape[dim] {
                upper_corner.push(upper);
            } else if self.is_periodic[dim] {
                upper_corner.push(0);
            } else {
                return Err(GridError::index(format!(
                    "Grid point {} lies on the upper boundary along axis {} and has no cell above it",
                    cell_index, dim
                )));
            }
        }

        Ok((0..1usize << dimension)
            .map(|corner| {
                (0..dimension)
                    .map(|dim| {
                        let idx = if (corner >> dim) & 1 == 0 {
                            lower_corner[dim]
                        } else {
                            upper_corner[dim]
                        };
                        idx * self.strides[dim]
                    })
                    .sum::<usize>()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn create_geometry(is_periodic: Vec<bool>, shape: &[usize]) -> GridGeometry {
        let dimension = is_periodic.len();
        let mut geometry = GridGeometry::new(is_periodic);
        geometry
            .set_bounds(&vec!["0"; dimension][..], &vec!["1"; dimension][..], shape, &[])
            .unwrap();
        geometry
    }

    #[test]
    fn non_periodic_window_is_truncated() {
        let geometry = create_geometry(vec![false, false], &[5, 4]);
        let neighbors = geometry.neighbors_of_indices(&[0, 2], &[1, 1]).unwrap();
        assert_eq!(neighbors, vec![5, 6, 10, 11, 15, 16]);

        let neighbors = geometry.neighbors_of_indices(&[4, 3], &[2, 0]).unwrap();
        assert_eq!(neighbors, vec![17, 18, 19]);
    }

    #[test]
    fn periodic_window_wraps_and_keeps_duplicates() {
        let geometry = create_geometry(vec![true], &[4]);
        let neighbors = geometry.neighbors_of_indices(&[0], &[1]).unwrap();
        assert_eq!(neighbors, vec![3, 0, 1]);

        let neighbors = geometry.neighbors_of_indices(&[1], &[3]).unwrap();
        assert_eq!(neighbors, vec![2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn windows_wider_than_the_axis_are_limited() {
        let geometry = create_geometry(vec![false], &[4]);
        let neighbors = geometry.neighbors(&[0.5], &[usize::MAX]).unwrap();
        assert_eq!(neighbors, vec![0, 1, 2, 3]);

        let geometry = create_geometry(vec![true], &[3]);
        let neighbors = geometry.neighbors_of_indices(&[1], &[usize::MAX]).unwrap();
        assert_eq!(neighbors, vec![1, 2, 0, 1, 2, 0, 1]);

        let geometry = create_geometry(vec![true, false], &[2, 3]);
        let neighbors = geometry
            .neighbors_of_indices(&[0, 1], &[usize::MAX, usize::MAX])
            .unwrap();
        assert_eq!(neighbors.len(), 5 * 3);
        assert_eq!(&neighbors[..5], &[0, 1, 0, 1, 0]);
    }

    #[test]
    fn neighbors_of_point_use_containing_grid_point() {
        let geometry = create_geometry(vec![true, false], &[4, 3]);
        let neighbors = geometry.neighbors(&[1.1, 0.74], &[1, 1]).unwrap();
        assert_eq!(neighbors, vec![3, 0, 1, 7, 4, 5, 11, 8, 9]);
        assert!(geometry.neighbors(&[0.1, 0.1], &[1]).is_err());
    }

    #[test]
    fn spline_stencil_has_all_cell_corners() {
        let geometry = create_geometry(vec![false, true], &[3, 2]);
        assert_eq!(geometry.spline_neighbors(0).unwrap(), vec![0, 1, 3, 4]);
        assert_eq!(geometry.spline_neighbors(4).unwrap(), vec![4, 5, 1, 2]);
        assert!(geometry.spline_neighbors(2).unwrap_err().is_bounds_error());
        assert!(geometry.spline_neighbors(6).unwrap_err().is_bounds_error());

        let geometry = create_geometry(vec![true], &[1]);
        assert_eq!(geometry.spline_neighbors(0).unwrap(), vec![0, 0]);
    }
}
