//! Interpolation of gridded fields.

pub mod cubic_hermite_spline;

use crate::{
    error::GridResult,
    grid::Grid,
    num::{fgr, BFloat},
};
use rayon::prelude::*;

/// Defines the properties of an interpolator for gridded fields.
pub trait Interpolator: Clone + Sync + Send {
    /// Computes the interpolated value and gradient of a field component at the
    /// given coordinates, wrapping around any periodic boundaries.
    ///
    /// # Parameters
    ///
    /// - `grid`: Grid holding the field.
    /// - `interp_point`: Coordinates where the interpolated value should be computed.
    /// - `component`: Index of the field component to interpolate.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the interpolated value and its partial derivative along each axis.
    /// - `Err`: The point lies outside a non-periodic boundary, the component does not
    /// exist, or the grid lacks data the interpolator needs.
    ///
    /// # Type parameters
    ///
    /// - `F`: Floating point type of the field data.
    fn interp_value_and_gradient<F>(
        &self,
        grid: &Grid<F>,
        interp_point: &[fgr],
        component: usize,
    ) -> GridResult<(fgr, Vec<fgr>)>
    where
        F: BFloat;

    /// Computes the interpolated value of a field component at the given coordinates.
    fn interp_value<F>(
        &self,
        grid: &Grid<F>,
        interp_point: &[fgr],
        component: usize,
    ) -> GridResult<fgr>
    where
        F: BFloat,
    {
        self.interp_value_and_gradient(grid, interp_point, component)
            .map(|(value, _)| value)
    }

    /// Computes the interpolated values and gradients of a field component at
    /// many points in parallel.
    ///
    /// The results are in the same order as the points. The first failing point
    /// makes the whole call fail.
    fn interp_many<F>(
        &self,
        grid: &Grid<F>,
        interp_points: &[Vec<fgr>],
        component: usize,
    ) -> GridResult<Vec<(fgr, Vec<fgr>)>>
    where
        F: BFloat,
    {
        interp_points
            .par_iter()
            .map(|interp_point| self.interp_value_and_gradient(grid, interp_point, component))
            .collect()
    }
}
