//! Interpolation with a cubic Hermite spline.

use super::Interpolator;
use crate::{
    error::{GridError, GridResult},
    grid::Grid,
    num::{fgr, to_fgr, BFloat},
};

/// Scheme for computing tangents at interpolation points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TangentScheme {
    /// Use the partial derivatives stored on the grid.
    StoredDerivatives,
    /// Estimate the tangents from the values at adjacent grid points.
    FiniteDifference,
}

/// How finite difference tangents should be chosen at non-periodic boundaries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryTangents {
    Computed,
    Zero,
}

/// Configuration parameters for cubic Hermite spline interpolators.
#[derive(Clone, Debug)]
pub struct CubicHermiteSplineInterpolatorConfig {
    /// Scheme for computing tangents at interpolation points.
    pub tangent_scheme: TangentScheme,
    /// How tangents should be chosen at the boundaries.
    pub boundary_tangents: BoundaryTangents,
}

/// An interpolator blending the values and tangents at the corners of the grid
/// cell containing the interpolation point with a cubic Hermite spline along
/// each axis.
///
/// Cross derivatives are taken as zero, so the interpolant reproduces the values
/// and tangents at the grid points and reduces to the ordinary cubic Hermite
/// spline along any single axis.
#[derive(Clone, Debug)]
pub struct CubicHermiteSplineInterpolator {
    config: CubicHermiteSplineInterpolatorConfig,
}

/// Hermite basis function values and slopes along one axis for one corner.
struct AxisWeights {
    value: fgr,
    value_slope: fgr,
    tangent: fgr,
    tangent_slope: fgr,
}

impl CubicHermiteSplineInterpolator {
    /// Creates a new cubic Hermite spline interpolator.
    pub fn new(config: CubicHermiteSplineInterpolatorConfig) -> Self {
        Self { config }
    }

    fn hermite_basis_00(t: fgr) -> fgr {
        (1.0 + 2.0 * t) * fgr::powi(1.0 - t, 2)
    }

    fn hermite_basis_10(t: fgr) -> fgr {
        t * fgr::powi(1.0 - t, 2)
    }

    fn hermite_basis_01(t: fgr) -> fgr {
        t * t * (3.0 - 2.0 * t)
    }

    fn hermite_basis_11(t: fgr) -> fgr {
        t * t * (t - 1.0)
    }

    fn hermite_basis_00_slope(t: fgr) -> fgr {
        6.0 * t * (t - 1.0)
    }

    fn hermite_basis_10_slope(t: fgr) -> fgr {
        (1.0 - t) * (1.0 - 3.0 * t)
    }

    fn hermite_basis_01_slope(t: fgr) -> fgr {
        6.0 * t * (1.0 - t)
    }

    fn hermite_basis_11_slope(t: fgr) -> fgr {
        t * (3.0 * t - 2.0)
    }

    fn axis_weights(t: fgr, is_upper_corner: bool) -> AxisWeights {
        if is_upper_corner {
            AxisWeights {
                value: Self::hermite_basis_01(t),
                value_slope: Self::hermite_basis_01_slope(t),
                tangent: Self::hermite_basis_11(t),
                tangent_slope: Self::hermite_basis_11_slope(t),
            }
        } else {
            AxisWeights {
                value: Self::hermite_basis_00(t),
                value_slope: Self::hermite_basis_00_slope(t),
                tangent: Self::hermite_basis_10(t),
                tangent_slope: Self::hermite_basis_10_slope(t),
            }
        }
    }

    fn value_at<F: BFloat>(grid: &Grid<F>, index: usize, quantity: usize) -> GridResult<fgr> {
        Ok(to_fgr(grid.grid_element(index, quantity)?))
    }

    fn compute_tangent<F>(
        &self,
        grid: &Grid<F>,
        component: usize,
        index: usize,
        dim: usize,
    ) -> GridResult<fgr>
    where
        F: BFloat,
    {
        match self.config.tangent_scheme {
            TangentScheme::StoredDerivatives => {
                Self::value_at(grid, index, grid.derivative_quantity(component, dim)?)
            }
            TangentScheme::FiniteDifference => {
                self.compute_finite_difference_tangent(grid, component, index, dim)
            }
        }
    }

    fn compute_finite_difference_tangent<F>(
        &self,
        grid: &Grid<F>,
        component: usize,
        index: usize,
        dim: usize,
    ) -> GridResult<fgr>
    where
        F: BFloat,
    {
        let quantity = grid.value_quantity(component)?;
        let size = grid.shape()[dim];
        let stride = grid.geometry().strides()[dim];
        let spacing = grid.grid_spacing()[dim];
        let idx = grid.indices_from_index(index)?[dim];
        // Flat index of the point shifted to `shifted` along this axis
        let shifted_index = |shifted: usize| index - idx * stride + shifted * stride;

        if size < 2 {
            return Ok(0.0);
        }
        if grid.is_periodic(dim) {
            let lower = Self::value_at(grid, shifted_index((idx + size - 1) % size), quantity)?;
            let upper = Self::value_at(grid, shifted_index((idx + 1) % size), quantity)?;
            return Ok((upper - lower) / (2.0 * spacing));
        }

        if idx == 0 || idx == size - 1 {
            match self.config.boundary_tangents {
                BoundaryTangents::Zero => Ok(0.0),
                BoundaryTangents::Computed => {
                    let (lower_idx, upper_idx) = if idx == 0 { (0, 1) } else { (idx - 1, idx) };
                    let lower = Self::value_at(grid, shifted_index(lower_idx), quantity)?;
                    let upper = Self::value_at(grid, shifted_index(upper_idx), quantity)?;
                    Ok((upper - lower) / spacing)
                }
            }
        } else {
            let lower = Self::value_at(grid, shifted_index(idx - 1), quantity)?;
            let upper = Self::value_at(grid, shifted_index(idx + 1), quantity)?;
            Ok((upper - lower) / (2.0 * spacing))
        }
    }

    fn interp<F>(
        &self,
        grid: &Grid<F>,
        interp_point: &[fgr],
        component: usize,
    ) -> GridResult<(fgr, Vec<fgr>)>
    where
        F: BFloat,
    {
        let value_quantity = grid.value_quantity(component)?;
        if self.config.tangent_scheme == TangentScheme::StoredDerivatives && grid.no_derivatives() {
            return Err(GridError::invariant(
                "Interpolation with stored derivatives requested for a grid without derivatives",
            ));
        }

        let cell = grid.find_grid_cell(interp_point)?;
        let corners = grid.spline_neighbors(grid.index_from_indices(&cell.indices)?)?;
        let spacing = grid.grid_spacing();
        let dimension = grid.dimension();

        let mut value = 0.0;
        let mut gradient = vec![0.0; dimension];

        for (corner, &corner_index) in corners.iter().enumerate() {
            let corner_value = Self::value_at(grid, corner_index, value_quantity)?;
            let scaled_tangents = (0..dimension)
                .map(|dim| {
                    Ok(spacing[dim] * self.compute_tangent(grid, component, corner_index, dim)?)
                })
                .collect::<GridResult<Vec<fgr>>>()?;
            let weights: Vec<AxisWeights> = (0..dimension)
                .map(|dim| Self::axis_weights(cell.offsets[dim], (corner >> dim) & 1 == 1))
                .collect();

            // Product of the value weights along all axes except the excluded ones
            let value_weight_product = |excluded: &[usize]| -> fgr {
                weights
                    .iter()
                    .enumerate()
                    .filter(|(dim, _)| !excluded.contains(dim))
                    .map(|(_, weight)| weight.value)
                    .product()
            };

            value += corner_value * value_weight_product(&[]);
            for dim in 0..dimension {
                value += scaled_tangents[dim] * weights[dim].tangent * value_weight_product(&[dim]);
            }

            for (slope_dim, derivative) in gradient.iter_mut().enumerate() {
                let slope = &weights[slope_dim];
                let mut scaled_derivative = (corner_value * slope.value_slope
                    + scaled_tangents[slope_dim] * slope.tangent_slope)
                    * value_weight_product(&[slope_dim]);
                for dim in (0..dimension).filter(|&dim| dim != slope_dim) {
                    scaled_derivative += scaled_tangents[dim]
                        * weights[dim].tangent
                        * slope.value_slope
                        * value_weight_product(&[dim, slope_dim]);
                }
                *derivative += scaled_derivative / spacing[slope_dim];
            }
        }
        Ok((value, gradient))
    }
}

impl Interpolator for CubicHermiteSplineInterpolator {
    fn interp_value_and_gradient<F>(
        &self,
        grid: &Grid<F>,
        interp_point: &[fgr],
        component: usize,
    ) -> GridResult<(fgr, Vec<fgr>)>
    where
        F: BFloat,
    {
        self.interp(grid, interp_point, component)
    }
}

impl CubicHermiteSplineInterpolatorConfig {
    pub const DEFAULT_TANGENT_SCHEME: TangentScheme = TangentScheme::StoredDerivatives;
    pub const DEFAULT_BOUNDARY_TANGENTS: BoundaryTangents = BoundaryTangents::Computed;
}

impl Default for CubicHermiteSplineInterpolatorConfig {
    fn default() -> Self {
        CubicHermiteSplineInterpolatorConfig {
            tangent_scheme: Self::DEFAULT_TANGENT_SCHEME,
            boundary_tangents: Self::DEFAULT_BOUNDARY_TANGENTS,
        }
    }
}

impl Default for CubicHermiteSplineInterpolator {
    fn default() -> Self {
        Self::new(CubicHermiteSplineInterpolatorConfig::default())
    }
}
