//! Geometry of regular N-dimensional grids.

pub mod indexing;
pub mod neighbors;

use crate::{
    error::{GridError, GridResult},
    num::fgr,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::f64::consts::PI;

#[cfg(feature = "serialization")]
use serde::Serialize;

lazy_static! {
    static ref PI_MULTIPLE_REGEX: Regex =
        Regex::new(r"^(?P<sign>[+-]?)(?P<factor>(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?)?\s*\*?\s*(pi|PI)$")
            .unwrap();
}

/// Parses the textual form of a grid bound.
///
/// Besides plain floating point numbers, multiples of pi like `pi`, `-pi`,
/// `2pi` and `0.5*PI` are understood.
pub fn parse_bound(text: &str) -> GridResult<fgr> {
    let text = text.trim();
    if let Ok(value) = text.parse::<fgr>() {
        if value.is_finite() {
            return Ok(value);
        }
    } else if let Some(captures) = PI_MULTIPLE_REGEX.captures(text) {
        let factor = match captures.name("factor") {
            Some(factor) => factor.as_str().parse::<fgr>().map_err(|err| {
                GridError::configuration(format!("Could not parse bound {}: {}", text, err))
            })?,
            None => 1.0,
        };
        let sign = if &captures["sign"] == "-" { -1.0 } else { 1.0 };
        return Ok(sign * factor * PI);
    }
    Err(GridError::configuration(format!(
        "Could not parse bound {}",
        text
    )))
}

/// Bounds, point counts and periodicity of a regular grid.
///
/// Along a periodic axis the `n` points lie at `min + k*dx` with `dx = (max - min)/n`,
/// so no point coincides with `max`. Along a non-periodic axis the `n` points
/// span the closed interval, `dx = (max - min)/(n - 1)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct GridGeometry {
    is_periodic: Vec<bool>,
    lower_bounds: Vec<fgr>,
    upper_bounds: Vec<fgr>,
    lower_bound_strs: Vec<String>,
    upper_bound_strs: Vec<String>,
    shape: Vec<usize>,
    cell_extents: Vec<fgr>,
    strides: Vec<usize>,
    number_of_points: usize,
}

impl GridGeometry {
    /// Creates a geometry without bounds, with one axis per periodicity flag.
    pub fn new(is_periodic: Vec<bool>) -> Self {
        let dimension = is_periodic.len();
        Self {
            is_periodic,
            lower_bounds: vec![0.0; dimension],
            upper_bounds: vec![0.0; dimension],
            lower_bound_strs: vec![String::new(); dimension],
            upper_bound_strs: vec![String::new(); dimension],
            shape: vec![0; dimension],
            cell_extents: vec![0.0; dimension],
            strides: vec![0; dimension],
            number_of_points: 0,
        }
    }

    /// Sets the bounds and resolution of the grid.
    ///
    /// # Parameters
    ///
    /// - `lower_bound_strs`: Lower bound of each axis, in textual form.
    /// - `upper_bound_strs`: Upper bound of each axis, in textual form.
    /// - `bins`: Number of grid points along each axis, or empty.
    /// - `spacing`: Target distance between grid points along each axis, or empty.
    ///
    /// At least one of `bins` and `spacing` must be given. If both are, the
    /// point count derived from the spacing must match `bins`.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: The geometry was updated.
    /// - `Err`: Contains a configuration error. The geometry is left unchanged.
    pub fn set_bounds<S: AsRef<str>>(
        &mut self,
        lower_bound_strs: &[S],
        upper_bound_strs: &[S],
        bins: &[usize],
        spacing: &[fgr],
    ) -> GridResult<()> {
        let dimension = self.dimension();
        if dimension == 0 {
            return Err(GridError::configuration("Grid has no dimensions"));
        }
        if lower_bound_strs.len() != dimension || upper_bound_strs.len() != dimension {
            return Err(GridError::configuration(format!(
                "Got {} lower and {} upper bounds for a {}D grid",
                lower_bound_strs.len(),
                upper_bound_strs.len(),
                dimension
            )));
        }
        if !bins.is_empty() && bins.len() != dimension {
            return Err(GridError::configuration(format!(
                "Got {} bin counts for a {}D grid",
                bins.len(),
                dimension
            )));
        }
        if !spacing.is_empty() && spacing.len() != dimension {
            return Err(GridError::configuration(format!(
                "Got {} grid spacings for a {}D grid",
                spacing.len(),
                dimension
            )));
        }
        if bins.is_empty() && spacing.is_empty() {
            return Err(GridError::configuration(
                "Either the number of bins or the grid spacing must be specified",
            ));
        }

        let mut lower_bounds = Vec::with_capacity(dimension);
        let mut upper_bounds = Vec::with_capacity(dimension);
        let mut shape = Vec::with_capacity(dimension);
        let mut cell_extents = Vec::with_capacity(dimension);
        let mut strides = Vec::with_capacity(dimension);
        let mut number_of_points = 1;

        for dim in 0..dimension {
            let is_periodic = self.is_periodic[dim];
            let lower = parse_bound(lower_bound_strs[dim].as_ref())?;
            let upper = parse_bound(upper_bound_strs[dim].as_ref())?;
            if lower >= upper {
                return Err(GridError::configuration(format!(
                    "Lower bound {} is not smaller than upper bound {} along axis {}",
                    lower_bound_strs[dim].as_ref(),
                    upper_bound_strs[dim].as_ref(),
                    dim
                )));
            }
            let extent = upper - lower;

            let derived_size = match spacing.get(dim) {
                Some(&spacing) => Some(Self::size_from_spacing(extent, spacing, is_periodic, dim)?),
                None => None,
            };
            let size = match (bins.get(dim), derived_size) {
                (Some(&size), Some(derived_size)) if size != derived_size => {
                    return Err(GridError::configuration(format!(
                        "Spacing {} along axis {} gives {} points, but {} were requested",
                        spacing[dim], dim, derived_size, size
                    )));
                }
                (Some(&size), _) => size,
                (None, Some(derived_size)) => derived_size,
                (None, None) => unreachable!(),
            };

            let min_size = if is_periodic { 1 } else { 2 };
            if size < min_size {
                return Err(GridError::configuration(format!(
                    "A {} axis needs at least {} point(s), got {} along axis {}",
                    if is_periodic { "periodic" } else { "non-periodic" },
                    min_size,
                    size,
                    dim
                )));
            }
            let number_of_cells = if is_periodic { size } else { size - 1 };

            lower_bounds.push(lower);
            upper_bounds.push(upper);
            cell_extents.push(extent / (number_of_cells as fgr));
            strides.push(number_of_points);
            number_of_points = usize::checked_mul(number_of_points, size).ok_or_else(|| {
                GridError::configuration(format!(
                    "Number of grid points overflows when adding axis {} with {} points",
                    dim, size
                ))
            })?;
            shape.push(size);
        }

        self.lower_bound_strs = lower_bound_strs
            .iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();
        self.upper_bound_strs = upper_bound_strs
            .iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();
        self.lower_bounds = lower_bounds;
        self.upper_bounds = upper_bounds;
        self.shape = shape;
        self.cell_extents = cell_extents;
        self.strides = strides;
        self.number_of_points = number_of_points;
        Ok(())
    }

    fn size_from_spacing(
        extent: fgr,
        spacing: fgr,
        is_periodic: bool,
        dim: usize,
    ) -> GridResult<usize> {
        if !(spacing > 0.0 && spacing.is_finite()) {
            return Err(GridError::configuration(format!(
                "Invalid grid spacing {} along axis {}",
                spacing, dim
            )));
        }
        let number_of_cells = (extent / spacing).round().max(1.0);
        // Leaves room for the extra point of a non-periodic axis
        if number_of_cells >= usize::MAX as fgr {
            return Err(GridError::configuration(format!(
                "Grid spacing {} along axis {} gives too many points",
                spacing, dim
            )));
        }
        let number_of_cells = number_of_cells as usize;
        Ok(if is_periodic {
            number_of_cells
        } else {
            number_of_cells + 1
        })
    }

    /// Returns the number of axes.
    pub fn dimension(&self) -> usize {
        self.is_periodic.len()
    }

    /// Whether bounds have been set.
    pub fn has_bounds(&self) -> bool {
        self.number_of_points > 0
    }

    /// Whether the grid is periodic along the given axis.
    pub fn is_periodic(&self, dim: usize) -> bool {
        self.is_periodic[dim]
    }

    /// Returns the periodicity flag of every axis.
    pub fn periodicity(&self) -> &[bool] {
        &self.is_periodic
    }

    /// Returns the number of grid points along each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the numerical lower bound of each axis.
    pub fn lower_bounds(&self) -> &[fgr] {
        &self.lower_bounds
    }

    /// Returns the numerical upper bound of each axis.
    pub fn upper_bounds(&self) -> &[fgr] {
        &self.upper_bounds
    }

    /// Returns the lower bounds as originally written.
    pub fn lower_bound_strs(&self) -> &[String] {
        &self.lower_bound_strs
    }

    /// Returns the upper bounds as originally written.
    pub fn upper_bound_strs(&self) -> &[String] {
        &self.upper_bound_strs
    }

    /// Returns the distance between adjacent grid points along each axis.
    pub fn grid_spacing(&self) -> &[fgr] {
        &self.cell_extents
    }

    /// Returns the flattening multiplier of each axis.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Returns the total number of grid points.
    pub fn number_of_points(&self) -> usize {
        self.number_of_points
    }

    /// Returns the distance between the lower and upper bound along the given axis.
    pub fn extent(&self, dim: usize) -> fgr {
        self.upper_bounds[dim] - self.lower_bounds[dim]
    }

    /// Returns the volume of one grid cell.
    pub fn cell_volume(&self) -> fgr {
        self.cell_extents.iter().product()
    }
}
