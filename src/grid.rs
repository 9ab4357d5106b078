//! Dense regular grids holding sampled fields and their derivatives.

use crate::{
    error::{GridError, GridResult},
    geometry::{
        indexing::{GridCell, GridPoint},
        GridGeometry,
    },
    interpolation::{cubic_hermite_spline::CubicHermiteSplineInterpolator, Interpolator},
    num::{fgr, BFloat},
    report::Verbose,
    storage::GridStorage,
};
use ndarray::prelude::*;

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Construction-time configuration of a grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct GridConfig {
    /// Name of the coordinate along each axis.
    pub coordinate_names: Vec<String>,
    /// Whether each axis is periodic.
    pub is_periodic: Vec<bool>,
    /// Name of each field component stored on the grid.
    pub component_names: Vec<String>,
    /// Whether partial derivatives are stored alongside each component value.
    pub has_derivatives: bool,
    /// Whether the owner discards the stored values after each output
    /// rather than letting them persist.
    pub no_memory: bool,
    /// Whether to print non-critical status messages.
    pub verbose: Verbose,
}

impl GridConfig {
    pub const DEFAULT_HAS_DERIVATIVES: bool = true;
    pub const DEFAULT_NO_MEMORY: bool = false;
    pub const DEFAULT_VERBOSE: Verbose = Verbose::No;

    /// Creates a configuration for the given coordinates and components,
    /// with default values for the remaining settings.
    pub fn new<S: AsRef<str>>(
        coordinate_names: &[S],
        is_periodic: &[bool],
        component_names: &[S],
    ) -> Self {
        Self {
            coordinate_names: coordinate_names
                .iter()
                .map(|name| name.as_ref().to_string())
                .collect(),
            is_periodic: is_periodic.to_vec(),
            component_names: component_names
                .iter()
                .map(|name| name.as_ref().to_string())
                .collect(),
            ..Self::default()
        }
    }

    fn validate(&self) -> GridResult<()> {
        if self.coordinate_names.is_empty() {
            return Err(GridError::configuration("Grid needs at least one coordinate"));
        }
        if self.is_periodic.len() != self.coordinate_names.len() {
            return Err(GridError::configuration(format!(
                "Got {} periodicity flags for {} coordinates",
                self.is_periodic.len(),
                self.coordinate_names.len()
            )));
        }
        if self.component_names.is_empty() {
            return Err(GridError::configuration("Grid needs at least one component"));
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            coordinate_names: Vec::new(),
            is_periodic: Vec::new(),
            component_names: Vec::new(),
            has_derivatives: Self::DEFAULT_HAS_DERIVATIVES,
            no_memory: Self::DEFAULT_NO_MEMORY,
            verbose: Self::DEFAULT_VERBOSE,
        }
    }
}

/// A dense regular grid storing field components, and optionally their
/// partial derivatives, at every grid point.
///
/// The grid is written by a single accumulation pass at a time and provides
/// no internal locking. Concurrent reads are fine while nothing writes.
#[derive(Clone, Debug)]
pub struct Grid<F: BFloat> {
    config: GridConfig,
    geometry: GridGeometry,
    storage: GridStorage<F>,
    bounds_set: bool,
    allocated: bool,
    was_cleared: bool,
    cube_units: fgr,
}

impl<F: BFloat> Grid<F> {
    /// Creates a grid without bounds from the given configuration.
    pub fn new(config: GridConfig) -> GridResult<Self> {
        config.validate()?;
        let geometry = GridGeometry::new(config.is_periodic.clone());
        let mut grid = Self {
            config,
            geometry,
            storage: GridStorage::new(0),
            bounds_set: false,
            allocated: false,
            was_cleared: true,
            cube_units: 1.0,
        };
        grid.storage = GridStorage::new(grid.number_of_quantities());
        Ok(grid)
    }

    /// Stops the grid from storing derivatives, leaving one value per component.
    ///
    /// Must be called before the storage is first allocated.
    pub fn set_no_derivatives(&mut self) -> GridResult<()> {
        if self.storage.number_of_points() > 0 {
            return Err(GridError::invariant(
                "Derivatives can only be switched off before the grid is resized",
            ));
        }
        self.config.has_derivatives = false;
        self.storage = GridStorage::new(self.number_of_quantities());
        Ok(())
    }

    /// Sets the bounds and resolution of the grid.
    ///
    /// See `GridGeometry::set_bounds` for the meaning of the arguments. The grid
    /// can only be rebound while it holds no data written since the last clear.
    /// `resize` must be called afterwards before the grid data is accessed.
    pub fn set_bounds<S: AsRef<str>>(
        &mut self,
        lower_bound_strs: &[S],
        upper_bound_strs: &[S],
        bins: &[usize],
        spacing: &[fgr],
    ) -> GridResult<()> {
        if !self.was_cleared {
            return Err(GridError::configuration(
                "Cannot change the bounds of a grid holding data, clear it first",
            ));
        }
        self.geometry
            .set_bounds(lower_bound_strs, upper_bound_strs, bins, spacing)?;
        self.bounds_set = true;
        self.allocated = false;
        if self.config.verbose.is_yes() {
            println!("Set up {}", self.description());
        }
        Ok(())
    }

    /// Allocates zeroed storage for the current bounds.
    pub fn resize(&mut self) -> GridResult<()> {
        if !self.bounds_set {
            return Err(GridError::invariant(
                "Grid bounds must be set before the grid is resized",
            ));
        }
        let number_of_points = self.geometry.number_of_points();
        let number_of_quantities = self.number_of_quantities();
        let number_of_values = usize::checked_mul(number_of_points, number_of_quantities)
            .ok_or_else(|| {
                GridError::configuration(format!(
                    "Cannot store {} quantities for each of {} grid points",
                    number_of_quantities, number_of_points
                ))
            })?;
        self.storage.resize(number_of_points, number_of_quantities);
        self.allocated = true;
        if self.config.verbose.is_yes() {
            println!(
                "Allocated {} values for {} grid points",
                number_of_values, number_of_points
            );
        }
        Ok(())
    }

    /// Sets all stored values to zero and allows the bounds to be changed.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.was_cleared = true;
        if self.config.verbose.is_yes() {
            println!("Cleared grid data");
        }
    }

    fn allocated_storage(&self) -> GridResult<&GridStorage<F>> {
        if self.is_allocated() {
            Ok(&self.storage)
        } else {
            Err(GridError::invariant(
                "Grid data accessed before the grid was resized to its current bounds",
            ))
        }
    }

    fn write_storage<W>(&mut self, write: W) -> GridResult<()>
    where
        W: FnOnce(&mut GridStorage<F>) -> GridResult<()>,
    {
        self.allocated_storage()?;
        write(&mut self.storage)?;
        self.was_cleared = false;
        Ok(())
    }

    /// Whether storage has been allocated since the bounds were last set.
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Overwrites quantity `quantity` of grid point `index`.
    pub fn set_grid_element(&mut self, index: usize, quantity: usize, value: F) -> GridResult<()> {
        self.write_storage(|storage| storage.set(index, quantity, value))
    }

    /// Adds to quantity `quantity` of grid point `index`.
    pub fn add_to_grid_element(
        &mut self,
        index: usize,
        quantity: usize,
        value: F,
    ) -> GridResult<()> {
        self.write_storage(|storage| storage.add(index, quantity, value))
    }

    /// Adds one value to every quantity of grid point `index`.
    pub fn add_to_grid_elements(&mut self, index: usize, values: &[F]) -> GridResult<()> {
        self.write_storage(|storage| storage.add_all(index, values))
    }

    /// Returns quantity `quantity` of grid point `index`.
    pub fn grid_element(&self, index: usize, quantity: usize) -> GridResult<F> {
        self.allocated_storage()?.get(index, quantity)
    }

    /// Overwrites quantity `quantity` of the grid point with the given multi-index.
    pub fn set_grid_element_at_indices(
        &mut self,
        indices: &[usize],
        quantity: usize,
        value: F,
    ) -> GridResult<()> {
        let index = self.geometry.index_from_indices(indices)?;
        self.set_grid_element(index, quantity, value)
    }

    /// Adds to quantity `quantity` of the grid point with the given multi-index.
    pub fn add_to_grid_element_at_indices(
        &mut self,
        indices: &[usize],
        quantity: usize,
        value: F,
    ) -> GridResult<()> {
        let index = self.geometry.index_from_indices(indices)?;
        self.add_to_grid_element(index, quantity, value)
    }

    /// Returns quantity `quantity` of the grid point with the given multi-index.
    pub fn grid_element_at_indices(&self, indices: &[usize], quantity: usize) -> GridResult<F> {
        let index = self.geometry.index_from_indices(indices)?;
        self.grid_element(index, quantity)
    }

    /// Returns all stored quantities of grid point `index`.
    pub fn point_values(&self, index: usize) -> GridResult<&[F]> {
        self.allocated_storage()?.point_values(index)
    }

    /// Returns the given quantity at every grid point as an array with the
    /// last axis first, so that the first axis varies fastest in memory.
    pub fn quantity_array(&self, quantity: usize) -> GridResult<ArrayD<F>> {
        let storage = self.allocated_storage()?;
        let number_of_quantities = storage.quantities_per_point();
        if quantity >= number_of_quantities {
            return Err(GridError::index(format!(
                "Quantity {} requested but grid stores {} per point",
                quantity, number_of_quantities
            )));
        }
        let values: Vec<F> = storage
            .values()
            .iter()
            .skip(quantity)
            .step_by(number_of_quantities)
            .cloned()
            .collect();
        let shape: Vec<usize> = self.geometry.shape().iter().rev().cloned().collect();
        Array::from_shape_vec(IxDyn(&shape), values)
            .map_err(|err| GridError::invariant(err.to_string()))
    }

    /// Returns the index of the quantity holding the value of the given component.
    pub fn value_quantity(&self, component: usize) -> GridResult<usize> {
        self.check_component(component)?;
        Ok(if self.config.has_derivatives {
            component * (self.dimension() + 1)
        } else {
            component
        })
    }

    /// Returns the index of the quantity holding the derivative of the given
    /// component along axis `dim`.
    pub fn derivative_quantity(&self, component: usize, dim: usize) -> GridResult<usize> {
        self.check_component(component)?;
        if !self.config.has_derivatives {
            return Err(GridError::invariant("Grid does not store derivatives"));
        }
        if dim >= self.dimension() {
            return Err(GridError::index(format!(
                "Derivative along axis {} requested for a {}D grid",
                dim,
                self.dimension()
            )));
        }
        Ok(component * (self.dimension() + 1) + 1 + dim)
    }

    fn check_component(&self, component: usize) -> GridResult<()> {
        if component < self.number_of_components() {
            Ok(())
        } else {
            Err(GridError::index(format!(
                "Component {} requested but grid has {} components",
                component,
                self.number_of_components()
            )))
        }
    }

    /// Interpolates the given component and its gradient at the given point
    /// using the stored derivatives.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the interpolated value and the gradient along each axis.
    /// - `Err`: The point is outside a non-periodic boundary, the component does not
    /// exist, or the grid stores no derivatives.
    pub fn value_and_derivatives(
        &self,
        point: &[fgr],
        component: usize,
    ) -> GridResult<(fgr, Vec<fgr>)> {
        CubicHermiteSplineInterpolator::default().interp_value_and_gradient(self, point, component)
    }

    /// Returns the geometry of the grid.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Returns the configuration of the grid.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Returns the number of axes.
    pub fn dimension(&self) -> usize {
        self.geometry.dimension()
    }

    /// Returns the total number of grid points.
    pub fn number_of_points(&self) -> usize {
        self.geometry.number_of_points()
    }

    /// Returns the number of quantities stored for each grid point.
    pub fn number_of_quantities(&self) -> usize {
        let number_of_components = self.config.component_names.len();
        if self.config.has_derivatives {
            number_of_components * (self.dimension() + 1)
        } else {
            number_of_components
        }
    }

    /// Returns the number of field components stored on the grid.
    pub fn number_of_components(&self) -> usize {
        if self.config.has_derivatives {
            self.number_of_quantities() / (self.dimension() + 1)
        } else {
            self.number_of_quantities()
        }
    }

    /// Returns the name of the given component.
    pub fn component_name(&self, component: usize) -> Option<&str> {
        self.config.component_names.get(component).map(String::as_str)
    }

    /// Returns the name of the coordinate along the given axis.
    pub fn coordinate_name(&self, dim: usize) -> Option<&str> {
        self.config.coordinate_names.get(dim).map(String::as_str)
    }

    /// Returns the number of grid points along each axis.
    pub fn shape(&self) -> &[usize] {
        self.geometry.shape()
    }

    /// Whether the grid is periodic along the given axis.
    pub fn is_periodic(&self, dim: usize) -> bool {
        self.geometry.is_periodic(dim)
    }

    /// Returns the lower bounds as originally written.
    pub fn min_strs(&self) -> &[String] {
        self.geometry.lower_bound_strs()
    }

    /// Returns the upper bounds as originally written.
    pub fn max_strs(&self) -> &[String] {
        self.geometry.upper_bound_strs()
    }

    /// Returns the distance between adjacent grid points along each axis.
    pub fn grid_spacing(&self) -> &[fgr] {
        self.geometry.grid_spacing()
    }

    /// Returns the distance between the bounds along the given axis.
    pub fn grid_extent(&self, dim: usize) -> fgr {
        self.geometry.extent(dim)
    }

    /// Returns the volume of one grid cell.
    pub fn cell_volume(&self) -> fgr {
        self.geometry.cell_volume()
    }

    /// Computes the multi-index of the given flat index.
    pub fn indices_from_index(&self, index: usize) -> GridResult<Vec<usize>> {
        self.geometry.indices_from_index(index)
    }

    /// Computes the multi-index of the grid point at or below the given coordinates.
    pub fn indices_from_point(&self, point: &[fgr]) -> GridResult<Vec<usize>> {
        self.geometry.indices_from_point(point)
    }

    /// Computes the flat index of the given multi-index.
    pub fn index_from_indices(&self, indices: &[usize]) -> GridResult<usize> {
        self.geometry.index_from_indices(indices)
    }

    /// Computes the flat index of the grid point at or below the given coordinates.
    pub fn index_from_point(&self, point: &[fgr]) -> GridResult<usize> {
        self.geometry.index_from_point(point)
    }

    /// Computes the coordinates of the grid point with the given flat index.
    pub fn grid_point(&self, index: usize) -> GridResult<GridPoint> {
        self.geometry.grid_point(index)
    }

    /// Finds the grid cell containing the given point.
    pub fn find_grid_cell(&self, point: &[fgr]) -> GridResult<GridCell> {
        self.geometry.find_grid_cell(point)
    }

    /// Finds the grid points in a window around the given point.
    pub fn neighbors(&self, point: &[fgr], half_widths: &[usize]) -> GridResult<Vec<usize>> {
        self.geometry.neighbors(point, half_widths)
    }

    /// Finds the corners of the grid cell with the given lower corner.
    pub fn spline_neighbors(&self, cell_index: usize) -> GridResult<Vec<usize>> {
        self.geometry.spline_neighbors(cell_index)
    }

    /// Whether the grid stores no derivatives.
    pub fn no_derivatives(&self) -> bool {
        !self.config.has_derivatives
    }

    /// Whether the owner discards stored values after each output.
    pub fn no_memory(&self) -> bool {
        self.config.no_memory
    }

    /// Whether the grid has not been written to since it was last cleared.
    pub fn was_reset(&self) -> bool {
        self.was_cleared
    }

    /// Whether bounds have been set.
    pub fn bounds_set(&self) -> bool {
        self.bounds_set
    }

    /// Sets the unit multiplier used when exporting the grid to a Gaussian cube file.
    pub fn set_cube_units(&mut self, units: fgr) {
        self.cube_units = units;
    }

    /// Returns the unit multiplier used when exporting the grid to a Gaussian cube file.
    pub fn cube_units(&self) -> fgr {
        self.cube_units
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn create_grid(has_derivatives: bool) -> Grid<f64> {
        let mut config = GridConfig::new(&["x", "y"], &[true, false], &["density", "energy"]);
        config.has_derivatives = has_derivatives;
        let mut grid = Grid::new(config).unwrap();
        grid.set_bounds(&["0", "0"], &["4", "1"], &[4, 3], &[]).unwrap();
        grid.resize().unwrap();
        grid
    }

    #[test]
    fn quantities_are_bundled_per_component() {
        let grid = create_grid(true);
        assert_eq!(grid.number_of_quantities(), 6);
        assert_eq!(grid.number_of_components(), 2);
        assert_eq!(grid.value_quantity(1).unwrap(), 3);
        assert_eq!(grid.derivative_quantity(1, 1).unwrap(), 5);
        assert!(grid.derivative_quantity(2, 0).unwrap_err().is_bounds_error());
        assert_eq!(grid.component_name(1), Some("energy"));
        assert_eq!(grid.coordinate_name(2), None);

        let grid = create_grid(false);
        assert_eq!(grid.number_of_quantities(), 2);
        assert_eq!(grid.number_of_components(), 2);
        assert_eq!(grid.value_quantity(1).unwrap(), 1);
        assert_eq!(
            grid.derivative_quantity(0, 0),
            Err(GridError::InvariantViolation(
                "Grid does not store derivatives".to_string()
            ))
        );
    }

    #[test]
    fn derivatives_can_only_be_dropped_before_allocation() {
        let config = GridConfig::new(&["x"], &[false], &["f"]);
        let mut grid = Grid::<f64>::new(config).unwrap();
        assert_eq!(grid.number_of_quantities(), 2);
        grid.set_no_derivatives().unwrap();
        assert!(grid.no_derivatives());
        assert_eq!(grid.number_of_quantities(), 1);

        let mut grid = create_grid(true);
        assert!(grid.set_no_derivatives().is_err());
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let config = GridConfig::new(&["x", "y"], &[true], &["f"]);
        assert!(Grid::<f64>::new(config).unwrap_err().is_configuration_error());
        let config = GridConfig::new::<&str>(&[], &[], &["f"]);
        assert!(Grid::<f64>::new(config).unwrap_err().is_configuration_error());
        let config = GridConfig::new::<&str>(&["x"], &[true], &[]);
        assert!(Grid::<f64>::new(config).unwrap_err().is_configuration_error());
    }

    #[test]
    fn lifecycle_guards_rebinding_and_stale_storage() {
        let mut grid = create_grid(true);
        assert!(grid.was_reset());
        grid.add_to_grid_element_at_indices(&[1, 2], 0, 2.0).unwrap();
        assert!(!grid.was_reset());
        assert!(grid
            .set_bounds(&["0", "0"], &["2", "1"], &[2, 2], &[])
            .unwrap_err()
            .is_configuration_error());

        grid.clear();
        assert!(grid.was_reset());
        assert_eq!(grid.grid_element_at_indices(&[1, 2], 0).unwrap(), 0.0);

        grid.set_bounds(&["0", "0"], &["2", "1"], &[2, 2], &[]).unwrap();
        assert!(!grid.is_allocated());
        assert!(matches!(
            grid.grid_element(0, 0),
            Err(GridError::InvariantViolation(_))
        ));
        grid.resize().unwrap();
        assert_eq!(grid.point_values(3).unwrap().len(), 6);

        grid.set_bounds(&["5", "0"], &["9", "1"], &[2, 2], &[]).unwrap();
        assert!(!grid.is_allocated());
        assert!(matches!(
            grid.grid_element(0, 0),
            Err(GridError::InvariantViolation(_))
        ));
        assert!(matches!(
            grid.add_to_grid_element(0, 0, 1.0),
            Err(GridError::InvariantViolation(_))
        ));
        assert!(grid.was_reset());
        grid.resize().unwrap();
        assert_eq!(grid.grid_element(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn oversized_storage_is_rejected() {
        let config = GridConfig::new(&["x"], &[true], &["f", "g"]);
        let mut grid = Grid::<f64>::new(config).unwrap();
        grid.set_bounds(&["0"], &["1"], &[1 << (usize::BITS - 2)], &[])
            .unwrap();
        assert_eq!(grid.number_of_quantities(), 4);
        assert!(grid.resize().unwrap_err().is_configuration_error());
        assert!(!grid.is_allocated());
    }

    #[test]
    fn storage_cannot_be_used_before_bounds_are_set() {
        let config = GridConfig::new(&["x"], &[true], &["f"]);
        let mut grid = Grid::<f32>::new(config).unwrap();
        assert!(!grid.bounds_set());
        assert!(matches!(grid.resize(), Err(GridError::InvariantViolation(_))));
        assert!(matches!(
            grid.set_grid_element(0, 0, 1.0),
            Err(GridError::InvariantViolation(_))
        ));
    }

    #[test]
    fn quantity_array_has_last_axis_first() {
        let mut grid = create_grid(false);
        grid.set_grid_element_at_indices(&[3, 1], 1, 5.0).unwrap();
        let energy = grid.quantity_array(1).unwrap();
        assert_eq!(energy.shape(), &[3, 4]);
        assert_eq!(energy[[1, 3]], 5.0);
        assert_eq!(energy.sum(), 5.0);
        assert!(grid.quantity_array(2).unwrap_err().is_bounds_error());
    }

    #[test]
    fn cube_units_are_stored_unchanged() {
        let mut grid = create_grid(true);
        assert_eq!(grid.cube_units(), 1.0);
        grid.set_cube_units(0.529177);
        assert_eq!(grid.cube_units(), 0.529177);
    }
}
