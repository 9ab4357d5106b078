//! Human- and machine-readable descriptions of a grid.

use crate::{grid::Grid, num::BFloat};

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Whether or not to print non-critical status messages.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub enum Verbose {
    Yes,
    No,
}

impl Verbose {
    pub fn is_yes(&self) -> bool {
        match self {
            Verbose::Yes => true,
            Verbose::No => false,
        }
    }
}

fn periodicity_flags(is_periodic: &[bool]) -> String {
    is_periodic
        .iter()
        .map(|&periodic| if periodic { "T" } else { "F" })
        .collect::<Vec<_>>()
        .join(",")
}

impl<F: BFloat> Grid<F> {
    /// Returns a one-line summary of the shape, bounds, spacing and periodicity
    /// of the grid, or an empty string if no bounds have been set.
    pub fn description(&self) -> String {
        if !self.bounds_set() {
            return String::new();
        }
        let geometry = self.geometry();
        let shape = geometry
            .shape()
            .iter()
            .map(|size| size.to_string())
            .collect::<Vec<_>>()
            .join(" X ");
        let spacing = geometry
            .grid_spacing()
            .iter()
            .map(|spacing| spacing.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "grid of {} equally spaced points between ({}) and ({}), spacing ({}), periodic ({})",
            shape,
            geometry.lower_bound_strs().join(","),
            geometry.upper_bound_strs().join(","),
            spacing,
            periodicity_flags(geometry.periodicity())
        )
    }

    /// Returns the coordinate names and periodicity of the grid in the form
    /// `COORDINATES=x,y PBC=T,F`, from which an equivalent grid can be configured.
    pub fn input_string(&self) -> String {
        format!(
            "COORDINATES={} PBC={}",
            self.config().coordinate_names.join(","),
            periodicity_flags(self.geometry().periodicity())
        )
    }
}

#[cfg(test)]
mod tests {

    use crate::grid::{Grid, GridConfig};

    #[test]
    fn description_lists_original_bounds() {
        let config = GridConfig::new(&["phi", "psi", "d"], &[true, true, false], &["bias"]);
        let mut grid = Grid::<f64>::new(config).unwrap();
        assert_eq!(grid.description(), "");

        grid.set_bounds(&["-pi", "-pi", "0"], &["pi", "pi", "2.50"], &[4, 2, 6], &[])
            .unwrap();
        assert_eq!(
            grid.description(),
            format!(
                "grid of 4 X 2 X 6 equally spaced points between (-pi,-pi,0) and (pi,pi,2.50), \
                 spacing ({},{},0.5), periodic (T,T,F)",
                std::f64::consts::PI / 2.0,
                std::f64::consts::PI
            )
        );
        assert_eq!(grid.min_strs(), &["-pi", "-pi", "0"]);
        assert_eq!(grid.max_strs(), &["pi", "pi", "2.50"]);
    }

    #[test]
    fn input_string_lists_coordinates_and_periodicity() {
        let config = GridConfig::new(&["phi", "d"], &[true, false], &["bias"]);
        let grid = Grid::<f32>::new(config).unwrap();
        assert_eq!(grid.input_string(), "COORDINATES=phi,d PBC=T,F");
    }
}
