use fieldgrid::{
    grid::{Grid, GridConfig},
    num::fgr,
};

/// Creates an allocated grid with one component named `f`.
pub fn create_grid(
    is_periodic: &[bool],
    lower_bounds: &[&str],
    upper_bounds: &[&str],
    bins: &[usize],
    has_derivatives: bool,
) -> Grid<f64> {
    let coordinate_names: Vec<String> = (0..is_periodic.len())
        .map(|dim| format!("x{}", dim))
        .collect();
    let mut config = GridConfig::new(&coordinate_names, is_periodic, &["f".to_string()]);
    config.has_derivatives = has_derivatives;
    let mut grid = Grid::new(config).unwrap();
    grid.set_bounds(lower_bounds, upper_bounds, bins, &[]).unwrap();
    grid.resize().unwrap();
    grid
}

/// Samples the given field and, if the grid stores them, its partial
/// derivatives at every grid point.
pub fn sample_field<E>(grid: &mut Grid<f64>, evaluate: E)
where
    E: Fn(&[fgr]) -> (fgr, Vec<fgr>),
{
    for index in 0..grid.number_of_points() {
        let coords = grid.grid_point(index).unwrap().coords;
        let (value, gradient) = evaluate(&coords);
        grid.set_grid_element(index, 0, value).unwrap();
        if !grid.no_derivatives() {
            for (dim, derivative) in gradient.into_iter().enumerate() {
                grid.set_grid_element(index, 1 + dim, derivative).unwrap();
            }
        }
    }
}

/// A smooth field with non-trivial variation along every axis of a 3D grid.
pub fn wavy_field(x: &[fgr]) -> (fgr, Vec<fgr>) {
    let (a, b, c) = (x[0].sin(), x[1].cos(), 1.0 + 0.3 * x[2] * x[2]);
    (
        a * b * c,
        vec![x[0].cos() * b * c, -a * x[1].sin() * c, a * b * 0.6 * x[2]],
    )
}
