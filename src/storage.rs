//! Flat storage of the quantities held at each grid point.

use crate::{
    error::{GridError, GridResult},
    num::BFloat,
};

#[cfg(feature = "for-testing")]
use approx::{AbsDiffEq, RelativeEq};

/// Flat buffer holding a fixed number of quantities for every grid point.
///
/// Quantity `k` of point `i` is stored at position `i*quantities_per_point + k`.
#[derive(Clone, Debug, PartialEq)]
pub struct GridStorage<F> {
    values: Vec<F>,
    number_of_points: usize,
    quantities_per_point: usize,
}

impl<F: BFloat> GridStorage<F> {
    /// Creates an empty storage with room for no points.
    pub fn new(quantities_per_point: usize) -> Self {
        Self {
            values: Vec::new(),
            number_of_points: 0,
            quantities_per_point,
        }
    }

    /// Reallocates the buffer for the given number of points and quantities,
    /// setting every value to zero.
    pub fn resize(&mut self, number_of_points: usize, quantities_per_point: usize) {
        self.number_of_points = number_of_points;
        self.quantities_per_point = quantities_per_point;
        self.values.clear();
        self.values
            .resize(number_of_points * quantities_per_point, F::zero());
    }

    /// Sets every stored value to zero.
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|value| *value = F::zero());
    }

    /// Returns the number of points the buffer is sized for.
    pub fn number_of_points(&self) -> usize {
        self.number_of_points
    }

    /// Returns the number of quantities stored per point.
    pub fn quantities_per_point(&self) -> usize {
        self.quantities_per_point
    }

    /// Returns a slice with all stored values.
    pub fn values(&self) -> &[F] {
        &self.values
    }

    /// Returns a slice with the quantities of one point.
    pub fn point_values(&self, index: usize) -> GridResult<&[F]> {
        let start = self.offset(index, 0)?;
        Ok(&self.values[start..start + self.quantities_per_point])
    }

    fn offset(&self, index: usize, quantity: usize) -> GridResult<usize> {
        if index >= self.number_of_points {
            return Err(GridError::index(format!(
                "Grid point {} requested but grid has {} points",
                index, self.number_of_points
            )));
        }
        if quantity >= self.quantities_per_point {
            return Err(GridError::index(format!(
                "Quantity {} requested but grid stores {} per point",
                quantity, self.quantities_per_point
            )));
        }
        Ok(index * self.quantities_per_point + quantity)
    }

    /// Returns the given quantity of the given point.
    pub fn get(&self, index: usize, quantity: usize) -> GridResult<F> {
        Ok(self.values[self.offset(index, quantity)?])
    }

    /// Overwrites the given quantity of the given point.
    pub fn set(&mut self, index: usize, quantity: usize, value: F) -> GridResult<()> {
        let offset = self.offset(index, quantity)?;
        self.values[offset] = value;
        Ok(())
    }

    /// Adds to the given quantity of the given point.
    pub fn add(&mut self, index: usize, quantity: usize, value: F) -> GridResult<()> {
        let offset = self.offset(index, quantity)?;
        self.values[offset] = self.values[offset] + value;
        Ok(())
    }

    /// Adds one value to each quantity of the given point.
    pub fn add_all(&mut self, index: usize, values: &[F]) -> GridResult<()> {
        if values.len() != self.quantities_per_point {
            return Err(GridError::index(format!(
                "Got {} values but grid stores {} per point",
                values.len(),
                self.quantities_per_point
            )));
        }
        let start = self.offset(index, 0)?;
        self.values[start..start + values.len()]
            .iter_mut()
            .zip(values)
            .for_each(|(stored, &value)| *stored = *stored + value);
        Ok(())
    }
}

#[cfg(feature = "for-testing")]
impl<F> AbsDiffEq for GridStorage<F>
where
    F: BFloat + AbsDiffEq<Epsilon = F>,
{
    type Epsilon = F;

    fn default_epsilon() -> Self::Epsilon {
        F::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.number_of_points == other.number_of_points
            && self.quantities_per_point == other.quantities_per_point
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

#[cfg(feature = "for-testing")]
impl<F> RelativeEq for GridStorage<F>
where
    F: BFloat + RelativeEq<Epsilon = F>,
{
    fn default_max_relative() -> Self::Epsilon {
        F::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.number_of_points == other.number_of_points
            && self.quantities_per_point == other.quantities_per_point
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
