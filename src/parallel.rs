//! Parallel batch application of a filter.
//!
//! Applying a filter takes `&self` and mutating its coefficients takes
//! `&mut self`, so one filter can safely process many independent buffers
//! from many threads at once. This module provides Rayon-based batch
//! forms of the most common operators. Enable with the `parallel` feature
//! flag:
//!
//! ```toml
//! [dependencies]
//! helix-filter = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! Parallelization adds overhead, so batching pays off for many buffers
//! or large grids; for a single small signal the sequential operators are
//! faster.

use rayon::prelude::*;

use crate::grid::Grid2;
use crate::minimum_phase::MinimumPhaseFilter;

impl MinimumPhaseFilter {
    /// Apply this filter to each 1-D signal in `inputs`, one Rayon task
    /// per signal.
    pub fn apply1_batch(&self, inputs: &[Vec<f32>]) -> Vec<Vec<f32>> {
        inputs
            .par_iter()
            .map(|x| {
                let mut y = vec![0.0; x.len()];
                self.apply1(x, &mut y);
                y
            })
            .collect()
    }

    /// Apply the inverse of this filter to each 1-D signal in `inputs`.
    pub fn apply_inverse1_batch(&self, inputs: &[Vec<f32>]) -> Vec<Vec<f32>> {
        inputs
            .par_iter()
            .map(|x| {
                let mut y = x.clone();
                self.apply_inverse1_in_place(&mut y);
                y
            })
            .collect()
    }

    /// Apply this filter to each 2-D grid in `inputs`, one Rayon task per
    /// grid.
    pub fn apply2_batch(&self, inputs: &[Grid2]) -> Vec<Grid2> {
        inputs
            .par_iter()
            .map(|x| {
                let (n1, n2) = x.dims();
                let mut y = Grid2::zeros(n1, n2);
                self.apply2(x, &mut y);
                y
            })
            .collect()
    }
}
