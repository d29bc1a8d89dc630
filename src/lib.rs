//! # Minimum-phase filtering on a helix
//!
//! This crate implements causal minimum-phase filtering of dense 1-D,
//! 2-D, and 3-D `f32` arrays, together with Wilson-Burg spectral
//! factorization. A minimum-phase filter is a causal stable filter whose
//! causal inverse is also stable, so a single sparse set of lags and
//! coefficients yields four operators: the filter, its transpose, its
//! inverse, and its inverse transpose.
//!
//! Multidimensional filters follow Claerbout's helix construction: lags
//! are ordered so the filter is causal along a helix that winds through
//! the array, which makes the recursive inverse a plain row-major sweep
//! in 2-D and 3-D.
//!
//! ## Operator overview
//!
//! ```text
//! factor:  R (auto-correlation) --Wilson-Burg--> A (minimum-phase)
//! model:   x --A--> y            deconvolve:  y --inv(A)--> x
//! adjoint: x --A'--> y           and its inverse: y --inv(A')--> x
//! ```
//!
//! All four operators handle array boundaries by treating out-of-range
//! samples as zero, and keep their inner loop over lags branch-free away
//! from the boundaries.
//!
//! ## Example
//!
//! ```
//! use helix_filter::{Grid2, HelixLags, MinimumPhaseFilter};
//!
//! // A five-point 2-D helix filter.
//! let lags = HelixLags::new2(&[0, 1, -1, 0, 1], &[0, 0, 1, 1, 1]).unwrap();
//! let filter =
//!     MinimumPhaseFilter::with_coefficients(lags, &[1.0, 0.25, 0.1, 0.3, 0.15]).unwrap();
//!
//! let mut x = Grid2::zeros(8, 8);
//! x.set(4, 4, 1.0);
//! let mut y = Grid2::zeros(8, 8);
//! filter.apply2(&x, &mut y);
//! assert_eq!(y.at(4, 4), 1.0);
//! assert_eq!(y.at(5, 4), 0.25);
//!
//! // The inverse undoes the filter.
//! let mut z = Grid2::zeros(8, 8);
//! filter.apply_inverse2(&y, &mut z);
//! assert!((z.at(4, 4) - 1.0).abs() < 1e-5);
//! assert!(z.at(5, 4).abs() < 1e-5);
//! ```
//!
//! Filters are usually built by factoring a measured auto-correlation;
//! see [`MinimumPhaseFilter::factor_wilson_burg1`] and friends.

pub mod grid;
pub mod lags;
pub mod minimum_phase;
pub mod types;

mod wilson_burg;

#[cfg(feature = "parallel")]
mod parallel;

pub use grid::{Grid2, Grid3};
pub use lags::HelixLags;
pub use minimum_phase::{FilterSnapshot, MinimumPhaseFilter};
pub use types::{FilterError, FilterResult};
