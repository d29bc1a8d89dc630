//! Minimum-phase causal filtering along a helix.
//!
//! A minimum-phase filter is a causal stable filter with a causal stable
//! inverse. The filter and its inverse both have transposes, which behave
//! like the filter and inverse applied in the reverse scan direction, so
//! one lag set yields four operators: forward, transpose, inverse, and
//! inverse-transpose. Multidimensional filters are causal along
//! Claerbout's helix through the array, which is what lets the recursive
//! inverse sweep 2-D and 3-D grids in plain row-major order.
//!
//! Construction does not verify that the coefficients actually describe a
//! minimum-phase filter. If they do not, the forward and transpose
//! operators still work, but the recursive inverse and inverse-transpose
//! are unstable.
//!
//! Every operator partitions the output into an interior, where each
//! lagged read is known to be in range and the inner loop over lags is
//! branch-free, and edge regions that test only the bounds that can
//! actually fail there. Out-of-range samples contribute zero.
//!
//! ## Example
//!
//! ```
//! use helix_filter::{HelixLags, MinimumPhaseFilter};
//!
//! let lags = HelixLags::new1(&[0, 1, 2]).unwrap();
//! let filter = MinimumPhaseFilter::with_coefficients(lags, &[1.0, -0.5, 0.25]).unwrap();
//!
//! let x = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
//! let mut y = [0.0_f32; 8];
//! filter.apply1(&x, &mut y);
//! assert_eq!(y, [0.0, 0.0, 0.0, 1.0, -0.5, 0.25, 0.0, 0.0]);
//!
//! // The causal inverse undoes the filter.
//! let mut z = [0.0_f32; 8];
//! filter.apply_inverse1(&y, &mut z);
//! for (zi, xi) in z.iter().zip(x.iter()) {
//!     assert!((zi - xi).abs() < 1e-6);
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::grid::{Grid2, Grid3};
use crate::lags::HelixLags;
use crate::types::{FilterError, FilterResult};

/// A causal filter on a helix: immutable lag geometry plus one
/// coefficient per lag. Coefficients are overwritten in place by
/// Wilson-Burg factorization; the geometry never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumPhaseFilter {
    pub(crate) lags: HelixLags,
    pub(crate) a: Vec<f32>,
    pub(crate) a0: f32,
    pub(crate) a0i: f32,
}

/// The persisted form of a filter: lag vectors and coefficients.
/// Restoring re-validates the helix ordering and the coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    /// Number of lags.
    pub m: usize,
    /// Lags in the first dimension.
    pub lag1: Vec<i32>,
    /// Lags in the second dimension.
    pub lag2: Vec<i32>,
    /// Lags in the third dimension.
    pub lag3: Vec<i32>,
    /// Filter coefficients, one per lag.
    pub a: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Construction and access
// ---------------------------------------------------------------------------

impl MinimumPhaseFilter {
    /// Create a unit-impulse filter for the given lags: `a[0] = 1`, all
    /// other coefficients zero. This is the conventional starting point
    /// for Wilson-Burg factorization.
    pub fn new(lags: HelixLags) -> Self {
        let mut a = vec![0.0; lags.lag_count()];
        a[0] = 1.0;
        Self {
            lags,
            a,
            a0: 1.0,
            a0i: 1.0,
        }
    }

    /// Create a filter with the given lags and coefficients. The
    /// coefficient vector must match the lag count and `a[0]` must be
    /// nonzero.
    pub fn with_coefficients(lags: HelixLags, a: &[f32]) -> FilterResult<Self> {
        if a.len() != lags.lag_count() {
            return Err(FilterError::InvalidArgument(format!(
                "coefficient length {} must equal lag count {}",
                a.len(),
                lags.lag_count()
            )));
        }
        if a[0] == 0.0 {
            return Err(FilterError::InvalidArgument("a[0] must be nonzero".into()));
        }
        Ok(Self {
            a0: a[0],
            a0i: 1.0 / a[0],
            a: a.to_vec(),
            lags,
        })
    }

    /// The lag geometry.
    pub fn lags(&self) -> &HelixLags {
        &self.lags
    }

    /// Number of lags (and coefficients).
    pub fn lag_count(&self) -> usize {
        self.a.len()
    }

    /// Current filter coefficients, one per lag.
    pub fn coefficients(&self) -> &[f32] {
        &self.a
    }

    /// The zero-lag coefficient.
    pub fn a0(&self) -> f32 {
        self.a0
    }

    /// Capture the persistable state of this filter.
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            m: self.a.len(),
            lag1: self.lags.lag1().to_vec(),
            lag2: self.lags.lag2().to_vec(),
            lag3: self.lags.lag3().to_vec(),
            a: self.a.clone(),
        }
    }

    /// Rebuild a filter from a snapshot, re-validating lag geometry and
    /// coefficients.
    pub fn from_snapshot(s: &FilterSnapshot) -> FilterResult<Self> {
        if s.m != s.lag1.len() {
            return Err(FilterError::InvalidArgument(format!(
                "snapshot lag count {} does not match its lag1 length {}",
                s.m,
                s.lag1.len()
            )));
        }
        let lags = HelixLags::new3(&s.lag1, &s.lag2, &s.lag3)?;
        Self::with_coefficients(lags, &s.a)
    }
}

// ---------------------------------------------------------------------------
// 1-D operators (use lag1; lag2 and lag3 are ignored)
// ---------------------------------------------------------------------------

impl MinimumPhaseFilter {
    /// Applies this filter to a 1-D signal. Uses `lag1` only.
    pub fn apply1(&self, x: &[f32], y: &mut [f32]) {
        assert_eq!(x.len(), y.len(), "x and y must have the same length");
        let n1 = y.len() as isize;
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let i1lo = (self.lags.max1() as isize).min(n1);
        for i1 in 0..i1lo {
            let mut yi = self.a0 * x[i1 as usize];
            for j in 1..m {
                let k1 = i1 - lag1[j] as isize;
                if 0 <= k1 {
                    yi += a[j] * x[k1 as usize];
                }
            }
            y[i1 as usize] = yi;
        }
        for i1 in i1lo..n1 {
            let mut yi = self.a0 * x[i1 as usize];
            for j in 1..m {
                let k1 = i1 - lag1[j] as isize;
                yi += a[j] * x[k1 as usize];
            }
            y[i1 as usize] = yi;
        }
    }

    /// Applies the transpose of this filter to a 1-D signal. Uses `lag1`
    /// only.
    pub fn apply_transpose1(&self, x: &[f32], y: &mut [f32]) {
        assert_eq!(x.len(), y.len(), "x and y must have the same length");
        let n1 = y.len() as isize;
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let i1hi = (n1 - self.lags.max1() as isize).max(0);
        for i1 in (i1hi..n1).rev() {
            let mut yi = self.a0 * x[i1 as usize];
            for j in 1..m {
                let k1 = i1 + lag1[j] as isize;
                if k1 < n1 {
                    yi += a[j] * x[k1 as usize];
                }
            }
            y[i1 as usize] = yi;
        }
        for i1 in (0..i1hi).rev() {
            let mut yi = self.a0 * x[i1 as usize];
            for j in 1..m {
                let k1 = i1 + lag1[j] as isize;
                yi += a[j] * x[k1 as usize];
            }
            y[i1 as usize] = yi;
        }
    }

    /// Applies the inverse of this filter to a 1-D signal. Uses `lag1`
    /// only.
    pub fn apply_inverse1(&self, x: &[f32], y: &mut [f32]) {
        assert_eq!(x.len(), y.len(), "x and y must have the same length");
        y.copy_from_slice(x);
        self.apply_inverse1_in_place(y);
    }

    /// Applies the inverse of this filter to a 1-D signal, in place.
    /// Legal because the causal sweep writes each sample strictly after
    /// every read of it.
    pub fn apply_inverse1_in_place(&self, y: &mut [f32]) {
        let n1 = y.len() as isize;
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let i1lo = (self.lags.max1() as isize).min(n1);
        for i1 in 0..i1lo {
            let mut yi = y[i1 as usize];
            for j in 1..m {
                let k1 = i1 - lag1[j] as isize;
                if 0 <= k1 {
                    yi -= a[j] * y[k1 as usize];
                }
            }
            y[i1 as usize] = self.a0i * yi;
        }
        for i1 in i1lo..n1 {
            let mut yi = y[i1 as usize];
            for j in 1..m {
                let k1 = i1 - lag1[j] as isize;
                yi -= a[j] * y[k1 as usize];
            }
            y[i1 as usize] = self.a0i * yi;
        }
    }

    /// Applies the inverse transpose of this filter to a 1-D signal.
    /// Uses `lag1` only.
    pub fn apply_inverse_transpose1(&self, x: &[f32], y: &mut [f32]) {
        assert_eq!(x.len(), y.len(), "x and y must have the same length");
        y.copy_from_slice(x);
        self.apply_inverse_transpose1_in_place(y);
    }

    /// Applies the inverse transpose of this filter to a 1-D signal, in
    /// place.
    pub fn apply_inverse_transpose1_in_place(&self, y: &mut [f32]) {
        let n1 = y.len() as isize;
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let i1hi = (n1 - self.lags.max1() as isize).max(0);
        for i1 in (i1hi..n1).rev() {
            let mut yi = y[i1 as usize];
            for j in 1..m {
                let k1 = i1 + lag1[j] as isize;
                if k1 < n1 {
                    yi -= a[j] * y[k1 as usize];
                }
            }
            y[i1 as usize] = self.a0i * yi;
        }
        for i1 in (0..i1hi).rev() {
            let mut yi = y[i1 as usize];
            for j in 1..m {
                let k1 = i1 + lag1[j] as isize;
                yi -= a[j] * y[k1 as usize];
            }
            y[i1 as usize] = self.a0i * yi;
        }
    }
}

// ---------------------------------------------------------------------------
// 2-D operators (use lag1 and lag2; lag3 is ignored)
// ---------------------------------------------------------------------------

impl MinimumPhaseFilter {
    /// Applies this filter to a 2-D grid. Uses `lag1` and `lag2`.
    pub fn apply2(&self, x: &Grid2, y: &mut Grid2) {
        assert_eq!(x.dims(), y.dims(), "x and y must have the same shape");
        let (n1u, n2u) = y.dims();
        let (n1, n2) = (n1u as isize, n2u as isize);
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let lag2 = self.lags.lag2();
        let xs = x.as_slice();
        let ys = y.as_mut_slice();
        let (i1lo, i1hi) = causal_span(n1, self.lags.min1(), self.lags.max1());
        let i2lo = if i1lo <= i1hi {
            (self.lags.max2() as isize).min(n2)
        } else {
            n2
        };
        for i2 in 0..i2lo {
            for i1 in 0..n1 {
                let mut yi = self.a0 * xs[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 - lag1[j] as isize;
                    let k2 = i2 - lag2[j] as isize;
                    if 0 <= k1 && k1 < n1 && 0 <= k2 {
                        yi += a[j] * xs[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = yi;
            }
        }
        for i2 in i2lo..n2 {
            for i1 in 0..i1lo {
                let mut yi = self.a0 * xs[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 - lag1[j] as isize;
                    let k2 = i2 - lag2[j] as isize;
                    if 0 <= k1 {
                        yi += a[j] * xs[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = yi;
            }
            for i1 in i1lo..i1hi {
                let mut yi = self.a0 * xs[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 - lag1[j] as isize;
                    let k2 = i2 - lag2[j] as isize;
                    yi += a[j] * xs[(k2 * n1 + k1) as usize];
                }
                ys[(i2 * n1 + i1) as usize] = yi;
            }
            for i1 in i1hi..n1 {
                let mut yi = self.a0 * xs[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 - lag1[j] as isize;
                    let k2 = i2 - lag2[j] as isize;
                    if k1 < n1 {
                        yi += a[j] * xs[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = yi;
            }
        }
    }

    /// Applies the transpose of this filter to a 2-D grid. Uses `lag1`
    /// and `lag2`.
    pub fn apply_transpose2(&self, x: &Grid2, y: &mut Grid2) {
        assert_eq!(x.dims(), y.dims(), "x and y must have the same shape");
        let (n1u, n2u) = y.dims();
        let (n1, n2) = (n1u as isize, n2u as isize);
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let lag2 = self.lags.lag2();
        let xs = x.as_slice();
        let ys = y.as_mut_slice();
        let (i1lo, i1hi) = anticausal_span(n1, self.lags.min1(), self.lags.max1());
        let i2hi = if i1lo <= i1hi {
            (n2 - self.lags.max2() as isize).max(0)
        } else {
            0
        };
        for i2 in (i2hi..n2).rev() {
            for i1 in (0..n1).rev() {
                let mut yi = self.a0 * xs[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 + lag1[j] as isize;
                    let k2 = i2 + lag2[j] as isize;
                    if 0 <= k1 && k1 < n1 && k2 < n2 {
                        yi += a[j] * xs[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = yi;
            }
        }
        for i2 in (0..i2hi).rev() {
            for i1 in (i1hi..n1).rev() {
                let mut yi = self.a0 * xs[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 + lag1[j] as isize;
                    let k2 = i2 + lag2[j] as isize;
                    if k1 < n1 {
                        yi += a[j] * xs[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = yi;
            }
            for i1 in (i1lo..i1hi).rev() {
                let mut yi = self.a0 * xs[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 + lag1[j] as isize;
                    let k2 = i2 + lag2[j] as isize;
                    yi += a[j] * xs[(k2 * n1 + k1) as usize];
                }
                ys[(i2 * n1 + i1) as usize] = yi;
            }
            for i1 in (0..i1lo).rev() {
                let mut yi = self.a0 * xs[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 + lag1[j] as isize;
                    let k2 = i2 + lag2[j] as isize;
                    if 0 <= k1 {
                        yi += a[j] * xs[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = yi;
            }
        }
    }

    /// Applies the inverse of this filter to a 2-D grid. Uses `lag1` and
    /// `lag2`.
    pub fn apply_inverse2(&self, x: &Grid2, y: &mut Grid2) {
        y.copy_from(x);
        self.apply_inverse2_in_place(y);
    }

    /// Applies the inverse of this filter to a 2-D grid, in place.
    pub fn apply_inverse2_in_place(&self, y: &mut Grid2) {
        let (n1u, n2u) = y.dims();
        let (n1, n2) = (n1u as isize, n2u as isize);
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let lag2 = self.lags.lag2();
        let (i1lo, i1hi) = causal_span(n1, self.lags.min1(), self.lags.max1());
        let i2lo = if i1lo <= i1hi {
            (self.lags.max2() as isize).min(n2)
        } else {
            n2
        };
        let ys = y.as_mut_slice();
        for i2 in 0..i2lo {
            for i1 in 0..n1 {
                let mut yi = ys[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 - lag1[j] as isize;
                    let k2 = i2 - lag2[j] as isize;
                    if 0 <= k1 && k1 < n1 && 0 <= k2 {
                        yi -= a[j] * ys[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = self.a0i * yi;
            }
        }
        for i2 in i2lo..n2 {
            for i1 in 0..i1lo {
                let mut yi = ys[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 - lag1[j] as isize;
                    let k2 = i2 - lag2[j] as isize;
                    if 0 <= k1 {
                        yi -= a[j] * ys[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = self.a0i * yi;
            }
            for i1 in i1lo..i1hi {
                let mut yi = ys[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 - lag1[j] as isize;
                    let k2 = i2 - lag2[j] as isize;
                    yi -= a[j] * ys[(k2 * n1 + k1) as usize];
                }
                ys[(i2 * n1 + i1) as usize] = self.a0i * yi;
            }
            for i1 in i1hi..n1 {
                let mut yi = ys[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 - lag1[j] as isize;
                    let k2 = i2 - lag2[j] as isize;
                    if k1 < n1 {
                        yi -= a[j] * ys[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = self.a0i * yi;
            }
        }
    }

    /// Applies the inverse transpose of this filter to a 2-D grid. Uses
    /// `lag1` and `lag2`.
    pub fn apply_inverse_transpose2(&self, x: &Grid2, y: &mut Grid2) {
        y.copy_from(x);
        self.apply_inverse_transpose2_in_place(y);
    }

    /// Applies the inverse transpose of this filter to a 2-D grid, in
    /// place.
    pub fn apply_inverse_transpose2_in_place(&self, y: &mut Grid2) {
        let (n1u, n2u) = y.dims();
        let (n1, n2) = (n1u as isize, n2u as isize);
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let lag2 = self.lags.lag2();
        let (i1lo, i1hi) = anticausal_span(n1, self.lags.min1(), self.lags.max1());
        let i2hi = if i1lo <= i1hi {
            (n2 - self.lags.max2() as isize).max(0)
        } else {
            0
        };
        let ys = y.as_mut_slice();
        for i2 in (i2hi..n2).rev() {
            for i1 in (0..n1).rev() {
                let mut yi = ys[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 + lag1[j] as isize;
                    let k2 = i2 + lag2[j] as isize;
                    if 0 <= k1 && k1 < n1 && k2 < n2 {
                        yi -= a[j] * ys[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = self.a0i * yi;
            }
        }
        for i2 in (0..i2hi).rev() {
            for i1 in (i1hi..n1).rev() {
                let mut yi = ys[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 + lag1[j] as isize;
                    let k2 = i2 + lag2[j] as isize;
                    if k1 < n1 {
                        yi -= a[j] * ys[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = self.a0i * yi;
            }
            for i1 in (i1lo..i1hi).rev() {
                let mut yi = ys[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 + lag1[j] as isize;
                    let k2 = i2 + lag2[j] as isize;
                    yi -= a[j] * ys[(k2 * n1 + k1) as usize];
                }
                ys[(i2 * n1 + i1) as usize] = self.a0i * yi;
            }
            for i1 in (0..i1lo).rev() {
                let mut yi = ys[(i2 * n1 + i1) as usize];
                for j in 1..m {
                    let k1 = i1 + lag1[j] as isize;
                    let k2 = i2 + lag2[j] as isize;
                    if 0 <= k1 {
                        yi -= a[j] * ys[(k2 * n1 + k1) as usize];
                    }
                }
                ys[(i2 * n1 + i1) as usize] = self.a0i * yi;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 3-D operators (use lag1, lag2, and lag3)
// ---------------------------------------------------------------------------

impl MinimumPhaseFilter {
    /// Applies this filter to a 3-D grid.
    pub fn apply3(&self, x: &Grid3, y: &mut Grid3) {
        assert_eq!(x.dims(), y.dims(), "x and y must have the same shape");
        let (n1u, n2u, n3u) = y.dims();
        let (n1, n2, n3) = (n1u as isize, n2u as isize, n3u as isize);
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let lag2 = self.lags.lag2();
        let lag3 = self.lags.lag3();
        let xs = x.as_slice();
        let ys = y.as_mut_slice();
        let (i1lo, i1hi) = causal_span(n1, self.lags.min1(), self.lags.max1());
        let (i2lo, i2hi) = causal_span(n2, self.lags.min2(), self.lags.max2());
        let i3lo = if i1lo <= i1hi && i2lo <= i2hi {
            (self.lags.max3() as isize).min(n3)
        } else {
            n3
        };
        for i3 in 0..i3lo {
            for i2 in 0..n2 {
                for i1 in 0..n1 {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        if 0 <= k1 && k1 < n1 && 0 <= k2 && k2 < n2 && 0 <= k3 {
                            yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
            }
        }
        for i3 in i3lo..n3 {
            for i2 in 0..i2lo {
                for i1 in 0..n1 {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        if 0 <= k2 && 0 <= k1 && k1 < n1 {
                            yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
            }
            for i2 in i2lo..i2hi {
                for i1 in 0..i1lo {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        if 0 <= k1 {
                            yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
                for i1 in i1lo..i1hi {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
                for i1 in i1hi..n1 {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        if k1 < n1 {
                            yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
            }
            for i2 in i2hi..n2 {
                for i1 in 0..n1 {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        if k2 < n2 && 0 <= k1 && k1 < n1 {
                            yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
            }
        }
    }

    /// Applies the transpose of this filter to a 3-D grid.
    pub fn apply_transpose3(&self, x: &Grid3, y: &mut Grid3) {
        assert_eq!(x.dims(), y.dims(), "x and y must have the same shape");
        let (n1u, n2u, n3u) = y.dims();
        let (n1, n2, n3) = (n1u as isize, n2u as isize, n3u as isize);
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let lag2 = self.lags.lag2();
        let lag3 = self.lags.lag3();
        let xs = x.as_slice();
        let ys = y.as_mut_slice();
        let (i1lo, i1hi) = anticausal_span(n1, self.lags.min1(), self.lags.max1());
        let (i2lo, i2hi) = anticausal_span(n2, self.lags.min2(), self.lags.max2());
        let i3hi = if i1lo <= i1hi && i2lo <= i2hi {
            (n3 - self.lags.max3() as isize).max(0)
        } else {
            0
        };
        for i3 in (i3hi..n3).rev() {
            for i2 in (0..n2).rev() {
                for i1 in (0..n1).rev() {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        if 0 <= k1 && k1 < n1 && 0 <= k2 && k2 < n2 && k3 < n3 {
                            yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
            }
        }
        for i3 in (0..i3hi).rev() {
            for i2 in (i2hi..n2).rev() {
                for i1 in (0..n1).rev() {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        if k2 < n2 && 0 <= k1 && k1 < n1 {
                            yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
            }
            for i2 in (i2lo..i2hi).rev() {
                for i1 in (i1hi..n1).rev() {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        if k1 < n1 {
                            yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
                for i1 in (i1lo..i1hi).rev() {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
                for i1 in (0..i1lo).rev() {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        if 0 <= k1 {
                            yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
            }
            for i2 in (0..i2lo).rev() {
                for i1 in (0..n1).rev() {
                    let mut yi = self.a0 * xs[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        if 0 <= k2 && 0 <= k1 && k1 < n1 {
                            yi += a[j] * xs[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = yi;
                }
            }
        }
    }

    /// Applies the inverse of this filter to a 3-D grid.
    pub fn apply_inverse3(&self, x: &Grid3, y: &mut Grid3) {
        y.copy_from(x);
        self.apply_inverse3_in_place(y);
    }

    /// Applies the inverse of this filter to a 3-D grid, in place.
    pub fn apply_inverse3_in_place(&self, y: &mut Grid3) {
        let (n1u, n2u, n3u) = y.dims();
        let (n1, n2, n3) = (n1u as isize, n2u as isize, n3u as isize);
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let lag2 = self.lags.lag2();
        let lag3 = self.lags.lag3();
        let (i1lo, i1hi) = causal_span(n1, self.lags.min1(), self.lags.max1());
        let (i2lo, i2hi) = causal_span(n2, self.lags.min2(), self.lags.max2());
        let i3lo = if i1lo <= i1hi && i2lo <= i2hi {
            (self.lags.max3() as isize).min(n3)
        } else {
            n3
        };
        let ys = y.as_mut_slice();
        for i3 in 0..i3lo {
            for i2 in 0..n2 {
                for i1 in 0..n1 {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        if 0 <= k1 && k1 < n1 && 0 <= k2 && k2 < n2 && 0 <= k3 {
                            yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
            }
        }
        for i3 in i3lo..n3 {
            for i2 in 0..i2lo {
                for i1 in 0..n1 {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        if 0 <= k2 && 0 <= k1 && k1 < n1 {
                            yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
            }
            for i2 in i2lo..i2hi {
                for i1 in 0..i1lo {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        if 0 <= k1 {
                            yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
                for i1 in i1lo..i1hi {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
                for i1 in i1hi..n1 {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        if k1 < n1 {
                            yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
            }
            for i2 in i2hi..n2 {
                for i1 in 0..n1 {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 - lag1[j] as isize;
                        let k2 = i2 - lag2[j] as isize;
                        let k3 = i3 - lag3[j] as isize;
                        if k2 < n2 && 0 <= k1 && k1 < n1 {
                            yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
            }
        }
    }

    /// Applies the inverse transpose of this filter to a 3-D grid.
    pub fn apply_inverse_transpose3(&self, x: &Grid3, y: &mut Grid3) {
        y.copy_from(x);
        self.apply_inverse_transpose3_in_place(y);
    }

    /// Applies the inverse transpose of this filter to a 3-D grid, in
    /// place.
    pub fn apply_inverse_transpose3_in_place(&self, y: &mut Grid3) {
        let (n1u, n2u, n3u) = y.dims();
        let (n1, n2, n3) = (n1u as isize, n2u as isize, n3u as isize);
        let a = &self.a[..];
        let m = a.len();
        let lag1 = self.lags.lag1();
        let lag2 = self.lags.lag2();
        let lag3 = self.lags.lag3();
        let (i1lo, i1hi) = anticausal_span(n1, self.lags.min1(), self.lags.max1());
        let (i2lo, i2hi) = anticausal_span(n2, self.lags.min2(), self.lags.max2());
        let i3hi = if i1lo <= i1hi && i2lo <= i2hi {
            (n3 - self.lags.max3() as isize).max(0)
        } else {
            0
        };
        let ys = y.as_mut_slice();
        for i3 in (i3hi..n3).rev() {
            for i2 in (0..n2).rev() {
                for i1 in (0..n1).rev() {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        if 0 <= k1 && k1 < n1 && 0 <= k2 && k2 < n2 && k3 < n3 {
                            yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
            }
        }
        for i3 in (0..i3hi).rev() {
            for i2 in (i2hi..n2).rev() {
                for i1 in (0..n1).rev() {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        if k2 < n2 && 0 <= k1 && k1 < n1 {
                            yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
            }
            for i2 in (i2lo..i2hi).rev() {
                for i1 in (i1hi..n1).rev() {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        if k1 < n1 {
                            yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
                for i1 in (i1lo..i1hi).rev() {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
                for i1 in (0..i1lo).rev() {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        if 0 <= k1 {
                            yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
            }
            for i2 in (0..i2lo).rev() {
                for i1 in (0..n1).rev() {
                    let mut yi = ys[((i3 * n2 + i2) * n1 + i1) as usize];
                    for j in 1..m {
                        let k1 = i1 + lag1[j] as isize;
                        let k2 = i2 + lag2[j] as isize;
                        let k3 = i3 + lag3[j] as isize;
                        if 0 <= k2 && 0 <= k1 && k1 < n1 {
                            yi -= a[j] * ys[((k3 * n2 + k2) * n1 + k1) as usize];
                        }
                    }
                    ys[((i3 * n2 + i2) * n1 + i1) as usize] = self.a0i * yi;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Region decomposition helpers
// ---------------------------------------------------------------------------

/// Index span `[lo, hi)` on a forward sweep within which every lagged
/// read `i - lag` is in range for all lags in `[lag_min, lag_max]`. If
/// `lo > hi` no such span exists and callers fall back to fully guarded
/// loops.
#[inline]
fn causal_span(n: isize, lag_min: i32, lag_max: i32) -> (isize, isize) {
    ((lag_max as isize).max(0), n.min(n + lag_min as isize))
}

/// Index span `[lo, hi)` on a reverse sweep within which every lagged
/// read `i + lag` is in range for all lags in `[lag_min, lag_max]`.
#[inline]
fn anticausal_span(n: isize, lag_min: i32, lag_max: i32) -> (isize, isize) {
    ((-(lag_min as isize)).max(0), n.min(n - lag_max as isize))
}
