//! Helical lag geometry for causal multidimensional filters.
//!
//! A sparse causal filter is described by a set of integer lag vectors,
//! one per coefficient. Multidimensional lags follow Claerbout's helix
//! ordering: the first lag is the zero vector, and every later lag lies
//! strictly after it along a helix that winds through the array. A filter
//! with such lags is causal along the helix, which is what makes its
//! recursive inverse well defined.
//!
//! Concretely, for every entry `j >= 1`:
//!
//! - 1-D: `lag1[j] > 0`
//! - 2-D: `lag2[j] >= 0`; if `lag2[j] == 0` then `lag1[j] > 0`
//! - 3-D: `lag3[j] >= 0`; if `lag3[j] == 0` then `lag2[j] >= 0`, and if
//!   both are zero then `lag1[j] > 0`
//!
//! Note that `lag1` may be negative in 2-D when `lag2 > 0`, and both
//! `lag1` and `lag2` may be negative in 3-D when `lag3 > 0`.
//!
//! ## Example
//!
//! ```
//! use helix_filter::HelixLags;
//!
//! // A five-point 2-D helix stencil.
//! let lags = HelixLags::new2(&[0, 1, -1, 0, 1], &[0, 0, 1, 1, 1]).unwrap();
//! assert_eq!(lags.lag_count(), 5);
//! assert_eq!((lags.min1(), lags.max1()), (-1, 1));
//!
//! // Violating the helix ordering is a construction error.
//! assert!(HelixLags::new2(&[0, -1], &[0, 0]).is_err());
//! ```

use crate::types::{FilterError, FilterResult};

/// An immutable set of filter lags in helix order, with cached extrema
/// per dimension. Unused dimensions are fixed to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelixLags {
    lag1: Vec<i32>,
    lag2: Vec<i32>,
    lag3: Vec<i32>,
    min1: i32,
    max1: i32,
    min2: i32,
    max2: i32,
    min3: i32,
    max3: i32,
}

impl HelixLags {
    /// Build a 1-D lag set. All `lag2` and `lag3` are zero.
    pub fn new1(lag1: &[i32]) -> FilterResult<Self> {
        if lag1.is_empty() {
            return Err(FilterError::InvalidArgument(
                "lag arrays must be non-empty".into(),
            ));
        }
        if lag1[0] != 0 {
            return Err(FilterError::InvalidArgument("lag1[0] must be 0".into()));
        }
        for (j, &l1) in lag1.iter().enumerate().skip(1) {
            if l1 <= 0 {
                return Err(FilterError::InvalidArgument(format!(
                    "lag1[{j}] must be > 0, got {l1}"
                )));
            }
        }
        let m = lag1.len();
        Ok(Self::build(lag1.to_vec(), vec![0; m], vec![0; m]))
    }

    /// Build a 2-D lag set. All `lag3` are zero.
    pub fn new2(lag1: &[i32], lag2: &[i32]) -> FilterResult<Self> {
        if lag1.is_empty() {
            return Err(FilterError::InvalidArgument(
                "lag arrays must be non-empty".into(),
            ));
        }
        if lag2.len() != lag1.len() {
            return Err(FilterError::InvalidArgument(format!(
                "lag2 length {} must equal lag1 length {}",
                lag2.len(),
                lag1.len()
            )));
        }
        if lag1[0] != 0 || lag2[0] != 0 {
            return Err(FilterError::InvalidArgument(
                "lag1[0] and lag2[0] must be 0".into(),
            ));
        }
        for j in 1..lag1.len() {
            if lag2[j] < 0 {
                return Err(FilterError::InvalidArgument(format!(
                    "lag2[{j}] must be >= 0, got {}",
                    lag2[j]
                )));
            }
            if lag2[j] == 0 && lag1[j] <= 0 {
                return Err(FilterError::InvalidArgument(format!(
                    "when lag2[{j}] is 0, lag1[{j}] must be > 0, got {}",
                    lag1[j]
                )));
            }
        }
        let m = lag1.len();
        Ok(Self::build(lag1.to_vec(), lag2.to_vec(), vec![0; m]))
    }

    /// Build a 3-D lag set.
    pub fn new3(lag1: &[i32], lag2: &[i32], lag3: &[i32]) -> FilterResult<Self> {
        if lag1.is_empty() {
            return Err(FilterError::InvalidArgument(
                "lag arrays must be non-empty".into(),
            ));
        }
        if lag2.len() != lag1.len() || lag3.len() != lag1.len() {
            return Err(FilterError::InvalidArgument(format!(
                "lag2 length {} and lag3 length {} must equal lag1 length {}",
                lag2.len(),
                lag3.len(),
                lag1.len()
            )));
        }
        if lag1[0] != 0 || lag2[0] != 0 || lag3[0] != 0 {
            return Err(FilterError::InvalidArgument(
                "lag1[0], lag2[0] and lag3[0] must be 0".into(),
            ));
        }
        for j in 1..lag1.len() {
            if lag3[j] < 0 {
                return Err(FilterError::InvalidArgument(format!(
                    "lag3[{j}] must be >= 0, got {}",
                    lag3[j]
                )));
            }
            if lag3[j] == 0 {
                if lag2[j] < 0 {
                    return Err(FilterError::InvalidArgument(format!(
                        "when lag3[{j}] is 0, lag2[{j}] must be >= 0, got {}",
                        lag2[j]
                    )));
                }
                if lag2[j] == 0 && lag1[j] <= 0 {
                    return Err(FilterError::InvalidArgument(format!(
                        "when lag3[{j}] and lag2[{j}] are 0, lag1[{j}] must be > 0, got {}",
                        lag1[j]
                    )));
                }
            }
        }
        Ok(Self::build(lag1.to_vec(), lag2.to_vec(), lag3.to_vec()))
    }

    fn build(lag1: Vec<i32>, lag2: Vec<i32>, lag3: Vec<i32>) -> Self {
        let min1 = lag1.iter().copied().min().unwrap();
        let max1 = lag1.iter().copied().max().unwrap();
        let min2 = lag2.iter().copied().min().unwrap();
        let max2 = lag2.iter().copied().max().unwrap();
        let min3 = lag3.iter().copied().min().unwrap();
        let max3 = lag3.iter().copied().max().unwrap();
        Self {
            lag1,
            lag2,
            lag3,
            min1,
            max1,
            min2,
            max2,
            min3,
            max3,
        }
    }

    /// Number of lags (and coefficients) in this set.
    pub fn lag_count(&self) -> usize {
        self.lag1.len()
    }

    /// Lags in the first dimension.
    pub fn lag1(&self) -> &[i32] {
        &self.lag1
    }

    /// Lags in the second dimension (all zero for 1-D sets).
    pub fn lag2(&self) -> &[i32] {
        &self.lag2
    }

    /// Lags in the third dimension (all zero for 1-D and 2-D sets).
    pub fn lag3(&self) -> &[i32] {
        &self.lag3
    }

    /// Smallest lag in the first dimension.
    pub fn min1(&self) -> i32 {
        self.min1
    }

    /// Largest lag in the first dimension.
    pub fn max1(&self) -> i32 {
        self.max1
    }

    /// Smallest lag in the second dimension.
    pub fn min2(&self) -> i32 {
        self.min2
    }

    /// Largest lag in the second dimension.
    pub fn max2(&self) -> i32 {
        self.max2
    }

    /// Smallest lag in the third dimension.
    pub fn min3(&self) -> i32 {
        self.min3
    }

    /// Largest lag in the third dimension.
    pub fn max3(&self) -> i32 {
        self.max3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new1_valid() {
        let lags = HelixLags::new1(&[0, 1, 2, 5]).unwrap();
        assert_eq!(lags.lag_count(), 4);
        assert_eq!(lags.min1(), 0);
        assert_eq!(lags.max1(), 5);
        assert_eq!(lags.lag2(), &[0, 0, 0, 0]);
        assert_eq!(lags.max3(), 0);
    }

    #[test]
    fn test_new1_rejects_empty() {
        assert!(HelixLags::new1(&[]).is_err());
    }

    #[test]
    fn test_new1_rejects_nonzero_first_lag() {
        assert!(HelixLags::new1(&[1, 2]).is_err());
    }

    #[test]
    fn test_new1_rejects_nonpositive_lag() {
        assert!(HelixLags::new1(&[0, 0]).is_err());
        assert!(HelixLags::new1(&[0, 1, -1]).is_err());
    }

    #[test]
    fn test_new2_valid_with_negative_lag1() {
        let lags = HelixLags::new2(&[0, 1, -1, 0, 1], &[0, 0, 1, 1, 1]).unwrap();
        assert_eq!((lags.min1(), lags.max1()), (-1, 1));
        assert_eq!((lags.min2(), lags.max2()), (0, 1));
    }

    #[test]
    fn test_new2_rejects_negative_lag2() {
        assert!(HelixLags::new2(&[0, 0], &[0, -1]).is_err());
    }

    #[test]
    fn test_new2_rejects_acausal_row_zero() {
        // On the lag2 == 0 row, lag1 must be strictly positive.
        assert!(HelixLags::new2(&[0, -1], &[0, 0]).is_err());
        assert!(HelixLags::new2(&[0, 0], &[0, 0]).is_err());
    }

    #[test]
    fn test_new2_rejects_length_mismatch() {
        assert!(HelixLags::new2(&[0, 1], &[0]).is_err());
    }

    #[test]
    fn test_new3_valid() {
        let lags = HelixLags::new3(
            &[0, 1, -1, 0],
            &[0, 0, 1, -2],
            &[0, 0, 0, 1],
        )
        .unwrap();
        assert_eq!((lags.min2(), lags.max2()), (-2, 1));
        assert_eq!((lags.min3(), lags.max3()), (0, 1));
    }

    #[test]
    fn test_new3_rejects_negative_lag3() {
        assert!(HelixLags::new3(&[0, 0], &[0, 0], &[0, -1]).is_err());
    }

    #[test]
    fn test_new3_rejects_acausal_plane_zero() {
        // With lag3 == 0 the 2-D rules apply.
        assert!(HelixLags::new3(&[0, 0], &[0, -1], &[0, 0]).is_err());
        assert!(HelixLags::new3(&[0, -1], &[0, 0], &[0, 0]).is_err());
    }

    #[test]
    fn test_new3_rejects_length_mismatch() {
        assert!(HelixLags::new3(&[0, 1], &[0, 0], &[0]).is_err());
    }
}
