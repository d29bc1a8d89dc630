//! Wilson-Burg spectral factorization.
//!
//! Given a symmetric auto-correlation `R`, the Wilson-Burg iteration
//! updates a filter's coefficients so that the filter cascaded with its
//! transpose approximates `R`. At convergence `A * A' ~= R`, i.e. the
//! filter is the causal minimum-phase factor of `R`.
//!
//! Each iteration computes `U(z) + U(1/z) = 1 + R(z)/(A(z) A(1/z))` via
//! the inverse-transpose and inverse operators, keeps the causal half of
//! `U` (halving the zero lag, zeroing everything before it on the helix),
//! and multiplies by `A` to obtain the updated coefficients. The working
//! arrays are zero-padded well beyond the extent of `R` because `1/A'`
//! has infinite support; the zero lag of `R` is placed off-center, near
//! the causal end of the padded array, to minimize truncation of the
//! anti-causal `1/A'` tail.
//!
//! Iterations stop once the squared change of every coefficient is at
//! most `epsilon` times the zero lag of `R`. If that never happens within
//! `maxiter` iterations the factorization fails with
//! [`FilterError::NotConverged`](crate::FilterError::NotConverged) and
//! the coefficients keep their last-iteration values.
//!
//! ## Example
//!
//! ```
//! use helix_filter::{HelixLags, MinimumPhaseFilter};
//!
//! // Auto-correlation of the filter (1.0, -0.9, 0.2), zero-padded to
//! // odd length 11 with the zero lag in the middle.
//! let mut r = vec![0.0_f32; 11];
//! r[5] = 1.85;
//! r[4] = -1.08;
//! r[6] = -1.08;
//! r[3] = 0.2;
//! r[7] = 0.2;
//!
//! let mut filter = MinimumPhaseFilter::new(HelixLags::new1(&[0, 1, 2, 3, 4]).unwrap());
//! filter.factor_wilson_burg1(100, 1e-6, &r).unwrap();
//! assert!((filter.coefficients()[0] - 1.0).abs() < 1e-2);
//! assert!((filter.coefficients()[1] + 0.9).abs() < 1e-2);
//! assert!((filter.coefficients()[2] - 0.2).abs() < 1e-2);
//! ```

use tracing::{debug, trace};

use crate::grid::{Grid2, Grid3};
use crate::minimum_phase::MinimumPhaseFilter;
use crate::types::{FilterError, FilterResult};

impl MinimumPhaseFilter {
    /// Factor a 1-D auto-correlation, overwriting this filter's
    /// coefficients with the causal minimum-phase factor of `r`.
    ///
    /// `r` must have odd length; its middle element is the zero lag and
    /// the others are symmetric about it. The initial coefficients of
    /// this filter are ignored; only its lag geometry matters.
    pub fn factor_wilson_burg1(
        &mut self,
        maxiter: usize,
        epsilon: f32,
        r: &[f32],
    ) -> FilterResult<()> {
        validate_iteration_args(maxiter, epsilon)?;
        if r.len() % 2 != 1 {
            return Err(FilterError::InvalidArgument(format!(
                "auto-correlation length must be odd, got {}",
                r.len()
            )));
        }

        // Extent of this filter's impulse response, and the padded
        // workspace length. 1/A' has infinite support, so the padding can
        // only reduce truncation, never eliminate it; one hundred times
        // the filter extent is assumed to be enough.
        let m1 = (self.lags.max1() - self.lags.min1()) as usize;
        let n1 = r.len() + 100 * m1;

        // Zero-lag indices of r and of the padded workspace. The padded
        // zero lag sits near the causal end, not in the middle, so that
        // most of the padding absorbs the anti-causal 1/A' tail.
        let l1 = (r.len() - 1) / 2;
        let k1 = n1 - 1 - self.lags.max1() as usize;

        let mut s = vec![0.0_f32; n1];
        let mut t = vec![0.0_f32; n1];
        let mut u = vec![0.0_f32; n1];

        // S is R surrounded by zeros. Lags of r beyond the causal end of
        // the workspace are dropped; symmetry of r keeps that lossless.
        let o1 = k1 - l1;
        let c1 = r.len().min(n1 - o1);
        s[o1..o1 + c1].copy_from_slice(&r[..c1]);

        // Initial factor matches the zero lag of R.
        self.a.fill(0.0);
        self.a[0] = s[k1].sqrt();
        self.a0 = self.a[0];
        self.a0i = 1.0 / self.a[0];

        let eemax = s[k1] * epsilon;
        for niter in 0..maxiter {
            // U(z) + U(1/z) = 1 + S(z)/(A(z) A(1/z))
            self.apply_inverse_transpose1(&s, &mut t);
            self.apply_inverse1(&t, &mut u);
            u[k1] += 1.0;

            // U(z) is the causal part we want; zero the anti-causal part.
            u[k1] *= 0.5;
            u[..k1].fill(0.0);

            // The new A(z) is T(z) = U(z) A(z).
            self.apply1(&u, &mut t);
            let mut converged = true;
            for j in 0..self.a.len() {
                let j1 = k1 as isize + self.lags.lag1()[j] as isize;
                if 0 <= j1 && (j1 as usize) < n1 {
                    let aj = t[j1 as usize];
                    if converged {
                        let e = self.a[j] - aj;
                        converged = e * e <= eemax;
                    }
                    self.a[j] = aj;
                }
            }
            self.a0 = self.a[0];
            self.a0i = 1.0 / self.a[0];
            trace!(niter, a0 = self.a0, "Wilson-Burg iteration");
            if converged {
                debug!(niter, "Wilson-Burg converged");
                return Ok(());
            }
        }
        Err(FilterError::NotConverged { maxiter })
    }

    /// Factor a 2-D auto-correlation, overwriting this filter's
    /// coefficients with the causal minimum-phase factor of `r`.
    ///
    /// Both extents of `r` must be odd; its middle element is the zero
    /// lag and the others are symmetric about it.
    pub fn factor_wilson_burg2(
        &mut self,
        maxiter: usize,
        epsilon: f32,
        r: &Grid2,
    ) -> FilterResult<()> {
        validate_iteration_args(maxiter, epsilon)?;
        let (rn1, rn2) = r.dims();
        if rn1 % 2 != 1 || rn2 % 2 != 1 {
            return Err(FilterError::InvalidArgument(format!(
                "auto-correlation extents must be odd, got {rn1} x {rn2}"
            )));
        }

        let m1 = (self.lags.max1() - self.lags.min1()) as usize;
        let m2 = (self.lags.max2() - self.lags.min2()) as usize;
        let n1 = rn1 + 100 * m1;
        let n2 = rn2 + 100 * m2;

        let l1 = (rn1 - 1) / 2;
        let l2 = (rn2 - 1) / 2;
        let k1 = n1 - 1 - self.lags.max1() as usize;
        let k2 = n2 - 1 - self.lags.max2() as usize;

        let mut s = Grid2::zeros(n1, n2);
        let mut t = Grid2::zeros(n1, n2);
        let mut u = Grid2::zeros(n1, n2);
        s.paste(r, k1 - l1, k2 - l2);

        self.a.fill(0.0);
        self.a[0] = s.at(k1, k2).sqrt();
        self.a0 = self.a[0];
        self.a0i = 1.0 / self.a[0];

        let eemax = s.at(k1, k2) * epsilon;
        for niter in 0..maxiter {
            self.apply_inverse_transpose2(&s, &mut t);
            self.apply_inverse2(&t, &mut u);
            let uc = (u.at(k1, k2) + 1.0) * 0.5;
            u.set(k1, k2, uc);

            // Zero everything lexicographically before the zero lag on
            // the helix: whole rows below k2, then the head of row k2.
            {
                let us = u.as_mut_slice();
                us[..k2 * n1].fill(0.0);
                us[k2 * n1..k2 * n1 + k1].fill(0.0);
            }

            self.apply2(&u, &mut t);
            let mut converged = true;
            for j in 0..self.a.len() {
                let j1 = k1 as isize + self.lags.lag1()[j] as isize;
                let j2 = k2 as isize + self.lags.lag2()[j] as isize;
                if 0 <= j1 && (j1 as usize) < n1 && 0 <= j2 && (j2 as usize) < n2 {
                    let aj = t.at(j1 as usize, j2 as usize);
                    if converged {
                        let e = self.a[j] - aj;
                        converged = e * e <= eemax;
                    }
                    self.a[j] = aj;
                }
            }
            self.a0 = self.a[0];
            self.a0i = 1.0 / self.a[0];
            trace!(niter, a0 = self.a0, "Wilson-Burg iteration");
            if converged {
                debug!(niter, "Wilson-Burg converged");
                return Ok(());
            }
        }
        Err(FilterError::NotConverged { maxiter })
    }

    /// Factor a 3-D auto-correlation, overwriting this filter's
    /// coefficients with the causal minimum-phase factor of `r`.
    ///
    /// All three extents of `r` must be odd; its middle element is the
    /// zero lag and the others are symmetric about it.
    pub fn factor_wilson_burg3(
        &mut self,
        maxiter: usize,
        epsilon: f32,
        r: &Grid3,
    ) -> FilterResult<()> {
        validate_iteration_args(maxiter, epsilon)?;
        let (rn1, rn2, rn3) = r.dims();
        if rn1 % 2 != 1 || rn2 % 2 != 1 || rn3 % 2 != 1 {
            return Err(FilterError::InvalidArgument(format!(
                "auto-correlation extents must be odd, got {rn1} x {rn2} x {rn3}"
            )));
        }

        let m1 = (self.lags.max1() - self.lags.min1()) as usize;
        let m2 = (self.lags.max2() - self.lags.min2()) as usize;
        let m3 = (self.lags.max3() - self.lags.min3()) as usize;
        let n1 = rn1 + 100 * m1;
        let n2 = rn2 + 100 * m2;
        let n3 = rn3 + 100 * m3;

        let l1 = (rn1 - 1) / 2;
        let l2 = (rn2 - 1) / 2;
        let l3 = (rn3 - 1) / 2;
        let k1 = n1 - 1 - self.lags.max1() as usize;
        let k2 = n2 - 1 - self.lags.max2() as usize;
        let k3 = n3 - 1 - self.lags.max3() as usize;

        let mut s = Grid3::zeros(n1, n2, n3);
        let mut t = Grid3::zeros(n1, n2, n3);
        let mut u = Grid3::zeros(n1, n2, n3);
        s.paste(r, k1 - l1, k2 - l2, k3 - l3);

        self.a.fill(0.0);
        self.a[0] = s.at(k1, k2, k3).sqrt();
        self.a0 = self.a[0];
        self.a0i = 1.0 / self.a[0];

        let eemax = s.at(k1, k2, k3) * epsilon;
        for niter in 0..maxiter {
            self.apply_inverse_transpose3(&s, &mut t);
            self.apply_inverse3(&t, &mut u);
            let uc = (u.at(k1, k2, k3) + 1.0) * 0.5;
            u.set(k1, k2, k3, uc);

            // Zero everything lexicographically before the zero lag on
            // the helix: whole planes below k3, whole rows of plane k3
            // below k2, then the head of row (k2, k3).
            {
                let us = u.as_mut_slice();
                let plane = n2 * n1;
                us[..k3 * plane].fill(0.0);
                us[k3 * plane..k3 * plane + k2 * n1].fill(0.0);
                us[k3 * plane + k2 * n1..k3 * plane + k2 * n1 + k1].fill(0.0);
            }

            self.apply3(&u, &mut t);
            let mut converged = true;
            for j in 0..self.a.len() {
                let j1 = k1 as isize + self.lags.lag1()[j] as isize;
                let j2 = k2 as isize + self.lags.lag2()[j] as isize;
                let j3 = k3 as isize + self.lags.lag3()[j] as isize;
                if 0 <= j1
                    && (j1 as usize) < n1
                    && 0 <= j2
                    && (j2 as usize) < n2
                    && 0 <= j3
                    && (j3 as usize) < n3
                {
                    let aj = t.at(j1 as usize, j2 as usize, j3 as usize);
                    if converged {
                        let e = self.a[j] - aj;
                        converged = e * e <= eemax;
                    }
                    self.a[j] = aj;
                }
            }
            self.a0 = self.a[0];
            self.a0i = 1.0 / self.a[0];
            trace!(niter, a0 = self.a0, "Wilson-Burg iteration");
            if converged {
                debug!(niter, "Wilson-Burg converged");
                return Ok(());
            }
        }
        Err(FilterError::NotConverged { maxiter })
    }
}

fn validate_iteration_args(maxiter: usize, epsilon: f32) -> FilterResult<()> {
    if maxiter < 1 {
        return Err(FilterError::InvalidArgument(
            "maxiter must be at least 1".into(),
        ));
    }
    if !(epsilon > 0.0) {
        return Err(FilterError::InvalidArgument(format!(
            "epsilon must be positive, got {epsilon}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lags::HelixLags;

    /// Auto-correlation of the three-tap filter (1.0, -0.9, 0.2), padded
    /// to odd length 11.
    fn reference_autocorrelation_1d() -> Vec<f32> {
        let f = [1.0_f32, -0.9, 0.2];
        let mut r = vec![0.0_f32; 11];
        for k in 0..3_usize {
            let mut rk = 0.0;
            for n in 0..3 - k {
                rk += f[n] * f[n + k];
            }
            r[5 + k] = rk;
            r[5 - k] = rk;
        }
        r
    }

    /// Cascade a filter with its transpose on a centered 2-D impulse and
    /// cut out the central window, giving an exact auto-correlation when
    /// the window covers the cascade's support.
    fn autocorrelation_2d(f: &MinimumPhaseFilter, rn1: usize, rn2: usize) -> Grid2 {
        let (n1, n2) = (rn1 + 8, rn2 + 8);
        let (c1, c2) = (n1 / 2, n2 / 2);
        let mut d = Grid2::zeros(n1, n2);
        d.set(c1, c2, 1.0);
        let mut u = Grid2::zeros(n1, n2);
        f.apply_transpose2(&d, &mut u);
        let mut w = Grid2::zeros(n1, n2);
        f.apply2(&u, &mut w);
        let mut r = Grid2::zeros(rn1, rn2);
        for i2 in 0..rn2 {
            for i1 in 0..rn1 {
                r.set(i1, i2, w.at(c1 - rn1 / 2 + i1, c2 - rn2 / 2 + i2));
            }
        }
        r
    }

    fn autocorrelation_3d(f: &MinimumPhaseFilter, rn1: usize, rn2: usize, rn3: usize) -> Grid3 {
        let (n1, n2, n3) = (rn1 + 8, rn2 + 8, rn3 + 8);
        let (c1, c2, c3) = (n1 / 2, n2 / 2, n3 / 2);
        let mut d = Grid3::zeros(n1, n2, n3);
        d.set(c1, c2, c3, 1.0);
        let mut u = Grid3::zeros(n1, n2, n3);
        f.apply_transpose3(&d, &mut u);
        let mut w = Grid3::zeros(n1, n2, n3);
        f.apply3(&u, &mut w);
        let mut r = Grid3::zeros(rn1, rn2, rn3);
        for i3 in 0..rn3 {
            for i2 in 0..rn2 {
                for i1 in 0..rn1 {
                    r.set(
                        i1,
                        i2,
                        i3,
                        w.at(c1 - rn1 / 2 + i1, c2 - rn2 / 2 + i2, c3 - rn3 / 2 + i3),
                    );
                }
            }
        }
        r
    }

    #[test]
    fn test_factor1_recovers_known_filter() {
        let r = reference_autocorrelation_1d();
        let mut f = MinimumPhaseFilter::new(HelixLags::new1(&[0, 1, 2, 3, 4]).unwrap());
        f.factor_wilson_burg1(100, 1e-6, &r).unwrap();
        let a = f.coefficients();
        assert!((a[0] - 1.0).abs() < 1e-3, "a[0] = {}", a[0]);
        assert!((a[1] + 0.9).abs() < 1e-3, "a[1] = {}", a[1]);
        assert!((a[2] - 0.2).abs() < 1e-3, "a[2] = {}", a[2]);
        assert!(a[3].abs() < 1e-3, "a[3] = {}", a[3]);
        assert!(a[4].abs() < 1e-3, "a[4] = {}", a[4]);
        assert_eq!(f.a0(), a[0]);
    }

    #[test]
    fn test_factor1_cascade_matches_autocorrelation() {
        let r = reference_autocorrelation_1d();
        let mut f = MinimumPhaseFilter::new(HelixLags::new1(&[0, 1, 2, 3, 4]).unwrap());
        f.factor_wilson_burg1(100, 1e-6, &r).unwrap();
        // Cascade the factored filter with its transpose on an impulse.
        let n = 21;
        let mut d = vec![0.0_f32; n];
        d[10] = 1.0;
        let mut u = vec![0.0_f32; n];
        f.apply_transpose1(&d, &mut u);
        let mut w = vec![0.0_f32; n];
        f.apply1(&u, &mut w);
        for k in -5_i32..=5 {
            let got = w[(10 + k) as usize];
            let want = r[(5 + k) as usize];
            assert!((got - want).abs() < 1e-2, "lag {k}: got {got}, want {want}");
        }
    }

    #[test]
    fn test_factor1_does_not_converge_in_one_iteration() {
        let r = reference_autocorrelation_1d();
        let mut f = MinimumPhaseFilter::new(HelixLags::new1(&[0, 1, 2, 3, 4]).unwrap());
        let err = f.factor_wilson_burg1(1, 1e-6, &r).unwrap_err();
        assert_eq!(err, FilterError::NotConverged { maxiter: 1 });
        // Coefficients keep their last-iteration values.
        assert!(f.a0() != 1.0);
        assert!(f.a0() > 0.0);
    }

    #[test]
    fn test_factor1_rejects_bad_arguments() {
        let mut f = MinimumPhaseFilter::new(HelixLags::new1(&[0, 1]).unwrap());
        let r_even = vec![0.0_f32; 10];
        assert!(matches!(
            f.factor_wilson_burg1(10, 1e-6, &r_even),
            Err(FilterError::InvalidArgument(_))
        ));
        let r = vec![0.0_f32; 11];
        assert!(matches!(
            f.factor_wilson_burg1(0, 1e-6, &r),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(matches!(
            f.factor_wilson_burg1(10, 0.0, &r),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(matches!(
            f.factor_wilson_burg1(10, -1.0, &r),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_factor2_recovers_known_filter() {
        let lags = HelixLags::new2(&[0, 1, 0], &[0, 0, 1]).unwrap();
        let truth =
            MinimumPhaseFilter::with_coefficients(lags.clone(), &[1.0, -0.4, -0.3]).unwrap();
        let r = autocorrelation_2d(&truth, 5, 5);
        let mut f = MinimumPhaseFilter::new(lags);
        f.factor_wilson_burg2(100, 1e-6, &r).unwrap();
        for (got, want) in f.coefficients().iter().zip(truth.coefficients()) {
            assert!((got - want).abs() < 1e-3, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_factor2_rejects_even_extent() {
        let mut f = MinimumPhaseFilter::new(HelixLags::new2(&[0, 1], &[0, 0]).unwrap());
        let r = Grid2::zeros(4, 5);
        assert!(matches!(
            f.factor_wilson_burg2(10, 1e-6, &r),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_factor3_recovers_filter_in_planes_one_and_three() {
        let lags = HelixLags::new3(&[0, 1, 0], &[0, 0, 0], &[0, 0, 1]).unwrap();
        let truth =
            MinimumPhaseFilter::with_coefficients(lags.clone(), &[1.0, -0.4, -0.25]).unwrap();
        let r = autocorrelation_3d(&truth, 3, 1, 3);
        let mut f = MinimumPhaseFilter::new(lags);
        f.factor_wilson_burg3(100, 1e-6, &r).unwrap();
        for (got, want) in f.coefficients().iter().zip(truth.coefficients()) {
            assert!((got - want).abs() < 1e-3, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_factor3_recovers_filter_in_planes_one_and_two() {
        let lags = HelixLags::new3(&[0, 1, 0], &[0, 0, 1], &[0, 0, 0]).unwrap();
        let truth =
            MinimumPhaseFilter::with_coefficients(lags.clone(), &[1.0, -0.35, -0.3]).unwrap();
        let r = autocorrelation_3d(&truth, 3, 3, 1);
        let mut f = MinimumPhaseFilter::new(lags);
        f.factor_wilson_burg3(100, 1e-6, &r).unwrap();
        for (got, want) in f.coefficients().iter().zip(truth.coefficients()) {
            assert!((got - want).abs() < 1e-3, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_factor3_rejects_even_extent() {
        let mut f =
            MinimumPhaseFilter::new(HelixLags::new3(&[0, 1], &[0, 0], &[0, 0]).unwrap());
        let r = Grid3::zeros(3, 3, 2);
        assert!(matches!(
            f.factor_wilson_burg3(10, 1e-6, &r),
            Err(FilterError::InvalidArgument(_))
        ));
    }
}
