//! Numerical parameters and presets.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for adaptive Romberg quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuadratureParams {
    /// Stop once successive extrapolations differ by less than this.
    pub abs_tolerance: f64,

    /// Stop once the percent-scaled relative change drops below this.
    pub rel_tolerance: f64,

    /// Refinement levels always performed before testing convergence.
    pub min_levels: usize,

    /// Hard cap on refinement levels (level `n` uses `2^n` panels).
    pub max_levels: usize,
}

impl Default for QuadratureParams {
    fn default() -> Self {
        Self {
            abs_tolerance: 1e-10,
            rel_tolerance: 1e-10,
            min_levels: 3,
            max_levels: 20,
        }
    }
}

impl QuadratureParams {
    /// Tighter tolerances for reference computations.
    #[must_use]
    pub fn precise() -> Self {
        Self {
            abs_tolerance: 1e-13,
            rel_tolerance: 1e-12,
            min_levels: 4,
            max_levels: 24,
        }
    }

    /// Looser tolerances for interactive sampling.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            abs_tolerance: 1e-7,
            rel_tolerance: 1e-6,
            min_levels: 2,
            max_levels: 14,
        }
    }

    /// Set the absolute tolerance.
    #[must_use]
    pub const fn with_abs_tolerance(mut self, tolerance: f64) -> Self {
        self.abs_tolerance = tolerance;
        self
    }

    /// Set the relative tolerance.
    #[must_use]
    pub const fn with_rel_tolerance(mut self, tolerance: f64) -> Self {
        self.rel_tolerance = tolerance;
        self
    }

    /// Set the maximum refinement depth.
    #[must_use]
    pub const fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    /// Set the minimum refinement depth.
    #[must_use]
    pub const fn with_min_levels(mut self, levels: usize) -> Self {
        self.min_levels = levels;
        self
    }
}

/// Thresholds used when compiling curvature families.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompileParams {
    /// A raw range `|k(1) - k(0)|` below this cannot be normalized.
    pub range_epsilon: f64,

    /// Join slopes below this are treated as unit slope.
    pub slope_epsilon: f64,

    /// Total curvature capacity below this falls back to length shares.
    pub capacity_epsilon: f64,

    /// Samples used to decide whether a raw shape is constant.
    pub constancy_samples: usize,
}

impl Default for CompileParams {
    fn default() -> Self {
        Self {
            range_epsilon: 1e-12,
            slope_epsilon: 1e-12,
            capacity_epsilon: 1e-12,
            constancy_samples: 9,
        }
    }
}

impl CompileParams {
    /// Set the range epsilon.
    #[must_use]
    pub const fn with_range_epsilon(mut self, epsilon: f64) -> Self {
        self.range_epsilon = epsilon;
        self
    }

    /// Set the slope epsilon.
    #[must_use]
    pub const fn with_slope_epsilon(mut self, epsilon: f64) -> Self {
        self.slope_epsilon = epsilon;
        self
    }
}
