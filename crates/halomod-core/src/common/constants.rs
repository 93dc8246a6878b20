//! Process-wide halo-model configuration.
//!
//! The mass-integration bounds, quadrature tolerances, and subdivision limit
//! are fixed constants rather than per-call parameters; compatible results
//! require reproducing them exactly.

/// Lower bound of the halo-mass integrals, in solar masses.
pub const HALO_MASS_MIN: f64 = 1.0e7;

/// Upper bound of the halo-mass integrals, in solar masses.
pub const HALO_MASS_MAX: f64 = 1.0e17;

/// Absolute tolerance of the adaptive mass integrals.
pub const MASS_INTEGRAL_ABS_TOL: f64 = 0.0;

/// Relative tolerance of the adaptive mass integrals.
pub const MASS_INTEGRAL_REL_TOL: f64 = 1.0e-4;

/// Maximum number of subintervals an adaptive mass integral may hold.
pub const MASS_INTEGRAL_MAX_SUBDIVISIONS: usize = 1000;
