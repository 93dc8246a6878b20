//! Sine and cosine integrals `Si(x)` and `Ci(x)`.
//!
//! Both values come out of a single evaluation: a joint power series below
//! [`SERIES_CROSSOVER`], and above it a modified Lentz continued fraction for
//! the complex exponential integral `E1(ix)`, whose real and imaginary parts
//! carry `Ci` and `Si` together.

use num_complex::Complex64;
use std::f64::consts::FRAC_PI_2;

const SERIES_CROSSOVER: f64 = 3.0;
const SERIES_MAX_ITER: usize = 160;
const CONTINUED_FRACTION_MAX_ITER: usize = 400;
const CONVERGENCE_REL_TOL: f64 = 1.0e-15;
const TINY_ARGUMENT: f64 = 1.0e-150;
const FLOOR: f64 = 1.0e-300;
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineCosineIntegrals {
    pub sine_integral: f64,
    pub cosine_integral: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ExpIntError {
    #[error("sine/cosine integrals require a finite argument, got {argument}")]
    NonFiniteArgument { argument: f64 },
    #[error("sine/cosine integrals require argument > 0, got {argument}")]
    NonPositiveArgument { argument: f64 },
    #[error("joint Si/Ci power series failed to converge at argument {argument}")]
    SeriesDivergence { argument: f64 },
    #[error("continued fraction for E1(ix) failed to converge at argument {argument}")]
    ContinuedFractionDivergence { argument: f64 },
}

pub fn sine_integral(argument: f64) -> Result<f64, ExpIntError> {
    sine_cosine_integrals(argument).map(|values| values.sine_integral)
}

pub fn cosine_integral(argument: f64) -> Result<f64, ExpIntError> {
    sine_cosine_integrals(argument).map(|values| values.cosine_integral)
}

pub fn sine_cosine_integrals(argument: f64) -> Result<SineCosineIntegrals, ExpIntError> {
    if !argument.is_finite() {
        return Err(ExpIntError::NonFiniteArgument { argument });
    }
    if argument <= 0.0 {
        return Err(ExpIntError::NonPositiveArgument { argument });
    }

    if argument > SERIES_CROSSOVER {
        continued_fraction(argument)
    } else {
        joint_series(argument)
    }
}

/// `E1(ix) = -Ci(x) + i (Si(x) - pi/2)`, evaluated with the modified Lentz
/// algorithm. Valid for arguments above the series crossover.
fn continued_fraction(argument: f64) -> Result<SineCosineIntegrals, ExpIntError> {
    let mut b = Complex64::new(1.0, argument);
    let mut c = Complex64::new(1.0 / FLOOR, 0.0);
    let mut d = Complex64::new(1.0, 0.0) / b;
    let mut h = d;

    let mut converged = false;
    for iteration in 2..=CONTINUED_FRACTION_MAX_ITER {
        let numerator = -(((iteration - 1) * (iteration - 1)) as f64);
        b += Complex64::new(2.0, 0.0);
        d = (numerator * d + b).inv();
        c = b + Complex64::new(numerator, 0.0) / c;
        let delta = c * d;
        h *= delta;
        if (delta.re - 1.0).abs() + delta.im.abs() < CONVERGENCE_REL_TOL {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(ExpIntError::ContinuedFractionDivergence { argument });
    }

    h *= Complex64::new(argument.cos(), -argument.sin());
    Ok(SineCosineIntegrals {
        sine_integral: FRAC_PI_2 + h.im,
        cosine_integral: -h.re,
    })
}

/// Joint alternating series: odd powers accumulate `Si`, even powers the
/// non-logarithmic part of `Ci`.
fn joint_series(argument: f64) -> Result<SineCosineIntegrals, ExpIntError> {
    let mut sine_sum = argument;
    let mut cosine_sum = 0.0;

    if argument >= TINY_ARGUMENT {
        let mut active = 0.0;
        let mut parked = 0.0;
        let mut sign = 1.0;
        let mut factor = 1.0;
        let mut odd = true;
        let mut converged = false;

        for term_index in 1..=SERIES_MAX_ITER {
            factor *= argument / term_index as f64;
            let term = factor / term_index as f64;
            active += sign * term;
            let relative = term / active.abs();
            if odd {
                sign = -sign;
                sine_sum = active;
                active = parked;
                parked = sine_sum;
            } else {
                cosine_sum = active;
                active = parked;
                parked = cosine_sum;
            }
            if relative < CONVERGENCE_REL_TOL {
                converged = true;
                break;
            }
            odd = !odd;
        }
        if !converged {
            return Err(ExpIntError::SeriesDivergence { argument });
        }
    }

    Ok(SineCosineIntegrals {
        sine_integral: sine_sum,
        cosine_integral: EULER_GAMMA + argument.ln() + cosine_sum,
    })
}
