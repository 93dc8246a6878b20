//! Adaptive global quadrature on a finite interval.
//!
//! Each subinterval is estimated with a 15-point Gauss-Kronrod panel; the
//! subinterval with the largest error bound is bisected until the summed
//! error bound satisfies `max(abs_tolerance, rel_tolerance * |result|)` or
//! the subdivision limit is reached. The integrand is fallible: its first
//! error aborts the integration and is handed back to the caller.

/// Kronrod abscissae on [0, 1], outermost first; the last entry is the
/// panel centre. Odd indices are the embedded 7-point Gauss abscissae.
const KRONROD_NODES: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_33,
    0.949_107_912_342_758_524_526_189_684_047_85,
    0.864_864_423_359_769_072_789_712_788_640_93,
    0.741_531_185_599_394_439_863_864_773_280_79,
    0.586_087_235_467_691_130_294_144_838_258_73,
    0.405_845_151_377_397_166_906_606_412_076_96,
    0.207_784_955_007_898_467_600_689_403_773_24,
    0.0,
];

const KRONROD_WEIGHTS: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_97,
    0.063_092_092_629_978_553_290_700_663_189_2,
    0.104_790_010_322_250_183_839_876_322_541_52,
    0.140_653_259_715_525_918_745_189_590_510_24,
    0.169_004_726_639_267_902_826_583_426_598_55,
    0.190_350_578_064_785_409_913_256_402_421_01,
    0.204_432_940_075_298_892_414_161_999_234_65,
    0.209_482_141_084_727_828_012_999_174_891_71,
];

const GAUSS_WEIGHTS: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_08,
    0.279_705_391_489_276_667_901_467_771_423_78,
    0.381_830_050_505_118_944_950_369_775_488_97,
    0.417_959_183_673_469_387_755_102_040_816_33,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureConfig {
    pub abs_tolerance: f64,
    pub rel_tolerance: f64,
    pub max_subdivisions: usize,
}

impl QuadratureConfig {
    pub fn new(abs_tolerance: f64, rel_tolerance: f64, max_subdivisions: usize) -> Self {
        Self {
            abs_tolerance,
            rel_tolerance,
            max_subdivisions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureOutcome {
    pub value: f64,
    pub abs_error: f64,
    pub subdivisions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum QuadratureError {
    #[error("integration bounds must be finite with lower < upper, got [{lower}, {upper}]")]
    InvalidBounds { lower: f64, upper: f64 },
    #[error(
        "quadrature tolerances must be finite, non-negative, and not both zero, got abs={abs_tolerance}, rel={rel_tolerance}"
    )]
    InvalidTolerance {
        abs_tolerance: f64,
        rel_tolerance: f64,
    },
    #[error("quadrature subdivision limit must be at least 1, got {max_subdivisions}")]
    InvalidSubdivisionLimit { max_subdivisions: usize },
    #[error("integrand returned a non-finite value at abscissa {abscissa}")]
    NonFiniteIntegrand { abscissa: f64 },
    #[error(
        "requested tolerance not reached after {subdivisions} subdivisions, best estimate {estimate:e} with error bound {abs_error:e}"
    )]
    ToleranceNotReached {
        subdivisions: usize,
        estimate: f64,
        abs_error: f64,
    },
}

/// Failure of an adaptive integration: either the integrand reported an
/// error, or the quadrature itself could not deliver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuadratureFailure<E> {
    #[error("integrand evaluation failed: {0}")]
    Integrand(E),
    #[error("{0}")]
    Quadrature(#[from] QuadratureError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    lower: f64,
    upper: f64,
    value: f64,
    abs_error: f64,
}

pub fn integrate_adaptive<F, E>(
    mut integrand: F,
    lower: f64,
    upper: f64,
    config: QuadratureConfig,
) -> Result<QuadratureOutcome, QuadratureFailure<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    validate(lower, upper, config)?;

    // The segment list is the integration workspace; it lives exactly as
    // long as this call and is dropped on every exit path.
    let mut segments = Vec::with_capacity(config.max_subdivisions.min(64));
    segments.push(gauss_kronrod_panel(&mut integrand, lower, upper)?);

    loop {
        let value: f64 = segments.iter().map(|segment| segment.value).sum();
        let abs_error: f64 = segments.iter().map(|segment| segment.abs_error).sum();
        let target = config.abs_tolerance.max(config.rel_tolerance * value.abs());

        if abs_error <= target {
            return Ok(QuadratureOutcome {
                value,
                abs_error,
                subdivisions: segments.len(),
            });
        }
        if segments.len() >= config.max_subdivisions {
            return Err(QuadratureFailure::Quadrature(
                QuadratureError::ToleranceNotReached {
                    subdivisions: segments.len(),
                    estimate: value,
                    abs_error,
                },
            ));
        }

        let worst = worst_segment_index(&segments);
        let segment = segments.swap_remove(worst);
        let midpoint = 0.5 * (segment.lower + segment.upper);
        if midpoint <= segment.lower || midpoint >= segment.upper {
            // Interval too narrow to bisect in floating point.
            return Err(QuadratureFailure::Quadrature(
                QuadratureError::ToleranceNotReached {
                    subdivisions: segments.len() + 1,
                    estimate: value,
                    abs_error,
                },
            ));
        }
        segments.push(gauss_kronrod_panel(&mut integrand, segment.lower, midpoint)?);
        segments.push(gauss_kronrod_panel(&mut integrand, midpoint, segment.upper)?);
    }
}

fn validate(lower: f64, upper: f64, config: QuadratureConfig) -> Result<(), QuadratureError> {
    if !lower.is_finite() || !upper.is_finite() || lower >= upper {
        return Err(QuadratureError::InvalidBounds { lower, upper });
    }
    let abs_ok = config.abs_tolerance.is_finite() && config.abs_tolerance >= 0.0;
    let rel_ok = config.rel_tolerance.is_finite() && config.rel_tolerance >= 0.0;
    if !abs_ok || !rel_ok || (config.abs_tolerance == 0.0 && config.rel_tolerance == 0.0) {
        return Err(QuadratureError::InvalidTolerance {
            abs_tolerance: config.abs_tolerance,
            rel_tolerance: config.rel_tolerance,
        });
    }
    if config.max_subdivisions == 0 {
        return Err(QuadratureError::InvalidSubdivisionLimit {
            max_subdivisions: config.max_subdivisions,
        });
    }
    Ok(())
}

fn worst_segment_index(segments: &[Segment]) -> usize {
    let mut worst = 0;
    for (index, segment) in segments.iter().enumerate().skip(1) {
        if segment.abs_error > segments[worst].abs_error {
            worst = index;
        }
    }
    worst
}

fn evaluate<F, E>(integrand: &mut F, abscissa: f64) -> Result<f64, QuadratureFailure<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let value = integrand(abscissa).map_err(QuadratureFailure::Integrand)?;
    if !value.is_finite() {
        return Err(QuadratureFailure::Quadrature(
            QuadratureError::NonFiniteIntegrand { abscissa },
        ));
    }
    Ok(value)
}

fn gauss_kronrod_panel<F, E>(
    integrand: &mut F,
    lower: f64,
    upper: f64,
) -> Result<Segment, QuadratureFailure<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let center = 0.5 * (lower + upper);
    let half_length = 0.5 * (upper - lower);

    let center_value = evaluate(integrand, center)?;
    let mut below = [0.0_f64; 7];
    let mut above = [0.0_f64; 7];
    for (offset_index, node) in KRONROD_NODES.iter().take(7).enumerate() {
        let offset = half_length * node;
        below[offset_index] = evaluate(integrand, center - offset)?;
        above[offset_index] = evaluate(integrand, center + offset)?;
    }

    let mut gauss = GAUSS_WEIGHTS[3] * center_value;
    for pair in 0..3 {
        let node_index = 2 * pair + 1;
        gauss += GAUSS_WEIGHTS[pair] * (below[node_index] + above[node_index]);
    }

    let mut kronrod = KRONROD_WEIGHTS[7] * center_value;
    let mut resabs = KRONROD_WEIGHTS[7] * center_value.abs();
    for node_index in 0..7 {
        kronrod += KRONROD_WEIGHTS[node_index] * (below[node_index] + above[node_index]);
        resabs += KRONROD_WEIGHTS[node_index]
            * (below[node_index].abs() + above[node_index].abs());
    }

    let kronrod_mean = 0.5 * kronrod;
    let mut resasc = KRONROD_WEIGHTS[7] * (center_value - kronrod_mean).abs();
    for node_index in 0..7 {
        resasc += KRONROD_WEIGHTS[node_index]
            * ((below[node_index] - kronrod_mean).abs()
                + (above[node_index] - kronrod_mean).abs());
    }

    let value = kronrod * half_length;
    let resabs = resabs * half_length.abs();
    let resasc = resasc * half_length.abs();

    let mut abs_error = ((kronrod - gauss) * half_length).abs();
    if resasc != 0.0 && abs_error != 0.0 {
        abs_error = resasc * (200.0 * abs_error / resasc).powf(1.5).min(1.0);
    }
    let round_off_threshold = f64::MIN_POSITIVE / (50.0 * f64::EPSILON);
    if resabs > round_off_threshold {
        abs_error = abs_error.max(50.0 * f64::EPSILON * resabs);
    }

    Ok(Segment {
        lower,
        upper,
        value,
        abs_error,
    })
}
