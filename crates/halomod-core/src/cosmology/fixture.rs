//! Deterministic closed-form cosmology for demonstrations and tests.
//!
//! Every service is an elementary analytic expression of a small parameter
//! set, so fixture runs are exactly reproducible and cheap. The parameter
//! set is serde-loadable so CLI runs can swap fixtures without rebuilding.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use super::{ContextResult, CosmologyContext, CosmologyServiceError};

/// Bryan & Norman (1998) virial-overdensity fitting formula,
/// `(18 pi^2 + 82 x - 39 x^2) / Omega_m` with `x = Omega_m - 1`, expressed
/// relative to the mean matter density.
pub fn bryan_norman_overdensity(matter_fraction: f64) -> f64 {
    let x = matter_fraction - 1.0;
    (18.0 * PI * PI + 82.0 * x - 39.0 * x * x) / matter_fraction
}

/// Parameters of the analytic fixture cosmology.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureCosmologyParams {
    /// Dimensionless Hubble parameter `h`.
    pub hubble_parameter: f64,
    /// Matter fraction `Omega_m`, held constant in scale factor.
    pub matter_fraction: f64,
    /// Comoving mean matter density in Msun/Mpc^3.
    pub mean_matter_density: f64,
    /// `dn/dlog10M` amplitude below the cutoff mass, in 1/Mpc^3.
    pub mass_function_amplitude: f64,
    /// Exponential cutoff mass of the mass function, in Msun.
    pub mass_function_cutoff_mass: f64,
    /// Constant halo bias.
    pub bias_amplitude: f64,
    /// Linear power amplitude at `k = 0`, `a = 1`, in Mpc^3.
    pub linear_power_amplitude: f64,
    /// Growth factor exponent: `g(a) = a^exponent`.
    pub growth_exponent: f64,
    /// Mass-variance amplitude at the cutoff mass at `a = 1`.
    pub variance_amplitude: f64,
    /// Mass-variance slope: `sigma ~ M^(-slope)`.
    pub variance_slope: f64,
}

impl Default for FixtureCosmologyParams {
    fn default() -> Self {
        Self {
            hubble_parameter: 0.7,
            matter_fraction: 1.0,
            mean_matter_density: 3.0e10,
            mass_function_amplitude: 1.0e-5,
            mass_function_cutoff_mass: 1.0e15,
            bias_amplitude: 1.0,
            linear_power_amplitude: 100.0,
            growth_exponent: 1.0,
            variance_amplitude: 2.0,
            variance_slope: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum FixtureCosmologyError {
    #[error("fixture parameter '{field}' must be finite, got {value}")]
    NonFiniteParameter { field: &'static str, value: f64 },
    #[error("fixture parameter '{field}' must be > 0, got {value}")]
    NonPositiveParameter { field: &'static str, value: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureParamsFileError {
    #[error("failed to read fixture cosmology parameters '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse fixture cosmology parameters '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_fixture_params(
    params_path: impl AsRef<Path>,
) -> Result<FixtureCosmologyParams, FixtureParamsFileError> {
    let params_path = params_path.as_ref();
    let source =
        fs::read_to_string(params_path).map_err(|source| FixtureParamsFileError::Read {
            path: params_path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&source).map_err(|source| FixtureParamsFileError::Parse {
        path: params_path.to_path_buf(),
        source,
    })
}

/// Analytic cosmology context built from [`FixtureCosmologyParams`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureCosmology {
    params: FixtureCosmologyParams,
}

impl FixtureCosmology {
    pub fn new(params: FixtureCosmologyParams) -> Result<Self, FixtureCosmologyError> {
        validate_params(&params)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &FixtureCosmologyParams {
        &self.params
    }
}

fn validate_params(params: &FixtureCosmologyParams) -> Result<(), FixtureCosmologyError> {
    let positive_fields = [
        ("hubbleParameter", params.hubble_parameter),
        ("matterFraction", params.matter_fraction),
        ("meanMatterDensity", params.mean_matter_density),
        ("massFunctionAmplitude", params.mass_function_amplitude),
        ("massFunctionCutoffMass", params.mass_function_cutoff_mass),
        ("linearPowerAmplitude", params.linear_power_amplitude),
        ("varianceAmplitude", params.variance_amplitude),
    ];
    for (field, value) in positive_fields {
        if !value.is_finite() {
            return Err(FixtureCosmologyError::NonFiniteParameter { field, value });
        }
        if value <= 0.0 {
            return Err(FixtureCosmologyError::NonPositiveParameter { field, value });
        }
    }

    let finite_fields = [
        ("biasAmplitude", params.bias_amplitude),
        ("growthExponent", params.growth_exponent),
        ("varianceSlope", params.variance_slope),
    ];
    for (field, value) in finite_fields {
        if !value.is_finite() {
            return Err(FixtureCosmologyError::NonFiniteParameter { field, value });
        }
    }

    Ok(())
}

fn check_scale_factor(service: &'static str, scale_factor: f64) -> ContextResult<()> {
    if !(scale_factor > 0.0 && scale_factor <= 1.0) {
        return Err(CosmologyServiceError::new(
            service,
            format!("scale factor must lie in (0, 1], got {scale_factor}"),
        ));
    }
    Ok(())
}

fn check_halo_mass(service: &'static str, halo_mass: f64) -> ContextResult<()> {
    if !(halo_mass.is_finite() && halo_mass > 0.0) {
        return Err(CosmologyServiceError::new(
            service,
            format!("halo mass must be finite and > 0, got {halo_mass}"),
        ));
    }
    Ok(())
}

impl CosmologyContext for FixtureCosmology {
    fn hubble_parameter(&self) -> f64 {
        self.params.hubble_parameter
    }

    fn growth_factor(&self, scale_factor: f64) -> ContextResult<f64> {
        check_scale_factor("growthFactor", scale_factor)?;
        Ok(scale_factor.powf(self.params.growth_exponent))
    }

    fn mass_variance(&self, halo_mass: f64, scale_factor: f64) -> ContextResult<f64> {
        check_halo_mass("massVariance", halo_mass)?;
        let growth = self.growth_factor(scale_factor)?;
        let mass_ratio = halo_mass / self.params.mass_function_cutoff_mass;
        Ok(self.params.variance_amplitude * growth * mass_ratio.powf(-self.params.variance_slope))
    }

    fn mass_function(
        &self,
        halo_mass: f64,
        scale_factor: f64,
        _overdensity: f64,
    ) -> ContextResult<f64> {
        check_halo_mass("massFunction", halo_mass)?;
        check_scale_factor("massFunction", scale_factor)?;
        let cutoff = (-halo_mass / self.params.mass_function_cutoff_mass).exp();
        Ok(self.params.mass_function_amplitude * cutoff)
    }

    fn halo_bias(
        &self,
        halo_mass: f64,
        scale_factor: f64,
        _overdensity: f64,
    ) -> ContextResult<f64> {
        check_halo_mass("haloBias", halo_mass)?;
        check_scale_factor("haloBias", scale_factor)?;
        Ok(self.params.bias_amplitude)
    }

    fn linear_matter_power(&self, wavenumber: f64, scale_factor: f64) -> ContextResult<f64> {
        if !(wavenumber.is_finite() && wavenumber >= 0.0) {
            return Err(CosmologyServiceError::new(
                "linearMatterPower",
                format!("wavenumber must be finite and >= 0, got {wavenumber}"),
            ));
        }
        let growth = self.growth_factor(scale_factor)?;
        Ok(self.params.linear_power_amplitude * growth * growth
            / (1.0 + wavenumber * wavenumber))
    }

    fn radius_at_overdensity(
        &self,
        halo_mass: f64,
        scale_factor: f64,
        overdensity: f64,
    ) -> ContextResult<f64> {
        check_halo_mass("radiusAtOverdensity", halo_mass)?;
        check_scale_factor("radiusAtOverdensity", scale_factor)?;
        if !(overdensity.is_finite() && overdensity > 0.0) {
            return Err(CosmologyServiceError::new(
                "radiusAtOverdensity",
                format!("overdensity must be finite and > 0, got {overdensity}"),
            ));
        }
        let enclosed_density = overdensity * self.params.mean_matter_density;
        Ok((3.0 * halo_mass / (4.0 * PI * enclosed_density)).powf(1.0 / 3.0))
    }

    fn mean_matter_density(&self, scale_factor: f64) -> ContextResult<f64> {
        check_scale_factor("meanMatterDensity", scale_factor)?;
        Ok(self.params.mean_matter_density)
    }

    fn virial_overdensity(&self, scale_factor: f64) -> ContextResult<f64> {
        check_scale_factor("virialOverdensity", scale_factor)?;
        Ok(bryan_norman_overdensity(self.params.matter_fraction))
    }
}
