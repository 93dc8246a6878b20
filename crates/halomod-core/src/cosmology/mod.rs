//! External-service boundary of the halo model.
//!
//! Background evolution, the linear power spectrum, and the halo
//! mass-function/bias services are assumed to be pre-existing, independently
//! correct collaborators. The core consumes them through
//! [`CosmologyContext`], one method per service, each returning a value or a
//! structured failure.

pub mod fixture;

pub use fixture::{
    bryan_norman_overdensity, load_fixture_params, FixtureCosmology, FixtureCosmologyError,
    FixtureCosmologyParams, FixtureParamsFileError,
};

pub type ContextResult<T> = Result<T, CosmologyServiceError>;

/// Failure reported by a consumed cosmology service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cosmology service '{service}' failed: {message}")]
pub struct CosmologyServiceError {
    pub service: &'static str,
    pub message: String,
}

impl CosmologyServiceError {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

/// Cosmological background and large-scale-structure services consumed by
/// the halo-model integrals.
///
/// Halo masses are in solar masses, wavenumbers in 1/Mpc, densities in solar
/// masses per cubic Mpc, and scale factors lie in `(0, 1]`. Overdensities are
/// expressed relative to the mean matter density.
pub trait CosmologyContext {
    /// Dimensionless Hubble parameter `h`.
    fn hubble_parameter(&self) -> f64;

    /// Linear growth factor `g(a)`.
    fn growth_factor(&self, scale_factor: f64) -> ContextResult<f64>;

    /// Mass variance `sigma(M, a)` of the linear density field.
    fn mass_variance(&self, halo_mass: f64, scale_factor: f64) -> ContextResult<f64>;

    /// Differential halo mass function `dn/dlog10M`, per comoving volume and
    /// log10-mass interval.
    fn mass_function(
        &self,
        halo_mass: f64,
        scale_factor: f64,
        overdensity: f64,
    ) -> ContextResult<f64>;

    /// Linear halo bias `b(M, a)`.
    fn halo_bias(
        &self,
        halo_mass: f64,
        scale_factor: f64,
        overdensity: f64,
    ) -> ContextResult<f64>;

    /// Linear matter power spectrum `P_lin(k, a)`.
    fn linear_matter_power(&self, wavenumber: f64, scale_factor: f64) -> ContextResult<f64>;

    /// Radius enclosing a mean density of `overdensity` times the mean
    /// matter density for the given halo mass.
    fn radius_at_overdensity(
        &self,
        halo_mass: f64,
        scale_factor: f64,
        overdensity: f64,
    ) -> ContextResult<f64>;

    /// Comoving mean matter density.
    fn mean_matter_density(&self, scale_factor: f64) -> ContextResult<f64>;

    /// Virial overdensity threshold at the given scale factor.
    fn virial_overdensity(&self, scale_factor: f64) -> ContextResult<f64>;
}
