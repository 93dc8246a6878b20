//! Halo-model decomposition of the nonlinear matter power spectrum.
//!
//! The one-halo term integrates the squared halo profile window against the
//! mass function; the two-halo term integrates bias-weighted windows, is
//! corrected for the truncated low-mass range, squared, and multiplied by
//! the linear power spectrum.

pub mod concentration;
pub mod power;
pub mod profile;
pub mod window;

pub use concentration::{halo_concentration, ConcentrationRelation};
pub use power::{halo_model_matter_power, one_halo_matter_power, two_halo_matter_power};
pub use profile::nfw_profile_transform;
pub use window::{window_function, HaloProfileWindow};

use crate::cosmology::CosmologyServiceError;
use crate::numerics::special::ExpIntError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HaloModelError {
    #[error(
        "concentration relation '{relation}' is defined for overdensity {expected}, got {actual}"
    )]
    ConcentrationDefinitionMismatch {
        relation: ConcentrationRelation,
        expected: f64,
        actual: f64,
    },
    #[error("unknown concentration relation label '{label}'")]
    UnknownConcentrationRelation { label: String },
    #[error("unknown window profile label '{label}'")]
    UnknownWindowProfile { label: String },
    #[error("one-halo mass integral failed: {detail}")]
    OneHaloIntegrationFailure { detail: String },
    #[error("two-halo mass integral failed: {detail}")]
    TwoHaloIntegrationFailure { detail: String },
    #[error(transparent)]
    Cosmology(#[from] CosmologyServiceError),
    #[error(transparent)]
    SpecialFunction(#[from] ExpIntError),
}

#[cfg(test)]
mod tests {
    use super::{ConcentrationRelation, HaloModelError};

    #[test]
    fn definition_mismatch_message_names_relation_and_values() {
        let error = HaloModelError::ConcentrationDefinitionMismatch {
            relation: ConcentrationRelation::Bhattacharya2011,
            expected: 200.0,
            actual: 180.0,
        };
        assert_eq!(
            error.to_string(),
            "concentration relation 'bhattacharya2011' is defined for overdensity 200, got 180"
        );
    }
}
