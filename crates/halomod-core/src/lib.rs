//! Halo-model nonlinear matter power spectrum engine.
//!
//! Matter clustering is split into a one-halo term (correlations within a
//! single halo) and a two-halo term (correlations between distinct halos),
//! each built from the analytic Fourier transform of an NFW density profile,
//! a halo mass function, and a halo bias function. Background evolution, the
//! linear power spectrum, and the mass-function/bias services are consumed
//! through the [`cosmology::CosmologyContext`] trait; everything else lives
//! in this crate.

pub mod common;
pub mod cosmology;
pub mod halomodel;
pub mod numerics;

pub use cosmology::{
    ContextResult, CosmologyContext, CosmologyServiceError, FixtureCosmology,
    FixtureCosmologyParams,
};
pub use halomodel::{
    halo_concentration, halo_model_matter_power, nfw_profile_transform, one_halo_matter_power,
    two_halo_matter_power, window_function, ConcentrationRelation, HaloModelError,
    HaloProfileWindow,
};
