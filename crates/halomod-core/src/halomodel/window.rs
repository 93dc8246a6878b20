//! Fourier-space halo profile windows for the mass integrals.

use super::concentration::{halo_concentration, ConcentrationRelation};
use super::profile::nfw_profile_transform;
use super::HaloModelError;
use crate::cosmology::CosmologyContext;

/// Halo profile family used inside the mass integrals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HaloProfileWindow {
    Nfw,
}

impl HaloProfileWindow {
    pub fn from_label(label: &str) -> Result<Self, HaloModelError> {
        match label {
            "nfw" => Ok(Self::Nfw),
            _ => Err(HaloModelError::UnknownWindowProfile {
                label: label.to_owned(),
            }),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Nfw => "nfw",
        }
    }
}

/// Mass-normalised window `M * U(k) / rho_m`, the halo's overdensity
/// contribution in Fourier space. `W(M, k = 0, a) = M / rho_m` exactly.
///
/// The concentration entering the profile is always taken from the Duffy
/// 2008 virial relation, independent of whatever relation callers request
/// through the public concentration API; power-spectrum results are pinned
/// to that relation.
pub fn window_function<C>(
    context: &C,
    halo_mass: f64,
    wavenumber: f64,
    scale_factor: f64,
    overdensity: f64,
    profile: HaloProfileWindow,
) -> Result<f64, HaloModelError>
where
    C: CosmologyContext + ?Sized,
{
    match profile {
        HaloProfileWindow::Nfw => {
            // Comoving mean matter density, evaluated today.
            let mean_density = context.mean_matter_density(1.0)?;
            let concentration = halo_concentration(
                context,
                halo_mass,
                scale_factor,
                overdensity,
                ConcentrationRelation::Duffy2008Virial,
            )?;
            let transform = nfw_profile_transform(
                context,
                concentration,
                halo_mass,
                wavenumber,
                scale_factor,
            )?;
            Ok(halo_mass * transform / mean_density)
        }
    }
}
