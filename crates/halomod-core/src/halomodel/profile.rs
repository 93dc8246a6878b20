//! Analytic Fourier transform of the NFW density profile.

use super::HaloModelError;
use crate::cosmology::CosmologyContext;
use crate::numerics::special::sine_cosine_integrals;

/// Normalised Fourier transform of an NFW halo of the given concentration
/// and mass (Cooray & Sheth 2002, section 3), with `U(k = 0) = 1`.
///
/// The virial radius comes from the radius-at-overdensity service at the
/// virial threshold; the scale radius is `r_vir / c`.
pub fn nfw_profile_transform<C>(
    context: &C,
    concentration: f64,
    halo_mass: f64,
    wavenumber: f64,
    scale_factor: f64,
) -> Result<f64, HaloModelError>
where
    C: CosmologyContext + ?Sized,
{
    // k = 0 encodes the normalisation directly; the Si/Ci form below is
    // ill-defined at a vanishing dimensionless wavenumber.
    if wavenumber == 0.0 {
        return Ok(1.0);
    }

    let virial = context.virial_overdensity(scale_factor)?;
    let virial_radius = context.radius_at_overdensity(halo_mass, scale_factor, virial)?;
    let scale_radius = virial_radius / concentration;
    let scaled_wavenumber = wavenumber * scale_radius;
    let outer = scaled_wavenumber * (1.0 + concentration);

    let at_outer = sine_cosine_integrals(outer)?;
    let at_inner = sine_cosine_integrals(scaled_wavenumber)?;

    let sine_term =
        scaled_wavenumber.sin() * (at_outer.sine_integral - at_inner.sine_integral);
    let cosine_term =
        scaled_wavenumber.cos() * (at_outer.cosine_integral - at_inner.cosine_integral);
    let truncation_term = (concentration * scaled_wavenumber).sin() / outer;
    // ln(1+c) - c/(1+c) > 0 for all c > 0.
    let mass_normalisation = (1.0 + concentration).ln() - concentration / (1.0 + concentration);

    Ok((sine_term + cosine_term - truncation_term) / mass_normalisation)
}

#[cfg(test)]
mod tests {
    use super::nfw_profile_transform;
    use crate::cosmology::{ContextResult, CosmologyContext, CosmologyServiceError};

    /// Radius service returning a fixed virial radius so the dimensionless
    /// profile argument is directly controllable.
    struct FixedRadiusCosmology {
        virial_radius: f64,
    }

    impl CosmologyContext for FixedRadiusCosmology {
        fn hubble_parameter(&self) -> f64 {
            0.7
        }

        fn growth_factor(&self, scale_factor: f64) -> ContextResult<f64> {
            Ok(scale_factor)
        }

        fn mass_variance(&self, _halo_mass: f64, _scale_factor: f64) -> ContextResult<f64> {
            Ok(1.0)
        }

        fn mass_function(
            &self,
            _halo_mass: f64,
            _scale_factor: f64,
            _overdensity: f64,
        ) -> ContextResult<f64> {
            Err(CosmologyServiceError::new("massFunction", "not stubbed"))
        }

        fn halo_bias(
            &self,
            _halo_mass: f64,
            _scale_factor: f64,
            _overdensity: f64,
        ) -> ContextResult<f64> {
            Err(CosmologyServiceError::new("haloBias", "not stubbed"))
        }

        fn linear_matter_power(&self, _wavenumber: f64, _scale_factor: f64) -> ContextResult<f64> {
            Err(CosmologyServiceError::new("linearMatterPower", "not stubbed"))
        }

        fn radius_at_overdensity(
            &self,
            _halo_mass: f64,
            _scale_factor: f64,
            _overdensity: f64,
        ) -> ContextResult<f64> {
            Ok(self.virial_radius)
        }

        fn mean_matter_density(&self, _scale_factor: f64) -> ContextResult<f64> {
            Ok(3.0e10)
        }

        fn virial_overdensity(&self, _scale_factor: f64) -> ContextResult<f64> {
            Ok(200.0)
        }
    }

    #[test]
    fn zero_wavenumber_is_exactly_one_for_any_concentration() {
        let cosmology = FixedRadiusCosmology { virial_radius: 1.0 };
        for concentration in [0.5, 1.0, 4.0, 10.0, 25.0] {
            let value =
                nfw_profile_transform(&cosmology, concentration, 1.0e14, 0.0, 1.0)
                    .expect("transform");
            assert_eq!(value, 1.0);
        }
    }

    #[test]
    fn transform_is_continuous_at_small_wavenumbers() {
        let cosmology = FixedRadiusCosmology { virial_radius: 1.0 };
        let value = nfw_profile_transform(&cosmology, 5.0, 1.0e14, 1.0e-6, 1.0)
            .expect("transform");
        assert!((value - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn transform_decreases_from_unity_with_wavenumber() {
        let cosmology = FixedRadiusCosmology { virial_radius: 1.0 };
        let mut previous = 1.0;
        for wavenumber in [0.5, 1.0, 2.0, 5.0, 10.0] {
            let value = nfw_profile_transform(&cosmology, 5.0, 1.0e14, wavenumber, 1.0)
                .expect("transform");
            assert!(value > 0.0);
            assert!(value < previous);
            previous = value;
        }
    }

    #[test]
    fn transform_is_suppressed_well_inside_the_halo() {
        let cosmology = FixedRadiusCosmology { virial_radius: 1.0 };
        let value = nfw_profile_transform(&cosmology, 5.0, 1.0e14, 300.0, 1.0)
            .expect("transform");
        assert!(value.abs() < 0.05);
    }

    #[test]
    fn radius_service_failures_pass_through() {
        struct FailingRadius;
        impl CosmologyContext for FailingRadius {
            fn hubble_parameter(&self) -> f64 {
                0.7
            }
            fn growth_factor(&self, scale_factor: f64) -> ContextResult<f64> {
                Ok(scale_factor)
            }
            fn mass_variance(&self, _m: f64, _a: f64) -> ContextResult<f64> {
                Ok(1.0)
            }
            fn mass_function(&self, _m: f64, _a: f64, _d: f64) -> ContextResult<f64> {
                Ok(0.0)
            }
            fn halo_bias(&self, _m: f64, _a: f64, _d: f64) -> ContextResult<f64> {
                Ok(1.0)
            }
            fn linear_matter_power(&self, _k: f64, _a: f64) -> ContextResult<f64> {
                Ok(0.0)
            }
            fn radius_at_overdensity(&self, _m: f64, _a: f64, _d: f64) -> ContextResult<f64> {
                Err(CosmologyServiceError::new(
                    "radiusAtOverdensity",
                    "mass outside tabulated range",
                ))
            }
            fn mean_matter_density(&self, _a: f64) -> ContextResult<f64> {
                Ok(3.0e10)
            }
            fn virial_overdensity(&self, _a: f64) -> ContextResult<f64> {
                Ok(200.0)
            }
        }

        let error = nfw_profile_transform(&FailingRadius, 5.0, 1.0e14, 1.0, 1.0)
            .expect_err("service failure should propagate");
        assert!(error
            .to_string()
            .contains("cosmology service 'radiusAtOverdensity' failed"));
    }
}
