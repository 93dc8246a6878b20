//! One-halo and two-halo mass integrals and the power-spectrum assembler.

use super::window::{window_function, HaloProfileWindow};
use super::HaloModelError;
use crate::common::constants::{
    HALO_MASS_MAX, HALO_MASS_MIN, MASS_INTEGRAL_ABS_TOL, MASS_INTEGRAL_MAX_SUBDIVISIONS,
    MASS_INTEGRAL_REL_TOL,
};
use crate::cosmology::CosmologyContext;
use crate::numerics::quadrature::{integrate_adaptive, QuadratureConfig};

const MASS_INTEGRAL_CONFIG: QuadratureConfig = QuadratureConfig {
    abs_tolerance: MASS_INTEGRAL_ABS_TOL,
    rel_tolerance: MASS_INTEGRAL_REL_TOL,
    max_subdivisions: MASS_INTEGRAL_MAX_SUBDIVISIONS,
};

/// One-halo integral over log10 mass of `dn/dlog10M * W^2`.
///
/// The integration variable is log10 mass and the mass function is per
/// log10-mass interval, so the integrand carries no ln(10) Jacobian.
fn one_halo_integral<C>(
    context: &C,
    wavenumber: f64,
    scale_factor: f64,
    mass_min: f64,
    mass_max: f64,
) -> Result<f64, HaloModelError>
where
    C: CosmologyContext + ?Sized,
{
    integrate_adaptive(
        |log10_mass: f64| -> Result<f64, HaloModelError> {
            let halo_mass = 10.0_f64.powf(log10_mass);
            let virial = context.virial_overdensity(scale_factor)?;
            let window = window_function(
                context,
                halo_mass,
                wavenumber,
                scale_factor,
                virial,
                HaloProfileWindow::Nfw,
            )?;
            let mass_function = context.mass_function(halo_mass, scale_factor, virial)?;
            Ok(mass_function * window * window)
        },
        mass_min.log10(),
        mass_max.log10(),
        MASS_INTEGRAL_CONFIG,
    )
    .map(|outcome| outcome.value)
    .map_err(|failure| HaloModelError::OneHaloIntegrationFailure {
        detail: failure.to_string(),
    })
}

/// Two-halo integral over log10 mass of `b * dn/dlog10M * W`.
fn two_halo_integral<C>(
    context: &C,
    wavenumber: f64,
    scale_factor: f64,
    mass_min: f64,
    mass_max: f64,
) -> Result<f64, HaloModelError>
where
    C: CosmologyContext + ?Sized,
{
    integrate_adaptive(
        |log10_mass: f64| -> Result<f64, HaloModelError> {
            let halo_mass = 10.0_f64.powf(log10_mass);
            let virial = context.virial_overdensity(scale_factor)?;
            let window = window_function(
                context,
                halo_mass,
                wavenumber,
                scale_factor,
                virial,
                HaloProfileWindow::Nfw,
            )?;
            let mass_function = context.mass_function(halo_mass, scale_factor, virial)?;
            let bias = context.halo_bias(halo_mass, scale_factor, virial)?;
            Ok(bias * mass_function * window)
        },
        mass_min.log10(),
        mass_max.log10(),
        MASS_INTEGRAL_CONFIG,
    )
    .map(|outcome| outcome.value)
    .map_err(|failure| HaloModelError::TwoHaloIntegrationFailure {
        detail: failure.to_string(),
    })
}

/// Two-halo integral plus the low-mass correction.
///
/// Bias is defined so that `b * dn/dlog10M` integrates to exactly 1 over all
/// masses; the part lost below the truncated lower bound is therefore known
/// analytically at `k = 0` and is rescaled to the requested wavenumber by
/// the window ratio at the lower bound. The correction depends on `k`, so a
/// second integral at `k = 0` is evaluated on every call.
fn corrected_two_halo_amplitude<C>(
    context: &C,
    wavenumber: f64,
    scale_factor: f64,
    mass_min: f64,
    mass_max: f64,
) -> Result<f64, HaloModelError>
where
    C: CosmologyContext + ?Sized,
{
    let integral = two_halo_integral(context, wavenumber, scale_factor, mass_min, mass_max)?;
    let missing = 1.0 - two_halo_integral(context, 0.0, scale_factor, mass_min, mass_max)?;

    let virial = context.virial_overdensity(scale_factor)?;
    let window_at_wavenumber = window_function(
        context,
        mass_min,
        wavenumber,
        scale_factor,
        virial,
        HaloProfileWindow::Nfw,
    )?;
    let window_at_zero = window_function(
        context,
        mass_min,
        0.0,
        scale_factor,
        virial,
        HaloProfileWindow::Nfw,
    )?;

    Ok(integral + missing * window_at_wavenumber / window_at_zero)
}

/// One-halo contribution to the matter power spectrum.
pub fn one_halo_matter_power<C>(
    context: &C,
    wavenumber: f64,
    scale_factor: f64,
) -> Result<f64, HaloModelError>
where
    C: CosmologyContext + ?Sized,
{
    one_halo_integral(context, wavenumber, scale_factor, HALO_MASS_MIN, HALO_MASS_MAX)
}

/// Two-halo contribution: the linear power spectrum scaled by the squared,
/// low-mass-corrected two-halo integral.
pub fn two_halo_matter_power<C>(
    context: &C,
    wavenumber: f64,
    scale_factor: f64,
) -> Result<f64, HaloModelError>
where
    C: CosmologyContext + ?Sized,
{
    let amplitude = corrected_two_halo_amplitude(
        context,
        wavenumber,
        scale_factor,
        HALO_MASS_MIN,
        HALO_MASS_MAX,
    )?;
    let linear = context.linear_matter_power(wavenumber, scale_factor)?;
    Ok(linear * amplitude * amplitude)
}

/// Total halo-model matter power spectrum: two-halo plus one-halo terms.
pub fn halo_model_matter_power<C>(
    context: &C,
    wavenumber: f64,
    scale_factor: f64,
) -> Result<f64, HaloModelError>
where
    C: CosmologyContext + ?Sized,
{
    Ok(two_halo_matter_power(context, wavenumber, scale_factor)?
        + one_halo_matter_power(context, wavenumber, scale_factor)?)
}

#[cfg(test)]
mod tests {
    use super::{
        corrected_two_halo_amplitude, halo_model_matter_power, one_halo_integral,
        one_halo_matter_power, two_halo_integral, two_halo_matter_power,
    };
    use crate::cosmology::{ContextResult, CosmologyContext, CosmologyServiceError};
    use crate::halomodel::HaloModelError;
    use std::f64::consts::{LN_10, PI};

    struct MockCosmology {
        hubble: f64,
        mean_density: f64,
        virial: f64,
        bias: f64,
        mass_function_amplitude: f64,
        /// When set, switches to an exponential mass function normalised so
        /// that `b * dn/dlog10M * M / rho_m` integrates to 1 over (0, inf).
        normalised_cutoff_mass: Option<f64>,
        fail_mass_function_above: Option<f64>,
    }

    impl Default for MockCosmology {
        fn default() -> Self {
            Self {
                hubble: 0.7,
                mean_density: 3.0e10,
                virial: 200.0,
                bias: 1.0,
                mass_function_amplitude: 1.0e-5,
                normalised_cutoff_mass: None,
                fail_mass_function_above: None,
            }
        }
    }

    impl CosmologyContext for MockCosmology {
        fn hubble_parameter(&self) -> f64 {
            self.hubble
        }

        fn growth_factor(&self, scale_factor: f64) -> ContextResult<f64> {
            Ok(scale_factor)
        }

        fn mass_variance(&self, _halo_mass: f64, _scale_factor: f64) -> ContextResult<f64> {
            Ok(2.0)
        }

        fn mass_function(
            &self,
            halo_mass: f64,
            _scale_factor: f64,
            _overdensity: f64,
        ) -> ContextResult<f64> {
            if let Some(threshold) = self.fail_mass_function_above {
                if halo_mass > threshold {
                    return Err(CosmologyServiceError::new(
                        "massFunction",
                        format!("tabulated range ends at {threshold}"),
                    ));
                }
            }
            match self.normalised_cutoff_mass {
                Some(cutoff) => Ok(self.mean_density * LN_10 / cutoff
                    * (-halo_mass / cutoff).exp()),
                None => Ok(self.mass_function_amplitude),
            }
        }

        fn halo_bias(
            &self,
            _halo_mass: f64,
            _scale_factor: f64,
            _overdensity: f64,
        ) -> ContextResult<f64> {
            Ok(self.bias)
        }

        fn linear_matter_power(&self, wavenumber: f64, _scale_factor: f64) -> ContextResult<f64> {
            Ok(100.0 / (1.0 + wavenumber * wavenumber))
        }

        fn radius_at_overdensity(
            &self,
            halo_mass: f64,
            _scale_factor: f64,
            overdensity: f64,
        ) -> ContextResult<f64> {
            let enclosed_density = overdensity * self.mean_density;
            Ok((3.0 * halo_mass / (4.0 * PI * enclosed_density)).powf(1.0 / 3.0))
        }

        fn mean_matter_density(&self, _scale_factor: f64) -> ContextResult<f64> {
            Ok(self.mean_density)
        }

        fn virial_overdensity(&self, _scale_factor: f64) -> ContextResult<f64> {
            Ok(self.virial)
        }
    }

    #[test]
    fn one_halo_integral_matches_analytic_value_for_constant_mass_function() {
        // At k = 0 the window is exactly M / rho_m, so with a constant
        // dn/dlog10M the integral is amp * (Mmax^2 - Mmin^2) / (2 ln10 rho^2).
        // This pins the per-log10-mass convention: an extra ln(10) Jacobian
        // would shift the result by a factor of 2.3.
        let cosmology = MockCosmology::default();
        let mass_min = 1.0e10;
        let mass_max = 1.0e16;
        let value = one_halo_integral(&cosmology, 0.0, 1.0, mass_min, mass_max)
            .expect("one-halo integral");

        let expected = cosmology.mass_function_amplitude
            * (mass_max * mass_max - mass_min * mass_min)
            / (2.0 * LN_10 * cosmology.mean_density * cosmology.mean_density);
        assert!(
            ((value - expected) / expected).abs() < 1.0e-3,
            "value={value:e} expected={expected:e}"
        );
    }

    #[test]
    fn one_halo_power_is_non_negative_and_suppressed_at_high_wavenumber() {
        let cosmology = MockCosmology::default();
        for scale_factor in [0.5, 1.0] {
            for wavenumber in [0.0, 0.1, 1.0, 10.0] {
                let value = one_halo_matter_power(&cosmology, wavenumber, scale_factor)
                    .expect("one-halo power");
                assert!(value.is_finite());
                assert!(value >= 0.0);
            }
        }

        let broad = one_halo_matter_power(&cosmology, 0.01, 1.0).expect("one-halo power");
        let narrow = one_halo_matter_power(&cosmology, 10.0, 1.0).expect("one-halo power");
        assert!(narrow < broad);
    }

    #[test]
    fn total_power_is_positive_and_deterministic() {
        let cosmology = MockCosmology::default();
        let first = halo_model_matter_power(&cosmology, 1.0, 1.0).expect("total power");
        let second = halo_model_matter_power(&cosmology, 1.0, 1.0).expect("total power");

        assert!(first.is_finite());
        assert!(first > 0.0);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn two_halo_power_is_linear_power_times_squared_amplitude() {
        let cosmology = MockCosmology::default();
        let wavenumber = 1.0;
        let power = two_halo_matter_power(&cosmology, wavenumber, 1.0).expect("two-halo power");

        let amplitude = corrected_two_halo_amplitude(
            &cosmology,
            wavenumber,
            1.0,
            1.0e7,
            1.0e17,
        )
        .expect("amplitude");
        let linear = cosmology
            .linear_matter_power(wavenumber, 1.0)
            .expect("linear power");
        assert_eq!(power, linear * amplitude * amplitude);
    }

    #[test]
    fn raw_two_halo_integral_converges_to_unity_as_the_lower_bound_drops() {
        let cosmology = MockCosmology {
            normalised_cutoff_mass: Some(1.0e13),
            ..MockCosmology::default()
        };

        let mut previous_distance = f64::INFINITY;
        for mass_min in [1.0e11, 1.0e9, 1.0e7] {
            let integral = two_halo_integral(&cosmology, 0.0, 1.0, mass_min, 1.0e17)
                .expect("two-halo integral");
            let distance = (1.0 - integral).abs();
            assert!(
                distance < previous_distance,
                "mass_min={mass_min:e} distance={distance:e} previous={previous_distance:e}"
            );
            previous_distance = distance;
        }
        assert!(previous_distance < 1.0e-3);
    }

    #[test]
    fn corrected_amplitude_restores_the_truncated_low_mass_range() {
        let cosmology = MockCosmology {
            normalised_cutoff_mass: Some(1.0e13),
            ..MockCosmology::default()
        };

        // With a harshly truncated lower bound the raw integral is visibly
        // short of 1, and the correction makes up the difference at small k.
        let mass_min = 1.0e12;
        let raw = two_halo_integral(&cosmology, 1.0e-3, 1.0, mass_min, 1.0e17)
            .expect("raw integral");
        let corrected =
            corrected_two_halo_amplitude(&cosmology, 1.0e-3, 1.0, mass_min, 1.0e17)
                .expect("corrected amplitude");

        assert!((1.0 - raw).abs() > 5.0e-2);
        assert!((1.0 - corrected).abs() < 1.0e-3);
    }

    #[test]
    fn two_halo_power_approaches_linear_power_at_small_wavenumber() {
        let cosmology = MockCosmology {
            normalised_cutoff_mass: Some(1.0e13),
            ..MockCosmology::default()
        };
        let wavenumber = 1.0e-3;
        let power = two_halo_matter_power(&cosmology, wavenumber, 1.0).expect("two-halo power");
        let linear = cosmology
            .linear_matter_power(wavenumber, 1.0)
            .expect("linear power");
        assert!((power / linear - 1.0).abs() < 1.0e-2);
    }

    #[test]
    fn integration_failures_surface_with_the_integral_status() {
        let cosmology = MockCosmology {
            fail_mass_function_above: Some(1.0e12),
            ..MockCosmology::default()
        };

        let one_halo_error =
            one_halo_matter_power(&cosmology, 1.0, 1.0).expect_err("one-halo should fail");
        match &one_halo_error {
            HaloModelError::OneHaloIntegrationFailure { detail } => {
                assert!(detail.contains("massFunction"), "detail: {detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let two_halo_error =
            two_halo_matter_power(&cosmology, 1.0, 1.0).expect_err("two-halo should fail");
        assert!(matches!(
            two_halo_error,
            HaloModelError::TwoHaloIntegrationFailure { .. }
        ));

        let total_error =
            halo_model_matter_power(&cosmology, 1.0, 1.0).expect_err("total should fail");
        assert!(matches!(
            total_error,
            HaloModelError::TwoHaloIntegrationFailure { .. }
        ));
    }
}
