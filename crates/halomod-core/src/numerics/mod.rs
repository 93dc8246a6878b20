pub mod quadrature;
pub mod special;

pub use quadrature::{
    integrate_adaptive, QuadratureConfig, QuadratureError, QuadratureFailure, QuadratureOutcome,
};
pub use special::{
    cosine_integral, sine_cosine_integrals, sine_integral, ExpIntError, SineCosineIntegrals,
};
