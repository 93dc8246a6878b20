pub mod expint;

pub use expint::{
    cosine_integral, sine_cosine_integrals, sine_integral, ExpIntError, SineCosineIntegrals,
};
