//! Reference nonlinear systems for exercising ipnewt solvers.
//!
//! - [`Powell`] — Powell's badly scaled system, unbounded
//! - [`BoundedQuadratic`] — a coupled quadratic system inside a box
//! - [`Linear`] — an affine system `A·x − b`
//! - [`Rosenbrock`] — the Rosenbrock system without an analytic Jacobian
//!
//! Every model starts from a documented default guess, which can be replaced
//! with `with_states`.

mod bounded_quadratic;
mod linear;
mod powell;
mod rosenbrock;

pub use bounded_quadratic::BoundedQuadratic;
pub use linear::{Linear, LinearError};
pub use powell::Powell;
pub use rosenbrock::Rosenbrock;
