//! Globalized Newton solver for bound-constrained nonlinear systems.
//!
//! [`newton::NewtonSolver`] drives a [`Model`]'s residuals to zero while
//! keeping every unknown strictly inside its bounds. It composes four
//! replaceable pieces:
//!
//! - [`linear`] — dense solve of the regularized Newton system
//! - [`line_search`] — step length selection along the Newton direction
//! - [`penalty`] — interior barrier terms that keep states off their bounds
//! - [`continuation`] — pseudo-transient regularization `I/τ`
//!
//! Each iteration solves
//!
//! ```text
//! (J + D_μ + I/τ) · d = −(r + b_μ)
//! ```
//!
//! where `b_μ` and `D_μ` are the barrier residual and its Jacobian diagonal,
//! then accepts `x ← x + α·d` from the line search.
//!
//! [`Model`]: ipnewt_core::Model

pub mod continuation;
pub mod line_search;
pub mod linear;
pub mod newton;
pub mod penalty;
