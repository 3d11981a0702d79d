//! Core traits and types for the ipnewt solver family.
//!
//! This crate defines the shared abstractions that solvers and models build on:
//!
//! - [`Model`] — evaluates residuals (and optionally a Jacobian) of a square
//!   nonlinear system from a state vector
//! - [`Bounds`] — per-variable box constraints, possibly unbounded
//! - [`Observer`] — receives solver events and optionally returns control actions
//!
//! Vectors and matrices are dense [`nalgebra`] types.

mod bounds;
mod model;
mod observer;

pub mod finite_difference;

pub use bounds::{Bounds, BoundsError, Violation};
pub use model::Model;
pub use observer::{Both, Observer};

pub use nalgebra::{DMatrix, DVector};
