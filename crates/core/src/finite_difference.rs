//! Finite-difference Jacobian approximation.
//!
//! Used by [`Model::jacobian`](crate::Model::jacobian) when a model does not
//! supply an analytic Jacobian.

use nalgebra::{DMatrix, DVector};

use crate::Model;

/// Relative perturbation size, `√ε` for `f64`.
const STEP_SCALE: f64 = 1.490_116_119_384_765_6e-8;

/// Approximates the Jacobian of `model` at `states` by forward differences.
///
/// Column `j` is `(r(x + h·eⱼ) − r(x)) / h` with `h = √ε · max(|xⱼ|, 1)`.
/// The perturbed state always stays strictly inside the bounds:
///
/// - a forward step is used when it fits below the upper bound,
/// - otherwise a backward step when it fits above the lower bound,
/// - otherwise half the distance to the farther bound, toward it.
///
/// # Errors
///
/// Returns the model's error if any residual evaluation fails.
pub fn jacobian<M>(model: &M, states: &DVector<f64>) -> Result<DMatrix<f64>, M::Error>
where
    M: Model + ?Sized,
{
    let base = model.residuals(states)?;
    let bounds = model.bounds();
    let n = states.len();

    let mut jac = DMatrix::zeros(base.len(), n);
    let mut perturbed = states.clone();

    for j in 0..n {
        let x = states[j];
        let h = if j < bounds.len() {
            step(x, bounds.lower()[j], bounds.upper()[j])
        } else {
            STEP_SCALE * x.abs().max(1.0)
        };

        // Use the exactly representable step.
        perturbed[j] = x + h;
        let h = perturbed[j] - x;

        let shifted = model.residuals(&perturbed)?;
        jac.set_column(j, &((shifted - &base) / h));
        perturbed[j] = x;
    }

    Ok(jac)
}

/// Picks a signed perturbation for `x` that keeps `x + h` inside `(lower, upper)`.
fn step(x: f64, lower: f64, upper: f64) -> f64 {
    let h = STEP_SCALE * x.abs().max(1.0);
    let above = upper - x;
    let below = x - lower;

    if h < above {
        h
    } else if h < below {
        -h
    } else if above >= below {
        0.5 * above
    } else {
        -0.5 * below
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;
    use nalgebra::dvector;

    use crate::Bounds;

    /// r(x, y) = [x² y, sin(x) + y³], capped above at x = 1.
    struct Curvy;

    impl Model for Curvy {
        type Error = Infallible;

        fn states(&self) -> DVector<f64> {
            dvector![0.5, 2.0]
        }

        fn bounds(&self) -> Bounds {
            Bounds::new(
                dvector![f64::NEG_INFINITY, f64::NEG_INFINITY],
                dvector![1.0, f64::INFINITY],
            )
            .expect("valid bounds")
        }

        fn residuals(&self, s: &DVector<f64>) -> Result<DVector<f64>, Self::Error> {
            Ok(dvector![s[0] * s[0] * s[1], s[0].sin() + s[1].powi(3)])
        }
    }

    fn analytic(s: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_row_slice(
            2,
            2,
            &[
                2.0 * s[0] * s[1],
                s[0] * s[0],
                s[0].cos(),
                3.0 * s[1] * s[1],
            ],
        )
    }

    #[test]
    fn matches_analytic_jacobian() {
        let states = dvector![0.5, 2.0];
        let approx = Curvy.jacobian(&states).expect("infallible");

        assert_relative_eq!(approx, analytic(&states), epsilon = 1e-6);
    }

    #[derive(Debug, thiserror::Error)]
    #[error("evaluated at x = {0}, outside the box")]
    struct OutsideBox(f64);

    /// Same system as `Curvy`, but refuses to evaluate at or above x = 1.
    struct Guarded;

    impl Model for Guarded {
        type Error = OutsideBox;

        fn states(&self) -> DVector<f64> {
            Curvy.states()
        }

        fn bounds(&self) -> Bounds {
            Curvy.bounds()
        }

        fn residuals(&self, s: &DVector<f64>) -> Result<DVector<f64>, Self::Error> {
            if s[0] >= 1.0 {
                return Err(OutsideBox(s[0]));
            }
            Ok(Curvy.residuals(s).unwrap_or_else(|never| match never {}))
        }
    }

    #[test]
    fn uses_backward_difference_near_upper_bound() {
        // x is closer to its upper bound than one forward step.
        let states = dvector![1.0 - 1e-9, -1.5];

        let jac = Guarded.jacobian(&states).expect("stays inside the box");

        assert_relative_eq!(jac, analytic(&states), epsilon = 1e-6);
    }

    /// r(x, y) = [3x + y, y²] on a box narrower than one step in x.
    struct Narrow;

    impl Model for Narrow {
        type Error = OutsideBox;

        fn states(&self) -> DVector<f64> {
            dvector![5e-9, 0.5]
        }

        fn bounds(&self) -> Bounds {
            Bounds::new(dvector![0.0, f64::NEG_INFINITY], dvector![1e-8, f64::INFINITY])
                .expect("valid bounds")
        }

        fn residuals(&self, s: &DVector<f64>) -> Result<DVector<f64>, Self::Error> {
            if s[0] <= 0.0 || s[0] >= 1e-8 {
                return Err(OutsideBox(s[0]));
            }
            Ok(dvector![3.0 * s[0] + s[1], s[1] * s[1]])
        }
    }

    #[test]
    fn shrinks_step_inside_narrow_box() {
        let expected = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 0.0, 1.0]);

        // Nearer the lower bound, then nearer the upper bound.
        for x in [4e-9, 6e-9] {
            let jac = Narrow.jacobian(&dvector![x, 0.5]).expect("stays inside the box");
            assert_relative_eq!(jac, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn step_stays_strictly_inside() {
        let cases = [
            (0.5, f64::NEG_INFINITY, f64::INFINITY),
            (1.0 - 1e-9, 0.0, 1.0),
            (1e-9, 0.0, 1e-8),
            (9e-9, 0.0, 1e-8),
            (-3.0, -3.0 - 1e-12, -3.0 + 1e-12),
        ];

        for (x, lower, upper) in cases {
            let h = step(x, lower, upper);
            assert!(h != 0.0);
            assert!(lower < x + h && x + h < upper, "x = {x}, h = {h}");
        }
    }
}
