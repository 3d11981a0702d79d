use ipnewt_core::DVector;
use log::debug;

use super::{Config, Context, LineSearch, LineSearchFailure, Trial};

/// Backtracking line search on the residual norm.
///
/// Starts at `α = min(1, alpha_max, α_boundary)`, where `α_boundary` covers
/// `boundary_fraction` of the distance to the nearest finite bound, and
/// accepts the first trial with
///
/// ```text
/// ‖r(x + α·d)‖ ≤ (1 − c·α)·‖r(x)‖
/// ```
///
/// Rejected, failed and non-finite trials contract `α` by `contraction`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdaptiveLineSearch {
    config: Config,
}

impl AdaptiveLineSearch {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the first step length tried from `ctx`.
    #[must_use]
    pub fn initial_alpha(&self, ctx: &Context<'_>) -> f64 {
        let boundary = ctx
            .bounds
            .max_step(ctx.states, ctx.direction, self.config.boundary_fraction());
        1.0_f64.min(self.config.alpha_max()).min(boundary)
    }
}

impl LineSearch for AdaptiveLineSearch {
    fn search<F>(&mut self, ctx: &Context<'_>, mut eval: F) -> Result<Trial, LineSearchFailure>
    where
        F: FnMut(&DVector<f64>) -> Option<DVector<f64>>,
    {
        let mut alpha = self.initial_alpha(ctx);
        let mut last = None;

        for contractions in 0..=self.config.max_contractions() {
            if contractions > 0 {
                alpha *= self.config.contraction();
            }

            let states = ctx.states + ctx.direction * alpha;

            // Rounding can land a trial on a bound even below the boundary step.
            let residuals = if ctx.bounds.contains(&states) {
                eval(&states)
            } else {
                None
            };

            let Some(residuals) = residuals else {
                debug!("line search: alpha = {alpha:e} could not be evaluated");
                last = None;
                continue;
            };

            let residual_norm = residuals.norm();
            let trial = Trial {
                alpha,
                states,
                residuals,
                residual_norm,
            };

            if residual_norm <= (1.0 - self.config.slope() * alpha) * ctx.residual_norm {
                return Ok(trial);
            }

            debug!(
                "line search: alpha = {alpha:e} rejected (|r| = {residual_norm:e}, current {:e})",
                ctx.residual_norm
            );
            last = Some(trial);
        }

        Err(LineSearchFailure {
            alpha,
            contractions: self.config.max_contractions(),
            last,
        })
    }
}
