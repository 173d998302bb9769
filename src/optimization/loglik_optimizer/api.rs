//! High-level entry point for maximizing a [`LogLikelihood`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{lbfgs_hager_zhang, lbfgs_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize `ℓ(θ)` with L-BFGS and the line search chosen in `opts`.
///
/// # Parameters
/// - `f`: the model.
/// - `theta0`: start point in unconstrained coordinates.
/// - `data`: payload forwarded to every evaluation.
/// - `opts`: tolerances, line search, verbosity and memory.
///
/// # Errors
/// - Whatever `f.check` rejects.
/// - Solver construction or runtime failures.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use sensor_gapfill::optimization::{
///     errors::OptResult,
///     loglik_optimizer::{LogLikelihood, MLEOptions, Theta, maximize},
/// };
///
/// struct Bowl;
/// impl LogLikelihood for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Bowl, array![0.1, -0.2], &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), sensor_gapfill::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data).with_budget(opts.evaluation_budget());
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = lbfgs_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = lbfgs_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{errors::OptError, loglik_optimizer::Tolerances};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - End-to-end maximization of a concave toy likelihood with both line
    //   searches and finite-difference gradients.
    // - Propagation of `check` failures before the solver runs.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -(θ₀ - 2)² - 3(θ₁ + 1)², maximized at (2, -1).
    struct Quadratic;

    impl LogLikelihood for Quadratic {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            Ok(-(theta[0] - 2.0).powi(2) - 3.0 * (theta[1] + 1.0).powi(2))
        }

        fn check(&self, theta: &Theta, _: &()) -> OptResult<()> {
            if theta.len() != 2 {
                return Err(OptError::ThetaLengthMismatch { expected: 2, actual: theta.len() });
            }
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify both line searches locate the maximum of a smooth concave
    // likelihood using numeric gradients.
    //
    // Given
    // -----
    // - The quadratic likelihood and start point (0, 0).
    //
    // Expect
    // ------
    // - θ̂ ≈ (2, -1) and ℓ(θ̂) ≈ 0 for both line searches.
    fn maximize_finds_quadratic_optimum_with_both_line_searches() {
        for searcher in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let tols = Tolerances::new(Some(1e-8), None, Some(200)).expect("valid tolerances");
            let opts = MLEOptions::new(tols, searcher, false, None).expect("valid options");

            // Act
            let out = maximize(&Quadratic, array![0.0, 0.0], &(), &opts).expect("should converge");

            // Assert
            assert_abs_diff_eq!(out.theta_hat[0], 2.0, epsilon = 1e-4);
            assert_abs_diff_eq!(out.theta_hat[1], -1.0, epsilon = 1e-4);
            assert_abs_diff_eq!(out.value, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure a start point rejected by `check` never reaches the solver.
    //
    // Given
    // -----
    // - A length-3 start point for a 2-parameter model.
    //
    // Expect
    // ------
    // - `Err(OptError::ThetaLengthMismatch { expected: 2, actual: 3 })`.
    fn maximize_propagates_check_failure() {
        // Act
        let result = maximize(&Quadratic, array![0.0, 0.0, 0.0], &(), &MLEOptions::default());

        // Assert
        assert_eq!(result, Err(OptError::ThetaLengthMismatch { expected: 2, actual: 3 }));
    }
}
