//! loglik_optimizer::run — drive an L-BFGS solver to an [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{CostFunction, Executor, Gradient, IterState, Solver, State};
use argmin_math::ArgminL2Norm;
use tracing::debug;

type LbfgsState = IterState<Theta, Grad, (), (), (), f64>;

/// Run `solver` on `problem` from `theta0`, capped at `opts.tols.max_iter`.
///
/// The adapter minimizes `-ℓ`, so the outcome's `value` is the negated best
/// cost. With `opts.verbose` the start and end of the run are emitted as
/// `tracing` debug events.
///
/// # Errors
/// - Runtime failures inside argmin (line search, non-finite cost).
/// - An invalid final state rejected by [`OptimOutcome::new`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, LbfgsState> + Send + 'static,
{
    if opts.verbose {
        let start_ll = problem.cost(&theta0).map(|c| -c).ok();
        let start_grad = problem.gradient(&theta0).ok().map(|g| g.l2_norm());
        debug!(?start_ll, ?start_grad, dim = theta0.len(), "lbfgs start");
    }

    let max_iter = opts.tols.max_iter;
    let executor = Executor::new(problem, solver).configure(move |state| match max_iter {
        Some(cap) => state.param(theta0).max_iters(cap as u64),
        None => state.param(theta0),
    });
    let mut state = executor.run()?.state().clone();

    let outcome = OptimOutcome::new(
        state.take_best_param(),
        -state.get_best_cost(),
        state.get_termination_status().clone(),
        state.get_iter(),
        state.get_func_counts().clone(),
        state.take_gradient(),
    )?;
    if opts.verbose {
        debug!(
            loglik = outcome.value,
            iterations = outcome.iterations,
            status = %outcome.status,
            "lbfgs finished"
        );
    }
    Ok(outcome)
}
