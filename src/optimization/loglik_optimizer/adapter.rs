//! Adapter exposing a [`LogLikelihood`] as an argmin minimization problem.
//!
//! The cost is `c(θ) = -ℓ(θ)`. Analytic gradients are negated; otherwise the
//! cost itself is finite-differenced, which needs no sign flip.
//!
//! Every `cost` and `gradient` call made by the solver is charged against an
//! optional evaluation budget. argmin caps only the outer L-BFGS iterations,
//! so the budget is what bounds the line search.
use std::cell::{Cell, RefCell};

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a model and its data to argmin's `CostFunction` and `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
    budget: Option<usize>,
    evaluations: Cell<usize>,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    /// Adapter without an evaluation budget.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data, budget: None, evaluations: Cell::new(0) }
    }

    /// Fail with [`OptError::EvaluationBudgetExceeded`] once more than
    /// `budget` solver evaluations have been made.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Solver evaluations charged so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    fn charge(&self) -> Result<(), Error> {
        let used = self.evaluations.get() + 1;
        self.evaluations.set(used);
        match self.budget {
            Some(budget) if used > budget => Err(OptError::EvaluationBudgetExceeded { budget }.into()),
            _ => Ok(()),
        }
    }

    fn negated_loglik(&self, theta: &Theta) -> Result<Cost, Error> {
        let loglik = self.f.value(theta, self.data)?;
        if !loglik.is_finite() {
            return Err((OptError::NonFiniteCost { value: loglik }).into());
        }
        Ok(-loglik)
    }

    /// Finite-difference gradient of the cost.
    ///
    /// Central differences first. If a cost evaluation failed inside the
    /// stencil, or the result is not finite, retry once with forward
    /// differences before giving up.
    fn numerical_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        // The stencil closure must return f64; the first failure is parked
        // here and NaN is returned in its place.
        let failure: RefCell<Option<Error>> = RefCell::new(None);
        let cost_fn = |point: &Theta| -> f64 {
            self.negated_loglik(point).unwrap_or_else(|err| {
                failure.borrow_mut().get_or_insert(err);
                f64::NAN
            })
        };

        let central = theta.central_diff(&cost_fn);
        if failure.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
            return Ok(central);
        }

        failure.replace(None);
        let forward = theta.forward_diff(&cost_fn);
        if let Some(err) = failure.take() {
            return Err(err);
        }
        validate_grad(&forward, theta.len())?;
        Ok(forward)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ) = -ℓ(θ)`, rejecting non-finite likelihoods.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        self.charge()?;
        self.negated_loglik(theta)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Gradient of the cost at `θ`.
    ///
    /// # Errors
    /// - Model errors from `grad` other than `GradientNotImplemented`.
    /// - Cost failures met while finite-differencing.
    /// - [`OptError::EvaluationBudgetExceeded`] past the budget.
    /// - Wrong-length or non-finite gradients.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        self.charge()?;
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.numerical_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The sign convention `c = -ℓ` for values and analytic gradients.
    // - The finite-difference fallback when no gradient is implemented.
    // - The evaluation budget.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -Σ(θᵢ - 1)², optionally with its analytic gradient.
    struct Bowl {
        analytic: bool,
    }

    impl LogLikelihood for Bowl {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            Ok(-theta.iter().map(|t| (t - 1.0).powi(2)).sum::<f64>())
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            if self.analytic {
                Ok(theta.mapv(|t| -2.0 * (t - 1.0)))
            } else {
                Err(OptError::GradientNotImplemented)
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the cost is the negated log-likelihood.
    //
    // Given
    // -----
    // - The bowl likelihood at θ = (0, 0), where ℓ = -2.
    //
    // Expect
    // ------
    // - `cost` returns 2.
    fn cost_is_negated_loglik() {
        // Arrange
        let model = Bowl { analytic: true };
        let adapter = ArgMinAdapter::new(&model, &());

        // Act
        let cost = adapter.cost(&array![0.0, 0.0]).expect("cost should evaluate");

        // Assert
        assert_abs_diff_eq!(cost, 2.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Check that analytic and finite-difference gradients agree and both
    // point along the cost gradient.
    //
    // Given
    // -----
    // - The bowl likelihood at θ = (0, 3).
    //
    // Expect
    // ------
    // - Both gradients ≈ (-2, 4).
    fn gradient_analytic_and_numeric_agree() {
        // Arrange
        let analytic = Bowl { analytic: true };
        let numeric = Bowl { analytic: false };
        let theta = array![0.0, 3.0];

        // Act
        let g_a = ArgMinAdapter::new(&analytic, &()).gradient(&theta).expect("analytic grad");
        let g_n = ArgMinAdapter::new(&numeric, &()).gradient(&theta).expect("numeric grad");

        // Assert
        assert_abs_diff_eq!(g_a[0], -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(g_a[1], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(g_n[0], -2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(g_n[1], 4.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // The budget counts solver calls and stops the next one, while the
    // finite-difference stencil inside a gradient counts once.
    //
    // Given
    // -----
    // - The numeric bowl with a budget of 2: one gradient and one cost call,
    //   then a third cost call.
    //
    // Expect
    // ------
    // - The first two succeed with 2 evaluations charged; the third is
    //   `EvaluationBudgetExceeded { budget: 2 }`.
    fn budget_stops_evaluations_past_the_limit() {
        // Arrange
        let model = Bowl { analytic: false };
        let adapter = ArgMinAdapter::new(&model, &()).with_budget(2);
        let theta = array![0.5, 0.5];

        // Act
        let grad = adapter.gradient(&theta);
        let cost = adapter.cost(&theta);
        let charged = adapter.evaluations();
        let over = adapter.cost(&theta).map_err(OptError::from);

        // Assert
        assert!(grad.is_ok() && cost.is_ok());
        assert_eq!(charged, 2);
        assert_eq!(over, Err(OptError::EvaluationBudgetExceeded { budget: 2 }));
    }
}
