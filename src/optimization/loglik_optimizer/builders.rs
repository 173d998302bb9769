//! loglik_optimizer::builders — L-BFGS solver construction.
//!
//! One generic constructor applies `lbfgs_mem` and the optional tolerances
//! of [`MLEOptions`]; the two public wrappers fix the line search. The
//! start point and the iteration cap belong to the executor in
//! [`run`](super::run).
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with the More–Thuente line search (the CSS default).
///
/// # Errors
/// `OptError` when argmin rejects a tolerance.
pub fn lbfgs_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    lbfgs(MoreThuenteLS::new(), opts)
}

/// L-BFGS with the Hager–Zhang line search.
///
/// # Errors
/// `OptError` when argmin rejects a tolerance.
pub fn lbfgs_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    lbfgs(HagerZhangLS::new(), opts)
}

fn lbfgs<L>(line_search: L, opts: &MLEOptions) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    let mut solver = LBFGS::new(line_search, opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM));
    if let Some(tol) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(tol)?;
    }
    if let Some(tol) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(tol)?;
    }
    Ok(solver)
}
