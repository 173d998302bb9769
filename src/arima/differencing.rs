//! Differencing and its inverse for forecast integration.

/// Apply first differencing `d` times. Each pass shortens the series by one;
/// a series shorter than `d + 1` becomes empty.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut out = series.to_vec();
    for _ in 0..d {
        if out.len() < 2 {
            return Vec::new();
        }
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Last observed value at every differencing level `0..d`.
///
/// `tails[k]` is the final element of the `k`-times differenced series,
/// which anchors the cumulative sums that undo level `k + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceTails {
    tails: Vec<f64>,
}

impl DifferenceTails {
    /// Record the anchors for `d` differencing passes. Requires
    /// `series.len() > d`, which callers check before fitting.
    pub fn capture(series: &[f64], d: usize) -> Self {
        let mut tails = Vec::with_capacity(d);
        let mut level = series.to_vec();
        for _ in 0..d {
            tails.push(level.last().copied().unwrap_or(0.0));
            level = level.windows(2).map(|w| w[1] - w[0]).collect();
        }
        Self { tails }
    }

    pub fn order(&self) -> usize {
        self.tails.len()
    }

    /// Turn forecasts of the `d`-times differenced series back into level
    /// forecasts.
    pub fn integrate(&self, differenced: &[f64]) -> Vec<f64> {
        let mut current = differenced.to_vec();
        for &anchor in self.tails.iter().rev() {
            let mut acc = anchor;
            for v in current.iter_mut() {
                acc += *v;
                *v = acc;
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Length and values of repeated differencing.
    // - Integration of forecasts at d = 1 and d = 2.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify second differences of a quadratic are constant.
    //
    // Given
    // -----
    // - xₜ = t² for t = 0..5.
    //
    // Expect
    // ------
    // - d = 2 yields four 2.0 values; d larger than the series yields empty.
    fn difference_of_quadratic_is_constant() {
        // Arrange
        let x = [0.0, 1.0, 4.0, 9.0, 16.0, 25.0];

        // Act / Assert
        assert_eq!(difference(&x, 2), vec![2.0; 4]);
        assert!(difference(&x[..2], 3).is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Check that integrating the true future differences continues the
    // original series.
    //
    // Given
    // -----
    // - The quadratic t² observed for t = 0..5 and future second
    //   differences of 2.0.
    //
    // Expect
    // ------
    // - Integrated forecasts 36, 49, 64.
    fn integrate_continues_quadratic() {
        // Arrange
        let x = [0.0, 1.0, 4.0, 9.0, 16.0, 25.0];
        let tails = DifferenceTails::capture(&x, 2);

        // Act
        let levels = tails.integrate(&[2.0, 2.0, 2.0]);

        // Assert
        assert_eq!(tails.order(), 2);
        assert_eq!(levels, vec![36.0, 49.0, 64.0]);
    }
}
