//! The external evaluator seam.
//!
//! The optimizer never scores individuals itself. An [`Evaluator`] receives
//! the whole population and must return one reward per row, in row order.

use anyhow::Result;
use ndarray::ArrayView2;

/// Scores a batch of individuals.
pub trait Evaluator {
    /// One reward per row of `population`, same order. NaN or infinite
    /// rewards are allowed and are masked by the optimizer.
    fn evaluate(&mut self, population: ArrayView2<f64>) -> Result<Vec<f64>>;
}

/// Adapts a closure into an [`Evaluator`].
pub struct FnEvaluator<F>(F);

impl<F> FnEvaluator<F>
where
    F: FnMut(ArrayView2<f64>) -> Vec<f64>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Evaluator for FnEvaluator<F>
where
    F: FnMut(ArrayView2<f64>) -> Vec<f64>,
{
    fn evaluate(&mut self, population: ArrayView2<f64>) -> Result<Vec<f64>> {
        Ok((self.0)(population))
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&mut self, population: ArrayView2<f64>) -> Result<Vec<f64>> {
        (**self).evaluate(population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fn_evaluator_row_order() {
        let mut calls = 0;
        let mut eval = FnEvaluator::new(|pop| {
            calls += 1;
            pop.rows().into_iter().map(|r| r[0]).collect()
        });
        let pop = array![[3.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
        assert_eq!(eval.evaluate(pop.view()).unwrap(), vec![3.0, 1.0, 2.0]);
        drop(eval);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_boxed_evaluator() {
        let mut eval: Box<dyn Evaluator> =
            Box::new(FnEvaluator::new(|pop| vec![1.0; pop.nrows()]));
        let pop = ndarray::Array2::<f64>::zeros((4, 2));
        assert_eq!(eval.evaluate(pop.view()).unwrap().len(), 4);
    }
}
