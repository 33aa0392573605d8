//! Random individuals and stochastic mutation.

use ndarray::{Array1, Array2};
use rand::{Rng, RngCore};
use rand_distr::{Distribution, StandardNormal};

use crate::config::{MUTATION_MODULUS, MUTATION_RATE};

/// Capability consumed by the optimizer to create and perturb individuals.
///
/// The random source is always supplied by the caller so the whole
/// optimizer run is reproducible from one seed.
pub trait IndividualFactory {
    /// Produce `count` individuals of `dims` coordinates (one per row).
    fn randomize(&self, count: usize, dims: usize, rng: &mut dyn RngCore) -> Array2<f64>;

    /// Mutate an owned individual and hand it back.
    ///
    /// Takes ownership; callers that need to keep the input must clone it.
    fn mutate(&self, individual: Array1<f64>, rng: &mut dyn RngCore) -> Array1<f64>;
}

/// Uniform `[0, 1)` initialisation with unit-Gaussian, modulo-wrapped mutation.
#[derive(Clone, Debug)]
pub struct UniformFactory {
    /// A coordinate mutates when a uniform draw exceeds this value.
    pub mutation_rate: f64,

    /// Modulus applied to a mutated coordinate.
    pub modulus: f64,
}

impl Default for UniformFactory {
    fn default() -> Self {
        Self {
            mutation_rate: MUTATION_RATE,
            modulus: MUTATION_MODULUS,
        }
    }
}

impl IndividualFactory for UniformFactory {
    fn randomize(&self, count: usize, dims: usize, rng: &mut dyn RngCore) -> Array2<f64> {
        Array2::from_shape_fn((count, dims), |_| rng.gen::<f64>())
    }

    fn mutate(&self, mut individual: Array1<f64>, rng: &mut dyn RngCore) -> Array1<f64> {
        for x in individual.iter_mut() {
            if rng.gen::<f64>() > self.mutation_rate {
                let z: f64 = StandardNormal.sample(rng);
                *x = (*x + z).rem_euclid(self.modulus);
            }
        }
        individual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_randomize_shape_and_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let pop = UniformFactory::default().randomize(12, 5, &mut rng);
        assert_eq!(pop.dim(), (12, 5));
        assert!(pop.iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn test_randomize_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let pop = UniformFactory::default().randomize(0, 5, &mut rng);
        assert_eq!(pop.dim(), (0, 5));
    }

    #[test]
    fn test_mutate_changes_roughly_half() {
        let factory = UniformFactory::default();
        let mut rng = StdRng::seed_from_u64(11);
        let original = Array1::from_elem(2000, 0.5);
        let mutated = factory.mutate(original.clone(), &mut rng);

        let changed = original
            .iter()
            .zip(mutated.iter())
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed > 850 && changed < 1150, "changed = {}", changed);
        // Mutated coordinates land in [0, 0.99).
        assert!(mutated
            .iter()
            .zip(original.iter())
            .filter(|(m, o)| m != o)
            .all(|(&m, _)| (0.0..MUTATION_MODULUS).contains(&m)));
    }

    #[test]
    fn test_mutate_rate_one_is_identity() {
        let factory = UniformFactory {
            mutation_rate: 1.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let original = Array1::linspace(0.0, 0.9, 10);
        assert_eq!(factory.mutate(original.clone(), &mut rng), original);
    }

    #[test]
    fn test_seeded_factory_is_reproducible() {
        let factory = UniformFactory::default();
        let a = factory.randomize(4, 3, &mut StdRng::seed_from_u64(42));
        let b = factory.randomize(4, 3, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
