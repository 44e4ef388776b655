use lcow::*;
use ndarray::Array3;
use rand::prelude::*;

/// Random MDP whose columns are probability distributions and whose costs
/// are in `[0, 1)`.
#[allow(dead_code)]
pub fn random_mdp(seed: u64, n_s: usize, n_a: usize) -> TensorMdp {
    let rng = &mut StdRng::seed_from_u64(seed);
    let mut p = Array3::<Continuous>::from_shape_fn((n_a, n_s, n_s), |_| rng.gen::<Continuous>());
    let c = Array3::<Continuous>::from_shape_fn((n_a, n_s, n_s), |_| rng.gen::<Continuous>());

    for a in 0..n_a {
        for s in 0..n_s {
            let total: Continuous = (0..n_s).map(|n| p[[a, n, s]]).sum();
            for n in 0..n_s {
                p[[a, n, s]] /= total;
            }
        }
    }

    TensorMdp::new(p, c).unwrap()
}

#[allow(dead_code)]
pub fn random_policy(seed: u64, n_s: usize, n_a: usize) -> Vec<Discrete> {
    let rng = &mut StdRng::seed_from_u64(seed);
    (0..n_s).map(|_| rng.gen_range(0..n_a)).collect()
}

#[allow(dead_code)]
pub fn config(interest_rate: Continuous, tolerance: Continuous) -> EvaluationConfig {
    EvaluationConfig {
        interest_rate,
        tolerance,
        ..Default::default()
    }
}
