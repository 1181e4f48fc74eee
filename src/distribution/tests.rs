use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::Distribution;

#[test]
fn test_new_normal_statistics() {
    let mut rng = StdRng::seed_from_u64(42);
    let samples = Distribution::new_normal(1.0, 2.0, (200, 50), &mut rng);
    let n = samples.len() as f32;
    let mean = samples.sum() / n;
    let var = samples.mapv(|x| (x - mean).powi(2)).sum() / n;
    assert_abs_diff_eq!(mean, 1.0, epsilon = 0.1);
    assert_abs_diff_eq!(var.sqrt(), 2.0, epsilon = 0.1);
    assert!(samples.iter().all(|x| x.is_finite()));
}

#[test]
fn test_same_seed_same_samples() {
    let a = Distribution::new_normal(0.0, 1.0, (4, 3), &mut StdRng::seed_from_u64(7));
    let b = Distribution::new_normal(0.0, 1.0, (4, 3), &mut StdRng::seed_from_u64(7));
    assert_eq!(a, b);
}

#[test]
fn test_new_uniform_range() {
    let mut rng = StdRng::seed_from_u64(0);
    let samples = Distribution::new_uniform(-0.5, 0.5, (30, 30), &mut rng);
    assert!(samples.iter().all(|&x| (-0.5..=0.5).contains(&x)));
}
