//! 优化器测试

use approx::assert_abs_diff_eq;
use ndarray::array;

use crate::nn::optimizer::{Adam, Optimizer, SGD};
use crate::nn::{Param, ParamGroup};

#[test]
fn test_adam_learning_rate_modification() {
    let mut adam = Adam::new(0.001);
    assert_eq!(adam.learning_rate(), 0.001);
    adam.set_learning_rate(0.0001);
    assert_eq!(adam.learning_rate(), 0.0001);
}

#[test]
fn test_adam_update() {
    // w = 2, g = 3, lr = 0.1:
    //   m_hat = 3, v_hat = 9, update = 0.1 * 3 / 3 = 0.1 => w = 1.9
    let mut w = Param::new("w", array![[2.0]]);
    w.accumulate_grad(&array![[3.0]]).unwrap();

    let mut adam = Adam::new(0.1);
    adam.step(vec![ParamGroup::new(0.0, vec![&mut w])]);
    assert_abs_diff_eq!(w.value()[[0, 0]], 1.9, epsilon = 1e-5);
    assert_eq!(adam.timestep(), 1);
    assert_abs_diff_eq!(adam.get_momentum("w").unwrap()[[0, 0]], 0.3, epsilon = 1e-6);
    assert_abs_diff_eq!(adam.get_velocity("w").unwrap()[[0, 0]], 0.009, epsilon = 1e-6);

    adam.reset();
    assert_eq!(adam.timestep(), 0);
    assert!(adam.get_momentum("w").is_none());
}

#[test]
fn test_weight_decay_per_group() {
    let mut decayed = Param::new("a", array![[1.0]]);
    let mut plain = Param::new("b", array![[1.0]]);

    let mut sgd = SGD::new(0.1);
    sgd.step(vec![
        ParamGroup::new(0.5, vec![&mut decayed]),
        ParamGroup::new(0.0, vec![&mut plain]),
    ]);
    // 梯度为 0 时只有 weight decay 起作用：1 - 0.1 * 0.5
    assert_abs_diff_eq!(decayed.value()[[0, 0]], 0.95, epsilon = 1e-6);
    assert_eq!(plain.value()[[0, 0]], 1.0);
}

#[test]
fn test_sgd_descends_quadratic() {
    // f(w) = (w - 3)^2
    let mut w = Param::new("w", array![[0.0]]);
    let mut sgd = SGD::new(0.1);
    for _ in 0..100 {
        w.zero_grad();
        let g = 2.0 * (w.value()[[0, 0]] - 3.0);
        w.accumulate_grad(&array![[g]]).unwrap();
        sgd.step(vec![ParamGroup::new(0.0, vec![&mut w])]);
    }
    assert_abs_diff_eq!(w.value()[[0, 0]], 3.0, epsilon = 1e-3);
}

#[test]
fn test_param_rejects_wrong_shape() {
    let mut p = Param::new("p", array![[1.0, 2.0]]);
    assert!(p.accumulate_grad(&array![[1.0]]).is_err());
    assert!(p.set_value(&array![[1.0], [2.0]]).is_err());
}
