use magnetite_nn::{Dataset, Matrix, NetConfig, Network};

const TOL: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < TOL
}

/// Two-layer network with hand-computable gradients: x=[1,2], y=3, linear
/// everywhere, W=[[0.5],[0.25]], zero bias.
#[test]
fn two_layer_updates_match_hand_computed_gradients() {
    let config = NetConfig {
        batch_size: 1,
        learning_rate: 0.1,
        bias_learning_rate: 0.05,
        train_ratio: 1.0,
        ..NetConfig::default()
    };
    let mut net = Network::new(Dataset::new(vec![vec![1.0, 2.0, 3.0]]), config);
    net.add_layer(2, "linear").unwrap();
    net.add_layer(1, "linear").unwrap();
    net.initialize().unwrap();
    net.layers[0].weights = Matrix::from_data(vec![vec![0.5], vec![0.25]]);

    net.next_batch().unwrap();
    net.feedforward().unwrap();
    let out = net.layers[1].contents.data[0][0];
    assert!(approx_eq(out, 1.0));

    net.backpropagate().unwrap();

    // error = 1 - 3 = -2; delta = xᵀ·g = [[-2], [-4]]
    assert!(approx_eq(net.layers[0].weights.data[0][0], 0.5 - 0.1 * (-2.0)));
    assert!(approx_eq(net.layers[0].weights.data[1][0], 0.25 - 0.1 * (-4.0)));
    assert!(approx_eq(net.layers[0].bias.data[0][0], -0.05 * (-2.0)));
}

/// Same two-layer setup with `lambda` set: the update gains the ridge term
/// rate·lambda·W on top of the plain gradient step. The bias carries no
/// ridge term.
#[test]
fn lambda_adds_the_ridge_term_to_the_weight_update() {
    let config = NetConfig {
        batch_size: 1,
        learning_rate: 0.1,
        bias_learning_rate: 0.05,
        lambda: 0.1,
        train_ratio: 1.0,
        ..NetConfig::default()
    };
    let mut net = Network::new(Dataset::new(vec![vec![1.0, 2.0, 3.0]]), config);
    net.add_layer(2, "linear").unwrap();
    net.add_layer(1, "linear").unwrap();
    net.initialize().unwrap();
    net.layers[0].weights = Matrix::from_data(vec![vec![0.5], vec![0.25]]);

    net.next_batch().unwrap();
    net.feedforward().unwrap();
    net.backpropagate().unwrap();

    // update = 0.1·delta + 0.1·0.1·W with delta = [[-2], [-4]]
    assert!(approx_eq(net.layers[0].weights.data[0][0], 0.5 - (-0.2 + 0.005)));
    assert!(approx_eq(net.layers[0].weights.data[1][0], 0.25 - (-0.4 + 0.0025)));
    assert!(approx_eq(net.layers[0].bias.data[0][0], 0.1));
}

/// Two consecutive updates with momentum: the second step must carry half
/// of the first step's update on top of its own gradient term.
#[test]
fn momentum_carries_the_previous_update_into_the_next_step() {
    let config = NetConfig {
        batch_size: 1,
        learning_rate: 0.1,
        bias_learning_rate: 0.0,
        momentum: 0.5,
        train_ratio: 1.0,
        ..NetConfig::default()
    };
    let mut net = Network::new(Dataset::new(vec![vec![1.0, 2.0, 3.0]]), config);
    net.add_layer(2, "linear").unwrap();
    net.add_layer(1, "linear").unwrap();
    net.initialize().unwrap();
    net.layers[0].weights = Matrix::from_data(vec![vec![0.5], vec![0.25]]);

    // First step: no previous update, so update1 = 0.1·[[-2], [-4]].
    net.next_batch().unwrap();
    net.feedforward().unwrap();
    net.backpropagate().unwrap();
    assert!(approx_eq(net.layers[0].weights.data[0][0], 0.7));
    assert!(approx_eq(net.layers[0].weights.data[1][0], 0.65));
    assert!(approx_eq(net.layers[0].prev_update.data[0][0], -0.2));
    assert!(approx_eq(net.layers[0].prev_update.data[1][0], -0.4));

    // Second step: out = 0.7 + 1.3 = 2, delta = [[-1], [-2]], so
    // update2 = 0.1·delta + 0.5·update1 = [[-0.2], [-0.4]].
    net.feedforward().unwrap();
    net.backpropagate().unwrap();
    assert!(approx_eq(net.layers[0].weights.data[0][0], 0.9));
    assert!(approx_eq(net.layers[0].weights.data[1][0], 1.05));
}

/// Three-layer all-linear network where every update is derived from the
/// pre-update snapshot. If the output edge were updated before the hidden
/// gradient is computed, the hidden delta would come out as [[1.6, 1.2], …]
/// instead of [[2, 2], …].
#[test]
fn backpropagate_never_observes_partially_updated_weights() {
    let config = NetConfig {
        batch_size: 1,
        learning_rate: 0.1,
        bias_learning_rate: 0.1,
        train_ratio: 1.0,
        ..NetConfig::default()
    };
    let mut net = Network::new(Dataset::new(vec![vec![1.0, 2.0, 1.0]]), config);
    net.add_layer(2, "linear").unwrap();
    net.add_layer(2, "linear").unwrap();
    net.add_layer(1, "linear").unwrap();
    net.initialize().unwrap();
    net.layers[0].weights = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    net.layers[1].weights = Matrix::from_data(vec![vec![1.0], vec![1.0]]);

    net.next_batch().unwrap();
    net.feedforward().unwrap();
    assert!(approx_eq(net.layers[2].contents.data[0][0], 3.0));

    net.backpropagate().unwrap();

    // g_out = 2; delta_out = hiddenᵀ·g = [[2], [4]]
    assert!(approx_eq(net.layers[1].weights.data[0][0], 0.8));
    assert!(approx_eq(net.layers[1].weights.data[1][0], 0.6));
    assert!(approx_eq(net.layers[1].bias.data[0][0], -0.2));

    // g_hidden = (g_out · W_outᵀ) with the ORIGINAL W_out = [[1], [1]]
    assert!(approx_eq(net.layers[0].weights.data[0][0], 0.8));
    assert!(approx_eq(net.layers[0].weights.data[0][1], -0.2));
    assert!(approx_eq(net.layers[0].weights.data[1][0], -0.4));
    assert!(approx_eq(net.layers[0].weights.data[1][1], 0.6));
    assert!(approx_eq(net.layers[0].bias.data[0][0], -0.2));
    assert!(approx_eq(net.layers[0].bias.data[0][1], -0.2));
}

/// 2→3→1 with ReLU hidden and identity output, one sample (x=[1,2], y=5):
/// a single update must move the output strictly closer to the target.
#[test]
fn one_training_step_moves_the_output_toward_the_target() {
    let config = NetConfig {
        batch_size: 1,
        learning_rate: 0.01,
        bias_learning_rate: 0.01,
        train_ratio: 1.0,
        ..NetConfig::default()
    };
    let mut net = Network::new(Dataset::new(vec![vec![1.0, 2.0, 5.0]]), config);
    net.add_layer(2, "linear").unwrap();
    net.add_layer(3, "relu").unwrap();
    net.add_layer(1, "linear").unwrap();
    net.initialize().unwrap();
    net.layers[0].weights =
        Matrix::from_data(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]);
    net.layers[1].weights = Matrix::from_data(vec![vec![0.1], vec![0.2], vec![0.3]]);

    net.next_batch().unwrap();
    net.feedforward().unwrap();
    let before = net.layers[2].contents.data[0][0];
    let cost_before = net.cost();
    assert!(approx_eq(before, 0.78));

    net.backpropagate().unwrap();
    net.feedforward().unwrap();
    let after = net.layers[2].contents.data[0][0];

    assert!((5.0 - after).abs() < (5.0 - before).abs());
    assert!(net.cost() < cost_before);
}

/// MSE is non-negative and trends down on a linearly separable problem with
/// a small fixed learning rate.
#[test]
fn cost_decreases_on_a_separable_dataset() {
    let mut rows = Vec::new();
    for i in 0..5 {
        for j in 0..4 {
            let x1 = i as f64 / 4.0;
            let x2 = j as f64 / 3.0;
            let label = if x1 + x2 > 1.0 { 1.0 } else { 0.0 };
            rows.push(vec![x1, x2, label]);
        }
    }
    let config = NetConfig {
        batch_size: 4,
        learning_rate: 0.05,
        bias_learning_rate: 0.05,
        train_ratio: 1.0,
        seed: 3,
        ..NetConfig::default()
    };
    let mut net = Network::new(Dataset::new(rows), config);
    net.add_layer(2, "linear").unwrap();
    net.add_layer(1, "sigmoid").unwrap();
    net.initialize().unwrap();

    net.train().unwrap();
    let first = net.epoch_cost();
    assert!(first >= 0.0);
    for _ in 0..60 {
        net.train().unwrap();
        assert!(net.epoch_cost() >= 0.0);
    }
    assert!(net.epoch_cost() < first);
}
