use magnetite_nn::{ConvNet, Dataset, Matrix, NetConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = NetConfig {
        batch_size: 1,
        learning_rate: 0.05,
        bias_learning_rate: 0.01,
        train_ratio: 1.0,
        seed: 7,
        ..NetConfig::default()
    };
    let mut net = ConvNet::new(Dataset::default(), config);

    // 8x8 input through a 4x4 kernel (stride 1, no padding) gives a 5x5
    // feature map flattened into the 25-node dense input layer.
    net.add_conv_layer(8, 8, 1, 4, 4, 0)?;
    net.add_layer(25, "linear")?;
    net.add_layer(5, "relu")?;
    net.add_layer(1, "resig")?;
    net.initialize()?;
    net.set_labels(Matrix::from_data(vec![vec![1.0]]))?;

    let square = Matrix::from_data(vec![
        vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    ]);
    net.set_input(&square)?;

    for _ in 0..10 {
        net.process()?;
        net.feedforward()?;
        net.backpropagate()?;
        let out = net.net.layers.last().unwrap().contents.data[0][0];
        println!("{out:.6} <--- activation (cost {:.6})", net.cost());
    }

    print!("{}", net.list_net());
    Ok(())
}
