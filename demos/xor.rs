use magnetite_nn::{Dataset, NetConfig, Network};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Each row is the two inputs followed by the label column.
    let rows = vec![
        vec![0.0, 0.0, 0.0],
        vec![0.0, 1.0, 1.0],
        vec![1.0, 0.0, 1.0],
        vec![1.0, 1.0, 0.0],
    ];

    let config = NetConfig {
        batch_size: 4,
        learning_rate: 0.5,
        bias_learning_rate: 0.5,
        train_ratio: 1.0,
        seed: 42,
        ..NetConfig::default()
    };
    let mut net = Network::new(Dataset::new(rows), config);
    net.add_layer(2, "linear")?;
    net.add_layer(4, "tanh")?;
    net.add_layer(1, "sigmoid")?;
    net.initialize()?;

    for epoch in 0..5000 {
        net.train()?;
        if epoch % 500 == 0 {
            println!(
                "Epoch {epoch}: cost = {:.6}, accuracy = {:.2}",
                net.epoch_cost(),
                net.epoch_accuracy()
            );
        }
    }

    net.reset_cursor();
    net.next_batch()?;
    net.feedforward()?;
    let out = &net.layers.last().unwrap().contents;
    for (row, labels) in out.data.iter().zip(net.labels().data.iter()) {
        println!("predicted {:.4} expected {}", row[0], labels[0]);
    }
    Ok(())
}
