use rust_feedforward::{Dataset, FitConfig, Network};

fn main() -> rust_feedforward::Result<()> {
    // Classic XOR dataset.
    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let train = Dataset::from_rows(&xs, &ys)?;

    // 2 -> 4 -> 1 sigmoid network.
    let mut net = Network::new();
    net.resize(2, &[4], 1)?;
    net.random_with_seed(0)?;

    let report = net.fit(
        &train,
        FitConfig {
            epochs: 5_000,
            lr: 0.5,
        },
    )?;

    let mse = net.evaluate_mse(&train)?;
    println!(
        "final_loss_from_fit={} train_mse={}",
        report.final_loss, mse
    );

    let mut out = [0.0_f32; 1];
    for x in xs {
        net.predict_into(&x, &mut out)?;
        println!("x={x:?} y={:?}", out[0]);
    }

    Ok(())
}
