use spiraltraj::{calc_traj, Axis, TrajectoryConfig};

fn main() {
    tracing_subscriber::fmt::init();

    let config = TrajectoryConfig::default();
    let traj = calc_traj(&config).unwrap();
    let grad = traj.interleave(0).unwrap();

    println!(
        "{:?}: {} interleaves, {} samples each ({:.2} ms), segments start at {:?}",
        config.spiral_type,
        traj.interleave_count(),
        traj.samples_per_interleave(),
        traj.duration() / 1000.0,
        traj.segment_starts()
    );

    for axis in [Axis::X, Axis::Y] {
        println!("\nG{axis:?} [mT/m], peak {:.2}", traj.peak().get(axis));
        plot(grad.axis(axis));
    }
}

fn plot(data: &[f64]) {
    let plot_width = 100;
    let plot_height = 20;

    // Average over the samples falling into each column
    let samples: Vec<f64> = (0..plot_width)
        .map(|col| {
            let start = col * data.len() / plot_width;
            let end = ((col + 1) * data.len() / plot_width).max(start + 1);
            let bucket = &data[start..end.min(data.len())];
            bucket.iter().sum::<f64>() / bucket.len() as f64
        })
        .collect();

    let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    for i in 0..=plot_height {
        let y = max - (max - min) * (i as f64 / plot_height as f64);
        print!("{y:-8.2} | ");

        for &sample in &samples {
            if (y > 0.0) != (y >= sample) {
                print!("█");
            } else {
                print!(" ");
            }
        }
        println!()
    }
}
