use spiraltraj::{calc_traj, TrajectoryConfig};

fn main() {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/preset.toml".to_owned());
    let source = std::fs::read_to_string(&path).unwrap();
    let config = TrajectoryConfig::from_toml_str(&source).unwrap();

    match calc_traj(&config) {
        Ok(traj) => {
            let peak = traj.peak();
            println!("{path}: {config:#?}");
            println!(
                "{} interleaves x {} samples, {:.3} ms per interleave",
                traj.interleave_count(),
                traj.samples_per_interleave(),
                traj.duration() / 1000.0
            );
            println!("peak [mT/m]: x = {:.3}, y = {:.3}, z = {:.3}", peak.x, peak.y, peak.z);
        }
        Err(err) => eprintln!("{path}: {err}"),
    }
}
