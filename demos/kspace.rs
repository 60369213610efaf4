use spiraltraj::{calc_traj, SpiralType, TrajectoryConfig};

fn main() {
    tracing_subscriber::fmt::init();

    let config = TrajectoryConfig {
        nitlv: 8,
        res: 2.0,
        spiral_type: SpiralType::SpiralOut,
        ..Default::default()
    };
    let traj = calc_traj(&config).unwrap();

    // One line per interleave, tab separated kx ky kz in 1/m
    for i in 0..traj.interleave_count() {
        let kspace = traj.kspace(i).unwrap();
        let line: Vec<String> = kspace
            .iter()
            .map(|k| format!("{:.3} {:.3} {:.3}", k.x, k.y, k.z))
            .collect();
        println!("{}", line.join("\t"));
    }
}
