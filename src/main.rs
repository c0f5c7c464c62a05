use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::f64::consts::PI;
use std::time::Instant;
use track_pilot::math::Point3d;
use track_pilot::{
    KinematicVehicle, ObstacleField, Simulation, TrackCurve, TrackPilotConfig, VehicleActuationPort,
};

const SEED: u64 = 2022;
const DT: f64 = 0.05;
const NUM_FRAMES: usize = 2400;
const REPORT_EVERY: usize = 200;

fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => TrackPilotConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => TrackPilotConfig::default(),
    };

    let track = stadium(8000.0, 2500.0);
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut obstacles = ObstacleField::new();
    if let Err(err) = obstacles.populate(&track, &config.obstacles, &mut rng) {
        println!("No obstacles placed: {}", err);
    }

    let vehicle = KinematicVehicle::on_path(Default::default(), &track, 0.0);
    let mut sim = Simulation::new(&config.controller, track, obstacles, vehicle, rng);
    if let Some(err) = sim.controller().setup_error() {
        println!("Controller disabled: {}", err);
    }

    println!("Simulating with {} obstacles...", sim.obstacles().len());
    let start = Instant::now();
    for _ in 0..NUM_FRAMES / REPORT_EVERY {
        for _ in 0..REPORT_EVERY {
            sim.step(DT);
        }
        if let Some(vehicle) = sim.vehicle() {
            println!(
                "t = {:5.1}s: {:5.1}% round, {:6.0} cm/s, gear {:2}, {:?}, {} collisions",
                sim.time(),
                100.0 * sim.progress().unwrap_or(0.0),
                vehicle.forward_speed(),
                vehicle.gear().number(),
                sim.controller().recovery().phase(),
                vehicle.collisions(),
            );
        }
    }
    let frame = start.elapsed() / NUM_FRAMES as u32;
    println!(
        "Avg. frame: {:?} --> {:.0}x real time",
        frame,
        DT / frame.as_secs_f64()
    );

    Ok(())
}

/// Builds a closed stadium-shaped track: two straights joined by semicircles.
fn stadium(straight: f64, radius: f64) -> TrackCurve {
    let arc = |centre_x: f64, from: f64| {
        (0..16).map(move |i| {
            let angle = from + PI * i as f64 / 16.0;
            Point3d::new(centre_x + radius * angle.cos(), radius + radius * angle.sin(), 0.0)
        })
    };
    let points = arc(straight, -0.5 * PI)
        .chain(arc(0.0, 0.5 * PI))
        .collect::<Vec<_>>();
    TrackCurve::closed(points)
}
