//! # Trajectory Generation Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use nalgebra::Vector2;
use traj_lib::{
    kinematics::{ChassisSpeeds, MecanumDriveKinematics, SwerveDriveKinematics},
    trajectory::{
        constraint::CentripetalAccelerationConstraint, generator, TrajectoryConfig,
    },
};
use util::geom::Pose2;

fn traj_gen_benchmark(c: &mut Criterion) {
    // ---- Build the test path ----

    let start = Pose2::new(0.0, 0.0, 0.0);
    let end = Pose2::new(6.0, 1.0, 0.0);
    let interior_m = vec![
        Vector2::new(1.5, 1.0),
        Vector2::new(3.0, -1.0),
        Vector2::new(4.5, 0.5),
    ];

    let config = TrajectoryConfig::new(1.5, 1.0)
        .add_constraint(CentripetalAccelerationConstraint::new(0.8));

    // Bench generation of cubic and quintic paths through the same waypoints
    c.bench_function("generator::generate_cubic", |b| {
        b.iter(|| generator::generate_cubic(&start, &interior_m, &end, &config).unwrap())
    });

    let waypoints = vec![
        start,
        Pose2::new(1.5, 1.0, 0.0),
        Pose2::new(3.0, -1.0, 0.0),
        Pose2::new(4.5, 0.5, 0.0),
        end,
    ];

    c.bench_function("generator::generate_quintic", |b| {
        b.iter(|| generator::generate_quintic(&waypoints, &config).unwrap())
    });

    // ---- Sampling ----

    let traj = generator::generate_cubic(&start, &interior_m, &end, &config).unwrap();
    let total_time_s = traj.total_time_s();

    c.bench_function("Trajectory::sample", |b| {
        let mut t = 0.0;
        b.iter(|| {
            t = (t + 0.013) % total_time_s;
            traj.sample(t)
        })
    });

    // ---- Kinematics ----

    let mecanum = MecanumDriveKinematics::new(
        Vector2::new(0.3, 0.3),
        Vector2::new(0.3, -0.3),
        Vector2::new(-0.3, 0.3),
        Vector2::new(-0.3, -0.3),
    )
    .unwrap();
    let swerve = SwerveDriveKinematics::new(vec![
        Vector2::new(0.3, 0.3),
        Vector2::new(0.3, -0.3),
        Vector2::new(-0.3, 0.3),
        Vector2::new(-0.3, -0.3),
    ])
    .unwrap();
    let speeds = ChassisSpeeds::new(1.0, 0.5, 0.3);

    c.bench_function("MecanumDriveKinematics::to_wheel_speeds", |b| {
        b.iter(|| mecanum.to_wheel_speeds(&speeds))
    });

    // Alternating the centre of rotation forces the inverse kinematics to be rebuilt
    c.bench_function("SwerveDriveKinematics::to_module_states_about", |b| {
        let cors = [Vector2::new(0.0, 0.0), Vector2::new(0.5, 0.0)];
        let mut i = 0;
        b.iter(|| {
            i ^= 1;
            swerve.to_module_states_about(&speeds, &cors[i])
        })
    });
}

criterion_group!(benches, traj_gen_benchmark);
criterion_main!(benches);
