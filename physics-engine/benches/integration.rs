// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Benchmarks comparing the four integrators' per-step throughput over
//! varying particle counts, in a uniform magnetic field.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nalgebra::Vector3;

use physics_engine::field::source::UniformB;
use physics_engine::field::FieldManager;
use physics_engine::integration::{BorisIntegrator, EulerIntegrator, Integrator, RK4Integrator, VelocityVerletIntegrator};
use physics_engine::particle::Particle;

fn make_particles(n: usize) -> Vec<Particle> {
    (0..n)
        .map(|i| {
            let mut p = Particle::proton();
            p.set_kinetic_energy(10.0 * physics_engine::constants::MEV, Vector3::new(1.0, 0.01 * i as f64, 0.0));
            p
        })
        .collect()
}

fn make_field() -> FieldManager {
    let mut mgr = FieldManager::new();
    mgr.add_source(Arc::new(UniformB::new(Vector3::new(0.0, 0.0, 1.0))));
    mgr
}

fn bench_integrator_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrator_throughput");
    let dt = 1e-12;
    let field = make_field();

    for particle_count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*particle_count as u64));

        macro_rules! bench_one {
            ($name:literal, $integrator:expr) => {
                group.bench_with_input(BenchmarkId::new($name, particle_count), particle_count, |b, &n| {
                    let mut particles = make_particles(n);
                    let integrator = $integrator;
                    b.iter(|| {
                        for p in particles.iter_mut() {
                            integrator.step(black_box(p), black_box(&field), 0.0, dt);
                        }
                    });
                });
            };
        }

        bench_one!("euler", EulerIntegrator);
        bench_one!("verlet", VelocityVerletIntegrator);
        bench_one!("boris", BorisIntegrator);
        bench_one!("rk4", RK4Integrator);
    }

    group.finish();
}

fn bench_cyclotron_accuracy(c: &mut Criterion) {
    let mut group = c.benchmark_group("cyclotron_accuracy");
    group.sample_size(20);

    let field = make_field();
    let dt = 1e-12;
    let steps = 1000;

    group.bench_function("boris_1000_steps", |b| {
        b.iter(|| {
            let mut p = Particle::proton();
            p.set_velocity(Vector3::new(0.1 * physics_engine::constants::C, 0.0, 0.0));
            let integrator = BorisIntegrator;
            for i in 0..steps {
                integrator.step(&mut p, &field, i as f64 * dt, dt);
            }
            black_box(p.position())
        });
    });

    group.bench_function("rk4_1000_steps", |b| {
        b.iter(|| {
            let mut p = Particle::proton();
            p.set_velocity(Vector3::new(0.1 * physics_engine::constants::C, 0.0, 0.0));
            let integrator = RK4Integrator;
            for i in 0..steps {
                integrator.step(&mut p, &field, i as f64 * dt, dt);
            }
            black_box(p.position())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_integrator_throughput, bench_cyclotron_accuracy);
criterion_main!(benches);
