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
//! Benchmarks for deterministic beam generation and aggregate beam
//! statistics at varying particle counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nalgebra::Vector3;

use physics_engine::ensemble::{BeamParameters, DistributionKind, ParticleEnsemble};
use physics_engine::particle::Species;

fn params(num_particles: usize, distribution: DistributionKind) -> BeamParameters {
    BeamParameters {
        species: Species::Proton,
        num_particles,
        kinetic_energy: 10.0 * physics_engine::constants::MEV,
        sigma_x: 1e-3,
        sigma_y: 1e-3,
        sigma_z: 1e-2,
        sigma_px: 1e-4,
        sigma_py: 1e-4,
        sigma_delta: 1e-3,
        position_offset: Vector3::zeros(),
        direction: Vector3::z(),
        distribution,
        seed: 42,
    }
}

fn bench_generate_beam(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_beam");

    for &n in [100usize, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(n as u64));

        for distribution in [DistributionKind::Gaussian, DistributionKind::Uniform, DistributionKind::Waterbag] {
            let label = format!("{distribution:?}");
            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, &n| {
                let p = params(n, distribution);
                b.iter(|| black_box(ParticleEnsemble::generate_beam(black_box(&p))));
            });
        }
    }

    group.finish();
}

fn bench_compute_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_statistics");

    for &n in [100usize, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(n as u64));
        let beam = ParticleEnsemble::generate_beam(&params(n, DistributionKind::Gaussian));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(beam.compute_statistics()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate_beam, bench_compute_statistics);
criterion_main!(benches);
