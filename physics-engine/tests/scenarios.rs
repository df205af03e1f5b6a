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
//! End-to-end scenarios S1-S6, run against the public crate surface
//! rather than any single module's internals.

use std::sync::Arc;

use nalgebra::Vector3;

use physics_engine::constants::{C, E_CHARGE, M_PROTON};
use physics_engine::ensemble::{BeamParameters, DistributionKind, ParticleEnsemble};
use physics_engine::field::source::{UniformB, RF};
use physics_engine::field::FieldManager;
use physics_engine::field::FieldSource;
use physics_engine::integration::{BorisIntegrator, Integrator, RK4Integrator};
use physics_engine::lattice::Lattice;
use physics_engine::particle::{Particle, Species};

/// S1 — an LHC-scale proton at 7 TeV kinetic energy lands in the
/// expected gamma/beta window.
#[test]
fn s1_lhc_proton() {
    let mut proton = Particle::proton();
    proton.set_kinetic_energy(7.0e12 * E_CHARGE, Vector3::x());

    assert!(proton.gamma() >= 7450.0 && proton.gamma() <= 7475.0, "gamma = {}", proton.gamma());
    let beta = proton.velocity().norm() / C;
    assert!(beta > 0.999_999 && beta < 1.0, "beta = {beta}");
}

/// S2 — a 0.1c proton circling in a uniform 1 T field closes its
/// orbit to within 5% of the theoretical radius after 1000 Boris
/// sub-steps at dt = T/1000.
#[test]
fn s2_cyclotron_orbit_closure() {
    let b_field = 1.0;
    let mut proton = Particle::proton();
    proton.set_velocity(Vector3::new(0.1 * C, 0.0, 0.0));

    let p_mag = proton.momentum().norm();
    let r = p_mag / (E_CHARGE * b_field);
    let period = 2.0 * std::f64::consts::PI * proton.gamma() * M_PROTON / (E_CHARGE * b_field);
    let dt = period / 1000.0;

    let mut fields = FieldManager::new();
    fields.add_source(Arc::new(UniformB::new(Vector3::new(0.0, 0.0, b_field))));
    let integrator = BorisIntegrator;

    for i in 0..1000 {
        integrator.step(&mut proton, &fields, i as f64 * dt, dt);
    }

    let radial = (proton.position().x.powi(2) + proton.position().y.powi(2)).sqrt();
    assert!(radial <= 0.05 * r, "radial = {radial}, 5% of r = {}", 0.05 * r);
}

/// S3 — a proton drifting through empty field space advances exactly
/// `v_z * dt` regardless of which integrator drives it.
#[test]
fn s3_pure_drift() {
    let dt = 1e-9;
    let fields = FieldManager::new();

    let mut proton = Particle::proton();
    proton.set_kinetic_energy(1.0 * physics_engine::constants::MEV, Vector3::z());
    let v_z = proton.velocity().z;
    let z0 = proton.position().z;

    let boris = BorisIntegrator;
    boris.step(&mut proton, &fields, 0.0, dt);
    assert!((proton.position().z - z0 - v_z * dt).abs() < 1e-15, "boris drift mismatch");

    let mut proton2 = Particle::proton();
    proton2.set_kinetic_energy(1.0 * physics_engine::constants::MEV, Vector3::z());
    let v_z2 = proton2.velocity().z;
    let z02 = proton2.position().z;
    let rk4 = RK4Integrator;
    rk4.step(&mut proton2, &fields, 0.0, dt);
    assert!((proton2.position().z - z02 - v_z2 * dt).abs() < 1e-15, "rk4 drift mismatch");
}

/// S4 — a 4-cell FODO lattice yields exactly 16 components, 8
/// quadrupoles split evenly between positive and negative gradients,
/// and a total length of 40 m.
#[test]
fn s4_fodo_four_cells() {
    let cell_length = 10.0;
    let quad_length = 0.5;
    let gradient = 50.0;
    let aperture = physics_engine::lattice::Aperture::circular(0.05);

    let mut lattice = Lattice::fodo_cell(4, "FODO", cell_length, quad_length, gradient, 0.0, aperture);
    assert_eq!(lattice.len(), 16);
    assert_eq!(lattice.total_length(), 4.0 * cell_length);

    let mut positive = 0;
    let mut negative = 0;
    for component in lattice.iter() {
        if let physics_engine::lattice::ComponentKind::Quadrupole { gradient: g } = component.kind() {
            if *g > 0.0 {
                positive += 1;
            } else {
                negative += 1;
            }
        }
    }
    assert_eq!(positive, 4);
    assert_eq!(negative, 4);
}

/// S5 — an RF cavity's longitudinal field is `V/L` on-crest at `t=0`
/// and collapses to near zero a quarter period later.
#[test]
fn s5_rf_field_phase() {
    let voltage = 1.0e6;
    let frequency = 1.0e9;
    let length = 0.5;
    let aperture = 0.1;

    let cavity = RF::new(voltage, frequency, 0.0, length, aperture);
    let e_at_origin_0 = cavity.evaluate(Vector3::zeros(), 0.0).e.z;
    assert!((e_at_origin_0 - voltage / length).abs() < 1.0, "E_z(t=0) = {e_at_origin_0}");

    let period = 1.0 / frequency;
    let e_at_quarter = cavity.evaluate(Vector3::zeros(), period / 4.0).e.z;
    assert!(e_at_quarter.abs() < 1.0, "E_z(T/4) = {e_at_quarter}");
}

/// S6 — two protons placed symmetrically about the origin with
/// identical longitudinal momenta produce sigma_x = 1, sigma_y =
/// sigma_z = 0, and a mean position of the origin.
#[test]
fn s6_statistics_on_symmetric_pair() {
    let p0 = 1.0e-18;
    let mut a = Particle::proton();
    a.set_position(Vector3::new(-1.0, 0.0, 0.0));
    a.set_momentum(Vector3::new(0.0, 0.0, p0));
    let mut b = Particle::proton();
    b.set_position(Vector3::new(1.0, 0.0, 0.0));
    b.set_momentum(Vector3::new(0.0, 0.0, p0));

    let mut ensemble = ParticleEnsemble::new();
    ensemble.set_reference_momentum(p0);
    ensemble.push(a);
    ensemble.push(b);

    let stats = ensemble.compute_statistics();
    assert!((stats.rms_position.x - 1.0).abs() < 1e-12);
    assert!(stats.rms_position.y.abs() < 1e-12);
    assert!(stats.rms_position.z.abs() < 1e-12);
    assert!(stats.mean_position.x.abs() < 1e-12);
    assert!(stats.mean_position.y.abs() < 1e-12);
    assert!(stats.mean_position.z.abs() < 1e-12);
}

/// Beam reproducibility (property 11): the same parameters and seed
/// reproduce bitwise-identical per-particle state.
#[test]
fn beam_generation_is_reproducible() {
    let params = BeamParameters {
        species: Species::Electron,
        num_particles: 500,
        kinetic_energy: 50.0 * physics_engine::constants::MEV,
        sigma_x: 1e-3,
        sigma_y: 1e-3,
        sigma_z: 5e-3,
        sigma_px: 1e-4,
        sigma_py: 1e-4,
        sigma_delta: 1e-3,
        position_offset: Vector3::zeros(),
        direction: Vector3::z(),
        distribution: DistributionKind::Gaussian,
        seed: 7,
    };

    let beam_a = ParticleEnsemble::generate_beam(&params);
    let beam_b = ParticleEnsemble::generate_beam(&params);

    for (pa, pb) in beam_a.iter().zip(beam_b.iter()) {
        assert_eq!(pa.position(), pb.position());
        assert_eq!(pa.momentum(), pb.momentum());
    }
}
