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
//! Cyclotron orbit example: a single proton circling in a uniform
//! magnetic field bound as a single lattice dipole, tracked with the
//! Boris pusher for one full cyclotron period, reporting how closely
//! the orbit closes on itself. Adapted to the dipole's local-y field
//! convention: the orbit plane here is x-z rather than x-y.
//!
//! ```bash
//! cargo run --example cyclotron_orbit --release
//! ```

use nalgebra::Vector3;

use physics_engine::constants::{C, E_CHARGE, M_PROTON};
use physics_engine::controller::SimulationController;
use physics_engine::integration::IntegratorKind;
use physics_engine::lattice::{Aperture, Lattice, LatticeComponent};
use physics_engine::particle::Particle;

fn main() {
    let b_field = 1.0;

    let mut proton = Particle::proton();
    proton.set_velocity(Vector3::new(0.1 * C, 0.0, 0.0));
    let p_mag = proton.momentum().norm();
    let r = p_mag / (E_CHARGE * b_field);
    let period = 2.0 * std::f64::consts::PI * proton.gamma() * M_PROTON / (E_CHARGE * b_field);
    let dt = period / 1000.0;

    let mut controller = SimulationController::new(dt, IntegratorKind::Boris);
    controller.ensemble_mut().push(proton);

    // A single oversized dipole so the particle never leaves its
    // aperture over the course of one orbit.
    let mut lattice = Lattice::new();
    lattice.push(LatticeComponent::dipole("B1", 10.0 * r, Aperture::circular(5.0 * r), b_field));
    controller.set_accelerator(lattice);

    println!("Theoretical radius: {r:.6e} m, period: {period:.6e} s, dt: {dt:.6e} s");

    controller.start();
    for _ in 0..1000 {
        controller.step();
    }

    let particle = controller.ensemble().get(0).unwrap();
    let radial = (particle.position().x.powi(2) + particle.position().z.powi(2)).sqrt();
    println!(
        "After {} sub-steps: position = ({:.6e}, {:.6e}, {:.6e}) m, distance from origin = {:.6e} m ({:.3}% of r)",
        controller.step_count(),
        particle.position().x,
        particle.position().y,
        particle.position().z,
        radial,
        100.0 * radial / r
    );
}
