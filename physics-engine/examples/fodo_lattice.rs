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
//! FODO lattice example: builds a 4-cell focusing/defocusing lattice,
//! binds it to a controller, and tracks a small proton beam through it
//! for a fixed number of sub-steps, reporting how many particles
//! survive the apertures.
//!
//! ```bash
//! cargo run --example fodo_lattice --release
//! ```

use nalgebra::Vector3;

use physics_engine::controller::SimulationController;
use physics_engine::ensemble::{BeamParameters, DistributionKind, ParticleEnsemble};
use physics_engine::integration::IntegratorKind;
use physics_engine::lattice::{Aperture, Lattice};
use physics_engine::particle::Species;

fn main() {
    let cell_length = 10.0;
    let quad_length = 0.5;
    let gradient = 50.0;
    let aperture = Aperture::circular(0.03);

    // drift_length = 0.0 lets the builder derive it from cell_length.
    let lattice = Lattice::fodo_cell(4, "FODO", cell_length, quad_length, gradient, 0.0, aperture);
    println!(
        "Built FODO lattice: {} components, total length {:.1} m",
        lattice.len(),
        cell_length * 4.0
    );

    let params = BeamParameters {
        species: Species::Proton,
        num_particles: 200,
        kinetic_energy: 10.0 * physics_engine::constants::MEV,
        sigma_x: 1e-3,
        sigma_y: 1e-3,
        sigma_z: 1e-2,
        sigma_px: 1e-4,
        sigma_py: 1e-4,
        sigma_delta: 1e-3,
        position_offset: Vector3::zeros(),
        direction: Vector3::z(),
        distribution: DistributionKind::Gaussian,
        seed: 1,
    };
    let beam = ParticleEnsemble::generate_beam(&params);
    println!("Generated beam: {} particles", beam.len());

    let mut controller = SimulationController::new(1e-10, IntegratorKind::Boris);
    controller.set_accelerator(lattice);
    for particle in beam.iter() {
        controller.ensemble_mut().push(*particle);
    }
    controller.start();

    for _ in 0..2000 {
        controller.step();
    }

    let stats = controller.stats();
    println!(
        "After {} sub-steps ({:.3e} s): {} particles active, {} lost",
        stats.step_count,
        stats.simulation_time,
        controller.ensemble().active_count(),
        stats.lost_count
    );

    let beam_stats = controller.ensemble().compute_statistics();
    println!(
        "RMS beam size: ({:.3e}, {:.3e}, {:.3e}) m; mean kinetic energy {:.3e} J",
        beam_stats.rms_position.x, beam_stats.rms_position.y, beam_stats.rms_position.z, beam_stats.mean_kinetic_energy
    );
}
