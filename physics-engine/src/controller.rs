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
//! The simulation controller: a fixed-timestep state machine that
//! drives the integrator and ensemble, with a lattice-aware loss model
//! and performance counters.

use std::time::Instant;

use nalgebra::Vector3;

use crate::ensemble::ParticleEnsemble;
use crate::field::FieldManager;
use crate::integration::{Integrator, IntegratorKind};
use crate::lattice::Lattice;

/// Transverse radius past which a particle is lost even where no
/// lattice component's aperture applies — the fallback for gaps
/// between components.
pub const HARD_FALLBACK_APERTURE: f64 = 0.10;

/// Default cap on sub-steps processed per outer `update` call.
pub const DEFAULT_MAX_SUBSTEPS: u32 = 10_000;

/// The controller's run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// Not advancing; `update` is a no-op.
    Stopped,
    /// Advancing the accumulator and stepping particles on `update`.
    Running,
    /// Suspended; resumes from the same accumulator state on `resume`.
    Paused,
}

/// A point-in-time snapshot of the controller's performance and
/// aggregate simulation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerStats {
    /// Accumulated simulation time, s.
    pub simulation_time: f64,
    /// Total sub-steps executed since the last `reset`.
    pub step_count: u64,
    /// Sub-steps per wall-clock second, updated roughly once a second.
    pub steps_per_second: f64,
    /// Particles currently tracked (active or not).
    pub particle_count: usize,
    /// Particles lost to the aperture model since the last `reset`.
    pub lost_count: u64,
    /// Mean kinetic energy of active particles, J.
    pub mean_energy: f64,
    /// RMS kinetic-energy spread of active particles, J.
    pub energy_spread: f64,
}

/// Callback invoked once per particle newly lost in a sub-step: id,
/// global position, global momentum, simulation time, and a
/// human-readable reason.
pub type LossCallback = Box<dyn FnMut(u64, Vector3<f64>, Vector3<f64>, f64, &str) + Send>;

/// Drives an ensemble through an integrator against a (possibly
/// unbound) lattice on a fixed timestep, with a sub-step cap per outer
/// tick and a loss model.
pub struct SimulationController {
    state: SimulationState,
    dt: f64,
    time_scale: f64,
    integrator_kind: IntegratorKind,
    integrator: Box<dyn Integrator>,
    max_substeps: u32,
    accumulator: f64,
    t_sim: f64,
    step_count: u64,
    lost_count: u64,
    lattice: Option<Lattice>,
    field_manager: FieldManager,
    ensemble: ParticleEnsemble,
    loss_callback: Option<LossCallback>,
    perf_window_start: Instant,
    steps_since_perf_window: u64,
    steps_per_second: f64,
}

impl SimulationController {
    /// Construct a controller with fixed timestep `dt` (s) and the
    /// given integrator. Starts `Stopped`, unbound, with an empty
    /// ensemble.
    ///
    /// # Panics
    ///
    /// Panics if `dt` is not finite and strictly positive.
    pub fn new(dt: f64, integrator_kind: IntegratorKind) -> Self {
        assert!(dt.is_finite() && dt > 0.0, "dt must be positive and finite");
        SimulationController {
            state: SimulationState::Stopped,
            dt,
            time_scale: 1.0,
            integrator_kind,
            integrator: integrator_kind.build(),
            max_substeps: DEFAULT_MAX_SUBSTEPS,
            accumulator: 0.0,
            t_sim: 0.0,
            step_count: 0,
            lost_count: 0,
            lattice: None,
            field_manager: FieldManager::new(),
            ensemble: ParticleEnsemble::new(),
            loss_callback: None,
            perf_window_start: Instant::now(),
            steps_since_perf_window: 0,
            steps_per_second: 0.0,
        }
    }

    /// Current run state.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Begin advancing the accumulator. Transitioning from `Stopped`
    /// first zeroes the accumulator, simulation clock, and counters (but
    /// not the ensemble, which the caller populates before starting) so
    /// a fresh run always begins at `t_sim = 0`.
    pub fn start(&mut self) {
        if self.state == SimulationState::Stopped {
            self.accumulator = 0.0;
            self.t_sim = 0.0;
            self.step_count = 0;
            self.lost_count = 0;
            self.perf_window_start = Instant::now();
            self.steps_since_perf_window = 0;
            self.steps_per_second = 0.0;
        }
        self.state = SimulationState::Running;
    }

    /// Cooperative stop: takes effect at the next `update` call.
    pub fn stop(&mut self) {
        self.state = SimulationState::Stopped;
    }

    /// Suspend a running simulation, preserving the accumulator.
    pub fn pause(&mut self) {
        if self.state == SimulationState::Running {
            self.state = SimulationState::Paused;
        }
    }

    /// Resume a paused simulation.
    pub fn resume(&mut self) {
        if self.state == SimulationState::Paused {
            self.state = SimulationState::Running;
        }
    }

    /// Clear the ensemble, accumulator, simulation time, and step/loss
    /// counters. Preserves the integrator selection, `dt`, time-scale,
    /// and lattice binding.
    pub fn reset(&mut self) {
        self.ensemble.clear();
        self.accumulator = 0.0;
        self.t_sim = 0.0;
        self.step_count = 0;
        self.lost_count = 0;
        self.perf_window_start = Instant::now();
        self.steps_since_perf_window = 0;
        self.steps_per_second = 0.0;
    }

    /// Replace the fixed timestep, s.
    ///
    /// # Panics
    ///
    /// Panics if `dt` is not finite and strictly positive.
    pub fn set_timestep(&mut self, dt: f64) {
        assert!(dt.is_finite() && dt > 0.0, "dt must be positive and finite");
        self.dt = dt;
    }

    /// Current fixed timestep, s.
    pub fn timestep(&self) -> f64 {
        self.dt
    }

    /// Replace the real-time-to-simulation-time multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `time_scale` is negative or not finite.
    pub fn set_time_scale(&mut self, time_scale: f64) {
        assert!(time_scale.is_finite() && time_scale >= 0.0, "time_scale must be non-negative and finite");
        self.time_scale = time_scale;
    }

    /// Current time-scale multiplier.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Switch the active integrator.
    pub fn set_integrator(&mut self, kind: IntegratorKind) {
        self.integrator_kind = kind;
        self.integrator = kind.build();
    }

    /// Currently selected integrator kind.
    pub fn integrator_kind(&self) -> IntegratorKind {
        self.integrator_kind
    }

    /// Replace the sub-steps-per-tick cap `M`.
    pub fn set_max_substeps(&mut self, max_substeps: u32) {
        self.max_substeps = max_substeps;
    }

    /// Install (or clear, with `None`) the loss callback.
    pub fn set_loss_callback(&mut self, callback: Option<LossCallback>) {
        self.loss_callback = callback;
    }

    /// Bind a lattice, rebuilding the field manager from it and
    /// dropping references to any previously bound lattice's sources.
    /// Scoped acquisition: the controller owns the lattice binding
    /// for the duration of the simulation.
    pub fn set_accelerator(&mut self, lattice: Lattice) {
        self.lattice = Some(lattice);
        self.rebuild_field_manager();
    }

    /// Unbind the current lattice, if any. Clears the field manager.
    pub fn unbind_accelerator(&mut self) {
        self.lattice = None;
        self.field_manager.clear();
    }

    /// Borrow the bound lattice, if any.
    pub fn lattice(&self) -> Option<&Lattice> {
        self.lattice.as_ref()
    }

    /// Mutably borrow the bound lattice, if any.
    ///
    /// Callers that mutate a component's field-affecting parameters
    /// through this reference must call
    /// [`SimulationController::rebuild_field_manager`] afterward so the
    /// next sub-step sees the change: mutation is serialised between
    /// sub-steps only.
    pub fn lattice_mut(&mut self) -> Option<&mut Lattice> {
        self.lattice.as_mut()
    }

    /// Rebuild the field manager from the currently bound lattice (a
    /// no-op, clearing the manager, if none is bound).
    pub fn rebuild_field_manager(&mut self) {
        match self.lattice.as_mut() {
            Some(lattice) => lattice.populate_field_manager(&mut self.field_manager),
            None => self.field_manager.clear(),
        }
    }

    /// Immutable access to the particle ensemble.
    pub fn ensemble(&self) -> &ParticleEnsemble {
        &self.ensemble
    }

    /// Mutable access to the particle ensemble.
    pub fn ensemble_mut(&mut self) -> &mut ParticleEnsemble {
        &mut self.ensemble
    }

    /// Current simulation time, s.
    pub fn simulation_time(&self) -> f64 {
        self.t_sim
    }

    /// Total sub-steps executed since the last `reset`.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// A snapshot of the controller's current performance and
    /// aggregate statistics.
    pub fn stats(&self) -> ControllerStats {
        let beam_stats = self.ensemble.compute_statistics();
        ControllerStats {
            simulation_time: self.t_sim,
            step_count: self.step_count,
            steps_per_second: self.steps_per_second,
            particle_count: self.ensemble.len(),
            lost_count: self.lost_count,
            mean_energy: beam_stats.mean_kinetic_energy,
            energy_spread: beam_stats.rms_kinetic_energy,
        }
    }

    /// Advance the fixed-timestep accumulator by `time_scale * dt_wall`
    /// and execute as many sub-steps as fit, up to the `M` cap,
    /// discarding any accumulator excess if the cap was hit (a bounded
    /// runaway beats a dropped frame of simulation). A no-op unless
    /// `state() == Running`.
    pub fn update(&mut self, dt_wall: f64) {
        if self.state != SimulationState::Running {
            return;
        }
        self.accumulator += self.time_scale * dt_wall;

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            self.substep();
            substeps += 1;
        }
        if substeps == self.max_substeps && self.accumulator > self.dt {
            self.accumulator = 0.0;
        }
        self.update_perf_stats();
    }

    /// Execute exactly one sub-step body (integrate every active
    /// particle, run loss detection, advance `t_sim`) regardless of run
    /// state. Externally callable for single-step debugging.
    pub fn step(&mut self) {
        self.substep();
        self.update_perf_stats();
    }

    fn substep(&mut self) {
        let dt = self.dt;
        let t_sim = self.t_sim;
        let integrator = self.integrator.as_ref();
        let field_manager = &self.field_manager;

        // Particles are independent within a sub-step (the field manager
        // is immutable until the next sub-step boundary), so
        // stepping may run across worker threads under the `parallel`
        // feature.
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.ensemble.par_iter_mut().for_each(|particle| integrator.step(particle, field_manager, t_sim, dt));
        }
        #[cfg(not(feature = "parallel"))]
        {
            for particle in self.ensemble.iter_mut() {
                integrator.step(particle, field_manager, t_sim, dt);
            }
        }

        self.detect_losses();
        self.t_sim += dt;
        self.step_count += 1;
        self.accumulator -= dt;
        self.steps_since_perf_window += 1;
    }

    fn detect_losses(&mut self) {
        let Some(lattice) = self.lattice.as_mut() else { return };
        lattice.compute_lattice();
        if lattice.is_empty() {
            return;
        }
        let t_sim = self.t_sim;
        let mut newly_lost = Vec::new();
        for particle in self.ensemble.iter_mut() {
            if !particle.is_active() {
                continue;
            }
            let position = particle.position();
            lattice.record_detector_hits(particle.id(), position, particle.momentum(), t_sim);
            let inside_component = lattice.iter().any(|c| c.contains_global(position));
            let radial = (position.x * position.x + position.y * position.y).sqrt();
            if !inside_component && radial > HARD_FALLBACK_APERTURE {
                particle.deactivate();
                newly_lost.push((particle.id(), position, particle.momentum()));
            }
        }
        self.lost_count += newly_lost.len() as u64;
        if let Some(callback) = self.loss_callback.as_mut() {
            for (id, position, momentum) in newly_lost {
                callback(id, position, momentum, t_sim, "outside lattice aperture");
            }
        }
    }

    fn update_perf_stats(&mut self) {
        let elapsed = self.perf_window_start.elapsed().as_secs_f64();
        if elapsed >= 1.0 {
            self.steps_per_second = self.steps_since_perf_window as f64 / elapsed;
            self.steps_since_perf_window = 0;
            self.perf_window_start = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{Aperture, LatticeComponent};
    use crate::particle::Particle;

    #[test]
    fn update_is_noop_when_stopped() {
        let mut controller = SimulationController::new(1e-9, IntegratorKind::Boris);
        controller.ensemble_mut().push(Particle::proton());
        controller.update(1.0);
        assert_eq!(controller.step_count(), 0);
    }

    #[test]
    fn running_controller_advances_time_and_step_count() {
        let mut controller = SimulationController::new(1e-9, IntegratorKind::Boris);
        let mut p = Particle::proton();
        p.set_kinetic_energy(1.0 * crate::constants::MEV, Vector3::z());
        controller.ensemble_mut().push(p);
        controller.start();
        controller.update(5e-9);
        assert_eq!(controller.step_count(), 5);
        assert!((controller.simulation_time() - 5e-9).abs() < 1e-18);
    }

    #[test]
    fn substep_cap_discards_accumulator_excess() {
        let mut controller = SimulationController::new(1e-9, IntegratorKind::Boris);
        controller.set_max_substeps(3);
        controller.ensemble_mut().push(Particle::proton());
        controller.start();
        controller.update(10e-9);
        assert_eq!(controller.step_count(), 3);
        controller.update(0.0);
        assert_eq!(controller.step_count(), 3);
    }

    #[test]
    fn reset_preserves_integrator_and_timestep() {
        let mut controller = SimulationController::new(2e-9, IntegratorKind::RK4);
        controller.ensemble_mut().push(Particle::proton());
        controller.start();
        controller.update(4e-9);
        controller.reset();
        assert_eq!(controller.step_count(), 0);
        assert_eq!(controller.simulation_time(), 0.0);
        assert_eq!(controller.timestep(), 2e-9);
        assert_eq!(controller.integrator_kind(), IntegratorKind::RK4);
        assert!(controller.ensemble().is_empty());
    }

    #[test]
    fn particle_outside_aperture_and_fallback_radius_is_lost() {
        let mut controller = SimulationController::new(1e-9, IntegratorKind::Boris);
        let mut lattice = Lattice::new();
        lattice.push(LatticeComponent::beam_pipe("BP", 1.0, Aperture::circular(0.01)));
        controller.set_accelerator(lattice);

        let mut p = Particle::proton();
        p.set_position(Vector3::new(0.5, 0.0, 0.5));
        controller.ensemble_mut().push(p);
        controller.step();

        assert!(!controller.ensemble().get(0).unwrap().is_active());
        assert_eq!(controller.stats().lost_count, 1);
    }

    #[test]
    fn particle_within_fallback_radius_survives_gap_between_components() {
        let mut controller = SimulationController::new(1e-9, IntegratorKind::Boris);
        let mut lattice = Lattice::new();
        lattice.push(LatticeComponent::beam_pipe("BP", 1.0, Aperture::circular(0.01)));
        controller.set_accelerator(lattice);

        let mut p = Particle::proton();
        p.set_position(Vector3::new(0.05, 0.0, 0.5));
        controller.ensemble_mut().push(p);
        controller.step();

        assert!(controller.ensemble().get(0).unwrap().is_active());
    }

    #[test]
    fn detector_component_records_a_hit_as_particle_passes() {
        let mut controller = SimulationController::new(1e-9, IntegratorKind::Boris);
        let mut lattice = Lattice::new();
        lattice.push(LatticeComponent::detector("D1", 1.0, Aperture::circular(0.05)));
        controller.set_accelerator(lattice);

        let mut p = Particle::proton();
        p.set_position(Vector3::new(0.0, 0.0, 0.0));
        let id = p.id();
        controller.ensemble_mut().push(p);
        controller.step();

        let hits = controller.lattice().unwrap().get(0).unwrap().hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].particle_id, id);
    }

    #[test]
    fn unbound_lattice_causes_no_aperture_losses() {
        let mut controller = SimulationController::new(1e-9, IntegratorKind::Boris);
        let mut p = Particle::proton();
        p.set_position(Vector3::new(5.0, 5.0, 5.0));
        controller.ensemble_mut().push(p);
        controller.step();
        assert!(controller.ensemble().get(0).unwrap().is_active());
    }
}
