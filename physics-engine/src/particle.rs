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
//! Relativistic charged-particle state.
//!
//! A [`Particle`] carries position and momentum in SI units plus its
//! rest mass and charge, and caches the derived Lorentz invariants
//! (`gamma`, `beta`) so callers never need to recompute them between
//! reads. Every mutator that changes momentum or velocity recomputes
//! both; there is no way to observe a [`Particle`] in an inconsistent
//! state.

use nalgebra::Vector3;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::{self, C};

/// Process-wide monotonic counter for particle ids.
///
/// A single atomic counter, never reused; density is not required.
static NEXT_PARTICLE_ID: AtomicU64 = AtomicU64::new(1);

fn next_particle_id() -> u64 {
    NEXT_PARTICLE_ID.fetch_add(1, Ordering::Relaxed)
}

/// The four charged-particle species the beam generator and config
/// loader need to recognize by name (`particleType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    /// Electron (e-).
    Electron,
    /// Positron (e+).
    Positron,
    /// Proton (p).
    Proton,
    /// Antiproton (p-bar).
    Antiproton,
}

impl Species {
    /// Rest mass of this species, kg.
    pub fn mass(self) -> f64 {
        match self {
            Species::Electron | Species::Positron => constants::M_ELECTRON,
            Species::Proton | Species::Antiproton => constants::M_PROTON,
        }
    }

    /// Electric charge of this species, C.
    pub fn charge(self) -> f64 {
        match self {
            Species::Electron => -constants::E_CHARGE,
            Species::Positron => constants::E_CHARGE,
            Species::Proton => constants::E_CHARGE,
            Species::Antiproton => -constants::E_CHARGE,
        }
    }
}

/// A single relativistic charged particle.
///
/// # Invariants
///
/// After every mutation of momentum or velocity:
/// - `gamma = sqrt(1 + (|p|/(m*c))^2)`, `beta = sqrt(1 - 1/gamma^2)`.
/// - `|v| < c` strictly; [`Particle::set_velocity`] clamps a
///   caller-requested `|v| >= c` down to `0.999999*c` rather than
///   accept a superluminal state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    id: u64,
    position: Vector3<f64>,
    momentum: Vector3<f64>,
    mass: f64,
    charge: f64,
    active: bool,
    gamma: f64,
    beta: f64,
}

impl Particle {
    /// Construct a particle at rest at the origin with the given mass
    /// and charge.
    ///
    /// # Panics
    ///
    /// Panics if `mass` is not finite and strictly positive. This is a
    /// caller-programming error, not a data condition the engine needs
    /// to recover from at runtime.
    pub fn new(mass: f64, charge: f64) -> Self {
        assert!(mass.is_finite() && mass > 0.0, "mass must be positive and finite");
        assert!(charge.is_finite(), "charge must be finite");
        Particle {
            id: next_particle_id(),
            position: Vector3::zeros(),
            momentum: Vector3::zeros(),
            mass,
            charge,
            active: true,
            gamma: 1.0,
            beta: 0.0,
        }
    }

    /// Construct an electron at rest at the origin.
    pub fn electron() -> Self {
        Self::new(Species::Electron.mass(), Species::Electron.charge())
    }

    /// Construct a positron at rest at the origin.
    pub fn positron() -> Self {
        Self::new(Species::Positron.mass(), Species::Positron.charge())
    }

    /// Construct a proton at rest at the origin.
    pub fn proton() -> Self {
        Self::new(Species::Proton.mass(), Species::Proton.charge())
    }

    /// Construct an antiproton at rest at the origin.
    pub fn antiproton() -> Self {
        Self::new(Species::Antiproton.mass(), Species::Antiproton.charge())
    }

    /// Construct a particle of the given species at rest at the origin.
    pub fn of_species(species: Species) -> Self {
        Self::new(species.mass(), species.charge())
    }

    /// Process-wide unique id, assigned at construction.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current position, metres.
    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    /// Replace the position. Position carries no invariants of its own.
    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.position = position;
    }

    /// Current momentum, kg*m/s.
    pub fn momentum(&self) -> Vector3<f64> {
        self.momentum
    }

    /// Rest mass, kg.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Electric charge, C.
    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// Whether this particle is still being tracked (not lost).
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark the particle inactive (lost).
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Mark the particle active again.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Lorentz factor, `>= 1`.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Relativistic beta, `v/c`, in `[0, 1)`.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Speed, m/s (`beta * c`).
    pub fn speed(&self) -> f64 {
        self.beta * C
    }

    /// Velocity vector, m/s (`p / (gamma * m)`).
    pub fn velocity(&self) -> Vector3<f64> {
        if self.momentum.norm() == 0.0 {
            Vector3::zeros()
        } else {
            self.momentum / (self.gamma * self.mass)
        }
    }

    /// Total (relativistic) energy, J: `E = gamma * m * c^2`.
    pub fn total_energy(&self) -> f64 {
        self.gamma * self.mass * C * C
    }

    /// Kinetic energy, J: `K = (gamma - 1) * m * c^2`.
    pub fn kinetic_energy(&self) -> f64 {
        (self.gamma - 1.0) * self.mass * C * C
    }

    /// Relative momentum deviation `(|p| - p0) / p0` against a reference
    /// momentum `p0` (the ensemble's `reference_momentum`).
    pub fn delta(&self, reference_momentum: f64) -> f64 {
        (self.momentum.norm() - reference_momentum) / reference_momentum
    }

    /// Replace the full momentum vector, recomputing `gamma` and `beta`.
    pub fn set_momentum(&mut self, momentum: Vector3<f64>) {
        self.momentum = momentum;
        self.recompute_invariants();
    }

    /// Replace the x-component of momentum, recomputing `gamma`/`beta`.
    pub fn set_momentum_x(&mut self, px: f64) {
        self.momentum.x = px;
        self.recompute_invariants();
    }

    /// Replace the y-component of momentum, recomputing `gamma`/`beta`.
    pub fn set_momentum_y(&mut self, py: f64) {
        self.momentum.y = py;
        self.recompute_invariants();
    }

    /// Replace the z-component of momentum, recomputing `gamma`/`beta`.
    pub fn set_momentum_z(&mut self, pz: f64) {
        self.momentum.z = pz;
        self.recompute_invariants();
    }

    /// Set the velocity directly.
    ///
    /// If the requested speed is `>= c`, the velocity direction is kept
    /// but its magnitude is clamped to `0.999999*c`: the engine never
    /// accepts a superluminal state, silently.
    pub fn set_velocity(&mut self, velocity: Vector3<f64>) {
        let speed = velocity.norm();
        let (direction, clamped_speed) = if speed == 0.0 {
            (Vector3::zeros(), 0.0)
        } else if speed >= C {
            (velocity / speed, constants::MAX_BETA * C)
        } else {
            (velocity / speed, speed)
        };
        let beta = clamped_speed / C;
        let gamma = 1.0 / (1.0 - beta * beta).sqrt();
        self.gamma = gamma;
        self.beta = beta;
        self.momentum = direction * (gamma * self.mass * clamped_speed);
    }

    /// Set the kinetic energy, redirecting the momentum along `direction`.
    ///
    /// If `direction` is (numerically) the zero vector, the particle's
    /// current momentum direction is reused instead; if the particle is
    /// currently at rest too, momentum defaults to `+z`.
    pub fn set_kinetic_energy(&mut self, kinetic_energy: f64, direction: Vector3<f64>) {
        let gamma = constants::gamma_from_kinetic_energy(kinetic_energy, self.mass);
        let beta = constants::beta_from_gamma(gamma);
        let dir_norm = direction.norm();
        let unit_direction = if dir_norm > 1e-12 {
            direction / dir_norm
        } else {
            let current = self.momentum.norm();
            if current > 1e-12 {
                self.momentum / current
            } else {
                Vector3::z()
            }
        };
        self.gamma = gamma;
        self.beta = beta;
        self.momentum = unit_direction * (gamma * beta * self.mass * C);
    }

    fn recompute_invariants(&mut self) {
        let p_mag = self.momentum.norm();
        self.gamma = constants::gamma_from_momentum(p_mag, self.mass);
        self.beta = constants::beta_from_gamma(self.gamma);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_rest_is_consistent() {
        let p = Particle::proton();
        assert_eq!(p.gamma(), 1.0);
        assert_eq!(p.beta(), 0.0);
        assert_eq!(p.kinetic_energy(), 0.0);
        assert!(p.total_energy() > 0.0);
    }

    #[test]
    fn subluminal_after_any_mutator() {
        let mut p = Particle::electron();
        p.set_momentum(Vector3::new(1e-18, 0.0, 0.0));
        assert!(p.beta() < 1.0);
        assert!(p.gamma() >= 1.0);

        p.set_velocity(Vector3::new(10.0 * C, 0.0, 0.0));
        assert!(p.beta() < 1.0);
        assert!(p.velocity().norm() < C);
    }

    #[test]
    fn set_velocity_clamps_superluminal_request() {
        let mut p = Particle::proton();
        p.set_velocity(Vector3::new(2.0 * C, 0.0, 0.0));
        assert!((p.beta() - constants::MAX_BETA).abs() < 1e-9);
    }

    #[test]
    fn energy_momentum_identity_holds() {
        // E^2 = (p*c)^2 + (m*c^2)^2
        let mut p = Particle::proton();
        p.set_kinetic_energy(7.0 * crate::constants::TEV, Vector3::x());
        let e = p.total_energy();
        let pc = p.momentum().norm() * C;
        let rest = p.mass() * C * C;
        let lhs = e * e;
        let rhs = pc * pc + rest * rest;
        assert!((lhs - rhs).abs() / lhs < 1e-18);
    }

    #[test]
    fn kinetic_energy_round_trips_through_set() {
        let mut p = Particle::proton();
        let k = 10.0 * crate::constants::MEV;
        p.set_kinetic_energy(k, Vector3::z());
        let back = p.kinetic_energy();
        assert!((back - k).abs() / k < 1e-10);
    }

    #[test]
    fn set_kinetic_energy_with_zero_direction_reuses_current_direction() {
        let mut p = Particle::proton();
        p.set_momentum(Vector3::new(0.0, 1.0, 0.0) * 1e-19);
        let before_dir = p.momentum().normalize();
        p.set_kinetic_energy(1.0 * crate::constants::MEV, Vector3::zeros());
        let after_dir = p.momentum().normalize();
        assert!((before_dir - after_dir).norm() < 1e-9);
    }

    #[test]
    fn set_kinetic_energy_with_zero_direction_and_no_momentum_defaults_to_z() {
        let mut p = Particle::proton();
        p.set_kinetic_energy(1.0 * crate::constants::MEV, Vector3::zeros());
        let dir = p.momentum().normalize();
        assert!((dir - Vector3::z()).norm() < 1e-9);
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        let a = Particle::proton();
        let b = Particle::proton();
        assert!(b.id() > a.id());
    }

    #[test]
    #[should_panic(expected = "mass must be positive and finite")]
    fn negative_mass_panics() {
        Particle::new(-1.0, 1.0);
    }
}
