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
//! # Physics Engine
//!
//! A real-time beam dynamics engine for charged-particle accelerator
//! simulation: relativistic particle state, superposed electromagnetic
//! field sources, four pluggable integrators, a beamline lattice model,
//! a deterministic beam generator, and a fixed-timestep simulation
//! controller with a lattice-aware loss model.
//!
//! ## Features
//!
//! - **Relativistic particles**: position/momentum state with cached
//!   Lorentz invariants, never observable in a superluminal state.
//! - **Field sources**: `UniformB`, `Quadrupole`, `RF`, superposed
//!   through a `FieldManager` composite.
//! - **Integrators**: Euler, velocity Verlet, Boris (default), RK4 —
//!   all sharing one trait so the controller can swap strategies
//!   between sub-steps.
//! - **Lattice**: beamline components laid out end-to-end with
//!   per-component apertures, lazy field-source rebuilding, and a
//!   FODO-cell builder.
//! - **Beam generation**: Gaussian/Uniform/Waterbag ensembles from a
//!   seeded, reproducible PRNG, with beam statistics (RMS, emittance).
//! - **Parallelization**: optional Rayon-backed per-particle stepping.
//!
//! ## Example
//!
//! ```rust
//! use physics_engine::controller::SimulationController;
//! use physics_engine::integration::IntegratorKind;
//! use physics_engine::particle::Particle;
//! use nalgebra::Vector3;
//!
//! let mut controller = SimulationController::new(1e-9, IntegratorKind::Boris);
//! let mut proton = Particle::proton();
//! proton.set_kinetic_energy(1.0 * physics_engine::constants::MEV, Vector3::z());
//! controller.ensemble_mut().push(proton);
//! controller.start();
//! controller.update(1e-8);
//! ```

#![warn(missing_docs)]

/// Physical constants and relativistic helper functions.
pub mod constants;

/// Relativistic charged-particle state.
pub mod particle;

/// Electromagnetic field sources and their superposition.
pub mod field;

/// Numerical integration strategies for the Lorentz force.
pub mod integration;

/// Beamline lattice: components, apertures, and layout.
pub mod lattice;

/// Seedable, reproducible random sampling for beam generation.
pub mod rng;

/// Particle ensembles, the beam generator, and beam statistics.
pub mod ensemble;

/// The fixed-timestep simulation controller and loss model.
pub mod controller;

/// Configuration file shapes and the config-domain fallback policy.
pub mod config;

/// Read-only renderer-facing snapshots of engine state.
pub mod snapshot;

pub use controller::SimulationController;
pub use ensemble::ParticleEnsemble;
pub use particle::Particle;
