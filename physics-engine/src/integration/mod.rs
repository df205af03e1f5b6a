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
//! Numerical integration strategies for the relativistic Lorentz
//! equation of motion.
//!
//! # Choosing an integrator
//!
//! - **Boris** (default, recommended): phase-space-volume preserving,
//!   exact cyclotron orbits in pure magnetic fields. Use this unless
//!   you have a specific reason not to.
//! - **Velocity Verlet**: second-order, symplectic in the conservative
//!   limit; a reasonable alternative when a field has a strong electric
//!   component.
//! - **RK4**: fourth-order accurate, four field evaluations per step;
//!   use when accuracy against a fixed `dt` matters more than raw
//!   throughput.
//! - **Euler**: first-order, diagnostic only. Drifts energy quickly;
//!   useful as a baseline to show why the other three exist.
//!
//! Every strategy shares the same contract ([`Integrator::step`]) over
//! `(particle, field manager, time, dt)`, so the simulation controller
//! can swap the active integrator between sub-steps without touching
//! particle state.

mod boris;
mod euler;
mod rk4;
mod verlet;

pub use boris::BorisIntegrator;
pub use euler::EulerIntegrator;
pub use rk4::RK4Integrator;
pub use verlet::VelocityVerletIntegrator;

use crate::field::FieldManager;
use crate::particle::Particle;

/// A pluggable strategy for advancing one particle by exactly one fixed
/// `dt`, given the field manager and simulation time.
///
/// Implementations must not allocate and must treat an inactive
/// particle as a no-op.
pub trait Integrator: Send + Sync {
    /// A short, human-readable name (used for diagnostics and the
    /// config-domain fallback warning when an unknown kind is
    /// requested).
    fn name(&self) -> &str;

    /// Advance `particle` by one fixed sub-step `dt` at simulation time
    /// `time`, sampling `fields` as needed.
    fn step(&self, particle: &mut Particle, fields: &FieldManager, time: f64, dt: f64);
}

/// The four integrator strategies a config file or UI control can
/// select by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorKind {
    /// First-order Euler-Cromer, diagnostic only.
    Euler,
    /// Second-order velocity Verlet.
    VelocityVerlet,
    /// Second-order Boris pusher (default).
    Boris,
    /// Fourth-order Runge-Kutta.
    RK4,
}

impl IntegratorKind {
    /// Build a boxed integrator instance for this kind.
    pub fn build(self) -> Box<dyn Integrator> {
        match self {
            IntegratorKind::Euler => Box::new(EulerIntegrator),
            IntegratorKind::VelocityVerlet => Box::new(VelocityVerletIntegrator),
            IntegratorKind::Boris => Box::new(BorisIntegrator),
            IntegratorKind::RK4 => Box::new(RK4Integrator),
        }
    }

    /// Parse the integer encoding (`0:Euler,1:Verlet,2:Boris,3:RK4`).
    /// Unknown values fall back to `Boris` with a warning.
    pub fn from_config_code(code: i64) -> Self {
        match code {
            0 => IntegratorKind::Euler,
            1 => IntegratorKind::VelocityVerlet,
            2 => IntegratorKind::Boris,
            3 => IntegratorKind::RK4,
            other => {
                eprintln!("warning: unknown integratorType {other}, defaulting to Boris");
                IntegratorKind::Boris
            }
        }
    }
}

impl Default for IntegratorKind {
    fn default() -> Self {
        IntegratorKind::Boris
    }
}
