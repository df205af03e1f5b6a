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
//! First-order (semi-implicit) Euler integrator. Diagnostic only: it
//! drifts energy in a pure magnetic field far faster than Boris,
//! Verlet, or RK4, so it exists to demonstrate why those are preferred
//! rather than for production tracking.

use super::Integrator;
use crate::field::FieldManager;
use crate::particle::Particle;

/// First-order Euler integrator.
pub struct EulerIntegrator;

impl Integrator for EulerIntegrator {
    fn name(&self) -> &str {
        "Euler"
    }

    fn step(&self, particle: &mut Particle, fields: &FieldManager, time: f64, dt: f64) {
        if !particle.is_active() {
            return;
        }
        let field = fields.evaluate(particle.position(), time);
        let v = particle.velocity();
        let force = particle.charge() * (field.e + v.cross(&field.b));
        let new_momentum = particle.momentum() + force * dt;
        particle.set_momentum(new_momentum);
        let new_position = particle.position() + particle.velocity() * dt;
        particle.set_position(new_position);
    }
}
