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
//! Velocity Verlet integrator for the relativistic Lorentz force.
//!
//! Second-order accurate and symplectic in the conservative limit
//! (Hairer, Lubich & Wanner, *Geometric Numerical Integration*, 2nd ed.,
//! §II.3). Adapted here from Newtonian position/velocity updates to the
//! relativistic momentum form: the field is
//! sampled once at the current position/time, the half-step position
//! update uses the *current* velocity, and the momentum kick uses the
//! full-step force before resampling velocity for the second half-step.

use super::Integrator;
use crate::field::FieldManager;
use crate::particle::Particle;

/// Second-order velocity Verlet integrator.
pub struct VelocityVerletIntegrator;

impl Integrator for VelocityVerletIntegrator {
    fn name(&self) -> &str {
        "Velocity Verlet"
    }

    fn step(&self, particle: &mut Particle, fields: &FieldManager, time: f64, dt: f64) {
        if !particle.is_active() {
            return;
        }
        let field = fields.evaluate(particle.position(), time);
        let v = particle.velocity();
        let force = particle.charge() * (field.e + v.cross(&field.b));

        let half_step_position = particle.position() + v * (dt / 2.0);

        let new_momentum = particle.momentum() + force * dt;
        particle.set_momentum(new_momentum);

        let v_new = particle.velocity();
        particle.set_position(half_step_position + v_new * (dt / 2.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn inactive_particle_is_untouched() {
        let mut p = Particle::proton();
        p.deactivate();
        let before = p.position();
        VelocityVerletIntegrator.step(&mut p, &FieldManager::new(), 0.0, 1e-9);
        assert_eq!(p.position(), before);
    }

    #[test]
    fn drift_in_empty_field_is_linear() {
        let mut p = Particle::proton();
        p.set_kinetic_energy(1.0 * crate::constants::MEV, Vector3::z());
        let v = p.velocity();
        let dt = 1e-9;
        VelocityVerletIntegrator.step(&mut p, &FieldManager::new(), 0.0, dt);
        let expected = v * dt;
        assert!((p.position() - expected).norm() < 1e-10 * expected.norm().max(1.0));
    }
}
