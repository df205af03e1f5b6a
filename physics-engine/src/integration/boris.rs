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
//! The Boris pusher: the default, recommended integrator.
//!
//! Decouples the electric impulse from the magnetic rotation (Boris,
//! 1970; Birdsall & Langdon, *Plasma Physics via Computer Simulation*,
//! §4.4). Phase-space-volume preserving; conserves kinetic energy
//! identically (to floating-point rounding) in a pure magnetic field
//! and produces an exactly circular orbit there.

use nalgebra::Vector3;

use super::Integrator;
use crate::field::FieldManager;
use crate::particle::Particle;

/// The Boris pusher.
pub struct BorisIntegrator;

impl Integrator for BorisIntegrator {
    fn name(&self) -> &str {
        "Boris"
    }

    fn step(&self, particle: &mut Particle, fields: &FieldManager, time: f64, dt: f64) {
        if !particle.is_active() {
            return;
        }
        let field = fields.evaluate(particle.position(), time);
        let q = particle.charge();
        let m = particle.mass();

        // 1. Half electric impulse.
        let p_minus = particle.momentum() + q * field.e * (dt / 2.0);

        // 2. Gamma from the half-kicked momentum.
        let gamma = crate::constants::gamma_from_momentum(p_minus.norm(), m);

        // 3. Rotation vectors.
        let t = field.b * (q * dt / (2.0 * gamma * m));
        let s = t * (2.0 / (1.0 + t.norm_squared()));

        // 4. Magnetic rotation.
        let u_minus = p_minus / (gamma * m);
        let u_prime = u_minus + u_minus.cross(&t);
        let u_plus = u_minus + u_prime.cross(&s);
        let p_plus = u_plus * (gamma * m);

        // 5. Second half electric impulse.
        let p_new = p_plus + q * field.e * (dt / 2.0);
        particle.set_momentum(p_new);

        // 6. Position update with the fully-kicked velocity.
        let v_new = particle.velocity();
        let new_position = particle.position() + v_new * dt;
        particle.set_position(new_position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{C, E_CHARGE, M_PROTON};
    use crate::field::source::UniformB;
    use std::sync::Arc;

    #[test]
    fn inactive_particle_is_untouched() {
        let mut p = Particle::proton();
        p.deactivate();
        let before = p.position();
        BorisIntegrator.step(&mut p, &FieldManager::new(), 0.0, 1e-9);
        assert_eq!(p.position(), before);
    }

    #[test]
    fn drift_in_empty_field_is_linear() {
        let mut p = Particle::proton();
        p.set_kinetic_energy(1.0 * crate::constants::MEV, Vector3::z());
        let v = p.velocity();
        let dt = 1e-9;
        BorisIntegrator.step(&mut p, &FieldManager::new(), 0.0, dt);
        let expected = v * dt;
        assert!((p.position() - expected).norm() < 1e-10 * expected.norm().max(1.0));
    }

    #[test]
    fn cyclotron_orbit_closes_within_five_percent() {
        // S2: proton, v = 0.1c in x, B = 1T in z. After 1000 steps of
        // dt = T/1000 the particle should return within 5% of r from
        // the origin on its circular orbit.
        let mut p = Particle::proton();
        p.set_velocity(Vector3::new(0.1 * C, 0.0, 0.0));
        let b = 1.0;
        let mut mgr = FieldManager::new();
        mgr.add_source(Arc::new(UniformB::new(Vector3::new(0.0, 0.0, b))));

        let p_mag = p.momentum().norm();
        let r = p_mag / (E_CHARGE * b);
        let period = 2.0 * std::f64::consts::PI * p.gamma() * M_PROTON / (E_CHARGE * b);
        let dt = period / 1000.0;

        for i in 0..1000 {
            BorisIntegrator.step(&mut p, &mgr, i as f64 * dt, dt);
        }

        let radial = (p.position().x.powi(2) + p.position().y.powi(2)).sqrt();
        assert!(radial <= 0.05 * r, "radial distance {radial} exceeds 5% of r={r}");
    }

    #[test]
    fn energy_conservation_in_pure_b_field() {
        // Property 5: relative KE drift < 1e-10 over 10^4 steps at
        // dt = 1e-12s, 1T field, 10 MeV proton.
        let mut p = Particle::proton();
        p.set_kinetic_energy(10.0 * crate::constants::MEV, Vector3::x());
        let mut mgr = FieldManager::new();
        mgr.add_source(Arc::new(UniformB::new(Vector3::new(0.0, 0.0, 1.0))));

        let k0 = p.kinetic_energy();
        let dt = 1e-12;
        for i in 0..10_000 {
            BorisIntegrator.step(&mut p, &mgr, i as f64 * dt, dt);
        }
        let k1 = p.kinetic_energy();
        let drift = (k1 - k0).abs() / k0;
        assert!(drift < 1e-10, "relative KE drift {drift} too large");
    }
}
