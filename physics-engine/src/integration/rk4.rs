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
//! Fourth-order Runge-Kutta integrator.
//!
//! Four field evaluations per sub-step against the derivative
//! functional `(dx/dt, dp/dt) = (v, q(E + v x B))`, combined with the
//! standard `(k1 + 2*k2 + 2*k3 + k4)/6` stage weights. No adaptive
//! step control.

use nalgebra::Vector3;

use super::Integrator;
use crate::field::FieldManager;
use crate::particle::Particle;

/// One stage's derivative: `(dx/dt, dp/dt)`.
struct Stage {
    dx: Vector3<f64>,
    dp: Vector3<f64>,
}

fn derivative(
    position: Vector3<f64>,
    momentum: Vector3<f64>,
    mass: f64,
    charge: f64,
    fields: &FieldManager,
    time: f64,
) -> Stage {
    let gamma = crate::constants::gamma_from_momentum(momentum.norm(), mass);
    let v = momentum / (gamma * mass);
    let field = fields.evaluate(position, time);
    let force = charge * (field.e + v.cross(&field.b));
    Stage { dx: v, dp: force }
}

/// Fourth-order Runge-Kutta integrator.
pub struct RK4Integrator;

impl Integrator for RK4Integrator {
    fn name(&self) -> &str {
        "RK4"
    }

    fn step(&self, particle: &mut Particle, fields: &FieldManager, time: f64, dt: f64) {
        if !particle.is_active() {
            return;
        }
        let mass = particle.mass();
        let charge = particle.charge();
        let x0 = particle.position();
        let p0 = particle.momentum();

        let k1 = derivative(x0, p0, mass, charge, fields, time);
        let k2 = derivative(
            x0 + k1.dx * (dt / 2.0),
            p0 + k1.dp * (dt / 2.0),
            mass,
            charge,
            fields,
            time + dt / 2.0,
        );
        let k3 = derivative(
            x0 + k2.dx * (dt / 2.0),
            p0 + k2.dp * (dt / 2.0),
            mass,
            charge,
            fields,
            time + dt / 2.0,
        );
        let k4 = derivative(x0 + k3.dx * dt, p0 + k3.dp * dt, mass, charge, fields, time + dt);

        let dx = (k1.dx + 2.0 * k2.dx + 2.0 * k3.dx + k4.dx) * (dt / 6.0);
        let dp = (k1.dp + 2.0 * k2.dp + 2.0 * k3.dp + k4.dp) * (dt / 6.0);

        particle.set_momentum(p0 + dp);
        particle.set_position(x0 + dx);
    }
}
