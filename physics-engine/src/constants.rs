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
//! Physical constants (CODATA 2018, SI units) and energy-unit conversions.
//!
//! Every other module in this crate builds on these values, so they are
//! kept as plain `f64` constants rather than behind a newtype: the
//! relativistic helpers below are the only derived quantities that are
//! reused often enough to warrant a function.

/// Speed of light in vacuum, m/s.
pub const C: f64 = 299_792_458.0;

/// Elementary charge, C.
pub const E_CHARGE: f64 = 1.602_176_634e-19;

/// Electron rest mass, kg.
pub const M_ELECTRON: f64 = 9.109_383_701_5e-31;

/// Proton rest mass, kg.
pub const M_PROTON: f64 = 1.672_621_923_69e-27;

/// Vacuum electric permittivity, F/m.
pub const EPSILON_0: f64 = 8.854_187_812_8e-12;

/// Vacuum magnetic permeability, H/m.
pub const MU_0: f64 = 1.256_637_062_12e-6;

/// One electron-volt in joules.
pub const EV: f64 = E_CHARGE;

/// One mega-electron-volt in joules.
pub const MEV: f64 = 1.0e6 * EV;

/// One giga-electron-volt in joules.
pub const GEV: f64 = 1.0e9 * EV;

/// One tera-electron-volt in joules.
pub const TEV: f64 = 1.0e12 * EV;

/// Largest fraction of `C` a particle is ever allowed to carry as speed.
///
/// Used by [`crate::particle::Particle::set_velocity`] to clamp a
/// caller-requested superluminal velocity rather than accept it.
pub const MAX_BETA: f64 = 0.999_999;

/// Lorentz factor for a particle with momentum magnitude `p_mag`, rest
/// mass `mass`, from `gamma = sqrt(1 + (p / (m*c))^2)`.
///
/// Valid for `mass > 0`; the beam dynamics engine never constructs a
/// zero-mass particle (see [`crate::particle::Particle::new`]).
pub fn gamma_from_momentum(p_mag: f64, mass: f64) -> f64 {
    let x = p_mag / (mass * C);
    (1.0 + x * x).sqrt()
}

/// Relativistic beta (`v/c`) from a Lorentz factor, `beta = sqrt(1 - 1/gamma^2)`.
pub fn beta_from_gamma(gamma: f64) -> f64 {
    (1.0 - 1.0 / (gamma * gamma)).sqrt()
}

/// Lorentz factor from kinetic energy, `gamma = 1 + K / (m*c^2)`.
pub fn gamma_from_kinetic_energy(kinetic_energy: f64, mass: f64) -> f64 {
    1.0 + kinetic_energy / (mass * C * C)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_at_rest_is_one() {
        assert!((gamma_from_momentum(0.0, M_PROTON) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn beta_at_gamma_one_is_zero() {
        assert!(beta_from_gamma(1.0).abs() < 1e-15);
    }

    #[test]
    fn mev_and_gev_scale_consistently() {
        assert!((1000.0 * MEV - GEV).abs() / GEV < 1e-12);
        assert!((1000.0 * GEV - TEV).abs() / TEV < 1e-12);
    }

    #[test]
    fn lhc_proton_gamma_in_expected_band() {
        // S1: 7 TeV proton.
        let k = 7.0 * TEV;
        let gamma = gamma_from_kinetic_energy(k, M_PROTON);
        assert!(gamma > 7450.0 && gamma < 7475.0, "gamma = {gamma}");
        let beta = beta_from_gamma(gamma);
        assert!(beta > 0.999_999 && beta < 1.0);
    }
}
