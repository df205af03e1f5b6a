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
//! Particle ensembles, the deterministic beam generator, and beam
//! statistics.

use nalgebra::Vector3;

use crate::particle::{Particle, Species};
use crate::rng::BeamRng;

/// The shape of the spatial-momentum distribution a beam is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionKind {
    /// Independent normal draws on every axis.
    Gaussian,
    /// Independent `sqrt(3)*Uniform(-1,1)` draws (matches Gaussian RMS).
    Uniform,
    /// Spherically uniform position fill; momentum drawn as `Uniform`.
    Waterbag,
}

/// Parameters for [`ParticleEnsemble::generate_beam`].
#[derive(Debug, Clone, Copy)]
pub struct BeamParameters {
    /// Particle species to generate.
    pub species: Species,
    /// Number of particles, `>= 1`.
    pub num_particles: usize,
    /// Reference kinetic energy, J, `> 0`.
    pub kinetic_energy: f64,
    /// Position spread along x, m, `>= 0`.
    pub sigma_x: f64,
    /// Position spread along y, m, `>= 0`.
    pub sigma_y: f64,
    /// Position spread along z, m, `>= 0`.
    pub sigma_z: f64,
    /// Relative transverse momentum spread along the first
    /// perpendicular axis, `>= 0`.
    pub sigma_px: f64,
    /// Relative transverse momentum spread along the second
    /// perpendicular axis, `>= 0`.
    pub sigma_py: f64,
    /// Relative momentum spread `delta = (|p| - p0) / p0`, `>= 0`.
    pub sigma_delta: f64,
    /// Offset added to every generated particle's position, m.
    pub position_offset: Vector3<f64>,
    /// Beam direction; normalized on use.
    pub direction: Vector3<f64>,
    /// Distribution shape.
    pub distribution: DistributionKind,
    /// PRNG seed.
    pub seed: u64,
}

impl Default for BeamParameters {
    fn default() -> Self {
        BeamParameters {
            species: Species::Proton,
            num_particles: 1,
            kinetic_energy: crate::constants::MEV,
            sigma_x: 0.0,
            sigma_y: 0.0,
            sigma_z: 0.0,
            sigma_px: 0.0,
            sigma_py: 0.0,
            sigma_delta: 0.0,
            position_offset: Vector3::zeros(),
            direction: Vector3::z(),
            distribution: DistributionKind::Gaussian,
            seed: 0,
        }
    }
}

/// Aggregate statistics over an ensemble's active particles.
///
/// All fields are zeroed (except `total_particles`/`lost_particles`)
/// when the active set is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamStatistics {
    /// Particles in the ensemble, active or not.
    pub total_particles: usize,
    /// Particles currently active.
    pub active_particles: usize,
    /// Particles currently inactive.
    pub lost_particles: usize,
    /// Mean position over active particles, m.
    pub mean_position: Vector3<f64>,
    /// Mean momentum over active particles, kg*m/s.
    pub mean_momentum: Vector3<f64>,
    /// RMS position per axis, m.
    pub rms_position: Vector3<f64>,
    /// RMS momentum per axis, kg*m/s.
    pub rms_momentum: Vector3<f64>,
    /// Mean kinetic energy, J.
    pub mean_kinetic_energy: f64,
    /// Minimum kinetic energy among active particles, J.
    pub min_kinetic_energy: f64,
    /// Maximum kinetic energy among active particles, J.
    pub max_kinetic_energy: f64,
    /// RMS kinetic energy spread, J.
    pub rms_kinetic_energy: f64,
    /// Geometric emittance in x, m*rad.
    pub emittance_x: f64,
    /// Geometric emittance in y, m*rad.
    pub emittance_y: f64,
    /// Normalized emittance in x, `beta*gamma*emittance_x`.
    pub normalized_emittance_x: f64,
    /// Normalized emittance in y, `beta*gamma*emittance_y`.
    pub normalized_emittance_y: f64,
}

impl BeamStatistics {
    fn zeroed(total_particles: usize, lost_particles: usize) -> Self {
        BeamStatistics {
            total_particles,
            active_particles: 0,
            lost_particles,
            mean_position: Vector3::zeros(),
            mean_momentum: Vector3::zeros(),
            rms_position: Vector3::zeros(),
            rms_momentum: Vector3::zeros(),
            mean_kinetic_energy: 0.0,
            min_kinetic_energy: 0.0,
            max_kinetic_energy: 0.0,
            rms_kinetic_energy: 0.0,
            emittance_x: 0.0,
            emittance_y: 0.0,
            normalized_emittance_x: 0.0,
            normalized_emittance_y: 0.0,
        }
    }
}

/// Draw a standard-normal-like sample scaled by `sigma`: an actual
/// `N(0, sigma^2)` draw for [`DistributionKind::Gaussian`], or
/// `sqrt(3)*Uniform(-1,1)*sigma` (matching RMS) for the other two
/// kinds.
fn scaled_sample(rng: &mut BeamRng, sigma: f64, distribution: DistributionKind) -> f64 {
    match distribution {
        DistributionKind::Gaussian => rng.gaussian(0.0, sigma),
        DistributionKind::Uniform | DistributionKind::Waterbag => 3.0_f64.sqrt() * rng.uniform(-1.0, 1.0) * sigma,
    }
}

/// An ensemble of particles plus the reference momentum used to
/// compute `delta` and normalized emittance.
pub struct ParticleEnsemble {
    particles: Vec<Particle>,
    reference_momentum: f64,
}

impl Default for ParticleEnsemble {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleEnsemble {
    /// An empty ensemble with zero reference momentum.
    pub fn new() -> Self {
        ParticleEnsemble { particles: Vec::new(), reference_momentum: 0.0 }
    }

    /// Append a particle.
    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Remove every particle and reset the reference momentum to zero.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.reference_momentum = 0.0;
    }

    /// Total particle count, active or not.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the ensemble has no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of currently active particles.
    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_active()).count()
    }

    /// Borrow the particle at `index`.
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Mutably borrow the particle at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    /// Iterate over every particle, active or not.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Iterate mutably over every particle.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    /// A Rayon parallel iterator over every particle, mutable. Particles
    /// are independent within a sub-step since the field manager is
    /// read-only for its duration, so the controller's
    /// per-particle integration loop may use this instead of
    /// [`ParticleEnsemble::iter_mut`] when the `parallel` feature is
    /// enabled.
    #[cfg(feature = "parallel")]
    pub fn par_iter_mut(&mut self) -> rayon::slice::IterMut<'_, Particle> {
        use rayon::prelude::*;
        self.particles.par_iter_mut()
    }

    /// The ensemble's reference momentum, kg*m/s.
    pub fn reference_momentum(&self) -> f64 {
        self.reference_momentum
    }

    /// Replace the reference momentum.
    pub fn set_reference_momentum(&mut self, reference_momentum: f64) {
        self.reference_momentum = reference_momentum;
    }

    /// Remove every inactive particle, preserving the relative order of
    /// the survivors. Returns the number removed.
    pub fn retain_active(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| p.is_active());
        before - self.particles.len()
    }

    /// Mark every active particle whose transverse radius
    /// `sqrt(x^2+y^2)` exceeds `r` as inactive. Returns the count newly
    /// lost.
    pub fn apply_aperture(&mut self, r: f64) -> usize {
        let r2 = r * r;
        let mut lost = 0;
        for particle in &mut self.particles {
            if !particle.is_active() {
                continue;
            }
            let pos = particle.position();
            if pos.x * pos.x + pos.y * pos.y > r2 {
                particle.deactivate();
                lost += 1;
            }
        }
        lost
    }

    /// Replace the ensemble's contents with a freshly generated beam.
    /// Deterministic: the same `params` produces a bitwise-identical
    /// ensemble in single-threaded execution.
    pub fn generate_beam(params: &BeamParameters) -> Self {
        assert!(params.num_particles >= 1, "numParticles must be at least 1");
        assert!(params.kinetic_energy > 0.0, "kineticEnergy must be positive");

        let mass = params.species.mass();
        let charge = params.species.charge();

        let gamma0 = 1.0 + params.kinetic_energy / (mass * crate::constants::C * crate::constants::C);
        let beta0 = crate::constants::beta_from_gamma(gamma0);
        let p0 = gamma0 * beta0 * mass * crate::constants::C;

        let direction = {
            let norm = params.direction.norm();
            if norm > 1e-12 {
                params.direction / norm
            } else {
                Vector3::z()
            }
        };
        let up = if direction.y.abs() > 0.9 { Vector3::x() } else { Vector3::y() };
        let perp1 = direction.cross(&up).normalize();
        let perp2 = direction.cross(&perp1).normalize();

        let mut rng = BeamRng::new(params.seed);
        let mut particles = Vec::with_capacity(params.num_particles);

        for _ in 0..params.num_particles {
            let offset = match params.distribution {
                DistributionKind::Gaussian | DistributionKind::Uniform => Vector3::new(
                    scaled_sample(&mut rng, params.sigma_x, params.distribution),
                    scaled_sample(&mut rng, params.sigma_y, params.distribution),
                    scaled_sample(&mut rng, params.sigma_z, params.distribution),
                ),
                DistributionKind::Waterbag => {
                    let u = rng.unit_interval();
                    let r = u.cbrt();
                    let theta = rng.uniform(-1.0, 1.0).acos();
                    let phi = std::f64::consts::PI * rng.uniform(-1.0, 1.0);
                    Vector3::new(
                        r * theta.sin() * phi.cos() * params.sigma_x,
                        r * theta.sin() * phi.sin() * params.sigma_y,
                        r * theta.cos() * params.sigma_z,
                    )
                }
            };
            let position = params.position_offset + offset;

            let dpx = scaled_sample(&mut rng, params.sigma_px, params.distribution);
            let dpy = scaled_sample(&mut rng, params.sigma_py, params.distribution);
            let delta = scaled_sample(&mut rng, params.sigma_delta, params.distribution);

            let momentum = direction * (p0 * (1.0 + delta)) + perp1 * (dpx * p0) + perp2 * (dpy * p0);

            let mut particle = Particle::new(mass, charge);
            particle.set_position(position);
            particle.set_momentum(momentum);
            particles.push(particle);
        }

        ParticleEnsemble { particles, reference_momentum: p0 }
    }

    /// Compute aggregate statistics over active particles.
    pub fn compute_statistics(&self) -> BeamStatistics {
        let active: Vec<&Particle> = self.particles.iter().filter(|p| p.is_active()).collect();
        let n = active.len();
        let lost = self.particles.len() - n;
        if n == 0 {
            return BeamStatistics::zeroed(self.particles.len(), lost);
        }
        let n_f = n as f64;

        let mean_position: Vector3<f64> = active.iter().map(|p| p.position()).sum::<Vector3<f64>>() / n_f;
        let mean_momentum: Vector3<f64> = active.iter().map(|p| p.momentum()).sum::<Vector3<f64>>() / n_f;

        let rms_position = rms_vector(&active, mean_position, |p| p.position());
        let rms_momentum = rms_vector(&active, mean_momentum, |p| p.momentum());

        let energies: Vec<f64> = active.iter().map(|p| p.kinetic_energy()).collect();
        let mean_kinetic_energy = energies.iter().sum::<f64>() / n_f;
        let min_kinetic_energy = energies.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_kinetic_energy = energies.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let rms_kinetic_energy =
            (energies.iter().map(|k| (k - mean_kinetic_energy).powi(2)).sum::<f64>() / n_f).sqrt();

        let (emittance_x, emittance_y) = geometric_emittances(&active);

        let first_mass = active[0].mass();
        let gamma = crate::constants::gamma_from_momentum(self.reference_momentum, first_mass);
        let beta = crate::constants::beta_from_gamma(gamma);
        let normalized_emittance_x = beta * gamma * emittance_x;
        let normalized_emittance_y = beta * gamma * emittance_y;

        BeamStatistics {
            total_particles: self.particles.len(),
            active_particles: n,
            lost_particles: lost,
            mean_position,
            mean_momentum,
            rms_position,
            rms_momentum,
            mean_kinetic_energy,
            min_kinetic_energy,
            max_kinetic_energy,
            rms_kinetic_energy,
            emittance_x,
            emittance_y,
            normalized_emittance_x,
            normalized_emittance_y,
        }
    }
}

fn rms_vector(active: &[&Particle], mean: Vector3<f64>, f: impl Fn(&Particle) -> Vector3<f64>) -> Vector3<f64> {
    let n = active.len() as f64;
    let mut acc = Vector3::zeros();
    for p in active {
        let d = f(p) - mean;
        acc += d.component_mul(&d);
    }
    Vector3::new((acc.x / n).sqrt(), (acc.y / n).sqrt(), (acc.z / n).sqrt())
}

/// Geometric emittance in x and y: `x' = px/pz`, skipping
/// particles with `|pz| < 1e-30`; `eps = sqrt(max(0, <a^2>*<a'^2> -
/// <a*a'>^2))`.
fn geometric_emittances(active: &[&Particle]) -> (f64, f64) {
    let contributors: Vec<&&Particle> = active.iter().filter(|p| p.momentum().z.abs() >= 1e-30).collect();
    if contributors.is_empty() {
        return (0.0, 0.0);
    }
    let n = contributors.len() as f64;

    let mut sum_x2 = 0.0;
    let mut sum_xp2 = 0.0;
    let mut sum_xxp = 0.0;
    let mut sum_y2 = 0.0;
    let mut sum_yp2 = 0.0;
    let mut sum_yyp = 0.0;

    for p in &contributors {
        let pos = p.position();
        let mom = p.momentum();
        let xp = mom.x / mom.z;
        let yp = mom.y / mom.z;
        sum_x2 += pos.x * pos.x;
        sum_xp2 += xp * xp;
        sum_xxp += pos.x * xp;
        sum_y2 += pos.y * pos.y;
        sum_yp2 += yp * yp;
        sum_yyp += pos.y * yp;
    }

    let mean_x2 = sum_x2 / n;
    let mean_xp2 = sum_xp2 / n;
    let mean_xxp = sum_xxp / n;
    let mean_y2 = sum_y2 / n;
    let mean_yp2 = sum_yp2 / n;
    let mean_yyp = sum_yyp / n;

    let emittance_x = (mean_x2 * mean_xp2 - mean_xxp * mean_xxp).max(0.0).sqrt();
    let emittance_y = (mean_y2 * mean_yp2 - mean_yyp * mean_yyp).max(0.0).sqrt();
    (emittance_x, emittance_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_beam_is_reproducible_with_same_seed() {
        let params = BeamParameters {
            num_particles: 50,
            sigma_x: 1e-3,
            sigma_y: 1e-3,
            sigma_z: 1e-2,
            sigma_px: 1e-4,
            sigma_py: 1e-4,
            sigma_delta: 1e-3,
            seed: 123,
            ..Default::default()
        };
        let a = ParticleEnsemble::generate_beam(&params);
        let b = ParticleEnsemble::generate_beam(&params);
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert_eq!(pa.position(), pb.position());
            assert_eq!(pa.momentum(), pb.momentum());
        }
    }

    #[test]
    fn generate_beam_different_seeds_diverge() {
        let mut params = BeamParameters { num_particles: 20, sigma_x: 1e-3, seed: 1, ..Default::default() };
        let a = ParticleEnsemble::generate_beam(&params);
        params.seed = 2;
        let b = ParticleEnsemble::generate_beam(&params);
        let differs = a.iter().zip(b.iter()).any(|(pa, pb)| pa.position() != pb.position());
        assert!(differs);
    }

    #[test]
    fn statistics_on_plus_minus_one_pair_matches_s6() {
        // S6: two protons at (-1,0,0) and (+1,0,0), identical momenta (0,0,p0).
        let mut ensemble = ParticleEnsemble::new();
        let p0 = 1.0e-18;
        let mut a = Particle::proton();
        a.set_position(Vector3::new(-1.0, 0.0, 0.0));
        a.set_momentum(Vector3::new(0.0, 0.0, p0));
        let mut b = Particle::proton();
        b.set_position(Vector3::new(1.0, 0.0, 0.0));
        b.set_momentum(Vector3::new(0.0, 0.0, p0));
        ensemble.push(a);
        ensemble.push(b);
        ensemble.set_reference_momentum(p0);

        let stats = ensemble.compute_statistics();
        assert!((stats.rms_position.x - 1.0).abs() < 1e-12);
        assert!(stats.rms_position.y.abs() < 1e-12);
        assert!(stats.rms_position.z.abs() < 1e-12);
        assert!(stats.mean_position.norm() < 1e-12);
    }

    #[test]
    fn statistics_on_empty_ensemble_are_zeroed() {
        let ensemble = ParticleEnsemble::new();
        let stats = ensemble.compute_statistics();
        assert_eq!(stats.active_particles, 0);
        assert_eq!(stats.total_particles, 0);
        assert_eq!(stats.mean_position, Vector3::zeros());
    }

    #[test]
    fn apply_aperture_marks_exactly_the_particles_outside_radius() {
        let mut ensemble = ParticleEnsemble::new();
        let mut inside = Particle::proton();
        inside.set_position(Vector3::new(0.01, 0.0, 0.0));
        let mut outside = Particle::proton();
        outside.set_position(Vector3::new(1.0, 0.0, 0.0));
        ensemble.push(inside);
        ensemble.push(outside);

        let lost = ensemble.apply_aperture(0.05);
        assert_eq!(lost, 1);
        assert!(ensemble.get(0).unwrap().is_active());
        assert!(!ensemble.get(1).unwrap().is_active());
    }

    #[test]
    fn retain_active_preserves_order_of_survivors() {
        let mut ensemble = ParticleEnsemble::new();
        let mut a = Particle::proton();
        a.set_position(Vector3::new(0.0, 0.0, 0.0));
        let mut b = Particle::proton();
        b.set_position(Vector3::new(10.0, 0.0, 0.0));
        let id_a = a.id();
        ensemble.push(a);
        ensemble.push(b);
        ensemble.apply_aperture(1.0);
        let removed = ensemble.retain_active();
        assert_eq!(removed, 1);
        assert_eq!(ensemble.len(), 1);
        assert_eq!(ensemble.get(0).unwrap().id(), id_a);
    }

    #[test]
    #[should_panic(expected = "numParticles must be at least 1")]
    fn generate_beam_rejects_zero_particles() {
        let params = BeamParameters { num_particles: 0, ..Default::default() };
        ParticleEnsemble::generate_beam(&params);
    }
}
