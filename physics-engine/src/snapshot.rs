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
//! Read-only views for an external renderer: plain,
//! `Copy`-able snapshots of particle and lattice state with no path
//! back into engine mutation.

use nalgebra::Vector3;

use crate::ensemble::ParticleEnsemble;
use crate::lattice::{ComponentKind, Lattice};

/// A read-only view of one particle's renderable state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSnapshot {
    pub id: u64,
    pub position: Vector3<f64>,
    pub momentum: Vector3<f64>,
    pub kinetic_energy: f64,
    pub charge: f64,
    pub active: bool,
}

/// Collect a read-only snapshot of every particle in `ensemble`, active
/// or not: `(id, position, momentum, kineticEnergy, charge, active)`.
pub fn particle_snapshots(ensemble: &ParticleEnsemble) -> Vec<ParticleSnapshot> {
    ensemble
        .iter()
        .map(|p| ParticleSnapshot {
            id: p.id(),
            position: p.position(),
            momentum: p.momentum(),
            kinetic_energy: p.kinetic_energy(),
            charge: p.charge(),
            active: p.is_active(),
        })
        .collect()
}

/// Kind-specific parameters exposed to the renderer, mirroring
/// [`ComponentKind`] without the lazily-cached field source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentKindSnapshot {
    BeamPipe,
    Dipole { field: f64 },
    Quadrupole { gradient: f64 },
    RFCavity { voltage: f64, frequency: f64, phase: f64 },
    Detector,
}

impl From<ComponentKind> for ComponentKindSnapshot {
    fn from(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::BeamPipe => ComponentKindSnapshot::BeamPipe,
            ComponentKind::Dipole { field } => ComponentKindSnapshot::Dipole { field },
            ComponentKind::Quadrupole { gradient } => ComponentKindSnapshot::Quadrupole { gradient },
            ComponentKind::RFCavity { voltage, frequency, phase } => {
                ComponentKindSnapshot::RFCavity { voltage, frequency, phase }
            }
            ComponentKind::Detector => ComponentKindSnapshot::Detector,
        }
    }
}

/// A read-only view of one lattice component's renderable state.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSnapshot {
    pub name: String,
    pub kind: ComponentKindSnapshot,
    pub s_position: f64,
    pub length: f64,
    /// The larger of the aperture's two half-widths, for a renderer
    /// that only draws a single transverse extent.
    pub aperture: f64,
}

/// Collect a read-only snapshot of every component in `lattice`, in
/// order: `(type, name, sPosition, length, aperture, type-specific
/// parameters)`.
///
/// Does not trigger a layout recompute: call
/// [`Lattice::compute_lattice`] first if the lattice may be dirty.
pub fn lattice_snapshots(lattice: &Lattice) -> Vec<ComponentSnapshot> {
    lattice
        .iter()
        .map(|c| ComponentSnapshot {
            name: c.name().to_string(),
            kind: c.kind().into(),
            s_position: c.s_position(),
            length: c.length(),
            aperture: c.aperture().rx().max(c.aperture().ry()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{Aperture, LatticeComponent};
    use crate::particle::Particle;

    #[test]
    fn particle_snapshot_reflects_current_state() {
        let mut ensemble = ParticleEnsemble::new();
        let mut p = Particle::proton();
        p.set_position(Vector3::new(1.0, 2.0, 3.0));
        ensemble.push(p);
        let snapshots = particle_snapshots(&ensemble);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].position, Vector3::new(1.0, 2.0, 3.0));
        assert!(snapshots[0].active);
    }

    #[test]
    fn lattice_snapshot_preserves_order_and_s_position() {
        let mut lattice = Lattice::new();
        lattice.push(LatticeComponent::beam_pipe("A", 1.0, Aperture::circular(0.02)));
        lattice.push(LatticeComponent::dipole("B", 2.0, Aperture::circular(0.02), 1.5));
        lattice.compute_lattice();
        let snapshots = lattice_snapshots(&lattice);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1].s_position, 1.0);
        assert_eq!(snapshots[1].kind, ComponentKindSnapshot::Dipole { field: 1.5 });
    }
}
