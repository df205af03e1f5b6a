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
//! Lattice components: beamline elements that wrap a field source
//! (or none) plus geometry and an aperture.
//!
//! This uses a tagged enum rather than a class hierarchy for
//! `ComponentType` — the set of kinds is closed ({beam pipe, dipole,
//! quadrupole, RF cavity, detector}) so a `match` is both simpler and
//! cheaper than dynamic dispatch here. The field source each variant
//! wraps is still behind the [`crate::field::FieldSource`] trait
//! object so the field manager stays agnostic to which lattice kind
//! produced it.
//!
//! A component exclusively owns its field source behind an `Arc`,
//! lazily rebuilt whenever a strength/gradient/voltage/frequency/phase
//! mutator invalidates the cache. [`Lattice::populate_field_manager`]
//! is what refreshes a field manager's references after such a
//! mutation.

use std::sync::Arc;

use nalgebra::{UnitQuaternion, Vector3};

use crate::field::{FieldSource, Framed, Quadrupole as QuadrupoleField, UniformB, RF};

use super::aperture::Aperture;

/// A single hit recorded by a [`ComponentKind::Detector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorHit {
    /// Id of the particle that triggered the hit.
    pub particle_id: u64,
    /// Global position at the moment of the hit, m.
    pub position: Vector3<f64>,
    /// Momentum at the moment of the hit, kg*m/s.
    pub momentum: Vector3<f64>,
    /// Simulation time of the hit, s.
    pub time: f64,
}

/// The kind-specific parameters of a lattice component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentKind {
    /// A field-free section of beam pipe.
    BeamPipe,
    /// A bending magnet with uniform field `field` (T), taken to point
    /// along local y so it bends the reference orbit in the horizontal
    /// plane (the conventional accelerator-dipole orientation).
    Dipole {
        /// Dipole field strength, T.
        field: f64,
    },
    /// A focusing/defocusing quadrupole with gradient `gradient` (T/m).
    Quadrupole {
        /// Field gradient, T/m. Positive horizontally focuses.
        gradient: f64,
    },
    /// An RF accelerating cavity.
    RFCavity {
        /// Peak voltage, V.
        voltage: f64,
        /// Frequency, Hz.
        frequency: f64,
        /// Phase, rad.
        phase: f64,
    },
    /// A field-free element that records particle hits.
    Detector,
}

/// A single lattice element: geometry, aperture, and (for some kinds) a
/// lazily-rebuilt field source.
#[derive(Debug)]
pub struct LatticeComponent {
    name: String,
    kind: ComponentKind,
    length: f64,
    aperture: Aperture,
    position: Vector3<f64>,
    orientation: UnitQuaternion<f64>,
    s_position: f64,
    field_cache: Option<Arc<dyn FieldSource>>,
    hits: Vec<DetectorHit>,
}

impl LatticeComponent {
    /// Construct a component. `s_position` starts at `0.0` and is
    /// overwritten by [`super::lattice::Lattice::compute_lattice`].
    pub fn new(name: impl Into<String>, kind: ComponentKind, length: f64, aperture: Aperture) -> Self {
        assert!(length >= 0.0 && length.is_finite(), "length must be non-negative and finite");
        LatticeComponent {
            name: name.into(),
            kind,
            length,
            aperture,
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            s_position: 0.0,
            field_cache: None,
            hits: Vec::new(),
        }
    }

    /// Convenience constructor for a field-free beam pipe.
    pub fn beam_pipe(name: impl Into<String>, length: f64, aperture: Aperture) -> Self {
        Self::new(name, ComponentKind::BeamPipe, length, aperture)
    }

    /// Convenience constructor for a dipole.
    pub fn dipole(name: impl Into<String>, length: f64, aperture: Aperture, field: f64) -> Self {
        Self::new(name, ComponentKind::Dipole { field }, length, aperture)
    }

    /// Convenience constructor for a quadrupole.
    pub fn quadrupole(name: impl Into<String>, length: f64, aperture: Aperture, gradient: f64) -> Self {
        Self::new(name, ComponentKind::Quadrupole { gradient }, length, aperture)
    }

    /// Convenience constructor for an RF cavity.
    pub fn rf_cavity(
        name: impl Into<String>,
        length: f64,
        aperture: Aperture,
        voltage: f64,
        frequency: f64,
        phase: f64,
    ) -> Self {
        Self::new(name, ComponentKind::RFCavity { voltage, frequency, phase }, length, aperture)
    }

    /// Convenience constructor for a detector.
    pub fn detector(name: impl Into<String>, length: f64, aperture: Aperture) -> Self {
        Self::new(name, ComponentKind::Detector, length, aperture)
    }

    /// Element name. Not required to be unique within a lattice.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind-specific parameters.
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Physical length, m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Transverse aperture.
    pub fn aperture(&self) -> Aperture {
        self.aperture
    }

    /// Global position of the component's entrance.
    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    /// Set the global position. Invalidates the cached field source,
    /// which bakes this position in so the manager can query it with a
    /// global-frame particle position.
    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.position = position;
        self.invalidate();
    }

    /// Orientation as a unit quaternion, global frame.
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.orientation
    }

    /// Set the orientation. Invalidates the cached field source, same
    /// reason as [`LatticeComponent::set_position`].
    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f64>) {
        self.orientation = orientation;
        self.invalidate();
    }

    /// Longitudinal position along the reference orbit, set by
    /// [`super::lattice::Lattice::compute_lattice`].
    pub fn s_position(&self) -> f64 {
        self.s_position
    }

    pub(super) fn set_s_position(&mut self, s: f64) {
        self.s_position = s;
    }

    /// Transform a global position into this component's local frame:
    /// translate by the component's global position, then apply the
    /// inverse of its orientation.
    pub fn to_local(&self, global_position: Vector3<f64>) -> Vector3<f64> {
        self.orientation.inverse() * (global_position - self.position)
    }

    /// The component's local z half-window, `[-(L/2), L/2]` about its
    /// midpoint.
    pub fn local_z_window(&self) -> (f64, f64) {
        (-self.length / 2.0, self.length / 2.0)
    }

    /// Whether `global_position` falls inside this component's aperture
    /// at its local z-window (used by the loss model and detector hit
    /// recording).
    pub fn contains_global(&self, global_position: Vector3<f64>) -> bool {
        let local = self.to_local(global_position);
        let (z_min, z_max) = self.local_z_window();
        local.z >= z_min && local.z <= z_max && self.aperture.contains_transverse(local)
    }

    /// Invalidate the cached field source. Called by every
    /// kind-specific mutator below.
    fn invalidate(&mut self) {
        self.field_cache = None;
    }

    /// Mutate a dipole's field strength (T). No-op on other kinds.
    pub fn set_dipole_field(&mut self, field: f64) {
        if let ComponentKind::Dipole { field: f } = &mut self.kind {
            *f = field;
            self.invalidate();
        }
    }

    /// Mutate a quadrupole's gradient (T/m). No-op on other kinds.
    pub fn set_quadrupole_gradient(&mut self, gradient: f64) {
        if let ComponentKind::Quadrupole { gradient: g } = &mut self.kind {
            *g = gradient;
            self.invalidate();
        }
    }

    /// Mutate an RF cavity's voltage (V). No-op on other kinds.
    pub fn set_rf_voltage(&mut self, voltage: f64) {
        if let ComponentKind::RFCavity { voltage: v, .. } = &mut self.kind {
            *v = voltage;
            self.invalidate();
        }
    }

    /// Mutate an RF cavity's frequency (Hz). No-op on other kinds.
    pub fn set_rf_frequency(&mut self, frequency: f64) {
        if let ComponentKind::RFCavity { frequency: f, .. } = &mut self.kind {
            *f = frequency;
            self.invalidate();
        }
    }

    /// Mutate an RF cavity's phase (rad). No-op on other kinds.
    pub fn set_rf_phase(&mut self, phase: f64) {
        if let ComponentKind::RFCavity { phase: p, .. } = &mut self.kind {
            *p = phase;
            self.invalidate();
        }
    }

    /// Return this component's field source, rebuilding it from the
    /// current kind-specific parameters if the cache was invalidated.
    /// `BeamPipe` and `Detector` always return `None`.
    pub fn field_source(&mut self) -> Option<Arc<dyn FieldSource>> {
        if self.field_cache.is_none() {
            self.field_cache = self.build_field_source();
        }
        self.field_cache.clone()
    }

    /// Build this component's field source in its own local frame, then
    /// wrap it in a [`Framed`] adapter anchored at the component's
    /// current `position`/`orientation` — a [`FieldManager`] always
    /// queries registered sources with the particle's global position,
    /// so an un-framed source built at s > 0 would only ever see
    /// particles that happen to pass through global z = 0.
    ///
    /// [`FieldManager`]: crate::field::FieldManager
    fn build_field_source(&self) -> Option<Arc<dyn FieldSource>> {
        let radial_aperture = self.aperture.rx().max(self.aperture.ry());
        match self.kind {
            ComponentKind::BeamPipe | ComponentKind::Detector => None,
            ComponentKind::Dipole { field } => {
                let half_length = self.length / 2.0;
                let bounds = crate::field::BoundingBox::cylinder(radial_aperture, half_length);
                let source = UniformB::bounded(Vector3::new(0.0, field, 0.0), bounds);
                Some(Arc::new(Framed::new(source, self.position, self.orientation)))
            }
            ComponentKind::Quadrupole { gradient } => {
                let source = QuadrupoleField::new(gradient, radial_aperture, self.length / 2.0);
                Some(Arc::new(Framed::new(source, self.position, self.orientation)))
            }
            ComponentKind::RFCavity { voltage, frequency, phase } => {
                let source = RF::new(voltage, frequency, phase, self.length, radial_aperture);
                Some(Arc::new(Framed::new(source, self.position, self.orientation)))
            }
        }
    }

    /// Record a hit on this (presumably `Detector`) component.
    pub fn record_hit(&mut self, hit: DetectorHit) {
        self.hits.push(hit);
    }

    /// Every hit recorded so far, in recording order.
    pub fn hits(&self) -> &[DetectorHit] {
        &self.hits
    }

    /// Clear recorded hits.
    pub fn clear_hits(&mut self) {
        self.hits.clear();
    }
}
