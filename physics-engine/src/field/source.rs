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
//! Field source trait and the three concrete sources the lattice wraps.
//!
//! A narrow, `dyn`-safe capability trait rather than a class hierarchy,
//! since the set of field-source kinds is closed: sources are
//! registered by reference into a composite (see
//! [`super::manager::FieldManager`]).

use nalgebra::{UnitQuaternion, Vector3};

use super::bbox::BoundingBox;
use super::value::FieldValue;

/// Capability shared by every field source: evaluate the field at a
/// point and time, report a bounding box, test containment, and expose
/// an enabled flag.
pub trait FieldSource: Send + Sync {
    /// Evaluate `(E, B)` at `position` (local frame) and `time` (s).
    ///
    /// Implementations return `FieldValue::zero()` outside their own
    /// `inside` test; the field manager additionally masks out disabled
    /// sources, so this method may assume `inside(position)` when asked
    /// only for the raw field (callers that want the masked value should
    /// go through [`crate::field::manager::FieldManager`]).
    fn evaluate(&self, position: Vector3<f64>, time: f64) -> FieldValue;

    /// Axis-aligned bounding box of the region this source affects.
    fn bounding_box(&self) -> BoundingBox;

    /// Whether `position` lies within this source's active region.
    fn inside(&self, position: Vector3<f64>) -> bool {
        self.bounding_box().contains(position)
    }

    /// Whether this source currently contributes to superposition.
    fn is_enabled(&self) -> bool;

    /// Enable or disable this source.
    fn set_enabled(&mut self, enabled: bool);
}

/// A uniform dipole-like magnetic field, optionally bounded.
///
/// Returns `(0, B)` everywhere inside its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformB {
    field: Vector3<f64>,
    bounds: BoundingBox,
    enabled: bool,
}

impl UniformB {
    /// A uniform field with no spatial bound.
    pub fn new(field: Vector3<f64>) -> Self {
        UniformB { field, bounds: BoundingBox::infinite(), enabled: true }
    }

    /// A uniform field confined to `bounds`.
    pub fn bounded(field: Vector3<f64>, bounds: BoundingBox) -> Self {
        UniformB { field, bounds, enabled: true }
    }

    /// Current field strength, T.
    pub fn field(&self) -> Vector3<f64> {
        self.field
    }

    /// Replace the field strength.
    pub fn set_field(&mut self, field: Vector3<f64>) {
        self.field = field;
    }
}

impl FieldSource for UniformB {
    fn evaluate(&self, position: Vector3<f64>, _time: f64) -> FieldValue {
        if self.enabled && self.inside(position) {
            FieldValue::new(Vector3::zeros(), self.field)
        } else {
            FieldValue::zero()
        }
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// A linear-gradient quadrupole magnetic field.
///
/// Inside a radial aperture and a z half-length window, returns
/// `(0, (G*y, G*x, 0))`; `G > 0` is horizontal-focusing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrupole {
    gradient: f64,
    radial_aperture: f64,
    half_length: f64,
    enabled: bool,
}

impl Quadrupole {
    /// A quadrupole with gradient `gradient` (T/m), radial aperture
    /// `radial_aperture` (m), and half the physical length `half_length` (m).
    pub fn new(gradient: f64, radial_aperture: f64, half_length: f64) -> Self {
        Quadrupole { gradient, radial_aperture, half_length, enabled: true }
    }

    /// Field gradient, T/m. Positive focuses horizontally.
    pub fn gradient(&self) -> f64 {
        self.gradient
    }

    /// Replace the gradient.
    pub fn set_gradient(&mut self, gradient: f64) {
        self.gradient = gradient;
    }
}

impl FieldSource for Quadrupole {
    fn evaluate(&self, position: Vector3<f64>, _time: f64) -> FieldValue {
        if !self.enabled || !self.inside(position) {
            return FieldValue::zero();
        }
        let b = Vector3::new(self.gradient * position.y, self.gradient * position.x, 0.0);
        FieldValue::new(Vector3::zeros(), b)
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::cylinder(self.radial_aperture, self.half_length)
    }

    fn inside(&self, position: Vector3<f64>) -> bool {
        let radial = (position.x * position.x + position.y * position.y).sqrt();
        radial <= self.radial_aperture && position.z.abs() <= self.half_length
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// A longitudinal RF cavity field, `E_z(t) = (V/L) * cos(2*pi*f*t + phi)`.
///
/// Inside the aperture and z-window, `B` is always zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RF {
    voltage: f64,
    frequency: f64,
    angular_frequency: f64,
    phase: f64,
    length: f64,
    radial_aperture: f64,
    enabled: bool,
}

impl RF {
    /// An RF cavity of physical length `length` (m) with peak `voltage` (V),
    /// `frequency` (Hz), initial `phase` (rad), and `radial_aperture` (m).
    pub fn new(voltage: f64, frequency: f64, phase: f64, length: f64, radial_aperture: f64) -> Self {
        RF {
            voltage,
            frequency,
            angular_frequency: 2.0 * std::f64::consts::PI * frequency,
            phase,
            length,
            radial_aperture,
            enabled: true,
        }
    }

    /// Peak voltage, V.
    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    /// Replace the voltage.
    pub fn set_voltage(&mut self, voltage: f64) {
        self.voltage = voltage;
    }

    /// RF frequency, Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Replace the frequency, updating the cached angular frequency.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
        self.angular_frequency = 2.0 * std::f64::consts::PI * frequency;
    }

    /// RF phase, rad.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Replace the phase.
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = phase;
    }
}

impl FieldSource for RF {
    fn evaluate(&self, position: Vector3<f64>, time: f64) -> FieldValue {
        if !self.enabled || !self.inside(position) {
            return FieldValue::zero();
        }
        let ez = (self.voltage / self.length) * (self.angular_frequency * time + self.phase).cos();
        FieldValue::new(Vector3::new(0.0, 0.0, ez), Vector3::zeros())
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::cylinder(self.radial_aperture, self.length / 2.0)
    }

    fn inside(&self, position: Vector3<f64>) -> bool {
        let radial = (position.x * position.x + position.y * position.y).sqrt();
        radial <= self.radial_aperture && position.z.abs() <= self.length / 2.0
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Places a field source's own local frame (as evaluated by
/// `UniformB`/`Quadrupole`/`RF`, all centered on their local origin) at
/// a position and orientation in a shared global frame.
///
/// `LatticeComponent::build_field_source` wraps every kind-specific
/// source in one of these using the component's `position`/
/// `orientation` before registering it with a `FieldManager`: the
/// manager always queries sources with the particle's global position,
/// so a component's field source must translate/rotate that query back
/// into its own local frame rather than assume it sits at the origin.
pub struct Framed<S> {
    inner: S,
    position: Vector3<f64>,
    orientation: UnitQuaternion<f64>,
}

impl<S> Framed<S> {
    /// Wrap `inner`, whose local frame is centered at `position` with
    /// `orientation` relative to the global frame.
    pub fn new(inner: S, position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Framed { inner, position, orientation }
    }

    fn to_local(&self, global_position: Vector3<f64>) -> Vector3<f64> {
        self.orientation.inverse() * (global_position - self.position)
    }
}

impl<S: FieldSource> FieldSource for Framed<S> {
    fn evaluate(&self, position: Vector3<f64>, time: f64) -> FieldValue {
        let local = self.inner.evaluate(self.to_local(position), time);
        FieldValue::new(self.orientation * local.e, self.orientation * local.b)
    }

    fn bounding_box(&self) -> BoundingBox {
        let local = self.inner.bounding_box();
        let (min, max) = (local.min(), local.max());
        let corners = [
            Vector3::new(min.x, min.y, min.z),
            Vector3::new(min.x, min.y, max.z),
            Vector3::new(min.x, max.y, min.z),
            Vector3::new(min.x, max.y, max.z),
            Vector3::new(max.x, min.y, min.z),
            Vector3::new(max.x, min.y, max.z),
            Vector3::new(max.x, max.y, min.z),
            Vector3::new(max.x, max.y, max.z),
        ];
        let mut global_min = Vector3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut global_max = Vector3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for corner in corners {
            let global = self.orientation * corner + self.position;
            global_min.x = global_min.x.min(global.x);
            global_min.y = global_min.y.min(global.y);
            global_min.z = global_min.z.min(global.z);
            global_max.x = global_max.x.max(global.x);
            global_max.y = global_max.y.max(global.y);
            global_max.z = global_max.z.max(global.z);
        }
        BoundingBox::new(global_min, global_max)
    }

    fn inside(&self, position: Vector3<f64>) -> bool {
        self.inner.inside(self.to_local(position))
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.inner.set_enabled(enabled);
    }
}
