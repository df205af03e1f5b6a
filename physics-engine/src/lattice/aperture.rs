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
//! Transverse aperture shapes for lattice components.

use nalgebra::Vector3;

/// The cross-sectional shape of a lattice component's aperture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApertureShape {
    /// A circle of radius `rx` (`ry` is ignored).
    Circular,
    /// An ellipse with semi-axes `rx`, `ry`.
    Elliptical,
    /// A rectangle with half-widths `rx`, `ry`.
    Rectangular,
}

/// A transverse aperture: a shape plus its half-widths, tested against
/// a point in the component's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aperture {
    shape: ApertureShape,
    rx: f64,
    ry: f64,
}

impl Aperture {
    /// Construct an aperture of the given shape and half-widths.
    pub fn new(shape: ApertureShape, rx: f64, ry: f64) -> Self {
        Aperture { shape, rx, ry }
    }

    /// A circular aperture of radius `radius`.
    pub fn circular(radius: f64) -> Self {
        Aperture::new(ApertureShape::Circular, radius, radius)
    }

    /// An elliptical aperture with semi-axes `rx`, `ry`.
    pub fn elliptical(rx: f64, ry: f64) -> Self {
        Aperture::new(ApertureShape::Elliptical, rx, ry)
    }

    /// A rectangular aperture with half-widths `rx`, `ry`.
    pub fn rectangular(rx: f64, ry: f64) -> Self {
        Aperture::new(ApertureShape::Rectangular, rx, ry)
    }

    /// The aperture's shape kind.
    pub fn shape(&self) -> ApertureShape {
        self.shape
    }

    /// Half-width along local x.
    pub fn rx(&self) -> f64 {
        self.rx
    }

    /// Half-width along local y.
    pub fn ry(&self) -> f64 {
        self.ry
    }

    /// Whether the transverse components of `local_point` (x, y) lie
    /// within this aperture's 2D cross-section. The z-coordinate is
    /// ignored; the loss model combines this with a z-window test
    /// separately.
    pub fn contains_transverse(&self, local_point: Vector3<f64>) -> bool {
        let (x, y) = (local_point.x, local_point.y);
        match self.shape {
            ApertureShape::Circular => x * x + y * y <= self.rx * self.rx,
            ApertureShape::Elliptical => {
                (x * x) / (self.rx * self.rx) + (y * y) / (self.ry * self.ry) <= 1.0
            }
            ApertureShape::Rectangular => x.abs() <= self.rx && y.abs() <= self.ry,
        }
    }
}

impl Default for Aperture {
    fn default() -> Self {
        Aperture::circular(0.05)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_aperture_boundary_inclusive() {
        let ap = Aperture::circular(1.0);
        assert!(ap.contains_transverse(Vector3::new(1.0, 0.0, 0.0)));
        assert!(!ap.contains_transverse(Vector3::new(1.000001, 0.0, 0.0)));
    }

    #[test]
    fn elliptical_aperture_respects_both_axes() {
        let ap = Aperture::elliptical(2.0, 1.0);
        assert!(ap.contains_transverse(Vector3::new(2.0, 0.0, 5.0)));
        assert!(ap.contains_transverse(Vector3::new(0.0, 1.0, 5.0)));
        assert!(!ap.contains_transverse(Vector3::new(1.5, 0.9, 0.0)));
    }

    #[test]
    fn rectangular_aperture_is_a_box() {
        let ap = Aperture::rectangular(1.0, 2.0);
        assert!(ap.contains_transverse(Vector3::new(1.0, 2.0, 0.0)));
        assert!(!ap.contains_transverse(Vector3::new(1.0, 2.1, 0.0)));
    }
}
