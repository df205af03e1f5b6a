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
//! Axis-aligned bounding boxes, possibly unbounded on any axis.

use nalgebra::Vector3;

/// An axis-aligned bounding box in the field source's local frame.
///
/// Any bound may be infinite; containment is inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Vector3<f64>,
    max: Vector3<f64>,
}

impl BoundingBox {
    /// Construct a box from explicit min/max corners.
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        BoundingBox { min, max }
    }

    /// A box unbounded on every axis.
    pub fn infinite() -> Self {
        BoundingBox {
            min: Vector3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            max: Vector3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        }
    }

    /// A cylindrical region approximated as an axis-aligned box: radial
    /// extent `radius` in x/y, `[-half_length, half_length]` in z.
    pub fn cylinder(radius: f64, half_length: f64) -> Self {
        BoundingBox::new(
            Vector3::new(-radius, -radius, -half_length),
            Vector3::new(radius, radius, half_length),
        )
    }

    /// Lower corner.
    pub fn min(&self) -> Vector3<f64> {
        self.min
    }

    /// Upper corner.
    pub fn max(&self) -> Vector3<f64> {
        self.max
    }

    /// Inclusive containment test on both ends.
    pub fn contains(&self, point: Vector3<f64>) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_contains_everything() {
        let bbox = BoundingBox::infinite();
        assert!(bbox.contains(Vector3::new(1e300, -1e300, 0.0)));
    }

    #[test]
    fn containment_is_inclusive_on_both_ends() {
        let bbox = BoundingBox::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        assert!(bbox.contains(Vector3::new(1.0, 1.0, 1.0)));
        assert!(bbox.contains(Vector3::new(-1.0, -1.0, -1.0)));
        assert!(!bbox.contains(Vector3::new(1.000001, 0.0, 0.0)));
    }
}
