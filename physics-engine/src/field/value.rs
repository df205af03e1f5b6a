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
//! Electromagnetic field value: a commutative monoid under addition.

use nalgebra::Vector3;
use std::ops::Add;

/// An electric/magnetic field sample at a point in space and time.
///
/// `FieldValue` forms a commutative monoid under component-wise
/// addition with identity `(0, 0)`; superposing several sources is
/// exactly summing their `FieldValue`s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldValue {
    /// Electric field, V/m.
    pub e: Vector3<f64>,
    /// Magnetic field, T.
    pub b: Vector3<f64>,
}

impl FieldValue {
    /// The additive identity: zero electric and magnetic field.
    pub fn zero() -> Self {
        FieldValue { e: Vector3::zeros(), b: Vector3::zeros() }
    }

    /// Construct from explicit E and B vectors.
    pub fn new(e: Vector3<f64>, b: Vector3<f64>) -> Self {
        FieldValue { e, b }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for FieldValue {
    type Output = FieldValue;

    fn add(self, rhs: FieldValue) -> FieldValue {
        FieldValue { e: self.e + rhs.e, b: self.b + rhs.b }
    }
}

impl std::iter::Sum for FieldValue {
    fn sum<I: Iterator<Item = FieldValue>>(iter: I) -> Self {
        iter.fold(FieldValue::zero(), Add::add)
    }
}
