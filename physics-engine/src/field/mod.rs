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
//! Electromagnetic field sources and their superposition.
//!
//! - [`value`]: the `(E, B)` monoid field sources evaluate to.
//! - [`bbox`]: axis-aligned bounding boxes used for containment tests.
//! - [`source`]: the `FieldSource` capability trait and the three
//!   concrete sources (`UniformB`, `Quadrupole`, `RF`).
//! - [`manager`]: the composite that superposes a lattice's sources.

pub mod bbox;
pub mod manager;
pub mod source;
pub mod value;

pub use bbox::BoundingBox;
pub use manager::FieldManager;
pub use source::{FieldSource, Framed, Quadrupole, UniformB, RF};
pub use value::FieldValue;
