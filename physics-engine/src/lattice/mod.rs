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
//! The accelerator lattice: beamline geometry, apertures, and the
//! field sources each component contributes.
//!
//! - [`aperture`]: transverse cross-section shapes and containment.
//! - [`component`]: a single beamline element (`LatticeComponent`).
//! - [`lattice`]: the ordered container (`Lattice`) and its layout,
//!   FODO-cell builder, and bending-angle bookkeeping.

pub mod aperture;
pub mod component;
pub mod lattice;

pub use aperture::{Aperture, ApertureShape};
pub use component::{ComponentKind, DetectorHit, LatticeComponent};
pub use lattice::{Lattice, LatticeType};
