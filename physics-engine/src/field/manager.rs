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
//! Field manager: superposition composite over an ordered set of field
//! sources.
//!
//! Lattice components own their field source behind an `Arc`, and the manager
//! holds its own `Arc` clones — non-owning in the sense that dropping
//! the manager's references never drops the source, but cheap to share
//! since every field source is immutable once built (mutation goes
//! through the component's lazy-rebuild cache, see
//! [`crate::lattice::component`]).

use std::sync::Arc;

use nalgebra::Vector3;

use super::source::FieldSource;
use super::value::FieldValue;

/// Ordered collection of shared field sources; evaluates to the sum of
/// every enabled, containing source.
#[derive(Default, Clone)]
pub struct FieldManager {
    sources: Vec<Arc<dyn FieldSource>>,
}

impl FieldManager {
    /// An empty field manager (drift space).
    pub fn new() -> Self {
        FieldManager { sources: Vec::new() }
    }

    /// Register a field source. Order does not matter for the result:
    /// no short-circuit ordering is required.
    pub fn add_source(&mut self, source: Arc<dyn FieldSource>) {
        self.sources.push(source);
    }

    /// Drop all registered references. Does not affect sources still
    /// held by their owning lattice components.
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    /// Number of registered sources (enabled or not).
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Superposed field at `position`/`time`: the sum of `evaluate`
    /// over every source that is enabled and whose `inside` test
    /// passes.
    pub fn evaluate(&self, position: Vector3<f64>, time: f64) -> FieldValue {
        self.sources
            .iter()
            .filter(|s| s.is_enabled() && s.inside(position))
            .map(|s| s.evaluate(position, time))
            .sum()
    }
}
