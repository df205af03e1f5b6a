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
//! The accelerator lattice: an ordered sequence of [`LatticeComponent`]s
//! laid out end-to-end along a straight reference axis (`+z`).
//!
//! [`Lattice::compute_lattice`] is the prefix-sum pass that assigns each
//! component a global position and an `s_position`; it must be called
//! (and is called automatically by every mutating method) before
//! `get_component_at_s` or `populate_field_manager` give correct
//! answers for a freshly modified lattice.

use nalgebra::Vector3;
use std::sync::Arc;

use crate::field::FieldManager;

use super::aperture::Aperture;
use super::component::{ComponentKind, DetectorHit, LatticeComponent};

/// Whether a lattice is open-ended or forms a closed ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatticeType {
    /// Open-ended: `s` outside `[0, total_length)` has no component.
    #[default]
    Linear,
    /// Closed ring: `s` is reduced modulo `total_length` before lookup.
    Circular,
}

/// An ordered sequence of lattice components.
#[derive(Default)]
pub struct Lattice {
    components: Vec<LatticeComponent>,
    dirty: bool,
    lattice_type: LatticeType,
}

impl Lattice {
    /// An empty, linear lattice.
    pub fn new() -> Self {
        Lattice { components: Vec::new(), dirty: false, lattice_type: LatticeType::Linear }
    }

    /// The lattice's type (`Linear` unless [`Lattice::close_ring`] has
    /// been called).
    pub fn lattice_type(&self) -> LatticeType {
        self.lattice_type
    }

    /// Append a component to the end of the lattice.
    pub fn push(&mut self, component: LatticeComponent) {
        self.components.push(component);
        self.dirty = true;
    }

    /// Insert a component at `index`, shifting later elements down.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&mut self, index: usize, component: LatticeComponent) {
        assert!(index <= self.components.len(), "index out of bounds");
        self.components.insert(index, component);
        self.dirty = true;
    }

    /// Remove and return the component at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<LatticeComponent> {
        if index >= self.components.len() {
            return None;
        }
        self.dirty = true;
        Some(self.components.remove(index))
    }

    /// Remove and return the first component whose name equals `name`.
    pub fn remove_by_name(&mut self, name: &str) -> Option<LatticeComponent> {
        let index = self.components.iter().position(|c| c.name() == name)?;
        self.remove(index)
    }

    /// Number of components in the lattice.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the lattice has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Total length of the lattice, m (sum of every component's length).
    /// Triggers a recompute if the lattice is dirty.
    pub fn total_length(&mut self) -> f64 {
        self.compute_lattice();
        self.components.iter().map(|c| c.length()).sum()
    }

    /// Iterate over components in order.
    pub fn iter(&self) -> impl Iterator<Item = &LatticeComponent> {
        self.components.iter()
    }

    /// Iterate mutably over components in order. Any strength mutation
    /// made through the returned references will be picked up the next
    /// time `field_source` is called on that component; it does not, by
    /// itself, mark the lattice layout dirty (geometry is unaffected).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut LatticeComponent> {
        self.components.iter_mut()
    }

    /// Borrow the component at `index`.
    pub fn get(&self, index: usize) -> Option<&LatticeComponent> {
        self.components.get(index)
    }

    /// Mutably borrow the component at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut LatticeComponent> {
        self.components.get_mut(index)
    }

    /// Find the first component whose name equals `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&LatticeComponent> {
        self.components.iter().find(|c| c.name() == name)
    }

    /// Recompute every component's global position and `s_position` as
    /// a running prefix sum of lengths along `+z`, starting from the
    /// origin. A no-op if the lattice is not dirty.
    pub fn compute_lattice(&mut self) {
        if !self.dirty {
            return;
        }
        let mut s = 0.0;
        for component in &mut self.components {
            component.set_position(Vector3::new(0.0, 0.0, s));
            component.set_s_position(s);
            s += component.length();
        }
        self.dirty = false;
    }

    /// Mark the lattice as a closed ring and recompute its layout (spec
    /// §4.5: "closeRing() sets lattice type to circular and
    /// recomputes"). After this call, [`Lattice::get_component_at_s`]
    /// reduces `s` modulo [`Lattice::total_length`] instead of treating
    /// out-of-range `s` as not-found.
    pub fn close_ring(&mut self) {
        self.lattice_type = LatticeType::Circular;
        self.dirty = true;
        self.compute_lattice();
    }

    /// Sum of `dipole_bending_angle` over every dipole in
    /// the lattice, for a reference particle of momentum
    /// `reference_momentum` (kg*m/s) and charge magnitude
    /// [`crate::constants::E_CHARGE`] (the formula below takes only
    /// `p0`; every species the generator supports is singly charged,
    /// so `|q| = e` is assumed here — see `DESIGN.md`).
    pub fn total_bending_angle(&mut self, reference_momentum: f64) -> f64 {
        self.compute_lattice();
        self.components
            .iter()
            .filter_map(|c| match c.kind() {
                ComponentKind::Dipole { field } => {
                    Some(dipole_bending_angle(field, c.length(), reference_momentum))
                }
                _ => None,
            })
            .sum()
    }

    /// The component whose `[s_position, s_position + length)` window
    /// contains `s`, if any. Triggers a recompute if dirty.
    ///
    /// On a [`LatticeType::Circular`] lattice, `s` is first reduced
    /// modulo the total length (negative values wrapped into
    /// `[0, total)`); on a linear lattice, `s` outside `[0, total)` is
    /// simply not found.
    pub fn get_component_at_s(&mut self, s: f64) -> Option<&LatticeComponent> {
        self.compute_lattice();
        if self.components.is_empty() {
            return None;
        }
        let s = match self.lattice_type {
            LatticeType::Circular => {
                let total: f64 = self.components.iter().map(|c| c.length()).sum();
                if total <= 0.0 {
                    return None;
                }
                let wrapped = s % total;
                if wrapped < 0.0 {
                    wrapped + total
                } else {
                    wrapped
                }
            }
            LatticeType::Linear => s,
        };
        self.components
            .iter()
            .find(|c| s >= c.s_position() && s < c.s_position() + c.length())
    }

    /// Rebuild `manager` from scratch: clear it, then register every
    /// component's field source (skipping `None` for field-free kinds).
    /// Triggers a recompute if dirty, so s-positions are always current
    /// by the time sources are queried against global coordinates.
    pub fn populate_field_manager(&mut self, manager: &mut FieldManager) {
        self.compute_lattice();
        manager.clear();
        for component in &mut self.components {
            if let Some(source) = component.field_source() {
                manager.add_source(source);
            }
        }
    }

    /// Build a lattice of `n_cells` FODO cells: `QF - drift - QD -
    /// drift` per cell, the "full quadrupole" convention in preference
    /// to the thin-lens half-quad alternative. Each
    /// quadrupole has length `quad_length`, gradient `+-gradient`.
    ///
    /// `drift_length` is the explicit per-drift length if `> 0`;
    /// otherwise it is derived from `cell_length` as
    /// `(cell_length - 2*quad_length) / 2` so each cell totals
    /// `cell_length`. Component names are
    /// `{name_prefix}_QF{i}`, `{name_prefix}_D{i}a`,
    /// `{name_prefix}_QD{i}`, `{name_prefix}_D{i}b`.
    pub fn fodo_cell(
        n_cells: usize,
        name_prefix: &str,
        cell_length: f64,
        quad_length: f64,
        gradient: f64,
        drift_length: f64,
        aperture: Aperture,
    ) -> Self {
        let drift_length =
            if drift_length > 0.0 { drift_length } else { (cell_length - 2.0 * quad_length) / 2.0 };
        let mut lattice = Lattice::new();
        for i in 0..n_cells {
            lattice.push(LatticeComponent::quadrupole(
                format!("{name_prefix}_QF{i}"),
                quad_length,
                aperture,
                gradient,
            ));
            lattice.push(LatticeComponent::beam_pipe(format!("{name_prefix}_D{i}a"), drift_length, aperture));
            lattice.push(LatticeComponent::quadrupole(
                format!("{name_prefix}_QD{i}"),
                quad_length,
                aperture,
                -gradient,
            ));
            lattice.push(LatticeComponent::beam_pipe(format!("{name_prefix}_D{i}b"), drift_length, aperture));
        }
        lattice.compute_lattice();
        lattice
    }

    /// The `[s_min, s_max]` window the lattice occupies, or `None` if
    /// empty. Triggers a recompute if dirty.
    pub fn bounding_s_window(&mut self) -> Option<(f64, f64)> {
        self.compute_lattice();
        if self.components.is_empty() {
            return None;
        }
        let s_min = self.components.first().unwrap().s_position();
        let last = self.components.last().unwrap();
        let s_max = last.s_position() + last.length();
        Some((s_min, s_max))
    }

    /// Detectors in the lattice whose aperture contains `global_position`
    /// at the corresponding z-window, paired with the detector's index.
    /// Used by the controller's loss/hit-recording pass.
    pub fn detectors_containing(&mut self, global_position: Vector3<f64>) -> Vec<usize> {
        self.compute_lattice();
        self.components
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c.kind(), ComponentKind::Detector) && c.contains_global(global_position))
            .map(|(i, _)| i)
            .collect()
    }

    /// Record a hit on every `Detector` component whose aperture
    /// contains `global_position`, for the particle identified by
    /// `particle_id` at simulation time `time`.
    pub fn record_detector_hits(
        &mut self,
        particle_id: u64,
        global_position: Vector3<f64>,
        momentum: Vector3<f64>,
        time: f64,
    ) {
        self.compute_lattice();
        for component in &mut self.components {
            if matches!(component.kind(), ComponentKind::Detector) && component.contains_global(global_position) {
                component.record_hit(DetectorHit { particle_id, position: global_position, momentum, time });
            }
        }
    }
}

/// Bending angle contributed by a dipole of field `field` (T) and
/// length `length` (m), for a reference particle of momentum `p0`
/// (kg*m/s): `theta = e * field * length / p0` (small-angle
/// form).
fn dipole_bending_angle(field: f64, length: f64, p0: f64) -> f64 {
    crate::constants::E_CHARGE * field * length / p0
}
