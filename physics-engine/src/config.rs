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
//! Configuration file shapes and the fallback-with-warning
//! policy for unrecognized config-domain values.
//!
//! `ConfigError` sits only at the I/O boundary: a file that fails to
//! open or parse is reported to the caller, who keeps whatever
//! configuration it already held. Once a
//! config is parsed, everything downstream of it (unknown integrator,
//! distribution, or component type) degrades to a documented default
//! with a warning rather than failing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ensemble::DistributionKind;
use crate::integration::IntegratorKind;
use crate::lattice::{Aperture, Lattice, LatticeComponent};
use crate::particle::Species;

/// Errors that can occur loading a configuration file from disk.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be opened or read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file's contents were not valid JSON for the expected shape.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The `"simulation"` section of the top-level config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Fixed integration timestep, s.
    pub time_step: f64,
    /// Real-time-to-simulation-time multiplier.
    pub time_scale: f64,
    /// Integrator selector: `0:Euler,1:Verlet,2:Boris,3:RK4`.
    pub integrator_type: i64,
    /// Number of particles to generate for the default beam.
    pub particle_count: u64,
    /// Beam kinetic energy, eV.
    pub beam_energy: f64,
}

impl SimulationConfig {
    /// Resolve `integrator_type` to an [`IntegratorKind`], falling back
    /// to `Boris` with a warning for an unrecognized code.
    pub fn integrator_kind(&self) -> IntegratorKind {
        IntegratorKind::from_config_code(self.integrator_type)
    }

    /// `beam_energy` converted from eV to joules.
    pub fn beam_energy_joules(&self) -> f64 {
        self.beam_energy * crate::constants::EV
    }
}

/// The `"window"` section. Opaque to the engine core; carried through
/// only so a config round-trips without losing the renderer's settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub fullscreen: bool,
}

/// The `"render"` section. Opaque to the engine core, same as
/// [`WindowConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    pub wireframe: bool,
    pub show_grid: bool,
    pub show_axes: bool,
    pub particle_size: f64,
    pub color_scheme: String,
}

/// The top-level simulation configuration file: `simulation` plus the
/// external-facing `window`/`render` sections carried through
/// unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub window: WindowConfig,
    pub render: RenderConfig,
}

/// One element of an accelerator config file's `components` array.
/// Kind-specific fields are `None` when not applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
    pub length: f64,
    pub aperture: f64,
    pub s_position: f64,
    #[serde(default)]
    pub field: Option<f64>,
    #[serde(default)]
    pub gradient: Option<f64>,
    #[serde(default)]
    pub voltage: Option<f64>,
    #[serde(default)]
    pub frequency: Option<f64>,
    #[serde(default)]
    pub phase: Option<f64>,
}

/// An accelerator config file: lattice topology plus its components.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceleratorConfig {
    pub lattice_type: String,
    pub total_length: f64,
    pub components: Vec<ComponentConfig>,
}

/// Load and parse an [`EngineConfig`] from `path`.
pub fn load_engine_config(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Load and parse an [`AcceleratorConfig`] from `path`.
pub fn load_accelerator_config(path: impl AsRef<Path>) -> Result<AcceleratorConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Resolve a `particleType` string to a [`Species`], falling back to
/// `Proton` with a warning for an unrecognized name (the same
/// fallback policy used for integrator/distribution names extends to
/// every recognized-options config field).
pub fn species_from_name(name: &str) -> Species {
    match name {
        "electron" => Species::Electron,
        "positron" => Species::Positron,
        "proton" => Species::Proton,
        "antiproton" => Species::Antiproton,
        other => {
            eprintln!("warning: unknown particleType '{other}', defaulting to proton");
            Species::Proton
        }
    }
}

/// Resolve a `distribution` string to a [`DistributionKind`], falling
/// back to `Gaussian` with a warning for an unrecognized name.
pub fn distribution_from_name(name: &str) -> DistributionKind {
    match name {
        "Gaussian" => DistributionKind::Gaussian,
        "Uniform" => DistributionKind::Uniform,
        "Waterbag" => DistributionKind::Waterbag,
        other => {
            eprintln!("warning: unknown distribution '{other}', defaulting to Gaussian");
            DistributionKind::Gaussian
        }
    }
}

/// Build a [`Lattice`] from a parsed [`AcceleratorConfig`], skipping
/// (with a warning) any component whose `type` is not recognized, and
/// continuing to load the rest.
pub fn build_lattice(config: &AcceleratorConfig) -> Lattice {
    let mut lattice = Lattice::new();
    for c in &config.components {
        let aperture = Aperture::circular(c.aperture);
        let component = match c.component_type.as_str() {
            "beampipe" | "drift" => LatticeComponent::beam_pipe(c.name.clone(), c.length, aperture),
            "dipole" => LatticeComponent::dipole(c.name.clone(), c.length, aperture, c.field.unwrap_or(0.0)),
            "quadrupole" => {
                LatticeComponent::quadrupole(c.name.clone(), c.length, aperture, c.gradient.unwrap_or(0.0))
            }
            "rfcavity" => LatticeComponent::rf_cavity(
                c.name.clone(),
                c.length,
                aperture,
                c.voltage.unwrap_or(0.0),
                c.frequency.unwrap_or(0.0),
                c.phase.unwrap_or(0.0),
            ),
            other => {
                eprintln!("warning: unknown component type '{other}' for '{}', skipping", c.name);
                continue;
            }
        };
        lattice.push(component);
    }
    if config.lattice_type == "circular" {
        lattice.close_ring();
    } else {
        lattice.compute_lattice();
    }
    lattice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_round_trips_through_json() {
        let json = r#"{
            "simulation": { "timeStep": 1e-9, "timeScale": 1.0, "integratorType": 2, "particleCount": 1000, "beamEnergy": 1e9 },
            "window": { "width": 1280, "height": 720, "vsync": true, "fullscreen": false },
            "render": { "wireframe": false, "showGrid": true, "showAxes": true, "particleSize": 0.5, "colorScheme": "default" }
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.simulation.integrator_kind(), IntegratorKind::Boris);
        assert_eq!(config.window.width, 1280);
        assert!(config.render.show_grid);
    }

    #[test]
    fn unknown_integrator_code_falls_back_to_boris() {
        let sim = SimulationConfig {
            time_step: 1e-9,
            time_scale: 1.0,
            integrator_type: 42,
            particle_count: 1,
            beam_energy: 1e6,
        };
        assert_eq!(sim.integrator_kind(), IntegratorKind::Boris);
    }

    #[test]
    fn unknown_particle_type_falls_back_to_proton() {
        assert_eq!(species_from_name("tachyon"), Species::Proton);
        assert_eq!(species_from_name("electron"), Species::Electron);
    }

    #[test]
    fn unknown_distribution_falls_back_to_gaussian() {
        assert_eq!(distribution_from_name("nonsense"), DistributionKind::Gaussian);
        assert_eq!(distribution_from_name("Waterbag"), DistributionKind::Waterbag);
    }

    #[test]
    fn build_lattice_skips_unknown_component_types() {
        let config = AcceleratorConfig {
            lattice_type: "linear".to_string(),
            total_length: 3.0,
            components: vec![
                ComponentConfig {
                    component_type: "beampipe".to_string(),
                    name: "BP1".to_string(),
                    length: 1.0,
                    aperture: 0.05,
                    s_position: 0.0,
                    field: None,
                    gradient: None,
                    voltage: None,
                    frequency: None,
                    phase: None,
                },
                ComponentConfig {
                    component_type: "wormhole".to_string(),
                    name: "W1".to_string(),
                    length: 1.0,
                    aperture: 0.05,
                    s_position: 1.0,
                    field: None,
                    gradient: None,
                    voltage: None,
                    frequency: None,
                    phase: None,
                },
                ComponentConfig {
                    component_type: "dipole".to_string(),
                    name: "B1".to_string(),
                    length: 1.0,
                    aperture: 0.05,
                    s_position: 2.0,
                    field: Some(1.2),
                    gradient: None,
                    voltage: None,
                    frequency: None,
                    phase: None,
                },
            ],
        };
        let lattice = build_lattice(&config);
        assert_eq!(lattice.len(), 2);
    }

    #[test]
    fn circular_lattice_type_closes_the_ring() {
        let config = AcceleratorConfig {
            lattice_type: "circular".to_string(),
            total_length: 1.0,
            components: vec![ComponentConfig {
                component_type: "beampipe".to_string(),
                name: "BP1".to_string(),
                length: 1.0,
                aperture: 0.05,
                s_position: 0.0,
                field: None,
                gradient: None,
                voltage: None,
                frequency: None,
                phase: None,
            }],
        };
        let mut lattice = build_lattice(&config);
        assert_eq!(lattice.lattice_type(), crate::lattice::LatticeType::Circular);
        assert_eq!(lattice.get_component_at_s(1.5).unwrap().name(), "BP1");
    }

    #[test]
    fn loading_a_missing_file_reports_io_error() {
        let result = load_engine_config("/nonexistent/path/engine.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
