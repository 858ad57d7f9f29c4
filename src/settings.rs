//! Panel settings persisted between runs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::context::ApplicationContext;
use crate::instrument::{InstrumentRegistry, Placement};
use crate::simvars::SimVars;

const FILE_NAME: &str = "instrument-panel.json";

const SETTINGS_VERSION: u32 = 1;

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSettings {
    /// Version of the settings format
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_true")]
    pub shadows: bool,
    /// Origin of the monitor the panel was last shown on
    #[serde(default)]
    pub display_origin: Option<(i32, i32)>,
    #[serde(default)]
    pub instruments: Vec<InstrumentSettings>,
    /// Simulated variable values keyed by `group/name`
    #[serde(default)]
    pub simulated: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSettings {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub placement: Option<Placement>,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            shadows: true,
            display_origin: None,
            instruments: Vec::new(),
            simulated: BTreeMap::new(),
        }
    }
}

impl PanelSettings {
    /// Settings file in the user's config directory
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "instrument-panel", "instrument-panel")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join(FILE_NAME))
    }

    /// Reads settings from `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Like [`PanelSettings::load`], but an unreadable file only costs a warning.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!("Ignoring settings at {}: {err}", path.display());
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn instrument(&self, name: &str) -> Option<&InstrumentSettings> {
        self.instruments.iter().find(|i| i.name == name)
    }

    /// Instruments are enabled unless the settings say otherwise.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.instrument(name).map_or(true, |i| i.enabled)
    }

    pub fn placement(&self, name: &str) -> Option<Placement> {
        self.instrument(name).and_then(|i| i.placement)
    }

    pub fn apply(&self, ctx: &mut ApplicationContext) {
        ctx.shadows_enabled = self.shadows;
    }

    /// Records the running panel's state. Entries for instruments that are not mounted,
    /// disabled ones included, are kept as they are.
    pub fn capture(
        &mut self,
        ctx: &ApplicationContext,
        instruments: &InstrumentRegistry,
        simvars: &SimVars,
    ) {
        self.shadows = ctx.shadows_enabled;
        self.display_origin = Some(ctx.origin());

        for instrument in instruments.iter() {
            let placement = Some(instrument.placement());
            match self.instruments.iter_mut().find(|i| i.name == instrument.name()) {
                Some(entry) => entry.placement = placement,
                None => self.instruments.push(InstrumentSettings {
                    name: instrument.name().to_string(),
                    enabled: true,
                    placement,
                }),
            }
        }

        self.simulated.extend(simvars.simulated_values());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{CommonVariable, DemoBridge, VariableBridge};
    use crate::instrument::testing::{CallLog, Recorder};

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = PanelSettings::load(&dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(settings, PanelSettings::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(PanelSettings::load(&path).is_err());
        assert_eq!(PanelSettings::load_or_default(&path), PanelSettings::default());
    }

    #[test]
    fn older_files_without_optional_fields_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        std::fs::write(&path, r#"{"version":1,"instruments":[{"name":"Airspeed"}]}"#).unwrap();
        let settings = PanelSettings::load(&path).unwrap();
        assert!(settings.shadows);
        assert!(settings.is_enabled("Airspeed"));
        assert_eq!(settings.placement("Airspeed"), None);
    }

    #[test]
    fn unversioned_files_keep_their_placements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        std::fs::write(
            &path,
            r#"{"instruments":[{"name":"Altimeter","placement":{"x":7,"y":8,"size":90}}]}"#,
        )
        .unwrap();
        let settings = PanelSettings::load_or_default(&path);
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.placement("Altimeter"), Some(Placement::new(7, 8, 90)));
    }

    #[test]
    fn captured_state_survives_a_save() {
        let log = CallLog::default();
        let mut vars = SimVars::new(Box::new(DemoBridge::new()));
        vars.register_variable(CommonVariable::new("Common", "Electrics", 1, true, 1, 0));
        vars.simulate(1, 1);
        let mut instruments = InstrumentRegistry::new();
        instruments.add(Recorder::boxed("a", &log), &mut vars);
        instruments
            .get_mut(0)
            .unwrap()
            .set_placement(Placement::new(5, 6, 70));

        let mut ctx = ApplicationContext::default();
        ctx.shadows_enabled = false;
        ctx.set_origin((1920, 0));

        let mut settings = PanelSettings::default();
        settings.instruments.push(InstrumentSettings {
            name: "b".to_string(),
            enabled: false,
            placement: None,
        });
        settings.capture(&ctx, &instruments, &vars);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);
        settings.save(&path).unwrap();
        let loaded = PanelSettings::load(&path).unwrap();

        assert_eq!(loaded, settings);
        assert!(!loaded.shadows);
        assert_eq!(loaded.display_origin, Some((1920, 0)));
        assert_eq!(loaded.placement("a"), Some(Placement::new(5, 6, 70)));
        assert!(!loaded.is_enabled("b"));
        assert_eq!(loaded.simulated["Common/Electrics"], 1);
    }

    #[test]
    fn apply_sets_the_shadow_toggle() {
        let settings = PanelSettings {
            shadows: false,
            ..PanelSettings::default()
        };
        let mut ctx = ApplicationContext::default();
        settings.apply(&mut ctx);
        assert!(!ctx.shadows_enabled);
    }
}
