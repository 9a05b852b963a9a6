//! Module registry: navigation order and the options tree.
//!
//! Modules and their option lists are fixed at construction from the
//! `[modules]` config section. Names the controller does not know become
//! `Unknown` entries that render a fallback screen instead of failing.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use kleine_common::Icon;

use crate::config::ModulesConfig;

/// A full-screen display mode.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ModuleId {
    Temperature,
    Accelerometer,
    Gps,
    Cockpit,
    Info,
    Settings,
    Power,
    Unknown(String),
}

impl ModuleId {
    pub fn name(&self) -> &str {
        match self {
            Self::Temperature => "temperature",
            Self::Accelerometer => "accelerometer",
            Self::Gps => "gps",
            Self::Cockpit => "cockpit",
            Self::Info => "info",
            Self::Settings => "settings",
            Self::Power => "power",
            Self::Unknown(name) => name,
        }
    }

    /// Title shown on screens that name the module.
    pub fn label(&self) -> &str {
        match self {
            Self::Temperature => "Temperature",
            Self::Accelerometer => "Accelerometer",
            Self::Gps => "GPS",
            Self::Cockpit => "Cockpit",
            Self::Info => "Info",
            Self::Settings => "Settings",
            Self::Power => "Power",
            Self::Unknown(name) => name,
        }
    }

    pub const fn icon(&self) -> Icon {
        match self {
            Self::Temperature => Icon::Thermometer,
            Self::Accelerometer => Icon::Accelerometer,
            Self::Gps => Icon::Satellite,
            Self::Cockpit => Icon::Car,
            Self::Info => Icon::Info,
            Self::Settings => Icon::Gear,
            Self::Power => Icon::Power,
            Self::Unknown(_) => Icon::Unknown,
        }
    }

    /// Polled on the every-N-seconds cadence while active.
    pub const fn uses_position(&self) -> bool {
        matches!(self, Self::Gps | Self::Cockpit)
    }

    /// Polled on every loop iteration while active.
    pub const fn uses_motion(&self) -> bool {
        matches!(self, Self::Accelerometer)
    }
}

impl FromStr for ModuleId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "temperature" => Self::Temperature,
            "accelerometer" => Self::Accelerometer,
            "gps" => Self::Gps,
            "cockpit" => Self::Cockpit,
            "info" => Self::Info,
            "settings" => Self::Settings,
            "power" => Self::Power,
            _ => Self::Unknown(s.to_string()),
        })
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A selectable sub-choice within a module.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum OptionId {
    Sleep,
    Shutdown,
    Reboot,
    UpdateRestart,
    Unknown(String),
}

impl OptionId {
    /// Text shown in the option list.
    pub fn label(&self) -> &str {
        match self {
            Self::Sleep => "Sleep",
            Self::Shutdown => "Shutdown",
            Self::Reboot => "Reboot",
            Self::UpdateRestart => "Update & restart",
            Self::Unknown(name) => name,
        }
    }
}

impl FromStr for OptionId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "sleep" => Self::Sleep,
            "shutdown" => Self::Shutdown,
            "reboot" => Self::Reboot,
            "update_restart" => Self::UpdateRestart,
            _ => Self::Unknown(s.to_string()),
        })
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
struct ModuleEntry {
    id: ModuleId,
    options: Vec<OptionId>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModuleRegistry {
    entries: Vec<ModuleEntry>,
}

impl ModuleRegistry {
    pub fn from_config(config: &ModulesConfig) -> Self {
        let options: BTreeMap<String, &Vec<String>> =
            config.options.iter().map(|(name, options)| (module_key(name), options)).collect();

        let entries: Vec<ModuleEntry> = config
            .order
            .iter()
            .map(|name| {
                let options = options
                    .get(&module_key(name))
                    .map(|names| names.iter().map(|o| parse(o)).collect())
                    .unwrap_or_default();
                ModuleEntry { id: parse(name), options }
            })
            .collect();

        for name in config.options.keys() {
            if !config.order.iter().any(|module| module_key(module) == module_key(name)) {
                log::warn!("options configured for module {:?} which is not in modules.order", name);
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn module(&self, index: usize) -> Option<&ModuleId> {
        self.entries.get(index).map(|entry| &entry.id)
    }

    /// Options of the module at `index`. Empty when the module has no entry
    /// in the options tree.
    pub fn options(&self, index: usize) -> &[OptionId] {
        match self.entries.get(index) {
            Some(entry) => &entry.options,
            None => &[],
        }
    }

    /// Options of the first module equal to `id`.
    pub fn options_of(&self, id: &ModuleId) -> &[OptionId] {
        self.entries
            .iter()
            .find(|entry| &entry.id == id)
            .map_or(&[][..], |entry| entry.options.as_slice())
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleId> {
        self.entries.iter().map(|entry| &entry.id)
    }
}

/// Module names match case-insensitively, as in `ModuleId::from_str`.
fn module_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn parse<T: FromStr<Err = Infallible>>(name: &str) -> T {
    match name.parse() {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let registry = ModuleRegistry::from_config(&ModulesConfig::default());
        let names: Vec<_> = registry.modules().map(ModuleId::name).collect();
        assert_eq!(
            names,
            ["temperature", "accelerometer", "gps", "cockpit", "info", "settings", "power"]
        );
    }

    #[test]
    fn test_power_has_options() {
        let registry = ModuleRegistry::from_config(&ModulesConfig::default());
        let power = registry.modules().position(|m| *m == ModuleId::Power).unwrap();
        assert_eq!(
            registry.options(power),
            [OptionId::Sleep, OptionId::Shutdown, OptionId::Reboot, OptionId::UpdateRestart]
        );
    }

    #[test]
    fn test_module_without_entry_has_no_options() {
        let registry = ModuleRegistry::from_config(&ModulesConfig::default());
        assert!(registry.options(0).is_empty());
        assert!(registry.options(99).is_empty(), "out of range index is empty too");
        assert!(registry.options_of(&ModuleId::Gps).is_empty());
        assert_eq!(registry.options_of(&ModuleId::Power).len(), 4);
    }

    #[test]
    fn test_unknown_names_are_kept() {
        let config = ModulesConfig {
            order: vec!["radar".to_string(), "GPS".to_string()],
            options: Default::default(),
        };
        let registry = ModuleRegistry::from_config(&config);
        assert_eq!(registry.module(0), Some(&ModuleId::Unknown("radar".to_string())));
        assert_eq!(registry.module(1), Some(&ModuleId::Gps), "names are case-insensitive");
        assert_eq!(registry.module(0).map(ModuleId::icon), Some(Icon::Unknown));
    }

    #[test]
    fn test_options_key_matches_case_insensitively() {
        let config = ModulesConfig {
            order: vec!["Power".to_string()],
            options: [("power".to_string(), vec!["reboot".to_string()])].into_iter().collect(),
        };
        let registry = ModuleRegistry::from_config(&config);
        assert_eq!(registry.module(0), Some(&ModuleId::Power));
        assert_eq!(registry.options(0), [OptionId::Reboot]);

        let config = ModulesConfig {
            order: vec!["power".to_string()],
            options: [(" POWER ".to_string(), vec!["sleep".to_string()])].into_iter().collect(),
        };
        assert_eq!(ModuleRegistry::from_config(&config).options(0), [OptionId::Sleep]);
    }

    #[test]
    fn test_cadence_membership() {
        assert!(ModuleId::Gps.uses_position());
        assert!(ModuleId::Cockpit.uses_position());
        assert!(!ModuleId::Temperature.uses_position());
        assert!(ModuleId::Accelerometer.uses_motion());
        assert!(!ModuleId::Gps.uses_motion());
    }
}
