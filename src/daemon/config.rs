//! `gebaard.toml` loading.
//!
//! ```toml
//! [[swipe.commands]]
//! fingers = 3
//! left = "xdotool key super+Right"
//! right = "xdotool key super+Left"
//!
//! [swipe.settings]
//! threshold = 0.5
//!
//! [pinch.commands.two]
//! in = "xdotool key ctrl+minus"
//! out = "xdotool key ctrl+plus"
//!
//! [input]
//! family = "auto"
//! ```

use std::{
    collections::BTreeMap,
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use log::warn;
use serde::Deserialize;
use thiserror::Error;

use super::CommandResolver;
use crate::gesture::{
    Direction, EventFamily, FamilySelection, PinchKind, PinchSettings, SwipeSettings,
    TrackerSettings,
};

/// Location below the XDG config directory.
pub const CONFIG_RELATIVE_PATH: &str = "gebaar/gebaard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing [[swipe.commands]] table array")]
    MissingSwipeCommands,
    #[error("{key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
    #[error("cannot locate config: neither XDG_CONFIG_HOME nor HOME is set")]
    NoConfigPath,
}

/// `$XDG_CONFIG_HOME/gebaar/gebaard.toml`, else `$HOME/.config/gebaar/gebaard.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    config_path_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

pub fn config_path_from(
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf, ConfigError> {
    let non_empty = |value: Option<OsString>| value.filter(|v| !v.is_empty());

    if let Some(base) = non_empty(xdg_config_home) {
        return Ok(PathBuf::from(base).join(CONFIG_RELATIVE_PATH));
    }
    if let Some(home) = non_empty(home) {
        return Ok(PathBuf::from(home)
            .join(".config")
            .join(CONFIG_RELATIVE_PATH));
    }
    Err(ConfigError::NoConfigPath)
}

/// Commands for one finger count. Missing directions run nothing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SwipeCommands {
    pub fingers: u32,
    #[serde(default)]
    pub left_up: String,
    #[serde(default)]
    pub up: String,
    #[serde(default)]
    pub right_up: String,
    #[serde(default)]
    pub left: String,
    #[serde(default)]
    pub right: String,
    #[serde(default)]
    pub left_down: String,
    #[serde(default)]
    pub down: String,
    #[serde(default)]
    pub right_down: String,
}

impl SwipeCommands {
    pub fn command(&self, direction: Direction) -> Option<&str> {
        let command = match direction {
            Direction::LeftUp => &self.left_up,
            Direction::Up => &self.up,
            Direction::RightUp => &self.right_up,
            Direction::Left => &self.left,
            Direction::Center => return None,
            Direction::Right => &self.right,
            Direction::LeftDown => &self.left_down,
            Direction::Down => &self.down,
            Direction::RightDown => &self.right_down,
        };
        Some(command)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    swipe: Option<RawSwipe>,
    #[serde(default)]
    pinch: RawPinch,
    #[serde(default)]
    input: RawInput,
}

#[derive(Debug, Deserialize)]
struct RawSwipe {
    commands: Option<Vec<SwipeCommands>>,
    #[serde(default)]
    settings: RawSwipeSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSwipeSettings {
    threshold: f64,
    one_shot: bool,
    trigger_on_release: bool,
}

impl Default for RawSwipeSettings {
    fn default() -> Self {
        let defaults = SwipeSettings::default();
        Self {
            threshold: defaults.threshold,
            one_shot: defaults.one_shot,
            trigger_on_release: defaults.trigger_on_release,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawPinch {
    #[serde(default)]
    commands: RawPinchCommands,
    #[serde(default)]
    settings: RawPinchSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawPinchCommands {
    #[serde(default)]
    two: RawPinchPair,
}

#[derive(Debug, Default, Deserialize)]
struct RawPinchPair {
    #[serde(default, rename = "in")]
    pinch_in: String,
    #[serde(default, rename = "out")]
    pinch_out: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawPinchSettings {
    threshold: f64,
    one_shot: bool,
}

impl Default for RawPinchSettings {
    fn default() -> Self {
        let defaults = PinchSettings::default();
        Self {
            threshold: defaults.threshold,
            one_shot: defaults.one_shot,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawInput {
    #[serde(default)]
    family: FamilyKey,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum FamilyKey {
    #[default]
    Auto,
    Gesture,
    Touch,
}

impl From<FamilyKey> for FamilySelection {
    fn from(key: FamilyKey) -> Self {
        match key {
            FamilyKey::Auto => Self::Auto,
            FamilyKey::Gesture => Self::Fixed(EventFamily::Gesture),
            FamilyKey::Touch => Self::Fixed(EventFamily::Touch),
        }
    }
}

/// Validated daemon configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureConfig {
    swipe_commands: BTreeMap<u32, SwipeCommands>,
    /// Run when the scale grows; the file calls this `out`.
    grow_command: String,
    /// Run when the scale shrinks; the file calls this `in`.
    shrink_command: String,
    settings: TrackerSettings,
    family: FamilySelection,
}

impl GestureConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;

        let swipe = raw.swipe.ok_or(ConfigError::MissingSwipeCommands)?;
        let tables = swipe.commands.ok_or(ConfigError::MissingSwipeCommands)?;

        let mut swipe_commands = BTreeMap::new();
        for table in tables {
            if let Some(previous) = swipe_commands.insert(table.fingers, table) {
                warn!(
                    "config: duplicate swipe.commands for {} fingers, keeping the last",
                    previous.fingers
                );
            }
        }

        let settings = TrackerSettings {
            swipe: SwipeSettings {
                threshold: positive("swipe.settings.threshold", swipe.settings.threshold)?,
                one_shot: swipe.settings.one_shot,
                trigger_on_release: swipe.settings.trigger_on_release,
            },
            pinch: PinchSettings {
                threshold: positive("pinch.settings.threshold", raw.pinch.settings.threshold)?,
                one_shot: raw.pinch.settings.one_shot,
            },
        };

        Ok(Self {
            swipe_commands,
            grow_command: raw.pinch.commands.two.pinch_out,
            shrink_command: raw.pinch.commands.two.pinch_in,
            settings,
            family: raw.input.family.into(),
        })
    }

    pub fn family(&self) -> FamilySelection {
        self.family
    }

    pub fn swipe_commands(&self, fingers: u32) -> Option<&SwipeCommands> {
        self.swipe_commands.get(&fingers)
    }
}

fn positive(key: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidSetting {
            key,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}

impl CommandResolver for GestureConfig {
    fn resolve_swipe(&self, fingers: u32, direction: Direction) -> Option<String> {
        if fingers < 2 {
            return None;
        }
        self.swipe_commands(fingers)?
            .command(direction)
            .map(str::to_owned)
    }

    fn resolve_pinch(&self, kind: PinchKind) -> String {
        match kind {
            PinchKind::In => self.grow_command.clone(),
            PinchKind::Out => self.shrink_command.clone(),
        }
    }

    fn swipe_threshold(&self) -> f64 {
        self.settings.swipe.threshold
    }

    fn swipe_one_shot(&self) -> bool {
        self.settings.swipe.one_shot
    }

    fn swipe_trigger_on_release(&self) -> bool {
        self.settings.swipe.trigger_on_release
    }

    fn pinch_threshold(&self) -> f64 {
        self.settings.pinch.threshold
    }

    fn pinch_one_shot(&self) -> bool {
        self.settings.pinch.one_shot
    }

    fn tracker_settings(&self) -> TrackerSettings {
        self.settings
    }
}
