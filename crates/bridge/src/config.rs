//! Bridge configuration: YAML file, then command-line overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use padlink_hid_xbox_protocol::{Control, KeyMap, PlayerSlot};
use serde::Deserialize;

use crate::error::BridgeError;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/keys.sock";
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 1_000;

/// On-disk configuration.
///
/// ```yaml
/// socket_path: /tmp/keys.sock
/// read_timeout_ms: 60000
/// player: 2
/// keys:
///   a: "j"
///   guide: "0"
///   reserved: ""   # unbind
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BridgeConfig {
    pub socket_path: PathBuf,
    pub read_timeout_ms: u64,
    pub drain_timeout_ms: u64,
    pub player: u8,
    /// Overrides on top of the default key map; an empty string unbinds.
    pub keys: BTreeMap<Control, String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            drain_timeout_ms: DEFAULT_DRAIN_TIMEOUT_MS,
            player: 1,
            keys: BTreeMap::new(),
        }
    }
}

impl BridgeConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, BridgeError> {
        let config: BridgeConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if PlayerSlot::from_number(self.player).is_none() {
            return Err(BridgeError::InvalidConfiguration(format!(
                "player must be 1-4, got {}",
                self.player
            )));
        }
        if self.read_timeout_ms == 0 || self.drain_timeout_ms == 0 {
            return Err(BridgeError::InvalidConfiguration(
                "timeouts must be non-zero".to_string(),
            ));
        }
        self.keymap().map(|_| ())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn player_slot(&self) -> Result<PlayerSlot, BridgeError> {
        PlayerSlot::from_number(self.player).ok_or_else(|| {
            BridgeError::InvalidConfiguration(format!("player must be 1-4, got {}", self.player))
        })
    }

    /// Default key map with the configured overrides applied.
    pub fn keymap(&self) -> Result<KeyMap, BridgeError> {
        let mut keymap = KeyMap::default();
        for (control, key) in &self.keys {
            match key.as_bytes() {
                [] => {
                    keymap.unbind(*control);
                }
                [byte] if byte.is_ascii() => {
                    keymap.bind(*control, *byte);
                }
                _ => {
                    return Err(BridgeError::InvalidConfiguration(format!(
                        "key for {control} must be a single ASCII character, got {key:?}"
                    )));
                }
            }
        }
        Ok(keymap)
    }
}
