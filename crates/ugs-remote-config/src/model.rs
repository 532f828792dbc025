//! Remote Config settings types

use crate::error::{RemoteConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ugs_core::Resource;

/// Config type of the settings written by the CLI
pub const SETTINGS_CONFIG_TYPE: &str = "settings";

/// Value type of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    #[serde(alias = "STRING")]
    String,
    #[serde(alias = "INT")]
    Int,
    #[serde(alias = "FLOAT")]
    Float,
    #[serde(alias = "BOOL")]
    Bool,
    #[serde(alias = "LONG")]
    Long,
    #[serde(alias = "JSON")]
    Json,
}

impl ConfigType {
    /// Type a value gets when the file does not declare one
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Bool(_) => ConfigType::Bool,
            Value::Number(n) => match n.as_i64() {
                Some(i) if i32::try_from(i).is_ok() => ConfigType::Int,
                Some(_) => ConfigType::Long,
                None => ConfigType::Float,
            },
            Value::String(_) => ConfigType::String,
            Value::Null | Value::Array(_) | Value::Object(_) => ConfigType::Json,
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ConfigType::String => value.is_string(),
            ConfigType::Int => integral(value).is_some_and(|i| i32::try_from(i).is_ok()),
            ConfigType::Long => integral(value).is_some() || value.is_u64(),
            ConfigType::Float => value.is_number(),
            ConfigType::Bool => value.is_boolean(),
            ConfigType::Json => value.is_object() || value.is_array() || value.is_null(),
        }
    }

    /// `value` in the canonical form of this type, so `3` and `3.0` compare
    /// equal as a float and `7.0` equals `7` as an integer.
    pub fn normalize(&self, value: &Value) -> Value {
        let normalized = match self {
            ConfigType::Float => value.as_f64().map(Value::from),
            ConfigType::Int | ConfigType::Long => integral(value).map(Value::from),
            _ => None,
        };
        normalized.unwrap_or_else(|| value.clone())
    }
}

fn integral(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

impl FromStr for ConfigType {
    type Err = RemoteConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(ConfigType::String),
            "int" => Ok(ConfigType::Int),
            "float" => Ok(ConfigType::Float),
            "bool" => Ok(ConfigType::Bool),
            "long" => Ok(ConfigType::Long),
            "json" => Ok(ConfigType::Json),
            _ => Err(RemoteConfigError::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigType::String => "STRING",
            ConfigType::Int => "INT",
            ConfigType::Float => "FLOAT",
            ConfigType::Bool => "BOOL",
            ConfigType::Long => "LONG",
            ConfigType::Json => "JSON",
        };
        f.write_str(name)
    }
}

/// A single setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    #[serde(rename = "type")]
    pub config_type: ConfigType,
    pub value: Value,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, config_type: ConfigType, value: Value) -> Self {
        Self {
            key: key.into(),
            config_type,
            value,
        }
    }
}

impl Resource for ConfigEntry {
    type Content = (ConfigType, Value);

    fn key(&self) -> String {
        self.key.clone()
    }

    fn content(&self) -> (ConfigType, Value) {
        (self.config_type, self.config_type.normalize(&self.value))
    }
}

/// Contents of a `.rc` file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RcFile {
    #[serde(default)]
    pub entries: serde_json::Map<String, Value>,
    #[serde(default)]
    pub types: BTreeMap<String, String>,
}

impl RcFile {
    /// Entries of the file sorted by key, each checked against its declared type
    pub fn into_entries(self) -> Vec<(String, Result<ConfigEntry>)> {
        let RcFile { entries, types } = self;
        let mut entries: Vec<(String, Value)> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
            .into_iter()
            .map(|(key, value)| {
                let entry = entry_for(&key, value, types.get(&key).map(String::as_str));
                (key, entry)
            })
            .collect()
    }
}

fn entry_for(key: &str, value: Value, declared: Option<&str>) -> Result<ConfigEntry> {
    let config_type = match declared {
        Some(declared) => declared.parse::<ConfigType>()?,
        None => ConfigType::infer(&value),
    };
    if !config_type.accepts(&value) {
        return Err(RemoteConfigError::TypeMismatch {
            key: key.to_string(),
            declared: config_type.to_string(),
            actual: ConfigType::infer(&value).to_string(),
        });
    }
    Ok(ConfigEntry::new(key, config_type, value))
}

/// Remote config document holding the settings of an environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub config_type: String,
    #[serde(default)]
    pub value: Vec<ConfigEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfigList {
    #[serde(default)]
    pub configs: Vec<SettingsConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateConfigBody<'a> {
    #[serde(rename = "type")]
    pub config_type: &'static str,
    pub environment_id: &'a str,
    pub value: &'a [ConfigEntry],
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateConfigBody<'a> {
    #[serde(rename = "type")]
    pub config_type: &'static str,
    pub value: &'a [ConfigEntry],
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateConfigResponse {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ugs_core::{DeploymentItem, reconcile};

    #[test]
    fn test_infer() {
        assert_eq!(ConfigType::infer(&json!(true)), ConfigType::Bool);
        assert_eq!(ConfigType::infer(&json!(12)), ConfigType::Int);
        assert_eq!(ConfigType::infer(&json!(5_000_000_000i64)), ConfigType::Long);
        assert_eq!(ConfigType::infer(&json!(1.5)), ConfigType::Float);
        assert_eq!(ConfigType::infer(&json!("hi")), ConfigType::String);
        assert_eq!(ConfigType::infer(&json!({"a": 1})), ConfigType::Json);
        assert_eq!(ConfigType::infer(&json!(null)), ConfigType::Json);
    }

    #[test]
    fn test_untyped_null_loads_as_json() {
        let file: RcFile = serde_json::from_value(json!({
            "entries": {"unset": null, "typed": null},
            "types": {"typed": "STRING"}
        }))
        .unwrap();

        let entries = file.into_entries();
        assert_eq!(entries[1].0, "unset");
        let unset = entries[1].1.as_ref().unwrap();
        assert_eq!(unset.config_type, ConfigType::Json);
        assert!(unset.value.is_null());
        assert!(matches!(
            entries[0].1,
            Err(RemoteConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_numbers_compare_by_declared_type() {
        let local = vec![
            DeploymentItem::loaded(ConfigEntry::new("volume", ConfigType::Float, json!(3)), "a.rc"),
            DeploymentItem::loaded(ConfigEntry::new("lives", ConfigType::Int, json!(7.0)), "a.rc"),
            DeploymentItem::loaded(ConfigEntry::new("speed", ConfigType::Float, json!(1.5)), "a.rc"),
        ];
        let remote = vec![
            ConfigEntry::new("volume", ConfigType::Float, json!(3.0)),
            ConfigEntry::new("lives", ConfigType::Int, json!(7)),
            ConfigEntry::new("speed", ConfigType::Float, json!(2)),
        ];

        let result = reconcile(local, remote, false, true);

        let unchanged: Vec<_> = result.unchanged.iter().map(|i| i.name()).collect();
        let updated: Vec<_> = result.updated.iter().map(|i| i.name()).collect();
        assert_eq!(unchanged, vec!["volume", "lives"]);
        assert_eq!(updated, vec!["speed"]);
    }

    #[test]
    fn test_file_entries_use_declared_types() {
        let file: RcFile = serde_json::from_value(json!({
            "$schema": "https://example.com/remote-config.schema.json",
            "entries": {"volume": 3, "difficulty": "hard", "speed": "fast"},
            "types": {"volume": "FLOAT", "speed": "INT"}
        }))
        .unwrap();

        let entries = file.into_entries();
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["difficulty", "speed", "volume"]);

        let volume = entries[2].1.as_ref().unwrap();
        assert_eq!(volume.config_type, ConfigType::Float);
        assert!(matches!(
            entries[1].1,
            Err(RemoteConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_wire_shape() {
        let entry = ConfigEntry::new("volume", ConfigType::Float, json!(0.5));
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"key": "volume", "type": "float", "value": 0.5})
        );

        let parsed: ConfigEntry =
            serde_json::from_value(json!({"key": "on", "type": "BOOL", "value": true})).unwrap();
        assert_eq!(parsed.config_type, ConfigType::Bool);
    }
}
