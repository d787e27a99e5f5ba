//! Resolve CLI flags and/or a JSON config file into one immutable `Config`.
//!
//! The config file, when given, replaces flag-supplied values wholesale;
//! flags only apply when no file is named.

use crate::error::Error;
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

/// Default update period in service mode.
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Canonical parameters for one run. Constructed once at process start and
/// read-only thereafter.
#[derive(Debug, Clone)]
pub struct Config {
    pub subscription_id: String,
    pub resource_group: String,
    pub zone_name: String,
    pub record_name: String,

    /// Explicit service-principal triple; any empty field means ambient
    /// environment credentials are used instead.
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,

    pub as_service: bool,
    pub interval: Duration,
}

/*──────── JSON config file ────────*/

/// On-disk form: PascalCase keys, every field optional, unknown keys
/// ignored. A missing `Interval` falls back to the 300s default.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct FileConfig {
    subscription_id: String,
    resource_group: String,
    zone_name: String,
    record_name: String,
    client_id: String,
    client_secret: String,
    tenant_id: String,
    service: bool,
    interval: Option<u64>,
}

impl From<FileConfig> for Config {
    fn from(f: FileConfig) -> Self {
        Self {
            subscription_id: f.subscription_id,
            resource_group: f.resource_group,
            zone_name: f.zone_name,
            record_name: f.record_name,
            client_id: f.client_id,
            client_secret: f.client_secret,
            tenant_id: f.tenant_id,
            as_service: f.service,
            interval: Duration::from_secs(f.interval.unwrap_or(DEFAULT_INTERVAL_SECS)),
        }
    }
}

impl Config {
    /// Load the configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file `{}`: {e}", path.display()))
        })?;
        let file: FileConfig = serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!("malformed config file `{}`: {e}", path.display()))
        })?;
        Ok(file.into())
    }

    /// Check required fields before any network activity.
    pub fn validate(&self) -> Result<(), Error> {
        for (flag, value) in [
            ("subscription-id", &self.subscription_id),
            ("resource-group", &self.resource_group),
            ("zone", &self.zone_name),
            ("record", &self.record_name),
        ] {
            if value.is_empty() {
                return Err(Error::Config(format!("required option `--{flag}` is empty")));
            }
        }
        if self.as_service && self.interval.is_zero() {
            return Err(Error::Config(
                "service interval must be a positive number of seconds".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid() -> Config {
        Config {
            subscription_id: "s".into(),
            resource_group: "rg".into(),
            zone_name: "z.example.com".into(),
            record_name: "home".into(),
            client_id: String::new(),
            client_secret: String::new(),
            tenant_id: String::new(),
            as_service: false,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
        }
    }

    #[test]
    fn file_fields_are_pascal_case() {
        let raw = r#"{
            "SubscriptionId": "s",
            "ResourceGroup": "rg",
            "ZoneName": "z.example.com",
            "RecordName": "home",
            "ClientId": "cid",
            "ClientSecret": "sec",
            "TenantId": "tid",
            "Service": true,
            "Interval": 60
        }"#;
        let cfg: Config = serde_json::from_str::<FileConfig>(raw).unwrap().into();
        assert_eq!(cfg.subscription_id, "s");
        assert_eq!(cfg.zone_name, "z.example.com");
        assert_eq!(cfg.client_secret, "sec");
        assert!(cfg.as_service);
        assert_eq!(cfg.interval, Duration::from_secs(60));
    }

    #[test]
    fn unknown_fields_ignored_and_missing_default() {
        let raw = r#"{"ZoneName": "z", "SomeFutureKnob": 42}"#;
        let cfg: Config = serde_json::from_str::<FileConfig>(raw).unwrap().into();
        assert_eq!(cfg.zone_name, "z");
        assert!(cfg.subscription_id.is_empty());
        assert!(!cfg.as_service);
        assert_eq!(cfg.interval, Duration::from_secs(DEFAULT_INTERVAL_SECS));
    }

    #[test]
    fn from_file_round_trip() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{"SubscriptionId":"s","ResourceGroup":"rg","ZoneName":"z","RecordName":"r"}}"#
        )
        .unwrap();
        let cfg = Config::from_file(f.path()).unwrap();
        assert_eq!(cfg.resource_group, "rg");
        cfg.validate().unwrap();
    }

    #[test]
    fn from_file_reports_missing_and_malformed() {
        assert!(matches!(
            Config::from_file("/nonexistent/azure-dyndns.json"),
            Err(Error::Config(_))
        ));

        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();
        assert!(matches!(Config::from_file(f.path()), Err(Error::Config(_))));
    }

    #[test]
    fn validate_rejects_empty_required_fields() {
        for field in ["subscription_id", "resource_group", "zone_name", "record_name"] {
            let mut cfg = valid();
            match field {
                "subscription_id" => cfg.subscription_id.clear(),
                "resource_group" => cfg.resource_group.clear(),
                "zone_name" => cfg.zone_name.clear(),
                _ => cfg.record_name.clear(),
            }
            assert!(matches!(cfg.validate(), Err(Error::Config(_))), "{field}");
        }
    }

    #[test]
    fn validate_requires_positive_interval_in_service_mode() {
        let mut cfg = valid();
        cfg.as_service = true;
        cfg.interval = Duration::ZERO;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));

        cfg.interval = Duration::from_secs(1);
        cfg.validate().unwrap();

        // one-shot mode does not care about the interval
        let mut cfg = valid();
        cfg.interval = Duration::ZERO;
        cfg.validate().unwrap();
    }
}
