//! Command implementations

pub mod apply;
pub mod diff;
pub mod facts;
pub mod resources;

use std::fs;
use std::path::{Path as FsPath, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use declarative::{Device, DeviceError, MemoryDevice, Operation, Path};
use restconf::RestconfClient;
use serde_json::Value;

use crate::cli::{ConnectionArgs, OutputFormat};
use crate::config::Config;

/// The device a command works against
pub enum Session {
    /// A switch reached over RESTCONF
    Live { client: RestconfClient, host: String },
    /// A JSON snapshot of the `data` tree loaded into memory
    Offline { device: MemoryDevice, path: PathBuf },
}

impl Session {
    /// Open the snapshot given by `--offline`, or connect to the configured switch
    pub fn open(config: &Config, args: &ConnectionArgs) -> Result<Self> {
        if let Some(path) = &args.offline {
            return Self::offline(path);
        }

        let connection = config.connection(args)?;
        let host = connection.host.clone();
        let client = RestconfClient::new(connection)
            .with_context(|| format!("Could not set up a session with {host}"))?
            .with_retry_config(config.retry.to_retry_config());
        log::info!("Session with {host} ready");
        Ok(Self::Live { client, host })
    }

    fn offline(path: &FsPath) -> Result<Self> {
        let device = if path.exists() {
            let content =
                fs::read_to_string(path).with_context(|| format!("Could not read snapshot {}", path.display()))?;
            let tree: Value = serde_json::from_str(&content)
                .with_context(|| format!("Invalid snapshot {}", path.display()))?;
            MemoryDevice::from_tree(tree)
        } else {
            log::info!("Snapshot {} does not exist yet, starting empty", path.display());
            MemoryDevice::new()
        };
        Ok(Self::Offline {
            device,
            path: path.to_path_buf(),
        })
    }

    /// Short label for headers
    pub fn describe(&self) -> String {
        match self {
            Self::Live { host, .. } => host.clone(),
            Self::Offline { path, .. } => format!("{} (offline)", path.display()),
        }
    }

    /// Write the offline tree back to its snapshot file
    pub fn save(&self) -> Result<Option<&FsPath>> {
        match self {
            Self::Live { .. } => Ok(None),
            Self::Offline { device, path } => {
                let content = serde_json::to_string_pretty(device.tree())?;
                fs::write(path, content + "\n")
                    .with_context(|| format!("Could not write snapshot {}", path.display()))?;
                Ok(Some(path))
            }
        }
    }
}

impl Device for Session {
    fn get(&mut self, path: &Path) -> std::result::Result<Option<Value>, DeviceError> {
        match self {
            Self::Live { client, .. } => client.get(path),
            Self::Offline { device, .. } => device.get(path),
        }
    }

    fn send(&mut self, op: &Operation) -> std::result::Result<u16, DeviceError> {
        match self {
            Self::Live { client, .. } => client.send(op),
            Self::Offline { device, .. } => device.send(op),
        }
    }
}

/// Render a value in the requested output format
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_offline_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let args = ConnectionArgs {
            offline: Some(path.clone()),
            ..ConnectionArgs::default()
        };

        let mut session = Session::open(&Config::default(), &args).unwrap();
        assert!(session.describe().ends_with("(offline)"));
        let op = Operation::patch(
            Path::parse("data/openconfig-qos:qos/pfc-watchdog/poll/config/poll-interval").unwrap(),
            json!(150),
        );
        assert_eq!(session.send(&op).unwrap(), 204);
        assert_eq!(session.save().unwrap(), Some(path.as_path()));

        let mut reopened = Session::open(&Config::default(), &args).unwrap();
        let body = reopened
            .get(&Path::parse("data/openconfig-qos:qos/pfc-watchdog").unwrap())
            .unwrap();
        assert_eq!(body, Some(json!({"openconfig-qos:pfc-watchdog": {"poll": {"config": {"poll-interval": 150}}}})));
    }

    #[test]
    fn test_live_requires_host() {
        assert!(Session::open(&Config::default(), &ConnectionArgs::default()).is_err());
    }

    #[test]
    fn test_render() {
        let value = json!({"poll_interval": 150});
        assert_eq!(render(&value, OutputFormat::Yaml).unwrap(), "poll_interval: 150\n");
        assert_eq!(render(&value, OutputFormat::Json).unwrap(), "{\n  \"poll_interval\": 150\n}\n");
    }
}
