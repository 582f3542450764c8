//! Bootstrap config loader.
//!
//! Reads the fleet-provided `server.json` file from the process's home
//! directory once, at host startup, and exposes the immutable
//! [`ServerConfig`] every other component depends on.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Bootstrap identity and ports, as read from `server.json`.
///
/// Invariant: once loaded successfully, never mutated. A failed load
/// yields a `ServerConfig` with all numeric fields zero and all strings
/// empty; callers must treat a zero `server_id`/`query_port` as "no
/// valid bootstrap" rather than inspecting the error directly (the
/// loader never raises to the caller).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerConfig {
    pub server_id: i64,
    pub allocation_id: String,
    pub query_port: u16,
    pub game_port: u16,
    pub server_log_dir: String,
}

impl ServerConfig {
    /// Whether this config resulted from a successful load.
    pub fn is_valid(&self) -> bool {
        self.server_id != 0 && self.query_port != 0
    }
}

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("failed to determine home directory")]
    NoHomeDir,
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} as JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is neither a JSON number nor a decimal string")]
    InvalidNumber { field: &'static str },
    #[error("port value {value} for `{field}` is out of range 0-65535")]
    InvalidPort { field: &'static str, value: i64 },
}

/// Load `server.json` from `$HOME/server.json`.
///
/// Never fails outwardly: a load error is logged via `tracing` and an
/// empty/zeroed [`ServerConfig`] is returned so the host can proceed
/// (the fleet sidecar may still answer health probes even without a
/// valid bootstrap).
pub fn load() -> ServerConfig {
    match home_dir() {
        Some(home) => load_from_path(&home.join("server.json")),
        None => {
            tracing::error!("could not determine home directory for server.json lookup");
            ServerConfig::default()
        }
    }
}

/// Load from an explicit path. Exposed for testing; `load()` is the
/// production entry point.
pub fn load_from_path(path: &Path) -> ServerConfig {
    match try_load_from_path(path) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, path = %path.display(), "failed to load bootstrap config");
            ServerConfig::default()
        }
    }
}

fn try_load_from_path(path: &Path) -> Result<ServerConfig, ServerConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ServerConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawServerConfig =
        serde_json::from_str(&text).map_err(|source| ServerConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    raw.into_config()
}

/// JSON shape of `server.json`. Numeric fields are captured as
/// `serde_json::Value` so both encodings (number or decimal string)
/// can be accepted; `RawServerConfig::into_config` does the validation.
#[derive(Debug, Deserialize)]
struct RawServerConfig {
    #[serde(rename = "serverID")]
    server_id: Option<Value>,
    #[serde(rename = "allocatedUUID")]
    allocated_uuid: Option<String>,
    #[serde(rename = "queryPort")]
    query_port: Option<Value>,
    port: Option<Value>,
    #[serde(rename = "serverLogDir")]
    server_log_dir: Option<String>,
}

impl RawServerConfig {
    fn into_config(self) -> Result<ServerConfig, ServerConfigError> {
        let server_id = parse_number(self.server_id.as_ref(), "serverID")?;
        let query_port_raw = parse_number(self.query_port.as_ref(), "queryPort")?;
        let game_port_raw = parse_number(self.port.as_ref(), "port")?;

        let allocation_id = self
            .allocated_uuid
            .ok_or(ServerConfigError::MissingField("allocatedUUID"))?;
        let server_log_dir = self
            .server_log_dir
            .ok_or(ServerConfigError::MissingField("serverLogDir"))?;

        let query_port = to_port(query_port_raw, "queryPort")?;
        let game_port = to_port(game_port_raw, "port")?;

        Ok(ServerConfig {
            server_id,
            allocation_id,
            query_port,
            game_port,
            server_log_dir,
        })
    }
}

/// Accept a JSON number or a decimal-string-encoded integer; any other
/// shape (missing, bool, float with fraction, non-decimal string) is a
/// parse failure for that field.
fn parse_number(value: Option<&Value>, field: &'static str) -> Result<i64, ServerConfigError> {
    let value = value.ok_or(ServerConfigError::MissingField(field))?;
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or(ServerConfigError::InvalidNumber { field }),
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| ServerConfigError::InvalidNumber { field }),
        _ => Err(ServerConfigError::InvalidNumber { field }),
    }
}

fn to_port(value: i64, field: &'static str) -> Result<u16, ServerConfigError> {
    u16::try_from(value).map_err(|_| ServerConfigError::InvalidPort { field, value })
}

#[cfg(not(windows))]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// On platforms with separate drive and path components (`HOMEDRIVE` +
/// `HOMEPATH`), concatenate them as the original source does. Not
/// exercised by this SDK's target hosts (Linux fleet containers); kept
/// for documentation parity with `spec.md` §4.1 — see DESIGN.md.
#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("HOME") {
        return Some(PathBuf::from(home));
    }
    let drive = std::env::var_os("HOMEDRIVE")?;
    let path = std::env::var_os("HOMEPATH")?;
    let mut combined = PathBuf::from(drive);
    combined.push(path);
    Some(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::TempPath {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.into_temp_path()
    }

    #[test]
    fn dual_schema_number_form() {
        let path = write_temp(
            r#"{"serverID":12345, "allocatedUUID":"AAAAAAAA-BBBB-CCCC-DDDDD-EEEEEEEEEEEE", "queryPort":7778, "port":7777, "serverLogDir":"/home"}"#,
        );
        let config = load_from_path(&path);
        assert_eq!(config.server_id, 12345);
        assert_eq!(config.allocation_id, "AAAAAAAA-BBBB-CCCC-DDDDD-EEEEEEEEEEEE");
        assert_eq!(config.query_port, 7778);
        assert_eq!(config.game_port, 7777);
        assert_eq!(config.server_log_dir, "/home");
    }

    #[test]
    fn dual_schema_string_form_matches_number_form() {
        let path = write_temp(
            r#"{"serverID":"12345","allocatedUUID":"X","queryPort":"7778","port":"7777","serverLogDir":"/home"}"#,
        );
        let config = load_from_path(&path);
        assert_eq!(
            config,
            ServerConfig {
                server_id: 12345,
                allocation_id: "X".to_owned(),
                query_port: 7778,
                game_port: 7777,
                server_log_dir: "/home".to_owned(),
            }
        );
    }

    #[test]
    fn missing_allocated_uuid_yields_zero_config() {
        let path = write_temp(r#"{"serverID":1,"queryPort":2,"port":3,"serverLogDir":"/home"}"#);
        let config = load_from_path(&path);
        assert_eq!(config, ServerConfig::default());
        assert!(!config.is_valid());
    }

    #[test]
    fn out_of_range_port_yields_zero_config() {
        let path = write_temp(
            r#"{"serverID":1,"allocatedUUID":"X","queryPort":70000,"port":3,"serverLogDir":"/home"}"#,
        );
        let config = load_from_path(&path);
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn malformed_json_yields_zero_config() {
        let path = write_temp("{not json");
        let config = load_from_path(&path);
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn missing_file_yields_zero_config() {
        let config = load_from_path(Path::new("/nonexistent/server.json"));
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn non_decimal_string_number_is_rejected() {
        let path = write_temp(
            r#"{"serverID":"not-a-number","allocatedUUID":"X","queryPort":1,"port":2,"serverLogDir":"/home"}"#,
        );
        let config = load_from_path(&path);
        assert_eq!(config, ServerConfig::default());
    }
}
