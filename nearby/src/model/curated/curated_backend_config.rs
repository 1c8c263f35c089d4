use std::{path::Path, sync::Arc, time::Duration};

use nearby_core::model::DiscoveryError;
use serde::{Deserialize, Serialize};

use super::{CuratedBackend, MemoryCuratedBackend, RestCuratedBackend};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// selects and configures the curated places backend.
///
/// ```toml
/// [curated]
/// type = "rest"
/// url = "https://myproject.supabase.co"
/// api_key = "<anon key>"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CuratedBackendConfig {
    /// PostgREST endpoint. live changes come from the project's realtime
    /// websocket unless `realtime = false`
    Rest {
        url: String,
        api_key: String,
        table: Option<String>,
        page_size: Option<usize>,
        timeout_secs: Option<u64>,
        realtime: Option<bool>,
    },
    /// in-process table, optionally seeded from a JSON array of rows
    Memory { seed_file: Option<String> },
}

impl Default for CuratedBackendConfig {
    fn default() -> Self {
        CuratedBackendConfig::Memory { seed_file: None }
    }
}

impl CuratedBackendConfig {
    pub fn build(&self) -> Result<Arc<dyn CuratedBackend>, DiscoveryError> {
        match self {
            CuratedBackendConfig::Rest {
                url,
                api_key,
                table,
                page_size,
                timeout_secs,
                realtime,
            } => {
                if url.trim().is_empty() {
                    return Err(DiscoveryError::InvalidUserInput(String::from(
                        "curated backend url must not be empty",
                    )));
                }
                let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
                let backend =
                    RestCuratedBackend::new(url, api_key, table.clone(), *page_size, timeout)?
                        .with_realtime(realtime.unwrap_or(true));
                log::info!("using curated REST backend at {url}");
                Ok(Arc::new(backend))
            }
            CuratedBackendConfig::Memory { seed_file } => {
                let backend = match seed_file {
                    Some(f) => MemoryCuratedBackend::from_json_file(Path::new(f))?,
                    None => MemoryCuratedBackend::default(),
                };
                log::info!(
                    "using in-memory curated backend (seed file: {})",
                    seed_file.as_deref().unwrap_or("none")
                );
                Ok(Arc::new(backend))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialize_rest() {
        let json = serde_json::json!({
            "type": "rest",
            "url": "https://example.supabase.co",
            "api_key": "anon",
            "page_size": 250
        });
        let conf: CuratedBackendConfig = serde_json::from_value(json).unwrap();
        assert_eq!(
            conf,
            CuratedBackendConfig::Rest {
                url: String::from("https://example.supabase.co"),
                api_key: String::from("anon"),
                table: None,
                page_size: Some(250),
                timeout_secs: None,
                realtime: None,
            }
        );
        assert!(conf.build().is_ok());
    }

    #[test]
    fn test_empty_url_rejected() {
        let conf = CuratedBackendConfig::Rest {
            url: String::from(" "),
            api_key: String::from("anon"),
            table: None,
            page_size: None,
            timeout_secs: None,
            realtime: Some(false),
        };
        assert!(matches!(
            conf.build(),
            Err(DiscoveryError::InvalidUserInput(_))
        ));
    }

    #[test]
    fn test_missing_seed_file() {
        let conf = CuratedBackendConfig::Memory {
            seed_file: Some(String::from("/does/not/exist.json")),
        };
        assert!(conf.build().is_err());
    }
}
