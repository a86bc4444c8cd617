use crate::core::candidates::DEFAULT_SUFFIXES;
use crate::utils::error::{FunnelError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 預設防抖間隔(毫秒)
pub const DEFAULT_DEBOUNCE_MS: u64 = 450;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub domain_search: DomainSearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainSearchConfig {
    pub debounce_ms: Option<u64>,
    pub suffixes: Option<Vec<String>>,
}

impl FunnelConfig {
    /// 從 TOML 檔案載入配置,載入後立即驗證
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FunnelConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            backend: BackendConfig {
                base_url: base_url.to_string(),
                timeout_seconds: None,
            },
            domain_search: DomainSearchConfig::default(),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.domain_search.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
    }

    pub fn suffixes(&self) -> Vec<String> {
        self.domain_search
            .suffixes
            .clone()
            .unwrap_or_else(|| DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect())
    }
}

impl Validate for FunnelConfig {
    fn validate(&self) -> Result<()> {
        validate_url("backend.base_url", &self.backend.base_url)?;

        if let Some(timeout) = self.backend.timeout_seconds {
            validate_range("backend.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(debounce) = self.domain_search.debounce_ms {
            validate_range("domain_search.debounce_ms", debounce, 0, 10_000)?;
        }

        if let Some(suffixes) = &self.domain_search.suffixes {
            if suffixes.is_empty() {
                return Err(FunnelError::InvalidConfigValueError {
                    field: "domain_search.suffixes".to_string(),
                    value: "[]".to_string(),
                    reason: "At least one suffix is required".to_string(),
                });
            }
            for suffix in suffixes {
                if !suffix.starts_with('.') || suffix.len() < 2 {
                    return Err(FunnelError::InvalidConfigValueError {
                        field: "domain_search.suffixes".to_string(),
                        value: suffix.clone(),
                        reason: "Suffixes must start with '.' followed by a TLD".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
