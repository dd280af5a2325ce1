use crate::core::aggregate::ReportSettings;
use crate::core::ConfigProvider;
use crate::domain::taxonomy::DEFAULT_TECH_INDUSTRIES;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const LOG_FORMATS: &[&str] = &["compact", "json"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub location: String,
    pub page_size: usize,
    pub request_delay_ms: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub timeout_seconds: Option<u64>,
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
    /// Extra request headers, applied over the defaults above.
    pub headers: BTreeMap<String, String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://startupbase.uz/api/startups/".to_string(),
            location: "all".to_string(),
            page_size: 8,
            request_delay_ms: 500,
            retry_attempts: 0,
            retry_delay_ms: 1000,
            timeout_seconds: None,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "en".to_string(),
            referer: "https://startupbase.uz/en/startups".to_string(),
            headers: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub csv_file: String,
    pub json_file: String,
    pub charts_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: ".".to_string(),
            csv_file: "startups_data.csv".to_string(),
            json_file: "startups_data.json".to_string(),
            charts_dir: "charts".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_industries: usize,
    pub top_regions: usize,
    pub heatmap_industries: usize,
    pub maturity_min_samples: usize,
    pub maturity_top: usize,
    pub growth_top: usize,
    pub tech_industries: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let settings = ReportSettings::default();
        Self {
            top_industries: settings.top_industries,
            top_regions: settings.top_regions,
            heatmap_industries: settings.heatmap_industries,
            maturity_min_samples: settings.maturity_min_samples,
            maturity_top: settings.maturity_top,
            growth_top: settings.growth_top,
            tech_industries: DEFAULT_TECH_INDUSTRIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ReportConfig {
    pub fn settings(&self) -> ReportSettings {
        ReportSettings {
            top_industries: self.top_industries,
            top_regions: self.top_regions,
            heatmap_industries: self.heatmap_industries,
            maturity_min_samples: self.maturity_min_samples,
            maturity_top: self.maturity_top,
            growth_top: self.growth_top,
            tech_industries: self.tech_industries.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
            verbose: false,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})；未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.base_url", &self.source.base_url)?;
        validation::validate_positive_number("source.page_size", self.source.page_size, 1)?;
        validation::validate_non_empty_string("source.location", &self.source.location)?;
        validation::validate_non_empty_string("source.user_agent", &self.source.user_agent)?;

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_path("output.csv_file", &self.output.csv_file)?;
        validation::validate_path("output.json_file", &self.output.json_file)?;
        validation::validate_path("output.charts_dir", &self.output.charts_dir)?;

        validation::validate_positive_number(
            "report.maturity_min_samples",
            self.report.maturity_min_samples,
            1,
        )?;

        validation::validate_one_of("logging.format", &self.logging.format, LOG_FORMATS)?;

        Ok(())
    }

    pub fn log_json(&self) -> bool {
        self.logging.format == "json"
    }
}

impl ConfigProvider for AppConfig {
    fn base_url(&self) -> &str {
        &self.source.base_url
    }

    fn location(&self) -> &str {
        &self.source.location
    }

    fn page_size(&self) -> usize {
        self.source.page_size
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.source.request_delay_ms)
    }

    fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.source.retry_delay_ms)
    }

    fn csv_file(&self) -> &str {
        &self.output.csv_file
    }

    fn json_file(&self) -> &str {
        &self.output.json_file
    }

    fn charts_dir(&self) -> &str {
        &self.output.charts_dir
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
