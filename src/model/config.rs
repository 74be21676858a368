use serde::{Deserialize, Serialize};

/// Default API endpoint of a locally running DevSync backend
pub const DEFAULT_API_URL: &str = "http://localhost:10000";

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub list: ListConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_title")]
    pub title: String,
    /// File name used by `export` when no `--output` is given
    #[serde(default = "default_report_file")]
    pub file_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            title: default_report_title(),
            file_name: default_report_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Sort key used when `--sort` is omitted (name, tech, status)
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

impl Default for ListConfig {
    fn default() -> Self {
        ListConfig {
            default_sort: default_sort(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_report_title() -> String {
    "DevSync Project Report".to_string()
}

fn default_report_file() -> String {
    "DevSync_Project_Report.pdf".to_string()
}

fn default_sort() -> String {
    "name".to_string()
}
