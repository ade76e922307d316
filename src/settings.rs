use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Client-tunable constants: corporation-tax rates used by the Format5 tax
/// table and the date format applied to rendered date cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_rate")]
    pub small_profits_rate: f64,
    #[serde(default = "default_rate")]
    pub main_rate: f64,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_rate() -> f64 {
    0.25
}

fn default_date_format() -> String {
    "dd-mm-yyyy".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            small_profits_rate: default_rate(),
            main_rate: default_rate(),
            date_format: default_date_format(),
        }
    }
}

/// Profits under this threshold are charged at the small-profits rate.
pub const SMALL_PROFITS_THRESHOLD: f64 = 50_000.0;

impl Settings {
    /// Corporation-tax charge on a profit figure. Losses carry no charge.
    pub fn ct_charge(&self, profit: f64) -> f64 {
        if profit < 0.0 {
            0.0
        } else if profit < SMALL_PROFITS_THRESHOLD {
            profit * self.small_profits_rate
        } else {
            profit * self.main_rate
        }
    }
}

fn settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("maprep")
        .join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.small_profits_rate, 0.25);
        assert_eq!(s.main_rate, 0.25);
        assert_eq!(s.date_format, "dd-mm-yyyy");
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let s: Settings = serde_json::from_str(r#"{"main_rate": 0.265}"#).unwrap();
        assert_eq!(s.main_rate, 0.265);
        assert_eq!(s.small_profits_rate, 0.25);
        assert_eq!(s.date_format, "dd-mm-yyyy");
    }

    #[test]
    fn test_ct_charge_bands() {
        let s = Settings {
            small_profits_rate: 0.19,
            main_rate: 0.265,
            date_format: default_date_format(),
        };
        assert_eq!(s.ct_charge(-1000.0), 0.0);
        assert_eq!(s.ct_charge(40_000.0), 40_000.0 * 0.19);
        assert_eq!(s.ct_charge(60_000.0), 60_000.0 * 0.265);
    }
}
