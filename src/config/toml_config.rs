use crate::domain::model::TowTicket;
use crate::domain::money::{LineAmount, Money};
use crate::utils::error::{ConversionError, Result};
use crate::utils::validation::{validate_range, Validate};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Billing rate tables, loaded from an optional TOML file.
///
/// ```toml
/// [billing]
/// due_days = 30
///
/// [vendor]
/// tow_pilot = "$10.00"
/// intro_pilot = "$10.00"
/// five_pack = "$40.00"
///
/// [member.glider_hourly_rates]
/// "G1" = "$45.00"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateConfig {
    pub billing: BillingConfig,
    pub vendor: VendorRates,
    pub member: MemberRates,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BillingConfig {
    pub due_days: u32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self { due_days: 30 }
    }
}

/// 付給拖曳機飛行員與教官的固定費率
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VendorRates {
    pub tow_pilot: Money,
    pub intro_pilot: Money,
    pub five_pack: Money,
}

impl Default for VendorRates {
    fn default() -> Self {
        Self {
            tow_pilot: Money::from_dollars(10),
            intro_pilot: Money::from_dollars(10),
            five_pack: Money::from_dollars(40),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemberRates {
    /// 每架滑翔機的每小時租金，票上沒有租金時才使用
    pub glider_hourly_rates: BTreeMap<String, Money>,
}

impl MemberRates {
    pub fn glider_hourly_rate(&self, glider_id: &str) -> Option<Money> {
        self.glider_hourly_rates.get(glider_id).copied()
    }

    /// 會員應付的滑翔機租金：票上的金額，或沒有金額時依時數計費
    pub fn rental_charge(&self, ticket: &TowTicket) -> Option<LineAmount> {
        if !ticket.billable_rental() {
            return None;
        }
        let amount = match ticket.rental_fee() {
            Some(fee) => LineAmount::Flat(fee),
            None => LineAmount::Rated {
                quantity: ticket.glider_time(),
                rate: self.glider_hourly_rate(ticket.glider_id())?,
            },
        };
        amount.total().is_positive().then_some(amount)
    }
}

impl RateConfig {
    /// 從 TOML 檔案載入費率
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConversionError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ConversionError::Config {
            message: format!("rates file parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TOW_PILOT_RATE})，未設定者保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for RateConfig {
    fn validate(&self) -> Result<()> {
        validate_range("billing.due_days", self.billing.due_days, 0, 365).map_err(|e| {
            ConversionError::Config {
                message: e.to_string(),
            }
        })?;

        if self.member.glider_hourly_rates.keys().any(|k| k.trim().is_empty()) {
            return Err(ConversionError::Config {
                message: "member.glider_hourly_rates contains an empty glider id".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_empty() {
        let config = RateConfig::from_toml_str("").unwrap();
        assert_eq!(config.billing.due_days, 30);
        assert_eq!(config.vendor, VendorRates::default());
        assert_eq!(config.vendor.five_pack, Money::from_dollars(40));
        assert!(config.member.glider_hourly_rates.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[billing]
due_days = 15

[vendor]
tow_pilot = "$12.50"
five_pack = "45"

[member.glider_hourly_rates]
"G1" = "$45.00"
"#;

        let config = RateConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.billing.due_days, 15);
        assert_eq!(config.vendor.tow_pilot, Money::from_cents(1250));
        assert_eq!(config.vendor.intro_pilot, Money::from_dollars(10));
        assert_eq!(config.vendor.five_pack, Money::from_dollars(45));
        assert_eq!(config.member.glider_hourly_rate("G1"), Some(Money::from_dollars(45)));
        assert_eq!(config.member.glider_hourly_rate("G2"), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_money_is_a_config_error() {
        let err = RateConfig::from_toml_str("[vendor]\ntow_pilot = \"-3\"\n").unwrap_err();
        assert!(matches!(err, ConversionError::Config { .. }));

        let err = RateConfig::from_toml_str("[vendor]\ntow_fee = \"3\"\n").unwrap_err();
        assert!(matches!(err, ConversionError::Config { .. }));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TOW_BILLING_TEST_INTRO_RATE", "$15.00");
        let config =
            RateConfig::from_toml_str("[vendor]\nintro_pilot = \"${TOW_BILLING_TEST_INTRO_RATE}\"\n")
                .unwrap();
        assert_eq!(config.vendor.intro_pilot, Money::from_dollars(15));
        std::env::remove_var("TOW_BILLING_TEST_INTRO_RATE");
    }

    #[test]
    fn test_due_days_out_of_range() {
        let config = RateConfig::from_toml_str("[billing]\ndue_days = 400\n").unwrap();
        assert!(matches!(config.validate(), Err(ConversionError::Config { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[vendor]\ntow_pilot = \"11.00\"\n")
            .unwrap();

        let config = RateConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.vendor.tow_pilot, Money::from_dollars(11));
    }
}
