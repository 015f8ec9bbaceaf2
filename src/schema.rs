use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One row of the intake sheet as exported, every column still a raw string.
///
/// Serde names mirror the production sheet headers so rows can be
/// deserialized straight out of a CSV export once the headers have been
/// canonicalized (see [`crate::ingestion`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "FECHA", default)]
    pub date: String,

    #[serde(rename = "ORIGEN", default)]
    pub origin: String,

    #[serde(rename = "NRO LEGAJO", default)]
    pub file_number: String,

    #[serde(rename = "APELLIDO", default)]
    pub last_name: String,

    #[serde(rename = "NOMBRE", default)]
    pub first_name: String,

    #[serde(rename = "APODO", default)]
    pub nickname: String,

    #[serde(rename = "DNI", default)]
    pub national_id: String,

    #[serde(rename = "CUIT", default)]
    pub tax_id: String,

    #[serde(rename = "FRECUENCIA DE PAGO", default)]
    pub payment_frequency: String,

    #[serde(rename = "MODALIDAD DE PAGO", default)]
    pub payment_method: String,

    #[serde(rename = "MATERIAL", default)]
    pub material: String,

    #[serde(rename = "KG", default)]
    pub weight_kg: String,

    #[serde(rename = "OBSERVACIONES", default)]
    pub notes: String,
}

/// A normalized intake record.
///
/// The four decision-bearing columns are coerced to canonical types; a cell
/// that failed coercion is `None` rather than a fabricated zero. Every other
/// column is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub date: Option<NaiveDate>,
    pub origin: String,
    pub file_number: String,
    pub last_name: String,
    pub first_name: String,
    pub nickname: String,
    pub national_id: String,
    /// Depositor identity (CUIT), separator-stripped and parsed.
    pub tax_id: Option<u64>,
    pub payment_frequency: String,
    pub payment_method: String,
    /// Normalized material category, the price-table join key.
    pub material: String,
    pub weight_kg: Option<i64>,
    pub notes: String,
}

impl IntakeRecord {
    /// Name shown on payout summaries: "Last, First", the nickname as a
    /// fallback, or empty when the sheet carried none of them.
    pub fn display_name(&self) -> String {
        match (self.last_name.is_empty(), self.first_name.is_empty()) {
            (false, false) => format!("{}, {}", self.last_name, self.first_name),
            (false, true) => self.last_name.clone(),
            (true, false) => self.first_name.clone(),
            (true, true) => self.nickname.clone(),
        }
    }
}

fn default_bonus_threshold() -> i64 {
    1000
}

fn default_bonus_suffix() -> String {
    "_Bono".to_string()
}

/// Operator-editable pricing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValorizerConfig {
    #[serde(default = "default_bonus_threshold")]
    #[schemars(
        description = "Monthly weight (kilograms) a depositor must reach for bonus-tier prices to apply. The comparison is inclusive: a monthly total equal to the threshold earns the bonus."
    )]
    pub bonus_threshold_kg: i64,

    #[serde(default = "default_bonus_suffix")]
    #[schemars(
        description = "Suffix appended to a material category to form its bonus-tier price-table key (e.g. 'Plastico' + '_Bono'). Bonus rows are optional per material."
    )]
    pub bonus_suffix: String,
}

impl Default for ValorizerConfig {
    fn default() -> Self {
        Self {
            bonus_threshold_kg: default_bonus_threshold(),
            bonus_suffix: default_bonus_suffix(),
        }
    }
}

impl ValorizerConfig {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ValorizerConfig)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ValorizerConfig::default();
        assert_eq!(config.bonus_threshold_kg, 1000);
        assert_eq!(config.bonus_suffix, "_Bono");

        let from_empty_json: ValorizerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(from_empty_json, config);
    }

    #[test]
    fn test_config_schema_generation() {
        let schema_json = ValorizerConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("bonus_threshold_kg"));
        assert!(schema_json.contains("bonus_suffix"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut record = IntakeRecord {
            date: None,
            origin: String::new(),
            file_number: String::new(),
            last_name: "Gomez".to_string(),
            first_name: "Ana".to_string(),
            nickname: "Anita".to_string(),
            national_id: String::new(),
            tax_id: None,
            payment_frequency: String::new(),
            payment_method: String::new(),
            material: String::new(),
            weight_kg: None,
            notes: String::new(),
        };
        assert_eq!(record.display_name(), "Gomez, Ana");

        record.first_name.clear();
        assert_eq!(record.display_name(), "Gomez");

        record.last_name.clear();
        assert_eq!(record.display_name(), "Anita");
    }
}
