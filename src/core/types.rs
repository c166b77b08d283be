use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::ProjectionError;

/// Owner health bracket. Picks the share of the property value paid up front.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Good,
    Fair,
    Poor,
}

impl HealthStatus {
    pub fn down_payment_factor(self) -> f64 {
        match self {
            HealthStatus::Good => 0.50,
            HealthStatus::Fair => 0.60,
            HealthStatus::Poor => 0.75,
        }
    }

    /// Lenient resolution used at the input boundary: any tag that does not
    /// parse falls back to `Good`.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|err: ProjectionError| {
            tracing::warn!(%err, "falling back to good health status");
            HealthStatus::Good
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Good => "good",
            HealthStatus::Fair => "fair",
            HealthStatus::Poor => "poor",
        }
    }
}

impl FromStr for HealthStatus {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" | "bueno" => Ok(HealthStatus::Good),
            "fair" | "regular" => Ok(HealthStatus::Fair),
            "poor" | "malo" => Ok(HealthStatus::Poor),
            _ => Err(ProjectionError::UnrecognizedHealthStatus(s.to_string())),
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinancialParameters {
    pub initial_property_value: f64,
    /// Carried for display only; the projection never reads it.
    pub owner_age: u32,
    pub health_status: HealthStatus,
    pub years: u32,
    pub annual_appreciation_rate: f64,
    pub annual_return_rate: f64,
    pub annual_maintenance_cost_rate: f64,
    pub property_tax_rate: f64,
    pub income_tax_rate: f64,
}

impl Default for FinancialParameters {
    fn default() -> Self {
        Self {
            initial_property_value: 200_000.0,
            owner_age: 71,
            health_status: HealthStatus::Good,
            years: 10,
            annual_appreciation_rate: 0.03,
            annual_return_rate: 0.06,
            annual_maintenance_cost_rate: 0.01,
            property_tax_rate: 0.002,
            income_tax_rate: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub year: u32,
    pub property_value: i64,
    pub maintenance_cost: i64,
    pub property_tax: i64,
    pub gross_return: i64,
    pub income_tax: i64,
    pub net_return: i64,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub initial_payment: i64,
    pub yearly_series: Vec<YearRecord>,
}

impl ProjectionResult {
    /// `(year, property_value, net_return)` for the two-line chart.
    pub fn chart_points(&self) -> impl Iterator<Item = (u32, i64, i64)> + '_ {
        self.yearly_series
            .iter()
            .map(|record| (record.year, record.property_value, record.net_return))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_english_and_form_tags() {
        for (tag, expected) in [
            ("good", HealthStatus::Good),
            ("bueno", HealthStatus::Good),
            ("Fair", HealthStatus::Fair),
            (" regular ", HealthStatus::Fair),
            ("POOR", HealthStatus::Poor),
            ("malo", HealthStatus::Poor),
        ] {
            assert_eq!(tag.parse::<HealthStatus>().ok(), Some(expected), "tag {tag:?}");
        }
    }

    #[test]
    fn strict_parse_rejects_unknown_tag() {
        let err = "excellent".parse::<HealthStatus>().expect_err("must reject");
        assert!(matches!(err, ProjectionError::UnrecognizedHealthStatus(ref tag) if tag == "excellent"));
    }

    #[test]
    fn lenient_tag_defaults_to_good() {
        assert_eq!(HealthStatus::from_tag(""), HealthStatus::Good);
        assert_eq!(HealthStatus::from_tag("unknown"), HealthStatus::Good);
        assert_eq!(HealthStatus::from_tag("malo"), HealthStatus::Poor);
    }

    #[test]
    fn down_payment_factor_table() {
        assert_eq!(HealthStatus::Good.down_payment_factor(), 0.50);
        assert_eq!(HealthStatus::Fair.down_payment_factor(), 0.60);
        assert_eq!(HealthStatus::Poor.down_payment_factor(), 0.75);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for status in [HealthStatus::Good, HealthStatus::Fair, HealthStatus::Poor] {
            assert_eq!(status.to_string().parse::<HealthStatus>().ok(), Some(status));
        }
    }
}
