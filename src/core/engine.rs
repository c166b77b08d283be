use super::error::ProjectionError;
use super::types::{FinancialParameters, ProjectionResult, YearRecord};

/// Largest magnitude a rounded amount may reach and still be an exact
/// integer in an `f64` (and in a JavaScript number).
pub const MAX_EXACT_CURRENCY: i64 = 1 << 53;

#[derive(Debug, Clone, Copy)]
struct YearPoint {
    property_value: f64,
    maintenance_cost: f64,
    property_tax: f64,
    gross_return: f64,
    income_tax: f64,
    net_return: f64,
}

impl YearPoint {
    fn rounded(self, year: u32) -> YearRecord {
        YearRecord {
            year,
            property_value: round_currency(self.property_value),
            maintenance_cost: round_currency(self.maintenance_cost),
            property_tax: round_currency(self.property_tax),
            gross_return: round_currency(self.gross_return),
            income_tax: round_currency(self.income_tax),
            net_return: round_currency(self.net_return),
        }
    }

    fn try_rounded(self, year: u32) -> Result<YearRecord, ProjectionError> {
        let round = |field: &'static str, value: f64| {
            try_round_currency(value).ok_or(ProjectionError::OutOfRange { year, field })
        };

        Ok(YearRecord {
            year,
            property_value: round("propertyValue", self.property_value)?,
            maintenance_cost: round("maintenanceCost", self.maintenance_cost)?,
            property_tax: round("propertyTax", self.property_tax)?,
            gross_return: round("grossReturn", self.gross_return)?,
            income_tax: round("incomeTax", self.income_tax)?,
            net_return: round("netReturn", self.net_return)?,
        })
    }
}

/// Total over any input: amounts outside the `i64` range saturate and NaN
/// becomes 0. Boundaries use [`try_compute_projection`].
pub fn compute_projection(params: &FinancialParameters) -> ProjectionResult {
    let initial_payment = initial_payment(params);

    let yearly_series = (0..=params.years)
        .map(|year| project_year(params, initial_payment, year).rounded(year))
        .collect();

    ProjectionResult {
        initial_payment: round_currency(initial_payment),
        yearly_series,
    }
}

/// Same series as [`compute_projection`], but fails instead of reporting an
/// amount that is non-finite or beyond [`MAX_EXACT_CURRENCY`].
pub fn try_compute_projection(
    params: &FinancialParameters,
) -> Result<ProjectionResult, ProjectionError> {
    let initial_payment = initial_payment(params);
    let rounded_payment =
        try_round_currency(initial_payment).ok_or(ProjectionError::OutOfRange {
            year: 0,
            field: "initialPayment",
        })?;

    let yearly_series = (0..=params.years)
        .map(|year| project_year(params, initial_payment, year).try_rounded(year))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProjectionResult {
        initial_payment: rounded_payment,
        yearly_series,
    })
}

fn initial_payment(params: &FinancialParameters) -> f64 {
    params.initial_property_value * params.health_status.down_payment_factor()
}

// Each year compounds from year 0 so rounding never feeds into the next year.
fn project_year(params: &FinancialParameters, initial_payment: f64, year: u32) -> YearPoint {
    let property_value = params.initial_property_value
        * compound_factor(params.annual_appreciation_rate, year);
    let maintenance_cost = property_value * params.annual_maintenance_cost_rate;
    let property_tax = property_value * params.property_tax_rate;
    let gross_return =
        initial_payment * compound_factor(params.annual_return_rate, year) - initial_payment;
    let income_tax = gross_return * params.income_tax_rate;
    let net_return = gross_return - income_tax - maintenance_cost - property_tax;

    YearPoint {
        property_value,
        maintenance_cost,
        property_tax,
        gross_return,
        income_tax,
        net_return,
    }
}

fn compound_factor(rate: f64, year: u32) -> f64 {
    (1.0 + rate).powf(f64::from(year))
}

/// Nearest whole currency unit, halves rounded up (2.5 -> 3, -2.5 -> -2).
pub fn round_currency(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// [`round_currency`] for finite amounts within [`MAX_EXACT_CURRENCY`].
pub fn try_round_currency(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let rounded = (value + 0.5).floor();
    (rounded.abs() <= MAX_EXACT_CURRENCY as f64).then_some(rounded as i64)
}
