use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};

use crate::core::ProjectionResult;

const HEADERS: [&str; 7] = [
    "Year",
    "Property value",
    "Maintenance",
    "Property tax",
    "Gross return",
    "Income tax",
    "Net return",
];

pub fn render_projection_table(result: &ProjectionResult) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(HEADERS.iter().map(|h| Cell::new(*h)));

    for record in &result.yearly_series {
        let mut row = vec![Cell::new(record.year).set_alignment(CellAlignment::Right)];
        row.extend(
            [
                record.property_value,
                record.maintenance_cost,
                record.property_tax,
                record.gross_return,
                record.income_tax,
                record.net_return,
            ]
            .into_iter()
            .map(|amount| Cell::new(format_currency(amount)).set_alignment(CellAlignment::Right)),
        );
        table.add_row(row);
    }

    format!(
        "Initial payment: {}\n{table}",
        format_currency(result.initial_payment)
    )
}

/// `$1,234,567`, with the sign ahead of the currency symbol.
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
