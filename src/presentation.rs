//! Presenter helpers. Nothing here changes a computed value; these functions
//! only decide how a value is shown.

use serde::{Deserialize, Serialize};

/// Styling tag a renderer maps onto its own look (bold row, green/red text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayHint {
    Plain,
    Total,
    Positive,
    Negative,
}

pub fn variance_hint(variance_pct: f64) -> DisplayHint {
    if variance_pct > 0.0 {
        DisplayHint::Positive
    } else if variance_pct < 0.0 {
        DisplayHint::Negative
    } else {
        DisplayHint::Plain
    }
}

pub fn row_hint(is_total: bool) -> DisplayHint {
    if is_total {
        DisplayHint::Total
    } else {
        DisplayHint::Plain
    }
}

/// Brazilian currency, e.g. `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("R$ {}{},{}", sign, grouped, frac_part)
}

pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value)
}
