//! Reference-month normalization ("jan/25" -> "JAN/2025").

use super::patterns::MONTH_REFERENCE;

/// Normalize a reference month to upper-case `MMM/YYYY`.
///
/// Two-digit years are taken as 20xx. Values that do not look like a month
/// reference are returned unchanged.
pub fn normalize_month_reference(reference: &str) -> String {
    let Some(caps) = MONTH_REFERENCE.captures(reference) else {
        return reference.to_string();
    };

    let month = caps[1].to_uppercase();
    let year = &caps[2];
    if year.len() == 2 {
        format!("{}/20{}", month, year)
    } else {
        format!("{}/{}", month, year)
    }
}
