//! Common types and utilities shared across domain models

use chrono::NaiveDate;

/// Date layout used by the data file and by the command line (`yyyy-MM-dd`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats a date as `yyyy-MM-dd`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a `yyyy-MM-dd` date, ignoring surrounding whitespace
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Trait for types that can validate themselves
pub trait Validator {
    /// Validates the instance and returns errors if invalid
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Checks a text field that ends up in the comma separated data file.
///
/// Pushes a message onto `errors` when the field is empty (and `required`),
/// or when it contains a separator the file format cannot escape.
pub(crate) fn check_text_field(errors: &mut Vec<String>, label: &str, value: &str, required: bool) {
    if required && value.trim().is_empty() {
        errors.push(format!("{} cannot be empty", label));
    }
    if value.contains(',') {
        errors.push(format!("{} cannot contain commas", label));
    }
    if value.contains('\n') || value.contains('\r') {
        errors.push(format!("{} cannot contain line breaks", label));
    }
}
