//! Reader (library patron) domain model

use crate::types::common::{check_text_field, Validator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered library patron
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    pub id: String,
    pub name: String,
    pub dept: String,
    pub phone: String,
    pub register_date: NaiveDate,
    pub is_valid: bool,
}

impl Reader {
    /// Creates a valid reader registered on `register_date`
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        dept: impl Into<String>,
        phone: impl Into<String>,
        register_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dept: dept.into(),
            phone: phone.into(),
            register_date,
            is_valid: true,
        }
    }

    /// Case-insensitive substring match on id, name, department or phone
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return true;
        }
        let needle = keyword.to_lowercase();
        [&self.id, &self.name, &self.dept, &self.phone]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl Validator for Reader {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        check_text_field(&mut errors, "Reader ID", &self.id, true);
        check_text_field(&mut errors, "Name", &self.name, true);
        check_text_field(&mut errors, "Department", &self.dept, false);
        check_text_field(&mut errors, "Phone", &self.phone, false);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
