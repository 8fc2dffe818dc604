//! Settings checks
//!
//! Each table of `config.toml` is a [`ConfigSection`]. A section reports its
//! problems into [`Findings`], which prefixes every key with the table name so
//! a single pass over the whole [`Config`](crate::Config) names each bad
//! setting as `table.Key`.

use std::fmt;

/// One setting that cannot be used as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// `table.key`, e.g. `system.CustomDate`
    pub field: String,
    pub message: String,
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl fmt::Display) -> Self {
        self.value = Some(value.to_string());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)?;
        match &self.value {
            Some(value) => write!(f, " (got {})", value),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Problems collected while checking one or more tables
#[derive(Debug, Default)]
pub struct Findings {
    table: &'static str,
    errors: Vec<ValidationError>,
}

impl Findings {
    /// Findings for a single table
    pub fn for_table(table: &'static str) -> Self {
        Self {
            table,
            errors: Vec::new(),
        }
    }

    /// Runs `section`'s checks, recording problems under its table name
    pub fn check_section<S: ConfigSection>(&mut self, section: &S) {
        self.table = S::TABLE;
        section.check(self);
    }

    pub fn push(&mut self, key: &str, message: impl Into<String>) {
        self.errors.push(ValidationError::new(self.field(key), message));
    }

    pub fn push_value(&mut self, key: &str, message: impl Into<String>, value: impl fmt::Display) {
        self.errors
            .push(ValidationError::new(self.field(key), message).with_value(value));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn field(&self, key: &str) -> String {
        format!("{}.{}", self.table, key)
    }
}

/// A table of `config.toml`
pub trait ConfigSection: Default {
    /// Table name as written in the file
    const TABLE: &'static str;

    /// Records every problem with this section
    fn check(&self, findings: &mut Findings);

    /// Overwrites this section with `other`, keeping values `other` leaves unset
    fn merge(&mut self, other: Self);

    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut findings = Findings::for_table(Self::TABLE);
        self.check(&mut findings);
        findings.finish()
    }
}
