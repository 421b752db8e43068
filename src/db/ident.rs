use crate::error::MenuDbError;
use std::fmt;

/// PostgreSQL truncates identifiers beyond this many bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

/// A table or column name safe to splice into DDL.
///
/// Names are folded to lower case, matching how PostgreSQL stores unquoted identifiers,
/// so the catalog lookup and the quoted DDL agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(pub(crate) String);

impl Identifier {
    pub fn new(raw: &str) -> Result<Self, MenuDbError> {
        let name = raw.trim().to_ascii_lowercase();
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_start || !valid_rest || name.len() > MAX_IDENTIFIER_LEN {
            return Err(MenuDbError::InvalidIdentifier(raw.to_string()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for use in statements.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Words that start a column constraint or clause rather than continue a type name.
const CONSTRAINT_WORDS: &[&str] = &[
    "NOT", "NULL", "DEFAULT", "PRIMARY", "KEY", "REFERENCES", "UNIQUE", "CHECK",
    "GENERATED", "COLLATE", "CONSTRAINT", "IDENTITY", "ON", "AS",
];

/// A column type expression such as `TIMESTAMP` or `VARCHAR(255)`.
///
/// Only letters, digits, spaces, underscores, commas and parentheses are accepted, which
/// rules out quoting, comments and statement separators. Constraint keywords are refused
/// so the added column is always nullable without a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType(pub(crate) String);

impl ColumnType {
    pub fn new(raw: &str) -> Result<Self, MenuDbError> {
        let ty = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        let starts_with_letter = ty.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        let allowed = ty
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | ',' | '(' | ')'));
        let balanced = ty.matches('(').count() == ty.matches(')').count();
        if !starts_with_letter || !allowed || !balanced || ty.len() > 64 {
            return Err(MenuDbError::InvalidColumnType(raw.to_string()));
        }
        let ty = ty.to_ascii_uppercase();
        let has_constraint = ty
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .any(|word| CONSTRAINT_WORDS.contains(&word));
        if has_constraint {
            return Err(MenuDbError::InvalidColumnType(raw.to_string()));
        }
        Ok(Self(ty))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_folded_and_quoted() {
        let id = Identifier::new("Pickup_Time").unwrap();
        assert_eq!(id.as_str(), "pickup_time");
        assert_eq!(id.quoted(), "\"pickup_time\"");
    }

    #[test]
    fn hostile_identifiers_are_rejected() {
        for raw in ["", "1orders", "orders; drop table users", "or\"ders", "menu-items"] {
            assert!(Identifier::new(raw).is_err(), "{raw:?} should be rejected");
        }
        assert!(Identifier::new(&"a".repeat(64)).is_err());
    }

    #[test]
    fn column_types_allow_common_forms() {
        assert_eq!(ColumnType::new("timestamp").unwrap().as_str(), "TIMESTAMP");
        assert_eq!(
            ColumnType::new("numeric(10,  2)").unwrap().as_str(),
            "NUMERIC(10, 2)"
        );
        assert_eq!(
            ColumnType::new("timestamp with time zone").unwrap().as_str(),
            "TIMESTAMP WITH TIME ZONE"
        );
        assert_eq!(
            ColumnType::new("character varying(40)").unwrap().as_str(),
            "CHARACTER VARYING(40)"
        );
        assert!(ColumnType::new("double precision").is_ok());
        assert!(ColumnType::new("notes_kind").is_ok());
    }

    #[test]
    fn column_types_reject_injection() {
        for raw in ["", "TEXT; DROP TABLE users", "TEXT DEFAULT 'x'", "INT -- c", "VARCHAR(5"] {
            assert!(ColumnType::new(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn column_types_reject_constraints() {
        for raw in [
            "text not null",
            "int default 5",
            "serial primary key",
            "int references users(id) on delete cascade",
            "text unique",
            "int check (1)",
            "text collate C",
            "int generated always as identity",
            "text constraint x",
        ] {
            assert!(ColumnType::new(raw).is_err(), "{raw:?} should be rejected");
        }
    }
}
