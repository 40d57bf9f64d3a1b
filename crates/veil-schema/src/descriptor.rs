//! Attribute roles, records, and the record line codec.

use sha2::{Digest, Sha256};
use veil_attribute::{AttributeValue, QuasiType};

use crate::error::DescriptorError;

/// The literal a secret column is released as.
pub const SECRET_MASK: &str = "*";

/// Field delimiter of the wire format.
const DELIMITER: char = ';';

/// One slot of a parsed record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Raw text, for passthrough / secret / secret-id columns.
    Text(String),
    /// A typed quasi-identifier value.
    Quasi(AttributeValue),
}

/// An ordered, fixed-arity tuple of field values. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<FieldValue>,
}

impl Record {
    pub fn new(fields: Vec<FieldValue>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, position: usize) -> &FieldValue {
        &self.fields[position]
    }

    /// The quasi value at `position`; `None` for non-quasi slots.
    pub fn quasi_value(&self, position: usize) -> Option<&AttributeValue> {
        match &self.fields[position] {
            FieldValue::Quasi(v) => Some(v),
            FieldValue::Text(_) => None,
        }
    }

    pub fn text(&self, position: usize) -> Option<&str> {
        match &self.fields[position] {
            FieldValue::Text(t) => Some(t),
            FieldValue::Quasi(_) => None,
        }
    }
}

/// The release role of one column.
#[derive(Debug, Clone)]
pub enum AttributeRole {
    Passthrough,
    Secret,
    SecretIdentity,
    Quasi(QuasiType),
}

/// One column descriptor: stable position, name, role.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub position: usize,
    pub name: String,
    pub role: AttributeRole,
}

impl Attribute {
    pub fn is_quasi(&self) -> bool {
        matches!(self.role, AttributeRole::Quasi(_))
    }
}

/// Describes the structure of the record input: the ordered attribute
/// list and the line codec over it.
#[derive(Debug, Clone)]
pub struct RecordDescriptor {
    attributes: Vec<Attribute>,
    quasi_positions: Vec<usize>,
}

impl RecordDescriptor {
    /// Builds a descriptor from attributes; they are sorted by position.
    pub fn new(mut attributes: Vec<Attribute>) -> Self {
        attributes.sort_by_key(|a| a.position);
        let quasi_positions = attributes
            .iter()
            .filter(|a| a.is_quasi())
            .map(|a| a.position)
            .collect();
        Self {
            attributes,
            quasi_positions,
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    /// Positions of the quasi-identifier columns, ascending.
    pub fn quasi_positions(&self) -> &[usize] {
        &self.quasi_positions
    }

    /// The lattice of the quasi column at `position`.
    ///
    /// Returns `None` when the column is not a quasi identifier.
    pub fn quasi_type(&self, position: usize) -> Option<&QuasiType> {
        match &self.attributes.get(position)?.role {
            AttributeRole::Quasi(ty) => Some(ty),
            _ => None,
        }
    }

    /// Parses one `;`-delimited input line into a record.
    ///
    /// Secret fields are masked already at parse time so their cleartext
    /// never enters the engine.
    pub fn parse_line(&self, line: &str) -> Result<Record, DescriptorError> {
        let split: Vec<&str> = line.split(DELIMITER).collect();
        if split.len() != self.attributes.len() {
            return Err(DescriptorError::FieldCount {
                expected: self.attributes.len(),
                actual: split.len(),
            });
        }

        let mut fields = Vec::with_capacity(split.len());
        for (attribute, raw) in self.attributes.iter().zip(&split) {
            let field = match &attribute.role {
                AttributeRole::Passthrough | AttributeRole::SecretIdentity => {
                    FieldValue::Text((*raw).to_string())
                }
                AttributeRole::Secret => FieldValue::Text(SECRET_MASK.to_string()),
                AttributeRole::Quasi(ty) => {
                    let value = ty.parse(raw).map_err(|source| DescriptorError::Field {
                        name: attribute.name.clone(),
                        position: attribute.position,
                        source,
                    })?;
                    FieldValue::Quasi(value)
                }
            };
            fields.push(field);
        }
        Ok(Record::new(fields))
    }

    /// Renders one record back to the wire format, applying each role's
    /// release treatment.
    pub fn show_line(&self, record: &Record) -> Result<String, DescriptorError> {
        if record.len() != self.attributes.len() {
            return Err(DescriptorError::Arity {
                expected: self.attributes.len(),
                actual: record.len(),
            });
        }

        let rendered: Vec<String> = self
            .attributes
            .iter()
            .map(|attribute| self.show_field(attribute, record))
            .collect();
        Ok(rendered.join(&DELIMITER.to_string()))
    }

    fn show_field(&self, attribute: &Attribute, record: &Record) -> String {
        match (&attribute.role, record.field(attribute.position)) {
            (AttributeRole::Passthrough, FieldValue::Text(t)) => t.clone(),
            (AttributeRole::Secret, _) => SECRET_MASK.to_string(),
            (AttributeRole::SecretIdentity, FieldValue::Text(t)) => identity_token(t),
            (AttributeRole::Quasi(ty), FieldValue::Quasi(v)) => ty.show(v),
            // Role/slot mismatch: schema construction bug, degrade to mask.
            _ => SECRET_MASK.to_string(),
        }
    }
}

/// Irreversible, stable token for a secret-identity value.
///
/// SHA-256 truncated to 16 hex characters: equal inputs map to equal
/// tokens, different inputs collide only with negligible probability.
pub fn identity_token(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_attribute::{EnumAttribute, IntAttribute, StringAttribute};

    fn descriptor() -> RecordDescriptor {
        RecordDescriptor::new(vec![
            Attribute {
                position: 0,
                name: "name".into(),
                role: AttributeRole::Secret,
            },
            Attribute {
                position: 1,
                name: "patient".into(),
                role: AttributeRole::SecretIdentity,
            },
            Attribute {
                position: 2,
                name: "age".into(),
                role: AttributeRole::Quasi(QuasiType::Int(IntAttribute::new(0, 120))),
            },
            Attribute {
                position: 3,
                name: "city".into(),
                role: AttributeRole::Passthrough,
            },
            Attribute {
                position: 4,
                name: "job".into(),
                role: AttributeRole::Quasi(QuasiType::Enum(EnumAttribute::new(
                    "job",
                    vec!["engineer".into(), "teacher".into()],
                ))),
            },
        ])
    }

    #[test]
    fn parses_and_masks_secret_at_parse_time() {
        let d = descriptor();
        let record = d.parse_line("Alice;p-001;42;Szeged;teacher").unwrap();
        assert_eq!(record.text(0), Some(SECRET_MASK));
        assert_eq!(record.text(1), Some("p-001"));
        assert!(record.quasi_value(2).is_some());
        assert_eq!(record.text(3), Some("Szeged"));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let d = descriptor();
        assert!(matches!(
            d.parse_line("Alice;42"),
            Err(DescriptorError::FieldCount { expected: 5, actual: 2 })
        ));
    }

    #[test]
    fn rejects_bad_quasi_field() {
        let d = descriptor();
        let err = d.parse_line("Alice;p-001;not-a-number;Szeged;teacher");
        assert!(matches!(err, Err(DescriptorError::Field { position: 2, .. })));
    }

    #[test]
    fn show_line_applies_release_roles() {
        let d = descriptor();
        let record = d.parse_line("Alice;p-001;42;Szeged;teacher").unwrap();
        let line = d.show_line(&record).unwrap();
        let fields: Vec<&str> = line.split(';').collect();
        assert_eq!(fields[0], "*");
        assert_eq!(fields[1], identity_token("p-001"));
        assert_eq!(fields[2], "42");
        assert_eq!(fields[3], "Szeged");
        assert_eq!(fields[4], "teacher");
    }

    #[test]
    fn identity_token_is_stable_and_distinct() {
        assert_eq!(identity_token("p-001"), identity_token("p-001"));
        assert_ne!(identity_token("p-001"), identity_token("p-002"));
        assert_eq!(identity_token("p-001").len(), 16);
    }

    #[test]
    fn quasi_positions_are_cached_in_order() {
        let d = descriptor();
        assert_eq!(d.quasi_positions(), &[2, 4]);
        assert!(d.quasi_type(2).is_some());
        assert!(d.quasi_type(3).is_none());
    }

    #[test]
    fn string_attribute_round_trips_through_line() {
        let d = RecordDescriptor::new(vec![Attribute {
            position: 0,
            name: "surname".into(),
            role: AttributeRole::Quasi(QuasiType::Text(StringAttribute::default())),
        }]);
        let record = d.parse_line("Johnson").unwrap();
        assert_eq!(d.show_line(&record).unwrap(), "Johnson");
    }
}
