//! Record parsing and validation.

/// One validated (identifier, label) pair to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub identifier: String,
    pub label: String,
}

/// Why a record could not be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("identifier and label must both be non-empty")]
    MissingField,

    #[error("line must split into exactly two fields on '{0}'")]
    Malformed(char),
}

impl Record {
    /// Build a record from two pre-split fields.
    pub fn new(identifier: &str, label: &str) -> Result<Self, RecordError> {
        let identifier = identifier.trim();
        let label = label.trim();
        if identifier.is_empty() || label.is_empty() {
            return Err(RecordError::MissingField);
        }
        Ok(Self {
            identifier: identifier.to_string(),
            label: label.to_string(),
        })
    }

    /// Parse one raw line of the form `identifier<sep>label`.
    ///
    /// The line must contain exactly one separator with non-empty text
    /// on both sides after trimming.
    pub fn parse_line(line: &str, separator: char) -> Result<Self, RecordError> {
        let parts: Vec<&str> = line.split(separator).collect();
        if parts.len() != 2 {
            return Err(RecordError::Malformed(separator));
        }
        Self::new(parts[0], parts[1])
    }

    /// The exact string embedded in the scannable code.
    pub fn payload(&self, separator: char) -> String {
        format!("{}{}{}", self.identifier, separator, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_surrounding_whitespace() {
        let record = Record::parse_line("  ID | Name ", '|').unwrap();
        assert_eq!(record.identifier, "ID");
        assert_eq!(record.label, "Name");
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert_eq!(
            Record::parse_line("no-separator-here", '|'),
            Err(RecordError::Malformed('|'))
        );
    }

    #[test]
    fn parse_rejects_extra_separator() {
        assert_eq!(
            Record::parse_line("a|b|c", '|'),
            Err(RecordError::Malformed('|'))
        );
    }

    #[test]
    fn parse_rejects_empty_side() {
        assert_eq!(Record::parse_line("|Name", '|'), Err(RecordError::MissingField));
        assert_eq!(Record::parse_line("ID|  ", '|'), Err(RecordError::MissingField));
    }

    #[test]
    fn new_requires_both_fields() {
        assert!(Record::new("1", "Alice").is_ok());
        assert_eq!(Record::new(" ", "Alice"), Err(RecordError::MissingField));
        assert_eq!(Record::new("1", ""), Err(RecordError::MissingField));
    }

    #[test]
    fn payload_joins_on_the_separator() {
        let record = Record::new("42", "Alice").unwrap();
        assert_eq!(record.payload('|'), "42|Alice");
    }
}
