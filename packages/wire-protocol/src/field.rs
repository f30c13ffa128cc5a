//! Typed fields.
use derive_more::Display;

/// The type of a field, written as a one-byte tag before its body.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    #[display("string")]
    String,
    #[display("integer")]
    Integer,
    #[display("byte buffer")]
    Bytes,
    #[display("integer list")]
    IntegerList,
    #[display("string list")]
    StringList,
}

impl FieldType {
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            FieldType::String => 0x01,
            FieldType::Integer => 0x02,
            FieldType::Bytes => 0x03,
            FieldType::IntegerList => 0x04,
            FieldType::StringList => 0x05,
        }
    }

    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(FieldType::String),
            0x02 => Some(FieldType::Integer),
            0x03 => Some(FieldType::Bytes),
            0x04 => Some(FieldType::IntegerList),
            0x05 => Some(FieldType::StringList),
            _ => None,
        }
    }
}

/// A decoded field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    String(String),
    Integer(u64),
    Bytes(Vec<u8>),
    IntegerList(Vec<u64>),
    StringList(Vec<String>),
}

impl Field {
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            Field::String(_) => FieldType::String,
            Field::Integer(_) => FieldType::Integer,
            Field::Bytes(_) => FieldType::Bytes,
            Field::IntegerList(_) => FieldType::IntegerList,
            Field::StringList(_) => FieldType::StringList,
        }
    }

    /// Appends the encoded field, tag included, to `buffer`.
    ///
    /// # Errors
    ///
    /// Will return an error if a length or a count does not fit the `u32`
    /// prefix.
    pub fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), std::io::Error> {
        buffer.push(self.field_type().tag());

        match self {
            Field::String(value) => {
                encode_len(value.len(), buffer)?;
                buffer.extend_from_slice(value.as_bytes());
            }
            Field::Integer(value) => buffer.extend_from_slice(&value.to_be_bytes()),
            Field::Bytes(value) => {
                encode_len(value.len(), buffer)?;
                buffer.extend_from_slice(value);
            }
            Field::IntegerList(values) => {
                encode_len(values.len(), buffer)?;
                for value in values {
                    buffer.extend_from_slice(&value.to_be_bytes());
                }
            }
            Field::StringList(values) => {
                encode_len(values.len(), buffer)?;
                for value in values {
                    encode_len(value.len(), buffer)?;
                    buffer.extend_from_slice(value.as_bytes());
                }
            }
        }

        Ok(())
    }
}

fn encode_len(len: usize, buffer: &mut Vec<u8>) -> Result<(), std::io::Error> {
    let len = u32::try_from(len).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("field length {len} does not fit in a u32 prefix"),
        )
    })?;
    buffer.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::field::{Field, FieldType};

    #[rstest]
    #[case(FieldType::String)]
    #[case(FieldType::Integer)]
    #[case(FieldType::Bytes)]
    #[case(FieldType::IntegerList)]
    #[case(FieldType::StringList)]
    fn it_should_recognize_its_own_tag(#[case] field_type: FieldType) {
        assert_eq!(FieldType::from_tag(field_type.tag()), Some(field_type));
    }

    #[test]
    fn it_should_not_recognize_unassigned_tags() {
        assert_eq!(FieldType::from_tag(0x00), None);
        assert_eq!(FieldType::from_tag(0x06), None);
    }

    #[test]
    fn a_string_should_be_encoded_as_tag_length_and_utf8_bytes() {
        let mut buffer = Vec::new();

        Field::String("query".to_string()).encode(&mut buffer).unwrap();

        assert_eq!(buffer, vec![0x01, 0, 0, 0, 5, b'q', b'u', b'e', b'r', b'y']);
    }

    #[test]
    fn an_integer_should_be_encoded_big_endian() {
        let mut buffer = Vec::new();

        Field::Integer(0x0102).encode(&mut buffer).unwrap();

        assert_eq!(buffer, vec![0x02, 0, 0, 0, 0, 0, 0, 0x01, 0x02]);
    }

    #[test]
    fn a_string_list_should_prefix_the_count_and_every_element() {
        let mut buffer = Vec::new();

        Field::StringList(vec!["a".to_string(), "bc".to_string()])
            .encode(&mut buffer)
            .unwrap();

        assert_eq!(buffer, vec![0x05, 0, 0, 0, 2, 0, 0, 0, 1, b'a', 0, 0, 0, 2, b'b', b'c']);
    }

    #[test]
    fn an_empty_list_should_only_carry_its_count() {
        let mut buffer = Vec::new();

        Field::IntegerList(vec![]).encode(&mut buffer).unwrap();

        assert_eq!(buffer, vec![0x04, 0, 0, 0, 0]);
    }
}
