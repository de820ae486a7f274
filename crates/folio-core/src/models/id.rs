//! Record ids that may arrive as JSON strings or numbers.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Id of a store record.
///
/// Document-backed endpoints send `"_id": "65f1..."`, SQL-backed ones send
/// `"id": 42`. Both compare by their text form, so an id typed on the command
/// line matches either.
#[derive(Debug, Clone)]
pub struct RecordId {
    text: String,
    number: Option<i64>,
}

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The numeric value, when the server sent one.
    pub fn as_number(&self) -> Option<i64> {
        self.number
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for RecordId {}

impl std::hash::Hash for RecordId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for RecordId {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

impl From<String> for RecordId {
    fn from(text: String) -> Self {
        Self { text, number: None }
    }
}

impl From<i64> for RecordId {
    fn from(number: i64) -> Self {
        Self {
            text: number.to_string(),
            number: Some(number),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordIdVisitor;

        impl<'de> de::Visitor<'de> for RecordIdVisitor {
            type Value = RecordId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer id")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(RecordId::from(v))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
                Ok(RecordId::from(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(RecordId::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(RecordId::from)
                    .map_err(|_| E::custom(format!("id {} out of range", v)))
            }
        }

        deserializer.deserialize_any(RecordIdVisitor)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.number {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_str(&self.text),
        }
    }
}
