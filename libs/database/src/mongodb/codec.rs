//! Encoding shared by stored documents and the filters that query them.
//!
//! The driver serializes documents in non-human-readable mode, so a `Uuid`
//! lands as generic BSON binary. Anything built by hand (filters, `$set`
//! fields, pushed array elements) must go through this module to produce the
//! same bytes, otherwise equality matches silently miss.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Binary, Bson, Document, spec::BinarySubtype};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// `Uuid` exactly as the driver stores it
pub fn uuid_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Generic,
        bytes: id.as_bytes().to_vec(),
    })
}

/// `{ "_id": <id> }`
pub fn id_filter(id: Uuid) -> Document {
    bson::doc! { "_id": uuid_bson(id) }
}

/// Current time as a BSON date, for `$set` updates
pub fn now_bson() -> Bson {
    Bson::DateTime(bson::DateTime::now())
}

/// Serialize a struct the way `insert_one`/`replace_one` would
pub fn to_stored_document<T: Serialize>(value: &T) -> mongodb::error::Result<Document> {
    Ok(bson::from_slice(&bson::to_vec(value)?)?)
}

/// Serialize any value (array, nested struct) the way the driver would
pub fn to_stored_bson<T: Serialize>(value: &T) -> mongodb::error::Result<Bson> {
    #[derive(Serialize)]
    struct Field<'a, T> {
        value: &'a T,
    }

    let mut doc = to_stored_document(&Field { value })?;
    Ok(doc.remove("value").unwrap_or(Bson::Null))
}

/// Case-insensitive substring match on any of `fields`, with `search` taken literally
pub fn text_search(fields: &[&str], search: &str) -> Vec<Document> {
    let pattern = regex_escape(search.trim());
    fields
        .iter()
        .map(|field| {
            let mut clause = Document::new();
            clause.insert(*field, bson::doc! { "$regex": pattern.as_str(), "$options": "i" });
            clause
        })
        .collect()
}

/// Escape regex metacharacters so user input matches literally
pub fn regex_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\.+*?()|[]{}^$#-/".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn chrono_from_bson<E: serde::de::Error>(value: Bson) -> Result<DateTime<Utc>, E> {
    match value {
        Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis())
            .ok_or_else(|| E::custom("timestamp out of range")),
        // Documents written before dates were stored natively
        Bson::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(E::custom),
        other => Err(E::custom(format!(
            "expected a timestamp, found {:?}",
            other.element_type()
        ))),
    }
}

/// `#[serde(with = "...")]` for `DateTime<Utc>` fields of stored models.
///
/// RFC3339 in JSON, native BSON dates in MongoDB so sorting and range
/// queries compare instants rather than strings.
pub mod datetime {
    use super::*;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            value.serialize(serializer)
        } else {
            bson::DateTime::from_millis(value.timestamp_millis()).serialize(serializer)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        chrono_from_bson(Bson::deserialize(deserializer)?)
    }
}

/// [`datetime`] for `Option<DateTime<Utc>>`; pair with `#[serde(default)]`
pub mod datetime_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::datetime::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<Bson>::deserialize(deserializer)? {
            None | Some(Bson::Null) => Ok(None),
            Some(value) => chrono_from_bson(value).map(Some),
        }
    }
}
