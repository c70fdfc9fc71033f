//! The entities both halves of the application agree on.
//!
//! An entity is a flat set of string fields plus an identifier assigned
//! by the store. Everything that differs between entities (which fields
//! exist, how they sort, which ones a form must fill in, where they are
//! stored and served) is declared here as data, so the backend services
//! and the frontend pages are each written once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The JSON key that carries a record’s identifier. It never collides
/// with a declared field.
pub const ID_KEY: &str = "_id";

/// Field values of a record, keyed by field name.
pub type Fields = BTreeMap<String, String>;

/// The declaration of one entity type.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    /// Singular name used in log output.
    pub name: &'static str,

    /// Path segment of the HTTP resource (`/recipe`, `/login`).
    pub resource: &'static str,

    /// Name of the backing collection.
    pub collection: &'static str,

    /// The declared fields. Their order is also the sort order of
    /// search results, most significant first.
    pub fields: &'static [&'static str],

    /// Fields an edit form refuses to submit while empty.
    pub required: &'static [&'static str],
}

pub static RECIPE: Schema = Schema {
    name: "recipe",
    resource: "recipe",
    collection: "recipes",
    fields: &[
        "name",
        "difficulty",
        "time",
        "serves",
        "category",
        "ingredients",
        "description",
    ],
    required: &["name", "ingredients"],
};

pub static LOGIN: Schema = Schema {
    name: "login",
    resource: "login",
    collection: "user",
    fields: &["username", "email", "password"],
    required: &["username", "password"],
};

/// Every known schema.
pub static ALL: [&Schema; 2] = [&RECIPE, &LOGIN];

impl Schema {
    /// Whether `field` is one of the declared fields.
    pub fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|declared| *declared == field)
    }

    /// A record with every declared field set to the empty string.
    pub fn blank(&self) -> Fields {
        self.fields
            .iter()
            .map(|field| ((*field).to_owned(), String::new()))
            .collect()
    }

    /// Returns the first required field that is missing or empty in
    /// `fields`.
    pub fn first_missing_required(&self, fields: &Fields) -> Option<&'static str> {
        self.required
            .iter()
            .copied()
            .find(|field| fields.get(*field).map_or(true, |value| value.is_empty()))
    }
}

/// Looks up a schema by its resource path segment.
pub fn by_resource(resource: &str) -> Option<&'static Schema> {
    ALL.iter().copied().find(|schema| schema.resource == resource)
}

/// A stored record as it travels over the wire: the identifier under
/// [`ID_KEY`] next to the declared fields.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Record<Id> {
    #[serde(rename = "_id")]
    pub id: Id,

    #[serde(flatten)]
    pub fields: Fields,
}

impl<Id> Record<Id> {
    pub fn new(id: Id, fields: Fields) -> Self {
        Record { id, fields }
    }

    /// The value of `field`, or the empty string if it is not set.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map_or("", String::as_str)
    }
}
