use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A team member. Reference data: the roster order is the canonical display order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub role: String,
}

/// The identity subset of a person carried on display rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonRef {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl From<&Person> for PersonRef {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id.clone(),
            name: person.name.clone(),
            avatar: person.avatar.clone(),
        }
    }
}
