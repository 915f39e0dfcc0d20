//! People and their contacts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cpf::Cpf;
use crate::store::Entity;

/// A registered person. The CPF is always valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: Option<u64>,
    pub name: String,
    pub cpf: Cpf,
}

impl Person {
    pub fn new(name: impl Into<String>, cpf: Cpf) -> Self {
        Self { id: None, name: name.into(), cpf }
    }
}

impl Entity for Person {
    const KIND: &'static str = "person";

    fn id(&self) -> Option<u64> { self.id }
    fn set_id(&mut self, id: u64) { self.id = Some(id); }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id"   => self.id.map(|id| id.to_string()),
            "name" => Some(self.name.clone()),
            "cpf"  => Some(self.cpf.formatted()),
            _      => None,
        }
    }
}

/// How a contact reaches its person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "KindRepr", into = "&'static str")]
pub enum ContactKind {
    Email,
    Phone,
}

impl ContactKind {
    /// Display label used on the wire and in pages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Phone => "Telefone",
        }
    }

    /// Accepts the encodings clients send: `1`/`0`, `true`/`false`, or a label.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "email" => Some(Self::Email),
            "0" | "false" | "telefone" | "phone" => Some(Self::Phone),
            _ => None,
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<ContactKind> for &'static str {
    fn from(kind: ContactKind) -> Self {
        kind.label()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KindRepr {
    Flag(bool),
    Number(u64),
    Text(String),
}

impl TryFrom<KindRepr> for ContactKind {
    type Error = String;

    fn try_from(repr: KindRepr) -> Result<Self, Self::Error> {
        match repr {
            KindRepr::Flag(true) | KindRepr::Number(1) => Ok(Self::Email),
            KindRepr::Flag(false) | KindRepr::Number(0) => Ok(Self::Phone),
            KindRepr::Number(n) => Err(format!("unknown contact kind `{n}`")),
            KindRepr::Text(s) => Self::parse(&s).ok_or_else(|| format!("unknown contact kind `{s}`")),
        }
    }
}

/// An email address or phone number belonging to one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: Option<u64>,
    pub kind: ContactKind,
    pub description: String,
    pub person_id: u64,
}

impl Contact {
    pub fn new(kind: ContactKind, description: impl Into<String>, person_id: u64) -> Self {
        Self { id: None, kind, description: description.into(), person_id }
    }
}

impl Entity for Contact {
    const KIND: &'static str = "contact";

    fn id(&self) -> Option<u64> { self.id }
    fn set_id(&mut self, id: u64) { self.id = Some(id); }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id"          => self.id.map(|id| id.to_string()),
            "kind"        => Some(self.kind.label().to_owned()),
            "description" => Some(self.description.clone()),
            "person_id"   => Some(self.person_id.to_string()),
            _             => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_kind_accepts_client_encodings() {
        assert_eq!(serde_json::from_str::<ContactKind>("true").unwrap(), ContactKind::Email);
        assert_eq!(serde_json::from_str::<ContactKind>("0").unwrap(), ContactKind::Phone);
        assert_eq!(serde_json::from_str::<ContactKind>(r#""1""#).unwrap(), ContactKind::Email);
        assert_eq!(serde_json::from_str::<ContactKind>(r#""Telefone""#).unwrap(), ContactKind::Phone);
        assert!(serde_json::from_str::<ContactKind>("7").is_err());
        assert!(serde_json::from_str::<ContactKind>(r#""fax""#).is_err());
    }

    #[test]
    fn contact_kind_serialises_as_label() {
        assert_eq!(serde_json::to_string(&ContactKind::Email).unwrap(), r#""Email""#);
        assert_eq!(serde_json::to_string(&ContactKind::Phone).unwrap(), r#""Telefone""#);
    }

    #[test]
    fn fields_expose_criteria_values() {
        let mut person = Person::new("Ana", Cpf::parse("52998224725").unwrap());
        assert_eq!(person.field("id"), None);
        person.set_id(3);
        assert_eq!(person.field("id").as_deref(), Some("3"));
        assert_eq!(person.field("cpf").as_deref(), Some("529.982.247-25"));
        assert_eq!(person.field("nope"), None);

        let contact = Contact::new(ContactKind::Phone, "555-0100", 3);
        assert_eq!(contact.field("person_id").as_deref(), Some("3"));
        assert_eq!(contact.field("kind").as_deref(), Some("Telefone"));
    }
}
