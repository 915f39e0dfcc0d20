//! Wire records for the JSON API.
//!
//! Field names are the ones the existing frontend speaks (`nome`, `cpf`,
//! `tipo`, `descricao`, `idPessoa`).

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{Contact, ContactKind, Person};

#[derive(Debug, Deserialize)]
pub struct PersonInput {
    #[serde(rename = "nome")]
    pub name: String,
    pub cpf: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactInput {
    #[serde(rename = "tipo")]
    pub kind: ContactKind,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "idPessoa", deserialize_with = "id_from_number_or_text")]
    pub person_id: u64,
}

/// Select boxes post ids as strings; accept both.
fn id_from_number_or_text<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    match Id::deserialize(d)? {
        Id::Number(n) => Ok(n),
        Id::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Serialize)]
pub struct PersonBody {
    pub id: Option<u64>,
    #[serde(rename = "nome")]
    pub name: String,
    pub cpf: String,
}

impl From<&Person> for PersonBody {
    fn from(p: &Person) -> Self {
        Self { id: p.id, name: p.name.clone(), cpf: p.cpf.formatted() }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactSummary {
    #[serde(rename = "tipo")]
    pub kind: ContactKind,
    #[serde(rename = "descricao")]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct PersonWithContactsBody {
    #[serde(flatten)]
    pub person: PersonBody,
    #[serde(rename = "contatos")]
    pub contacts: Vec<ContactSummary>,
}

impl PersonWithContactsBody {
    pub fn new(person: &Person, contacts: &[Contact]) -> Self {
        Self {
            person: person.into(),
            contacts: contacts
                .iter()
                .map(|c| ContactSummary { kind: c.kind, description: c.description.clone() })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactBody {
    pub id: Option<u64>,
    #[serde(rename = "tipo")]
    pub kind: ContactKind,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "idPessoa")]
    pub person_id: u64,
}

impl From<&Contact> for ContactBody {
    fn from(c: &Contact) -> Self {
        Self { id: c.id, kind: c.kind, description: c.description.clone(), person_id: c.person_id }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactWithPersonBody {
    pub id: Option<u64>,
    #[serde(rename = "tipo")]
    pub kind: ContactKind,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "pessoa")]
    pub person: PersonBody,
}

impl ContactWithPersonBody {
    pub fn new(contact: &Contact, person: &Person) -> Self {
        Self {
            id: contact.id,
            kind: contact.kind,
            description: contact.description.clone(),
            person: person.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "erro")]
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    #[serde(rename = "mensagem")]
    pub message: String,
}
