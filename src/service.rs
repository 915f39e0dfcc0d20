//! Person and contact use cases.
//!
//! Services validate input before touching storage: a request that fails
//! validation never causes a write.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cpf::{Cpf, InvalidCpf};
use crate::model::{Contact, ContactKind, Person};
use crate::store::{Criteria, Repository, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    #[error("associated person {0} not found")]
    PersonNotFound(u64),

    #[error(transparent)]
    InvalidCpf(#[from] InvalidCpf),

    #[error("{0}")]
    Invalid(String),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Invalid(format!("`{field}` must not be empty")));
    }
    Ok(value.to_owned())
}

// ── People ────────────────────────────────────────────────────────────────────

pub struct PersonService {
    people: Arc<dyn Repository<Person>>,
    contacts: Arc<dyn Repository<Contact>>,
}

impl PersonService {
    pub fn new(people: Arc<dyn Repository<Person>>, contacts: Arc<dyn Repository<Contact>>) -> Self {
        Self { people, contacts }
    }

    pub async fn create(&self, name: &str, cpf: &str) -> Result<Person> {
        let name = required("nome", name)?;
        let cpf = Cpf::parse(cpf)?;

        let mut person = Person::new(name, cpf);
        let id = self.people.create(person.clone()).await?;
        person.id = Some(id);
        info!(id, "person created");
        Ok(person)
    }

    pub async fn list(&self) -> Result<Vec<Person>> {
        Ok(self.people.list_all().await?)
    }

    /// Every person with their contacts, in id order.
    pub async fn list_with_contacts(&self) -> Result<Vec<(Person, Vec<Contact>)>> {
        let people = self.people.list_all().await?;
        let mut by_person: HashMap<u64, Vec<Contact>> = HashMap::new();
        for contact in self.contacts.list_all().await? {
            by_person.entry(contact.person_id).or_default().push(contact);
        }
        Ok(people
            .into_iter()
            .map(|p| {
                let contacts = p.id.and_then(|id| by_person.remove(&id)).unwrap_or_default();
                (p, contacts)
            })
            .collect())
    }

    pub async fn get(&self, id: u64) -> Result<Person> {
        self.people
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound { kind: "person", id })
    }

    pub async fn get_with_contacts(&self, id: u64) -> Result<(Person, Vec<Contact>)> {
        let person = self.get(id).await?;
        let contacts = self.contacts.list_by(&Criteria::new().with("person_id", id)).await?;
        Ok((person, contacts))
    }

    pub async fn update(&self, id: u64, name: &str, cpf: &str) -> Result<Person> {
        let name = required("nome", name)?;
        let cpf = Cpf::parse(cpf)?;

        let mut person = self.get(id).await?;
        person.name = name;
        person.cpf = cpf;
        self.people.update(&person).await?;
        info!(id, "person updated");
        Ok(person)
    }

    /// Deletes the person and every contact they own.
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.get(id).await?;
        let owned = self.contacts.list_by(&Criteria::new().with("person_id", id)).await?;
        for contact in &owned {
            if let Some(contact_id) = contact.id {
                self.contacts.delete(contact_id).await?;
            }
        }
        self.people.delete(id).await?;
        info!(id, contacts = owned.len(), "person deleted");
        Ok(())
    }

    pub async fn find_by(&self, criteria: &Criteria) -> Result<Vec<Person>> {
        Ok(self.people.list_by(criteria).await?)
    }
}

// ── Contacts ──────────────────────────────────────────────────────────────────

pub struct ContactService {
    contacts: Arc<dyn Repository<Contact>>,
    people: Arc<dyn Repository<Person>>,
}

impl ContactService {
    pub fn new(contacts: Arc<dyn Repository<Contact>>, people: Arc<dyn Repository<Person>>) -> Self {
        Self { contacts, people }
    }

    async fn person(&self, person_id: u64) -> Result<Person> {
        self.people
            .get_by_id(person_id)
            .await?
            .ok_or(ServiceError::PersonNotFound(person_id))
    }

    pub async fn create(&self, kind: ContactKind, description: &str, person_id: u64) -> Result<Contact> {
        let description = required("descricao", description)?;
        self.person(person_id).await?;

        let mut contact = Contact::new(kind, description, person_id);
        let id = self.contacts.create(contact.clone()).await?;
        contact.id = Some(id);
        info!(id, person_id, "contact created");
        Ok(contact)
    }

    pub async fn list(&self) -> Result<Vec<Contact>> {
        Ok(self.contacts.list_all().await?)
    }

    /// Every contact joined with its person.
    pub async fn list_with_person(&self) -> Result<Vec<(Contact, Person)>> {
        let people: HashMap<u64, Person> = self
            .people
            .list_all()
            .await?
            .into_iter()
            .filter_map(|p| Some((p.id?, p)))
            .collect();

        let mut joined = Vec::new();
        for contact in self.contacts.list_all().await? {
            match people.get(&contact.person_id) {
                Some(person) => joined.push((contact, person.clone())),
                None => warn!(id = ?contact.id, person_id = contact.person_id, "contact without person"),
            }
        }
        Ok(joined)
    }

    pub async fn get(&self, id: u64) -> Result<Contact> {
        self.contacts
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound { kind: "contact", id })
    }

    pub async fn get_with_person(&self, id: u64) -> Result<(Contact, Person)> {
        let contact = self.get(id).await?;
        let person = self.person(contact.person_id).await?;
        Ok((contact, person))
    }

    pub async fn update(
        &self,
        id: u64,
        kind: ContactKind,
        description: &str,
        person_id: u64,
    ) -> Result<Contact> {
        let description = required("descricao", description)?;
        let mut contact = self.get(id).await?;
        self.person(person_id).await?;

        contact.kind = kind;
        contact.description = description;
        contact.person_id = person_id;
        self.contacts.update(&contact).await?;
        info!(id, person_id, "contact updated");
        Ok(contact)
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.get(id).await?;
        self.contacts.delete(id).await?;
        info!(id, "contact deleted");
        Ok(())
    }

    /// People a contact can be attached to.
    pub async fn people(&self) -> Result<Vec<Person>> {
        Ok(self.people.list_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRepository;

    const CPF: &str = "529.982.247-25";

    fn services() -> (PersonService, ContactService) {
        let people: Arc<dyn Repository<Person>> = Arc::new(MemoryRepository::<Person>::new());
        let contacts: Arc<dyn Repository<Contact>> = Arc::new(MemoryRepository::<Contact>::new());
        (
            PersonService::new(Arc::clone(&people), Arc::clone(&contacts)),
            ContactService::new(contacts, people),
        )
    }

    #[tokio::test]
    async fn create_stores_canonical_cpf() {
        let (people, _) = services();
        let person = people.create(" Ana ", "52998224725").await.unwrap();
        assert_eq!(person.id, Some(1));
        assert_eq!(person.name, "Ana");
        assert_eq!(people.get(1).await.unwrap().cpf.formatted(), CPF);
    }

    #[tokio::test]
    async fn invalid_cpf_never_reaches_storage() {
        let (people, _) = services();
        let err = people.create("Ana", "111.111.111-11").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCpf(_)));
        assert!(people.list().await.unwrap().is_empty());

        let id = people.create("Ana", CPF).await.unwrap().id.unwrap();
        let err = people.update(id, "Bia", "123.456.789-00").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCpf(_)));
        assert_eq!(people.get(id).await.unwrap().name, "Ana");
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let (people, _) = services();
        assert!(matches!(people.create("  ", CPF).await, Err(ServiceError::Invalid(_))));
    }

    #[tokio::test]
    async fn deleting_a_person_removes_their_contacts() {
        let (people, contacts) = services();
        let ana = people.create("Ana", CPF).await.unwrap().id.unwrap();
        let bia = people.create("Bia", "111.444.777-35").await.unwrap().id.unwrap();
        contacts.create(ContactKind::Email, "ana@x.com", ana).await.unwrap();
        contacts.create(ContactKind::Phone, "555", ana).await.unwrap();
        contacts.create(ContactKind::Phone, "777", bia).await.unwrap();

        people.delete(ana).await.unwrap();
        let left = contacts.list().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].person_id, bia);
        assert!(matches!(people.get(ana).await, Err(ServiceError::NotFound { .. })));
        assert!(matches!(people.delete(ana).await, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_with_contacts_groups_by_person() {
        let (people, contacts) = services();
        let ana = people.create("Ana", CPF).await.unwrap().id.unwrap();
        people.create("Bia", "111.444.777-35").await.unwrap();
        contacts.create(ContactKind::Email, "ana@x.com", ana).await.unwrap();

        let listed = people.list_with_contacts().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].1.len(), 1);
        assert!(listed[1].1.is_empty());

        let (person, owned) = people.get_with_contacts(ana).await.unwrap();
        assert_eq!(person.name, "Ana");
        assert_eq!(owned[0].description, "ana@x.com");
    }

    #[tokio::test]
    async fn contacts_require_an_existing_person() {
        let (people, contacts) = services();
        let err = contacts.create(ContactKind::Email, "x@y.z", 42).await.unwrap_err();
        assert!(matches!(err, ServiceError::PersonNotFound(42)));
        assert!(contacts.list().await.unwrap().is_empty());

        let ana = people.create("Ana", CPF).await.unwrap().id.unwrap();
        let id = contacts.create(ContactKind::Email, "x@y.z", ana).await.unwrap().id.unwrap();
        let err = contacts.update(id, ContactKind::Phone, "555", 42).await.unwrap_err();
        assert!(matches!(err, ServiceError::PersonNotFound(42)));
        assert_eq!(contacts.get(id).await.unwrap().kind, ContactKind::Email);
    }

    #[tokio::test]
    async fn contact_update_and_join() {
        let (people, contacts) = services();
        let ana = people.create("Ana", CPF).await.unwrap().id.unwrap();
        let id = contacts.create(ContactKind::Email, "x@y.z", ana).await.unwrap().id.unwrap();

        let updated = contacts.update(id, ContactKind::Phone, "555-0100", ana).await.unwrap();
        assert_eq!(updated.kind, ContactKind::Phone);

        let (contact, person) = contacts.get_with_person(id).await.unwrap();
        assert_eq!(contact.description, "555-0100");
        assert_eq!(person.name, "Ana");
        assert_eq!(contacts.list_with_person().await.unwrap().len(), 1);

        contacts.delete(id).await.unwrap();
        assert!(matches!(contacts.get(id).await, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn find_by_matches_fields() {
        let (people, _) = services();
        people.create("Ana", CPF).await.unwrap();
        people.create("Bia", "111.444.777-35").await.unwrap();
        let found = people.find_by(&Criteria::new().with("cpf", "111.444.777-35")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bia");
    }
}
