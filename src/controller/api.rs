//! JSON endpoints under `/api/`.

use std::sync::Arc;

use crate::request::Request;
use crate::response::Json;
use crate::route::Params;
use crate::service::{ContactService, PersonService, Result, ServiceError};
use crate::status::Status;

use super::dto::{
    ContactBody, ContactInput, ContactWithPersonBody, PersonBody, PersonInput,
    PersonWithContactsBody,
};
use super::path_id;

fn body<T: serde::de::DeserializeOwned>(req: &Request) -> Result<T> {
    req.json().map_err(|e| ServiceError::Invalid(format!("invalid data: {e}")))
}

pub struct PersonApi {
    service: Arc<PersonService>,
}

impl PersonApi {
    pub fn new(service: Arc<PersonService>) -> Self {
        Self { service }
    }

    /// `POST /api/pessoas`
    pub async fn create(self: Arc<Self>, req: Request, _: Params) -> Result<Json<PersonBody>> {
        let input: PersonInput = body(&req)?;
        let person = self.service.create(&input.name, &input.cpf).await?;
        Ok(Json(Status::Created, (&person).into()))
    }

    /// `GET /api/pessoas`
    pub async fn list(self: Arc<Self>, _: Request, _: Params) -> Result<Json<Vec<PersonWithContactsBody>>> {
        let people = self.service.list_with_contacts().await?;
        Ok(Json::ok(
            people.iter().map(|(p, contacts)| PersonWithContactsBody::new(p, contacts)).collect(),
        ))
    }

    /// `GET /api/pessoas/{id}`
    pub async fn show(self: Arc<Self>, _: Request, params: Params) -> Result<Json<PersonBody>> {
        let person = self.service.get(path_id(&params)?).await?;
        Ok(Json::ok((&person).into()))
    }

    /// `GET /api/pessoas/contatos/{id}`
    pub async fn show_with_contacts(
        self: Arc<Self>,
        _: Request,
        params: Params,
    ) -> Result<Json<PersonWithContactsBody>> {
        let (person, contacts) = self.service.get_with_contacts(path_id(&params)?).await?;
        Ok(Json::ok(PersonWithContactsBody::new(&person, &contacts)))
    }

    /// `PUT /api/pessoas/{id}`
    pub async fn update(self: Arc<Self>, req: Request, params: Params) -> Result<Json<PersonBody>> {
        let id = path_id(&params)?;
        let input: PersonInput = body(&req)?;
        let person = self.service.update(id, &input.name, &input.cpf).await?;
        Ok(Json::ok((&person).into()))
    }

    /// `DELETE /api/pessoas/{id}`
    pub async fn delete(self: Arc<Self>, _: Request, params: Params) -> Result<Status> {
        self.service.delete(path_id(&params)?).await?;
        Ok(Status::NoContent)
    }
}

pub struct ContactApi {
    service: Arc<ContactService>,
}

impl ContactApi {
    pub fn new(service: Arc<ContactService>) -> Self {
        Self { service }
    }

    /// `POST /api/contatos`
    pub async fn create(self: Arc<Self>, req: Request, _: Params) -> Result<Json<ContactBody>> {
        let input: ContactInput = body(&req)?;
        let contact = self.service.create(input.kind, &input.description, input.person_id).await?;
        Ok(Json(Status::Created, (&contact).into()))
    }

    /// `GET /api/contatos`
    pub async fn list(self: Arc<Self>, _: Request, _: Params) -> Result<Json<Vec<ContactBody>>> {
        let contacts = self.service.list().await?;
        Ok(Json::ok(contacts.iter().map(ContactBody::from).collect()))
    }

    /// `GET /api/contatos/pessoas`
    pub async fn list_with_person(
        self: Arc<Self>,
        _: Request,
        _: Params,
    ) -> Result<Json<Vec<ContactWithPersonBody>>> {
        let joined = self.service.list_with_person().await?;
        Ok(Json::ok(joined.iter().map(|(c, p)| ContactWithPersonBody::new(c, p)).collect()))
    }

    /// `GET /api/contatos/{id}`
    pub async fn show(self: Arc<Self>, _: Request, params: Params) -> Result<Json<ContactBody>> {
        let contact = self.service.get(path_id(&params)?).await?;
        Ok(Json::ok((&contact).into()))
    }

    /// `GET /api/contatos/pessoas/{id}`
    pub async fn show_with_person(
        self: Arc<Self>,
        _: Request,
        params: Params,
    ) -> Result<Json<ContactWithPersonBody>> {
        let (contact, person) = self.service.get_with_person(path_id(&params)?).await?;
        Ok(Json::ok(ContactWithPersonBody::new(&contact, &person)))
    }

    /// `PUT /api/contatos/{id}`
    pub async fn update(self: Arc<Self>, req: Request, params: Params) -> Result<Json<ContactBody>> {
        let id = path_id(&params)?;
        let input: ContactInput = body(&req)?;
        let contact = self
            .service
            .update(id, input.kind, &input.description, input.person_id)
            .await?;
        Ok(Json::ok((&contact).into()))
    }

    /// `DELETE /api/contatos/{id}`
    pub async fn delete(self: Arc<Self>, _: Request, params: Params) -> Result<Status> {
        self.service.delete(path_id(&params)?).await?;
        Ok(Status::NoContent)
    }
}
