//! Page and form endpoints outside `/api/`.
//!
//! `GET` on a collection renders HTML. The per-record `GET` and the form
//! `POST`s answer JSON, which is what the page scripts consume.

use std::sync::Arc;

use crate::model::ContactKind;
use crate::request::{Form, Request};
use crate::response::{Json, Response};
use crate::route::Params;
use crate::service::{ContactService, PersonService, Result, ServiceError};
use crate::status::Status;

use super::dto::{ContactBody, ContactWithPersonBody, MessageBody, PersonBody};
use super::{form_field, form_id, path_id, view};

/// `GET /`
pub async fn home(_: Request, _: Params) -> Response {
    Response::html(view::home())
}

fn deleted(what: &str) -> Json<MessageBody> {
    Json::ok(MessageBody { message: format!("{what} deleted") })
}

pub struct PersonPages {
    service: Arc<PersonService>,
}

impl PersonPages {
    pub fn new(service: Arc<PersonService>) -> Self {
        Self { service }
    }

    /// `GET /pessoas`
    pub async fn index(self: Arc<Self>, _: Request, _: Params) -> Result<Response> {
        let people = self.service.list().await?;
        Ok(Response::html(view::people(&people)))
    }

    /// `GET /pessoas/{id}`
    pub async fn show(self: Arc<Self>, _: Request, params: Params) -> Result<Json<PersonBody>> {
        let person = self.service.get(path_id(&params)?).await?;
        Ok(Json::ok((&person).into()))
    }

    /// `POST /pessoas`
    pub async fn create(self: Arc<Self>, req: Request, _: Params) -> Result<Json<PersonBody>> {
        let form = req.form();
        let person = self
            .service
            .create(form_field(&form, "nome")?, form_field(&form, "cpf")?)
            .await?;
        Ok(Json(Status::Created, (&person).into()))
    }

    /// `POST /pessoas/editar`
    pub async fn update(self: Arc<Self>, req: Request, _: Params) -> Result<Json<PersonBody>> {
        let form = req.form();
        let id = form_id(&form, "id")?;
        let person = self
            .service
            .update(id, form_field(&form, "nome")?, form_field(&form, "cpf")?)
            .await?;
        Ok(Json::ok((&person).into()))
    }

    /// `POST /pessoas/excluir`
    pub async fn delete(self: Arc<Self>, req: Request, _: Params) -> Result<Json<MessageBody>> {
        let id = form_id(&req.form(), "id")?;
        self.service.delete(id).await?;
        Ok(deleted("person"))
    }
}

pub struct ContactPages {
    service: Arc<ContactService>,
}

impl ContactPages {
    pub fn new(service: Arc<ContactService>) -> Self {
        Self { service }
    }

    /// `tipo`, `descricao` and the owning person from a posted form.
    ///
    /// The create page's selector posts `idPessoa`; older pages post `pessoa`.
    fn contact_fields(form: &Form) -> Result<(ContactKind, String, u64)> {
        let raw_kind = form_field(form, "tipo")?;
        let kind = ContactKind::parse(raw_kind)
            .ok_or_else(|| ServiceError::Invalid(format!("invalid `tipo` `{raw_kind}`")))?;
        let description = form_field(form, "descricao")?.to_owned();
        let person_id = match form.get("idPessoa") {
            Some(_) => form_id(form, "idPessoa")?,
            None => form_id(form, "pessoa")?,
        };
        Ok((kind, description, person_id))
    }

    /// `GET /contatos`
    pub async fn index(self: Arc<Self>, _: Request, _: Params) -> Result<Response> {
        let contacts = self.service.list_with_person().await?;
        let people = self.service.people().await?;
        Ok(Response::html(view::contacts(&contacts, &people)))
    }

    /// `GET /contatos/{id}`
    pub async fn show(self: Arc<Self>, _: Request, params: Params) -> Result<Json<ContactWithPersonBody>> {
        let (contact, person) = self.service.get_with_person(path_id(&params)?).await?;
        Ok(Json::ok(ContactWithPersonBody::new(&contact, &person)))
    }

    /// `POST /contatos`
    pub async fn create(self: Arc<Self>, req: Request, _: Params) -> Result<Json<ContactBody>> {
        let (kind, description, person_id) = Self::contact_fields(&req.form())?;
        let contact = self.service.create(kind, &description, person_id).await?;
        Ok(Json(Status::Created, (&contact).into()))
    }

    /// `POST /contatos/editar`
    pub async fn update(self: Arc<Self>, req: Request, _: Params) -> Result<Json<ContactBody>> {
        let form = req.form();
        let id = form_id(&form, "id")?;
        let (kind, description, person_id) = Self::contact_fields(&form)?;
        let contact = self.service.update(id, kind, &description, person_id).await?;
        Ok(Json::ok((&contact).into()))
    }

    /// `POST /contatos/excluir`
    pub async fn delete(self: Arc<Self>, req: Request, _: Params) -> Result<Json<MessageBody>> {
        let id = form_id(&req.form(), "id")?;
        self.service.delete(id).await?;
        Ok(deleted("contact"))
    }
}
