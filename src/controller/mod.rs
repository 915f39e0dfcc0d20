//! HTTP-facing controllers.
//!
//! Each controller owns the service it needs and exposes one async method
//! per route, bound into a route table with [`action`](crate::handler::action).
//! Errors from the service layer become responses here and nowhere else.

pub mod api;
pub mod dto;
pub mod view;
pub mod web;

use tracing::{error, warn};

use crate::request::Form;
use crate::response::{IntoResponse, Json, Response};
use crate::route::Params;
use crate::service::{Result, ServiceError};
use crate::status::Status;

use dto::ErrorBody;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::NotFound { .. } | ServiceError::PersonNotFound(_) => Status::NotFound,
            ServiceError::InvalidCpf(_) => Status::UnprocessableContent,
            ServiceError::Invalid(_) => Status::BadRequest,
            ServiceError::Store(e) => {
                error!("storage failure: {e}");
                Status::InternalServerError
            }
        };
        if status != Status::InternalServerError {
            warn!(status = status.code(), "request rejected: {self}");
        }
        Json(status, ErrorBody::new(self.to_string())).into_response()
    }
}

/// The numeric id a route captured as `{id}`.
pub(crate) fn path_id(params: &Params) -> Result<u64> {
    let raw = params.get("id").unwrap_or_default();
    raw.parse()
        .map_err(|_| ServiceError::Invalid(format!("invalid id `{raw}`")))
}

/// A required, non-blank form field.
pub(crate) fn form_field<'a>(form: &'a Form, name: &str) -> Result<&'a str> {
    form.get(name)
        .ok_or_else(|| ServiceError::Invalid(format!("missing field `{name}`")))
}

pub(crate) fn form_id(form: &Form, name: &str) -> Result<u64> {
    let raw = form_field(form, name)?;
    raw.parse()
        .map_err(|_| ServiceError::Invalid(format!("invalid `{name}` `{raw}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpf::Cpf;
    use crate::method::Method;
    use crate::request::Request;
    use crate::route::RouteTemplate;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::NotFound { kind: "person", id: 1 }, Status::NotFound),
            (ServiceError::PersonNotFound(1), Status::NotFound),
            (Cpf::parse("1").unwrap_err().into(), Status::UnprocessableContent),
            (ServiceError::Invalid("x".into()), Status::BadRequest),
        ];
        for (err, status) in cases {
            let res = err.into_response();
            assert_eq!(res.status_code(), status);
            assert!(String::from_utf8_lossy(res.body()).starts_with(r#"{"erro":"#));
        }
    }

    #[test]
    fn path_id_rejects_non_numeric_ids() {
        let template = RouteTemplate::parse("/pessoas/{id}").unwrap();
        assert_eq!(path_id(&template.matches("/pessoas/12").unwrap()).unwrap(), 12);
        assert!(path_id(&template.matches("/pessoas/abc").unwrap()).is_err());
    }

    #[test]
    fn form_helpers_require_fields() {
        let form = Request::new(Method::Post, "/").with_body("id=7&nome=").form();
        assert_eq!(form_id(&form, "id").unwrap(), 7);
        assert!(form_field(&form, "nome").is_err());
        assert!(form_id(&form, "idPessoa").is_err());
    }
}
