//! The application's route tables.
//!
//! Collaborators are wired here, once, when the tables are built. Order
//! within each table matters: literal paths that a `{id}` template would
//! also match (`contatos/pessoas`, `pessoas/excluir`) are either declared
//! first or separated by method.

use std::sync::Arc;

use crate::controller::api::{ContactApi, PersonApi};
use crate::controller::web::{self, ContactPages, PersonPages};
use crate::handler::action;
use crate::health;
use crate::method::Method;
use crate::model::{Contact, Person};
use crate::router::{RouteTable, Router};
use crate::service::{ContactService, PersonService};
use crate::store::{MemoryRepository, Repository};

/// The services every controller draws from.
#[derive(Clone)]
pub struct Services {
    pub people: Arc<PersonService>,
    pub contacts: Arc<ContactService>,
}

impl Services {
    pub fn new(people: Arc<dyn Repository<Person>>, contacts: Arc<dyn Repository<Contact>>) -> Self {
        Self {
            people: Arc::new(PersonService::new(Arc::clone(&people), Arc::clone(&contacts))),
            contacts: Arc::new(ContactService::new(contacts, people)),
        }
    }

    /// Services over fresh in-memory repositories.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryRepository::<Person>::new()),
            Arc::new(MemoryRepository::<Contact>::new()),
        )
    }
}

/// JSON routes. `prefix` is the API prefix, e.g. `/api/`.
pub fn api_routes(services: &Services, prefix: &str) -> RouteTable {
    let people = Arc::new(PersonApi::new(Arc::clone(&services.people)));
    let contacts = Arc::new(ContactApi::new(Arc::clone(&services.contacts)));
    let at = |path: &str| format!("{prefix}{path}");

    RouteTable::new()
        .on(Method::Post,   &at("contatos"),            action(&contacts, ContactApi::create))
        .on(Method::Get,    &at("contatos"),            action(&contacts, ContactApi::list))
        .on(Method::Get,    &at("contatos/pessoas"),    action(&contacts, ContactApi::list_with_person))
        .on(Method::Get,    &at("contatos/{id}"),       action(&contacts, ContactApi::show))
        .on(Method::Get,    &at("contatos/pessoas/{id}"), action(&contacts, ContactApi::show_with_person))
        .on(Method::Put,    &at("contatos/{id}"),       action(&contacts, ContactApi::update))
        .on(Method::Delete, &at("contatos/{id}"),       action(&contacts, ContactApi::delete))
        .on(Method::Post,   &at("pessoas"),             action(&people, PersonApi::create))
        .on(Method::Get,    &at("pessoas"),             action(&people, PersonApi::list))
        .on(Method::Get,    &at("pessoas/{id}"),        action(&people, PersonApi::show))
        .on(Method::Get,    &at("pessoas/contatos/{id}"), action(&people, PersonApi::show_with_contacts))
        .on(Method::Put,    &at("pessoas/{id}"),        action(&people, PersonApi::update))
        .on(Method::Delete, &at("pessoas/{id}"),        action(&people, PersonApi::delete))
}

/// Pages, form posts and health probes.
pub fn web_routes(services: &Services) -> RouteTable {
    let people = Arc::new(PersonPages::new(Arc::clone(&services.people)));
    let contacts = Arc::new(ContactPages::new(Arc::clone(&services.contacts)));

    RouteTable::new()
        .on(Method::Get,  "",                  web::home)
        .on(Method::Get,  "/healthz",          health::liveness)
        .on(Method::Get,  "/readyz",           health::readiness)
        .on(Method::Get,  "/pessoas",          action(&people, PersonPages::index))
        .on(Method::Get,  "/pessoas/{id}",     action(&people, PersonPages::show))
        .on(Method::Post, "/pessoas",          action(&people, PersonPages::create))
        .on(Method::Post, "/pessoas/excluir",  action(&people, PersonPages::delete))
        .on(Method::Post, "/pessoas/editar",   action(&people, PersonPages::update))
        .on(Method::Get,  "/contatos",         action(&contacts, ContactPages::index))
        .on(Method::Get,  "/contatos/{id}",    action(&contacts, ContactPages::show))
        .on(Method::Post, "/contatos",         action(&contacts, ContactPages::create))
        .on(Method::Post, "/contatos/excluir", action(&contacts, ContactPages::delete))
        .on(Method::Post, "/contatos/editar",  action(&contacts, ContactPages::update))
}

/// Both tables behind one [`Router`].
pub fn router(services: &Services, api_prefix: &str) -> Router {
    Router::with_prefix(api_prefix, api_routes(services, api_prefix), web_routes(services))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(router: &Router, method: Method, path: &str) -> Option<String> {
        router
            .resolve(method, path)
            .map(|m| m.route().template().as_str().to_owned())
    }

    #[test]
    fn literal_api_paths_win_over_id_templates() {
        let router = router(&Services::in_memory(), "/api/");
        assert_eq!(template(&router, Method::Get, "/api/contatos/pessoas").as_deref(), Some("/api/contatos/pessoas"));
        assert_eq!(template(&router, Method::Get, "/api/contatos/5").as_deref(), Some("/api/contatos/{id}"));
        assert_eq!(template(&router, Method::Get, "/api/contatos/pessoas/5").as_deref(), Some("/api/contatos/pessoas/{id}"));
        assert_eq!(template(&router, Method::Get, "/api/pessoas/contatos/5").as_deref(), Some("/api/pessoas/contatos/{id}"));
    }

    #[test]
    fn web_form_posts_are_separated_by_method() {
        let router = router(&Services::in_memory(), "/api/");
        assert_eq!(template(&router, Method::Get, "/pessoas/excluir").as_deref(), Some("/pessoas/{id}"));
        assert_eq!(template(&router, Method::Post, "/pessoas/excluir").as_deref(), Some("/pessoas/excluir"));
        assert_eq!(template(&router, Method::Post, "/contatos/editar/").as_deref(), Some("/contatos/editar"));
        assert_eq!(template(&router, Method::Get, "/").as_deref(), Some(""));
    }

    #[test]
    fn partitions_never_cross() {
        let router = router(&Services::in_memory(), "/api/");
        assert_eq!(template(&router, Method::Get, "/api/healthz"), None);
        assert_eq!(template(&router, Method::Put, "/pessoas/1"), None);
    }

    #[test]
    fn api_prefix_is_configurable() {
        let router = router(&Services::in_memory(), "/v2/");
        assert_eq!(template(&router, Method::Get, "/v2/pessoas").as_deref(), Some("/v2/pessoas"));
        assert_eq!(template(&router, Method::Get, "/api/pessoas"), None);
    }
}
