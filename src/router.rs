//! Ordered first-match request router.
//!
//! Two tables: one for paths under the API prefix (`/api/` by default), one
//! for everything else. A request goes to exactly one of them.
//!
//! Inside a table the routes are tried in declared order and the first one
//! that accepts the method and matches the path wins. There is no
//! specificity scoring, so a literal route that overlaps a placeholder route
//! (`/api/contatos/pessoas` vs `/api/contatos/{id}`) must be declared first.

use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::route::{Params, RouteError, RouteTemplate, trim_path};
use crate::status::Status;

pub const DEFAULT_API_PREFIX: &str = "/api/";

/// One entry of a [`RouteTable`].
pub struct Route {
    template: RouteTemplate,
    methods: Vec<Method>,
    handler: BoxedHandler,
}

impl Route {
    pub fn template(&self) -> &RouteTemplate { &self.template }
    pub fn methods(&self) -> &[Method] { &self.methods }

    /// `HEAD` is served by any route that serves `GET`.
    fn accepts(&self, method: Method) -> bool {
        self.methods.contains(&method)
            || (method == Method::Head && self.methods.contains(&Method::Get))
    }
}

/// A resolved route together with the parameters its template captured.
pub struct Match<'a> {
    route: &'a Route,
    params: Params,
}

impl Match<'_> {
    pub fn route(&self) -> &Route { self.route }
    pub fn params(&self) -> &Params { &self.params }

    /// Invokes the route's handler with the request and the captured params.
    pub async fn call(self, req: Request) -> Response {
        self.route.handler.call(req, self.params).await
    }
}

// ── RouteTable ────────────────────────────────────────────────────────────────

/// An ordered, immutable-once-built list of routes.
///
/// Each registration returns `self` so tables chain naturally:
///
/// ```rust
/// use agenda::{Method, Params, Request, Response, RouteTable};
///
/// async fn list(_: Request, _: Params) -> Response { Response::text("") }
/// async fn create(_: Request, _: Params) -> Response { Response::text("") }
///
/// let table = RouteTable::new()
///     .on(Method::Get,  "/pessoas", list)
///     .on(Method::Post, "/pessoas", create);
/// assert!(table.resolve(Method::Post, "/pessoas/").is_some());
/// ```
pub struct RouteTable {
    prefix: String,
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { prefix: DEFAULT_API_PREFIX.to_owned(), routes: Vec::new() }
    }

    /// Registers `handler` for one method.
    ///
    /// # Panics
    ///
    /// Panics if `template` is malformed. Tables are built at startup, so
    /// a bad template stops the process before it serves anything.
    pub fn on(self, method: Method, template: &str, handler: impl Handler) -> Self {
        self.on_many(&[method], template, handler)
    }

    /// Registers `handler` for every method in `methods`.
    ///
    /// # Panics
    ///
    /// Panics if `template` is malformed.
    pub fn on_many(self, methods: &[Method], template: &str, handler: impl Handler) -> Self {
        self.try_on_many(methods, template, handler)
            .unwrap_or_else(|e| panic!("invalid route: {e}"))
    }

    /// Like [`on_many`](Self::on_many) but returns the compilation error.
    pub fn try_on_many(
        mut self,
        methods: &[Method],
        template: &str,
        handler: impl Handler,
    ) -> Result<Self, RouteError> {
        let template = RouteTemplate::parse(template)?;
        self.routes.push(Route {
            template,
            methods: methods.to_vec(),
            handler: handler.into_boxed_handler(),
        });
        Ok(self)
    }

    pub(crate) fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_owned();
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the first route that accepts `method` and matches `path`.
    ///
    /// Routes on the other side of the prefix partition are skipped: an API
    /// template never matches a non-API path and vice versa.
    pub fn resolve(&self, method: Method, path: &str) -> Option<Match<'_>> {
        let path = trim_path(path);
        let path_is_api = path.starts_with(&self.prefix);

        self.routes.iter().find_map(|route| {
            if route.template.starts_with(&self.prefix) != path_is_api {
                return None;
            }
            if !route.accepts(method) {
                return None;
            }
            let params = route.template.matches(path)?;
            Some(Match { route, params })
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self { Self::new() }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The application router: an API table and a web table split by prefix.
pub struct Router {
    prefix: String,
    api: RouteTable,
    web: RouteTable,
}

impl Router {
    pub fn new(api: RouteTable, web: RouteTable) -> Self {
        Self::with_prefix(DEFAULT_API_PREFIX, api, web)
    }

    pub fn with_prefix(prefix: &str, mut api: RouteTable, mut web: RouteTable) -> Self {
        api.set_prefix(prefix);
        web.set_prefix(prefix);
        Self { prefix: prefix.to_owned(), api, web }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The table responsible for `path`, chosen on the raw, untrimmed path.
    pub fn table_for(&self, path: &str) -> &RouteTable {
        if path.starts_with(&self.prefix) { &self.api } else { &self.web }
    }

    pub fn resolve(&self, method: Method, path: &str) -> Option<Match<'_>> {
        self.table_for(path).resolve(method, path)
    }

    /// Routes one request and produces one response.
    ///
    /// No match in the selected table is a plain `404`, whichever table it was.
    pub async fn dispatch(&self, req: Request) -> Response {
        match self.resolve(req.method(), req.path()) {
            Some(matched) => {
                debug!(
                    method = %req.method(),
                    path = req.path(),
                    route = %matched.route().template(),
                    "route matched"
                );
                matched.call(req).await
            }
            None => {
                debug!(method = %req.method(), path = req.path(), "no route matched");
                not_found()
            }
        }
    }
}

pub(crate) fn not_found() -> Response {
    Response::builder().status(Status::NotFound).text("Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tag: &'static str) -> impl Handler {
        move |_req: Request, params: Params| async move {
            let args: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            Response::text(format!("{tag}:{}", args.join(",")))
        }
    }

    fn pessoas() -> RouteTable {
        RouteTable::new()
            .on(Method::Get,  "/pessoas",      tagged("A"))
            .on(Method::Post, "/pessoas",      tagged("B"))
            .on(Method::Get,  "/pessoas/{id}", tagged("C"))
    }

    async fn body(table: &RouteTable, method: Method, path: &str) -> Option<String> {
        let matched = table.resolve(method, path)?;
        let res = matched.call(Request::new(method, path)).await;
        Some(String::from_utf8(res.body().to_vec()).unwrap())
    }

    #[tokio::test]
    async fn resolves_by_method_and_extracts_params() {
        let table = pessoas();
        assert_eq!(body(&table, Method::Get, "/pessoas").await.as_deref(), Some("A:"));
        assert_eq!(body(&table, Method::Post, "/pessoas").await.as_deref(), Some("B:"));
        assert_eq!(body(&table, Method::Get, "/pessoas/42").await.as_deref(), Some("C:id=42"));
        assert!(table.resolve(Method::Delete, "/pessoas").is_none());
    }

    #[test]
    fn match_exposes_params_in_order() {
        let table = pessoas();
        let matched = table.resolve(Method::Get, "/pessoas/42").unwrap();
        assert_eq!(matched.params().get("id"), Some("42"));
        assert_eq!(matched.route().template().as_str(), "/pessoas/{id}");
    }

    #[tokio::test]
    async fn trailing_slash_is_ignored() {
        let table = pessoas();
        assert_eq!(body(&table, Method::Get, "/pessoas/").await, body(&table, Method::Get, "/pessoas").await);
        assert_eq!(body(&table, Method::Get, "/pessoas/7/").await.as_deref(), Some("C:id=7"));
    }

    #[tokio::test]
    async fn method_disambiguates_identical_templates_regardless_of_order() {
        let reversed = RouteTable::new()
            .on(Method::Post, "/pessoas", tagged("B"))
            .on(Method::Get,  "/pessoas", tagged("A"));
        assert_eq!(body(&reversed, Method::Get, "/pessoas").await.as_deref(), Some("A:"));
        assert_eq!(body(&reversed, Method::Post, "/pessoas").await.as_deref(), Some("B:"));
    }

    #[tokio::test]
    async fn first_declared_wins_on_overlapping_patterns() {
        let literal_first = RouteTable::new()
            .on(Method::Get, "/contatos/pessoas", tagged("list"))
            .on(Method::Get, "/contatos/{id}",    tagged("get"));
        assert_eq!(body(&literal_first, Method::Get, "/contatos/pessoas").await.as_deref(), Some("list:"));
        assert_eq!(body(&literal_first, Method::Get, "/contatos/3").await.as_deref(), Some("get:id=3"));

        let param_first = RouteTable::new()
            .on(Method::Get, "/contatos/{id}",    tagged("get"))
            .on(Method::Get, "/contatos/pessoas", tagged("list"));
        assert_eq!(body(&param_first, Method::Get, "/contatos/pessoas").await.as_deref(), Some("get:id=pessoas"));
    }

    #[test]
    fn head_falls_back_to_get() {
        let table = pessoas();
        assert!(table.resolve(Method::Head, "/pessoas/1").is_some());
        assert!(table.resolve(Method::Put, "/pessoas/1").is_none());
    }

    #[test]
    fn on_many_registers_every_method() {
        let table = RouteTable::new().on_many(&[Method::Put, Method::Patch], "/x/{id}", tagged("u"));
        assert!(table.resolve(Method::Put, "/x/1").is_some());
        assert!(table.resolve(Method::Patch, "/x/1").is_some());
        assert!(table.resolve(Method::Get, "/x/1").is_none());
        assert_eq!(table.routes()[0].methods(), &[Method::Put, Method::Patch]);
    }

    #[test]
    fn prefix_partition_is_respected_within_a_table() {
        let mixed = RouteTable::new()
            .on(Method::Get, "/api/pessoas", tagged("api"))
            .on(Method::Get, "/{section}/pessoas", tagged("web"));
        // The web template would match `/api/pessoas` by pattern alone.
        let api = mixed.resolve(Method::Get, "/api/pessoas").unwrap();
        assert_eq!(api.route().template().as_str(), "/api/pessoas");
        let web = mixed.resolve(Method::Get, "/app/pessoas").unwrap();
        assert_eq!(web.route().template().as_str(), "/{section}/pessoas");
    }

    #[test]
    fn router_selects_table_by_prefix() {
        let api = RouteTable::new().on(Method::Get, "/api/pessoas", tagged("api"));
        let web = RouteTable::new()
            .on(Method::Get, "", tagged("home"))
            .on(Method::Get, "/pessoas", tagged("web"));
        let router = Router::new(api, web);

        assert!(router.resolve(Method::Get, "/api/pessoas").is_some());
        assert!(router.resolve(Method::Get, "/pessoas").is_some());
        assert!(router.resolve(Method::Get, "/").is_some());
        assert!(router.resolve(Method::Get, "/api/").is_none());
        assert!(router.resolve(Method::Get, "/api/contatos").is_none());
    }

    #[tokio::test]
    async fn dispatch_answers_404_when_nothing_matches() {
        let router = Router::new(RouteTable::new(), RouteTable::new());
        let res = router.dispatch(Request::new(Method::Get, "/nada")).await;
        assert_eq!(res.status_code(), Status::NotFound);
        let res = router.dispatch(Request::new(Method::Get, "/api/nada")).await;
        assert_eq!(res.status_code(), Status::NotFound);
    }

    #[test]
    fn custom_prefix_applies_to_both_tables() {
        let api = RouteTable::new().on(Method::Get, "/v1/ping", tagged("p"));
        let router = Router::with_prefix("/v1/", api, RouteTable::new());
        assert_eq!(router.prefix(), "/v1/");
        assert!(router.resolve(Method::Get, "/v1/ping").is_some());
        assert!(router.resolve(Method::Get, "/api/ping").is_none());
    }

    #[test]
    fn try_on_many_reports_bad_templates() {
        let err = RouteTable::new().try_on_many(&[Method::Get], "/a/{id}/{id}", tagged("x")).err();
        assert!(matches!(err, Some(RouteError::DuplicatePlaceholder { .. })));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn on_panics_on_bad_templates() {
        let _ = RouteTable::new().on(Method::Get, "/a/{id", tagged("x"));
    }
}
