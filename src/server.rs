//! HTTP server and graceful shutdown.
//!
//! Per request the server:
//! 1. Rejects methods outside [`Method`] with `405`.
//! 2. Reads the whole body (a body that fails to arrive is a `400`).
//! 3. Answers `OPTIONS` preflights with `204` without routing.
//! 4. Hands everything else to [`Router::dispatch`].
//! 5. Adds the CORS headers to whatever came back and drops the body of a
//!    `HEAD` reply.
//!
//! # Graceful shutdown
//!
//! On SIGTERM or Ctrl-C the accept loop stops at once and every in-flight
//! connection runs to completion before [`Server::serve`] returns.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, POST, PUT, DELETE, OPTIONS"),
    ("access-control-allow-headers", "Content-Type, Authorization"),
];

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_until(router, shutdown_signal()).await
    }

    /// Serves `router` until `shutdown` resolves, then drains.
    pub async fn serve_until(
        self,
        router: Router,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let router = Arc::new(router);

        info!(addr = %listener.local_addr()?, "agenda listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown is checked first so queued connections are not accepted.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| handle(Arc::clone(&router), req));

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(%peer, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connections so the set stays small.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("agenda stopped");
        Ok(())
    }
}

// ── Request handling ──────────────────────────────────────────────────────────

/// Turns one hyper request into one response. Never fails: every problem
/// becomes a status code.
pub(crate) async fn handle<B>(
    router: Arc<Router>,
    req: hyper::Request<B>,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let started = Instant::now();
    let path = req.uri().path().to_owned();
    let raw_method = req.method().clone();

    let mut response = match Method::try_from(&raw_method) {
        Err(e) => {
            warn!(%path, "{e}");
            Response::status(Status::MethodNotAllowed)
        }
        Ok(method) => match into_request(method, req).await {
            Err(response) => response,
            Ok(_) if method == Method::Options => Response::status(Status::NoContent),
            Ok(request) => router.dispatch(request).await,
        },
    };

    for (name, value) in CORS_HEADERS {
        response.push_header(name, value);
    }
    if raw_method == http::Method::HEAD {
        response.clear_body();
    }

    info!(
        method = %raw_method,
        %path,
        status = response.status_code().code(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    Ok(response.into_inner())
}

/// Collects the body and copies what handlers read into a [`Request`].
async fn into_request<B>(method: Method, req: hyper::Request<B>) -> Result<Request, Response>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(path = parts.uri.path(), "failed to read request body: {e}");
            return Err(Response::status(Status::BadRequest));
        }
    };

    let mut request = Request::new(method, parts.uri.path());
    if let Some(query) = parts.uri.query() {
        request = request.with_query(query);
    }
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }
    Ok(request.with_body(body))
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or Ctrl-C. A handler that cannot be
/// installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Params;
    use crate::router::RouteTable;

    fn router() -> Arc<Router> {
        let web = RouteTable::new()
            .on(Method::Get, "/eco", |req: Request, _: Params| async move {
                format!("{}|{}", req.query().unwrap_or(""), req.header("x-tag").unwrap_or(""))
            })
            .on(Method::Post, "/eco", |req: Request, _: Params| async move {
                String::from_utf8_lossy(req.body()).into_owned()
            });
        Arc::new(Router::new(RouteTable::new(), web))
    }

    async fn send(method: &str, uri: &str, body: &'static str) -> http::Response<Full<Bytes>> {
        let req = hyper::Request::builder()
            .method(method)
            .uri(uri)
            .header("x-tag", "t1")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();
        handle(router(), req).await.unwrap()
    }

    async fn body_of(res: http::Response<Full<Bytes>>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn forwards_query_headers_and_body() {
        let res = send("GET", "/eco?a=1", "").await;
        assert_eq!(res.status(), 200);
        assert_eq!(body_of(res).await, "a=1|t1");

        let res = send("POST", "/eco", "nome=Ana").await;
        assert_eq!(body_of(res).await, "nome=Ana");
    }

    #[tokio::test]
    async fn every_response_carries_cors_headers() {
        for res in [send("GET", "/eco", "").await, send("GET", "/nada", "").await] {
            assert_eq!(res.headers()["access-control-allow-origin"], "*");
            assert_eq!(res.headers()["access-control-allow-methods"], "GET, POST, PUT, DELETE, OPTIONS");
            assert_eq!(res.headers()["access-control-allow-headers"], "Content-Type, Authorization");
        }
    }

    #[tokio::test]
    async fn options_preflight_is_204_without_routing() {
        let res = send("OPTIONS", "/qualquer/coisa", "").await;
        assert_eq!(res.status(), 204);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn head_keeps_status_and_drops_body() {
        let res = send("HEAD", "/eco", "").await;
        assert_eq!(res.status(), 200);
        assert_eq!(body_of(res).await, "");
    }

    #[tokio::test]
    async fn unknown_method_is_405() {
        let res = send("TRACE", "/eco", "").await;
        assert_eq!(res.status(), 405);
    }

    #[tokio::test]
    async fn unmatched_path_is_404() {
        let res = send("GET", "/nada", "").await;
        assert_eq!(res.status(), 404);
        assert_eq!(body_of(res).await, "Not Found");
    }

    #[tokio::test]
    async fn serve_until_stops_when_signalled() {
        let server = Server::new("127.0.0.1:0".parse().unwrap());
        let routes = Router::new(RouteTable::new(), RouteTable::new());
        server.serve_until(routes, async {}).await.unwrap();
    }
}
