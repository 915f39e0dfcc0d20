//! Handler trait and type erasure.
//!
//! A route table holds handlers of many concrete types, so each one is
//! erased behind `Arc<dyn ErasedHandler>`:
//!
//! ```text
//! async fn show(req: Request, params: Params) -> Response { … }
//!        ↓ RouteTable::on(Method::Get, "/x/{id}", show)
//! show.into_boxed_handler()                ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(show))                ← stored as BoxedHandler
//!        ↓
//! handler.call(req, params)                ← one vtable dispatch per request
//! ```
//!
//! Handlers that need collaborators capture them. [`action`] builds such a
//! handler from a shared controller and one of its methods, so services are
//! injected once when the table is built and never looked up by name.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::route::Params;

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request, params: Params) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any function or closure shaped like
///
/// ```text
/// async fn name(req: Request, params: Params) -> impl IntoResponse
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request, Params) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, params: Params) -> BoxFuture {
        let fut = (self.0)(req, params);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Binds a controller method to a shared controller instance.
///
/// ```rust,ignore
/// let people = Arc::new(PersonApi::new(service));
/// RouteTable::new().on(Method::Get, "/api/pessoas/{id}", action(&people, PersonApi::show));
/// ```
pub fn action<C, F, Fut, R>(controller: &Arc<C>, method: F) -> impl Handler + use<C, F, Fut, R>
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, Request, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    let controller = Arc::clone(controller);
    move |req: Request, params: Params| method(Arc::clone(&controller), req, params)
}
