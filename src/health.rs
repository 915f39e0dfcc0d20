//! Liveness and readiness probes.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it serve traffic? |
//!
//! Both live in the web table; [`crate::routes::web_routes`] registers them.

use crate::{Params, Request, Response};

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request, _params: Params) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"`. Storage is in-process, so there is nothing
/// to wait for once the router exists.
pub async fn readiness(_req: Request, _params: Params) -> Response {
    Response::text("ready")
}
