//! Liveness and readiness probes.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it serve traffic? |
//!
//! Both are generic over the router state, so they mount on any router:
//!
//! ```rust
//! use rollcall::{Router, UserStore, health};
//!
//! let app = Router::new(UserStore::new())
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```

use crate::{Request, Response};

/// Always `200 OK` with body `"ok"`.
pub async fn liveness<S>(_req: Request, _state: S) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"`. The store is in memory and has no
/// warm-up, so the process is ready as soon as it is listening.
pub async fn readiness<S>(_req: Request, _state: S) -> Response {
    Response::text("ready")
}
