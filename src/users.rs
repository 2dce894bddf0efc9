//! User routes: list, create, update, delete and search.
//!
//! Each handler validates its input, re-renders the originating page with
//! the accumulated errors on failure, and otherwise reads or mutates the
//! [`UserStore`] before rendering or redirecting back to the list.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | [`list`] |
//! | `GET /create` | [`create_form`] |
//! | `POST /create` | [`create`] |
//! | `GET /update/{id}` | [`update_form`] |
//! | `POST /update/{id}` | [`update`] |
//! | `POST /delete/{id}` | [`delete`] |
//! | `GET /search` | [`search`] |

use tracing::debug;

use crate::form::MalformedForm;
use crate::health;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;
use crate::store::{StoreError, UserId, UserRecord, UserStore};
use crate::validation::{search_rules, user_rules};
use crate::views::{FormValues, FormView, ListView, NotFoundView, SearchView, render};

/// Builds the application router around `store`, health probes included.
pub fn routes(store: UserStore) -> Router<UserStore> {
    Router::new(store)
        .get("/", list)
        .get("/create", create_form)
        .post("/create", create)
        .get("/update/{id}", update_form)
        .post("/update/{id}", update)
        .post("/delete/{id}", delete)
        .get("/search", search)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
}

pub async fn list(req: Request, store: UserStore) -> Response {
    let view = ListView { title: "User list", users: store.list().await };
    render(&req, Status::Ok, &view)
}

pub async fn create_form(req: Request, _store: UserStore) -> Response {
    render(&req, Status::Ok, &FormView::create())
}

pub async fn create(req: Request, store: UserStore) -> Response {
    let form = match req.form() {
        Ok(form) => form,
        Err(err) => return malformed(err),
    };
    match user_rules().validate(&form) {
        Ok(valid) => {
            store.add(valid.into_user_fields()).await;
            Response::redirect("/")
        }
        Err(failure) => {
            debug!(errors = failure.errors.len(), "create rejected");
            let view = FormView::create()
                .with_values(FormValues::from(&failure.submitted))
                .with_errors(failure.errors);
            render(&req, Status::BadRequest, &view)
        }
    }
}

pub async fn update_form(req: Request, store: UserStore) -> Response {
    match find_user(&req, &store).await {
        Some(user) => render(&req, Status::Ok, &FormView::update(&user)),
        None => not_found(&req),
    }
}

/// On a rejected submission the form is re-rendered from the stored record,
/// not from what was submitted.
pub async fn update(req: Request, store: UserStore) -> Response {
    let Some(existing) = find_user(&req, &store).await else {
        return not_found(&req);
    };
    let form = match req.form() {
        Ok(form) => form,
        Err(err) => return malformed(err),
    };
    match user_rules().validate(&form) {
        Ok(valid) => match store.update(existing.id, valid.into_user_fields()).await {
            Ok(_) => Response::redirect("/"),
            // Deleted between the lookup and the write.
            Err(StoreError::NotFound(_)) => not_found(&req),
        },
        Err(failure) => {
            debug!(user_id = %existing.id, errors = failure.errors.len(), "update rejected");
            let view = FormView::update(&existing).with_errors(failure.errors);
            render(&req, Status::BadRequest, &view)
        }
    }
}

/// Unknown and malformed ids redirect like any other delete.
pub async fn delete(req: Request, store: UserStore) -> Response {
    match user_id(&req) {
        Some(id) => {
            if !store.delete(id).await {
                debug!(user_id = %id, "delete of unknown user ignored");
            }
        }
        None => debug!(param = ?req.param("id"), "delete with malformed id ignored"),
    }
    Response::redirect("/")
}

/// Runs no search, and renders a null result, when neither parameter is given.
pub async fn search(req: Request, store: UserStore) -> Response {
    let params = match req.query() {
        Ok(params) => params,
        Err(err) => return malformed(err),
    };
    let mut view = SearchView::new(params.get("username"), params.get("mail"));
    match search_rules().validate(&params) {
        Ok(valid) => {
            let query = valid.into_search_query();
            if !query.is_empty() {
                view.results = Some(store.search(&query).await);
            }
            render(&req, Status::Ok, &view)
        }
        Err(failure) => {
            debug!(errors = failure.errors.len(), "search rejected");
            view.errors = failure.errors;
            render(&req, Status::BadRequest, &view)
        }
    }
}

fn user_id(req: &Request) -> Option<UserId> {
    req.param("id")?.parse().ok()
}

async fn find_user(req: &Request, store: &UserStore) -> Option<UserRecord> {
    store.get(user_id(req)?).await
}

fn malformed(err: MalformedForm) -> Response {
    debug!(error = %err, "malformed form rejected");
    Response::builder().status(Status::BadRequest).text(err.to_string())
}

fn not_found(req: &Request) -> Response {
    let view = NotFoundView::user(req.param("id").unwrap_or_default());
    render(req, Status::NotFound, &view)
}
