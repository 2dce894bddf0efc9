//! View models and their renderers.
//!
//! Handlers never build markup. They fill one of the view models below and
//! call [`render`], which answers with JSON when the client asked for
//! `application/json` and with an HTML page otherwise.
//!
//! All dynamic text goes through [`escape_html`] on the way into a page,
//! except stored bios: those were escaped by the validation layer when they
//! were accepted and are emitted as they are.

use serde::Serialize;

use crate::form::FormData;
use crate::request::Request;
use crate::response::{Json, IntoResponse, Response};
use crate::status::Status;
use crate::store::{UserId, UserRecord};
use crate::validation::{FieldError, escape_html};

/// A view model that can be rendered as an HTML page.
pub trait View: Serialize {
    fn to_html(&self) -> String;
}

/// Renders `view` with `status`, as JSON or HTML depending on `Accept`.
pub fn render<V: View>(req: &Request, status: Status, view: &V) -> Response {
    let mut res = if req.wants_json() {
        Json(view).into_response()
    } else {
        Response::html(view.to_html())
    };
    if res.status == Status::Ok {
        res.status = status;
    }
    res
}

// ── View models ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ListView {
    pub title: &'static str,
    pub users: Vec<UserRecord>,
}

/// Values shown in the create/update form.
///
/// Built from a stored record or from a rejected submission. `bio` is always
/// held in escaped form.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl From<&UserRecord> for FormValues {
    fn from(record: &UserRecord) -> Self {
        let f = &record.fields;
        Self {
            id: Some(record.id),
            first_name: f.first_name.clone(),
            last_name: f.last_name.clone(),
            email: f.email.clone(),
            age: f.age.clone(),
            bio: f.bio.clone(),
        }
    }
}

impl From<&FormData> for FormValues {
    fn from(form: &FormData) -> Self {
        let field = |name: &str| form.get(name).unwrap_or_default().to_owned();
        Self {
            id: None,
            first_name: field("firstName"),
            last_name: field("lastName"),
            email: field("email"),
            age: field("age"),
            bio: form.get("bio")
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(escape_html),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub title: &'static str,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<FormValues>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl FormView {
    pub fn create() -> Self {
        Self { title: "Create user", action: "/create".to_owned(), user: None, errors: Vec::new() }
    }

    pub fn update(record: &UserRecord) -> Self {
        Self {
            title: "Update user",
            action: format!("/update/{}", record.id),
            user: Some(FormValues::from(record)),
            errors: Vec::new(),
        }
    }

    pub fn with_values(mut self, values: FormValues) -> Self {
        self.user = Some(values);
        self
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct SearchView {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    /// `None` when no search was run.
    pub results: Option<Vec<UserRecord>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl SearchView {
    pub fn new(username: Option<&str>, mail: Option<&str>) -> Self {
        Self {
            title: "Search users",
            username: username.map(str::to_owned),
            mail: mail.map(str::to_owned),
            results: None,
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotFoundView {
    pub title: &'static str,
    pub message: String,
}

impl NotFoundView {
    pub fn user(id: &str) -> Self {
        Self { title: "User not found", message: format!("No user with id {id}") }
    }
}

// ── HTML ──────────────────────────────────────────────────────────────────────

fn page(title: &str, body: &str) -> String {
    let title = escape_html(title);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<nav><a href=\"/\">Users</a> \
         <a href=\"/create\">Create user</a> <a href=\"/search\">Search</a></nav>\n\
         <h1>{title}</h1>\n{body}</body>\n</html>\n"
    )
}

fn user_row(user: &UserRecord) -> String {
    let f = &user.fields;
    format!(
        "<li><strong>{name}</strong> &lt;{email}&gt;, {age}{bio} \
         <a href=\"/update/{id}\">Update</a> \
         <form method=\"post\" action=\"/delete/{id}\" style=\"display:inline\">\
         <button type=\"submit\">Delete</button></form></li>\n",
        name = escape_html(&user.full_name()),
        email = escape_html(&f.email),
        age = escape_html(&f.age),
        bio = f.bio.as_deref().map(|b| format!(" <em>{b}</em>")).unwrap_or_default(),
        id = user.id,
    )
}

fn user_list(users: &[UserRecord]) -> String {
    let mut out = String::from("<ul>\n");
    for user in users {
        out.push_str(&user_row(user));
    }
    out.push_str("</ul>\n");
    out
}

fn error_list(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"errors\">\n");
    for e in errors {
        out.push_str(&format!(
            "<li data-field=\"{}\">{}</li>\n",
            e.field,
            escape_html(&e.message),
        ));
    }
    out.push_str("</ul>\n");
    out
}

fn input(label: &str, name: &str, kind: &str, value: &str) -> String {
    format!(
        "<label>{label} <input type=\"{kind}\" name=\"{name}\" value=\"{}\"></label><br>\n",
        escape_html(value),
    )
}

impl View for ListView {
    fn to_html(&self) -> String {
        let body = if self.users.is_empty() {
            "<p>No users yet.</p>\n".to_owned()
        } else {
            user_list(&self.users)
        };
        page(self.title, &body)
    }
}

impl View for FormView {
    fn to_html(&self) -> String {
        let values = self.user.clone().unwrap_or_default();
        let mut body = error_list(&self.errors);
        body.push_str(&format!("<form method=\"post\" action=\"{}\">\n", self.action));
        body.push_str(&input("First name", "firstName", "text", &values.first_name));
        body.push_str(&input("Last name", "lastName", "text", &values.last_name));
        body.push_str(&input("Email", "email", "email", &values.email));
        body.push_str(&input("Age", "age", "text", &values.age));
        body.push_str(&format!(
            "<label>Bio <textarea name=\"bio\">{}</textarea></label><br>\n",
            values.bio.as_deref().unwrap_or_default(),
        ));
        body.push_str("<button type=\"submit\">Save</button>\n</form>\n");
        page(self.title, &body)
    }
}

impl View for SearchView {
    fn to_html(&self) -> String {
        let mut body = error_list(&self.errors);
        body.push_str("<form method=\"get\" action=\"/search\">\n");
        let username = self.username.as_deref().unwrap_or_default();
        let mail = self.mail.as_deref().unwrap_or_default();
        body.push_str(&input("Name", "username", "text", username));
        body.push_str(&input("Email", "mail", "text", mail));
        body.push_str("<button type=\"submit\">Search</button>\n</form>\n");
        match &self.results {
            None => {}
            Some(users) if users.is_empty() => body.push_str("<p>No matching users.</p>\n"),
            Some(users) => body.push_str(&user_list(users)),
        }
        page(self.title, &body)
    }
}

impl View for NotFoundView {
    fn to_html(&self) -> String {
        page(self.title, &format!("<p>{}</p>\n", escape_html(&self.message)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UserFields;

    fn record(first: &str, bio: Option<&str>) -> UserRecord {
        UserRecord {
            id: UserId::new(4),
            fields: UserFields {
                first_name: first.to_owned(),
                last_name: "Lin".to_owned(),
                email: "jo@example.com".to_owned(),
                age: "30".to_owned(),
                bio: bio.map(str::to_owned),
            },
        }
    }

    #[test]
    fn list_escapes_names_and_links_each_user() {
        let html = ListView { title: "User list", users: vec![record("<Jo>", None)] }.to_html();
        assert!(html.contains("<title>User list</title>"));
        assert!(html.contains("&lt;Jo&gt; Lin"));
        assert!(html.contains("href=\"/update/4\""));
        assert!(html.contains("action=\"/delete/4\""));
    }

    #[test]
    fn stored_bio_is_not_escaped_twice() {
        let users = vec![record("Jo", Some("a &amp; b"))];
        let html = ListView { title: "User list", users }.to_html();
        assert!(html.contains("<em>a &amp; b</em>"));
    }

    #[test]
    fn submitted_values_prefill_the_form() {
        let submitted: FormData = [("firstName", "Jo3"), ("bio", " <i> ")].into_iter().collect();
        let view = FormView::create().with_values(FormValues::from(&submitted));
        let html = view.to_html();
        assert!(html.contains("name=\"firstName\" value=\"Jo3\""));
        assert!(html.contains("<textarea name=\"bio\">&lt;i&gt;</textarea>"));
    }

    #[test]
    fn search_without_results_omits_the_list() {
        let html = SearchView::new(None, None).to_html();
        assert!(!html.contains("No matching users"));
        let mut ran = SearchView::new(Some("Ada"), None);
        ran.results = Some(Vec::new());
        assert!(ran.to_html().contains("No matching users"));
    }

    #[test]
    fn search_json_keeps_null_results() {
        let json = serde_json::to_value(SearchView::new(None, None)).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Search users", "results": null }));
    }

    #[test]
    fn render_negotiates_and_applies_status() {
        let view = NotFoundView::user("9");
        let html = render(&Request::get("/update/9"), Status::NotFound, &view);
        assert_eq!(html.status_code(), Status::NotFound);
        assert_eq!(html.header("content-type"), Some("text/html; charset=utf-8"));

        let req = Request::get("/update/9").with_header("accept", "application/json");
        let json = render(&req, Status::NotFound, &view);
        assert_eq!(json.header("content-type"), Some("application/json"));
        assert_eq!(json.status_code(), Status::NotFound);
    }
}
