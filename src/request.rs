//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::HeaderMap;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue};

use crate::form::{FormData, MalformedForm};
use crate::method::Method;

/// An incoming HTTP request with its body fully buffered.
///
/// The server builds one per hyper request; tests build them directly with
/// [`Request::get`] / [`Request::post`] and hand them to
/// [`Router::dispatch`](crate::Router::dispatch).
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// Builds a request for `target`, which may carry a `?query` suffix.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
            None => (target.to_owned(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: &str) -> Self {
        Self::new(Method::Post, target)
    }

    pub(crate) fn from_parts(parts: http::request::Parts, method: Method, body: Bytes) -> Self {
        Self {
            method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
            params: HashMap::new(),
        }
    }

    /// Adds a header. Invalid names or values are dropped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets an already-encoded urlencoded body and the matching content type.
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        let mut req = self.with_header(CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded");
        req.body = body.into();
        req
    }

    pub fn with_form(self, form: &FormData) -> Self {
        self.with_body(form.encode())
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-ASCII values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/update/{id}`, `req.param("id")` on `/update/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decodes the query string. No query string decodes as an empty form.
    pub fn query(&self) -> Result<FormData, MalformedForm> {
        FormData::parse(self.query.as_deref().unwrap_or_default().as_bytes())
    }

    /// Decodes the body as `application/x-www-form-urlencoded`.
    pub fn form(&self) -> Result<FormData, MalformedForm> {
        FormData::parse(&self.body)
    }

    /// Whether the client prefers a JSON rendering of the view model.
    pub fn wants_json(&self) -> bool {
        self.headers.get_all(ACCEPT).iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("application/json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_query_from_path() {
        let req = Request::get("/search?username=Ada+Lovelace");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query().unwrap().get("username"), Some("Ada Lovelace"));
    }

    #[test]
    fn missing_query_is_empty_form() {
        assert!(Request::get("/search").query().unwrap().is_empty());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::get("/").with_header("Accept", "application/json");
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.wants_json());
        assert!(!Request::get("/").with_header("accept", "text/html").wants_json());
    }

    #[test]
    fn with_form_sets_body_and_content_type() {
        let form: FormData = [("firstName", "Ada")].into_iter().collect();
        let req = Request::post("/create").with_form(&form);
        assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(req.form().unwrap().get("firstName"), Some("Ada"));
    }

    #[test]
    fn non_utf8_query_is_an_error() {
        assert_eq!(Request::get("/search?username=%C0").query(), Err(MalformedForm));
    }
}
