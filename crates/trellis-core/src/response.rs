//! The response a request produces.
//!
//! Module callbacks receive a `&mut Response` and may *halt* it: write a
//! final status and body and end processing. Once halted, nothing else in
//! the request lifecycle runs, which mirrors a callback that emits output
//! and exits.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Output of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Option<String>,
    template: Option<PathBuf>,
    canonical_redirect: bool,
    halted: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates an open `200` response with no body.
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: None,
            template: None,
            canonical_redirect: true,
            halted: false,
        }
    }

    /// Writes a final status and body and ends processing.
    pub fn halt(&mut self, status: u16, body: impl Into<String>) {
        self.status = status;
        self.body = Some(body.into());
        self.halted = true;
    }

    /// Halts with a JSON body.
    pub fn halt_json(&mut self, status: u16, body: &Value) {
        self.set_header("Content-Type", "application/json; charset=utf-8");
        self.halt(status, body.to_string());
    }

    /// Returns `true` once the response has been halted.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Sets the status without halting.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Body written by a halt, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Sets a header, replacing an existing one with the same name
    /// (case-insensitive).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Returns a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The template chosen for rendering, if routing selected one.
    pub fn template(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    /// Records the template to render.
    pub fn set_template(&mut self, path: impl Into<PathBuf>) {
        self.template = Some(path.into());
    }

    /// Whether the host should still apply its canonical-URL redirect.
    pub fn canonical_redirect(&self) -> bool {
        self.canonical_redirect
    }

    /// Records whether canonical redirect stays enabled.
    pub fn set_canonical_redirect(&mut self, enabled: bool) {
        self.canonical_redirect = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_halt_json_sets_content_type() {
        let mut response = Response::new();
        assert!(!response.is_halted());

        response.halt_json(404, &json!({"errcode": "api_not_defined"}));

        assert!(response.is_halted());
        assert_eq!(response.status(), 404);
        assert_eq!(
            response.header("content-type"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(response.body(), Some(r#"{"errcode":"api_not_defined"}"#));
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut response = Response::new();
        response.set_header("X-Module", "blog");
        response.set_header("x-module", "json");

        assert_eq!(response.header("X-MODULE"), Some("json"));
    }
}
