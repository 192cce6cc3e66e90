//! The built-in `json` route module.
//!
//! `api/<name>.json` routes to `module=json&action=<name>`; the module hands
//! the action to a [`JsonApi`] which writes the payload and halts the
//! response.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use trellis_core::Response;
use trellis_framework::ModuleConfig;

/// Name the JSON module is registered under.
pub const JSON_MODULE: &str = "json";

/// Serves JSON API requests.
pub trait JsonApi: Send + Sync {
    /// Answers `api`, typically by calling [`Response::halt_json`].
    ///
    /// Leaving the response open lets routing continue to template
    /// resolution for `template/json/<api>`.
    fn respond(&self, api: &str, response: &mut Response);
}

impl<F> JsonApi for F
where
    F: Fn(&str, &mut Response) + Send + Sync,
{
    fn respond(&self, api: &str, response: &mut Response) {
        self(api, response)
    }
}

/// Builds the `json` module configuration around an optional API.
pub fn json_module(api: Option<Arc<dyn JsonApi>>) -> ModuleConfig {
    ModuleConfig::new(move |action, _module, response| match &api {
        Some(api) => api.respond(action, response),
        None => {
            debug!(api = action, "No JSON API configured");
            response.halt_json(404, &json!({ "errcode": "api_not_defined" }));
        }
    })
}
