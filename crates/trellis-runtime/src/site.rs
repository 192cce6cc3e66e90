//! The site: everything needed to turn a [`Request`] into a [`Response`].
//!
//! # Request lifecycle
//!
//! 1. The path is matched against the rewrite rules; the matched query and
//!    the query string are filtered through the public query vars (query
//!    string wins).
//! 2. [`RequestRouter::route`] records the module/action, runs the module
//!    callback and rewrites the query variables.
//! 3. If the callback halted the response, it is returned as is.
//! 4. If the router claimed template selection, the [`TemplateResolver`]
//!    picks the file. A missing file halts with 500 and `路由错误！`.
//!
//! ```rust,ignore
//! use trellis_runtime::{Request, Site};
//! use trellis_framework::ModuleConfig;
//!
//! let site = Site::builder().config_file("trellis.toml").build()?;
//! site.register_module("blog", ModuleConfig::new(|action, module, _response| {
//!     tracing::info!(module, action, "serving blog");
//! }));
//!
//! let response = site.handle(&Request::from_uri("/?module=blog&action=list"));
//! ```

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, info_span};

use trellis_core::{QueryVars, Response};
use trellis_framework::{
    ModuleConfig, ModuleRegistry, QueryVarsRewriter, RequestRouter, RouteContext, RouteOutcome,
    TemplateResolver, offset_from_hours,
};

use crate::config::{ConfigError, ConfigLoader, TrellisConfig, validate_config};
use crate::error::RuntimeResult;
use crate::json::{JSON_MODULE, JsonApi, json_module};
use crate::logging;
use crate::query_vars::PublicQueryVars;
use crate::request::Request;
use crate::rewrite_rules::RewriteRules;
use crate::taxonomies::SharedTaxonomies;

/// Everything routing produced for one request.
#[derive(Debug, Clone)]
pub struct HandledRequest {
    /// Module/action state, for `is_module` questions while rendering.
    pub context: RouteContext,
    /// The query variables after rewriting.
    pub vars: QueryVars,
    /// What the router did.
    pub outcome: RouteOutcome,
    /// The response to send or render into.
    pub response: Response,
}

/// A configured site.
///
/// Registration methods take `&self`; a `Site` can be shared behind an
/// `Arc` once startup registration is done.
pub struct Site {
    config: TrellisConfig,
    registry: RwLock<ModuleRegistry>,
    taxonomies: Arc<SharedTaxonomies>,
    rewriter: QueryVarsRewriter,
    rules: RwLock<RewriteRules>,
    public_vars: RwLock<PublicQueryVars>,
    templates: RwLock<TemplateResolver>,
}

impl Site {
    /// Creates a site builder.
    pub fn builder() -> SiteBuilder {
        SiteBuilder::new()
    }

    /// Creates a site from configuration, without a JSON API.
    ///
    /// Logging is left alone; see [`SiteBuilder`] for that.
    pub fn from_config(config: TrellisConfig) -> RuntimeResult<Self> {
        Self::assemble(config, None)
    }

    fn assemble(config: TrellisConfig, json_api: Option<Arc<dyn JsonApi>>) -> RuntimeResult<Self> {
        validate_config(&config)?;

        let offset = offset_from_hours(config.site.gmt_offset).ok_or_else(|| {
            ConfigError::invalid("site.gmt_offset", format!("{} hours", config.site.gmt_offset))
        })?;

        let taxonomies = Arc::new(SharedTaxonomies::new());
        let rewriter = QueryVarsRewriter::new(taxonomies.clone())
            .with_offset(offset)
            .with_merge(config.query.tax_query_merge);

        let rules = RewriteRules::with_api_rules(&config.site.rewrite_root)?;
        let templates = TemplateResolver::new(&config.site.theme_root)
            .with_suffix(config.site.template_suffix.clone());

        let mut registry = ModuleRegistry::new();
        registry.register(JSON_MODULE, json_module(json_api));

        info!(
            theme_root = %config.site.theme_root.display(),
            gmt_offset = config.site.gmt_offset,
            rewrite_root = %config.site.rewrite_root,
            "Site initialized"
        );

        Ok(Self {
            config,
            registry: RwLock::new(registry),
            taxonomies,
            rewriter,
            rules: RwLock::new(rules),
            public_vars: RwLock::new(PublicQueryVars::new()),
            templates: RwLock::new(templates),
        })
    }

    /// The configuration.
    pub fn config(&self) -> &TrellisConfig {
        &self.config
    }

    /// The active theme directory templates are resolved under.
    pub fn theme_root(&self) -> &Path {
        &self.config.site.theme_root
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a route module. A duplicate name replaces the earlier one
    /// with a warning.
    pub fn register_module(&self, name: impl Into<String>, config: ModuleConfig) {
        self.registry.write().register(name, config);
    }

    /// Removes a route module. Unknown names are ignored.
    pub fn unregister_module(&self, name: &str) {
        self.registry.write().unregister(name);
    }

    /// Adds a filter applied to every later module registration.
    pub fn add_registration_filter<F>(&self, filter: F)
    where
        F: Fn(ModuleConfig, &str) -> ModuleConfig + Send + Sync + 'static,
    {
        self.registry.write().add_filter(filter);
    }

    /// Returns `true` if a module is registered under `name`.
    pub fn has_module(&self, name: &str) -> bool {
        self.registry.read().contains(name)
    }

    /// Registered module names, sorted.
    pub fn module_names(&self) -> Vec<String> {
        self.registry
            .read()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Registers a custom taxonomy, making `{name}_id` a public query var.
    ///
    /// Returns `false` for built-in and already-registered taxonomies.
    pub fn register_taxonomy(&self, name: &str) -> bool {
        if !self.taxonomies.register(name) {
            return false;
        }
        self.public_vars.write().add_taxonomy(name);
        debug!(taxonomy = name, "Registered taxonomy");
        true
    }

    /// Admits another query-string key.
    pub fn add_query_var(&self, name: impl Into<String>) {
        self.public_vars.write().add(name);
    }

    /// Appends a rewrite rule after the built-in API rules.
    pub fn add_rewrite_rule(&self, pattern: &str, query: &str) -> RuntimeResult<()> {
        let pattern = format!("{}{pattern}", regex::escape(&self.config.site.rewrite_root));
        self.rules.write().add(&pattern, query)
    }

    /// Adds a filter over template paths, invoked with
    /// `(candidate, module, action)`.
    pub fn add_template_filter<F>(&self, filter: F)
    where
        F: Fn(std::path::PathBuf, &str, &str) -> std::path::PathBuf + Send + Sync + 'static,
    {
        self.templates.write().add_filter(filter);
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Handles a request and returns the response.
    pub fn handle(&self, request: &Request) -> Response {
        self.process(request).response
    }

    /// Handles a request and returns everything routing produced.
    pub fn process(&self, request: &Request) -> HandledRequest {
        let span = info_span!("request", path = %request.path());
        let _enter = span.enter();

        let mut vars = self.parse_request(request);
        let mut context = RouteContext::new();
        let mut response = Response::new();

        // The registry lock is released before the callback runs, so a
        // callback may register or unregister modules.
        let modules = |name: &str| self.registry.read().lookup(name).cloned();
        let outcome = RequestRouter::new(&modules, &self.rewriter).route(
            &mut context,
            &mut vars,
            &mut response,
        );

        if !outcome.is_halted() {
            let templates = self.templates.read().clone();
            match templates.resolve(&context) {
                Ok(Some(template)) => response.set_template(template),
                Ok(None) => {}
                Err(err) => {
                    error!(error = %err, "Routing failed");
                    response.halt(err.status(), err.user_message());
                }
            }
        }

        debug!(
            status = response.status(),
            module = context.module(),
            action = context.action(),
            "Request handled"
        );

        HandledRequest {
            context,
            vars,
            outcome,
            response,
        }
    }

    /// Builds the public query vars of a request.
    fn parse_request(&self, request: &Request) -> QueryVars {
        let rewritten = self.rules.read().resolve(request.path()).unwrap_or_default();

        let pairs = rewritten
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(request.query_pairs());

        self.public_vars.read().collect(pairs)
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("config", &self.config)
            .field("registry", &*self.registry.read())
            .field("rewriter", &self.rewriter)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// SiteBuilder
// =============================================================================

/// Builder for a [`Site`] that loads configuration and initializes logging.
///
/// ```rust,ignore
/// let site = Site::builder()
///     .config_file("config/trellis.toml")
///     .profile("production")
///     .json_api(MyApi::new())
///     .build()?;
/// ```
pub struct SiteBuilder {
    config_loader: ConfigLoader,
    json_api: Option<Arc<dyn JsonApi>>,
    init_logging: bool,
}

impl SiteBuilder {
    /// Creates a builder searching the current directory for configuration.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            json_api: None,
            init_logging: true,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration programmatically, above files and environment.
    pub fn merge(mut self, config: TrellisConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Sets the collaborator serving the `json` module.
    pub fn json_api(mut self, api: impl JsonApi + 'static) -> Self {
        self.json_api = Some(Arc::new(api));
        self
    }

    /// Skips installing the global log subscriber.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Loads configuration, initializes logging and builds the site.
    pub fn build(self) -> RuntimeResult<Site> {
        let config = self.config_loader.load()?;
        if self.init_logging {
            logging::init_from_config(&config.logging);
        }
        Site::assemble(config, self.json_api)
    }
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}
