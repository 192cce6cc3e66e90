//! Blog Site Example
//!
//! Routes a handful of URIs through a Trellis site and prints what each one
//! resolved to.
//!
//! - `blog`: list/detail pages rendered from `template/blog/*.php`
//! - `feed`: answers directly and halts, no template
//! - `json`: `api/<name>.json` served by [`BlogApi`]
//!
//! # Usage
//!
//! ```bash
//! cargo run --package blog-site -- --theme ./theme "/?module=blog&action=list" /api/posts.json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing::info;
use trellis::prelude::*;

/// Route URIs through a demo blog.
#[derive(Debug, Parser)]
struct Args {
    /// Configuration file (defaults to searching for trellis.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Theme directory, overriding the configuration.
    #[arg(long)]
    theme: Option<PathBuf>,

    /// URIs to route.
    #[arg(default_values_t = [
        "/?module=blog&action=list&genre_id=3".to_string(),
        "/?module=feed".to_string(),
        "/api/posts.json".to_string(),
        "/api/posts/recent.json?cursor=1700000000".to_string(),
        "/?tag_id=-1&since=1690000000".to_string(),
    ])]
    uris: Vec<String>,
}

/// Serves the blog's JSON endpoints.
struct BlogApi;

impl JsonApi for BlogApi {
    fn respond(&self, api: &str, response: &mut Response) {
        match api {
            "posts" | "mag.posts.recent" => {
                response.halt_json(200, &json!({ "errcode": 0, "posts": [] }));
            }
            _ => response.halt_json(404, &json!({ "errcode": "api_not_defined" })),
        }
    }
}

fn build_site(args: &Args) -> Result<Site> {
    let mut builder = Site::builder().json_api(BlogApi);
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(theme) = &args.theme {
        let mut config = TrellisConfig::default();
        config.site.theme_root = theme.clone();
        builder = builder.merge(config);
    }
    Ok(builder.build()?)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let site = build_site(&args)?;

    site.register_taxonomy("genre");
    site.register_module(
        "blog",
        ModuleConfig::new(|action, module, response| {
            info!(module, action, "Serving blog page");
            response.set_header("X-Blog-View", if action.is_empty() { "index" } else { action });
        }),
    );
    site.register_module(
        "feed",
        ModuleConfig::new(|_, _, response| {
            response.set_header("Content-Type", "application/rss+xml");
            response.halt(200, "<rss version=\"2.0\"><channel/></rss>");
        }),
    );

    for uri in &args.uris {
        let handled = site.process(&Request::from_uri(uri));
        let response = &handled.response;

        println!("{uri}");
        println!("  status:   {}", response.status());
        if handled.context.is_routed() {
            println!(
                "  module:   {} / {}",
                handled.context.module(),
                handled.context.action()
            );
        }
        match (response.template(), response.body()) {
            (Some(template), _) => println!("  template: {}", template.display()),
            (None, Some(body)) => println!("  body:     {body}"),
            (None, None) => println!("  template: (host default)"),
        }
        if let Some(tax_query) = handled.vars.tax_query() {
            println!("  tax:      {}", serde_json::to_string(tax_query)?);
        }
        if let Some(date_query) = handled.vars.date_query() {
            println!("  date:     {}", serde_json::to_string(date_query)?);
        }
    }

    Ok(())
}
