//! End-to-end request handling through `Site`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::TempDir;

use trellis_core::{DateBound, Response, TaxQueryNode, TaxonomyClause};
use trellis_framework::{ModuleConfig, RouteOutcome, TaxQueryMerge};
use trellis_runtime::{Request, Site, TrellisConfig};

fn theme(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<?php // template").unwrap();
    }
    dir
}

fn site(theme_root: &Path, configure: impl FnOnce(&mut TrellisConfig)) -> Site {
    let mut config = TrellisConfig::default();
    config.site.theme_root = theme_root.to_path_buf();
    configure(&mut config);
    Site::from_config(config).unwrap()
}

#[test]
fn test_routed_request_renders_module_template() {
    let theme = theme(&["template/blog/list.php"]);
    let site = site(theme.path(), |_| {});

    let calls = Arc::new(Mutex::new(Vec::new()));
    {
        let calls = Arc::clone(&calls);
        site.register_module(
            "blog",
            ModuleConfig::new(move |action, module, response| {
                calls
                    .lock()
                    .unwrap()
                    .push((action.to_string(), module.to_string()));
                response.set_header("X-Module", module);
            }),
        );
    }

    let handled = site.process(&Request::from_uri("/?module=blog&action=list"));

    assert_eq!(
        *calls.lock().unwrap(),
        vec![("list".to_string(), "blog".to_string())]
    );
    assert!(handled.context.is_module(Some("blog"), Some("list")));
    assert!(handled.context.is_module(Some("blog"), None));
    assert!(handled.context.is_module(None, None));
    assert!(!handled.response.is_halted());
    assert!(!handled.response.canonical_redirect());
    assert_eq!(handled.response.header("x-module"), Some("blog"));
    assert_eq!(
        handled.response.template(),
        Some(theme.path().join("template/blog/list.php").as_path())
    );
}

#[test]
fn test_empty_action_renders_index() {
    let theme = theme(&["template/shop/index.php"]);
    let site = site(theme.path(), |_| {});

    let response = site.handle(&Request::new("/").query("module", "shop"));

    assert_eq!(
        response.template(),
        Some(theme.path().join("template/shop/index.php").as_path())
    );
}

#[test]
fn test_unrouted_request_leaves_template_to_host() {
    let theme = theme(&[]);
    let site = site(theme.path(), |_| {});

    let handled = site.process(&Request::from_uri("/?tag_id=-1"));

    assert!(matches!(handled.outcome, RouteOutcome::Unrouted(_)));
    assert!(!handled.context.is_module(None, None));
    assert!(handled.response.template().is_none());
    assert!(handled.response.canonical_redirect());
    assert_eq!(
        handled.vars.tax_query().unwrap().clauses().collect::<Vec<_>>(),
        vec![&TaxonomyClause::not_exists("post_tag")]
    );
}

#[test]
fn test_missing_template_is_a_routing_error() {
    let theme = theme(&[]);
    let site = site(theme.path(), |_| {});
    site.register_module("blog", ModuleConfig::new(|_, _, _| {}));

    let response = site.handle(&Request::from_uri("/?module=blog"));

    assert!(response.is_halted());
    assert_eq!(response.status(), 500);
    assert_eq!(response.body(), Some("路由错误！"));
}

#[test]
fn test_unknown_module_still_needs_a_template() {
    let theme = theme(&["template/landing/promo.php"]);
    let site = site(theme.path(), |_| {});

    let handled = site.process(&Request::from_uri("/?module=landing&action=promo"));

    assert!(matches!(
        handled.outcome,
        RouteOutcome::Routed {
            dispatched: false,
            ..
        }
    ));
    assert!(handled.response.template().is_some());
}

#[test]
fn test_template_filter_overrides_path() {
    let theme = theme(&["custom/blog-list.html"]);
    let site = site(theme.path(), |config| {
        config.site.template_suffix = "html".into();
    });
    site.register_module("blog", ModuleConfig::new(|_, _, _| {}));

    let root: PathBuf = theme.path().to_path_buf();
    site.add_template_filter(move |path, module, action| {
        if module == "blog" {
            root.join(format!("custom/{module}-{action}.html"))
        } else {
            path
        }
    });

    let response = site.handle(&Request::from_uri("/?module=blog&action=list"));
    assert_eq!(
        response.template(),
        Some(theme.path().join("custom/blog-list.html").as_path())
    );
}

#[test]
fn test_json_api_through_rewrite_root() {
    let theme = theme(&[]);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut config = TrellisConfig::default();
    config.site.theme_root = theme.path().to_path_buf();
    config.site.rewrite_root = "blog/".into();

    let site = {
        let seen = Arc::clone(&seen);
        Site::builder()
            .search_path(theme.path())
            .without_env()
            .without_logging()
            .merge(config)
            .json_api(move |api: &str, response: &mut Response| {
                seen.lock().unwrap().push(api.to_string());
                response.halt_json(200, &json!({ "errcode": 0 }));
            })
            .build()
            .unwrap()
    };

    let nested = Request::new("/blog/api/post/list.json");
    assert!(nested.is_json());
    let response = site.handle(&nested);
    assert_eq!(response.status(), 200);
    assert_eq!(response.header("Content-Type"), Some("application/json; charset=utf-8"));

    site.handle(&Request::new("/blog/api/user.jso"));
    // Outside the rewrite root: no rule matches, nothing is routed.
    let outside = site.process(&Request::new("/api/user.json"));
    assert!(matches!(outside.outcome, RouteOutcome::Unrouted(_)));

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["mag.post.list".to_string(), "user".to_string()]
    );
}

#[test]
fn test_custom_rewrite_rule() {
    let theme = theme(&["template/blog/detail.php"]);
    let site = site(theme.path(), |_| {});
    site.add_rewrite_rule(r"posts/([0-9]+)/?$", "module=blog&action=detail&p=${1}")
        .unwrap();

    let handled = site.process(&Request::new("/posts/42"));

    assert!(handled.context.is_module(Some("blog"), Some("detail")));
    assert_eq!(handled.vars.text("p"), Some("42"));
    assert!(handled.response.template().is_some());
}

#[test]
fn test_halting_module_skips_template_and_rewrite() {
    let theme = theme(&[]);
    let site = site(theme.path(), |_| {});
    site.register_taxonomy("color");
    site.register_module(
        "feed",
        ModuleConfig::new(|_, _, response| response.halt(200, "<rss/>")),
    );

    let handled = site.process(&Request::from_uri("/?module=feed&color_id=3"));

    assert!(handled.outcome.is_halted());
    assert_eq!(handled.response.body(), Some("<rss/>"));
    assert!(handled.response.template().is_none());
    assert!(handled.vars.tax_query().is_none());
}

#[test]
fn test_registration_filter_and_unregister() {
    let theme = theme(&["template/blog/index.php"]);
    let site = site(theme.path(), |_| {});
    site.add_registration_filter(|config, name| {
        if name == "blog" {
            config.callback(|_, _, response| response.halt(403, "closed"))
        } else {
            config
        }
    });
    site.register_module("blog", ModuleConfig::new(|_, _, _| {}));

    assert_eq!(site.handle(&Request::from_uri("/?module=blog")).status(), 403);

    site.unregister_module("blog");
    site.unregister_module("blog");
    let response = site.handle(&Request::from_uri("/?module=blog"));
    assert_eq!(response.status(), 200);
    assert!(response.template().is_some());
}

#[test]
fn test_taxonomy_and_date_rewriting_in_site_offset() {
    let theme = theme(&[]);
    let site = site(theme.path(), |config| {
        config.site.gmt_offset = 8.0;
        config.query.tax_query_merge = TaxQueryMerge::Append;
    });
    site.register_taxonomy("genre");

    let handled = site.process(&Request::from_uri(
        "/?taxonomy=genre&term_id=42&cat=-1&cursor=1700000000&since=0",
    ));

    let tax_query = handled.vars.tax_query().unwrap();
    assert_eq!(
        tax_query.nodes(),
        &[
            TaxQueryNode::Clause(TaxonomyClause::not_exists("category")),
            TaxQueryNode::Clause(TaxonomyClause::term("genre", 42)),
        ]
    );
    assert!(!handled.vars.contains("cat"));

    let date_query = handled.vars.date_query().unwrap();
    assert_eq!(date_query.len(), 1);
    assert_eq!(date_query[0].bound, DateBound::Before);
    assert_eq!(date_query[0].local_wall_time(), "2023-11-15 06:13:20");
    assert_eq!(date_query[0].gmt_wall_time(), "2023-11-14 22:13:20");
}

#[test]
fn test_slug_term_id_becomes_term() {
    let theme = theme(&[]);
    let site = site(theme.path(), |_| {});

    let handled = site.process(&Request::from_uri("/?taxonomy=genre&term_id=scifi"));

    assert_eq!(handled.vars.text("term"), Some("scifi"));
    assert!(handled.vars.tax_query().is_none());
}

#[test]
fn test_action_outside_theme_is_a_routing_error() {
    let outside = theme(&["secret.php"]);
    let theme = theme(&["template/blog/list.php"]);
    let site = site(theme.path(), |_| {});
    site.register_module("blog", ModuleConfig::new(|_, _, _| {}));

    let action = outside.path().join("secret");
    let response = site.handle(
        &Request::new("/")
            .query("module", "blog")
            .query("action", action.to_str().unwrap()),
    );
    assert_eq!(response.status(), 500);
    assert!(response.template().is_none());

    let response = site.handle(&Request::from_uri("/?module=blog&action=..%2F..%2Fsecret"));
    assert_eq!(response.status(), 500);
    assert_eq!(response.body(), Some("路由错误！"));
}

#[test]
fn test_query_string_is_percent_decoded() {
    let theme = theme(&[]);
    let site = site(theme.path(), |_| {});

    let handled = site.process(&Request::from_uri("/?taxonomy=genre&term_id=sci%20fi"));
    assert_eq!(handled.vars.text("term"), Some("sci fi"));

    let handled = site.process(&Request::from_uri("/?taxonomy=genre&term_id=new+wave"));
    assert_eq!(handled.vars.text("term"), Some("new wave"));
}

#[test]
fn test_negative_one_term_id_selects_untagged() {
    let theme = theme(&[]);
    let site = site(theme.path(), |_| {});

    let handled = site.process(&Request::from_uri("/?taxonomy=genre&term_id=-1"));

    assert!(handled.vars.is_empty_var("term"));
    assert_eq!(
        handled.vars.tax_query().unwrap().clauses().collect::<Vec<_>>(),
        vec![&TaxonomyClause::not_exists("genre")]
    );
}

#[test]
fn test_module_callback_can_register_modules() {
    let theme = theme(&["template/setup/index.php"]);
    let site = Arc::new(site(theme.path(), |_| {}));
    let weak = Arc::downgrade(&site);
    site.register_module(
        "setup",
        ModuleConfig::new(move |_, _, _| {
            if let Some(site) = weak.upgrade() {
                site.register_module("late", ModuleConfig::new(|_, _, _| {}));
            }
        }),
    );

    let response = site.handle(&Request::from_uri("/?module=setup"));

    assert!(!response.is_halted());
    assert!(site.has_module("late"));
}
