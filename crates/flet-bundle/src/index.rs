//! Placeholder substitution for the runtime's `index.html`.

use crate::options::{RouteUrlStrategy, WebRenderer};
use crate::templates::TemplateEngine;

/// Entry document file name in the web runtime.
pub const INDEX_FILE: &str = "index.html";

const PYODIDE_FLAG_TOKEN: &str = "%FLET_WEB_PYODIDE%";
const PYODIDE_CODE_TOKEN: &str = "<!-- pyodideCode -->";
const RENDERER_TOKEN: &str = "<!-- flutterWebRenderer -->";
const ROUTE_STRATEGY_TOKEN: &str = "%FLET_ROUTE_URL_STRATEGY%";
const BASE_HREF: &str = r#"<base href="/">"#;
const TITLE_CONTENT: &str = r#"content="Flet""#;
const DESCRIPTION_CONTENT: &str = r#"content="Flet application.""#;

/// Values substituted into the entry document.
#[derive(Debug, Clone, Default)]
pub struct IndexPatch {
    /// Let micropip install pre-release packages
    pub pre: bool,

    /// Python module the runtime imports on start
    pub module_name: String,

    pub web_renderer: WebRenderer,

    pub route_url_strategy: RouteUrlStrategy,

    /// Base URL the app is served under, e.g. `apps/demo`
    pub base_url: Option<String>,

    pub app_title: Option<String>,

    pub app_description: Option<String>,
}

impl IndexPatch {
    /// Apply every substitution to `html`.
    ///
    /// Base URL, title and description are only rewritten when supplied.
    pub fn apply(&self, html: &str, templates: &TemplateEngine) -> Result<String, minijinja::Error> {
        let pyodide_code = templates.render_pyodide(self.pre, &self.module_name)?;
        let renderer_code = templates.render_renderer(self.web_renderer)?;

        let mut html = html
            .replace(PYODIDE_FLAG_TOKEN, "true")
            .replace(PYODIDE_CODE_TOKEN, &pyodide_code)
            .replace(RENDERER_TOKEN, &renderer_code)
            .replace(ROUTE_STRATEGY_TOKEN, self.route_url_strategy.as_str());

        if let Some(base_url) = non_empty(&self.base_url) {
            html = html.replace(
                BASE_HREF,
                &format!(r#"<base href="{}">"#, base_href(base_url)),
            );
        }

        if let Some(title) = non_empty(&self.app_title) {
            html = html.replace(TITLE_CONTENT, &format!(r#"content="{}""#, title));
        }

        if let Some(description) = non_empty(&self.app_description) {
            html = html.replace(DESCRIPTION_CONTENT, &format!(r#"content="{}""#, description));
        }

        Ok(html)
    }
}

/// Turn a user-supplied base URL into a `<base href>` value: `/` or `/<url>/`.
pub fn base_href(base_url: &str) -> String {
    let trimmed = base_url.trim_matches('/').trim();
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
