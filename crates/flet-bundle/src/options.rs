//! Enumerated publish options.

use std::fmt;

use serde::Deserialize;

/// Renderer the Flutter web runtime should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WebRenderer {
    #[default]
    Canvaskit,
    Html,
}

impl WebRenderer {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebRenderer::Canvaskit => "canvaskit",
            WebRenderer::Html => "html",
        }
    }
}

impl fmt::Display for WebRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How app routes are reflected in the browser URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RouteUrlStrategy {
    /// `https://example.com/store`
    #[default]
    Path,
    /// `https://example.com/#/store`
    Hash,
}

impl RouteUrlStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteUrlStrategy::Path => "path",
            RouteUrlStrategy::Hash => "hash",
        }
    }
}

impl fmt::Display for RouteUrlStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        renderer: WebRenderer,
        strategy: RouteUrlStrategy,
    }

    #[test]
    fn defaults_match_runtime_defaults() {
        assert_eq!(WebRenderer::default(), WebRenderer::Canvaskit);
        assert_eq!(RouteUrlStrategy::default(), RouteUrlStrategy::Path);
    }

    #[test]
    fn deserializes_lowercase_names() {
        let w: Wrapper =
            serde_json::from_str(r#"{"renderer":"html","strategy":"hash"}"#).unwrap();
        assert_eq!(w.renderer, WebRenderer::Html);
        assert_eq!(w.strategy, RouteUrlStrategy::Hash);
    }

    #[test]
    fn rejects_unknown_renderer() {
        let result: Result<Wrapper, _> =
            serde_json::from_str(r#"{"renderer":"skia","strategy":"path"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn displays_cli_names() {
        assert_eq!(WebRenderer::Html.to_string(), "html");
        assert_eq!(RouteUrlStrategy::Hash.to_string(), "hash");
    }
}
