//! Script snippets injected into the web runtime's `index.html`.

use minijinja::{context, Environment};

use crate::options::WebRenderer;

/// Template engine for the index snippets, using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in snippets.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("pyodide.html".to_string(), PYODIDE_TEMPLATE.to_string())
            .expect("Failed to add pyodide template");

        env.add_template_owned("renderer.html".to_string(), RENDERER_TEMPLATE.to_string())
            .expect("Failed to add renderer template");

        Self { env }
    }

    /// Render the block that boots the Python app inside pyodide.
    pub fn render_pyodide(&self, pre: bool, module_name: &str) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("pyodide.html")?;

        tmpl.render(context! {
            pre => js_literal(&pre),
            module_name => js_literal(module_name),
        })
    }

    /// Render the script selecting the Flutter web renderer.
    pub fn render_renderer(&self, renderer: WebRenderer) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("renderer.html")?;

        tmpl.render(context! {
            renderer => js_literal(renderer.as_str()),
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a value as a JavaScript literal.
fn js_literal<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

const PYODIDE_TEMPLATE: &str = r##"
<script>
    var micropipIncludePre = {{ pre | safe }};
    var pythonModuleName = {{ module_name | safe }};
</script>
<script src="python.js"></script>
"##;

const RENDERER_TEMPLATE: &str =
    r##"<script>window.flutterWebRenderer={{ renderer | safe }};</script>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_pyodide_block() {
        let engine = TemplateEngine::new();

        let html = engine.render_pyodide(true, "main").unwrap();

        assert!(html.contains("var micropipIncludePre = true;"));
        assert!(html.contains(r#"var pythonModuleName = "main";"#));
        assert!(html.contains(r#"<script src="python.js"></script>"#));
    }

    #[test]
    fn escapes_module_name_as_js_string() {
        let engine = TemplateEngine::new();

        let html = engine.render_pyodide(false, r#"my"app"#).unwrap();

        assert!(html.contains("var micropipIncludePre = false;"));
        assert!(html.contains(r#"var pythonModuleName = "my\"app";"#));
    }

    #[test]
    fn renders_renderer_script() {
        let engine = TemplateEngine::new();

        let html = engine.render_renderer(WebRenderer::Html).unwrap();

        assert_eq!(html, r#"<script>window.flutterWebRenderer="html";</script>"#);
    }
}
