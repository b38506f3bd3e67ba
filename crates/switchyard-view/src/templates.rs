//! Tera-backed view files
//!
//! Layout under the views root, with the default configuration:
//!
//! ```text
//! views/
//! ├── partials/
//! │   ├── header.html
//! │   └── footer.html
//! ├── about/
//! │   └── index.html      -> view "about"
//! └── blog/archive/
//!     └── index.html      -> view "blog/archive"
//! ```
//!
//! Templates are loaded on first use. Autoescaping is off: bindings reach the
//! templates already escaped.

use crate::ViewError;
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use switchyard_core::view::{escape_value, ViewPart, ViewSource};
use switchyard_core::Output;
use tera::{Context, Tera};

/// Configuration for file-backed views
#[derive(Debug, Clone)]
pub struct ViewsConfig {
    /// Directory holding the views
    pub root: PathBuf,
    /// Entry file inside each view directory
    pub entry: String,
    /// Header partial, relative to the root
    pub header: String,
    /// Footer partial, relative to the root
    pub footer: String,
    /// Re-read template files on every render (development mode)
    pub auto_reload: bool,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("views"),
            entry: "index.html".to_string(),
            header: "partials/header.html".to_string(),
            footer: "partials/footer.html".to_string(),
            auto_reload: cfg!(debug_assertions),
        }
    }
}

impl ViewsConfig {
    /// Create a config rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Set the entry file name
    pub fn entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    /// Set the header and footer partials
    pub fn partials(mut self, header: impl Into<String>, footer: impl Into<String>) -> Self {
        self.header = header.into();
        self.footer = footer.into();
        self
    }

    /// Set auto-reload behavior
    pub fn auto_reload(mut self, enabled: bool) -> Self {
        self.auto_reload = enabled;
        self
    }
}

/// Views loaded from a directory and rendered with Tera
///
/// # Example
///
/// ```rust,ignore
/// use switchyard_view::TemplateViews;
///
/// let mut router = Router::new();
/// router.with_views(TemplateViews::new("views"));
/// ```
pub struct TemplateViews {
    tera: RwLock<Tera>,
    config: ViewsConfig,
}

impl TemplateViews {
    /// Create views rooted at `root` with the default layout
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(ViewsConfig::new(root))
    }

    /// Create views with configuration
    pub fn with_config(config: ViewsConfig) -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());

        Self {
            tera: RwLock::new(tera),
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ViewsConfig {
        &self.config
    }

    /// Render header, body and footer of `view` into a string.
    ///
    /// String values in `data` are HTML-escaped first, as during dispatch.
    ///
    /// # Errors
    ///
    /// [`ViewError::NotFound`] when the view has no entry file, or any
    /// load or render failure.
    pub fn page(&self, view: &str, data: &Map<String, Value>) -> Result<String, ViewError> {
        if !self.has_view(view) {
            return Err(ViewError::NotFound(view.to_string()));
        }
        let bindings: Map<String, Value> = data
            .iter()
            .map(|(key, value)| (key.clone(), escape_value(value)))
            .collect();

        let mut html = String::new();
        for part in ViewPart::ORDER {
            if let Some(rendered) = self.render_part(view, part, &bindings)? {
                html.push_str(&rendered);
            }
        }
        Ok(html)
    }

    fn entry_path(&self, view: &str) -> Result<PathBuf, ViewError> {
        let relative = Path::new(view);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if view.is_empty() || !safe {
            return Err(ViewError::InvalidView(view.to_string()));
        }
        Ok(self.config.root.join(relative).join(&self.config.entry))
    }

    /// Template name and file for one part; `None` for a missing partial.
    fn part_file(&self, view: &str, part: ViewPart) -> Result<Option<(String, PathBuf)>, ViewError> {
        let (name, path) = match part {
            ViewPart::Header => (self.config.header.clone(), self.config.root.join(&self.config.header)),
            ViewPart::Footer => (self.config.footer.clone(), self.config.root.join(&self.config.footer)),
            ViewPart::Body => (format!("{}/{}", view, self.config.entry), self.entry_path(view)?),
        };
        if part != ViewPart::Body && !path.is_file() {
            return Ok(None);
        }
        Ok(Some((name, path)))
    }

    fn render_part(&self, view: &str, part: ViewPart, bindings: &Map<String, Value>) -> Result<Option<String>, ViewError> {
        let Some((name, path)) = self.part_file(view, part)? else {
            return Ok(None);
        };
        self.load(&name, &path)?;

        let context = Context::from_value(Value::Object(bindings.clone()))?;
        let tera = self.tera.read().map_err(|_| ViewError::Poisoned)?;
        Ok(Some(tera.render(&name, &context)?))
    }

    fn load(&self, name: &str, path: &Path) -> Result<(), ViewError> {
        if !self.config.auto_reload {
            let tera = self.tera.read().map_err(|_| ViewError::Poisoned)?;
            if tera.get_template_names().any(|n| n == name) {
                return Ok(());
            }
        }

        let content = std::fs::read_to_string(path).map_err(|source| ViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut tera = self.tera.write().map_err(|_| ViewError::Poisoned)?;
        tera.add_raw_template(name, &content)?;
        tracing::debug!(template = name, "Loaded view template");
        Ok(())
    }
}

impl ViewSource for TemplateViews {
    fn has_view(&self, view: &str) -> bool {
        self.entry_path(view).map(|path| path.is_file()).unwrap_or(false)
    }

    fn render(
        &self,
        view: &str,
        part: ViewPart,
        bindings: &Map<String, Value>,
        out: &mut Output,
    ) -> switchyard_core::Result<()> {
        if let Some(rendered) = self.render_part(view, part, bindings)? {
            out.push_str(&rendered);
        }
        Ok(())
    }
}

impl std::fmt::Debug for TemplateViews {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateViews").field("config", &self.config).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "partials/header.html", "<header>{{ title }}</header>");
        write(dir.path(), "partials/footer.html", "<footer>{{ requested_view }}</footer>");
        write(dir.path(), "about/index.html", "<main>{{ title }}</main>");
        write(dir.path(), "blog/archive/index.html", "<p>{{ intro | upper }}</p>");
        dir
    }

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_has_view() {
        let dir = site();
        let views = TemplateViews::new(dir.path());
        assert!(views.has_view("about"));
        assert!(views.has_view("blog/archive"));
        assert!(!views.has_view("blog"));
        assert!(!views.has_view("missing"));
        assert!(!views.has_view("../about"));
    }

    #[test]
    fn test_page_renders_parts_in_order_with_escaping() {
        let dir = site();
        let views = TemplateViews::new(dir.path());
        let html = views
            .page("about", &data(json!({"title": "<About>", "requested_view": "about"})))
            .unwrap();
        assert_eq!(html, "<header>&lt;About&gt;</header><main>&lt;About&gt;</main><footer>about</footer>");
    }

    #[test]
    fn test_missing_partials_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "about/index.html", "body");
        let views = TemplateViews::new(dir.path());
        assert_eq!(views.page("about", &Map::new()).unwrap(), "body");
    }

    #[test]
    fn test_missing_view_is_not_found() {
        let dir = site();
        let views = TemplateViews::new(dir.path());
        assert!(matches!(views.page("missing", &Map::new()), Err(ViewError::NotFound(_))));
    }

    #[test]
    fn test_nested_view_renders_data() {
        let dir = site();
        let views = TemplateViews::with_config(ViewsConfig::new(dir.path()).partials("none", "none"));
        let html = views
            .page("blog/archive", &data(json!({"intro": "one two three"})))
            .unwrap();
        assert_eq!(html, "<p>ONE TWO THREE</p>");
    }

    #[test]
    fn test_auto_reload_picks_up_changes() {
        let dir = site();
        let views = TemplateViews::with_config(
            ViewsConfig::new(dir.path()).partials("none", "none").auto_reload(true),
        );
        assert_eq!(views.page("about", &data(json!({"title": "a"}))).unwrap(), "<main>a</main>");

        write(dir.path(), "about/index.html", "<section>{{ title }}</section>");
        assert_eq!(
            views.page("about", &data(json!({"title": "a"}))).unwrap(),
            "<section>a</section>"
        );
    }

    #[test]
    fn test_cached_without_auto_reload() {
        let dir = site();
        let views = TemplateViews::with_config(
            ViewsConfig::new(dir.path()).partials("none", "none").auto_reload(false),
        );
        views.page("about", &data(json!({"title": "a"}))).unwrap();

        write(dir.path(), "about/index.html", "changed");
        assert_eq!(views.page("about", &data(json!({"title": "a"}))).unwrap(), "<main>a</main>");
    }

    #[test]
    fn test_view_source_writes_into_output() {
        let dir = site();
        let views = TemplateViews::new(dir.path());
        let mut out = Output::new();
        let bindings = data(json!({"title": "t"}));
        ViewSource::render(&views, "about", ViewPart::Body, &bindings, &mut out).unwrap();
        assert_eq!(out.as_bytes(), b"<main>t</main>");
    }
}
