//! Web bundle builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::archive::{write_app_archive, ArchiveFilter, ARCHIVE_FILE};
use crate::index::{IndexPatch, INDEX_FILE};
use crate::options::{RouteUrlStrategy, WebRenderer};
use crate::paths::{absolutize, copy_tree, is_within_directory, recreate_dir};
use crate::requirements::{Requirements, REQUIREMENTS_FILE};
use crate::templates::TemplateEngine;

/// Default output directory name, created next to the app script.
pub const DIST_DIR: &str = "dist";

/// Configuration for building a web bundle.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// App entry script
    pub script_path: PathBuf,

    /// Prebuilt web runtime to copy into the output
    pub web_dir: PathBuf,

    /// Output directory (defaults to `dist` next to the script)
    pub output_dir: Option<PathBuf>,

    /// Static assets merged into the output (relative to the script directory)
    pub assets_dir: Option<PathBuf>,

    /// Allow micropip to install pre-release packages
    pub pre: bool,

    pub app_title: Option<String>,

    pub app_description: Option<String>,

    pub base_url: Option<String>,

    pub web_renderer: WebRenderer,

    pub route_url_strategy: RouteUrlStrategy,

    /// Extra files kept out of the archive
    pub exclude: Vec<PathBuf>,

    /// Directory relative paths are resolved against
    pub working_dir: PathBuf,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            script_path: PathBuf::from("main.py"),
            web_dir: PathBuf::from("web"),
            output_dir: None,
            assets_dir: None,
            pre: false,
            app_title: None,
            app_description: None,
            base_url: None,
            web_renderer: WebRenderer::default(),
            route_url_strategy: RouteUrlStrategy::default(),
            exclude: vec![],
            working_dir: std::env::current_dir().unwrap_or_default(),
        }
    }
}

/// Result of a bundle build.
#[derive(Debug)]
pub struct BundleResult {
    /// Output directory
    pub output_dir: PathBuf,

    /// Path of the generated `app.tar.gz`
    pub archive_path: PathBuf,

    /// Number of app entries archived (excluding the manifest)
    pub archived: usize,

    /// Merged requirements shipped in the archive
    pub requirements: Requirements,

    /// Total build time in milliseconds
    pub duration_ms: u64,
}

/// Errors that can occur during a bundle build.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("File not found: {0}")]
    ScriptNotFound(String),

    #[error("Web runtime directory not found: {0}")]
    WebDirNotFound(String),

    #[error("Assets dir not found: {0}")]
    AssetsNotFound(String),

    #[error("Refusing to clean {0}: it contains the app sources")]
    UnsafeOutputDir(String),

    #[error("Assets dir {assets} overlaps output dir {output}")]
    OverlappingAssetsDir { assets: String, output: String },

    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Failed to write archive: {0}")]
    ArchiveError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),
}

/// Paths derived from the configuration.
#[derive(Debug)]
struct Layout {
    script_path: PathBuf,
    script_dir: PathBuf,
    output_dir: PathBuf,
    assets_dir: Option<PathBuf>,
}

/// Builds the static web bundle for a Flet app.
pub struct BundleBuilder {
    config: BundleConfig,
    templates: TemplateEngine,
}

impl BundleBuilder {
    /// Create a new bundle builder.
    pub fn new(config: BundleConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    /// Build the bundle.
    pub fn build(&self) -> Result<BundleResult, BundleError> {
        let start = Instant::now();

        let layout = self.resolve_layout()?;

        tracing::info!("Cleaning up {}...", layout.output_dir.display());
        recreate_dir(&layout.output_dir).map_err(|e| {
            BundleError::WriteError(format!("{}: {}", layout.output_dir.display(), e))
        })?;

        self.copy_web_runtime(&layout)?;
        self.copy_assets(&layout)?;

        let requirements = Requirements::load(&layout.script_dir.join(REQUIREMENTS_FILE))
            .map_err(|e| BundleError::ReadError(format!("{}: {}", REQUIREMENTS_FILE, e)))?
            .merge_for_web();

        let archive_path = layout.output_dir.join(ARCHIVE_FILE);
        let archived = self.write_archive(&layout, &archive_path, &requirements)?;

        self.patch_index(&layout)?;

        Ok(BundleResult {
            output_dir: layout.output_dir,
            archive_path,
            archived,
            requirements,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Resolve script, output and assets paths, checking the script exists.
    fn resolve_layout(&self) -> Result<Layout, BundleError> {
        let cwd = &self.config.working_dir;

        let script_path = absolutize(&self.config.script_path, cwd);
        if !script_path.is_file() {
            return Err(BundleError::ScriptNotFound(
                script_path.display().to_string(),
            ));
        }

        let script_dir = script_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());

        let output_dir = match &self.config.output_dir {
            Some(dir) => absolutize(dir, cwd),
            None => script_dir.join(DIST_DIR),
        };

        // Cleaning an ancestor of the app would wipe the sources.
        if is_within_directory(&output_dir, &script_dir) {
            return Err(BundleError::UnsafeOutputDir(
                output_dir.display().to_string(),
            ));
        }

        let assets_dir = self
            .config
            .assets_dir
            .as_ref()
            .map(|dir| absolutize(dir, &script_dir));

        // Copying assets into themselves truncates or recurses forever.
        if let Some(assets_dir) = &assets_dir {
            if is_within_directory(assets_dir, &output_dir)
                || is_within_directory(&output_dir, assets_dir)
            {
                return Err(BundleError::OverlappingAssetsDir {
                    assets: assets_dir.display().to_string(),
                    output: output_dir.display().to_string(),
                });
            }
        }

        Ok(Layout {
            script_path,
            script_dir,
            output_dir,
            assets_dir,
        })
    }

    fn copy_web_runtime(&self, layout: &Layout) -> Result<(), BundleError> {
        let web_dir = absolutize(&self.config.web_dir, &self.config.working_dir);
        if !web_dir.is_dir() {
            return Err(BundleError::WebDirNotFound(web_dir.display().to_string()));
        }

        let copied = copy_tree(&web_dir, &layout.output_dir)
            .map_err(|e| BundleError::WriteError(format!("copying web runtime: {}", e)))?;
        tracing::debug!("Copied {} runtime files from {}", copied, web_dir.display());

        Ok(())
    }

    fn copy_assets(&self, layout: &Layout) -> Result<(), BundleError> {
        let Some(assets_dir) = &layout.assets_dir else {
            return Ok(());
        };

        if !assets_dir.exists() {
            return Err(BundleError::AssetsNotFound(
                assets_dir.display().to_string(),
            ));
        }

        let copied = copy_tree(assets_dir, &layout.output_dir)
            .map_err(|e| BundleError::WriteError(format!("copying assets: {}", e)))?;
        tracing::info!("Copied {} assets from {}", copied, assets_dir.display());

        Ok(())
    }

    fn write_archive(
        &self,
        layout: &Layout,
        archive_path: &Path,
        requirements: &Requirements,
    ) -> Result<usize, BundleError> {
        let mut filter = ArchiveFilter::new(&layout.script_dir).exclude_dir(&layout.output_dir);
        if let Some(assets_dir) = &layout.assets_dir {
            filter = filter.exclude_dir(assets_dir);
        }
        for file in &self.config.exclude {
            filter = filter.exclude_file(absolutize(file, &self.config.working_dir));
        }

        tracing::info!("Packaging application to {}", ARCHIVE_FILE);
        let summary = write_app_archive(archive_path, &filter, requirements)
            .map_err(|e| BundleError::ArchiveError(e.to_string()))?;

        Ok(summary.entries.len())
    }

    fn patch_index(&self, layout: &Layout) -> Result<(), BundleError> {
        tracing::info!("Patching {}", INDEX_FILE);

        let index_path = layout.output_dir.join(INDEX_FILE);
        let html = fs::read_to_string(&index_path)
            .map_err(|e| BundleError::ReadError(format!("{}: {}", index_path.display(), e)))?;

        let module_name = layout
            .script_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("main")
            .to_string();

        let patch = IndexPatch {
            pre: self.config.pre,
            module_name,
            web_renderer: self.config.web_renderer,
            route_url_strategy: self.config.route_url_strategy,
            base_url: self.config.base_url.clone(),
            app_title: self.config.app_title.clone(),
            app_description: self.config.app_description.clone(),
        };

        let html = patch
            .apply(&html, &self.templates)
            .map_err(|e| BundleError::TemplateError(e.to_string()))?;

        fs::write(&index_path, html)
            .map_err(|e| BundleError::WriteError(format!("{}: {}", index_path.display(), e)))?;

        Ok(())
    }
}
