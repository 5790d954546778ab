//! Publish command: package an app as a static web bundle.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flet_bundle::{BundleBuilder, BundleConfig};

use crate::config::{load_config, PublishSettings};
use crate::PublishArgs;

/// Runtime directory name looked up next to the executable.
const WEB_DIR: &str = "web";

/// Run the publish command.
pub fn run(args: PublishArgs, config_path: &Path) -> Result<()> {
    let settings = load_config(config_path)?.publish;
    let working_dir = env::current_dir().context("Failed to read current directory")?;

    let config = bundle_config(args, settings, config_path, working_dir)?;
    let result = BundleBuilder::new(config).build()?;

    tracing::info!(
        "Packaged {} entries with {} requirements in {}ms",
        result.archived,
        result.requirements.len(),
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

/// Merge command-line arguments over config file settings.
fn bundle_config(
    args: PublishArgs,
    settings: PublishSettings,
    config_path: &Path,
    working_dir: PathBuf,
) -> Result<BundleConfig> {
    // Paths in the config file are relative to the file, not the cwd.
    let config_dir = working_dir.join(config_path.parent().unwrap_or(Path::new("")));
    let from_config = |path: PathBuf| config_dir.join(path);

    let web_dir = match args.web_dir.or(settings.web_dir.map(from_config)) {
        Some(dir) => dir,
        None => default_web_dir()?,
    };

    Ok(BundleConfig {
        script_path: args.script,
        web_dir,
        output_dir: args.distpath.or(settings.distpath.map(from_config)),
        assets_dir: args.assets_dir.or(settings.assets),
        pre: args.pre || settings.pre,
        app_title: args.app_title.or(settings.app_title),
        app_description: args.app_description.or(settings.app_description),
        base_url: args.base_url.or(settings.base_url),
        web_renderer: args
            .web_renderer
            .or(settings.web_renderer)
            .unwrap_or_default(),
        route_url_strategy: args
            .route_url_strategy
            .or(settings.route_url_strategy)
            .unwrap_or_default(),
        exclude: vec![config_path.to_path_buf()],
        working_dir,
    })
}

/// `web/` next to the running executable.
fn default_web_dir() -> Result<PathBuf> {
    let exe = env::current_exe().context("Failed to locate the flet-publish executable")?;
    let dir = exe
        .parent()
        .map(|p| p.join(WEB_DIR))
        .unwrap_or_else(|| PathBuf::from(WEB_DIR));
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flet_bundle::{RouteUrlStrategy, WebRenderer};

    fn args(script: &str) -> PublishArgs {
        PublishArgs {
            script: PathBuf::from(script),
            pre: false,
            assets_dir: None,
            app_title: None,
            app_description: None,
            base_url: None,
            web_renderer: None,
            route_url_strategy: None,
            distpath: None,
            web_dir: Some(PathBuf::from("/opt/flet/web")),
        }
    }

    #[test]
    fn flags_override_config() {
        let settings = PublishSettings {
            app_title: Some("From config".to_string()),
            base_url: Some("config".to_string()),
            web_renderer: Some(WebRenderer::Html),
            assets: Some(PathBuf::from("static")),
            ..Default::default()
        };
        let args = PublishArgs {
            app_title: Some("From flag".to_string()),
            web_renderer: Some(WebRenderer::Canvaskit),
            ..args("main.py")
        };

        let config =
            bundle_config(args, settings, Path::new("publish.toml"), PathBuf::from("/work"))
                .unwrap();

        assert_eq!(config.app_title.as_deref(), Some("From flag"));
        assert_eq!(config.base_url.as_deref(), Some("config"));
        assert_eq!(config.web_renderer, WebRenderer::Canvaskit);
        assert_eq!(config.assets_dir, Some(PathBuf::from("static")));
        assert_eq!(config.route_url_strategy, RouteUrlStrategy::Path);
        assert_eq!(config.web_dir, PathBuf::from("/opt/flet/web"));
        assert_eq!(config.exclude, vec![PathBuf::from("publish.toml")]);
    }

    #[test]
    fn config_paths_resolve_against_config_dir() {
        let settings = PublishSettings {
            web_dir: Some(PathBuf::from("runtime/web")),
            distpath: Some(PathBuf::from("public")),
            assets: Some(PathBuf::from("static")),
            ..Default::default()
        };
        let args = PublishArgs {
            web_dir: None,
            ..args("main.py")
        };

        let config = bundle_config(
            args,
            settings,
            Path::new("deploy/publish.toml"),
            PathBuf::from("/work"),
        )
        .unwrap();

        assert_eq!(config.web_dir, PathBuf::from("/work/deploy/runtime/web"));
        assert_eq!(config.output_dir, Some(PathBuf::from("/work/deploy/public")));
        // assets stay relative to the app script
        assert_eq!(config.assets_dir, Some(PathBuf::from("static")));
    }

    #[test]
    fn flag_paths_stay_relative_to_cwd() {
        let settings = PublishSettings {
            distpath: Some(PathBuf::from("public")),
            ..Default::default()
        };
        let args = PublishArgs {
            distpath: Some(PathBuf::from("out")),
            ..args("main.py")
        };

        let config = bundle_config(
            args,
            settings,
            Path::new("deploy/publish.toml"),
            PathBuf::from("/work"),
        )
        .unwrap();

        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.web_dir, PathBuf::from("/opt/flet/web"));
    }

    #[test]
    fn pre_is_enabled_by_either_source() {
        let settings = PublishSettings {
            pre: true,
            ..Default::default()
        };

        let config =
            bundle_config(args("main.py"), settings, Path::new("publish.toml"), PathBuf::from("/w"))
                .unwrap();

        assert!(config.pre);
    }

    #[test]
    fn falls_back_to_web_dir_next_to_binary() {
        let args = PublishArgs {
            web_dir: None,
            ..args("main.py")
        };

        let config = bundle_config(
            args,
            PublishSettings::default(),
            Path::new("publish.toml"),
            PathBuf::from("/w"),
        )
        .unwrap();

        assert!(config.web_dir.ends_with(WEB_DIR));
    }
}
