use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use log::debug;
use serde::Deserialize;

use s3browse_lib::{
    BrowseOptions, BrowseSettings, ElementAttributes, ManifestSource, BUCKET_ATTRIBUTE,
    DEFAULT_EXPIRES_SECS, DEFAULT_MAX_KEYS, DEFAULT_URL_TEMPLATE, PREFIX_ATTRIBUTE,
};

use crate::Cli;

/// Everything `main` needs for one listing.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub settings: BrowseSettings,
    pub attributes: ElementAttributes,
    pub source: ListingSource,
    pub url_template: String,
    pub expires_in: Duration,
    pub max_keys: usize,
    pub wrap_element: bool,
}

#[derive(Debug, Clone)]
pub enum ListingSource {
    Manifest(ManifestSource),
    LocalDir(PathBuf),
}

/// Merges config files and CLI flags into [`RunSettings`].
///
/// Layers, lowest precedence first: the global config
/// (`<config dir>/s3browse/config.toml`), `<working_dir>/.s3browse.toml`,
/// `--config`, `--attr`, then the remaining flags. `bucket` and `prefix` from
/// config files act as element attributes, so `--bucket` and `--prefix`
/// override them as explicit options.
pub fn build_run_settings(cli: &Cli, working_dir: &Path) -> Result<RunSettings> {
    let mut acc = Accum::default();

    if !cli.no_config {
        if let Some(base_dirs) = BaseDirs::new() {
            let global_config_path = base_dirs.config_dir().join("s3browse").join("config.toml");
            apply_config_file(&global_config_path, &mut acc)?;
        } else {
            debug!("No base directories available; skipping global config search");
        }

        apply_config_file(&working_dir.join(".s3browse.toml"), &mut acc)?;

        if let Some(explicit_path) = cli.config_path.as_ref() {
            apply_config_file(explicit_path, &mut acc)?;
        }
    } else if let Some(explicit_path) = cli.config_path.as_ref() {
        debug!(
            "--no-config specified; skipping explicitly requested config file {:?}",
            explicit_path
        );
    }

    // Element attributes given on the command line
    for raw in &cli.attributes {
        acc.attributes
            .set_pair(raw)
            .with_context(|| format!("Invalid --attr value '{}'", raw))?;
    }

    // CLI overrides (highest precedence)
    if let Some(path) = cli.manifest.as_ref() {
        acc.source = Some(ListingSource::Manifest(ManifestSource::from_arg(path)));
    }
    if let Some(root) = cli.local_root.as_ref() {
        acc.source = Some(ListingSource::LocalDir(root.clone()));
    }
    if let Some(template) = cli.url_template.as_ref() {
        acc.url_template = Some(template.clone());
    }
    if let Some(secs) = cli.expires {
        acc.expires_secs = Some(secs);
    }
    if let Some(max_keys) = cli.max_keys {
        acc.max_keys = Some(max_keys);
    }
    if cli.wrap {
        acc.wrap_element = Some(true);
    }

    let options = BrowseOptions {
        bucket: cli.bucket.clone(),
        prefix: cli.prefix.clone(),
    };
    let settings = BrowseSettings::resolve(&acc.attributes, &options)?;

    // The host element reflects the resolved values.
    let mut attributes = acc.attributes;
    attributes.set(BUCKET_ATTRIBUTE, settings.bucket.clone());
    attributes.set(PREFIX_ATTRIBUTE, settings.prefix.clone());

    let Some(source) = acc.source else {
        bail!("No listing source configured: pass --manifest <FILE> or --local-root <DIR>");
    };

    let max_keys = acc.max_keys.unwrap_or(DEFAULT_MAX_KEYS);
    if max_keys == 0 {
        bail!("max_keys must be greater than 0");
    }

    Ok(RunSettings {
        settings,
        attributes,
        source,
        url_template: acc
            .url_template
            .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string()),
        expires_in: Duration::from_secs(acc.expires_secs.unwrap_or(DEFAULT_EXPIRES_SECS)),
        max_keys,
        wrap_element: acc.wrap_element.unwrap_or(false),
    })
}

#[derive(Debug, Default)]
struct Accum {
    attributes: ElementAttributes,
    source: Option<ListingSource>,
    url_template: Option<String>,
    expires_secs: Option<u64>,
    max_keys: Option<usize>,
    wrap_element: Option<bool>,
}

fn apply_config_file(path: &Path, acc: &mut Accum) -> Result<()> {
    if !path.exists() {
        debug!("Config file {:?} not found; skipping", path);
        return Ok(());
    }

    debug!("Loading config from {:?}", path);
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;

    let parsed: FileConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {:?}", path))?;

    if let Some(section) = parsed.s3browse {
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        apply_s3browse_section(section, base_dir, acc)
            .with_context(|| format!("Invalid settings in config file {:?}", path))?;
    }

    Ok(())
}

fn apply_s3browse_section(section: S3browseSection, base_dir: &Path, acc: &mut Accum) -> Result<()> {
    if let Some(bucket) = section.bucket {
        acc.attributes.set(BUCKET_ATTRIBUTE, bucket);
    }
    if let Some(prefix) = section.prefix {
        acc.attributes.set(PREFIX_ATTRIBUTE, prefix);
    }

    match (section.manifest, section.local_root) {
        (Some(_), Some(_)) => bail!("'manifest' and 'local_root' cannot both be set"),
        (Some(manifest), None) => {
            let source = if manifest == Path::new("-") {
                ManifestSource::Stdin
            } else {
                ManifestSource::File(base_dir.join(manifest))
            };
            acc.source = Some(ListingSource::Manifest(source));
        }
        (None, Some(root)) => acc.source = Some(ListingSource::LocalDir(base_dir.join(root))),
        (None, None) => {}
    }

    if let Some(template) = section.url_template {
        acc.url_template = Some(template);
    }
    if let Some(secs) = section.expires_secs {
        acc.expires_secs = Some(secs);
    }
    if let Some(max_keys) = section.max_keys {
        acc.max_keys = Some(max_keys);
    }
    if let Some(wrap) = section.wrap_element {
        acc.wrap_element = Some(wrap);
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    s3browse: Option<S3browseSection>,
}

/// Paths are resolved relative to the directory holding the config file.
#[derive(Debug, Deserialize)]
struct S3browseSection {
    bucket: Option<String>,
    prefix: Option<String>,
    manifest: Option<PathBuf>,
    local_root: Option<PathBuf>,
    url_template: Option<String>,
    expires_secs: Option<u64>,
    max_keys: Option<usize>,
    wrap_element: Option<bool>,
}
