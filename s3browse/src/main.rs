use anyhow::{Context, Result}; // Use anyhow for easy error handling in the binary
use arboard::Clipboard;
use clap::Parser;
use log::{debug, error, info, LevelFilter};
use s3browse_lib::{
    browse, ListingOutcome, LocalDirLister, ManifestLister, ObjectLister, TemplateUrlSigner,
};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

mod config_loader;
mod output;

use config_loader::{build_run_settings, ListingSource, RunSettings};
use output::HostElement;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Renders an object-storage bucket listing as a nested HTML directory tree.",
    long_about = "s3browse lists the objects of a bucket under a prefix, arranges their slash-delimited keys into directories, and writes the result as nested <ul> markup with a download link and size for every file.\n\nThe listing comes from a saved ListObjects JSON response (--manifest, '-' for stdin) or from a local directory standing in for the bucket (--local-root). Bucket and prefix can be given as element attributes (--attr data-bucket=NAME) or config file values, and are overridden by --bucket and --prefix."
)]
pub struct Cli {
    /// Bucket to list. Overrides the 'data-bucket' attribute.
    #[arg(short, long)]
    pub bucket: Option<String>,

    /// Key prefix to list and strip. Overrides the 'data-prefix' attribute.
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Set an attribute of the host element. Can be used multiple times.
    /// Examples: -a data-bucket=media -a data-prefix=photos/
    #[arg(short = 'a', long = "attr", value_name = "NAME=VALUE")]
    pub attributes: Vec<String>,

    /// Read the listing from a ListObjects JSON response ('-' for stdin).
    #[arg(short, long, value_name = "FILE", conflicts_with = "local_root")]
    pub manifest: Option<PathBuf>,

    /// Treat <DIR>/<bucket>/ on the local filesystem as the bucket.
    #[arg(short, long, value_name = "DIR", conflicts_with = "manifest")]
    pub local_root: Option<PathBuf>,

    /// Link template with {bucket} and {key} placeholders.
    #[arg(long, value_name = "TEMPLATE")]
    pub url_template: Option<String>,

    /// Lifetime of generated links in seconds.
    #[arg(long, value_name = "SECS")]
    pub expires: Option<u64>,

    /// Maximum number of keys listed (the first page), from either source.
    #[arg(long, value_name = "N")]
    pub max_keys: Option<usize>,

    /// Wrap the output in the host <div> element carrying its attributes.
    #[arg(short, long)]
    pub wrap: bool,

    /// Write output to a file instead of stdout.
    #[arg(short = 'o', long, conflicts_with = "clipboard")]
    pub output: Option<PathBuf>,

    /// Copy output to the system clipboard instead of stdout or a file.
    #[arg(short = 'c', long, conflicts_with = "output")]
    pub clipboard: bool,

    /// Read settings from this TOML file after the global and local ones.
    #[arg(long = "config", value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Ignore all config files.
    #[arg(long)]
    pub no_config: bool,

    /// Enable verbose output. Use -v for info, -vv for debug, -vvv for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
impl Cli {
    pub(crate) fn test_default() -> Self {
        Self {
            bucket: None,
            prefix: None,
            attributes: Vec::new(),
            manifest: None,
            local_root: None,
            url_template: None,
            expires: None,
            max_keys: None,
            wrap: false,
            output: None,
            clipboard: false,
            config_path: None,
            no_config: false,
            verbose: 0,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // --- Initialize Logging ---
    let log_level = match cli.verbose {
        0 => LevelFilter::Warn,  // Default: Show warnings and errors
        1 => LevelFilter::Info,  // -v: Show info, warnings, errors
        2 => LevelFilter::Debug, // -vv: Show debug, info, warnings, errors
        _ => LevelFilter::Trace, // -vvv and more: Show everything
    };

    env_logger::Builder::new().filter_level(log_level).init();

    info!("Log level set to: {}", log_level);
    debug!("Parsed arguments: {:?}", cli);

    let working_dir = std::env::current_dir().context("Failed to get current working directory")?;
    let run = build_run_settings(&cli, &working_dir)?;
    debug!("Run settings: {:?}", run);

    let outcome = run_listing(&run);
    if let ListingOutcome::Failed(message) = &outcome {
        error!("Listing failed: {}", message);
    }

    let mut element = HostElement::new(run.attributes.clone(), run.wrap_element);
    outcome.render_into(&mut element);
    write_output(&cli, element.into_content())?;

    if outcome.is_failure() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_listing(run: &RunSettings) -> ListingOutcome {
    let signer = TemplateUrlSigner::new(run.url_template.clone(), run.expires_in);
    let lister: Box<dyn ObjectLister> = match &run.source {
        ListingSource::Manifest(source) => {
            info!("Listing from manifest {:?}", source);
            Box::new(ManifestLister::new(source.clone()).with_max_keys(run.max_keys))
        }
        ListingSource::LocalDir(root) => {
            info!("Listing from local root {:?}", root);
            Box::new(LocalDirLister::new(root.clone()).with_max_keys(run.max_keys))
        }
    };
    browse(lister.as_ref(), &signer, &run.settings)
}

fn write_output(cli: &Cli, content: String) -> Result<()> {
    if cli.clipboard {
        info!("Copying output to clipboard...");
        let mut clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
        clipboard
            .set_text(content)
            .context("Failed to copy content to clipboard")?;
        info!("Successfully copied content to clipboard.");
    } else if let Some(output_path) = &cli.output {
        info!("Writing output to file: {:?}", output_path);
        let mut file = File::create(output_path)
            .with_context(|| format!("Failed to create output file: {:?}", output_path))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write content to file: {:?}", output_path))?;
        info!("Successfully wrote content to {:?}", output_path);
    } else {
        debug!("Writing output to stdout...");
        let mut stdout = io::stdout();
        stdout
            .write_all(content.as_bytes())
            .context("Failed to write content to stdout")?;
        stdout.flush().context("Failed to flush stdout")?;
        debug!("Finished writing to stdout.");
    }
    Ok(())
}
