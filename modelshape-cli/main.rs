mod config;
mod render;

use std::{io::Write as _, path::PathBuf, process::ExitCode};

use anyhow::{Context as _, Result};
use clap::Parser;
use modelshape_fs::{ListingSettings, ListingSource, LocalListing, StaticListing};
use modelshape_pattern::{PatternRegistry, PredictorType};
use modelshape_validator::Validator;

use crate::{
    config::{Config, Target},
    render::Outcome,
};

/// Check that model directories have the layout their predictor type expects.
#[derive(Debug, clap::Parser)]
#[clap(version)]
pub struct Args {
    /// The model directory to validate, or the directory of models with
    /// `--dir`.
    pub path: Option<String>,
    /// The predictor type to validate against. Overrides the type in
    /// `--config`.
    #[clap(short = 't', long = "type")]
    pub predictor_type: Option<PredictorType>,
    /// Treat PATH as a directory holding one directory per model.
    #[clap(long)]
    pub dir: bool,
    /// Read the predictor type and model locations from a predictor
    /// configuration file. Relative model paths are resolved against the
    /// directory of the file.
    #[clap(short, long, conflicts_with_all = ["path", "dir"])]
    pub config: Option<PathBuf>,
    /// Validate the keys listed in FILE (one per line, `-` for stdin) instead
    /// of walking the local file system, e.g. the output of an object-storage
    /// listing.
    #[clap(long)]
    pub listing: Option<PathBuf>,
    /// The key prefix of the model (or models directory) in `--listing`.
    /// Defaults to PATH, or to the whole listing.
    #[clap(long, requires = "listing")]
    pub prefix: Option<String>,
    /// Glob of files to leave out when walking local directories. May be
    /// passed multiple times.
    #[clap(long)]
    pub ignore: Vec<String>,
    /// Print the built-in pattern of every predictor type and exit.
    #[clap(long)]
    pub patterns: bool,
    #[clap(long, default_value = "auto")]
    pub color: ColorChoice,
    #[clap(long, default_value = "text")]
    pub output_format: OutputChoice,
}

/// Color mode.
#[derive(Clone, Copy, Default, Debug, clap::ValueEnum)]
pub enum ColorChoice {
    /// Enable color when stdout is a terminal, honoring the `NO_COLOR` and
    /// `CLICOLOR_FORCE` environment variables.
    #[default]
    Auto,
    /// Force color output, even if stdout is not a terminal.
    Always,
    /// Do not use color output.
    Never,
}

/// Output format.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputChoice {
    /// One line per model, followed by its diagnostics.
    #[default]
    Text,
    /// One JSON object per line. This also disables color output.
    Json,
}

impl Args {
    fn stdout_color(&self) -> anstream::ColorChoice {
        if self.output_format == OutputChoice::Json {
            return anstream::ColorChoice::Never;
        }
        match self.color {
            ColorChoice::Auto => anstream::ColorChoice::Auto,
            ColorChoice::Always => anstream::ColorChoice::Always,
            ColorChoice::Never => anstream::ColorChoice::Never,
        }
    }
}

fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_env("MODELSHAPE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match try_main(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            anstream::eprintln!("Error: {err:?}");
            ExitCode::from(2)
        }
    }
}

/// Returns false if any model failed validation.
fn try_main(args: &Args) -> Result<bool> {
    let registry = PatternRegistry::global()?;
    let mut stdout = anstream::AutoStream::new(std::io::stdout(), args.stdout_color());

    if args.patterns {
        render::render_patterns(
            &mut stdout,
            registry,
            args.output_format == OutputChoice::Json,
        )?;
        stdout.flush()?;
        return Ok(true);
    }

    let (predictor_type, target) = resolve_target(args)?;
    tracing::debug!("Validating {target:?} against the {predictor_type} layout");

    let source: Box<dyn ListingSource> = if let Some(listing) = &args.listing {
        Box::new(read_listing(listing)?)
    } else {
        let mut settings = ListingSettings::default();
        settings.ignore_globs(&args.ignore)?;
        Box::new(LocalListing::new(settings))
    };

    let validator = Validator::with_registry(registry);
    let outcome = match target {
        Target::Model(root) => Outcome::Models(vec![validator.validate_named_source(
            &*source,
            predictor_type,
            model_name(&root),
            &root,
        )?]),
        Target::Paths(paths) => Outcome::Models(
            paths
                .iter()
                .map(|(name, root)| {
                    validator.validate_named_source(&*source, predictor_type, name, root)
                })
                .collect::<Result<_, _>>()?,
        ),
        Target::Dir(root) => Outcome::Dir(validator.validate_models_dir_source(
            &*source,
            predictor_type,
            &root,
        )?),
    };

    match args.output_format {
        OutputChoice::Text => render::render_text(&mut stdout, &outcome)?,
        OutputChoice::Json => render::render_json(&mut stdout, &outcome)?,
    }
    stdout.flush()?;

    Ok(outcome.matched())
}

fn resolve_target(args: &Args) -> Result<(PredictorType, Target)> {
    if let Some(config_path) = &args.config {
        let text = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config = Config::parse(&text)
            .with_context(|| format!("invalid config file {}", config_path.display()))?;

        // Listed keys are not local paths.
        let base_dir = if args.listing.is_some() {
            None
        } else {
            config_path.parent()
        };
        let target = config.target(base_dir)?;

        let predictor_type = match args.predictor_type {
            Some(predictor_type) => {
                if predictor_type != config.predictor.predictor_type {
                    tracing::info!(
                        "Overriding predictor type `{}` from {} with `{predictor_type}`",
                        config.predictor.predictor_type,
                        config_path.display()
                    );
                }
                predictor_type
            }
            None => config.predictor.predictor_type,
        };
        return Ok((predictor_type, target));
    }

    let Some(predictor_type) = args.predictor_type else {
        anyhow::bail!("either `--type` or `--config` is required");
    };

    let root = match (&args.prefix, &args.path) {
        (Some(root), _) | (None, Some(root)) => root.clone(),
        (None, None) if args.listing.is_some() => String::new(),
        (None, None) => anyhow::bail!("no model path given"),
    };

    let target = if args.dir {
        Target::Dir(root)
    } else {
        Target::Model(root)
    };
    Ok((predictor_type, target))
}

fn read_listing(path: &std::path::Path) -> Result<StaticListing> {
    let text = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("failed to read listing from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read listing {}", path.display()))?
    };
    let listing = StaticListing::from_lines(&text);
    tracing::debug!("Read {} keys from {}", listing.keys().len(), path.display());
    Ok(listing)
}

/// The last segment of a model root.
fn model_name(root: &str) -> &str {
    root.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(".")
}
