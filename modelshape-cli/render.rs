use std::io::Write;

use modelshape_pattern::{PatternRegistry, PredictorType};
use modelshape_validator::{Diagnostic, ModelReport, ModelsDirReport, ModelsTree};
use owo_colors::OwoColorize;

/// Everything validated in one invocation.
#[derive(Debug)]
pub enum Outcome {
    Models(Vec<ModelReport>),
    Dir(ModelsDirReport),
}

impl Outcome {
    pub fn matched(&self) -> bool {
        match self {
            Outcome::Models(models) => models.iter().all(ModelReport::matched),
            Outcome::Dir(dir) => dir.matched(),
        }
    }

    pub fn models(&self) -> &[ModelReport] {
        match self {
            Outcome::Models(models) => models,
            Outcome::Dir(dir) => &dir.models,
        }
    }

    pub fn models_tree(&self) -> ModelsTree {
        ModelsTree::from_reports(self.models())
    }
}

/// Human-readable output. Always emits ANSI styles; `out` is expected to strip
/// them when color is disabled.
pub fn render_text(out: &mut dyn Write, outcome: &Outcome) -> std::io::Result<()> {
    for model in outcome.models() {
        if model.matched() {
            write!(out, "{:>6} {}", "ok".green().bold(), model.name.bold())?;
            if model.base_path != model.name {
                write!(out, " ({})", model.base_path)?;
            }
            if !model.versions.is_empty() {
                write!(out, " versions: {}", DisplayVersions(&model.versions))?;
            }
            writeln!(out)?;
        } else {
            write!(out, "{:>6} {}", "error".red().bold(), model.name.bold())?;
            if model.base_path != model.name {
                write!(out, " ({})", model.base_path)?;
            }
            writeln!(
                out,
                ": does not match the {} model layout",
                model.report.predictor_type
            )?;
            for diagnostic in &model.report.diagnostics {
                writeln!(out, "       {}: {}", diagnostic.kind.yellow(), diagnostic.message)?;
            }
        }
    }

    if let Outcome::Dir(dir) = outcome {
        for diagnostic in &dir.diagnostics {
            writeln!(
                out,
                "{:>6} {}: {}: {}",
                "error".red().bold(),
                dir.root.bold(),
                diagnostic.kind.yellow(),
                diagnostic.message
            )?;
        }
    }

    let total = outcome.models().len();
    let valid = outcome.models().iter().filter(|m| m.matched()).count();
    if outcome.matched() {
        writeln!(out, "{total} of {total} models valid")?;
    } else {
        writeln!(out, "{}", format_args!("{valid} of {total} models valid").red())?;
    }
    Ok(())
}

#[derive(serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum JsonLine<'a> {
    Model(&'a ModelReport),
    ModelsDir {
        root: &'a str,
        diagnostics: &'a [Diagnostic],
    },
    Summary {
        matched: bool,
        models: ModelsTree,
    },
}

/// One JSON object per line: each validated model, then the models directory
/// diagnostics (in dir mode), then a summary of the valid models.
pub fn render_json(out: &mut dyn Write, outcome: &Outcome) -> std::io::Result<()> {
    fn line(out: &mut dyn Write, line: &JsonLine<'_>) -> std::io::Result<()> {
        serde_json::to_writer(&mut *out, line)?;
        writeln!(out)
    }

    for model in outcome.models() {
        line(out, &JsonLine::Model(model))?;
    }
    if let Outcome::Dir(dir) = outcome {
        line(
            out,
            &JsonLine::ModelsDir {
                root: &dir.root,
                diagnostics: &dir.diagnostics,
            },
        )?;
    }
    line(
        out,
        &JsonLine::Summary {
            matched: outcome.matched(),
            models: outcome.models_tree(),
        },
    )
}

/// Print the patterns of every registered predictor type.
pub fn render_patterns(
    out: &mut dyn Write,
    registry: &PatternRegistry,
    json: bool,
) -> Result<(), anyhow::Error> {
    #[derive(serde::Serialize)]
    struct PatternLine {
        predictor_type: PredictorType,
        model: String,
        models_dir: String,
    }

    for predictor_type in registry.predictor_types() {
        let model = registry.model_pattern(predictor_type)?;
        let models_dir = registry.dirs_model_pattern(predictor_type)?;
        if json {
            serde_json::to_writer(
                &mut *out,
                &PatternLine {
                    predictor_type,
                    model: model.to_string(),
                    models_dir: models_dir.to_string(),
                },
            )?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", predictor_type.bold())?;
            writeln!(out, "  model:      {model}")?;
            writeln!(out, "  models dir: {models_dir}")?;
        }
    }
    Ok(())
}

struct DisplayVersions<'a>(&'a [u64]);

impl std::fmt::Display for DisplayVersions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, version) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{version}")?;
        }
        Ok(())
    }
}
