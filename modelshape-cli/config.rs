use std::path::Path;

use modelshape_pattern::PredictorType;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Toml(#[from] toml_edit::de::Error),
    #[error(
        "predictor config must set exactly one of `model_path`, `models.paths` or `models.dir`, found {0}"
    )]
    ModelLocation(&'static str),
    #[error("model name `{0}` appears more than once in `models.paths`")]
    DuplicateModelName(String),
}

/// The subset of a predictor API configuration that locates its models.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub predictor: PredictorConfig,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PredictorConfig {
    #[serde(rename = "type")]
    pub predictor_type: PredictorType,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default)]
    pub models: Option<ModelsConfig>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub paths: Vec<ModelPathConfig>,
    #[serde(default)]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ModelPathConfig {
    pub name: String,
    pub model_path: String,
}

/// What to validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single model root.
    Model(String),
    /// Named model roots, each validated on its own.
    Paths(Vec<(String, String)>),
    /// A directory of model directories.
    Dir(String),
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml_edit::de::from_str(text)?)
    }

    /// Resolve the model location. Relative local paths are taken relative to
    /// `base_dir`, the directory of the config file.
    pub fn target(&self, base_dir: Option<&Path>) -> Result<Target, ConfigError> {
        let predictor = &self.predictor;
        let models = predictor.models.clone().unwrap_or_default();
        let resolve = |path: &str| resolve_path(base_dir, path);

        let target = match (&predictor.model_path, models.paths.is_empty(), &models.dir) {
            (Some(model_path), true, None) => Target::Model(resolve(model_path)),
            (None, false, None) => {
                let mut paths: Vec<(String, String)> = Vec::with_capacity(models.paths.len());
                for model in &models.paths {
                    if paths.iter().any(|(name, _)| *name == model.name) {
                        return Err(ConfigError::DuplicateModelName(model.name.clone()));
                    }
                    paths.push((model.name.clone(), resolve(&model.model_path)));
                }
                Target::Paths(paths)
            }
            (None, true, Some(dir)) => Target::Dir(resolve(dir)),
            (None, true, None) => return Err(ConfigError::ModelLocation("none")),
            _ => return Err(ConfigError::ModelLocation("more than one")),
        };

        Ok(target)
    }
}

fn resolve_path(base_dir: Option<&Path>, path: &str) -> String {
    // Object-storage style locations are used as-is.
    if path.contains("://") {
        return path.to_owned();
    }
    match base_dir {
        Some(base_dir) if Path::new(path).is_relative() => {
            base_dir.join(path).to_string_lossy().into_owned()
        }
        _ => path.to_owned(),
    }
}
