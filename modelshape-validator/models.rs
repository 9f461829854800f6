use indexmap::IndexMap;
use modelshape_pattern::{PredictorType, is_integer};

use crate::{Diagnostic, PathTree, ValidationReport};

/// Validation result for one named model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ModelReport {
    pub name: String,
    /// Where the model lives, i.e. the validation root joined with the model
    /// directory in dir mode.
    pub base_path: String,
    /// Version directories found at the model root, sorted.
    pub versions: Vec<u64>,
    pub report: ValidationReport,
}

impl ModelReport {
    #[inline]
    #[must_use]
    pub fn matched(&self) -> bool {
        self.report.matched
    }
}

/// Validation result for a directory of models.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ModelsDirReport {
    pub predictor_type: PredictorType,
    pub root: String,
    pub models: Vec<ModelReport>,
    /// Problems with the models directory itself, such as loose files or no
    /// models at all.
    pub diagnostics: Vec<Diagnostic>,
}

impl ModelsDirReport {
    /// True if the directory itself is fine and every model matched.
    #[must_use]
    pub fn matched(&self) -> bool {
        self.diagnostics.is_empty() && self.models.iter().all(ModelReport::matched)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelReport> {
        self.models.iter().find(|model| model.name == name)
    }

    /// The models that matched their layout.
    #[must_use]
    pub fn models_tree(&self) -> ModelsTree {
        ModelsTree::from_reports(&self.models)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub base_path: String,
    pub versions: Vec<u64>,
}

/// Summary of the valid models found, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ModelsTree {
    models: IndexMap<String, ModelInfo, ahash::RandomState>,
}

impl ModelsTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the models that matched. Models that failed validation are left
    /// out.
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a ModelReport>) -> Self {
        let mut tree = Self::new();
        for model in reports {
            if !model.matched() {
                continue;
            }
            tree.insert(ModelInfo {
                name: model.name.clone(),
                base_path: model.base_path.clone(),
                versions: model.versions.clone(),
            });
        }
        tree
    }

    /// Insert a model, returning the previous entry with the same name.
    pub fn insert(&mut self, info: ModelInfo) -> Option<ModelInfo> {
        self.models.insert(info.name.clone(), info)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelInfo> {
        self.models.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelInfo> {
        self.models.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Version directories directly below a model root, sorted and deduplicated
/// (`01` and `1` are the same version).
#[must_use]
pub fn model_versions(model_root: &PathTree) -> Vec<u64> {
    let Some(children) = model_root.children() else {
        return Vec::new();
    };

    let mut versions: Vec<u64> = children
        .iter()
        .filter(|(name, child)| child.is_dir() && is_integer(name))
        .filter_map(|(name, _)| match name.parse() {
            Ok(version) => Some(version),
            Err(err) => {
                tracing::warn!("Ignoring version directory `{name}`: {err}");
                None
            }
        })
        .collect();
    versions.sort_unstable();
    versions.dedup();
    versions
}

pub(crate) fn join_root(root: &str, name: &str, delimiter: char) -> String {
    let root = root.trim_end_matches(delimiter);
    if root.is_empty() {
        name.to_owned()
    } else {
        format!("{root}{delimiter}{name}")
    }
}
