use std::{fmt::Display, str::FromStr, sync::OnceLock};

use indexmap::IndexMap;

use crate::{PatternError, PatternKey, PatternNode, Placeholder, PlaceholderGroup};

/// The serving runtime a model is built for. Each has its own expected layout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PredictorType {
    /// Arbitrary script-driven predictors. Only the version directories are
    /// constrained.
    Python,
    /// `SavedModel` graphs with their variables directory.
    TensorFlow,
    /// Single-file portable inference graphs.
    Onnx,
}

impl PredictorType {
    pub const ALL: [PredictorType; 3] = [
        PredictorType::Python,
        PredictorType::TensorFlow,
        PredictorType::Onnx,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PredictorType::Python => "python",
            PredictorType::TensorFlow => "tensorflow",
            PredictorType::Onnx => "onnx",
        }
    }
}

impl Display for PredictorType {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictorType {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PatternError::UnknownPredictorType(s.to_owned()))
    }
}

struct Entry {
    model: PatternNode,
    dirs: PatternNode,
}

/// Maps each predictor type to its canonical layout pattern.
#[derive(Default)]
pub struct PatternRegistry {
    patterns: IndexMap<PredictorType, Entry, ahash::RandomState>,
}

impl PatternRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry of built-in patterns. Built on first use and
    /// never modified afterwards.
    pub fn global() -> Result<&'static PatternRegistry, PatternError> {
        static GLOBAL: OnceLock<Result<PatternRegistry, PatternError>> = OnceLock::new();
        GLOBAL
            .get_or_init(PatternRegistry::builtin)
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Build the canonical patterns for all predictor types.
    pub fn builtin() -> Result<Self, PatternError> {
        let mut registry = Self::new();
        registry.insert(PredictorType::Python, python_pattern());
        registry.insert(PredictorType::TensorFlow, tensorflow_pattern()?);
        registry.insert(PredictorType::Onnx, onnx_pattern()?);
        tracing::trace!("Built {} model layout patterns", registry.patterns.len());
        Ok(registry)
    }

    /// Register (or replace) the pattern for a predictor type. Returns the
    /// previous pattern, if any.
    pub fn insert(
        &mut self,
        predictor_type: PredictorType,
        pattern: PatternNode,
    ) -> Option<PatternNode> {
        let dirs = pattern.clone().wrap_unique();
        self.patterns
            .insert(
                predictor_type,
                Entry {
                    model: pattern,
                    dirs,
                },
            )
            .map(|entry| entry.model)
    }

    fn entry(&self, predictor_type: PredictorType) -> Result<&Entry, PatternError> {
        self.patterns
            .get(&predictor_type)
            .ok_or_else(|| PatternError::UnknownPredictorType(predictor_type.to_string()))
    }

    /// Pattern for a path that points at a single model's root, i.e. the
    /// directory holding the version directories.
    pub fn model_pattern(&self, predictor_type: PredictorType) -> Result<&PatternNode, PatternError> {
        self.entry(predictor_type).map(|entry| &entry.model)
    }

    /// Pattern for a directory containing exactly one model directory, whose
    /// name is unconstrained.
    pub fn dirs_model_pattern(
        &self,
        predictor_type: PredictorType,
    ) -> Result<&PatternNode, PatternError> {
        self.entry(predictor_type).map(|entry| &entry.dirs)
    }

    pub fn predictor_types(&self) -> impl Iterator<Item = PredictorType> + '_ {
        self.patterns.keys().copied()
    }

    #[must_use]
    pub fn contains(&self, predictor_type: PredictorType) -> bool {
        self.patterns.contains_key(&predictor_type)
    }
}

/// Shorthand for [`PatternRegistry::model_pattern()`] on the global registry.
pub fn model_pattern(predictor_type: PredictorType) -> Result<&'static PatternNode, PatternError> {
    PatternRegistry::global()?.model_pattern(predictor_type)
}

/// Shorthand for [`PatternRegistry::dirs_model_pattern()`] on the global
/// registry.
pub fn dirs_model_pattern(
    predictor_type: PredictorType,
) -> Result<&'static PatternNode, PatternError> {
    PatternRegistry::global()?.dirs_model_pattern(predictor_type)
}

// <integer>/<any>
fn python_pattern() -> PatternNode {
    PatternNode::map([(Placeholder::Integer, PatternNode::key(Placeholder::Any))])
}

// <integer>/saved_model.pb
// <integer>/variables/variables.index
// <integer>/variables/variables.data-00000-of-<any>
fn tensorflow_pattern() -> Result<PatternNode, PatternError> {
    let shard = PlaceholderGroup::new([
        Placeholder::generic("variables.data-00000-of-")?,
        Placeholder::Any,
    ])?;
    let variables = PatternNode::set([
        Placeholder::generic("variables.index")?.into(),
        shard.into(),
        PatternKey::from(Placeholder::Any),
    ]);
    let version = PatternNode::map([
        (Placeholder::Any, PatternNode::Leaf),
        (Placeholder::generic("saved_model.pb")?, PatternNode::Leaf),
        (Placeholder::generic("variables")?, variables),
    ]);
    Ok(PatternNode::map([(Placeholder::Integer, version)]))
}

// <integer>/<single>.onnx, or a lone <single>.onnx without versions
fn onnx_pattern() -> Result<PatternNode, PatternError> {
    let versioned = PlaceholderGroup::new([Placeholder::Single, Placeholder::generic(".onnx")?])?;
    let unversioned = PlaceholderGroup::new([
        Placeholder::Exclusive,
        Placeholder::Single,
        Placeholder::generic(".onnx")?,
    ])?;
    Ok(PatternNode::map([
        (PatternKey::from(Placeholder::Integer), PatternNode::set([versioned])),
        (PatternKey::from(unversioned), PatternNode::Leaf),
    ]))
}
