use modelshape_fs::{DELIMITER, ListingSource};
use modelshape_pattern::{PatternNode, PatternRegistry, PredictorType};

use crate::{
    Diagnostic, DiagnosticKind, Error, Matcher, ModelReport, ModelsDirReport, PathTree,
    TreeBuilder, ValidationReport, models::join_root, model_versions,
};

/// Validates file listings against the model layouts of a
/// [`PatternRegistry`].
///
/// Each call validates against exactly one predictor type's pattern, and
/// builds (and drops) its own [`PathTree`].
#[derive(Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r PatternRegistry,
    delimiter: char,
}

impl Validator<'static> {
    /// A validator using the built-in patterns.
    pub fn new() -> Result<Self, Error> {
        Ok(Self::with_registry(PatternRegistry::global()?))
    }
}

impl<'r> Validator<'r> {
    #[must_use]
    pub fn with_registry(registry: &'r PatternRegistry) -> Self {
        Self {
            registry,
            delimiter: DELIMITER,
        }
    }

    /// Segment delimiter of the listed paths. Defaults to `/`.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &'r PatternRegistry {
        self.registry
    }

    fn tree_builder(&self, root: &str) -> TreeBuilder {
        TreeBuilder::new(root).with_delimiter(self.delimiter)
    }

    /// Sources return keys relative to the listed root, always separated by
    /// [`DELIMITER`].
    fn list_source(source: &dyn ListingSource, root: &str) -> Result<PathTree, Error> {
        let listing = source.list(root).map_err(|err| Error::listing(root, err))?;
        Ok(TreeBuilder::default().build(listing))
    }

    /// Validate the listing of a single model's root directory (holding its
    /// version directories).
    ///
    /// `paths` are expected to start with `root`; paths outside of it are
    /// skipped.
    pub fn validate_model<I, S>(
        &self,
        predictor_type: PredictorType,
        root: &str,
        paths: I,
    ) -> Result<ValidationReport, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pattern = self.registry.model_pattern(predictor_type)?;
        let tree = self.tree_builder(root).build(paths);
        Ok(check(predictor_type, pattern, root, &tree))
    }

    /// Validate an already built tree against the model pattern.
    pub fn validate_model_tree(
        &self,
        predictor_type: PredictorType,
        root: &str,
        tree: &PathTree,
    ) -> Result<ValidationReport, Error> {
        let pattern = self.registry.model_pattern(predictor_type)?;
        Ok(check(predictor_type, pattern, root, tree))
    }

    /// Validate a named model, e.g. one entry of a list of model paths.
    pub fn validate_named_model<I, S>(
        &self,
        predictor_type: PredictorType,
        name: &str,
        root: &str,
        paths: I,
    ) -> Result<ModelReport, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pattern = self.registry.model_pattern(predictor_type)?;
        let tree = self.tree_builder(root).build(paths);
        let report = check(predictor_type, pattern, root, &tree);
        Ok(ModelReport {
            name: name.to_owned(),
            base_path: root.to_owned(),
            versions: model_versions(&tree),
            report,
        })
    }

    /// Validate a directory holding any number of model directories. Each
    /// model is validated on its own against the predictor type's
    /// `<unique>`-wrapped pattern.
    pub fn validate_models_dir<I, S>(
        &self,
        predictor_type: PredictorType,
        root: &str,
        paths: I,
    ) -> Result<ModelsDirReport, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tree = self.tree_builder(root).build(paths);
        self.validate_models_dir_tree(predictor_type, root, &tree)
    }

    pub fn validate_models_dir_tree(
        &self,
        predictor_type: PredictorType,
        root: &str,
        tree: &PathTree,
    ) -> Result<ModelsDirReport, Error> {
        let pattern = self.registry.dirs_model_pattern(predictor_type)?;

        let mut models = Vec::new();
        let mut diagnostics = Vec::new();
        for (name, model_tree) in tree.children().into_iter().flatten() {
            if model_tree.is_file() {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnexpectedEntry,
                    name.clone(),
                    format_args!("`{name}` is a file, expected a model directory"),
                ));
                continue;
            }

            // Validate each model as if it were alone in the directory.
            let mut single = PathTree::empty_dir();
            if let PathTree::Dir(children) = &mut single {
                children.insert(name.clone(), model_tree.clone());
            }

            let report = check(predictor_type, pattern, root, &single);
            models.push(ModelReport {
                name: name.clone(),
                base_path: join_root(root, name, self.delimiter),
                versions: model_versions(model_tree),
                report,
            });
        }

        if models.is_empty() && diagnostics.is_empty() {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingRequiredEntry,
                "",
                "no model directories found",
            ));
        }

        tracing::debug!(
            "Validated {} {predictor_type} models in `{root}`",
            models.len()
        );

        Ok(ModelsDirReport {
            predictor_type,
            root: root.to_owned(),
            models,
            diagnostics,
        })
    }

    /// List `root` and validate it as a single model.
    pub fn validate_source(
        &self,
        source: &dyn ListingSource,
        predictor_type: PredictorType,
        root: &str,
    ) -> Result<ValidationReport, Error> {
        let pattern = self.registry.model_pattern(predictor_type)?;
        let tree = Self::list_source(source, root)?;
        Ok(check(predictor_type, pattern, root, &tree))
    }

    /// List `root` and validate it as a named model.
    pub fn validate_named_source(
        &self,
        source: &dyn ListingSource,
        predictor_type: PredictorType,
        name: &str,
        root: &str,
    ) -> Result<ModelReport, Error> {
        let pattern = self.registry.model_pattern(predictor_type)?;
        let tree = Self::list_source(source, root)?;
        let report = check(predictor_type, pattern, root, &tree);
        Ok(ModelReport {
            name: name.to_owned(),
            base_path: root.to_owned(),
            versions: model_versions(&tree),
            report,
        })
    }

    /// List `root` and validate it as a directory of models.
    pub fn validate_models_dir_source(
        &self,
        source: &dyn ListingSource,
        predictor_type: PredictorType,
        root: &str,
    ) -> Result<ModelsDirReport, Error> {
        // Fail on unknown types before doing any I/O.
        self.registry.dirs_model_pattern(predictor_type)?;
        let tree = Self::list_source(source, root)?;
        self.validate_models_dir_tree(predictor_type, root, &tree)
    }
}

fn check(
    predictor_type: PredictorType,
    pattern: &PatternNode,
    root: &str,
    tree: &PathTree,
) -> ValidationReport {
    let diagnostics = Matcher::new(pattern).check(tree);
    let report = ValidationReport::new(predictor_type, root, diagnostics);
    tracing::debug!(
        "Validated `{root}` against the {predictor_type} layout: {} diagnostics",
        report.diagnostics.len()
    );
    report
}
