use modelshape_validator::{DiagnosticKind, ModelsDirReport, PredictorType, Validator};
use tests::mock_listing::MockListing;

fn validate_dir(
    predictor_type: PredictorType,
    root: &str,
    keys: &[&str],
) -> anyhow::Result<ModelsDirReport> {
    tests::init_logging();
    let source = MockListing::new(keys.iter().copied());
    let report = Validator::new()?.validate_models_dir_source(&source, predictor_type, root)?;
    assert_eq!(source.requests(), [root]);
    Ok(report)
}

#[test]
fn test_models_dir() -> anyhow::Result<()> {
    let report = validate_dir(
        PredictorType::TensorFlow,
        "bucket/models",
        &[
            "bucket/models/iris/1/saved_model.pb",
            "bucket/models/iris/1/variables/variables.index",
            "bucket/models/iris/3/saved_model.pb",
            "bucket/models/iris/3/variables/variables.index",
            "bucket/models/mnist/1/variables/variables.index",
        ],
    )?;
    assert!(!report.matched());
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.models.len(), 2);

    let iris = report.get("iris").expect("iris");
    assert!(iris.matched(), "{}", iris.report);
    assert_eq!(iris.base_path, "bucket/models/iris");
    assert_eq!(iris.versions, [1, 3]);

    let mnist = report.get("mnist").expect("mnist");
    assert!(!mnist.matched());
    assert_eq!(mnist.report.diagnostics.len(), 1);
    assert_eq!(
        mnist.report.diagnostics[0].kind,
        DiagnosticKind::MissingRequiredEntry
    );
    assert_eq!(mnist.report.diagnostics[0].path, "mnist/1/saved_model.pb");

    let tree = report.models_tree();
    assert_eq!(tree.names().collect::<Vec<_>>(), ["iris"]);
    assert_eq!(tree.get("iris").map(|m| m.base_path.as_str()), Some("bucket/models/iris"));

    Ok(())
}

#[test]
fn test_models_dir_each_model_alone() -> anyhow::Result<()> {
    // Two models would conflict under `<unique>` if validated together.
    let report = validate_dir(
        PredictorType::Onnx,
        "",
        &["iris/model.onnx", "mnist/1/model.onnx", "mnist/2/model.onnx"],
    )?;
    assert!(report.matched(), "{report:?}");
    assert_eq!(report.get("iris").map(|m| m.versions.len()), Some(0));
    assert_eq!(
        report.get("mnist").map(|m| m.versions.as_slice()),
        Some(&[1, 2][..])
    );
    assert_eq!(report.models_tree().len(), 2);
    Ok(())
}

#[test]
fn test_models_dir_loose_files() -> anyhow::Result<()> {
    let report = validate_dir(
        PredictorType::Python,
        "models",
        &["models/README.md", "models/iris/1/model.pkl"],
    )?;
    assert!(!report.matched());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::UnexpectedEntry);
    assert_eq!(report.diagnostics[0].path, "README.md");
    assert!(report.get("iris").is_some_and(|m| m.matched()));
    Ok(())
}

#[test]
fn test_models_dir_empty() -> anyhow::Result<()> {
    let report = validate_dir(PredictorType::Python, "models", &["other/iris/1/model.pkl"])?;
    assert!(!report.matched());
    assert!(report.models.is_empty());
    assert_eq!(
        report.diagnostics[0].kind,
        DiagnosticKind::MissingRequiredEntry
    );
    assert!(report.models_tree().is_empty());
    Ok(())
}

#[test]
fn test_named_models() -> anyhow::Result<()> {
    tests::init_logging();
    let validator = Validator::new()?;
    let keys = [
        "s3://bucket/iris/1/model.onnx",
        "s3://bucket/legacy/iris.onnx",
        "s3://bucket/legacy/iris-v0.onnx",
    ];

    let iris = validator.validate_named_model(
        PredictorType::Onnx,
        "iris",
        "s3://bucket/iris",
        keys,
    )?;
    assert!(iris.matched(), "{}", iris.report);
    assert_eq!(iris.versions, [1]);

    let legacy = validator.validate_named_model(
        PredictorType::Onnx,
        "legacy",
        "s3://bucket/legacy",
        keys,
    )?;
    assert!(!legacy.matched());
    assert!(legacy.report.has(DiagnosticKind::ConflictingAlternatives));

    Ok(())
}
