use modelshape_validator::{DiagnosticKind, PredictorType, ValidationReport, Validator};

fn validate(predictor_type: PredictorType, paths: &[&str]) -> anyhow::Result<ValidationReport> {
    tests::init_logging();
    Ok(Validator::new()?.validate_model(predictor_type, "", paths)?)
}

fn kinds(report: &ValidationReport) -> Vec<DiagnosticKind> {
    report.diagnostics.iter().map(|d| d.kind).collect()
}

#[test]
fn test_python() -> anyhow::Result<()> {
    let report = validate(PredictorType::Python, &["1/model.pkl"])?;
    assert!(report.matched, "{report}");
    assert!(report.diagnostics.is_empty());

    let report = validate(
        PredictorType::Python,
        &["1/model.pkl", "1/requirements.txt", "2/nested/weights.bin"],
    )?;
    assert!(report.matched, "{report}");

    let report = validate(PredictorType::Python, &["abc/model.pkl"])?;
    assert!(!report.matched);
    assert_eq!(
        kinds(&report),
        [
            DiagnosticKind::UnexpectedEntry,
            DiagnosticKind::MissingRequiredEntry
        ]
    );
    assert_eq!(report.diagnostics[0].path, "abc");
    assert!(report.diagnostics[0].message.contains("abc"));

    Ok(())
}

#[test]
fn test_python_version_contents() -> anyhow::Result<()> {
    // A version directory with nothing in it.
    let report = validate(PredictorType::Python, &["1/"])?;
    assert_eq!(kinds(&report), [DiagnosticKind::MissingRequiredEntry]);
    assert_eq!(report.diagnostics[0].path, "1");

    // A version that is a file.
    let report = validate(PredictorType::Python, &["1"])?;
    assert_eq!(kinds(&report), [DiagnosticKind::UnexpectedEntry]);
    assert!(report.diagnostics[0].message.contains("expected a directory"));

    // Nothing at all.
    let report = validate(PredictorType::Python, &[])?;
    assert_eq!(kinds(&report), [DiagnosticKind::MissingRequiredEntry]);
    assert_eq!(report.diagnostics[0].message, "`.` has no entry matching `<integer>`");

    Ok(())
}

#[test]
fn test_tensorflow() -> anyhow::Result<()> {
    let complete = [
        "1/saved_model.pb",
        "1/variables/variables.index",
        "1/variables/variables.data-00000-of-00001",
    ];
    let report = validate(PredictorType::TensorFlow, &complete)?;
    assert!(report.matched, "{report}");

    // Extra assets next to the graph are allowed.
    let report = validate(
        PredictorType::TensorFlow,
        &[
            "1/saved_model.pb",
            "1/assets/vocab.txt",
            "1/variables/variables.index",
            "2/saved_model.pb",
            "2/variables/variables.data-00000-of-00002",
            "2/variables/variables.data-00001-of-00002",
        ],
    )?;
    assert!(report.matched, "{report}");

    let report = validate(PredictorType::TensorFlow, &complete[1..])?;
    assert!(!report.matched);
    assert_eq!(kinds(&report), [DiagnosticKind::MissingRequiredEntry]);
    assert_eq!(report.diagnostics[0].path, "1/saved_model.pb");
    assert!(report.diagnostics[0].message.contains("saved_model.pb"));

    Ok(())
}

#[test]
fn test_tensorflow_variables() -> anyhow::Result<()> {
    let report = validate(
        PredictorType::TensorFlow,
        &["1/saved_model.pb", "1/variables/"],
    )?;
    assert_eq!(kinds(&report), [DiagnosticKind::MissingRequiredEntry]);
    assert_eq!(report.diagnostics[0].path, "1/variables");

    let report = validate(PredictorType::TensorFlow, &["1/saved_model.pb", "1/variables"])?;
    assert_eq!(kinds(&report), [DiagnosticKind::UnexpectedEntry]);
    assert_eq!(report.diagnostics[0].path, "1/variables");

    let report = validate(PredictorType::TensorFlow, &["1/saved_model.pb"])?;
    assert_eq!(kinds(&report), [DiagnosticKind::MissingRequiredEntry]);
    assert_eq!(report.diagnostics[0].path, "1/variables");

    Ok(())
}

#[test]
fn test_onnx() -> anyhow::Result<()> {
    let report = validate(PredictorType::Onnx, &["1/model.onnx", "2/model.onnx"])?;
    assert!(report.matched, "{report}");

    let report = validate(PredictorType::Onnx, &["model.onnx"])?;
    assert!(report.matched, "{report}");

    let report = validate(PredictorType::Onnx, &["1/model.onnx", "1/x.onnx"])?;
    assert!(!report.matched);
    assert_eq!(kinds(&report), [DiagnosticKind::ConflictingAlternatives]);
    assert_eq!(report.diagnostics[0].path, "1");

    let report = validate(PredictorType::Onnx, &["model.onnx", "1/model.onnx"])?;
    assert!(!report.matched);
    assert!(report.has(DiagnosticKind::ConflictingAlternatives));
    assert!(!report.has(DiagnosticKind::MissingRequiredEntry));

    let report = validate(PredictorType::Onnx, &["1/model.pkl"])?;
    assert_eq!(
        kinds(&report),
        [
            DiagnosticKind::UnexpectedEntry,
            DiagnosticKind::MissingRequiredEntry
        ]
    );
    assert_eq!(report.diagnostics[0].path, "1/model.pkl");

    Ok(())
}

#[test]
fn test_listing_root() -> anyhow::Result<()> {
    tests::init_logging();
    let validator = Validator::new()?;
    let report = validator.validate_model(
        PredictorType::Python,
        "s3://bucket/models/iris",
        [
            "s3://bucket/models/iris/",
            "s3://bucket/models/iris/1/model.pkl",
            // Returned by the prefix listing, but not part of the model.
            "s3://bucket/models/iris-v2/abc/model.pkl",
        ],
    )?;
    assert!(report.matched, "{report}");
    assert_eq!(report.root, "s3://bucket/models/iris");
    assert_eq!(
        report.to_string(),
        "`s3://bucket/models/iris` matches the python model layout"
    );
    Ok(())
}

#[test]
fn test_report_json() -> anyhow::Result<()> {
    let report = validate(PredictorType::TensorFlow, &["1/variables/variables.index"])?;
    let json = serde_json::to_value(&report)?;
    assert_eq!(json["matched"], false);
    assert_eq!(json["predictor_type"], "tensorflow");
    assert_eq!(json["diagnostics"][0]["kind"], "missing_required_entry");
    assert_eq!(json["diagnostics"][0]["path"], "1/saved_model.pb");
    Ok(())
}
