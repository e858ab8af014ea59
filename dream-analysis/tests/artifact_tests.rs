//! Integration tests for model artifact loading
//!
//! Covers the fatal startup paths (missing and corrupt bundles) and the
//! active-label metadata of the facet head.

mod helpers;

use dream_analysis::scorer::ModelArtifacts;
use dream_analysis::{AnalysisError, AnalysisPolicy, DreamAnalyzer, Facet};
use helpers::{write_artifacts, ArtifactSpec};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_valid_bundle() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path(), &ArtifactSpec::uniform(0.7, 0.2));

    let artifacts = ModelArtifacts::load(dir.path()).unwrap();
    let summary = artifacts.summary();

    assert_eq!(summary.facet_labels, Facet::ALL.to_vec());
    assert_eq!(summary.valence_dimension, 32);
    assert!(summary.shared_embedding);
    assert!(artifacts.into_scorer().is_ok());
}

#[test]
fn test_missing_valence_dir_is_fatal_and_names_path() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path(), &ArtifactSpec::uniform(0.7, 0.2));
    fs::remove_dir_all(dir.path().join("valence")).unwrap();

    let err = ModelArtifacts::load(dir.path()).unwrap_err();

    assert!(err.is_fatal());
    match err {
        AnalysisError::ModelUnavailable { path, .. } => assert!(path.ends_with("valence")),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_weights_file_is_unavailable() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path(), &ArtifactSpec::uniform(0.7, 0.2));
    fs::remove_file(dir.path().join("facets").join("weights.json")).unwrap();

    let err = ModelArtifacts::load(dir.path()).unwrap_err();
    assert!(matches!(err, AnalysisError::ModelUnavailable { .. }));
    assert!(err.to_string().contains("weights.json"));
}

#[test]
fn test_unparsable_config_is_corrupt() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path(), &ArtifactSpec::uniform(0.7, 0.2));
    fs::write(dir.path().join("valence").join("config.json"), "{ not json").unwrap();

    let err = ModelArtifacts::load(dir.path()).unwrap_err();
    assert!(matches!(err, AnalysisError::ArtifactCorrupt { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_weight_shape_mismatch_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let spec = ArtifactSpec::uniform(0.7, 0.2);
    write_artifacts(dir.path(), &spec);
    // Embedder now 16 wide, weights still expect 32 inputs
    fs::write(
        dir.path().join("facets").join("tokenizer.json"),
        r#"{"kind": "hashing", "dimension": 16}"#,
    )
    .unwrap();

    let err = ModelArtifacts::load(dir.path()).unwrap_err();
    match err {
        AnalysisError::ArtifactCorrupt { path, reason } => {
            assert!(path.ends_with("weights.json"));
            assert!(reason.contains("expected 16 inputs"), "{}", reason);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_valence_head_needs_two_labels() {
    let dir = TempDir::new().unwrap();
    write_artifacts(dir.path(), &ArtifactSpec::uniform(0.7, 0.2));
    fs::write(
        dir.path().join("valence").join("config.json"),
        r#"{"architecture": "mlp", "num_labels": 3}"#,
    )
    .unwrap();

    assert!(matches!(
        ModelArtifacts::load(dir.path()),
        Err(AnalysisError::ArtifactCorrupt { .. })
    ));
}

#[test]
fn test_active_label_subset() {
    let dir = TempDir::new().unwrap();
    let spec = ArtifactSpec::uniform(0.5, 0.2)
        .with_facets(vec![(Facet::Success, 0.8), (Facet::Aggression, 0.25)]);
    write_artifacts(dir.path(), &spec);

    let artifacts = ModelArtifacts::load(dir.path()).unwrap();
    assert_eq!(artifacts.facet_labels, vec![Facet::Success, Facet::Aggression]);

    let scorer = artifacts.into_scorer().unwrap();
    let raw = scorer.score("I walked through a quiet garden").unwrap();

    assert!((raw.facets.get(Facet::Success) - 0.8).abs() < 1e-5);
    assert!((raw.facets.get(Facet::Aggression) - 0.25).abs() < 1e-5);
    assert_eq!(raw.facets.get(Facet::Conflict), 0.0);
    assert_eq!(raw.facets.get(Facet::Misfortune), 0.0);
}

#[test]
fn test_unknown_or_duplicate_label_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let spec = ArtifactSpec::uniform(0.5, 0.2)
        .with_facets(vec![(Facet::Success, 0.8), (Facet::Aggression, 0.25)]);
    write_artifacts(dir.path(), &spec);
    let labels = dir.path().join("facets").join("labels.json");

    fs::write(&labels, r#"{"labels": ["success", "anger"]}"#).unwrap();
    assert!(matches!(
        ModelArtifacts::load(dir.path()),
        Err(AnalysisError::ArtifactCorrupt { .. })
    ));

    fs::write(&labels, r#"{"labels": ["success", "success"]}"#).unwrap();
    assert!(matches!(
        ModelArtifacts::load(dir.path()),
        Err(AnalysisError::ArtifactCorrupt { .. })
    ));
}

#[test]
fn test_label_count_must_match_head_width() {
    let dir = TempDir::new().unwrap();
    let spec = ArtifactSpec::uniform(0.5, 0.2)
        .with_facets(vec![(Facet::Success, 0.8), (Facet::Aggression, 0.25)]);
    write_artifacts(dir.path(), &spec);
    fs::write(
        dir.path().join("facets").join("labels.json"),
        r#"{"labels": ["success"]}"#,
    )
    .unwrap();

    assert!(matches!(
        ModelArtifacts::load(dir.path()),
        Err(AnalysisError::ArtifactCorrupt { .. })
    ));
}

#[test]
fn test_distinct_tokenizers_use_separate_embedders() {
    let dir = TempDir::new().unwrap();
    let spec = ArtifactSpec {
        facets_dimension: 48,
        ..ArtifactSpec::uniform(0.6, 0.4)
    };
    write_artifacts(dir.path(), &spec);

    let artifacts = ModelArtifacts::load(dir.path()).unwrap();
    assert!(!artifacts.summary().shared_embedding);

    let scorer = artifacts.into_scorer().unwrap();
    let raw = scorer.score("We sailed to an island").unwrap();
    assert!((raw.valence.positive - 0.6).abs() < 1e-5);
    assert!((raw.facets.get(Facet::Friendliness) - 0.4).abs() < 1e-5);
}

#[test]
fn test_analyzer_from_missing_folder_fails() {
    let dir = TempDir::new().unwrap();

    let result = DreamAnalyzer::from_artifacts(&dir.path().join("nope"), AnalysisPolicy::default());

    assert!(matches!(result, Err(AnalysisError::ModelUnavailable { .. })));
}
