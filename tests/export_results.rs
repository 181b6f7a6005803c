//! JSON export of evaluation and search results.
//!
//! Run the export with: cargo test --features serde --test export_results -- --ignored --nocapture

use motion_recognition::{
    evaluate, feature_names, DetectorConfig, DetectorParameters, EvaluationReport,
    LabeledRecording, ParameterSearch, SearchConfig, SearchOutcome, Signal, StepDetector,
};
use serde::Serialize;
use std::f64::consts::PI;
use std::fs::File;
use std::io::Write;

#[derive(Serialize)]
struct ExportData {
    feature_names: Vec<&'static str>,
    evaluation: EvaluationReport,
    search: SearchOutcome,
}

fn bump_recording(name: &str, step_hz: f64, actual_steps: Option<u32>) -> LabeledRecording {
    let fs = 50.0;
    let n = 500;
    let z = (0..n)
        .map(|i| 9.81 + 3.0 * (2.0 * PI * step_hz * i as f64 / fs).sin().max(0.0))
        .collect();
    let signal = Signal::new(vec![0.0; n], vec![0.0; n], z, fs).unwrap();
    LabeledRecording::new(name, signal, actual_steps)
}

fn recordings() -> Vec<LabeledRecording> {
    [(1.6, 16), (1.8, 18), (2.0, 20), (2.2, 22), (1.7, 17)]
        .iter()
        .enumerate()
        .map(|(i, &(hz, steps))| bump_recording(&format!("walk_{i:02}.csv"), hz, Some(steps)))
        .collect()
}

#[test]
fn test_file_result_json_keys() {
    let report = evaluate(
        &StepDetector::default(),
        &DetectorParameters::default(),
        &recordings()[..1],
    );
    let value = serde_json::to_value(&report).unwrap();
    let row = &value["results"][0];
    for key in [
        "file",
        "detected_steps",
        "actual_steps",
        "error",
        "absolute_error",
        "relative_error",
    ] {
        assert!(row.get(key).is_some(), "missing {key}");
    }
    assert_eq!(row["file"], "walk_00.csv");
    assert_eq!(value["summary"]["files_processed"], 1);
}

#[test]
fn test_parameters_survive_json() {
    let params = DetectorParameters::default()
        .with_threshold_multiplier(0.35)
        .with_min_step_distance(0.4);
    let json = serde_json::to_string(&params).unwrap();
    let back: DetectorParameters = serde_json::from_str(&json).unwrap();
    assert_eq!(back, params);

    let config = DetectorConfig::wearable();
    let back: DetectorConfig =
        serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(back, config);
}

#[test]
#[ignore]
fn export_results_to_json() {
    let sources = recordings();
    let search = ParameterSearch::new(
        DetectorConfig::default(),
        SearchConfig::default().with_trials(30),
    );
    let outcome = search.run(&sources).unwrap();
    let evaluation = evaluate(&StepDetector::default(), &outcome.best.parameters, &sources);

    let data = ExportData {
        feature_names: feature_names().to_vec(),
        evaluation,
        search: outcome,
    };

    let json = serde_json::to_string_pretty(&data).unwrap();
    let path = std::env::temp_dir().join("motion_recognition_results.json");
    let mut file = File::create(&path).unwrap();
    file.write_all(json.as_bytes()).unwrap();

    println!("{}", data.evaluation.summary);
    println!("Exported to {}", path.display());
}
