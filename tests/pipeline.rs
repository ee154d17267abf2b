// AuditCrab - GPL-3.0-or-later
// End-to-end batch runs over synthetic and handwritten audit logs

use auditcrab::anomaly::{AnomalyLabel, Severity};
use auditcrab::config::AnalysisConfig;
use auditcrab::core::{critical_timeline, Analyzer, BatchSummary};
use auditcrab::parser::{parse_content, parse_file};
use auditcrab::synthetic;
use auditcrab::AnalysisError;
use chrono::NaiveDate;

fn synthetic_log(count: usize, seed: u64) -> String {
    let base = NaiveDate::from_ymd_opt(2025, 6, 2)
        .and_then(|d| d.and_hms_opt(10, 30, 0))
        .expect("valid timestamp");
    synthetic::generate(count, seed, base).join("\n")
}

#[test]
fn synthetic_batch_end_to_end() {
    let parsed = parse_content(&synthetic_log(500, 42));
    let analyzer = Analyzer::new(&AnalysisConfig::default()).expect("default config");
    let analysis = analyzer.analyze(&parsed.events).expect("analysis");

    // Nothing is dropped and order is kept
    assert_eq!(analysis.classified.len(), parsed.events.len());
    for (classified, event) in analysis.classified.iter().zip(&parsed.events) {
        assert_eq!(classified.event(), event);
    }

    // Alerts are exactly the Critical events, in order
    let critical: Vec<_> = analysis
        .classified
        .iter()
        .filter(|c| c.severity == Severity::Critical)
        .collect();
    assert_eq!(analysis.alerts.len(), critical.len());
    for (alert, c) in analysis.alerts.iter().zip(&critical) {
        assert_eq!(alert.source_ip, c.event().source_ip);
        assert_eq!(alert.timestamp, c.event().timestamp);
        assert_eq!(alert.message, c.event().message);
    }

    // Tiers follow the decision table
    for c in &analysis.classified {
        let expected = match (c.scored.anomaly_label, c.attack_signal) {
            (AnomalyLabel::Anomaly, true) => Severity::Critical,
            (AnomalyLabel::Normal, true) => Severity::Suspicious,
            (_, false) => Severity::Normal,
        };
        assert_eq!(c.severity, expected);
    }

    let summary = BatchSummary::from_classified(&analysis.classified);
    assert_eq!(summary.total, 500);
    assert_eq!(summary.critical, analysis.alerts.len());
    assert_eq!(critical_timeline(&analysis.classified).len(), summary.critical);
}

#[test]
fn repeated_runs_are_bit_identical() {
    let parsed = parse_content(&synthetic_log(300, 9));
    let analyzer = Analyzer::new(&AnalysisConfig::default()).expect("default config");

    let scores = || -> Vec<u64> {
        analyzer
            .analyze(&parsed.events)
            .expect("analysis")
            .classified
            .iter()
            .map(|c| c.scored.isolation_score.to_bits())
            .collect()
    };
    assert_eq!(scores(), scores());
}

#[test]
fn no_attack_signal_means_all_normal() {
    let content = "\
2025-06-02 09:00:00 | 10.0.0.1 | INFO | Access granted
2025-06-02 09:10:00 | 10.0.0.2 | INFO | Access granted
2025-06-02 09:20:00 | 10.0.0.3 | WARN | Access denied
2025-06-02 03:00:00 | 10.0.0.4 | ERROR | Authentication failure
2025-06-02 09:40:00 | 10.0.0.5 | INFO | Transaction completed
";
    let parsed = parse_content(content);
    let analysis = Analyzer::new(&AnalysisConfig {
        contamination: Some(0.2),
        ..AnalysisConfig::default()
    })
    .expect("valid config")
    .analyze(&parsed.events)
    .expect("analysis");

    // The 03:00 event is still isolated, it just has no corroborating signal
    assert!(analysis.classified[3].scored.anomaly_label == AnomalyLabel::Anomaly);
    assert!(analysis
        .classified
        .iter()
        .all(|c| c.severity == Severity::Normal));
    assert!(analysis.alerts.is_empty());
}

#[test]
fn config_file_drives_the_analysis() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("audit.log");
    let config_path = dir.path().join("config.json");
    std::fs::write(&log_path, synthetic_log(120, 5)).expect("write log");
    std::fs::write(
        &config_path,
        r#"{"contamination": 0.05, "num_trees": 20, "seed": 1, "attack_keywords": ["attack"]}"#,
    )
    .expect("write config");

    let config = AnalysisConfig::load_from(&config_path);
    let analyzer = Analyzer::new(&config).expect("valid config");
    assert!((analyzer.contamination().get() - 0.05).abs() < f64::EPSILON);

    let parsed = parse_file(&log_path).expect("readable log");
    let analysis = analyzer.analyze(&parsed.events).expect("analysis");
    assert_eq!(analysis.model.num_trees(), 20);

    let model_path = dir.path().join("model.json");
    analysis.model.save(&model_path).expect("save model");
    let reloaded = auditcrab::anomaly::IsolationEnsemble::load(&model_path).expect("load model");
    let rescored = analyzer
        .analyze_with_model(reloaded, &parsed.events)
        .expect("rescoring");
    assert_eq!(
        rescored.alerts.len(),
        analysis.alerts.len(),
        "same model, same batch, same alerts"
    );
}

#[test]
fn out_of_range_contamination_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, r#"{"contamination": 1.2}"#).expect("write config");

    let err = Analyzer::new(&AnalysisConfig::load_from(&config_path)).expect_err("rejected");
    assert!(matches!(
        err,
        AnalysisError::InvalidParameter {
            name: "contamination",
            ..
        }
    ));
}

#[test]
fn single_event_is_insufficient() {
    let parsed = parse_content("2025-06-02 09:00:00 | 10.0.0.1 | INFO | Access granted");
    let err = Analyzer::new(&AnalysisConfig::default())
        .expect("default config")
        .analyze(&parsed.events)
        .expect_err("one event");
    assert!(matches!(err, AnalysisError::InsufficientData { found: 1, .. }));
}

#[test]
fn hostname_sources_do_not_abort_the_batch() {
    let log = "\
2025-06-02 09:00:01 | 10.0.0.1 | INFO | Access granted
2025-06-02 09:00:02 | 10.0.0.2 | INFO | Transaction completed
2025-06-02 03:12:40 | core-gw-01 | ERROR | Intrusion attempt - Possible attack detected
2025-06-02 09:00:04 | - | WARN | Authentication failure
";
    let parsed = parse_content(log);
    assert_eq!(parsed.events.len(), 4);
    assert!(parsed.skipped.is_empty());

    let analyzer = Analyzer::new(&AnalysisConfig {
        contamination: Some(0.25),
        ..AnalysisConfig::default()
    })
    .expect("valid config");
    let analysis = analyzer.analyze(&parsed.events).expect("analysis");
    assert_eq!(analysis.classified.len(), 4);
    assert_eq!(analysis.classified[2].event().source_ip, "core-gw-01");
}

#[test]
fn version_includes_build_hash() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_auditcrab"))
        .arg("--version")
        .output()
        .expect("run auditcrab --version");
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    let line = text.trim();
    assert!(line.starts_with(&format!("auditcrab {} (", env!("CARGO_PKG_VERSION"))));
    assert!(line.ends_with(')'));
}
