use bfmcore::envelope::{RangeStatus, Severity};
use bfmcore::{AnalysisConfig, AnalysisPipeline};
use std::io::Write;
use tempfile::NamedTempFile;

const KT: f64 = 1.0 / 1.94384;

/// Two aircraft at 1 Hz: a MiG holding a 14 deg/s turn for the whole
/// recording and an F-5 flying straight that disappears after 20 s.
fn recording_text() -> String {
    let mut text = String::from("\u{feff}FileType=text/acmi/tacview\nFileVersion=2.2\n");
    text.push_str("0,ReferenceTime=2024-05-01T10:00:00Z\n");
    text.push_str("// exported for regression\n");

    let v = 400.0 * KT;
    let omega = 14.0_f64.to_radians();
    let chord = 2.0 * v / omega * (0.5 * omega).sin();
    let (mut x, mut y, mut psi) = (0.0_f64, 0.0_f64, 0.0_f64);

    for t in 0..40 {
        text.push_str(&format!("#{}\n", t));
        if t == 0 {
            text.push_str(&format!(
                "101,T=41.1|42.2|3000|{:.3}|{:.3},Name=MiG-17F,Type=Air+FixedWing,Coalition=Enemies\n",
                x, y
            ));
            text.push_str("102,T=41.0|42.0|4000|0|5000,Name=F-5E,Group=Blue 1\n");
        } else {
            // Altitude is omitted and carried forward after the first record.
            text.push_str(&format!("101,T=|||{:.3}|{:.3}\n", x, y));
            if t < 20 {
                text.push_str(&format!("102,T=|||{:.3}|\n", 200.0 * t as f64));
            }
        }
        let next = psi + omega;
        let mid = 0.5 * (psi + next);
        x += chord * mid.cos();
        y += chord * mid.sin();
        psi = next;
    }
    text.push_str("-102\n");
    text
}

fn write_plain() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(recording_text().as_bytes()).unwrap();
    file
}

#[test]
fn plain_recording_analyzes_every_object() {
    let file = write_plain();
    let pipeline = AnalysisPipeline::new(AnalysisConfig::default());
    let results = pipeline.analyze_path(file.path()).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].object_id, "101");
    assert_eq!(results[1].object_id, "102");

    let mig = &results[0];
    assert_eq!(mig.samples_raw, 40);
    assert!(!mig.truncated);
    assert_eq!(mig.metadata.get("Coalition").map(String::as_str), Some("Enemies"));
    assert!((mig.summary.max_inst_turn_rate - 14.0).abs() < 0.05);
    assert_eq!(mig.status.sustained, RangeStatus::Within);
    assert!(!mig.segments.is_empty());
    assert!(mig.segments.iter().all(|s| s.duration >= 1.5));
    assert_eq!(mig.severity.severity, Severity::Ok);

    let f5 = &results[1];
    assert_eq!(f5.group.as_deref(), Some("Blue 1"));
    assert!(f5.truncated);
    assert!(f5.samples_used < f5.samples_raw);
    assert!(f5.summary.best_sustained.is_none());
    assert_eq!(f5.status.sustained, RangeStatus::NotAvailable);

    let metrics = pipeline.metrics();
    assert_eq!(metrics.analyzed, 2);
    assert_eq!(metrics.truncated, 1);
}

#[test]
fn zipped_recording_matches_plain_text() {
    let plain = write_plain();
    let mut zipped = NamedTempFile::new().unwrap();
    {
        let mut writer = zip::ZipWriter::new(zipped.as_file_mut());
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        writer.start_file("flight.txt.acmi", options).unwrap();
        writer.write_all(recording_text().as_bytes()).unwrap();
        writer.finish().unwrap();
    }

    let config = AnalysisConfig {
        object_filter: Some("mig".into()),
        ..Default::default()
    };
    let pipeline = AnalysisPipeline::new(config);
    let from_zip = pipeline.analyze_path(zipped.path()).unwrap();
    let from_text = pipeline.analyze_path(plain.path()).unwrap();
    assert_eq!(from_zip.len(), 1);
    assert_eq!(from_zip, from_text);
}

#[test]
fn results_serialize_with_status_labels() {
    let file = write_plain();
    let results = AnalysisPipeline::new(AnalysisConfig::default())
        .analyze_path(file.path())
        .unwrap();
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[0]["name"], "MiG-17F");
    assert_eq!(json[0]["status"]["sustained"], "WITHIN");
    assert_eq!(json[1]["status"]["sustained"], "N/A");
    assert_eq!(json[1]["truncation"]["method"], "early_end_trim");
    assert!(json[0]["max_g"].as_f64().unwrap() > 0.0);
}
