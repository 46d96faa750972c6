use std::fs;

use riskcards::config::load_builtin;
use riskcards::signals::bcrp::{
    FOOD_SERIES, FX_SERIES, TRANSPORT_SERIES, fx_volatility, parse_float, parse_series_csv,
    unescape_html,
};
use riskcards::signals::{BcrpSeriesDir, SignalSource, names};
use tempfile::TempDir;

#[test]
fn parse_float_handles_bcrp_quirks() {
    assert_eq!(parse_float("2,5"), Some(2.5));
    assert_eq!(parse_float(" 3.75 "), Some(3.75));
    assert_eq!(parse_float("n.d."), None);
    assert_eq!(parse_float(""), None);
}

#[test]
fn br_separated_export_is_parsed() {
    let raw = r#""Mes/Año","IPC Alimentos"<br>"Ene.2025","2,5"<br>"Feb.2025","n.d."<br>"Mar.2025","3.1"<br>"#;
    let points = parse_series_csv(raw).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].period, "Ene.2025");
    assert_eq!(points[0].value, 2.5);
    assert_eq!(points[1].value, 3.1);
}

#[test]
fn repeated_period_keeps_first_row() {
    let raw = "Periodo,Valor\nEne.2025,2.5\nFeb.2025,3.0\nFeb.2025,9.0\n";
    let points = parse_series_csv(raw).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].period, "Feb.2025");
    assert_eq!(points[1].value, 3.0);
}

#[test]
fn html_entities_are_decoded() {
    let raw = r#""Mes/A&ntilde;o","Tipo de cambio"<br>"Set&#46;2025","3,52"<br>"Oct.2025","3,48"<br>"#;
    let points = parse_series_csv(raw).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].period, "Set.2025");
    assert_eq!(points[0].value, 3.52);

    assert_eq!(unescape_html("Inflaci&oacute;n &amp; m&aacute;s"), "Inflación & más");
    assert_eq!(unescape_html("A&#xF1;o"), "Año");
    assert_eq!(unescape_html("R&D &bogus; 5 & 6"), "R&D &bogus; 5 & 6");
}

#[test]
fn semicolon_export_is_parsed() {
    let raw = "Periodo;Valor\nEne.2025;2,5\nFeb.2025;3,0\n";
    let points = parse_series_csv(raw).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].value, 3.0);
}

#[test]
fn fx_volatility_needs_history() {
    let short: Vec<f64> = (0..10).map(|i| 3.7 + i as f64 * 0.001).collect();
    assert!(fx_volatility(&short).is_none());

    let long: Vec<f64> = (0..60).map(|i| 3.7 + (i % 5) as f64 * 0.01).collect();
    let (vol30, vol180) = fx_volatility(&long).unwrap();
    assert!(vol30 > 0.0);
    assert!(vol180 > 0.0);
}

fn write_series(dir: &std::path::Path, code: &str, rows: &[(String, f64)]) {
    let mut body = String::from("\"Periodo\",\"Valor\"\n");
    for (period, value) in rows {
        body.push_str(&format!("\"{}\",\"{}\"\n", period, value));
    }
    fs::write(dir.join(format!("{}.csv", code)), body).unwrap();
}

#[test]
fn series_dir_skips_missing_exports() {
    let tmp = TempDir::new().unwrap();
    write_series(
        tmp.path(),
        FOOD_SERIES,
        &[("Ene.2025".to_string(), 2.1), ("Feb.2025".to_string(), 4.4)],
    );
    write_series(tmp.path(), TRANSPORT_SERIES, &[("Feb.2025".to_string(), 1.8)]);

    let cfg = load_builtin().unwrap();
    let set = BcrpSeriesDir::new(tmp.path()).fetch_signals(&cfg).unwrap();
    assert_eq!(set.require(names::FOOD_INFLATION_YOY).unwrap(), 4.4);
    assert_eq!(set.require(names::TRANSPORT_INFLATION).unwrap(), 1.8);
    assert!(!set.contains(names::FX_VOL_30D));

    let fx: Vec<(String, f64)> = (0..40)
        .map(|i| (format!("d{:03}", i), 3.70 + (i % 4) as f64 * 0.02))
        .collect();
    write_series(tmp.path(), FX_SERIES, &fx);
    let set = BcrpSeriesDir::new(tmp.path()).fetch_signals(&cfg).unwrap();
    assert!(set.contains(names::FX_VOL_30D));
    assert!(set.contains(names::FX_VOL_180D));
}
