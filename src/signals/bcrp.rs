//! BCRPData series exports (Banco Central de Reserva del Perú).
//!
//! The statistics API's `csv` format returns rows joined with `<br>` tags
//! rather than newlines; both shapes are accepted here.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

use crate::config::SiteConfig;
use crate::math::stats::pstdev;
use crate::signals::{SignalSet, SignalSource, names};

/// IPC Alimentos y Bebidas (var% 12 meses), monthly.
pub const FOOD_SERIES: &str = "PN09822PM";
/// Inflación No Subyacente - Transportes (var%), monthly.
pub const TRANSPORT_SERIES: &str = "PN01310PM";
/// TC Interbancario (S/ por US$) - Venta, daily.
pub const FX_SERIES: &str = "PD04638PD";

const FX_WINDOW: usize = 30;
const FX_BASELINE: usize = 180;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub period: String,
    pub value: f64,
}

// Entities seen in BCRP period labels and series titles.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("aacute", 'á'),
    ("eacute", 'é'),
    ("iacute", 'í'),
    ("oacute", 'ó'),
    ("uacute", 'ú'),
    ("Aacute", 'Á'),
    ("Eacute", 'É'),
    ("Iacute", 'Í'),
    ("Oacute", 'Ó'),
    ("Uacute", 'Ú'),
    ("ntilde", 'ñ'),
    ("Ntilde", 'Ñ'),
    ("uuml", 'ü'),
    ("Uuml", 'Ü'),
    ("ordf", 'ª'),
    ("ordm", 'º'),
    ("deg", '°'),
];

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    NAMED_ENTITIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
}

/// Decodes HTML character references in one pass. Unknown references are
/// kept verbatim.
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi > 1 && semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn normalize_csv_text(raw: &str) -> String {
    let text = raw
        .trim()
        .replace("<br />", "\n")
        .replace("<br/>", "\n")
        .replace("<br>", "\n");
    unescape_html(&text).trim().to_string()
}

pub fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let low = s.to_lowercase();
    if matches!(low.as_str(), "n.d." | "nd" | "nan" | "n/a" | "na") {
        return None;
    }
    let mut cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned = cleaned.replace(',', ".");
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a series export into chronological points, skipping the header and
/// rows without a usable value. The first row of a repeated period wins.
pub fn parse_series_csv(raw: &str) -> Result<Vec<SeriesPoint>> {
    let text = normalize_csv_text(raw);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Ok(Vec::new());
    }
    let first = lines[0];
    let delimiter = if first.contains(';') && !first.contains(',') {
        b';'
    } else {
        b','
    };
    let body = lines.join("\n");
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut points = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for record in rdr.records() {
        let record = record.context("malformed BCRP CSV row")?;
        if record.len() < 2 {
            continue;
        }
        let period = record[0].trim().trim_matches('"').to_string();
        let Some(value) = parse_float(record[1].trim().trim_matches('"')) else {
            continue;
        };
        if period.is_empty() || !seen.insert(period.clone()) {
            continue;
        }
        points.push(SeriesPoint { period, value });
    }
    Ok(points)
}

/// 30-point and 180-point population std-dev of the most recent levels.
/// Needs at least 15 points.
pub fn fx_volatility(values: &[f64]) -> Option<(f64, f64)> {
    let start = values.len().saturating_sub(FX_BASELINE);
    let baseline = &values[start..];
    if baseline.len() < (FX_WINDOW / 2).max(10) {
        return None;
    }
    let vol_baseline = pstdev(baseline);
    let vol_window = if baseline.len() >= FX_WINDOW {
        pstdev(&baseline[baseline.len() - FX_WINDOW..])
    } else {
        vol_baseline
    };
    Some((vol_window, vol_baseline))
}

/// Directory of `<series_code>.csv` exports.
#[derive(Debug, Clone)]
pub struct BcrpSeriesDir {
    dir: PathBuf,
}

impl BcrpSeriesDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load(&self, code: &str) -> Result<Option<Vec<SeriesPoint>>> {
        let path = self.dir.join(format!("{}.csv", code));
        if !path.exists() {
            warn!(series = code, path = %path.display(), "BCRP series export missing");
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let points =
            parse_series_csv(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
        if points.is_empty() {
            warn!(series = code, "BCRP series export has no values");
            return Ok(None);
        }
        Ok(Some(points))
    }
}

impl SignalSource for BcrpSeriesDir {
    fn name(&self) -> &'static str {
        "bcrp_series"
    }

    fn fetch_signals(&self, _config: &SiteConfig) -> Result<SignalSet> {
        let mut set = SignalSet::new();
        if let Some(last) = self.load(FOOD_SERIES)?.and_then(|p| p.last().cloned()) {
            set.insert(names::FOOD_INFLATION_YOY, last.value);
        }
        if let Some(last) = self.load(TRANSPORT_SERIES)?.and_then(|p| p.last().cloned()) {
            set.insert(names::TRANSPORT_INFLATION, last.value);
        }
        if let Some(points) = self.load(FX_SERIES)? {
            let values: Vec<f64> = points.iter().map(|p| p.value).collect();
            match fx_volatility(&values) {
                Some((vol30, vol180)) => {
                    set.insert(names::FX_VOL_30D, vol30);
                    set.insert(names::FX_VOL_180D, vol180);
                }
                None => warn!(points = values.len(), "FX series too short for volatility"),
            }
        }
        Ok(set)
    }
}
