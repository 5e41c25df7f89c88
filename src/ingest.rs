//! CSV ingest and export for the channel table.
//!
//! Rows are deserialized as raw strings first and normalized into typed
//! [`ChannelRecord`]s. A row that cannot be normalized is rejected and recorded
//! in the [`LoadReport`]; the rest of the load continues.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::countries;
use crate::error::{IngestError, LoadError};
use crate::metrics;
use crate::models::ChannelRecord;

pub const DEFAULT_DATA_FILE: &str = "cleaned_youtube_data_3.csv";

/// 2^64; counts at or above it do not fit in a `u64`.
const COUNT_LIMIT: f64 = 18_446_744_073_709_551_616.0;

pub const REQUIRED_COLUMNS: [&str; 10] = [
    "channel_name",
    "view_count",
    "category",
    "country",
    "subscriber_count",
    "created_date",
    "video_count",
    "videos_last_30_days",
    "views_last_30_days",
    "channel_age_years",
];

const MAX_LISTED_UNMAPPED: usize = 5;
const DAYS_PER_YEAR: f64 = 365.25;

/// One input row as read from disk, before any validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub subscriber_count: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub video_count: Option<String>,
    #[serde(default)]
    pub videos_last_30_days: Option<String>,
    #[serde(default)]
    pub views_last_30_days: Option<String>,
    #[serde(default)]
    pub channel_age_years: Option<String>,
    #[serde(default)]
    pub video_count_log1p: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub loaded: usize,
    #[serde(serialize_with = "serialize_errors")]
    pub rejected: Vec<IngestError>,
    /// Distinct unmapped country codes in first-seen order, at most five.
    pub unmapped_countries: Vec<String>,
    pub unmapped_total: usize,
}

fn serialize_errors<S: serde::Serializer>(
    errors: &[IngestError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

/// The loaded table plus what happened while loading it.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<ChannelRecord>,
    pub report: LoadReport,
}

/// Loads the default data file. A missing file is the "no data" state.
pub fn load_default(path: &Path, as_of: NaiveDate) -> Result<Option<Dataset>, LoadError> {
    if !path.exists() {
        info!(path = %path.display(), "default data file not found");
        return Ok(None);
    }
    read_path(path, as_of).map(Some)
}

pub fn read_path(path: &Path, as_of: NaiveDate) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_from(file, &path.display().to_string(), as_of)
}

pub fn read_from<R: Read>(reader: R, source: &str, as_of: NaiveDate) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let mut rows = Vec::new();
    let mut malformed = Vec::new();
    for (index, result) in reader.deserialize::<RawRow>().enumerate() {
        match result {
            Ok(row) => rows.push((index + 1, row)),
            Err(err) if err.is_io_error() => return Err(LoadError::Csv(err)),
            Err(err) => malformed.push(IngestError::Malformed {
                row: index + 1,
                message: err.to_string(),
            }),
        }
    }

    let (records, mut report) = normalize_numbered(rows, as_of);
    report.source = source.to_string();
    report.rejected.extend(malformed);
    report.rejected.sort_by_key(row_of);

    if records.is_empty() && !report.rejected.is_empty() {
        return Err(LoadError::NoUsableRows {
            rejected: report.rejected.len(),
        });
    }

    log_report(&report);
    Ok(Dataset { records, report })
}

/// Normalizes raw rows, numbering them from 1 in input order.
pub fn normalize(rows: Vec<RawRow>, as_of: NaiveDate) -> (Vec<ChannelRecord>, LoadReport) {
    normalize_numbered(
        rows.into_iter().enumerate().map(|(i, row)| (i + 1, row)),
        as_of,
    )
}

fn normalize_numbered(
    rows: impl IntoIterator<Item = (usize, RawRow)>,
    as_of: NaiveDate,
) -> (Vec<ChannelRecord>, LoadReport) {
    let mut records = Vec::new();
    let mut report = LoadReport::default();
    let mut unmapped: Vec<String> = Vec::new();

    for (row_number, row) in rows {
        match normalize_row(&row, row_number, as_of) {
            Ok(record) => {
                if countries::display_name(&record.country).is_none()
                    && !unmapped.contains(&record.country)
                {
                    unmapped.push(record.country.clone());
                }
                records.push(record);
            }
            Err(err) => report.rejected.push(err),
        }
    }

    report.loaded = records.len();
    report.unmapped_total = unmapped.len();
    unmapped.truncate(MAX_LISTED_UNMAPPED);
    report.unmapped_countries = unmapped;
    (records, report)
}

pub fn normalize_row(
    row: &RawRow,
    row_number: usize,
    as_of: NaiveDate,
) -> Result<ChannelRecord, IngestError> {
    let channel_name = required_text(row_number, "channel_name", &row.channel_name)?;
    let category = required_text(row_number, "category", &row.category)?;

    let country = non_empty(&row.country)
        .unwrap_or(countries::UNKNOWN)
        .to_string();
    let country_name = countries::display_name(&country)
        .map(str::to_string)
        .unwrap_or_else(|| country.clone());

    let raw_date = required_text(row_number, "created_date", &row.created_date)?;
    let created_date = parse_date(&raw_date).ok_or(IngestError::InvalidDate {
        row: row_number,
        value: raw_date,
    })?;

    let subscriber_count = parse_count(row_number, "subscriber_count", &row.subscriber_count)?;
    let view_count = parse_count(row_number, "view_count", &row.view_count)?;
    let video_count = parse_count(row_number, "video_count", &row.video_count)?;
    let views_last_30_days =
        parse_clipped(row_number, "views_last_30_days", &row.views_last_30_days)?;
    let videos_last_30_days =
        coerce_clipped(row_number, "videos_last_30_days", &row.videos_last_30_days)?;

    let channel_age_years = match non_empty(&row.channel_age_years) {
        Some(value) => parse_non_negative(row_number, "channel_age_years", value)?,
        None => age_in_years(created_date, as_of),
    };

    let video_count_log1p = match non_empty(&row.video_count_log1p) {
        Some(value) => parse_non_negative(row_number, "video_count_log1p", value)?,
        None => (video_count as f64).ln_1p(),
    };

    Ok(ChannelRecord {
        channel_name,
        category,
        country,
        country_name,
        subscriber_count,
        view_count,
        video_count,
        views_last_30_days,
        videos_last_30_days,
        created_date,
        channel_age_years,
        video_count_log1p,
    })
}

fn log_report(report: &LoadReport) {
    info!(
        source = %report.source,
        loaded = report.loaded,
        rejected = report.rejected.len(),
        "loaded channel table"
    );
    if let Some(first) = report.rejected.first() {
        warn!(
            rejected = report.rejected.len(),
            first = %first,
            "rows rejected during ingest"
        );
    }
    if report.unmapped_total > 0 {
        warn!(
            "{} country code(s) not in mapping: {}",
            report.unmapped_total,
            report.unmapped_countries.join(", ")
        );
    }
}

fn row_of(err: &IngestError) -> usize {
    match err {
        IngestError::MissingField { row, .. }
        | IngestError::InvalidDate { row, .. }
        | IngestError::InvalidNumber { row, .. }
        | IngestError::Malformed { row, .. } => *row,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required_text(
    row: usize,
    column: &'static str,
    value: &Option<String>,
) -> Result<String, IngestError> {
    non_empty(value)
        .map(str::to_string)
        .ok_or(IngestError::MissingField { row, column })
}

fn parse_count(
    row: usize,
    column: &'static str,
    value: &Option<String>,
) -> Result<u64, IngestError> {
    let raw = non_empty(value).ok_or(IngestError::MissingField { row, column })?;
    if let Ok(count) = raw.parse::<u64>() {
        return Ok(count);
    }
    // Dataframe exports often write integers as `1200.0`.
    match raw.parse::<f64>() {
        Ok(v) if v >= 0.0 && v < COUNT_LIMIT && v.fract() == 0.0 => Ok(v as u64),
        _ => Err(IngestError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        }),
    }
}

fn parse_non_negative(row: usize, column: &'static str, raw: &str) -> Result<f64, IngestError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(IngestError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        }),
    }
}

/// NaN and negative inputs become 0, fractions are truncated. Anything else
/// that is not a number rejects the row.
fn parse_clipped(
    row: usize,
    column: &'static str,
    value: &Option<String>,
) -> Result<u64, IngestError> {
    let raw = non_empty(value).ok_or(IngestError::MissingField { row, column })?;
    let parsed = raw.parse::<f64>().map_err(|_| IngestError::InvalidNumber {
        row,
        column,
        value: raw.to_string(),
    })?;
    clip(row, column, raw, parsed)
}

/// Like [`parse_clipped`], but missing and non-numeric inputs also become 0.
fn coerce_clipped(
    row: usize,
    column: &'static str,
    value: &Option<String>,
) -> Result<u64, IngestError> {
    match non_empty(value).map(|raw| (raw, raw.parse::<f64>())) {
        Some((raw, Ok(parsed))) => clip(row, column, raw, parsed),
        _ => Ok(0),
    }
}

fn clip(row: usize, column: &'static str, raw: &str, value: f64) -> Result<u64, IngestError> {
    if value.is_nan() || value <= 0.0 {
        Ok(0)
    } else if value < COUNT_LIMIT {
        Ok(value as u64)
    } else {
        Err(IngestError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|stamp| stamp.date())
}

fn age_in_years(created: NaiveDate, as_of: NaiveDate) -> f64 {
    let days = (as_of - created).num_days().max(0);
    days as f64 / DAYS_PER_YEAR
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    channel_name: &'a str,
    view_count: u64,
    category: &'a str,
    country: &'a str,
    subscriber_count: u64,
    created_date: String,
    video_count: u64,
    videos_last_30_days: u64,
    views_last_30_days: u64,
    channel_age_years: f64,
    video_count_log1p: f64,
    country_name: &'a str,
    subscriber_tier: &'static str,
    cost_effectiveness: f64,
}

/// Writes records as UTF-8 CSV with a header row. Numbers are written
/// unformatted so the output re-ingests to the same values.
pub fn write_csv<W: Write>(records: &[ChannelRecord], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(ExportRow {
            channel_name: &record.channel_name,
            view_count: record.view_count,
            category: &record.category,
            country: &record.country,
            subscriber_count: record.subscriber_count,
            created_date: record.created_date.format("%Y-%m-%d").to_string(),
            video_count: record.video_count,
            videos_last_30_days: record.videos_last_30_days,
            views_last_30_days: record.views_last_30_days,
            channel_age_years: record.channel_age_years,
            video_count_log1p: record.video_count_log1p,
            country_name: &record.country_name,
            subscriber_tier: record.subscriber_tier().label(),
            cost_effectiveness: metrics::cost_effectiveness(record),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_path(records: &[ChannelRecord], path: &Path) -> Result<(), LoadError> {
    let file = File::create(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(records, io::BufWriter::new(file))?;
    debug!(path = %path.display(), rows = records.len(), "exported filtered table");
    Ok(())
}
