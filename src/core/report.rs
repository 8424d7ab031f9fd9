use crate::domain::model::{CleanTable, RawTable, StatisticRow, StatisticsSummary};
use crate::utils::error::{EtlError, Result};
use serde_json::Value;
use std::io::{self, Write};

pub const RAW_FILENAME: &str = "raw_users.csv";
pub const CLEAN_FILENAME: &str = "clean_users.csv";
pub const STATISTICS_FILENAME: &str = "statistics_summary.csv";

/// 原始表：所有攤平後的欄位，缺少的鍵輸出空字串
pub fn raw_csv(raw: &RawTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if !raw.columns.is_empty() {
        writer.write_record(&raw.columns)?;
    }
    for record in &raw.rows {
        writer.write_record(raw.columns.iter().map(|column| cell(record.get(column))))?;
    }

    finish(writer)
}

pub fn clean_csv(clean: &CleanTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CleanTable::HEADERS)?;

    for row in &clean.rows {
        writer.write_record([
            clean.gender_of(row).unwrap_or_default().to_string(),
            row.first_name.clone().unwrap_or_default(),
            row.last_name.clone().unwrap_or_default(),
            clean.nationality_of(row).unwrap_or_default().to_string(),
            row.age.map(|age| age.to_string()).unwrap_or_default(),
            clean.country_of(row).unwrap_or_default().to_string(),
            row.age_range
                .map(|range| range.label().to_string())
                .unwrap_or_default(),
        ])?;
    }

    finish(writer)
}

/// 長格式統計表，欄位為 Metrica, Categoria, Valor
pub fn statistics_csv(rows: &[StatisticRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "NaN".to_string())
}

/// 將三項統計寫入 `out`，平均值取兩位小數
pub fn write_statistics_report<W: Write>(
    out: &mut W,
    summary: &StatisticsSummary,
) -> io::Result<()> {
    writeln!(out, "Average age: {}", format_optional(summary.average_age))?;

    writeln!(out, "Count by gender:")?;
    for (gender, count) in &summary.gender_counts {
        writeln!(out, "  {:<10} {}", gender, count)?;
    }

    writeln!(out, "Average age by gender:")?;
    for (gender, avg) in &summary.avg_age_by_gender {
        writeln!(out, "  {:<10} {}", gender, format_optional(*avg))?;
    }

    Ok(())
}

/// 在主控台輸出三項統計；寫入失敗只記錄
pub fn echo_statistics(summary: &StatisticsSummary) {
    let stdout = io::stdout();
    if let Err(e) = write_statistics_report(&mut stdout.lock(), summary) {
        tracing::warn!("🔶 Could not print statistics: {}", e);
    }
}
