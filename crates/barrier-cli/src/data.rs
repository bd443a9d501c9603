//! CSV 종가 시계열 입출력.
//!
//! `date,close` 헤더 형식과 Yahoo Finance 내보내기(`Date,...,Close,...`) 형식을
//! 모두 읽습니다. 정렬과 결측치 제거는 여기서 처리하고, 날짜 중복/0 이하 가격은
//! [`PriceSeries::new`] 검증에 맡깁니다.

use std::{path::Path, str::FromStr};

use anyhow::{Context, Result};
use barrier_core::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Close")]
    close: String,
}

#[derive(Debug, Serialize)]
struct CsvOutRow {
    date: NaiveDate,
    close: String,
}

/// CSV 파일에서 종가 시계열을 로드합니다.
pub fn load_series_csv<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let mut points = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("Failed to parse row {}", line + 1))?;
        let raw = row.close.trim();
        // 결측치 (Yahoo: "null")
        if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
            skipped += 1;
            continue;
        }
        let close = Decimal::from_str(raw)
            .with_context(|| format!("Invalid close price at {}: {}", row.date, raw))?;
        points.push(PricePoint::new(row.date, close));
    }

    if skipped > 0 {
        warn!(file = %path.display(), skipped, "결측 종가 행 건너뜀");
    }

    points.sort_by_key(|p| p.date);
    debug!(file = %path.display(), rows = points.len(), "시계열 로드");

    PriceSeries::new(points).with_context(|| format!("Invalid series: {}", path.display()))
}

/// 종가 시계열을 `date,close` CSV로 저장합니다.
pub fn save_series_csv<P: AsRef<Path>>(series: &PriceSeries, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    for point in series.points() {
        writer.serialize(CsvOutRow {
            date: point.date,
            close: point.close.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// 파일 이름에서 종목명 추출 (`data/SPY.csv` → `SPY`)
pub fn symbol_from_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}
