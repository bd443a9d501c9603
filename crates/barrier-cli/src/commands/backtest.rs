//! 백테스트 명령어.
//!
//! CSV로 저장된 과거 종가로 롤링 배리어 백테스트를 실행합니다.
//! 여러 파일을 지정하면 종목별로 병렬 실행합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # SPY 6개월 보유, KI 65%
//! barrier backtest -s data/SPY.csv --ki 65 --months 6
//!
//! # 설정 파일 + 여러 종목
//! barrier backtest -c config/backtest/els.toml -s data/SPY.csv -s data/QQQ.csv
//!
//! # 결과 JSON 저장
//! barrier backtest -s data/SPY.csv -o reports/spy.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use barrier_analytics::{BacktestConfig, BacktestEngine, BacktestReport, KnockInPolicy};
use barrier_core::{HoldingPeriod, ThresholdSet};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    config::CliSettings,
    data::{load_series_csv, symbol_from_path},
};

/// 백테스트 CLI 설정
#[derive(Debug, Clone, Default)]
pub struct BacktestCliConfig {
    /// 종가 CSV 파일 목록
    pub series_paths: Vec<PathBuf>,
    /// 설정 파일 경로 (옵션)
    pub config_path: Option<PathBuf>,
    /// KO 비율 (옵션, 설정 파일보다 우선)
    pub ko_pct: Option<Decimal>,
    /// 행사가 비율
    pub strike_pct: Option<Decimal>,
    /// KI 비율
    pub ki_pct: Option<Decimal>,
    /// 보유 개월 수
    pub months: Option<usize>,
    /// 보유 거래일 수 (months보다 우선)
    pub holding_days: Option<usize>,
    /// KI 후 회복 윈도우를 별도 집계
    pub distinguish_recovered: bool,
    /// 결과 저장 경로 (옵션)
    pub output_path: Option<PathBuf>,
}

/// 백테스트 설정 파일 형식
///
/// ```toml
/// name = "SPY 6M KI65"
/// months = 6
/// knock_in_policy = "recovered_is_safe"
///
/// [thresholds]
/// ko_pct = 105
/// strike_pct = 100
/// ki_pct = 65
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct BacktestFileConfig {
    /// 설정 이름
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thresholds: Option<ThresholdSet>,
    #[serde(default)]
    pub holding_days: Option<usize>,
    #[serde(default)]
    pub months: Option<usize>,
    #[serde(default)]
    pub knock_in_policy: Option<KnockInPolicy>,
}

/// 설정 파일 로드 (.toml / .json)
pub fn load_backtest_config(path: &Path) -> Result<BacktestFileConfig> {
    if !path.exists() {
        return Err(anyhow!("Backtest config file not found: {}", path.display()));
    }

    let content = std::fs::read_to_string(path)?;

    if path.extension().is_some_and(|ext| ext == "toml") {
        Ok(toml::from_str(&content)?)
    } else if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(&content)?)
    } else {
        Err(anyhow!(
            "Unsupported config format. Use .toml or .json: {}",
            path.display()
        ))
    }
}

/// 우선순위: CLI 인자 > 설정 파일 > 환경변수 기본값
pub fn resolve_config(
    cli: &BacktestCliConfig,
    file: &BacktestFileConfig,
    settings: &CliSettings,
) -> Result<BacktestConfig> {
    let mut thresholds = file.thresholds.unwrap_or_default();
    if let Some(ko) = cli.ko_pct {
        thresholds = thresholds.with_ko_pct(ko);
    }
    if let Some(strike) = cli.strike_pct {
        thresholds = thresholds.with_strike_pct(strike);
    }
    if let Some(ki) = cli.ki_pct {
        thresholds = thresholds.with_ki_pct(ki);
    }

    let holding = match (cli.holding_days, cli.months, file.holding_days, file.months) {
        (Some(days), ..) => HoldingPeriod::new(days)?,
        (None, Some(months), ..) => {
            HoldingPeriod::from_months(months, settings.trading_days_per_month)?
        }
        (None, None, Some(days), _) => HoldingPeriod::new(days)?,
        (None, None, None, Some(months)) => {
            HoldingPeriod::from_months(months, settings.trading_days_per_month)?
        }
        (None, None, None, None) => {
            HoldingPeriod::from_months(settings.default_months, settings.trading_days_per_month)?
        }
    };

    let policy = if cli.distinguish_recovered {
        KnockInPolicy::Distinguish
    } else {
        file.knock_in_policy.unwrap_or_default()
    };

    let config = BacktestConfig::new(thresholds)
        .with_holding(holding)
        .with_knock_in_policy(policy);
    config.validate()?;
    Ok(config)
}

/// 백테스트 실행
pub async fn run_backtest(cli: BacktestCliConfig, settings: &CliSettings) -> Result<Vec<BacktestReport>> {
    if cli.series_paths.is_empty() {
        return Err(anyhow!("At least one --series file is required"));
    }

    // 1. 설정 로드
    let file_config = match &cli.config_path {
        Some(path) => {
            let loaded = load_backtest_config(path)?;
            info!("Loaded backtest config: {}", loaded.name);
            loaded
        }
        None => BacktestFileConfig::default(),
    };
    let config = resolve_config(&cli, &file_config, settings)?;
    info!(
        holding_days = config.holding.days(),
        ko = %config.thresholds.ko_pct,
        strike = %config.thresholds.strike_pct,
        ki = %config.thresholds.ki_pct,
        "백테스트 설정"
    );

    // 2. 종목별 병렬 실행
    let tasks = cli.series_paths.iter().cloned().map(|path| {
        let engine = BacktestEngine::new(config.clone());
        tokio::task::spawn_blocking(move || -> Result<BacktestReport> {
            let series = load_series_csv(&path)?;
            let report = engine
                .run(&series)
                .with_context(|| format!("Backtest failed: {}", path.display()))?;
            Ok(report.with_symbol(symbol_from_path(&path)))
        })
    });

    let mut reports = Vec::with_capacity(cli.series_paths.len());
    for (path, joined) in cli.series_paths.iter().zip(join_all(tasks).await) {
        let report = joined.with_context(|| format!("Task panicked: {}", path.display()))??;
        reports.push(report);
    }

    // 3. 결과 출력
    for report in &reports {
        if report.insufficient_data() {
            warn!(
                symbol = %report.symbol,
                data_points = report.data_points,
                holding_days = report.config.holding.days(),
                "데이터 부족: 보유 기간보다 이력이 짧습니다"
            );
        }
        println!("\n{}", report.summary());
    }

    // 4. 결과 저장 (옵션)
    if let Some(output_path) = &cli.output_path {
        let multiple = reports.len() > 1;
        for report in &reports {
            let path = if multiple {
                output_path_for_symbol(output_path, &report.symbol)
            } else {
                output_path.clone()
            };
            save_report(report, &path)?;
            info!("Report saved to: {}", path.display());
        }
    }

    Ok(reports)
}

/// `reports/out.json` + `SPY` → `reports/out_SPY.json`
fn output_path_for_symbol(path: &Path, symbol: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("backtest");
    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, symbol, ext),
        None => format!("{}_{}", stem, symbol),
    };
    path.with_file_name(file_name)
}

/// 백테스트 리포트를 파일로 저장
fn save_report(report: &BacktestReport, path: &Path) -> Result<()> {
    // 디렉토리 생성
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::to_string_pretty(report)?
    } else {
        // 기본: 텍스트 요약
        report.summary()
    };

    std::fs::write(path, content)?;
    Ok(())
}
