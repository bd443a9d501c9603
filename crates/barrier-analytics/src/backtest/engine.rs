//! 롤링 배리어 백테스트 엔진
//!
//! 과거 종가 시계열과 KO/ST/KI 비율, 보유 기간으로 전 구간 롤링 백테스트를
//! 실행하고 리포트를 생성합니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use barrier_analytics::backtest::{BacktestConfig, BacktestEngine};
//! use barrier_core::{HoldingPeriod, ThresholdSet};
//! use rust_decimal_macros::dec;
//!
//! let config = BacktestConfig::new(ThresholdSet::default().with_ki_pct(dec!(65)))
//!     .with_holding(HoldingPeriod::from_months(6, 21)?);
//!
//! let report = BacktestEngine::new(config).run(&series)?;
//! println!("{}", report.summary());
//! ```

use std::collections::BTreeMap;

use barrier_core::{CoreError, HoldingPeriod, PriceSeries, ThresholdSet};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    recovery::{compute_recoveries, RecoveryRecord},
    summary::{summarize, BacktestSummary},
    window::{compute_windows, BacktestWindow, KnockInPolicy},
};

/// 백테스트 오류
#[derive(Debug, Error)]
pub enum BacktestError {
    /// 입력 검증 오류 (시계열/파라미터)
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// 백테스트 결과 타입
pub type BacktestResult<T> = Result<T, BacktestError>;

/// 백테스트 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// KO/ST/KI 비율
    #[serde(default)]
    pub thresholds: ThresholdSet,

    /// 보유 기간 (거래일)
    #[serde(default)]
    pub holding: HoldingPeriod,

    /// KI 낙인 후 회복 윈도우 분류 방식
    #[serde(default)]
    pub knock_in_policy: KnockInPolicy,
}

impl BacktestConfig {
    /// 새로운 백테스트 설정을 생성합니다.
    pub fn new(thresholds: ThresholdSet) -> Self {
        Self {
            thresholds,
            ..Default::default()
        }
    }

    /// 보유 기간 설정
    pub fn with_holding(mut self, holding: HoldingPeriod) -> Self {
        self.holding = holding;
        self
    }

    /// KI 회복 분류 방식 설정
    pub fn with_knock_in_policy(mut self, policy: KnockInPolicy) -> Self {
        self.knock_in_policy = policy;
        self
    }

    /// 설정 검증
    pub fn validate(&self) -> BacktestResult<()> {
        self.thresholds.validate()?;
        Ok(())
    }
}

/// 백테스트 실행 리포트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// 설정 정보
    pub config: BacktestConfig,

    /// 종목 (표시용)
    #[serde(default)]
    pub symbol: String,

    /// 집계 결과
    pub summary: BacktestSummary,

    /// 진입일 순 윈도우
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<BacktestWindow>,

    /// LOSS 윈도우별 회복 결과 (키: 진입일)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub recoveries: BTreeMap<NaiveDate, RecoveryRecord>,

    /// 데이터 시작일
    pub start_date: Option<NaiveDate>,

    /// 데이터 종료일
    pub end_date: Option<NaiveDate>,

    /// 데이터 포인트 수
    pub data_points: usize,
}

impl BacktestReport {
    /// 종목명 지정
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// 보유 기간보다 데이터가 짧아 윈도우가 없는 경우
    pub fn insufficient_data(&self) -> bool {
        self.summary.is_empty()
    }

    /// 요약 문자열 반환
    pub fn summary(&self) -> String {
        let s = &self.summary;
        let period = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => format!(
                "{} → {} ({} 일)",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d"),
                (end - start).num_days()
            ),
            _ => "데이터 없음".to_string(),
        };
        let t = &self.config.thresholds;

        format!(
            "배리어 롤링 백테스트 요약 {}\n\
             ═══════════════════════════════════════\n\
             기간: {}\n\
             데이터 포인트: {}\n\
             보유 기간: {}\n\
             KO / ST / KI: {}% / {}% / {}%\n\
             ───────────────────────────────────────\n\
             총 표본: {}\n\
             안전: {} ({})\n\
             손실: {} ({})\n\
             KI 후 회복: {}\n\
             만기 수익 > 0: {}\n\
             ───────────────────────────────────────\n\
             회복: {} / 미회복(STUCK): {}\n\
             평균 회복 일수: {}\n\
             최장 회복 일수: {}\n\
             ═══════════════════════════════════════",
            self.symbol,
            period,
            self.data_points,
            self.config.holding,
            t.ko_pct,
            t.strike_pct,
            t.ki_pct,
            s.total_samples,
            s.safe_count,
            fmt_pct(s.safety_probability),
            s.loss_count,
            fmt_pct(s.loss_probability),
            s.knocked_in_recovered_count,
            fmt_pct(s.positive_return_probability),
            s.recovered_count,
            s.stuck_count,
            s.average_recovery_days
                .map(|d| format!("{:.1} 일", d))
                .unwrap_or_else(|| "데이터 없음".to_string()),
            s.max_recovery_days
                .map(|d| format!("{} 일", d))
                .unwrap_or_else(|| "데이터 없음".to_string()),
        )
    }
}

fn fmt_pct(value: Option<rust_decimal::Decimal>) -> String {
    value
        .map(|v| format!("{:.2}%", v))
        .unwrap_or_else(|| "데이터 없음".to_string())
}

/// 롤링 배리어 백테스트 엔진
///
/// 상태를 갖지 않으며 `run`은 입력에 대한 순수 함수입니다.
/// 서로 다른 종목의 백테스트는 독립적으로 병렬 실행할 수 있습니다.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    /// 새로운 백테스트 엔진을 생성합니다.
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// 백테스트 실행
    ///
    /// 1. 설정 검증
    /// 2. 진입일별 윈도우 생성
    /// 3. LOSS 윈도우 회복 계산 (단일 스윕)
    /// 4. 집계
    pub fn run(&self, series: &PriceSeries) -> BacktestResult<BacktestReport> {
        self.config.validate()?;

        let windows = compute_windows(
            series,
            &self.config.thresholds,
            self.config.holding,
            self.config.knock_in_policy,
        )?;
        debug!(
            data_points = series.len(),
            holding_days = self.config.holding.days(),
            windows = windows.len(),
            "윈도우 생성 완료"
        );

        let recoveries = compute_recoveries(series, &windows);
        debug!(loss_windows = recoveries.len(), "회복 계산 완료");

        let summary = summarize(&windows, &recoveries);

        if summary.is_empty() {
            info!(
                data_points = series.len(),
                holding_days = self.config.holding.days(),
                "데이터 부족: 유효 윈도우 없음"
            );
        } else {
            info!(
                total = summary.total_samples,
                safe = summary.safe_count,
                loss = summary.loss_count,
                stuck = summary.stuck_count,
                safety = %fmt_pct(summary.safety_probability),
                "백테스트 완료"
            );
        }
        if summary.loss_count > 0 && summary.recovered_count == 0 {
            warn!(
                loss = summary.loss_count,
                "모든 손실 윈도우가 데이터 끝까지 회복하지 못했습니다"
            );
        }

        Ok(BacktestReport {
            config: self.config.clone(),
            symbol: String::new(),
            summary,
            windows,
            recoveries,
            start_date: series.start_date(),
            end_date: series.end_date(),
            data_points: series.len(),
        })
    }
}
