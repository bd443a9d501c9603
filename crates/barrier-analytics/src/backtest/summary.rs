//! 윈도우/회복 결과 집계.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{
    recovery::RecoveryRecord,
    window::{BacktestWindow, WindowOutcome},
};

/// 백테스트 집계 결과.
///
/// 확률은 0~100 (%). 표본이 없거나 회복 표본이 없으면 `None`("데이터 없음")이며
/// 0으로 대체하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// 전체 윈도우 수
    pub total_samples: usize,
    pub safe_count: usize,
    /// KI 낙인 후 만기 회복 (구분 정책에서만 0 이상)
    pub knocked_in_recovered_count: usize,
    pub loss_count: usize,
    /// 회복한 손실 윈도우 수
    pub recovered_count: usize,
    /// 회복하지 못한 손실 윈도우 수
    pub stuck_count: usize,
    /// 회복 기록이 전달되지 않은 손실 윈도우 수
    /// (recovered + stuck + unresolved == loss)
    #[serde(default)]
    pub unresolved_count: usize,
    /// 만기가 > 진입가 인 윈도우 수
    pub positive_return_count: usize,

    /// safe_count / total × 100
    pub safety_probability: Option<Decimal>,
    /// loss_count / total × 100
    pub loss_probability: Option<Decimal>,
    /// positive_return_count / total × 100
    pub positive_return_probability: Option<Decimal>,
    /// 회복한 손실 윈도우의 평균 회복 일수 (달력 일수)
    pub average_recovery_days: Option<Decimal>,
    /// 최장 회복 일수
    pub max_recovery_days: Option<i64>,
}

impl BacktestSummary {
    /// 윈도우가 하나도 없는 경우 (데이터 부족)
    pub fn is_empty(&self) -> bool {
        self.total_samples == 0
    }
}

fn percentage(count: usize, total: usize) -> Option<Decimal> {
    (total > 0).then(|| Decimal::from(count) * dec!(100) / Decimal::from(total))
}

/// 윈도우와 회복 기록을 집계합니다.
///
/// `recoveries`에 없는 LOSS 윈도우는 STUCK이 아니라 `unresolved_count`로 집계합니다.
/// STUCK은 평균 회복 일수에서 제외됩니다.
pub fn summarize(
    windows: &[BacktestWindow],
    recoveries: &BTreeMap<NaiveDate, RecoveryRecord>,
) -> BacktestSummary {
    let mut summary = BacktestSummary {
        total_samples: windows.len(),
        ..Default::default()
    };

    let mut recovery_day_total: i64 = 0;

    for window in windows {
        match window.outcome {
            WindowOutcome::Safe => summary.safe_count += 1,
            WindowOutcome::KnockedInRecovered => summary.knocked_in_recovered_count += 1,
            WindowOutcome::Loss => {
                summary.loss_count += 1;
                match recoveries.get(&window.entry_date) {
                    Some(RecoveryRecord::Recovered { recovery_days, .. }) => {
                        summary.recovered_count += 1;
                        recovery_day_total += recovery_days;
                        summary.max_recovery_days = Some(
                            summary
                                .max_recovery_days
                                .map_or(*recovery_days, |max| max.max(*recovery_days)),
                        );
                    }
                    Some(RecoveryRecord::Stuck) => summary.stuck_count += 1,
                    None => summary.unresolved_count += 1,
                }
            }
        }
        if window.is_positive_return() {
            summary.positive_return_count += 1;
        }
    }

    let total = summary.total_samples;
    summary.safety_probability = percentage(summary.safe_count, total);
    summary.loss_probability = percentage(summary.loss_count, total);
    summary.positive_return_probability = percentage(summary.positive_return_count, total);
    summary.average_recovery_days = (summary.recovered_count > 0).then(|| {
        Decimal::from(recovery_day_total) / Decimal::from(summary.recovered_count)
    });

    summary
}
