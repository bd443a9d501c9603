//! 손실 윈도우의 행사가 회복 일수.
//!
//! 회복 일수는 보유 기간(거래일)과 달리 **달력 일수**입니다.

use std::collections::BTreeMap;

use barrier_core::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::window::BacktestWindow;

/// 손실 윈도우의 회복 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecoveryRecord {
    /// 만기 이후 처음으로 종가 >= 행사가가 된 날
    Recovered {
        recovery_date: NaiveDate,
        /// recovery_date - exit_date (달력 일수, 항상 1 이상)
        recovery_days: i64,
    },
    /// 데이터 끝까지 회복하지 못함 (0일/무한대로 취급하지 않음)
    Stuck,
}

impl RecoveryRecord {
    pub fn is_stuck(&self) -> bool {
        matches!(self, RecoveryRecord::Stuck)
    }

    pub fn recovery_days(&self) -> Option<i64> {
        match self {
            RecoveryRecord::Recovered { recovery_days, .. } => Some(*recovery_days),
            RecoveryRecord::Stuck => None,
        }
    }

    fn resolve(window: &BacktestWindow, hit: Option<&PricePoint>) -> Self {
        match hit {
            Some(point) => RecoveryRecord::Recovered {
                recovery_date: point.date,
                recovery_days: (point.date - window.exit_date).num_days(),
            },
            None => RecoveryRecord::Stuck,
        }
    }
}

/// 만기일 다음 거래일의 인덱스 (만기일보다 엄격히 늦은 첫 포인트)
fn scan_start(points: &[PricePoint], exit_date: NaiveDate) -> usize {
    points.partition_point(|p| p.date <= exit_date)
}

/// 단일 윈도우의 회복을 선형 탐색으로 찾습니다.
///
/// 만기일 이후(엄격히 이후) 종가가 `strike_level` 이상인 첫 날을 찾고,
/// 없으면 [`RecoveryRecord::Stuck`]. 여러 윈도우를 처리할 때는
/// [`compute_recoveries`]를 사용하세요.
pub fn compute_recovery(series: &PriceSeries, window: &BacktestWindow) -> RecoveryRecord {
    let points = series.points();
    let start = scan_start(points, window.exit_date);
    let hit = points[start..]
        .iter()
        .find(|p| p.close >= window.strike_level);
    RecoveryRecord::resolve(window, hit)
}

/// 모든 LOSS 윈도우의 회복을 한 번의 역방향 스윕으로 계산합니다.
///
/// 시계열 끝에서부터 커서를 한 칸씩 왼쪽으로 옮기며 "오른쪽의 더 높은 종가" 후보를
/// 단조 스택(아래 → 위로 종가 엄격 감소, 인덱스 감소)으로 유지합니다.
/// 윈도우마다 행사가가 다르므로 각 질의는 스택에서 이진 탐색합니다.
/// 전체 비용은 O(n + k log n) 이며 윈도우별 재탐색은 없습니다.
///
/// 반환 맵의 키는 진입일입니다.
pub fn compute_recoveries(
    series: &PriceSeries,
    windows: &[BacktestWindow],
) -> BTreeMap<NaiveDate, RecoveryRecord> {
    let points = series.points();

    let mut queries: Vec<(usize, &BacktestWindow)> = windows
        .iter()
        .filter(|w| w.is_loss())
        .map(|w| (scan_start(points, w.exit_date), w))
        .collect();
    // 시작 인덱스 내림차순
    queries.sort_by(|a, b| b.0.cmp(&a.0));

    let mut records = BTreeMap::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut cursor = points.len();

    for (start, window) in queries {
        while cursor > start {
            cursor -= 1;
            let close = points[cursor].close;
            while stack.last().is_some_and(|&k| points[k].close <= close) {
                stack.pop();
            }
            stack.push(cursor);
        }

        let qualifying = stack.partition_point(|&k| points[k].close >= window.strike_level);
        let hit = qualifying
            .checked_sub(1)
            .map(|pos| &points[stack[pos]]);
        records.insert(window.entry_date, RecoveryRecord::resolve(window, hit));
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::window::{compute_windows, KnockInPolicy};
    use barrier_core::{HoldingPeriod, ThresholdSet};
    use chrono::Duration;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dated_series(start: NaiveDate, closes: &[Decimal], step_days: i64) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + Duration::days(i as i64 * step_days), c))
            .collect();
        PriceSeries::new(points).unwrap()
    }

    fn loss_windows(series: &PriceSeries, holding: usize) -> Vec<BacktestWindow> {
        compute_windows(
            series,
            &ThresholdSet::default(),
            HoldingPeriod::new(holding).unwrap(),
            KnockInPolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_recovery_in_calendar_days() {
        // 3일 간격 시계열: 만기(인덱스 2) 이후 인덱스 5에서 회복 → 9 달력일
        let start = date(2024, 3, 1);
        let series = dated_series(
            start,
            &[dec!(100), dec!(60), dec!(90), dec!(95), dec!(99), dec!(100), dec!(50)],
            3,
        );
        let windows = loss_windows(&series, 2);
        let loss = windows.iter().find(|w| w.is_loss()).unwrap();
        assert_eq!(loss.entry_index, 0);

        let record = compute_recovery(&series, loss);
        assert_eq!(
            record,
            RecoveryRecord::Recovered {
                recovery_date: start + Duration::days(15),
                recovery_days: 9,
            }
        );
        assert_eq!(record.recovery_days(), Some(9));
    }

    #[test]
    fn test_stuck_when_exit_is_last_point() {
        let series = dated_series(date(2024, 3, 1), &[dec!(100), dec!(60), dec!(90)], 1);
        let windows = loss_windows(&series, 2);
        assert!(windows[0].is_loss());

        assert_eq!(compute_recovery(&series, &windows[0]), RecoveryRecord::Stuck);
        let records = compute_recoveries(&series, &windows);
        assert!(records[&windows[0].entry_date].is_stuck());
        assert_eq!(records[&windows[0].entry_date].recovery_days(), None);
    }

    #[test]
    fn test_stuck_when_never_recovers() {
        let series = dated_series(
            date(2024, 3, 1),
            &[dec!(100), dec!(60), dec!(90), dec!(99), dec!(99.99)],
            1,
        );
        let windows = loss_windows(&series, 2);
        assert_eq!(compute_recovery(&series, &windows[0]), RecoveryRecord::Stuck);
    }

    #[test]
    fn test_equal_to_strike_counts_as_recovered() {
        let series = dated_series(
            date(2024, 3, 1),
            &[dec!(100), dec!(60), dec!(90), dec!(100)],
            1,
        );
        let windows = loss_windows(&series, 2);
        assert_eq!(
            compute_recovery(&series, &windows[0]).recovery_days(),
            Some(1)
        );
    }

    #[test]
    fn test_only_loss_windows_are_resolved() {
        let series = dated_series(date(2024, 3, 1), &[dec!(100); 10], 1);
        let windows = loss_windows(&series, 3);
        assert!(compute_recoveries(&series, &windows).is_empty());
    }

    #[test]
    fn test_sweep_matches_linear_scan_with_mixed_strikes() {
        // 진입가가 다른 여러 손실 윈도우: 회복 시점이 단조롭지 않은 경우
        let closes: Vec<Decimal> = [
            200, 100, 130, 95, 60, 120, 50, 80, 140, 90, 70, 210, 40, 100, 30, 220,
        ]
        .iter()
        .map(|&v| Decimal::from(v))
        .collect();
        let series = dated_series(date(2023, 6, 1), &closes, 1);

        for holding in 1..6 {
            let windows = loss_windows(&series, holding);
            let records = compute_recoveries(&series, &windows);
            let loss_count = windows.iter().filter(|w| w.is_loss()).count();
            assert_eq!(records.len(), loss_count);

            for w in windows.iter().filter(|w| w.is_loss()) {
                assert_eq!(
                    records[&w.entry_date],
                    compute_recovery(&series, w),
                    "holding={} entry={}",
                    holding,
                    w.entry_date
                );
            }
        }
    }

    #[test]
    fn test_serde_shape() {
        let recovered = RecoveryRecord::Recovered {
            recovery_date: date(2024, 1, 10),
            recovery_days: 3,
        };
        let json = serde_json::to_value(recovered).unwrap();
        assert_eq!(json["status"], "recovered");
        assert_eq!(json["recovery_days"], 3);

        let stuck = serde_json::to_value(RecoveryRecord::Stuck).unwrap();
        assert_eq!(stuck["status"], "stuck");
    }
}
