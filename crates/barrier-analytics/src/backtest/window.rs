//! 진입일별 보유 기간 윈도우.

use std::collections::VecDeque;

use barrier_core::{CoreResult, HoldingPeriod, PriceSeries, ThresholdSet};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// "KI 낙인 후 만기에 행사가 이상으로 회복"한 윈도우의 분류 방식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnockInPolicy {
    /// SAFE로 분류 (기본값)
    #[default]
    RecoveredIsSafe,
    /// 별도 범주 [`WindowOutcome::KnockedInRecovered`]로 분류
    Distinguish,
}

/// 윈도우 판정 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowOutcome {
    /// 원금 보전
    Safe,
    /// KI 낙인 후 만기 회복 ([`KnockInPolicy::Distinguish`]에서만 발생)
    KnockedInRecovered,
    /// KI 낙인 + 만기 가격 < 행사가
    Loss,
}

impl std::fmt::Display for WindowOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowOutcome::Safe => write!(f, "SAFE"),
            WindowOutcome::KnockedInRecovered => write!(f, "KNOCKED_IN_RECOVERED"),
            WindowOutcome::Loss => write!(f, "LOSS"),
        }
    }
}

/// 진입일 하나에 대한 보유 기간 윈도우.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestWindow {
    /// 진입일 (윈도우 식별자)
    pub entry_date: NaiveDate,
    /// 진입가 = 진입일 종가
    pub entry_price: Decimal,
    /// 만기일 = 진입일 + holding_days 거래일
    pub exit_date: NaiveDate,
    /// 만기가
    pub exit_price: Decimal,
    /// 진입일~만기일 (양 끝 포함) 최저 종가
    pub window_min_price: Decimal,
    /// 진입가 × ki_pct / 100
    pub knock_in_level: Decimal,
    /// 진입가 × strike_pct / 100
    pub strike_level: Decimal,
    /// window_min_price < knock_in_level
    pub touched_ki: bool,
    /// exit_price < strike_level
    pub below_strike_at_exit: bool,
    pub outcome: WindowOutcome,
    /// 시계열 내 진입 인덱스
    pub entry_index: usize,
    /// 시계열 내 만기 인덱스
    pub exit_index: usize,
}

impl BacktestWindow {
    pub fn is_loss(&self) -> bool {
        self.outcome == WindowOutcome::Loss
    }

    /// 만기가 > 진입가
    pub fn is_positive_return(&self) -> bool {
        self.exit_price > self.entry_price
    }

    /// 진입가 대비 만기 수익률 (%), 범위 초과 시 None
    pub fn return_pct(&self) -> Option<Decimal> {
        self.exit_price
            .checked_div(self.entry_price)
            .and_then(|ratio| (ratio - Decimal::ONE).checked_mul(dec!(100)))
    }
}

/// 모든 유효 진입일에 대해 윈도우를 생성합니다.
///
/// 진입 인덱스 `i`는 `0..=len - holding_days - 1` 이며 만기는 `i + holding_days`.
/// 최저가는 `[i, i + holding_days]` 구간(양 끝 포함)의 슬라이딩 최솟값으로
/// 전체 O(n)에 계산합니다. 만기까지 데이터가 부족한 진입일은 버립니다.
///
/// 배리어 가격이 `Decimal` 범위를 넘는 진입가가 있으면 오류를 반환합니다.
pub fn compute_windows(
    series: &PriceSeries,
    thresholds: &ThresholdSet,
    holding: HoldingPeriod,
    policy: KnockInPolicy,
) -> CoreResult<Vec<BacktestWindow>> {
    let points = series.points();
    let span = holding.days();
    if points.len() <= span {
        return Ok(Vec::new());
    }

    let mut windows = Vec::with_capacity(points.len() - span);
    // 종가가 증가하는 인덱스만 유지 (front = 현재 구간 최솟값)
    let mut minima: VecDeque<usize> = VecDeque::with_capacity(span + 1);

    for (j, point) in points.iter().enumerate() {
        while minima
            .back()
            .is_some_and(|&k| points[k].close >= point.close)
        {
            minima.pop_back();
        }
        minima.push_back(j);

        if j < span {
            continue;
        }
        let i = j - span;
        while minima.front().is_some_and(|&k| k < i) {
            minima.pop_front();
        }
        let Some(&min_index) = minima.front() else {
            continue;
        };

        let entry = &points[i];
        let knock_in_level = thresholds.knock_in_level(entry.close)?;
        let strike_level = thresholds.strike_level(entry.close)?;
        let window_min_price = points[min_index].close;
        let touched_ki = window_min_price < knock_in_level;
        let below_strike_at_exit = point.close < strike_level;

        let outcome = match (touched_ki, below_strike_at_exit) {
            (true, true) => WindowOutcome::Loss,
            (true, false) if policy == KnockInPolicy::Distinguish => {
                WindowOutcome::KnockedInRecovered
            }
            _ => WindowOutcome::Safe,
        };

        windows.push(BacktestWindow {
            entry_date: entry.date,
            entry_price: entry.close,
            exit_date: point.date,
            exit_price: point.close,
            window_min_price,
            knock_in_level,
            strike_level,
            touched_ki,
            below_strike_at_exit,
            outcome,
            entry_index: i,
            exit_index: j,
        });
    }

    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series_from(closes: &[Decimal]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::from_trading_days(start, closes).unwrap()
    }

    fn holding(days: usize) -> HoldingPeriod {
        HoldingPeriod::new(days).unwrap()
    }

    #[test]
    fn test_window_count_and_bounds() {
        let closes: Vec<Decimal> = (1..=10).map(Decimal::from).collect();
        let series = series_from(&closes);
        let windows = compute_windows(
            &series,
            &ThresholdSet::default(),
            holding(3),
            KnockInPolicy::default(),
        )
        .unwrap();

        assert_eq!(windows.len(), 7);
        let first = &windows[0];
        assert_eq!(first.entry_index, 0);
        assert_eq!(first.exit_index, 3);
        assert_eq!(first.entry_price, dec!(1));
        assert_eq!(first.exit_price, dec!(4));
        let last = windows.last().unwrap();
        assert_eq!(last.entry_index, 6);
        assert_eq!(last.exit_index, 9);
        assert_eq!(last.exit_date, series.end_date().unwrap());
    }

    #[test]
    fn test_length_equal_to_holding_yields_nothing() {
        let series = series_from(&[dec!(100); 21]);
        let windows = compute_windows(
            &series,
            &ThresholdSet::default(),
            holding(21),
            KnockInPolicy::default(),
        )
        .unwrap();
        assert!(windows.is_empty());

        let series = series_from(&[dec!(100); 22]);
        let windows = compute_windows(
            &series,
            &ThresholdSet::default(),
            holding(21),
            KnockInPolicy::default(),
        )
        .unwrap();
        assert_eq!(windows.len(), 1);
    }

    #[test]
    fn test_empty_series() {
        let windows = compute_windows(
            &PriceSeries::empty(),
            &ThresholdSet::default(),
            holding(1),
            KnockInPolicy::default(),
        )
        .unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn test_window_min_includes_both_endpoints() {
        // 최저가가 진입일
        let series = series_from(&[dec!(50), dec!(80), dec!(90), dec!(70), dec!(100)]);
        let windows = compute_windows(
            &series,
            &ThresholdSet::default(),
            holding(2),
            KnockInPolicy::default(),
        )
        .unwrap();
        assert_eq!(windows[0].window_min_price, dec!(50));
        assert_eq!(windows[1].window_min_price, dec!(70)); // 최저가가 만기일
        assert_eq!(windows[2].window_min_price, dec!(70));
    }

    #[test]
    fn test_sliding_min_matches_naive() {
        let closes: Vec<Decimal> = [5, 3, 8, 1, 9, 2, 7, 7, 4, 6, 10, 1]
            .iter()
            .map(|&v| Decimal::from(v))
            .collect();
        let series = series_from(&closes);
        for span in 1..closes.len() {
            let windows = compute_windows(
                &series,
                &ThresholdSet::default(),
                holding(span),
                KnockInPolicy::default(),
            )
            .unwrap();
            for w in &windows {
                let naive = closes[w.entry_index..=w.exit_index]
                    .iter()
                    .min()
                    .copied()
                    .unwrap();
                assert_eq!(w.window_min_price, naive, "span={} entry={}", span, w.entry_index);
            }
        }
    }

    #[test]
    fn test_loss_classification() {
        // 100 → 60 급락 후 만기 90: KI 70 낙인 + 행사가 100 미만
        let series = series_from(&[dec!(100), dec!(60), dec!(90)]);
        let thresholds = ThresholdSet::default();
        let windows = compute_windows(&series, &thresholds, holding(2), KnockInPolicy::default()).unwrap();

        let w = &windows[0];
        assert_eq!(w.knock_in_level, dec!(70));
        assert_eq!(w.strike_level, dec!(100));
        assert!(w.touched_ki);
        assert!(w.below_strike_at_exit);
        assert_eq!(w.outcome, WindowOutcome::Loss);
        assert!(!w.is_positive_return());
        assert_eq!(w.return_pct(), Some(dec!(-10)));
    }

    #[test]
    fn test_knock_in_exactly_at_level_is_not_touched() {
        let series = series_from(&[dec!(100), dec!(70), dec!(90)]);
        let windows = compute_windows(
            &series,
            &ThresholdSet::default(),
            holding(2),
            KnockInPolicy::default(),
        )
        .unwrap();
        assert!(!windows[0].touched_ki);
        assert!(windows[0].below_strike_at_exit);
        assert_eq!(windows[0].outcome, WindowOutcome::Safe);
    }

    #[test]
    fn test_recovered_knock_in_policy() {
        let series = series_from(&[dec!(100), dec!(60), dec!(100)]);
        let thresholds = ThresholdSet::default();

        let default_policy =
            compute_windows(&series, &thresholds, holding(2), KnockInPolicy::RecoveredIsSafe).unwrap();
        assert!(default_policy[0].touched_ki);
        assert_eq!(default_policy[0].outcome, WindowOutcome::Safe);

        let distinguish =
            compute_windows(&series, &thresholds, holding(2), KnockInPolicy::Distinguish).unwrap();
        assert_eq!(distinguish[0].outcome, WindowOutcome::KnockedInRecovered);
    }

    #[test]
    fn test_levels_are_per_window_entry_price() {
        let series = series_from(&[dec!(100), dec!(200), dec!(150), dec!(300)]);
        let windows = compute_windows(
            &series,
            &ThresholdSet::default(),
            holding(1),
            KnockInPolicy::default(),
        )
        .unwrap();
        assert_eq!(windows[0].knock_in_level, dec!(70));
        assert_eq!(windows[1].knock_in_level, dec!(140));
        assert_eq!(windows[2].strike_level, dec!(150));
    }

    #[test]
    fn test_exit_date_follows_trading_days() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = series_from(&[dec!(1); 10]);
        let windows = compute_windows(
            &series,
            &ThresholdSet::default(),
            holding(5),
            KnockInPolicy::default(),
        )
        .unwrap();
        // 2024-01-01(월) + 5거래일 = 2024-01-08(월)
        assert_eq!(windows[0].entry_date, start);
        assert_eq!(windows[0].exit_date, start + Duration::days(7));
    }
}
