//! 단일 가격 경로의 KO/KI/ST 판정.
//!
//! 하나의 경로(실제 또는 시뮬레이션)를 기준가 대비 세 가격 레벨과 비교하여
//! KI 낙인 여부, KO 터치 여부, 만기 가격과 최종 판정을 계산합니다.

use barrier_core::{BarrierLevels, CoreError, PricePoint, PriceSeries, ThresholdSet};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 경로 판정 오류
#[derive(Debug, Error)]
pub enum PathError {
    /// 빈 경로
    #[error("가격 경로가 비어 있습니다")]
    EmptyPath,

    /// 입력 검증 오류
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// 경로 최종 판정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathVerdict {
    /// KI 낙인 + 만기가 < 행사가: 원금 손실 (행사가로 주식 인수)
    CapitalLoss,
    /// KO 터치: 조기 상환
    KnockedOut,
    /// KO/KI 모두 미터치 (또는 KI 후 만기 회복): 만기 보유
    Holding,
}

impl std::fmt::Display for PathVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathVerdict::CapitalLoss => {
                write!(f, "원금 손실: KI 하회 후 만기 가격이 행사가 미만")
            }
            PathVerdict::KnockedOut => write!(f, "조기 상환: KO 터치"),
            PathVerdict::Holding => write!(f, "만기 보유: KO 미터치, 원금 보전"),
        }
    }
}

/// 단일 경로 판정 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAssessment {
    /// 기준가와 세 가격 레벨
    pub levels: BarrierLevels,
    /// 경로 최저가 < KI
    pub touched_ki: bool,
    /// 경로 최고가 > KO
    pub touched_ko: bool,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// 경로 마지막 종가
    pub final_price: Decimal,
    /// (final / reference - 1) × 100
    pub final_return_pct: Decimal,
    /// KI 아래로 내려간 시점들
    pub ki_breaches: Vec<PricePoint>,
    pub verdict: PathVerdict,
}

impl PathAssessment {
    /// 경로를 판정합니다.
    ///
    /// `reference`가 없으면 첫 종가를 기준가로 사용합니다.
    pub fn evaluate(
        series: &PriceSeries,
        thresholds: &ThresholdSet,
        reference: Option<Decimal>,
    ) -> Result<Self, PathError> {
        thresholds.validate()?;
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Err(PathError::EmptyPath);
        };

        let reference = reference.unwrap_or(first.close);
        if reference <= Decimal::ZERO {
            return Err(CoreError::InvalidParameters(format!(
                "기준가는 0보다 커야 합니다: {}",
                reference
            ))
            .into());
        }
        let levels = thresholds.levels(reference)?;

        let min_price = series.min_close().unwrap_or(first.close);
        let max_price = series.max_close().unwrap_or(first.close);
        let touched_ki = levels.is_below_knock_in(min_price);
        let touched_ko = levels.is_above_knock_out(max_price);
        let final_price = last.close;

        let ki_breaches: Vec<PricePoint> = series
            .points()
            .iter()
            .filter(|p| levels.is_below_knock_in(p.close))
            .copied()
            .collect();

        let final_return_pct = final_price
            .checked_div(reference)
            .and_then(|ratio| (ratio - Decimal::ONE).checked_mul(dec!(100)))
            .ok_or_else(|| {
                CoreError::InvalidParameters(format!(
                    "수익률 계산 범위 초과: {} / {}",
                    final_price, reference
                ))
            })?;

        let verdict = if touched_ki && levels.is_below_strike(final_price) {
            PathVerdict::CapitalLoss
        } else if touched_ko {
            PathVerdict::KnockedOut
        } else {
            PathVerdict::Holding
        };

        Ok(Self {
            levels,
            touched_ki,
            touched_ko,
            min_price,
            max_price,
            final_price,
            final_return_pct,
            ki_breaches,
            verdict,
        })
    }

    /// 판정 요약 문자열
    pub fn summary(&self) -> String {
        format!(
            "KO: {:.2} / ST: {:.2} / KI: {:.2}\n\
             KI 터치: {} ({}회)\n\
             KO 터치: {}\n\
             만기 가격: {:.2} ({:+.2}%)\n\
             판정: {}",
            self.levels.knock_out,
            self.levels.strike,
            self.levels.knock_in,
            if self.touched_ki { "예" } else { "아니오" },
            self.ki_breaches.len(),
            if self.touched_ko { "예" } else { "아니오" },
            self.final_price,
            self.final_return_pct,
            self.verdict,
        )
    }
}
