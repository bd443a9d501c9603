//! KO/ST/KI 비율과 가격 레벨.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 배리어 비율 설정 (기준가 대비 %).
///
/// 세 비율 사이의 순서는 강제하지 않습니다.
/// 의미 있는 결과를 위해서는 `ki_pct < strike_pct <= ko_pct` 이어야 합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// KO 조기상환 비율 (예: 105 = 105%)
    #[serde(default = "default_ko_pct")]
    pub ko_pct: Decimal,

    /// 행사가 비율 (예: 100 = 100%)
    #[serde(default = "default_strike_pct")]
    pub strike_pct: Decimal,

    /// KI 낙인 비율 (예: 70 = 70%)
    #[serde(default = "default_ki_pct")]
    pub ki_pct: Decimal,
}

fn default_ko_pct() -> Decimal {
    dec!(105)
}
fn default_strike_pct() -> Decimal {
    dec!(100)
}
fn default_ki_pct() -> Decimal {
    dec!(70)
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            ko_pct: default_ko_pct(),
            strike_pct: default_strike_pct(),
            ki_pct: default_ki_pct(),
        }
    }
}

impl ThresholdSet {
    pub fn new(ko_pct: Decimal, strike_pct: Decimal, ki_pct: Decimal) -> Self {
        Self {
            ko_pct,
            strike_pct,
            ki_pct,
        }
    }

    /// KO 비율 설정
    pub fn with_ko_pct(mut self, pct: Decimal) -> Self {
        self.ko_pct = pct;
        self
    }

    /// 행사가 비율 설정
    pub fn with_strike_pct(mut self, pct: Decimal) -> Self {
        self.strike_pct = pct;
        self
    }

    /// KI 비율 설정
    pub fn with_ki_pct(mut self, pct: Decimal) -> Self {
        self.ki_pct = pct;
        self
    }

    /// 설정 검증 (모든 비율은 0보다 커야 함)
    pub fn validate(&self) -> CoreResult<()> {
        for (name, value) in [
            ("ko_pct", self.ko_pct),
            ("strike_pct", self.strike_pct),
            ("ki_pct", self.ki_pct),
        ] {
            if value <= Decimal::ZERO {
                return Err(CoreError::InvalidParameters(format!(
                    "{}는 0보다 커야 합니다: {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// 기준가에 대한 KO/ST/KI 가격 레벨 계산
    ///
    /// 곱셈이 `Decimal` 범위를 넘으면 [`CoreError::InvalidParameters`].
    pub fn levels(&self, reference: Decimal) -> CoreResult<BarrierLevels> {
        Ok(BarrierLevels {
            reference,
            knock_out: level_of(reference, self.ko_pct)?,
            strike: self.strike_level(reference)?,
            knock_in: self.knock_in_level(reference)?,
        })
    }

    /// 기준가 × strike_pct / 100
    pub fn strike_level(&self, reference: Decimal) -> CoreResult<Decimal> {
        level_of(reference, self.strike_pct)
    }

    /// 기준가 × ki_pct / 100
    pub fn knock_in_level(&self, reference: Decimal) -> CoreResult<Decimal> {
        level_of(reference, self.ki_pct)
    }
}

fn level_of(reference: Decimal, pct: Decimal) -> CoreResult<Decimal> {
    reference
        .checked_mul(pct)
        .and_then(|v| v.checked_div(dec!(100)))
        .ok_or_else(|| {
            CoreError::InvalidParameters(format!(
                "배리어 가격 계산 범위 초과: {} × {}%",
                reference, pct
            ))
        })
}

/// 기준가로부터 계산된 배리어 가격 레벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierLevels {
    /// 기준가 (진입가)
    pub reference: Decimal,
    /// KO 가격
    pub knock_out: Decimal,
    /// 행사가
    pub strike: Decimal,
    /// KI 가격
    pub knock_in: Decimal,
}

impl BarrierLevels {
    /// 가격이 KI 아래인지 (엄격 비교)
    pub fn is_below_knock_in(&self, price: Decimal) -> bool {
        price < self.knock_in
    }

    /// 가격이 행사가 아래인지 (엄격 비교)
    pub fn is_below_strike(&self, price: Decimal) -> bool {
        price < self.strike
    }

    /// 가격이 KO 위인지 (엄격 비교)
    pub fn is_above_knock_out(&self, price: Decimal) -> bool {
        price > self.knock_out
    }
}
