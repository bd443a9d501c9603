//! 보유 기간.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 한 달을 거래일로 환산할 때의 관례값.
pub const DEFAULT_TRADING_DAYS_PER_MONTH: usize = 21;

/// 기본 보유 기간 (6개월)
pub const DEFAULT_HOLDING_DAYS: usize = 6 * DEFAULT_TRADING_DAYS_PER_MONTH;

/// 보유 기간 (거래일 수, 1 이상).
///
/// 월 → 거래일 환산은 시장마다 다르므로 호출자가 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct HoldingPeriod(NonZeroUsize);

impl HoldingPeriod {
    /// 거래일 수로 생성
    pub fn new(trading_days: usize) -> CoreResult<Self> {
        NonZeroUsize::new(trading_days).map(Self).ok_or_else(|| {
            CoreError::InvalidParameters("보유 기간은 1 거래일 이상이어야 합니다".to_string())
        })
    }

    /// 개월 수 × 월당 거래일 수로 생성
    pub fn from_months(months: usize, trading_days_per_month: usize) -> CoreResult<Self> {
        let days = months.checked_mul(trading_days_per_month).ok_or_else(|| {
            CoreError::InvalidParameters(format!(
                "보유 기간이 너무 깁니다: {}개월 × {}일",
                months, trading_days_per_month
            ))
        })?;
        Self::new(days)
    }

    /// 거래일 수
    pub fn days(&self) -> usize {
        self.0.get()
    }
}

impl Default for HoldingPeriod {
    fn default() -> Self {
        Self(NonZeroUsize::MIN.saturating_add(DEFAULT_HOLDING_DAYS - 1))
    }
}

impl TryFrom<usize> for HoldingPeriod {
    type Error = CoreError;

    fn try_from(days: usize) -> CoreResult<Self> {
        Self::new(days)
    }
}

impl From<HoldingPeriod> for usize {
    fn from(holding: HoldingPeriod) -> Self {
        holding.days()
    }
}

impl std::fmt::Display for HoldingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} 거래일", self.days())
    }
}
