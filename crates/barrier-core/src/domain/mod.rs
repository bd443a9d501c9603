//! 도메인 타입.
//!
//! - `series` - 일별 종가 시계열
//! - `thresholds` - KO/ST/KI 비율과 가격 레벨
//! - `holding` - 보유 기간

mod holding;
mod series;
mod thresholds;

pub use holding::{HoldingPeriod, DEFAULT_HOLDING_DAYS, DEFAULT_TRADING_DAYS_PER_MONTH};
pub use series::{PricePoint, PriceSeries};
pub use thresholds::{BarrierLevels, ThresholdSet};
