//! 배리어(KO/KI/ST) 백테스트용 핵심 도메인 타입.
//!
//! # 주요 구성요소
//!
//! - [`PriceSeries`]: 검증된 일별 종가 시계열
//! - [`ThresholdSet`]: KO/ST/KI 비율 설정 및 [`BarrierLevels`] 계산
//! - [`HoldingPeriod`]: 보유 기간 (거래일 수)
//! - [`CoreError`]: 입력 검증 오류

pub mod domain;
pub mod error;

pub use domain::{
    BarrierLevels, HoldingPeriod, PricePoint, PriceSeries, ThresholdSet,
    DEFAULT_HOLDING_DAYS, DEFAULT_TRADING_DAYS_PER_MONTH,
};
pub use error::{CoreError, CoreResult};
