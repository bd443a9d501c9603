//! 배리어 구조화 상품 분석 모듈.
//!
//! - [`backtest`]: 과거 전 구간 롤링 윈도우 백테스트 (KI 낙인 / 손실 / 회복 일수)
//! - [`path`]: 단일 가격 경로의 KO/KI/ST 판정
//! - [`simulation`]: 시연용 기하 브라운 운동 경로 생성

pub mod backtest;
pub mod path;
pub mod simulation;

pub use backtest::{
    compute_recoveries, compute_recovery, compute_windows, summarize, BacktestConfig,
    BacktestEngine, BacktestError, BacktestReport, BacktestResult, BacktestSummary,
    BacktestWindow, KnockInPolicy, RecoveryRecord, WindowOutcome,
};
pub use path::{PathAssessment, PathError, PathVerdict};
pub use simulation::{PathSimulator, SimulationConfig};

// Re-export core types for convenience
pub use barrier_core::{BarrierLevels, HoldingPeriod, PricePoint, PriceSeries, ThresholdSet};
