//! 롤링 배리어 백테스트 모듈
//!
//! 과거 모든 거래일을 진입일로 가정하고, 보유 기간 동안의 KI 낙인 여부와
//! 만기 가격을 판정하여 손실 확률과 회복 일수를 집계합니다.
//!
//! # 주요 구성요소
//!
//! - [`compute_windows`]: 진입일별 윈도우 생성 및 SAFE/LOSS 판정
//! - [`compute_recovery`] / [`compute_recoveries`]: 손실 윈도우의 행사가 회복 일수
//! - [`summarize`]: 확률/평균 회복 일수 집계
//! - [`BacktestEngine`]: 위 단계를 묶은 실행 엔진과 [`BacktestReport`]

pub mod engine;
pub mod recovery;
pub mod summary;
pub mod window;

pub use engine::{BacktestConfig, BacktestEngine, BacktestError, BacktestReport, BacktestResult};
pub use recovery::{compute_recoveries, compute_recovery, RecoveryRecord};
pub use summary::{summarize, BacktestSummary};
pub use window::{compute_windows, BacktestWindow, KnockInPolicy, WindowOutcome};
