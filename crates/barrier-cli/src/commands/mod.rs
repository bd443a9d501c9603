//! CLI 명령어.

pub mod backtest;
pub mod levels;
pub mod simulate;
