//! 배리어 가격 계산 명령어.

use anyhow::Result;
use barrier_core::{BarrierLevels, ThresholdSet};
use rust_decimal::Decimal;

/// 기준가에 대한 KO/행사가/KI 가격을 계산합니다.
pub fn compute_levels(reference: Decimal, thresholds: &ThresholdSet) -> Result<BarrierLevels> {
    thresholds.validate()?;
    if reference <= Decimal::ZERO {
        anyhow::bail!("Reference price must be positive: {}", reference);
    }
    Ok(thresholds.levels(reference)?)
}

/// 배리어 가격 출력
pub fn print_levels(levels: &BarrierLevels, thresholds: &ThresholdSet) {
    println!("\n기준가: {:.2}", levels.reference);
    println!("{}", "─".repeat(40));
    println!("  KO  ({:>6}%): {:>12.2}", thresholds.ko_pct, levels.knock_out);
    println!("  ST  ({:>6}%): {:>12.2}", thresholds.strike_pct, levels.strike);
    println!("  KI  ({:>6}%): {:>12.2}", thresholds.ki_pct, levels.knock_in);
}
