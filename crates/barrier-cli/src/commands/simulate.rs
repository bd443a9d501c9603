//! 가격 경로 시뮬레이션 명령어.
//!
//! GBM 경로를 생성하고 배리어 기준으로 판정합니다. `--force-ki` 지정 시
//! 경로 중간에 KI를 뚫는 하락 구간을 넣습니다.

use std::path::PathBuf;

use anyhow::Result;
use barrier_analytics::{PathAssessment, PathSimulator, SimulationConfig};
use barrier_core::{PriceSeries, ThresholdSet};
use tracing::info;

use crate::data::save_series_csv;

/// 시뮬레이션 CLI 설정
#[derive(Debug, Clone)]
pub struct SimulateCliConfig {
    pub simulation: SimulationConfig,
    pub thresholds: ThresholdSet,
    /// KI 하락 충격 주입
    pub force_knock_in: bool,
    /// 경로 CSV 저장 경로 (옵션)
    pub output_path: Option<PathBuf>,
}

/// 시뮬레이션 실행
pub fn run_simulation(cli: SimulateCliConfig) -> Result<(PriceSeries, PathAssessment)> {
    cli.thresholds.validate()?;

    let mut simulation = cli.simulation;
    if cli.force_knock_in {
        let levels = cli.thresholds.levels(simulation.start_price)?;
        simulation = simulation.with_knock_in_shock(levels.knock_in);
    }

    let simulator = PathSimulator::new(simulation);
    let series = simulator.simulate()?;
    info!(
        days = simulator.config().days,
        seed = ?simulator.config().seed,
        force_knock_in = cli.force_knock_in,
        "경로 생성 완료"
    );

    let assessment =
        PathAssessment::evaluate(&series, &cli.thresholds, Some(simulator.config().start_price))?;

    if let Some(path) = &cli.output_path {
        save_series_csv(&series, path)?;
        info!("Path saved to: {}", path.display());
    }

    Ok((series, assessment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::load_series_csv;
    use barrier_analytics::PathVerdict;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn base_config() -> SimulateCliConfig {
        SimulateCliConfig {
            simulation: SimulationConfig::default()
                .with_seed(7)
                .with_days(120)
                .with_start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            thresholds: ThresholdSet::default(),
            force_knock_in: false,
            output_path: None,
        }
    }

    #[test]
    fn test_seeded_run_is_reproducible() {
        let (a, _) = run_simulation(base_config()).unwrap();
        let (b, _) = run_simulation(base_config()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 121);
    }

    #[test]
    fn test_force_knock_in_touches_barrier() {
        // 변동성 0: 충격 구간 끝에서 약 104 - 36 = 68 < KI 70
        let mut config = base_config();
        config.simulation = config.simulation.with_volatility(0.0);
        config.force_knock_in = true;
        let (_, assessment) = run_simulation(config).unwrap();
        assert!(assessment.touched_ki);
        assert!(!assessment.ki_breaches.is_empty());
        if assessment.final_price < assessment.levels.strike {
            assert_eq!(assessment.verdict, PathVerdict::CapitalLoss);
        }
    }

    #[test]
    fn test_output_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paths/sim.csv");
        let config = SimulateCliConfig {
            output_path: Some(path.clone()),
            ..base_config()
        };
        let (series, _) = run_simulation(config).unwrap();
        assert_eq!(load_series_csv(&path).unwrap(), series);
    }
}
