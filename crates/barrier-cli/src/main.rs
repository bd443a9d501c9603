//! 롤링 배리어 백테스트 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 6개월 보유, KI 65% 롤링 백테스트
//! barrier backtest -s data/SPY.csv --ki 65 --months 6
//!
//! # KI 후 회복 윈도우를 별도 집계
//! barrier backtest -s data/QQQ.csv --distinguish-recovered -o reports/qqq.json
//!
//! # 기준가 500의 배리어 가격
//! barrier levels -r 500 --ki 65
//!
//! # KI 충격이 들어간 시뮬레이션 경로
//! barrier simulate --seed 42 --force-ki -o paths/sim.csv
//! ```

use std::path::PathBuf;

use anyhow::Result;
use barrier_analytics::SimulationConfig;
use barrier_core::ThresholdSet;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod data;

use commands::{
    backtest::{run_backtest, BacktestCliConfig},
    levels::{compute_levels, print_levels},
    simulate::{run_simulation, SimulateCliConfig},
};
use config::CliSettings;

#[derive(Parser)]
#[command(name = "barrier")]
#[command(about = "Rolling knock-in barrier backtester - 낙인/행사가 배리어 과거 검증", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// 배리어 비율 (기준가 대비 %)
#[derive(Args, Debug, Clone, Default)]
struct ThresholdArgs {
    /// KO 비율 (기본 105)
    #[arg(long)]
    ko: Option<Decimal>,

    /// 행사가 비율 (기본 100)
    #[arg(long)]
    strike: Option<Decimal>,

    /// KI 비율 (기본 70)
    #[arg(long)]
    ki: Option<Decimal>,
}

impl ThresholdArgs {
    fn to_thresholds(&self) -> ThresholdSet {
        let mut thresholds = ThresholdSet::default();
        if let Some(ko) = self.ko {
            thresholds = thresholds.with_ko_pct(ko);
        }
        if let Some(strike) = self.strike {
            thresholds = thresholds.with_strike_pct(strike);
        }
        if let Some(ki) = self.ki {
            thresholds = thresholds.with_ki_pct(ki);
        }
        thresholds
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 과거 종가 CSV로 롤링 백테스트 실행
    Backtest {
        /// 종가 CSV 파일 (date,close), 여러 번 지정 가능
        #[arg(short, long = "series", required = true)]
        series: Vec<PathBuf>,

        /// 설정 파일 경로 (.toml / .json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        /// 보유 개월 수 (1개월 = BARRIER_TRADING_DAYS_PER_MONTH 거래일)
        #[arg(short, long, conflicts_with = "holding_days")]
        months: Option<usize>,

        /// 보유 거래일 수
        #[arg(long)]
        holding_days: Option<usize>,

        /// KI 터치 후 만기 회복 윈도우를 별도 집계
        #[arg(long, default_value = "false")]
        distinguish_recovered: bool,

        /// 결과 저장 경로 (.json: JSON, 그 외: 텍스트)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 기준가에 대한 배리어 가격 계산
    Levels {
        /// 기준가
        #[arg(short, long)]
        reference: Decimal,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },

    /// GBM 가격 경로 생성 및 배리어 판정
    Simulate {
        /// 거래일 수
        #[arg(short, long, default_value = "252")]
        days: usize,

        /// 연율 변동성
        #[arg(short, long, default_value = "0.2")]
        volatility: f64,

        /// 난수 시드
        #[arg(long)]
        seed: Option<u64>,

        /// 경로 중간에 KI 하락 충격 주입
        #[arg(long, default_value = "false")]
        force_ki: bool,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        /// 경로 CSV 저장 경로
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(settings: &CliSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 포함
    let settings = CliSettings::from_env();
    init_tracing(&settings);

    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest {
            series,
            config,
            thresholds,
            months,
            holding_days,
            distinguish_recovered,
            output,
        } => {
            let backtest_config = BacktestCliConfig {
                series_paths: series,
                config_path: config,
                ko_pct: thresholds.ko,
                strike_pct: thresholds.strike,
                ki_pct: thresholds.ki,
                months,
                holding_days,
                distinguish_recovered,
                output_path: output.clone(),
            };

            match run_backtest(backtest_config, &settings).await {
                Ok(reports) => {
                    info!(count = reports.len(), "✅ Backtest completed successfully");
                    if let Some(out) = output {
                        println!("\n📁 결과 저장됨: {}", out.display());
                    }
                }
                Err(e) => {
                    error!("Backtest failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Levels {
            reference,
            thresholds,
        } => {
            let thresholds = thresholds.to_thresholds();
            let levels = compute_levels(reference, &thresholds)?;
            print_levels(&levels, &thresholds);
        }

        Commands::Simulate {
            days,
            volatility,
            seed,
            force_ki,
            thresholds,
            output,
        } => {
            let mut simulation = SimulationConfig::default()
                .with_days(days)
                .with_volatility(volatility);
            if let Some(seed) = seed {
                simulation = simulation.with_seed(seed);
            }

            let simulate_config = SimulateCliConfig {
                simulation,
                thresholds: thresholds.to_thresholds(),
                force_knock_in: force_ki,
                output_path: output,
            };

            let (series, assessment) = run_simulation(simulate_config)?;
            if let (Some(start), Some(end)) = (series.start_date(), series.end_date()) {
                println!("\n기간: {} ~ {} ({} 거래일)", start, end, series.len());
            }
            println!("{}", assessment.summary());
        }
    }

    Ok(())
}
