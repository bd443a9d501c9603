//! 시연용 가격 경로 시뮬레이션.
//!
//! 기하 브라운 운동(GBM)으로 일별 경로를 생성합니다. 시각화/가정 분석용이며
//! 백테스트 입력을 대체하지 않습니다.
//!
//! - 시드를 지정하면 항상 같은 경로를 생성합니다.
//! - `knock_in_shock`을 지정하면 경로 중간(50% ~ 80% 구간)에 KI를 뚫는
//!   선형 하락 충격을 더합니다.

use barrier_core::{CoreError, CoreResult, PriceSeries};
use chrono::NaiveDate;
use rand::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 충격 하락폭 배수: (시작가 - KI) × 1.2
const SHOCK_DEPTH_MULTIPLIER: f64 = 1.2;

/// 경로 최저가 하한
const PRICE_FLOOR: f64 = 1.0;

/// 시뮬레이션 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 시작가
    #[serde(default = "default_start_price")]
    pub start_price: Decimal,

    /// 생성할 거래일 수 (경로 길이 = days + 1)
    #[serde(default = "default_days")]
    pub days: usize,

    /// 연율 변동성 (예: 0.2 = 20%)
    #[serde(default = "default_volatility")]
    pub volatility: f64,

    /// 연율 기대 수익률
    #[serde(default = "default_drift")]
    pub drift: f64,

    /// 난수 시드 (None이면 엔트로피 사용)
    #[serde(default)]
    pub seed: Option<u64>,

    /// KI 가격: 지정 시 경로 중간에 KI를 뚫는 하락 충격 추가
    #[serde(default)]
    pub knock_in_shock: Option<Decimal>,

    /// 첫 거래일 (기본 2000-01-03: 같은 시드면 날짜까지 동일)
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
}

fn default_start_price() -> Decimal {
    dec!(100)
}
fn default_days() -> usize {
    252
}
fn default_volatility() -> f64 {
    0.2
}
fn default_drift() -> f64 {
    0.05
}
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or_default()
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_price: default_start_price(),
            days: default_days(),
            volatility: default_volatility(),
            drift: default_drift(),
            seed: None,
            knock_in_shock: None,
            start_date: default_start_date(),
        }
    }
}

impl SimulationConfig {
    /// 시드 설정
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 거래일 수 설정
    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    /// 변동성 설정
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// 시작가 설정
    pub fn with_start_price(mut self, price: Decimal) -> Self {
        self.start_price = price;
        self
    }

    /// KI 하락 충격 설정
    pub fn with_knock_in_shock(mut self, knock_in_level: Decimal) -> Self {
        self.knock_in_shock = Some(knock_in_level);
        self
    }

    /// 첫 거래일 설정
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    /// 설정 검증
    pub fn validate(&self) -> CoreResult<()> {
        if self.days == 0 {
            return Err(CoreError::InvalidParameters(
                "시뮬레이션 일수는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.start_price <= Decimal::ZERO {
            return Err(CoreError::InvalidParameters(format!(
                "시작가는 0보다 커야 합니다: {}",
                self.start_price
            )));
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 || !self.drift.is_finite() {
            return Err(CoreError::InvalidParameters(format!(
                "변동성/기대수익률이 올바르지 않습니다: vol={}, drift={}",
                self.volatility, self.drift
            )));
        }
        Ok(())
    }
}

/// GBM 경로 생성기
pub struct PathSimulator {
    config: SimulationConfig,
}

impl PathSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 경로를 생성하여 평일 날짜가 부여된 시계열로 반환합니다.
    pub fn simulate(&self) -> CoreResult<PriceSeries> {
        self.config.validate()?;
        let closes = self.simulate_closes()?;
        PriceSeries::from_trading_days(self.config.start_date, &closes)
    }

    /// 종가 경로만 생성 (길이 = days + 1, 첫 값 = 시작가)
    pub fn simulate_closes(&self) -> CoreResult<Vec<Decimal>> {
        self.config.validate()?;
        let cfg = &self.config;
        let start = to_f64(cfg.start_price)?;

        let mut rng = match cfg.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        let dt = 1.0 / cfg.days as f64;
        let mean = (cfg.drift - 0.5 * cfg.volatility.powi(2)) * dt;
        let scale = cfg.volatility * dt.sqrt();

        let mut path = Vec::with_capacity(cfg.days + 1);
        path.push(start);
        let mut price = start;
        for _ in 0..cfg.days {
            let z: f64 = rng.sample(rand_distr::StandardNormal);
            price *= (mean + scale * z).exp();
            path.push(price);
        }

        if let Some(knock_in) = cfg.knock_in_shock {
            apply_knock_in_shock(&mut path, cfg.days, start, to_f64(knock_in)?);
        }

        debug!(
            days = cfg.days,
            seed = ?cfg.seed,
            shocked = cfg.knock_in_shock.is_some(),
            "경로 생성 완료"
        );

        path.into_iter()
            .map(|p| {
                Decimal::try_from(p.max(PRICE_FLOOR))
                    .map(|d| d.round_dp(4))
                    .map_err(|e| CoreError::InvalidSeries(format!("가격 변환 실패: {}", e)))
            })
            .collect()
    }
}

/// `[days/2, days*0.8)` 구간에 0 → -(start - ki) × 1.2 선형 하락을 더합니다.
fn apply_knock_in_shock(path: &mut [f64], days: usize, start: f64, knock_in: f64) {
    let from = days / 2;
    let to = ((days as f64 * 0.8) as usize).min(path.len());
    if to <= from {
        return;
    }
    let depth = -(start - knock_in) * SHOCK_DEPTH_MULTIPLIER;
    let steps = to - from;
    for (k, price) in path[from..to].iter_mut().enumerate() {
        let fraction = if steps > 1 {
            k as f64 / (steps - 1) as f64
        } else {
            0.0
        };
        *price += depth * fraction;
    }
}

fn to_f64(value: Decimal) -> CoreResult<f64> {
    f64::try_from(value)
        .map_err(|e| CoreError::InvalidParameters(format!("{} 변환 실패: {}", value, e)))
}
