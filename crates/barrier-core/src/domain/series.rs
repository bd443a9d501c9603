//! 일별 종가 시계열.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 하루치 종가.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 거래일
    pub date: NaiveDate,
    /// 종가
    pub close: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: Decimal) -> Self {
        Self { date, close }
    }
}

/// 검증된 일별 종가 시계열.
///
/// 날짜는 엄격하게 증가하고 모든 종가는 0보다 큽니다.
/// 휴장일은 단순히 빠져 있으면 되며 빈 시계열도 유효합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// 시계열을 검증하여 생성합니다.
    ///
    /// # 에러
    ///
    /// - 날짜가 이전 포인트보다 같거나 이른 경우
    /// - 종가가 0 이하인 경우
    pub fn new(points: Vec<PricePoint>) -> CoreResult<Self> {
        for (i, point) in points.iter().enumerate() {
            if point.close <= Decimal::ZERO {
                return Err(CoreError::InvalidSeries(format!(
                    "{} 종가는 0보다 커야 합니다: {}",
                    point.date, point.close
                )));
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(CoreError::InvalidSeries(format!(
                    "날짜가 증가하지 않습니다: {} → {}",
                    points[i - 1].date,
                    point.date
                )));
            }
        }
        Ok(Self { points })
    }

    /// 빈 시계열
    pub fn empty() -> Self {
        Self::default()
    }

    /// 시작일부터 평일(월~금)을 순서대로 부여하여 시계열을 생성합니다.
    ///
    /// 시작일이 주말이면 다음 월요일부터 시작합니다.
    pub fn from_trading_days(start: NaiveDate, closes: &[Decimal]) -> CoreResult<Self> {
        let mut date = next_weekday(start);
        let mut points = Vec::with_capacity(closes.len());
        for &close in closes {
            points.push(PricePoint::new(date, close));
            date = next_weekday(date + Duration::days(1));
        }
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// 종가만 순서대로 반환
    pub fn closes(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.points.iter().map(|p| p.close)
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.first().map(|p| p.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.last().map(|p| p.date)
    }

    /// 날짜로 인덱스를 찾습니다 (이진 탐색).
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.points.binary_search_by_key(&date, |p| p.date).ok()
    }

    /// 최저 종가
    pub fn min_close(&self) -> Option<Decimal> {
        self.closes().min()
    }

    /// 최고 종가
    pub fn max_close(&self) -> Option<Decimal> {
        self.closes().max()
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = CoreError;

    fn try_from(points: Vec<PricePoint>) -> CoreResult<Self> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

fn next_weekday(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}
