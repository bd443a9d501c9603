//! 에러 타입 정의.

use thiserror::Error;

/// 도메인 입력 검증 오류.
///
/// 데이터 부족(윈도우 0개)은 오류가 아니라 정상 결과이므로 여기에 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// 잘못된 가격 시계열 (날짜 역순/중복, 0 이하 가격)
    #[error("잘못된 가격 시계열: {0}")]
    InvalidSeries(String),

    /// 잘못된 파라미터 (보유 기간 0, 0 이하 비율)
    #[error("잘못된 파라미터: {0}")]
    InvalidParameters(String),
}

/// Result 타입 별칭
pub type CoreResult<T> = Result<T, CoreError>;
