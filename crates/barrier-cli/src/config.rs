//! 환경변수 기반 설정 모듈.

use barrier_core::DEFAULT_TRADING_DAYS_PER_MONTH;

/// CLI 전역 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliSettings {
    /// 월 → 거래일 환산값
    /// 기본값: 21
    pub trading_days_per_month: usize,
    /// 보유 기간 미지정 시 기본 개월 수
    /// 기본값: 6
    pub default_months: usize,
    /// JSON 로그 출력 여부
    pub log_json: bool,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            trading_days_per_month: DEFAULT_TRADING_DAYS_PER_MONTH,
            default_months: 6,
            log_json: false,
        }
    }
}

impl CliSettings {
    /// 환경변수에서 설정 로드 (.env 포함)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            trading_days_per_month: env_var_parse(
                "BARRIER_TRADING_DAYS_PER_MONTH",
                defaults.trading_days_per_month,
            ),
            default_months: env_var_parse("BARRIER_DEFAULT_MONTHS", defaults.default_months),
            log_json: env_var_bool("BARRIER_LOG_JSON", defaults.log_json),
        }
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CliSettings::default();
        assert_eq!(settings.trading_days_per_month, 21);
        assert_eq!(settings.default_months, 6);
        assert!(!settings.log_json);
    }

    #[test]
    fn test_env_var_parse_fallback() {
        assert_eq!(env_var_parse("BARRIER_TEST_UNSET_KEY_XYZ", 42usize), 42);
        assert!(env_var_bool("BARRIER_TEST_UNSET_KEY_XYZ", true));
    }
}
