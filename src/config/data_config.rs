//! 서버, 데이터베이스, 요청 파이프라인 설정 관리 모듈
//!
//! 실행 환경과 서버 바인딩, MongoDB 연결, 미들웨어 파이프라인에 필요한
//! 설정값을 환경 변수에서 한 번만 읽어 구조체로 보관합니다.

use std::env;
use std::str::FromStr;

/// 요청/폼 본문의 최대 크기 (10 KB)
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// 기본 HPP 화이트리스트 - 반복 지정이 허용되는 쿼리 파라미터
pub const DEFAULT_HPP_WHITELIST: &[&str] = &[
    "firstName",
    "lastName",
    "gender",
    "phone",
    "username",
    "birthDate",
    "avatar",
    "role",
    "status",
    "action",
    "requestUser",
];

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 개발 환경 - 상세한 에러 응답과 요청 로그
    Development,
    /// 테스트 환경 - 자동화된 테스트용 설정
    Test,
    /// 스테이징 환경 - 프로덕션 유사 환경
    Staging,
    /// 프로덕션 환경 - 내부 에러 정보 마스킹
    Production,
}

impl Environment {
    /// 현재 실행 환경을 감지합니다.
    ///
    /// `ENVIRONMENT` 또는 `NODE_ENV` 환경 변수를 확인하며,
    /// 설정되지 않은 경우 `Production`을 기본값으로 사용합니다.
    pub fn current() -> Self {
        let raw = env::var("ENVIRONMENT")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or_else(|_| "production".to_string());

        Self::from_str(&raw)
    }

    /// 문자열에서 Environment를 생성합니다.
    ///
    /// 알 수 없는 값인 경우 `Production`을 반환합니다.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    /// 에러 응답에 진단 정보(스택)를 포함하는 환경인지 여부
    ///
    /// 개발/테스트 환경만 상세 정보를 노출합니다.
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development | Environment::Test)
    }
}

/// 서버 바인딩 설정
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 바인딩 호스트 (기본값: "0.0.0.0")
    pub host: String,
    /// 바인딩 포트 (기본값: 8080)
    pub port: u16,
    /// actix 워커 스레드 수 (기본값: 4)
    pub workers: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 8080),
            workers: env_parse("WORKERS", 4),
        }
    }

    /// `host:port` 형태의 바인딩 주소
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// MongoDB 연결 설정
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// MongoDB 연결 URI (기본값: "mongodb://localhost:27017")
    pub uri: String,
    /// 데이터베이스 이름 (기본값: "users_ms_dev")
    pub database_name: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            uri: env_or("MONGODB_URI", "mongodb://localhost:27017"),
            database_name: env_or("DATABASE_NAME", "users_ms_dev"),
        }
    }
}

/// 요청 파이프라인(미들웨어 체인) 설정
///
/// 전역 변수 대신 애플리케이션 구성 시점에 명시적으로 전달됩니다.
///
/// # Environment Variables
///
/// * `API_VERSION_NUMBER` - 라우트 접두사 `/api/v{N}` (기본값: 1)
/// * `MAX_NUMBER_OF_REQUESTS_PER_HOUR` - IP당 시간당 최대 요청 수 (기본값: 100)
/// * `STATIC_DIR` - 정적 파일 디렉터리 (미설정 시 비활성화)
/// * `CORS_ALLOWED_ORIGINS` - 쉼표로 구분된 허용 Origin (비어 있으면 전체 허용)
/// * `HPP_WHITELIST` - 쉼표로 구분된 반복 허용 쿼리 키
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_version: u32,
    pub max_requests_per_hour: usize,
    pub body_limit_bytes: usize,
    pub static_dir: Option<String>,
    pub cors_allowed_origins: Vec<String>,
    pub hpp_whitelist: Vec<String>,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let hpp_whitelist = match env::var("HPP_WHITELIST") {
            Ok(raw) => split_list(&raw),
            Err(_) => DEFAULT_HPP_WHITELIST.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            api_version: env_parse("API_VERSION_NUMBER", 1),
            max_requests_per_hour: env_parse("MAX_NUMBER_OF_REQUESTS_PER_HOUR", 100),
            body_limit_bytes: MAX_BODY_BYTES,
            static_dir: env::var("STATIC_DIR").ok().filter(|s| !s.trim().is_empty()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            hpp_whitelist,
        }
    }

    /// 버전이 포함된 API 경로 접두사 (`/v1` 형태, `/api` 스코프 내부 기준)
    pub fn version_prefix(&self) -> String {
        format!("/v{}", self.api_version)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_version: 1,
            max_requests_per_hour: 100,
            body_limit_bytes: MAX_BODY_BYTES,
            static_dir: None,
            cors_allowed_origins: Vec::new(),
            hpp_whitelist: DEFAULT_HPP_WHITELIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// 환경 변수를 읽고 없으면 기본값을 사용합니다.
pub(crate) fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// 환경 변수를 파싱하고 실패하면 기본값을 사용합니다.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            log::error!("{} 파싱 실패: {:?}. 기본값 {} 사용", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// 쉼표로 구분된 목록을 정리된 문자열 벡터로 변환합니다.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
