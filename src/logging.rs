//! 로깅 초기화
//!
//! - 개발/테스트: 사람이 읽는 `env_logger` 기본 형식 (stderr)
//! - 그 외: `combined.log`에 JSON 한 줄씩 기록, 파일을 열 수 없으면 stderr
//!
//! `RUST_LOG`가 있으면 기본 필터 대신 사용됩니다.

use std::fs::OpenOptions;
use std::io::Write;

use env_logger::{Builder, Env, Target};
use serde_json::json;

use crate::config::Environment;

pub const DEFAULT_FILTER: &str = "info,actix_web=debug";
pub const LOG_FILE: &str = "combined.log";
pub const SERVICE_NAME: &str = "user-service";

pub fn init_logging(environment: Environment) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));

    if !environment.is_development() {
        builder.format(|buf, record| writeln!(buf, "{}", json_line(record)));

        match OpenOptions::new().create(true).append(true).open(LOG_FILE) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("{} 열기 실패, stderr로 기록합니다: {}", LOG_FILE, e),
        }
    }

    // 테스트 등에서 중복 초기화되면 무시
    let _ = builder.try_init();
}

/// 로그 레코드 하나를 JSON 문자열로 변환합니다.
pub fn json_line(record: &log::Record<'_>) -> String {
    json!({
        "timestamp": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        "level": record.level().as_str().to_lowercase(),
        "message": record.args().to_string(),
        "target": record.target(),
        "service": SERVICE_NAME,
    })
    .to_string()
}
