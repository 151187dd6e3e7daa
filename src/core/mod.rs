// 核心基础设施：错误类型与配置

pub mod config;
pub mod error;

pub use self::config::CompanionConfig;
pub use self::error::{CompanionError, Result};
