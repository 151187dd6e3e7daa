// 错误处理系统
// 开发心理：核心进化计算永不失败（无效输入一律降级为无操作），
// 错误只存在于I/O边界：配置加载、状态持久化

use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CompanionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Save data error: {0}")]
    Save(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

// Result类型别名
pub type Result<T> = std::result::Result<T, CompanionError>;

impl From<io::Error> for CompanionError {
    fn from(error: io::Error) -> Self {
        CompanionError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for CompanionError {
    fn from(error: serde_json::Error) -> Self {
        CompanionError::Serialization(error.to_string())
    }
}

impl From<serde_yaml::Error> for CompanionError {
    fn from(error: serde_yaml::Error) -> Self {
        CompanionError::Config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CompanionError::Config("missing drift table".to_string());
        assert_eq!(error.to_string(), "Configuration error: missing drift table");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "state file not found");
        let error: CompanionError = io_error.into();

        match error {
            CompanionError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }
}
