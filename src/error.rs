//! # 统一错误处理模块
//!
//! 定义 calckit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// calckit 统一错误类型
#[derive(Error, Debug)]
pub enum CalcKitError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Output file not found: {path}")]
    OutputFileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 配置错误（creator / registry）
    // ─────────────────────────────────────────────────────────────
    #[error("Required option '{option}' is not set on {creator}")]
    RequiredOptionUnset { creator: String, option: String },

    #[error("'{name}' is already registered; pass overwrite=true to replace it")]
    DuplicateRegistration { name: String },

    #[error("No entry registered under '{name}'")]
    UnknownRegistryKey { name: String },

    // ─────────────────────────────────────────────────────────────
    // 契约违反（workflow 构造不变量）
    // ─────────────────────────────────────────────────────────────
    #[error("Workflow contract violated: {0}")]
    WorkflowContract(String),

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("SCF cycle did not converge in: {path}")]
    ScfNotConverged { path: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, CalcKitError>;
