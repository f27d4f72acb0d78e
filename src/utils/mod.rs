//! # 工具函数模块
//!
//! 提供美化输出、进度条、物理单位换算等工具。
//!
//! ## 依赖关系
//! - 被 `commands/`, `parsers/`, `batch/` 模块使用
//! - 子模块: output, progress, units

pub mod output;
pub mod progress;
pub mod units;
