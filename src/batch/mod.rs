//! # 并行批量执行模块
//!
//! 把一组 shell 命令交给有上限的 rayon 线程池并行执行，
//! 库本身不自发起后台线程。
//!
//! ## 依赖关系
//! - 被 `fitting/objective.rs`, `commands/run.rs` 使用
//! - 子模块: runner

pub mod runner;

pub use runner::{BatchResult, BatchRunner};
