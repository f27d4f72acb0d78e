//! # collect 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/collect.rs`

use clap::Args;
use std::path::PathBuf;

/// collect 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Root directory containing calculation folders
    pub calc_dir: PathBuf,

    /// Number of top-ranked entries to display
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Filename for the full CSV ranking
    #[arg(long, default_value = "ranking.csv")]
    pub output: PathBuf,

    /// Include results whose SCF cycle did not converge
    #[arg(long, default_value_t = false)]
    pub allow_unconverged: bool,
}
