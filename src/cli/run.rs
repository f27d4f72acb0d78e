//! # run 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/run.rs`

use clap::Args;
use std::path::PathBuf;

/// run 子命令参数
#[derive(Args, Debug)]
pub struct RunArgs {
    /// File with one shell command per line ('#' starts a comment)
    pub command_file: PathBuf,

    /// Maximum number of concurrent processes (0 = machine core count)
    #[arg(long, short = 'j', default_value_t = 0)]
    pub jobs: usize,
}
