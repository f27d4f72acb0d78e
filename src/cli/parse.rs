//! # parse 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/parse.rs`

use clap::Args;
use std::path::PathBuf;

/// parse 子命令参数
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Backend output file to parse
    pub file: PathBuf,

    /// Accept results even if the SCF cycle did not converge
    #[arg(long, default_value_t = false)]
    pub allow_unconverged: bool,
}
