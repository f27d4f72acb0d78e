//! # basis 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/basis.rs`

use clap::Args;
use std::path::PathBuf;

/// basis 子命令参数
#[derive(Args, Debug)]
pub struct BasisArgs {
    /// CP2K basis set file to inspect
    pub file: PathBuf,

    /// Stored coefficients refer to unnormalised Gaussians
    #[arg(long, default_value_t = false)]
    pub unnormalised: bool,

    /// Write ghost-converted basis sets to this file
    #[arg(long)]
    pub ghost_output: Option<PathBuf>,
}
