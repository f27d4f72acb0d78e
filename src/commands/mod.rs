//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `batch/`, `models/`, `utils/`
//! - 子模块: parse, collect, run, basis

pub mod basis;
pub mod collect;
pub mod parse;
pub mod run;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Parse(args) => parse::execute(args),
        Commands::Collect(args) => collect::execute(args),
        Commands::Run(args) => run::execute(args),
        Commands::Basis(args) => basis::execute(args),
    }
}
