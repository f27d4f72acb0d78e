//! # CalcKit 命令行入口
//!
//! ## 子命令
//! - `parse`   - 解析单个后端输出文件
//! - `collect` - 收集目录树下已完成的计算并排名
//! - `run`     - 并行执行命令清单
//! - `basis`   - CP2K 基组文件检视 / ghost 转换

use calckit::cli::Cli;
use calckit::{commands, utils};
use clap::Parser;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
