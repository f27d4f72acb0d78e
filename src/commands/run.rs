//! # run 命令实现
//!
//! 读取命令清单文件（每行一条 shell 命令），交给批量执行器
//! 并行执行，进程数受 --jobs 限制。
//!
//! ## 依赖关系
//! - 使用 `cli/run.rs` 定义的参数
//! - 使用 `batch/runner.rs`, `utils/output.rs`

use crate::batch::BatchRunner;
use crate::cli::run::RunArgs;
use crate::error::{CalcKitError, Result};
use crate::utils::output;
use std::fs;

/// 执行 run 命令
pub fn execute(args: RunArgs) -> Result<()> {
    output::print_header("Running Command Batch");

    let text = fs::read_to_string(&args.command_file).map_err(|e| CalcKitError::FileReadError {
        path: args.command_file.display().to_string(),
        source: e,
    })?;
    let commands = parse_command_lines(&text);

    if commands.is_empty() {
        output::print_warning("Command file contains no runnable commands.");
        return Ok(());
    }

    let runner = BatchRunner::new(args.jobs).show_progress(true);
    output::print_info(&format!(
        "Running {} commands on up to {} processes...",
        commands.len(),
        runner.n_cores()
    ));

    let results = runner.run_commands(&commands)?;

    for result in &results {
        output::print_success(&format!(
            "{} ({:.1}s)",
            result.command,
            result.elapsed.as_secs_f64()
        ));
    }
    output::print_done(&format!("{} commands finished", results.len()));
    Ok(())
}

/// 过滤空行与 '#' 注释行
fn parse_command_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
