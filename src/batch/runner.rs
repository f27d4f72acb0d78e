//! # 批量命令执行器
//!
//! 每条命令经 `sh -c` 启动一个子进程，rayon 线程池限制同时
//! 在跑的进程数。任一命令退出码非零即整体失败，stderr
//! 附在错误里。可选进度条。

use crate::error::{CalcKitError, Result};
use crate::utils::progress::create_progress_bar;
use rayon::prelude::*;
use std::process::Command;
use std::time::{Duration, Instant};

/// 单条命令的执行结果
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub command: String,
    pub stdout: String,
    pub elapsed: Duration,
}

/// 并行批量执行器
pub struct BatchRunner {
    n_cores: usize,
    show_progress: bool,
}

impl BatchRunner {
    /// n_cores 为 0 时取机器逻辑核数
    pub fn new(n_cores: usize) -> Self {
        let n_cores = if n_cores == 0 {
            num_cpus::get()
        } else {
            n_cores
        };
        BatchRunner {
            n_cores,
            show_progress: false,
        }
    }

    pub fn show_progress(mut self, on: bool) -> Self {
        self.show_progress = on;
        self
    }

    pub fn n_cores(&self) -> usize {
        self.n_cores
    }

    /// 并行执行命令列表，结果按输入顺序返回
    pub fn run_commands(&self, commands: &[String]) -> Result<Vec<BatchResult>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }

        let bar = if self.show_progress {
            Some(create_progress_bar(commands.len() as u64, "running"))
        } else {
            None
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.n_cores)
            .build()
            .map_err(|e| CalcKitError::Other(format!("thread pool setup failed: {}", e)))?;

        let results: Result<Vec<BatchResult>> = pool.install(|| {
            commands
                .par_iter()
                .map(|cmd| {
                    let result = run_single(cmd);
                    if let Some(bar) = &bar {
                        bar.inc(1);
                    }
                    result
                })
                .collect()
        });

        if let Some(bar) = &bar {
            bar.finish_and_clear();
        }
        results
    }
}

fn run_single(command: &str) -> Result<BatchResult> {
    let start = Instant::now();
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .map_err(|e| CalcKitError::CommandFailed {
            command: command.to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CalcKitError::CommandFailed {
            command: command.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(BatchResult {
        command: command.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_preserve_input_order() {
        let runner = BatchRunner::new(2);
        let commands = vec![
            "echo first".to_string(),
            "echo second".to_string(),
            "echo third".to_string(),
        ];

        let results = runner.run_commands(&commands).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].stdout.trim(), "first");
        assert_eq!(results[2].stdout.trim(), "third");
    }

    #[test]
    fn test_failed_command_reports_stderr() {
        let runner = BatchRunner::new(1);
        let commands = vec!["echo oops >&2; exit 3".to_string()];

        let err = runner.run_commands(&commands).unwrap_err();
        match err {
            CalcKitError::CommandFailed { stderr, .. } => assert!(stderr.contains("oops")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_command_list() {
        let runner = BatchRunner::new(1);
        assert!(runner.run_commands(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_zero_cores_falls_back_to_machine_count() {
        assert!(BatchRunner::new(0).n_cores() >= 1);
    }
}
