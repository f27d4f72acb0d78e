//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `parse`: 解析单个后端输出文件
//! - `collect`: 收集目录树下已完成的计算并排名
//! - `run`: 并行执行命令清单
//! - `basis`: CP2K 基组文件检视 / ghost 转换
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: parse, collect, run, basis

pub mod basis;
pub mod collect;
pub mod parse;
pub mod run;

use clap::{Parser, Subcommand};

/// CalcKit - 电子结构计算编排工具箱
#[derive(Parser)]
#[command(name = "calckit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "A unified electronic-structure calculation orchestration toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a backend output file (.cpout, .castep, .out, log.lammps)
    Parse(parse::ParseArgs),

    /// Collect finished calculations under a directory tree and rank by energy
    Collect(collect::CollectArgs),

    /// Run a list of shell commands in parallel with a jobs cap
    Run(run::RunArgs),

    /// Inspect a CP2K basis file, optionally ghost-convert and re-serialize
    Basis(basis::BasisArgs),
}
