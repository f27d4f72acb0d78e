//! # Plato 计算对象
//!
//! 单一输入 `<stem>.in`（扁平 token -> string 表示），输出 `<stem>.out`。
//! 运行命令随 Plato 变体（dft / tb1 / tb2）不同，由注册的
//! run-command 函数给出。
//!
//! ## 依赖关系
//! - 被 `creators/plato.rs` 构造
//! - 使用 `parsers/plato_out.rs` 解析输出
//! - 使用 `calc/mod.rs` 的 BasePath / CalcMethod

use super::{require_out_file, write_text_file, BasePath, CalcMethod};
use crate::error::Result;
use crate::models::ParsedFile;
use crate::parsers::plato_out;
use std::path::PathBuf;

/// 变体运行命令函数：BasePath -> 完整 shell 命令
pub type PlatoRunComm = fn(&BasePath) -> String;

/// dft 变体运行命令
pub fn dft_run_comm(base_path: &BasePath) -> String {
    format!(
        "cd \"{}\" && dft {} > {}.out",
        base_path.folder().display(),
        base_path.stem(),
        base_path.stem(),
    )
}

/// tb1 变体运行命令
pub fn tb1_run_comm(base_path: &BasePath) -> String {
    format!(
        "cd \"{}\" && tb1 {} > {}.out",
        base_path.folder().display(),
        base_path.stem(),
        base_path.stem(),
    )
}

/// tb2 变体运行命令
pub fn tb2_run_comm(base_path: &BasePath) -> String {
    format!(
        "cd \"{}\" && tb2 {} > {}.out",
        base_path.folder().display(),
        base_path.stem(),
        base_path.stem(),
    )
}

/// Plato 计算对象
pub struct PlatoCalc {
    base_path: BasePath,
    tokens: Vec<(String, String)>,
    run_comm_fn: PlatoRunComm,
}

impl PlatoCalc {
    pub fn new(
        base_path: BasePath,
        tokens: Vec<(String, String)>,
        run_comm_fn: PlatoRunComm,
    ) -> Self {
        PlatoCalc {
            base_path,
            tokens,
            run_comm_fn,
        }
    }

    pub fn tokens(&self) -> &[(String, String)] {
        &self.tokens
    }

    fn input_file_text(&self) -> String {
        let mut out = String::new();
        for (k, v) in &self.tokens {
            out.push_str(&format!("{}\n{}\n\n", k, v));
        }
        out
    }
}

impl CalcMethod for PlatoCalc {
    fn base_path(&self) -> &BasePath {
        &self.base_path
    }

    fn write_file(&self) -> Result<()> {
        write_text_file(&self.base_path.with_ext("in"), &self.input_file_text())
    }

    fn run_comm(&self) -> String {
        (self.run_comm_fn)(&self.base_path)
    }

    fn out_file_path(&self) -> PathBuf {
        self.base_path.with_ext("out")
    }

    fn parsed_file(&self) -> Result<ParsedFile> {
        let out = self.out_file_path();
        require_out_file(&out)?;
        plato_out::parse_plato_output(&out)
    }
}
