//! # LAMMPS 计算对象
//!
//! 脚本文件 `<stem>.in`（有序 section -> 命令行列表）引用数据文件
//! `<stem>.data`（box / masses / atoms / bonds / angles 有序 section）。
//! 输出日志固定为同目录 `log.lammps`，轨迹为 `dump.lammpstrj`。
//!
//! ## 依赖关系
//! - 被 `creators/lammps.rs` 构造
//! - 使用 `parsers/lammps_log.rs` 解析输出
//! - 使用 `calc/mod.rs` 的 BasePath / CalcMethod

use super::{require_out_file, write_text_file, BasePath, CalcMethod};
use crate::error::Result;
use crate::models::ParsedFile;
use crate::parsers::lammps_log;
use std::path::PathBuf;

/// 有序 section 映射：section 名 -> 行列表
pub type SectionMap = Vec<(String, Vec<String>)>;

/// LAMMPS 计算对象
pub struct LammpsCalc {
    base_path: BasePath,
    /// 脚本 section（init, settings, fixes, dump, run）
    script: SectionMap,
    /// 数据文件 section（header, box, masses, atoms, bonds, angles）
    data: SectionMap,
    exec: String,
}

impl LammpsCalc {
    pub fn new(base_path: BasePath, script: SectionMap, data: SectionMap) -> Self {
        LammpsCalc {
            base_path,
            script,
            data,
            exec: "lmp".to_string(),
        }
    }

    pub fn with_exec(mut self, exec: impl Into<String>) -> Self {
        self.exec = exec.into();
        self
    }

    pub fn script(&self) -> &SectionMap {
        &self.script
    }

    pub fn data(&self) -> &SectionMap {
        &self.data
    }

    fn script_file_text(&self) -> String {
        let mut out = String::new();
        for (section, lines) in &self.script {
            out.push_str(&format!("# {}\n", section));
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    fn data_file_text(&self) -> String {
        let mut out = String::new();
        for (section, lines) in &self.data {
            // header 与 box 段不带标题行
            if section != "header" && section != "box" {
                out.push_str(&format!("{}\n\n", section));
            }
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    /// 轨迹文件路径（固定名）
    pub fn trajectory_path(&self) -> PathBuf {
        self.base_path.sibling("dump.lammpstrj")
    }
}

impl CalcMethod for LammpsCalc {
    fn base_path(&self) -> &BasePath {
        &self.base_path
    }

    fn write_file(&self) -> Result<()> {
        write_text_file(&self.base_path.with_ext("in"), &self.script_file_text())?;
        write_text_file(&self.base_path.with_ext("data"), &self.data_file_text())
    }

    fn run_comm(&self) -> String {
        format!(
            "cd \"{}\" && {} -in {}.in -log log.lammps",
            self.base_path.folder().display(),
            self.exec,
            self.base_path.stem(),
        )
    }

    fn out_file_path(&self) -> PathBuf {
        self.base_path.sibling("log.lammps")
    }

    fn parsed_file(&self) -> Result<ParsedFile> {
        let out = self.out_file_path();
        require_out_file(&out)?;
        lammps_log::parse_lammps_log(&out)
    }
}
