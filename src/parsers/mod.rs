//! # 解析器模块
//!
//! 各后端输出文件与基组文件的解析器，统一产出
//! `models/parsed_file.rs` 读模型（能量 eV、长度 bohr）。
//!
//! ## 依赖关系
//! - 被 `calc/` 与 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: cp2k_out, castep_out, plato_out, lammps_log, cp2k_basis

pub mod castep_out;
pub mod cp2k_basis;
pub mod cp2k_out;
pub mod lammps_log;
pub mod plato_out;

use crate::error::{CalcKitError, Result};
use crate::models::ParsedFile;
use std::path::Path;

/// 从文件名约定推断后端并解析；`require_converged` 只影响
/// 有 SCF 概念的后端
pub fn parse_output_file(path: &Path, require_converged: bool) -> Result<ParsedFile> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "cpout" => cp2k_out::parse_cp2k_output(path, require_converged),
        "castep" => castep_out::parse_castep_output(path, require_converged),
        "out" => plato_out::parse_plato_output(path),
        _ => {
            if path.file_name().and_then(|n| n.to_str()) == Some("log.lammps") {
                return lammps_log::parse_lammps_log(path);
            }
            Err(CalcKitError::UnsupportedFormat(format!(
                "Cannot determine backend for: {}",
                path.display()
            )))
        }
    }
}

/// 读取文件为行向量（解析器公用）
pub(crate) fn read_lines(path: &Path) -> Result<Vec<String>> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let file = File::open(path).map_err(|e| CalcKitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(BufReader::new(file)
        .lines()
        .filter_map(|l| l.ok())
        .collect())
}

/// 提取等号后的数值
pub(crate) fn extract_value_after_eq(s: &str) -> Option<f64> {
    let pos = s.find('=')?;
    s[pos + 1..].trim().split_whitespace().next()?.parse().ok()
}

/// 提取冒号后的数值
pub(crate) fn extract_value_after_colon(s: &str) -> Option<f64> {
    let pos = s.rfind(':')?;
    s[pos + 1..].trim().split_whitespace().next()?.parse().ok()
}

/// 行末数值
pub(crate) fn last_float(s: &str) -> Option<f64> {
    s.split_whitespace().last()?.parse().ok()
}
