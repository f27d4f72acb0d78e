//! # Plato .out 输出解析器
//!
//! 提取总能量（Ry -> eV）、原子数与晶胞（bohr，无需转换）。
//!
//! ## 依赖关系
//! - 被 `calc/plato.rs` 使用
//! - 使用 `models/parsed_file.rs`, `utils/units.rs`

use super::{extract_value_after_colon, read_lines};
use crate::error::{CalcKitError, Result};
use crate::models::{ParsedFile, UnitCell};
use crate::utils::units::EV_PER_RYDBERG;
use std::path::Path;

/// 解析 Plato 输出文件
pub fn parse_plato_output(path: &Path) -> Result<ParsedFile> {
    let lines = read_lines(path)?;

    let mut energy_ry: Option<f64> = None;
    let mut num_atoms: Option<usize> = None;
    let mut lattice: Option<[[f64; 3]; 3]> = None;

    for (i, line) in lines.iter().enumerate() {
        if line.contains("Number of atoms") {
            num_atoms = extract_value_after_colon(line).map(|v| v as usize);
        }

        // "Cell vectors (bohr):" 后三行
        if line.contains("Cell vectors (bohr)") {
            lattice = parse_vectors(&lines[i + 1..]);
        }

        // 重复打印时保留最后一次（自洽循环逐步输出）
        if line.contains("Total energy") {
            energy_ry = extract_value_after_colon(line);
        }
    }

    let energy_ry = energy_ry.ok_or_else(|| CalcKitError::ParseError {
        format: "plato".to_string(),
        path: path.display().to_string(),
        reason: "total energy not found".to_string(),
    })?;
    let num_atoms = num_atoms.ok_or_else(|| CalcKitError::ParseError {
        format: "plato".to_string(),
        path: path.display().to_string(),
        reason: "atom count not found".to_string(),
    })?;
    let lattice = lattice.ok_or_else(|| CalcKitError::ParseError {
        format: "plato".to_string(),
        path: path.display().to_string(),
        reason: "cell vectors not found".to_string(),
    })?;

    Ok(ParsedFile::new(
        energy_ry * EV_PER_RYDBERG,
        num_atoms,
        UnitCell::new(lattice),
    ))
}

fn parse_vectors(lines: &[String]) -> Option<[[f64; 3]; 3]> {
    let mut lattice = [[0.0; 3]; 3];
    for (row, line) in lines.iter().take(3).enumerate() {
        let values: Vec<f64> = line
            .split_whitespace()
            .take(3)
            .filter_map(|s| s.parse().ok())
            .collect();
        if values.len() != 3 {
            return None;
        }
        lattice[row].copy_from_slice(&values);
    }
    Some(lattice)
}
