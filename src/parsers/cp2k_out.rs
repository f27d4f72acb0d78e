//! # CP2K .cpout 输出解析器
//!
//! 提取总能量（hartree -> eV）、原子数、晶胞（Å -> bohr）、
//! SCF 收敛状态与可选的 Mulliken 电荷。
//!
//! ## 依赖关系
//! - 被 `calc/cp2k.rs` 使用
//! - 使用 `models/parsed_file.rs`, `utils/units.rs`

use super::{extract_value_after_colon, last_float, read_lines};
use crate::error::{CalcKitError, Result};
use crate::models::{ParsedFile, UnitCell};
use crate::utils::units::{angstrom_to_bohr, hartree_to_ev};
use std::path::Path;

/// 解析 CP2K 输出文件
///
/// `require_converged` 为 true 时，SCF 未收敛直接报错
/// （单点计算可由调用方显式抑制）。
pub fn parse_cp2k_output(path: &Path, require_converged: bool) -> Result<ParsedFile> {
    let lines = read_lines(path)?;

    let mut energy_hartree: Option<f64> = None;
    let mut num_atoms: Option<usize> = None;
    let mut lattice = [[0.0; 3]; 3];
    let mut lattice_rows_seen = 0;
    let mut scf_converged = true;
    let mut saw_scf_banner = false;
    let mut mulliken: Vec<f64> = Vec::new();
    let mut in_mulliken = false;

    for line in &lines {
        // "ENERGY| Total FORCE_EVAL ( QS ) energy [a.u.]:   -34.330196"
        if line.contains("ENERGY| Total FORCE_EVAL") {
            energy_hartree = extract_value_after_colon(line);
        }

        // "- Atoms:                 2"
        if line.contains("- Atoms:") {
            num_atoms = extract_value_after_colon(line).map(|v| v as usize);
        }

        // "CELL| Vector a [angstrom]:    5.000   0.000   0.000"
        if line.contains("CELL| Vector") && lattice_rows_seen < 3 {
            let values: Vec<f64> = line
                .split(':')
                .nth(1)
                .unwrap_or("")
                .split_whitespace()
                .take(3)
                .filter_map(|s| s.parse().ok())
                .collect();
            if values.len() == 3 {
                for (col, &v) in values.iter().enumerate() {
                    lattice[lattice_rows_seen][col] = angstrom_to_bohr(v);
                }
                lattice_rows_seen += 1;
            }
        }

        if line.contains("SCF run converged") {
            saw_scf_banner = true;
            scf_converged = true;
        }
        if line.contains("SCF run NOT converged") {
            saw_scf_banner = true;
            scf_converged = false;
        }

        // Mulliken 表：原子行以序号开头，净电荷在行末
        if line.contains("Mulliken Population Analysis") {
            in_mulliken = true;
            mulliken.clear();
            continue;
        }
        if in_mulliken {
            let first = line.split_whitespace().next();
            if first.map(|s| s.parse::<usize>().is_ok()) == Some(true) {
                if let Some(charge) = last_float(line) {
                    mulliken.push(charge);
                }
            } else if !mulliken.is_empty() {
                in_mulliken = false;
            }
        }
    }

    if saw_scf_banner && !scf_converged && require_converged {
        return Err(CalcKitError::ScfNotConverged {
            path: path.display().to_string(),
        });
    }

    let energy_hartree = energy_hartree.ok_or_else(|| CalcKitError::ParseError {
        format: "cp2k".to_string(),
        path: path.display().to_string(),
        reason: "FORCE_EVAL energy not found".to_string(),
    })?;
    let num_atoms = num_atoms.ok_or_else(|| CalcKitError::ParseError {
        format: "cp2k".to_string(),
        path: path.display().to_string(),
        reason: "atom count not found".to_string(),
    })?;
    if lattice_rows_seen != 3 {
        return Err(CalcKitError::ParseError {
            format: "cp2k".to_string(),
            path: path.display().to_string(),
            reason: "cell vectors not found".to_string(),
        });
    }

    let mut parsed = ParsedFile::new(
        hartree_to_ev(energy_hartree),
        num_atoms,
        UnitCell::new(lattice),
    );
    parsed.scf_converged = scf_converged;
    if !mulliken.is_empty() {
        parsed.mulliken_charges = Some(mulliken);
    }
    Ok(parsed)
}
