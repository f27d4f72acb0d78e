//! # LAMMPS log.lammps 解析器
//!
//! 从 thermo 表提取末帧总能量（metal 单位即 eV）、
//! 从 box 行提取晶胞（Å -> bohr）、从 Loop 行提取原子数。
//! 经典力场无 SCF，收敛标志恒为 true。
//!
//! ## 依赖关系
//! - 被 `calc/lammps.rs` 使用
//! - 使用 `models/parsed_file.rs`, `utils/units.rs`

use super::read_lines;
use crate::error::{CalcKitError, Result};
use crate::models::{ParsedFile, UnitCell};
use crate::utils::units::angstrom_to_bohr;
use std::path::Path;

/// 解析 LAMMPS 日志文件
pub fn parse_lammps_log(path: &Path) -> Result<ParsedFile> {
    let lines = read_lines(path)?;

    let mut num_atoms: Option<usize> = None;
    let mut box_lengths: Option<[f64; 3]> = None;
    let mut toteng_col: Option<usize> = None;
    let mut last_toteng: Option<f64> = None;

    for line in &lines {
        // "  orthogonal box = (0 0 0) to (12.4 12.4 12.4)"
        if line.contains("orthogonal box =") {
            box_lengths = parse_box_lengths(line);
        }

        // "Loop time of 1.2 on 4 procs for 1000 steps with 375 atoms"
        if line.contains("Loop time of") && line.contains("atoms") {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if let Some(idx) = fields.iter().position(|&f| f == "with") {
                num_atoms = fields.get(idx + 1).and_then(|s| s.parse().ok());
            }
        }

        let fields: Vec<&str> = line.split_whitespace().collect();

        // thermo 表头定义列布局
        if fields.first() == Some(&"Step") {
            toteng_col = fields.iter().position(|&f| f == "TotEng");
            continue;
        }

        // 数据行：首列为整数步号
        if let Some(col) = toteng_col {
            if fields.first().map(|s| s.parse::<u64>().is_ok()) == Some(true) {
                if let Some(val) = fields.get(col).and_then(|s| s.parse::<f64>().ok()) {
                    last_toteng = Some(val);
                }
            }
        }
    }

    let energy_ev = last_toteng.ok_or_else(|| CalcKitError::ParseError {
        format: "lammps".to_string(),
        path: path.display().to_string(),
        reason: "TotEng column not found in thermo output".to_string(),
    })?;
    let num_atoms = num_atoms.ok_or_else(|| CalcKitError::ParseError {
        format: "lammps".to_string(),
        path: path.display().to_string(),
        reason: "atom count not found (no Loop line)".to_string(),
    })?;
    let lengths = box_lengths.ok_or_else(|| CalcKitError::ParseError {
        format: "lammps".to_string(),
        path: path.display().to_string(),
        reason: "orthogonal box line not found".to_string(),
    })?;

    let lattice = [
        [angstrom_to_bohr(lengths[0]), 0.0, 0.0],
        [0.0, angstrom_to_bohr(lengths[1]), 0.0],
        [0.0, 0.0, angstrom_to_bohr(lengths[2])],
    ];

    Ok(ParsedFile::new(energy_ev, num_atoms, UnitCell::new(lattice)))
}

/// 从 "(x0 y0 z0) to (x1 y1 z1)" 中取边长
fn parse_box_lengths(line: &str) -> Option<[f64; 3]> {
    let mut corners = Vec::new();
    for part in line.split('(').skip(1) {
        let inner = part.split(')').next()?;
        let values: Vec<f64> = inner
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        if values.len() == 3 {
            corners.push(values);
        }
    }
    if corners.len() != 2 {
        return None;
    }
    Some([
        corners[1][0] - corners[0][0],
        corners[1][1] - corners[0][1],
        corners[1][2] - corners[0][2],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::units::BOHR_PER_ANGSTROM;
    use std::io::Write;

    const SAMPLE: &str = r#"
LAMMPS (2 Aug 2023)
Created orthogonal box = (0 0 0) to (12.4 12.4 12.4)
reading atoms ...
  375 atoms

Step Temp TotEng Press Volume
0 300 -123.456 10.0 1906.624
500 295 -124.900 9.8 1906.624
1000 290 -125.000 9.7 1906.624
Loop time of 1.23 on 4 procs for 1000 steps with 375 atoms
"#;

    #[test]
    fn test_parse_last_thermo_row() {
        let path = std::env::temp_dir().join("calckit_test_log.lammps");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();

        let parsed = parse_lammps_log(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!((parsed.energy_ev - (-125.0)).abs() < 1e-9);
        assert_eq!(parsed.num_atoms, 375);
        assert!(parsed.scf_converged);

        let (a, _, _, _, _, _) = parsed.unit_cell.parameters();
        assert!((a - 12.4 * BOHR_PER_ANGSTROM).abs() < 1e-6);
    }

    #[test]
    fn test_missing_thermo_is_parse_error() {
        let path = std::env::temp_dir().join("calckit_test_log_empty.lammps");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"LAMMPS (2 Aug 2023)\n").unwrap();

        let result = parse_lammps_log(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(CalcKitError::ParseError { .. })));
    }
}
