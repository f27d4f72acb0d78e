//! # CASTEP .castep 输出解析器
//!
//! 解析 CASTEP 输出文件，提取最终能量、原子数与晶格，
//! 折算为统一单位（eV / bohr）。
//!
//! ## 依赖关系
//! - 被 `calc/castep.rs` 使用
//! - 使用 `models/parsed_file.rs`, `utils/units.rs`

use super::{extract_value_after_eq, read_lines};
use crate::error::{CalcKitError, Result};
use crate::models::{ParsedFile, UnitCell};
use crate::utils::units::angstrom_to_bohr;
use std::path::Path;

/// 解析 CASTEP .castep 输出文件
///
/// `require_converged` 为 true 时，SCF 未达基态直接报错。
pub fn parse_castep_output(path: &Path, require_converged: bool) -> Result<ParsedFile> {
    let lines = read_lines(path)?;

    let mut final_energy: Option<f64> = None;
    let mut num_atoms: Option<usize> = None;
    let mut lattice: Option<[[f64; 3]; 3]> = None;
    let mut scf_converged = true;

    // 从后往前查找最终能量（几何优化会打印多次）
    for line in lines.iter().rev() {
        if line.contains("Final energy, E") && final_energy.is_none() {
            final_energy = extract_value_after_eq(line);
        }
        if line.contains("Final energy =") && final_energy.is_none() {
            final_energy = extract_value_after_eq(line);
        }
    }

    // 从前往后查找原子数、晶格与 SCF 警告
    for (i, line) in lines.iter().enumerate() {
        if line.contains("Total number of ions in cell") {
            if let Some(val) = extract_value_after_eq(line) {
                num_atoms = Some(val as usize);
            }
        }

        // "Real Lattice(A)" 后三行为晶格向量（Å）；几何优化会重复打印，保留最新
        if line.contains("Real Lattice(A)") {
            lattice = parse_lattice_block(&lines[i + 1..]);
        }

        if line.contains("not reached the groundstate") {
            scf_converged = false;
        }
    }

    if !scf_converged && require_converged {
        return Err(CalcKitError::ScfNotConverged {
            path: path.display().to_string(),
        });
    }

    let energy_ev = final_energy.ok_or_else(|| CalcKitError::ParseError {
        format: "castep".to_string(),
        path: path.display().to_string(),
        reason: "final energy not found".to_string(),
    })?;
    let num_atoms = num_atoms.ok_or_else(|| CalcKitError::ParseError {
        format: "castep".to_string(),
        path: path.display().to_string(),
        reason: "ion count not found".to_string(),
    })?;
    let lattice = lattice.ok_or_else(|| CalcKitError::ParseError {
        format: "castep".to_string(),
        path: path.display().to_string(),
        reason: "real lattice block not found".to_string(),
    })?;

    let mut parsed = ParsedFile::new(energy_ev, num_atoms, UnitCell::new(lattice));
    parsed.scf_converged = scf_converged;
    Ok(parsed)
}

/// 读取三行晶格向量，每行取前三个浮点数并转 bohr
fn parse_lattice_block(lines: &[String]) -> Option<[[f64; 3]; 3]> {
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
        for (col, &v) in values.iter().enumerate() {
            lattice[row][col] = angstrom_to_bohr(v);
        }
    }
    Some(lattice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::units::BOHR_PER_ANGSTROM;
    use std::io::Write;

    const SAMPLE: &str = r#"
                        Real Lattice(A)              Reciprocal Lattice(1/A)
   5.0000000   0.0000000   0.0000000        1.2566371  -0.0000000   0.0000000
   0.0000000   5.0000000   0.0000000       -0.0000000   1.2566371   0.0000000
   0.0000000   0.0000000   5.0000000        0.0000000  -0.0000000   1.2566371

                Total number of ions in cell =    2

Final energy, E             =  -1234.56789012     eV

Total time          =     12.34 s
"#;

    fn write_sample(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_energy_atoms_lattice() {
        let path = write_sample("calckit_test_castep_ok.castep", SAMPLE);
        let parsed = parse_castep_output(&path, true).unwrap();
        std::fs::remove_file(&path).ok();

        assert!((parsed.energy_ev - (-1234.56789012)).abs() < 1e-8);
        assert_eq!(parsed.num_atoms, 2);
        assert!(parsed.scf_converged);

        let (a, _, _, _, _, _) = parsed.unit_cell.parameters();
        assert!((a - 5.0 * BOHR_PER_ANGSTROM).abs() < 1e-6);
    }

    #[test]
    fn test_unconverged_scf_raises() {
        let content = format!(
            "{}\n *Warning* max. number of SCF cycles performed but system has not reached the groundstate\n",
            SAMPLE
        );
        let path = write_sample("calckit_test_castep_unconv.castep", &content);

        let strict = parse_castep_output(&path, true);
        assert!(matches!(strict, Err(CalcKitError::ScfNotConverged { .. })));

        // 抑制后仍可拿到结果，但标志为未收敛
        let lenient = parse_castep_output(&path, false).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(!lenient.scf_converged);
    }

    #[test]
    fn test_missing_energy_is_parse_error() {
        let path = write_sample("calckit_test_castep_noenergy.castep", "no content here\n");
        let result = parse_castep_output(&path, true);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(CalcKitError::ParseError { .. })));
    }
}
