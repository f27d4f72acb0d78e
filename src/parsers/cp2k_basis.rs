//! # CP2K 基组文件解析 / 序列化
//!
//! CP2K 基组文件把共享同一组指数的 primitive 组成"指数集"：
//! 集头为 `n lmin lmax nexp n_shell(lmin) ... n_shell(lmax)`，
//! 其后 nexp 行，每行一个指数加各壳层收缩系数。
//! 解析时每个 (l, 壳层) 产出一个中性模型基函数，
//! n 指标按角动量在出现顺序内递增。
//!
//! `coeffs_for_unnormalised_gaussians` 为 true 时，文件中按归一化
//! primitive 存储的系数在解析时乘全空间高斯归一化常数；
//! 序列化方向做逆变换。
//!
//! ## 依赖关系
//! - 被 `commands/basis.rs`, `fitting/updater.rs` 使用
//! - 使用 `models/basis.rs`

use crate::calc::write_text_file;
use crate::error::{CalcKitError, Result};
use crate::models::basis::gaussian_norm;
use crate::models::{BasisFunction, BasisSet, GauPrim};
use std::collections::HashMap;
use std::path::Path;

/// 解析 CP2K 基组文件（可含多个元素段）
pub fn parse_cp2k_basis_file(
    path: &Path,
    coeffs_for_unnormalised_gaussians: bool,
) -> Result<Vec<BasisSet>> {
    let text = std::fs::read_to_string(path).map_err(|e| CalcKitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_cp2k_basis_str(&text, coeffs_for_unnormalised_gaussians).map_err(|e| match e {
        CalcKitError::ParseError { format, reason, .. } => CalcKitError::ParseError {
            format,
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 解析 CP2K 基组文本
pub fn parse_cp2k_basis_str(
    text: &str,
    coeffs_for_unnormalised_gaussians: bool,
) -> Result<Vec<BasisSet>> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();

    let mut sets = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        let (set, consumed) =
            parse_element_block(&lines[cursor..], coeffs_for_unnormalised_gaussians)?;
        sets.push(set);
        cursor += consumed;
    }

    Ok(sets)
}

/// 解析单个元素段，返回 (基组, 消耗的行数)
fn parse_element_block(
    lines: &[&str],
    unnorm_coeffs: bool,
) -> Result<(BasisSet, usize)> {
    let header: Vec<&str> = lines[0].split_whitespace().collect();
    if header.len() < 2 {
        return Err(parse_err(format!("invalid element header: '{}'", lines[0])));
    }
    let mut basis = BasisSet::new(header[0], header[1]);

    let nset: usize = lines
        .get(1)
        .and_then(|l| l.split_whitespace().next())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_err("missing set count".to_string()))?;

    // 每个角动量的下一个 n 指标
    let mut next_n: HashMap<u32, u32> = HashMap::new();
    let mut cursor = 2;

    for _ in 0..nset {
        let head: Vec<usize> = lines
            .get(cursor)
            .map(|l| {
                l.split_whitespace()
                    .filter_map(|s| s.parse().ok())
                    .collect()
            })
            .unwrap_or_default();
        if head.len() < 4 {
            return Err(parse_err(format!(
                "invalid exponent-set header at line {}",
                cursor
            )));
        }
        let (lmin, lmax, nexp) = (head[1], head[2], head[3]);
        let shell_counts = &head[4..];
        if shell_counts.len() != lmax - lmin + 1 {
            return Err(parse_err(format!(
                "shell counts do not cover l = {}..{}",
                lmin, lmax
            )));
        }
        cursor += 1;

        // 读 nexp 行：指数 + 各壳层系数
        let mut exponents = Vec::with_capacity(nexp);
        let mut coeff_rows: Vec<Vec<f64>> = Vec::with_capacity(nexp);
        for _ in 0..nexp {
            let row: Vec<f64> = lines
                .get(cursor)
                .map(|l| {
                    l.split_whitespace()
                        .filter_map(|s| s.parse().ok())
                        .collect()
                })
                .unwrap_or_default();
            let n_shells: usize = shell_counts.iter().sum();
            if row.len() != n_shells + 1 {
                return Err(parse_err(format!(
                    "expected {} columns in primitive row, got {}",
                    n_shells + 1,
                    row.len()
                )));
            }
            exponents.push(row[0]);
            coeff_rows.push(row[1..].to_vec());
            cursor += 1;
        }

        // 按 (l, 壳层) 切出基函数
        let mut col = 0;
        for (l_offset, &count) in shell_counts.iter().enumerate() {
            let l = (lmin + l_offset) as u32;
            for _ in 0..count {
                let n = next_n.entry(l).or_insert(l as u32 + 1);
                let prims: Vec<GauPrim> = exponents
                    .iter()
                    .zip(&coeff_rows)
                    .map(|(&a, row)| {
                        let mut c = row[col];
                        if unnorm_coeffs {
                            c *= gaussian_norm(a, l);
                        }
                        GauPrim::new(a, c)
                    })
                    .collect();
                basis.functions.push(BasisFunction::new(*n, l, prims));
                *n += 1;
                col += 1;
            }
        }
    }

    Ok((basis, cursor))
}

/// 序列化为 CP2K 基组文本：每个基函数单独成一个指数集
pub fn write_cp2k_basis_str(sets: &[BasisSet], coeffs_for_unnormalised_gaussians: bool) -> String {
    let mut out = String::new();
    for basis in sets {
        out.push_str(&format!("{} {}\n", basis.element, basis.kind));
        out.push_str(&format!("  {}\n", basis.functions.len()));
        for func in &basis.functions {
            out.push_str(&format!(
                "  {} {} {} {} 1\n",
                func.n,
                func.l,
                func.l,
                func.prims.len()
            ));
            for prim in &func.prims {
                let coeff = if coeffs_for_unnormalised_gaussians {
                    prim.coeff / gaussian_norm(prim.exponent, func.l)
                } else {
                    prim.coeff
                };
                out.push_str(&format!("    {:18.10} {:18.10}\n", prim.exponent, coeff));
            }
        }
    }
    out
}

/// 写出 CP2K 基组文件
pub fn write_cp2k_basis_file(
    path: &Path,
    sets: &[BasisSet],
    coeffs_for_unnormalised_gaussians: bool,
) -> Result<()> {
    write_text_file(path, &write_cp2k_basis_str(sets, coeffs_for_unnormalised_gaussians))
}

fn parse_err(reason: String) -> CalcKitError {
    CalcKitError::ParseError {
        format: "cp2k-basis".to_string(),
        path: "<string>".to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 一个指数集：lmin=0 lmax=1，5 个指数，s 壳层 2 个、p 壳层 1 个
    const SAMPLE: &str = r#"
# MOLOPT basis, test fragment
Mg DZVP-MOLOPT-GTH
  1
  2 0 1 5 2 1
    2.9556954892   -0.3955578935   0.0903746792   0.0297148524
    1.1817000862   -0.1676188498  -0.0298109339   0.0956625259
    0.4528868041   0.2959557673   -0.2530478537   0.2158786651
    0.1681210688   0.6273904502   -0.1662536587   0.3763843678
    0.0587905847   0.3958606595   0.9212159918   0.4150131356
"#;

    #[test]
    fn test_parse_exponent_set_splits_by_shell() {
        let sets = parse_cp2k_basis_str(SAMPLE, false).unwrap();
        assert_eq!(sets.len(), 1);

        let basis = &sets[0];
        assert_eq!(basis.element, "Mg");
        assert_eq!(basis.kind, "DZVP-MOLOPT-GTH");
        // s 两个 + p 一个
        assert_eq!(basis.functions.len(), 3);

        let ls: Vec<u32> = basis.functions.iter().map(|f| f.l).collect();
        assert_eq!(ls, vec![0, 0, 1]);

        // n 指标按角动量递增
        let ns: Vec<u32> = basis.functions.iter().map(|f| f.n).collect();
        assert_eq!(ns, vec![1, 2, 2]);

        // 所有函数共享同一组指数
        for func in &basis.functions {
            assert_eq!(func.prims.len(), 5);
            assert!((func.prims[0].exponent - 2.9556954892).abs() < 1e-10);
        }
        assert!((basis.functions[0].prims[0].coeff - (-0.3955578935)).abs() < 1e-10);
        assert!((basis.functions[2].prims[4].coeff - 0.4150131356).abs() < 1e-10);
    }

    #[test]
    fn test_norm_convention_applied_on_parse() {
        let plain = parse_cp2k_basis_str(SAMPLE, false).unwrap();
        let scaled = parse_cp2k_basis_str(SAMPLE, true).unwrap();

        let a = plain[0].functions[0].prims[0].exponent;
        let expected = plain[0].functions[0].prims[0].coeff * gaussian_norm(a, 0);
        assert!((scaled[0].functions[0].prims[0].coeff - expected).abs() < 1e-10);
    }

    #[test]
    fn test_serialize_parse_round_trip() {
        let sets = parse_cp2k_basis_str(SAMPLE, true).unwrap();
        let text = write_cp2k_basis_str(&sets, true);
        let reparsed = parse_cp2k_basis_str(&text, true).unwrap();

        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed[0].functions.len(), sets[0].functions.len());
        for (orig, rt) in sets[0].functions.iter().zip(&reparsed[0].functions) {
            assert_eq!(orig.l, rt.l);
            for (p, q) in orig.prims.iter().zip(&rt.prims) {
                assert!((p.exponent - q.exponent).abs() < 1e-8);
                assert!((p.coeff - q.coeff).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert!(parse_cp2k_basis_str("Mg\n", false).is_err());
    }
}
