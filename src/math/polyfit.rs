//! # 多项式最小二乘拟合
//!
//! 正规方程 + 高斯消元求解低阶多项式拟合，
//! 供 γ 面堆垛层错工作流与二次 EOS 拟合使用。
//!
//! ## 依赖关系
//! - 被 `workflows/stacking.rs`, `workflows/eos.rs` 使用
//! - 无外部模块依赖

use crate::error::{CalcKitError, Result};

/// 多项式，系数按幂次升序：c0 + c1 x + c2 x² + ...
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    pub coeffs: Vec<f64>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<f64>) -> Self {
        Polynomial { coeffs }
    }

    /// Horner 求值
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    /// 在 [lo, hi] 上均匀采样求最大值，返回 (x, y)
    pub fn max_on_interval(&self, lo: f64, hi: f64, n_samples: usize) -> (f64, f64) {
        let mut best = (lo, self.evaluate(lo));
        for i in 0..=n_samples {
            let x = lo + (hi - lo) * i as f64 / n_samples as f64;
            let y = self.evaluate(x);
            if y > best.1 {
                best = (x, y);
            }
        }
        best
    }
}

/// degree 阶多项式最小二乘拟合
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Polynomial> {
    if xs.len() != ys.len() {
        return Err(CalcKitError::InvalidArgument(format!(
            "polyfit: {} x-values vs {} y-values",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() <= degree {
        return Err(CalcKitError::InvalidArgument(format!(
            "polyfit: need more than {} points for degree {}",
            degree, degree
        )));
    }

    let n = degree + 1;

    // 正规方程 A^T A c = A^T y
    let mut ata = vec![vec![0.0; n]; n];
    let mut aty = vec![0.0; n];
    for (&x, &y) in xs.iter().zip(ys) {
        let mut powers = vec![1.0; 2 * degree + 1];
        for k in 1..powers.len() {
            powers[k] = powers[k - 1] * x;
        }
        for (i, row) in ata.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry += powers[i + j];
            }
            aty[i] += powers[i] * y;
        }
    }

    solve_linear(&mut ata, &mut aty)?;
    Ok(Polynomial::new(aty))
}

/// 带部分主元的高斯消元，解写回 rhs
fn solve_linear(a: &mut [Vec<f64>], rhs: &mut [f64]) -> Result<()> {
    let n = rhs.len();

    for col in 0..n {
        // 选主元
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-14 {
            return Err(CalcKitError::Other(
                "polyfit: singular normal equations".to_string(),
            ));
        }
        a.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // 回代
    for col in (0..n).rev() {
        let mut sum = rhs[col];
        for k in (col + 1)..n {
            sum -= a[col][k] * rhs[k];
        }
        rhs[col] = sum / a[col][col];
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_exact_quadratic() {
        // y = 1 + 2x + 3x²
        let xs: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 1.0 + 2.0 * x + 3.0 * x * x).collect();

        let poly = polyfit(&xs, &ys, 2).unwrap();
        assert!((poly.coeffs[0] - 1.0).abs() < 1e-8);
        assert!((poly.coeffs[1] - 2.0).abs() < 1e-8);
        assert!((poly.coeffs[2] - 3.0).abs() < 1e-8);
    }

    #[test]
    fn test_evaluate_horner() {
        let poly = Polynomial::new(vec![1.0, -1.0, 2.0]);
        // 1 - 2 + 8 = 7
        assert!((poly.evaluate(2.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_on_interval() {
        // -(x-1)² + 4 的最大值在 x=1
        let poly = Polynomial::new(vec![3.0, 2.0, -1.0]);
        let (x, y) = poly.max_on_interval(0.0, 2.0, 1000);
        assert!((x - 1.0).abs() < 1e-2);
        assert!((y - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        assert!(polyfit(&[1.0, 2.0], &[1.0], 1).is_err());
    }

    #[test]
    fn test_underdetermined_rejected() {
        assert!(polyfit(&[1.0, 2.0], &[1.0, 2.0], 2).is_err());
    }
}
