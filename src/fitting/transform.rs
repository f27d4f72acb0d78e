//! # 系数变换
//!
//! 把优化器的原始向量映射为后端使用的系数向量。
//! 固定前缀变换要求被固定的值位于向量头部；归一化变换
//! 在给定指数集下缩放系数使 ⟨φ|φ⟩ = 1。

use crate::error::{CalcKitError, Result};
use crate::models::{s_overlap_at_sep, BasisFunction, GauPrim};

/// 原始优化向量 -> 后端系数向量
pub trait CoeffTransformer {
    fn transform(&self, raw: &[f64]) -> Result<Vec<f64>>;
}

/// 固定前缀：头部若干系数不参与优化，尾部来自优化器
pub struct FixedPrefixTransformer {
    fixed_prefix: Vec<f64>,
}

impl FixedPrefixTransformer {
    pub fn new(fixed_prefix: Vec<f64>) -> Self {
        FixedPrefixTransformer { fixed_prefix }
    }
}

impl CoeffTransformer for FixedPrefixTransformer {
    fn transform(&self, raw: &[f64]) -> Result<Vec<f64>> {
        let mut out = self.fixed_prefix.clone();
        out.extend_from_slice(raw);
        Ok(out)
    }
}

/// 归一化：固定指数集，缩放系数使 l=0 展开自重叠为 1
pub struct NormaliseCoeffsTransformer {
    exponents: Vec<f64>,
}

impl NormaliseCoeffsTransformer {
    pub fn new(exponents: Vec<f64>) -> Self {
        NormaliseCoeffsTransformer { exponents }
    }
}

impl CoeffTransformer for NormaliseCoeffsTransformer {
    fn transform(&self, raw: &[f64]) -> Result<Vec<f64>> {
        if raw.len() != self.exponents.len() {
            return Err(CalcKitError::InvalidArgument(format!(
                "normalise transformer expects {} coefficients, got {}",
                self.exponents.len(),
                raw.len()
            )));
        }

        let prims: Vec<GauPrim> = self
            .exponents
            .iter()
            .zip(raw)
            .map(|(&a, &c)| GauPrim::new(a, c))
            .collect();
        let f = BasisFunction::new(1, 0, prims);

        let self_overlap = s_overlap_at_sep(&f, &f, 0.0);
        if self_overlap <= 0.0 {
            return Err(CalcKitError::InvalidArgument(
                "coefficient vector has non-positive self-overlap".to_string(),
            ));
        }

        let scale = self_overlap.sqrt();
        Ok(raw.iter().map(|&c| c / scale).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gaussian_norm;

    #[test]
    fn test_fixed_prefix_prepends() {
        let t = FixedPrefixTransformer::new(vec![1.0, 2.0]);
        assert_eq!(t.transform(&[3.0, 4.0]).unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_fixed_prefix_empty_tail() {
        let t = FixedPrefixTransformer::new(vec![1.0]);
        assert_eq!(t.transform(&[]).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_normalise_gives_unit_self_overlap() {
        let exponents = vec![0.5, 2.0];
        let t = NormaliseCoeffsTransformer::new(exponents.clone());

        let coeffs = t.transform(&[0.3, 0.9]).unwrap();
        let prims: Vec<GauPrim> = exponents
            .iter()
            .zip(&coeffs)
            .map(|(&a, &c)| GauPrim::new(a, c))
            .collect();
        let f = BasisFunction::new(1, 0, prims);

        assert!((s_overlap_at_sep(&f, &f, 0.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalise_already_normalised_is_identity() {
        let a = 0.8;
        let t = NormaliseCoeffsTransformer::new(vec![a]);
        let coeffs = t.transform(&[gaussian_norm(a, 0)]).unwrap();
        assert!((coeffs[0] - gaussian_norm(a, 0)).abs() < 1e-9);
    }

    #[test]
    fn test_normalise_length_mismatch_rejected() {
        let t = NormaliseCoeffsTransformer::new(vec![0.5, 2.0]);
        assert!(t.transform(&[1.0]).is_err());
    }
}
