//! # 基组数据模型
//!
//! 以高斯函数和表示的中性基组模型：单个径向轨道由 (n, l) 标记，
//! 内含若干 primitive（指数 + 线性系数）。各后端的基组文件
//! 解析 / 序列化均折算到该模型（见 `parsers/cp2k_basis.rs`）。
//!
//! ## 依赖关系
//! - 被 `parsers/cp2k_basis.rs`, `creators/`, `workflows/basis_overlap.rs`,
//!   `fitting/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 单个高斯 primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GauPrim {
    /// 指数 a（bohr⁻²）
    pub exponent: f64,
    /// 线性系数 c
    pub coeff: f64,
}

impl GauPrim {
    pub fn new(exponent: f64, coeff: f64) -> Self {
        GauPrim { exponent, coeff }
    }
}

/// 径向基函数：c_i · exp(-a_i r²) 之和，(n, l) 标记
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisFunction {
    /// 主量子指标（同一 l 内按出现顺序递增）
    pub n: u32,
    /// 角动量
    pub l: u32,
    /// primitive 列表
    pub prims: Vec<GauPrim>,
}

impl BasisFunction {
    pub fn new(n: u32, l: u32, prims: Vec<GauPrim>) -> Self {
        BasisFunction { n, l, prims }
    }

    /// 在距离 r 处求值；`with_r_l` 为 true 时乘 r^l 恢复物理径向值
    pub fn evaluate(&self, r: f64, with_r_l: bool) -> f64 {
        let gau_sum: f64 = self
            .prims
            .iter()
            .map(|p| p.coeff * (-p.exponent * r * r).exp())
            .sum();

        if with_r_l {
            gau_sum * r.powi(self.l as i32)
        } else {
            gau_sum
        }
    }

    pub fn exponents(&self) -> Vec<f64> {
        self.prims.iter().map(|p| p.exponent).collect()
    }

    pub fn coeffs(&self) -> Vec<f64> {
        self.prims.iter().map(|p| p.coeff).collect()
    }

    pub fn set_coeffs(&mut self, coeffs: &[f64]) {
        for (p, &c) in self.prims.iter_mut().zip(coeffs) {
            p.coeff = c;
        }
    }
}

/// 单元素基组：若干基函数 + 显示名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisSet {
    /// 元素符号
    pub element: String,
    /// 基组名（后端文件中的 kind 标识）
    pub kind: String,
    /// 是否为 ghost 变体
    pub ghost: bool,
    /// 基函数列表
    pub functions: Vec<BasisFunction>,
}

impl BasisSet {
    pub fn new(element: impl Into<String>, kind: impl Into<String>) -> Self {
        BasisSet {
            element: element.into(),
            kind: kind.into(),
            ghost: false,
            functions: Vec::new(),
        }
    }
}

/// 生成 ghost 原子变体：element/kind 加 "_ghost" 后缀，
/// 对已是 ghost 的输入幂等
pub fn ghost_basis_set(basis: &BasisSet) -> BasisSet {
    if basis.ghost {
        return basis.clone();
    }

    let mut out = basis.clone();
    out.element = format!("{}_ghost", out.element);
    out.kind = format!("{}_ghost", out.kind);
    out.ghost = true;
    out
}

/// 基组描述符：以注册名引用基组，元素可由调用方覆盖
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisDescriptor {
    pub element: String,
    /// 基组注册名（如 "DZVP-MOLOPT-GTH"）
    pub basis_name: String,
    /// 赝势名（CP2K kind 段需要）
    pub potential_name: String,
    pub ghost: bool,
}

impl BasisDescriptor {
    pub fn new(
        element: impl Into<String>,
        basis_name: impl Into<String>,
        potential_name: impl Into<String>,
    ) -> Self {
        BasisDescriptor {
            element: element.into(),
            basis_name: basis_name.into(),
            potential_name: potential_name.into(),
            ghost: false,
        }
    }

    /// 覆盖元素，其余字段保持
    pub fn for_element(&self, element: impl Into<String>) -> Self {
        BasisDescriptor {
            element: element.into(),
            ..self.clone()
        }
    }
}

/// (2l+1)!!
fn odd_double_factorial(l: u32) -> f64 {
    (0..=l).map(|k| (2 * k + 1) as f64).product()
}

/// primitive r^l·exp(-a r²) 的全空间归一化常数
/// （径向积分含 r² 权重，球谐部分已归一）
pub fn gaussian_norm(exponent: f64, l: u32) -> f64 {
    let two_a = 2.0 * exponent;
    let n_sq = 2f64.powi(l as i32 + 2) * two_a.powf(l as f64 + 1.5)
        / (odd_double_factorial(l) * std::f64::consts::PI.sqrt());
    n_sq.sqrt()
}

/// 两个 l=0 高斯展开在间距 d 处的重叠积分。
/// 系数与 `gaussian_norm` 同约定（径向部分配归一化球谐），
/// 笛卡尔高斯积之和再乘 1/(4π) 角向因子：
/// S = (1/4π) Σ_ij c_i c_j (π/(a_i+a_j))^{3/2} · exp(-a_i a_j d²/(a_i+a_j))
pub fn s_overlap_at_sep(f: &BasisFunction, g: &BasisFunction, d: f64) -> f64 {
    let mut total = 0.0;
    for pi in &f.prims {
        for pj in &g.prims {
            let p = pi.exponent + pj.exponent;
            let prefactor = (std::f64::consts::PI / p).powf(1.5);
            let exp_term = (-pi.exponent * pj.exponent * d * d / p).exp();
            total += pi.coeff * pj.coeff * prefactor * exp_term;
        }
    }
    total / (4.0 * std::f64::consts::PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_single_gaussian() {
        let f = BasisFunction::new(1, 0, vec![GauPrim::new(0.5, 2.0)]);

        // r=0: c = 2.0
        assert!((f.evaluate(0.0, false) - 2.0).abs() < 1e-12);
        // r=1: 2 e^{-0.5}
        assert!((f.evaluate(1.0, false) - 2.0 * (-0.5f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_with_r_l() {
        let f = BasisFunction::new(1, 2, vec![GauPrim::new(1.0, 1.0)]);
        let expected = 4.0 * (-4.0f64).exp();
        assert!((f.evaluate(2.0, true) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_norm_radial_integral() {
        // 数值验证 ∫ (N r^l e^{-ar²})² r² dr = 1
        for &(a, l) in &[(0.5, 0u32), (1.3, 1), (2.1, 2)] {
            let norm = gaussian_norm(a, l);
            let dr = 1e-4_f64;
            let mut integral = 0.0;
            let mut r = dr / 2.0;
            while r < 20.0 {
                let val = norm * r.powi(l as i32) * (-a * r * r).exp();
                integral += val * val * r * r * dr;
                r += dr;
            }
            assert!((integral - 1.0).abs() < 1e-4, "a={} l={}: {}", a, l, integral);
        }
    }

    #[test]
    fn test_s_overlap_normalised_at_zero_sep() {
        // c = gaussian_norm(a, 0)（单位范数 primitive）时自重叠为 1
        for &a in &[0.5, 0.8, 2.1] {
            let c = gaussian_norm(a, 0);
            let f = BasisFunction::new(1, 0, vec![GauPrim::new(a, c)]);

            assert!((s_overlap_at_sep(&f, &f, 0.0) - 1.0).abs() < 1e-12, "a={}", a);
        }
    }

    #[test]
    fn test_s_overlap_matches_radial_integral_convention() {
        // 与 gaussian_norm 的径向积分约定一致：
        // c = (2a/π)^{3/4}（纯 3D 归一）时自重叠为 1/(4π)
        let a = 0.5;
        let c = (2.0 * a / std::f64::consts::PI).powf(0.75);
        let f = BasisFunction::new(1, 0, vec![GauPrim::new(a, c)]);

        let expected = 1.0 / (4.0 * std::f64::consts::PI);
        assert!((s_overlap_at_sep(&f, &f, 0.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_s_overlap_decays_with_separation() {
        let f = BasisFunction::new(1, 0, vec![GauPrim::new(0.8, 1.0)]);
        let near = s_overlap_at_sep(&f, &f, 0.5);
        let far = s_overlap_at_sep(&f, &f, 3.0);
        assert!(near > far);
        assert!(far > 0.0);
    }

    #[test]
    fn test_ghostify_basis() {
        let mut basis = BasisSet::new("Mg", "Mg");
        basis
            .functions
            .push(BasisFunction::new(1, 0, vec![GauPrim::new(1.0, 1.0)]));

        let ghost = ghost_basis_set(&basis);
        assert_eq!(ghost.element, "Mg_ghost");
        assert_eq!(ghost.kind, "Mg_ghost");
        assert!(ghost.ghost);
        assert_eq!(ghost.functions, basis.functions);
    }

    #[test]
    fn test_ghostify_idempotent() {
        let basis = BasisSet::new("Mg", "Mg");
        let once = ghost_basis_set(&basis);
        let twice = ghost_basis_set(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_descriptor_for_element() {
        let desc = BasisDescriptor::new("Mg", "DZVP-MOLOPT-GTH", "GTH-PBE");
        let zr = desc.for_element("Zr");
        assert_eq!(zr.element, "Zr");
        assert_eq!(zr.basis_name, "DZVP-MOLOPT-GTH");
    }
}
