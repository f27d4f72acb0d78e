//! # 晶胞数据模型
//!
//! 统一的晶胞表示。内部长度单位约定为 bohr；
//! 解析器负责在构造前完成 Å -> bohr 的转换。
//!
//! ## 依赖关系
//! - 被 `models/parsed_file.rs`, `creators/`, `workflows/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 晶胞（晶格向量 + 分数坐标原子）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCell {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c（单位 bohr）
    pub lattice: [[f64; 3]; 3],

    /// 元素符号列表，与 `frac_coords` 一一对应
    pub elements: Vec<String>,

    /// 分数坐标 [x, y, z]
    pub frac_coords: Vec<[f64; 3]>,
}

impl UnitCell {
    pub fn new(lattice: [[f64; 3]; 3]) -> Self {
        UnitCell {
            lattice,
            elements: Vec::new(),
            frac_coords: Vec::new(),
        }
    }

    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶胞
    /// 长度单位：bohr，角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let cos_gamma = gamma.to_radians().cos();
        let sin_gamma = gamma.to_radians().sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();
        let c_vec = [c1, c2, c3];

        UnitCell::new([a_vec, b_vec, c_vec])
    }

    /// 添加一个原子（分数坐标）
    pub fn add_atom(&mut self, element: impl Into<String>, frac: [f64; 3]) {
        self.elements.push(element.into());
        self.frac_coords.push(frac);
    }

    pub fn num_atoms(&self) -> usize {
        self.elements.len()
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let norm = |v: [f64; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        let dot = |u: [f64; 3], v: [f64; 3]| u[0] * v[0] + u[1] * v[1] + u[2] * v[2];

        let [av, bv, cv] = self.lattice;
        let (a, b, c) = (norm(av), norm(bv), norm(cv));

        let alpha = (dot(bv, cv) / (b * c)).acos().to_degrees();
        let beta = (dot(av, cv) / (a * c)).acos().to_degrees();
        let gamma = (dot(av, bv) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 晶胞体积（bohr³）
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.lattice;
        (a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0]))
            .abs()
    }

    /// AB 面（a × b 张成的面）面积，堆垛层错工作流使用
    pub fn ab_surface_area(&self) -> f64 {
        let a = self.lattice[0];
        let b = self.lattice[1];
        let cross = [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ];
        (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt()
    }

    /// 笛卡尔坐标（bohr），按原子顺序
    pub fn cart_coords(&self) -> Vec<[f64; 3]> {
        self.frac_coords
            .iter()
            .map(|f| {
                let mut cart = [0.0; 3];
                for (i, c) in cart.iter_mut().enumerate() {
                    *c = f[0] * self.lattice[0][i]
                        + f[1] * self.lattice[1][i]
                        + f[2] * self.lattice[2][i];
                }
                cart
            })
            .collect()
    }
}
