//! # Nelder-Mead 单纯形优化器
//!
//! 无约束标量目标函数最小化。目标函数求值可能失败
//! （外部计算出错），失败会立即向上传播。
//!
//! ## 依赖关系
//! - 被 `fitting/driver.rs` 使用
//! - 无外部模块依赖

use crate::error::Result;

/// 优化器参数
#[derive(Debug, Clone)]
pub struct NelderMeadOpts {
    /// 最大迭代次数
    pub max_iter: usize,
    /// 单纯形函数值散度收敛阈值
    pub ftol: f64,
    /// 单纯形参数空间尺寸收敛阈值
    pub xtol: f64,
    /// 初始单纯形步长
    pub initial_step: f64,
}

impl Default for NelderMeadOpts {
    fn default() -> Self {
        NelderMeadOpts {
            max_iter: 400,
            ftol: 1e-8,
            xtol: 1e-6,
            initial_step: 0.1,
        }
    }
}

/// 优化结果
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub best: Vec<f64>,
    pub best_value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// 最小化 f，起点 x0
pub fn nelder_mead<F>(mut f: F, x0: &[f64], opts: &NelderMeadOpts) -> Result<NelderMeadResult>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    let dim = x0.len();

    // 初始单纯形：起点 + 各坐标方向平移
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(x0.to_vec());
    for i in 0..dim {
        let mut point = x0.to_vec();
        point[i] += if point[i].abs() > 1e-12 {
            opts.initial_step * point[i].abs()
        } else {
            opts.initial_step
        };
        simplex.push(point);
    }

    let mut values: Vec<f64> = Vec::with_capacity(dim + 1);
    for point in &simplex {
        values.push(f(point)?);
    }

    const ALPHA: f64 = 1.0; // 反射
    const GAMMA: f64 = 2.0; // 扩展
    const RHO: f64 = 0.5; // 收缩
    const SIGMA: f64 = 0.5; // 整体缩小

    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..opts.max_iter {
        iterations = iter + 1;

        // 按函数值排序
        let mut order: Vec<usize> = (0..=dim).collect();
        order.sort_by(|&i, &j| {
            values[i]
                .partial_cmp(&values[j])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let reordered: Vec<Vec<f64>> = order.iter().map(|&i| simplex[i].clone()).collect();
        let reordered_vals: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        simplex = reordered;
        values = reordered_vals;

        // 函数值散度小不等于已收敛：对称跨在极小值两侧的单纯形
        // 也满足 ftol，必须同时要求参数空间尺寸收缩
        let f_spread = (values[dim] - values[0]).abs();
        let x_spread = simplex
            .iter()
            .skip(1)
            .flat_map(|point| point.iter().zip(&simplex[0]))
            .map(|(&x, &b)| (x - b).abs())
            .fold(0.0, f64::max);
        if f_spread < opts.ftol && x_spread < opts.xtol {
            converged = true;
            break;
        }

        // 除最差点外的质心
        let mut centroid = vec![0.0; dim];
        for point in simplex.iter().take(dim) {
            for (c, &x) in centroid.iter_mut().zip(point) {
                *c += x / dim as f64;
            }
        }

        let worst = simplex[dim].clone();
        let reflected: Vec<f64> = centroid
            .iter()
            .zip(&worst)
            .map(|(&c, &w)| c + ALPHA * (c - w))
            .collect();
        let f_reflected = f(&reflected)?;

        if f_reflected < values[0] {
            // 方向有利，尝试扩展
            let expanded: Vec<f64> = centroid
                .iter()
                .zip(&worst)
                .map(|(&c, &w)| c + GAMMA * ALPHA * (c - w))
                .collect();
            let f_expanded = f(&expanded)?;
            if f_expanded < f_reflected {
                simplex[dim] = expanded;
                values[dim] = f_expanded;
            } else {
                simplex[dim] = reflected;
                values[dim] = f_reflected;
            }
        } else if f_reflected < values[dim - 1] {
            simplex[dim] = reflected;
            values[dim] = f_reflected;
        } else {
            // 收缩
            let contracted: Vec<f64> = centroid
                .iter()
                .zip(&worst)
                .map(|(&c, &w)| c + RHO * (w - c))
                .collect();
            let f_contracted = f(&contracted)?;
            if f_contracted < values[dim] {
                simplex[dim] = contracted;
                values[dim] = f_contracted;
            } else {
                // 向最优点整体缩小
                let best = simplex[0].clone();
                for k in 1..=dim {
                    for (x, &b) in simplex[k].iter_mut().zip(&best) {
                        *x = b + SIGMA * (*x - b);
                    }
                    values[k] = f(&simplex[k])?;
                }
            }
        }
    }

    let best_idx = (0..=dim)
        .min_by(|&i, &j| {
            values[i]
                .partial_cmp(&values[j])
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(0);

    Ok(NelderMeadResult {
        best: simplex[best_idx].clone(),
        best_value: values[best_idx],
        iterations,
        converged,
    })
}
