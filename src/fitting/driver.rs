//! # 拟合驱动
//!
//! 把目标函数交给单纯形优化器循环求值。优化开始前向更新器
//! 挂一个记录观察者，优化结束后把最优向量再推送一次，
//! 记录到的即最终变换后系数。

use super::objective::ObjectiveFunction;
use super::updater::CoeffRecorder;
use crate::error::Result;
use crate::math::{nelder_mead, NelderMeadOpts};

/// 拟合结果
#[derive(Debug, Clone)]
pub struct BasisFitResult {
    /// 最优原始向量（优化器空间）
    pub best_raw: Vec<f64>,
    /// 最优目标值
    pub best_value: f64,
    /// 变换后的最终系数
    pub final_coeffs: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// 基组拟合驱动
pub struct BasisFitDriver {
    objective: ObjectiveFunction,
    opts: NelderMeadOpts,
}

impl BasisFitDriver {
    pub fn new(objective: ObjectiveFunction) -> Self {
        BasisFitDriver {
            objective,
            opts: NelderMeadOpts::default(),
        }
    }

    pub fn with_opts(mut self, opts: NelderMeadOpts) -> Self {
        self.opts = opts;
        self
    }

    /// 从 x0 出发最小化目标函数
    pub fn optimize(mut self, x0: &[f64]) -> Result<BasisFitResult> {
        let recorder = CoeffRecorder::new();
        let handle = recorder.handle();
        self.objective.updater_mut().add_observer(Box::new(recorder));

        let objective = &mut self.objective;
        let result = nelder_mead(|x| objective.evaluate(x), x0, &self.opts)?;

        // 最优向量可能不是最后一次求值的向量，补推一次
        self.objective.evaluate(&result.best)?;

        let final_coeffs = handle
            .borrow()
            .clone()
            .unwrap_or_else(|| result.best.clone());

        Ok(BasisFitResult {
            best_raw: result.best,
            best_value: result.best_value,
            final_coeffs,
            iterations: result.iterations,
            converged: result.converged,
        })
    }
}
