//! # 堆垛层错工作流
//!
//! 两种模式：
//! 1. 双结构模式：层错能 = (E_层错 − E_完美) / AB 面面积。
//! 2. γ 面扫描：位移序列 + 对应结构 + 多项式拟合；输出逐点
//!    层错能、本征层错能（窗口内原始数据取最小）、非稳层错能
//!    （拟合多项式在自己窗口内取最大）与平均相对残差
//!    （参考值为零的点跳过并相应缩减分母）。

use super::{Workflow, WorkflowOutput, WorkflowValue};
use crate::calc::CalcMethod;
use crate::error::{CalcKitError, Result};
use crate::math::polyfit::polyfit;
use std::rc::Rc;

/// 双结构模式
pub struct TwoStructureStackingFault {
    perfect: Rc<dyn CalcMethod>,
    stacked: Rc<dyn CalcMethod>,
    output: WorkflowOutput,
}

impl TwoStructureStackingFault {
    pub fn new(perfect: Rc<dyn CalcMethod>, stacked: Rc<dyn CalcMethod>) -> Self {
        TwoStructureStackingFault {
            perfect,
            stacked,
            output: WorkflowOutput::new(),
        }
    }
}

impl Workflow for TwoStructureStackingFault {
    fn pre_run_shell_comms(&self) -> Vec<String> {
        vec![self.perfect.run_comm(), self.stacked.run_comm()]
    }

    fn namespace_attrs(&self) -> Vec<&'static str> {
        vec!["stack_fault_energy"]
    }

    fn run(&mut self) -> Result<()> {
        let perfect = self.perfect.parsed_file()?;
        let stacked = self.stacked.parsed_file()?;

        let area = perfect.unit_cell.ab_surface_area();
        if area <= 0.0 {
            return Err(CalcKitError::WorkflowContract(
                "stacking fault workflow needs a non-degenerate AB plane".to_string(),
            ));
        }

        let energy = (stacked.energy_ev - perfect.energy_ev) / area;
        self.output
            .set("stack_fault_energy", WorkflowValue::Scalar(energy));
        Ok(())
    }

    fn output(&self) -> &WorkflowOutput {
        &self.output
    }
}

/// γ 面扫描模式
pub struct GammaSurfaceWorkflow {
    displacements: Vec<f64>,
    calcs: Vec<Rc<dyn CalcMethod>>,
    fit_degree: usize,
    /// 本征层错能搜索窗口（位移区间）
    intrinsic_window: (f64, f64),
    /// 非稳层错能搜索窗口（位移区间）
    unstable_window: (f64, f64),
    output: WorkflowOutput,
}

impl GammaSurfaceWorkflow {
    /// 位移与结构列表必须等长；首个结构为参考（零位移）
    pub fn new(
        displacements: Vec<f64>,
        calcs: Vec<Rc<dyn CalcMethod>>,
        fit_degree: usize,
        intrinsic_window: (f64, f64),
        unstable_window: (f64, f64),
    ) -> Result<Self> {
        if displacements.len() != calcs.len() {
            return Err(CalcKitError::WorkflowContract(format!(
                "gamma surface needs matching lengths: {} displacements vs {} calcs",
                displacements.len(),
                calcs.len()
            )));
        }
        if calcs.is_empty() {
            return Err(CalcKitError::WorkflowContract(
                "gamma surface needs at least one structure".to_string(),
            ));
        }
        Ok(GammaSurfaceWorkflow {
            displacements,
            calcs,
            fit_degree,
            intrinsic_window,
            unstable_window,
            output: WorkflowOutput::new(),
        })
    }
}

impl Workflow for GammaSurfaceWorkflow {
    fn pre_run_shell_comms(&self) -> Vec<String> {
        self.calcs.iter().map(|c| c.run_comm()).collect()
    }

    fn namespace_attrs(&self) -> Vec<&'static str> {
        vec![
            "gamma_raw",
            "intrinsic_fault_energy",
            "unstable_fault_energy",
            "fit_residual",
        ]
    }

    fn run(&mut self) -> Result<()> {
        let reference = self.calcs[0].parsed_file()?;
        let area = reference.unit_cell.ab_surface_area();
        if area <= 0.0 {
            return Err(CalcKitError::WorkflowContract(
                "gamma surface needs a non-degenerate AB plane".to_string(),
            ));
        }

        let mut gammas = Vec::with_capacity(self.calcs.len());
        for calc in &self.calcs {
            let parsed = calc.parsed_file()?;
            gammas.push((parsed.energy_ev - reference.energy_ev) / area);
        }

        let poly = polyfit(&self.displacements, &gammas, self.fit_degree)?;

        // 本征：窗口内原始数据取最小，窗口外的点忽略
        let (lo, hi) = self.intrinsic_window;
        let intrinsic = self
            .displacements
            .iter()
            .zip(&gammas)
            .filter(|(&d, _)| d >= lo && d <= hi)
            .map(|(_, &g)| g)
            .fold(f64::INFINITY, f64::min);
        if !intrinsic.is_finite() {
            return Err(CalcKitError::WorkflowContract(
                "no displacement falls inside the intrinsic search window".to_string(),
            ));
        }

        // 非稳：拟合多项式在自己的窗口内采样取最大
        let (ulo, uhi) = self.unstable_window;
        let (_, unstable) = poly.max_on_interval(ulo, uhi, 1000);

        let fit_values: Vec<f64> = self
            .displacements
            .iter()
            .map(|&d| poly.evaluate(d))
            .collect();
        let residual = mean_relative_residual(&fit_values, &gammas);

        let pairs: Vec<(f64, f64)> = self
            .displacements
            .iter()
            .cloned()
            .zip(gammas)
            .collect();
        self.output.set("gamma_raw", WorkflowValue::Pairs(pairs));
        self.output
            .set("intrinsic_fault_energy", WorkflowValue::Scalar(intrinsic));
        self.output
            .set("unstable_fault_energy", WorkflowValue::Scalar(unstable));
        self.output
            .set("fit_residual", WorkflowValue::Scalar(residual));
        Ok(())
    }

    fn output(&self) -> &WorkflowOutput {
        &self.output
    }
}

/// 平均相对残差；参考值为零的点跳过且分母减一
pub fn mean_relative_residual(fit: &[f64], reference: &[f64]) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for (&f, &r) in fit.iter().zip(reference) {
        if r == 0.0 {
            continue;
        }
        total += ((f - r) / r).abs();
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::StubCalc;
    use super::*;
    use crate::models::{ParsedFile, UnitCell};

    fn slab_stub(stem: &str, energy: f64) -> Rc<dyn CalcMethod> {
        // AB 面面积 = 2
        let cell = UnitCell::new([[2.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 20.0]]);
        Rc::new(StubCalc::new(
            "/tmp/sf",
            stem,
            ParsedFile::new(energy, 4, cell),
        ))
    }

    #[test]
    fn test_two_structure_energy_per_area() {
        let mut wf = TwoStructureStackingFault::new(slab_stub("perfect", 2.0), slab_stub("stack", 4.0));
        wf.run().unwrap();
        assert_eq!(wf.output().scalar("stack_fault_energy"), Some(1.0));
    }

    #[test]
    fn test_gamma_surface_sweep() {
        // γ(d) = 2 d (1 − d)，面积 2，故 E(d) = 4 d (1 − d) + E_ref
        let disps = vec![0.0, 0.25, 0.5, 0.75, 1.0];
        let calcs: Vec<Rc<dyn CalcMethod>> = disps
            .iter()
            .enumerate()
            .map(|(i, &d)| slab_stub(&format!("d{}", i), 4.0 * d * (1.0 - d)))
            .collect();

        let mut wf = GammaSurfaceWorkflow::new(
            disps,
            calcs,
            2,
            (0.8, 1.2),
            (0.2, 0.8),
        )
        .unwrap();
        wf.run().unwrap();

        // 本征：窗口 [0.8, 1.2] 内只有 d = 1.0，γ = 0
        assert!(wf.output().scalar("intrinsic_fault_energy").unwrap().abs() < 1e-9);
        // 非稳：抛物线顶点 d = 0.5，γ = 0.5
        assert!((wf.output().scalar("unstable_fault_energy").unwrap() - 0.5).abs() < 1e-3);
        // 二次数据二次拟合，残差为零
        assert!(wf.output().scalar("fit_residual").unwrap() < 1e-9);

        let raw = wf.output().get("gamma_raw").unwrap().as_pairs().unwrap();
        assert_eq!(raw.len(), 5);
        assert!((raw[2].1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let result = GammaSurfaceWorkflow::new(
            vec![0.0, 0.5],
            vec![slab_stub("a", 0.0)],
            2,
            (0.0, 1.0),
            (0.0, 1.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_residual_zero_for_exact_fit() {
        let residual = mean_relative_residual(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_eq!(residual, 0.0);
    }

    #[test]
    fn test_residual_skips_zero_reference_with_divisor_reduction() {
        // 非零点残差 0.5 与 0.25，零参考点跳过，分母为 2
        let residual = mean_relative_residual(&[1.5, 5.0, 2.5], &[1.0, 0.0, 2.0]);
        assert!((residual - 0.375).abs() < 1e-12);
    }
}
