//! # 状态方程工作流
//!
//! N 个不同体积的计算 + 可插拔拟合函数。`run()` 收集每原子
//! 体积与每原子能量（保持输入顺序），交给拟合函数，结果挂在
//! `eos_fit` 属性下。附带一个基于二次多项式的内置拟合器供
//! 命令行使用。

use super::{Workflow, WorkflowOutput, WorkflowValue};
use crate::calc::CalcMethod;
use crate::error::{CalcKitError, Result};
use crate::math::polyfit::polyfit;
use std::rc::Rc;

/// 拟合结果：平衡点与体模量
#[derive(Debug, Clone, PartialEq)]
pub struct EosFitResult {
    /// 平衡每原子体积 (bohr³)
    pub v0_bohr3: f64,
    /// 平衡每原子能量 (eV)
    pub e0_ev: f64,
    /// 体模量 (eV/bohr³)
    pub bulk_modulus_ev_bohr3: f64,
}

/// 拟合函数：(每原子体积, 每原子能量) -> 拟合结果
pub type EosFitter = Box<dyn Fn(&[f64], &[f64]) -> Result<EosFitResult>>;

/// 内置拟合器：E(V) 二次拟合，V0 取极小值点，B = V0 · E''(V0)
pub fn quadratic_eos_fitter() -> EosFitter {
    Box::new(|volumes: &[f64], energies: &[f64]| {
        let poly = polyfit(volumes, energies, 2)?;
        let c1 = poly.coeffs[1];
        let c2 = poly.coeffs[2];
        if c2 <= 0.0 {
            return Err(CalcKitError::InvalidArgument(
                "EOS quadratic fit has no minimum".to_string(),
            ));
        }
        let v0 = -c1 / (2.0 * c2);
        Ok(EosFitResult {
            v0_bohr3: v0,
            e0_ev: poly.evaluate(v0),
            bulk_modulus_ev_bohr3: v0 * 2.0 * c2,
        })
    })
}

pub struct EosWorkflow {
    calcs: Vec<Rc<dyn CalcMethod>>,
    fitter: EosFitter,
    output: WorkflowOutput,
}

impl EosWorkflow {
    pub fn new(calcs: Vec<Rc<dyn CalcMethod>>, fitter: EosFitter) -> Self {
        EosWorkflow {
            calcs,
            fitter,
            output: WorkflowOutput::new(),
        }
    }
}

impl Workflow for EosWorkflow {
    fn pre_run_shell_comms(&self) -> Vec<String> {
        self.calcs.iter().map(|c| c.run_comm()).collect()
    }

    fn namespace_attrs(&self) -> Vec<&'static str> {
        vec!["eos_fit"]
    }

    fn run(&mut self) -> Result<()> {
        let mut volumes = Vec::with_capacity(self.calcs.len());
        let mut energies = Vec::with_capacity(self.calcs.len());
        for calc in &self.calcs {
            let parsed = calc.parsed_file()?;
            volumes.push(parsed.volume_per_atom());
            energies.push(parsed.energy_per_atom());
        }

        let fit = (self.fitter)(&volumes, &energies)?;
        self.output.set("eos_fit", WorkflowValue::Eos(fit));
        Ok(())
    }

    fn output(&self) -> &WorkflowOutput {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::StubCalc;
    use super::*;
    use crate::models::{ParsedFile, UnitCell};
    use std::cell::RefCell;

    fn cubic_stub(stem: &str, a: f64, energy: f64, atoms: usize) -> Rc<dyn CalcMethod> {
        let cell = UnitCell::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]);
        Rc::new(StubCalc::new(
            "/tmp/eos",
            stem,
            ParsedFile::new(energy, atoms, cell),
        ))
    }

    #[test]
    fn test_per_atom_inputs_reach_fitter() {
        // (体积, 能量, 原子数) = (20, 40, 2) 与 (40, 20, 4)
        let calcs = vec![
            cubic_stub("v20", 20f64.cbrt(), 40.0, 2),
            cubic_stub("v40", 40f64.cbrt(), 20.0, 4),
        ];

        let seen: Rc<RefCell<Vec<(f64, f64)>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_in_fitter = Rc::clone(&seen);
        let marker = EosFitResult {
            v0_bohr3: 1.0,
            e0_ev: 2.0,
            bulk_modulus_ev_bohr3: 3.0,
        };
        let marker_out = marker.clone();
        let fitter: EosFitter = Box::new(move |vs, es| {
            for (&v, &e) in vs.iter().zip(es) {
                seen_in_fitter.borrow_mut().push((v, e));
            }
            Ok(marker_out.clone())
        });

        let mut wf = EosWorkflow::new(calcs, fitter);
        wf.run().unwrap();

        let inputs = seen.borrow();
        assert!((inputs[0].0 - 10.0).abs() < 1e-9);
        assert!((inputs[0].1 - 20.0).abs() < 1e-9);
        assert!((inputs[1].0 - 10.0).abs() < 1e-9);
        assert!((inputs[1].1 - 5.0).abs() < 1e-9);

        assert_eq!(
            wf.output().get("eos_fit"),
            Some(&WorkflowValue::Eos(marker))
        );
    }

    #[test]
    fn test_quadratic_fitter_recovers_parabola() {
        // E(V) = 0.5 (V - 12)² - 3
        let volumes: [f64; 5] = [8.0, 10.0, 12.0, 14.0, 16.0];
        let energies: Vec<f64> = volumes.iter().map(|v| 0.5 * (v - 12.0).powi(2) - 3.0).collect();

        let fit = quadratic_eos_fitter()(&volumes, &energies).unwrap();
        assert!((fit.v0_bohr3 - 12.0).abs() < 1e-6);
        assert!((fit.e0_ev - (-3.0)).abs() < 1e-6);
        assert!((fit.bulk_modulus_ev_bohr3 - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_quadratic_fitter_rejects_concave_data() {
        let volumes = [1.0, 2.0, 3.0];
        let energies = [0.0, 1.0, 0.0];
        assert!(quadratic_eos_fitter()(&volumes, &energies).is_err());
    }
}
