//! # 收敛性工作流
//!
//! 网格截断 / 额外轨道数 / 任意参数扫描的通用收敛工作流：
//! 每个计算对应一个收敛参数值，`run()` 从解析输出取能量
//! （可选按原子平均），按输入顺序组成 (参数值, 能量) 对。

use super::{Workflow, WorkflowOutput, WorkflowValue};
use crate::calc::CalcMethod;
use crate::error::{CalcKitError, Result};
use std::rc::Rc;

pub struct ConvergenceWorkflow {
    calcs: Vec<Rc<dyn CalcMethod>>,
    conv_values: Vec<f64>,
    per_atom: bool,
    output: WorkflowOutput,
}

impl ConvergenceWorkflow {
    /// 计算列表与参数值列表必须等长
    pub fn new(
        calcs: Vec<Rc<dyn CalcMethod>>,
        conv_values: Vec<f64>,
        per_atom: bool,
    ) -> Result<Self> {
        if calcs.len() != conv_values.len() {
            return Err(CalcKitError::WorkflowContract(format!(
                "convergence workflow needs matching lengths: {} calcs vs {} values",
                calcs.len(),
                conv_values.len()
            )));
        }
        Ok(ConvergenceWorkflow {
            calcs,
            conv_values,
            per_atom,
            output: WorkflowOutput::new(),
        })
    }
}

impl Workflow for ConvergenceWorkflow {
    fn pre_run_shell_comms(&self) -> Vec<String> {
        self.calcs.iter().map(|c| c.run_comm()).collect()
    }

    fn namespace_attrs(&self) -> Vec<&'static str> {
        vec!["conv_results"]
    }

    fn run(&mut self) -> Result<()> {
        let mut pairs = Vec::with_capacity(self.calcs.len());
        for (calc, &value) in self.calcs.iter().zip(&self.conv_values) {
            let parsed = calc.parsed_file()?;
            let energy = if self.per_atom {
                parsed.energy_per_atom()
            } else {
                parsed.energy_ev
            };
            pairs.push((value, energy));
        }
        self.output.set("conv_results", WorkflowValue::Pairs(pairs));
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

    fn stub(stem: &str, energy: f64, atoms: usize) -> Rc<dyn CalcMethod> {
        Rc::new(StubCalc::with_energy("/tmp/conv", stem, energy, atoms))
    }

    #[test]
    fn test_per_atom_conv_results_ordered() {
        let calcs = vec![
            stub("c100", -20.0, 2),
            stub("c200", -21.0, 2),
            stub("c300", -21.5, 2),
        ];
        let mut wf = ConvergenceWorkflow::new(calcs, vec![100.0, 200.0, 300.0], true).unwrap();

        assert!(wf.output().is_empty());
        wf.run().unwrap();

        let pairs = wf.output().get("conv_results").unwrap().as_pairs().unwrap();
        assert_eq!(
            pairs,
            &[(100.0, -10.0), (200.0, -10.5), (300.0, -10.75)]
        );
    }

    #[test]
    fn test_total_energy_mode() {
        let mut wf =
            ConvergenceWorkflow::new(vec![stub("c", -20.0, 2)], vec![400.0], false).unwrap();
        wf.run().unwrap();

        let pairs = wf.output().get("conv_results").unwrap().as_pairs().unwrap();
        assert_eq!(pairs, &[(400.0, -20.0)]);
    }

    #[test]
    fn test_length_mismatch_rejected_at_construction() {
        let result = ConvergenceWorkflow::new(vec![stub("c", -20.0, 2)], vec![100.0, 200.0], true);
        assert!(matches!(
            result,
            Err(CalcKitError::WorkflowContract(_))
        ));
    }

    #[test]
    fn test_namespace_complete_after_run() {
        let mut wf = ConvergenceWorkflow::new(vec![stub("c", -1.0, 1)], vec![1.0], false).unwrap();
        wf.run().unwrap();
        for name in wf.namespace_attrs() {
            assert!(wf.output().has_attr(name));
        }
    }
}
