//! # 多体交换关联修正工作流
//!
//! 同一文件夹下的 "full" 与 "two-body" 两个计算，
//! 修正量为两者总能量之差。共用文件夹是构造期约定。

use super::{Workflow, WorkflowOutput, WorkflowValue};
use crate::calc::CalcMethod;
use crate::error::{CalcKitError, Result};
use std::rc::Rc;

pub struct ManyBodyXcWorkflow {
    full: Rc<dyn CalcMethod>,
    two_body: Rc<dyn CalcMethod>,
    output: WorkflowOutput,
}

impl ManyBodyXcWorkflow {
    /// 两个计算必须共用工作目录
    pub fn new(full: Rc<dyn CalcMethod>, two_body: Rc<dyn CalcMethod>) -> Result<Self> {
        if full.base_path().folder() != two_body.base_path().folder() {
            return Err(CalcKitError::WorkflowContract(format!(
                "many-body workflow needs a shared folder: '{}' vs '{}'",
                full.base_path().folder().display(),
                two_body.base_path().folder().display()
            )));
        }
        Ok(ManyBodyXcWorkflow {
            full,
            two_body,
            output: WorkflowOutput::new(),
        })
    }
}

impl Workflow for ManyBodyXcWorkflow {
    fn pre_run_shell_comms(&self) -> Vec<String> {
        vec![self.full.run_comm(), self.two_body.run_comm()]
    }

    fn namespace_attrs(&self) -> Vec<&'static str> {
        vec!["many_body_e0_xc"]
    }

    fn run(&mut self) -> Result<()> {
        let full = self.full.parsed_file()?;
        let two_body = self.two_body.parsed_file()?;

        self.output.set(
            "many_body_e0_xc",
            WorkflowValue::Scalar(full.energy_ev - two_body.energy_ev),
        );
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

    fn stub(folder: &str, stem: &str, energy: f64) -> Rc<dyn CalcMethod> {
        Rc::new(StubCalc::with_energy(folder, stem, energy, 2))
    }

    #[test]
    fn test_correction_is_energy_difference() {
        let mut wf =
            ManyBodyXcWorkflow::new(stub("/tmp/x", "full", 5.0), stub("/tmp/x", "two_body", 7.0))
                .unwrap();
        wf.run().unwrap();
        assert_eq!(wf.output().scalar("many_body_e0_xc"), Some(-2.0));
    }

    #[test]
    fn test_differing_folders_rejected() {
        let result =
            ManyBodyXcWorkflow::new(stub("/tmp/a", "full", 5.0), stub("/tmp/b", "two_body", 7.0));
        assert!(matches!(result, Err(CalcKitError::WorkflowContract(_))));
    }
}
