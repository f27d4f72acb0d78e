//! # 基函数重叠工作流
//!
//! 给定间距处高斯展开基函数的自重叠。目前只支持 l = 0 的
//! 单一 r 幂次展开，限制在 `run()` 处检查。

use super::{Workflow, WorkflowOutput, WorkflowValue};
use crate::error::{CalcKitError, Result};
use crate::models::{s_overlap_at_sep, BasisFunction};

pub struct BasisOverlapWorkflow {
    function: BasisFunction,
    separation_bohr: f64,
    output: WorkflowOutput,
}

impl BasisOverlapWorkflow {
    pub fn new(function: BasisFunction, separation_bohr: f64) -> Self {
        BasisOverlapWorkflow {
            function,
            separation_bohr,
            output: WorkflowOutput::new(),
        }
    }
}

impl Workflow for BasisOverlapWorkflow {
    fn pre_run_shell_comms(&self) -> Vec<String> {
        Vec::new()
    }

    fn namespace_attrs(&self) -> Vec<&'static str> {
        vec!["overlap"]
    }

    fn run(&mut self) -> Result<()> {
        if self.function.l != 0 {
            return Err(CalcKitError::WorkflowContract(format!(
                "basis overlap is implemented for l = 0 only, got l = {}",
                self.function.l
            )));
        }

        let overlap = s_overlap_at_sep(&self.function, &self.function, self.separation_bohr);
        self.output.set("overlap", WorkflowValue::Scalar(overlap));
        Ok(())
    }

    fn output(&self) -> &WorkflowOutput {
        &self.output
    }
}
