//! # 目标函数
//!
//! 一次求值：系数推给更新器 -> 所有工作流的 shell 命令并行
//! 执行（进程数受 n_cores 限制）-> 依次 run() 各工作流并抽取
//! 其目标贡献 -> 加权求和。外部进程失败可选地折算为哨兵值，
//! 让优化器得以继续。

use super::updater::CoeffUpdater;
use crate::batch::BatchRunner;
use crate::error::{CalcKitError, Result};
use crate::workflows::{Workflow, WorkflowOutput};

/// 从工作流输出抽取目标贡献
pub type ContributionExtractor = Box<dyn Fn(&WorkflowOutput) -> Result<f64>>;

/// 单个工作流贡献：工作流 + 抽取器 + 权重
pub struct WorkflowContribution {
    pub workflow: Box<dyn Workflow>,
    pub extract: ContributionExtractor,
    pub weight: f64,
}

impl WorkflowContribution {
    pub fn new(workflow: Box<dyn Workflow>, extract: ContributionExtractor, weight: f64) -> Self {
        WorkflowContribution {
            workflow,
            extract,
            weight,
        }
    }

    /// 以输出里的单个标量属性为贡献
    pub fn scalar_attr(workflow: Box<dyn Workflow>, attr: &'static str, weight: f64) -> Self {
        Self::new(
            workflow,
            Box::new(move |output| {
                output.scalar(attr).ok_or_else(|| {
                    CalcKitError::WorkflowContract(format!(
                        "workflow output has no scalar attribute '{}'",
                        attr
                    ))
                })
            }),
            weight,
        )
    }
}

/// 基组拟合目标函数
pub struct ObjectiveFunction {
    contributions: Vec<WorkflowContribution>,
    updater: CoeffUpdater,
    n_cores: usize,
    /// 外部进程失败时返回的哨兵目标值；None 则失败直接传播
    fallback_value: Option<f64>,
}

impl ObjectiveFunction {
    pub fn new(
        contributions: Vec<WorkflowContribution>,
        updater: CoeffUpdater,
        n_cores: usize,
    ) -> Self {
        ObjectiveFunction {
            contributions,
            updater,
            n_cores,
            fallback_value: None,
        }
    }

    /// 外部进程失败时返回哨兵值而非报错
    pub fn with_fallback_value(mut self, value: f64) -> Self {
        self.fallback_value = Some(value);
        self
    }

    pub fn updater_mut(&mut self) -> &mut CoeffUpdater {
        &mut self.updater
    }

    /// 单次求值
    pub fn evaluate(&mut self, raw_coeffs: &[f64]) -> Result<f64> {
        self.updater.push(raw_coeffs)?;

        let commands: Vec<String> = self
            .contributions
            .iter()
            .flat_map(|c| c.workflow.pre_run_shell_comms())
            .collect();

        let runner = BatchRunner::new(self.n_cores);
        if let Err(err) = runner.run_commands(&commands) {
            return match (&err, self.fallback_value) {
                (CalcKitError::CommandFailed { .. }, Some(value)) => Ok(value),
                _ => Err(err),
            };
        }

        let mut total = 0.0;
        for contribution in self.contributions.iter_mut() {
            contribution.workflow.run()?;
            let value = (contribution.extract)(contribution.workflow.output())?;
            total += contribution.weight * value;
        }
        Ok(total)
    }
}
