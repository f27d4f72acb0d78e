//! # 工作流契约与组合
//!
//! 工作流把若干计算对象归并成派生量：`run()` 读取各计算的解析
//! 输出，计算结果后写入输出命名空间。约定：声明在
//! `namespace_attrs()` 里的名字在 `run()` 成功返回后全部存在，
//! `run()` 之前命名空间为空。组合工作流对分支做
//! 命令拼接 / 属性并集 / 顺序执行。
//!
//! ## 依赖关系
//! - 使用 `calc/` 的 CalcMethod、`models/parsed_file.rs`
//! - 被 `fitting/`, `commands/` 使用
//! - 子模块: convergence, eos, stacking, many_body, basis_overlap

pub mod basis_overlap;
pub mod convergence;
pub mod eos;
pub mod many_body;
pub mod stacking;

pub use basis_overlap::BasisOverlapWorkflow;
pub use convergence::ConvergenceWorkflow;
pub use eos::{quadratic_eos_fitter, EosFitResult, EosFitter, EosWorkflow};
pub use many_body::ManyBodyXcWorkflow;
pub use stacking::{GammaSurfaceWorkflow, TwoStructureStackingFault};

use crate::error::Result;

/// 工作流输出命名空间里的一个值
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowValue {
    /// 单个标量
    Scalar(f64),
    /// 有序数对列表（收敛曲线、γ 面原始数据等）
    Pairs(Vec<(f64, f64)>),
    /// 状态方程拟合结果
    Eos(EosFitResult),
}

impl WorkflowValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            WorkflowValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_pairs(&self) -> Option<&[(f64, f64)]> {
        match self {
            WorkflowValue::Pairs(p) => Some(p),
            _ => None,
        }
    }
}

/// 字符串键的输出命名空间，保持写入顺序
#[derive(Debug, Clone, Default)]
pub struct WorkflowOutput {
    attrs: Vec<(String, WorkflowValue)>,
}

impl WorkflowOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入或覆盖属性
    pub fn set(&mut self, name: &str, value: WorkflowValue) {
        for (k, v) in self.attrs.iter_mut() {
            if k == name {
                *v = value;
                return;
            }
        }
        self.attrs.push((name.to_string(), value));
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    pub fn get(&self, name: &str) -> Option<&WorkflowValue> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(WorkflowValue::as_scalar)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WorkflowValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// 工作流统一契约
pub trait Workflow {
    /// 运行前需执行的 shell 命令（可为空）
    fn pre_run_shell_comms(&self) -> Vec<String>;

    /// 保证在 run() 后出现在输出里的属性名
    fn namespace_attrs(&self) -> Vec<&'static str>;

    /// 读取输入、计算派生量、填充输出
    fn run(&mut self) -> Result<()>;

    /// 输出命名空间；run() 成功前为空
    fn output(&self) -> &WorkflowOutput;
}

/// 组合工作流：分支有序，命令拼接、属性并集、顺序执行
#[derive(Default)]
pub struct CompositeWorkflow {
    branches: Vec<Box<dyn Workflow>>,
    output: WorkflowOutput,
}

impl CompositeWorkflow {
    pub fn new(branches: Vec<Box<dyn Workflow>>) -> Self {
        CompositeWorkflow {
            branches,
            output: WorkflowOutput::new(),
        }
    }

    pub fn push(&mut self, branch: Box<dyn Workflow>) {
        self.branches.push(branch);
    }

    pub fn num_branches(&self) -> usize {
        self.branches.len()
    }
}

impl Workflow for CompositeWorkflow {
    fn pre_run_shell_comms(&self) -> Vec<String> {
        self.branches
            .iter()
            .flat_map(|b| b.pre_run_shell_comms())
            .collect()
    }

    fn namespace_attrs(&self) -> Vec<&'static str> {
        let mut attrs = Vec::new();
        for branch in &self.branches {
            for name in branch.namespace_attrs() {
                if !attrs.contains(&name) {
                    attrs.push(name);
                }
            }
        }
        attrs
    }

    fn run(&mut self) -> Result<()> {
        for branch in &mut self.branches {
            branch.run()?;
        }
        // 按分支顺序并入；同名属性先出现者为准
        let mut merged = WorkflowOutput::new();
        for branch in &self.branches {
            for (name, value) in branch.output().iter() {
                if !merged.has_attr(name) {
                    merged.set(name, value.clone());
                }
            }
        }
        self.output = merged;
        Ok(())
    }

    fn output(&self) -> &WorkflowOutput {
        &self.output
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::calc::{BasePath, CalcMethod};
    use crate::error::Result;
    use crate::models::{ParsedFile, UnitCell};
    use std::path::PathBuf;

    /// 返回预置 ParsedFile 的测试桩
    pub struct StubCalc {
        base_path: BasePath,
        parsed: ParsedFile,
    }

    impl StubCalc {
        pub fn new(folder: &str, stem: &str, parsed: ParsedFile) -> Self {
            StubCalc {
                base_path: BasePath::new(folder, stem),
                parsed,
            }
        }

        /// 立方晶胞 + 给定能量与原子数的桩
        pub fn with_energy(folder: &str, stem: &str, energy_ev: f64, num_atoms: usize) -> Self {
            let cell = UnitCell::new([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
            Self::new(folder, stem, ParsedFile::new(energy_ev, num_atoms, cell))
        }
    }

    impl CalcMethod for StubCalc {
        fn base_path(&self) -> &BasePath {
            &self.base_path
        }

        fn write_file(&self) -> Result<()> {
            Ok(())
        }

        fn run_comm(&self) -> String {
            format!("run {}", self.base_path.stem())
        }

        fn out_file_path(&self) -> PathBuf {
            self.base_path.with_ext("out")
        }

        fn parsed_file(&self) -> Result<ParsedFile> {
            Ok(self.parsed.clone())
        }
    }
}
