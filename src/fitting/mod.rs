//! # 基组拟合引擎
//!
//! 在系数向量上最小化标量目标函数：系数变换（固定前缀 /
//! 归一化）、观察者式系数推送（后端基组文件重写、内存记录）、
//! 目标函数（工作流贡献加权和 + 并行外部计算）、优化驱动。
//!
//! ## 依赖关系
//! - 使用 `math/neldermead.rs`, `batch/`, `workflows/`,
//!   `parsers/cp2k_basis.rs`, `models/basis.rs`
//! - 被 `commands/` 使用
//! - 子模块: transform, updater, objective, driver

pub mod driver;
pub mod objective;
pub mod transform;
pub mod updater;

pub use driver::{BasisFitDriver, BasisFitResult};
pub use objective::{ObjectiveFunction, WorkflowContribution};
pub use transform::{CoeffTransformer, FixedPrefixTransformer, NormaliseCoeffsTransformer};
pub use updater::{BasisFileObserver, CoeffObserver, CoeffRecorder, CoeffUpdater};
