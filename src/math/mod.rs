//! # 数值计算模块
//!
//! 提供多项式最小二乘拟合与单纯形优化器。
//!
//! ## 依赖关系
//! - 被 `workflows/` 与 `fitting/` 使用
//! - 子模块: polyfit, neldermead

pub mod neldermead;
pub mod polyfit;

pub use neldermead::{nelder_mead, NelderMeadOpts, NelderMeadResult};
pub use polyfit::{polyfit, Polynomial};
