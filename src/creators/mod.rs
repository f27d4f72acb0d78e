//! # creator（工厂）模块
//!
//! 每个后端一个 creator：一组密封的选项槽（`Option<T>` 字段）加
//! `create()` / `create_with(overrides)` 两个入口。
//! `create_with` 克隆自身、合并覆盖项后走 `create()`，
//! 原 creator 的选项槽在调用前后保持不变。
//! 必填选项未设置时在 `create()` 处报 `RequiredOptionUnset`。
//!
//! ## 依赖关系
//! - 被 `commands/` 与上层工作流装配代码使用
//! - 使用 `registry/`, `calc/`, `models/`
//! - 子模块: cp2k, castep, plato, lammps

pub mod castep;
pub mod cp2k;
pub mod lammps;
pub mod plato;

pub use castep::{CastepCalcCreator, CastepOverrides};
pub use cp2k::{Cp2kCalcCreator, Cp2kOverrides};
pub use lammps::{
    AtomStyleMapper, AtomicStyleMapper, FullStyleWaterMapper, LammpsCalcCreator, LammpsOverrides,
};
pub use plato::{PlatoCalcCreator, PlatoMethodOpts, PlatoOverrides};

use crate::error::{CalcKitError, Result};

/// 取必填选项，未设置时带 creator / option 名报错
pub(crate) fn require<T: Clone>(opt: &Option<T>, creator: &str, option: &str) -> Result<T> {
    opt.clone().ok_or_else(|| CalcKitError::RequiredOptionUnset {
        creator: creator.to_string(),
        option: option.to_string(),
    })
}
