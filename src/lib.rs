//! # CalcKit - 电子结构计算编排库
//!
//! 面向 CP2K / CASTEP / Plato / LAMMPS 的计算编排：
//! 统一的计算对象契约 (`calc`)、creator 工厂 (`creators`)、
//! 字符串键注册表与内置预设 (`registry`)、收敛 / 状态方程 /
//! 堆垛层错 / 多体修正 / 基函数重叠工作流 (`workflows`)、
//! 基组拟合引擎 (`fitting`)，以及配套的解析器与并行批量执行。
//!
//! ## 模块依赖关系
//! ```text
//! cli/ + commands/   (命令行入口，见 main.rs)
//!   ├── creators/    (计算对象工厂)
//!   │     ├── registry/  (名称注册表与预设)
//!   │     └── calc/      (后端计算对象)
//!   │           └── parsers/ (输出与基组文件解析器)
//!   ├── workflows/   (派生量工作流)
//!   ├── fitting/     (基组拟合引擎)
//!   │     ├── math/      (多项式拟合与单纯形优化)
//!   │     └── batch/     (并行批量执行)
//!   ├── models/      (晶胞 / 读模型 / 基组 / 标签)
//!   ├── utils/       (输出美化 / 进度条 / 单位换算)
//!   └── error.rs     (统一错误类型)
//! ```

pub mod batch;
pub mod calc;
pub mod cli;
pub mod commands;
pub mod creators;
pub mod error;
pub mod fitting;
pub mod math;
pub mod models;
pub mod parsers;
pub mod registry;
pub mod utils;
pub mod workflows;

pub use error::{CalcKitError, Result};
