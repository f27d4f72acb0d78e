//! # 数据模型模块
//!
//! 定义统一的晶胞、解析结果、基组与标签数据模型。
//!
//! ## 依赖关系
//! - 被 `calc/`, `creators/`, `parsers/`, `workflows/` 使用
//! - 子模块: unit_cell, parsed_file, label, basis

pub mod basis;
pub mod label;
pub mod parsed_file;
pub mod unit_cell;

pub use basis::{
    gaussian_norm, ghost_basis_set, s_overlap_at_sep, BasisDescriptor, BasisFunction, BasisSet,
    GauPrim,
};
pub use label::{CalcLabel, ComponentSearch, SearchOpts};
pub use parsed_file::ParsedFile;
pub use unit_cell::UnitCell;
