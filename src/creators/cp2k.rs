//! # CP2K creator
//!
//! 从方法预设注册表取输入骨架，合并几何 / 基组 / 网格 / k 点等
//! 选项后产出 `Cp2kCalc`。
//!
//! ## 依赖关系
//! - 使用 `registry/presets.rs` 的方法预设与基组预设
//! - 使用 `calc/cp2k.rs`, `models/`
//! - 被 `commands/` 与工作流装配代码使用

use super::require;
use crate::calc::cp2k::{Cp2kInput, Cp2kSection};
use crate::calc::{BasePath, Cp2kCalc};
use crate::error::Result;
use crate::models::{BasisDescriptor, UnitCell};
use crate::registry::{presets, Registry};
use crate::utils::units::bohr_to_angstrom;
use std::path::PathBuf;
use std::rc::Rc;

/// CP2K 计算 creator
#[derive(Clone)]
pub struct Cp2kCalcCreator {
    /// 方法预设名（必填）
    pub method: Option<String>,
    /// 几何（必填）
    pub geom: Option<UnitCell>,
    /// 各元素基组描述符（必填）
    pub basis: Option<Vec<BasisDescriptor>>,
    /// 工作目录（必填）
    pub folder: Option<PathBuf>,
    /// 文件名主干（必填）
    pub file_name: Option<String>,
    /// Monkhorst-Pack k 点网格
    pub kpts: Option<[u32; 3]>,
    /// 额外虚轨道数
    pub added_mos: Option<u32>,
    /// 绝对网格截断 (Ry)
    pub abs_grid_cutoff: Option<f64>,
    /// 相对网格截断 (Ry)
    pub rel_grid_cutoff: Option<f64>,
    /// SCF 未收敛时是否仍解析输出
    pub suppress_unconverged: Option<bool>,

    methods: Rc<Registry<Cp2kInput>>,
}

/// 单次 create 的覆盖项
#[derive(Clone, Default)]
pub struct Cp2kOverrides {
    pub method: Option<String>,
    pub geom: Option<UnitCell>,
    pub basis: Option<Vec<BasisDescriptor>>,
    pub folder: Option<PathBuf>,
    pub file_name: Option<String>,
    pub kpts: Option<[u32; 3]>,
    pub added_mos: Option<u32>,
    pub abs_grid_cutoff: Option<f64>,
    pub rel_grid_cutoff: Option<f64>,
    pub suppress_unconverged: Option<bool>,
}

impl Default for Cp2kCalcCreator {
    fn default() -> Self {
        Cp2kCalcCreator {
            method: None,
            geom: None,
            basis: None,
            folder: None,
            file_name: None,
            kpts: None,
            added_mos: None,
            abs_grid_cutoff: None,
            rel_grid_cutoff: None,
            suppress_unconverged: None,
            methods: Rc::new(presets::cp2k_methods()),
        }
    }
}

impl Cp2kCalcCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换方法预设注册表（默认为内置预设表）
    pub fn with_method_registry(mut self, methods: Registry<Cp2kInput>) -> Self {
        self.methods = Rc::new(methods);
        self
    }

    /// 用当前选项槽产出计算对象
    pub fn create(&self) -> Result<Cp2kCalc> {
        let method = require(&self.method, "Cp2kCalcCreator", "method")?;
        let geom = require(&self.geom, "Cp2kCalcCreator", "geom")?;
        let basis = require(&self.basis, "Cp2kCalcCreator", "basis")?;
        let folder = require(&self.folder, "Cp2kCalcCreator", "folder")?;
        let file_name = require(&self.file_name, "Cp2kCalcCreator", "file_name")?;

        // 预设骨架（工厂每次给新值，可安全修改）
        let mut input = self.methods.get(&method)?;

        input
            .section_mut(&["GLOBAL"])
            .set_param("PROJECT", file_name.as_str());

        if let Some([kx, ky, kz]) = self.kpts {
            let kpoints = input.section_mut(&["FORCE_EVAL", "DFT", "KPOINTS"]);
            kpoints.set_param("SCHEME", format!("MONKHORST-PACK {} {} {}", kx, ky, kz));
        }
        if let Some(added) = self.added_mos {
            input
                .section_mut(&["FORCE_EVAL", "DFT", "SCF"])
                .set_param("ADDED_MOS", added.to_string());
        }
        if let Some(cutoff) = self.abs_grid_cutoff {
            input
                .section_mut(&["FORCE_EVAL", "DFT", "MGRID"])
                .set_param("CUTOFF", format!("{:.1}", cutoff));
        }
        if let Some(rel) = self.rel_grid_cutoff {
            input
                .section_mut(&["FORCE_EVAL", "DFT", "MGRID"])
                .set_param("REL_CUTOFF", format!("{:.1}", rel));
        }

        fill_subsys(&mut input, &geom, &basis);

        let base_path = BasePath::new(folder, &file_name);
        Ok(Cp2kCalc::new(base_path, input)
            .suppress_unconverged(self.suppress_unconverged.unwrap_or(false)))
    }

    /// 单次调用覆盖：克隆 + 合并，自身选项槽不变
    pub fn create_with(&self, overrides: Cp2kOverrides) -> Result<Cp2kCalc> {
        let mut merged = self.clone();
        if let Some(v) = overrides.method {
            merged.method = Some(v);
        }
        if let Some(v) = overrides.geom {
            merged.geom = Some(v);
        }
        if let Some(v) = overrides.basis {
            merged.basis = Some(v);
        }
        if let Some(v) = overrides.folder {
            merged.folder = Some(v);
        }
        if let Some(v) = overrides.file_name {
            merged.file_name = Some(v);
        }
        if let Some(v) = overrides.kpts {
            merged.kpts = Some(v);
        }
        if let Some(v) = overrides.added_mos {
            merged.added_mos = Some(v);
        }
        if let Some(v) = overrides.abs_grid_cutoff {
            merged.abs_grid_cutoff = Some(v);
        }
        if let Some(v) = overrides.rel_grid_cutoff {
            merged.rel_grid_cutoff = Some(v);
        }
        if let Some(v) = overrides.suppress_unconverged {
            merged.suppress_unconverged = Some(v);
        }
        merged.create()
    }
}

/// 写 SUBSYS：晶胞（Å）、分数坐标、各元素 KIND 段
fn fill_subsys(input: &mut Cp2kInput, geom: &UnitCell, basis: &[BasisDescriptor]) {
    let cell = input.section_mut(&["FORCE_EVAL", "SUBSYS", "CELL"]);
    for (token, row) in ["A", "B", "C"].into_iter().zip(&geom.lattice) {
        cell.set_param(
            token,
            format!(
                "{:.8} {:.8} {:.8}",
                bohr_to_angstrom(row[0]),
                bohr_to_angstrom(row[1]),
                bohr_to_angstrom(row[2])
            ),
        );
    }

    let coord = input.section_mut(&["FORCE_EVAL", "SUBSYS", "COORD"]);
    coord.set_param("SCALED", "TRUE");
    for (el, frac) in geom.elements.iter().zip(&geom.frac_coords) {
        coord.set_param(
            el,
            format!("{:.8} {:.8} {:.8}", frac[0], frac[1], frac[2]),
        );
    }

    let subsys = input.section_mut(&["FORCE_EVAL", "SUBSYS"]);
    for desc in basis {
        let mut kind = Cp2kSection::new(format!("KIND {}", desc.element));
        if desc.ghost {
            // ghost kind 保留基函数但去掉电子与核势
            let bare = desc.element.trim_end_matches("_ghost");
            kind.set_param("ELEMENT", bare);
            kind.set_param("GHOST", "TRUE");
        }
        kind.set_param("BASIS_SET", desc.basis_name.as_str());
        kind.set_param("POTENTIAL", desc.potential_name.as_str());
        subsys.subsections.push(kind);
    }
}
