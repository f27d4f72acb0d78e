//! # CASTEP creator
//!
//! 把方法预设、数值选项（截断能、k 点）与几何导出的 cell 段
//! 拼成 .param / .cell 两个字典，产出 `CastepCalc`。
//!
//! ## 依赖关系
//! - 使用 `registry/presets.rs` 的参数预设
//! - 使用 `calc/castep.rs`, `models/`
//! - 被 `commands/` 与工作流装配代码使用

use super::require;
use crate::calc::castep::{CellEntry, TokenMap};
use crate::calc::{BasePath, CastepCalc};
use crate::error::Result;
use crate::models::UnitCell;
use crate::registry::{presets, Registry};
use crate::utils::units::bohr_to_angstrom;
use std::path::PathBuf;
use std::rc::Rc;

/// CASTEP 计算 creator
#[derive(Clone)]
pub struct CastepCalcCreator {
    /// 方法预设名（必填）
    pub method: Option<String>,
    /// 几何（必填）
    pub geom: Option<UnitCell>,
    /// 工作目录（必填）
    pub folder: Option<PathBuf>,
    /// 文件名主干（必填）
    pub file_name: Option<String>,
    /// 平面波截断能 (eV)
    pub cutoff_energy: Option<f64>,
    /// Monkhorst-Pack k 点网格
    pub kpts: Option<[u32; 3]>,
    /// 元素 -> 赝势文件
    pub species_pot: Option<Vec<(String, String)>>,
    /// 写 symmetry_generate 标志
    pub symmetry_generate: Option<bool>,
    /// 可执行名
    pub exec: Option<String>,

    params: Rc<Registry<TokenMap>>,
}

/// 单次 create 的覆盖项
#[derive(Clone, Default)]
pub struct CastepOverrides {
    pub method: Option<String>,
    pub geom: Option<UnitCell>,
    pub folder: Option<PathBuf>,
    pub file_name: Option<String>,
    pub cutoff_energy: Option<f64>,
    pub kpts: Option<[u32; 3]>,
    pub species_pot: Option<Vec<(String, String)>>,
    pub symmetry_generate: Option<bool>,
    pub exec: Option<String>,
}

impl Default for CastepCalcCreator {
    fn default() -> Self {
        CastepCalcCreator {
            method: None,
            geom: None,
            folder: None,
            file_name: None,
            cutoff_energy: None,
            kpts: None,
            species_pot: None,
            symmetry_generate: None,
            exec: None,
            params: Rc::new(presets::castep_params()),
        }
    }
}

impl CastepCalcCreator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param_registry(mut self, params: Registry<TokenMap>) -> Self {
        self.params = Rc::new(params);
        self
    }

    pub fn create(&self) -> Result<CastepCalc> {
        let method = require(&self.method, "CastepCalcCreator", "method")?;
        let geom = require(&self.geom, "CastepCalcCreator", "geom")?;
        let folder = require(&self.folder, "CastepCalcCreator", "folder")?;
        let file_name = require(&self.file_name, "CastepCalcCreator", "file_name")?;

        // .param 字典：预设 + 显式数值选项
        let mut param = self.params.get(&method)?;
        if let Some(cutoff) = self.cutoff_energy {
            upsert(&mut param, "cut_off_energy", format!("{:.1} eV", cutoff));
        }

        // .cell 字典：几何导出段 + k 点 + 赝势
        let mut cell: Vec<(String, CellEntry)> = Vec::new();

        let mut lattice_lines = vec!["ang".to_string()];
        for row in &geom.lattice {
            lattice_lines.push(format!(
                "{:.8} {:.8} {:.8}",
                bohr_to_angstrom(row[0]),
                bohr_to_angstrom(row[1]),
                bohr_to_angstrom(row[2])
            ));
        }
        cell.push(("LATTICE_CART".to_string(), CellEntry::Block(lattice_lines)));

        if !geom.elements.is_empty() {
            let pos_lines: Vec<String> = geom
                .elements
                .iter()
                .zip(&geom.frac_coords)
                .map(|(el, f)| format!("{} {:.8} {:.8} {:.8}", el, f[0], f[1], f[2]))
                .collect();
            cell.push(("POSITIONS_FRAC".to_string(), CellEntry::Block(pos_lines)));
        }

        if let Some([kx, ky, kz]) = self.kpts {
            cell.push((
                "kpoint_mp_grid".to_string(),
                CellEntry::Value(format!("{} {} {}", kx, ky, kz)),
            ));
        }

        if let Some(pots) = &self.species_pot {
            let lines: Vec<String> = pots
                .iter()
                .map(|(el, pot)| format!("{} {}", el, pot))
                .collect();
            cell.push(("SPECIES_POT".to_string(), CellEntry::Block(lines)));
        }

        if self.symmetry_generate.unwrap_or(false) {
            cell.push(("symmetry_generate".to_string(), CellEntry::Flag));
        }

        let base_path = BasePath::new(folder, &file_name);
        let mut calc = CastepCalc::new(base_path, param, cell);
        if let Some(exec) = &self.exec {
            calc = calc.with_exec(exec.clone());
        }
        Ok(calc)
    }

    pub fn create_with(&self, overrides: CastepOverrides) -> Result<CastepCalc> {
        let mut merged = self.clone();
        if let Some(v) = overrides.method {
            merged.method = Some(v);
        }
        if let Some(v) = overrides.geom {
            merged.geom = Some(v);
        }
        if let Some(v) = overrides.folder {
            merged.folder = Some(v);
        }
        if let Some(v) = overrides.file_name {
            merged.file_name = Some(v);
        }
        if let Some(v) = overrides.cutoff_energy {
            merged.cutoff_energy = Some(v);
        }
        if let Some(v) = overrides.kpts {
            merged.kpts = Some(v);
        }
        if let Some(v) = overrides.species_pot {
            merged.species_pot = Some(v);
        }
        if let Some(v) = overrides.symmetry_generate {
            merged.symmetry_generate = Some(v);
        }
        if let Some(v) = overrides.exec {
            merged.exec = Some(v);
        }
        merged.create()
    }
}

/// token 已存在则覆盖，否则追加
fn upsert(map: &mut TokenMap, token: &str, value: String) {
    for (k, v) in map.iter_mut() {
        if k == token {
            *v = value;
            return;
        }
    }
    map.push((token.to_string(), value));
}
