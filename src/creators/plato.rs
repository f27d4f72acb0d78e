//! # Plato creator
//!
//! 方法串解析为选项对象（变体 + token 基线），再按 k 点 / 积分网格 /
//! 数据集路径调整，最终压平为 Plato writer 使用的扁平
//! token -> string 表示。运行命令来自变体注册表。
//!
//! ## 依赖关系
//! - 使用 `registry/presets.rs` 的方法与运行命令注册表
//! - 使用 `calc/plato.rs`, `models/`
//! - 被 `commands/` 与工作流装配代码使用

use super::require;
use crate::calc::plato::PlatoRunComm;
use crate::calc::{BasePath, PlatoCalc};
use crate::error::Result;
use crate::models::UnitCell;
use crate::registry::{presets, Registry};
use std::path::PathBuf;
use std::rc::Rc;

/// 方法串解析出的选项对象
#[derive(Debug, Clone)]
pub struct PlatoMethodOpts {
    /// 变体名（dft / tb1 / tb2），决定运行命令
    pub variant: String,
    /// 基线 token 集
    pub tokens: Vec<(String, String)>,
}

/// Plato 计算 creator
#[derive(Clone)]
pub struct PlatoCalcCreator {
    /// 方法预设名（必填）
    pub method: Option<String>,
    /// 几何（必填）
    pub geom: Option<UnitCell>,
    /// 工作目录（必填）
    pub folder: Option<PathBuf>,
    /// 文件名主干（必填）
    pub file_name: Option<String>,
    /// k 点网格
    pub kpts: Option<[u32; 3]>,
    /// 实空间积分网格
    pub integral_mesh: Option<[u32; 3]>,
    /// 基组数据集路径
    pub dataset_path: Option<String>,

    methods: Rc<Registry<PlatoMethodOpts>>,
    run_comms: Rc<Registry<PlatoRunComm>>,
}

/// 单次 create 的覆盖项
#[derive(Clone, Default)]
pub struct PlatoOverrides {
    pub method: Option<String>,
    pub geom: Option<UnitCell>,
    pub folder: Option<PathBuf>,
    pub file_name: Option<String>,
    pub kpts: Option<[u32; 3]>,
    pub integral_mesh: Option<[u32; 3]>,
    pub dataset_path: Option<String>,
}

impl Default for PlatoCalcCreator {
    fn default() -> Self {
        PlatoCalcCreator {
            method: None,
            geom: None,
            folder: None,
            file_name: None,
            kpts: None,
            integral_mesh: None,
            dataset_path: None,
            methods: Rc::new(presets::plato_methods()),
            run_comms: Rc::new(presets::plato_run_comms()),
        }
    }
}

impl PlatoCalcCreator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method_registry(mut self, methods: Registry<PlatoMethodOpts>) -> Self {
        self.methods = Rc::new(methods);
        self
    }

    pub fn create(&self) -> Result<PlatoCalc> {
        let method = require(&self.method, "PlatoCalcCreator", "method")?;
        let geom = require(&self.geom, "PlatoCalcCreator", "geom")?;
        let folder = require(&self.folder, "PlatoCalcCreator", "folder")?;
        let file_name = require(&self.file_name, "PlatoCalcCreator", "file_name")?;

        let opts = self.methods.get(&method)?;
        let run_comm_fn = self.run_comms.get(&opts.variant)?;

        let mut tokens = opts.tokens;

        if let Some([kx, ky, kz]) = self.kpts {
            upsert(&mut tokens, "BlochStates", format!("{} {} {}", kx, ky, kz));
        }
        if let Some([mx, my, mz]) = self.integral_mesh {
            upsert(
                &mut tokens,
                "IntegralMeshSpacing",
                format!("{} {} {}", mx, my, mz),
            );
        }
        if let Some(path) = &self.dataset_path {
            upsert(&mut tokens, "DatasetFolder", path.clone());
        }

        // 几何 token：晶胞（bohr）与分数坐标原子
        let cell_lines: Vec<String> = geom
            .lattice
            .iter()
            .map(|row| format!("{:.8} {:.8} {:.8}", row[0], row[1], row[2]))
            .collect();
        upsert(&mut tokens, "CellVec", cell_lines.join("\n"));

        let mut atom_lines = vec![geom.num_atoms().to_string()];
        for (el, f) in geom.elements.iter().zip(&geom.frac_coords) {
            atom_lines.push(format!("{:.8} {:.8} {:.8} {}", f[0], f[1], f[2], el));
        }
        upsert(&mut tokens, "Atoms", atom_lines.join("\n"));

        let base_path = BasePath::new(folder, &file_name);
        Ok(PlatoCalc::new(base_path, tokens, run_comm_fn))
    }

    pub fn create_with(&self, overrides: PlatoOverrides) -> Result<PlatoCalc> {
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
        if let Some(v) = overrides.kpts {
            merged.kpts = Some(v);
        }
        if let Some(v) = overrides.integral_mesh {
            merged.integral_mesh = Some(v);
        }
        if let Some(v) = overrides.dataset_path {
            merged.dataset_path = Some(v);
        }
        merged.create()
    }
}

fn upsert(tokens: &mut Vec<(String, String)>, token: &str, value: String) {
    for (k, v) in tokens.iter_mut() {
        if k == token {
            *v = value;
            return;
        }
    }
    tokens.push((token.to_string(), value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::CalcMethod;

    fn sample_creator() -> PlatoCalcCreator {
        let mut geom = UnitCell::new([[6.0, 0.0, 0.0], [0.0, 6.0, 0.0], [0.0, 0.0, 6.0]]);
        geom.add_atom("Mg", [0.0, 0.0, 0.0]);

        let mut creator = PlatoCalcCreator::new();
        creator.method = Some("plato_tb1_pbe".to_string());
        creator.geom = Some(geom);
        creator.folder = Some(PathBuf::from("/tmp/plato"));
        creator.file_name = Some("mg".to_string());
        creator
    }

    #[test]
    fn test_method_resolves_variant_run_comm() {
        let calc = sample_creator().create().unwrap();
        assert!(calc.run_comm().contains("tb1 mg > mg.out"));
    }

    #[test]
    fn test_kpts_and_mesh_flattened_into_tokens() {
        let mut creator = sample_creator();
        creator.kpts = Some([10, 10, 8]);
        creator.integral_mesh = Some([40, 40, 40]);
        creator.dataset_path = Some("/data/tb1".to_string());

        let calc = creator.create().unwrap();
        let tokens = calc.tokens();

        let get = |key: &str| {
            tokens
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("BlochStates"), Some("10 10 8"));
        assert_eq!(get("IntegralMeshSpacing"), Some("40 40 40"));
        assert_eq!(get("DatasetFolder"), Some("/data/tb1"));
    }

    #[test]
    fn test_geometry_tokens_present() {
        let calc = sample_creator().create().unwrap();
        let atoms = calc
            .tokens()
            .iter()
            .find(|(k, _)| k == "Atoms")
            .map(|(_, v)| v.clone())
            .unwrap();

        assert!(atoms.starts_with("1\n"));
        assert!(atoms.contains("Mg"));
    }

    #[test]
    fn test_unknown_method_errors() {
        let mut creator = sample_creator();
        creator.method = Some("no_such_method".to_string());
        assert!(creator.create().is_err());
    }

    #[test]
    fn test_create_with_restores_state() {
        let creator = sample_creator();
        creator
            .create_with(PlatoOverrides {
                kpts: Some([2, 2, 2]),
                ..Default::default()
            })
            .unwrap();
        assert!(creator.kpts.is_none());
    }
}
