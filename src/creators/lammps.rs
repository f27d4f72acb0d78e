//! # LAMMPS creator
//!
//! 分别装配脚本文件有序段（init / settings / fixes / dump / run）
//! 与数据文件有序段（header / box / atoms / bonds / angles）。
//! atom_style 相关细节由可插拔的几何映射器处理
//! （"full" 风格的水模型需要 molecule ID、键与键角）。
//!
//! ## 依赖关系
//! - 使用 `calc/lammps.rs`, `models/`
//! - 被 `commands/` 与工作流装配代码使用

use super::require;
use crate::calc::lammps::SectionMap;
use crate::calc::{BasePath, LammpsCalc};
use crate::error::{CalcKitError, Result};
use crate::models::UnitCell;
use crate::utils::units::bohr_to_angstrom;
use std::path::PathBuf;
use std::rc::Rc;

/// 几何 -> 数据文件段的映射器（atom_style 相关）
pub trait AtomStyleMapper {
    /// 该映射器对应的 atom_style 名
    fn atom_style(&self) -> &str;

    /// 产出数据文件的有序段（header 计数、box、Atoms、Bonds、Angles…）
    fn data_sections(&self, cell: &UnitCell) -> Result<SectionMap>;
}

/// atom_style atomic：`id type x y z`，类型按元素出现顺序编号
pub struct AtomicStyleMapper;

impl AtomStyleMapper for AtomicStyleMapper {
    fn atom_style(&self) -> &str {
        "atomic"
    }

    fn data_sections(&self, cell: &UnitCell) -> Result<SectionMap> {
        let types = element_types(cell);
        let cart = cart_angstrom(cell);

        let mut sections: SectionMap = Vec::new();
        sections.push((
            "header".to_string(),
            vec![
                format!("{} atoms", cell.num_atoms()),
                format!("{} atom types", types.len()),
            ],
        ));
        sections.push(("box".to_string(), box_bounds_lines(cell)?));

        let atom_lines: Vec<String> = cell
            .elements
            .iter()
            .zip(&cart)
            .enumerate()
            .map(|(i, (el, xyz))| {
                let type_id = types.iter().position(|t| t == el).map_or(1, |i| i + 1);
                format!(
                    "{} {} {:.8} {:.8} {:.8}",
                    i + 1,
                    type_id,
                    xyz[0],
                    xyz[1],
                    xyz[2]
                )
            })
            .collect();
        sections.push(("Atoms".to_string(), atom_lines));

        Ok(sections)
    }
}

/// atom_style full 的 SPC/E 水映射器：
/// 原子按 O, H, H 三元组排列，按分子编号，O-H 键与 H-O-H 键角各一类
pub struct FullStyleWaterMapper {
    /// O 电荷
    pub q_oxygen: f64,
    /// H 电荷
    pub q_hydrogen: f64,
}

impl Default for FullStyleWaterMapper {
    fn default() -> Self {
        // SPC/E
        FullStyleWaterMapper {
            q_oxygen: -0.8476,
            q_hydrogen: 0.4238,
        }
    }
}

impl AtomStyleMapper for FullStyleWaterMapper {
    fn atom_style(&self) -> &str {
        "full"
    }

    fn data_sections(&self, cell: &UnitCell) -> Result<SectionMap> {
        if cell.num_atoms() % 3 != 0 {
            return Err(CalcKitError::InvalidArgument(format!(
                "water mapper expects O,H,H triples; got {} atoms",
                cell.num_atoms()
            )));
        }
        for (i, el) in cell.elements.iter().enumerate() {
            let expected = if i % 3 == 0 { "O" } else { "H" };
            if el != expected {
                return Err(CalcKitError::InvalidArgument(format!(
                    "water mapper expects O,H,H triples; atom {} is '{}'",
                    i + 1,
                    el
                )));
            }
        }

        let n_mol = cell.num_atoms() / 3;
        let cart = cart_angstrom(cell);

        let mut sections: SectionMap = Vec::new();
        sections.push((
            "header".to_string(),
            vec![
                format!("{} atoms", cell.num_atoms()),
                format!("{} bonds", 2 * n_mol),
                format!("{} angles", n_mol),
                "2 atom types".to_string(),
                "1 bond types".to_string(),
                "1 angle types".to_string(),
            ],
        ));
        sections.push(("box".to_string(), box_bounds_lines(cell)?));

        // Atoms: id mol type charge x y z
        let atom_lines: Vec<String> = cart
            .iter()
            .enumerate()
            .map(|(i, xyz)| {
                let mol = i / 3 + 1;
                let (type_id, charge) = if i % 3 == 0 {
                    (1, self.q_oxygen)
                } else {
                    (2, self.q_hydrogen)
                };
                format!(
                    "{} {} {} {:.4} {:.8} {:.8} {:.8}",
                    i + 1,
                    mol,
                    type_id,
                    charge,
                    xyz[0],
                    xyz[1],
                    xyz[2]
                )
            })
            .collect();
        sections.push(("Atoms".to_string(), atom_lines));

        let mut bond_lines = Vec::with_capacity(2 * n_mol);
        let mut angle_lines = Vec::with_capacity(n_mol);
        for mol in 0..n_mol {
            let o = 3 * mol + 1;
            bond_lines.push(format!("{} 1 {} {}", 2 * mol + 1, o, o + 1));
            bond_lines.push(format!("{} 1 {} {}", 2 * mol + 2, o, o + 2));
            angle_lines.push(format!("{} 1 {} {} {}", mol + 1, o + 1, o, o + 2));
        }
        sections.push(("Bonds".to_string(), bond_lines));
        sections.push(("Angles".to_string(), angle_lines));

        Ok(sections)
    }
}

/// LAMMPS 计算 creator
#[derive(Clone)]
pub struct LammpsCalcCreator {
    /// 几何（必填）
    pub geom: Option<UnitCell>,
    /// 工作目录（必填）
    pub folder: Option<PathBuf>,
    /// 文件名主干（必填）
    pub file_name: Option<String>,
    /// 势函数 / settings 行（必填，pair_style 等）
    pub potential_lines: Option<Vec<String>>,
    /// 运行步数（必填）
    pub run_steps: Option<u64>,
    /// 单位制（默认 metal）
    pub units: Option<String>,
    /// fix 行
    pub fixes: Option<Vec<String>>,
    /// dump 输出间隔
    pub dump_every: Option<u32>,
    /// 时间步长
    pub timestep: Option<f64>,

    mapper: Rc<dyn AtomStyleMapper>,
}

/// 单次 create 的覆盖项
#[derive(Clone, Default)]
pub struct LammpsOverrides {
    pub geom: Option<UnitCell>,
    pub folder: Option<PathBuf>,
    pub file_name: Option<String>,
    pub potential_lines: Option<Vec<String>>,
    pub run_steps: Option<u64>,
    pub units: Option<String>,
    pub fixes: Option<Vec<String>>,
    pub dump_every: Option<u32>,
    pub timestep: Option<f64>,
}

impl Default for LammpsCalcCreator {
    fn default() -> Self {
        LammpsCalcCreator {
            geom: None,
            folder: None,
            file_name: None,
            potential_lines: None,
            run_steps: None,
            units: None,
            fixes: None,
            dump_every: None,
            timestep: None,
            mapper: Rc::new(AtomicStyleMapper),
        }
    }
}

impl LammpsCalcCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换 atom_style 映射器（默认 atomic）
    pub fn with_mapper(mut self, mapper: Rc<dyn AtomStyleMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn create(&self) -> Result<LammpsCalc> {
        let geom = require(&self.geom, "LammpsCalcCreator", "geom")?;
        let folder = require(&self.folder, "LammpsCalcCreator", "folder")?;
        let file_name = require(&self.file_name, "LammpsCalcCreator", "file_name")?;
        let potential_lines = require(&self.potential_lines, "LammpsCalcCreator", "potential_lines")?;
        let run_steps = require(&self.run_steps, "LammpsCalcCreator", "run_steps")?;

        let units = self.units.clone().unwrap_or_else(|| "metal".to_string());
        let dump_every = self.dump_every.unwrap_or(100);

        let mut script: SectionMap = Vec::new();
        script.push((
            "init".to_string(),
            vec![
                format!("units {}", units),
                "boundary p p p".to_string(),
                format!("atom_style {}", self.mapper.atom_style()),
            ],
        ));

        let mut settings = vec![format!("read_data {}.data", file_name)];
        settings.extend(potential_lines);
        script.push(("settings".to_string(), settings));

        let mut fixes = self.fixes.clone().unwrap_or_default();
        if let Some(dt) = self.timestep {
            fixes.push(format!("timestep {}", dt));
        }
        if !fixes.is_empty() {
            script.push(("fixes".to_string(), fixes));
        }

        script.push((
            "dump".to_string(),
            vec![
                format!(
                    "dump traj all custom {} dump.lammpstrj id type x y z",
                    dump_every
                ),
                "thermo_style custom step temp etotal press vol".to_string(),
                format!("thermo {}", dump_every),
            ],
        ));
        script.push(("run".to_string(), vec![format!("run {}", run_steps)]));

        let data = self.mapper.data_sections(&geom)?;

        let base_path = BasePath::new(folder, &file_name);
        Ok(LammpsCalc::new(base_path, script, data))
    }

    pub fn create_with(&self, overrides: LammpsOverrides) -> Result<LammpsCalc> {
        let mut merged = self.clone();
        if let Some(v) = overrides.geom {
            merged.geom = Some(v);
        }
        if let Some(v) = overrides.folder {
            merged.folder = Some(v);
        }
        if let Some(v) = overrides.file_name {
            merged.file_name = Some(v);
        }
        if let Some(v) = overrides.potential_lines {
            merged.potential_lines = Some(v);
        }
        if let Some(v) = overrides.run_steps {
            merged.run_steps = Some(v);
        }
        if let Some(v) = overrides.units {
            merged.units = Some(v);
        }
        if let Some(v) = overrides.fixes {
            merged.fixes = Some(v);
        }
        if let Some(v) = overrides.dump_every {
            merged.dump_every = Some(v);
        }
        if let Some(v) = overrides.timestep {
            merged.timestep = Some(v);
        }
        merged.create()
    }
}

/// 去重保序的元素类型表
fn element_types(cell: &UnitCell) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for el in &cell.elements {
        if !types.contains(el) {
            types.push(el.clone());
        }
    }
    types
}

/// 笛卡尔坐标（Å）
fn cart_angstrom(cell: &UnitCell) -> Vec<[f64; 3]> {
    cell.cart_coords()
        .into_iter()
        .map(|c| [bohr_to_angstrom(c[0]), bohr_to_angstrom(c[1]), bohr_to_angstrom(c[2])])
        .collect()
}

/// 正交盒边界行；非正交晶胞直接报错
fn box_bounds_lines(cell: &UnitCell) -> Result<Vec<String>> {
    for (i, row) in cell.lattice.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            if i != j && v.abs() > 1e-10 {
                return Err(CalcKitError::InvalidArgument(
                    "LAMMPS data mapper supports orthogonal cells only".to_string(),
                ));
            }
        }
    }
    Ok(vec![
        format!("0.0 {:.8} xlo xhi", bohr_to_angstrom(cell.lattice[0][0])),
        format!("0.0 {:.8} ylo yhi", bohr_to_angstrom(cell.lattice[1][1])),
        format!("0.0 {:.8} zlo zhi", bohr_to_angstrom(cell.lattice[2][2])),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_cell() -> UnitCell {
        let a = 10.0;
        let mut cell = UnitCell::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]);
        cell.add_atom("O", [0.1, 0.1, 0.1]);
        cell.add_atom("H", [0.15, 0.1, 0.1]);
        cell.add_atom("H", [0.1, 0.15, 0.1]);
        cell.add_atom("O", [0.5, 0.5, 0.5]);
        cell.add_atom("H", [0.55, 0.5, 0.5]);
        cell.add_atom("H", [0.5, 0.55, 0.5]);
        cell
    }

    fn sample_creator() -> LammpsCalcCreator {
        let mut creator =
            LammpsCalcCreator::new().with_mapper(Rc::new(FullStyleWaterMapper::default()));
        creator.geom = Some(water_cell());
        creator.folder = Some(PathBuf::from("/tmp/md"));
        creator.file_name = Some("water".to_string());
        creator.potential_lines = Some(vec![
            "pair_style lj/cut/coul/long 10.0".to_string(),
            "pair_coeff 1 1 0.15535 3.166".to_string(),
        ]);
        creator.run_steps = Some(1000);
        creator
    }

    #[test]
    fn test_script_sections_assembled_in_order() {
        let calc = sample_creator().create().unwrap();
        let names: Vec<&str> = calc.script().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["init", "settings", "dump", "run"]);
    }

    #[test]
    fn test_full_style_water_data_sections() {
        let calc = sample_creator().create().unwrap();
        let data = calc.data();

        let header = &data.iter().find(|(k, _)| k == "header").unwrap().1;
        assert!(header.contains(&"6 atoms".to_string()));
        assert!(header.contains(&"4 bonds".to_string()));
        assert!(header.contains(&"2 angles".to_string()));

        let atoms = &data.iter().find(|(k, _)| k == "Atoms").unwrap().1;
        // id mol type charge x y z；第 4 个原子属于第 2 个分子
        assert!(atoms[3].starts_with("4 2 1 -0.8476"));

        let bonds = &data.iter().find(|(k, _)| k == "Bonds").unwrap().1;
        assert_eq!(bonds[0], "1 1 1 2");
        assert_eq!(bonds[3], "4 1 4 6");
    }

    #[test]
    fn test_water_mapper_rejects_wrong_ordering() {
        let mut cell = water_cell();
        cell.elements[0] = "H".to_string();

        let mut creator = sample_creator();
        creator.geom = Some(cell);
        assert!(creator.create().is_err());
    }

    #[test]
    fn test_atomic_mapper_types_by_appearance() {
        let mut cell = UnitCell::new([[8.0, 0.0, 0.0], [0.0, 8.0, 0.0], [0.0, 0.0, 8.0]]);
        cell.add_atom("Mg", [0.0, 0.0, 0.0]);
        cell.add_atom("Zr", [0.5, 0.5, 0.5]);

        let sections = AtomicStyleMapper.data_sections(&cell).unwrap();
        let atoms = &sections.iter().find(|(k, _)| k == "Atoms").unwrap().1;
        assert!(atoms[0].starts_with("1 1 "));
        assert!(atoms[1].starts_with("2 2 "));
    }

    #[test]
    fn test_non_orthogonal_cell_rejected() {
        let mut cell = water_cell();
        cell.lattice[1][0] = 2.0;

        let mut creator = sample_creator();
        creator.geom = Some(cell);
        assert!(creator.create().is_err());
    }

    #[test]
    fn test_create_with_restores_state() {
        let creator = sample_creator();
        creator
            .create_with(LammpsOverrides {
                run_steps: Some(5000),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(creator.run_steps, Some(1000));
    }
}
