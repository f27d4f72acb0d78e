//! # 计算输出统一读模型
//!
//! 所有后端解析器都产出同一个 `ParsedFile` 结构：
//! 必填字段为总能量 (eV)、原子数、晶胞 (bohr)；
//! 其余字段依后端能力可选填充。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `calc/`, `workflows/` 使用
//! - 使用 `models/unit_cell.rs`

use crate::models::UnitCell;
use serde::{Deserialize, Serialize};

/// 轨迹单帧摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajFrame {
    /// 帧序号
    pub step: usize,
    /// 笛卡尔坐标 (bohr)
    pub coords: Vec<[f64; 3]>,
}

/// PDOS 片段（单个 k 标签或原子列表）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdosFragment {
    /// 片段标签（轨道角动量或原子列表名）
    pub label: String,
    /// 能量网格 (eV)
    pub energies: Vec<f64>,
    /// 对应态密度
    pub densities: Vec<f64>,
}

/// NEB 计算摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NebSummary {
    /// 副本数
    pub num_replicas: usize,
    /// 各副本能量 (eV)
    pub replica_energies: Vec<f64>,
}

impl NebSummary {
    /// 势垒：最高副本能量减首个副本能量
    pub fn barrier_ev(&self) -> Option<f64> {
        let first = *self.replica_energies.first()?;
        let max = self
            .replica_energies
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        Some(max - first)
    }
}

/// 单次计算的解析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFile {
    /// 总能量 (eV)
    pub energy_ev: f64,

    /// 原子数
    pub num_atoms: usize,

    /// 晶胞 (bohr)
    pub unit_cell: UnitCell,

    /// SCF 是否收敛（MD/经典力场后端恒为 true）
    pub scf_converged: bool,

    /// 原子受力 (eV/bohr)
    pub forces: Option<Vec<[f64; 3]>>,

    /// MD / NEB 轨迹摘要
    pub trajectory: Option<Vec<TrajFrame>>,

    /// PDOS 片段
    pub pdos_fragments: Option<Vec<PdosFragment>>,

    /// NEB 摘要
    pub neb: Option<NebSummary>,

    /// Mulliken 电荷，按原子顺序
    pub mulliken_charges: Option<Vec<f64>>,
}

impl ParsedFile {
    /// 规范构造入口：仅必填字段，可选字段由解析器按需填充
    pub fn new(energy_ev: f64, num_atoms: usize, unit_cell: UnitCell) -> Self {
        ParsedFile {
            energy_ev,
            num_atoms,
            unit_cell,
            scf_converged: true,
            forces: None,
            trajectory: None,
            pdos_fragments: None,
            neb: None,
            mulliken_charges: None,
        }
    }

    /// 每原子能量 (eV)
    pub fn energy_per_atom(&self) -> f64 {
        self.energy_ev / self.num_atoms as f64
    }

    /// 每原子体积 (bohr³)
    pub fn volume_per_atom(&self) -> f64 {
        self.unit_cell.volume() / self.num_atoms as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic_cell(a: f64) -> UnitCell {
        UnitCell::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    #[test]
    fn test_energy_per_atom() {
        let pf = ParsedFile::new(-20.0, 2, cubic_cell(5.0));
        assert!((pf.energy_per_atom() - (-10.0)).abs() < 1e-12);
    }

    #[test]
    fn test_volume_per_atom() {
        let pf = ParsedFile::new(-20.0, 2, cubic_cell(2.0));
        // 8 bohr³ / 2 原子
        assert!((pf.volume_per_atom() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_neb_barrier() {
        let neb = NebSummary {
            num_replicas: 3,
            replica_energies: vec![-10.0, -8.5, -9.9],
        };
        assert!((neb.barrier_ev().unwrap() - 1.5).abs() < 1e-12);
    }
}
