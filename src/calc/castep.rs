//! # CASTEP 计算对象
//!
//! 每次计算写两个输入：`<stem>.param`（token -> value）和
//! `<stem>.cell`（token -> value 或多行 block）；输出 `<stem>.castep`。
//!
//! ## 依赖关系
//! - 被 `creators/castep.rs` 构造
//! - 使用 `parsers/castep_out.rs` 解析输出
//! - 使用 `calc/mod.rs` 的 BasePath / CalcMethod

use super::{require_out_file, write_text_file, BasePath, CalcMethod};
use crate::error::Result;
use crate::models::ParsedFile;
use crate::parsers::castep_out;
use std::path::PathBuf;

/// .cell 文件条目：单行键值、裸标志或 %BLOCK
#[derive(Debug, Clone, PartialEq)]
pub enum CellEntry {
    Value(String),
    /// 仅写 token 本身（如 symmetry_generate）
    Flag,
    Block(Vec<String>),
}

/// 有序 token 映射（写出顺序与插入顺序一致）
pub type TokenMap = Vec<(String, String)>;

/// CASTEP 计算对象
pub struct CastepCalc {
    base_path: BasePath,
    param: TokenMap,
    cell: Vec<(String, CellEntry)>,
    exec: String,
    suppress_unconverged: bool,
}

impl CastepCalc {
    pub fn new(base_path: BasePath, param: TokenMap, cell: Vec<(String, CellEntry)>) -> Self {
        CastepCalc {
            base_path,
            param,
            cell,
            exec: "castep.serial".to_string(),
            suppress_unconverged: false,
        }
    }

    pub fn with_exec(mut self, exec: impl Into<String>) -> Self {
        self.exec = exec.into();
        self
    }

    pub fn suppress_unconverged(mut self, suppress: bool) -> Self {
        self.suppress_unconverged = suppress;
        self
    }

    pub fn param(&self) -> &TokenMap {
        &self.param
    }

    pub fn cell(&self) -> &[(String, CellEntry)] {
        &self.cell
    }

    fn param_file_text(&self) -> String {
        let mut out = String::new();
        for (k, v) in &self.param {
            out.push_str(&format!("{} : {}\n", k, v));
        }
        out
    }

    fn cell_file_text(&self) -> String {
        let mut out = String::new();
        for (k, entry) in &self.cell {
            match entry {
                CellEntry::Value(v) => out.push_str(&format!("{} : {}\n", k, v)),
                CellEntry::Flag => out.push_str(&format!("{}\n", k)),
                CellEntry::Block(lines) => {
                    out.push_str(&format!("%BLOCK {}\n", k));
                    for line in lines {
                        out.push_str(line);
                        out.push('\n');
                    }
                    out.push_str(&format!("%ENDBLOCK {}\n\n", k));
                }
            }
        }
        out
    }
}

impl CalcMethod for CastepCalc {
    fn base_path(&self) -> &BasePath {
        &self.base_path
    }

    fn write_file(&self) -> Result<()> {
        write_text_file(&self.base_path.with_ext("param"), &self.param_file_text())?;
        write_text_file(&self.base_path.with_ext("cell"), &self.cell_file_text())
    }

    fn run_comm(&self) -> String {
        format!(
            "cd \"{}\" && {} {}",
            self.base_path.folder().display(),
            self.exec,
            self.base_path.stem(),
        )
    }

    fn out_file_path(&self) -> PathBuf {
        self.base_path.with_ext("castep")
    }

    fn parsed_file(&self) -> Result<ParsedFile> {
        let out = self.out_file_path();
        require_out_file(&out)?;
        castep_out::parse_castep_output(&out, !self.suppress_unconverged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_calc() -> CastepCalc {
        let param = vec![
            ("task".to_string(), "SinglePoint".to_string()),
            ("cut_off_energy".to_string(), "600 eV".to_string()),
        ];
        let cell = vec![
            (
                "LATTICE_CART".to_string(),
                CellEntry::Block(vec![
                    "5.0 0.0 0.0".to_string(),
                    "0.0 5.0 0.0".to_string(),
                    "0.0 0.0 5.0".to_string(),
                ]),
            ),
            (
                "kpoint_mp_grid".to_string(),
                CellEntry::Value("4 4 4".to_string()),
            ),
            ("symmetry_generate".to_string(), CellEntry::Flag),
        ];
        CastepCalc::new(BasePath::new("/tmp/castep", "mg"), param, cell)
    }

    #[test]
    fn test_param_file_text() {
        let text = sample_calc().param_file_text();
        assert!(text.contains("task : SinglePoint"));
        assert!(text.contains("cut_off_energy : 600 eV"));
    }

    #[test]
    fn test_cell_file_blocks_and_values() {
        let text = sample_calc().cell_file_text();
        assert!(text.contains("%BLOCK LATTICE_CART"));
        assert!(text.contains("%ENDBLOCK LATTICE_CART"));
        assert!(text.contains("kpoint_mp_grid : 4 4 4"));
        assert!(text.contains("\nsymmetry_generate\n"));
    }

    #[test]
    fn test_run_comm_uses_seed_name() {
        let comm = sample_calc().run_comm();
        assert!(comm.ends_with("castep.serial mg"));
    }

    #[test]
    fn test_out_file_path() {
        assert_eq!(
            sample_calc().out_file_path(),
            PathBuf::from("/tmp/castep/mg.castep")
        );
    }
}
