//! # CP2K 计算对象
//!
//! 嵌套 section 树表示 CP2K 输入，序列化为 `<stem>.inp`；
//! 输出为 `<stem>.cpout`。副本轨迹 / NEB / PDOS 等辅助文件名
//! 由 stem 确定性推导。
//!
//! ## 依赖关系
//! - 被 `creators/cp2k.rs` 构造
//! - 使用 `parsers/cp2k_out.rs` 解析输出
//! - 使用 `calc/mod.rs` 的 BasePath / CalcMethod

use super::{require_out_file, write_text_file, BasePath, CalcMethod};
use crate::error::Result;
use crate::models::ParsedFile;
use crate::parsers::cp2k_out;
use std::path::PathBuf;

/// CP2K 输入 section：参数行 + 嵌套子 section
#[derive(Debug, Clone, PartialEq)]
pub struct Cp2kSection {
    pub name: String,
    pub params: Vec<(String, String)>,
    pub subsections: Vec<Cp2kSection>,
}

impl Cp2kSection {
    pub fn new(name: impl Into<String>) -> Self {
        Cp2kSection {
            name: name.into(),
            params: Vec::new(),
            subsections: Vec::new(),
        }
    }

    /// 追加或更新参数（token 已存在时覆盖值）
    pub fn set_param(&mut self, token: &str, value: impl Into<String>) {
        let value = value.into();
        for (k, v) in self.params.iter_mut() {
            if k == token {
                *v = value;
                return;
            }
        }
        self.params.push((token.to_string(), value));
    }

    pub fn get_param(&self, token: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == token)
            .map(|(_, v)| v.as_str())
    }

    /// 按名字找子 section，不存在则创建
    pub fn subsection_mut(&mut self, name: &str) -> &mut Cp2kSection {
        if let Some(idx) = self.subsections.iter().position(|s| s.name == name) {
            return &mut self.subsections[idx];
        }
        self.subsections.push(Cp2kSection::new(name));
        let last = self.subsections.len() - 1;
        &mut self.subsections[last]
    }

    fn serialize_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&format!("{}&{}\n", indent, self.name));
        for (k, v) in &self.params {
            out.push_str(&format!("{}  {} {}\n", indent, k, v));
        }
        for sub in &self.subsections {
            sub.serialize_into(out, depth + 1);
        }
        out.push_str(&format!("{}&END {}\n", indent, self.name));
    }
}

/// CP2K 输入：顶层 section 列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cp2kInput {
    pub sections: Vec<Cp2kSection>,
}

impl Cp2kInput {
    /// 按路径定位 section，中间节点不存在则创建
    pub fn section_mut(&mut self, path: &[&str]) -> &mut Cp2kSection {
        let (first, rest) = path.split_first().expect("section path must be non-empty");

        let idx = match self.sections.iter().position(|s| s.name == *first) {
            Some(i) => i,
            None => {
                self.sections.push(Cp2kSection::new(*first));
                self.sections.len() - 1
            }
        };

        let mut current = &mut self.sections[idx];
        for name in rest {
            current = current.subsection_mut(name);
        }
        current
    }

    pub fn section(&self, path: &[&str]) -> Option<&Cp2kSection> {
        let (first, rest) = path.split_first()?;
        let mut current = self.sections.iter().find(|s| s.name == *first)?;
        for name in rest {
            current = current.subsections.iter().find(|s| s.name == *name)?;
        }
        Some(current)
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            section.serialize_into(&mut out, 0);
        }
        out
    }
}

/// CP2K 计算对象
#[derive(Debug)]
pub struct Cp2kCalc {
    base_path: BasePath,
    input: Cp2kInput,
    exec: String,
    /// SCF 未收敛时是否仍返回解析结果
    suppress_unconverged: bool,
}

impl Cp2kCalc {
    pub fn new(base_path: BasePath, input: Cp2kInput) -> Self {
        Cp2kCalc {
            base_path,
            input,
            exec: "cp2k.psmp".to_string(),
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

    pub fn input(&self) -> &Cp2kInput {
        &self.input
    }
}

impl CalcMethod for Cp2kCalc {
    fn base_path(&self) -> &BasePath {
        &self.base_path
    }

    fn write_file(&self) -> Result<()> {
        write_text_file(&self.base_path.with_ext("inp"), &self.input.serialize())
    }

    fn run_comm(&self) -> String {
        format!(
            "cd \"{}\" && {} -i {}.inp -o {}.cpout",
            self.base_path.folder().display(),
            self.exec,
            self.base_path.stem(),
            self.base_path.stem(),
        )
    }

    fn out_file_path(&self) -> PathBuf {
        self.base_path.with_ext("cpout")
    }

    fn parsed_file(&self) -> Result<ParsedFile> {
        let out = self.out_file_path();
        require_out_file(&out)?;
        cp2k_out::parse_cp2k_output(&out, !self.suppress_unconverged)
    }
}

/// `{i}` 零填充宽度：副本总数的十进制位数
fn replica_pad_width(n_replicas: usize) -> usize {
    n_replicas.to_string().len()
}

/// 副本轨迹文件名：`<stem>-pos-Replica_nr_{i}-1.xyz`
pub fn replica_pos_file_name(stem: &str, replica: usize, n_replicas: usize) -> String {
    format!(
        "{}-pos-Replica_nr_{:0width$}-1.xyz",
        stem,
        replica,
        width = replica_pad_width(n_replicas)
    )
}

/// NEB 辅助输出文件名：`<stem>-BAND{i}.out`
pub fn neb_band_file_name(stem: &str, replica: usize, n_replicas: usize) -> String {
    format!(
        "{}-BAND{:0width$}.out",
        stem,
        replica,
        width = replica_pad_width(n_replicas)
    )
}

/// 按 k 标签分解的 PDOS 文件名：`<stem>-k{i}-1.pdos`
pub fn pdos_kind_file_name(stem: &str, index: usize, n_kinds: usize) -> String {
    format!(
        "{}-k{:0width$}-1.pdos",
        stem,
        index,
        width = replica_pad_width(n_kinds)
    )
}

/// 按原子列表分解的 PDOS 文件名：`<stem>-list{i}-1.pdos`
pub fn pdos_list_file_name(stem: &str, index: usize, n_lists: usize) -> String {
    format!(
        "{}-list{:0width$}-1.pdos",
        stem,
        index,
        width = replica_pad_width(n_lists)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_serialization_nested() {
        let mut input = Cp2kInput::default();
        let scf = input.section_mut(&["FORCE_EVAL", "DFT", "SCF"]);
        scf.set_param("MAX_SCF", "300");

        let text = input.serialize();
        assert!(text.contains("&FORCE_EVAL\n"));
        assert!(text.contains("&DFT\n"));
        assert!(text.contains("MAX_SCF 300"));
        assert!(text.contains("&END SCF"));
        assert!(text.contains("&END FORCE_EVAL"));
    }

    #[test]
    fn test_set_param_upserts() {
        let mut section = Cp2kSection::new("SCF");
        section.set_param("EPS_SCF", "1.0E-6");
        section.set_param("EPS_SCF", "1.0E-7");

        assert_eq!(section.params.len(), 1);
        assert_eq!(section.get_param("EPS_SCF"), Some("1.0E-7"));
    }

    #[test]
    fn test_run_comm_stable() {
        let calc = Cp2kCalc::new(BasePath::new("/tmp/x", "mg"), Cp2kInput::default());
        assert_eq!(calc.run_comm(), calc.run_comm());
        assert!(calc.run_comm().contains("cp2k.psmp -i mg.inp -o mg.cpout"));
    }

    #[test]
    fn test_out_file_path() {
        let calc = Cp2kCalc::new(BasePath::new("/tmp/x", "mg.inp"), Cp2kInput::default());
        assert_eq!(calc.out_file_path(), PathBuf::from("/tmp/x/mg.cpout"));
    }

    #[test]
    fn test_replica_file_names_padded() {
        assert_eq!(
            replica_pos_file_name("neb", 2, 8),
            "neb-pos-Replica_nr_2-1.xyz"
        );
        assert_eq!(
            replica_pos_file_name("neb", 2, 12),
            "neb-pos-Replica_nr_02-1.xyz"
        );
        assert_eq!(neb_band_file_name("neb", 7, 10), "neb-BAND07.out");
        assert_eq!(pdos_kind_file_name("dos", 1, 3), "dos-k1-1.pdos");
        assert_eq!(pdos_list_file_name("dos", 11, 20), "dos-list11-1.pdos");
    }
}
