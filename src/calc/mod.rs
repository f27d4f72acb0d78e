//! # 计算对象契约
//!
//! `CalcMethod` 是所有后端的统一句柄：写输入文件、给出运行命令、
//! 定位输出文件、解析输出。身份由 base path（文件夹 + 文件名主干，
//! 构造时剥掉扩展名）确定；输出路径不依赖运行状态即可推导。
//!
//! ## 依赖关系
//! - 被 `creators/`, `workflows/` 使用
//! - 使用 `models/parsed_file.rs`
//! - 子模块: cp2k, castep, plato, lammps

pub mod castep;
pub mod cp2k;
pub mod lammps;
pub mod plato;

use crate::error::{CalcKitError, Result};
use crate::models::ParsedFile;
use std::fs;
use std::path::{Path, PathBuf};

pub use castep::CastepCalc;
pub use cp2k::Cp2kCalc;
pub use lammps::LammpsCalc;
pub use plato::PlatoCalc;

/// 计算的路径身份：文件夹 + 无扩展名主干
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePath {
    folder: PathBuf,
    stem: String,
}

impl BasePath {
    /// 构造时规范化：stem 若带扩展名则剥掉
    pub fn new(folder: impl Into<PathBuf>, stem: &str) -> Self {
        let stem = Path::new(stem)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(stem)
            .to_string();
        BasePath {
            folder: folder.into(),
            stem,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// `<folder>/<stem>.<ext>`
    pub fn with_ext(&self, ext: &str) -> PathBuf {
        self.folder.join(format!("{}.{}", self.stem, ext))
    }

    /// 文件夹内的任意文件名（log.lammps 等固定名输出用）
    pub fn sibling(&self, file_name: &str) -> PathBuf {
        self.folder.join(file_name)
    }
}

/// 后端计算对象的统一能力集
pub trait CalcMethod {
    /// 路径身份
    fn base_path(&self) -> &BasePath;

    /// 把输入物化到磁盘（幂等；自动创建中间目录）
    fn write_file(&self) -> Result<()>;

    /// 运行命令（纯函数，重复调用结果一致）
    fn run_comm(&self) -> String;

    /// 输出文件路径（纯函数，不要求计算已运行）
    fn out_file_path(&self) -> PathBuf;

    /// 解析输出为统一读模型
    fn parsed_file(&self) -> Result<ParsedFile>;
}

/// 各后端共用的输入写出：建目录 + 覆盖写
pub(crate) fn write_text_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CalcKitError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    fs::write(path, content).map_err(|e| CalcKitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 输出文件缺失时的统一错误
pub(crate) fn require_out_file(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(CalcKitError::OutputFileNotFound {
            path: path.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_path_strips_extension() {
        let bp = BasePath::new("/tmp/calcs", "mg_hcp.inp");
        assert_eq!(bp.stem(), "mg_hcp");
        assert_eq!(bp.with_ext("cpout"), PathBuf::from("/tmp/calcs/mg_hcp.cpout"));
    }

    #[test]
    fn test_base_path_accepts_bare_stem() {
        let bp = BasePath::new("/tmp/calcs", "mg_hcp");
        assert_eq!(bp.stem(), "mg_hcp");
    }

    #[test]
    fn test_sibling_path() {
        let bp = BasePath::new("/tmp/md", "water");
        assert_eq!(bp.sibling("log.lammps"), PathBuf::from("/tmp/md/log.lammps"));
    }
}
