//! # basis 命令实现
//!
//! 解析 CP2K 基组文件，表格展示各基函数；可选地做 ghost
//! 转换并重新序列化到新文件。
//!
//! ## 依赖关系
//! - 使用 `cli/basis.rs` 定义的参数
//! - 使用 `parsers/cp2k_basis.rs`, `models/basis.rs`, `utils/output.rs`

use crate::cli::basis::BasisArgs;
use crate::error::Result;
use crate::models::ghost_basis_set;
use crate::parsers::cp2k_basis::{parse_cp2k_basis_file, write_cp2k_basis_file};
use crate::utils::output;
use tabled::{Table, Tabled};

/// 基函数表格行
#[derive(Tabled)]
struct FunctionRow {
    #[tabled(rename = "Element")]
    element: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "n")]
    n: u32,
    #[tabled(rename = "l")]
    l: u32,
    #[tabled(rename = "Primitives")]
    primitives: usize,
    #[tabled(rename = "Exponent range")]
    exponent_range: String,
}

/// 执行 basis 命令
pub fn execute(args: BasisArgs) -> Result<()> {
    output::print_header("Inspecting CP2K Basis File");

    let sets = parse_cp2k_basis_file(&args.file, args.unnormalised)?;
    output::print_info(&format!(
        "Found {} basis set(s) in '{}'",
        sets.len(),
        args.file.display()
    ));

    let rows: Vec<FunctionRow> = sets
        .iter()
        .flat_map(|set| {
            set.functions.iter().map(|f| {
                let exponents = f.exponents();
                let min = exponents.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = exponents.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                FunctionRow {
                    element: set.element.clone(),
                    kind: set.kind.clone(),
                    n: f.n,
                    l: f.l,
                    primitives: f.prims.len(),
                    exponent_range: format!("{:.4} .. {:.4}", min, max),
                }
            })
        })
        .collect();
    println!("{}", Table::new(&rows));

    if let Some(ghost_path) = &args.ghost_output {
        let ghosts: Vec<_> = sets.iter().map(ghost_basis_set).collect();
        write_cp2k_basis_file(ghost_path, &ghosts, args.unnormalised)?;
        output::print_success(&format!(
            "Ghost-converted basis written to '{}'",
            ghost_path.display()
        ));
    }

    output::print_done("Basis inspection finished");
    Ok(())
}
