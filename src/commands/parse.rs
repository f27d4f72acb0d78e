//! # parse 命令实现
//!
//! 解析单个后端输出文件，终端表格展示能量、原子数、晶胞
//! 参数与可选字段。
//!
//! ## 依赖关系
//! - 使用 `cli/parse.rs` 定义的参数
//! - 使用 `parsers/`, `utils/output.rs`
//! - 使用 `utils/units.rs` 做展示单位换算

use crate::cli::parse::ParseArgs;
use crate::error::{CalcKitError, Result};
use crate::parsers::parse_output_file;
use crate::utils::output;
use crate::utils::units::bohr_to_angstrom;
use tabled::{Table, Tabled};

/// 摘要表格行
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// 执行 parse 命令
pub fn execute(args: ParseArgs) -> Result<()> {
    output::print_header("Parsing Output File");

    if !args.file.exists() {
        return Err(CalcKitError::OutputFileNotFound {
            path: args.file.display().to_string(),
        });
    }

    let parsed = parse_output_file(&args.file, !args.allow_unconverged)?;

    let (a, b, c, alpha, beta, gamma) = parsed.unit_cell.parameters();
    let mut rows = vec![
        SummaryRow {
            quantity: "Total energy (eV)".to_string(),
            value: format!("{:.6}", parsed.energy_ev),
        },
        SummaryRow {
            quantity: "Energy per atom (eV)".to_string(),
            value: format!("{:.6}", parsed.energy_per_atom()),
        },
        SummaryRow {
            quantity: "Atoms".to_string(),
            value: parsed.num_atoms.to_string(),
        },
        SummaryRow {
            quantity: "Cell a, b, c (Å)".to_string(),
            value: format!(
                "{:.4}, {:.4}, {:.4}",
                bohr_to_angstrom(a),
                bohr_to_angstrom(b),
                bohr_to_angstrom(c)
            ),
        },
        SummaryRow {
            quantity: "Cell α, β, γ (°)".to_string(),
            value: format!("{:.2}, {:.2}, {:.2}", alpha, beta, gamma),
        },
        SummaryRow {
            quantity: "SCF converged".to_string(),
            value: parsed.scf_converged.to_string(),
        },
    ];

    if let Some(forces) = &parsed.forces {
        let max_force = forces
            .iter()
            .map(|f| (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt())
            .fold(0.0, f64::max);
        rows.push(SummaryRow {
            quantity: "Max force (eV/bohr)".to_string(),
            value: format!("{:.6}", max_force),
        });
    }
    if let Some(charges) = &parsed.mulliken_charges {
        rows.push(SummaryRow {
            quantity: "Mulliken charges".to_string(),
            value: format!("{} atoms", charges.len()),
        });
    }
    if let Some(neb) = &parsed.neb {
        if let Some(barrier) = neb.barrier_ev() {
            rows.push(SummaryRow {
                quantity: "NEB barrier (eV)".to_string(),
                value: format!("{:.6}", barrier),
            });
        }
    }

    println!("{}", Table::new(&rows));

    if !parsed.scf_converged {
        output::print_warning("SCF cycle did not converge; values may be unreliable.");
    }
    output::print_done(&format!("Parsed '{}'", args.file.display()));
    Ok(())
}
