//! # collect 命令实现
//!
//! 递归扫描目录树找已完成的后端输出文件，按每原子能量排名，
//! 终端表格展示前 N 条，完整榜单导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `parsers/`, `utils/output.rs`, `utils/progress.rs`
//! - 使用 `walkdir`, `csv`, `tabled` crate

use crate::cli::collect::CollectArgs;
use crate::error::{CalcKitError, Result};
use crate::models::ParsedFile;
use crate::parsers::parse_output_file;
use crate::utils::{output, progress};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use walkdir::WalkDir;

/// 排名表格行
#[derive(Tabled)]
struct RankRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "E/atom (eV)")]
    energy_per_atom: String,
    #[tabled(rename = "ΔE/atom (eV)")]
    delta: String,
}

struct CollectedResult {
    path: PathBuf,
    parsed: ParsedFile,
}

/// 执行 collect 命令
pub fn execute(args: CollectArgs) -> Result<()> {
    output::print_header("Collecting Calculation Results");

    if !args.calc_dir.exists() {
        return Err(CalcKitError::DirectoryNotFound {
            path: args.calc_dir.display().to_string(),
        });
    }

    let candidates: Vec<PathBuf> = WalkDir::new(&args.calc_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_output_file(p))
        .collect();

    output::print_info(&format!(
        "Scanning {} candidate output files...",
        candidates.len()
    ));

    let pb = progress::create_progress_bar(candidates.len() as u64, "Parsing");
    let mut results: Vec<CollectedResult> = Vec::new();

    for path in &candidates {
        if let Ok(parsed) = parse_output_file(path, !args.allow_unconverged) {
            results.push(CollectedResult {
                path: path.clone(),
                parsed,
            });
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if results.is_empty() {
        output::print_warning("No parsable finished calculations found.");
        return Ok(());
    }

    output::print_info(&format!("Found {} finished calculations", results.len()));

    results.sort_by(|a, b| {
        a.parsed
            .energy_per_atom()
            .partial_cmp(&b.parsed.energy_per_atom())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let min_energy = results[0].parsed.energy_per_atom();

    let rows: Vec<RankRow> = results
        .iter()
        .take(args.top_n)
        .enumerate()
        .map(|(i, r)| RankRow {
            rank: i + 1,
            file: r.path.display().to_string(),
            energy_per_atom: format!("{:.6}", r.parsed.energy_per_atom()),
            delta: format!("{:.6}", r.parsed.energy_per_atom() - min_energy),
        })
        .collect();

    output::print_header(&format!(
        "Top {} by Energy per Atom",
        args.top_n.min(results.len())
    ));
    println!("{}", Table::new(&rows));

    save_results_csv(&results, &args.output)?;
    output::print_success(&format!("Full ranking saved to '{}'", args.output.display()));
    Ok(())
}

/// 是否符合任一后端的输出文件名约定
fn is_output_file(path: &Path) -> bool {
    if path.file_name().and_then(|n| n.to_str()) == Some("log.lammps") {
        return true;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("cpout") | Some("castep") | Some("out")
    )
}

fn save_results_csv(results: &[CollectedResult], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(CalcKitError::CsvError)?;

    writer.write_record([
        "file",
        "energy_ev",
        "num_atoms",
        "energy_per_atom_ev",
        "volume_per_atom_bohr3",
        "scf_converged",
    ])?;
    for r in results {
        writer.write_record([
            r.path.display().to_string(),
            format!("{:.8}", r.parsed.energy_ev),
            r.parsed.num_atoms.to_string(),
            format!("{:.8}", r.parsed.energy_per_atom()),
            format!("{:.8}", r.parsed.volume_per_atom()),
            r.parsed.scf_converged.to_string(),
        ])?;
    }
    writer.flush().map_err(|e| CalcKitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
