//! # 内置预设表
//!
//! 各后端的内置方法 / 参数 / 基组预设，打包成显式构造的
//! `Registry` 值。工厂每次调用返回全新对象，creator 取到后
//! 可任意修改而不影响预设本身。
//!
//! ## 依赖关系
//! - 被 `creators/` 各 creator 的 Default 实现使用
//! - 使用 `calc/`, `models/basis.rs`

use super::Registry;
use crate::calc::castep::TokenMap;
use crate::calc::cp2k::Cp2kInput;
use crate::calc::plato::{dft_run_comm, tb1_run_comm, tb2_run_comm, PlatoRunComm};
use crate::creators::PlatoMethodOpts;
use crate::models::BasisDescriptor;

/// CP2K 方法预设（PBE 单点 / 几何优化骨架）
pub fn cp2k_methods() -> Registry<Cp2kInput> {
    let mut reg = Registry::new();

    // 注册名均为内置，不会重复
    reg.register("cp2k_spe_pbe", || cp2k_pbe_skeleton("ENERGY"), false)
        .ok();
    reg.register("cp2k_geo_opt_pbe", || cp2k_pbe_skeleton("GEO_OPT"), false)
        .ok();

    reg
}

fn cp2k_pbe_skeleton(run_type: &str) -> Cp2kInput {
    let mut input = Cp2kInput::default();

    let global = input.section_mut(&["GLOBAL"]);
    global.set_param("RUN_TYPE", run_type);
    global.set_param("PRINT_LEVEL", "MEDIUM");

    input
        .section_mut(&["FORCE_EVAL"])
        .set_param("METHOD", "QUICKSTEP");

    let dft = input.section_mut(&["FORCE_EVAL", "DFT"]);
    dft.set_param("BASIS_SET_FILE_NAME", "BASIS_MOLOPT");
    dft.set_param("POTENTIAL_FILE_NAME", "GTH_POTENTIALS");

    input
        .section_mut(&["FORCE_EVAL", "DFT", "XC", "XC_FUNCTIONAL PBE"])
        .set_param("PARAMETRIZATION", "ORIG");

    let scf = input.section_mut(&["FORCE_EVAL", "DFT", "SCF"]);
    scf.set_param("EPS_SCF", "1.0E-7");
    scf.set_param("MAX_SCF", "300");

    let mgrid = input.section_mut(&["FORCE_EVAL", "DFT", "MGRID"]);
    mgrid.set_param("CUTOFF", "500.0");
    mgrid.set_param("REL_CUTOFF", "60.0");

    input
}

/// CASTEP 参数预设（.param 字典）
pub fn castep_params() -> Registry<TokenMap> {
    let mut reg = Registry::new();

    reg.register(
        "castep_spe_pbe",
        || {
            vec![
                ("task".to_string(), "SinglePoint".to_string()),
                ("xc_functional".to_string(), "PBE".to_string()),
                ("cut_off_energy".to_string(), "500.0 eV".to_string()),
                ("elec_energy_tol".to_string(), "1e-7".to_string()),
                ("max_scf_cycles".to_string(), "300".to_string()),
            ]
        },
        false,
    )
    .ok();

    reg.register(
        "castep_geo_opt_pbe",
        || {
            vec![
                ("task".to_string(), "GeometryOptimization".to_string()),
                ("xc_functional".to_string(), "PBE".to_string()),
                ("cut_off_energy".to_string(), "500.0 eV".to_string()),
                ("geom_energy_tol".to_string(), "1e-6 eV".to_string()),
                ("max_scf_cycles".to_string(), "300".to_string()),
            ]
        },
        false,
    )
    .ok();

    reg
}

/// Plato 方法预设（变体 + 基线 token 集）
pub fn plato_methods() -> Registry<PlatoMethodOpts> {
    let mut reg = Registry::new();

    reg.register(
        "plato_dft_pbe",
        || PlatoMethodOpts {
            variant: "dft".to_string(),
            tokens: vec![
                ("XCFunctional".to_string(), "PBE".to_string()),
                ("SCFTolerance".to_string(), "1e-7".to_string()),
                ("MaxSCFIterations".to_string(), "300".to_string()),
            ],
        },
        false,
    )
    .ok();

    reg.register(
        "plato_tb1_pbe",
        || PlatoMethodOpts {
            variant: "tb1".to_string(),
            tokens: vec![
                ("XCFunctional".to_string(), "PBE".to_string()),
                ("SCFTolerance".to_string(), "1e-6".to_string()),
            ],
        },
        false,
    )
    .ok();

    reg.register(
        "plato_tb2_pbe",
        || PlatoMethodOpts {
            variant: "tb2".to_string(),
            tokens: vec![
                ("XCFunctional".to_string(), "PBE".to_string()),
                ("SCFTolerance".to_string(), "1e-6".to_string()),
            ],
        },
        false,
    )
    .ok();

    reg
}

/// Plato 变体 -> 运行命令函数
pub fn plato_run_comms() -> Registry<PlatoRunComm> {
    let mut reg = Registry::new();

    reg.register("dft", || dft_run_comm as PlatoRunComm, false).ok();
    reg.register("tb1", || tb1_run_comm as PlatoRunComm, false).ok();
    reg.register("tb2", || tb2_run_comm as PlatoRunComm, false).ok();

    reg
}

/// 基组描述符预设；元素用 `for_element` 替换
pub fn basis_presets() -> Registry<BasisDescriptor> {
    let mut reg = Registry::new();

    reg.register(
        "dzvp_molopt_pbe",
        || BasisDescriptor::new("X", "DZVP-MOLOPT-GTH", "GTH-PBE"),
        false,
    )
    .ok();
    reg.register(
        "tzvp_molopt_pbe",
        || BasisDescriptor::new("X", "TZVP-MOLOPT-GTH", "GTH-PBE"),
        false,
    )
    .ok();
    reg.register(
        "szv_molopt_pbe",
        || BasisDescriptor::new("X", "SZV-MOLOPT-GTH", "GTH-PBE"),
        false,
    )
    .ok();

    reg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cp2k_preset_is_fresh_each_call() {
        let reg = cp2k_methods();

        let mut a = reg.get("cp2k_spe_pbe").unwrap();
        a.section_mut(&["GLOBAL"]).set_param("PROJECT", "scratch");

        let b = reg.get("cp2k_spe_pbe").unwrap();
        assert_eq!(b.section(&["GLOBAL"]).unwrap().get_param("PROJECT"), None);
    }

    #[test]
    fn test_cp2k_presets_carry_run_type() {
        let reg = cp2k_methods();
        let spe = reg.get("cp2k_spe_pbe").unwrap();
        let opt = reg.get("cp2k_geo_opt_pbe").unwrap();

        assert_eq!(
            spe.section(&["GLOBAL"]).unwrap().get_param("RUN_TYPE"),
            Some("ENERGY")
        );
        assert_eq!(
            opt.section(&["GLOBAL"]).unwrap().get_param("RUN_TYPE"),
            Some("GEO_OPT")
        );
    }

    #[test]
    fn test_castep_preset_tokens() {
        let reg = castep_params();
        let param = reg.get("castep_spe_pbe").unwrap();

        assert!(param.iter().any(|(k, v)| k == "task" && v == "SinglePoint"));
        assert!(param.iter().any(|(k, v)| k == "xc_functional" && v == "PBE"));
    }

    #[test]
    fn test_plato_variants_resolve_run_comms() {
        let methods = plato_methods();
        let run_comms = plato_run_comms();

        for name in methods.list_registered() {
            let opts = methods.get(&name).unwrap();
            assert!(run_comms.contains(&opts.variant), "variant {}", opts.variant);
        }
    }

    #[test]
    fn test_basis_preset_for_element() {
        let reg = basis_presets();
        let desc = reg.get("dzvp_molopt_pbe").unwrap().for_element("Mg");

        assert_eq!(desc.element, "Mg");
        assert_eq!(desc.basis_name, "DZVP-MOLOPT-GTH");
        assert!(!desc.ghost);
    }
}
