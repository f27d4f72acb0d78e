//! # 物理单位换算
//!
//! 统一约定：能量一律转换为 eV，长度一律转换为 bohr。
//! 各后端解析器在解析时完成转换，下游模块不再关心原始单位。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `models/` 使用
//! - 无外部模块依赖

/// 1 hartree 对应的 eV（CODATA 2018）
pub const EV_PER_HARTREE: f64 = 27.211386245988;

/// 1 Å 对应的 bohr
pub const BOHR_PER_ANGSTROM: f64 = 1.889726124626;

/// 1 Ry 对应的 eV
pub const EV_PER_RYDBERG: f64 = EV_PER_HARTREE / 2.0;

/// hartree -> eV
pub fn hartree_to_ev(e: f64) -> f64 {
    e * EV_PER_HARTREE
}

/// Å -> bohr
pub fn angstrom_to_bohr(x: f64) -> f64 {
    x * BOHR_PER_ANGSTROM
}

/// bohr -> Å
pub fn bohr_to_angstrom(x: f64) -> f64 {
    x / BOHR_PER_ANGSTROM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hartree_ev_round_trip() {
        let e = hartree_to_ev(1.0);
        assert!((e - 27.211386245988).abs() < 1e-9);
    }

    #[test]
    fn test_angstrom_bohr_round_trip() {
        let x = bohr_to_angstrom(angstrom_to_bohr(3.25));
        assert!((x - 3.25).abs() < 1e-12);
    }
}
