//! # 系数更新器（观察者）
//!
//! 更新器收到原始系数向量后，先过可选变换器，再按注册顺序
//! 通知每个观察者。观察者失败立即向上传播，后续观察者不再
//! 收到本次更新。更新只单向流动（系数 -> 观察者），更新器
//! 持有工作流侧对象，反向引用不存在。

use super::transform::CoeffTransformer;
use crate::error::{CalcKitError, Result};
use crate::models::BasisSet;
use crate::parsers::cp2k_basis::write_cp2k_basis_file;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// 系数观察者
pub trait CoeffObserver {
    fn update_coeffs(&mut self, coeffs: &[f64]) -> Result<()>;
}

/// 内存记录器：保留最近一次收到的系数，句柄可在外部读取
#[derive(Default)]
pub struct CoeffRecorder {
    last: Rc<RefCell<Option<Vec<f64>>>>,
}

impl CoeffRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 共享同一存储的读取句柄
    pub fn handle(&self) -> Rc<RefCell<Option<Vec<f64>>>> {
        Rc::clone(&self.last)
    }
}

impl CoeffObserver for CoeffRecorder {
    fn update_coeffs(&mut self, coeffs: &[f64]) -> Result<()> {
        *self.last.borrow_mut() = Some(coeffs.to_vec());
        Ok(())
    }
}

/// CP2K 基组文件重写观察者：每次更新把系数写回指定基函数
/// 并重新序列化整个文件
pub struct BasisFileObserver {
    path: PathBuf,
    basis_set: BasisSet,
    function_index: usize,
    coeffs_for_unnormalised_gaussians: bool,
}

impl BasisFileObserver {
    pub fn new(
        path: impl Into<PathBuf>,
        basis_set: BasisSet,
        function_index: usize,
        coeffs_for_unnormalised_gaussians: bool,
    ) -> Result<Self> {
        if function_index >= basis_set.functions.len() {
            return Err(CalcKitError::InvalidArgument(format!(
                "basis set '{}' has {} functions, index {} is out of range",
                basis_set.kind,
                basis_set.functions.len(),
                function_index
            )));
        }
        Ok(BasisFileObserver {
            path: path.into(),
            basis_set,
            function_index,
            coeffs_for_unnormalised_gaussians,
        })
    }
}

impl CoeffObserver for BasisFileObserver {
    fn update_coeffs(&mut self, coeffs: &[f64]) -> Result<()> {
        let function = &mut self.basis_set.functions[self.function_index];
        if coeffs.len() != function.prims.len() {
            return Err(CalcKitError::InvalidArgument(format!(
                "basis function has {} primitives, got {} coefficients",
                function.prims.len(),
                coeffs.len()
            )));
        }
        function.set_coeffs(coeffs);

        write_cp2k_basis_file(
            &self.path,
            std::slice::from_ref(&self.basis_set),
            self.coeffs_for_unnormalised_gaussians,
        )
    }
}

/// 系数更新器：可选变换 + 有序观察者列表
#[derive(Default)]
pub struct CoeffUpdater {
    transformer: Option<Box<dyn CoeffTransformer>>,
    observers: Vec<Box<dyn CoeffObserver>>,
}

impl CoeffUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transformer(mut self, transformer: Box<dyn CoeffTransformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn CoeffObserver>) {
        self.observers.push(observer);
    }

    /// 变换后按注册顺序通知观察者，返回变换后的系数
    pub fn push(&mut self, raw: &[f64]) -> Result<Vec<f64>> {
        let coeffs = match &self.transformer {
            Some(t) => t.transform(raw)?,
            None => raw.to_vec(),
        };
        for observer in self.observers.iter_mut() {
            observer.update_coeffs(&coeffs)?;
        }
        Ok(coeffs)
    }
}
