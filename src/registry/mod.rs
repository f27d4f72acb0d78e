//! # 字符串键注册表
//!
//! 名称 -> 工厂函数的注册表：方法预设与基组预设均通过它解析。
//! 键大小写不敏感（插入与查找均折叠为小写），
//! 重复注册必须显式传 overwrite 才允许覆盖。
//!
//! 注册表是显式构造的值（`with_builtins` 一次性填充内置预设表），
//! 而非进程级全局状态；creator 在构造时持有自己的注册表。
//!
//! ## 依赖关系
//! - 被 `creators/` 使用
//! - 子模块: presets
//! - 使用 `models/basis.rs` 的 BasisDescriptor

pub mod presets;

use crate::error::{CalcKitError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// 零参工厂
type Factory<T> = Box<dyn Fn() -> T>;

/// 通用名称注册表
pub struct Registry<T> {
    entries: BTreeMap<String, Factory<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Registry {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工厂；name 已存在且未传 overwrite 时报错
    pub fn register<F>(&mut self, name: &str, factory: F, overwrite: bool) -> Result<()>
    where
        F: Fn() -> T + 'static,
    {
        let key = name.to_lowercase();
        if self.entries.contains_key(&key) && !overwrite {
            return Err(CalcKitError::DuplicateRegistration { name: key });
        }
        self.entries.insert(key, Box::new(factory));
        Ok(())
    }

    /// 调用对应工厂并返回结果
    pub fn get(&self, name: &str) -> Result<T> {
        let key = name.to_lowercase();
        match self.entries.get(&key) {
            Some(factory) => Ok(factory()),
            None => Err(CalcKitError::UnknownRegistryKey { name: key }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    /// 返回已注册名称的副本，外部修改不影响注册表
    pub fn list_registered(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }
}
