//! # 标签与组合搜索
//!
//! (element, structure, method) 三元组标识一次计算，
//! 并提供叶 / 组合统一的 `get_objects_with_components` 搜索契约：
//! 返回值永远是列表，调用方无需区分叶和组合。
//!
//! ## 依赖关系
//! - 被 `workflows/` 与上层分析代码使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 计算标签三元组
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalcLabel {
    pub element: String,
    pub structure: String,
    pub method: String,
}

impl CalcLabel {
    pub fn new(
        element: impl Into<String>,
        structure: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        CalcLabel {
            element: element.into(),
            structure: structure.into(),
            method: method.into(),
        }
    }

    /// 三个标识分量，供搜索遍历
    pub fn components(&self) -> [&str; 3] {
        [&self.element, &self.structure, &self.method]
    }

    /// 每个查询 token 都至少匹配一个分量时为命中
    pub fn matches_components(&self, query: &[&str], opts: SearchOpts) -> bool {
        query.iter().all(|token| {
            self.components().iter().any(|comp| {
                if opts.case_sensitive {
                    component_match(comp, token, opts.partial_match)
                } else {
                    component_match(
                        &comp.to_lowercase(),
                        &token.to_lowercase(),
                        opts.partial_match,
                    )
                }
            })
        })
    }
}

fn component_match(comp: &str, token: &str, partial: bool) -> bool {
    if partial {
        comp.contains(token)
    } else {
        comp == token
    }
}

/// 搜索选项
#[derive(Debug, Clone, Copy)]
pub struct SearchOpts {
    pub case_sensitive: bool,
    pub partial_match: bool,
}

impl Default for SearchOpts {
    fn default() -> Self {
        SearchOpts {
            case_sensitive: true,
            partial_match: false,
        }
    }
}

/// 叶 / 组合统一搜索契约
pub trait ComponentSearch {
    /// 该对象（递归）携带的全部标签
    fn labels(&self) -> Vec<&CalcLabel>;

    /// 叶：命中返回 `[self]`，否则 `[]`；组合：各分支结果顺序拼接
    fn get_objects_with_components(
        &self,
        components: &[&str],
        opts: SearchOpts,
    ) -> Vec<&dyn ComponentSearch>;
}

/// 标签本身即为叶对象
impl ComponentSearch for CalcLabel {
    fn labels(&self) -> Vec<&CalcLabel> {
        vec![self]
    }

    fn get_objects_with_components(
        &self,
        components: &[&str],
        opts: SearchOpts,
    ) -> Vec<&dyn ComponentSearch> {
        if self.matches_components(components, opts) {
            vec![self]
        } else {
            vec![]
        }
    }
}

/// 标签组合（可嵌套）
pub struct LabelGroup {
    branches: Vec<Box<dyn ComponentSearch>>,
}

impl LabelGroup {
    pub fn new(branches: Vec<Box<dyn ComponentSearch>>) -> Self {
        LabelGroup { branches }
    }
}

impl ComponentSearch for LabelGroup {
    fn labels(&self) -> Vec<&CalcLabel> {
        self.branches.iter().flat_map(|b| b.labels()).collect()
    }

    fn get_objects_with_components(
        &self,
        components: &[&str],
        opts: SearchOpts,
    ) -> Vec<&dyn ComponentSearch> {
        self.branches
            .iter()
            .flat_map(|b| b.get_objects_with_components(components, opts))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(label: &CalcLabel) -> u64 {
        let mut h = DefaultHasher::new();
        label.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_label_equality_all_components() {
        let a = CalcLabel::new("Mg", "hcp", "A");
        let b = CalcLabel::new("Mg", "hcp", "A");
        let c = CalcLabel::new("Mg", "hcp", "B");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_leaf_search_returns_list() {
        let label = CalcLabel::new("Mg", "hcp", "A");

        let hit = label.get_objects_with_components(&["Mg"], SearchOpts::default());
        assert_eq!(hit.len(), 1);

        let miss = label.get_objects_with_components(&["Zr"], SearchOpts::default());
        assert!(miss.is_empty());
    }

    #[test]
    fn test_composite_search_concatenates_branches() {
        let group = LabelGroup::new(vec![
            Box::new(CalcLabel::new("Mg", "hcp", "A")),
            Box::new(CalcLabel::new("Mg", "bcc", "A")),
            Box::new(CalcLabel::new("Zr", "hcp", "B")),
        ]);

        let hits = group.get_objects_with_components(&["Mg", "hcp"], SearchOpts::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].labels()[0], &CalcLabel::new("Mg", "hcp", "A"));
    }

    #[test]
    fn test_case_insensitive_and_partial() {
        let label = CalcLabel::new("Mg", "hcp", "plato_tb1");

        let opts = SearchOpts {
            case_sensitive: false,
            partial_match: false,
        };
        assert_eq!(label.get_objects_with_components(&["mg"], opts).len(), 1);

        let opts = SearchOpts {
            case_sensitive: true,
            partial_match: true,
        };
        assert_eq!(label.get_objects_with_components(&["tb1"], opts).len(), 1);
        assert!(label
            .get_objects_with_components(&["TB1"], opts)
            .is_empty());
    }

    #[test]
    fn test_nested_group_flattens() {
        let inner = LabelGroup::new(vec![Box::new(CalcLabel::new("Mg", "hcp", "A"))]);
        let outer = LabelGroup::new(vec![
            Box::new(inner),
            Box::new(CalcLabel::new("Mg", "fcc", "A")),
        ]);

        let hits = outer.get_objects_with_components(&["Mg"], SearchOpts::default());
        assert_eq!(hits.len(), 2);
    }
}
