//! 块引用可达性分析与未引用块的裁剪。

use std::collections::BTreeSet;

use dxfkit_core::Document;
use tracing::{debug, warn};

/// 从顶层实体出发，沿 INSERT / DIMENSION 的块引用做深度优先遍历的结果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockReachability {
    per_seed: Vec<(String, Vec<String>)>,
    reachable: BTreeSet<String>,
    truncated: bool,
}

impl BlockReachability {
    /// `iteration_limit` 限制出栈次数；达到上限后停止遍历并标记为截断。
    pub fn analyze(document: &Document, iteration_limit: Option<usize>) -> Self {
        let mut analysis = Self::default();
        let mut iterations = 0usize;

        let seeds = document.entities.iter().filter_map(|entity| entity.block_reference());
        'seeds: for seed in seeds {
            let mut found = Vec::new();
            let mut stack = vec![seed];
            while let Some(name) = stack.pop() {
                if iteration_limit.is_some_and(|limit| iterations >= limit) {
                    analysis.truncated = true;
                    analysis.per_seed.push((seed.to_string(), found));
                    break 'seeds;
                }
                iterations += 1;

                if !analysis.reachable.insert(name.to_string()) {
                    continue;
                }
                found.push(name.to_string());
                if let Some(block) = document.block(name) {
                    stack.extend(
                        block
                            .referenced_blocks()
                            .filter(|child| !analysis.reachable.contains(*child)),
                    );
                }
            }
            analysis.per_seed.push((seed.to_string(), found));
        }

        debug!(
            seeds = analysis.per_seed.len(),
            reachable = analysis.reachable.len(),
            iterations,
            "块可达性分析完成"
        );
        analysis
    }

    /// 所有种子可达块的并集。
    pub fn reachable(&self) -> &BTreeSet<String> {
        &self.reachable
    }

    pub fn contains(&self, name: &str) -> bool {
        self.reachable.contains(name)
    }

    /// 按种子列出本次遍历新访问到的块。
    ///
    /// 访问集合在种子之间共享：前面的种子已经访问过的块不会在后面的种子下重复出现，
    /// 所以单个种子的列表不是它的完整闭包，只有并集是完整的。
    pub fn per_seed(&self) -> &[(String, Vec<String>)] {
        &self.per_seed
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// 被引用但没有定义的块名。
    pub fn missing<'a>(&'a self, document: &'a Document) -> impl Iterator<Item = &'a str> {
        self.reachable
            .iter()
            .map(String::as_str)
            .filter(|name| !document.blocks.contains_key(*name))
    }

    /// 删除不可达的块，返回删除的数量。截断的分析结果不裁剪任何块。
    pub fn prune(&self, document: &mut Document) -> usize {
        if self.truncated {
            warn!("可达性分析被截断，跳过块裁剪");
            return 0;
        }
        let before = document.blocks.len();
        document.blocks.retain(|name, _| self.reachable.contains(name));
        let removed = before - document.blocks.len();
        debug!(removed, kept = document.blocks.len(), "裁剪未引用的块");
        removed
    }
}
