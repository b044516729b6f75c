// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Name-pattern search over the child tree.

use alloc::string::ToString;

use crate::error::SceneError;

use super::{NodeId, SceneGraph};

type Visitor<'a> = dyn FnMut(&SceneGraph, NodeId) -> bool + 'a;

impl SceneGraph {
    /// Calls `callback` for every node matching `pattern` below `id`, until
    /// the callback returns `true`.
    ///
    /// A pattern is a `/`-separated path of name fragments; a segment matches
    /// any child whose name contains it. Two modifiers are recognized:
    ///
    /// - a leading `//` searches the whole subtree, trying the path at every
    ///   node in pre-order;
    /// - a trailing `/..` starts the search at the parent of `id` (a root
    ///   has no matches).
    ///
    /// Protected children are never searched. Returns whether the callback
    /// stopped the search.
    ///
    /// # Errors
    ///
    /// - [`SceneError::StaleNode`] if the handle is stale.
    /// - [`SceneError::InvalidName`] if the pattern is empty or contains an
    ///   empty segment.
    pub fn enumerate_children<F>(
        &self,
        id: NodeId,
        pattern: &str,
        mut callback: F,
    ) -> Result<bool, SceneError>
    where
        F: FnMut(&Self, NodeId) -> bool,
    {
        self.check_alive(id)?;
        let mut path = pattern;
        let mut recursive = false;
        if path.len() > 2 && path.starts_with("//") {
            recursive = true;
            path = &path[2..];
        }
        let mut from_parent = false;
        if path.len() > 3 && path.ends_with("/..") {
            from_parent = true;
            path = &path[..path.len() - 3];
        }
        if path.split('/').any(str::is_empty) {
            return Err(SceneError::InvalidName(pattern.to_string()));
        }

        let start = if from_parent {
            match self.parent_slot(id.idx) {
                Some(p) => p,
                None => return Ok(false),
            }
        } else {
            id.idx
        };
        Ok(if recursive {
            self.enumerate_recursive(start, path, &mut callback)
        } else {
            self.enumerate_path(start, path, &mut callback)
        })
    }

    fn enumerate_recursive(&self, idx: u32, path: &str, callback: &mut Visitor<'_>) -> bool {
        if self.enumerate_path(idx, path, callback) {
            return true;
        }
        self.children[idx as usize]
            .iter()
            .any(|&child| self.enumerate_recursive(child, path, callback))
    }

    fn enumerate_path(&self, idx: u32, path: &str, callback: &mut Visitor<'_>) -> bool {
        let (segment, rest) = match path.split_once('/') {
            Some((segment, rest)) => (segment, Some(rest)),
            None => (path, None),
        };
        for &child in &self.children[idx as usize] {
            if !self.identity[child as usize].name.contains(segment) {
                continue;
            }
            let stop = match rest {
                Some(rest) => self.enumerate_path(child, rest, callback),
                None => callback(self, self.id_at(child)),
            };
            if stop {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::node::ChildKey;

    fn named(g: &mut SceneGraph, parent: NodeId, name: &str) -> NodeId {
        let n = g.create_node();
        g.add_child(parent, n, None, Some(ChildKey::Name(name.into())))
            .unwrap();
        n
    }

    fn collect(g: &SceneGraph, id: NodeId, pattern: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        g.enumerate_children(id, pattern, |_, n| {
            out.push(n);
            false
        })
        .unwrap();
        out
    }

    /// root ─┬─ enemy_1 ── gun
    ///       ├─ enemy_2 ── gun
    ///       └─ hero ───── sword
    fn tree() -> (SceneGraph, NodeId, [NodeId; 6]) {
        let mut g = SceneGraph::new();
        let root = g.create_node();
        let e1 = named(&mut g, root, "enemy_1");
        let e2 = named(&mut g, root, "enemy_2");
        let hero = named(&mut g, root, "hero");
        let g1 = named(&mut g, e1, "gun");
        let g2 = named(&mut g, e2, "gun");
        let sword = named(&mut g, hero, "sword");
        (g, root, [e1, e2, hero, g1, g2, sword])
    }

    #[test]
    fn segments_match_by_containment() {
        let (g, root, [e1, e2, ..]) = tree();
        assert_eq!(collect(&g, root, "enemy"), vec![e1, e2]);
        assert_eq!(collect(&g, root, "_2"), vec![e2]);
    }

    #[test]
    fn paths_descend() {
        let (g, root, [_, _, _, g1, g2, _]) = tree();
        assert_eq!(collect(&g, root, "enemy/gun"), vec![g1, g2]);
        assert!(collect(&g, root, "hero/gun").is_empty());
    }

    #[test]
    fn double_slash_searches_subtree() {
        let (g, root, [_, _, _, g1, g2, sword]) = tree();
        assert!(collect(&g, root, "gun").is_empty());
        assert_eq!(collect(&g, root, "//gun"), vec![g1, g2]);
        assert_eq!(collect(&g, root, "//sword"), vec![sword]);
    }

    #[test]
    fn parent_suffix_starts_one_level_up() {
        let (g, root, [e1, e2, hero, ..]) = tree();
        assert_eq!(collect(&g, hero, "enemy/.."), vec![e1, e2]);
        assert!(collect(&g, root, "enemy/..").is_empty());
    }

    #[test]
    fn callback_stops_search() {
        let (g, root, [_, _, _, g1, ..]) = tree();
        let mut seen = Vec::new();
        let stopped = g
            .enumerate_children(root, "//gun", |_, n| {
                seen.push(n);
                true
            })
            .unwrap();
        assert!(stopped);
        assert_eq!(seen, vec![g1]);
    }

    #[test]
    fn empty_patterns_are_rejected() {
        let (g, root, _) = tree();
        for bad in ["", "a//b", "enemy/", "//"] {
            let err = g.enumerate_children(root, bad, |_, _| false).unwrap_err();
            assert!(err.is_invalid_argument(), "{bad:?}");
        }
    }
}
