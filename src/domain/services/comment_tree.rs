//! Comment tree assembly.
//!
//! Collects fetched children level by level, refuses to revisit a post id
//! and stops expanding at a maximum depth, then assembles an immutable tree
//! with a resolved creator on every node.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::domain::entities::{Creator, Member, Post};

/// One post in a thread together with its replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub post: Post,

    /// Distance from the thread root (the root is 0)
    pub depth: usize,

    /// Direct replies in insertion order
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// Pre-order walk over every node below this one.
    pub fn descendants(&self) -> Vec<&CommentNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&CommentNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// A node referenced a member that could not be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("creator {0} of a thread post does not exist")]
pub struct MissingCreator(pub i64);

/// Accumulates the posts of a thread before assembly.
#[derive(Debug)]
pub struct CommentTree {
    root_id: i64,
    max_depth: usize,
    visited: HashSet<i64>,
    children: HashMap<i64, Vec<Post>>,
    skipped: Vec<i64>,
}

impl CommentTree {
    /// Start a tree rooted at `root_id`. Nodes deeper than `max_depth` are not expanded.
    pub fn new(root_id: i64, max_depth: usize) -> Self {
        let mut visited = HashSet::new();
        visited.insert(root_id);
        Self {
            root_id,
            max_depth,
            visited,
            children: HashMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Record the fetched children of `parent_id`, which sits at `parent_depth`.
    ///
    /// Returns the `(post_id, depth)` pairs whose own children should be fetched next.
    /// A child already seen elsewhere in the tree is dropped and remembered in
    /// [`CommentTree::skipped`].
    pub fn insert_children(
        &mut self,
        parent_id: i64,
        parent_depth: usize,
        fetched: Vec<Post>,
    ) -> Vec<(i64, usize)> {
        let depth = parent_depth + 1;
        let mut next = Vec::new();
        let mut kept = Vec::with_capacity(fetched.len());

        for child in fetched {
            if !self.visited.insert(child.post_id) {
                self.skipped.push(child.post_id);
                continue;
            }
            if depth < self.max_depth {
                next.push((child.post_id, depth));
            }
            kept.push(child);
        }

        self.children.insert(parent_id, kept);
        next
    }

    /// Ids of posts dropped because they were reached twice.
    pub fn skipped(&self) -> &[i64] {
        &self.skipped
    }

    /// Distinct author ids of every collected post, in ascending order.
    pub fn member_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .children
            .values()
            .flatten()
            .map(|p| p.member_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Build the immutable tree. `root` keeps the creator it already carries,
    /// or receives one from `members`.
    pub fn assemble(
        mut self,
        root: Post,
        members: &HashMap<i64, Member>,
    ) -> Result<CommentNode, MissingCreator> {
        debug_assert_eq!(root.post_id, self.root_id);
        let root = if root.creator.is_some() {
            root
        } else {
            attach(root, members)?
        };
        let root_id = self.root_id;
        let children = self.take_children(root_id, 1, members)?;
        Ok(CommentNode {
            post: root,
            depth: 0,
            children,
        })
    }

    fn take_children(
        &mut self,
        parent_id: i64,
        depth: usize,
        members: &HashMap<i64, Member>,
    ) -> Result<Vec<CommentNode>, MissingCreator> {
        let posts = self.children.remove(&parent_id).unwrap_or_default();
        let mut nodes = Vec::with_capacity(posts.len());
        for post in posts {
            let post_id = post.post_id;
            let post = attach(post, members)?;
            let children = self.take_children(post_id, depth + 1, members)?;
            nodes.push(CommentNode {
                post,
                depth,
                children,
            });
        }
        Ok(nodes)
    }
}

fn attach(post: Post, members: &HashMap<i64, Member>) -> Result<Post, MissingCreator> {
    let member = members
        .get(&post.member_id)
        .cloned()
        .ok_or(MissingCreator(post.member_id))?;
    Ok(post.with_creator(Creator::Member(member)))
}
