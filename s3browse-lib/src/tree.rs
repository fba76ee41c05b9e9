use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::record::ObjectRecord;

/// Index of a node inside a [`ListingTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A grouping level with no object of its own.
///
/// Leaves and sub-directories are kept apart: a label is unique among the
/// leaves and a name is unique among the directories, but an object `a/b` and
/// a directory `a/b/` can sit side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub name: String,
    files: Vec<NodeId>,
    dirs: Vec<NodeId>,
    file_index: HashMap<String, NodeId>,
    dir_index: HashMap<String, NodeId>,
}

impl Directory {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            files: Vec::new(),
            dirs: Vec::new(),
            file_index: HashMap::new(),
            dir_index: HashMap::new(),
        }
    }

    /// Leaf children in insertion order.
    pub fn files(&self) -> &[NodeId] {
        &self.files
    }

    /// Directory children in insertion order.
    pub fn dirs(&self) -> &[NodeId] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }
}

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub label: String,
    pub record: ObjectRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Directory(Directory),
    Leaf(Leaf),
}

/// Arena owning every node of one listing. Parents refer to children by
/// [`NodeId`]; the root is always a directory named after the prefix.
#[derive(Debug, Clone)]
pub struct ListingTree {
    nodes: Vec<TreeNode>,
}

impl ListingTree {
    /// Creates a tree holding only the root directory.
    pub fn new(prefix: &str) -> Self {
        Self {
            nodes: vec![TreeNode::Directory(Directory::new(prefix))],
        }
    }

    /// Builds the tree for a whole listing.
    ///
    /// Records are inserted shallowest first (stable sort on the number of
    /// relative path segments), so every branch is created before anything
    /// deeper is hung off it.
    pub fn build(mut records: Vec<ObjectRecord>, prefix: &str) -> Self {
        debug!(
            "Building listing tree from {} records under prefix {:?}",
            records.len(),
            prefix
        );
        records.sort_by_key(|record| record.segment_count(prefix));

        let mut tree = Self::new(prefix);
        let root = tree.root();
        for record in records {
            let relative = record.relative_path(prefix).to_string();
            let segments: Vec<&str> = relative.split('/').collect();
            trace!("Inserting {:?} as {:?}", record.key, segments);
            tree.insert_segments(root, &segments, record);
        }
        tree
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    /// Returns the directory at `id`, or `None` if it is a leaf.
    pub fn directory(&self, id: NodeId) -> Option<&Directory> {
        match self.node(id) {
            TreeNode::Directory(dir) => Some(dir),
            TreeNode::Leaf(_) => None,
        }
    }

    pub fn leaf(&self, id: NodeId) -> Option<&Leaf> {
        match self.node(id) {
            TreeNode::Leaf(leaf) => Some(leaf),
            TreeNode::Directory(_) => None,
        }
    }

    /// Total number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, TreeNode::Leaf(_)))
            .count()
    }

    /// Inserts one record below `node` following its remaining path segments.
    ///
    /// * one segment: only the bucket `segments[0]` is ensured, nothing is
    ///   attached, so an object sitting directly under the prefix shows up as
    ///   an empty bucket.
    /// * two segments: the bucket `segments[0]` is ensured and a leaf labelled
    ///   `segments[1]` is attached to it, unless the label is empty (a key
    ///   ending in `/`).
    /// * more: the directory `segments[0]` is ensured and insertion recurses
    ///   into it.
    pub fn insert_segments(&mut self, node: NodeId, segments: &[&str], record: ObjectRecord) {
        match segments {
            [] => {}
            [bucket] => {
                self.ensure_directory(node, bucket);
            }
            [bucket, label] => {
                let dir = self.ensure_directory(node, bucket);
                if !label.is_empty() {
                    self.attach_leaf(dir, label, record);
                }
            }
            [head, rest @ ..] => {
                let dir = self.ensure_directory(node, head);
                self.insert_segments(dir, rest, record);
            }
        }
    }

    /// Returns the child directory `name` of `parent`, creating an empty one
    /// if absent. An existing directory is never replaced.
    pub fn ensure_directory(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(existing) = self.find_dir(parent, name) {
            return existing;
        }
        let id = self.push(TreeNode::Directory(Directory::new(name)));
        if let Some(dir) = self.directory_mut(parent) {
            dir.dirs.push(id);
            dir.dir_index.insert(name.to_string(), id);
        }
        id
    }

    /// Attaches a leaf labelled `label` under `parent`. A leaf with the same
    /// label is overwritten in place, keeping its position.
    pub fn attach_leaf(&mut self, parent: NodeId, label: &str, record: ObjectRecord) -> NodeId {
        if let Some(existing) = self.find_file(parent, label) {
            warn!(
                "Duplicate key {:?} in listing; keeping the last occurrence",
                record.key
            );
            self.nodes[existing.0] = TreeNode::Leaf(Leaf {
                label: label.to_string(),
                record,
            });
            return existing;
        }
        let id = self.push(TreeNode::Leaf(Leaf {
            label: label.to_string(),
            record,
        }));
        if let Some(dir) = self.directory_mut(parent) {
            dir.files.push(id);
            dir.file_index.insert(label.to_string(), id);
        }
        id
    }

    fn find_dir(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.directory(parent)?.dir_index.get(name).copied()
    }

    fn find_file(&self, parent: NodeId, label: &str) -> Option<NodeId> {
        self.directory(parent)?.file_index.get(label).copied()
    }

    fn push(&mut self, node: TreeNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn directory_mut(&mut self, id: NodeId) -> Option<&mut Directory> {
        match &mut self.nodes[id.0] {
            TreeNode::Directory(dir) => Some(dir),
            TreeNode::Leaf(_) => None,
        }
    }
}
