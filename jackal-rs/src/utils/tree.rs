//! Tree structure rendering for model hierarchies

use console::Style;
use jkl_model::{JklModel, LeafBonePolicy, SkeletonHierarchy};

use super::format::format_bytes;

/// Represents a node in a tree structure
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub size: Option<u64>,
    pub children: Vec<TreeNode>,
    /// Shown in insertion order
    pub metadata: Vec<(String, String)>,
}

/// Types of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Root,
    Header,
    Mesh,
    /// Hierarchy node bound to a bone track
    Bone,
    /// Hierarchy node with no bone
    Joint,
}

/// Options for tree rendering
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
}

impl TreeNode {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            size: None,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn add_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }
}

impl NodeType {
    pub fn icon(&self) -> &'static str {
        match self {
            NodeType::Root => "📁",
            NodeType::Header => "📋",
            NodeType::Mesh => "🔺",
            NodeType::Bone => "🦴",
            NodeType::Joint => "◇",
        }
    }

    pub fn style(&self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                NodeType::Root => Style::new().bold().cyan(),
                NodeType::Header => Style::new().bold().yellow(),
                NodeType::Mesh => Style::new().green(),
                NodeType::Bone => Style::new().magenta(),
                NodeType::Joint => Style::new().dim(),
            }
        }
    }
}

// Children are detached iteratively so a deep skeleton cannot exhaust the
// stack in the default recursive drop.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Render a tree structure to string
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();

    // (node, prefix, is_last, depth)
    let mut stack = vec![(root, String::new(), true, 0usize)];
    while let Some((node, prefix, is_last, depth)) = stack.pop() {
        let child_prefix = render_line(node, &mut output, &prefix, is_last, depth, options);

        if options.max_depth.is_some_and(|max| depth + 1 > max) {
            continue;
        }
        let last = node.children.len().saturating_sub(1);
        for (i, child) in node.children.iter().enumerate().rev() {
            stack.push((child, child_prefix.clone(), i == last, depth + 1));
        }
    }

    output
}

/// Write one node and its metadata, returning the prefix for its children
fn render_line(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) -> String {
    let style = node.node_type.style(options.no_color);
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    let mut line = format!(
        "{}{}{} {}",
        prefix,
        connector,
        node.node_type.icon(),
        style.apply_to(&node.name)
    );
    if let Some(size) = node.size {
        line.push_str(&format!(" ({})", format_bytes(size)));
    }
    output.push_str(&line);
    output.push('\n');

    let child_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    if options.show_metadata {
        let meta_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        for (key, value) in &node.metadata {
            output.push_str(&format!(
                "{child_prefix}    {}: {value}\n",
                meta_style.apply_to(key)
            ));
        }
    }

    child_prefix
}

/// Depth of the skeleton root below the file root and the "Skeleton" header
const SKELETON_ROOT_DEPTH: usize = 2;

/// Build the display tree for a loaded model
///
/// Hierarchy nodes deeper than `max_depth` are never built.
pub fn model_tree(
    name: &str,
    model: &JklModel,
    file_size: Option<u64>,
    max_depth: Option<usize>,
) -> TreeNode {
    let mut root = TreeNode::new(name, NodeType::Root);
    if let Some(size) = file_size {
        root = root.with_size(size);
    }

    let mut meshes = TreeNode::new("Meshes", NodeType::Header)
        .with_metadata("count", model.meshes().len());
    for (i, mesh) in model.meshes().iter().enumerate() {
        meshes = meshes.add_child(
            TreeNode::new(format!("Mesh #{i}"), NodeType::Mesh)
                .with_metadata("vertices", mesh.vertices.len())
                .with_metadata("triangles", mesh.triangle_count()),
        );
    }

    let clip = model.clip();
    let mut skeleton = TreeNode::new("Skeleton", NodeType::Header)
        .with_metadata("bones", clip.bone_count())
        .with_metadata("nodes", clip.hierarchy().len());
    let within_depth = max_depth.is_none_or(|max| max >= SKELETON_ROOT_DEPTH);
    if within_depth
        && let Some(subtree) = hierarchy_subtree(
            clip.hierarchy(),
            clip.leaf_policy(),
            max_depth.map(|max| max - SKELETON_ROOT_DEPTH),
        )
    {
        skeleton = skeleton.add_child(subtree);
    }

    root.add_child(meshes).add_child(skeleton)
}

/// Build the skeleton subtree from the pre-order walk, down to `max_depth`
/// levels below the root node
fn hierarchy_subtree(
    hierarchy: &SkeletonHierarchy,
    policy: LeafBonePolicy,
    max_depth: Option<usize>,
) -> Option<TreeNode> {
    // Pre-order positions: each node's parent comes earlier than the node
    let mut built: Vec<Option<TreeNode>> = Vec::new();
    let mut parents: Vec<Option<usize>> = Vec::new();
    // Position of the most recent node at each depth
    let mut open: Vec<usize> = Vec::new();

    for (index, depth) in hierarchy.preorder() {
        if max_depth.is_some_and(|max| depth > max) {
            continue;
        }
        open.truncate(depth);
        parents.push(open.last().copied());
        open.push(built.len());
        built.push(Some(hierarchy_node(hierarchy, index, policy)));
    }

    // Later positions are attached first, so each child list comes out
    // reversed and is flipped once its node is complete
    for position in (1..built.len()).rev() {
        let (Some(mut node), Some(parent)) = (built[position].take(), parents[position]) else {
            continue;
        };
        node.children.reverse();
        if let Some(parent) = built[parent].as_mut() {
            parent.children.push(node);
        }
    }

    let mut root = built.into_iter().next().flatten()?;
    root.children.reverse();
    Some(root)
}

fn hierarchy_node(hierarchy: &SkeletonHierarchy, index: usize, policy: LeafBonePolicy) -> TreeNode {
    let Some(node) = hierarchy.node(index) else {
        return TreeNode::new(format!("Node #{index} (missing)"), NodeType::Joint);
    };

    match node.bone() {
        Some(bone_id) => {
            let tree = TreeNode::new(format!("Node #{index} → bone {bone_id}"), NodeType::Bone);
            if node.is_leaf() && policy == LeafBonePolicy::Exclude {
                tree.with_metadata("pose", "excluded (leaf)")
            } else {
                tree
            }
        }
        None => TreeNode::new(format!("Node #{index}"), NodeType::Joint),
    }
}
