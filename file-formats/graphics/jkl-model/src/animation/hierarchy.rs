//! Skeleton node tree stored as an arena with child index lists

use byteorder::{LittleEndian, WriteBytesExt};
use glam::Mat4;
use log::warn;
use std::io::{Read, Seek, Write};

use crate::error::{JklError, RecordLocation, Result};
use crate::io_ext::WriteExt;
use crate::reader::RecordReader;
use crate::types::NO_BONE;

/// A node of the skeleton hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    /// Bone driving this node, or [`NO_BONE`] for a pure transform node
    pub bone_id: i32,
    pub rest_transform: Mat4,
    /// Indices into the node arena, in traversal order
    pub children: Vec<usize>,
}

impl HierarchyNode {
    /// Smallest node record: bone id, transform and child count
    pub(crate) const MIN_SIZE: u64 = 4 + 64 + 4;

    pub fn new(bone_id: i32, rest_transform: Mat4, children: Vec<usize>) -> Self {
        Self {
            bone_id,
            rest_transform,
            children,
        }
    }

    /// Bone id, if this node is bound to a bone
    pub fn bone(&self) -> Option<i32> {
        (self.bone_id != NO_BONE).then_some(self.bone_id)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn parse<R: Read + Seek>(
        reader: &mut RecordReader<'_, R>,
        node: usize,
    ) -> Result<Self> {
        reader.at(RecordLocation::Node { node });

        let bone_id = reader.read_i32("node bone id")?;
        let rest_transform = reader.read_mat4("node transform")?;
        let child_count = reader.read_count("child count", 4)?;

        let mut children = Vec::with_capacity(child_count);
        for _ in 0..child_count {
            let child = reader.read_i32("child index")?;
            if child < 0 {
                return Err(JklError::InvalidHierarchy {
                    node,
                    reason: format!("negative child index {child}"),
                });
            }
            children.push(child as usize);
        }

        Ok(Self {
            bone_id,
            rest_transform,
            children,
        })
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.bone_id)?;
        writer.write_mat4(&self.rest_transform)?;
        writer.write_i32::<LittleEndian>(self.children.len() as i32)?;
        for child in &self.children {
            writer.write_i32::<LittleEndian>(*child as i32)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Validated node tree rooted at node 0
///
/// Construction guarantees every child index is in range, the graph is
/// acyclic, and no node has more than one parent. The root is never a child.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonHierarchy {
    nodes: Vec<HierarchyNode>,
}

impl SkeletonHierarchy {
    pub fn new(nodes: Vec<HierarchyNode>) -> Result<Self> {
        if nodes.is_empty() {
            warn!("Skeleton hierarchy has no nodes; pose evaluation will be empty");
            return Ok(Self { nodes });
        }

        for (index, node) in nodes.iter().enumerate() {
            if let Some(&child) = node.children.iter().find(|&&c| c >= nodes.len()) {
                return Err(JklError::InvalidHierarchy {
                    node: index,
                    reason: format!("child index {child} out of range for {} nodes", nodes.len()),
                });
            }
        }

        detect_cycle(&nodes)?;

        let mut parent: Vec<Option<usize>> = vec![None; nodes.len()];
        for (index, node) in nodes.iter().enumerate() {
            for &child in &node.children {
                if child == 0 {
                    return Err(JklError::InvalidHierarchy {
                        node: index,
                        reason: "root node 0 listed as a child".to_string(),
                    });
                }
                if let Some(first) = parent[child] {
                    return Err(JklError::InvalidHierarchy {
                        node: child,
                        reason: format!("shared child of nodes {first} and {index}"),
                    });
                }
                parent[child] = Some(index);
            }
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&HierarchyNode> {
        self.nodes.get(index)
    }

    pub fn root(&self) -> Option<&HierarchyNode> {
        self.nodes.first()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first pre-order walk from the root yielding `(node index, depth)`
    pub fn preorder(&self) -> Preorder<'_> {
        let stack = if self.nodes.is_empty() {
            Vec::new()
        } else {
            vec![(0, 0)]
        };
        Preorder {
            nodes: &self.nodes,
            stack,
        }
    }

    /// Nodes that the walk from the root never reaches
    pub fn unreachable_nodes(&self) -> Vec<usize> {
        let mut reached = vec![false; self.nodes.len()];
        for (index, _) in self.preorder() {
            reached[index] = true;
        }
        reached
            .iter()
            .enumerate()
            .filter_map(|(index, &seen)| (!seen).then_some(index))
            .collect()
    }

    /// Total number of child links
    pub fn child_link_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).sum()
    }
}

fn detect_cycle(nodes: &[HierarchyNode]) -> Result<()> {
    let mut marks = vec![Mark::Unvisited; nodes.len()];

    for start in 0..nodes.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        // (node, position in its child list)
        let mut stack = vec![(start, 0usize)];
        marks[start] = Mark::InProgress;

        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            match nodes[node].children.get(*next) {
                Some(&child) => {
                    *next += 1;
                    match marks[child] {
                        Mark::InProgress => return Err(JklError::HierarchyCycle { node: child }),
                        Mark::Unvisited => {
                            marks[child] = Mark::InProgress;
                            stack.push((child, 0));
                        }
                        Mark::Done => {}
                    }
                }
                None => {
                    marks[node] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }

    Ok(())
}

/// Iterator returned by [`SkeletonHierarchy::preorder`]
pub struct Preorder<'a> {
    nodes: &'a [HierarchyNode],
    stack: Vec<(usize, usize)>,
}

impl Iterator for Preorder<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, depth) = self.stack.pop()?;
        if let Some(node) = self.nodes.get(index) {
            self.stack
                .extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }
        Some((index, depth))
    }
}
