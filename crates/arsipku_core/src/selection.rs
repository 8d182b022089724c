//! crates/arsipku_core/src/selection.rs
//!
//! Maps a user's text selection inside rendered document content back to plain
//! character offsets into the stored content string.
//!
//! Rendered content is modelled as a small node tree (elements and text leaves)
//! held in an arena. A selection is a pair of boundary points, each naming a
//! node and an offset inside it, exactly like a browser selection. The mapper
//! walks the text leaves under the content container in document order and
//! accumulates their lengths to turn those boundary points into flat offsets.
//!
//! Offsets count Unicode scalar values (`char`s). They are only meaningful if
//! the text leaves under the container, concatenated, equal the stored content
//! verbatim; [`RenderTree::from_content`] and [`RenderTree::from_segments`]
//! guarantee that.

use serde::{Deserialize, Serialize};

//=========================================================================================
// Render Tree
//=========================================================================================

/// Index of a node in a [`RenderTree`]. Only the tree hands these out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element(String),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
    children: Vec<NodeId>,
}

/// An arena of rendered nodes rooted at a single element.
#[derive(Debug, Clone)]
pub struct RenderTree {
    nodes: Vec<Node>,
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTree {
    /// Creates a tree holding only a root `body` element.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                kind: NodeKind::Element("body".to_string()),
                children: Vec::new(),
            }],
        }
    }

    /// Renders `content` verbatim as `body > div#document-content > p > text`.
    /// Returns the tree and the content container.
    pub fn from_content(content: &str) -> (Self, NodeId) {
        Self::from_segments(&[content])
    }

    /// Renders consecutive content segments, each in its own inline element,
    /// under a single paragraph. Used when existing annotations are highlighted.
    pub fn from_segments(segments: &[&str]) -> (Self, NodeId) {
        let mut tree = Self::new();
        let container = tree.append_element(tree.root(), "div");
        let paragraph = tree.append_element(container, "p");
        if let [only] = segments {
            tree.append_text(paragraph, only);
        } else {
            for segment in segments {
                let span = tree.append_element(paragraph, "span");
                tree.append_text(span, segment);
            }
        }
        (tree, container)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push(parent, NodeKind::Element(tag.to_string()))
    }

    fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    /// A parent outside the tree leaves the new node detached.
    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let attached = match self.nodes.get_mut(parent.0) {
            Some(node) => {
                node.children.push(id);
                Some(parent)
            }
            None => None,
        };
        self.nodes.push(Node {
            parent: attached,
            kind,
            children: Vec::new(),
        });
        id
    }

    /// The text of a text leaf, `None` for elements.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// True if `node` is `ancestor` or lies somewhere beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    /// All nodes under `from` (inclusive) in document order.
    fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Text leaves under `container`, in document order.
    pub fn text_nodes(&self, container: NodeId) -> Vec<NodeId> {
        self.preorder(container)
            .into_iter()
            .filter(|id| self.text(*id).is_some())
            .collect()
    }

    /// The concatenated text under `container`.
    pub fn text_content(&self, container: NodeId) -> String {
        self.text_nodes(container)
            .into_iter()
            .filter_map(|id| self.text(id))
            .collect()
    }

    /// Builds the selection a user would make by dragging over the flat range
    /// `start..end` of the container's text. `None` if the range is out of bounds.
    pub fn select(&self, container: NodeId, start: usize, end: usize) -> Option<TextSelection> {
        if start > end {
            return None;
        }
        let anchor = self.position_at(container, start)?;
        let focus = self.position_at(container, end)?;
        let text = self
            .text_content(container)
            .chars()
            .skip(start)
            .take(end - start)
            .collect();
        Some(TextSelection {
            anchor,
            focus,
            text,
        })
    }

    /// The boundary point for a flat offset, placed in the first text leaf that
    /// can hold it.
    fn position_at(&self, container: NodeId, flat: usize) -> Option<TextPosition> {
        let mut running = 0;
        for id in self.text_nodes(container) {
            let len = self.text(id).map(char_len).unwrap_or(0);
            if flat <= running + len {
                return Some(TextPosition {
                    node: id,
                    offset: flat - running,
                });
            }
            running += len;
        }
        None
    }

    /// Converts a boundary point into a flat offset over the container's text.
    /// Points before the container map to 0 and points after it to its length.
    fn flat_offset(&self, container: NodeId, position: TextPosition) -> usize {
        let order = self.preorder(self.root());
        let mut index = vec![usize::MAX; self.nodes.len()];
        for (i, id) in order.iter().enumerate() {
            index[id.0] = i;
        }

        // Boundary as (document-order index, offset inside that node).
        let boundary = match self.nodes.get(position.node.0).map(|n| &n.kind) {
            Some(NodeKind::Text(_)) => (index[position.node.0], position.offset),
            Some(NodeKind::Element(_)) => match self.children(position.node).get(position.offset) {
                Some(child) => (index[child.0], 0),
                None => {
                    let subtree = self.preorder(position.node).len();
                    (index[position.node.0] + subtree, 0)
                }
            },
            None => return 0,
        };

        let mut flat = 0;
        for id in self.text_nodes(container) {
            let len = self.text(id).map(char_len).unwrap_or(0);
            let at = index[id.0];
            if at < boundary.0 {
                flat += len;
            } else if at == boundary.0 {
                flat += boundary.1.min(len);
            }
        }
        flat
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

//=========================================================================================
// Selection and Offset Mapping
//=========================================================================================

/// A boundary point: a node and an offset inside it. For text leaves the
/// offset counts characters; for elements it counts children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextPosition {
    pub node: NodeId,
    pub offset: usize,
}

/// The user's active selection. `text` is what the platform reports as the
/// selected string and is kept independently of the offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSelection {
    pub anchor: TextPosition,
    pub focus: TextPosition,
    pub text: String,
}

impl TextSelection {
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Flat character offsets into the stored content, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionOffsets {
    pub start: usize,
    pub end: usize,
}

impl SelectionOffsets {
    /// `(0, 0)`: no text selected.
    pub const NONE: SelectionOffsets = SelectionOffsets { start: 0, end: 0 };

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Computes the flat `(start, end)` offsets of `selection` relative to the text
/// under `container`.
///
/// Returns [`SelectionOffsets::NONE`] when there is no selection, when it is
/// collapsed, or when the container is not an ancestor of its anchor. A
/// backwards selection (focus before anchor) is normalised.
pub fn selection_offsets(
    tree: &RenderTree,
    container: NodeId,
    selection: Option<&TextSelection>,
) -> SelectionOffsets {
    let Some(selection) = selection else {
        return SelectionOffsets::NONE;
    };
    if selection.is_collapsed() || !tree.contains(container, selection.anchor.node) {
        return SelectionOffsets::NONE;
    }

    let a = tree.flat_offset(container, selection.anchor);
    let b = tree.flat_offset(container, selection.focus);
    let offsets = SelectionOffsets {
        start: a.min(b),
        end: a.max(b),
    };
    if offsets.is_empty() {
        SelectionOffsets::NONE
    } else {
        offsets
    }
}
