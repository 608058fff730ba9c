// THEORY:
// A `ContourForest` is the output of the tracing layer: every closed boundary found
// in the clamped image, arranged by containment. It is stored as an arena (a flat
// `Vec` of nodes with parent/child indices) instead of a recursive tree, so that
// flattening never recurses no matter how deeply highlights nest.
//
// Key architectural principles:
// 1.  **Normalized Space**: paths are stored as fractions of the traced image's
//     width and height, origin at the *bottom-left*. Downsampling before tracing
//     therefore never changes reported positions.
// 2.  **Strict Forest**: a node's parent always has a smaller index than the node
//     itself. `from_traced` enforces this, which makes cycles impossible.
// 3.  **Stable Order**: `pre_order` visits roots in trace order and each node
//     before its children. Spot ordering in the final report follows it.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned rectangle in normalized, bottom-left-origin space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Whether a boundary encloses a foreground region or a hole inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourKind {
    Outer,
    Hole,
}

#[derive(Debug, Clone)]
pub struct Contour {
    /// Closed path; the last point connects back to the first.
    pub path: Vec<NormalizedPoint>,
    pub kind: ContourKind,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl Contour {
    /// Bounding box of the path, or `None` for an empty path.
    pub fn bounding_box(&self) -> Option<NormalizedRect> {
        let first = self.path.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for point in &self.path[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Some(NormalizedRect {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContourForest {
    nodes: Vec<Contour>,
    roots: Vec<usize>,
}

impl ContourForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the arena from traced contours listed with their parent index.
    ///
    /// A parent reference that does not point at an *earlier* contour is dropped
    /// and the contour becomes a root.
    pub fn from_traced<I>(traced: I) -> Self
    where
        I: IntoIterator<Item = (Vec<NormalizedPoint>, ContourKind, Option<usize>)>,
    {
        let mut forest = Self::new();
        for (path, kind, parent) in traced {
            forest.push(path, kind, parent);
        }
        forest
    }

    /// Appends one contour and returns its index.
    pub fn push(
        &mut self,
        path: Vec<NormalizedPoint>,
        kind: ContourKind,
        parent: Option<usize>,
    ) -> usize {
        let index = self.nodes.len();
        let parent = parent.filter(|&p| p < index);
        match parent {
            Some(p) => self.nodes[p].children.push(index),
            None => self.roots.push(index),
        }
        self.nodes.push(Contour {
            path,
            kind,
            parent,
            children: Vec::new(),
        });
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Contour> {
        self.nodes.get(index)
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Nesting depth of a node; roots are depth 0.
    pub fn depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(index).and_then(|c| c.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent].parent;
        }
        depth
    }

    /// Pre-order traversal of the whole forest with an explicit stack.
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            forest: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }
}

pub struct PreOrder<'a> {
    forest: &'a ContourForest,
    stack: Vec<usize>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (usize, &'a Contour);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.forest.nodes[index];
        self.stack.extend(node.children.iter().rev().copied());
        Some((index, node))
    }
}
