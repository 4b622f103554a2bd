//! The radix tree proper: insertion with edge splitting, placeholder-aware
//! lookup, and priority-ordered sibling traversal.

use std::fmt;

use memchr::memchr;

use crate::node::{Edge, Node, NodeId};
use crate::{DELIMITER, PLACEHOLDER};

const ROOT: NodeId = NodeId(0);

/// Parameters captured from placeholder segments during a lookup.
///
/// Pairs are kept in capture order. Lookups are linear; a path rarely
/// carries more than a handful of parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    items: Vec<(String, String)>,
}

impl Captures {
    /// Returns the value captured under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of captured parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, name: &[u8], value: &[u8]) {
        self.items.push((
            String::from_utf8_lossy(name).into_owned(),
            String::from_utf8_lossy(value).into_owned(),
        ));
    }

    fn append(&mut self, mut other: Captures) {
        self.items.append(&mut other.items);
    }
}

/// A successful lookup: the stored value plus any captured parameters.
#[derive(Debug)]
pub struct Found<'a, T> {
    /// The value stored at the matched endpoint.
    pub value: &'a T,
    /// Parameters captured from placeholder segments.
    pub captures: Captures,
}

impl<T> Found<'_, T> {
    /// Returns the parameter captured under `name`, if any.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.captures.get(name)
    }
}

/// A radix (compressed prefix) tree.
///
/// Nodes live in an arena indexed by stable ids; splits allocate new slots
/// and relink parent edges instead of moving nodes around. The tree is
/// append-only: values can be replaced but never removed.
///
/// Insertion happens during a single-threaded configuration phase; lookups
/// are read-only and safe to run concurrently with each other. An insertion
/// racing a lookup must be excluded by the caller.
#[derive(Debug)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
    placeholder: u8,
    delimiter: u8,
    len: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Creates an empty tree with the default boundaries (`:` and `/`).
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundaries(PLACEHOLDER, DELIMITER)
    }

    /// Creates an empty tree with custom placeholder and delimiter bytes.
    #[must_use]
    pub fn with_boundaries(placeholder: u8, delimiter: u8) -> Self {
        Self {
            nodes: vec![Node::branch()],
            placeholder,
            delimiter,
            len: 0,
        }
    }

    /// Changes the placeholder and delimiter bytes.
    ///
    /// The new boundaries apply to subsequent lookups, including lookups
    /// against paths registered before the change: labels are reinterpreted,
    /// not rewritten.
    pub fn set_boundaries(&mut self, placeholder: u8, delimiter: u8) {
        self.placeholder = placeholder;
        self.delimiter = delimiter;
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no value has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `value` under `path`, restructuring the tree as needed.
    ///
    /// Inserting under an already-registered path replaces the previous
    /// value. An empty path is silently ignored.
    ///
    /// Every insertion ends with a full resort of sibling edges by
    /// descending priority; registration is a configuration-time operation,
    /// so the O(edges) cost is deliberate.
    pub fn add(&mut self, path: &str, value: T) {
        if path.is_empty() {
            return;
        }
        let mut remaining = path.as_bytes();
        let mut current = ROOT;
        loop {
            let Some((idx, lcp)) = self.matching_edge(current, remaining) else {
                // No edge shares a prefix: the whole remainder becomes a new
                // leaf. Fresh leaves settle at priority 1, counting their own
                // insertion.
                let leaf = self.alloc(Node::leaf(value));
                self.nodes[leaf.0].priority = 1;
                self.nodes[current.0]
                    .edges
                    .push(Edge::new(remaining.to_vec(), leaf));
                self.len += 1;
                break;
            };

            let child = self.nodes[current.0].edges[idx].child;
            self.nodes[child.0].priority += 1;
            let label_len = self.nodes[current.0].edges[idx].label.len();
            remaining = &remaining[lcp..];

            if remaining.is_empty() {
                if lcp == label_len {
                    // Exact match: the last registration wins.
                    if self.nodes[child.0].value.replace(value).is_none() {
                        self.len += 1;
                    }
                } else {
                    // The path is a strict prefix of the edge label. Push the
                    // old node down under the unmatched suffix and store the
                    // new value at the shortened edge's target.
                    //
                    //   ("tomato", old)  +  "tom"
                    //   => ("tom", new) -> ("ato", old)
                    let suffix = self.nodes[current.0].edges[idx].label.split_off(lcp);
                    let pushed = self.alloc_sibling_of(child);
                    let node = &mut self.nodes[child.0];
                    node.edges.push(Edge::new(suffix, pushed));
                    node.value = Some(value);
                    self.len += 1;
                }
                break;
            }

            if lcp == label_len {
                // The edge label is fully consumed with path left over:
                // descend and keep walking.
                current = child;
                continue;
            }

            // Remainder on both sides: split into a valueless branch point
            // holding the old suffix and the new one.
            //
            //   ("tomato", old)  +  "tornado"
            //   => ("to", -) -> ("mato", old)
            //               +> ("rnado", new)
            let suffix = self.nodes[current.0].edges[idx].label.split_off(lcp);
            let pushed = self.alloc_sibling_of(child);
            let leaf = self.alloc(Node::leaf(value));
            let branch = &mut self.nodes[child.0];
            branch.edges.push(Edge::new(suffix, pushed));
            branch.edges.push(Edge::new(remaining.to_vec(), leaf));
            self.len += 1;
            break;
        }
        self.sort_by_priority(ROOT);
    }

    /// Looks up `path`, returning the stored value and any captured
    /// parameters.
    ///
    /// Returns `None` for the empty path, for unregistered paths, and for
    /// paths that end on a pure branching point. A placeholder never
    /// captures an empty segment.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<Found<'_, T>> {
        if path.is_empty() {
            return None;
        }
        let mut remaining = path.as_bytes();
        let mut current = ROOT;
        let mut captures = Captures::default();

        while !remaining.is_empty() {
            let mut next = None;
            'walk: for edge in &self.nodes[current.0].edges {
                let mut label: &[u8] = &edge.label;
                let mut rem = remaining;
                let mut pending = Captures::default();
                loop {
                    let ph = memchr(self.placeholder, label).unwrap_or(label.len());
                    let prefix = &label[..ph];
                    if !rem.starts_with(prefix) {
                        continue 'walk;
                    }
                    rem = &rem[prefix.len()..];
                    if prefix.len() == label.len() {
                        next = Some(edge.child);
                        remaining = rem;
                        captures.append(pending);
                        break 'walk;
                    }

                    // A placeholder follows the static prefix; an empty
                    // segment is not a capturable value.
                    label = &label[ph..];
                    if rem.is_empty() {
                        continue 'walk;
                    }

                    // The name spans the marker to the next delimiter in the
                    // label; the value spans to the next delimiter in the
                    // path. Both scans start one byte in, matching the
                    // original boundary rule.
                    let name_end = match memchr(self.delimiter, &label[1..]) {
                        Some(i) => i + 1,
                        None => label.len(),
                    };
                    let value_end = match memchr(self.delimiter, &rem[1..]) {
                        Some(i) => i + 1,
                        None => rem.len(),
                    };
                    pending.push(&label[1..name_end], &rem[..value_end]);
                    label = &label[name_end..];
                    rem = &rem[value_end..];

                    if label.is_empty() && rem.is_empty() {
                        next = Some(edge.child);
                        remaining = rem;
                        captures.append(pending);
                        break 'walk;
                    }
                }
            }
            match next {
                Some(child) => current = child,
                None => return None,
            }
        }

        self.nodes[current.0]
            .value
            .as_ref()
            .map(|value| Found { value, captures })
    }

    /// First edge of `id` sharing a non-empty prefix with `path`, as
    /// `(edge index, common prefix length)`.
    fn matching_edge(&self, id: NodeId, path: &[u8]) -> Option<(usize, usize)> {
        self.nodes[id.0].edges.iter().enumerate().find_map(|(idx, edge)| {
            let lcp = common_prefix_len(&edge.label, path);
            (lcp > 0).then_some((idx, lcp))
        })
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn alloc_sibling_of(&mut self, id: NodeId) -> NodeId {
        let sibling = self.nodes[id.0].take_sibling();
        self.alloc(sibling)
    }

    /// Reorders every node's edges by descending child priority.
    ///
    /// The sort is stable, so siblings with equal priority stay in
    /// insertion order.
    fn sort_by_priority(&mut self, id: NodeId) {
        let mut edges = std::mem::take(&mut self.nodes[id.0].edges);
        edges.sort_by(|a, b| {
            self.nodes[b.child.0]
                .priority
                .cmp(&self.nodes[a.child.0].priority)
        });
        let children: Vec<NodeId> = edges.iter().map(|e| e.child).collect();
        self.nodes[id.0].edges = edges;
        for child in children {
            self.sort_by_priority(child);
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        for edge in &self.nodes[id.0].edges {
            let child = &self.nodes[edge.child.0];
            let marker = if child.value.is_some() { "*" } else { "-" };
            writeln!(
                f,
                "{:indent$}{marker} {label:?} (priority {priority})",
                "",
                indent = depth * 2,
                label = String::from_utf8_lossy(&edge.label),
                priority = child.priority,
            )?;
            self.fmt_node(f, edge.child, depth + 1)?;
        }
        Ok(())
    }
}

/// Diagnostic rendering of the tree structure.
///
/// Endpoints are marked `*`, branching points `-`. The format is for
/// humans; it is not a stability contract.
impl<T> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".")?;
        self.fmt_node(f, ROOT, 0)
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_ignored() {
        let mut tree = Tree::new();
        tree.add("", 1);
        assert!(tree.is_empty());
        assert!(tree.find("").is_none());
    }

    #[test]
    fn disjoint_static_paths() {
        let mut tree = Tree::new();
        tree.add("/alpha", 1);
        tree.add("/beta", 2);

        let alpha = tree.find("/alpha").unwrap();
        assert_eq!(*alpha.value, 1);
        assert!(alpha.captures.is_empty());

        let beta = tree.find("/beta").unwrap();
        assert_eq!(*beta.value, 2);
        assert!(beta.captures.is_empty());
    }

    #[test]
    fn shared_prefixes_resolve_independently() {
        let mut tree = Tree::new();
        tree.add("/test", 1);
        tree.add("/testing", 2);
        tree.add("/team", 3);

        assert_eq!(*tree.find("/test").unwrap().value, 1);
        assert_eq!(*tree.find("/testing").unwrap().value, 2);
        assert_eq!(*tree.find("/team").unwrap().value, 3);
        assert!(tree.find("/te").is_none());
        assert!(tree.find("/tes").is_none());
    }

    #[test]
    fn single_capture() {
        let mut tree = Tree::new();
        tree.add("/test/:name", 1);

        let found = tree.find("/test/hello").unwrap();
        assert_eq!(*found.value, 1);
        assert_eq!(found.param("name"), Some("hello"));
        assert_eq!(found.captures.len(), 1);
    }

    #[test]
    fn empty_segment_is_not_captured() {
        let mut tree = Tree::new();
        tree.add("/test/:name", 1);
        assert!(tree.find("/test/").is_none());
    }

    #[test]
    fn consecutive_captures() {
        let mut tree = Tree::new();
        tree.add("/test/:name1/:name2/:name3", 1);

        let found = tree.find("/test/a/b/c").unwrap();
        assert_eq!(found.param("name1"), Some("a"));
        assert_eq!(found.param("name2"), Some("b"));
        assert_eq!(found.param("name3"), Some("c"));
    }

    #[test]
    fn capture_between_static_segments() {
        let mut tree = Tree::new();
        tree.add("/test/:name/testing", 1);

        let found = tree.find("/test/hello/testing").unwrap();
        assert_eq!(found.param("name"), Some("hello"));
        assert!(tree.find("/test/hello").is_none());
        assert!(tree.find("/test/hello/nope").is_none());
    }

    #[test]
    fn captures_on_sibling_routes() {
        let mut tree = Tree::new();
        tree.add("/:test", 1);
        tree.add("/:test/test/:testing", 2);

        let one = tree.find("/123").unwrap();
        assert_eq!(*one.value, 1);
        assert_eq!(one.param("test"), Some("123"));

        let two = tree.find("/123/test/456").unwrap();
        assert_eq!(*two.value, 2);
        assert_eq!(two.param("test"), Some("123"));
        assert_eq!(two.param("testing"), Some("456"));
    }

    #[test]
    fn reinsertion_replaces_the_value() {
        let mut tree = Tree::new();
        tree.add("/x", 1);
        tree.add("/x", 2);

        assert_eq!(tree.len(), 1);
        assert_eq!(*tree.find("/x").unwrap().value, 2);
    }

    #[test]
    fn both_split_cases() {
        let mut tree = Tree::new();
        tree.add("/tomato", 1);
        tree.add("/tornado", 2);
        // "/to" is now a pure branching point.
        assert!(tree.find("/to").is_none());

        tree.add("/to", 3);
        assert_eq!(tree.len(), 3);
        assert_eq!(*tree.find("/tomato").unwrap().value, 1);
        assert_eq!(*tree.find("/tornado").unwrap().value, 2);
        assert_eq!(*tree.find("/to").unwrap().value, 3);
    }

    #[test]
    fn prefix_insertion_pushes_old_node_down() {
        let mut tree = Tree::new();
        tree.add("tomato", 1);
        tree.add("tom", 2);

        assert_eq!(*tree.find("tomato").unwrap().value, 1);
        assert_eq!(*tree.find("tom").unwrap().value, 2);
        assert!(tree.find("toma").is_none());
    }

    #[test]
    fn siblings_share_no_static_prefix() {
        let mut tree = Tree::new();
        tree.add("/test", 1);
        tree.add("/testing", 2);
        tree.add("/team", 3);
        tree.add("/tornado", 4);

        for node in &tree.nodes {
            for (i, a) in node.edges.iter().enumerate() {
                for b in &node.edges[i + 1..] {
                    assert_eq!(
                        common_prefix_len(&a.label, &b.label),
                        0,
                        "edges {:?} and {:?} collide",
                        String::from_utf8_lossy(&a.label),
                        String::from_utf8_lossy(&b.label),
                    );
                }
            }
        }
    }

    #[test]
    fn heavier_branches_sort_first() {
        let mut tree = Tree::new();
        tree.add("/a/one", 1);
        tree.add("/b/red", 2);
        tree.add("/b/green", 3);
        tree.add("/b/blue", 4);
        tree.add("/b/pink", 5);

        // Four insertions passed through the "b/" branch, one through "a/".
        let root_edges = &tree.nodes[ROOT.0].edges;
        assert_eq!(root_edges[0].label, b"/".to_vec());
        let branch = &tree.nodes[root_edges[0].child.0];
        assert_eq!(branch.edges[0].label, b"b/".to_vec());
        assert_eq!(branch.edges[1].label, b"a/one".to_vec());
    }

    #[test]
    fn lookups_are_idempotent() {
        let mut tree = Tree::new();
        tree.add("/users/:id/posts", 7);

        let first = tree.find("/users/42/posts").map(|f| (*f.value, f.captures));
        let second = tree.find("/users/42/posts").map(|f| (*f.value, f.captures));
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn boundaries_are_reinterpreted_retroactively() {
        let mut tree = Tree::new();
        tree.add("/users/@id", 1);

        // With the default placeholder, "@id" is a static segment.
        assert!(tree.find("/users/7").is_none());
        assert_eq!(*tree.find("/users/@id").unwrap().value, 1);

        tree.set_boundaries(b'@', b'/');
        let found = tree.find("/users/7").unwrap();
        assert_eq!(found.param("id"), Some("7"));
    }

    #[test]
    fn display_renders_endpoints_and_branches() {
        let mut tree = Tree::new();
        tree.add("/tomato", 1);
        tree.add("/tornado", 2);

        let rendered = tree.to_string();
        assert!(rendered.contains("\"/to\""));
        assert!(rendered.contains("\"mato\""));
        assert!(rendered.contains("\"rnado\""));
        // The split point carries no value.
        assert!(rendered.contains("- \"/to\""));
        assert!(rendered.contains("* \"mato\""));
    }
}
