//! Segment trie for one HTTP method.
//!
//! # Responsibilities
//! - Store registered patterns one segment per level
//! - Find the terminal node for a concrete request path
//! - Enumerate every registered route (introspection only)
//!
//! # Design Decisions
//! - Children are owned by their parent; the trie has no back-edges
//! - Candidates at each level are tried literal first, then `:param`,
//!   then `*catch-all`, so precedence never depends on registration order
//! - First successful full match wins (backtracking, not global ranking)

use std::fmt;

/// What a single trie segment matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SegmentKind {
    /// Matches one segment with identical text.
    Static,
    /// `:name`, matches any one segment.
    Param,
    /// `*name`, matches every remaining segment.
    CatchAll,
}

impl SegmentKind {
    fn of(segment: &str) -> Self {
        match segment.as_bytes().first() {
            Some(b':') => SegmentKind::Param,
            Some(b'*') => SegmentKind::CatchAll,
            _ => SegmentKind::Static,
        }
    }
}

/// A trie node keyed by one path segment.
#[derive(Debug, Default)]
pub struct Node {
    pattern: Option<String>,
    segment: String,
    children: Vec<Node>,
    is_wildcard: bool,
}

impl Node {
    fn with_segment(segment: &str) -> Self {
        Self {
            pattern: None,
            segment: segment.to_string(),
            children: Vec::new(),
            is_wildcard: SegmentKind::of(segment) != SegmentKind::Static,
        }
    }

    /// The full registered pattern, if this node terminates a route.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// The literal or wildcard token this node represents.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn is_wildcard(&self) -> bool {
        self.is_wildcard
    }

    pub fn kind(&self) -> SegmentKind {
        SegmentKind::of(&self.segment)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Inserts `segments[depth..]` below this node and stamps `pattern` on
    /// the last one. Re-inserting a pattern only rewrites the marker.
    pub fn insert(&mut self, pattern: &str, segments: &[&str], depth: usize) {
        let Some(&segment) = segments.get(depth) else {
            self.pattern = Some(pattern.to_string());
            return;
        };

        let index = match self.children.iter().position(|c| c.segment == segment) {
            Some(index) => index,
            None => {
                self.children.push(Node::with_segment(segment));
                self.children.len() - 1
            }
        };
        self.children[index].insert(pattern, segments, depth + 1);
    }

    /// Finds the terminal node matching `segments`, starting at `depth`.
    pub fn search(&self, segments: &[&str], depth: usize) -> Option<&Node> {
        if segments.len() == depth || self.segment.starts_with('*') {
            return self.pattern.as_ref().map(|_| self);
        }

        let segment = segments[depth];
        self.matching_children(segment)
            .into_iter()
            .find_map(|child| child.search(segments, depth + 1))
    }

    /// Collects every node below (and including) this one that terminates a
    /// route, in pre-order.
    pub fn travel<'a>(&'a self, routes: &mut Vec<&'a Node>) {
        if self.pattern.is_some() {
            routes.push(self);
        }
        for child in &self.children {
            child.travel(routes);
        }
    }

    fn matching_children(&self, segment: &str) -> Vec<&Node> {
        let mut matches: Vec<&Node> = self
            .children
            .iter()
            .filter(|child| child.is_wildcard || child.segment == segment)
            .collect();
        // stable: insertion order survives within each kind
        matches.sort_by_key(|child| child.kind());
        matches
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node{{pattern={}, segment={}, is_wildcard={}}}",
            self.pattern.as_deref().unwrap_or(""),
            self.segment,
            self.is_wildcard
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::segments::split_segments;

    fn build(patterns: &[&str]) -> Node {
        let mut root = Node::default();
        for pattern in patterns {
            root.insert(pattern, &split_segments(pattern), 0);
        }
        root
    }

    fn find<'a>(root: &'a Node, path: &str) -> Option<&'a str> {
        root.search(&split_segments(path), 0)
            .and_then(|node| node.pattern())
    }

    #[test]
    fn test_static_and_param() {
        let root = build(&["/p/doc", "/p/:lang/doc"]);

        assert_eq!(find(&root, "/p/doc"), Some("/p/doc"));
        assert_eq!(find(&root, "/p/go/doc"), Some("/p/:lang/doc"));
        assert_eq!(find(&root, "/p/go/doc/extra"), None);
        // intermediate node, not a route
        assert_eq!(find(&root, "/p"), None);
    }

    #[test]
    fn test_catch_all_swallows_rest() {
        let root = build(&["/static/*filepath"]);

        assert_eq!(find(&root, "/static/css/a.css"), Some("/static/*filepath"));
        assert_eq!(find(&root, "/static/a"), Some("/static/*filepath"));
        assert_eq!(find(&root, "/static"), None);
    }

    #[test]
    fn test_literal_beats_wildcard_regardless_of_order() {
        let root = build(&["/user/:id", "/user/me"]);
        assert_eq!(find(&root, "/user/me"), Some("/user/me"));
        assert_eq!(find(&root, "/user/42"), Some("/user/:id"));

        let root = build(&["/files/*rest", "/files/:name", "/files/index"]);
        assert_eq!(find(&root, "/files/index"), Some("/files/index"));
        assert_eq!(find(&root, "/files/a"), Some("/files/:name"));
        assert_eq!(find(&root, "/files/a/b"), Some("/files/*rest"));
    }

    #[test]
    fn test_backtracks_into_sibling_wildcard() {
        let root = build(&["/a/b/c", "/a/:x/d"]);
        // literal `b` is tried first and fails deeper, `:x` then succeeds
        assert_eq!(find(&root, "/a/b/d"), Some("/a/:x/d"));
    }

    #[test]
    fn test_reinsert_keeps_single_chain() {
        let root = build(&["/p/doc", "/p/doc"]);
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].children().len(), 1);
    }

    #[test]
    fn test_travel_lists_terminals_in_preorder() {
        let root = build(&["/", "/hello", "/hello/:name", "/assets/*filepath"]);
        let mut routes = Vec::new();
        root.travel(&mut routes);

        let patterns: Vec<_> = routes.iter().filter_map(|n| n.pattern()).collect();
        assert_eq!(
            patterns,
            vec!["/", "/hello", "/hello/:name", "/assets/*filepath"]
        );
    }

    #[test]
    fn test_display() {
        let root = build(&["/p/:lang"]);
        let lang = &root.children()[0].children()[0];
        assert_eq!(
            lang.to_string(),
            "node{pattern=/p/:lang, segment=:lang, is_wildcard=true}"
        );
    }
}
