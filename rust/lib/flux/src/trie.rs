use std::collections::HashMap;

/// Topic trie with MQTT-style wildcards, used for subscription and request
/// routing.
///
/// - `+` matches exactly one level
/// - `#` matches all remaining levels, including none (must be last)
///
/// Levels are separated by `/`. The trie is a plain data structure; callers
/// that share it across tasks wrap it in a lock.
///
/// ```ignore
/// let mut trie = Trie::new();
/// trie.insert("posts/feed", 1);
/// trie.insert("posts/+", 2);
/// trie.insert("posts/#", 3);
/// assert_eq!(trie.matches("posts/feed"), vec![1, 2, 3]);
/// ```
pub struct Trie<T> {
    root: Node<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Exact(String),
    One,
    Rest,
}

struct Node<T> {
    children: HashMap<Segment, Node<T>>,
    values: Vec<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            values: Vec::new(),
        }
    }
}

fn levels(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

fn segments(pattern: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    for level in levels(pattern) {
        match level {
            "+" => out.push(Segment::One),
            "#" => {
                out.push(Segment::Rest);
                break;
            }
            exact => out.push(Segment::Exact(exact.to_string())),
        }
    }
    out
}

impl<T: Clone> Trie<T> {
    pub fn new() -> Self {
        Self {
            root: Node::default(),
        }
    }

    /// Store `value` under `pattern`. Several values may share a pattern.
    pub fn insert(&mut self, pattern: &str, value: T) {
        let mut node = &mut self.root;
        for segment in segments(pattern) {
            node = node.children.entry(segment).or_default();
        }
        node.values.push(value);
    }

    /// All values whose pattern matches the concrete `topic`.
    ///
    /// Order: exact branches first, then `+`, then `#`, depth-first.
    pub fn matches(&self, topic: &str) -> Vec<T> {
        let mut out = Vec::new();
        self.root.collect(&levels(topic), &mut out);
        out
    }

    /// Remove every value under exactly `pattern` for which `predicate`
    /// holds. Returns whether anything was removed.
    pub fn remove<F>(&mut self, pattern: &str, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let mut node = &mut self.root;
        for segment in segments(pattern) {
            match node.children.get_mut(&segment) {
                Some(child) => node = child,
                None => return false,
            }
        }
        let before = node.values.len();
        node.values.retain(|v| !predicate(v));
        node.values.len() < before
    }

    /// Whether anything is registered under exactly `pattern`.
    pub fn has_pattern(&self, pattern: &str) -> bool {
        let mut node = &self.root;
        for segment in segments(pattern) {
            match node.children.get(&segment) {
                Some(child) => node = child,
                None => return false,
            }
        }
        !node.values.is_empty()
    }
}

impl<T: Clone> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Node<T> {
    fn collect(&self, topic: &[&str], out: &mut Vec<T>) {
        let Some((first, rest)) = topic.split_first() else {
            out.extend(self.values.iter().cloned());
            if let Some(multi) = self.children.get(&Segment::Rest) {
                out.extend(multi.values.iter().cloned());
            }
            return;
        };

        if let Some(child) = self.children.get(&Segment::Exact((*first).to_string())) {
            child.collect(rest, out);
        }
        if let Some(single) = self.children.get(&Segment::One) {
            single.collect(rest, out);
        }
        if let Some(multi) = self.children.get(&Segment::Rest) {
            out.extend(multi.values.iter().cloned());
        }
    }
}
