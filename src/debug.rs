use std::{collections::VecDeque, fmt, fmt::Write};

use crate::{
    node::{Dir, Link},
    WavlTree,
};

impl<V> WavlTree<V> {
    /// Writes the tree as a graphviz digraph named `name`.
    ///
    /// Nodes are labeled `key:rank`, one `rank=same` row per depth. Missing children are drawn as
    /// points.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item {
            Node(crate::arena::NodeId),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        while !queue.is_empty() {
            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let node = match queue.pop_front() {
                    Some(Item::Node(node)) => self.node(node),
                    Some(Item::Missing(id)) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                    None => unreachable!("queue drained mid-level"),
                };

                let key = node.key;
                write!(w, "\"graph{name}-{key}\" [label=\"{key}:{}\"]; ", node.rank)?;

                for dir in Dir::BOTH {
                    if let Some(child) = node.child(dir) {
                        let child_key = self.node(child).key;

                        queue.push_back(Item::Node(child));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                        )?;
                    } else {
                        queue.push_back(Item::Missing(missing));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                        )?;
                        missing += 1;
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }

    /// Returns a [`Display`](fmt::Display) rendering of the tree, one line of `key rank` labels
    /// per depth with `/` and `\` edges in between.
    ///
    /// Line width doubles with every level, so this is only useful for small trees.
    pub fn pretty(&self) -> Pretty<'_, V> {
        Pretty { tree: self }
    }
}

/// A level-by-level text drawing of a [`WavlTree`]. See [`WavlTree::pretty`].
pub struct Pretty<'tree, V> {
    tree: &'tree WavlTree<V>,
}

impl<V> fmt::Display for Pretty<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree;
        let height = tree.height();

        let mut level: Vec<Link> = vec![tree.root];
        for depth in 1..=height {
            let floor = height - depth;
            let edge_lines = 1usize << floor.saturating_sub(1);
            let first_spaces = (1usize << floor) - 1;
            let between_spaces = (1usize << (floor + 1)) - 1;

            pad(f, first_spaces)?;

            let mut next = Vec::with_capacity(level.len() * 2);
            for &link in &level {
                match link {
                    Some(node) => {
                        let node = tree.node(node);
                        write!(f, "{} {}", node.key, node.rank)?;
                        next.extend([node.left(), node.right()]);
                    }
                    None => {
                        next.extend([None, None]);
                        f.write_char(' ')?;
                    }
                }

                pad(f, between_spaces)?;
            }
            f.write_char('\n')?;

            for i in 1..=edge_lines {
                for &link in &level {
                    pad(f, first_spaces.saturating_sub(i))?;

                    let Some(node) = link else {
                        pad(f, 2 * edge_lines + i + 1)?;
                        continue;
                    };
                    let node = tree.node(node);

                    f.write_char(if node.left().is_some() { '/' } else { ' ' })?;
                    pad(f, 2 * i - 1)?;
                    f.write_char(if node.right().is_some() { '\\' } else { ' ' })?;
                    pad(f, 2 * edge_lines - i)?;
                }

                f.write_char('\n')?;
            }

            level = next;
        }

        Ok(())
    }
}

fn pad(f: &mut fmt::Formatter<'_>, count: usize) -> fmt::Result {
    write!(f, "{:count$}", "")
}

#[cfg(test)]
mod tests {
    use crate::WavlTree;

    fn tree(keys: &[i64]) -> WavlTree<()> {
        let mut tree = WavlTree::new();
        for &key in keys {
            tree.insert(key, ()).unwrap();
        }
        tree
    }

    #[test]
    fn dotgraph_empty() {
        let mut out = String::new();
        WavlTree::<()>::new().dotgraph("t", &mut out).unwrap();
        assert_eq!(out, "digraph \"graph-t\" {}");
    }

    #[test]
    fn dotgraph_labels_ranks_and_missing_children() {
        let mut out = String::new();
        tree(&[2, 1]).dotgraph("t", &mut out).unwrap();

        assert!(out.starts_with("digraph \"graph-t\" {"));
        assert!(out.contains("\"grapht-2\" [label=\"2:1\"];"));
        assert!(out.contains("\"grapht-1\" [label=\"1:0\"];"));
        assert!(out.contains("\"grapht-2\" -> \"grapht-1\";"));
        assert!(out.contains("\"grapht-2\" -> \"grapht-missing0\";"));
        assert!(out.ends_with(" }\n}"));
    }

    #[test]
    fn pretty_draws_levels() {
        let rendered = tree(&[2, 1, 3]).pretty().to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0].trim(), "2 1");
        assert_eq!(lines[1].trim(), "/ \\");
        assert_eq!(
            lines[2].split_whitespace().collect::<Vec<_>>(),
            ["1", "0", "3", "0"]
        );
    }

    #[test]
    fn pretty_empty_is_blank() {
        assert_eq!(WavlTree::<()>::new().pretty().to_string(), "");
    }
}
