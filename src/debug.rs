use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::io;
use std::process::Command;

use generational_arena::Index;

use crate::{AvlTree, BinaryTree};

impl<T: fmt::Display> BinaryTree<T> {
    /// Writes the tree as a Graphviz digraph.
    ///
    /// Nodes are laid out one rank per tree level, with point markers for
    /// missing children so siblings keep their left/right placement.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item {
            Node(Index, u32),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root, 0));
        let mut next_id = 1u32;

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut links = String::new();

        while !queue.is_empty() {
            let remaining = queue.len();

            write!(w, "{{rank=same; ")?;

            for _rank_node in 0..remaining {
                let item = queue.pop_front().unwrap();

                let (idx, id) = match item {
                    Item::Node(idx, id) => (idx, id),
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let value = &self.node(idx).value;
                write!(w, "\"graph{name}-{id}\" [label=\"{value}\", shape=box]; ")?;

                for child in [self.node(idx).left(), self.node(idx).right()] {
                    let child_id = next_id;
                    next_id += 1;

                    match child {
                        Some(child) => {
                            queue.push_back(Item::Node(child, child_id));
                            writeln!(
                                links,
                                "\"graph{name}-{id}\" -> \"graph{name}-{child_id}\";"
                            )?;
                        }
                        None => {
                            queue.push_back(Item::Missing(child_id));
                            writeln!(
                                links,
                                "\"graph{name}-{id}\" -> \"graph{name}-missing{child_id}\";"
                            )?;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }

    /// Renders the tree to `<stem>.png` by writing `<stem>.dot` and invoking
    /// the external Graphviz executable at `dot_exe`.
    ///
    /// The tree itself is only read; everything else happens out of process.
    pub fn render_png(&self, dot_exe: &str, stem: &str) -> io::Result<()> {
        let mut dot = String::new();
        self.dotgraph(stem, &mut dot)
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "dot generation failed"))?;

        let dot_file = format!("{stem}.dot");
        let png_file = format!("{stem}.png");

        std::fs::write(&dot_file, dot)?;

        let status = Command::new(dot_exe)
            .args(["-Tpng", &dot_file, "-o", &png_file])
            .status()?;

        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("dot exited with {status}"),
            ));
        }

        Ok(())
    }
}

impl<T: fmt::Display> AvlTree<T> {
    /// Writes the tree as a Graphviz digraph.
    #[inline]
    pub fn dotgraph<W>(&self, name: &str, w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        self.base().dotgraph(name, w)
    }

    /// Renders the tree to `<stem>.png` via the external Graphviz executable
    /// at `dot_exe`.
    #[inline]
    pub fn render_png(&self, dot_exe: &str, stem: &str) -> io::Result<()> {
        self.base().render_png(dot_exe, stem)
    }
}
