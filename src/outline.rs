use termtree::Tree;
use tracing::instrument;

use crate::arena::{CommandArena, NodeId};
use crate::node::CommandNode;

/// Render a command hierarchy as a `termtree` outline.
pub trait CommandOutline {
    fn to_tree_string(&self) -> Tree<String>;
}

impl CommandOutline for CommandArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(arena: &CommandArena, id: NodeId) -> Tree<String> {
            let node = arena.node(id);
            let leaves: Vec<_> = node
                .children()
                .iter()
                .map(|&child| build_tree(arena, child))
                .collect();
            Tree::new(label(node)).with_leaves(leaves)
        }

        build_tree(self, self.root())
    }
}

impl<W: std::io::Write> CommandOutline for crate::CommandTree<W> {
    fn to_tree_string(&self) -> Tree<String> {
        self.arena().to_tree_string()
    }
}

/// `name (alias, alias) [default]`
fn label(node: &CommandNode) -> String {
    let mut label = node.name().to_string();
    if !node.aliases().is_empty() {
        label.push_str(&format!(" ({})", node.aliases().join(", ")));
    }
    if node.is_default() {
        label.push_str(" [default]");
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandTree;

    #[test]
    fn given_nested_commands_when_outlined_then_lists_in_registration_order() {
        let mut say = CommandTree::with_writer("say", "same command", Vec::new());
        say.command("en", "say in english")
            .unwrap()
            .alias("english")
            .unwrap()
            .mark_default()
            .unwrap();
        say.command("fr", "say in french")
            .unwrap()
            .command("formal", "vous")
            .unwrap();

        let outline = say.to_tree_string().to_string();
        let lines: Vec<_> = outline.lines().collect();
        assert_eq!(lines[0], "say");
        assert!(lines[1].ends_with("en (english) [default]"), "{outline}");
        assert!(lines[2].ends_with("fr"), "{outline}");
        assert!(lines[3].ends_with("formal"), "{outline}");
    }
}
