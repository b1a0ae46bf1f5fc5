/// Schema Navigator Module
///
/// The tree pane: a "Tables" root with one node per table and one child per
/// column. The tree is rebuilt from fresh catalog metadata on every refresh;
/// only the expanded/selected state survives a rebuild.
use crate::core::db::TableDescriptor;
use std::collections::HashSet;

/// One visible line of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Root,
    Table { name: String, expanded: bool },
    Column { table: String, label: String },
}

impl TreeNode {
    /// Text shown for the node, indented by depth.
    pub fn display(&self) -> String {
        match self {
            TreeNode::Root => "▾ Tables".to_string(),
            TreeNode::Table { name, expanded } => {
                format!("  {} {}", if *expanded { "▾" } else { "▸" }, name)
            }
            TreeNode::Column { label, .. } => format!("      {}", label),
        }
    }
}

/// Represents the schema navigator structure.
#[derive(Debug, Clone, Default)]
pub struct SchemaNavigator {
    tables: Vec<TableDescriptor>,
    expanded: HashSet<String>,
    pub selected: usize,
}

impl SchemaNavigator {
    /// Creates a new, empty SchemaNavigator.
    pub fn new() -> Self {
        SchemaNavigator::default()
    }

    /// Replaces the tree contents. Tables start expanded the first time
    /// they are seen; the selection is kept on the same table if it still
    /// exists.
    pub fn set_tables(&mut self, tables: Vec<TableDescriptor>) {
        let previous = self.selected_table().map(str::to_string);
        let fresh = self.tables.is_empty();
        self.tables = tables;
        if fresh {
            self.expanded = self.tables.iter().map(|t| t.name.clone()).collect();
        } else {
            let known: HashSet<&str> = self.tables.iter().map(|t| t.name.as_str()).collect();
            self.expanded.retain(|name| known.contains(name.as_str()));
        }

        self.selected = 0;
        if let Some(name) = previous {
            if let Some(index) = self.nodes().iter().position(
                |n| matches!(n, TreeNode::Table { name: t, .. } if *t == name),
            ) {
                self.selected = index;
            }
        }
    }

    pub fn clear(&mut self) {
        *self = SchemaNavigator::new();
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    /// The flattened list of visible nodes.
    pub fn nodes(&self) -> Vec<TreeNode> {
        if self.tables.is_empty() {
            return Vec::new();
        }
        let mut nodes = vec![TreeNode::Root];
        for table in &self.tables {
            let expanded = self.expanded.contains(&table.name);
            nodes.push(TreeNode::Table {
                name: table.name.clone(),
                expanded,
            });
            if expanded {
                nodes.extend(table.columns.iter().map(|c| TreeNode::Column {
                    table: table.name.clone(),
                    label: c.label(),
                }));
            }
        }
        nodes
    }

    /// Name of the table the selection is on (a table node or one of its
    /// columns).
    pub fn selected_table(&self) -> Option<&str> {
        let nodes = self.nodes();
        let name = match nodes.get(self.selected)? {
            TreeNode::Table { name, .. } => name.clone(),
            TreeNode::Column { table, .. } => table.clone(),
            TreeNode::Root => return None,
        };
        self.tables
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.name.as_str())
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.nodes().len() {
            self.selected += 1;
        }
    }

    /// Expands or collapses the selected table.
    pub fn toggle(&mut self) {
        let nodes = self.nodes();
        if let Some(TreeNode::Table { name, expanded }) = nodes.get(self.selected) {
            if *expanded {
                self.expanded.remove(name);
            } else {
                self.expanded.insert(name.clone());
            }
        }
    }

    /// Collapses the table around the selection and moves onto it.
    pub fn collapse(&mut self) {
        let Some(name) = self.selected_table().map(str::to_string) else {
            return;
        };
        self.expanded.remove(&name);
        if let Some(index) = self
            .nodes()
            .iter()
            .position(|n| matches!(n, TreeNode::Table { name: t, .. } if *t == name))
        {
            self.selected = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::ColumnInfo;

    fn column(name: &str, declared_type: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            primary_key_position: 0,
        }
    }

    fn sample_tables() -> Vec<TableDescriptor> {
        vec![
            TableDescriptor {
                name: "users".to_string(),
                columns: vec![column("id", "INTEGER"), column("name", "TEXT")],
            },
            TableDescriptor {
                name: "orders".to_string(),
                columns: vec![column("order_id", "INTEGER")],
            },
        ]
    }

    #[test]
    fn test_schema_navigator_lines() {
        let mut navigator = SchemaNavigator::new();
        navigator.set_tables(sample_tables());

        let lines: Vec<String> = navigator.nodes().iter().map(TreeNode::display).collect();
        assert_eq!(
            lines,
            vec![
                "▾ Tables",
                "  ▾ users",
                "      id (INTEGER)",
                "      name (TEXT)",
                "  ▾ orders",
                "      order_id (INTEGER)",
            ]
        );
    }

    #[test]
    fn test_selection_and_toggle() {
        let mut navigator = SchemaNavigator::new();
        navigator.set_tables(sample_tables());
        assert_eq!(navigator.selected_table(), None);

        navigator.move_down();
        assert_eq!(navigator.selected_table(), Some("users"));
        navigator.toggle();
        assert_eq!(navigator.nodes().len(), 4);

        navigator.move_down();
        assert_eq!(navigator.selected_table(), Some("orders"));
        navigator.move_down();
        assert_eq!(navigator.selected_table(), Some("orders"));
        navigator.move_down();
        assert_eq!(navigator.selected, 3);
    }

    #[test]
    fn test_collapse_from_column() {
        let mut navigator = SchemaNavigator::new();
        navigator.set_tables(sample_tables());
        navigator.selected = 3; // users.name
        navigator.collapse();
        assert_eq!(navigator.selected, 1);
        assert_eq!(navigator.nodes().len(), 4);
    }

    #[test]
    fn test_refresh_keeps_selection_and_state() {
        let mut navigator = SchemaNavigator::new();
        navigator.set_tables(sample_tables());
        navigator.selected = 1;
        navigator.toggle(); // collapse users
        navigator.move_down(); // orders

        let mut tables = sample_tables();
        tables.insert(
            0,
            TableDescriptor {
                name: "audit".to_string(),
                columns: vec![column("at", "TEXT")],
            },
        );
        navigator.set_tables(tables);

        assert_eq!(navigator.selected_table(), Some("orders"));
        assert!(navigator.nodes().contains(&TreeNode::Table {
            name: "users".to_string(),
            expanded: false
        }));
        // Tables discovered after the first load start collapsed.
        assert!(navigator.nodes().contains(&TreeNode::Table {
            name: "audit".to_string(),
            expanded: false
        }));
    }

    #[test]
    fn test_empty_tree() {
        let mut navigator = SchemaNavigator::new();
        navigator.set_tables(Vec::new());
        assert!(navigator.nodes().is_empty());
        navigator.move_down();
        assert_eq!(navigator.selected, 0);
    }
}
