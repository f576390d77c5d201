//! Grouped Children Example
//!
//! Keeps a list of children grouped by their group name and ordered by
//! display order, then applies a few change batches and prints what a
//! collection view would be told to animate.
//!
//! Run with: cargo run -p horizon-results --example grouped_children
//! Set `RUST_LOG=horizon_results=trace` to see the reconciliation spans.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use horizon_results::prelude::*;
use horizon_results::TreeFormatOptions;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct ChildData {
    id: u32,
    group: Mutex<String>,
    display_order: u32,
}

/// A child record; identity is the id, the group may change.
#[derive(Clone)]
struct Child(Arc<ChildData>);

impl Child {
    fn new(id: u32, group: &str, display_order: u32) -> Self {
        Child(Arc::new(ChildData {
            id,
            group: Mutex::new(group.to_string()),
            display_order,
        }))
    }

    fn group(&self) -> String {
        self.0.group.lock().clone()
    }

    fn regroup(&self, group: &str) {
        *self.0.group.lock() = group.to_string();
    }
}

impl std::fmt::Debug for Child {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Child {} (order {})", self.0.id, self.0.display_order)
    }
}

impl PartialEq for Child {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Child {}

impl Hash for Child {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

fn print_changes(title: &str, changes: &ContentChanges<String, Child>) {
    println!("-- {title}");
    for change in &changes.section_changes {
        println!("   section {:?}: {:?} at {:?}", change.section, change.kind, change.at);
    }
    for change in &changes.object_changes {
        println!("   {:?}: {:?} at {:?}", change.object, change.kind, change.at);
    }
    for change in &changes.placeholder_changes {
        println!("   placeholder: {:?}", change.kind);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let controller = ResultsController::<String, Child>::builder()
        .section_key(|child: &Child| Some(child.group()))
        .sort_descriptors(vec![SortDescriptor::by_key(
            |child: &Child| child.0.display_order,
            true,
        )])
        .empty_placeholder(true)
        .build();

    controller.signals().did_change_content.connect(|_| {
        tracing::info!("content changed");
    });

    let children = vec![
        Child::new(1, "Group 1", 0),
        Child::new(2, "Group 1", 1),
        Child::new(3, "Group 2", 0),
        Child::new(4, "Group 2", 1),
    ];

    print_changes("insert", &controller.insert_objects(children.clone())?);
    println!("{}", controller.debug_tree());

    children[1].regroup("Group 2");
    print_changes("regroup child 2", &controller.update_objects([children[1].clone()])?);

    print_changes(
        "delete group 1",
        &controller.delete_objects([children[0].clone()])?,
    );

    let moved = controller.move_object(children[3].clone(), IndexPath::new(0, 0))?;
    print_changes("pin child 4", &moved);
    println!("{}", controller.debug_tree_with(TreeFormatOptions::minimal()));

    print_changes("clear", &controller.delete_objects(children[1..].to_vec())?);
    Ok(())
}
