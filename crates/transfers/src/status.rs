//! Spreads execution failure across the call tree.
//!
//! A REVERT inside a sub-call unwinds the sub-call and whatever the
//! enclosing frame still had pending, so a frame that erred poisons its
//! parent and all of the parent's children. Deeper ancestors are not
//! touched here; the extractor inherits parent status as it descends,
//! which closes the gap transitively.

use innertx_types::step::StepRecord;

use crate::tree::{CallTree, ROOT};

/// Marks failed frames, walking the tree pre-order from the root.
pub fn propagate_failures(tree: &mut CallTree, steps: &[StepRecord]) {
    cascade(tree, steps, ROOT);
}

fn cascade(tree: &mut CallTree, steps: &[StepRecord], index: usize) {
    if !tree.nodes[index].success {
        return;
    }

    let log_indices = tree.nodes[index].logs.clone();
    for log_index in log_indices {
        let err_msg = &steps[log_index].err_msg;
        if err_msg.is_empty() {
            continue;
        }
        if let Some(parent) = tree.nodes[index].parent {
            let err_msg = err_msg.clone();
            tree.nodes[parent].success = false;
            tree.nodes[parent].err_msg = err_msg.clone();
            let siblings = tree.nodes[parent].children.clone();
            for sibling in siblings {
                tree.nodes[sibling].success = false;
                tree.nodes[sibling].err_msg = err_msg.clone();
            }
        }
        break;
    }

    // The scan above may have failed this node via its own parent's
    // children; a failed node's subtree is not walked further.
    if !tree.nodes[index].success {
        return;
    }
    let children = tree.nodes[index].children.clone();
    for child in children {
        cascade(tree, steps, child);
    }
}
