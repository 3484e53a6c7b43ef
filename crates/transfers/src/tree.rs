//! Reconstructs the nested call frames of one transaction from its flat
//! filtered step list, using depth transitions.

use innertx_types::step::StepRecord;

/// Index of the synthetic root frame in a [`CallTree`] arena.
pub const ROOT: usize = 0;

/// One call frame.
#[derive(Clone, Debug)]
pub struct CallNode {
    /// Depth shared by every step in this frame. The root alone sits at 0.
    pub depth: u64,
    /// Indices into the transaction's step list, in execution order. For a
    /// non-root frame the opening call-family step comes first.
    pub logs: Vec<usize>,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
    pub success: bool,
    pub err_msg: String,
}

impl CallNode {
    fn new(depth: u64, parent: Option<usize>) -> Self {
        CallNode {
            depth,
            logs: Vec::new(),
            children: Vec::new(),
            parent,
            success: true,
            err_msg: String::new(),
        }
    }
}

/// Arena of call frames; nodes reference each other by index, which keeps
/// parent back-pointers free of ownership cycles.
#[derive(Debug)]
pub struct CallTree {
    pub nodes: Vec<CallNode>,
}

impl CallTree {
    fn attach(&mut self, parent: usize, depth: u64, opening_log: usize) -> usize {
        let index = self.nodes.len();
        let mut node = CallNode::new(depth, Some(parent));
        node.logs.push(opening_log);
        self.nodes.push(node);
        self.nodes[parent].children.push(index);
        index
    }
}

/// Builds the frame tree for one transaction's ordered steps.
///
/// A step opens a frame when it is call-family, or when the preceding step
/// sat at a lower depth (the first step observed inside a frame whose
/// opening op was not recorded). Every other step continues the frame at
/// its own depth; the walker pops back up first if the current frame is
/// deeper, which is how frames abandoned by a REVERT are left behind.
pub fn build_call_tree(logs: &[StepRecord]) -> CallTree {
    let mut tree = CallTree {
        nodes: vec![CallNode::new(0, None)],
    };
    let mut current = ROOT;

    for (i, log) in logs.iter().enumerate() {
        let opens_frame = log.op.is_cared() || (i > 0 && logs[i - 1].depth < log.depth);
        if opens_frame {
            if log.depth > tree.nodes[current].depth {
                current = tree.attach(current, log.depth, i);
            } else {
                while log.depth < tree.nodes[current].depth {
                    current = tree.nodes[current].parent.unwrap_or(ROOT);
                }
                // Same depth as the frame we popped to: a sibling.
                let parent = tree.nodes[current].parent.unwrap_or(ROOT);
                current = tree.attach(parent, log.depth, i);
            }
        } else {
            while tree.nodes[current].depth > log.depth {
                current = tree.nodes[current].parent.unwrap_or(ROOT);
            }
            tree.nodes[current].logs.push(i);
        }
    }
    tree
}
