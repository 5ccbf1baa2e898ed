//! Operation planner - orders operations into delete and write phases

use log::debug;

use crate::types::Operation;

/// An ordered set of operations, grouped by phase
///
/// Every DELETE runs before every PATCH/POST, so a field that is removed and
/// rewritten in the same run never has its new value deleted. Within a phase,
/// operations keep the order they were added in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// DELETE operations
    pub deletes: Vec<Operation>,
    /// PATCH and POST operations
    pub writes: Vec<Operation>,
}

impl Plan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to its phase
    ///
    /// A DELETE whose target is already covered by a planned DELETE of the
    /// same path or one of its ancestors is dropped.
    pub fn add(&mut self, op: Operation) {
        if op.is_delete() {
            if self
                .deletes
                .iter()
                .any(|planned| op.path().starts_with(planned.path()))
            {
                debug!("Skipping {op}: covered by an earlier delete");
                return;
            }
            self.deletes.push(op);
        } else {
            self.writes.push(op);
        }
    }

    /// Total number of operations in the plan
    pub fn len(&self) -> usize {
        self.deletes.len() + self.writes.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.writes.is_empty()
    }

    /// Operations in execution order
    pub fn into_operations(self) -> Vec<Operation> {
        let mut ops = self.deletes;
        ops.extend(self.writes);
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yangpath::Path;

    fn path(text: &str) -> Path {
        Path::parse(text).unwrap()
    }

    #[test]
    fn test_deletes_come_first() {
        let mut plan = Plan::new();
        plan.add(Operation::patch(path("a/config/x"), json!(1)));
        plan.add(Operation::delete(path("a/config/y")));
        plan.add(Operation::patch(path("a/config/z"), json!(2)));
        plan.add(Operation::delete(path("a/config/w")));

        let ops: Vec<String> = plan.into_operations().iter().map(ToString::to_string).collect();
        assert_eq!(
            ops,
            vec![
                "DELETE a/config/y",
                "DELETE a/config/w",
                "PATCH a/config/x",
                "PATCH a/config/z",
            ]
        );
    }

    #[test]
    fn test_covered_delete_is_dropped() {
        let mut plan = Plan::new();
        plan.add(Operation::delete(path("qos/queues/queue=q1")));
        plan.add(Operation::delete(path("qos/queues/queue=q1/wred/config/wred-profile")));
        plan.add(Operation::delete(path("qos/queues/queue=q1")));
        plan.add(Operation::delete(path("qos/queues/queue=q10")));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_empty_plan() {
        let plan = Plan::new();
        assert!(plan.is_empty());
        assert!(plan.into_operations().is_empty());
    }
}
