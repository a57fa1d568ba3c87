//! A single search node: a local tightening of the root relaxation's bounds, plus
//! the bookkeeping needed to install it, resolve it, and report back on what was
//! found.

use std::rc::Rc;

use crate::basic_types::Direction;
use crate::basic_types::NodeId;
use crate::basic_types::NodeStatus;
use crate::basic_types::ObjectRef;
use crate::basic_types::StorageKey;
use crate::basic_types::VariableId;
use crate::model::Problem;
use crate::objects::ChildSpec;
use crate::relaxation::Relaxation;

/// A search node. Stores its *complete* local bound state (inherited from the
/// parent plus this node's own tightening) rather than a diff, so installing a node
/// is always just "overwrite every column's bounds with mine" — there is no
/// separate bookkeeping needed to undo the previous node's bounds before a
/// best-first jump across the tree.
#[derive(Debug)]
pub struct Node<R: Relaxation> {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub depth: u32,
    pub status: NodeStatus,
    pub lower_bounds: Vec<f64>,
    pub upper_bounds: Vec<f64>,
    pub branched_on: Option<ObjectRef>,
    pub branch_direction: Option<Direction>,
    /// An estimate of this node's relaxation bound, inherited from the parent until
    /// the node is actually resolved; used to order the open-node queue without
    /// having to resolve every candidate up front.
    pub estimated_bound: f64,
    warm_start: Option<Rc<R::WarmStart>>,
}

impl<R: Relaxation> Clone for Node<R> {
    fn clone(&self) -> Self {
        Node {
            id: self.id,
            parent: self.parent,
            depth: self.depth,
            status: self.status,
            lower_bounds: self.lower_bounds.clone(),
            upper_bounds: self.upper_bounds.clone(),
            branched_on: self.branched_on,
            branch_direction: self.branch_direction,
            estimated_bound: self.estimated_bound,
            warm_start: self.warm_start.clone(),
        }
    }
}

impl<R: Relaxation> Node<R> {
    pub fn root(problem: &Problem, id: NodeId) -> Self {
        Node {
            id,
            parent: None,
            depth: 0,
            status: NodeStatus::Candidate,
            lower_bounds: problem.variables.iter().map(|v| v.lower_bound).collect(),
            upper_bounds: problem.variables.iter().map(|v| v.upper_bound).collect(),
            branched_on: None,
            branch_direction: None,
            estimated_bound: f64::NEG_INFINITY,
            warm_start: None,
        }
    }

    /// Builds a child of `self` from one alternative of a [`crate::objects::BranchDescriptor`].
    pub fn child(
        &self,
        id: NodeId,
        spec: &ChildSpec,
        branched_on: ObjectRef,
        direction: Direction,
        estimated_bound: f64,
    ) -> Self {
        let mut lower_bounds = self.lower_bounds.clone();
        let mut upper_bounds = self.upper_bounds.clone();
        for delta in &spec.bound_deltas {
            if let Some(lower) = delta.new_lower_bound {
                lower_bounds[delta.variable.index()] = lower;
            }
            if let Some(upper) = delta.new_upper_bound {
                upper_bounds[delta.variable.index()] = upper;
            }
        }
        Node {
            id,
            parent: Some(self.id),
            depth: self.depth + 1,
            status: NodeStatus::Candidate,
            lower_bounds,
            upper_bounds,
            branched_on: Some(branched_on),
            branch_direction: Some(direction),
            estimated_bound,
            warm_start: self.warm_start.clone(),
        }
    }

    /// Overwrites every column's bounds in `relaxation` with this node's, and
    /// replays its inherited warm start. Marks the node `Active`.
    pub fn install(&mut self, relaxation: &mut R) {
        for (index, (&lower, &upper)) in self.lower_bounds.iter().zip(self.upper_bounds.iter()).enumerate() {
            relaxation.set_bounds(VariableId(index as u32), lower, upper);
        }
        relaxation.set_warm_start(self.warm_start.as_deref().cloned());
        self.status = NodeStatus::Active;
    }

    /// Captures the relaxation's warm start for children to inherit, and releases
    /// this node's own reference once it is no longer active. Symmetric with
    /// [`Self::install`]: every node that is installed is eventually uninstalled,
    /// even if it is immediately fathomed.
    pub fn uninstall(&mut self, relaxation: &R) {
        self.warm_start = relaxation.get_warm_start().map(Rc::new);
    }

    pub fn set_status(&mut self, status: NodeStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Sense;
    use crate::model::ProblemBuilder;
    use crate::objects::BoundDelta;
    use crate::relaxation::reference_simplex::ReferenceSimplex;
    use crate::relaxation::Relaxation;

    fn problem() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        builder.add_variable(0.0, 10.0, true).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn child_inherits_and_tightens_parent_bounds() {
        let problem = problem();
        let root = Node::<ReferenceSimplex>::root(&problem, NodeId(0));
        let spec = ChildSpec {
            bound_deltas: vec![BoundDelta {
                variable: VariableId(0),
                new_lower_bound: None,
                new_upper_bound: Some(3.0),
            }],
        };
        let child = root.child(NodeId(1), &spec, ObjectRef::Integer(VariableId(0)), Direction::Down, 0.0);
        assert_eq!(child.upper_bounds[0], 3.0);
        assert_eq!(child.lower_bounds[0], 0.0);
        assert_eq!(child.depth, 1);
    }

    #[test]
    fn install_applies_bounds_to_the_relaxation() {
        let problem = problem();
        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);
        let mut root = Node::<ReferenceSimplex>::root(&problem, NodeId(0));
        let spec = ChildSpec {
            bound_deltas: vec![BoundDelta {
                variable: VariableId(0),
                new_lower_bound: None,
                new_upper_bound: Some(4.0),
            }],
        };
        let mut child = root.child(NodeId(1), &spec, ObjectRef::Integer(VariableId(0)), Direction::Down, 0.0);
        child.install(&mut relaxation);
        assert_eq!(child.status, NodeStatus::Active);
        let status = relaxation.resolve();
        assert_eq!(status, crate::basic_types::RelaxationStatus::Optimal);
        assert!(relaxation.primal()[0] <= 4.0 + 1e-6);
        let _ = root.status;
    }
}
