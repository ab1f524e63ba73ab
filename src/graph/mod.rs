//! Read-only queries over a predictor's inference graph.
//!
//! All traversals are pre-order depth-first: a unit, then each child subtree
//! left to right. Lookups return the first unit in that order, so duplicate
//! names in different branches resolve to the leftmost, shallowest-first hit.

use crate::spec::PredictiveUnit;

/// Endpoint host marking the unit that shares a pod with the engine.
pub const ENGINE_HOST: &str = "localhost";

/// Explicit-stack pre-order iterator over a unit tree.
pub struct PreOrder<'a> {
    stack: Vec<(usize, &'a PredictiveUnit)>,
}

impl<'a> PreOrder<'a> {
    pub fn new(root: &'a PredictiveUnit) -> Self {
        Self {
            stack: vec![(0, root)],
        }
    }

    /// Yield `(depth, unit)` pairs instead of bare units; the root is depth 0.
    pub fn with_depth(self) -> WithDepth<'a> {
        WithDepth(self)
    }

    fn advance(&mut self) -> Option<(usize, &'a PredictiveUnit)> {
        let (depth, unit) = self.stack.pop()?;
        // Reverse so the leftmost child is popped first.
        for child in unit.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, unit))
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a PredictiveUnit;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().map(|(_, unit)| unit)
    }
}

pub struct WithDepth<'a>(PreOrder<'a>);

impl<'a> Iterator for WithDepth<'a> {
    type Item = (usize, &'a PredictiveUnit);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.advance()
    }
}

/// First unit in pre-order whose name is `name`.
pub fn find_unit_by_name<'a>(
    root: &'a PredictiveUnit,
    name: &str,
) -> Option<&'a PredictiveUnit> {
    PreOrder::new(root).find(|unit| unit.name == name)
}

/// First unit in pre-order whose endpoint host is `localhost`.
///
/// The host is set by an earlier admission step on the unit the engine should
/// run beside. `None` means no unit was marked; callers decide the fallback.
pub fn find_engine_unit(root: &PredictiveUnit) -> Option<&PredictiveUnit> {
    PreOrder::new(root).find(|unit| unit.endpoint_host() == Some(ENGINE_HOST))
}

/// Every unit of the tree, root first, in pre-order.
pub fn flatten(root: &PredictiveUnit) -> Vec<&PredictiveUnit> {
    PreOrder::new(root).collect()
}

impl PredictiveUnit {
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(self)
    }

    pub fn find(&self, name: &str) -> Option<&PredictiveUnit> {
        find_unit_by_name(self, name)
    }

    pub fn engine_unit(&self) -> Option<&PredictiveUnit> {
        find_engine_unit(self)
    }
}
