//! Rules grouped by kind, and resolution of rule reference tokens

use crate::error::{Result, RuntimeError};
use canvass_core::{Rule, RuleKind};
use std::collections::HashMap;

/// Rules grouped by [`RuleKind`], each group in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedRules<'a> {
    by_kind: HashMap<RuleKind, Vec<&'a Rule>>,
}

impl<'a> IndexedRules<'a> {
    /// Rules of `kind`, in input order
    pub fn get(&self, kind: RuleKind) -> &[&'a Rule] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Kinds present, in registry order
    pub fn kinds(&self) -> Vec<RuleKind> {
        let mut kinds: Vec<RuleKind> = self.by_kind.keys().copied().collect();
        kinds.sort_by_key(RuleKind::display_order);
        kinds
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

/// Group rules by kind, keeping their relative order within each group
pub fn index_rules_by_type<'a, I>(rules: I) -> IndexedRules<'a>
where
    I: IntoIterator<Item = &'a Rule>,
{
    let mut by_kind: HashMap<RuleKind, Vec<&'a Rule>> = HashMap::new();
    for rule in rules {
        by_kind.entry(rule.kind()).or_default().push(rule);
    }
    IndexedRules { by_kind }
}

/// Resolve a `<TypeName>_<n>` token to the n-th rule of that type
pub fn get_rule<'a>(token: &str, indexed: &IndexedRules<'a>) -> Result<&'a Rule> {
    let (type_name, ordinal) = token
        .rsplit_once('_')
        .ok_or_else(|| RuntimeError::InvalidRuleToken(token.to_string()))?;

    let ordinal: usize = ordinal
        .parse()
        .map_err(|_| RuntimeError::InvalidRuleToken(token.to_string()))?;
    let kind: RuleKind = type_name
        .parse()
        .map_err(|_| RuntimeError::UnknownRule(token.to_string()))?;

    indexed
        .get(kind)
        .get(ordinal)
        .copied()
        .ok_or_else(|| RuntimeError::UnknownRule(token.to_string()))
}
