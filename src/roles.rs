use std::collections::BTreeSet;

/// RoleSet
///
/// Ordered set of role identifiers. Ordering keeps resolution output (and its `Debug`
/// rendering) deterministic across passes.
pub type RoleSet = BTreeSet<String>;

/// Builds a role set from any iterator of role names.
pub fn role_set<I, S>(roles: I) -> RoleSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    roles.into_iter().map(Into::into).collect()
}

/// effective_roles
///
/// Applies the inheritance rule for one node: the local roles replace the inherited set
/// when `exclude_parent` is set, otherwise the two are unioned.
pub fn effective_roles(inherited: &RoleSet, local: Option<&[String]>, exclude_parent: bool) -> RoleSet {
    let local = local.unwrap_or_default().iter().cloned();
    if exclude_parent {
        local.collect()
    } else {
        inherited.iter().cloned().chain(local).collect()
    }
}

/// has_role_access
///
/// An empty requirement means "any authenticated principal"; otherwise the actor needs
/// at least one of the required roles.
pub fn has_role_access(actor: &RoleSet, required: &RoleSet) -> bool {
    required.is_empty() || !actor.is_disjoint(required)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(roles: &[&str]) -> Vec<String> {
        roles.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn union_with_inherited_roles() {
        let inherited = role_set(["A"]);
        let local = owned(&["B"]);
        assert_eq!(effective_roles(&inherited, Some(&local), false), role_set(["A", "B"]));
    }

    #[test]
    fn exclude_parent_keeps_only_local_roles() {
        let inherited = role_set(["A"]);
        let local = owned(&["B"]);
        assert_eq!(effective_roles(&inherited, Some(&local), true), role_set(["B"]));
        assert!(effective_roles(&inherited, None, true).is_empty());
    }

    #[test]
    fn missing_local_roles_inherit() {
        let inherited = role_set(["A"]);
        assert_eq!(effective_roles(&inherited, None, false), inherited);
    }

    #[test]
    fn empty_requirement_always_grants() {
        assert!(has_role_access(&RoleSet::new(), &RoleSet::new()));
        assert!(has_role_access(&role_set(["user"]), &RoleSet::new()));
    }

    #[test]
    fn access_needs_one_shared_role() {
        let required = role_set(["admin", "editor"]);
        assert!(has_role_access(&role_set(["user", "editor"]), &required));
        assert!(!has_role_access(&role_set(["user"]), &required));
        assert!(!has_role_access(&RoleSet::new(), &required));
    }
}
