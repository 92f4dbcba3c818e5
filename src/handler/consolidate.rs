//! Attribute consolidation.
//!
//! Merges handler-scoped attributes with a record's call-site attributes into
//! a single view where every fully-qualified key appears once. Groups that
//! share a key are merged member by member; a later scalar replaces whatever
//! held its key before, keeping the position where the key was first seen.

use crate::record::{Attr, Value};

/// Wrap `attrs` in a single group named `active_group`. Without an active
/// group `attrs` stay flat.
///
/// Only the innermost group wraps; enclosing groups were already applied to
/// whatever was added while they were active.
pub fn scope(active_group: Option<&str>, attrs: Vec<Attr>) -> Vec<Attr> {
    match active_group {
        Some(name) => vec![Attr::group(name, attrs)],
        None => attrs,
    }
}

/// Build the attribute list handed to the formatter.
///
/// `handler_attrs` are taken as already scoped. `record_attrs` are placed in
/// the group that is active at record time.
pub fn consolidate(handler_attrs: &[Attr], active_group: Option<&str>, record_attrs: &[Attr]) -> Vec<Attr> {
    let mut merged = Vec::with_capacity(handler_attrs.len() + 1);
    merge_all(&mut merged, handler_attrs.iter().cloned());
    if !record_attrs.is_empty() {
        merge_all(&mut merged, scope(active_group, record_attrs.to_vec()));
    }
    merged
}

fn merge_all(dest: &mut Vec<Attr>, attrs: impl IntoIterator<Item = Attr>) {
    for attr in attrs {
        merge(dest, attr);
    }
}

fn merge(dest: &mut Vec<Attr>, attr: Attr) {
    let Attr { key, value } = attr;
    match value {
        // Empty-keyed groups contribute their members to the enclosing scope.
        Value::Group(members) if key.is_empty() => merge_all(dest, members),
        Value::Group(members) => {
            let mut normalized = Vec::with_capacity(members.len());
            merge_all(&mut normalized, members);
            if normalized.is_empty() {
                return;
            }
            match dest.iter_mut().find(|existing| existing.key == key) {
                Some(existing) => match &mut existing.value {
                    Value::Group(existing_members) => merge_all(existing_members, normalized),
                    other => *other = Value::Group(normalized),
                },
                None => dest.push(Attr::group(key, normalized)),
            }
        }
        value => match dest.iter_mut().find(|existing| existing.key == key) {
            Some(existing) => existing.value = value,
            None => dest.push(Attr { key, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(attrs: &[Attr]) -> Vec<&str> {
        attrs.iter().map(|a| a.key.as_str()).collect()
    }

    #[test]
    fn test_record_value_wins_on_duplicate_key() {
        let handler = vec![Attr::int("k", 1), Attr::string("other", "x")];
        let record = vec![Attr::int("k", 2)];

        let merged = consolidate(&handler, None, &record);

        assert_eq!(merged, vec![Attr::int("k", 2), Attr::string("other", "x")]);
    }

    #[test]
    fn test_first_seen_order_is_kept() {
        let handler = vec![Attr::int("a", 1), Attr::int("b", 2), Attr::int("c", 3)];
        let record = vec![Attr::int("d", 4), Attr::int("a", 10)];

        let merged = consolidate(&handler, None, &record);

        assert_eq!(keys(&merged), vec!["a", "b", "c", "d"]);
        assert_eq!(merged[0].value, Value::Int(10));
    }

    #[test]
    fn test_record_attrs_scoped_to_active_group_only() {
        let merged = consolidate(&[], Some("inner"), &[Attr::int("c", 3)]);

        assert_eq!(merged, vec![Attr::group("inner", vec![Attr::int("c", 3)])]);
    }

    #[test]
    fn test_groups_with_same_key_merge() {
        let handler = vec![
            Attr::group("g1", vec![Attr::int("a", 1)]),
            Attr::group("g2", vec![Attr::int("b", 2)]),
            Attr::group("g1", vec![Attr::group("inner", vec![Attr::int("x", 1)])]),
        ];

        let merged = consolidate(&handler, Some("g2"), &[Attr::int("c", 3), Attr::int("b", 20)]);

        assert_eq!(
            merged,
            vec![
                Attr::group(
                    "g1",
                    vec![Attr::int("a", 1), Attr::group("inner", vec![Attr::int("x", 1)])]
                ),
                Attr::group("g2", vec![Attr::int("b", 20), Attr::int("c", 3)]),
            ]
        );
    }

    #[test]
    fn test_empty_sets_and_empty_groups() {
        assert!(consolidate(&[], None, &[]).is_empty());
        assert!(consolidate(&[], Some("g"), &[]).is_empty());

        let handler = vec![Attr::group("empty", vec![]), Attr::group("nested", vec![Attr::group("e", vec![])])];
        assert!(consolidate(&handler, None, &[]).is_empty());
    }

    #[test]
    fn test_empty_key_group_is_inlined() {
        let record = vec![Attr::group("", vec![Attr::int("x", 1), Attr::int("y", 2)]), Attr::int("x", 3)];

        let merged = consolidate(&[], None, &record);

        assert_eq!(merged, vec![Attr::int("x", 3), Attr::int("y", 2)]);
    }

    #[test]
    fn test_scalar_and_group_replace_each_other() {
        let handler = vec![Attr::int("k", 1)];
        let record = vec![Attr::group("k", vec![Attr::bool("flag", true)])];

        let merged = consolidate(&handler, None, &record);
        assert_eq!(merged, vec![Attr::group("k", vec![Attr::bool("flag", true)])]);

        let back = consolidate(&merged, None, &[Attr::string("k", "flat")]);
        assert_eq!(back, vec![Attr::string("k", "flat")]);
    }
}
