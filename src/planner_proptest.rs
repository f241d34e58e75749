//! Property-based tests for task tokens and dependency descriptors.

#[cfg(test)]
mod proptest_tests {
    use crate::config::validate_module_name;
    use crate::dependency::DependencySpec;
    use crate::error::Error;
    use crate::planner::{TaskKind, TaskToken};
    use proptest::prelude::*;

    // ============================================================================
    // TaskToken property tests
    // ============================================================================

    proptest! {
        /// Property: a module directive names exactly the module after the marker
        #[test]
        fn module_directive_names_module(name in "[A-Za-z0-9_][A-Za-z0-9_.-]{0,20}") {
            let token = TaskToken::parse(&format!("modules:{name}"));
            prop_assert!(!token.negated);
            prop_assert_eq!(token.kind, TaskKind::Modules(Some(name)));
        }

        /// Property: negation flips the direction and nothing else
        #[test]
        fn negation_only_flips_direction(name in "[A-Za-z0-9_][A-Za-z0-9_.-]{0,20}") {
            let fetch = TaskToken::parse(&format!("modules:{name}"));
            let clean = TaskToken::parse(&format!("-modules:{name}"));
            prop_assert!(clean.negated);
            prop_assert_eq!(fetch.kind, clean.kind);
        }

        /// Property: only the delimiter appended during parsing is stripped,
        /// so an explicit trailing ':' stays part of the name
        #[test]
        fn explicit_trailing_delimiter_is_kept(name in "[A-Za-z0-9_][A-Za-z0-9_.-]{0,20}") {
            let token = TaskToken::parse(&format!("modules:{name}:"));
            prop_assert_eq!(token.kind, TaskKind::Modules(Some(format!("{name}:"))));
        }

        /// Property: tokens without the module marker are kept verbatim
        #[test]
        fn other_tasks_keep_their_name(body in "[a-z][a-z0-9_-]{0,20}", negated in any::<bool>()) {
            prop_assume!(!format!("{body}:").contains("modules:"));
            let raw = if negated { format!("-{body}") } else { body.clone() };
            let token = TaskToken::parse(&raw);
            prop_assert_eq!(token.negated, negated);
            prop_assert_eq!(token.kind, TaskKind::Other(body));
        }
    }

    // ============================================================================
    // DependencySpec property tests
    // ============================================================================

    proptest! {
        /// Property: every part of a full descriptor lands in its own field
        #[test]
        fn full_descriptor_splits_into_fields(
            directory in "[a-z][a-z0-9_]{0,10}",
            manifest in "[a-z]{1,10}\\.yaml",
            profile in "[a-z][a-z0-9_]{0,10}",
        ) {
            let spec = DependencySpec::parse(&format!("{directory}/{manifest}:{profile}")).unwrap();
            prop_assert_eq!(spec.directory, directory);
            prop_assert_eq!(spec.manifest, Some(manifest));
            prop_assert_eq!(spec.profile, Some(profile));
        }

        /// Property: overrides come from the last segment, the rest is the directory
        #[test]
        fn nested_directories_keep_every_segment(
            parts in prop::collection::vec("[a-z]{1,6}", 2..5),
            manifest in "[a-z]{1,10}\\.yaml",
            profile in "[a-z][a-z0-9_]{0,10}",
        ) {
            let directory = parts.join("/");
            let spec = DependencySpec::parse(&format!("{directory}/{manifest}:{profile}")).unwrap();
            prop_assert_eq!(spec.directory, directory);
            prop_assert_eq!(spec.manifest, Some(manifest));
            prop_assert_eq!(spec.profile, Some(profile));
        }

        /// Property: a directory climbing out of the working root is always rejected
        #[test]
        fn escaping_directories_are_rejected(
            head in prop::collection::vec("[a-z]{1,6}", 0..3),
            tail in "[a-z]{1,10}",
        ) {
            let mut parts = head;
            parts.push("..".to_string());
            parts.push("..".to_string());
            let descriptor = format!("{}/{}", parts.join("/"), tail);
            let result = DependencySpec::parse(&descriptor);
            let is_malformed = matches!(result, Err(Error::MalformedDependency { .. }));
            prop_assert!(is_malformed, "expected '{}' to be rejected", descriptor);
        }

        /// Property: a name containing a separator never validates
        #[test]
        fn module_names_with_separators_are_rejected(
            head in "[a-z]{0,6}",
            separator in prop::sample::select(vec!['/', '\\', ':']),
            tail in "[a-z]{0,6}",
        ) {
            let name = format!("{head}{separator}{tail}");
            prop_assert!(validate_module_name(&name).is_err(), "accepted '{}'", name);
        }
    }
}
