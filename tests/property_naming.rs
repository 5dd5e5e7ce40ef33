/// Property-based tests for the bean-name convention and registry listing.

use ferrous_ioc::naming::{bean_name_for_type_name, decapitalize, simple_type_name};
use ferrous_ioc::{BeanRegistry, BeanType, DiError, RegistryBuilder};
use proptest::prelude::*;
use std::collections::HashSet;

struct Thing;

fn thing() -> BeanType {
    BeanType::of::<Thing>().default_constructor(|| Thing).build()
}

fn type_ident() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z0-9_]{0,20}"
}

fn module_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9_]{0,10}", 0..4)
}

proptest! {
    #[test]
    fn prop_bean_name_ignores_module_path(path in module_path(), ident in type_ident()) {
        let mut full = path.join("::");
        if !full.is_empty() {
            full.push_str("::");
        }
        full.push_str(&ident);

        prop_assert_eq!(simple_type_name(&full), ident.as_str());
        prop_assert_eq!(bean_name_for_type_name(&full), decapitalize(&ident));
    }

    #[test]
    fn prop_decapitalize_changes_only_first_char(ident in type_ident()) {
        let name = decapitalize(&ident);
        prop_assert_eq!(&name[1..], &ident[1..]);
        prop_assert_eq!(name.chars().next(), ident.chars().next().map(|c| c.to_ascii_lowercase()));
        // Idempotent
        prop_assert_eq!(decapitalize(&name), name.clone());
    }

    #[test]
    fn prop_generic_arguments_do_not_affect_name(ident in type_ident(), arg in type_ident()) {
        let generic = format!("app::{}<app::{}>", ident, arg);
        prop_assert_eq!(bean_name_for_type_name(&generic), decapitalize(&ident));
    }

    #[test]
    fn prop_trait_object_bounds_do_not_affect_name(
        path in module_path(),
        ident in type_ident(),
        bounds in prop::collection::vec(
            prop::sample::select(vec!["core::marker::Send", "core::marker::Sync", "core::marker::Unpin", "'static"]),
            0..4,
        ),
    ) {
        let mut full = String::from("dyn ");
        for segment in &path {
            full.push_str(segment);
            full.push_str("::");
        }
        full.push_str(&ident);
        for bound in &bounds {
            full.push_str(" + ");
            full.push_str(bound);
        }

        prop_assert_eq!(simple_type_name(&full), ident.as_str());
        prop_assert_eq!(bean_name_for_type_name(&full), decapitalize(&ident));
    }

    #[test]
    fn prop_listing_matches_declaration_order(names in prop::collection::vec("[a-z][A-Za-z0-9]{0,12}", 0..12)) {
        let mut seen = HashSet::new();
        let unique: Vec<String> = names.into_iter().filter(|n| seen.insert(n.clone())).collect();

        let registry = unique
            .iter()
            .fold(RegistryBuilder::new(), |builder, name| builder.register(name.clone(), thing()))
            .build()
            .unwrap();
        prop_assert_eq!(registry.bean_names().unwrap(), unique);
    }

    #[test]
    fn prop_any_repeated_name_is_rejected(
        names in prop::collection::vec("[a-z][A-Za-z0-9]{0,12}", 1..12),
        pick in any::<prop::sample::Index>(),
    ) {
        let repeated = names[pick.index(names.len())].clone();
        let result = names
            .iter()
            .chain(std::iter::once(&repeated))
            .fold(RegistryBuilder::new(), |builder, name| builder.register(name.clone(), thing()))
            .build();
        prop_assert!(matches!(result, Err(DiError::DuplicateDefinition(_))));
    }
}
