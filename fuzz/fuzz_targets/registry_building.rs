#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_ioc::{BeanRegistry, BeanType, Container, DiError, RegistryBuilder};
use std::collections::HashSet;
use std::sync::Arc;

struct Leaf;

fuzz_target!(|data: &[u8]| {
    // Each byte picks one of a small alphabet of names, so repeats are common
    let names: Vec<String> = data.iter().map(|b| format!("bean{}", b % 16)).collect();
    let leaf = Arc::new(BeanType::of::<Leaf>().default_constructor(|| Leaf).build());

    let result = names
        .iter()
        .fold(RegistryBuilder::new(), |builder, name| builder.register_shared(name.clone(), leaf.clone()))
        .build();

    let mut seen = HashSet::new();
    let first_repeat = names.iter().find(|n| !seen.insert(n.as_str()));

    match (result, first_repeat) {
        (Err(DiError::DuplicateDefinition(name)), Some(expected)) => assert_eq!(&name, expected),
        (Ok(registry), None) => {
            assert_eq!(registry.bean_names().unwrap(), names);
            let container = Container::new(registry);
            for name in &names {
                let bean = container.get_bean(name).unwrap();
                assert_eq!(bean.name(), name);
            }
        }
        (other, repeat) => panic!("unexpected outcome {:?} for repeat {:?}", other.map(|_| ()), repeat),
    }
});
