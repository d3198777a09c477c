//! Registry wiring over contracts declared with `#[plugin_contract]`.

use std::sync::Arc;

use hinge::core::{DelimiterType, UnresolvableReason, WiringError};
use hinge::prelude::*;

#[plugin_contract]
pub trait Formatter: Plugin<String> {
    fn format(&self, value: &str) -> String;
}

#[plugin_contract(extends = Formatter, qualifier = "prettyFormatters")]
pub trait PrettyFormatter: Formatter {
    fn indent(&self) -> usize;
}

#[plugin_contract]
pub trait Validator: Plugin<u32> {}

#[plugin_contract]
pub trait Sink<T>: Plugin<T> {}

#[plugin_contract(delimiter = str, name = "Lookup")]
pub trait KeyLookup: Plugin<str> {}

struct Csv;

impl Plugin<String> for Csv {
    fn supports(&self, format: &String) -> bool {
        format == "csv"
    }
}

impl Formatter for Csv {
    fn format(&self, value: &str) -> String {
        value.replace(' ', ",")
    }
}

struct Tsv;

impl Plugin<String> for Tsv {
    fn supports(&self, format: &String) -> bool {
        format == "tsv" || format == "csv"
    }

    fn order(&self) -> Option<i32> {
        Some(-1)
    }
}

impl Formatter for Tsv {
    fn format(&self, value: &str) -> String {
        value.replace(' ', "\t")
    }
}

fn wire(contracts: Vec<ContractType>) -> Result<ComponentDirectory, WiringError> {
    RegistryWiring::new(contracts).wire(ComponentDirectory::new())
}

#[test]
fn test_formatter_registry() {
    let directory = wire(contracts![dyn Formatter]).unwrap();

    assert_eq!(directory.len(), 1);
    let descriptor = directory.descriptor("formatterRegistry").unwrap();
    assert_eq!(descriptor.delimiter(), DelimiterType::of::<String>());
    assert_eq!(descriptor.qualifier(), None);

    let formatters = directory.get::<dyn Formatter>("formatterRegistry").unwrap();
    assert!(formatters.get_plugins().is_empty());
}

#[test]
fn test_qualified_registry() {
    let directory = wire(vec![
        ContractType::of::<dyn Formatter>().qualified("csvFormatters"),
    ])
    .unwrap();

    assert!(!directory.contains("formatterRegistry"));
    let descriptor = directory.descriptor("csvFormatters").unwrap();
    assert_eq!(descriptor.qualifier(), Some("csvFormatters"));
    assert!(directory.qualified::<dyn Formatter>("csvFormatters").is_some());
}

#[test]
fn test_independent_registries() {
    let directory = wire(contracts![dyn Formatter, dyn Validator]).unwrap();

    let names: Vec<_> = directory.names().collect();
    assert_eq!(names, ["formatterRegistry", "validatorRegistry"]);
    assert_eq!(
        directory.descriptor("validatorRegistry").unwrap().delimiter(),
        DelimiterType::of::<u32>()
    );
}

#[test]
fn test_inherited_delimiter_and_declared_qualifier() {
    let directory = wire(contracts![dyn Formatter, dyn PrettyFormatter]).unwrap();

    let descriptor = directory.descriptor("prettyFormatters").unwrap();
    assert_eq!(descriptor.delimiter(), DelimiterType::of::<String>());
    assert_eq!(descriptor.qualifier(), Some("prettyFormatters"));
    assert!(directory.registry_for::<dyn PrettyFormatter>().is_some());
}

#[test]
fn test_generic_and_unsized_contracts() {
    let directory = wire(contracts![dyn Sink<u64>, dyn KeyLookup]).unwrap();

    assert_eq!(
        directory.descriptor("sinkRegistry").unwrap().delimiter(),
        DelimiterType::of::<u64>()
    );
    assert_eq!(
        directory.descriptor("lookupRegistry").unwrap().delimiter(),
        DelimiterType::of::<str>()
    );
}

#[test]
fn test_unbound_contract_fails_before_any_registry() {
    let mut declared = contracts![dyn Formatter];
    declared.push(ContractType::unbound("Sink", "T"));

    let err = wire(declared).unwrap_err();
    match err {
        WiringError::UnresolvableDelimiterType { contract, reason } => {
            assert_eq!(contract, "dyn Sink<T>");
            assert_eq!(reason, UnresolvableReason::FreeVariable("T".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_registry_name() {
    let err = wire(vec![
        ContractType::of::<dyn Formatter>(),
        ContractType::of::<dyn Validator>().qualified("formatterRegistry"),
    ])
    .unwrap_err();

    assert!(matches!(
        err,
        WiringError::DuplicateRegistryName { ref name, .. } if name == "formatterRegistry"
    ));
}

#[test]
fn test_lookup_follows_order() {
    let directory = wire(contracts![dyn Formatter]).unwrap();
    let formatters = directory.registry_for::<dyn Formatter>().unwrap();
    formatters.register(Arc::new(Csv)).unwrap();
    formatters.register(Arc::new(Tsv)).unwrap();

    // Tsv declares order -1 and outranks the unordered Csv.
    let csv = formatters.get_plugin_for(&"csv".to_string()).unwrap();
    assert_eq!(csv.format("a b"), "a\tb");
    assert_eq!(formatters.get_plugins_for(&"csv".to_string()).len(), 2);

    let err = formatters.get_plugin_for(&"xml".to_string()).err().unwrap();
    assert!(err.to_string().contains("Formatter"));
}
