//! Container startup with link-time contributions.

use std::collections::HashMap;
use std::sync::Arc;

use hinge::core::{RegistrationError, contributions};
use hinge::prelude::*;
use hinge::runtime::{RegistriesConfig, RuntimeError};

#[plugin_contract]
pub trait Codec: Plugin<str> {
    fn name(&self) -> &'static str;
}

#[plugin_contract]
pub trait Probe: Plugin<u16> {}

pub struct Named {
    name: &'static str,
    media_types: &'static [&'static str],
}

impl Plugin<str> for Named {
    fn supports(&self, media_type: &str) -> bool {
        self.media_types.contains(&media_type)
    }
}

impl Codec for Named {
    fn name(&self) -> &'static str {
        self.name
    }
}

#[register_plugin(Codec, order = 10)]
fn json_codec() -> Named {
    Named {
        name: "json",
        media_types: &["application/json", "text/plain"],
    }
}

#[register_plugin(Codec, name = "plain")]
fn plain_text_codec() -> Named {
    Named {
        name: "plain",
        media_types: &["text/plain"],
    }
}

#[register_plugin(Codec, order = -5)]
fn yaml_codec() -> Named {
    Named {
        name: "yaml",
        media_types: &["application/yaml"],
    }
}

struct Port(u16);

impl Plugin<u16> for Port {
    fn supports(&self, port: &u16) -> bool {
        self.0 == *port
    }
}

impl Probe for Port {}

fn config(registries: RegistriesConfig) -> HingeConfig {
    HingeConfig {
        registries,
        ..Default::default()
    }
}

#[test]
fn test_contributions_are_collected() {
    let names: Vec<_> = contributions()
        .iter()
        .filter(|c| c.contract_name == "Codec")
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["json_codec", "plain", "yaml_codec"]);
}

#[test]
fn test_start_installs_contributions_in_order() {
    let mut container = PluginContainer::default();
    container.declare_all(contracts![dyn Codec, dyn Probe]).unwrap();
    container.contribute::<dyn Probe>(Arc::new(Port(80)), None).unwrap();
    container.start().unwrap();

    let codecs = container.registry::<dyn Codec>().unwrap();
    let names: Vec<_> = codecs.get_plugins().iter().map(|c| c.name()).collect();
    assert_eq!(names, ["yaml", "json", "plain"]);

    assert_eq!(codecs.get_plugin_for("text/plain").unwrap().name(), "json");
    assert_eq!(codecs.get_plugins_for("text/plain").len(), 2);
    assert!(codecs.get_plugin_for("image/png").is_err());

    let probes = container.registry::<dyn Probe>().unwrap();
    assert!(probes.has_plugin_for(&80));
    assert!(matches!(
        probes.register(Arc::new(Port(443))),
        Err(RegistrationError::Sealed { .. })
    ));
}

#[test]
fn test_configured_qualifier() {
    let mut container = PluginContainer::new(config(RegistriesConfig {
        qualifiers: HashMap::from([("Codec".to_string(), "codecs".to_string())]),
        ..Default::default()
    }));
    container.declare(ContractType::of::<dyn Codec>()).unwrap();
    container.start().unwrap();

    assert!(container.directory().contains("codecs"));
    let codecs = container.qualified::<dyn Codec>("codecs").unwrap();
    assert_eq!(codecs.count_plugins(), 3);
}

#[test]
fn test_excluded_contract_skips_contributions() {
    let mut container = PluginContainer::new(config(RegistriesConfig {
        exclude: vec!["Codec".to_string()],
        ..Default::default()
    }));
    container.declare_all(contracts![dyn Codec, dyn Probe]).unwrap();
    container.start().unwrap();

    assert!(container.registry::<dyn Codec>().is_none());
    assert!(container.registry::<dyn Probe>().unwrap().is_empty());
}

#[test]
fn test_strict_contributions() {
    let mut container = PluginContainer::new(config(RegistriesConfig {
        strict_contributions: true,
        ..Default::default()
    }));
    container.declare(ContractType::of::<dyn Probe>()).unwrap();

    let err = container.start().unwrap_err();
    assert!(matches!(err, RuntimeError::Contribution(_)));
    assert_eq!(container.state(), ContainerState::Stopped);
}

#[test]
fn test_summaries() {
    let mut container = PluginContainer::default();
    container.declare_all(contracts![dyn Codec, dyn Probe]).unwrap();
    container.start().unwrap();

    let summaries = serde_json::to_value(container.directory().summaries()).unwrap();
    assert_eq!(summaries[0]["name"], "codecRegistry");
    assert_eq!(summaries[0]["plugins"], 3);
    assert_eq!(summaries[0]["delimiter"], "str");
    assert_eq!(summaries[1]["name"], "probeRegistry");
    assert_eq!(summaries[1]["sealed"], true);
    assert!(summaries[1].get("qualifier").is_none());

    container.stop().unwrap();
    assert!(container.directory().is_empty());
}
