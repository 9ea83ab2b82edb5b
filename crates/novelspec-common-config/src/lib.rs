//! Configuration types for NovelSpec.
//!
//! This crate provides the configuration read from
//! `novelspec/config.yaml` inside a writing project.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_sensible_values() {
        let config = NovelSpecConfig::default();

        assert_eq!(config.spec_label, "规格");

        assert_eq!(
            config.merge.missing_requirement,
            MissingRequirementPolicy::Ignore
        );
        assert!(config.merge.atomic);

        assert!(!config.validation.strict);
        assert_eq!(config.validation.max_description_chars, 2000);

        assert!(config.archive.lock);
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let mut config = NovelSpecConfig::default();
        config.spec_label = "Spec".to_string();
        config.merge.missing_requirement = MissingRequirementPolicy::Append;

        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("missing_requirement: append"));

        let parsed: NovelSpecConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.spec_label, "Spec");
        assert_eq!(
            parsed.merge.missing_requirement,
            MissingRequirementPolicy::Append
        );
    }
}
