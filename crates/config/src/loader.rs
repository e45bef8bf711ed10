use std::path::Path;

use anyhow::Context;

use crate::{Config, PayloadKind};

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file '{}'", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse configuration file '{}'", path.display()))?;

    for warning in validate_settings(&config) {
        log::warn!("{warning}");
    }

    Ok(config)
}

/// Collects warnings for settings that cannot take effect with the rest of the configuration.
pub(crate) fn validate_settings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.image.decode && config.input.kind != PayloadKind::Image {
        warnings.push(format!(
            "image.decode has no effect when input.kind is '{}'",
            config.input.kind
        ));
    }

    if config.input.kind != PayloadKind::Chunk && !config.stream.assemble {
        warnings.push(format!(
            "stream.assemble has no effect when input.kind is '{}'",
            config.input.kind
        ));
    }

    if config.input.kind == PayloadKind::Chunk && !config.stream.assemble && !config.stream.require_same_response {
        warnings.push("stream.require_same_response has no effect when stream.assemble is false".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use indoc::indoc;
    use insta::assert_debug_snapshot;

    use crate::{Config, PayloadKind};

    #[test]
    fn defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.input.kind, PayloadKind::Completion);
        assert!(config.stream.assemble);
        assert!(config.stream.require_same_response);
        assert!(!config.image.decode);
        assert!(super::validate_settings(&config).is_empty());
    }

    #[test]
    fn chunk_settings() {
        let config = indoc! {r#"
            [input]
            kind = "chunk"

            [stream]
            assemble = true
            require_same_response = false
        "#};

        let config: Config = toml::from_str(config).unwrap();

        assert_eq!(config.input.kind, PayloadKind::Chunk);
        assert!(config.stream.assemble);
        assert!(!config.stream.require_same_response);
        assert!(super::validate_settings(&config).is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let config = indoc! {r#"
            [stream]
            assemble = true
            reorder = true
        "#};

        let error = toml::from_str::<Config>(config).unwrap_err();

        assert!(error.to_string().contains("unknown field `reorder`"));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let config = indoc! {r#"
            [input]
            kind = "embedding"
        "#};

        let error = toml::from_str::<Config>(config).unwrap_err();

        assert!(error.to_string().contains("unknown variant `embedding`"));
    }

    #[test]
    fn settings_without_effect_are_reported() {
        let config = indoc! {r#"
            [input]
            kind = "completion"

            [stream]
            assemble = false

            [image]
            decode = true
        "#};

        let config: Config = toml::from_str(config).unwrap();
        let warnings = super::validate_settings(&config);

        assert_debug_snapshot!(warnings, @r#"
        [
            "image.decode has no effect when input.kind is 'completion'",
            "stream.assemble has no effect when input.kind is 'completion'",
        ]
        "#);
    }

    #[test]
    fn same_response_check_needs_assembly() {
        let config = indoc! {r#"
            [input]
            kind = "chunk"

            [stream]
            assemble = false
            require_same_response = false
        "#};

        let config: Config = toml::from_str(config).unwrap();

        assert_debug_snapshot!(config.warnings(), @r#"
        [
            "stream.require_same_response has no effect when stream.assemble is false",
        ]
        "#);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();

        write!(
            file,
            "{}",
            indoc! {r#"
                [input]
                kind = "image"

                [image]
                decode = true
            "#}
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.input.kind, PayloadKind::Image);
        assert!(config.image.decode);
    }

    #[test]
    fn load_reports_missing_file() {
        let error = Config::load("/definitely/not/here/inspect.toml").unwrap_err();

        assert_eq!(
            error.to_string(),
            "Failed to read configuration file '/definitely/not/here/inspect.toml'"
        );
    }

    #[test]
    fn payload_kind_from_str() {
        assert_eq!("chunk".parse::<PayloadKind>(), Ok(PayloadKind::Chunk));
        assert_eq!(
            "embedding".parse::<PayloadKind>(),
            Err("unknown payload kind 'embedding', expected one of: completion, chunk, image".to_string())
        );
    }
}
