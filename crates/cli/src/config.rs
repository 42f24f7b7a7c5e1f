//! Options file (`-c`), merged under command line flags.

use std::path::Path;

use sw2dts_core::ConvertOptions;

use crate::cli::Args;

/// Read conversion options from a TOML file.
pub async fn load(path: &Path) -> Result<ConvertOptions, String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    toml::from_str(&text).map_err(|e| format!("Invalid config {}: {e}", path.display()))
}

/// Command line flags on top of file options.
pub fn merge(file: ConvertOptions, args: &Args) -> ConvertOptions {
    ConvertOptions {
        namespace: args.namespace.clone().or(file.namespace),
        with_query: args.with_query || file.with_query,
        sort_props: args.sort_props || file.sort_props,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_camel_case_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "namespace = \"Api\"\nsortProps = true").unwrap();
        let options = load(file.path()).await.unwrap();
        assert_eq!(options.namespace.as_deref(), Some("Api"));
        assert!(options.sort_props);
        assert!(!options.with_query);
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sort_props = true").unwrap();
        let err = load(file.path()).await.unwrap_err();
        assert!(err.starts_with("Invalid config"), "{err}");
    }

    #[test]
    fn test_flags_override_file() {
        let file = ConvertOptions {
            namespace: Some("FromFile".to_string()),
            with_query: true,
            sort_props: false,
        };
        let args = Args::try_parse_from(["sw2dts", "-n", "FromFlag", "-s"]).unwrap();
        let merged = merge(file, &args);
        assert_eq!(merged.namespace.as_deref(), Some("FromFlag"));
        assert!(merged.with_query);
        assert!(merged.sort_props);
    }
}
