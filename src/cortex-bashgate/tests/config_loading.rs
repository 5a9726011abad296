//! Loading pattern configuration from disk.

use std::fs;
use std::path::Path;

use cortex_bashgate::{ConfigError, PatternConfig, PolicySet, Tier};
use tempfile::TempDir;

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("bash-patterns.toml");
    fs::write(&path, content).expect("should write config");
    path
}

#[test]
fn test_load_and_compile() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        temp.path(),
        r#"
[[deny]]
pattern = '\bterraform\s+destroy\b'
reason = "Destroys infrastructure"

[[ask]]
pattern = '\bterraform\s+apply\b'
reason = "Changes infrastructure"

[[allow]]
pattern = '^terraform\s+plan\b'
reason = "Read-only plan"
"#,
    );

    let config = PatternConfig::load(&path).expect("config should load");
    assert_eq!(config.len(), 3);

    let policy = PolicySet::compile(&config).expect("patterns should compile");
    assert_eq!(policy.validate("terraform destroy").tier, Tier::Deny);
    assert_eq!(policy.validate("terraform apply").tier, Tier::Ask);

    let plan = policy.validate("terraform plan -out tf.plan");
    assert_eq!(plan.tier, Tier::Allow);
    assert_eq!(plan.reason, "Read-only plan");
}

#[test]
fn test_missing_tiers_default_to_empty() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        temp.path(),
        r#"
[[deny]]
pattern = 'shred'
reason = "Irrecoverable deletion"
"#,
    );

    let config = PatternConfig::load(&path).unwrap();
    assert!(config.ask.is_empty());
    assert!(config.allow.is_empty());
}

#[test]
fn test_invalid_regex_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        temp.path(),
        r#"
[[ask]]
pattern = 'git push'
reason = "fine"

[[ask]]
pattern = '(unclosed'
reason = "broken"
"#,
    );

    let config = PatternConfig::load(&path).unwrap();
    match PolicySet::compile(&config) {
        Err(ConfigError::InvalidPattern {
            tier,
            index,
            pattern,
            ..
        }) => {
            assert_eq!(tier, Tier::Ask);
            assert_eq!(index, 1);
            assert_eq!(pattern, "(unclosed");
        }
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}

#[test]
fn test_empty_pattern_is_rejected() {
    let config = PatternConfig::from_toml_str(
        "[[deny]]\npattern = ''\nreason = \"oops\"\n",
        Path::new("inline.toml"),
    )
    .unwrap();

    let err = PolicySet::compile(&config).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::EmptyPattern {
            tier: Tier::Deny,
            index: 0
        }
    ));
    assert_eq!(err.to_string(), "deny pattern #0 is empty");
}

#[test]
fn test_unknown_keys_are_rejected() {
    let result = PatternConfig::from_toml_str(
        "[[deny]]\npattern = 'x'\nreason = 'y'\nseverity = 3\n",
        Path::new("inline.toml"),
    );
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_missing_file_is_read_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");

    let err = PatternConfig::load(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn test_discover_project_config() {
    if std::env::var_os(cortex_bashgate::CONFIG_ENV_VAR).is_some() {
        return;
    }

    let temp = TempDir::new().unwrap();
    let project = temp.path().join(".cortex");
    fs::create_dir_all(&project).unwrap();
    let expected = write_config(&project, "[[deny]]\npattern = 'x'\nreason = 'y'\n");

    assert_eq!(PatternConfig::discover(temp.path()), Some(expected));

    let config = PatternConfig::load_default(temp.path()).unwrap();
    assert_eq!(config.deny.len(), 1);
}

#[test]
fn test_builtin_config_compiles() {
    let config = PatternConfig::builtin().expect("built-in config should parse");
    assert!(!config.deny.is_empty());
    assert!(!config.ask.is_empty());
    assert!(!config.allow.is_empty());
    PolicySet::compile(&config).expect("built-in config should compile");
}
