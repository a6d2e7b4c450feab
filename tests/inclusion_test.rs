use std::fs;
use std::path::{Path, PathBuf};

use create_amp::config::{
    DataLayer, Example, Framework, LocalSetup, Orm, PackageManager, ProjectConfig, ProjectType,
};
use create_amp::context::TemplateData;
use create_amp::environment::Environment;
use create_amp::error::Error;
use create_amp::inclusion::{
    apply_fragment, filter_fragment, fragment_target, is_rules_file, Fragment, InclusionRules,
};
use tempfile::TempDir;

fn data(orm: Option<Orm>) -> TemplateData {
    let config = ProjectConfig {
        name: "demo".into(),
        path: "/tmp/demo".into(),
        project_type: ProjectType::Frontend,
        framework: Some(Framework::Vite),
        backend: None,
        data_layer: if orm.is_some() { DataLayer::AmpSync } else { DataLayer::ArrowFlight },
        orm,
        example: Example::Blank,
        local_setup: LocalSetup::Anvil,
        network: None,
        network_env: None,
        package_manager: Some(PackageManager::Bun),
        skip_install: true,
        skip_git: true,
    };
    TemplateData::new(&config, &Environment::default())
}

#[test]
fn test_builtin_rules() {
    let rules = InclusionRules::builtin().unwrap();
    let electric = data(Some(Orm::Electric));
    let drizzle = data(Some(Orm::Drizzle));
    let flight = data(None);

    assert!(!rules.should_skip("src/db/electric.ts", &electric));
    assert!(rules.should_skip("src/db/electric.ts", &drizzle));
    assert!(rules.should_skip("src/db/electric.ts", &flight));
    assert!(rules.should_skip("drizzle/schema.ts", &electric));
    assert!(!rules.should_skip("drizzle/schema.ts", &drizzle));
    assert!(!rules.should_skip("src/App.tsx", &flight));
}

#[test]
fn test_layer_rules_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".amp-rules.yaml"),
        "rules:\n  - pattern: \"anvil/**\"\n    requires:\n      localSetup: anvil\n  - pattern: \"bun.lockb\"\n    requires:\n      packageManager: pnpm\n",
    )
    .unwrap();

    let rules = InclusionRules::for_layer(temp_dir.path()).unwrap();
    assert_eq!(rules.rules().len(), 4);
    let data = data(None);
    assert!(!rules.should_skip("anvil/deploy.sh", &data));
    assert!(rules.should_skip("bun.lockb", &data));
    assert!(is_rules_file(".amp-rules.yaml"));
    assert!(!is_rules_file("src/.amp-rules.yaml"));
}

#[test]
fn test_rules_file_with_unknown_axis() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".amp-rules.json"),
        r#"{"rules": [{"pattern": "*.sql", "requires": {"database": "postgres"}}]}"#,
    )
    .unwrap();
    assert!(matches!(InclusionRules::for_layer(temp_dir.path()), Err(Error::Rules(_))));
}

#[test]
fn test_fragment_target() {
    assert_eq!(
        fragment_target(Path::new("package.json.additions")),
        Some(PathBuf::from("package.json"))
    );
    assert_eq!(
        fragment_target(Path::new("src/index.css.additions")),
        Some(PathBuf::from("src/index.css"))
    );
    assert_eq!(fragment_target(Path::new(".additions")), None);
    assert_eq!(fragment_target(Path::new("src/App.tsx")), None);
}

#[test]
fn test_filter_fragment_blocks_and_lines() {
    let content = "\
always
# @amp-if orm=electric
electric only
  # @amp-if packageManager!=bun
  never with bun
  # @amp-endif
# @amp-endif
drizzle line // @amp-when orm=drizzle
flight line // @amp-when dataLayer=arrow-flight
";
    let filtered = filter_fragment(content, &data(Some(Orm::Electric)), Path::new("f")).unwrap();
    assert_eq!(filtered, "always\nelectric only\n");

    let filtered = filter_fragment(content, &data(None), Path::new("f")).unwrap();
    assert_eq!(filtered, "always\nflight line\n");
}

#[test]
fn test_filter_fragment_errors() {
    let data = data(None);
    let err = filter_fragment("<!-- @amp-endif -->\n", &data, Path::new("f")).unwrap_err();
    assert!(matches!(err, Error::MalformedFragment { line: 1, .. }));

    let err = filter_fragment("a\n/* @amp-if orm=electric */\n", &data, Path::new("f")).unwrap_err();
    assert!(matches!(err, Error::MalformedFragment { line: 2, .. }));

    let err = filter_fragment("// @amp-if color=red\n// @amp-endif\n", &data, Path::new("f"))
        .unwrap_err();
    assert!(matches!(err, Error::MalformedFragment { .. }));
}

#[test]
fn test_apply_text_fragment() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".env"), "A=1").unwrap();
    let fragment = Fragment {
        source: PathBuf::from(".env.additions"),
        target: PathBuf::from(".env"),
        content: "PROJECT={{projectName}}\n".to_string(),
    };

    apply_fragment(&fragment, temp_dir.path(), &data(None)).unwrap();
    assert_eq!(fs::read_to_string(temp_dir.path().join(".env")).unwrap(), "A=1\nPROJECT=demo\n");

    let missing = Fragment { target: PathBuf::from("notes/NEW.md"), ..fragment };
    apply_fragment(&missing, temp_dir.path(), &data(None)).unwrap();
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("notes/NEW.md")).unwrap(),
        "PROJECT=demo\n"
    );
}
