use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use create_amp::catalog::TemplateKey;
use create_amp::config::{
    BackendFramework, DataLayer, Example, Framework, LocalSetup, Network, NetworkEnv, Orm,
    PackageManager, ProjectConfig, ProjectType,
};
use create_amp::context::PLACEHOLDER_KEYS;
use create_amp::environment::Environment;
use create_amp::error::Error;
use create_amp::processor::{check_target, prepare_target, Processor};
use create_amp::readme::MiniJinjaRenderer;
use create_amp::substitute::placeholders;
use tempfile::TempDir;
use walkdir::WalkDir;

const LOGO: &[u8] = b"\x89PNG\r\n\x1a\n\0\0{{projectName}}\0";

fn write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "vite-react/base/package.json",
        br#"{"name": "{{projectName}}", "version": "0.1.0", "dependencies": {"react": "^19.0.0"}}"#,
    );
    write(
        root,
        "vite-react/base/src/App.tsx",
        b"export const title = '{{ projectName }}'\nexport const pm = '{{packageManager}}' // {{unknownKey}}\n",
    );
    write(root, "vite-react/base/public/logo.png", LOGO);
    write(root, "vite-react/base/node_modules/left-pad/index.js", b"module.exports = 1\n");
    write(root, "vite-react/base/.env.example", b"RPC_URL={{rpcUrl}}\nCHAIN_ID={{chainId}}\n");

    write(
        root,
        "vite-react/flight-atom/package.json.additions",
        br#"{"dependencies": {"@edgeandnode/amp": "^0.1.0"}, "scripts": {"dev": "vite"}}"#,
    );
    write(root, "vite-react/flight-atom/src/lib/query.ts", b"// {{dataLayer}} query\n");
    write(root, "vite-react/flight-atom/src/lib/electric-client.ts", b"electric\n");

    write(
        root,
        "vite-react/ampsync-electricsql/package.json.additions",
        b"{\n  \"dependencies\": {\n    // @amp-if orm=electric\n    \"@electric-sql/client\": \"^1.0.0\",\n    // @amp-endif\n    \"drizzle-orm\": \"^0.40.0\", // @amp-when orm=drizzle\n    \"pg\": \"^8.0.0\",\n  }\n}\n",
    );
    write(root, "vite-react/ampsync-electricsql/src/db/electric.ts", b"electric\n");
    write(root, "vite-react/ampsync-electricsql/src/db/drizzle.ts", b"drizzle\n");
    write(root, "vite-react/ampsync-electricsql/src/db/index.ts", b"// {{orm}}\n");

    write(root, "data-layer/arrow-flight/src/lib/runtime.ts", b"// {{projectName}} runtime\n");
    write(root, "data-layer/arrow-flight/src/lib/queries.ts", b"queries\n");
    write(root, "data-layer/amp-sync/src/lib/schema.ts", b"schema\n");
    write(root, "data-layer/amp-sync/src/lib/electric.ts", b"electric client\n");
    write(root, "data-layer/amp-sync/src/lib/drizzle.ts", b"drizzle client\n");

    write(root, "examples/wallet/src/Wallet.tsx", b"wallet for {{networkDisplayName}}\n");

    write(root, "backend/base/src/server.ts", b"base server\n");
    write(root, "backend/base/src/config.ts", b"export const name = '{{projectName}}'\n");
    write(root, "backend/base/package.json", br#"{"name": "{{projectName}}", "version": "0.1.0"}"#);
    write(root, "backend/fastify/src/server.ts", b"fastify server\n");

    write(root, "nextjs/package.json", br#"{"name": "{{projectName}}", "version": "0.1.0"}"#);

    dir
}

fn vite_config(path: PathBuf) -> ProjectConfig {
    ProjectConfig {
        name: "demo-app".into(),
        path,
        project_type: ProjectType::Frontend,
        framework: Some(Framework::Vite),
        backend: None,
        data_layer: DataLayer::ArrowFlight,
        orm: None,
        example: Example::Blank,
        local_setup: LocalSetup::Anvil,
        network: None,
        network_env: None,
        package_manager: Some(PackageManager::Pnpm),
        skip_install: true,
        skip_git: true,
    }
}

fn amp_sync_config(path: PathBuf, orm: Orm) -> ProjectConfig {
    ProjectConfig { data_layer: DataLayer::AmpSync, orm: Some(orm), ..vite_config(path) }
}

fn generate(config: &ProjectConfig, corpus: &Path) -> Result<create_amp::processor::Summary, Error> {
    let renderer = MiniJinjaRenderer::new();
    Processor::new(config, &Environment::default(), corpus, &renderer).materialize()
}

fn relative_files(root: &Path) -> Vec<String> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_check_target() {
    let temp_dir = TempDir::new().unwrap();
    assert!(check_target(&temp_dir.path().join("missing")).is_ok());
    assert!(check_target(temp_dir.path()).is_ok());

    fs::write(temp_dir.path().join("file.txt"), "x").unwrap();
    assert!(matches!(check_target(temp_dir.path()), Err(Error::TargetNotEmpty { .. })));
    assert!(check_target(&temp_dir.path().join("file.txt")).is_err());
}

#[test]
fn test_prepare_target_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("a/b");
    assert!(prepare_target(&target).unwrap());
    assert!(!prepare_target(&target).unwrap());
    assert!(target.is_dir());
}

#[test]
fn test_vite_arrow_flight_blank() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();
    let target = out.path().join("demo-app");
    let config = vite_config(target.clone());

    let summary = generate(&config, corpus.path()).unwrap();
    assert_eq!(
        summary.layers,
        vec![
            TemplateKey::ViteReactBase,
            TemplateKey::ViteReactArrowFlight,
            TemplateKey::DataLayerArrowFlight
        ]
    );
    assert_eq!(summary.fragments, 1);

    let app = fs::read_to_string(target.join("src/App.tsx")).unwrap();
    assert!(app.contains("export const title = 'demo-app'"));
    assert!(app.contains("export const pm = 'pnpm'"));
    assert!(app.contains("{{unknownKey}}"));

    let env = fs::read_to_string(target.join(".env.example")).unwrap();
    assert_eq!(env, "RPC_URL=http://localhost:8545\nCHAIN_ID=31337\n");

    let manifest = read_json(&target.join("package.json"));
    assert_eq!(manifest["name"], "demo-app");
    assert_eq!(manifest["dependencies"]["react"], "^19.0.0");
    assert_eq!(manifest["dependencies"]["@edgeandnode/amp"], "^0.1.0");
    assert_eq!(manifest["scripts"]["dev"], "vite");
    let deps: Vec<_> = manifest["dependencies"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(deps, vec!["@edgeandnode/amp", "react"]);

    assert_eq!(fs::read(target.join("public/logo.png")).unwrap(), LOGO);
    assert!(!target.join("node_modules").exists());
    assert!(!target.join(".git").exists());
    assert!(!target.join("src/lib/electric-client.ts").exists());
    assert!(target.join("src/lib/query.ts").exists());
    assert!(target.join(".gitignore").exists());
    assert!(!target.join("docker-compose.yml").exists());
    assert!(!target.join("amp").exists());
    let readme = fs::read_to_string(target.join("README.md")).unwrap();
    assert!(!readme.contains("docker-compose"));
    assert!(readme.contains("### 2. Start the development server"));
}

#[test]
fn test_data_layer_files() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();

    let flight = vite_config(out.path().join("flight"));
    generate(&flight, corpus.path()).unwrap();
    assert_eq!(
        fs::read_to_string(flight.path.join("src/lib/runtime.ts")).unwrap(),
        "// demo-app runtime\n"
    );
    assert!(flight.path.join("src/lib/queries.ts").exists());
    assert!(!flight.path.join("src/lib/schema.ts").exists());

    let electric = amp_sync_config(out.path().join("electric"), Orm::Electric);
    let summary = generate(&electric, corpus.path()).unwrap();
    assert_eq!(summary.layers[2], TemplateKey::DataLayerAmpSync);
    assert!(electric.path.join("src/lib/schema.ts").exists());
    assert!(electric.path.join("src/lib/electric.ts").exists());
    assert!(!electric.path.join("src/lib/drizzle.ts").exists());
    assert!(!electric.path.join("src/lib/runtime.ts").exists());

    let drizzle = amp_sync_config(out.path().join("drizzle"), Orm::Drizzle);
    generate(&drizzle, corpus.path()).unwrap();
    assert!(drizzle.path.join("src/lib/drizzle.ts").exists());
    assert!(!drizzle.path.join("src/lib/electric.ts").exists());
}

#[test]
fn test_later_fragment_replaces_earlier() {
    let corpus = corpus();
    write(
        corpus.path(),
        "vite-react/base/package.json.additions",
        br#"{"dependencies": {"generic": "1"}}"#,
    );
    write(corpus.path(), "vite-react/base/notes.txt.additions", b"from base\n");
    write(corpus.path(), "vite-react/flight-atom/notes.txt.additions", b"from flight\n");
    let out = TempDir::new().unwrap();
    let config = vite_config(out.path().join("app"));

    let summary = generate(&config, corpus.path()).unwrap();
    assert_eq!(summary.fragments, 2);
    assert_eq!(fs::read_to_string(config.path.join("notes.txt")).unwrap(), "from flight\n");
    let manifest = read_json(&config.path.join("package.json"));
    assert!(manifest["dependencies"].get("generic").is_none());
    assert_eq!(manifest["dependencies"]["@edgeandnode/amp"], "^0.1.0");
}

#[test]
fn test_infrastructure_files() {
    let corpus = corpus();
    write(
        corpus.path(),
        "docker-compose/docker-compose.arrow-flight.yml",
        b"name: {{projectName}}\n",
    );
    write(corpus.path(), "amp/datasets/amp.config.ts", b"name: \"{{projectName}}_dataset\"\n");
    write(corpus.path(), "examples/wallet/amp/datasets/amp.config.ts", b"wallet dataset\n");
    let out = TempDir::new().unwrap();

    let config = vite_config(out.path().join("anvil"));
    let summary = generate(&config, corpus.path()).unwrap();
    assert_eq!(summary.layers[0], TemplateKey::AmpConfig);
    assert_eq!(
        fs::read_to_string(config.path.join("amp/datasets/amp.config.ts")).unwrap(),
        "name: \"demo-app_dataset\"\n"
    );
    assert_eq!(
        fs::read_to_string(config.path.join("docker-compose.yml")).unwrap(),
        "name: demo-app\n"
    );
    let readme = fs::read_to_string(config.path.join("README.md")).unwrap();
    assert!(readme.contains("docker-compose up -d"));
    assert!(readme.contains("### 3. Start the development server"));

    let wallet = ProjectConfig { example: Example::Wallet, ..vite_config(out.path().join("wallet")) };
    generate(&wallet, corpus.path()).unwrap();
    assert_eq!(
        fs::read_to_string(wallet.path.join("amp/datasets/amp.config.ts")).unwrap(),
        "wallet dataset\n"
    );

    let public = ProjectConfig {
        local_setup: LocalSetup::Public,
        network: Some(Network::Arbitrum),
        network_env: Some(NetworkEnv::Testnet),
        ..vite_config(out.path().join("public"))
    };
    let summary = generate(&public, corpus.path()).unwrap();
    assert!(!summary.layers.contains(&TemplateKey::AmpConfig));
    assert!(!public.path.join("amp").exists());
    assert!(public.path.join("docker-compose.yml").exists());
}

#[test]
fn test_output_has_no_fragments_or_recognized_tokens() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();
    let configs = [
        vite_config(out.path().join("flight")),
        amp_sync_config(out.path().join("electric"), Orm::Electric),
        amp_sync_config(out.path().join("drizzle"), Orm::Drizzle),
        ProjectConfig { example: Example::Wallet, ..vite_config(out.path().join("wallet")) },
    ];

    for config in &configs {
        generate(config, corpus.path()).unwrap();
        let files = relative_files(&config.path);
        assert!(!files.is_empty());
        for file in files {
            assert!(!file.ends_with(".additions"), "leftover fragment {file}");
            let bytes = fs::read(config.path.join(&file)).unwrap();
            if let Ok(text) = String::from_utf8(bytes) {
                for key in placeholders(&text) {
                    assert!(!PLACEHOLDER_KEYS.contains(&key.as_str()), "{key} left in {file}");
                }
            }
        }
    }
}

#[test]
fn test_orm_exclusion() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();

    let electric = amp_sync_config(out.path().join("electric"), Orm::Electric);
    generate(&electric, corpus.path()).unwrap();
    let files = relative_files(&electric.path);
    assert!(files.iter().all(|f| !f.contains("drizzle")));
    assert!(electric.path.join("src/db/electric.ts").exists());
    let manifest = read_json(&electric.path.join("package.json"));
    assert_eq!(manifest["dependencies"]["@electric-sql/client"], "^1.0.0");
    assert_eq!(manifest["dependencies"]["pg"], "^8.0.0");
    assert!(manifest["dependencies"].get("drizzle-orm").is_none());

    let drizzle = amp_sync_config(out.path().join("drizzle"), Orm::Drizzle);
    generate(&drizzle, corpus.path()).unwrap();
    let files = relative_files(&drizzle.path);
    assert!(files.iter().all(|f| !f.contains("electric")));
    assert!(drizzle.path.join("src/db/drizzle.ts").exists());
    let manifest = read_json(&drizzle.path.join("package.json"));
    assert_eq!(manifest["dependencies"]["drizzle-orm"], "^0.40.0");
    assert!(manifest["dependencies"].get("@electric-sql/client").is_none());
    assert_eq!(fs::read_to_string(drizzle.path.join("src/db/index.ts")).unwrap(), "// drizzle\n");
}

#[test]
fn test_backend_layer_overrides_base() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();
    let config = ProjectConfig {
        project_type: ProjectType::Backend,
        framework: None,
        backend: Some(BackendFramework::Fastify),
        ..vite_config(out.path().join("api"))
    };

    let summary = generate(&config, corpus.path()).unwrap();
    assert_eq!(summary.layers, vec![TemplateKey::BackendBase, TemplateKey::BackendFastify]);
    assert_eq!(fs::read_to_string(config.path.join("src/server.ts")).unwrap(), "fastify server\n");
    assert_eq!(
        fs::read_to_string(config.path.join("src/config.ts")).unwrap(),
        "export const name = 'demo-app'\n"
    );
}

#[test]
fn test_non_empty_target_fails_before_writing() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();
    let target = out.path().join("taken");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("existing.txt"), "keep me").unwrap();

    let result = generate(&vite_config(target.clone()), corpus.path());
    assert!(matches!(result, Err(Error::TargetNotEmpty { .. })));
    assert_eq!(relative_files(&target), vec!["existing.txt"]);
}

#[test]
fn test_missing_template_fails_before_writing() {
    let corpus = corpus();
    fs::remove_dir_all(corpus.path().join("examples/wallet")).unwrap();
    let out = TempDir::new().unwrap();
    let config = ProjectConfig { example: Example::Wallet, ..vite_config(out.path().join("app")) };

    let result = generate(&config, corpus.path());
    assert!(matches!(result, Err(Error::TemplateNotFound { .. })));
    assert!(!config.path.exists());
}

#[test]
fn test_failure_removes_created_directory() {
    let corpus = corpus();
    write(
        corpus.path(),
        "vite-react/flight-atom/README.md.additions",
        b"<!-- @amp-if orm=electric -->\nunterminated\n",
    );
    let out = TempDir::new().unwrap();
    let config = vite_config(out.path().join("app"));

    let result = generate(&config, corpus.path());
    assert!(matches!(result, Err(Error::MalformedFragment { .. })));
    assert!(!config.path.exists());
}

#[test]
fn test_failure_empties_existing_directory() {
    let corpus = corpus();
    write(corpus.path(), "vite-react/flight-atom/tsconfig.json.additions", b"[1, 2]");
    write(corpus.path(), "vite-react/base/tsconfig.json", br#"{"compilerOptions": {}}"#);
    let out = TempDir::new().unwrap();
    let config = vite_config(out.path().to_path_buf());

    let result = generate(&config, corpus.path());
    assert!(matches!(result, Err(Error::MergeConflict { .. })));
    assert!(out.path().is_dir());
    assert!(relative_files(out.path()).is_empty());
}

#[test]
fn test_interrupt_aborts_generation() {
    let corpus = corpus();
    let out = TempDir::new().unwrap();
    let config = vite_config(out.path().join("app"));
    let flag = AtomicBool::new(true);
    let renderer = MiniJinjaRenderer::new();

    let result = Processor::new(&config, &Environment::default(), corpus.path(), &renderer)
        .with_interrupt(&flag)
        .materialize();
    assert!(matches!(result, Err(Error::Interrupted)));
    assert!(!config.path.exists());
}

#[test]
fn test_generation_is_deterministic() {
    let corpus = corpus();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    generate(&amp_sync_config(first.path().join("app"), Orm::Electric), corpus.path()).unwrap();
    generate(&amp_sync_config(second.path().join("app"), Orm::Electric), corpus.path()).unwrap();

    assert!(!dir_diff::is_different(first.path(), second.path()).unwrap());
}

#[test]
fn test_layer_files_take_precedence_over_root_files() {
    let corpus = corpus();
    write(corpus.path(), "nextjs/README.md", b"# {{projectName}} from template\n");
    let out = TempDir::new().unwrap();
    let config = ProjectConfig { framework: Some(Framework::Nextjs), ..vite_config(out.path().join("next")) };

    generate(&config, corpus.path()).unwrap();
    assert_eq!(
        fs::read_to_string(config.path.join("README.md")).unwrap(),
        "# demo-app from template\n"
    );
    assert!(config.path.join(".gitignore").exists());
}
