//! Root files written after the template layers.
//! A `.gitignore` and a README describing the chosen stack are generated
//! only when no layer shipped its own.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use minijinja::Environment;

use crate::constants::COMPOSE_FILE;
use crate::context::TemplateData;
use crate::error::{Error, Result};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        let mut env = self.env.clone();
        env.add_template("readme", template).map_err(Error::MinijinjaError)?;
        let tmpl = env.get_template("readme").map_err(Error::MinijinjaError)?;
        tmpl.render(context).map_err(Error::MinijinjaError)
    }
}

pub const GITIGNORE: &str = "# Dependencies
node_modules/
.pnp
.pnp.js

# Testing
coverage/
.nyc_output

# Production
dist/
build/
out/

# Development
.env
.env.local
.env.development.local
.env.test.local
.env.production.local

# Logs
logs
*.log
npm-debug.log*
yarn-debug.log*
yarn-error.log*
pnpm-debug.log*
lerna-debug.log*

# OS
.DS_Store
Thumbs.db

# IDE
.vscode/
.idea/
*.swp
*.swo
*~

# Amp
amp/data/

# Foundry
contracts/cache/
contracts/out/
contracts/broadcast/
contracts/lib/

# PostgreSQL
*.sql.backup

# Drizzle
drizzle/
";

pub const README_TEMPLATE: &str = r#"# {{ name }}

{% if isWalletExample %}An ERC20 token wallet application{% else %}An Amp-powered {{ "web application" if projectType == "frontend" else "API server" }}{% endif %} built with {{ stack }}.

## Quick Start

### 1. Install dependencies

```bash
{{ install }}
```

{% if hasCompose %}
### 2. Start infrastructure

```bash
docker-compose up -d
```

This will start:
{% if useAmpSync %}
- **PostgreSQL** (port 5432) - Database for Amp Sync
{% if orm == "electric" %}
- **ElectricSQL** (port 3000) - Real-time sync service
{% endif %}
{% endif %}
- **Amp Server**: Arrow Flight gRPC on 1602, JSON Lines HTTP on 1603, Admin API on 1610
{% if includeAnvil %}
- **Anvil** (port 8545) - Local Ethereum testnet
{% endif %}

{% endif %}
### {{ 3 if hasCompose else 2 }}. Start the development server

```bash
{{ packageManager }} run dev
```

Visit **http://localhost:{{ port }}** to see your application.

## Network

- Network: {{ networkDisplayName }}
- RPC URL: {{ rpcUrl }}
- Chain ID: {{ chainId }}
"#;

/// Development server port of the generated project.
pub fn dev_port(data: &TemplateData) -> u16 {
    use crate::config::{Framework, ProjectType};
    match (data.config.project_type, data.config.framework) {
        (ProjectType::Backend, _) => 3001,
        (ProjectType::Frontend, Some(Framework::Nextjs)) => 3000,
        (ProjectType::Frontend, _) => 5173,
    }
}

fn stack_description(data: &TemplateData) -> String {
    use crate::config::{BackendFramework, Framework};
    let base = match (data.config.framework, data.config.backend) {
        (Some(Framework::Nextjs), _) => "Next.js",
        (Some(Framework::Vite), _) => "React (Vite)",
        (_, Some(BackendFramework::Express | BackendFramework::ExpressGateway)) => "Express",
        (_, Some(BackendFramework::Fastify | BackendFramework::FastifyGateway)) => "Fastify",
        (_, Some(_)) => "Apollo GraphQL",
        (None, None) => "Amp",
    };
    match data.config.orm {
        Some(orm) => format!("{base}, {} and {orm}", data.config.data_layer),
        None => format!("{base} and {}", data.config.data_layer),
    }
}

/// Renders the README for `data`. Infrastructure steps are included only
/// when the project has a compose file.
pub fn render_readme(
    renderer: &dyn TemplateRenderer,
    data: &TemplateData,
    has_compose: bool,
) -> Result<String> {
    let mut context = serde_json::to_value(data)?;
    if let Some(object) = context.as_object_mut() {
        let (program, args) = data.package_manager.install_command();
        let install = std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>();
        object.insert("install".into(), install.join(" ").into());
        object.insert("stack".into(), stack_description(data).into());
        object.insert("port".into(), dev_port(data).into());
        object.insert("hasCompose".into(), has_compose.into());
    }
    renderer.render(README_TEMPLATE, &context)
}

/// Writes `.gitignore` and `README.md` under `target` unless present,
/// returning the files written.
pub fn write_root_files(
    target: &Path,
    data: &TemplateData,
    renderer: &dyn TemplateRenderer,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let gitignore = target.join(".gitignore");
    if !gitignore.exists() {
        debug!("Writing default .gitignore");
        fs::write(&gitignore, GITIGNORE).map_err(Error::io(&gitignore))?;
        written.push(gitignore);
    }

    let readme = target.join("README.md");
    if !readme.exists() {
        debug!("Rendering README.md");
        let has_compose = target.join(COMPOSE_FILE).is_file();
        let content = render_readme(renderer, data, has_compose)?;
        fs::write(&readme, content).map_err(Error::io(&readme))?;
        written.push(readme);
    }

    Ok(written)
}
