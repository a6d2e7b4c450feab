//! Template corpus catalog.
//! Every [`TemplateKey`] maps to exactly one static [`TemplateDescriptor`];
//! the mapping is an exhaustive `match`, so a key without a descriptor does
//! not compile.

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::{BackendFramework, DataLayer};
use crate::constants::ALWAYS_SKIP_DIRECTORIES;
use crate::error::{Error, Result};

/// Groups templates when offering choices to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// The template defines and serves its own dataset.
    BuildDataset,
    /// The template queries an existing dataset through the Amp gateway.
    ExistingDataset,
    /// Building block layered under or over other templates.
    Layer,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::BuildDataset => f.write_str("build your own dataset"),
            Category::ExistingDataset => f.write_str("use an existing dataset"),
            Category::Layer => f.write_str("layer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    Nextjs,
    ViteReactBase,
    ViteReactArrowFlight,
    ViteReactAmpSync,
    DataLayerArrowFlight,
    DataLayerAmpSync,
    ExampleWallet,
    AmpConfig,
    BackendBase,
    BackendExpress,
    BackendFastify,
    BackendApolloGraphql,
    BackendExpressGateway,
    BackendFastifyGateway,
    BackendApolloGraphqlGateway,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 15] = [
        TemplateKey::Nextjs,
        TemplateKey::ViteReactBase,
        TemplateKey::ViteReactArrowFlight,
        TemplateKey::ViteReactAmpSync,
        TemplateKey::DataLayerArrowFlight,
        TemplateKey::DataLayerAmpSync,
        TemplateKey::ExampleWallet,
        TemplateKey::AmpConfig,
        TemplateKey::BackendBase,
        TemplateKey::BackendExpress,
        TemplateKey::BackendFastify,
        TemplateKey::BackendApolloGraphql,
        TemplateKey::BackendExpressGateway,
        TemplateKey::BackendFastifyGateway,
        TemplateKey::BackendApolloGraphqlGateway,
    ];

    pub fn descriptor(self) -> &'static TemplateDescriptor {
        match self {
            TemplateKey::Nextjs => &NEXTJS,
            TemplateKey::ViteReactBase => &VITE_REACT_BASE,
            TemplateKey::ViteReactArrowFlight => &VITE_REACT_ARROW_FLIGHT,
            TemplateKey::ViteReactAmpSync => &VITE_REACT_AMP_SYNC,
            TemplateKey::DataLayerArrowFlight => &DATA_LAYER_ARROW_FLIGHT,
            TemplateKey::DataLayerAmpSync => &DATA_LAYER_AMP_SYNC,
            TemplateKey::ExampleWallet => &EXAMPLE_WALLET,
            TemplateKey::AmpConfig => &AMP_CONFIG,
            TemplateKey::BackendBase => &BACKEND_BASE,
            TemplateKey::BackendExpress => &BACKEND_EXPRESS,
            TemplateKey::BackendFastify => &BACKEND_FASTIFY,
            TemplateKey::BackendApolloGraphql => &BACKEND_APOLLO_GRAPHQL,
            TemplateKey::BackendExpressGateway => &BACKEND_EXPRESS_GATEWAY,
            TemplateKey::BackendFastifyGateway => &BACKEND_FASTIFY_GATEWAY,
            TemplateKey::BackendApolloGraphqlGateway => &BACKEND_APOLLO_GRAPHQL_GATEWAY,
        }
    }

    pub fn for_data_layer(data_layer: DataLayer) -> TemplateKey {
        match data_layer {
            DataLayer::ArrowFlight => TemplateKey::DataLayerArrowFlight,
            DataLayer::AmpSync => TemplateKey::DataLayerAmpSync,
        }
    }

    pub fn for_backend(backend: BackendFramework) -> TemplateKey {
        match backend {
            BackendFramework::Express => TemplateKey::BackendExpress,
            BackendFramework::Fastify => TemplateKey::BackendFastify,
            BackendFramework::ApolloGraphql => TemplateKey::BackendApolloGraphql,
            BackendFramework::ExpressGateway => TemplateKey::BackendExpressGateway,
            BackendFramework::FastifyGateway => TemplateKey::BackendFastifyGateway,
            BackendFramework::ApolloGraphqlGateway => TemplateKey::BackendApolloGraphqlGateway,
        }
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().key)
    }
}

/// One entry of the template corpus.
#[derive(Debug)]
pub struct TemplateDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Directory relative to the corpus root, `/`-separated.
    pub directory: &'static str,
    /// Directory names skipped in addition to [`ALWAYS_SKIP_DIRECTORIES`].
    pub skip: &'static [&'static str],
    pub category: Category,
}

impl TemplateDescriptor {
    /// Location of this template inside a corpus checkout.
    pub fn source_dir(&self, corpus_root: &Path) -> PathBuf {
        self.directory.split('/').fold(corpus_root.to_path_buf(), |path, part| path.join(part))
    }

    /// Every directory name never copied from this template.
    pub fn skipped_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        ALWAYS_SKIP_DIRECTORIES.iter().copied().chain(self.skip.iter().copied())
    }

    /// Compiles the skip names into a matcher over layer-relative paths: a
    /// path matches when any of its components is a skipped name.
    pub fn skip_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for name in self.skipped_names() {
            for pattern in [name.to_string(), format!("{name}/**"), format!("**/{name}"), format!("**/{name}/**")] {
                let glob = Glob::new(&pattern)
                    .map_err(|e| Error::Rules(format!("invalid skip entry '{name}': {e}")))?;
                builder.add(glob);
            }
        }
        builder.build().map_err(|e| Error::Rules(format!("skip set for '{}': {e}", self.key)))
    }
}

static NEXTJS: TemplateDescriptor = TemplateDescriptor {
    key: "nextjs",
    name: "Next.js fullstack app",
    description: "Scaffolds a self-contained Next.js fullstack web app",
    directory: "nextjs",
    skip: &[".next", "dist"],
    category: Category::BuildDataset,
};

static VITE_REACT_BASE: TemplateDescriptor = TemplateDescriptor {
    key: "vite-react-base",
    name: "React (Vite) base",
    description: "React application using Vite as the build tool",
    directory: "vite-react/base",
    skip: &[".tanstack", "dist"],
    category: Category::Layer,
};

static VITE_REACT_ARROW_FLIGHT: TemplateDescriptor = TemplateDescriptor {
    key: "react-arrowflight-effect-atom",
    name: "React app with Arrow Flight and effect-atom",
    description: "Queries your Amp dataset over Arrow Flight with effect-atom hooks",
    directory: "vite-react/flight-atom",
    skip: &[".tanstack", "dist"],
    category: Category::Layer,
};

static VITE_REACT_AMP_SYNC: TemplateDescriptor = TemplateDescriptor {
    key: "react-ampsync-electricsql",
    name: "React app with Amp Sync",
    description: "Syncs your Amp dataset into Postgres and reads it through the chosen ORM",
    directory: "vite-react/ampsync-electricsql",
    skip: &[".tanstack", "dist"],
    category: Category::Layer,
};

static DATA_LAYER_ARROW_FLIGHT: TemplateDescriptor = TemplateDescriptor {
    key: "data-layer-arrow-flight",
    name: "Arrow Flight data layer",
    description: "Effect runtime and typed queries over Arrow Flight",
    directory: "data-layer/arrow-flight",
    skip: &["dist"],
    category: Category::Layer,
};

static DATA_LAYER_AMP_SYNC: TemplateDescriptor = TemplateDescriptor {
    key: "data-layer-amp-sync",
    name: "Amp Sync data layer",
    description: "Postgres schema with ElectricSQL or Drizzle clients",
    directory: "data-layer/amp-sync",
    skip: &["dist"],
    category: Category::Layer,
};

static EXAMPLE_WALLET: TemplateDescriptor = TemplateDescriptor {
    key: "example-wallet",
    name: "ERC20 wallet example",
    description: "Token wallet with balances and transfers",
    directory: "examples/wallet",
    skip: &["dist"],
    category: Category::Layer,
};

static AMP_CONFIG: TemplateDescriptor = TemplateDescriptor {
    key: "amp-config",
    name: "Amp dataset config",
    description: "Dataset definition for the local Anvil chain",
    directory: "amp",
    skip: &["data"],
    category: Category::Layer,
};

static BACKEND_BASE: TemplateDescriptor = TemplateDescriptor {
    key: "backend-base",
    name: "Backend base",
    description: "Shared Node.js server scaffolding",
    directory: "backend/base",
    skip: &["dist"],
    category: Category::Layer,
};

static BACKEND_EXPRESS: TemplateDescriptor = TemplateDescriptor {
    key: "backend-express",
    name: "Express",
    description: "Node.js server using Express, querying your Amp dataset with Arrow Flight",
    directory: "backend/express",
    skip: &["dist"],
    category: Category::BuildDataset,
};

static BACKEND_FASTIFY: TemplateDescriptor = TemplateDescriptor {
    key: "backend-fastify",
    name: "Fastify",
    description: "Node.js server using Fastify, querying your Amp dataset with Arrow Flight",
    directory: "backend/fastify",
    skip: &["dist"],
    category: Category::BuildDataset,
};

static BACKEND_APOLLO_GRAPHQL: TemplateDescriptor = TemplateDescriptor {
    key: "backend-apollo-graphql",
    name: "Apollo GraphQL",
    description: "GraphQL API server using Apollo Server, querying your Amp dataset",
    directory: "backend/apollo-graphql",
    skip: &["dist"],
    category: Category::BuildDataset,
};

static BACKEND_EXPRESS_GATEWAY: TemplateDescriptor = TemplateDescriptor {
    key: "backend-express-gateway",
    name: "Express gateway",
    description: "Express server querying a published dataset through the Amp gateway",
    directory: "backend/express-gateway",
    skip: &["dist"],
    category: Category::ExistingDataset,
};

static BACKEND_FASTIFY_GATEWAY: TemplateDescriptor = TemplateDescriptor {
    key: "backend-fastify-gateway",
    name: "Fastify gateway",
    description: "Fastify server querying a published dataset through the Amp gateway",
    directory: "backend/fastify-gateway",
    skip: &["dist"],
    category: Category::ExistingDataset,
};

static BACKEND_APOLLO_GRAPHQL_GATEWAY: TemplateDescriptor = TemplateDescriptor {
    key: "backend-apollo-graphql-gateway",
    name: "Apollo GraphQL gateway",
    description: "GraphQL API querying a published dataset through the Amp gateway",
    directory: "backend/apollo-graphql-gateway",
    skip: &["dist"],
    category: Category::ExistingDataset,
};
