//! Common constants used throughout create-amp.

/// Directory names never copied out of any template layer.
pub const ALWAYS_SKIP_DIRECTORIES: [&str; 2] = ["node_modules", ".git"];

/// Suffix marking a side-car addition fragment, e.g. `package.json.additions`.
pub const ADDITIONS_SUFFIX: &str = ".additions";

/// Per-layer inclusion rule manifests, tried in order.
pub const RULES_FILES: [&str; 3] = [".amp-rules.yaml", ".amp-rules.yml", ".amp-rules.json"];

/// Output directory of the Amp dataset config.
pub const AMP_DIRECTORY: &str = "amp";

/// Corpus directory holding one compose file per data layer,
/// `docker-compose.<data-layer>.yml`.
pub const COMPOSE_DIRECTORY: &str = "docker-compose";

pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Maximum package name length accepted by the npm registry.
pub const MAX_NAME_LENGTH: usize = 214;

/// Default remote template corpus.
pub const DEFAULT_TEMPLATES_REPO: &str = "https://github.com/edgeandnode/amp-templates.git";

pub const DEFAULT_TEMPLATES_REF: &str = "main";

/// Seconds before a corpus download is abandoned.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Environment variable overriding the template corpus location.
pub const TEMPLATES_ENV_VAR: &str = "CREATE_AMP_TEMPLATES";

pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from create-amp";

/// Bytes inspected when sniffing a file for binary content.
pub const BINARY_SNIFF_LEN: usize = 8000;

/// Extensions always treated as binary without sniffing.
pub const BINARY_EXTENSIONS: [&str; 24] = [
    "png", "jpg", "jpeg", "gif", "ico", "webp", "bmp", "avif", "woff", "woff2", "ttf", "otf",
    "eot", "pdf", "zip", "gz", "tgz", "tar", "wasm", "mp3", "mp4", "webm", "sqlite", "db",
];

/// Dependency maps whose keys are kept sorted after a merge.
pub const DEPENDENCY_KEYS: [&str; 4] =
    ["dependencies", "devDependencies", "peerDependencies", "optionalDependencies"];
