//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for gil-server.
///
/// Every field has a default so the server starts without any environment
/// variables set; provider keys default to empty, which puts the matching
/// client on its fallback path.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite (or other) database URL (default: `"sqlite://gil.db"`).
    /// Any sqlx-compatible connection string works – swap the scheme to
    /// migrate to Postgres (`postgres://…`) or MySQL (`mysql://…`).
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve Swagger UI at `/swagger-ui` (default: `true`).
    pub enable_swagger: bool,

    /// Comma-separated CORS origin allow-list; unset means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Per-call timeout for every outbound provider request, in seconds.
    pub http_timeout_secs: u64,

    /// Base URL of the OpenAI-compatible chat-completions endpoint.
    pub llm_base_url: String,
    /// Bearer key for the LLM endpoint; empty for keyless local servers.
    pub llm_api_key: String,
    pub llm_model: String,
    pub llm_temperature: f32,

    /// Kakao Local / Kakao Mobility REST key.
    pub kakao_rest_api_key: String,
    /// Google Places + Google Directions key.
    pub google_api_key: String,
    /// YouTube Data API key.
    pub youtube_api_key: String,
    /// SerpAPI key for web-search snippets.
    pub serpapi_api_key: String,
    /// OpenWeather key.
    pub openweather_api_key: String,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("GIL_BIND", "0.0.0.0:3000"),
            database_url: env_or("GIL_DATABASE_URL", "sqlite://gil.db"),
            log_level: env_or("GIL_LOG", "info"),
            log_json: env_flag("GIL_LOG_JSON", false),
            enable_swagger: env_flag("GIL_ENABLE_SWAGGER", true),
            cors_allowed_origins: std::env::var("GIL_CORS_ORIGINS").ok(),
            http_timeout_secs: parse_env("GIL_HTTP_TIMEOUT_SECS", 10),
            llm_base_url: env_or("GIL_LLM_BASE_URL", "https://api.openai.com/v1"),
            llm_api_key: env_or("OPENAI_API_KEY", ""),
            llm_model: env_or("GIL_LLM_MODEL", "gpt-4o-mini"),
            llm_temperature: parse_env("GIL_LLM_TEMPERATURE", 0.7),
            kakao_rest_api_key: env_or("KAKAO_REST_API_KEY", ""),
            google_api_key: env_or("GOOGLE_API_KEY", ""),
            youtube_api_key: env_or("YOUTUBE_API_KEY", ""),
            serpapi_api_key: env_or("SERPAPI_API_KEY", ""),
            openweather_api_key: env_or("OPENWEATHER_API_KEY", ""),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
