//! Process-wide logging setup shared by the server and the client.

/// Initialize tracing for a long-running service (JSON, `info` by default).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env(), "info");
}

/// Initialize tracing for an interactive tool: human-readable output and a
/// quieter default so log lines do not interleave with prompts.
pub fn init_cli() {
    tracing::init(tracing::LogFormat::Text, "warn");
}

/// Tracing configuration (filters, formats).
pub mod tracing;
