//! `ServerConfig` (SPEC_FULL.md §B Configuration): loaded from environment
//! variables at process start via `dotenv`, matching the teacher's
//! `backend::main` pattern. Missing required values are collected and
//! reported together rather than defaulted silently.

use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub session_store_url: String,
    pub port: u16,
    pub env: Environment,
}

impl ServerConfig {
    /// Loads configuration from the process environment, per §6
    /// Environment. `DATABASE_URL` and `SESSION_STORE_URL` are required;
    /// `PORT` defaults to 3000 and `ENV` defaults to `development`.
    pub fn load() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut missing = Vec::new();

        let database_url = env::var("DATABASE_URL").map_err(|_| missing.push("DATABASE_URL")).ok();
        let session_store_url = env::var("SESSION_STORE_URL").map_err(|_| missing.push("SESSION_STORE_URL")).ok();

        if !missing.is_empty() {
            anyhow::bail!("missing required environment variables: {}", missing.join(", "));
        }

        let port = env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000);
        let env = match env::var("ENV").or_else(|_| env::var("NODE_ENV")).as_deref() {
            Ok("production") => Environment::Production,
            Ok("test") => Environment::Test,
            _ => Environment::Development,
        };

        Ok(ServerConfig {
            database_url: database_url.expect("checked above"),
            session_store_url: session_store_url.expect("checked above"),
            port,
            env,
        })
    }
}
