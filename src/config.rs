//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `FIREBASE_API_KEY` (required): Firestore REST API key
/// - `FIREBASE_PROJECT_ID` (required): Firebase project identifier
/// - `FIREBASE_DATABASE_ID` (optional): Firestore database id, defaults to `(default)`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
///
/// The two `FIREBASE_*` identifiers are mandatory: without them no store
/// operation can be attempted, so startup aborts before serving traffic.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub firebase_api_key: String,

    pub firebase_project_id: String,

    #[serde(default = "default_database_id")]
    pub firebase_database_id: String,

    #[serde(default = "default_port")]
    pub server_port: u16,
}

/// Default Firestore database id when FIREBASE_DATABASE_ID is not set.
fn default_database_id() -> String {
    "(default)".to_string()
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., FIREBASE_API_KEY)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: firebase_api_key -> FIREBASE_API_KEY
        envy::from_env::<Config>()
    }
}
