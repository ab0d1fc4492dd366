use std::path::PathBuf;

use anyhow::{Context, Result};
use platform_directory::DirectorySettings;
use products_roster::RoleDirectory;

/// Where the role tables come from. The only setting the offline commands read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TablesConfig {
    pub path: Option<PathBuf>,
}

impl TablesConfig {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = lookup("ROLE_TABLES_PATH")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);
        Self { path }
    }

    /// Tables from `ROLE_TABLES_PATH`, or the standard ones.
    pub fn role_directory(&self) -> Result<RoleDirectory> {
        match &self.path {
            Some(path) => RoleDirectory::from_path(path)
                .with_context(|| format!("failed to load role tables from {}", path.display())),
            None => Ok(RoleDirectory::standard()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    pub tables: TablesConfig,
    pub directory: DirectorySettings,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let tables = TablesConfig::from_lookup(&lookup);

        let directory =
            DirectorySettings::from_lookup(&lookup).context("invalid employee directory settings")?;

        Ok(Self {
            cors_allowed_origins,
            tables,
            directory,
        })
    }
}
