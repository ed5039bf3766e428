//! Configuration module
//!
//! Environment-driven configuration for the gateway. Provider settings are
//! grouped into explicit structs that are handed to the clients at
//! construction time; nothing reads ambient state at call time, which keeps
//! the clients substitutable in tests.

use std::env;
use std::path::PathBuf;

// Upload ceilings per operating mode
const RELAXED_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const HARDENED_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

// Outbound call timeouts per operating mode. The hardened timeout is the
// longer one: production traffic tolerates a slow provider better than a
// spurious timeout.
const RELAXED_MATTING_TIMEOUT_SECS: u64 = 30;
const HARDENED_MATTING_TIMEOUT_SECS: u64 = 45;

const DEFAULT_MATTING_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";
const DEFAULT_CLEANUP_SCHEDULE: &str = "0 2 1 * *";
const DEFAULT_CLEANUP_TIMEZONE: &str = "Asia/Ho_Chi_Minh";

/// Background-removal provider settings.
#[derive(Clone, Debug)]
pub struct MattingSettings {
    /// API key for the provider. Checked lazily so the gateway can boot
    /// without one; calls fail with a missing-credential error.
    pub api_key: Option<String>,
    /// Provider endpoint. Overridable so tests can point at a local stub.
    pub endpoint: String,
    /// Upload ceiling enforced before any network call.
    pub max_file_bytes: u64,
    /// Outbound request timeout in seconds. Always finite.
    pub timeout_secs: u64,
}

/// Media-storage provider settings.
#[derive(Clone, Debug)]
pub struct VaultSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Optional folder prefix; the retention sweep lists only this prefix.
    pub folder: Option<String>,
}

/// Retention sweep scheduling settings.
#[derive(Clone, Debug)]
pub struct CleanupSettings {
    /// Standard 5-field cron expression.
    pub schedule: String,
    /// IANA timezone name the cron expression is evaluated in.
    pub timezone: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Scratch directory for transient upload files.
    pub scratch_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub matting: MattingSettings,
    pub vault: VaultSettings,
    pub cleanup: CleanupSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());
        let hardened = is_hardened(&environment);

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_bytes = match env::var("MAX_FILE_SIZE_MB") {
            Ok(mb) => mb.parse::<u64>()? * 1024 * 1024,
            Err(_) if hardened => HARDENED_MAX_UPLOAD_BYTES,
            Err(_) => RELAXED_MAX_UPLOAD_BYTES,
        };

        let matting_timeout_secs = if hardened {
            HARDENED_MATTING_TIMEOUT_SECS
        } else {
            RELAXED_MATTING_TIMEOUT_SECS
        };

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment,
            cors_origins,
            scratch_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            max_upload_bytes,
            matting: MattingSettings {
                api_key: env::var("REMOVE_BG_API_KEY").ok(),
                endpoint: env::var("REMOVE_BG_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_MATTING_ENDPOINT.to_string()),
                max_file_bytes: max_upload_bytes,
                timeout_secs: matting_timeout_secs,
            },
            vault: VaultSettings {
                base_url: env::var("MEDIA_VAULT_BASE_URL").unwrap_or_default(),
                api_key: env::var("MEDIA_VAULT_API_KEY").ok(),
                folder: env::var("MEDIA_VAULT_FOLDER").ok().filter(|s| !s.is_empty()),
            },
            cleanup: CleanupSettings {
                schedule: env::var("CLEANUP_SCHEDULE")
                    .unwrap_or_else(|_| DEFAULT_CLEANUP_SCHEDULE.to_string()),
                timezone: env::var("CLEANUP_TIMEZONE")
                    .unwrap_or_else(|_| DEFAULT_CLEANUP_TIMEZONE.to_string()),
            },
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_bytes == 0 {
            anyhow::bail!("MAX_FILE_SIZE_MB must be greater than zero");
        }
        if self.matting.endpoint.is_empty() {
            anyhow::bail!("REMOVE_BG_ENDPOINT must not be empty");
        }
        if !self.vault.base_url.is_empty()
            && !self.vault.base_url.starts_with("http://")
            && !self.vault.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "MEDIA_VAULT_BASE_URL must be an http(s) URL, got {:?}",
                self.vault.base_url
            );
        }
        Ok(())
    }

    /// Hardened mode: tighter upload ceiling, longer provider timeout,
    /// generic client-facing errors, baseline security headers.
    pub fn is_hardened(&self) -> bool {
        is_hardened(&self.environment)
    }
}

fn is_hardened(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}
