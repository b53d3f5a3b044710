use std::path::PathBuf;

pub const DEFAULT_QUESTIONS_FILE: &str = "questions.csv";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime settings read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub questions_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            questions_path: PathBuf::from(DEFAULT_QUESTIONS_FILE),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        fn string_env(name: &str, default: &str) -> String {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
        }
        Self {
            questions_path: PathBuf::from(string_env("QCM_QUESTIONS_FILE", DEFAULT_QUESTIONS_FILE)),
            host: string_env("QCM_HOST", DEFAULT_HOST),
            port: std::env::var("QCM_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_PORT),
        }
    }
}
