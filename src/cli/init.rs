//! Init command implementation
//!
//! Writes a commented `memroute.toml` and a `.env.example` into a directory.

use super::output::Output;
use crate::config::{MemrouteConfig, ProviderKind, DEFAULT_CONFIG_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// memroute.toml already exists and --force was not given
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// LLM provider to configure
    pub provider: ProviderKind,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing memroute");

    let base_path = &config.path;
    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    let config_path = base_path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let toml_content = generate_config_toml(config.provider);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", DEFAULT_CONFIG_FILE);

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    output.complete("memroute initialized successfully!");

    output.header("Next Steps");
    match config.provider {
        ProviderKind::OpenAI => {
            output.info("1. Provide your OpenAI key:");
            output.command("cp .env.example .env  # then set OPENAI_API_KEY");
        }
        ProviderKind::Ollama => {
            output.info("1. Start Ollama (if not running):");
            output.command("ollama serve");
            output.command("ollama pull llama3.2");
        }
    }
    output.info("2. Start chatting:");
    output.command("memroute chat");
    output.hint("Messages containing \"remember\" or \"recall\" go to long-term memory");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(()); // Skip existing files unless force is true
    }
    fs::write(path, content)
}

fn generate_config_toml(provider: ProviderKind) -> String {
    let defaults = MemrouteConfig::default();

    let model = match provider {
        ProviderKind::OpenAI => defaults.llm.model.as_str(),
        ProviderKind::Ollama => "llama3.2",
    };

    format!(
        r#"# memroute configuration
# Generated by: memroute init

# =============================================================================
# Language model
# =============================================================================
[llm]
# "openai" (any OpenAI-compatible endpoint) or "ollama"
provider = "{provider_name}"
model = "{model}"
temperature = {temperature:?}
# Name of the environment variable holding the OpenAI key
api_key_env = "{api_key_env}"
api_base = "{api_base}"
ollama_url = "{ollama_url}"

# =============================================================================
# Memory
# =============================================================================
[memory]
# Long-term facts live under <namespace>/<user_id>
namespace = "{namespace}"
user_id = "{user_id}"
recursion_limit = {recursion_limit}

# =============================================================================
# Logging (RUST_LOG overrides level)
# =============================================================================
[logging]
level = "{level}"
json = false
"#,
        provider_name = provider,
        temperature = defaults.llm.temperature,
        api_key_env = defaults.llm.api_key_env,
        api_base = defaults.llm.api_base,
        ollama_url = defaults.llm.ollama_url,
        namespace = defaults.memory.namespace,
        user_id = defaults.memory.user_id,
        recursion_limit = defaults.memory.recursion_limit,
        level = defaults.logging.level,
    )
}

fn generate_env_example() -> &'static str {
    r#"# memroute environment
# Copy to .env and fill in

# Required when [llm] provider = "openai"
OPENAI_API_KEY=

# Optional log filter, overrides [logging] level
# RUST_LOG=memroute=debug
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config(temp_dir: &TempDir, provider: ProviderKind) -> InitConfig {
        InitConfig {
            path: temp_dir.path().to_path_buf(),
            force: false,
            provider,
        }
    }

    #[test]
    fn test_generated_config_parses() {
        for provider in [ProviderKind::OpenAI, ProviderKind::Ollama] {
            let content = generate_config_toml(provider);
            let config = MemrouteConfig::from_toml_str(&content).unwrap();
            assert_eq!(config.llm.provider, provider);
            assert_eq!(config.memory.namespace, "ltm-multi");
        }
    }

    #[test]
    fn test_generated_openai_config_matches_defaults() {
        let content = generate_config_toml(ProviderKind::OpenAI);
        let config = MemrouteConfig::from_toml_str(&content).unwrap();
        assert_eq!(config, MemrouteConfig::default());
    }

    #[test]
    fn test_init_creates_files() {
        let temp_dir = TempDir::new().unwrap();
        let result = run(
            create_test_config(&temp_dir, ProviderKind::Ollama),
            &Output::no_color(),
        );

        assert_eq!(result, InitResult::Success);
        assert!(temp_dir.path().join("memroute.toml").exists());
        assert!(temp_dir.path().join(".env.example").exists());

        let config = MemrouteConfig::load(temp_dir.path().join("memroute.toml")).unwrap();
        assert_eq!(config.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.llm.model, "llama3.2");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("memroute.toml"), "# mine\n").unwrap();

        let result = run(
            create_test_config(&temp_dir, ProviderKind::OpenAI),
            &Output::no_color(),
        );

        assert_eq!(result, InitResult::AlreadyExists);
        let content = fs::read_to_string(temp_dir.path().join("memroute.toml")).unwrap();
        assert_eq!(content, "# mine\n");
    }

    #[test]
    fn test_init_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("memroute.toml"), "# mine\n").unwrap();

        let mut config = create_test_config(&temp_dir, ProviderKind::OpenAI);
        config.force = true;
        let result = run(config, &Output::no_color());

        assert_eq!(result, InitResult::Success);
        let content = fs::read_to_string(temp_dir.path().join("memroute.toml")).unwrap();
        assert!(content.contains("[llm]"));
    }

    #[test]
    fn test_init_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested/project");

        let result = run(
            InitConfig {
                path: nested.clone(),
                force: false,
                provider: ProviderKind::OpenAI,
            },
            &Output::no_color(),
        );

        assert_eq!(result, InitResult::Success);
        assert!(nested.join("memroute.toml").exists());
    }
}
