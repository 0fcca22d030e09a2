//! Layered deep-merge configuration resolution (C5).
//!
//! [`resolve`] applies four layers in ascending precedence: hard-coded
//! defaults, process-wide defaults (typically sourced from the
//! environment), an agent's static config, and finally per-call overrides.
//! Each layer is a [`ConfigOverrides`]; a field left `None` at a layer
//! falls through to the next one down.

use warden_core::{Config, ConfigOverrides};

/// Read process-wide config overrides from `WARDEN_*` environment
/// variables. Call [`load_dotenv`] first if a `.env` file should seed the
/// process environment before this runs.
pub fn process_defaults_from_env() -> ConfigOverrides {
    ConfigOverrides {
        model: std::env::var("WARDEN_MODEL").ok(),
        timeout_ms: env_u64("WARDEN_TIMEOUT_MS"),
        max_iterations: env_u32("WARDEN_MAX_ITERATIONS"),
        max_retries: env_u32("WARDEN_MAX_RETRIES"),
        sandbox_timeout_ms: env_u64("WARDEN_SANDBOX_TIMEOUT_MS"),
        sandbox_max_heap_size_units: env_u64("WARDEN_SANDBOX_MAX_HEAP_SIZE_UNITS"),
    }
}

/// Load a `.env` file into the process environment, if present. Missing
/// files are not an error; malformed ones are logged and ignored.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(?path, "loaded .env file"),
        Err(dotenvy::Error::Io(_)) => {}
        Err(e) => tracing::warn!(error = %e, "failed to parse .env file"),
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Resolve the final [`Config`] for one activation, applying each layer in
/// ascending precedence (`call_opts` wins last).
pub fn resolve(process_defaults: &ConfigOverrides, static_config: &ConfigOverrides, call_opts: &ConfigOverrides) -> Config {
    let mut config = Config::default();
    apply(&mut config, process_defaults);
    apply(&mut config, static_config);
    apply(&mut config, call_opts);
    config
}

fn apply(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(model) = &overrides.model {
        config.model = model.clone();
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(max_iterations) = overrides.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(max_retries) = overrides.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(sandbox_timeout_ms) = overrides.sandbox_timeout_ms {
        config.sandbox.timeout_ms = sandbox_timeout_ms;
    }
    if let Some(max_heap) = overrides.sandbox_max_heap_size_units {
        config.sandbox.max_heap_size_units = max_heap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_overrides_yields_hard_coded_defaults() {
        let config = resolve(&ConfigOverrides::default(), &ConfigOverrides::default(), &ConfigOverrides::default());
        assert_eq!(config.model, "openai:gpt-4o");
        assert_eq!(config.max_iterations, 10);
    }

    #[test]
    fn process_defaults_override_hard_coded() {
        let process = ConfigOverrides { model: Some("anthropic:claude".into()), ..Default::default() };
        let config = resolve(&process, &ConfigOverrides::default(), &ConfigOverrides::default());
        assert_eq!(config.model, "anthropic:claude");
    }

    #[test]
    fn static_config_overrides_process_defaults() {
        let process = ConfigOverrides { max_iterations: Some(5), ..Default::default() };
        let static_config = ConfigOverrides { max_iterations: Some(20), ..Default::default() };
        let config = resolve(&process, &static_config, &ConfigOverrides::default());
        assert_eq!(config.max_iterations, 20);
    }

    #[test]
    fn call_opts_override_everything() {
        let process = ConfigOverrides { max_retries: Some(1), ..Default::default() };
        let static_config = ConfigOverrides { max_retries: Some(2), ..Default::default() };
        let call_opts = ConfigOverrides { max_retries: Some(9), ..Default::default() };
        let config = resolve(&process, &static_config, &call_opts);
        assert_eq!(config.max_retries, 9);
    }

    #[test]
    fn sandbox_fields_merge_independently_of_top_level_fields() {
        let static_config = ConfigOverrides { sandbox_timeout_ms: Some(2000), ..Default::default() };
        let call_opts = ConfigOverrides { model: Some("local:llama".into()), ..Default::default() };
        let config = resolve(&ConfigOverrides::default(), &static_config, &call_opts);
        assert_eq!(config.sandbox.timeout_ms, 2000);
        assert_eq!(config.model, "local:llama");
        assert_eq!(config.sandbox.max_heap_size_units, 50_000);
    }

    #[test]
    fn unset_fields_fall_through_every_layer() {
        let config = resolve(
            &ConfigOverrides { model: Some("a".into()), ..Default::default() },
            &ConfigOverrides::default(),
            &ConfigOverrides::default(),
        );
        assert_eq!(config.max_retries, 3);
    }
}
