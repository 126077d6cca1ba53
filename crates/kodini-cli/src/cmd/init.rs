use anyhow::Context;
use kodini_core::{config::Config, io, paths, Store};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing kodini in: {}", root.display());

    let dir = paths::kodini_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides();
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    let store_path = paths::store_path(root);
    let existed = store_path.exists();
    Store::open(&store_path).with_context(|| format!("failed to create {}", store_path.display()))?;
    if existed {
        println!("  exists:  {}", paths::STORE_FILE);
    } else {
        println!("  created: {}", paths::STORE_FILE);
    }

    let cfg = Config::load(root)?;
    if cfg.llm.endpoint.is_none() {
        println!(
            "\nSet llm.endpoint in {} (or {}) and export {} to enable AI generation.",
            paths::CONFIG_FILE,
            kodini_core::config::ENDPOINT_ENV,
            cfg.llm.api_key_env
        );
    }
    Ok(())
}
