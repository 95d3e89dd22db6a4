//! The `skillcheck list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use skillcheck_providers::config::{load_config_from, provider_by_name};

pub fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut names: Vec<String> = config.providers.keys().cloned().collect();
    if !names.iter().any(|n| n == "gemini") {
        names.push("gemini".into());
    }
    names.sort();

    let mut found_any = false;
    for name in &names {
        if provider_filter.as_ref().is_some_and(|f| f != name) {
            continue;
        }
        found_any = true;

        let provider = provider_by_name(&config, name)?;
        let marker = if *name == config.default_provider {
            " (default)"
        } else {
            ""
        };
        println!("Provider: {name}{marker}");
        for model in provider.available_models() {
            println!(
                "  {} — {} ({}K context)",
                model.id,
                model.name,
                model.max_context / 1000,
            );
        }
        println!();
    }

    if !found_any {
        println!("No matching provider configured. Run `skillcheck init` to create a config file.");
    }

    Ok(())
}
