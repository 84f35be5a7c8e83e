//! Export the transfer API's OpenAPI document
//!
//! Usage:
//!   export_openapi > openapi.json
//!   export_openapi --output docs/openapi.json

use anyhow::Context;
use internal_transfer::gateway::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let spec = ApiDoc::openapi();
    let json = spec
        .to_pretty_json()
        .context("Failed to serialize OpenAPI spec")?;

    let args: Vec<String> = std::env::args().collect();
    match args.iter().position(|a| a == "--output") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .context("--output requires a file path")?;
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path))?;
            eprintln!(
                "✅ OpenAPI spec ({} paths) exported to: {}",
                spec.paths.paths.len(),
                path
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
