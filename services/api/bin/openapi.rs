use coach_api::router::ApiDoc;
use std::path::{Path, PathBuf};
use utoipa::OpenApi;

/// Generates the OpenAPI document and writes it to `path`.
fn write_document(
    api_doc: utoipa::openapi::OpenApi,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = api_doc.to_pretty_json()?;
    std::fs::write(path, json)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));
    write_document(ApiDoc::openapi(), &path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
