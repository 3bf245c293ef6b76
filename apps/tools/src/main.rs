use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use recipe_core::DocumentRenderer;
use recipe_pdf::{qr::qr_png, PdfRecipeRenderer};
use server_api::ApiContext;
use shared::{
    domain::RecipeSnapshot,
    error::{ApiError, ErrorCode},
    protocol::object_url,
};
use storage::Storage;

#[derive(Parser, Debug)]
#[command(about = "Administration helpers for the recipe object store")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/recipes.db")]
    database_url: String,
    /// Base URL the object store is served from; used to print retrieval links.
    #[arg(long, env = "SERVER_PUBLIC_URL", default_value = "http://127.0.0.1:8443")]
    public_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists stored objects, newest first.
    ListObjects {
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    DeleteObject {
        name: String,
    },
    /// Renders a recipe snapshot JSON file to a PDF without touching the store.
    RenderSnapshot {
        input: String,
        output: String,
    },
    /// Writes the QR code for a link as a PNG.
    QrPng {
        url: String,
        output: String,
        #[arg(long, default_value_t = 320)]
        size: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::ListObjects { limit } => {
            let ctx = open_context(&cli.database_url, &cli.public_url).await?;
            let objects = server_api::list_objects(&ctx, Some(limit))
                .await
                .map_err(api_failure)?;
            if objects.is_empty() {
                println!("no objects stored");
            }
            for object in objects {
                println!(
                    "{}\t{}\t{} bytes\t{}\t{}",
                    object.created_at.to_rfc3339(),
                    object.object_name,
                    object.size_bytes,
                    object.content_type,
                    object_url(&ctx.public_url, &object.object_name)
                );
            }
        }
        Command::DeleteObject { name } => {
            let ctx = open_context(&cli.database_url, &cli.public_url).await?;
            if delete_object(&ctx, &name).await? {
                println!("deleted {name}");
            } else {
                println!("no object named {name}");
            }
        }
        Command::RenderSnapshot { input, output } => {
            let size = render_snapshot(Path::new(&input), Path::new(&output))?;
            println!("wrote {output} ({size} bytes)");
        }
        Command::QrPng { url, output, size } => {
            let png = qr_png(&url, size)?;
            fs::write(&output, png).with_context(|| format!("failed to write {output}"))?;
            println!("wrote {output}");
        }
    }

    Ok(())
}

async fn open_context(database_url: &str, public_url: &str) -> Result<ApiContext> {
    let storage = Storage::new(database_url).await?;
    Ok(ApiContext::new(storage, public_url))
}

/// Deletes through the same validation the server applies. A missing object is
/// reported as `false` rather than an error.
async fn delete_object(ctx: &ApiContext, name: &str) -> Result<bool> {
    match server_api::delete_object(ctx, name).await {
        Ok(()) => Ok(true),
        Err(err) if err.code == ErrorCode::NotFound => Ok(false),
        Err(err) => Err(api_failure(err)),
    }
}

fn api_failure(err: ApiError) -> anyhow::Error {
    anyhow!("{:?}: {}", err.code, err.message)
}

fn render_snapshot(input: &Path, output: &Path) -> Result<usize> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let snapshot: RecipeSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a recipe snapshot", input.display()))?;
    let bytes = PdfRecipeRenderer::new()
        .render(&snapshot)
        .context("failed to render snapshot")?;
    fs::write(output, &bytes).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(bytes.len())
}
