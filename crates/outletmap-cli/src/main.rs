mod explore;
mod render;

use std::io::Write;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use outletmap_client::OutletClient;
use outletmap_core::OutletId;
use outletmap_ui::{format_response, ChatFailure, MapView};

#[derive(Debug, Parser)]
#[command(name = "outletmap")]
#[command(about = "Outlet map and AI chat client")]
struct Cli {
    /// Backend origin; overrides OUTLETMAP_API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List outlets and whether each gets a map marker
    Outlets {
        /// Print the marker view model as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the catchment points of one outlet
    Catchment {
        id: String,

        /// Print the circle and line overlays as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the AI a question and stream the answer
    Chat {
        /// Print the formatted markup once the answer is complete
        #[arg(long)]
        markup: bool,

        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Interactive session: select outlets and chat
    Explore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = outletmap_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(!config.env.is_production())
        .init();

    if let Some(base_url) = cli.base_url {
        config.api_base_url = outletmap_core::parse_base_url("--base-url", &base_url)?;
    }
    tracing::debug!(?config, "configuration loaded");

    let client = OutletClient::from_config(&config)?;

    match cli.command {
        Commands::Outlets { json } => run_outlets(&client, json).await,
        Commands::Catchment { id, json } => {
            run_catchment(&client, &OutletId::new(id), json).await
        }
        Commands::Chat { markup, message } => run_chat(&client, &message.join(" "), markup).await,
        Commands::Explore => explore::run(client).await,
    }
}

async fn run_outlets(client: &OutletClient, json: bool) -> anyhow::Result<()> {
    let outlets = client.fetch_outlets().await?;
    let mut view = MapView::new();
    view.set_outlets(outlets);

    if json {
        println!("{}", serde_json::to_string_pretty(&view.markers())?);
        return Ok(());
    }

    for outlet in view.outlets() {
        println!("{}", render::outlet_line(outlet));
    }
    println!(
        "{} outlets, {} with markers",
        view.outlets().len(),
        view.markers().len()
    );
    Ok(())
}

async fn run_catchment(client: &OutletClient, id: &OutletId, json: bool) -> anyhow::Result<()> {
    let mut view = MapView::new();
    view.set_outlets(client.fetch_outlets().await?);

    let Some(request) = view.select_outlet(id) else {
        anyhow::bail!("outlet '{id}' not found or has no coordinates");
    };
    let points = client.fetch_catchments(&request.outlet_id).await?;
    view.apply_catchments(&request, points);

    if json {
        let overlays = serde_json::json!({
            "circles": view.circles(),
            "lines": view.lines(),
        });
        println!("{}", serde_json::to_string_pretty(&overlays)?);
        return Ok(());
    }

    for point in view.catchments() {
        println!("{:.6},{:.6}", point.latitude, point.longitude);
    }
    println!("{} catchment points", view.catchments().len());
    Ok(())
}

async fn run_chat(client: &OutletClient, message: &str, markup: bool) -> anyhow::Result<()> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        anyhow::bail!("nothing to ask");
    }

    let mut stream = match client.open_chat(trimmed).await {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("{}", ChatFailure::from(&e).message());
            return Err(e.into());
        }
    };

    let mut full = String::new();
    let mut stdout = std::io::stdout();
    loop {
        match stream.next_text().await {
            Ok(Some(text)) => {
                if !markup {
                    stdout.write_all(text.as_bytes())?;
                    stdout.flush()?;
                }
                full.push_str(&text);
            }
            Ok(None) => break,
            Err(e) => {
                eprintln!("\n{}", ChatFailure::Stream.message());
                return Err(e.into());
            }
        }
    }

    if markup {
        println!("{}", format_response(&full));
    } else {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests;
