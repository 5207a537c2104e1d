mod config;
mod terminal;

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use satb_audio::NullOutput;
use satb_domain::UploadFile;
use satb_notation::OutlineRenderer;
use satb_services::{HttpBackend, TranscriptionBackend};
use satb_session::{Studio, TracingSink};

use crate::config::ClientConfig;
use crate::terminal::TerminalView;

#[derive(Parser, Debug)]
#[command(author, version, about = "Transcribe songs into SATB parts", long_about = None)]
struct Cli {
    /// Client config (YAML). Defaults to <config dir>/satb/client.yaml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    server: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload an MP3 and browse the generated parts
    Upload {
        /// Path to the MP3 file
        file: PathBuf,
        /// Parts to open after processing (all parts when omitted)
        #[arg(short, long)]
        part: Vec<String>,
        /// Save each opened part's download into this directory
        #[arg(short, long)]
        download_dir: Option<PathBuf>,
    },
    /// Record from the server's microphone and look up matching songs
    Record {
        /// Recording length in seconds (1-30)
        seconds: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.backend.base_url = server;
    }
    info!(server = %config.backend.base_url, "using backend");

    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    let studio = Studio::new(
        &config.studio,
        backend.clone(),
        Some(Arc::new(OutlineRenderer::new())),
        Arc::new(NullOutput),
        Rc::new(TerminalView::stdout()),
        Rc::new(TracingSink),
    );

    match cli.command {
        Command::Upload {
            file,
            part,
            download_dir,
        } => upload(&studio, backend.as_ref(), &file, part, download_dir.as_deref()).await,
        Command::Record { seconds } => {
            studio.record(&seconds).await?;
            Ok(())
        }
    }
}

async fn upload(
    studio: &Studio,
    backend: &dyn TranscriptionBackend,
    path: &Path,
    parts: Vec<String>,
    download_dir: Option<&Path>,
) -> Result<()> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} is not a file name", path.display()))?;
    studio.select_file(Some(name))?;
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let artifacts = studio
        .upload(Some(UploadFile {
            name: name.to_string(),
            bytes,
        }))
        .await?;

    let parts = if parts.is_empty() {
        artifacts.parts().into_iter().map(str::to_owned).collect()
    } else {
        parts
    };
    if parts.is_empty() {
        bail!("the server returned no parts");
    }

    if let Some(dir) = download_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    for part in parts {
        if studio.state().current_part != part {
            studio.switch_tab(&part).await;
        }
        let Some(dir) = download_dir else { continue };
        let Ok(download) = studio.download_current_part() else {
            continue;
        };
        let bytes = backend.fetch_bytes(&download.url).await?;
        let target = dir.join(&download.file_name);
        fs::write(&target, &bytes).with_context(|| format!("writing {}", target.display()))?;
        info!(part = %download.part, path = %target.display(), bytes = bytes.len(), "saved download");
    }
    Ok(())
}
