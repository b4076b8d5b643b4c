//! InkVault command line: inspect, pull, and push the remote scene.

use clap::{Parser, Subcommand};
use inkvault_core::scene::{SceneSnapshot, live_attachments};
use inkvault_core::storage::{RemoteStore, StoreError, decode_scene, encode_scene};
use inkvault_github::{GitHubStore, REPO_ENV, TOKEN_ENV};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "inkvault",
    about = "GitHub-backed persistence for drawing scenes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report configuration and whether a remote scene exists.
    Status,
    /// Fetch the remote scene and write it out as JSON.
    Pull {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Encode a scene JSON file and store it remotely.
    Push {
        /// Scene JSON file to upload.
        file: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let Some(store) = GitHubStore::from_env() else {
        log::error!("no repository configured; set {REPO_ENV} (and {TOKEN_ENV})");
        return ExitCode::FAILURE;
    };

    match run(&cli.command, &store).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: &Command, store: &GitHubStore) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Status => {
            println!("repository: {}", store.config().repo);
            if !store.is_configured() {
                println!("persistence disabled: no token in {TOKEN_ENV}");
                return Ok(());
            }
            match store.fetch().await? {
                Some(payload) => {
                    let scene = decode_scene(&payload)?;
                    println!(
                        "remote scene: {} elements, {} attachments",
                        scene.elements.len(),
                        scene.attachments.len()
                    );
                }
                None => println!("no remote scene yet"),
            }
            Ok(())
        }
        Command::Pull { out } => {
            let payload = store.fetch().await?.ok_or(StoreError::NotFound)?;
            let scene = decode_scene(&payload)?;
            let json = serde_json::to_string_pretty(&scene)?;
            match out {
                Some(path) => fs::write(path, json)?,
                None => println!("{json}"),
            }
            Ok(())
        }
        Command::Push { file } => {
            let scene: SceneSnapshot = serde_json::from_str(&fs::read_to_string(file)?)?;
            let attachments = live_attachments(&scene.elements, &scene.attachments);
            let payload = encode_scene(&SceneSnapshot {
                attachments,
                ..scene
            })?;
            store.store(&payload).await?;
            println!("scene stored");
            Ok(())
        }
    }
}
