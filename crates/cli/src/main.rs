use clap::{Parser, Subcommand};
use dropshare_core::config::{
    artifact_ttl_from_env_value, max_upload_bytes_from_env_value, sweep_interval_from_env_value,
    upload_dir_from_env_value,
};
use dropshare_core::{CoreConfig, ShareService, StoreKind};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dropshare")]
#[command(about = "Dropshare one-time file store CLI")]
struct Cli {
    /// Upload directory (defaults to UPLOAD_DIR, then "uploads")
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List pending files
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Store a local file and print its one-time name
    Put {
        /// File to store
        path: PathBuf,
        /// Name to store it under (defaults to the file name of `path`)
        #[arg(long)]
        name: Option<String>,
    },
    /// Take a stored file, deleting it from the store
    Take {
        /// Stored name returned by `put` or an upload
        name: String,
        /// Where to write the contents (defaults to the stored name in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete expired files (requires DROPSHARE_ARTIFACT_TTL_SECS)
    Sweep,
}

fn load_config(dir: Option<PathBuf>) -> Result<CoreConfig, Box<dyn std::error::Error>> {
    let upload_dir = dir.unwrap_or_else(|| upload_dir_from_env_value(std::env::var("UPLOAD_DIR").ok()));
    let max_upload_bytes =
        max_upload_bytes_from_env_value(std::env::var("DROPSHARE_MAX_UPLOAD_BYTES").ok())?;
    let ttl = artifact_ttl_from_env_value(std::env::var("DROPSHARE_ARTIFACT_TTL_SECS").ok())?;
    let sweep_interval =
        sweep_interval_from_env_value(std::env::var("DROPSHARE_SWEEP_INTERVAL_SECS").ok())?;

    Ok(CoreConfig::new(
        upload_dir,
        StoreKind::Disk,
        max_upload_bytes,
        ttl,
        sweep_interval,
    )?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'dropshare --help' for commands");
        return Ok(());
    };

    let service = ShareService::open(Arc::new(load_config(cli.dir)?))?;

    match command {
        Commands::List { json } => {
            let artifacts = service.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&artifacts)?);
            } else if artifacts.is_empty() {
                println!("No pending files.");
            } else {
                for artifact in artifacts {
                    let expires = service
                        .expires_at(&artifact)
                        .map(|at| at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
                        .unwrap_or_else(|| "never".into());
                    println!(
                        "{}  {} bytes  created {}  expires {}",
                        artifact.stored_name,
                        artifact.size_bytes,
                        artifact
                            .created_at
                            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                        expires
                    );
                }
            }
        }
        Commands::Put { path, name } => {
            let bytes = std::fs::read(&path)?;
            let name = name.or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            });
            match service.store(name.as_deref(), &bytes) {
                Ok(artifact) => println!("{}", artifact.stored_name),
                Err(e) => eprintln!("Error storing {}: {}", path.display(), e),
            }
        }
        Commands::Take { name, out } => match service.retrieve(Some(&name)) {
            Ok(download) => {
                let out = out.unwrap_or_else(|| PathBuf::from(download.stored_name.as_str()));
                std::fs::write(&out, &download.bytes)?;
                println!(
                    "Wrote {} bytes to {}",
                    download.bytes.len(),
                    out.display()
                );
            }
            Err(e) => eprintln!("Error taking {}: {}", name, e),
        },
        Commands::Sweep => {
            if service.config().artifact_ttl().is_none() {
                println!("Expiry is disabled; set DROPSHARE_ARTIFACT_TTL_SECS to enable it.");
            } else {
                let removed = service.sweep_expired()?;
                println!("Removed {} expired file(s)", removed);
            }
        }
    }

    Ok(())
}
