use std::process::ExitCode;

use clap::Parser;
use upmirror::{
    loc::Instance,
    path::{FsPath, FsPathBuf},
    Config, IdBuf,
};
use upmirror_sync::{
    oauth2,
    storage::{fs::FileSystem, gdrive::GoogleDrive},
    PersistCache, Policy, Replicator, Summary,
};

mod console;

#[derive(Parser)]
#[command(name = "upmirror")]
#[command(author, version, about, long_about=None)]
struct Cli {
    /// Name of the mirror instance
    instance: String,

    /// Config file. Defaults to the instance config.json
    #[arg(long)]
    config: Option<FsPathBuf>,

    /// Local directory to mirror, overrides the config
    #[arg(long)]
    local_dir: Option<FsPathBuf>,

    /// Id of the remote root folder, overrides the config
    #[arg(long)]
    root: Option<String>,

    /// Google client secret file, overrides the config
    #[arg(long)]
    secret: Option<FsPathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Could not start the async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("upmirror failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Summary> {
    let instance = Instance::new(&cli.instance)?;
    let config = load_config(&cli, &instance).await?;
    log::trace!("Loaded config: {config:?}");

    let secret_file = match &config.secret_file {
        Some(path) => path.clone(),
        None => instance.secret_file(),
    };
    let secret = upmirror::oauth::load_google_secret(&secret_file).await?;
    log::info!(
        "Initializing Google Drive storage with client-id {}",
        secret.client_id.as_str()
    );

    // resumable uploads answer 308 without location
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let auth = oauth2::Client::new(secret, instance.token_cache_file(), client.clone()).await?;
    let remote = GoogleDrive::new(auth, client).await?;
    if let Err(err) = remote.persist_cache().await {
        log::warn!("Could not persist token cache: {err:#}");
    }

    let replicator = Replicator::new(FileSystem::new(), remote, Policy::from(&config))
        .with_observer(console::Console);
    let res = replicator.run(&config.local_dir, &config.remote_root).await;

    replicator.remote().persist_cache().await?;
    Ok(res?)
}

async fn load_config(cli: &Cli, instance: &Instance) -> anyhow::Result<Config> {
    let config_file = match &cli.config {
        Some(file) => Some(file.clone()),
        None => {
            let file = instance.config_file();
            file.exists().then_some(file)
        }
    };

    let mut config = match config_file {
        Some(file) => {
            log::info!("Found config file: {file}");
            Config::load_from_file(&file).await?
        }
        None => {
            let (Some(local_dir), Some(root)) = (&cli.local_dir, &cli.root) else {
                anyhow::bail!(
                    "No config file for instance {}: --local-dir and --root are required",
                    cli.instance
                );
            };
            Config::new(local_dir.clone(), IdBuf::from(root.as_str()))
        }
    };

    if let Some(local_dir) = &cli.local_dir {
        config.local_dir = local_dir.clone();
    }
    if let Some(root) = &cli.root {
        config.remote_root = IdBuf::from(root.as_str());
    }
    if let Some(secret) = &cli.secret {
        config.secret_file = Some(secret.clone());
    }
    config.validate()?;
    check_local_dir(&config.local_dir)?;
    Ok(config)
}

fn check_local_dir(dir: &FsPath) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("{dir} is not a directory");
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!(
        "{} folder(s) created, {} reused, {} file(s) uploaded ({} converted), {} skipped",
        summary.folders_created,
        summary.folders_reused,
        summary.files_uploaded,
        summary.files_converted,
        summary.files_skipped,
    );
    for path in summary.stopped_at.iter() {
        println!("stopped at excluded {path}");
    }
}
