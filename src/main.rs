use anyhow::Context;

use certtrack::config::Config;
use certtrack::inference::InferenceClient;
use certtrack::router::session::SessionLog;
use certtrack::router::tools::build_registry;
use certtrack::router::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to resolve configuration")?;

    certtrack::init_tracing(&config.log_dir);

    let (log, log_path) =
        SessionLog::to_file(&config.log_dir).context("failed to open session log")?;
    tracing::info!(log = %log_path.display(), "session log opened");

    let backend =
        InferenceClient::from_config(&config).context("failed to build inference client")?;
    let registry = build_registry(&config).context("failed to build tool registry")?;

    let mut session = Session::new(backend, registry, log);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    session
        .run(stdin.lock(), stdout.lock())
        .await
        .context("session loop failed")?;

    Ok(())
}
