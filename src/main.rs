use anyhow::Context;
use clap::Parser;

use classjudge::access::AccessPolicy;
use classjudge::config::{CliArgs, Config};
use classjudge::database::{self as db, FixtureStore};
use classjudge::pipeline::Pipeline;
use classjudge::sandbox::create_sandbox_runner;
use classjudge::web_server::build_server;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = CliArgs::parse();
    let Config {
        server: server_config,
        bot: bot_config,
        guild: guild_config,
        sandbox: sandbox_config,
    } = cli.to_config()?;

    let db_path = db::get_db_path();
    if cli.flush_data {
        db::remove_db(&db_path);
    }

    let db_pool = db::init_db(&db_path)
        .await
        .context("Failed to initialize database")?;
    let store = FixtureStore::new(db_pool);

    let runner = create_sandbox_runner(&sandbox_config).context("Failed to build sandbox client")?;
    let pipeline = Pipeline::new(
        store,
        runner,
        AccessPolicy::from(guild_config),
        sandbox_config.eval_line_cap,
    );

    // ======= PREPARATION END, EXECUTION START =======

    let server = build_server(server_config, bot_config, pipeline).context("Failed to build server")?;
    let server_handle = server.handle();
    let server_task = actix_web::rt::spawn(server);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("Ctrl-c received, shutting down...");
        }
        res_server = server_task => {
            log::error!("Server terminated unexpectedly: {:?}", res_server);
        }
    }

    server_handle.stop(true).await;

    log::info!("Shutdown complete");
    Ok(())
}
