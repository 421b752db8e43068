use clap::{Args, Parser, Subcommand};
use menudb::config::Config;
use menudb::db::{self, Identifier, postgres};
use menudb::mutator::{self, AddColumn, BootstrapAdmin, SetImageUrl};
use menudb::{MenuDbError, Outcome};
use mimalloc::MiMalloc;
use sqlx::PgConnection;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "menudb", version)]
#[command(about = "Schema inspection, idempotent migrations and a small API for the restaurant database")]
struct Cli {
    /// Path to an optional TOML config file
    #[arg(long, global = true, env = "MENUDB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct MutateArgs {
    /// Run check, change and verification in one SERIALIZABLE transaction
    #[arg(long)]
    transactional: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve,

    /// List tables, or the columns of one table
    Inspect {
        #[arg(long)]
        table: Option<String>,
    },

    /// List users with the admin role
    Admins,

    /// Add a nullable column if it does not exist yet
    AddColumn {
        #[arg(long)]
        table: String,
        #[arg(long)]
        column: String,
        /// Column type, e.g. TIMESTAMP or VARCHAR(255)
        #[arg(long = "type")]
        sql_type: String,
        #[command(flatten)]
        mutate: MutateArgs,
    },

    /// Add orders.pickup_time (TIMESTAMP, nullable) if missing
    AddPickupTime {
        #[command(flatten)]
        mutate: MutateArgs,
    },

    /// Create the admin user from ADMIN_* settings unless an admin exists
    BootstrapAdmin {
        #[command(flatten)]
        mutate: MutateArgs,
    },

    /// Set image_url on matching menu items that have none
    SetImage {
        /// Item name, matched case-insensitively. A name containing `%` is an ILIKE
        /// pattern; otherwise it is matched literally, `_` included
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[command(flatten)]
        mutate: MutateArgs,
    },

    /// Apply a JSON file of name -> image URL patches
    SetImages {
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        mutate: MutateArgs,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = match Config::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("menudb: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    match dispatch(cli.command, &cfg).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Command, cfg: &Config) -> Result<ExitCode, MenuDbError> {
    let outcome = match command {
        Command::Serve => {
            serve(cfg).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Inspect { table } => {
            let table = table.as_deref().map(Identifier::new).transpose()?;
            let mut conn = db::connect(&cfg.database).await?;
            let result = inspect(&mut conn, table).await;
            db::close(conn).await;
            result?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Admins => {
            let mut conn = db::connect(&cfg.database).await?;
            let result = print_admins(&mut conn).await;
            db::close(conn).await;
            result?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::AddColumn {
            table,
            column,
            sql_type,
            mutate,
        } => {
            let m = AddColumn::new(&table, &column, &sql_type)?;
            mutator::run(&cfg.database, &m, mutate.transactional).await
        }
        Command::AddPickupTime { mutate } => {
            mutator::run(&cfg.database, &AddColumn::pickup_time(), mutate.transactional).await
        }
        Command::BootstrapAdmin { mutate } => {
            let m = BootstrapAdmin::from_config(&cfg.admin)?;
            mutator::run(&cfg.database, &m, mutate.transactional).await
        }
        Command::SetImage { name, url, mutate } => {
            let m = SetImageUrl::new(name, &url)?;
            mutator::run(&cfg.database, &m, mutate.transactional).await
        }
        Command::SetImages { file, mutate } => {
            let patches = mutator::load_image_patches(&file)?;
            mutator::run_batch(&cfg.database, &patches, mutate.transactional).await
        }
    };

    report(&outcome);
    Ok(outcome.exit_code())
}

/// Failures were already logged where they happened.
fn report(outcome: &Outcome) {
    match outcome {
        Outcome::AlreadySatisfied => info!("already satisfied; no changes made"),
        Outcome::Applied(rows) => info!(rows, "change applied"),
        Outcome::Failed(_) => {}
    }
}

async fn inspect(conn: &mut PgConnection, table: Option<Identifier>) -> Result<(), MenuDbError> {
    let Some(table) = table else {
        let tables = postgres::list_tables(&mut *conn).await?;
        println!("{} table(s):", tables.len());
        for name in tables {
            println!("  {name}");
        }
        return Ok(());
    };

    let columns = postgres::list_columns(&mut *conn, &table).await?;
    if columns.is_empty() {
        println!("table {table} not found");
        return Ok(());
    }
    println!("{table}:");
    for col in columns {
        println!(
            "  {:<24} {:<28} {:<8} {}",
            col.column_name,
            col.data_type,
            if col.is_nullable { "NULL" } else { "NOT NULL" },
            col.column_default.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

async fn print_admins(conn: &mut PgConnection) -> Result<(), MenuDbError> {
    let admins = postgres::list_admins(&mut *conn).await?;
    if admins.is_empty() {
        println!("no admin users");
        return Ok(());
    }
    for admin in admins {
        println!(
            "  #{} {} <{}>",
            admin.id,
            admin.name.as_deref().unwrap_or("-"),
            admin.email.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn serve(cfg: &Config) -> Result<(), MenuDbError> {
    let pool = db::lazy_pool(&cfg.database)?;
    info!(db = %db::target_label(&cfg.database), "database pool configured");

    let state = menudb::router::MenuState::new(pool.clone());
    let app = menudb::router::menu_router(state);

    let addr = cfg.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!(error = %e, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
