use clap::Parser;

use rsvpserver::db::{self, Store};
use rsvpserver::error::AppError;
use rsvpserver::report;

/// Print the dashboard report of one event as JSON.
#[derive(Parser)]
#[command(name = "rsvp-report", version)]
struct Args {
    /// SQLite database holding the event.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:rsvp.db?mode=rwc")]
    database_url: String,

    #[arg(long)]
    event_id: String,

    /// Pretty-print the JSON.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rsvpserver=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<(), AppError> {
    let store = Store::open(&args.database_url).await;
    if !store.is_persistent() {
        return Err(AppError::DependencyUnavailable(format!(
            "cannot open {}",
            args.database_url
        )));
    }

    let event = db::events::get_event(&store, &args.event_id).await?;
    let snapshot = store.snapshot(&args.event_id).await?;
    let report = report::build_report(
        &event,
        &snapshot.invites,
        &snapshot.responses,
        chrono::Utc::now(),
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| AppError::Internal(e.to_string()))?;
    println!("{json}");
    Ok(())
}
