use tokio::net::TcpListener;

use rsvpserver::config::Config;
use rsvpserver::db::Store;
use rsvpserver::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rsvpserver=debug,tower_http=debug".into()),
        )
        .init();

    if let Err(e) = rsvpserver::ids::ensure_entropy() {
        tracing::error!("no usable entropy source: {e}");
        std::process::exit(1);
    }

    let config = Config::from_env();
    let store = Store::open(&config.database_url).await;
    print_banner(&config, &store);

    let state = AppState::from_config(&config, store);
    let app = rsvpserver::routes::router(state);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("failed to bind");

    let actual_port = listener
        .local_addr()
        .expect("failed to get local address")
        .port();
    eprintln!("  \x1b[32m→ listening on 0.0.0.0:{actual_port}\x1b[0m");
    eprintln!();

    axum::serve(listener, app).await.expect("server error");
}

fn print_banner(config: &Config, store: &Store) {
    let version = env!("CARGO_PKG_VERSION");
    let persistence = if store.is_persistent() {
        config.database_url.as_str()
    } else {
        "memory only"
    };
    let hosting = config
        .hosting
        .as_ref()
        .map(|h| h.url.as_str())
        .unwrap_or("disabled");

    eprintln!();
    eprintln!("  \x1b[1;36mrsvp\x1b[0m \x1b[2mv{version}\x1b[0m");
    eprintln!();
    eprintln!("  \x1b[2mport\x1b[0m         {}", config.port);
    eprintln!("  \x1b[2mstorage\x1b[0m      {persistence}");
    eprintln!("  \x1b[2mlinks\x1b[0m        {}", config.public_url);
    eprintln!("  \x1b[2mhosting\x1b[0m      {hosting}");
    eprintln!("  \x1b[2mmax batch\x1b[0m    {}", config.max_batch);

    eprintln!();
}
