#[tokio::main]
async fn main() {
    if let Err(e) = duel_relay::start_server().await {
        tracing::error!("Relay stopped: {}", e);
        eprintln!("Relay stopped: {e}");
        std::process::exit(1);
    }
}
