use purok_incident_backend::start_web_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Initializing the app...");
    start_web_server().await
}
