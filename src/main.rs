use evesso::{Credentials, Login, SsoConfig};
use tracing_subscriber::EnvFilter;

fn print_login(login: &Login) {
    let token = &login.token;
    println!("access token: {}", token.access_token());
    println!("refresh token: {}", token.refresh_token().unwrap_or_default());
    println!("token type: {:?}", token.token_type());
    if let Some(expires_in) = token.expires_in() {
        println!("expires in: {}s", expires_in.as_secs());
    }

    let character = &login.character;
    println!("character id: {}", character.character_id);
    println!("character name: {}", character.character_name);
    println!("expires on: {}", character.expires_on);
    println!("scopes: {}", character.scopes);
    println!("token type: {}", character.token_type);
    println!("character owner hash: {}", character.character_owner_hash);
}

/// Resolves with the name of the first termination signal received.
async fn shutdown_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.map(|_| "sigint"),
            _ = terminate.recv() => Ok("sigterm"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|_| "sigint")
    }
}

/// Blocks the calling thread until SIGINT or SIGTERM arrives.
fn wait_for_shutdown() -> std::io::Result<&'static str> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(shutdown_signal())
}

fn main() -> Result<(), evesso::Error> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let credentials = Credentials::from_env()?;
    let config = SsoConfig::eve(credentials);

    let session = evesso::authenticate(config, print_login)?;

    println!("In a browser open the following url:");
    println!("{}", session.authorize_url);

    let signal = wait_for_shutdown()?;
    tracing::info!(signal, "shutting down");

    Ok(())
}
