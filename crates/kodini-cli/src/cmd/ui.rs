use kodini_core::config::Config;
use kodini_server::AppState;
use std::path::Path;

/// Serve the HTTP API for the project at `root` until interrupted.
pub fn run(root: &Path, port: u16, no_open: bool) -> anyhow::Result<()> {
    Config::load(root)?;
    let state = AppState::from_root(root)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let actual_port = listener.local_addr()?.port();
        println!("kodini API: http://localhost:{actual_port}/api");
        kodini_server::serve_on(state, listener, !no_open).await
    })
}
