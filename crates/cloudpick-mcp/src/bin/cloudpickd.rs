use std::io;

use cloudpick_mcp::AdvisorServer;

fn main() -> io::Result<()> {
    let mode = std::env::var("CLOUDPICK_TRANSPORT").unwrap_or_else(|_| "stdio".to_string());
    let server = AdvisorServer::from_env()?;
    match mode.as_str() {
        "stdio" => server.serve_stdio(),
        "interactive" => server.run_interactive(),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CLOUDPICK_TRANSPORT must be stdio or interactive",
        )),
    }
}
