pub mod server;

/// Actions the CLI can dispatch
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        frontend_url: String,
        session_ttl: i64,
    },
}
