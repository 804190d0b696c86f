use clap::Parser;

/// Serve an event-sourced account ledger over HTTP
#[derive(Parser, Debug)]
#[command(name = "ledger-engine")]
#[command(about = "Event-sourced account ledger server", long_about = None)]
pub struct CliArgs {
    /// Interface to bind the HTTP listener to
    #[arg(
        long = "host",
        value_name = "HOST",
        default_value = "127.0.0.1",
        help = "Interface to bind the HTTP listener to"
    )]
    pub host: String,

    /// TCP port to listen on
    #[arg(
        long = "port",
        value_name = "PORT",
        default_value_t = 3000,
        help = "TCP port to listen on"
    )]
    pub port: u16,

    /// Per-entity command mailbox depth
    #[arg(
        long = "mailbox-capacity",
        value_name = "DEPTH",
        help = "Per-entity command mailbox depth (default: 64)"
    )]
    pub mailbox_capacity: Option<usize>,
}

impl CliArgs {
    /// The socket address string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
