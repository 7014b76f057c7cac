use std::net::IpAddr;

use agentsite_testing::email_provider;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::EmailProvider {
            host,
            port,
            api_key,
            fail_with,
        } => email_provider::start_server(host, port, api_key, fail_with).await?,
        Command::Completion { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                env!("CARGO_BIN_NAME"),
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the email delivery provider testing server
    EmailProvider {
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,
        #[arg(long, default_value = "8001")]
        port: u16,
        #[arg(long, default_value = "re_test_key")]
        api_key: String,
        /// Reject every email with this status code
        #[arg(long)]
        fail_with: Option<u16>,
    },
    /// Generate shell completions
    Completion {
        /// The shell to generate completions for
        #[clap(value_enum)]
        shell: Shell,
    },
}
