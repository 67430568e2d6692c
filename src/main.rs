use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use thiserror::Error;

use mailbox_client::{ApiClient, ApiError, ClientConfig, ConfigError, InboxQuery};

#[derive(Parser, Debug)]
#[command(name = "mailbox", version, about = "Send and read messages")]
struct Args {
    /// Account email
    #[arg(long, env = "MAILBOX_EMAIL", global = true)]
    email: Option<String>,

    /// Account password (the new one for `forgot`)
    #[arg(long, env = "MAILBOX_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Override the service URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account (once per email)
    Register,
    /// Reset the account password
    Forgot,
    /// List received messages
    Inbox {
        /// Earliest send date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Latest send date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Include messages that were already read
        #[arg(long)]
        all: bool,
        /// Include deleted messages
        #[arg(long)]
        hidden: bool,
    },
    /// Print one message
    Read { id: String },
    /// Send a text message
    Send {
        #[arg(long = "to", required = true)]
        to: Vec<String>,
        text: String,
    },
    /// Delete a received message
    Delete { id: String },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("--email and --password (or MAILBOX_EMAIL / MAILBOX_PASSWORD) are required")]
    MissingCredentials,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = args.api_url {
        config.base_url = url;
    }
    log::debug!("Using messaging service at {}", config.base_url);

    let client = ApiClient::new(config);
    let (email, password) = match (args.email, args.password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(CliError::MissingCredentials),
    };

    match args.command {
        Command::Register => {
            client.register(&email, &password)?;
            println!("Registered {}", email);
            return Ok(());
        }
        Command::Forgot => {
            client.forgot_password(&email, &password)?;
            println!("Password reset requested for {}", email);
            return Ok(());
        }
        _ => {}
    }

    client.login(&email, &password)?;

    match args.command {
        Command::Inbox {
            start,
            end,
            all,
            hidden,
        } => {
            let query = InboxQuery {
                start,
                end,
                unread_only: !all,
                hidden,
            };
            let messages = client.list_inbox(&query)?;
            if messages.is_empty() {
                println!("No messages");
            }
            for message in messages {
                println!("{}", message);
            }
        }
        Command::Read { id } => {
            let message = client.get_message(&id)?;
            println!("From: {}", message.sender);
            println!("Sent: {}", message.sent_at);
            println!("Content-Type: {}", message.content_type);
            println!();
            match message.text() {
                Some(text) => println!("{}", text),
                None => println!("<{} bytes of binary content>", message.content.len()),
            }
        }
        Command::Send { to, text } => {
            client.send_text_message(&text, &to)?;
            println!("Sent to {}", to.join(", "));
        }
        Command::Delete { id } => {
            client.delete_message(&id)?;
            println!("Deleted {}", id);
        }
        Command::Register | Command::Forgot => {}
    }

    Ok(())
}
