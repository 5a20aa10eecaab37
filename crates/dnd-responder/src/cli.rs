//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// DND Responder - auto-replies to whitelisted contacts while Do Not Disturb is on
#[derive(Parser, Debug)]
#[command(name = "dnd-responder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Whitelist file (default: <state dir>/state/whitelist.json)
    #[arg(long, env = "RESPONDER_WHITELIST", global = true)]
    pub whitelist: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the webhook server and the watcher (default)
    Serve(ServeArgs),

    /// Manage the whitelist file
    Whitelist {
        #[command(subcommand)]
        command: WhitelistCommands,
    },
}

/// Whitelist subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum WhitelistCommands {
    /// Create an empty whitelist file
    Init,

    /// Show whitelisted contacts
    List,

    /// Add a contact (or rename an existing one)
    Add {
        /// Phone number in any common format
        phone_number: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Remove a contact
    Remove {
        /// Phone number in any common format
        phone_number: String,
    },
}

/// Options for the server and watcher.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    /// Host to bind the webhook server to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the webhook server to
    #[arg(long, env = "PORT", default_value_t = 5001)]
    pub port: u16,

    /// Seconds between history polls
    #[arg(long, env = "RESPONDER_POLL_INTERVAL", default_value_t = 30)]
    pub poll_interval: u64,

    /// Ignore calls and texts older than this many seconds
    #[arg(long, env = "RESPONDER_MAX_EVENT_AGE", default_value_t = 300)]
    pub max_event_age: u64,

    /// Timeout in seconds for calendar, generation and send calls
    #[arg(long, env = "RESPONDER_REQUEST_TIMEOUT", default_value_t = 10)]
    pub request_timeout: u64,

    /// Call history database
    #[arg(
        long,
        env = "RESPONDER_CALL_DB",
        default_value = "~/Library/Application Support/CallHistoryDB/CallHistory.storedata"
    )]
    pub call_db: String,

    /// Messages database
    #[arg(long, env = "RESPONDER_MESSAGE_DB", default_value = "~/Library/Messages/chat.db")]
    pub message_db: String,

    /// Anthropic API key; replies use templates only when unset
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    /// Claude model
    #[arg(long, env = "ANTHROPIC_MODEL")]
    pub anthropic_model: Option<String>,

    /// Anthropic API base URL
    #[arg(long, env = "ANTHROPIC_BASE_URL")]
    pub anthropic_base_url: Option<String>,

    /// Google OAuth token file (default: <state dir>/config/google_token.json)
    #[arg(long, env = "GOOGLE_TOKEN_FILE")]
    pub google_token_file: Option<PathBuf>,

    /// Google calendar to read
    #[arg(long, env = "GOOGLE_CALENDAR_ID", default_value = "primary")]
    pub calendar_id: String,

    /// Google Calendar API base URL
    #[arg(long, env = "GOOGLE_CALENDAR_BASE_URL")]
    pub google_base_url: Option<String>,

    /// Name used in replies
    #[arg(long, env = "RESPONDER_OWNER_NAME", default_value = "Tomas")]
    pub owner_name: String,

    /// Signature every reply ends with
    #[arg(long, env = "RESPONDER_SIGNATURE", default_value = "TomasBot")]
    pub signature: String,

    /// UTC offset for times in replies, e.g. -05:00 (default: system offset)
    #[arg(long, env = "RESPONDER_UTC_OFFSET", allow_hyphen_values = true)]
    pub utc_offset: Option<String>,

    /// Zone abbreviation shown after times, e.g. EST
    #[arg(long, env = "RESPONDER_ZONE_ABBREVIATION")]
    pub zone_abbreviation: Option<String>,
}

/// Bare invocation: serve options from the environment and defaults only.
#[derive(Parser, Debug)]
#[command(name = "dnd-responder")]
struct DefaultServe {
    #[command(flatten)]
    args: ServeArgs,
}

impl ServeArgs {
    /// Options for `dnd-responder` run without a subcommand.
    pub fn from_env() -> Self {
        DefaultServe::parse_from(["dnd-responder"]).args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::try_parse_from(["dnd-responder", "-v"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["dnd-responder", "serve"]).unwrap();
        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.poll_interval, 30);
        assert_eq!(args.max_event_age, 300);
        assert_eq!(args.calendar_id, "primary");
        assert!(args.message_db.ends_with("Messages/chat.db"));
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "dnd-responder",
            "-vv",
            "serve",
            "--port",
            "8080",
            "--utc-offset",
            "-05:00",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 8080);
        assert_eq!(args.utc_offset.as_deref(), Some("-05:00"));
    }

    #[test]
    fn test_bare_invocation_matches_plain_serve() {
        let cli = Cli::try_parse_from(["dnd-responder", "serve"]).unwrap();
        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(ServeArgs::from_env(), args);
    }

    #[test]
    fn test_whitelist_add() {
        let cli = Cli::try_parse_from([
            "dnd-responder",
            "whitelist",
            "add",
            "+1 (555) 123-4567",
            "--name",
            "Mom",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Commands::Whitelist {
                command: WhitelistCommands::Add {
                    phone_number: "+1 (555) 123-4567".to_string(),
                    name: Some("Mom".to_string()),
                }
            })
        );
    }

    #[test]
    fn test_whitelist_path_flag_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dnd-responder",
            "whitelist",
            "list",
            "--whitelist",
            "/tmp/wl.json",
        ])
        .unwrap();
        assert_eq!(cli.whitelist, Some(PathBuf::from("/tmp/wl.json")));
    }
}
