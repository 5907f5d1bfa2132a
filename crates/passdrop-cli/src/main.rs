//! Passdrop - password-addressed ephemeral file drop

use clap::{ArgAction, Parser, Subcommand, builder::BoolishValueParser};
use passdrop_cli::{ServerConfig, admin, run_server};
use passdrop_core::DropConfig;
use passdrop_crypto::passphrase::{MAX_WORDS, clamp_word_count};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "passdrop")]
#[command(about = "Password-addressed ephemeral file drop")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "PASSDROP_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PASSDROP_PORT")]
    port: u16,

    /// Path prefix to mount the routes under
    #[arg(long, default_value = "", env = "BASE_PATH")]
    base_path: String,

    /// Server salt for upload addresses and encryption keys
    #[arg(long, default_value = "", env = "HASH_SALT", hide_env_values = true)]
    hash_salt: String,

    /// Lifetime of an upload in seconds, 0 to keep forever
    #[arg(long, default_value = "86400", env = "EXPIRATION_TIME")]
    expiration_time: u64,

    /// Largest accepted upload in bytes
    #[arg(long, default_value = "1048576", env = "MAX_UPLOAD_SIZE")]
    max_upload_size: u64,

    /// Words per generated passphrase
    #[arg(long, default_value = "3", env = "PASS_WORDS_COUNT")]
    pass_words_count: usize,

    /// Storage root
    #[arg(long, default_value = "/tmp", env = "UPLOAD_DIR")]
    upload_dir: PathBuf,

    /// Octal mode for created directories
    #[arg(long, default_value = "0700", env = "UPLOAD_DIR_PERMS", value_parser = parse_mode)]
    upload_dir_perms: u32,

    /// Upload names are truncated to this many characters
    #[arg(long, default_value = "255", env = "UPLOAD_NAME_MAX_LEN")]
    upload_name_max_len: usize,

    /// Newline-delimited word list for passphrases
    #[arg(long, default_value = "./wordslist.txt", env = "WORDSLIST_FILE")]
    wordslist_file: PathBuf,

    /// Encrypt uploads at rest
    #[arg(long, env = "ENCRYPTION_ENABLED", default_value = "false", action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    encryption_enabled: bool,

    /// Record client address and user agent with each upload
    #[arg(long, env = "TRACE_CLIENT_INFO", default_value = "true", action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    trace_client_info: bool,

    /// Log every upload, download and delete
    #[arg(long, env = "LOG_ACTIVITY", default_value = "true", action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    log_activity: bool,

    /// Write passphrases to the log in clear text
    #[arg(long, env = "LOG_PASSWORDS", default_value = "false", action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    log_passwords: bool,

    /// Enable debug logging
    #[arg(short, long, env = "PASSDROP_DEBUG", default_value = "false", action = ArgAction::Set,
          num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    debug: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Delete expired uploads and exit
    Purge,
    /// Print the effective configuration and exit
    Config,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            base_path: self.base_path,
            drop: DropConfig {
                hash_salt: self.hash_salt,
                ttl_secs: self.expiration_time,
                max_upload_size: self.max_upload_size,
                pass_words_count: clamp_word_count(self.pass_words_count),
                storage_root: self.upload_dir,
                word_list: self.wordslist_file,
                encryption_enabled: self.encryption_enabled,
                dir_mode: self.upload_dir_perms,
                upload_name_max_len: self.upload_name_max_len,
                trace_client_info: self.trace_client_info,
                log_activity: self.log_activity,
                log_passwords: self.log_passwords,
            },
        }
    }
}

fn parse_mode(s: &str) -> Result<u32, String> {
    let digits = s.trim().trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8).map_err(|e| format!("not an octal mode: {}", e))?;
    if mode > 0o7777 {
        return Err(format!("mode {:o} is out of range", mode));
    }
    Ok(mode)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Parse arguments
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Serve);

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "passdrop={lvl},passdrop_cli={lvl},passdrop_core={lvl},passdrop_store={lvl},tower_http={lvl}",
                    lvl = log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.pass_words_count > MAX_WORDS || args.pass_words_count == 0 {
        tracing::warn!(
            requested = args.pass_words_count,
            used = clamp_word_count(args.pass_words_count),
            "PASS_WORDS_COUNT out of range, clamping"
        );
    }

    let config = args.into_config();

    match command {
        Command::Serve => {
            tracing::info!("Starting Passdrop on {}", config.bind_addr());
            run_server(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Purge => {
            let drop = config.drop;
            let report = tokio::task::spawn_blocking({
                let drop = drop.clone();
                move || admin::purge(&drop)
            })
            .await??;

            println!("{}", admin::purge_summary(&drop, &report));
            if report.is_clean() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(2))
            }
        }
        Command::Config => {
            println!("{}", admin::config_json(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
