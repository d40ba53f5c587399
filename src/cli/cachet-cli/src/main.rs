//! Cachet CLI - Command line interface.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use cachet_crypto::token::DEFAULT_TOKEN_TTL_SECS;
use cachet_crypto::{CipherKey, CryptoService, TokenClaims};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zeroize::Zeroizing;

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "cachet")]
#[command(about = "Cachet - Password digests, message encryption and signed tokens")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a password salt
    Salt,
    /// Hash a password with a salt
    Hash {
        /// Password (or read from stdin if not provided)
        #[arg(long)]
        password: Option<String>,
        /// Hex salt produced by `cachet salt`
        #[arg(long)]
        salt: String,
    },
    /// Check a password against a stored digest
    VerifyPassword {
        /// Password (or read from stdin if not provided)
        #[arg(long)]
        password: Option<String>,
        /// Stored hex digest
        #[arg(long)]
        digest: String,
        /// Salt the digest was produced with
        #[arg(long)]
        salt: String,
    },
    /// Generate a random 256-bit cipher key (hex)
    Keygen,
    /// Encrypt a message (prints base64)
    Encrypt {
        #[command(flatten)]
        key: KeyArgs,
        /// Message (or read from stdin if not provided)
        message: Option<String>,
    },
    /// Decrypt a base64 message
    Decrypt {
        #[command(flatten)]
        key: KeyArgs,
        /// Base64 ciphertext (or read from stdin if not provided)
        ciphertext: Option<String>,
    },
    /// Token management
    Token {
        /// Shared signing secret
        #[arg(long, env = "CACHET_TOKEN_SECRET", hide_env_values = true)]
        secret: String,

        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Issue a token carrying a raw payload
    Issue {
        /// Payload text (must not contain '.')
        payload: String,
    },
    /// Verify a token and print its payload
    Verify {
        /// Token to verify
        token: String,
    },
    /// Issue a login token for a user
    Login {
        /// Numeric user id
        #[arg(long)]
        user_id: u64,
        /// Username (must not contain '.', the token delimiter)
        #[arg(long)]
        username: String,
        /// Token lifetime in hours
        #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_SECS / 3600)]
        ttl_hours: i64,
    },
    /// Verify a login token and print its claims as JSON
    Claims {
        /// Token to verify
        token: String,
    },
}

#[derive(clap::Args)]
struct KeyArgs {
    /// 256-bit key as 64 hex characters
    #[arg(long, env = "CACHET_KEY", hide_env_values = true)]
    key: Option<String>,

    /// File containing the hex key (takes precedence over --key)
    #[arg(long)]
    key_file: Option<PathBuf>,
}

impl KeyArgs {
    fn load(&self) -> Result<CipherKey> {
        let hex = match (&self.key_file, &self.key) {
            (Some(path), _) => Zeroizing::new(
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read key file {}", path.display()))?,
            ),
            (None, Some(hex)) => Zeroizing::new(hex.clone()),
            (None, None) => bail!("A key is required. Set CACHET_KEY, --key or --key-file"),
        };

        CipherKey::from_hex(&hex).context("Invalid key")
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_salt(service: &CryptoService) -> Result<ExitCode> {
    let salt = service.generate_salt().context("Salt generation failed")?;
    println!("{}", salt);
    Ok(ExitCode::SUCCESS)
}

fn cmd_hash(service: &CryptoService, password: Option<String>, salt: &str) -> Result<ExitCode> {
    let password = Zeroizing::new(arg_or_stdin(password, "Password")?);
    let digest = service
        .hash_password(&password, salt)
        .context("Hashing failed")?;
    println!("{}", digest);
    Ok(ExitCode::SUCCESS)
}

fn cmd_verify_password(
    service: &CryptoService,
    password: Option<String>,
    digest: &str,
    salt: &str,
) -> Result<ExitCode> {
    let password = Zeroizing::new(arg_or_stdin(password, "Password")?);
    let matched = service
        .verify_password(&password, digest, salt)
        .context("Verification failed")?;

    if matched {
        println!("match");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("no match");
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_keygen(service: &CryptoService) -> Result<ExitCode> {
    let key = service.generate_key().context("Key generation failed")?;
    println!("{}", *key.to_hex());
    Ok(ExitCode::SUCCESS)
}

fn cmd_encrypt(service: &CryptoService, key: &KeyArgs, message: Option<String>) -> Result<ExitCode> {
    let key = key.load()?;
    let message = Zeroizing::new(arg_or_stdin(message, "Message")?);
    let encoded = service
        .encrypt_message_base64(message.as_bytes(), &key)
        .context("Encryption failed")?;
    println!("{}", encoded);
    Ok(ExitCode::SUCCESS)
}

fn cmd_decrypt(service: &CryptoService, key: &KeyArgs, ciphertext: Option<String>) -> Result<ExitCode> {
    let key = key.load()?;
    let ciphertext = arg_or_stdin(ciphertext, "Ciphertext")?;
    let plaintext = service
        .decrypt_message_base64(&ciphertext, &key)
        .context("Decryption failed")?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.write_all(b"\n")?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_token(service: &CryptoService, secret: &str, command: TokenCommands) -> Result<ExitCode> {
    let secret = secret.as_bytes();

    match command {
        TokenCommands::Issue { payload } => {
            let token = service
                .generate_token(&payload, secret)
                .context("Token issue failed")?;
            println!("{}", token);
        },
        TokenCommands::Verify { token } => {
            let payload = service
                .verify_token(&token, secret)
                .context("Token rejected")?;
            println!("{}", payload);
        },
        TokenCommands::Login {
            user_id,
            username,
            ttl_hours,
        } => {
            let claims = TokenClaims::for_user(user_id, username, ttl_hours.saturating_mul(3600));
            let token = service
                .generate_claims_token(&claims, secret)
                .context("Token issue failed")?;
            println!("{}", token);
        },
        TokenCommands::Claims { token } => {
            let claims = service
                .verify_claims_token(&token, secret)
                .context("Token rejected")?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Returns `value`, or reads one line from stdin when it is absent.
fn arg_or_stdin(value: Option<String>, what: &str) -> Result<String> {
    let value = match value {
        Some(v) => v,
        None => {
            let stdin = io::stdin();
            let mut line = String::new();
            stdin
                .lock()
                .read_line(&mut line)
                .with_context(|| format!("Failed to read {} from stdin", what.to_lowercase()))?;
            line.trim_end_matches(['\r', '\n']).to_string()
        },
    };

    Ok(value)
}

// ============================================================================
// Main
// ============================================================================

/// Exit status for errors; `verify-password` uses `ExitCode::FAILURE` for "no match".
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(EXIT_ERROR)
        },
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    let service = CryptoService::new();

    match command {
        Commands::Salt => cmd_salt(&service),
        Commands::Hash { password, salt } => cmd_hash(&service, password, &salt),
        Commands::VerifyPassword {
            password,
            digest,
            salt,
        } => cmd_verify_password(&service, password, &digest, &salt),
        Commands::Keygen => cmd_keygen(&service),
        Commands::Encrypt { key, message } => cmd_encrypt(&service, &key, message),
        Commands::Decrypt { key, ciphertext } => cmd_decrypt(&service, &key, ciphertext),
        Commands::Token { secret, command } => cmd_token(&service, &secret, command),
    }
}
