//! Pairlock command-line client.
//!
//! Pairs two terminals that share a short password. Handshake messages are
//! printed to stdout and pasted into the other terminal by hand (or scanned
//! from a QR code); once paired, every stdin line is sealed and printed, and
//! lines prefixed with `<` are opened instead. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Terminal A: prints MessageA, then waits for MessageB on stdin
//! pairlock initiate --password "correct horse"
//!
//! # Terminal B: answers MessageA and prints MessageB
//! pairlock respond --password "correct horse" --message-a <MESSAGE_A>
//!
//! # Render any text as a QR code
//! pairlock qr <TEXT> --output code.png
//!
//! # Both sides in one process
//! pairlock demo
//!
//! # Bind both party names into the handshake
//! pairlock --initiator-id alice --responder-id bob initiate --password "correct horse"
//! ```

use std::{
    error::Error,
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Parser, Subcommand};
use pairlock_crypto::{ContextInfo, DerivedKey};
use pairlock_session::{
    BarcodeRequest, ExchangeRequest, FinishRequest, OpenRequest, PairingService, RegistryConfig,
    SealRequest, ServiceConfig, StartRequest, SystemEnv,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

/// Pairlock pairing client
#[derive(Parser)]
#[command(name = "pairlock")]
#[command(about = "Pair two terminals over a password-authenticated channel")]
#[command(version)]
struct Args {
    /// Context bound into the handshake; both sides must pass the same value
    #[arg(long, global = true)]
    context: Option<String>,

    /// Initiator name bound into the handshake with `--responder-id`
    #[arg(long, global = true, requires = "responder_id")]
    initiator_id: Option<String>,

    /// Responder name bound into the handshake with `--initiator-id`
    #[arg(long, global = true, requires = "initiator_id")]
    responder_id: Option<String>,

    /// Seconds a started handshake waits for MessageB
    #[arg(long, global = true, default_value = "300")]
    session_ttl_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a pairing and wait for the peer's MessageB on stdin
    Initiate {
        /// Shared password
        #[arg(short, long)]
        password: String,

        /// Also write MessageA as a QR code PNG
        #[arg(long)]
        qr: Option<PathBuf>,
    },

    /// Answer a peer's MessageA
    Respond {
        /// Shared password
        #[arg(short, long)]
        password: String,

        /// MessageA printed by `initiate`
        #[arg(long)]
        message_a: String,
    },

    /// Render text as a QR code PNG
    Qr {
        /// Text to encode
        text: String,

        /// Output path
        #[arg(short, long, default_value = "pairlock.png")]
        output: PathBuf,
    },

    /// Run both sides of a pairing in one process
    Demo {
        /// Shared password
        #[arg(short, long, default_value = "correct horse")]
        password: String,

        /// Message sent over the paired channel
        #[arg(short, long, default_value = "hello")]
        message: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let config = ServiceConfig {
        registry: RegistryConfig {
            session_ttl: Duration::from_secs(args.session_ttl_secs),
            ..RegistryConfig::default()
        },
        ..ServiceConfig::default()
    };
    let context = binding_context(args.context, args.initiator_id, args.responder_id);

    match args.command {
        Command::Initiate { password, qr } => {
            let service = PairingService::new(SystemEnv::new(), config);
            initiate(&service, Zeroizing::new(password), context, qr.as_deref())
        },
        Command::Respond { password, message_a } => {
            let service = PairingService::new(SystemEnv::new(), config);
            respond(&service, Zeroizing::new(password), context, message_a)
        },
        Command::Qr { text, output } => {
            let service = PairingService::new(SystemEnv::new(), config);
            write_barcode(&service, text, &output)
        },
        Command::Demo { password, message } => {
            demo(config, Zeroizing::new(password), context, message)
        },
    }
}

/// Context bytes for the handshake.
///
/// With both party names given the context is the length-prefixed
/// `(initiator, responder, context)` triple, so swapped roles never agree.
fn binding_context(
    context: Option<String>,
    initiator_id: Option<String>,
    responder_id: Option<String>,
) -> Option<Vec<u8>> {
    match (initiator_id, responder_id) {
        (Some(initiator), Some(responder)) => {
            let associated_data = context.unwrap_or_default();
            let info =
                ContextInfo::for_parties(&initiator, &responder, associated_data.as_bytes());
            Some(info.as_bytes().to_vec())
        },
        _ => context.map(String::into_bytes),
    }
}

fn initiate(
    service: &PairingService<SystemEnv>,
    password: Zeroizing<String>,
    context: Option<Vec<u8>>,
    qr: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let started = service.start(StartRequest { password, context })?;

    if let Some(path) = qr {
        write_barcode(service, started.message_a.clone(), path)?;
    }

    {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", started.message_a)?;
        out.flush()?;
    }
    tracing::info!(session = %started.session, "waiting for MessageB");

    let mut lines = io::stdin().lock().lines();
    let Some(message_b) = lines.next().transpose()? else {
        return Err("stdin closed before MessageB arrived".into());
    };

    let message_b = message_b.trim().to_owned();
    let finished = service.finish(FinishRequest { session: started.session, message_b })?;
    tracing::info!("paired");

    chat(service, &finished.key, lines)
}

fn respond(
    service: &PairingService<SystemEnv>,
    password: Zeroizing<String>,
    context: Option<Vec<u8>>,
    message_a: String,
) -> Result<(), Box<dyn Error>> {
    let exchanged = service.exchange(ExchangeRequest { password, context, message_a })?;

    {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", exchanged.message_b)?;
        out.flush()?;
    }
    tracing::info!("paired");

    chat(service, &exchanged.key, io::stdin().lock().lines())
}

/// Seal each input line, or open it when prefixed with `<`.
///
/// A line that fails to open is logged and skipped; the peer may simply have
/// paired with a different password.
fn chat(
    service: &PairingService<SystemEnv>,
    key: &DerivedKey,
    lines: impl Iterator<Item = io::Result<String>>,
) -> Result<(), Box<dyn Error>> {
    let key = Zeroizing::new(key.as_bytes().to_vec());

    for line in lines {
        let line = line?;
        let mut out = io::stdout().lock();

        if let Some(sealed) = line.strip_prefix('<') {
            let request = OpenRequest { key: key.clone(), sealed: sealed.trim().to_owned() };
            match service.open(request) {
                Ok(opened) => writeln!(out, "{}", opened.plaintext)?,
                Err(err) => tracing::warn!(kind = ?err.kind(), "could not open message"),
            }
        } else {
            let sealed = service.seal(SealRequest { key: key.clone(), plaintext: line })?;
            writeln!(out, "{}", sealed.sealed)?;
        }

        out.flush()?;
    }

    Ok(())
}

fn write_barcode(
    service: &PairingService<SystemEnv>,
    text: String,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let barcode = service.encode_barcode(BarcodeRequest { text })?;
    fs::write(path, barcode.png)?;

    tracing::info!(path = %path.display(), "wrote QR code");
    Ok(())
}

fn demo(
    config: ServiceConfig,
    password: Zeroizing<String>,
    context: Option<Vec<u8>>,
    message: String,
) -> Result<(), Box<dyn Error>> {
    let alice = PairingService::new(SystemEnv::new(), config.clone());
    let bob = PairingService::new(SystemEnv::new(), config);
    let mut out = io::stdout().lock();

    let started =
        alice.start(StartRequest { password: password.clone(), context: context.clone() })?;
    writeln!(out, "alice -> bob   message_a: {}", started.message_a)?;

    let exchanged =
        bob.exchange(ExchangeRequest { password, context, message_a: started.message_a })?;
    writeln!(out, "bob   -> alice message_b: {}", exchanged.message_b)?;

    let finished = alice
        .finish(FinishRequest { session: started.session, message_b: exchanged.message_b })?;

    let alice_key = Zeroizing::new(finished.key.as_bytes().to_vec());
    let bob_key = Zeroizing::new(exchanged.key.as_bytes().to_vec());

    let sealed = alice.seal(SealRequest { key: alice_key, plaintext: message })?;
    writeln!(out, "alice -> bob   sealed:    {}", sealed.sealed)?;

    let opened = bob.open(OpenRequest { key: bob_key, sealed: sealed.sealed })?;
    writeln!(out, "bob   opened:             {}", opened.plaintext)?;

    Ok(())
}
