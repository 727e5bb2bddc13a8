// crates/photoparkk-cli/src/main.rs
// ============================================================================
// Module: PhotoParkk CLI Entry Point
// Description: Command dispatcher for the PhotoParkk server and offline tools.
// Purpose: Run the storefront API and check catalogs and images before upload.
// Dependencies: clap, photoparkk-config, photoparkk-core, photoparkk-imaging,
//               photoparkk-server, serde_json, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The PhotoParkk CLI starts the HTTP API and offers offline helpers that
//! apply the same rules the server does: catalog files are checked with the
//! shape validator, and images are run through the upload compressor. All
//! user-facing strings are routed through the message catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use photoparkk_cli::t;
use photoparkk_config::PaymentProvider;
use photoparkk_config::PhotoparkkConfig;
use photoparkk_core::Shape;
use photoparkk_core::validate_shape;
use photoparkk_imaging::CompressionOptions;
use photoparkk_imaging::compress_image;
use photoparkk_server::PhotoparkkServer;
use photoparkk_server::ServerError;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a catalog JSON input.
const MAX_CATALOG_BYTES: u64 = 16 * 1024 * 1024;
/// Maximum size of an image input.
const MAX_IMAGE_BYTES: u64 = 64 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "photoparkk", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the PhotoParkk HTTP API.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Catalog file utilities.
    Catalog {
        /// Selected catalog subcommand.
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Image utilities.
    Image {
        /// Selected image subcommand.
        #[command(subcommand)]
        command: ImageCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to photoparkk.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file without starting the server.
    Validate(ConfigValidateCommand),
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to photoparkk.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Validate a shape, or an array of shapes, from a JSON file.
    Validate(CatalogValidateCommand),
}

/// Arguments for catalog validation.
#[derive(Args, Debug)]
struct CatalogValidateCommand {
    /// Path to the catalog JSON file.
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

/// Image subcommands.
#[derive(Subcommand, Debug)]
enum ImageCommand {
    /// Compress an image the way uploads are compressed.
    Compress(ImageCompressCommand),
}

/// Arguments for image compression.
#[derive(Args, Debug)]
struct ImageCompressCommand {
    /// Input image path.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    /// Output JPEG path.
    #[arg(long, value_name = "PATH")]
    output: PathBuf,
    /// Longest output side in pixels.
    #[arg(long, value_name = "PX")]
    max_dimension: Option<u32>,
    /// Size target in KiB that triggers the fallback pass.
    #[arg(long, value_name = "KIB")]
    target_kib: Option<usize>,
    /// First-pass JPEG quality (1-100).
    #[arg(long, value_name = "Q")]
    quality: Option<u8>,
    /// Fallback JPEG quality (1-100).
    #[arg(long, value_name = "Q")]
    fallback_quality: Option<u8>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog-formatted messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a formatted message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Catalog {
            command,
        } => command_catalog(command),
        Commands::Image {
            command,
        } => command_image(command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = PhotoparkkConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("serve.config.load_failed", error = err)))?;
    warn_posture(&config)?;

    // Store and gateway construction block; keep them off the async workers.
    let server = tokio::task::spawn_blocking(move || PhotoparkkServer::from_config(config))
        .await
        .map_err(|err| {
            CliError::new(t!("serve.init_failed", error = format!("init join failed: {err}")))
        })?
        .map_err(|err| CliError::new(t!("serve.init_failed", error = err)))?;
    let bind = server.bind_addr();
    write_stderr_line(&t!("serve.listening", bind = bind))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server
        .serve()
        .await
        .map_err(|err: ServerError| CliError::new(t!("serve.failed", error = err)))?;

    Ok(ExitCode::SUCCESS)
}

/// Warns about configurations that are valid but weaker than production.
fn warn_posture(config: &PhotoparkkConfig) -> CliResult<()> {
    if config.server.admin_tokens.is_empty() {
        write_stderr_line(&t!("serve.warn.open_admin"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    if config.payments.provider == PaymentProvider::Disabled {
        write_stderr_line(&t!("serve.warn.payments_disabled"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = PhotoparkkConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Catalog Commands
// ============================================================================

/// Dispatches catalog subcommands.
fn command_catalog(command: CatalogCommand) -> CliResult<ExitCode> {
    match command {
        CatalogCommand::Validate(command) => command_catalog_validate(&command),
    }
}

/// Validates every shape in a catalog file and reports each rejection.
fn command_catalog_validate(command: &CatalogValidateCommand) -> CliResult<ExitCode> {
    let bytes = read_input(&command.path, MAX_CATALOG_BYTES)?;
    let shapes = parse_catalog(&command.path, &bytes)?;
    if shapes.is_empty() {
        return Err(CliError::new(t!("catalog.validate.empty", path = command.path.display())));
    }

    let mut seen = HashSet::new();
    let mut rejected = 0_usize;
    for (index, shape) in shapes.iter().enumerate() {
        let message = match validate_shape(shape) {
            Err(violation) => Some(t!(
                "catalog.validate.invalid",
                index = index + 1,
                name = shape.name,
                error = violation
            )),
            Ok(()) if !seen.insert(shape.name.trim().to_lowercase()) => {
                Some(t!("catalog.validate.duplicate", index = index + 1, name = shape.name))
            }
            Ok(()) => None,
        };
        if let Some(message) = message {
            rejected += 1;
            write_stderr_line(&message)
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
    }

    if rejected > 0 {
        return Err(CliError::new(t!("catalog.validate.failed", count = rejected)));
    }
    write_stdout_line(&t!("catalog.validate.ok", count = shapes.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Parses a single shape object or an array of shapes.
fn parse_catalog(path: &Path, bytes: &[u8]) -> CliResult<Vec<Shape>> {
    let parse_error = |err: serde_json::Error| {
        CliError::new(t!("catalog.parse_failed", path = path.display(), error = err))
    };
    let value: Value = serde_json::from_slice(bytes).map_err(parse_error)?;
    if value.is_array() {
        serde_json::from_value(value).map_err(parse_error)
    } else {
        serde_json::from_value(value).map(|shape| vec![shape]).map_err(parse_error)
    }
}

// ============================================================================
// SECTION: Image Commands
// ============================================================================

/// Dispatches image subcommands.
fn command_image(command: ImageCommand) -> CliResult<ExitCode> {
    match command {
        ImageCommand::Compress(command) => command_image_compress(&command),
    }
}

/// Compresses one image with upload settings and writes the JPEG.
fn command_image_compress(command: &ImageCompressCommand) -> CliResult<ExitCode> {
    let options = compression_options(command);
    options.validate().map_err(|err| CliError::new(t!("image.options_invalid", error = err)))?;
    let input = read_input(&command.input, MAX_IMAGE_BYTES)?;
    let compressed = compress_image(&input, &options).map_err(|err| {
        CliError::new(t!("image.compress_failed", path = command.input.display(), error = err))
    })?;
    fs::write(&command.output, &compressed.bytes).map_err(|err| {
        CliError::new(t!("image.write_failed", path = command.output.display(), error = err))
    })?;

    write_stdout_line(&t!(
        "image.compress.ok",
        path = command.output.display(),
        width = compressed.width,
        height = compressed.height,
        bytes = compressed.bytes.len(),
        quality = compressed.quality_used
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    if !compressed.within_target {
        write_stderr_line(&t!("image.compress.over_target", target = options.target_bytes))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Applies command-line overrides to the default upload settings.
fn compression_options(command: &ImageCompressCommand) -> CompressionOptions {
    let defaults = CompressionOptions::default();
    CompressionOptions {
        max_dimension: command.max_dimension.unwrap_or(defaults.max_dimension),
        target_bytes: command
            .target_kib
            .map_or(defaults.target_bytes, |kib| kib.saturating_mul(1024)),
        quality: command.quality.unwrap_or(defaults.quality),
        fallback_quality: command.fallback_quality.unwrap_or(defaults.fallback_quality),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an input file, refusing files over `limit` bytes.
fn read_input(path: &Path, limit: u64) -> CliResult<Vec<u8>> {
    let read_error = |err: std::io::Error| {
        CliError::new(t!("input.read_failed", path = path.display(), error = err))
    };
    let metadata = fs::metadata(path).map_err(read_error)?;
    if metadata.len() > limit {
        return Err(CliError::new(t!("input.too_large", path = path.display(), limit = limit)));
    }
    fs::read(path).map_err(read_error)
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
