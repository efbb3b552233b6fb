//! CLI command handling
//!
//! Bridges clap argument parsing with the file transform: resolves settings,
//! wires the audit log, prints the outcome and picks the exit code.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::{ContextKind, ContextValue, ErrorKind as ClapErrorKind};
use clap::{CommandFactory, Parser, Subcommand};

use crate::audit::{AuditSink, FileAuditLog, Operation};
use crate::config::{FilecryptPaths, Settings};
use crate::crypto::{Password, Scheme};
use crate::error::{ExitPolicy, FilecryptError, FilecryptResult};
use crate::transform::{FileTransform, TransformOptions, TransformReport};

#[derive(Parser, Debug)]
#[command(
    name = "filecrypt",
    version,
    about = "Encrypt or decrypt a single file with a password",
    long_about = "filecrypt encrypts FILE to <name>_encrypted.txt, or decrypts it back, \
                  using a key derived from PASSWORD. The input file is removed once \
                  the output has been written."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Container scheme: legacy (AES-256-CBC) or sealed (AES-256-GCM + Argon2id)
    #[arg(long, global = true, value_enum, env = "FILECRYPT_SCHEME")]
    pub scheme: Option<Scheme>,

    /// Directory for audit log files [default: ./log]
    #[arg(long, global = true, env = "FILECRYPT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// File name for decrypted output [default: test.txt]
    #[arg(long, global = true)]
    pub output_name: Option<String>,

    /// Exit with a distinct non-zero code for each kind of failure
    #[arg(
        long,
        global = true,
        env = "FILECRYPT_STRICT",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encrypt FILE and delete the original
    Encrypt {
        /// File to encrypt
        #[arg(allow_hyphen_values = true)]
        file: PathBuf,
        /// Password to derive the key from
        #[arg(allow_hyphen_values = true)]
        password: String,
    },

    /// Decrypt FILE and delete the encrypted original
    Decrypt {
        /// File to decrypt
        #[arg(allow_hyphen_values = true)]
        file: PathBuf,
        /// Password to derive the key from
        #[arg(allow_hyphen_values = true)]
        password: String,
    },
}

impl Commands {
    fn into_parts(self) -> (Operation, PathBuf, Password) {
        match self {
            Commands::Encrypt { file, password } => {
                (Operation::Encrypt, file, Password::new(password))
            }
            Commands::Decrypt { file, password } => {
                (Operation::Decrypt, file, Password::new(password))
            }
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of the persisted settings
    pub fn resolve_settings(&self, mut settings: Settings) -> FilecryptResult<Settings> {
        if let Some(scheme) = self.scheme {
            settings.scheme = scheme;
        }
        if let Some(dir) = &self.log_dir {
            settings.log_dir = Some(dir.clone());
        }
        if let Some(name) = &self.output_name {
            settings.decrypted_file_name = name.clone();
        }
        if self.strict {
            settings.strict_exit_codes = true;
        }

        settings
            .validate()
            .map_err(|e| FilecryptError::usage(e.to_string()))?;
        Ok(settings)
    }
}

/// Run the tool with the given arguments (including the program name)
pub fn run<I, T>(args: I) -> anyhow::Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let parsed = Cli::try_parse_from(args);

    if let Err(e) = &parsed {
        if matches!(
            e.kind(),
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
        ) {
            e.print().context("Failed to write help")?;
            return Ok(ExitCode::SUCCESS);
        }
    }

    let paths = FilecryptPaths::new().context("Failed to resolve configuration directory")?;
    let settings = Settings::load_or_create(&paths).with_context(|| {
        format!(
            "Failed to load settings from {}",
            paths.settings_file().display()
        )
    })?;

    let cli = match parsed {
        Ok(cli) => cli,
        Err(e) => {
            let audit = FileAuditLog::new(settings.log_dir());
            let _ = e.print();
            audit.record(&usage_log_message(&e));
            return Ok(usage_exit());
        }
    };

    let settings = match cli.resolve_settings(settings.clone()) {
        Ok(settings) => settings,
        Err(err) => {
            let audit = FileAuditLog::new(settings.log_dir());
            return Ok(report_usage_error(&audit, &err));
        }
    };

    let audit = FileAuditLog::new(settings.log_dir());
    let policy = ExitPolicy::from_strict(settings.strict_exit_codes);
    let (operation, file, password) = cli.command.into_parts();

    if password.is_empty() {
        return Ok(report_usage_error(
            &audit,
            &FilecryptError::usage("password must not be empty"),
        ));
    }

    let transform = FileTransform::new(TransformOptions::from(&settings), &audit);
    let result = match operation {
        Operation::Encrypt => transform.encrypt(&file, &password),
        Operation::Decrypt => transform.decrypt(&file, &password),
    };

    match result {
        Ok(report) => {
            println!("{}", success_line(&report));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Error while {} file: {}", operation.verb_ing(), err);
            Ok(ExitCode::from(policy.exit_code(&err)))
        }
    }
}

/// Console line for a completed operation
pub fn success_line(report: &TransformReport) -> String {
    let name = |p: &std::path::Path| {
        p.file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| p.display().to_string())
    };

    let verb = match report.operation {
        Operation::Encrypt => "encrypted",
        Operation::Decrypt => "decrypted",
    };

    format!(
        "File '{}' {} to '{}'",
        name(&report.input),
        verb,
        name(&report.output)
    )
}

fn usage_exit() -> ExitCode {
    ExitCode::from(ExitPolicy::Permissive.exit_code(&FilecryptError::usage("")))
}

fn report_usage_error(audit: &dyn AuditSink, err: &FilecryptError) -> ExitCode {
    let mut command = Cli::command();
    eprintln!("error: {}\n\n{}", err, command.render_usage());
    audit.record(&format!("Error: {}", err));
    usage_exit()
}

/// Audit message for an argument parsing failure
fn usage_log_message(err: &clap::Error) -> String {
    match err.kind() {
        ClapErrorKind::InvalidSubcommand => match err.get(ContextKind::InvalidSubcommand) {
            Some(ContextValue::String(cmd)) => format!("Error: unknown command \"{}\"", cmd),
            _ => "Error: unknown command".to_string(),
        },
        ClapErrorKind::MissingRequiredArgument
        | ClapErrorKind::MissingSubcommand
        | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            "Error: incomplete arguments".to_string()
        }
        _ => {
            let rendered = err.to_string();
            let first_line = rendered.lines().next().unwrap_or_default().trim();
            format!("Error: invalid arguments: {}", first_line)
        }
    }
}
