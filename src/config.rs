// src/config.rs

use std::env;
use std::path::{Path, PathBuf};

use nix::unistd::getuid;
use secrecy::SecretString;

use crate::cli::Cli;

pub const SOCKET_NAME: &str = "S.gpg-agent";
const RUNTIME_BASE: &str = "/run/user";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Preset,
    Forget,
}

#[derive(Debug)]
pub struct ClientConfig {
    pub operation: Operation,
    pub keygrip: String,

    // 🛡️ Threaded explicitly into the encoder, never process-wide state
    pub restricted: bool,
    pub verbose: u8,
    pub passphrase: Option<SecretString>,

    // 📂 Agent socket
    pub socket_path: PathBuf,
}

impl ClientConfig {
    pub fn load(cli: Cli) -> Self {
        let homedir = cli
            .homedir
            .or_else(|| env::var_os("GNUPGHOME").map(PathBuf::from));

        // The per-user runtime directory is only used when the agent made it.
        let runtime_dir = Path::new(RUNTIME_BASE)
            .join(getuid().as_raw().to_string())
            .join("gnupg");
        let runtime_dir = runtime_dir.is_dir().then_some(runtime_dir);

        let home = env::var_os("HOME").map(PathBuf::from);

        Self {
            operation: if cli.preset {
                Operation::Preset
            } else {
                Operation::Forget
            },
            keygrip: cli.keygrip,
            restricted: cli.restricted,
            verbose: cli.verbose,
            // Moved, not copied: the clap-owned String becomes the secret.
            passphrase: cli.passphrase.map(SecretString::new),
            socket_path: resolve_socket_path(homedir, runtime_dir, home),
        }
    }
}

/// Explicit home directory first, then the runtime socket directory, then
/// `~/.gnupg`. A home directory naming `~/.gnupg` is the default one, whose
/// agent serves from the runtime directory when that exists.
fn resolve_socket_path(
    homedir: Option<PathBuf>,
    runtime_dir: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    let default_homedir = home.unwrap_or_default().join(".gnupg");
    let homedir = homedir.filter(|dir| *dir != default_homedir);

    let dir = homedir.or(runtime_dir).unwrap_or(default_homedir);
    dir.join(SOCKET_NAME)
}
