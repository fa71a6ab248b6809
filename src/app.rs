use std::io::{self, IsTerminal, Write};
use std::path::Path;

use anyhow::Result;
use time::UtcOffset;

use crate::config::{ConfigFile, Env};
use crate::credentials::{CredentialStore, Profile};
use crate::tui::{Driver, TerminalDriver};

/// Process-wide handles shared by every command.
pub struct App {
    pub out: Box<dyn Write>,
    pub err: Box<dyn Write>,
    pub ui: Box<dyn Driver>,
    pub env: Env,
    pub config_file: ConfigFile,
    pub profile: Profile,
    pub credentials: CredentialStore,
    /// Install the SIGINT/SIGTERM listener for each command.
    pub handle_signals: bool,
    /// Captured before any thread starts; later lookups may fail.
    pub local_offset: UtcOffset,
    pub color: bool,
}

impl App {
    /// Real terminal, real environment, profile under the user's home.
    pub fn from_process(local_offset: UtcOffset) -> Result<Self> {
        let profile = Profile::from_home()?;
        let config_file = ConfigFile::load(&profile.config_path())?;
        let color = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Ok(Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            ui: Box::new(TerminalDriver::new()),
            env: Env::from_process(),
            config_file,
            credentials: CredentialStore::new(&profile),
            profile,
            handle_signals: true,
            local_offset,
            color,
        })
    }

    /// An app rooted at `home` with caller-supplied streams and input, no
    /// signal handling and UTC timestamps.
    pub fn with_home(
        home: &Path,
        out: Box<dyn Write>,
        err: Box<dyn Write>,
        ui: Box<dyn Driver>,
        env: Env,
    ) -> Result<Self> {
        let profile = Profile::under(home);
        let config_file = ConfigFile::load(&profile.config_path())?;
        Ok(Self {
            out,
            err,
            ui,
            env,
            config_file,
            credentials: CredentialStore::new(&profile),
            profile,
            handle_signals: false,
            local_offset: UtcOffset::UTC,
            color: false,
        })
    }
}
