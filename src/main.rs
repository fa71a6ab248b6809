use anyhow::Result;
use time::UtcOffset;

use opsicle::app::App;
use opsicle::cli::{Dispatcher, exit};
use opsicle::commands;
use opsicle::tui::{Tone, write_box};

fn main() {
    // Must run while the process is single threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let code = match run(offset) {
        Ok(code) => code,
        Err(err) => {
            let _ = write_box(&mut std::io::stderr(), Tone::Error, &format!("{:#}", err), false);
            exit::ERROR
        }
    };
    std::process::exit(code);
}

fn run(offset: UtcOffset) -> Result<i32> {
    let mut app = App::from_process(offset)?;
    let dispatcher = Dispatcher::new(commands::tree())?;
    Ok(dispatcher.run(&mut app, std::env::args_os()))
}
