// Copyright 2026 Daniel Smith
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! rawkeys - show what each keystroke sends
//!
//! Puts the terminal in raw mode and prints the code of every byte typed
//! until `q`.

use std::io;
use std::os::unix::io::RawFd;
use std::process;
use std::sync::OnceLock;

mod input;
mod log;
mod output;
mod raw;
mod term;
#[cfg(test)]
mod testutil;

use raw::RawMode;
use term::{FlushPolicy, TerminalAttributes, TerminalDevice, Tty};

/// Attributes to put back if a signal kills us while raw mode is on.
static SAVED_TERMIOS: OnceLock<(RawFd, TerminalAttributes)> = OnceLock::new();

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// Number of `-v`s.
    pub verbosity: u8,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(Flags),
    Version,
    Help,
}

// ---------------------------------------------------------------------------
// Usage
// ---------------------------------------------------------------------------

fn print_usage() {
    let usage = [
        "usage: rawkeys             print the code of each key pressed; q quits",
        "       -v                   debug logging to stderr (-vv for every byte)",
        "       -h                   help screen",
        "       --version            show version and exit",
    ];
    for line in &usage {
        eprintln!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Arg parsing
// ---------------------------------------------------------------------------

struct ArgParser {
    args: Vec<String>,
    pos: usize,
}

impl ArgParser {
    fn new(args: Vec<String>) -> Self {
        ArgParser { args, pos: 1 }
    }

    fn parse(mut self) -> Result<Command, String> {
        let mut flags = Flags::default();
        while self.pos < self.args.len() {
            let arg = &self.args[self.pos];
            if arg == "--version" {
                return Ok(Command::Version);
            }
            if !arg.starts_with('-') || arg.len() < 2 {
                return Err(format!("unexpected argument '{}'", arg));
            }
            for c in arg[1..].chars() {
                match c {
                    'v' => flags.verbosity = flags.verbosity.saturating_add(1),
                    'h' => return Ok(Command::Help),
                    _ => return Err(format!("unknown option -{}", c)),
                }
            }
            self.pos += 1;
        }
        Ok(Command::Run(flags))
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Restore the terminal on SIGTERM, SIGHUP and SIGQUIT. Keyboard signals
/// are off in raw mode, so these only come from outside.
fn setup_signals(fd: RawFd, original: TerminalAttributes) {
    let _ = SAVED_TERMIOS.set((fd, original));
    let handler = signal_handler as extern "C" fn(libc::c_int) as libc::sighandler_t;
    unsafe {
        libc::signal(libc::SIGTERM, handler);
        libc::signal(libc::SIGHUP, handler);
        libc::signal(libc::SIGQUIT, handler);
    }
}

extern "C" fn signal_handler(sig: libc::c_int) {
    if let Some((fd, original)) = SAVED_TERMIOS.get() {
        // Draining output could block on a hung-up terminal.
        let _ = Tty::new(*fd).apply(original, FlushPolicy::Now);
    }
    unsafe {
        libc::_exit(128 + sig);
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn run() -> term::Result<()> {
    let tty = Tty::stdin();
    let mode = RawMode::enable(tty)?;
    setup_signals(tty.fd(), *mode.original());

    let mut reader = input::TtyReader::new(tty.fd());
    let looped = input::run(&mut reader, &mut io::stdout().lock());

    let restored = mode.disable();
    if let (Err(_), Err(e)) = (&looped, &restored) {
        eprintln!("rawkeys: {}", e);
    }
    looped.and(restored)
}

fn main() {
    let flags = match ArgParser::new(std::env::args().collect()).parse() {
        Ok(Command::Run(flags)) => flags,
        Ok(Command::Version) => {
            eprintln!("rawkeys {}", env!("CARGO_PKG_VERSION"));
            process::exit(0);
        }
        Ok(Command::Help) => {
            print_usage();
            process::exit(2);
        }
        Err(msg) => {
            eprintln!("rawkeys: {}", msg);
            print_usage();
            process::exit(2);
        }
    };

    log::init(flags.verbosity);

    if let Err(e) = run() {
        eprintln!("rawkeys: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        let mut all = vec!["rawkeys".to_string()];
        all.extend(args.iter().map(|a| a.to_string()));
        ArgParser::new(all).parse()
    }

    #[test]
    fn test_no_args_runs_quietly() {
        assert_eq!(parse(&[]), Ok(Command::Run(Flags { verbosity: 0 })));
    }

    #[test]
    fn test_verbosity_counts() {
        assert_eq!(parse(&["-v"]), Ok(Command::Run(Flags { verbosity: 1 })));
        assert_eq!(parse(&["-vv"]), Ok(Command::Run(Flags { verbosity: 2 })));
        assert_eq!(parse(&["-v", "-v", "-v"]), Ok(Command::Run(Flags { verbosity: 3 })));
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse(&["-h"]), Ok(Command::Help));
        assert_eq!(parse(&["-vh"]), Ok(Command::Help));
        assert_eq!(parse(&["--version"]), Ok(Command::Version));
    }

    #[test]
    fn test_bad_args() {
        assert_eq!(parse(&["-x"]), Err("unknown option -x".to_string()));
        assert_eq!(parse(&["file.txt"]), Err("unexpected argument 'file.txt'".to_string()));
        assert!(parse(&["-"]).is_err());
    }
}
