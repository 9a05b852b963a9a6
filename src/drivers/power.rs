//! Shutdown, reboot and self-update.

use std::env;
use std::io;
use std::process::{Command, ExitStatus};

use super::PowerControl;
use crate::config::PowerConfig;

/// Runs the configured command lines.
#[derive(Debug)]
pub struct SystemPower {
    config: PowerConfig,
}

impl SystemPower {
    pub fn new(config: &PowerConfig) -> Self {
        Self { config: config.clone() }
    }
}

fn run(words: &[String]) -> io::Result<ExitStatus> {
    let (program, args) = words
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;
    log::info!("running {}", words.join(" "));
    Command::new(program).args(args).status()
}

fn run_checked(words: &[String]) -> io::Result<()> {
    let status = run(words)?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{} exited with {}", words.join(" "), status)))
    }
}

impl PowerControl for SystemPower {
    fn shutdown(&mut self) -> io::Result<()> {
        run_checked(&self.config.shutdown_command)
    }

    fn reboot(&mut self) -> io::Result<()> {
        run_checked(&self.config.reboot_command)
    }

    fn self_update_and_restart(&mut self) -> bool {
        match run_checked(&self.config.update_command) {
            Ok(()) => true,
            Err(err) => {
                log::error!("update failed: {}", err);
                false
            }
        }
    }

    fn restart(&mut self) -> io::Result<()> {
        let exe = env::current_exe()?;
        log::info!("restarting {}", exe.display());
        Command::new(exe).args(env::args_os().skip(1)).spawn()?;
        Ok(())
    }
}

/// Logs every call instead of acting on it.
#[derive(Debug, Default)]
pub struct MockPower {
    pub calls: Vec<&'static str>,
}

impl PowerControl for MockPower {
    fn shutdown(&mut self) -> io::Result<()> {
        log::info!("mock power: shutdown");
        self.calls.push("shutdown");
        Ok(())
    }

    fn reboot(&mut self) -> io::Result<()> {
        log::info!("mock power: reboot");
        self.calls.push("reboot");
        Ok(())
    }

    fn self_update_and_restart(&mut self) -> bool {
        log::info!("mock power: update");
        self.calls.push("update");
        true
    }

    fn restart(&mut self) -> io::Result<()> {
        log::info!("mock power: restart");
        self.calls.push("restart");
        Ok(())
    }
}
