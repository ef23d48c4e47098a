use std::{
    io,
    process::{Command as CliCommand, Stdio},
};

/// What came back from a captured command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Seam between the scaffolding logic and the external nix tooling.
///
/// Both methods only fail with `Err` when the process could not be started. A process that ran
/// and exited non-zero is reported through the return value.
pub trait Exec {
    /// Runs `program` as the current user, capturing its output.
    fn capture(&self, program: &str, args: &[String]) -> io::Result<Outcome>;

    /// Runs `program` through `sudo`, capturing its output. Used to ask questions in the same
    /// environment `nixos-rebuild` later runs in.
    fn capture_privileged(&self, program: &str, args: &[String]) -> io::Result<Outcome>;

    /// Runs `program` through `sudo`, attached to the terminal unless `quiet`. Returns whether
    /// it exited successfully.
    fn privileged(&self, program: &str, args: &[String], quiet: bool) -> io::Result<bool>;
}

/// Runs commands on the host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExec;

/// Simple wrapper to trace-log commands that get run, and the results
fn run_captured(cmd: &mut CliCommand) -> io::Result<Outcome> {
    log::trace!("RUN: {:?}", cmd);
    let out = cmd.output()?;
    log::trace!("RES: {:?}", out.status);
    Ok(Outcome {
        success: out.status.success(),
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    })
}

impl Exec for SystemExec {
    fn capture(&self, program: &str, args: &[String]) -> io::Result<Outcome> {
        run_captured(CliCommand::new(program).args(args))
    }

    fn capture_privileged(&self, program: &str, args: &[String]) -> io::Result<Outcome> {
        run_captured(CliCommand::new("sudo").arg(program).args(args))
    }

    fn privileged(&self, program: &str, args: &[String], quiet: bool) -> io::Result<bool> {
        log::trace!("RUN: sudo {} {}", program, args.join(" "));
        if quiet {
            let status = CliCommand::new("sudo")
                .arg(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()?;
            log::trace!("RES: {:?}", status);
            return Ok(status.success());
        }

        // cmd_lib logs a child's stderr at info level; fold it into the inherited stdout so
        // build progress and evaluation errors reach the terminal whatever the log filter
        let args = args.to_vec();
        let res = cmd_lib::spawn!(sudo $program $[args] 2>&1)?.wait();
        log::trace!("RES: {:?}", res);
        match res {
            Ok(()) => Ok(true),
            Err(e) => {
                log::debug!("sudo {} exited unsuccessfully: {}", program, e);
                Ok(false)
            }
        }
    }
}
