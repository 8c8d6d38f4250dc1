// Invoker: hand an invocation to the process host

use crate::command::InvocationSpec;
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};

/// Owner of spawned renderer processes and their output.
///
/// `spawn_and_show_output` must return as soon as the process is started;
/// waiting for it and reporting the result are the host's business.
pub trait ProcessHost {
    fn spawn_and_show_output(&mut self, spec: &InvocationSpec) -> Result<()>;
}

/// Start the renderer through `host` without waiting for it
pub fn invoke(host: &mut dyn ProcessHost, spec: &InvocationSpec) -> Result<()> {
    tracing::info!(command = %spec.command_line(), "dispatching renderer");
    host.spawn_and_show_output(spec)
}

/// Process host that captures each child's output for later display.
///
/// Started children are held until [`OutputBuffer::drain`] waits on them.
/// Callers must drain, or every `Child` and its pipes stay alive for the
/// lifetime of the buffer.
#[derive(Default)]
pub struct OutputBuffer {
    running: Vec<Running>,
}

struct Running {
    command_line: String,
    child: Child,
    feeder: Option<JoinHandle<io::Result<()>>>,
}

/// Final state of one renderer process
#[derive(Debug)]
pub struct Completion {
    pub command_line: String,
    pub outcome: io::Result<Output>,
}

impl Completion {
    pub fn success(&self) -> bool {
        matches!(&self.outcome, Ok(output) if output.status.success())
    }

    /// Human-readable summary: captured output followed by the exit status
    pub fn report(&self) -> String {
        let mut report = format!("{}\n", self.command_line);
        match &self.outcome {
            Ok(output) => {
                report.push_str(&String::from_utf8_lossy(&output.stdout));
                report.push_str(&String::from_utf8_lossy(&output.stderr));
                if !report.ends_with('\n') {
                    report.push('\n');
                }
                match output.status.code() {
                    Some(0) => report.push_str("finished\n"),
                    Some(code) => {
                        report.push_str(&format!("exited abnormally with code {}\n", code))
                    }
                    None => report.push_str("terminated by signal\n"),
                }
            }
            Err(err) => report.push_str(&format!("failed while waiting: {}\n", err)),
        }
        report
    }
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of processes started and not yet drained
    pub fn pending(&self) -> usize {
        self.running.len()
    }

    /// Wait for every started process and collect its output
    pub fn drain(&mut self) -> Vec<Completion> {
        self.running.drain(..).map(Running::finish).collect()
    }
}

impl Running {
    fn finish(self) -> Completion {
        let outcome = self.child.wait_with_output();
        if let Some(feeder) = self.feeder {
            match feeder.join() {
                Ok(Err(err)) => tracing::debug!(error = %err, "renderer stopped reading stdin"),
                Err(_) => tracing::warn!("stdin feeder thread panicked"),
                Ok(Ok(())) => {}
            }
        }
        Completion {
            command_line: self.command_line,
            outcome,
        }
    }
}

impl ProcessHost for OutputBuffer {
    fn spawn_and_show_output(&mut self, spec: &InvocationSpec) -> Result<()> {
        let args = spec.args()?;
        let payload = spec.stdin_payload();

        let mut child = Command::new(&spec.executable)
            .args(&args)
            .stdin(if payload.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start '{}'", spec.executable.display()))?;

        // Feed stdin from a separate thread so a chatty renderer cannot block us
        let feeder = match (payload, child.stdin.take()) {
            (Some(text), Some(mut stdin)) => Some(thread::spawn(move || {
                stdin.write_all(text.as_bytes())?;
                stdin.flush()
            })),
            _ => None,
        };

        tracing::debug!(pid = child.id(), "renderer started");
        self.running.push(Running {
            command_line: spec.command_line(),
            child,
            feeder,
        });
        Ok(())
    }
}
