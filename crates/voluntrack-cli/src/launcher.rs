//! Development launcher for the backend and frontend services.
//!
//! `voluntrack start` spawns the Python API server, waits for it to come
//! up, then spawns the frontend dev server. Child output is forwarded to the
//! log with a per-service tag. Ctrl+C or SIGTERM stops both children.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Backend address printed once startup completes
pub const BACKEND_URL: &str = "http://localhost:5000";

/// Frontend address printed once startup completes
pub const FRONTEND_URL: &str = "http://localhost:8081";

/// Pause between the backend becoming ready and starting the frontend
const FRONTEND_DELAY: Duration = Duration::from_secs(2);

/// Time given to children to exit after SIGTERM
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const BACKEND_READY_TIMEOUT: Duration = Duration::from_secs(5);
const FRONTEND_READY_TIMEOUT: Duration = Duration::from_secs(15);

/// How to start one service and how to tell it is up.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    pub name: &'static str,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Substring of a stdout line that marks the service as ready
    pub ready_marker: &'static str,
    /// Treat the service as ready after this long if it is still running
    pub ready_timeout: Duration,
    /// Stderr lines containing any of these are not shown
    pub stderr_ignore: &'static [&'static str],
}

impl ServiceSpec {
    /// Flask API server started from `run.py`.
    pub fn backend(dir: &Path) -> Self {
        let python = if cfg!(windows) { "python" } else { "python3" };
        Self {
            name: "backend",
            program: python.to_string(),
            args: vec!["run.py".to_string()],
            cwd: dir.to_path_buf(),
            ready_marker: "Running on",
            ready_timeout: BACKEND_READY_TIMEOUT,
            stderr_ignore: &["WARNING"],
        }
    }

    /// Vue dev server started through npm.
    pub fn frontend(dir: &Path) -> Self {
        let (program, args) = if cfg!(windows) {
            ("cmd", vec!["/c", "npm", "run", "serve"])
        } else {
            ("npm", vec!["run", "serve"])
        };
        Self {
            name: "frontend",
            program: program.to_string(),
            args: args.into_iter().map(String::from).collect(),
            cwd: dir.to_path_buf(),
            ready_marker: "App running at",
            ready_timeout: FRONTEND_READY_TIMEOUT,
            stderr_ignore: &["warning", "deprecated"],
        }
    }
}

/// Options for [`run`].
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub backend_dir: PathBuf,
    pub frontend_dir: PathBuf,
}

/// How waiting for a service to start ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The ready marker appeared on stdout
    Marker,
    /// No marker within the timeout but the process is still running
    TimedOut,
    /// The process exited before it became ready
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceState {
    Starting,
    Ready,
    Exited,
}

/// A spawned service with its output forwarders and supervisor task.
pub struct ServiceHandle {
    name: &'static str,
    ready_timeout: Duration,
    state: watch::Receiver<ServiceState>,
    stop: Option<oneshot::Sender<()>>,
    supervisor: JoinHandle<()>,
}

impl ServiceHandle {
    pub fn spawn(spec: &ServiceSpec) -> Result<Self> {
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to start {} ({} in {})",
                    spec.name,
                    spec.program,
                    spec.cwd.display()
                )
            })?;

        let stdout = child.stdout.take().context("child stdout was not captured")?;
        let stderr = child.stderr.take().context("child stderr was not captured")?;
        info!(service = spec.name, pid = child.id(), "Service started");

        let (state_tx, state_rx) = watch::channel(ServiceState::Starting);
        let state_tx = Arc::new(state_tx);
        let (stop_tx, stop_rx) = oneshot::channel();

        tokio::spawn(forward_stdout(
            spec.name,
            stdout,
            spec.ready_marker,
            state_tx.clone(),
        ));
        tokio::spawn(forward_stderr(spec.name, stderr, spec.stderr_ignore));
        let supervisor = tokio::spawn(supervise(spec.name, child, stop_rx, state_tx));

        Ok(Self {
            name: spec.name,
            ready_timeout: spec.ready_timeout,
            state: state_rx,
            stop: Some(stop_tx),
            supervisor,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Wait until the ready marker shows up, the timeout passes or the
    /// process exits, whichever comes first.
    pub async fn wait_ready(&mut self) -> Readiness {
        let settled = {
            let waited = tokio::time::timeout(
                self.ready_timeout,
                self.state.wait_for(|s| *s != ServiceState::Starting),
            )
            .await;
            match waited {
                Ok(Ok(state)) => Some(*state),
                Ok(Err(_)) => Some(ServiceState::Exited),
                Err(_) => None,
            }
        };
        // On timeout the process may still have exited in the meantime
        let settled = settled.unwrap_or_else(|| *self.state.borrow());

        match settled {
            ServiceState::Ready => Readiness::Marker,
            ServiceState::Exited => Readiness::Exited,
            ServiceState::Starting => Readiness::TimedOut,
        }
    }

    /// Ask the supervisor to stop the child. Does not wait.
    pub fn terminate(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The supervisor is gone if the child already exited
            let _ = stop.send(());
        }
    }

    /// Resolves once the child has exited and been reaped.
    pub async fn finished(self) {
        if let Err(e) = self.supervisor.await {
            warn!(service = self.name, error = %e, "Supervisor task failed");
        }
    }
}

/// Whether a stderr line should be shown.
pub fn stderr_visible(line: &str, ignore: &[&str]) -> bool {
    !line.trim().is_empty() && !ignore.iter().any(|pattern| line.contains(pattern))
}

async fn forward_stdout<R>(
    name: &'static str,
    stream: R,
    marker: &'static str,
    state: Arc<watch::Sender<ServiceState>>,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                info!(service = name, "{}", line);
                if line.contains(marker) {
                    state.send_if_modified(|s| {
                        if *s == ServiceState::Starting {
                            *s = ServiceState::Ready;
                            true
                        } else {
                            false
                        }
                    });
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(service = name, error = %e, "stdout closed");
                break;
            }
        }
    }
}

async fn forward_stderr<R>(name: &'static str, stream: R, ignore: &'static [&'static str])
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if stderr_visible(&line, ignore) {
                    error!(service = name, "{}", line.trim());
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(service = name, error = %e, "stderr closed");
                break;
            }
        }
    }
}

async fn supervise(
    name: &'static str,
    mut child: Child,
    stop: oneshot::Receiver<()>,
    state: Arc<watch::Sender<ServiceState>>,
) {
    // A dropped handle also counts as a stop request
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        _ = stop => None,
    };
    let status = match exited {
        Some(status) => status,
        None => {
            send_terminate(&mut child);
            child.wait().await
        }
    };

    match status {
        Ok(status) if status.success() => info!(service = name, "Service exited"),
        Ok(status) => match status.code() {
            Some(code) => error!(service = name, code, "Service exited with non-zero code"),
            None => info!(service = name, %status, "Service stopped by signal"),
        },
        Err(e) => error!(service = name, error = %e, "Failed to wait for service"),
    }
    state.send_replace(ServiceState::Exited);
}

#[cfg(unix)]
fn send_terminate(child: &mut Child) {
    match child.id() {
        Some(pid) => {
            // SAFETY: kill(2) has no memory-safety preconditions; pid belongs
            // to a child we have not reaped yet.
            let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
            if rc != 0 {
                warn!(pid, "SIGTERM failed, killing");
                let _ = child.start_kill();
            }
        }
        None => debug!("Child already reaped"),
    }
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Child already exited");
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Start one service and wait for it to come up.
async fn start_service(spec: &ServiceSpec, running: &mut Vec<ServiceHandle>) -> Result<()> {
    println!("Starting {}...", spec.name);
    running.push(ServiceHandle::spawn(spec)?);
    let handle = running
        .last_mut()
        .context("service handle missing after spawn")?;
    let readiness = handle.wait_ready().await;

    match readiness {
        Readiness::Marker => println!("{} is up", spec.name),
        Readiness::TimedOut => {
            info!(service = spec.name, "No ready line seen, assuming started");
            println!("{} is up", spec.name);
        }
        Readiness::Exited => bail!("{} exited during startup", spec.name),
    }
    Ok(())
}

async fn start_all(config: &LaunchConfig, running: &mut Vec<ServiceHandle>) -> Result<()> {
    start_service(&ServiceSpec::backend(&config.backend_dir), running).await?;
    tokio::time::sleep(FRONTEND_DELAY).await;
    start_service(&ServiceSpec::frontend(&config.frontend_dir), running).await?;

    println!();
    println!("All services started");
    println!("  Backend API:  {}", BACKEND_URL);
    println!("  Frontend app: {}", FRONTEND_URL);
    println!();
    println!("Press Ctrl+C to stop");
    Ok(())
}

/// Stop every running service and give them the grace delay to exit.
pub async fn stop_all(mut running: Vec<ServiceHandle>) {
    println!("Stopping all services...");
    for handle in running.iter_mut() {
        debug!(service = handle.name(), "Sending stop request");
        handle.terminate();
    }

    let finished = futures::future::join_all(running.into_iter().map(ServiceHandle::finished));
    let (_, waited) = tokio::join!(
        tokio::time::sleep(SHUTDOWN_GRACE),
        tokio::time::timeout(SHUTDOWN_GRACE, finished)
    );
    if waited.is_err() {
        warn!("Some services did not exit within the grace period");
    }
    println!("All services stopped");
}

/// Run both services until interrupted.
///
/// A startup failure is reported and then handled like an interrupt, so the
/// command still exits successfully.
pub async fn run(config: LaunchConfig) -> Result<()> {
    println!("========================================");
    println!("    Voluntrack development launcher");
    println!("========================================");
    println!();

    let mut running = Vec::new();
    tokio::select! {
        started = start_all(&config, &mut running) => match started {
            Ok(()) => shutdown_signal().await,
            Err(e) => {
                error!(error = %e, "Startup failed");
                eprintln!("Startup failed: {:#}", e);
            }
        },
        _ = shutdown_signal() => debug!("Interrupted during startup"),
    }

    stop_all(running).await;
    Ok(())
}
