// ABOUTME: Validation stage: confirm the container runs, then probe the app and proxy paths.
// ABOUTME: Only a missing container aborts; unanswered probes are warnings.

use super::error::DeployError;
use super::recipe::Recipe;
use super::release::ComposeCommand;
use crate::context::{AppTarget, DeploymentContext};
use crate::diagnostics::{Diagnostics, Warning, WarningKind};
use crate::runner::{CommandRunner, Invocation};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Empty;
use hyper_util::rt::TokioIo;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;

pub const EXTERNAL_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Reachability check run from the invoking machine.
#[async_trait]
pub trait ExternalProbe: Send + Sync {
    /// HTTP status of `GET /`, or a reason it could not be obtained.
    async fn get(&self, host: Ipv4Addr, port: u16) -> Result<u16, String>;
}

/// Plain HTTP/1 `GET /` over TCP, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    pub timeout: Duration,
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self {
            timeout: EXTERNAL_PROBE_TIMEOUT,
        }
    }
}

impl HttpProbe {
    async fn request(host: Ipv4Addr, port: u16) -> Result<u16, String> {
        let stream = TcpStream::connect(SocketAddr::from((host, port)))
            .await
            .map_err(|e| format!("connect failed: {}", e))?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| format!("HTTP handshake failed: {}", e))?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("probe connection error: {}", e);
            }
        });

        let req = hyper::Request::builder()
            .method("GET")
            .uri("/")
            .header("Host", host.to_string())
            .body(Empty::<Bytes>::new())
            .map_err(|e| format!("failed to build request: {}", e))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        Ok(resp.status().as_u16())
    }
}

#[async_trait]
impl ExternalProbe for HttpProbe {
    async fn get(&self, host: Ipv4Addr, port: u16) -> Result<u16, String> {
        match tokio::time::timeout(self.timeout, Self::request(host, port)).await {
            Ok(result) => result,
            Err(_) => Err(format!("no answer within {:?}", self.timeout)),
        }
    }
}

/// Names of running containers on the remote host, or `None` if listing failed.
async fn running_containers<R>(runner: &R, app: &AppTarget) -> Option<Vec<String>>
where
    R: CommandRunner + ?Sized,
{
    let list = app
        .privileged("docker")
        .args(["ps", "--format", "{{.Names}}"]);
    match runner.run(&list).await {
        Ok(output) if output.success() => Some(
            output
                .stdout
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

/// Whether the release is up.
///
/// A single container must run under its exact name. A compose stack is
/// asked directly, since compose derives its own container names from the
/// project directory.
pub async fn is_running<R>(runner: &R, app: &AppTarget, recipe: Recipe) -> bool
where
    R: CommandRunner + ?Sized,
{
    match recipe {
        Recipe::Dockerfile => {
            let name = app.container_name();
            running_containers(runner, app)
                .await
                .is_some_and(|names| names.iter().any(|n| *n == name))
        }
        Recipe::Compose => {
            let ps = ComposeCommand::detect(runner, app)
                .await
                .invocation(app)
                .args(["ps", "--status", "running", "-q"]);
            match runner.run(&ps).await {
                Ok(output) => output.success() && !output.stdout.trim().is_empty(),
                Err(_) => false,
            }
        }
    }
}

fn curl(url: &str) -> Invocation {
    Invocation::remote("curl").args([
        "-sS",
        "-o",
        "/dev/null",
        "--max-time",
        "5",
        "-w",
        "%{http_code}",
        url,
    ])
}

async fn remote_probe<R>(runner: &R, url: &str) -> Result<String, String>
where
    R: CommandRunner + ?Sized,
{
    match runner.run(&curl(url)).await {
        Ok(output) if output.success() => Ok(output.stdout.trim().to_string()),
        Ok(output) => Err(output.failure_summary()),
        Err(e) => Err(e.to_string()),
    }
}

/// Log the evidence needed to diagnose a container that is not running.
async fn capture_failure<R>(runner: &R, app: &AppTarget, recipe: Recipe)
where
    R: CommandRunner + ?Sized,
{
    let logs = match recipe {
        Recipe::Dockerfile => app.privileged("docker").args([
            "logs",
            "--tail",
            "50",
            &app.container_name(),
        ]),
        Recipe::Compose => ComposeCommand::detect(runner, app)
            .await
            .invocation(app)
            .args(["logs", "--tail", "50"]),
    };
    let ps = app.privileged("docker").args(["ps", "-a"]);

    for invocation in [logs, ps] {
        match runner.run(&invocation).await {
            Ok(output) => tracing::error!(
                "{}:\n{}{}",
                invocation,
                output.stdout,
                output.stderr
            ),
            Err(e) => tracing::error!("{}: {}", invocation, e),
        }
    }
}

/// Confirm the release is running and reachable.
pub async fn validate<R, P>(
    runner: &R,
    ctx: &DeploymentContext,
    recipe: Recipe,
    external: &P,
    diagnostics: &mut Diagnostics,
) -> Result<(), DeployError>
where
    R: CommandRunner + ?Sized,
    P: ExternalProbe + ?Sized,
{
    let app = &ctx.target;

    if !is_running(runner, app, recipe).await {
        capture_failure(runner, app, recipe).await;
        return Err(DeployError::ContainerNotRunning(app.container_name()));
    }
    tracing::info!(outcome = "success", "container for {} is running", app.repo_name);

    let port = ctx.app_port.get();
    match remote_probe(runner, &format!("http://localhost:{port}")).await {
        Ok(code) => tracing::info!("application answered on port {} with {}", port, code),
        Err(reason) => diagnostics.warn(Warning::probe(
            WarningKind::AppProbe,
            format!("application not answering on port {port} yet: {reason}"),
        )),
    }

    match remote_probe(runner, "http://localhost:80").await {
        Ok(code) => tracing::info!("proxy answered on the remote host with {}", code),
        Err(reason) => diagnostics.warn(Warning::probe(
            WarningKind::ProxyProbe,
            format!("proxy not answering on the remote host: {reason}"),
        )),
    }

    let host = app.remote.host.ip();
    match external.get(host, 80).await {
        Ok(code) => tracing::info!(outcome = "success", "http://{} answered with {}", host, code),
        Err(reason) => diagnostics.warn(Warning::probe(
            WarningKind::ExternalProbe,
            format!("http://{host} not reachable from here (check the firewall): {reason}"),
        )),
    }

    Ok(())
}
