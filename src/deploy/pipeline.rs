// ABOUTME: The deployment pipeline: stages in order, each consuming the previous state.
// ABOUTME: The first failing stage aborts the run with its own error; nothing is rolled back.

use super::environment::{EnvironmentReport, prepare_remote};
use super::error::DeployError;
use super::recipe::Recipe;
use super::state::{
    Connected, HasRecipe, Prepared, Proxied, Released, Started, Synced, Transferred, Verified,
};
use super::step::run_step;
use super::verify::ExternalProbe;
use super::{proxy, release, repository, transfer, verify};
use crate::context::{AppTarget, DeploymentContext};
use crate::diagnostics::Diagnostics;
use crate::runner::{CommandRunner, Invocation};

/// A deployment run, parameterized by the last completed stage.
pub struct Pipeline<'a, R: CommandRunner + ?Sized, S> {
    runner: &'a R,
    ctx: &'a DeploymentContext,
    diagnostics: Diagnostics,
    state: S,
}

/// What a successful run did.
#[derive(Debug)]
pub struct DeploymentReport {
    pub recipe: Recipe,
    pub environment: EnvironmentReport,
    pub diagnostics: Diagnostics,
}

impl<'a, R: CommandRunner + ?Sized, S> Pipeline<'a, R, S> {
    fn next<T>(self, state: T) -> Pipeline<'a, R, T> {
        Pipeline {
            runner: self.runner,
            ctx: self.ctx,
            diagnostics: self.diagnostics,
            state,
        }
    }

    pub fn context(&self) -> &DeploymentContext {
        self.ctx
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

impl<R: CommandRunner + ?Sized, S: HasRecipe> Pipeline<'_, R, S> {
    pub fn recipe(&self) -> Recipe {
        self.state.recipe()
    }
}

impl<'a, R: CommandRunner + ?Sized> Pipeline<'a, R, Started> {
    pub fn new(runner: &'a R, ctx: &'a DeploymentContext) -> Self {
        Self {
            runner,
            ctx,
            diagnostics: Diagnostics::default(),
            state: Started,
        }
    }

    /// Prove the remote shell works before anything else touches the host.
    pub async fn check_connectivity(self) -> Result<Pipeline<'a, R, Connected>, DeployError> {
        let host = self.ctx.remote().host.to_string();
        let output = run_step(self.runner, Invocation::remote("echo").arg("ok"), |reason| {
            DeployError::SshConnectivity {
                host: host.clone(),
                reason,
            }
        })
        .await?;

        if output.stdout.trim() != "ok" {
            return Err(DeployError::SshConnectivity {
                host,
                reason: format!("unexpected reply {:?}", output.stdout.trim()),
            });
        }

        tracing::info!(outcome = "success", "SSH connection to {} verified", host);
        Ok(self.next(Connected))
    }
}

impl<'a, R: CommandRunner + ?Sized> Pipeline<'a, R, Connected> {
    pub async fn sync_repository(mut self) -> Result<Pipeline<'a, R, Synced>, DeployError> {
        repository::sync_repository(self.runner, self.ctx, &mut self.diagnostics).await?;
        let recipe = repository::detect_docker_config(self.ctx)?;
        Ok(self.next(Synced { recipe }))
    }
}

impl<'a, R: CommandRunner + ?Sized> Pipeline<'a, R, Synced> {
    pub async fn prepare_remote(mut self) -> Result<Pipeline<'a, R, Prepared>, DeployError> {
        let environment =
            prepare_remote(self.runner, self.ctx.remote(), &mut self.diagnostics).await?;
        let recipe = self.state.recipe;
        Ok(self.next(Prepared {
            recipe,
            environment,
        }))
    }
}

impl<'a, R: CommandRunner + ?Sized> Pipeline<'a, R, Prepared> {
    pub async fn transfer(self) -> Result<Pipeline<'a, R, Transferred>, DeployError> {
        transfer::sync_files(self.runner, self.ctx).await?;
        let Prepared {
            recipe,
            environment,
        } = self.state.clone();
        Ok(self.next(Transferred {
            recipe,
            environment,
        }))
    }
}

impl<'a, R: CommandRunner + ?Sized> Pipeline<'a, R, Transferred> {
    pub async fn release(self) -> Result<Pipeline<'a, R, Released>, DeployError> {
        release::deploy(self.runner, self.ctx, self.state.recipe).await?;
        let Transferred {
            recipe,
            environment,
        } = self.state.clone();
        Ok(self.next(Released {
            recipe,
            environment,
        }))
    }
}

impl<'a, R: CommandRunner + ?Sized> Pipeline<'a, R, Released> {
    pub async fn configure_proxy(self) -> Result<Pipeline<'a, R, Proxied>, DeployError> {
        proxy::configure_proxy(self.runner, self.ctx).await?;
        let Released {
            recipe,
            environment,
        } = self.state.clone();
        Ok(self.next(Proxied {
            recipe,
            environment,
        }))
    }
}

impl<'a, R: CommandRunner + ?Sized> Pipeline<'a, R, Proxied> {
    pub async fn validate<P>(mut self, external: &P) -> Result<Pipeline<'a, R, Verified>, DeployError>
    where
        P: ExternalProbe + ?Sized,
    {
        verify::validate(
            self.runner,
            self.ctx,
            self.state.recipe,
            external,
            &mut self.diagnostics,
        )
        .await?;
        let Proxied {
            recipe,
            environment,
        } = self.state.clone();
        Ok(self.next(Verified {
            recipe,
            environment,
        }))
    }
}

impl<R: CommandRunner + ?Sized> Pipeline<'_, R, Verified> {
    pub fn finish(self) -> DeploymentReport {
        DeploymentReport {
            recipe: self.state.recipe,
            environment: self.state.environment,
            diagnostics: self.diagnostics,
        }
    }
}

/// Ask the host for the remote user's `$HOME` and place the app directory under it.
///
/// Runs right after connecting, so a failure is a connectivity failure.
pub async fn resolve_home<R>(runner: &R, app: &mut AppTarget) -> Result<(), DeployError>
where
    R: CommandRunner + ?Sized,
{
    let host = app.remote.host.to_string();
    let output = run_step(runner, Invocation::remote_script(r#"echo "$HOME""#), |reason| {
        DeployError::SshConnectivity {
            host: host.clone(),
            reason,
        }
    })
    .await?;

    let home = output.stdout.trim();
    if !home.starts_with('/') || home.contains(char::is_whitespace) {
        return Err(DeployError::SshConnectivity {
            host,
            reason: format!("remote $HOME is not an absolute path: {home:?}"),
        });
    }

    app.set_home(home);
    tracing::info!("remote home of {} is {}", app.remote.user, home);
    Ok(())
}

/// Run every stage in order against an already connected runner.
pub async fn run_pipeline<R, P>(
    runner: &R,
    ctx: &DeploymentContext,
    external: &P,
) -> Result<DeploymentReport, DeployError>
where
    R: CommandRunner + ?Sized,
    P: ExternalProbe + ?Sized,
{
    let report = Pipeline::new(runner, ctx)
        .check_connectivity()
        .await?
        .sync_repository()
        .await?
        .prepare_remote()
        .await?
        .transfer()
        .await?
        .release()
        .await?
        .configure_proxy()
        .await?
        .validate(external)
        .await?
        .finish();

    tracing::info!(
        outcome = "success",
        "deployed {} ({}) to {}",
        ctx.repo_name(),
        report.recipe,
        ctx.remote().host
    );
    Ok(report)
}
