// ABOUTME: Repository stage: clone or update the local working copy of the branch.
// ABOUTME: The access token only travels inside command arguments, never into .git/config.

use super::error::DeployError;
use super::recipe::Recipe;
use super::step::run_step;
use crate::config::CredentialStyle;
use crate::context::DeploymentContext;
use crate::diagnostics::{Diagnostics, Warning};
use crate::runner::{CommandRunner, Invocation};
use crate::types::RepoUrl;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;

/// Known repository host families, keyed by how they accept a token in a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFamily {
    /// Token as the username.
    GitHub,
    /// `oauth2` as the username, token as the password.
    GitLab,
    /// Unrecognised host; token as the username.
    Generic,
}

impl HostFamily {
    pub fn detect(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        if host == "github.com" || host.ends_with(".github.com") {
            HostFamily::GitHub
        } else if host == "gitlab.com" || host.split('.').next() == Some("gitlab") {
            HostFamily::GitLab
        } else {
            HostFamily::Generic
        }
    }
}

/// Embed the token in the URL's credential slot.
///
/// An explicit `style` overrides host detection. Returns the family used so
/// the caller can report the generic fallback.
pub fn authenticated_url(
    url: &RepoUrl,
    token: &SecretString,
    style: CredentialStyle,
) -> Result<(SecretString, HostFamily), crate::types::RepoUrlError> {
    let family = match style {
        CredentialStyle::Auto => HostFamily::detect(url.host()),
        CredentialStyle::Token => HostFamily::GitHub,
        CredentialStyle::OAuth2 => HostFamily::GitLab,
    };

    let secret = match family {
        HostFamily::GitLab => url.with_credentials("oauth2", Some(token.expose_secret()))?,
        HostFamily::GitHub | HostFamily::Generic => {
            url.with_credentials(token.expose_secret(), None)?
        }
    };

    Ok((secret, family))
}

fn git(dir: &Path) -> Invocation {
    Invocation::local("git")
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
}

/// Bring the local working copy to the tip of the requested branch.
pub async fn sync_repository<R>(
    runner: &R,
    ctx: &DeploymentContext,
    diagnostics: &mut Diagnostics,
) -> Result<(), DeployError>
where
    R: CommandRunner + ?Sized,
{
    let style = ctx.config().git.credential_style;
    let auth = authenticated_url(&ctx.repo_url, &ctx.access_token, style);

    let repo_dir = ctx.local_repo_dir();
    let branch = ctx.branch.as_str();

    if repo_dir.exists() {
        let (auth_url, family) = auth.map_err(|e| DeployError::FetchFailed(e.to_string()))?;
        report_family(family, &ctx.repo_url, style, diagnostics);
        enter(repo_dir)?;

        tracing::info!("updating existing working copy at {}", repo_dir.display());
        run_step(
            runner,
            git(repo_dir)
                .arg("fetch")
                .secret_arg(SecretString::from(auth_url.expose_secret().to_owned()))
                .arg("+refs/heads/*:refs/remotes/origin/*"),
            DeployError::FetchFailed,
        )
        .await?;
        checkout(runner, repo_dir, branch).await?;
        run_step(
            runner,
            git(repo_dir)
                .args(["pull", "--ff-only"])
                .secret_arg(auth_url)
                .arg(branch),
            |reason| DeployError::PullFailed {
                branch: branch.to_string(),
                reason,
            },
        )
        .await?;
    } else {
        let (auth_url, family) = auth.map_err(|e| DeployError::CloneFailed(e.to_string()))?;
        report_family(family, &ctx.repo_url, style, diagnostics);

        let parent = repo_dir.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| DeployError::ChangeDirectory {
            path: parent.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::info!("cloning {} into {}", ctx.repo_url, repo_dir.display());
        run_step(
            runner,
            git(parent)
                .arg("clone")
                .secret_arg(auth_url)
                .arg(repo_dir.to_string_lossy()),
            DeployError::CloneFailed,
        )
        .await?;
        run_step(
            runner,
            git(repo_dir).args(["remote", "set-url", "origin", ctx.repo_url.as_str()]),
            DeployError::CloneFailed,
        )
        .await?;
        checkout(runner, repo_dir, branch).await?;
    }

    tracing::info!(outcome = "success", "repository synced on branch {}", branch);
    Ok(())
}

/// Inspect the synced tree for a build recipe.
pub fn detect_docker_config(ctx: &DeploymentContext) -> Result<Recipe, DeployError> {
    let recipe = Recipe::detect(ctx.local_repo_dir())?;
    tracing::info!("build recipe: {}", recipe);
    Ok(recipe)
}

async fn checkout<R>(runner: &R, repo_dir: &Path, branch: &str) -> Result<(), DeployError>
where
    R: CommandRunner + ?Sized,
{
    run_step(runner, git(repo_dir).args(["checkout", branch]), |reason| {
        DeployError::CheckoutFailed {
            branch: branch.to_string(),
            reason,
        }
    })
    .await
    .map(|_| ())
}

/// The existing path must be a directory we can list.
fn enter(repo_dir: &Path) -> Result<(), DeployError> {
    let fail = |reason: String| DeployError::ChangeDirectory {
        path: repo_dir.to_path_buf(),
        reason,
    };
    if !repo_dir.is_dir() {
        return Err(fail("not a directory".to_string()));
    }
    std::fs::read_dir(repo_dir).map_err(|e| fail(e.to_string()))?;
    Ok(())
}

fn report_family(
    family: HostFamily,
    url: &RepoUrl,
    style: CredentialStyle,
    diagnostics: &mut Diagnostics,
) {
    if family == HostFamily::Generic && style == CredentialStyle::Auto {
        diagnostics.warn(Warning::credential_fallback(format!(
            "unrecognised repository host {}; embedding the token as the URL username \
             (set git.credential_style to override)",
            url.host()
        )));
    }
}
