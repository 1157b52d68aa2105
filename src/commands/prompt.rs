// ABOUTME: Interactive collection of deployment answers with dialoguer.
// ABOUTME: Every answer is re-asked until it passes its validator; runs on a blocking thread.

use dialoguer::{Confirm, Input, Password};
use dockhand::config::PromptDefaults;
use dockhand::context::{DeployInput, RemoteTarget};
use dockhand::error::Result;
use dockhand::types::{
    AppPort, Branch, DEFAULT_BRANCH, KeyPath, RemoteUser, RepoUrl, ServerAddr,
};
use secrecy::SecretString;
use std::fmt::Display;

const DEFAULT_KEY: &str = "~/.ssh/id_rsa";

/// Ask until `parse` accepts the answer.
fn ask<T, E, F>(prompt: &str, default: Option<String>, parse: F) -> Result<T>
where
    E: Display,
    F: Fn(&str) -> std::result::Result<T, E>,
{
    loop {
        let mut input = Input::<String>::new()
            .with_prompt(prompt)
            .validate_with(|answer: &String| -> std::result::Result<(), String> {
                parse(answer.trim()).map(|_| ()).map_err(|e| e.to_string())
            });
        if let Some(default) = &default {
            input = input.default(default.clone());
        }

        let answer = input.interact_text()?;
        if let Ok(value) = parse(answer.trim()) {
            return Ok(value);
        }
    }
}

pub fn repo_url(defaults: &PromptDefaults) -> Result<RepoUrl> {
    ask("Repository URL", defaults.repo_url.clone(), RepoUrl::parse)
}

fn remote_target(defaults: &PromptDefaults) -> Result<RemoteTarget> {
    let user = ask(
        "Remote username",
        Some(defaults.user.clone().unwrap_or_else(|| "root".to_string())),
        RemoteUser::parse,
    )?;
    let host = ask("Remote host (IPv4)", defaults.host.clone(), ServerAddr::parse)?;
    let key = ask(
        "SSH private key",
        Some(defaults.key.clone().unwrap_or_else(|| DEFAULT_KEY.to_string())),
        KeyPath::resolve,
    )?;
    Ok(RemoteTarget::new(user, host, key))
}

/// Answers for a deploy, in prompt order.
pub fn deploy_input(defaults: &PromptDefaults, token: Option<SecretString>) -> Result<DeployInput> {
    let repo_url = repo_url(defaults)?;

    let access_token = match token {
        Some(token) => {
            tracing::info!("using access token from the environment");
            token
        }
        None => SecretString::from(Password::new().with_prompt("Access token").interact()?),
    };

    let branch = ask(
        "Branch",
        Some(
            defaults
                .branch
                .clone()
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        ),
        Branch::parse,
    )?;
    let remote = remote_target(defaults)?;
    let app_port = ask(
        "Application port",
        defaults.port.map(|p| p.to_string()),
        AppPort::parse,
    )?;

    Ok(DeployInput {
        repo_url,
        access_token,
        branch,
        remote,
        app_port,
    })
}

/// Answers identifying a previous deployment.
pub fn cleanup_input(defaults: &PromptDefaults) -> Result<(RepoUrl, RemoteTarget)> {
    let repo_url = repo_url(defaults)?;
    let remote = remote_target(defaults)?;
    Ok((repo_url, remote))
}

pub fn confirm(message: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()?)
}
