// ABOUTME: Proxy stage: install an nginx site forwarding port 80 to the application port.
// ABOUTME: The full configuration is syntax-checked before a graceful reload.

use super::error::DeployError;
use super::step::{run_best_effort, run_step};
use crate::context::{AppTarget, DeploymentContext};
use crate::runner::shell::{escape_single_quoted, quote_path};
use crate::runner::{CommandRunner, Invocation};
use crate::types::{AppPort, ServerAddr};

/// Render the virtual host for `server_name`, forwarding to `localhost:port`.
pub fn render_site(server_name: &ServerAddr, port: AppPort) -> String {
    format!(
        r#"server {{
    listen 80;
    server_name {server_name};

    location / {{
        proxy_pass http://localhost:{port};
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection "upgrade";
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
        proxy_cache_bypass $http_upgrade;
    }}
}}
"#
    )
}

/// Shell script writing `contents` to `path` with the needed privileges.
fn write_file_script(app: &AppTarget, path: &str, contents: &str) -> Invocation {
    Invocation::remote_script(format!(
        "printf '%s' '{}' | {}tee {} > /dev/null",
        escape_single_quoted(contents),
        app.sudo(),
        quote_path(path)
    ))
}

pub fn nginx_test(app: &AppTarget) -> Invocation {
    app.privileged("nginx").arg("-t")
}

pub fn nginx_reload(app: &AppTarget) -> Invocation {
    app.privileged("systemctl").args(["reload", "nginx"])
}

/// Write, enable, check and reload the site for this application.
pub async fn configure_proxy<R>(runner: &R, ctx: &DeploymentContext) -> Result<(), DeployError>
where
    R: CommandRunner + ?Sized,
{
    let app = &ctx.target;
    let available = app.site_available().to_string_lossy().into_owned();
    let enabled = app.site_enabled().to_string_lossy().into_owned();
    let site = render_site(&app.remote.host, ctx.app_port);

    run_step(
        runner,
        write_file_script(app, &available, &site),
        DeployError::ProxyConfigWriteFailed,
    )
    .await?;
    run_step(
        runner,
        app.privileged("ln").args(["-sf", &available, &enabled]),
        DeployError::ProxyConfigWriteFailed,
    )
    .await?;

    if app.config.proxy.disable_default {
        let default_site = app.config.proxy.sites_enabled.join("default");
        run_best_effort(
            runner,
            app.privileged("rm")
                .args(["-f", &default_site.to_string_lossy()]),
        )
        .await;
    }

    run_step(runner, nginx_test(app), DeployError::ProxySyntaxFailed).await?;
    run_step(runner, nginx_reload(app), DeployError::ProxyReloadFailed).await?;

    tracing::info!(outcome = "success", "proxy configured for {}", app.repo_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_forwards_to_app_port() {
        let host = ServerAddr::parse("203.0.113.7").unwrap();
        let port = AppPort::parse("3000").unwrap();
        let site = render_site(&host, port);

        assert!(site.contains("listen 80;"));
        assert!(site.contains("server_name 203.0.113.7;"));
        assert!(site.contains("proxy_pass http://localhost:3000;"));
        assert!(site.contains("proxy_set_header Upgrade $http_upgrade;"));
        assert!(site.contains("proxy_set_header Connection \"upgrade\";"));
        assert!(site.contains("X-Forwarded-For $proxy_add_x_forwarded_for"));
        assert!(site.contains("X-Forwarded-Proto $scheme"));
        assert!(site.contains("proxy_set_header Host $host;"));
    }

    #[test]
    fn site_braces_balance() {
        let host = ServerAddr::parse("10.0.0.1").unwrap();
        let site = render_site(&host, AppPort::parse("8080").unwrap());
        assert_eq!(site.matches('{').count(), site.matches('}').count());
    }
}
