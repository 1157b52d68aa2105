// ABOUTME: Integration tests for configuration discovery, parsing and the token variable.
// ABOUTME: Uses temp dirs for config files and temp-env for environment overrides.

use dockhand::config::*;
use dockhand::error::Error;
use secrecy::ExposeSecret;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
defaults:
  repo_url: https://github.com/acme/widget.git
  branch: develop
  user: deploy
  host: 203.0.113.7
  key: ~/.ssh/deploy_ed25519
  port: 8080

workspace: /srv/checkouts
log_dir: /var/log/dockhand
settle_delay: 5s
connect_timeout: 30s
restart: on-failure:3

sync:
  exclude: [.git, target]
  mirror: false

proxy:
  sites_available: /etc/nginx/conf.d/available
  sites_enabled: /etc/nginx/conf.d/enabled
  disable_default: false

git:
  credential_style: oauth2

keep_backup_image: false
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.defaults.branch.as_deref(), Some("develop"));
        assert_eq!(config.defaults.port, Some(8080));
        assert_eq!(config.workspace, PathBuf::from("/srv/checkouts"));
        assert_eq!(config.settle_delay, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.restart, RestartPolicy::OnFailure(Some(3)));
        assert_eq!(config.sync.exclude, vec![".git", "target"]);
        assert!(!config.sync.mirror);
        assert_eq!(
            config.proxy.sites_enabled,
            PathBuf::from("/etc/nginx/conf.d/enabled")
        );
        assert!(!config.proxy.disable_default);
        assert_eq!(config.git.credential_style, CredentialStyle::OAuth2);
        assert!(!config.keep_backup_image);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.settle_delay, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
        assert_eq!(config.restart.to_string(), "unless-stopped");
        assert_eq!(
            config.sync.exclude,
            vec![".git", "*.log", "node_modules", "__pycache__", ".venv"]
        );
        assert_eq!(
            config.proxy.sites_available,
            PathBuf::from("/etc/nginx/sites-available")
        );
        assert_eq!(config.git.credential_style, CredentialStyle::Auto);
    }

    #[test]
    fn bad_credential_style_rejected() {
        assert!(Config::from_yaml("git:\n  credential_style: basic\n").is_err());
    }

    #[test]
    fn token_is_not_a_config_field() {
        assert!(Config::from_yaml("defaults:\n  token: abc\n").is_err());
    }
}

mod discovery {
    use super::*;

    #[test]
    fn no_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.workspace, PathBuf::from("."));
    }

    #[test]
    fn finds_yml_then_yaml_then_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".dockhand")).unwrap();
        fs::write(
            dir.path().join(".dockhand/config.yml"),
            "settle_delay: 3s\n",
        )
        .unwrap();
        assert_eq!(
            Config::discover(dir.path()).unwrap().settle_delay,
            Duration::from_secs(3)
        );

        fs::write(dir.path().join("dockhand.yaml"), "settle_delay: 2s\n").unwrap();
        assert_eq!(
            Config::discover(dir.path()).unwrap().settle_delay,
            Duration::from_secs(2)
        );

        fs::write(dir.path().join("dockhand.yml"), "settle_delay: 1s\n").unwrap();
        assert_eq!(
            Config::discover(dir.path()).unwrap().settle_delay,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn invalid_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dockhand.yml");
        fs::write(&path, "restart: sometimes\n").unwrap();

        match Config::discover(dir.path()) {
            Err(Error::InvalidConfig { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn explicit_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(&dir.path().join("absent.yml")),
            Err(Error::ConfigNotFound(_))
        ));
    }
}

mod token {
    use super::*;

    #[test]
    fn token_read_from_environment() {
        temp_env::with_var(TOKEN_ENV, Some("glpat-123"), || {
            let token = token_from_env().unwrap();
            assert_eq!(token.expose_secret(), "glpat-123");
        });
    }

    #[test]
    fn blank_or_missing_token_is_none() {
        temp_env::with_var(TOKEN_ENV, Some("  "), || {
            assert!(token_from_env().is_none());
        });
        temp_env::with_var_unset(TOKEN_ENV, || {
            assert!(token_from_env().is_none());
        });
    }
}
