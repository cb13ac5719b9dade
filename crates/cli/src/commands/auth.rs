//! Auth commands - account registration and session inspection

use anyhow::{Context, Result, bail};
use newsdesk_adapters::identity::{CognitoIdentityProvider, StubIdentityProvider};
use newsdesk_domain::store::UserStore;
use newsdesk_domain::{IdentityProvider, UserInfo};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::{AuthArgs, AuthCommands};
use crate::config::AppConfig;

pub async fn execute(args: AuthArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let identity = build_identity_provider(&config)?;
    let store = UserStore::new(identity);

    match args.command {
        AuthCommands::Signup {
            username,
            password,
            nickname,
        } => {
            let password = resolve_password(password)?;
            let handle = store
                .sign_up(&username, &password, nickname.as_deref())
                .await
                .context("Sign-up failed")?;

            if handle.confirmed {
                println!("Account {} created.", handle.username);
            } else {
                println!(
                    "Account {} created; confirmation pending.",
                    handle.username
                );
            }
            Ok(())
        }

        AuthCommands::Signin { username, password } => {
            let password = resolve_password(password)?;
            store
                .sign_in(&username, &password)
                .await
                .context("Sign-in failed")?;

            match store.state().user {
                Some(user) => println!("Signed in as {}.", display_name(&user)),
                None => println!("Signed in."),
            }
            Ok(())
        }

        AuthCommands::Signout => {
            if store.sign_out().await.context("Sign-out failed")? {
                println!("Signed out.");
            } else {
                println!("No active session.");
            }
            Ok(())
        }

        AuthCommands::Whoami { json } => {
            let user = store
                .load_user()
                .await
                .context("Failed to load user info")?;

            match user {
                Some(user) if json => println!("{}", serde_json::to_string_pretty(&user)?),
                Some(user) => {
                    println!("Signed in as {}.", display_name(&user));
                    if let Some(email) = &user.email {
                        println!("Email: {}", email);
                    }
                }
                None if json => println!("null"),
                None => println!("Not signed in."),
            }
            Ok(())
        }
    }
}

pub(crate) fn build_identity_provider(config: &AppConfig) -> Result<Arc<dyn IdentityProvider>> {
    match config.identity.provider.as_str() {
        "cognito" => {
            let client_id = config.identity.client_id.trim();
            if client_id.is_empty() {
                bail!("Cognito client_id is required for the cognito provider");
            }

            let provider = match config.identity.endpoint.as_deref().map(str::trim) {
                Some(endpoint) if !endpoint.is_empty() => {
                    CognitoIdentityProvider::with_endpoint(
                        endpoint.to_string(),
                        client_id.to_string(),
                    )
                }
                _ => CognitoIdentityProvider::new(
                    config.identity.region.trim(),
                    client_id.to_string(),
                ),
            };
            Ok(Arc::new(provider))
        }
        "stub" => Ok(Arc::new(StubIdentityProvider::new())),
        other => bail!("Unknown identity provider: {}", other),
    }
}

fn display_name(user: &UserInfo) -> &str {
    user.nickname.as_deref().unwrap_or(&user.username)
}

fn resolve_password(password: Option<String>) -> Result<SecretString> {
    let Some(password) = password else {
        bail!("No password given; pass --password or set NEWSDESK_PASSWORD");
    };
    if password.trim().is_empty() {
        bail!("Password must not be empty");
    }
    Ok(SecretString::new(password.into()))
}
