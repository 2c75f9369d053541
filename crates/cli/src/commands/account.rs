//! Account commands.

use secrecy::SecretString;

use bazaar_storefront::Storefront;
use bazaar_storefront::api::Registration;
use bazaar_storefront::error::{clear_sentry_user, set_sentry_user};

use super::RegisterArgs;
use crate::error::CliError;
use crate::output;

pub async fn register(shop: &Storefront, args: RegisterArgs) -> Result<(), CliError> {
    let registration = Registration {
        username: args.username,
        email: args.email,
        first_name: args.first_name,
        last_name: args.last_name,
        password: args.password,
    };
    shop.auth().register(&registration).await?;
    output::line("Account created. You can sign in now.");
    Ok(())
}

pub async fn login(shop: &Storefront, username: &str, password: String) -> Result<(), CliError> {
    let password = SecretString::from(password);
    let state = shop.auth().login(username, &password).await?;

    if let Some(user) = &state.user {
        set_sentry_user(&user.username, Some(user.email.as_str()).filter(|e| !e.is_empty()));
        output::line(&format!("Signed in as {}.", user.display_name()));
    }
    if state.is_admin {
        output::line("Admin tools enabled.");
    }

    let items = shop.cart().item_count();
    if items > 0 {
        output::line(&format!("Your cart has {items} item(s)."));
    }
    Ok(())
}

pub async fn logout(shop: &Storefront) -> Result<(), CliError> {
    shop.auth().logout().await?;
    clear_sentry_user();
    output::line("Signed out.");
    Ok(())
}

pub fn whoami(shop: &Storefront) {
    let state = shop.session().state();
    match &state.user {
        Some(user) if state.is_logged_in => {
            let role = if state.is_admin { " (admin)" } else { "" };
            output::line(&format!("{}{role}", user.username));
        }
        _ => output::line("Not signed in."),
    }
}

pub async fn forgot_password(shop: &Storefront, email: &str) -> Result<(), CliError> {
    shop.auth().forgot_password(email).await?;
    output::line("If an account exists for that address, a reset link is on its way.");
    Ok(())
}

pub async fn reset_password(
    shop: &Storefront,
    token: &str,
    password: String,
) -> Result<(), CliError> {
    shop.auth()
        .reset_password(token, &SecretString::from(password))
        .await?;
    output::line("Password changed. You can sign in now.");
    Ok(())
}
