// src/handlers/auth.rs

use crate::{common::error::AppError, config::AppState, handlers::print_json};

pub async fn login(state: &AppState, username: &str, password: &str) -> Result<(), AppError> {
    state.session.login(username, password).await?;
    let role = state
        .session
        .role()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "desconhecido".to_string());
    println!("Login efetuado. Papel: {role}");
    Ok(())
}

pub fn logout(state: &AppState) -> Result<(), AppError> {
    state.session.logout()?;
    println!("Sessão encerrada.");
    Ok(())
}

// Mostra o perfil do usuário autenticado, incluindo as igrejas vinculadas.
pub async fn whoami(state: &AppState, json: bool) -> Result<(), AppError> {
    if !state.session.is_authenticated() {
        println!("Nenhuma sessão ativa. Use `cns-admin login`.");
        return Ok(());
    }

    let me = state.user_service.me().await?;
    if json {
        return print_json(&me);
    }

    println!("{} <{}> ({})", me.name, me.email, me.role);
    if me.churches.is_empty() {
        println!("Nenhuma igreja vinculada.");
    } else {
        println!("Igrejas:");
        for church in &me.churches {
            println!("  #{} {} - {}", church.id, church.name, church.city);
        }
    }
    Ok(())
}
