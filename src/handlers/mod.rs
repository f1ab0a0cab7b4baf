// src/handlers/mod.rs

pub mod auth;
pub mod catalog;
pub mod churches;
pub mod orders;
pub mod stock;
pub mod users;

use std::io::{BufRead, Write};

use crate::{
    common::{
        error::AppError,
        rbac::{Action, role_allows},
    },
    config::AppState,
};

// Guarda de interface: esconde do usuário o que o papel dele não permite.
// O servidor revalida de qualquer forma.
pub fn require(state: &AppState, action: Action) -> Result<(), AppError> {
    let role = state.session.role().ok_or(AppError::AuthExpired)?;
    if !role_allows(role, action) {
        return Err(AppError::Forbidden(action.label().to_string()));
    }
    Ok(())
}

// Confirmação explícita antes de ações irreversíveis (aprovar, entregar,
// excluir). `--yes` pula o prompt em uso não interativo.
pub fn confirm(prompt: &str) -> Result<bool, AppError> {
    print!("{prompt} [s/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "s" || answer == "sim")
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
