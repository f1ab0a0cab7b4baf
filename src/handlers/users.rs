// src/handlers/users.rs

use clap::Subcommand;

use crate::{
    common::{error::AppError, rbac::Action},
    config::AppState,
    handlers::{print_json, require},
    models::{auth::Role, user::UserPayload},
};
use validator::Validate;

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// Lista os usuários (ADM)
    List,
    /// Cadastra um usuário e vincula às igrejas informadas (ADM)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        /// ADM ou USUARIO
        #[arg(long)]
        role: Role,
        #[arg(long)]
        password: String,
        /// Id de igreja vinculada (repetível)
        #[arg(long = "church")]
        churches: Vec<i64>,
    },
}

pub async fn run(state: &AppState, command: UsersCommand, json: bool) -> Result<(), AppError> {
    match command {
        UsersCommand::List => {
            require(state, Action::ManageUsers)?;
            let users = state.user_service.list_users().await?;
            if json {
                return print_json(&users);
            }
            for user in &users {
                let status = if user.is_active { "" } else { " (inativo)" };
                println!(
                    "{:<6} {:<30} {:<30} {}{}",
                    user.id, user.name, user.email, user.role, status
                );
            }
            Ok(())
        }
        UsersCommand::Create {
            name,
            email,
            phone,
            role,
            password,
            churches,
        } => {
            require(state, Action::ManageUsers)?;
            let payload = UserPayload {
                name,
                email,
                phone,
                role,
                is_active: true,
                password,
                church_ids: churches,
            };
            payload.validate()?;

            let user = state.user_service.create_user(&payload).await?;
            println!("Usuário #{} '{}' cadastrado.", user.id, user.name);
            Ok(())
        }
    }
}
