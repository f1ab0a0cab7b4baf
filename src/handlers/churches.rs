// src/handlers/churches.rs

use clap::Subcommand;

use crate::{
    common::{error::AppError, rbac::Action},
    config::AppState,
    handlers::{confirm, print_json, require},
    models::church::ChurchPayload,
};
use validator::Validate;

#[derive(Debug, Subcommand)]
pub enum ChurchesCommand {
    /// Lista as igrejas
    List,
    /// Lista as cidades com igrejas cadastradas
    Cities,
    /// Cadastra uma igreja (ADM)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
    },
    /// Atualiza nome e cidade de uma igreja (ADM)
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
    },
    /// Remove uma igreja (ADM)
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(state: &AppState, command: ChurchesCommand, json: bool) -> Result<(), AppError> {
    match command {
        ChurchesCommand::List => {
            let churches = state.church_service.list_churches().await?;
            if json {
                return print_json(&churches);
            }
            for church in &churches {
                println!("{:<6} {:<40} {}", church.id, church.name, church.city);
            }
            Ok(())
        }
        ChurchesCommand::Cities => {
            let cities = state.church_service.list_cities().await?;
            if json {
                return print_json(&cities);
            }
            for city in &cities {
                println!("{city}");
            }
            Ok(())
        }
        ChurchesCommand::Create { name, city } => {
            require(state, Action::ManageChurches)?;
            let payload = ChurchPayload { name, city };
            payload.validate()?;

            let church = state.church_service.create_church(&payload).await?;
            println!("Igreja #{} '{}' cadastrada.", church.id, church.name);
            Ok(())
        }
        ChurchesCommand::Update { id, name, city } => {
            require(state, Action::ManageChurches)?;
            let payload = ChurchPayload { name, city };
            payload.validate()?;

            let church = state.church_service.update_church(id, &payload).await?;
            println!("Igreja #{} atualizada.", church.id);
            Ok(())
        }
        ChurchesCommand::Delete { id, yes } => {
            require(state, Action::ManageChurches)?;
            if !yes && !confirm(&format!("Confirma a exclusão da igreja #{id}?"))? {
                println!("Operação cancelada.");
                return Ok(());
            }
            state.church_service.delete_church(id).await?;
            println!("Igreja #{id} removida.");
            Ok(())
        }
    }
}
