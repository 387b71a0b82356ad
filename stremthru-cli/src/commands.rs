//! Command dispatch, one SDK call per invocation.

use serde::Serialize;
use serde_json::Value;
use stremthru::{Response, StoreApi, StremThru};
use tracing::debug;

use crate::cli::Command;

/// Run a command and return the `data` of its response as JSON.
pub async fn execute(command: &Command, client: &StremThru) -> stremthru::Result<Value> {
    match command {
        Command::Health => into_json(client.health().await?),
        _ => execute_store(command, &client.store()).await,
    }
}

/// Run a store command against any [`StoreApi`] implementation.
async fn execute_store(command: &Command, store: &dyn StoreApi) -> stremthru::Result<Value> {
    debug!(?command, "executing store command");
    match command {
        Command::Health => Err(stremthru::Error::InvalidConfig(
            "health is a server command, not a store command".to_string(),
        )),
        Command::User => into_json(store.get_user().await?),
        Command::AddMagnet { magnet, client_ip } => {
            into_json(store.add_magnet(magnet, client_ip.as_deref()).await?)
        }
        Command::CheckMagnet { magnets, sid } => {
            into_json(store.check_magnet(magnets, sid.as_deref()).await?)
        }
        Command::GetMagnet { id } => into_json(store.get_magnet(id).await?),
        Command::ListMagnets { limit, offset } => {
            into_json(store.list_magnets(*limit, *offset).await?)
        }
        Command::RemoveMagnet { id } => into_json(store.remove_magnet(id).await?),
        Command::GenerateLink { link, client_ip } => {
            into_json(store.generate_link(link, client_ip.as_deref()).await?)
        }
    }
}

fn into_json<T: Serialize>(response: Response<T>) -> stremthru::Result<Value> {
    match response.data {
        Some(data) => Ok(serde_json::to_value(data)?),
        None => Ok(Value::Null),
    }
}
