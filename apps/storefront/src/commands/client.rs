//! # Client Commands
//!
//! Client records, balances and account statements.
//!
//! Balances are always replayed from orders and payments. A balance sent
//! in with a client record is ignored.

use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::{PersistJob, Storefront};
use loom_core::ledger::{self, LedgerScope, StatementRow};
use loom_core::{Client, ValidationError};

/// Creates or updates a client record.
pub async fn save_client(sf: &Storefront, mut client: Client) -> ApiResult<Client> {
    debug!(client_id = %client.id, "save_client command");

    if client.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "client id".to_string(),
        }
        .into());
    }
    if client.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "client name".to_string(),
        }
        .into());
    }

    let client = sf.with_data(|data| {
        client.balance = ledger::sync_balance(&client.id, &data.orders);
        match data.clients.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => *existing = client.clone(),
            None => data.clients.push(client.clone()),
        }
        client
    });

    info!(client_id = %client.id, balance = %client.balance, "Client saved");
    sf.persist(vec![PersistJob::UpsertClient(client.clone())]).await;
    Ok(client)
}

pub fn list_clients(sf: &Storefront) -> Vec<Client> {
    debug!("list_clients command");
    sf.with_data(|data| data.clients.clone())
}

pub fn get_client(sf: &Storefront, client_id: &str) -> ApiResult<Client> {
    debug!(client_id = %client_id, "get_client command");
    sf.with_data(|data| data.client(client_id).cloned())
        .ok_or_else(|| ApiError::not_found("Client", client_id))
}

/// Replays the client's balance from their orders and stores the result.
pub async fn sync_client_balance(sf: &Storefront, client_id: &str) -> ApiResult<Client> {
    debug!(client_id = %client_id, "sync_client_balance command");

    let client = sf
        .with_data(|data| ledger::apply_balance(&mut data.clients, client_id, &data.orders))
        .ok_or_else(|| ApiError::not_found("Client", client_id))?;

    sf.persist(vec![PersistJob::UpsertClient(client.clone())]).await;
    Ok(client)
}

/// Replays every client's balance. Returns how many clients were updated.
pub async fn sync_all_balances(sf: &Storefront) -> usize {
    debug!("sync_all_balances command");

    let jobs: Vec<PersistJob> = sf.with_data(|data| {
        let ids: Vec<String> = data.clients.iter().map(|c| c.id.clone()).collect();
        ids.iter()
            .filter_map(|id| ledger::apply_balance(&mut data.clients, id, &data.orders))
            .map(PersistJob::UpsertClient)
            .collect()
    });

    let count = jobs.len();
    info!(clients = count, "Balances recomputed");
    sf.persist(jobs).await;
    count
}

/// Statement rows for one client, oldest first.
pub fn client_statement(sf: &Storefront, client_id: &str) -> ApiResult<Vec<StatementRow>> {
    debug!(client_id = %client_id, "client_statement command");

    sf.with_data(|data| {
        if data.client(client_id).is_none() {
            return Err(ApiError::not_found("Client", client_id));
        }
        Ok(ledger::generate_ledger(
            &data.orders,
            &data.clients,
            &LedgerScope::Client(client_id.to_string()),
        ))
    })
}

/// Statement rows for every client, interleaved by date.
pub fn all_statements(sf: &Storefront) -> Vec<StatementRow> {
    debug!("all_statements command");
    sf.with_data(|data| ledger::generate_ledger(&data.orders, &data.clients, &LedgerScope::All))
}

// =============================================================================
// Unit Tests
// =============================================================================
