//! Operator visibility scope over clients.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use veridoc_access::{AdminLevel, OperatorAccount};
use veridoc_core::EmailAddress;

use crate::assignment::ClientAssignment;

/// The set of clients an operator may see.
///
/// `Unrestricted` is a sentinel: no filtering happens at all, which keeps
/// "all clients" cheap and avoids materializing the full client list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "clients")]
pub enum ClientScope {
    Unrestricted,
    Restricted(BTreeSet<EmailAddress>),
}

impl ClientScope {
    /// Compute the scope for an operator given the full assignment table.
    ///
    /// Only `AreaAccountant` operators are restricted; every other level
    /// sees everything.
    pub fn for_operator(operator: &OperatorAccount, assignments: &[ClientAssignment]) -> ClientScope {
        if operator.level != AdminLevel::AreaAccountant {
            return ClientScope::Unrestricted;
        }

        let clients = assignments
            .iter()
            .filter(|row| row.operator == operator.email)
            .map(|row| row.client.clone())
            .collect();

        ClientScope::Restricted(clients)
    }

    pub fn allows(&self, client: &EmailAddress) -> bool {
        match self {
            ClientScope::Unrestricted => true,
            ClientScope::Restricted(clients) => clients.contains(client),
        }
    }

    /// Apply the scope to a client list. The unrestricted sentinel passes
    /// everything through unchanged.
    pub fn filter_clients(&self, clients: Vec<EmailAddress>) -> Vec<EmailAddress> {
        match self {
            ClientScope::Unrestricted => clients,
            ClientScope::Restricted(_) => clients
                .into_iter()
                .filter(|client| self.allows(client))
                .collect(),
        }
    }
}
