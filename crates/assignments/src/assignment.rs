//! Assignment rows and full-replace planning.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use veridoc_core::{EmailAddress, EngineResult};

/// One client-to-operator assignment row.
///
/// Many operators may be assigned to one client. Rows carry provenance but
/// no expiry; they only change through full replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAssignment {
    pub client: EmailAddress,
    pub operator: EmailAddress,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: EmailAddress,
}

/// Normalize a raw operator email list: trim, lowercase, dedupe.
///
/// All-or-nothing: one malformed address fails the whole call, so a partial
/// set is never applied.
pub fn normalize_operator_emails(raw: &[String]) -> EngineResult<BTreeSet<EmailAddress>> {
    raw.iter().map(|s| EmailAddress::parse(s)).collect()
}

/// The outcome of planning a full assignment replacement for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementPlan {
    pub client: EmailAddress,
    /// The normalized target set.
    pub operators: BTreeSet<EmailAddress>,
    /// True when the normalized target equals the normalized existing set
    /// (order-independent); the service skips the write entirely.
    pub is_noop: bool,
}

impl ReplacementPlan {
    /// Materialize the replacement rows. Empty when the plan is a no-op.
    pub fn into_rows(self, assigned_by: EmailAddress, now: DateTime<Utc>) -> Vec<ClientAssignment> {
        self.operators
            .into_iter()
            .map(|operator| ClientAssignment {
                client: self.client.clone(),
                operator,
                assigned_at: now,
                assigned_by: assigned_by.clone(),
            })
            .collect()
    }
}

/// Plan a full replacement of a client's assignment rows.
///
/// The existing rows are reduced to their operator set and diffed against
/// the normalized request as sets, so `[a, b]` and `[b, a]` plan identically.
pub fn plan_replacement(
    client: EmailAddress,
    existing: &[ClientAssignment],
    requested: &[String],
) -> EngineResult<ReplacementPlan> {
    let operators = normalize_operator_emails(requested)?;
    let current: BTreeSet<EmailAddress> = existing
        .iter()
        .filter(|row| row.client == client)
        .map(|row| row.operator.clone())
        .collect();

    let is_noop = current == operators;

    Ok(ReplacementPlan {
        client,
        operators,
        is_noop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn email(s: &str) -> EmailAddress {
        EmailAddress::parse(s).unwrap()
    }

    fn row(client: &str, operator: &str) -> ClientAssignment {
        ClientAssignment {
            client: email(client),
            operator: email(operator),
            assigned_at: Utc::now(),
            assigned_by: email("admin@veridoc.test"),
        }
    }

    #[test]
    fn normalize_trims_lowercases_and_dedupes() {
        let set = normalize_operator_emails(&[
            "  A@x.test ".to_string(),
            "a@x.test".to_string(),
            "b@x.test".to_string(),
        ])
        .unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&email("a@x.test")));
    }

    #[test]
    fn normalize_fails_whole_call_on_one_bad_address() {
        assert!(normalize_operator_emails(&["a@x.test".to_string(), "nope".to_string()]).is_err());
    }

    #[test]
    fn equal_sets_plan_a_noop_regardless_of_order() {
        let existing = vec![row("c@x.test", "a@x.test"), row("c@x.test", "b@x.test")];
        let plan = plan_replacement(
            email("c@x.test"),
            &existing,
            &["B@x.test ".to_string(), "a@x.test".to_string()],
        )
        .unwrap();
        assert!(plan.is_noop);
    }

    #[test]
    fn changed_set_plans_a_replacement() {
        let existing = vec![row("c@x.test", "a@x.test")];
        let plan = plan_replacement(
            email("c@x.test"),
            &existing,
            &["a@x.test".to_string(), "b@x.test".to_string()],
        )
        .unwrap();
        assert!(!plan.is_noop);
        assert_eq!(plan.operators.len(), 2);
    }

    #[test]
    fn rows_for_other_clients_are_ignored_when_diffing() {
        let existing = vec![row("other@x.test", "a@x.test")];
        let plan = plan_replacement(email("c@x.test"), &existing, &[]).unwrap();
        assert!(plan.is_noop);
        assert!(plan.operators.is_empty());
    }

    #[test]
    fn into_rows_materializes_the_target_set() {
        let plan = plan_replacement(
            email("c@x.test"),
            &[],
            &["a@x.test".to_string(), "b@x.test".to_string()],
        )
        .unwrap();
        let now = Utc::now();
        let rows = plan.into_rows(email("admin@veridoc.test"), now);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.client == email("c@x.test") && r.assigned_at == now));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: planning is order-independent over the requested list.
        #[test]
        fn plan_is_order_independent(
            mut addrs in prop::collection::vec("[a-z]{1,8}@[a-z]{1,8}\\.test", 0..8),
        ) {
            let forward = plan_replacement(email("c@x.test"), &[], &addrs).unwrap();
            addrs.reverse();
            let backward = plan_replacement(email("c@x.test"), &[], &addrs).unwrap();
            prop_assert_eq!(forward.operators, backward.operators);
        }
    }
}
