use crate::events::EmitEvent;
use keystore_validator::authorizer::VerifyUpdate;
use log::{debug, info, warn};
use state::config::KeystoreConfig;
use state::error::KeystoreError;
use state::keystore_record::{effective_current, Address, Id, KeystoreRecord, ValueHash};
use state::update::{RecordUpdated, UpdateRequest};
use state_management::state_management::{ManageState, StateManager};

/// Orchestrates record updates: applies the bootstrap rule, delegates to the authorizer and
/// commits the new value hash.
///
/// # Generic Parameters
/// - `M`: the `ManageState` backend holding the records.
/// - `V`: the `VerifyUpdate` implementation that decides whether a transition is authorized.
/// - `E`: the `EmitEvent` sink notified after each committed update.
///
/// # Fields
/// - `state_manager`: the record store.
/// - `authorizer`: verification strategy, never mutates the store.
/// - `events`: receives exactly one `RecordUpdated` per committed update.
/// - `max_swap_attempts`: how many times a lost compare-and-swap is re-verified before giving up.
pub struct Keystore<M, V, E>
where
    M: ManageState<Record = KeystoreRecord>,
    V: VerifyUpdate,
    E: EmitEvent,
{
    state_manager: StateManager<M>,
    authorizer: V,
    events: E,
    max_swap_attempts: u32,
}

impl<M, V, E> Keystore<M, V, E>
where
    M: ManageState<Record = KeystoreRecord>,
    V: VerifyUpdate,
    E: EmitEvent,
{
    pub fn new(state_manager: StateManager<M>, authorizer: V, events: E, max_swap_attempts: u32) -> Self {
        Self {
            state_manager,
            authorizer,
            events,
            max_swap_attempts: max_swap_attempts.max(1),
        }
    }

    pub fn from_config(config: &KeystoreConfig, authorizer: V, events: E) -> Result<Self, KeystoreError> {
        let state_manager = StateManager::<M>::new(config)?;
        Ok(Self::new(state_manager, authorizer, events, config.max_swap_attempts))
    }

    /// Move `(id, account)` to `request.new_value_hash` if the authorizer approves.
    ///
    /// Nothing is written and no event is emitted on any error. The write is a compare-and-swap
    /// against the value that was verified, so a concurrent update that lands first forces a
    /// fresh read and verification.
    pub fn update(&self, request: &UpdateRequest) -> Result<(), KeystoreError> {
        if request.new_value_hash.is_zero() {
            return Err(KeystoreError::MalformedInput(
                "the zero value hash is reserved for unset records".to_string(),
            ));
        }

        for attempt in 1..=self.max_swap_attempts {
            let stored = self.state_manager.get(&request.id, &request.account)?;
            let current = effective_current(stored, &request.id);

            if let Err(error) = self.authorizer.verify(request, &current) {
                warn!(
                    "Rejected update of {}/{}: {}",
                    request.id, request.account, error
                );
                return Err(error);
            }

            let swapped = self.state_manager.swap(
                &request.id,
                &request.account,
                stored.as_ref(),
                &request.new_value_hash,
            )?;
            if swapped {
                let event = RecordUpdated {
                    id: request.id,
                    account: request.account,
                    new_value_hash: request.new_value_hash,
                };
                self.events.emit(&event);
                info!(
                    "Updated {}/{} to {}",
                    request.id, request.account, request.new_value_hash
                );
                return Ok(());
            }
            debug!(
                "Record {}/{} changed during update (attempt {}), re-verifying",
                request.id, request.account, attempt
            );
        }

        Err(KeystoreError::Storage(format!(
            "record {}/{} kept changing after {} attempts",
            request.id, request.account, self.max_swap_attempts
        )))
    }

    /// Raw stored value hash, zero if the record was never written. Does not apply the
    /// bootstrap rule.
    pub fn records(&self, id: &Id, account: &Address) -> Result<[u8; 32], KeystoreError> {
        Ok(self.state_manager.records(id, account)?)
    }

    /// The value hash the next update of `(id, account)` must justify.
    pub fn effective_value_hash(&self, id: &Id, account: &Address) -> Result<ValueHash, KeystoreError> {
        let stored = self.state_manager.get(id, account)?;
        Ok(effective_current(stored, id))
    }

    pub fn accounts(&self, id: &Id) -> Result<Vec<KeystoreRecord>, KeystoreError> {
        Ok(self.state_manager.accounts(id)?)
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn commit(&self) -> Result<(), KeystoreError> {
        Ok(self.state_manager.commit()?)
    }
}
