//! Participant wallet snapshot.

use serde::{Deserialize, Serialize};

use crate::IdentityId;

/// A participant's wallet as resolved by the account subsystem.
///
/// This is a read-only snapshot taken at computation time; the engine
/// never mutates wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub identity_id: IdentityId,
    pub address: String,
    pub enabled: bool,
    pub initialized: bool,
    pub deleted: bool,
}

impl Wallet {
    /// A wallet can receive rewards only when it is enabled,
    /// initialized, not deleted, and carries an address.
    pub fn can_receive(&self) -> bool {
        self.enabled && self.initialized && !self.deleted && !self.address.is_empty()
    }
}
