//! Employee and membership cards.

use crate::blockchain::responses::{ExecutionResponse, ObjectData};
use crate::blockchain::transaction::{BuilderResult, TransactionBuilder};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ObjectId, SuiAddress};
use crate::blockchain::wallet::Wallet;
use crate::suispresso::{target, Suispresso, MEMBERSHIP_MODULE, SUISPRESSO_MODULE};

/// Fully qualified Move type of an employee card.
pub fn employee_card_type(package: ObjectId) -> String {
    format!("{}::{}::EmployeeCard", package, SUISPRESSO_MODULE)
}

/// One call to `suispresso::new_employee_card`.
pub fn mint_employee_card_transaction(package: ObjectId) -> BuilderResult<TransactionBuilder> {
    let mut tx = TransactionBuilder::new();
    tx.move_call(
        target(package, SUISPRESSO_MODULE, "new_employee_card")?,
        vec![],
        vec![],
    )?;
    Ok(tx)
}

/// Mint a card, register it as a membership for `member`, then hand the card back.
///
/// `new_employee_card` returns the card and a receipt that has to be
/// consumed by `transfer_employee_card` in the same transaction.
pub fn mint_membership_card_transaction(
    package: ObjectId,
    name: &str,
    member: SuiAddress,
) -> BuilderResult<TransactionBuilder> {
    let mut tx = TransactionBuilder::new();
    let minted = tx.move_call(
        target(package, SUISPRESSO_MODULE, "new_employee_card")?,
        vec![],
        vec![],
    )?;
    let card = minted.nested(0);
    let receipt = minted.nested(1);

    let name = tx.pure(name)?;
    let member = tx.pure(&member)?;
    tx.move_call(
        target(package, MEMBERSHIP_MODULE, "new_card")?,
        vec![],
        vec![card, name, member],
    )?;
    tx.move_call(
        target(package, SUISPRESSO_MODULE, "transfer_employee_card")?,
        vec![],
        vec![receipt, card],
    )?;
    Ok(tx)
}

impl Suispresso {
    pub async fn mint_employee_card(&self, admin: &Wallet) -> BlockchainResult<ExecutionResponse> {
        let tx = mint_employee_card_transaction(self.package())?;
        self.submit("mint_employee_card", tx, admin).await
    }

    /// Membership card for the admin, named `name` or the configured default.
    pub async fn mint_membership_card(
        &self,
        admin: &Wallet,
        name: Option<&str>,
    ) -> BlockchainResult<ExecutionResponse> {
        let name = name.unwrap_or(&self.coffee().member_name);
        let tx = mint_membership_card_transaction(self.package(), name, admin.address())?;
        self.submit("mint_membership_card", tx, admin).await
    }

    /// Every employee card owned by `owner`.
    pub async fn employee_cards(&self, owner: SuiAddress) -> BlockchainResult<Vec<ObjectData>> {
        self.executor()
            .client()
            .owned_objects(owner, &employee_card_type(self.package()))
            .await
    }

    /// The first employee card the node reports for `owner`.
    pub async fn first_employee_card(&self, owner: SuiAddress) -> BlockchainResult<ObjectData> {
        let mut cards = self.employee_cards(owner).await?;
        if cards.len() > 1 {
            tracing::warn!(
                owner = %owner,
                count = cards.len(),
                "Several employee cards found, using the first"
            );
        }
        if cards.is_empty() {
            return Err(BlockchainError::NoMatchingObject {
                struct_type: employee_card_type(self.package()),
                owner: owner.to_string(),
            });
        }
        Ok(cards.swap_remove(0))
    }
}
