use super::{FieldRule, FieldRules, ValueDomain};
use crate::error::CriteriaError;
use lazy_static::lazy_static;
use std::{fmt, str::FromStr};

/// Ledger entities with a built-in rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Block,
    Transaction,
    Wallet,
}

lazy_static! {
    static ref BLOCK_RULES: FieldRules = block_rules();
    static ref TRANSACTION_RULES: FieldRules = transaction_rules();
    static ref WALLET_RULES: FieldRules = wallet_rules();
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [
        EntityType::Block,
        EntityType::Transaction,
        EntityType::Wallet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityType::Block => "block",
            EntityType::Transaction => "transaction",
            EntityType::Wallet => "wallet",
        }
    }

    pub fn rules(&self) -> &'static FieldRules {
        match self {
            EntityType::Block => &BLOCK_RULES,
            EntityType::Transaction => &TRANSACTION_RULES,
            EntityType::Wallet => &WALLET_RULES,
        }
    }
}

impl FromStr for EntityType {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|entity| entity.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CriteriaError::UnknownEntity(s.to_string()))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Built-in tables hold no duplicate or empty names, so the constructor cannot reject them.
fn builtin(entity: EntityType, fields: Vec<FieldRule>) -> FieldRules {
    FieldRules {
        entity: entity.name().to_string(),
        fields,
    }
}

fn block_rules() -> FieldRules {
    use ValueDomain::*;
    builtin(
        EntityType::Block,
        vec![
            FieldRule::exact("id", Text),
            FieldRule::exact("version", Integer),
            FieldRule::range("timestamp", Integer),
            FieldRule::exact("previousBlock", Text),
            FieldRule::range("height", Integer),
            FieldRule::range("numberOfTransactions", Integer),
            FieldRule::range("totalAmount", Amount),
            FieldRule::range("totalFee", Amount),
            FieldRule::range("reward", Amount),
            FieldRule::range("payloadLength", Integer),
            FieldRule::exact("payloadHash", Text),
            FieldRule::exact("generatorPublicKey", Text),
            FieldRule::exact("blockSignature", Text),
        ],
    )
}

fn transaction_rules() -> FieldRules {
    use ValueDomain::*;
    builtin(
        EntityType::Transaction,
        vec![
            FieldRule::exact("id", Text),
            FieldRule::exact("version", Integer),
            FieldRule::exact("blockId", Text),
            FieldRule::range("sequence", Integer),
            FieldRule::range("timestamp", Integer),
            FieldRule::range("nonce", Amount),
            FieldRule::exact("senderPublicKey", Text),
            FieldRule::exact("recipientId", Text),
            FieldRule::exact("type", Integer),
            FieldRule::exact("typeGroup", Integer),
            FieldRule::exact("vendorField", Text),
            FieldRule::range("amount", Amount),
            FieldRule::range("fee", Amount),
        ],
    )
}

fn wallet_rules() -> FieldRules {
    use ValueDomain::*;
    builtin(
        EntityType::Wallet,
        vec![
            FieldRule::exact("address", Text),
            FieldRule::exact("publicKey", Text),
            FieldRule::range("balance", Amount),
            FieldRule::range("nonce", Amount),
        ],
    )
}
