use serde::Deserialize;

use crate::gateway::mask::{MaskPolicy, Masked};

/// Amount in minor units
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Money {
    pub amount: u64,
    /// Falls back to the gateway default currency when absent
    #[serde(default)]
    pub currency: Option<String>,
}

impl Money {
    pub fn new(amount: u64) -> Self {
        Self {
            amount,
            currency: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn currency_or<'a>(&'a self, default_currency: &'a str) -> &'a str {
        self.currency.as_deref().unwrap_or(default_currency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentKind {
    CreditCard,
    Voucher,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentInstrument {
    CreditCard(CardDetails),
    Voucher(Voucher),
}

impl PaymentInstrument {
    pub fn kind(&self) -> InstrumentKind {
        match self {
            Self::CreditCard(_) => InstrumentKind::CreditCard,
            Self::Voucher(_) => InstrumentKind::Voucher,
        }
    }

    pub fn card(&self) -> &CardDetails {
        match self {
            Self::CreditCard(card) => card,
            Self::Voucher(voucher) => &voucher.card,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Voucher {
    #[serde(flatten)]
    pub card: CardDetails,
    #[serde(default)]
    pub holder_document: Option<String>,
}

#[derive(Clone)]
pub struct CardDetails {
    pub number: String,
    pub holder_name: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub verification_value: String,
}

impl CardDetails {
    pub fn new(
        number: impl Into<String>,
        holder_name: impl Into<String>,
        exp_month: u8,
        exp_year: u16,
        verification_value: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            holder_name: holder_name.into(),
            exp_month,
            exp_year,
            verification_value: verification_value.into(),
        }
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &Masked::mask(&self.number))
            .field("holder_name", &self.holder_name)
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("verification_value", &"***")
            .finish()
    }
}

// Implement deserialize manually to conceal any "helpful" error messages that can leak
// sensitive data
impl<'de> serde::de::Deserialize<'de> for CardDetails {
    fn deserialize<D>(deserializer: D) -> Result<CardDetails, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CardDetailsShadow {
            number: String,
            holder_name: String,
            exp_month: u8,
            exp_year: u16,
            verification_value: String,
        }

        CardDetailsShadow::deserialize(deserializer)
            .map(|shadow| CardDetails {
                number: shadow.number,
                holder_name: shadow.holder_name,
                exp_month: shadow.exp_month,
                exp_year: shadow.exp_year,
                verification_value: shadow.verification_value,
            })
            .map_err(|_| serde::de::Error::custom("failed to deserialize card data"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Address {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    pub neighborhood: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionOptions {
    pub email: Option<String>,
    pub holder_document: Option<String>,
    pub billing_address: Option<Address>,
    /// General address, used for billing when no billing address is given
    pub address: Option<Address>,
    pub shipping_address: Option<Address>,
}

impl TransactionOptions {
    pub fn billing(&self) -> Option<&Address> {
        self.billing_address.as_ref().or(self.address.as_ref())
    }
}
