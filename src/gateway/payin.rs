use serde::Serialize;

use crate::gateway::{
    address,
    instrument::{Address, CardDetails, InstrumentKind, Money, PaymentInstrument, TransactionOptions},
    route::Operation,
};

/// Body of `sale` and `authonly` charges
#[derive(Debug, Serialize)]
pub struct ChargeRequest<'a> {
    pub amount: u64,
    pub currency: &'a str,
    pub customer: Customer<'a>,
    /// Shipping address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<ShippingAddress<'a>>,
    pub payment: Payment<'a>,
}

/// Body of a refund, only the invoice fields
#[derive(Debug, Serialize)]
pub struct InvoiceRequest<'a> {
    pub amount: u64,
    pub currency: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Customer<'a> {
    pub email: Option<&'a str>,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "payment_method", rename_all = "snake_case")]
pub enum Payment<'a> {
    CreditCard { credit_card: PaymentMethod<'a> },
    Voucher { voucher: PaymentMethod<'a> },
}

/// Payment-kind object, `capture` lives here and not on the card
#[derive(Debug, Serialize)]
pub struct PaymentMethod<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture: Option<bool>,
    pub card: Card<'a>,
}

#[derive(Debug, Serialize)]
pub struct Card<'a> {
    pub number: &'a str,
    pub holder_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_document: Option<&'a str>,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvv: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<BillingAddress<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BillingAddress<'a> {
    #[serde(flatten)]
    pub location: Location<'a>,
    pub neighborhood: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ShippingAddress<'a> {
    #[serde(flatten)]
    pub location: Location<'a>,
}

/// Address fields shared by billing and shipping blocks
#[derive(Debug, Serialize)]
pub struct Location<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    // Processor field name is misspelled
    #[serde(rename = "compliment", skip_serializing_if = "Option::is_none")]
    pub complement: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<&'a str>,
}

impl<'a> From<&'a Address> for Location<'a> {
    fn from(value: &'a Address) -> Self {
        let parsed = address::parse(value.address1.as_deref());
        Self {
            street: parsed.street,
            number: parsed.number,
            complement: value.address2.as_deref(),
            city: value.city.as_deref(),
            state: value.state.as_deref(),
            country: value.country.as_deref(),
            zip_code: value.zip.as_deref(),
        }
    }
}

impl<'a> From<&'a Address> for BillingAddress<'a> {
    fn from(value: &'a Address) -> Self {
        Self {
            location: value.into(),
            neighborhood: value.neighborhood.as_deref(),
        }
    }
}

impl<'a> From<&'a Address> for ShippingAddress<'a> {
    fn from(value: &'a Address) -> Self {
        Self {
            location: value.into(),
        }
    }
}

impl<'a> Card<'a> {
    fn from(
        card: &'a CardDetails,
        holder_document: Option<&'a str>,
        options: &'a TransactionOptions,
    ) -> Self {
        Self {
            number: &card.number,
            holder_name: &card.holder_name,
            holder_document,
            exp_month: card.exp_month,
            exp_year: card.exp_year,
            cvv: &card.verification_value,
            billing_address: options.billing().map(Into::into),
        }
    }
}

impl<'a> Payment<'a> {
    pub fn from(instrument: &'a PaymentInstrument, options: &'a TransactionOptions) -> Self {
        match instrument {
            PaymentInstrument::CreditCard(card) => Self::CreditCard {
                credit_card: PaymentMethod {
                    capture: None,
                    card: Card::from(card, None, options),
                },
            },
            PaymentInstrument::Voucher(voucher) => {
                let holder_document = voucher
                    .holder_document
                    .as_deref()
                    .or(options.holder_document.as_deref());
                Self::Voucher {
                    voucher: PaymentMethod {
                        capture: None,
                        card: Card::from(&voucher.card, holder_document, options),
                    },
                }
            }
        }
    }

    pub fn kind(&self) -> InstrumentKind {
        match self {
            Self::CreditCard { .. } => InstrumentKind::CreditCard,
            Self::Voucher { .. } => InstrumentKind::Voucher,
        }
    }

    /// Ask the processor to hold funds without settling them
    pub fn with_capture_flag(mut self, capture: bool) -> Self {
        let method = match &mut self {
            Self::CreditCard { credit_card } => credit_card,
            Self::Voucher { voucher } => voucher,
        };
        method.capture = Some(capture);
        self
    }
}

impl<'a> ChargeRequest<'a> {
    pub fn build(
        operation: Operation,
        money: &'a Money,
        default_currency: &'a str,
        instrument: &'a PaymentInstrument,
        options: &'a TransactionOptions,
    ) -> Self {
        let mut payment = Payment::from(instrument, options);
        if operation == Operation::AuthOnly {
            payment = payment.with_capture_flag(false);
        }
        Self {
            amount: money.amount,
            currency: money.currency_or(default_currency),
            customer: Customer {
                email: options.email.as_deref(),
                name: &instrument.card().holder_name,
            },
            address: options.shipping_address.as_ref().map(Into::into),
            payment,
        }
    }
}

impl<'a> InvoiceRequest<'a> {
    pub fn build(money: &'a Money, default_currency: &'a str) -> Self {
        Self {
            amount: money.amount,
            currency: money.currency_or(default_currency),
        }
    }
}
