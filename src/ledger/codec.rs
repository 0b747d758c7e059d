//! SSZ encoding of every value the engine stores.
//!
//! ## Records
//!
//! Domain types ([`Asset`], [`TradeOffer`], the index) use `String` and
//! `Vec`. Their on-ledger forms are SSZ containers with bounded lists:
//!
//! - Strings become `List<u8, N>` (UTF-8 bytes)
//! - The index is `List<IdBytes, MAX_ASSETS>`
//! - The order book is `List<OfferRecord, MAX_OFFERS>`
//!
//! List bounds are enforced on both encode and decode, so an oversized
//! string is rejected here rather than truncated.
//!
//! ## Determinism
//!
//! SSZ has a single canonical encoding per value: identical state on two
//! replicas produces identical ledger bytes and identical write digests.

use ssz_rs::prelude::*;
use thiserror::Error;

use crate::types::{Asset, Description, OfferId, SlipDetails, TradeOffer};

// ============================================================================
// Bounds
// ============================================================================

/// Maximum asset identifier length in bytes
pub const MAX_ID_LEN: usize = 64;

/// Maximum length of any other text attribute in bytes
pub const MAX_TEXT_LEN: usize = 256;

/// Maximum willing alternatives on one offer
pub const MAX_ALTERNATIVES: usize = 64;

/// Maximum open offers in the book
pub const MAX_OFFERS: usize = 65_536;

/// Maximum live assets in the index
pub const MAX_ASSETS: usize = 1_048_576;

pub type IdBytes = List<u8, MAX_ID_LEN>;
pub type TextBytes = List<u8, MAX_TEXT_LEN>;

// ============================================================================
// CodecError
// ============================================================================

/// Encoding or decoding failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("failed to encode {what}: {reason}")]
    Encode { what: &'static str, reason: String },

    #[error("failed to decode value at {key:?}: {reason}")]
    Decode { key: String, reason: String },

    #[error("{field} exceeds {max} elements")]
    TooLong { field: &'static str, max: usize },
}

// ============================================================================
// Records
// ============================================================================

/// On-ledger form of an [`Asset`]
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct AssetRecord {
    pub id: IdBytes,
    pub owner: TextBytes,
    pub category: TextBytes,
    pub quantity: u64,
    pub record_kind: TextBytes,
    pub customer_code: TextBytes,
    pub department_code: TextBytes,
    pub order_date: TextBytes,
    pub delivery_date: TextBytes,
    pub scheduled_delivery_date: TextBytes,
    pub division_code: TextBytes,
    pub store_code: TextBytes,
    pub store_name: TextBytes,
    pub inspection_store_code: TextBytes,
    pub inspection_store_name: TextBytes,
    pub slip_number: TextBytes,
    pub slip_kind: TextBytes,
    pub shipment_class: TextBytes,
    pub total_quantity: u64,
    pub total_cost: u64,
    pub total_sales: u64,
    pub line_number: TextBytes,
    pub product_code: TextBytes,
    pub barcode: TextBytes,
    pub product_name: TextBytes,
    pub product_name_alt: TextBytes,
    pub unit_name: TextBytes,
    pub units_per_case: u64,
    pub case_count: u64,
    pub unit_cost: u64,
    pub unit_price: u64,
    pub cost_amount: u64,
    pub sales_amount: u64,
    pub usage_class: TextBytes,
}

/// On-ledger form of the asset index
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct IndexRecord {
    pub ids: List<IdBytes, MAX_ASSETS>,
}

/// On-ledger form of a [`Description`]
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct DescriptionRecord {
    pub category: TextBytes,
    pub quantity: u64,
}

/// On-ledger form of a [`TradeOffer`]
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct OfferRecord {
    pub id: u64,
    pub owner: TextBytes,
    pub created_at: u64,
    pub wanted: DescriptionRecord,
    pub willing: List<DescriptionRecord, MAX_ALTERNATIVES>,
}

/// On-ledger form of the order book
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct OrderBookRecord {
    pub offers: List<OfferRecord, MAX_OFFERS>,
}

// ============================================================================
// Field Helpers
// ============================================================================

fn bounded<T, const N: usize>(field: &'static str, items: Vec<T>) -> Result<List<T, N>, CodecError>
where
    T: SimpleSerialize,
{
    if items.len() > N {
        return Err(CodecError::TooLong { field, max: N });
    }
    List::<T, N>::try_from(items).map_err(|_| CodecError::TooLong { field, max: N })
}

fn text_bytes<const N: usize>(field: &'static str, value: &str) -> Result<List<u8, N>, CodecError> {
    bounded(field, value.as_bytes().to_vec())
}

fn text<const N: usize>(key: &str, field: &'static str, bytes: &List<u8, N>) -> Result<String, CodecError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| CodecError::Decode {
        key: key.to_string(),
        reason: format!("{field} is not UTF-8: {e}"),
    })
}

fn encode<T: SimpleSerialize>(what: &'static str, record: &T) -> Result<Vec<u8>, CodecError> {
    ssz_rs::serialize(record).map_err(|e| CodecError::Encode {
        what,
        reason: format!("{e:?}"),
    })
}

fn decode<T: SimpleSerialize>(key: &str, bytes: &[u8]) -> Result<T, CodecError> {
    ssz_rs::deserialize::<T>(bytes).map_err(|e| CodecError::Decode {
        key: key.to_string(),
        reason: format!("{e:?}"),
    })
}

// ============================================================================
// Assets
// ============================================================================

/// Encode an asset for storage under its id
pub fn encode_asset(asset: &Asset) -> Result<Vec<u8>, CodecError> {
    let s = &asset.slip;
    let record = AssetRecord {
        id: text_bytes("asset id", &asset.id)?,
        owner: text_bytes("owner", &asset.owner)?,
        category: text_bytes("category", &asset.category)?,
        quantity: asset.quantity,
        record_kind: text_bytes("record_kind", &s.record_kind)?,
        customer_code: text_bytes("customer_code", &s.customer_code)?,
        department_code: text_bytes("department_code", &s.department_code)?,
        order_date: text_bytes("order_date", &s.order_date)?,
        delivery_date: text_bytes("delivery_date", &s.delivery_date)?,
        scheduled_delivery_date: text_bytes("scheduled_delivery_date", &s.scheduled_delivery_date)?,
        division_code: text_bytes("division_code", &s.division_code)?,
        store_code: text_bytes("store_code", &s.store_code)?,
        store_name: text_bytes("store_name", &s.store_name)?,
        inspection_store_code: text_bytes("inspection_store_code", &s.inspection_store_code)?,
        inspection_store_name: text_bytes("inspection_store_name", &s.inspection_store_name)?,
        slip_number: text_bytes("slip_number", &s.slip_number)?,
        slip_kind: text_bytes("slip_kind", &s.slip_kind)?,
        shipment_class: text_bytes("shipment_class", &s.shipment_class)?,
        total_quantity: s.total_quantity,
        total_cost: s.total_cost,
        total_sales: s.total_sales,
        line_number: text_bytes("line_number", &s.line_number)?,
        product_code: text_bytes("product_code", &s.product_code)?,
        barcode: text_bytes("barcode", &s.barcode)?,
        product_name: text_bytes("product_name", &s.product_name)?,
        product_name_alt: text_bytes("product_name_alt", &s.product_name_alt)?,
        unit_name: text_bytes("unit_name", &s.unit_name)?,
        units_per_case: s.units_per_case,
        case_count: s.case_count,
        unit_cost: s.unit_cost,
        unit_price: s.unit_price,
        cost_amount: s.cost_amount,
        sales_amount: s.sales_amount,
        usage_class: text_bytes("usage_class", &s.usage_class)?,
    };
    encode("asset", &record)
}

/// Decode an asset stored at `key`
pub fn decode_asset(key: &str, bytes: &[u8]) -> Result<Asset, CodecError> {
    let r: AssetRecord = decode(key, bytes)?;
    let slip = SlipDetails {
        record_kind: text(key, "record_kind", &r.record_kind)?,
        customer_code: text(key, "customer_code", &r.customer_code)?,
        department_code: text(key, "department_code", &r.department_code)?,
        order_date: text(key, "order_date", &r.order_date)?,
        delivery_date: text(key, "delivery_date", &r.delivery_date)?,
        scheduled_delivery_date: text(key, "scheduled_delivery_date", &r.scheduled_delivery_date)?,
        division_code: text(key, "division_code", &r.division_code)?,
        store_code: text(key, "store_code", &r.store_code)?,
        store_name: text(key, "store_name", &r.store_name)?,
        inspection_store_code: text(key, "inspection_store_code", &r.inspection_store_code)?,
        inspection_store_name: text(key, "inspection_store_name", &r.inspection_store_name)?,
        slip_number: text(key, "slip_number", &r.slip_number)?,
        slip_kind: text(key, "slip_kind", &r.slip_kind)?,
        shipment_class: text(key, "shipment_class", &r.shipment_class)?,
        total_quantity: r.total_quantity,
        total_cost: r.total_cost,
        total_sales: r.total_sales,
        line_number: text(key, "line_number", &r.line_number)?,
        product_code: text(key, "product_code", &r.product_code)?,
        barcode: text(key, "barcode", &r.barcode)?,
        product_name: text(key, "product_name", &r.product_name)?,
        product_name_alt: text(key, "product_name_alt", &r.product_name_alt)?,
        unit_name: text(key, "unit_name", &r.unit_name)?,
        units_per_case: r.units_per_case,
        case_count: r.case_count,
        unit_cost: r.unit_cost,
        unit_price: r.unit_price,
        cost_amount: r.cost_amount,
        sales_amount: r.sales_amount,
        usage_class: text(key, "usage_class", &r.usage_class)?,
    };

    Ok(Asset {
        id: text(key, "asset id", &r.id)?,
        owner: text(key, "owner", &r.owner)?,
        category: text(key, "category", &r.category)?,
        quantity: r.quantity,
        slip,
    })
}

// ============================================================================
// Index
// ============================================================================

/// Encode the asset index
pub fn encode_index(ids: &[String]) -> Result<Vec<u8>, CodecError> {
    let ids = ids
        .iter()
        .map(|id| text_bytes::<MAX_ID_LEN>("asset id", id))
        .collect::<Result<Vec<_>, _>>()?;
    let record = IndexRecord {
        ids: bounded("asset index", ids)?,
    };
    encode("asset index", &record)
}

/// Decode the asset index stored at `key`
pub fn decode_index(key: &str, bytes: &[u8]) -> Result<Vec<String>, CodecError> {
    let record: IndexRecord = decode(key, bytes)?;
    record
        .ids
        .iter()
        .map(|id| text(key, "asset id", id))
        .collect()
}

// ============================================================================
// Order Book
// ============================================================================

fn description_record(description: &Description) -> Result<DescriptionRecord, CodecError> {
    Ok(DescriptionRecord {
        category: text_bytes("category", &description.category)?,
        quantity: description.quantity,
    })
}

fn description(key: &str, record: &DescriptionRecord) -> Result<Description, CodecError> {
    Ok(Description {
        category: text(key, "category", &record.category)?,
        quantity: record.quantity,
    })
}

/// Encode a single offer
pub fn offer_record(offer: &TradeOffer) -> Result<OfferRecord, CodecError> {
    let willing = offer
        .willing
        .iter()
        .map(description_record)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OfferRecord {
        id: offer.id.as_u64(),
        owner: text_bytes("owner", &offer.owner)?,
        created_at: offer.created_at,
        wanted: description_record(&offer.wanted)?,
        willing: bounded("willing alternatives", willing)?,
    })
}

/// Encode the open offers
pub fn encode_offers(offers: &[TradeOffer]) -> Result<Vec<u8>, CodecError> {
    let offers = offers
        .iter()
        .map(offer_record)
        .collect::<Result<Vec<_>, _>>()?;
    let record = OrderBookRecord {
        offers: bounded("open offers", offers)?,
    };
    encode("order book", &record)
}

/// Decode the open offers stored at `key`
pub fn decode_offers(key: &str, bytes: &[u8]) -> Result<Vec<TradeOffer>, CodecError> {
    let record: OrderBookRecord = decode(key, bytes)?;
    record
        .offers
        .iter()
        .map(|r| {
            Ok(TradeOffer {
                id: OfferId(r.id),
                owner: text(key, "owner", &r.owner)?,
                created_at: r.created_at,
                wanted: description(key, &r.wanted)?,
                willing: r
                    .willing
                    .iter()
                    .map(|d| description(key, d))
                    .collect::<Result<Vec<_>, _>>()?,
            })
        })
        .collect()
}

// ============================================================================
// Offer Sequence
// ============================================================================

/// Encode the last issued offer id
pub fn encode_seq(last: OfferId) -> Result<Vec<u8>, CodecError> {
    encode("offer sequence", &last.as_u64())
}

/// Decode the last issued offer id stored at `key`
pub fn decode_seq(key: &str, bytes: &[u8]) -> Result<OfferId, CodecError> {
    decode::<u64>(key, bytes).map(OfferId)
}

// ============================================================================
// Unit Tests
// ============================================================================
