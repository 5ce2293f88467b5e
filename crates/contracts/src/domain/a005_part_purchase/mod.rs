pub mod aggregate;

pub use aggregate::{
    PartPurchase, PartPurchaseDto, PartPurchaseId, PartPurchaseListItem, PartPurchasePatch,
    PartSummary, DEFAULT_VAT_RATE,
};
