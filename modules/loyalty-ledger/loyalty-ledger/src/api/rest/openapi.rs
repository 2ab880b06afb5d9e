use utoipa::OpenApi;

use super::dto;
use super::problem::{Problem, ValidationViolation};

#[derive(OpenApi)]
#[openapi(
    info(title = "Loyalty Ledger API", description = "Multi-merchant loyalty points ledger"),
    components(schemas(
        dto::RegisterCustomerReq,
        dto::CustomerDto,
        dto::ActivityCountsDto,
        dto::CustomerWithCountsDto,
        dto::CustomerDetailsDto,
        dto::CustomerSummaryDto,
        dto::MerchantSummaryDto,
        dto::TransactionWithMerchantDto,
        dto::RedemptionWithMerchantDto,
        dto::TransactionWithCustomerDto,
        dto::RedemptionWithCustomerDto,
        dto::CreateMerchantReq,
        dto::UpdateMerchantReq,
        dto::WalletDirectionDto,
        dto::WalletAdjustmentReq,
        dto::MerchantDto,
        dto::MerchantWithCountsDto,
        dto::MerchantDetailsDto,
        dto::TransactionDto,
        dto::RedemptionDto,
        dto::EarnReq,
        dto::EarnResponse,
        dto::RedeemReq,
        dto::RedeemResponse,
        dto::TransactionPageDto,
        dto::RedemptionPageDto,
        Problem,
        ValidationViolation,
    ))
)]
struct ApiDoc;

/// OpenAPI document describing the ledger's schemas.
#[must_use]
pub fn document() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
