use std::sync::Arc;

use axum::Json;
use axum::extract::Extension;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use tracing::{field::Empty, info};
use uuid::Uuid;

use super::dto::{
    CreateMerchantReq, CustomerDetailsDto, CustomerDto, CustomerWithCountsDto, EarnReq,
    EarnResponse, HistoryParams, MerchantDetailsDto, MerchantDto, MerchantWithCountsDto,
    RedeemReq, RedeemResponse, RedemptionPageDto, RegisterCustomerReq, TransactionPageDto,
    UpdateMerchantReq, WalletAdjustmentReq,
};
use super::error::{ApiError, ApiResult};
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::domain::service::Service;
use crate::domain::store::LedgerStore;

type Svc<S> = Extension<Arc<Service<S>>>;

/// Register (or look up) a customer by phone
#[tracing::instrument(
    name = "loyalty_ledger.register_customer",
    skip(svc, uri, req),
    fields(request_id = Empty)
)]
pub async fn register_customer<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
    ApiJson(req): ApiJson<RegisterCustomerReq>,
) -> ApiResult<impl IntoResponse> {
    let customer = svc
        .register_customer(req.into())
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok((StatusCode::CREATED, Json(CustomerDto::from(customer))))
}

/// List customers with activity counts
#[tracing::instrument(name = "loyalty_ledger.list_customers", skip(svc, uri))]
pub async fn list_customers<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
) -> ApiResult<Json<Vec<CustomerWithCountsDto>>> {
    let customers = svc
        .list_customers()
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// Customer by phone with recent activity
#[tracing::instrument(name = "loyalty_ledger.get_customer", skip(svc, uri))]
pub async fn get_customer<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
    ApiPath(phone): ApiPath<String>,
) -> ApiResult<Json<CustomerDetailsDto>> {
    let details = svc
        .get_customer_by_phone(&phone)
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(details.into()))
}

/// Register a merchant
#[tracing::instrument(
    name = "loyalty_ledger.create_merchant",
    skip(svc, uri, req),
    fields(merchant.shop_name = %req.shop_name)
)]
pub async fn create_merchant<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
    ApiJson(req): ApiJson<CreateMerchantReq>,
) -> ApiResult<impl IntoResponse> {
    let merchant = svc
        .create_merchant(req.into())
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok((StatusCode::CREATED, Json(MerchantDto::from(merchant))))
}

/// List merchants with activity counts
#[tracing::instrument(name = "loyalty_ledger.list_merchants", skip(svc, uri))]
pub async fn list_merchants<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
) -> ApiResult<Json<Vec<MerchantWithCountsDto>>> {
    let merchants = svc
        .list_merchants()
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(merchants.into_iter().map(Into::into).collect()))
}

/// Merchant by id with recent activity
#[tracing::instrument(
    name = "loyalty_ledger.get_merchant",
    skip(svc, uri),
    fields(merchant.id = %id)
)]
pub async fn get_merchant<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MerchantDetailsDto>> {
    let details = svc
        .get_merchant_by_id(id)
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(details.into()))
}

/// Patch merchant details
#[tracing::instrument(
    name = "loyalty_ledger.update_merchant",
    skip(svc, uri, req),
    fields(merchant.id = %id)
)]
pub async fn update_merchant<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateMerchantReq>,
) -> ApiResult<Json<MerchantDto>> {
    let merchant = svc
        .update_merchant(id, req.into())
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(merchant.into()))
}

/// Top up or debit a merchant wallet
#[tracing::instrument(
    name = "loyalty_ledger.adjust_wallet",
    skip(svc, uri, req),
    fields(merchant.id = %id, amount = req.amount)
)]
pub async fn adjust_wallet<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<WalletAdjustmentReq>,
) -> ApiResult<Json<MerchantDto>> {
    let merchant = svc
        .adjust_wallet(id, req.into())
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(merchant.into()))
}

/// Earn points for a purchase
#[tracing::instrument(
    name = "loyalty_ledger.earn",
    skip(svc, uri, req),
    fields(merchant.id = %req.merchant_id, request_id = Empty)
)]
pub async fn earn<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
    ApiJson(req): ApiJson<EarnReq>,
) -> ApiResult<impl IntoResponse> {
    info!("Processing earn request");
    let receipt = svc
        .earn(req.into())
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok((StatusCode::CREATED, Json(EarnResponse::from(receipt))))
}

/// Redeem points for a discount
#[tracing::instrument(
    name = "loyalty_ledger.redeem",
    skip(svc, uri, req),
    fields(merchant.id = %req.merchant_id, request_id = Empty)
)]
pub async fn redeem<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
    ApiJson(req): ApiJson<RedeemReq>,
) -> ApiResult<impl IntoResponse> {
    info!("Processing redeem request");
    let receipt = svc
        .redeem(req.into())
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok((StatusCode::CREATED, Json(RedeemResponse::from(receipt))))
}

/// Earn history
#[tracing::instrument(name = "loyalty_ledger.list_transactions", skip(svc, uri))]
pub async fn list_transactions<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
    ApiQuery(params): ApiQuery<HistoryParams>,
) -> ApiResult<Json<TransactionPageDto>> {
    let page = svc
        .list_transactions(params.into())
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(page.into()))
}

/// Redemption history
#[tracing::instrument(name = "loyalty_ledger.list_redemptions", skip(svc, uri))]
pub async fn list_redemptions<S: LedgerStore>(
    Extension(svc): Svc<S>,
    uri: Uri,
    ApiQuery(params): ApiQuery<HistoryParams>,
) -> ApiResult<Json<RedemptionPageDto>> {
    let page = svc
        .list_redemptions(params.into())
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(page.into()))
}
