use std::sync::Arc;

use async_trait::async_trait;
use loyalty_ledger_sdk::{
    Customer, CustomerDetails, CustomerWithCounts, EarnReceipt, EarnRequest, HistoryQuery,
    LedgerError, LoyaltyLedgerClientV1, Merchant, MerchantDetails, MerchantPatch,
    MerchantWithCounts, NewCustomer, NewMerchant, Page, PointsTransaction, RedeemReceipt,
    RedeemRequest, Redemption, WalletAdjustment,
};
use uuid::Uuid;

use crate::domain::service::Service;
use crate::domain::store::LedgerStore;

/// In-process implementation of [`LoyaltyLedgerClientV1`] over the domain
/// service.
pub struct LocalClient<S: LedgerStore> {
    service: Arc<Service<S>>,
}

impl<S: LedgerStore> LocalClient<S> {
    #[must_use]
    pub fn new(service: Arc<Service<S>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S: LedgerStore> LoyaltyLedgerClientV1 for LocalClient<S> {
    async fn register_customer(&self, new_customer: NewCustomer) -> Result<Customer, LedgerError> {
        self.service
            .register_customer(new_customer)
            .await
            .map_err(Into::into)
    }

    async fn list_customers(&self) -> Result<Vec<CustomerWithCounts>, LedgerError> {
        self.service.list_customers().await.map_err(Into::into)
    }

    async fn get_customer(&self, phone: &str) -> Result<CustomerDetails, LedgerError> {
        self.service
            .get_customer_by_phone(phone)
            .await
            .map_err(Into::into)
    }

    async fn create_merchant(&self, new_merchant: NewMerchant) -> Result<Merchant, LedgerError> {
        self.service
            .create_merchant(new_merchant)
            .await
            .map_err(Into::into)
    }

    async fn list_merchants(&self) -> Result<Vec<MerchantWithCounts>, LedgerError> {
        self.service.list_merchants().await.map_err(Into::into)
    }

    async fn get_merchant(&self, id: Uuid) -> Result<MerchantDetails, LedgerError> {
        self.service
            .get_merchant_by_id(id)
            .await
            .map_err(Into::into)
    }

    async fn update_merchant(
        &self,
        id: Uuid,
        patch: MerchantPatch,
    ) -> Result<Merchant, LedgerError> {
        self.service
            .update_merchant(id, patch)
            .await
            .map_err(Into::into)
    }

    async fn adjust_wallet(
        &self,
        id: Uuid,
        adjustment: WalletAdjustment,
    ) -> Result<Merchant, LedgerError> {
        self.service
            .adjust_wallet(id, adjustment)
            .await
            .map_err(Into::into)
    }

    async fn earn(&self, request: EarnRequest) -> Result<EarnReceipt, LedgerError> {
        self.service.earn(request).await.map_err(Into::into)
    }

    async fn redeem(&self, request: RedeemRequest) -> Result<RedeemReceipt, LedgerError> {
        self.service.redeem(request).await.map_err(Into::into)
    }

    async fn list_transactions(
        &self,
        query: HistoryQuery,
    ) -> Result<Page<PointsTransaction>, LedgerError> {
        self.service
            .list_transactions(query)
            .await
            .map_err(Into::into)
    }

    async fn list_redemptions(
        &self,
        query: HistoryQuery,
    ) -> Result<Page<Redemption>, LedgerError> {
        self.service
            .list_redemptions(query)
            .await
            .map_err(Into::into)
    }
}
