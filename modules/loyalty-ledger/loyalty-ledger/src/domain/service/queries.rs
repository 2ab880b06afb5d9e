use std::collections::{BTreeSet, HashMap};

use loyalty_ledger_sdk::{
    Customer, CustomerDetails, CustomerSummary, CustomerWithCounts, HistoryQuery, Merchant,
    MerchantDetails, MerchantSummary, MerchantWithCounts, Page, PointsTransaction, Redemption,
    RedemptionWithCustomer, RedemptionWithMerchant, TransactionWithCustomer,
    TransactionWithMerchant,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::Service;
use crate::domain::error::DomainError;
use crate::domain::store::{HistoryFilter, LedgerStore};

fn merchant_summary(m: &Merchant) -> MerchantSummary {
    MerchantSummary {
        id: m.id,
        shop_name: m.shop_name.clone(),
        category: m.category.clone(),
    }
}

fn customer_summary(c: &Customer) -> CustomerSummary {
    CustomerSummary {
        id: c.id,
        name: c.name.clone(),
        phone: c.phone.clone(),
    }
}

/// Distinct ids referenced by two history lists.
fn referenced_ids(
    transactions: impl Iterator<Item = Uuid>,
    redemptions: impl Iterator<Item = Uuid>,
) -> Vec<Uuid> {
    transactions
        .chain(redemptions)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl<S: LedgerStore> Service<S> {
    /// Customer lookup by phone with recent activity, each entry annotated
    /// with the merchant's shop name and category.
    ///
    /// # Errors
    /// `NotFound` when no customer owns the phone.
    #[instrument(name = "loyalty_ledger.service.get_customer_by_phone", skip(self))]
    pub async fn get_customer_by_phone(&self, phone: &str) -> Result<CustomerDetails, DomainError> {
        let phone = self.normalize_phone(phone)?;
        let customer = self
            .store
            .find_customer_by_phone(&phone)
            .await?
            .ok_or_else(|| DomainError::customer_not_found(&phone))?;

        let filter = HistoryFilter {
            customer_id: Some(customer.id),
            ..HistoryFilter::default()
        };
        let limit = self.config.customer_history_limit;
        let transactions = self.store.list_transactions(filter, limit, 0).await?;
        let redemptions = self.store.list_redemptions(filter, limit, 0).await?;

        let ids = referenced_ids(
            transactions.iter().map(|t| t.merchant_id),
            redemptions.iter().map(|r| r.merchant_id),
        );
        let merchants: HashMap<Uuid, MerchantSummary> = self
            .store
            .find_merchants(&ids)
            .await?
            .iter()
            .map(|m| (m.id, merchant_summary(m)))
            .collect();

        debug!(
            transactions = transactions.len(),
            redemptions = redemptions.len(),
            "Loaded customer history"
        );
        Ok(CustomerDetails {
            customer,
            transactions: transactions
                .into_iter()
                .filter_map(|transaction| {
                    let merchant = merchants.get(&transaction.merchant_id)?.clone();
                    Some(TransactionWithMerchant {
                        transaction,
                        merchant,
                    })
                })
                .collect(),
            redemptions: redemptions
                .into_iter()
                .filter_map(|redemption| {
                    let merchant = merchants.get(&redemption.merchant_id)?.clone();
                    Some(RedemptionWithMerchant {
                        redemption,
                        merchant,
                    })
                })
                .collect(),
        })
    }

    /// Merchant lookup with recent activity, each entry annotated with the
    /// customer's name and phone.
    ///
    /// # Errors
    /// `NotFound` for an unknown id.
    #[instrument(name = "loyalty_ledger.service.get_merchant_by_id", skip(self))]
    pub async fn get_merchant_by_id(&self, id: Uuid) -> Result<MerchantDetails, DomainError> {
        let merchant = self
            .store
            .find_merchant(id)
            .await?
            .ok_or_else(|| DomainError::merchant_not_found(id))?;

        let filter = HistoryFilter {
            merchant_id: Some(id),
            ..HistoryFilter::default()
        };
        let limit = self.config.merchant_history_limit;
        let transactions = self.store.list_transactions(filter, limit, 0).await?;
        let redemptions = self.store.list_redemptions(filter, limit, 0).await?;

        let ids = referenced_ids(
            transactions.iter().map(|t| t.customer_id),
            redemptions.iter().map(|r| r.customer_id),
        );
        let customers: HashMap<Uuid, CustomerSummary> = self
            .store
            .find_customers(&ids)
            .await?
            .iter()
            .map(|c| (c.id, customer_summary(c)))
            .collect();

        Ok(MerchantDetails {
            merchant,
            transactions: transactions
                .into_iter()
                .filter_map(|transaction| {
                    let customer = customers.get(&transaction.customer_id)?.clone();
                    Some(TransactionWithCustomer {
                        transaction,
                        customer,
                    })
                })
                .collect(),
            redemptions: redemptions
                .into_iter()
                .filter_map(|redemption| {
                    let customer = customers.get(&redemption.customer_id)?.clone();
                    Some(RedemptionWithCustomer {
                        redemption,
                        customer,
                    })
                })
                .collect(),
        })
    }

    /// Every customer, newest first, with activity counts.
    ///
    /// # Errors
    /// `Store` on persistence failure.
    #[instrument(name = "loyalty_ledger.service.list_customers", skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<CustomerWithCounts>, DomainError> {
        let customers = self.store.list_customers().await?;
        let counts = self.store.customer_activity_counts().await?;
        Ok(customers
            .into_iter()
            .map(|customer| CustomerWithCounts {
                counts: counts.get(&customer.id).copied().unwrap_or_default(),
                customer,
            })
            .collect())
    }

    /// Every merchant, newest first, with activity counts.
    ///
    /// # Errors
    /// `Store` on persistence failure.
    #[instrument(name = "loyalty_ledger.service.list_merchants", skip(self))]
    pub async fn list_merchants(&self) -> Result<Vec<MerchantWithCounts>, DomainError> {
        let merchants = self.store.list_merchants().await?;
        let counts = self.store.merchant_activity_counts().await?;
        Ok(merchants
            .into_iter()
            .map(|merchant| MerchantWithCounts {
                counts: counts.get(&merchant.id).copied().unwrap_or_default(),
                merchant,
            })
            .collect())
    }

    /// Earn history, newest first.
    ///
    /// # Errors
    /// `NotFound` when the query names an unknown customer phone.
    #[instrument(name = "loyalty_ledger.service.list_transactions", skip(self))]
    pub async fn list_transactions(
        &self,
        query: HistoryQuery,
    ) -> Result<Page<PointsTransaction>, DomainError> {
        let (filter, limit) = self.resolve_history(&query).await?;
        let items = self
            .store
            .list_transactions(filter, limit, query.offset)
            .await?;
        Ok(Page {
            items,
            limit,
            offset: query.offset,
        })
    }

    /// Redemption history, newest first.
    ///
    /// # Errors
    /// `NotFound` when the query names an unknown customer phone.
    #[instrument(name = "loyalty_ledger.service.list_redemptions", skip(self))]
    pub async fn list_redemptions(
        &self,
        query: HistoryQuery,
    ) -> Result<Page<Redemption>, DomainError> {
        let (filter, limit) = self.resolve_history(&query).await?;
        let items = self
            .store
            .list_redemptions(filter, limit, query.offset)
            .await?;
        Ok(Page {
            items,
            limit,
            offset: query.offset,
        })
    }

    async fn resolve_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<(HistoryFilter, u64), DomainError> {
        let customer_id = match query.customer_phone.as_deref() {
            None => None,
            Some(phone) => {
                let phone = self.normalize_phone(phone)?;
                let customer = self
                    .store
                    .find_customer_by_phone(&phone)
                    .await?
                    .ok_or_else(|| DomainError::customer_not_found(&phone))?;
                Some(customer.id)
            }
        };
        let filter = HistoryFilter {
            merchant_id: query.merchant_id,
            customer_id,
        };
        Ok((filter, self.page_limit(query.limit)))
    }
}
