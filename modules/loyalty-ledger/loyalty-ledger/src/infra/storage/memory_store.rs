use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use loyalty_ledger_sdk::{ActivityCounts, Customer, Merchant, PointsTransaction, Redemption};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::store::{HistoryFilter, LedgerStore, LedgerTx, TxFuture};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    customers: HashMap<Uuid, Customer>,
    merchants: HashMap<Uuid, Merchant>,
    transactions: Vec<PointsTransaction>,
    redemptions: Vec<Redemption>,
}

impl LedgerState {
    fn customer_by_phone(&self, phone: &str) -> Option<&Customer> {
        self.customers.values().find(|c| c.phone == phone)
    }

    fn merchant_mut(&mut self, id: Uuid) -> Result<&mut Merchant, DomainError> {
        self.merchants
            .get_mut(&id)
            .ok_or_else(|| DomainError::merchant_not_found(id))
    }

    fn customer_mut(&mut self, id: Uuid) -> Result<&mut Customer, DomainError> {
        self.customers
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Customer", id))
    }
}

/// Store kept entirely in process memory.
///
/// Units of work are serialized by a single lock and applied to a scratch
/// copy of the state, which replaces the live state only when the closure
/// succeeds.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

struct MemoryTx<'s> {
    state: &'s mut LedgerState,
}

#[async_trait]
impl LedgerTx for MemoryTx<'_> {
    async fn find_merchant(&mut self, id: Uuid) -> Result<Option<Merchant>, DomainError> {
        Ok(self.state.merchants.get(&id).cloned())
    }

    async fn insert_merchant(&mut self, merchant: &Merchant) -> Result<(), DomainError> {
        if self.state.merchants.contains_key(&merchant.id) {
            return Err(DomainError::store(format!(
                "duplicate merchant id {}",
                merchant.id
            )));
        }
        self.state.merchants.insert(merchant.id, merchant.clone());
        Ok(())
    }

    async fn update_merchant(&mut self, merchant: &Merchant) -> Result<(), DomainError> {
        let stored = self.state.merchant_mut(merchant.id)?;
        let wallet_balance = stored.wallet_balance;
        let created_at = stored.created_at;
        *stored = Merchant {
            wallet_balance,
            created_at,
            ..merchant.clone()
        };
        Ok(())
    }

    async fn find_customer_by_phone(
        &mut self,
        phone: &str,
    ) -> Result<Option<Customer>, DomainError> {
        Ok(self.state.customer_by_phone(phone).cloned())
    }

    async fn find_or_create_customer(
        &mut self,
        candidate: &Customer,
    ) -> Result<Customer, DomainError> {
        if let Some(existing) = self.state.customer_by_phone(&candidate.phone) {
            return Ok(existing.clone());
        }
        self.state
            .customers
            .insert(candidate.id, candidate.clone());
        Ok(candidate.clone())
    }

    async fn credit_wallet(&mut self, merchant_id: Uuid, points: i64) -> Result<i64, DomainError> {
        let merchant = self.state.merchant_mut(merchant_id)?;
        merchant.wallet_balance = merchant
            .wallet_balance
            .checked_add(points)
            .ok_or_else(|| DomainError::store("wallet balance overflow"))?;
        Ok(merchant.wallet_balance)
    }

    async fn debit_wallet(
        &mut self,
        merchant_id: Uuid,
        points: i64,
    ) -> Result<Option<i64>, DomainError> {
        let Some(merchant) = self.state.merchants.get_mut(&merchant_id) else {
            return Ok(None);
        };
        if merchant.wallet_balance < points {
            return Ok(None);
        }
        merchant.wallet_balance -= points;
        Ok(Some(merchant.wallet_balance))
    }

    async fn credit_customer(
        &mut self,
        customer_id: Uuid,
        points: i64,
    ) -> Result<i64, DomainError> {
        let customer = self.state.customer_mut(customer_id)?;
        customer.total_points = customer
            .total_points
            .checked_add(points)
            .ok_or_else(|| DomainError::store("points total overflow"))?;
        Ok(customer.total_points)
    }

    async fn debit_customer(
        &mut self,
        customer_id: Uuid,
        points: i64,
    ) -> Result<Option<i64>, DomainError> {
        let Some(customer) = self.state.customers.get_mut(&customer_id) else {
            return Ok(None);
        };
        if customer.total_points < points {
            return Ok(None);
        }
        customer.total_points -= points;
        Ok(Some(customer.total_points))
    }

    async fn insert_transaction(
        &mut self,
        transaction: &PointsTransaction,
    ) -> Result<(), DomainError> {
        self.state.transactions.push(transaction.clone());
        Ok(())
    }

    async fn insert_redemption(&mut self, redemption: &Redemption) -> Result<(), DomainError> {
        self.state.redemptions.push(redemption.clone());
        Ok(())
    }
}

fn in_scope(filter: HistoryFilter, merchant_id: Uuid, customer_id: Uuid) -> bool {
    filter.merchant_id.is_none_or(|id| id == merchant_id)
        && filter.customer_id.is_none_or(|id| id == customer_id)
}

fn window<T>(items: Vec<T>, limit: u64, offset: u64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: for<'a> FnOnce(&'a mut dyn LedgerTx) -> TxFuture<'a, T> + Send + 'static,
    {
        let mut live = self.state.lock().await;
        let mut draft = live.clone();
        let result = {
            let mut tx = MemoryTx { state: &mut draft };
            work(&mut tx).await
        };
        if result.is_ok() {
            *live = draft;
        }
        result
    }

    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, DomainError> {
        Ok(self.state.lock().await.customer_by_phone(phone).cloned())
    }

    async fn find_merchant(&self, id: Uuid) -> Result<Option<Merchant>, DomainError> {
        Ok(self.state.lock().await.merchants.get(&id).cloned())
    }

    async fn find_customers(&self, ids: &[Uuid]) -> Result<Vec<Customer>, DomainError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.customers.get(id).cloned())
            .collect())
    }

    async fn find_merchants(&self, ids: &[Uuid]) -> Result<Vec<Merchant>, DomainError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.merchants.get(id).cloned())
            .collect())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, DomainError> {
        let mut customers: Vec<Customer> =
            self.state.lock().await.customers.values().cloned().collect();
        customers.sort_by_key(|c| Reverse((c.created_at, c.id)));
        Ok(customers)
    }

    async fn list_merchants(&self) -> Result<Vec<Merchant>, DomainError> {
        let mut merchants: Vec<Merchant> =
            self.state.lock().await.merchants.values().cloned().collect();
        merchants.sort_by_key(|m| Reverse((m.created_at, m.id)));
        Ok(merchants)
    }

    async fn customer_activity_counts(
        &self,
    ) -> Result<HashMap<Uuid, ActivityCounts>, DomainError> {
        let state = self.state.lock().await;
        let mut counts: HashMap<Uuid, ActivityCounts> = HashMap::new();
        for t in &state.transactions {
            counts.entry(t.customer_id).or_default().transactions += 1;
        }
        for r in &state.redemptions {
            counts.entry(r.customer_id).or_default().redemptions += 1;
        }
        Ok(counts)
    }

    async fn merchant_activity_counts(
        &self,
    ) -> Result<HashMap<Uuid, ActivityCounts>, DomainError> {
        let state = self.state.lock().await;
        let mut counts: HashMap<Uuid, ActivityCounts> = HashMap::new();
        for t in &state.transactions {
            counts.entry(t.merchant_id).or_default().transactions += 1;
        }
        for r in &state.redemptions {
            counts.entry(r.merchant_id).or_default().redemptions += 1;
        }
        Ok(counts)
    }

    async fn list_transactions(
        &self,
        filter: HistoryFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PointsTransaction>, DomainError> {
        let mut items: Vec<PointsTransaction> = self
            .state
            .lock()
            .await
            .transactions
            .iter()
            .filter(|t| in_scope(filter, t.merchant_id, t.customer_id))
            .cloned()
            .collect();
        items.sort_by_key(|t| Reverse((t.created_at, t.id)));
        Ok(window(items, limit, offset))
    }

    async fn list_redemptions(
        &self,
        filter: HistoryFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Redemption>, DomainError> {
        let mut items: Vec<Redemption> = self
            .state
            .lock()
            .await
            .redemptions
            .iter()
            .filter(|r| in_scope(filter, r.merchant_id, r.customer_id))
            .cloned()
            .collect();
        items.sort_by_key(|r| Reverse((r.created_at, r.id)));
        Ok(window(items, limit, offset))
    }
}
