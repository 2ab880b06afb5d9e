use std::collections::HashMap;

use async_trait::async_trait;
use loyalty_ledger_sdk::{ActivityCounts, Customer, Merchant, PointsTransaction, Redemption};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::db::{db_err, tx_err};
use super::entity::{customer, merchant, redemption, transaction};
use super::mapper::{customer_row, merchant_row, redemption_row, transaction_row};
use crate::domain::error::DomainError;
use crate::domain::store::{HistoryFilter, LedgerStore, LedgerTx, TxFuture};

/// SQL-backed store. Works on any backend `SeaORM` connects to; tests run it
/// against in-memory `SQLite`.
#[derive(Clone)]
pub struct SeaOrmLedgerStore {
    db: DatabaseConnection,
}

impl SeaOrmLedgerStore {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Unit-of-work handle over an open database transaction.
struct SeaOrmLedgerTx<'c> {
    conn: &'c DatabaseTransaction,
}

async fn find_merchant<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<Merchant>, DomainError> {
    merchant::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .map(Merchant::try_from)
        .transpose()
}

async fn find_customer_by_phone<C: ConnectionTrait>(
    conn: &C,
    phone: &str,
) -> Result<Option<Customer>, DomainError> {
    let found = customer::Entity::find()
        .filter(customer::Column::Phone.eq(phone))
        .one(conn)
        .await
        .map_err(db_err)?;
    Ok(found.map(Into::into))
}

async fn wallet_balance<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<i64, DomainError> {
    find_merchant(conn, id)
        .await?
        .map(|m| m.wallet_balance)
        .ok_or_else(|| DomainError::merchant_not_found(id))
}

async fn customer_points<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<i64, DomainError> {
    customer::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .map(|c| c.total_points)
        .ok_or_else(|| DomainError::not_found("Customer", id))
}

/// Credit or debit a merchant wallet. Debits carry a `balance >= points`
/// guard; returns `false` when no row matched.
async fn shift_wallet<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    points: i64,
    debit: bool,
) -> Result<bool, DomainError> {
    let column = merchant::Column::WalletBalance;
    let mut update = merchant::Entity::update_many().filter(merchant::Column::Id.eq(id));
    update = if debit {
        update
            .col_expr(column, Expr::col(column).sub(points))
            .filter(column.gte(points))
    } else {
        update.col_expr(column, Expr::col(column).add(points))
    };
    let result = update.exec(conn).await.map_err(db_err)?;
    Ok(result.rows_affected == 1)
}

async fn shift_customer<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    points: i64,
    debit: bool,
) -> Result<bool, DomainError> {
    let column = customer::Column::TotalPoints;
    let mut update = customer::Entity::update_many().filter(customer::Column::Id.eq(id));
    update = if debit {
        update
            .col_expr(column, Expr::col(column).sub(points))
            .filter(column.gte(points))
    } else {
        update.col_expr(column, Expr::col(column).add(points))
    };
    let result = update.exec(conn).await.map_err(db_err)?;
    Ok(result.rows_affected == 1)
}

fn filter_transactions(
    mut select: Select<transaction::Entity>,
    filter: HistoryFilter,
) -> Select<transaction::Entity> {
    if let Some(id) = filter.merchant_id {
        select = select.filter(transaction::Column::MerchantId.eq(id));
    }
    if let Some(id) = filter.customer_id {
        select = select.filter(transaction::Column::CustomerId.eq(id));
    }
    select
}

fn filter_redemptions(
    mut select: Select<redemption::Entity>,
    filter: HistoryFilter,
) -> Select<redemption::Entity> {
    if let Some(id) = filter.merchant_id {
        select = select.filter(redemption::Column::MerchantId.eq(id));
    }
    if let Some(id) = filter.customer_id {
        select = select.filter(redemption::Column::CustomerId.eq(id));
    }
    select
}

fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}

/// Group `(owner_id, count)` rows into the per-owner activity map.
fn merge_counts(
    transactions: Vec<(Uuid, i64)>,
    redemptions: Vec<(Uuid, i64)>,
) -> HashMap<Uuid, ActivityCounts> {
    let mut counts: HashMap<Uuid, ActivityCounts> = HashMap::new();
    for (id, n) in transactions {
        counts.entry(id).or_default().transactions = to_count(n);
    }
    for (id, n) in redemptions {
        counts.entry(id).or_default().redemptions = to_count(n);
    }
    counts
}

#[async_trait]
impl LedgerTx for SeaOrmLedgerTx<'_> {
    async fn find_merchant(&mut self, id: Uuid) -> Result<Option<Merchant>, DomainError> {
        find_merchant(self.conn, id).await
    }

    async fn insert_merchant(&mut self, merchant: &Merchant) -> Result<(), DomainError> {
        merchant::Entity::insert(merchant_row(merchant).into_active_model())
            .exec_without_returning(self.conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_merchant(&mut self, merchant: &Merchant) -> Result<(), DomainError> {
        let mut am = merchant_row(merchant).into_active_model();
        am.wallet_balance = ActiveValue::NotSet;
        am.created_at = ActiveValue::NotSet;
        am.name = ActiveValue::Set(merchant.name.clone());
        am.shop_name = ActiveValue::Set(merchant.shop_name.clone());
        am.phone = ActiveValue::Set(merchant.phone.clone());
        am.category = ActiveValue::Set(merchant.category.clone());
        am.address = ActiveValue::Set(merchant.address.clone());
        am.points_rate = ActiveValue::Set(merchant.points_rate.normalize().to_string());
        am.is_active = ActiveValue::Set(merchant.is_active);
        merchant::Entity::update(am)
            .exec(self.conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_customer_by_phone(
        &mut self,
        phone: &str,
    ) -> Result<Option<Customer>, DomainError> {
        find_customer_by_phone(self.conn, phone).await
    }

    async fn find_or_create_customer(
        &mut self,
        candidate: &Customer,
    ) -> Result<Customer, DomainError> {
        let inserted = customer::Entity::insert(customer_row(candidate).into_active_model())
            .on_conflict(
                OnConflict::column(customer::Column::Phone)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .map_err(db_err)?;
        if inserted == 0 {
            debug!("Customer phone already registered, reusing record");
        }

        find_customer_by_phone(self.conn, &candidate.phone)
            .await?
            .ok_or_else(|| DomainError::store("customer missing after upsert"))
    }

    async fn credit_wallet(&mut self, merchant_id: Uuid, points: i64) -> Result<i64, DomainError> {
        if !shift_wallet(self.conn, merchant_id, points, false).await? {
            return Err(DomainError::merchant_not_found(merchant_id));
        }
        wallet_balance(self.conn, merchant_id).await
    }

    async fn debit_wallet(
        &mut self,
        merchant_id: Uuid,
        points: i64,
    ) -> Result<Option<i64>, DomainError> {
        if !shift_wallet(self.conn, merchant_id, points, true).await? {
            return Ok(None);
        }
        wallet_balance(self.conn, merchant_id).await.map(Some)
    }

    async fn credit_customer(
        &mut self,
        customer_id: Uuid,
        points: i64,
    ) -> Result<i64, DomainError> {
        if !shift_customer(self.conn, customer_id, points, false).await? {
            return Err(DomainError::not_found("Customer", customer_id));
        }
        customer_points(self.conn, customer_id).await
    }

    async fn debit_customer(
        &mut self,
        customer_id: Uuid,
        points: i64,
    ) -> Result<Option<i64>, DomainError> {
        if !shift_customer(self.conn, customer_id, points, true).await? {
            return Ok(None);
        }
        customer_points(self.conn, customer_id).await.map(Some)
    }

    async fn insert_transaction(
        &mut self,
        transaction: &PointsTransaction,
    ) -> Result<(), DomainError> {
        transaction::Entity::insert(transaction_row(transaction).into_active_model())
            .exec_without_returning(self.conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn insert_redemption(&mut self, redemption: &Redemption) -> Result<(), DomainError> {
        redemption::Entity::insert(redemption_row(redemption).into_active_model())
            .exec_without_returning(self.conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for SeaOrmLedgerStore {
    async fn transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: for<'a> FnOnce(&'a mut dyn LedgerTx) -> TxFuture<'a, T> + Send + 'static,
    {
        self.db
            .transaction::<_, T, DomainError>(move |txn| {
                Box::pin(async move {
                    let mut tx = SeaOrmLedgerTx { conn: txn };
                    work(&mut tx).await
                })
            })
            .await
            .map_err(tx_err)
    }

    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, DomainError> {
        find_customer_by_phone(&self.db, phone).await
    }

    async fn find_merchant(&self, id: Uuid) -> Result<Option<Merchant>, DomainError> {
        find_merchant(&self.db, id).await
    }

    async fn find_customers(&self, ids: &[Uuid]) -> Result<Vec<Customer>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = customer::Entity::find()
            .filter(customer::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_merchants(&self, ids: &[Uuid]) -> Result<Vec<Merchant>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        merchant::Entity::find()
            .filter(merchant::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Merchant::try_from)
            .collect()
    }

    #[instrument(
        name = "loyalty_ledger.store.list_customers",
        skip(self),
        fields(db.operation = "SELECT")
    )]
    async fn list_customers(&self) -> Result<Vec<Customer>, DomainError> {
        let rows = customer::Entity::find()
            .order_by_desc(customer::Column::CreatedAt)
            .order_by_desc(customer::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(
        name = "loyalty_ledger.store.list_merchants",
        skip(self),
        fields(db.operation = "SELECT")
    )]
    async fn list_merchants(&self) -> Result<Vec<Merchant>, DomainError> {
        merchant::Entity::find()
            .order_by_desc(merchant::Column::CreatedAt)
            .order_by_desc(merchant::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Merchant::try_from)
            .collect()
    }

    async fn customer_activity_counts(
        &self,
    ) -> Result<HashMap<Uuid, ActivityCounts>, DomainError> {
        let transactions: Vec<(Uuid, i64)> = transaction::Entity::find()
            .select_only()
            .column(transaction::Column::CustomerId)
            .column_as(Expr::col(transaction::Column::Id).count(), "count")
            .group_by(transaction::Column::CustomerId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let redemptions: Vec<(Uuid, i64)> = redemption::Entity::find()
            .select_only()
            .column(redemption::Column::CustomerId)
            .column_as(Expr::col(redemption::Column::Id).count(), "count")
            .group_by(redemption::Column::CustomerId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(merge_counts(transactions, redemptions))
    }

    async fn merchant_activity_counts(
        &self,
    ) -> Result<HashMap<Uuid, ActivityCounts>, DomainError> {
        let transactions: Vec<(Uuid, i64)> = transaction::Entity::find()
            .select_only()
            .column(transaction::Column::MerchantId)
            .column_as(Expr::col(transaction::Column::Id).count(), "count")
            .group_by(transaction::Column::MerchantId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let redemptions: Vec<(Uuid, i64)> = redemption::Entity::find()
            .select_only()
            .column(redemption::Column::MerchantId)
            .column_as(Expr::col(redemption::Column::Id).count(), "count")
            .group_by(redemption::Column::MerchantId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(merge_counts(transactions, redemptions))
    }

    #[instrument(
        name = "loyalty_ledger.store.list_transactions",
        skip(self),
        fields(db.operation = "SELECT")
    )]
    async fn list_transactions(
        &self,
        filter: HistoryFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PointsTransaction>, DomainError> {
        filter_transactions(transaction::Entity::find(), filter)
            .order_by_desc(transaction::Column::CreatedAt)
            .order_by_desc(transaction::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(PointsTransaction::try_from)
            .collect()
    }

    #[instrument(
        name = "loyalty_ledger.store.list_redemptions",
        skip(self),
        fields(db.operation = "SELECT")
    )]
    async fn list_redemptions(
        &self,
        filter: HistoryFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Redemption>, DomainError> {
        let rows = filter_redemptions(redemption::Entity::find(), filter)
            .order_by_desc(redemption::Column::CreatedAt)
            .order_by_desc(redemption::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
