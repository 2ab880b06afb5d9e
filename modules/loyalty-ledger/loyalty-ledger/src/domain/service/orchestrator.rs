use loyalty_ledger_sdk::{
    Customer, EarnReceipt, EarnRequest, Merchant, MerchantPatch, NewCustomer, NewMerchant,
    PointsTransaction, RedeemReceipt, RedeemRequest, Redemption, WalletAdjustment,
    WalletDirection,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{Service, log_failure};
use crate::domain::accounting::{self, DEFAULT_POINTS_RATE};
use crate::domain::error::DomainError;
use crate::domain::store::{LedgerStore, LedgerTx};

/// Load a merchant that may accept earn and redeem operations.
async fn active_merchant(tx: &mut dyn LedgerTx, id: Uuid) -> Result<Merchant, DomainError> {
    let merchant = tx
        .find_merchant(id)
        .await?
        .ok_or_else(|| DomainError::merchant_not_found(id))?;
    if !merchant.is_active {
        return Err(DomainError::inactive(id));
    }
    Ok(merchant)
}

async fn wallet_balance(tx: &mut dyn LedgerTx, id: Uuid) -> Result<i64, DomainError> {
    Ok(tx.find_merchant(id).await?.map_or(0, |m| m.wallet_balance))
}

impl<S: LedgerStore> Service<S> {
    /// Award points for a purchase, funded from the merchant's wallet.
    ///
    /// The customer is created on the fly when the phone is unknown. Wallet
    /// debit, customer credit and the transaction record are committed
    /// together.
    ///
    /// # Errors
    /// `NotFound`/`Inactive` for the merchant, `InsufficientMerchantFunds`
    /// when the wallet cannot cover the award, `Validation` for a
    /// non-positive amount, a blank phone, or an award that would overflow
    /// the customer's balance.
    #[instrument(
        name = "loyalty_ledger.service.earn",
        skip(self, request),
        fields(merchant.id = %request.merchant_id, amount = %request.amount)
    )]
    pub async fn earn(&self, request: EarnRequest) -> Result<EarnReceipt, DomainError> {
        let phone = self.normalize_phone(&request.customer_phone)?;
        if request.amount <= Decimal::ZERO {
            return Err(DomainError::validation("amount", "must be greater than zero"));
        }
        let name = match request.customer_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => self.config.default_customer_name.clone(),
        };
        self.check_length("customerName", &name)?;

        let merchant_id = request.merchant_id;
        let amount = request.amount;
        let result = self
            .store
            .transaction(move |tx| {
                Box::pin(async move {
                    let merchant = active_merchant(tx, merchant_id).await?;
                    let points = accounting::compute_earn(amount, merchant.points_rate)
                        .ok_or_else(|| {
                            DomainError::validation("amount", "is too large to award points for")
                        })?;
                    if merchant.wallet_balance < points {
                        return Err(DomainError::InsufficientMerchantFunds {
                            required: points,
                            available: merchant.wallet_balance,
                        });
                    }

                    let now = OffsetDateTime::now_utc();
                    let customer = tx
                        .find_or_create_customer(&Customer {
                            id: Uuid::now_v7(),
                            name,
                            phone,
                            total_points: 0,
                            created_at: now,
                        })
                        .await?;
                    if customer.total_points.checked_add(points).is_none() {
                        return Err(DomainError::validation(
                            "amount",
                            "would overflow the customer's point balance",
                        ));
                    }

                    if tx.debit_wallet(merchant_id, points).await?.is_none() {
                        return Err(DomainError::InsufficientMerchantFunds {
                            required: points,
                            available: wallet_balance(tx, merchant_id).await?,
                        });
                    }
                    let new_total_points = tx.credit_customer(customer.id, points).await?;

                    let transaction = PointsTransaction {
                        id: Uuid::now_v7(),
                        merchant_id,
                        customer_id: customer.id,
                        amount,
                        points_earned: points,
                        created_at: now,
                    };
                    tx.insert_transaction(&transaction).await?;

                    Ok(EarnReceipt {
                        transaction,
                        points_earned: points,
                        new_total_points,
                        message: format!("Earned {points} points at {}!", merchant.shop_name),
                    })
                })
            })
            .await;

        match &result {
            Ok(receipt) => info!(
                transaction.id = %receipt.transaction.id,
                points = receipt.points_earned,
                "Points earned"
            ),
            Err(e) => log_failure("earn", e),
        }
        result
    }

    /// Spend a customer's points for a 1:1 discount at any active merchant.
    ///
    /// The merchant wallet is not touched.
    ///
    /// # Errors
    /// `NotFound` for an unknown merchant or phone, `Inactive`,
    /// `InsufficientPoints` when the balance is too low, `Validation` when
    /// fewer than one point is requested.
    #[instrument(
        name = "loyalty_ledger.service.redeem",
        skip(self, request),
        fields(merchant.id = %request.merchant_id, points = request.points_to_redeem)
    )]
    pub async fn redeem(&self, request: RedeemRequest) -> Result<RedeemReceipt, DomainError> {
        let phone = self.normalize_phone(&request.customer_phone)?;
        let points = request.points_to_redeem;
        if points < 1 {
            return Err(DomainError::validation(
                "pointsToRedeem",
                "must be at least 1",
            ));
        }

        let merchant_id = request.merchant_id;
        let result = self
            .store
            .transaction(move |tx| {
                Box::pin(async move {
                    let merchant = active_merchant(tx, merchant_id).await?;
                    let customer = tx
                        .find_customer_by_phone(&phone)
                        .await?
                        .ok_or_else(|| DomainError::customer_not_found(&phone))?;
                    if points > customer.total_points {
                        return Err(DomainError::InsufficientPoints {
                            requested: points,
                            available: customer.total_points,
                        });
                    }

                    let Some(remaining_points) = tx.debit_customer(customer.id, points).await?
                    else {
                        let available = tx
                            .find_customer_by_phone(&phone)
                            .await?
                            .map_or(0, |c| c.total_points);
                        return Err(DomainError::InsufficientPoints {
                            requested: points,
                            available,
                        });
                    };

                    let discount = accounting::compute_redeem_discount(points);
                    let redemption = Redemption {
                        id: Uuid::now_v7(),
                        merchant_id,
                        customer_id: customer.id,
                        points_used: points,
                        discount,
                        created_at: OffsetDateTime::now_utc(),
                    };
                    tx.insert_redemption(&redemption).await?;

                    Ok(RedeemReceipt {
                        redemption,
                        discount,
                        remaining_points,
                        message: format!(
                            "Redeemed {points} points for {discount} discount at {}!",
                            merchant.shop_name
                        ),
                    })
                })
            })
            .await;

        match &result {
            Ok(receipt) => info!(
                redemption.id = %receipt.redemption.id,
                remaining = receipt.remaining_points,
                "Points redeemed"
            ),
            Err(e) => log_failure("redeem", e),
        }
        result
    }

    /// Find or create a customer by phone.
    ///
    /// An existing record is returned unchanged, whatever name was supplied.
    ///
    /// # Errors
    /// `Validation` for a blank phone, or a blank name when the phone is new.
    #[instrument(name = "loyalty_ledger.service.register_customer", skip(self, new))]
    pub async fn register_customer(&self, new: NewCustomer) -> Result<Customer, DomainError> {
        let phone = self.normalize_phone(&new.phone)?;
        let name = new.name.trim().to_owned();
        self.check_length("name", &name)?;

        let result = self
            .store
            .transaction(move |tx| {
                Box::pin(async move {
                    if let Some(existing) = tx.find_customer_by_phone(&phone).await? {
                        debug!(customer.id = %existing.id, "Customer already registered");
                        return Ok(existing);
                    }
                    if name.is_empty() {
                        return Err(DomainError::validation(
                            "name",
                            "is required for a new customer",
                        ));
                    }
                    tx.find_or_create_customer(&Customer {
                        id: Uuid::now_v7(),
                        name,
                        phone,
                        total_points: 0,
                        created_at: OffsetDateTime::now_utc(),
                    })
                    .await
                })
            })
            .await;

        if let Err(e) = &result {
            log_failure("register_customer", e);
        }
        result
    }

    /// Register a merchant with an empty wallet.
    ///
    /// # Errors
    /// `Validation` for blank or oversized fields or a negative rate.
    #[instrument(name = "loyalty_ledger.service.create_merchant", skip(self, new))]
    pub async fn create_merchant(&self, new: NewMerchant) -> Result<Merchant, DomainError> {
        let points_rate = match new.points_rate.filter(|rate| !rate.is_zero()) {
            None => DEFAULT_POINTS_RATE,
            Some(rate) if rate.is_sign_negative() => {
                return Err(DomainError::validation("pointsRate", "must be positive"));
            }
            Some(rate) => rate,
        };
        let address = new.address.trim().to_owned();
        self.check_length("address", &address)?;

        let merchant = Merchant {
            id: Uuid::now_v7(),
            name: self.required_text("name", &new.name)?,
            shop_name: self.required_text("shopName", &new.shop_name)?,
            phone: self.required_text("phone", &new.phone)?,
            category: self.required_text("category", &new.category)?,
            address,
            points_rate,
            wallet_balance: 0,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };

        let result = self
            .store
            .transaction(move |tx| {
                Box::pin(async move {
                    tx.insert_merchant(&merchant).await?;
                    Ok(merchant)
                })
            })
            .await;

        match &result {
            Ok(m) => info!(merchant.id = %m.id, shop = %m.shop_name, "Merchant registered"),
            Err(e) => log_failure("create_merchant", e),
        }
        result
    }

    /// Apply an administrative patch. The wallet is changed only through
    /// [`Self::adjust_wallet`] and earn.
    ///
    /// # Errors
    /// `NotFound` for an unknown merchant, `Validation` for blank text or a
    /// non-positive rate.
    #[instrument(
        name = "loyalty_ledger.service.update_merchant",
        skip(self, patch),
        fields(merchant.id = %id)
    )]
    pub async fn update_merchant(
        &self,
        id: Uuid,
        patch: MerchantPatch,
    ) -> Result<Merchant, DomainError> {
        let patch = self.validate_patch(patch)?;

        let result = self
            .store
            .transaction(move |tx| {
                Box::pin(async move {
                    let mut merchant = tx
                        .find_merchant(id)
                        .await?
                        .ok_or_else(|| DomainError::merchant_not_found(id))?;
                    apply_patch(&mut merchant, patch);
                    tx.update_merchant(&merchant).await?;
                    Ok(merchant)
                })
            })
            .await;

        match &result {
            Ok(m) => info!(active = m.is_active, "Merchant updated"),
            Err(e) => log_failure("update_merchant", e),
        }
        result
    }

    /// Manually top up or debit a merchant wallet.
    ///
    /// Allowed for inactive merchants too.
    ///
    /// # Errors
    /// `NotFound` for an unknown merchant, `InsufficientBalance` when a debit
    /// exceeds the wallet, `Validation` for an amount below 1 or a credit that
    /// would overflow the wallet.
    #[instrument(
        name = "loyalty_ledger.service.adjust_wallet",
        skip(self),
        fields(merchant.id = %id)
    )]
    pub async fn adjust_wallet(
        &self,
        id: Uuid,
        adjustment: WalletAdjustment,
    ) -> Result<Merchant, DomainError> {
        let amount = adjustment.amount;
        if amount < 1 {
            return Err(DomainError::validation("amount", "must be at least 1"));
        }

        let result = self
            .store
            .transaction(move |tx| {
                Box::pin(async move {
                    let mut merchant = tx
                        .find_merchant(id)
                        .await?
                        .ok_or_else(|| DomainError::merchant_not_found(id))?;
                    merchant.wallet_balance = match adjustment.direction {
                        WalletDirection::Add => {
                            if merchant.wallet_balance.checked_add(amount).is_none() {
                                return Err(DomainError::validation(
                                    "amount",
                                    "would overflow the wallet balance",
                                ));
                            }
                            tx.credit_wallet(id, amount).await?
                        }
                        WalletDirection::Subtract => {
                            if merchant.wallet_balance < amount {
                                return Err(DomainError::InsufficientBalance {
                                    requested: amount,
                                    available: merchant.wallet_balance,
                                });
                            }
                            match tx.debit_wallet(id, amount).await? {
                                Some(balance) => balance,
                                None => {
                                    return Err(DomainError::InsufficientBalance {
                                        requested: amount,
                                        available: wallet_balance(tx, id).await?,
                                    });
                                }
                            }
                        }
                    };
                    Ok(merchant)
                })
            })
            .await;

        match &result {
            Ok(m) => info!(balance = m.wallet_balance, "Wallet adjusted"),
            Err(e) => log_failure("adjust_wallet", e),
        }
        result
    }

    fn validate_patch(&self, patch: MerchantPatch) -> Result<MerchantPatch, DomainError> {
        let text = |field: &str, value: Option<String>| -> Result<Option<String>, DomainError> {
            value.map(|v| self.required_text(field, &v)).transpose()
        };
        let address = patch.address.map(|a| a.trim().to_owned());
        if let Some(address) = &address {
            self.check_length("address", address)?;
        }
        if let Some(rate) = patch.points_rate
            && rate <= Decimal::ZERO
        {
            return Err(DomainError::validation("pointsRate", "must be positive"));
        }

        Ok(MerchantPatch {
            name: text("name", patch.name)?,
            shop_name: text("shopName", patch.shop_name)?,
            phone: text("phone", patch.phone)?,
            category: text("category", patch.category)?,
            address,
            points_rate: patch.points_rate,
            is_active: patch.is_active,
        })
    }
}

fn apply_patch(merchant: &mut Merchant, patch: MerchantPatch) {
    if let Some(name) = patch.name {
        merchant.name = name;
    }
    if let Some(shop_name) = patch.shop_name {
        merchant.shop_name = shop_name;
    }
    if let Some(phone) = patch.phone {
        merchant.phone = phone;
    }
    if let Some(category) = patch.category {
        merchant.category = category;
    }
    if let Some(address) = patch.address {
        merchant.address = address;
    }
    if let Some(rate) = patch.points_rate {
        merchant.points_rate = rate;
    }
    if let Some(active) = patch.is_active {
        merchant.is_active = active;
    }
}
