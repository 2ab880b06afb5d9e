#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use loyalty_ledger_sdk::{
    EarnRequest, HistoryQuery, Merchant, MerchantPatch, NewCustomer, NewMerchant, RedeemRequest,
    WalletAdjustment, WalletDirection,
};
use rust_decimal::Decimal;
use tracing_test::traced_test;
use uuid::Uuid;

use super::error::DomainError;
use super::service::Service;
use super::store::LedgerStore;
use crate::config::LedgerConfig;
use crate::infra::storage::InMemoryLedgerStore;

type TestService = Service<InMemoryLedgerStore>;

fn service() -> TestService {
    Service::new(Arc::new(InMemoryLedgerStore::new()), LedgerConfig::default())
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn new_merchant(shop: &str, rate: Option<&str>) -> NewMerchant {
    NewMerchant {
        name: "Owner".to_owned(),
        shop_name: shop.to_owned(),
        phone: "9000000000".to_owned(),
        category: "Grocery".to_owned(),
        address: "1 High Street".to_owned(),
        points_rate: rate.map(dec),
    }
}

async fn funded_merchant(svc: &TestService, shop: &str, rate: &str, wallet: i64) -> Merchant {
    let merchant = svc
        .create_merchant(new_merchant(shop, Some(rate)))
        .await
        .unwrap();
    if wallet == 0 {
        return merchant;
    }
    svc.adjust_wallet(
        merchant.id,
        WalletAdjustment {
            amount: wallet,
            direction: WalletDirection::Add,
        },
    )
    .await
    .unwrap()
}

fn earn_request(merchant_id: Uuid, phone: &str, amount: &str) -> EarnRequest {
    EarnRequest {
        merchant_id,
        customer_phone: phone.to_owned(),
        customer_name: None,
        amount: dec(amount),
    }
}

fn redeem_request(merchant_id: Uuid, phone: &str, points: i64) -> RedeemRequest {
    RedeemRequest {
        merchant_id,
        customer_phone: phone.to_owned(),
        points_to_redeem: points,
    }
}

async fn wallet_of(svc: &TestService, id: Uuid) -> i64 {
    svc.get_merchant_by_id(id)
        .await
        .unwrap()
        .merchant
        .wallet_balance
}

async fn points_of(svc: &TestService, phone: &str) -> i64 {
    svc.get_customer_by_phone(phone)
        .await
        .unwrap()
        .customer
        .total_points
}

#[tokio::test]
async fn test_earn_debits_wallet_and_credits_customer() {
    let svc = service();
    let merchant = funded_merchant(&svc, "Corner Store", "2", 100).await;

    let receipt = svc
        .earn(earn_request(merchant.id, "5550001", "500"))
        .await
        .unwrap();

    assert_eq!(receipt.points_earned, 10);
    assert_eq!(receipt.new_total_points, 10);
    assert_eq!(receipt.message, "Earned 10 points at Corner Store!");
    assert_eq!(receipt.transaction.amount, dec("500"));
    assert_eq!(wallet_of(&svc, merchant.id).await, 90);

    let details = svc.get_customer_by_phone("5550001").await.unwrap();
    assert_eq!(details.customer.name, "Customer");
    assert_eq!(details.customer.total_points, 10);
    assert_eq!(details.transactions.len(), 1);
    assert_eq!(details.transactions[0].merchant.shop_name, "Corner Store");
}

#[tokio::test]
async fn test_earn_uses_supplied_name_for_new_customer() {
    let svc = service();
    let merchant = funded_merchant(&svc, "Deli", "1", 50).await;

    let mut request = earn_request(merchant.id, "5550002", "300");
    request.customer_name = Some("  Priya ".to_owned());
    svc.earn(request).await.unwrap();

    let details = svc.get_customer_by_phone("5550002").await.unwrap();
    assert_eq!(details.customer.name, "Priya");
}

#[tokio::test]
async fn test_earn_rejects_when_wallet_cannot_cover_award() {
    let svc = service();
    let merchant = funded_merchant(&svc, "Kiosk", "1", 5).await;

    let err = svc
        .earn(earn_request(merchant.id, "5550003", "1000"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::InsufficientMerchantFunds {
            required: 10,
            available: 5
        }
    ));
    assert_eq!(wallet_of(&svc, merchant.id).await, 5);
    assert!(matches!(
        svc.get_customer_by_phone("5550003").await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
#[traced_test]
async fn test_rejected_earn_is_logged_as_warning() {
    let svc = service();
    let merchant = funded_merchant(&svc, "Stall", "1", 0).await;

    svc.earn(earn_request(merchant.id, "5550099", "500"))
        .await
        .unwrap_err();

    assert!(logs_contain("Ledger operation rejected"));
    assert!(logs_contain("insufficient wallet balance"));
}

#[tokio::test]
async fn test_earn_below_base_unit_awards_zero_points() {
    let svc = service();
    let merchant = funded_merchant(&svc, "Cafe", "1", 10).await;

    let receipt = svc
        .earn(earn_request(merchant.id, "5550004", "99"))
        .await
        .unwrap();

    assert_eq!(receipt.points_earned, 0);
    assert_eq!(receipt.new_total_points, 0);
    assert_eq!(wallet_of(&svc, merchant.id).await, 10);
}

#[tokio::test]
async fn test_earn_validates_input() {
    let svc = service();
    let merchant = funded_merchant(&svc, "Cafe", "1", 10).await;

    for amount in ["0", "-5"] {
        let err = svc
            .earn(earn_request(merchant.id, "5550005", amount))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    let err = svc
        .earn(earn_request(merchant.id, "   ", "100"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn test_earn_and_redeem_reject_unknown_or_inactive_merchant() {
    let svc = service();
    let merchant = funded_merchant(&svc, "Closed Shop", "1", 100).await;
    svc.earn(earn_request(merchant.id, "5550006", "1000"))
        .await
        .unwrap();

    let unknown = Uuid::now_v7();
    assert!(matches!(
        svc.earn(earn_request(unknown, "5550006", "100")).await,
        Err(DomainError::NotFound { entity: "Merchant", .. })
    ));
    assert!(matches!(
        svc.redeem(redeem_request(unknown, "5550006", 1)).await,
        Err(DomainError::NotFound { entity: "Merchant", .. })
    ));

    svc.update_merchant(
        merchant.id,
        MerchantPatch {
            is_active: Some(false),
            ..MerchantPatch::default()
        },
    )
    .await
    .unwrap();

    assert!(matches!(
        svc.earn(earn_request(merchant.id, "5550006", "100")).await,
        Err(DomainError::Inactive { .. })
    ));
    assert!(matches!(
        svc.redeem(redeem_request(merchant.id, "5550006", 1)).await,
        Err(DomainError::Inactive { .. })
    ));
    assert_eq!(points_of(&svc, "5550006").await, 10);
    assert_eq!(wallet_of(&svc, merchant.id).await, 90);
}

#[tokio::test]
async fn test_redeem_more_than_balance_is_rejected() {
    let svc = service();
    let earner = funded_merchant(&svc, "Bakery", "1", 100).await;
    let spender = funded_merchant(&svc, "Florist", "1", 0).await;
    svc.earn(earn_request(earner.id, "5550007", "1000"))
        .await
        .unwrap();

    let err = svc
        .redeem(redeem_request(spender.id, "5550007", 15))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::InsufficientPoints {
            requested: 15,
            available: 10
        }
    ));
    assert_eq!(points_of(&svc, "5550007").await, 10);
}

#[tokio::test]
async fn test_redeem_full_balance_at_another_merchant() {
    let svc = service();
    let earner = funded_merchant(&svc, "Bakery", "1", 100).await;
    let spender = funded_merchant(&svc, "Florist", "1", 40).await;
    svc.earn(earn_request(earner.id, "5550008", "1000"))
        .await
        .unwrap();

    let receipt = svc
        .redeem(redeem_request(spender.id, "5550008", 10))
        .await
        .unwrap();

    assert_eq!(receipt.discount, 10);
    assert_eq!(receipt.remaining_points, 0);
    assert_eq!(receipt.message, "Redeemed 10 points for 10 discount at Florist!");
    assert_eq!(receipt.redemption.merchant_id, spender.id);
    assert_eq!(points_of(&svc, "5550008").await, 0);
    assert_eq!(wallet_of(&svc, spender.id).await, 40);
    assert_eq!(wallet_of(&svc, earner.id).await, 90);
}

#[tokio::test]
async fn test_redeem_requires_known_customer_and_positive_points() {
    let svc = service();
    let merchant = funded_merchant(&svc, "Bakery", "1", 0).await;

    assert!(matches!(
        svc.redeem(redeem_request(merchant.id, "5559999", 1)).await,
        Err(DomainError::NotFound { entity: "Customer", .. })
    ));
    assert!(matches!(
        svc.redeem(redeem_request(merchant.id, "5559999", 0)).await,
        Err(DomainError::Validation { .. })
    ));
    assert!(matches!(
        svc.get_customer_by_phone("5559999").await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_register_customer_is_idempotent_by_phone() {
    let svc = service();

    let first = svc
        .register_customer(NewCustomer {
            name: "Ravi".to_owned(),
            phone: "5550010".to_owned(),
        })
        .await
        .unwrap();
    let second = svc
        .register_customer(NewCustomer {
            name: "Someone Else".to_owned(),
            phone: " 5550010 ".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(second.name, "Ravi");
    assert_eq!(svc.list_customers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_customer_requires_name_only_when_new() {
    let svc = service();

    let err = svc
        .register_customer(NewCustomer {
            name: " ".to_owned(),
            phone: "5550011".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    svc.register_customer(NewCustomer {
        name: "Meena".to_owned(),
        phone: "5550011".to_owned(),
    })
    .await
    .unwrap();
    let existing = svc
        .register_customer(NewCustomer {
            name: String::new(),
            phone: "5550011".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(existing.name, "Meena");
}

#[tokio::test]
async fn test_create_merchant_defaults() {
    let svc = service();

    let defaulted = svc.create_merchant(new_merchant("A", None)).await.unwrap();
    let zero = svc
        .create_merchant(new_merchant("B", Some("0")))
        .await
        .unwrap();

    for merchant in [&defaulted, &zero] {
        assert_eq!(merchant.points_rate, Decimal::ONE);
        assert_eq!(merchant.wallet_balance, 0);
        assert!(merchant.is_active);
    }

    let err = svc
        .create_merchant(new_merchant("C", Some("-1")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let mut blank = new_merchant("D", None);
    blank.shop_name = "  ".to_owned();
    assert!(matches!(
        svc.create_merchant(blank).await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_wallet_adjustments() {
    let svc = service();
    let merchant = funded_merchant(&svc, "Pharmacy", "1", 30).await;

    let err = svc
        .adjust_wallet(
            merchant.id,
            WalletAdjustment {
                amount: 31,
                direction: WalletDirection::Subtract,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::InsufficientBalance {
            requested: 31,
            available: 30
        }
    ));

    let updated = svc
        .adjust_wallet(
            merchant.id,
            WalletAdjustment {
                amount: 30,
                direction: WalletDirection::Subtract,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.wallet_balance, 0);

    let err = svc
        .adjust_wallet(
            merchant.id,
            WalletAdjustment {
                amount: 0,
                direction: WalletDirection::Add,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let err = svc
        .adjust_wallet(
            Uuid::now_v7(),
            WalletAdjustment {
                amount: 1,
                direction: WalletDirection::Add,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_update_merchant_patches_fields_but_not_wallet() {
    let svc = service();
    let merchant = funded_merchant(&svc, "Old Name", "1", 25).await;

    let updated = svc
        .update_merchant(
            merchant.id,
            MerchantPatch {
                shop_name: Some("New Name".to_owned()),
                points_rate: Some(dec("1.5")),
                ..MerchantPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.shop_name, "New Name");
    assert_eq!(updated.points_rate, dec("1.5"));
    assert_eq!(updated.wallet_balance, 25);
    assert_eq!(updated.category, merchant.category);

    let err = svc
        .update_merchant(
            merchant.id,
            MerchantPatch {
                points_rate: Some(Decimal::ZERO),
                ..MerchantPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn test_points_are_conserved_across_operations() {
    let svc = service();
    let a = funded_merchant(&svc, "A", "1", 200).await;
    let b = funded_merchant(&svc, "B", "3", 200).await;

    for (merchant, phone, amount) in [
        (a.id, "5550020", "1000"),
        (b.id, "5550020", "450"),
        (a.id, "5550021", "730"),
        (b.id, "5550021", "100"),
    ] {
        svc.earn(earn_request(merchant, phone, amount)).await.unwrap();
    }
    svc.redeem(redeem_request(b.id, "5550020", 7)).await.unwrap();
    svc.redeem(redeem_request(a.id, "5550021", 3)).await.unwrap();

    let earned: i64 = svc
        .list_transactions(HistoryQuery::default())
        .await
        .unwrap()
        .items
        .iter()
        .map(|t| t.points_earned)
        .sum();
    let redeemed: i64 = svc
        .list_redemptions(HistoryQuery::default())
        .await
        .unwrap()
        .items
        .iter()
        .map(|r| r.points_used)
        .sum();
    let held: i64 = svc
        .list_customers()
        .await
        .unwrap()
        .iter()
        .map(|c| c.customer.total_points)
        .sum();

    assert_eq!(earned, 10 + 13 + 7 + 3);
    assert_eq!(held, earned - redeemed);
    assert_eq!(wallet_of(&svc, a.id).await, 200 - 10 - 7);
    assert_eq!(wallet_of(&svc, b.id).await, 200 - 13 - 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_earns_never_overdraw_wallet() {
    let svc = Arc::new(service());
    let merchant = funded_merchant(&svc, "Busy Shop", "1", 100).await;

    let handles: Vec<_> = (0..25)
        .map(|i| {
            let svc = Arc::clone(&svc);
            let request = earn_request(merchant.id, &format!("55510{i:02}"), "1000");
            tokio::spawn(async move { svc.earn(request).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(receipt) => {
                assert_eq!(receipt.points_earned, 10);
                accepted += 1;
            }
            Err(err) => assert!(matches!(
                err,
                DomainError::InsufficientMerchantFunds { .. }
            )),
        }
    }

    assert_eq!(accepted, 10);
    assert_eq!(wallet_of(&svc, merchant.id).await, 0);
    let issued: i64 = svc
        .list_customers()
        .await
        .unwrap()
        .iter()
        .map(|c| c.customer.total_points)
        .sum();
    assert_eq!(issued, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_earns_for_new_phone_converge_on_one_customer() {
    let svc = Arc::new(service());
    let merchant = funded_merchant(&svc, "Corner Shop", "1", 1_000).await;

    let handles: Vec<_> = (1..=12)
        .map(|i| {
            let svc = Arc::clone(&svc);
            let request = earn_request(merchant.id, "5551100", &(i * 100).to_string());
            tokio::spawn(async move { svc.earn(request).await })
        })
        .collect();

    let mut receipts = Vec::new();
    for handle in handles {
        receipts.push(handle.await.unwrap().unwrap());
    }

    let customer_id = receipts[0].transaction.customer_id;
    assert!(receipts.iter().all(|r| r.transaction.customer_id == customer_id));
    let awarded: i64 = receipts.iter().map(|r| r.points_earned).sum();
    assert_eq!(awarded, 78);

    let customers = svc.list_customers().await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].customer.id, customer_id);
    assert_eq!(customers[0].counts.transactions, 12);
    assert_eq!(points_of(&svc, "5551100").await, awarded);
    assert_eq!(wallet_of(&svc, merchant.id).await, 1_000 - awarded);
}

#[tokio::test]
async fn test_credits_that_would_overflow_are_validation_errors() {
    let svc = service();
    let small = funded_merchant(&svc, "Small", "1", 10).await;

    let err = svc
        .adjust_wallet(
            small.id,
            WalletAdjustment {
                amount: i64::MAX,
                direction: WalletDirection::Add,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "amount"));
    assert_eq!(wallet_of(&svc, small.id).await, 10);

    let big = funded_merchant(&svc, "Big", "1", i64::MAX).await;
    let huge = (Decimal::from(i64::MAX) * Decimal::ONE_HUNDRED).to_string();
    let receipt = svc.earn(earn_request(big.id, "5551200", &huge)).await.unwrap();
    assert_eq!(receipt.new_total_points, i64::MAX);

    let err = svc
        .earn(earn_request(small.id, "5551200", "100"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "amount"));
    assert_eq!(wallet_of(&svc, small.id).await, 10);
    assert_eq!(points_of(&svc, "5551200").await, i64::MAX);
}

#[tokio::test]
async fn test_history_listing_filters_and_clamps() {
    let svc = service();
    let a = funded_merchant(&svc, "A", "1", 1_000).await;
    let b = funded_merchant(&svc, "B", "1", 1_000).await;
    for _ in 0..3 {
        svc.earn(earn_request(a.id, "5550030", "200")).await.unwrap();
    }
    svc.earn(earn_request(b.id, "5550031", "200")).await.unwrap();

    let by_merchant = svc
        .list_transactions(HistoryQuery {
            merchant_id: Some(a.id),
            ..HistoryQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_merchant.items.len(), 3);
    let times: Vec<_> = by_merchant.items.iter().map(|t| t.created_at).collect();
    assert!(times.windows(2).all(|w| w[0] >= w[1]));

    let by_phone = svc
        .list_transactions(HistoryQuery {
            customer_phone: Some("5550031".to_owned()),
            ..HistoryQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_phone.items.len(), 1);
    assert_eq!(by_phone.items[0].merchant_id, b.id);

    let windowed = svc
        .list_transactions(HistoryQuery {
            limit: Some(2),
            offset: 1,
            ..HistoryQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(windowed.items.len(), 2);
    assert_eq!(windowed.limit, 2);

    let clamped = svc
        .list_transactions(HistoryQuery {
            limit: Some(100_000),
            ..HistoryQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(clamped.limit, LedgerConfig::default().max_page_size);

    assert!(matches!(
        svc.list_redemptions(HistoryQuery {
            customer_phone: Some("0000".to_owned()),
            ..HistoryQuery::default()
        })
        .await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_listings_carry_activity_counts() {
    let svc = service();
    let a = funded_merchant(&svc, "A", "1", 100).await;
    let idle = funded_merchant(&svc, "Idle", "1", 0).await;
    svc.earn(earn_request(a.id, "5550040", "500")).await.unwrap();
    svc.earn(earn_request(a.id, "5550040", "500")).await.unwrap();
    svc.redeem(redeem_request(a.id, "5550040", 4)).await.unwrap();

    let merchants = svc.list_merchants().await.unwrap();
    let counts_for = |id: Uuid| {
        merchants
            .iter()
            .find(|m| m.merchant.id == id)
            .map(|m| m.counts)
            .unwrap()
    };
    assert_eq!(counts_for(a.id).transactions, 2);
    assert_eq!(counts_for(a.id).redemptions, 1);
    assert_eq!(counts_for(idle.id).transactions, 0);

    let customers = svc.list_customers().await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].counts.transactions, 2);
    assert_eq!(customers[0].counts.redemptions, 1);

    let details = svc.get_merchant_by_id(a.id).await.unwrap();
    assert_eq!(details.transactions.len(), 2);
    assert_eq!(details.redemptions.len(), 1);
    assert_eq!(details.redemptions[0].customer.phone, "5550040");
}

#[tokio::test]
async fn test_failed_unit_of_work_leaves_store_untouched() {
    let store = InMemoryLedgerStore::new();
    let svc = Service::new(Arc::new(InMemoryLedgerStore::new()), LedgerConfig::default());
    let merchant = svc.create_merchant(new_merchant("Ghost", None)).await.unwrap();

    let result: Result<(), DomainError> = store
        .transaction(move |tx| {
            Box::pin(async move {
                tx.insert_merchant(&merchant).await?;
                Err(DomainError::store("forced failure"))
            })
        })
        .await;

    assert!(result.is_err());
    assert!(store.list_merchants().await.unwrap().is_empty());
}
