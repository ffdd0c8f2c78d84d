use std::sync::Arc;

use axum::http::StatusCode;

use crate::mortgages::{CreditRating, MortgageId, MortgageService, MortgageServiceError, MortgageUpdate};
use crate::test_support::{risky_terms, seed_user, store, terms, UnavailableStore};

#[tokio::test]
async fn create_attaches_rating_from_store_wide_average() {
    let store = store().await;
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;
    let service = MortgageService::new(store.clone());

    // Bob's low score drags the shared average to 600.
    service
        .create(&bob, risky_terms(500))
        .await
        .expect("bob's mortgage stored");
    let created = service
        .create(&alice, terms(700))
        .await
        .expect("alice's mortgage stored");

    // -1 from Alice's own figures, +2 for an average inside 500..=650.
    assert_eq!(created.credit_rating, CreditRating::Aaa);
    assert_eq!(created.mortgage.owner, alice.id);

    let sole = service
        .create(&alice, risky_terms(600))
        .await
        .expect("stored");
    // avg (500 + 700 + 600) / 3 = 600 -> 2+2+1+1+1+2
    assert_eq!(sole.credit_rating, CreditRating::C);
}

#[tokio::test]
async fn list_only_returns_callers_records() {
    let store = store().await;
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;
    let service = MortgageService::new(store.clone());

    let mine = service.create(&alice, terms(720)).await.expect("stored");
    service.create(&bob, terms(610)).await.expect("stored");
    service.create(&bob, terms(640)).await.expect("stored");

    let listed = service.list(&alice).await.expect("list succeeds");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].mortgage.id, mine.mortgage.id);
    assert!(listed
        .iter()
        .all(|rated| rated.mortgage.owner == alice.id));
}

#[tokio::test]
async fn list_recomputes_ratings_as_average_moves() {
    let store = store().await;
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;
    let service = MortgageService::new(store.clone());

    service.create(&alice, terms(700)).await.expect("stored");
    let before = service.list(&alice).await.expect("list succeeds");
    // -1 from the figures, -1 for avg 700
    assert_eq!(before[0].credit_rating, CreditRating::Aaa);

    service.create(&bob, risky_terms(100)).await.expect("stored");
    let after = service.list(&alice).await.expect("list succeeds");
    // avg 400 -> -1 + 3 = 2, still AAA but derived from the new average
    assert_eq!(after[0].credit_rating, CreditRating::Aaa);

    service.create(&bob, risky_terms(100)).await.expect("stored");
    let mut degraded = terms(600);
    degraded.loan_type = "adjustable".to_string();
    degraded.property_type = "condo".to_string();
    let rated = service.create(&alice, degraded).await.expect("stored");
    // ltv +1, credit +1, adjustable +1, condo +1, avg (700+100+100+600)/4 = 375 -> +3
    assert_eq!(rated.credit_rating, CreditRating::C);
}

#[tokio::test]
async fn partial_update_keeps_untouched_fields() {
    let store = store().await;
    let alice = seed_user(&store, "alice").await;
    let service = MortgageService::new(store.clone());
    let created = service.create(&alice, terms(700)).await.expect("stored");

    let updated = service
        .update(
            &alice,
            created.mortgage.id,
            MortgageUpdate {
                loan_amount: Some(120.0),
                property_type: Some("condo".to_string()),
                ..MortgageUpdate::default()
            },
        )
        .await
        .expect("owner may update");

    assert_eq!(updated.terms.loan_amount, 120.0);
    assert_eq!(updated.terms.property_type, "condo");
    assert_eq!(updated.terms.credit_score, 700);
    assert_eq!(updated.terms.loan_type, "fixed");
    assert_eq!(updated.created_at, created.mortgage.created_at);

    let listed = service.list(&alice).await.expect("list succeeds");
    assert_eq!(listed[0].mortgage, updated);
}

#[tokio::test]
async fn foreign_and_missing_records_are_indistinguishable() {
    let store = store().await;
    let alice = seed_user(&store, "alice").await;
    let mallory = seed_user(&store, "mallory").await;
    let service = MortgageService::new(store.clone());
    let created = service.create(&alice, terms(700)).await.expect("stored");

    let foreign = service
        .update(&mallory, created.mortgage.id, MortgageUpdate::default())
        .await
        .expect_err("not mallory's record");
    let missing = service
        .update(&alice, MortgageId(9_999), MortgageUpdate::default())
        .await
        .expect_err("record does not exist");

    assert!(matches!(foreign, MortgageServiceError::NotFound));
    assert!(matches!(missing, MortgageServiceError::NotFound));
    assert_eq!(foreign.to_string(), missing.to_string());

    let untouched = service.list(&alice).await.expect("list succeeds");
    assert_eq!(untouched[0].mortgage, created.mortgage);
}

#[tokio::test]
async fn delete_twice_reports_not_found() {
    let store = store().await;
    let alice = seed_user(&store, "alice").await;
    let service = MortgageService::new(store.clone());
    let created = service.create(&alice, terms(700)).await.expect("stored");

    service
        .delete(&alice, created.mortgage.id)
        .await
        .expect("first delete succeeds");
    let err = service
        .delete(&alice, created.mortgage.id)
        .await
        .expect_err("second delete fails");

    assert!(matches!(err, MortgageServiceError::NotFound));
    assert!(service.list(&alice).await.expect("list").is_empty());
}

#[tokio::test]
async fn invalid_terms_are_rejected_before_storage() {
    let store = store().await;
    let alice = seed_user(&store, "alice").await;
    let service = MortgageService::new(store.clone());

    let mut invalid = terms(700);
    invalid.loan_amount = -1.0;
    let err = service
        .create(&alice, invalid)
        .await
        .expect_err("negative amount rejected");
    assert!(matches!(err, MortgageServiceError::Validation(_)));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let created = service.create(&alice, terms(700)).await.expect("stored");
    let err = service
        .update(
            &alice,
            created.mortgage.id,
            MortgageUpdate {
                loan_type: Some("   ".to_string()),
                ..MortgageUpdate::default()
            },
        )
        .await
        .expect_err("blank loan type rejected");
    assert!(matches!(err, MortgageServiceError::Validation(_)));

    let listed = service.list(&alice).await.expect("list succeeds");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].mortgage.terms.loan_type, "fixed");
}

#[tokio::test]
async fn storage_failures_surface_as_server_errors() {
    let store = store().await;
    let alice = seed_user(&store, "alice").await;
    let service = MortgageService::new(Arc::new(UnavailableStore));

    let err = service
        .create(&alice, terms(700))
        .await
        .expect_err("store offline");

    assert!(matches!(err, MortgageServiceError::Repository(_)));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
