//! Concurrent redemptions against one balance must never overdraw it.

use std::sync::Arc;

use futures::future::join_all;
use mockable::DefaultClock;
use rstest::rstest;

use kabadiyo::domain::ports::{
    LedgerRepository, PointsCommand, PointsQuery, ThresholdRedemptionRequest,
};
use kabadiyo::domain::{
    Account, ErrorCode, PhoneNumber, Points, PointsLedgerService, Reward, UserId,
};
use kabadiyo::outbound::memory::InMemoryLedgerRepository;

async fn seeded_service(
    points: Points,
) -> (
    Arc<PointsLedgerService<InMemoryLedgerRepository>>,
    Arc<InMemoryLedgerRepository>,
    UserId,
) {
    let repository = Arc::new(InMemoryLedgerRepository::default());
    let user_id = UserId::random();
    let phone = PhoneNumber::new("9876543210").expect("valid phone");
    repository
        .put_account(Account::new(user_id.clone(), "Asha", phone).with_points(points))
        .await;
    let service = Arc::new(PointsLedgerService::new(
        Arc::clone(&repository),
        Arc::new(DefaultClock),
    ));
    (service, repository, user_id)
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_threshold_redemptions_succeed_once() {
    let (service, repository, user_id) = seeded_service(Points::new(150_000)).await;

    let attempts = (0..10).map(|_| {
        let service = Arc::clone(&service);
        let user_id = user_id.clone();
        tokio::spawn(async move {
            service
                .redeem_fixed_threshold(ThresholdRedemptionRequest {
                    user_id,
                    reward_id: None,
                    service: Some("Doorstep pickup".to_owned()),
                })
                .await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    let successes = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(
        results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|err| err.code() == ErrorCode::InsufficientFunds)
    );
    let balance = service.balance(&user_id).await.expect("balance");
    assert_eq!(balance, Points::new(50_000));
    assert!(repository.redemptions().await.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_catalog_redemptions_spend_exactly_the_balance() {
    let (service, repository, user_id) = seeded_service(Points::new(1_000)).await;
    let reward = Reward::new("Plant a Tree", "Certificate included", Points::new(200));
    let reward_id = reward.id;
    repository.put_reward(reward).await;

    let attempts = (0..12).map(|_| {
        let service = Arc::clone(&service);
        let user_id = user_id.clone();
        tokio::spawn(async move { service.redeem_reward(&user_id, &reward_id).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 5);
    assert!(
        results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|err| err.code() == ErrorCode::InsufficientFunds)
    );
    let account = repository
        .find_account(&user_id)
        .await
        .expect("lookup")
        .expect("account");
    assert_eq!(account.points, Points::ZERO);
    assert_eq!(repository.redemptions().await.len(), 5);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn two_redemptions_of_the_whole_balance_succeed_once() {
    let (service, repository, user_id) = seeded_service(Points::new(200)).await;
    let reward = Reward::new("Cloth Bag", "Reusable shopping bag", Points::new(200));
    let reward_id = reward.id;
    repository.put_reward(reward).await;

    let attempts = (0..2).map(|_| {
        let service = Arc::clone(&service);
        let user_id = user_id.clone();
        tokio::spawn(async move { service.redeem_reward(&user_id, &reward_id).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    let failure = results
        .iter()
        .find_map(|result| result.as_ref().err())
        .expect("one attempt fails");
    assert_eq!(failure.code(), ErrorCode::InsufficientFunds);
    assert_eq!(
        failure.message(),
        "Insufficient points. Need 200 points, you have 0."
    );
    let balance = service.balance(&user_id).await.expect("balance");
    assert_eq!(balance, Points::ZERO);
    assert_eq!(repository.redemptions().await.len(), 1);
}
