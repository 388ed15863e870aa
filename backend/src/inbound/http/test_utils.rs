//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use mockable::DefaultClock;
use serde_json::Value;

use crate::domain::ports::{ReferenceChecker, StaticReferenceChecker};
use crate::domain::{EntityKind, ReferenceValidator, User, UserAccountService, UserAddress};
use crate::outbound::memory::InMemoryRepository;
use crate::outbound::reference::{RepositoryReferenceChecker, RoutedReferenceChecker};

/// User service over in-memory repositories, checking its own references
/// locally the way the deployed service does.
pub fn in_memory_user_accounts() -> Arc<UserAccountService> {
    let users: Arc<InMemoryRepository<User>> =
        Arc::new(InMemoryRepository::new(Arc::new(DefaultClock)));
    let addresses: Arc<InMemoryRepository<UserAddress>> =
        Arc::new(InMemoryRepository::new(Arc::new(DefaultClock)));
    let checker: Arc<dyn ReferenceChecker> = Arc::new(
        RoutedReferenceChecker::new(Arc::new(StaticReferenceChecker::default()))
            .route(
                EntityKind::User,
                Arc::new(RepositoryReferenceChecker::<User>::new(users.clone())),
            )
            .route(
                EntityKind::UserAddress,
                Arc::new(RepositoryReferenceChecker::<UserAddress>::new(
                    addresses.clone(),
                )),
            ),
    );
    Arc::new(UserAccountService::new(
        users,
        addresses,
        ReferenceValidator::new(checker),
    ))
}

/// Validator that accepts exactly the supplied references.
pub fn references(checker: StaticReferenceChecker) -> ReferenceValidator {
    ReferenceValidator::new(Arc::new(checker))
}

/// Read a response body as JSON.
pub async fn json_body<B: MessageBody>(response: ServiceResponse<B>) -> Value {
    let bytes = test::read_body(response).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}

/// Identifier field of a created entity.
pub fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("id field").to_owned()
}
