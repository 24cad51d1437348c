//! End-to-end service scenario against a mock database.
//!
//! Seeds the built-in roles, signs up a user, creates an event, registers
//! the user for it, and checks the event's metrics.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use gather_common::Config;
use gather_common::config::{DatabaseConfig, RoleConfig, ServerConfig};
use gather_core::{
    AuthorizationGate, CreateEventInput, CreateUserInput, EngagementKind, EngagementService,
    EventService, MetricsService, RoleService, UserService,
};
use gather_db::entities::{event, registration, role, user};
use gather_db::repositories::{
    EventRepository, FavoriteRepository, RegistrationRepository, RoleRepository, ShareRepository,
    UserRepository,
};
use maplit::btreemap;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use std::sync::Arc;

const USER_ROLE: &str = "00000000000000000000000000000001";
const ADMIN_ROLE: &str = "00000000000000000000000000000002";

fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5555,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        roles: RoleConfig {
            user_role_id: USER_ROLE.to_string(),
            admin_role_id: ADMIN_ROLE.to_string(),
        },
        email: None,
    }
}

#[tokio::test]
async fn test_signup_register_metrics_flow() {
    let alice = user::Model {
        id: "alice000000000000000000000000001".to_string(),
        username: "alice".to_string(),
        role_id: USER_ROLE.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        canceled: false,
    };
    let hackathon = event::Model {
        id: "hack0000000000000000000000000001".to_string(),
        description: "Hackathon".to_string(),
        category: "tech".to_string(),
        location: "Library".to_string(),
        cost: "free".to_string(),
        start_time: chrono::Utc::now().into(),
        end_time: (chrono::Utc::now() + chrono::Duration::hours(8)).into(),
        event_link: None,
        creator_id: alice.id.clone(),
        updated_at: chrono::Utc::now().into(),
        canceled: false,
    };
    let registration = registration::Model {
        id: "reg00000000000000000000000000001".to_string(),
        event_id: hackathon.id.clone(),
        user_id: alice.id.clone(),
        canceled: false,
    };
    let user_role = role::Model {
        id: USER_ROLE.to_string(),
        name: "User".to_string(),
        canceled: false,
    };
    let admin_role = role::Model {
        id: ADMIN_ROLE.to_string(),
        name: "Admin".to_string(),
        canceled: false,
    };

    // Queued in the exact order the services will issue queries.
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            // seed roles: User missing then created, Admin missing then created
            .append_query_results([Vec::<role::Model>::new()])
            .append_query_results([[user_role]])
            .append_query_results([Vec::<role::Model>::new()])
            .append_query_results([[admin_role]])
            // create alice: username free, insert
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[alice.clone()]])
            // create event: description free, insert
            .append_query_results([Vec::<event::Model>::new()])
            .append_query_results([[hackathon.clone()]])
            // register alice: no prior row, insert
            .append_query_results([Vec::<registration::Model>::new()])
            .append_query_results([[registration]])
            // metrics: event exists, then counts 1/0/0
            .append_query_results([[hackathon.clone()]])
            .append_query_results([[btreemap! {"num_items" => Value::from(1i64)}]])
            .append_query_results([[btreemap! {"num_items" => Value::from(0i64)}]])
            .append_query_results([[btreemap! {"num_items" => Value::from(0i64)}]])
            .into_connection(),
    );

    let config = create_test_config();
    let role_repo = RoleRepository::new(Arc::clone(&db));
    let user_repo = UserRepository::new(Arc::clone(&db));
    let event_repo = EventRepository::new(Arc::clone(&db));
    let registration_repo = RegistrationRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
    let share_repo = ShareRepository::new(Arc::clone(&db));

    let gate = AuthorizationGate::new(user_repo.clone(), &config);
    let role_service = RoleService::new(role_repo);
    let user_service = UserService::new(user_repo, gate.clone(), USER_ROLE.to_string());
    let event_service = EventService::new(event_repo.clone(), gate);
    let engagement_service = EngagementService::new(
        Arc::clone(&db),
        registration_repo.clone(),
        favorite_repo.clone(),
        event_repo.clone(),
    );
    let metrics_service =
        MetricsService::new(event_repo, registration_repo, favorite_repo, share_repo);

    role_service
        .ensure_seed_roles(&config.roles)
        .await
        .unwrap();

    let created_user = user_service
        .create(CreateUserInput {
            username: "Alice".to_string(),
            password: "correct horse battery".to_string(),
            role_id: None,
        })
        .await
        .unwrap();
    assert_eq!(created_user.username, "alice");
    assert_eq!(created_user.role_id, USER_ROLE);

    let created_event = event_service
        .create(CreateEventInput {
            description: "Hackathon".to_string(),
            category: "tech".to_string(),
            location: "Library".to_string(),
            cost: "free".to_string(),
            start_time: chrono::Utc::now().into(),
            end_time: (chrono::Utc::now() + chrono::Duration::hours(8)).into(),
            event_link: None,
            creator_id: created_user.id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(created_event.creator_id, created_user.id);

    let engagement = engagement_service
        .set(EngagementKind::Registration, &created_event.id, &created_user.id)
        .await
        .unwrap();
    assert_eq!(engagement.event_id, created_event.id);
    assert_eq!(engagement.user_id, created_user.id);
    assert!(!engagement.canceled);

    let metrics = metrics_service.for_event(&created_event.id).await.unwrap();
    assert_eq!(metrics.registrations, 1);
    assert_eq!(metrics.favorites, 0);
    assert_eq!(metrics.shares, 0);
    assert!((metrics.popularity_score - 0.8).abs() < f64::EPSILON);
}
