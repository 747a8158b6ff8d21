//! Unit tests for user entity

use chrono::{Duration, Utc};

use crate::domain::entities::user::User;

#[test]
fn test_new_user_is_unverified() {
    let now = Utc::now();
    let user = User::new("a@x.com", None, now);

    assert_eq!(user.email, "a@x.com");
    assert!(!user.is_verified);
    assert!(user.password_hash.is_none());
    assert_eq!(user.created_at, user.updated_at);
}

#[test]
fn test_verify_and_set_password_touch_updated_at() {
    let now = Utc::now();
    let mut user = User::new("a@x.com", Some("old".to_string()), now);

    let later = now + Duration::minutes(1);
    user.verify(later);
    assert!(user.is_verified);
    assert_eq!(user.updated_at, later);

    let even_later = later + Duration::minutes(1);
    user.set_password_hash("new".to_string(), even_later);
    assert_eq!(user.password_hash.as_deref(), Some("new"));
    assert_eq!(user.updated_at, even_later);
}

#[test]
fn test_password_hash_is_never_serialized() {
    let user = User::new("a@x.com", Some("$2b$04$secret".to_string()), Utc::now());
    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("password_hash"));
    assert!(!json.contains("secret"));
}
