//! Tests for admin profiles and password handling

use chrono::Utc;

use core_kernel::AdminId;
use domain_admin::{hash_password, verify_password, Admin, AdminProfile, AdminRole, Password};

fn admin() -> Admin {
    let now = Utc::now();
    Admin {
        id: AdminId::new(),
        username: "operator".to_string(),
        email: "operator@example.com".to_string(),
        password_hash: hash_password(&Password::new("secret1")).unwrap(),
        full_name: Some("Grid Operator".to_string()),
        role: AdminRole::SuperAdmin,
        is_active: true,
        last_login: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_profile_json_omits_credentials() {
    let profile = AdminProfile::from(&admin());
    let json = serde_json::to_value(&profile).unwrap();

    assert_eq!(json["username"], "operator");
    assert_eq!(json["fullName"], "Grid Operator");
    assert_eq!(json["role"], "super_admin");
    assert!(json.get("passwordHash").is_none());
    assert!(json.get("password_hash").is_none());
}

#[test]
fn test_stored_hash_verifies() {
    let admin = admin();
    assert!(verify_password(&Password::new("secret1"), &admin.password_hash).unwrap());
}
