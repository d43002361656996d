use super::*;

#[test]
fn only_rescinded_revokes() {
    assert!(!is_revoked(&DispatcherPermission::granted()));
    assert!(is_revoked(&DispatcherPermission::rescinded()));
    let observer = DispatcherPermission {
        ai_permission: true,
        permission: PermissionLevel::Observer,
    };
    assert!(!is_revoked(&observer));
    assert!(check(&observer).is_ok());
}

#[test]
fn check_maps_rescinded_to_permission_denied() {
    let err = check(&DispatcherPermission::rescinded()).expect_err("rescinded");
    assert!(matches!(err, SessionError::PermissionDenied));
}
