use std::collections::HashSet;
use steam_family_aggregator::identifier::{is_canonical, slugify, IdentifierError};
use steam_family_aggregator::SteamId;

#[test]
fn test_from_str_and_display() {
    let id: SteamId = " 76561197960287930\n".parse().unwrap();
    assert_eq!(id.to_string(), "76561197960287930");
    assert_eq!(id.as_ref(), "76561197960287930");
}

#[test]
fn test_rejections_carry_reason() {
    let err = SteamId::parse("gabelogannewell").unwrap_err();
    let IdentifierError::InvalidFormat(message) = err;
    assert!(message.contains("17 digits"), "got {message}");

    let err = SteamId::parse("   ").unwrap_err();
    assert!(err.to_string().contains("empty"));
}

#[test]
fn test_ids_dedupe_in_sets() {
    let ids: HashSet<SteamId> = ["76561198000000001", " 76561198000000001", "76561198000000002"]
        .iter()
        .map(|s| SteamId::parse(s).unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
}

#[test]
fn test_vanity_handles_are_not_canonical() {
    for handle in ["robin", "76561198robin0001", "+7656119800000001", "7656119800000000.1"] {
        assert!(!is_canonical(handle), "{handle} accepted");
    }
}

#[test]
fn test_slug_from_handles() {
    assert_eq!(slugify("76561198000000001"), "76561198000000001");
    assert_eq!(slugify("Über_Player"), "ber-player");
    assert_eq!(slugify(""), "seed");
}
