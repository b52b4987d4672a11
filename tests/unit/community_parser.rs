use rust_decimal::Decimal;
use std::str::FromStr;
use steam_family_aggregator::fetcher::community_parser::CommunityParser;
use steam_family_aggregator::fetcher::FetcherError;
use steam_family_aggregator::CandidateSource;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn test_vanity_document() {
    let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<profile>
    <steamID64>76561197960287930</steamID64>
    <steamID><![CDATA[Rabscuttle]]></steamID>
</profile>"#;
    let id = CommunityParser::parse_vanity_xml(xml).unwrap();
    assert_eq!(id.as_str(), "76561197960287930");
}

#[test]
fn test_vanity_error_text_is_reported() {
    let xml = b"<response><error><![CDATA[The specified profile could not be found.]]></error></response>";
    match CommunityParser::parse_vanity_xml(xml) {
        Err(FetcherError::ParseError(message)) => {
            assert!(message.contains("could not be found"), "got {message}")
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_vanity_with_short_id_is_rejected() {
    let xml = b"<profile><steamID64>1234</steamID64></profile>";
    assert!(CommunityParser::parse_vanity_xml(xml).is_err());
}

#[test]
fn test_library_document() {
    let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<gamesList>
    <steamID64>76561197960287930</steamID64>
    <games>
        <game>
            <appID>570</appID>
            <name><![CDATA[Dota 2]]></name>
            <hoursLast2Weeks>3.4</hoursLast2Weeks>
            <hoursOnRecord>1,204.5</hoursOnRecord>
        </game>
        <game>
            <appID>440</appID>
            <name><![CDATA[Team Fortress 2]]></name>
        </game>
        <game>
            <name>No app id</name>
            <hoursOnRecord>2.0</hoursOnRecord>
        </game>
    </games>
</gamesList>"#;

    let games = CommunityParser::parse_library_xml(xml).unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].app_id, "570");
    assert_eq!(games[0].name, "Dota 2");
    assert_eq!(games[0].hours_recent, dec("3.4"));
    // First number wins; the comma is read as a decimal separator
    assert_eq!(games[0].hours_forever, dec("1.204"));
    assert_eq!(games[1].hours_forever, Decimal::ZERO);
    assert_eq!(games[1].hours_recent, Decimal::ZERO);
}

#[test]
fn test_library_well_formedness() {
    assert!(CommunityParser::is_well_formed_xml(b"<gamesList><games/></gamesList>"));
    assert!(!CommunityParser::is_well_formed_xml(b"<gamesList><games></gamesList>"));
    assert!(!CommunityParser::is_well_formed_xml(b""));
}

#[test]
fn test_friends_attribute_layout() {
    let html = r#"<div id="search_results">
        <div class="friend_block_v2" data-steamid="76561198000000002">
            <div class="friend_block_content">Bravo<br><span class="friend_small_text">Online</span></div>
        </div>
        <div class="friend_block_v2" data-steamid="76561198000000003"></div>
    </div>"#;

    let friends = CommunityParser::parse_friends_html(html);
    assert_eq!(friends.len(), 2);
    assert_eq!(friends[0].steam_id.as_str(), "76561198000000002");
    assert_eq!(friends[0].name, "Bravo");
    assert_eq!(friends[0].source, CandidateSource::Friend);
    // No text at all: named by id
    assert_eq!(friends[1].name, "76561198000000003");
}

#[test]
fn test_friends_link_layout_only_when_attributes_absent() {
    let links = r#"<a href="https://steamcommunity.com/profiles/76561198000000004/">  Delta
        Four </a><a href="/id/someone">vanity link</a>"#;
    let friends = CommunityParser::parse_friends_html(links);
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].steam_id.as_str(), "76561198000000004");
    assert_eq!(friends[0].name, "Delta Four");

    let mixed = format!(
        r#"<div data-steamid="76561198000000005">Echo</div>{links}"#
    );
    let friends = CommunityParser::parse_friends_html(&mixed);
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].steam_id.as_str(), "76561198000000005");
}

#[test]
fn test_friends_page_without_friends() {
    assert!(CommunityParser::parse_friends_html("<html><body>No friends</body></html>").is_empty());
}
