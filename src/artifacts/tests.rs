use super::*;

fn sample_brief() -> CampaignBrief {
    CampaignBrief::new(
        "Trail Runner X",
        "A lightweight trail shoe",
        "Weekend hikers",
        "Drive pre-orders",
    )
}

#[test]
fn kind_parsing_accepts_short_and_long_names() {
    assert_eq!("brief".parse::<ArtifactKind>(), Ok(ArtifactKind::Brief));
    assert_eq!(
        "campaign_brief".parse::<ArtifactKind>(),
        Ok(ArtifactKind::Brief)
    );
    assert_eq!(" AD ".parse::<ArtifactKind>(), Ok(ArtifactKind::Ad));
    assert_eq!(
        "rec".parse::<ArtifactKind>(),
        Ok(ArtifactKind::Recommendation)
    );
    assert!("poster".parse::<ArtifactKind>().is_err());
}

#[test]
fn type_tags_round_trip() {
    for kind in ArtifactKind::ALL {
        assert_eq!(ArtifactKind::from_type_tag(kind.type_tag()), Some(kind));
        assert_eq!(kind.to_string(), kind.type_tag());
    }
    assert_eq!(ArtifactKind::from_type_tag("brief"), None);
}

#[test]
fn item_ids_are_prefixed_by_kind() {
    let brief = sample_brief();

    assert_eq!(brief.item_id(), format!("brief_{}", brief.brief_id));
    assert_eq!(ArtifactKind::Ad.item_id("42"), "ad_42");
    assert_eq!(ArtifactKind::Feedback.item_id("7"), "feedback_7");
    assert_eq!(ArtifactKind::Recommendation.item_id("9"), "rec_9");
}

#[test]
fn id_field_matches_serialized_records() {
    let brief = serde_json::to_value(sample_brief()).expect("should serialize brief");
    let ad = serde_json::to_value(GeneratedAd::new("b", "banner", Vec::new()))
        .expect("should serialize ad");

    assert!(brief.get(ArtifactKind::Brief.id_field()).is_some());
    assert!(ad.get(ArtifactKind::Ad.id_field()).is_some());
}

#[test]
fn constructors_assign_unique_ids() {
    let first = sample_brief();
    let second = sample_brief();

    assert_ne!(first.brief_id, second.brief_id);
    assert!(Uuid::parse_str(&first.brief_id).is_ok());
    assert!(chrono::DateTime::parse_from_rfc3339(&first.created_at).is_ok());
}

#[test]
fn brief_text_uses_placeholders_for_missing_fields() {
    let brief = sample_brief();

    assert_eq!(
        brief.text_representation(),
        "Campaign Brief: Trail Runner X\n\
         Description: A lightweight trail shoe\n\
         Target Audience: Weekend hikers\n\
         Campaign Goals: Drive pre-orders\n\
         Tone: Not specified\n\
         Key Selling Points: "
    );
}

#[test]
fn brief_text_lists_tone_and_selling_points() {
    let brief = sample_brief()
        .with_tone("Adventurous")
        .with_key_selling_points(vec!["Grippy sole".to_string(), "Waterproof".to_string()]);

    let text = brief.text_representation();

    assert!(text.contains("Tone: Adventurous\n"));
    assert!(text.ends_with("Key Selling Points: Grippy sole, Waterproof"));
}

#[test]
fn brief_metadata_is_a_small_summary() {
    let brief = sample_brief();

    let metadata = brief.metadata();

    assert_eq!(metadata.len(), 4);
    assert_eq!(metadata["type"], json!("campaign_brief"));
    assert_eq!(metadata["brief_id"], json!(brief.brief_id));
    assert_eq!(metadata["product_name"], json!("Trail Runner X"));
}

#[test]
fn ad_text_joins_variations() {
    let ad = GeneratedAd::new(
        "brief-1",
        "social_media",
        vec!["Run further.".to_string(), "Climb higher.".to_string()],
    );

    assert_eq!(
        ad.text_representation(),
        "Ad Type: social_media\nVariations:\nRun further. Climb higher."
    );
    assert_eq!(ad.metadata()["ad_type"], json!("social_media"));
    assert_eq!(ad.metadata()["brief_id"], json!("brief-1"));
}

#[test]
fn ad_from_generation_parses_requested_count() {
    let ad = GeneratedAd::from_generation(
        "brief-1",
        "headline",
        "1. Go far\n2. Go fast\n3. Go now",
        2,
    );

    assert_eq!(ad.variations, vec!["Go far", "Go fast"]);
}

#[test]
fn feedback_text_renders_score_and_processed_json() {
    let feedback = Feedback::new("ad-1", "brief-1", "Love the energy")
        .with_score(4)
        .with_processed_feedback(json!({ "sentiment": "positive" }));

    assert_eq!(
        feedback.text_representation(),
        "Feedback: Love the energy\nScore: 4\nProcessed Feedback: {\"sentiment\":\"positive\"}"
    );
}

#[test]
fn feedback_text_without_optional_fields() {
    let feedback = Feedback::new("ad-1", "brief-1", "Meh");

    assert_eq!(
        feedback.text_representation(),
        "Feedback: Meh\nScore: Not provided\nProcessed Feedback: {}"
    );
}

#[test]
fn recommendation_text_renders_strings_bare() {
    let plain = Recommendation::new("brief-1", json!("Shorten the headline"));
    let list = Recommendation::new("brief-1", json!(["a", "b"]));

    assert_eq!(
        plain.text_representation(),
        "Recommendations: Shorten the headline"
    );
    assert_eq!(list.text_representation(), "Recommendations: [\"a\",\"b\"]");
}

#[test]
fn unknown_fields_survive_serialization() {
    let raw = json!({
        "brief_id": "b-1",
        "created_at": "2024-01-01T00:00:00Z",
        "product_name": "Lamp",
        "description": "Desk lamp",
        "target_audience": "Students",
        "campaign_goals": "Sales",
        "budget": 5000
    });

    let brief: CampaignBrief = serde_json::from_value(raw).expect("should parse brief");

    assert_eq!(brief.tone, None);
    assert!(brief.key_selling_points.is_empty());
    assert_eq!(brief.extra.get("budget"), Some(&json!(5000)));

    let back = serde_json::to_value(&brief).expect("should serialize brief");
    assert_eq!(back["budget"], json!(5000));
}
