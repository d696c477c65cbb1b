//! Replacement strategy advisor service.
//!
//! Combines the immutable strategy table with a read of the owner's active
//! inventory to describe the matched set a replacement could cover.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{ClubInventoryRepository, ReplacementAdvisor, SuggestReplacementRequest};
use crate::domain::{
    Club, ClubCategory, Error, OwnerId, Recommendation, SetOptions, classify, default_set_range,
    iron_rank_label, policy_for,
};

/// Advisor implementing the [`ReplacementAdvisor`] driving port.
#[derive(Clone)]
pub struct ReplacementAdvisorService<I> {
    inventory: Arc<I>,
}

impl<I> ReplacementAdvisorService<I> {
    /// Create an advisor reading from `inventory`.
    pub fn new(inventory: Arc<I>) -> Self {
        Self { inventory }
    }
}

impl<I> ReplacementAdvisorService<I>
where
    I: ClubInventoryRepository,
{
    async fn describe_set(&self, owner_id: &OwnerId, category: ClubCategory) -> SetOptions {
        match self.inventory.list_active(owner_id).await {
            Ok(clubs) => summarise_category(category, &clubs),
            Err(error) => {
                warn!(%owner_id, %category, %error, "inventory read failed; set range unknown");
                SetOptions::unknown()
            }
        }
    }
}

/// Describe the owner's current clubs of `category` as a set range.
///
/// Irons (including the pitching wedge) render as a rank span such as
/// `5-PW`; other categories render as a sorted list of canonical names.
/// An empty category reports `None` alongside the canonical default range.
pub fn summarise_category(category: ClubCategory, clubs: &[Club]) -> SetOptions {
    let (current_range, count) = if category == ClubCategory::Iron {
        let ranks: Vec<u8> = clubs.iter().filter_map(Club::iron_rank).collect();
        let range = ranks
            .iter()
            .min()
            .zip(ranks.iter().max())
            .map(|(low, high)| rank_span(*low, *high));
        (range, ranks.len())
    } else {
        let members: Vec<&Club> = clubs
            .iter()
            .filter(|club| club.category() == category)
            .collect();
        let names: BTreeSet<String> = members.iter().map(|club| club.canonical_type()).collect();
        let range = (!names.is_empty()).then(|| names.into_iter().collect::<Vec<_>>().join(", "));
        (range, members.len())
    };

    match current_range {
        Some(range) => SetOptions {
            suggested_range: range.clone(),
            current_range: range,
            clubs_affected: count,
        },
        None => {
            let (suggested_range, clubs_affected) = default_set_range(category)
                .map_or(("None".to_owned(), 0), |default| {
                    (default.range.to_owned(), default.clubs)
                });
            SetOptions {
                current_range: "None".to_owned(),
                suggested_range,
                clubs_affected,
            }
        }
    }
}

fn rank_span(low: u8, high: u8) -> String {
    if low == high {
        iron_rank_label(low)
    } else {
        format!("{}-{}", iron_rank_label(low), iron_rank_label(high))
    }
}

#[async_trait]
impl<I> ReplacementAdvisor for ReplacementAdvisorService<I>
where
    I: ClubInventoryRepository,
{
    async fn suggest_replacement(
        &self,
        request: SuggestReplacementRequest,
    ) -> Result<Recommendation, Error> {
        let category = classify(&request.club_type);
        let policy = policy_for(category);
        debug!(
            owner_id = %request.owner_id,
            winning_club_id = %request.winning_club_id,
            %category,
            "suggesting replacement strategy"
        );

        let set_options = if policy.show_set_option {
            Some(self.describe_set(&request.owner_id, category).await)
        } else {
            None
        };
        Ok(Recommendation::from_policy(policy, set_options))
    }
}

#[cfg(test)]
mod tests {
    //! Advisor behaviour against a mocked inventory.
    use super::*;
    use crate::domain::ports::{ClubInventoryRepositoryError, MockClubInventoryRepository};
    use crate::domain::{ClubId, Confidence, ReplacementMode};
    use rstest::rstest;

    fn bag(owner: &OwnerId, types: &[&str]) -> Vec<Club> {
        types
            .iter()
            .map(|kind| Club::builder(owner.clone(), *kind).build())
            .collect()
    }

    fn request(owner: &OwnerId, club_type: &str) -> SuggestReplacementRequest {
        SuggestReplacementRequest {
            owner_id: owner.clone(),
            club_type: club_type.to_owned(),
            winning_club_id: ClubId::random(),
        }
    }

    fn advisor_with(clubs: Vec<Club>) -> ReplacementAdvisorService<MockClubInventoryRepository> {
        let mut inventory = MockClubInventoryRepository::new();
        inventory
            .expect_list_active()
            .returning(move |_| Ok(clubs.clone()));
        ReplacementAdvisorService::new(Arc::new(inventory))
    }

    #[tokio::test]
    async fn driver_is_single_without_inventory_read() {
        let mut inventory = MockClubInventoryRepository::new();
        inventory.expect_list_active().times(0);
        let advisor = ReplacementAdvisorService::new(Arc::new(inventory));

        let recommendation = advisor
            .suggest_replacement(request(&OwnerId::random(), "Driver"))
            .await
            .expect("recommendation");

        assert_eq!(recommendation.default_option, ReplacementMode::Single);
        assert!(!recommendation.show_set_option);
        assert_eq!(recommendation.confidence, Confidence::High);
        assert!(recommendation.set_options.is_none());
    }

    #[tokio::test]
    async fn irons_report_current_range_including_pitching_wedge() {
        let owner = OwnerId::random();
        let advisor = advisor_with(bag(
            &owner,
            &["5-iron", "6-iron", "7-iron", "8-iron", "9-iron", "PW", "SW", "Driver"],
        ));

        let recommendation = advisor
            .suggest_replacement(request(&owner, "7 iron"))
            .await
            .expect("recommendation");

        assert_eq!(recommendation.default_option, ReplacementMode::Set);
        assert!(recommendation.show_set_option);
        let options = recommendation.set_options.expect("set options");
        assert_eq!(options.current_range, "5-PW");
        assert_eq!(options.suggested_range, "5-PW");
        assert_eq!(options.clubs_affected, 6);
    }

    #[tokio::test]
    async fn empty_category_reports_default_range() {
        let owner = OwnerId::random();
        let advisor = advisor_with(bag(&owner, &["Driver", "Putter"]));

        let options = advisor
            .suggest_replacement(request(&owner, "4-hybrid"))
            .await
            .expect("recommendation")
            .set_options
            .expect("set options");

        assert_eq!(options.current_range, "None");
        assert_eq!(options.suggested_range, "3-hybrid, 4-hybrid");
        assert_eq!(options.clubs_affected, 2);
    }

    #[tokio::test]
    async fn inventory_failure_degrades_to_unknown() {
        let mut inventory = MockClubInventoryRepository::new();
        inventory
            .expect_list_active()
            .returning(|_| Err(ClubInventoryRepositoryError::connection("refused")));
        let advisor = ReplacementAdvisorService::new(Arc::new(inventory));

        let recommendation = advisor
            .suggest_replacement(request(&OwnerId::random(), "SW"))
            .await
            .expect("recommendation despite failure");

        assert_eq!(recommendation.confidence, Confidence::Medium);
        assert_eq!(recommendation.set_options, Some(SetOptions::unknown()));
    }

    #[tokio::test]
    async fn unknown_type_is_low_confidence_single() {
        let advisor = advisor_with(Vec::new());
        let recommendation = advisor
            .suggest_replacement(request(&OwnerId::random(), "chipper"))
            .await
            .expect("recommendation");
        assert_eq!(recommendation.confidence, Confidence::Low);
        assert!(!recommendation.show_set_option);
    }

    #[rstest]
    fn woods_list_sorted_distinct_names_and_count_duplicates() {
        let owner = OwnerId::random();
        let clubs = bag(&owner, &["5w", "3 wood", "5-wood", "Driver"]);
        let options = summarise_category(ClubCategory::Wood, &clubs);
        assert_eq!(options.current_range, "3-wood, 5-wood");
        assert_eq!(options.clubs_affected, 3);
    }

    #[rstest]
    fn single_iron_renders_one_label() {
        let owner = OwnerId::random();
        let options = summarise_category(ClubCategory::Iron, &bag(&owner, &["7i"]));
        assert_eq!(options.current_range, "7");
        assert_eq!(options.clubs_affected, 1);
    }
}
