//! Test utilities for the backend crate.
//!
//! Shared doubles for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.

pub mod clock {
    //! Clock double whose current instant is set by the test.

    use std::sync::Mutex;

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Clock that only moves when told to.
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        pub fn advance(&self, delta: TimeDelta) {
            *self.lock_clock() += delta;
        }

        pub fn advance_seconds(&self, seconds: i64) {
            self.advance(TimeDelta::seconds(seconds));
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.lock_clock() = now;
        }

        fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod grading {
    //! Deterministic grader doubles.

    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::domain::ports::{BagGrader, BagGraderError, ClubInventoryRepository};
    use crate::domain::{Club, Grade, ImpactCategory, OwnerId};

    /// Grader scoring the owner's active clubs from their specifications.
    ///
    /// The score depends only on the set of active clubs, so restoring a
    /// bag restores its grade.
    pub struct InventoryScoringGrader<I> {
        inventory: Arc<I>,
    }

    impl<I> InventoryScoringGrader<I> {
        pub fn new(inventory: Arc<I>) -> Self {
            Self { inventory }
        }
    }

    /// Score a list of clubs.
    pub fn score_clubs(clubs: &[Club]) -> Grade {
        let mut sorted: Vec<&Club> = clubs.iter().collect();
        sorted.sort_by(|left, right| left.id.cmp(&right.id));

        let count = sorted.len() as f64;
        let mean = |values: Vec<f64>| {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        };
        let age = mean(
            sorted
                .iter()
                .filter_map(|club| club.year)
                .map(|year| f64::from((year - 2000).clamp(0, 30)) * 3.0)
                .collect(),
        );
        let distinct_lofts: BTreeSet<i64> = sorted
            .iter()
            .filter_map(|club| club.specs.loft)
            .map(|loft| (loft * 10.0).round() as i64)
            .collect();
        let loft_gapping = if count == 0.0 {
            0.0
        } else {
            100.0 * distinct_lofts.len() as f64 / count
        };
        let weight = mean(
            sorted
                .iter()
                .filter_map(|club| club.specs.shaft.weight)
                .map(|weight| (weight / 1.3).min(100.0))
                .collect(),
        );

        let mut component_scores = BTreeMap::new();
        component_scores.insert(ImpactCategory::Age.as_str().to_owned(), age);
        component_scores.insert(
            ImpactCategory::LoftGapping.as_str().to_owned(),
            loft_gapping,
        );
        component_scores.insert(
            ImpactCategory::WeightProgression.as_str().to_owned(),
            weight,
        );

        let overall = ((age + loft_gapping + weight) / 3.0 * 10.0).round() / 10.0;
        Grade {
            overall_score: overall,
            letter_grade: letter_for(overall).to_owned(),
            component_scores,
        }
    }

    fn letter_for(score: f64) -> &'static str {
        match score {
            s if s >= 90.0 => "A",
            s if s >= 80.0 => "B",
            s if s >= 70.0 => "C",
            s if s >= 60.0 => "D",
            _ => "F",
        }
    }

    #[async_trait]
    impl<I> BagGrader for InventoryScoringGrader<I>
    where
        I: ClubInventoryRepository,
    {
        async fn grade(&self, owner_id: &OwnerId) -> Result<Grade, BagGraderError> {
            let clubs = self
                .inventory
                .list_active(owner_id)
                .await
                .map_err(|error| BagGraderError::unavailable(error.to_string()))?;
            Ok(score_clubs(&clubs))
        }
    }

    /// Grader wrapper that can be switched into a failing state.
    pub struct SwitchableGrader<G> {
        inner: G,
        failing: AtomicBool,
    }

    impl<G> SwitchableGrader<G> {
        pub fn new(inner: G) -> Self {
            Self {
                inner,
                failing: AtomicBool::new(false),
            }
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl<G> BagGrader for SwitchableGrader<G>
    where
        G: BagGrader,
    {
        async fn grade(&self, owner_id: &OwnerId) -> Result<Grade, BagGraderError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(BagGraderError::unavailable("grader switched off"));
            }
            self.inner.grade(owner_id).await
        }
    }
}

pub mod fixtures {
    //! Club builders for common bag shapes.

    use chrono::{DateTime, Utc};

    use crate::domain::{Club, ClubSpecs, OwnerId, ShaftSpec};

    /// One club with a loft and shaft weight.
    pub fn club(
        owner_id: &OwnerId,
        club_type: &str,
        loft: f64,
        added_at: DateTime<Utc>,
    ) -> Club {
        Club::builder(owner_id.clone(), club_type)
            .make("Mizuno", "JPX 919")
            .year(2019)
            .specs(ClubSpecs {
                loft: Some(loft),
                lie: Some(62.0),
                length: Some(37.0),
                shaft: ShaftSpec {
                    weight: Some(115.0),
                    flex: Some("Stiff".to_owned()),
                    ..ShaftSpec::default()
                },
            })
            .added_to_bag_at(added_at)
            .build()
    }

    /// A 5-iron through pitching wedge set plus a driver and putter.
    pub fn standard_bag(owner_id: &OwnerId, added_at: DateTime<Utc>) -> Vec<Club> {
        let irons = [
            ("5-iron", 27.0),
            ("6-iron", 30.0),
            ("7-iron", 34.0),
            ("8-iron", 38.0),
            ("9-iron", 42.0),
            ("PW", 46.0),
        ];
        let mut clubs: Vec<Club> = irons
            .iter()
            .map(|(club_type, loft)| club(owner_id, club_type, *loft, added_at))
            .collect();
        clubs.push(club(owner_id, "Driver", 10.5, added_at));
        clubs.push(club(owner_id, "Putter", 3.0, added_at));
        clubs
    }
}

pub mod harness {
    //! Fully wired services over the in-memory store.

    use std::sync::Arc;

    use chrono::{DateTime, TimeDelta, Utc};
    use mockable::Clock;

    use super::clock::MutableClock;
    use super::grading::{InventoryScoringGrader, SwitchableGrader};
    use crate::domain::{
        BagMutationService, BagPorts, Club, OwnerLocks, ReplacementAdvisorService, UndoService,
    };
    use crate::inbound::BagOperations;
    use crate::outbound::memory::InMemoryBagStore;

    /// Grader used by the harness.
    pub type HarnessGrader = SwitchableGrader<InventoryScoringGrader<InMemoryBagStore>>;

    /// Services, store and clock for end-to-end tests.
    pub struct BagHarness {
        pub store: Arc<InMemoryBagStore>,
        pub clock: Arc<MutableClock>,
        pub grader: Arc<HarnessGrader>,
        pub operations: BagOperations,
    }

    impl BagHarness {
        /// Wire the services with the default undo window.
        pub fn new(now: DateTime<Utc>) -> Self {
            Self::with_undo_window(now, TimeDelta::days(crate::domain::DEFAULT_UNDO_WINDOW_DAYS))
        }

        /// Wire the services with an explicit undo window.
        pub fn with_undo_window(now: DateTime<Utc>, undo_window: TimeDelta) -> Self {
            Self::wire(now, undo_window, InMemoryBagStore::new())
        }

        /// Wire the services over an existing store, such as one rebuilt from
        /// a snapshot file.
        pub fn from_store(now: DateTime<Utc>, store: InMemoryBagStore) -> Self {
            Self::wire(
                now,
                TimeDelta::days(crate::domain::DEFAULT_UNDO_WINDOW_DAYS),
                store,
            )
        }

        fn wire(now: DateTime<Utc>, undo_window: TimeDelta, store: InMemoryBagStore) -> Self {
            let store = Arc::new(store);
            let clock = Arc::new(MutableClock::new(now));
            let grader = Arc::new(SwitchableGrader::new(InventoryScoringGrader::new(
                Arc::clone(&store),
            )));
            let shared_clock: Arc<dyn Clock> = clock.clone();
            let locks = Arc::new(OwnerLocks::default());
            let ports = BagPorts::new(Arc::clone(&store), Arc::clone(&store), Arc::clone(&grader));

            let mutations = BagMutationService::new(
                ports.clone(),
                Arc::clone(&shared_clock),
                Arc::clone(&locks),
            )
            .with_undo_window(undo_window);
            let undo = Arc::new(UndoService::new(ports, shared_clock, locks));
            let operations = BagOperations {
                advisor: Arc::new(ReplacementAdvisorService::new(Arc::clone(&store))),
                mutations: Arc::new(mutations),
                undo: undo.clone(),
                history: undo,
            };

            Self {
                store,
                clock,
                grader,
                operations,
            }
        }

        /// Seed clubs into the store.
        pub async fn seed(&self, clubs: impl IntoIterator<Item = Club>) {
            for club in clubs {
                self.store.seed_club(club).await;
            }
        }
    }
}
