/// Operation facade over the arena.
///
/// Every method maps one-to-one onto an outer route: it owns input
/// validation and pagination defaults, the arena owns the state changes.
/// An HTTP layer only has to parse parameters and serialize the results.
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::arena::{
    FollowOutcome, LeaderboardArena, LeaderboardPage, SortKey, TournamentBook, TournamentSpec,
    DEFAULT_MAX_PARTICIPANTS,
};
use crate::core::{
    Address, ArenaAnalytics, Comment, Pagination, Tournament, WalletDetail, WalletSummary,
};

use super::error::ApiError;

const DEFAULT_LEADERBOARD_LIMIT: usize = 50;
const DEFAULT_COMMENTS_LIMIT: usize = 20;
const DEFAULT_TOURNAMENTS_LIMIT: usize = 10;

/// Body of a wallet registration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddWalletRequest {
    pub address: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Body of a follow toggle
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub follower_address: Option<String>,
}

/// Body of a new comment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub comment: Option<String>,
    pub author_address: Option<String>,
    pub author_name: Option<String>,
}

/// Body of a tournament creation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Duration in hours
    #[serde(rename = "duration")]
    pub duration_hours: Option<u64>,
    pub prize: Option<String>,
    pub max_participants: Option<usize>,
    pub rules: Option<Vec<String>>,
}

/// Body of a tournament join
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTournamentRequest {
    pub wallet_address: Option<String>,
}

/// One page of a wallet's comments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsPage {
    pub comments: Vec<Comment>,
    pub pagination: Pagination,
}

/// One page of the tournament list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentsPage {
    pub tournaments: Vec<Tournament>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTournamentResponse {
    pub success: bool,
    pub participants: usize,
    pub max_participants: usize,
}

/// Liveness report with upstream status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "uptime")]
    pub uptime_secs: f64,
    pub wallets: usize,
    pub tournaments: usize,
    #[serde(rename = "zerionAPI")]
    pub zerion_api: &'static str,
    pub data_source: &'static str,
}

pub struct ArenaApi {
    arena: Arc<LeaderboardArena>,
    tournaments: Arc<TournamentBook>,
    started_at: Instant,
}

impl ArenaApi {
    pub fn new(arena: Arc<LeaderboardArena>, tournaments: Arc<TournamentBook>) -> Self {
        Self {
            arena,
            tournaments,
            started_at: Instant::now(),
        }
    }

    pub async fn add_wallet(&self, req: AddWalletRequest) -> Result<WalletSummary, ApiError> {
        let raw = req.address.unwrap_or_default();
        if raw.trim().is_empty() {
            return Err(ApiError::MissingAddress);
        }
        let address = Address::parse(&raw)?;
        self.arena.register(address, req.name, req.description).await
    }

    pub async fn leaderboard(
        &self,
        sort: Option<&str>,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> LeaderboardPage {
        self.arena
            .leaderboard_page(
                SortKey::parse(sort.unwrap_or("score")),
                page.unwrap_or(1),
                limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT),
            )
            .await
    }

    /// Wallet detail, refreshed live. A vendor failure during the refresh
    /// falls back to the cached snapshot rather than failing the read.
    pub async fn wallet(&self, raw_address: &str) -> Result<WalletDetail, ApiError> {
        let address = lookup_address(raw_address)?;
        self.arena.refresh_wallet(&address).await?;
        self.arena.wallet_detail(&address)
    }

    pub fn follow(&self, raw_target: &str, req: FollowRequest) -> Result<FollowOutcome, ApiError> {
        let target = lookup_address(raw_target)?;
        let raw = req.follower_address.unwrap_or_default();
        if raw.trim().is_empty() {
            return Err(ApiError::MissingFollower);
        }
        let follower = Address::parse(&raw)?;
        self.arena.toggle_follow(&target, follower)
    }

    pub fn add_comment(&self, raw_target: &str, req: NewComment) -> Result<Comment, ApiError> {
        let target = lookup_address(raw_target)?;
        self.arena.add_comment(
            &target,
            req.comment.as_deref().unwrap_or(""),
            req.author_address,
            req.author_name,
        )
    }

    pub fn comments(
        &self,
        raw_target: &str,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Result<CommentsPage, ApiError> {
        let target = lookup_address(raw_target)?;
        let all = self.arena.comments(&target)?;

        let pagination = Pagination::new(
            page.unwrap_or(1).max(1),
            limit.unwrap_or(DEFAULT_COMMENTS_LIMIT).max(1),
            all.len(),
        );
        let comments = all
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit)
            .collect();
        Ok(CommentsPage {
            comments,
            pagination,
        })
    }

    pub fn create_tournament(&self, req: NewTournament) -> Result<Tournament, ApiError> {
        let name = req.name.filter(|s| !s.trim().is_empty());
        let description = req.description.filter(|s| !s.trim().is_empty());
        let prize = req.prize.filter(|s| !s.trim().is_empty());
        let duration = req.duration_hours.filter(|d| *d > 0);

        let (Some(name), Some(description), Some(duration), Some(prize)) =
            (name, description, duration, prize)
        else {
            return Err(ApiError::MissingFields);
        };

        Ok(self.tournaments.create(TournamentSpec {
            name,
            description,
            duration_hours: duration,
            prize,
            max_participants: req.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS),
            rules: req.rules.unwrap_or_default(),
        }))
    }

    pub fn tournaments(
        &self,
        status: Option<&str>,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> TournamentsPage {
        let all = self.tournaments.list(status);

        let pagination = Pagination::new(
            page.unwrap_or(1).max(1),
            limit.unwrap_or(DEFAULT_TOURNAMENTS_LIMIT).max(1),
            all.len(),
        );
        let tournaments = all
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit)
            .collect();
        TournamentsPage {
            tournaments,
            pagination,
        }
    }

    pub fn join_tournament(
        &self,
        id: u64,
        req: JoinTournamentRequest,
    ) -> Result<JoinTournamentResponse, ApiError> {
        let raw = req.wallet_address.unwrap_or_default();
        if raw.trim().is_empty() {
            return Err(ApiError::MissingAddress);
        }
        let wallet = Address::parse(&raw)?;

        let outcome = self.tournaments.join(id, &wallet)?;
        Ok(JoinTournamentResponse {
            success: true,
            participants: outcome.participants,
            max_participants: outcome.max_participants,
        })
    }

    pub async fn health(&self) -> HealthReport {
        let active = self.arena.upstream_active().await;
        HealthReport {
            status: "healthy",
            timestamp: Utc::now(),
            uptime_secs: self.started_at.elapsed().as_secs_f64(),
            wallets: self.arena.wallet_count(),
            tournaments: self.tournaments.count(),
            zerion_api: if active { "active" } else { "inactive" },
            data_source: self.arena.data_source().await,
        }
    }

    pub fn analytics(&self) -> ArenaAnalytics {
        self.arena.analytics()
    }
}

/// Path addresses are lookups: a string that cannot even be parsed can never
/// have been registered, so it reads as not-found rather than bad-request
fn lookup_address(raw: &str) -> Result<Address, ApiError> {
    Address::parse(raw).map_err(|_| ApiError::WalletNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::source::testing::ScriptedSource;
    use crate::portfolio::SnapshotEngine;
    use crate::transport::UpdateBus;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const MAKER: &str = "0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2";
    const NEUTRAL: &str = "0x1111111111111111111111111111111111111111";

    fn api() -> ArenaApi {
        let source = Arc::new(ScriptedSource::new(false));
        let engine = Arc::new(SnapshotEngine::new(source, Duration::from_millis(50)));
        let bus = Arc::new(UpdateBus::new());
        let (kick_tx, _kick_rx) = mpsc::channel(1);
        let arena = Arc::new(LeaderboardArena::new(engine, bus, kick_tx, 4));
        ArenaApi::new(arena, Arc::new(TournamentBook::new()))
    }

    fn wallet_req(address: &str) -> AddWalletRequest {
        AddWalletRequest {
            address: Some(address.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn add_wallet_validates_address() {
        let api = api();

        let missing = api.add_wallet(AddWalletRequest::default()).await;
        assert_eq!(missing.unwrap_err(), ApiError::MissingAddress);

        let blank = api.add_wallet(wallet_req("   ")).await;
        assert_eq!(blank.unwrap_err(), ApiError::MissingAddress);

        let invalid = api.add_wallet(wallet_req("not-an-address")).await;
        let err = invalid.unwrap_err();
        assert_eq!(err, ApiError::InvalidAddress);
        assert_eq!(err.status(), 400);
        assert_eq!(err.code(), "INVALID_ADDRESS");
    }

    #[tokio::test]
    async fn add_wallet_normalizes_and_conflicts() {
        let api = api();

        let mixed = "0x9F8F72AA9304c8B593d555F12eF6589cC3A579A2";
        let summary = api.add_wallet(wallet_req(mixed)).await.unwrap();
        assert_eq!(summary.address, MAKER);

        let duplicate = api.add_wallet(wallet_req(MAKER)).await.unwrap_err();
        assert_eq!(duplicate, ApiError::WalletExists);
        assert_eq!(duplicate.status(), 409);
    }

    #[tokio::test]
    async fn comment_rules_surface_the_right_codes() {
        let api = api();
        api.add_wallet(wallet_req(MAKER)).await.unwrap();

        let too_long = NewComment {
            comment: Some("x".repeat(501)),
            ..Default::default()
        };
        let err = api.add_comment(MAKER, too_long).unwrap_err();
        assert_eq!(err, ApiError::CommentTooLong);
        assert_eq!(err.status(), 400);
        assert_eq!(err.code(), "COMMENT_TOO_LONG");
        assert_eq!(
            err.to_body()["error"],
            "Comment too long (max 500 characters)"
        );

        let at_limit = NewComment {
            comment: Some("y".repeat(500)),
            ..Default::default()
        };
        assert!(api.add_comment(MAKER, at_limit).is_ok());

        let empty = api.add_comment(MAKER, NewComment::default()).unwrap_err();
        assert_eq!(empty, ApiError::EmptyComment);
    }

    #[tokio::test]
    async fn comments_paginate_oldest_first() {
        let api = api();
        api.add_wallet(wallet_req(MAKER)).await.unwrap();
        for text in ["one", "two", "three"] {
            let req = NewComment {
                comment: Some(text.to_string()),
                ..Default::default()
            };
            api.add_comment(MAKER, req).unwrap();
        }

        let page = api.comments(MAKER, Some(2), Some(2)).unwrap();
        assert_eq!(page.comments.len(), 1);
        assert_eq!(page.comments[0].text, "three");
        assert_eq!(
            page.pagination,
            Pagination {
                page: 2,
                limit: 2,
                total: 3,
                pages: 2
            }
        );
    }

    #[tokio::test]
    async fn wallet_lookup_by_string() {
        let api = api();
        api.add_wallet(wallet_req(MAKER)).await.unwrap();

        let detail = api
            .wallet("0x9F8F72AA9304c8B593d555F12eF6589cC3A579A2")
            .await
            .unwrap();
        assert_eq!(detail.address, MAKER);
        assert_eq!(detail.rank, Some(1));

        let unknown = api.wallet(NEUTRAL).await.unwrap_err();
        assert_eq!(unknown, ApiError::WalletNotFound);
        assert_eq!(unknown.status(), 404);

        let garbage = api.wallet("garbage").await.unwrap_err();
        assert_eq!(garbage, ApiError::WalletNotFound);
    }

    #[tokio::test]
    async fn follow_requires_a_follower() {
        let api = api();
        api.add_wallet(wallet_req(MAKER)).await.unwrap();

        let missing = api.follow(MAKER, FollowRequest::default()).unwrap_err();
        assert_eq!(missing, ApiError::MissingFollower);

        let malformed = api
            .follow(
                MAKER,
                FollowRequest {
                    follower_address: Some("0xzz".into()),
                },
            )
            .unwrap_err();
        assert_eq!(malformed, ApiError::InvalidAddress);

        let outcome = api
            .follow(
                MAKER,
                FollowRequest {
                    follower_address: Some(NEUTRAL.to_string()),
                },
            )
            .unwrap();
        assert!(outcome.is_following);
        assert_eq!(outcome.followers_count, 1);
    }

    #[tokio::test]
    async fn tournament_creation_requires_all_fields() {
        let api = api();

        let err = api.create_tournament(NewTournament::default()).unwrap_err();
        assert_eq!(err, ApiError::MissingFields);

        let zero_duration = NewTournament {
            name: Some("Clash".into()),
            description: Some("weekly".into()),
            duration_hours: Some(0),
            prize: Some("1 ETH".into()),
            ..Default::default()
        };
        assert_eq!(
            api.create_tournament(zero_duration).unwrap_err(),
            ApiError::MissingFields
        );

        let created = api
            .create_tournament(NewTournament {
                name: Some("Clash".into()),
                description: Some("weekly".into()),
                duration_hours: Some(24),
                prize: Some("1 ETH".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.max_participants, 100);
        assert!(created.rules.is_empty());
    }

    #[tokio::test]
    async fn tournament_join_flow() {
        let api = api();
        let created = api
            .create_tournament(NewTournament {
                name: Some("Clash".into()),
                description: Some("weekly".into()),
                duration_hours: Some(24),
                prize: Some("1 ETH".into()),
                ..Default::default()
            })
            .unwrap();

        let missing = api
            .join_tournament(created.id, JoinTournamentRequest::default())
            .unwrap_err();
        assert_eq!(missing, ApiError::MissingAddress);

        let malformed = api
            .join_tournament(
                created.id,
                JoinTournamentRequest {
                    wallet_address: Some("nope".into()),
                },
            )
            .unwrap_err();
        assert_eq!(malformed, ApiError::InvalidAddress);

        let joined = api
            .join_tournament(
                created.id,
                JoinTournamentRequest {
                    wallet_address: Some(NEUTRAL.to_string()),
                },
            )
            .unwrap();
        assert!(joined.success);
        assert_eq!(joined.participants, 1);
        assert_eq!(joined.max_participants, 100);

        let again = api
            .join_tournament(
                created.id,
                JoinTournamentRequest {
                    wallet_address: Some(NEUTRAL.to_string()),
                },
            )
            .unwrap_err();
        assert_eq!(again, ApiError::AlreadyJoined);

        let listed = api.tournaments(Some("active"), None, None);
        assert_eq!(listed.tournaments.len(), 1);
        assert_eq!(listed.pagination.limit, 10);
    }

    #[tokio::test]
    async fn health_report_shape() {
        let api = api();
        api.add_wallet(wallet_req(MAKER)).await.unwrap();

        let health = api.health().await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.wallets, 1);
        assert_eq!(health.tournaments, 0);
        assert_eq!(health.zerion_api, "inactive");
        assert_eq!(health.data_source, "enhanced");

        let json = serde_json::to_value(&health).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("zerionAPI"));
        assert!(obj.contains_key("dataSource"));
        assert!(obj.contains_key("uptime"));
    }

    #[tokio::test]
    async fn leaderboard_defaults_apply() {
        let api = api();
        api.add_wallet(wallet_req(MAKER)).await.unwrap();
        api.add_wallet(wallet_req(NEUTRAL)).await.unwrap();

        let page = api.leaderboard(None, None, None).await;
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.limit, 50);
        assert_eq!(page.wallets.len(), 2);
        // Protocol bucket outscores the default bucket
        assert_eq!(page.wallets[0].address, MAKER);

        let body_deserializes: AddWalletRequest =
            serde_json::from_str(r#"{"address": "0x1111111111111111111111111111111111111111"}"#)
                .unwrap();
        assert_eq!(body_deserializes.address.as_deref(), Some(NEUTRAL));
        assert_eq!(body_deserializes.name, None);
    }
}
