//! End-to-end list/post flows against a file-backed store.

use std::sync::Arc;

use livepipe_core::{AuthenticatedUser, Limit, LivestreamId, UserId};
use livepipe_hydrate::{fallback_icon_hash, icon_hash, ReactionService};
use livepipe_store::{
    new_file, run_migrations, ConnectionConfig, ConnectionPool, ConnectionProvider, IconRepo,
    LivestreamRepo, NewLivestream, NewUser, TagRepo, ThemeRepo, UserRepo,
};
use tokio_util::sync::CancellationToken;

struct Fixture {
    _dir: tempfile::TempDir,
    pool: ConnectionPool,
    viewer: UserId,
    owner: UserId,
    stream: LivestreamId,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flow.db");
    let pool = new_file(path.to_str().unwrap(), &ConnectionConfig::default()).unwrap();
    let conn = pool.acquire().unwrap();
    run_migrations(&conn).unwrap();

    let viewer = UserRepo::insert(
        &conn,
        &NewUser {
            name: "viewer".into(),
            display_name: "Viewer".into(),
            description: "watches".into(),
        },
    )
    .unwrap();
    let owner = UserRepo::insert(
        &conn,
        &NewUser {
            name: "streamer".into(),
            display_name: "Streamer".into(),
            description: "streams".into(),
        },
    )
    .unwrap();
    let _ = ThemeRepo::insert(&conn, owner.id, true).unwrap();
    let _ = IconRepo::insert(&conn, viewer.id, b"viewer-icon").unwrap();

    let stream = LivestreamRepo::insert(
        &conn,
        &NewLivestream {
            user_id: owner.id,
            title: "late show".into(),
            description: "talk".into(),
            playlist_url: "https://media.example/late.m3u8".into(),
            thumbnail_url: "https://media.example/late.jpg".into(),
            start_at: 1_000,
            end_at: 2_000,
        },
    )
    .unwrap();
    let tag = TagRepo::insert(&conn, "talk").unwrap();
    TagRepo::attach(&conn, stream.id, tag.id).unwrap();
    drop(conn);

    Fixture {
        _dir: dir,
        pool,
        viewer: viewer.id,
        owner: owner.id,
        stream: stream.id,
    }
}

#[test]
fn posted_reaction_is_fully_hydrated() {
    let fx = fixture();
    let service = ReactionService::new(Arc::new(fx.pool.clone()));

    let reaction = service
        .post_reaction(
            AuthenticatedUser::new(fx.viewer),
            fx.stream,
            "fire".into(),
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(reaction.emoji_name, "fire");
    assert_eq!(reaction.user.id, fx.viewer);
    assert_eq!(reaction.user.icon_hash, icon_hash(b"viewer-icon"));
    assert!(!reaction.user.theme.dark_mode);
    assert_eq!(reaction.livestream.id, fx.stream);
    assert_eq!(reaction.livestream.owner.id, fx.owner);
    assert!(reaction.livestream.owner.theme.dark_mode);
    assert_eq!(reaction.livestream.owner.icon_hash, fallback_icon_hash());
    assert_eq!(reaction.livestream.tags.len(), 1);
    assert_eq!(reaction.livestream.tags[0].name, "talk");
}

#[test]
fn listing_orders_same_second_posts_by_id() {
    let fx = fixture();
    let service = ReactionService::new(Arc::new(fx.pool.clone()));
    let cancel = CancellationToken::new();

    for emoji in ["a", "b", "c", "d"] {
        let _ = service
            .post_reaction(AuthenticatedUser::new(fx.viewer), fx.stream, emoji.into(), &cancel)
            .unwrap();
    }

    let listed = service.list_reactions(fx.stream, None, &cancel).unwrap();
    assert_eq!(listed.len(), 4);
    // Same-second posts fall back to id order, newest first.
    let ids: Vec<i64> = listed.iter().map(|r| r.id.get()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids, sorted);
    assert!(listed.iter().all(|r| r.livestream.owner.id == fx.owner));

    let limited = service
        .list_reactions(fx.stream, Some(Limit::new(1)), &cancel)
        .unwrap();
    assert_eq!(limited, listed[..1].to_vec());
}
