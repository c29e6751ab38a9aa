//! End-to-end tests against the assembled facade.

use std::time::Duration;

use turnhall::prelude::*;

fn two_seater() -> NewGameConfig {
    NewGameConfig {
        slots: vec![Slot::creator(), Slot::open()],
        turn_max_secs: 5,
        ..NewGameConfig::default()
    }
}

#[tokio::test]
async fn test_full_game_through_facade() {
    let hall = Turnhall::builder().build();
    let service = hall.service();

    // Create, fill, and run a two-player game to completion.
    let created = service.create_game(UserId(1), two_seater()).await.unwrap();
    assert_eq!(created.game.state, GameState::Lobby);

    let joined = service.join_game(UserId(2), created.game.id).await.unwrap();
    assert_eq!(joined.game.state, GameState::Running);

    service
        .submit_turn(UserId(1), created.game.id, "opening", false)
        .await
        .unwrap();
    service
        .submit_turn(UserId(2), created.game.id, "reply", false)
        .await
        .unwrap();
    let last = service
        .submit_turn(UserId(1), created.game.id, "checkmate", true)
        .await
        .unwrap();
    assert_eq!(last.number, 2);

    let turns = service
        .list_turns(UserId(2), created.game.id, Paging::default())
        .await
        .unwrap();
    assert_eq!(
        turns.iter().map(|t| t.payload.as_str()).collect::<Vec<_>>(),
        vec!["checkmate", "reply", "opening"]
    );

    // Both players leave the ended game; the record is cascade-deleted.
    service.leave_game(UserId(1), created.game.id).await.unwrap();
    service.leave_game(UserId(2), created.game.id).await.unwrap();
    let err = hall.store().game(created.game.id).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(hall.queue().pending_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_lobby_expires_through_the_wiring() {
    let hall = Turnhall::builder()
        .service_config(ServiceConfig {
            lobby_expiry: Duration::from_secs(30),
            ..ServiceConfig::default()
        })
        .build();

    let created = hall
        .service()
        .create_game(UserId(1), two_seater())
        .await
        .unwrap();

    // Nobody else joins; the expiry job fires and ends the lobby.
    tokio::time::timeout(Duration::from_secs(600), async {
        loop {
            let game = hall.store().game(created.game.id).await.unwrap();
            if game.state == GameState::Ended {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("lobby never expired");
}

#[tokio::test(start_paused = true)]
async fn test_idle_occupants_time_out_through_the_wiring() {
    let hall = Turnhall::builder().build();
    let service = hall.service();

    let created = service.create_game(UserId(1), two_seater()).await.unwrap();
    service.join_game(UserId(2), created.game.id).await.unwrap();

    // With 2 seats and the default limit of 2 inactive rounds, four
    // consecutive timeouts terminate the game.
    tokio::time::timeout(Duration::from_secs(600), async {
        loop {
            let game = hall.store().game(created.game.id).await.unwrap();
            if game.state == GameState::Ended {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("inactive game never terminated");

    let game = hall.store().game(created.game.id).await.unwrap();
    assert!(game.current_player.is_none());
    assert_eq!(game.consecutive_timeouts, 4);
}
