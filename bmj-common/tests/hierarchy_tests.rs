//! Hierarchy rules: parent checks, cascade deletes, attachment edits

use bmj_common::models::{
    CompetitionDraft, CompetitionResult, GameDraft, GameNumber, MatchDraft, MatchSlot,
};
use bmj_common::{Error, Hierarchy, MediaRef, Score, Verdict};
use chrono::NaiveDate;

fn competition(name: &str, start: (i32, u32, u32)) -> CompetitionDraft {
    let start = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
    CompetitionDraft {
        name: name.to_string(),
        start_date: start,
        end_date: start,
        city: "Hangzhou".to_string(),
        venue: Some("Olympic Sports Center".to_string()),
        result: Some(CompetitionResult::Top8),
        coach_comment: None,
        self_summary: None,
    }
}

fn match_in(competition_id: i64, slot: MatchSlot) -> MatchDraft {
    MatchDraft {
        competition_id,
        match_type: slot,
        opponent_name: "Wang".to_string(),
        opponent_city: "Shanghai".to_string(),
        score: Some(Score::new(2, 1)),
        result: Verdict::Win,
        coach_comment: None,
        self_summary: None,
    }
}

fn game_in(match_id: i64, number: u8, mine: u32, theirs: u32) -> GameDraft {
    let score = Score::new(mine, theirs);
    GameDraft {
        match_id,
        game_number: GameNumber::new(number).unwrap(),
        score,
        result: score.outcome(bmj_common::TiePolicy::Allow).unwrap().verdict(),
        coach_comment: None,
        self_summary: None,
    }
}

fn photos(n: usize) -> Vec<MediaRef> {
    (0..n).map(|i| MediaRef::new(format!("photos/p{}.jpg", i))).collect()
}

/// Competition with 2 matches, 3 games and 4 photos
fn populated() -> (Hierarchy, i64) {
    let mut h = Hierarchy::new();
    let c = h.create_competition(competition("Spring Open", (2024, 4, 1))).unwrap();
    let m1 = h.create_match(match_in(c.id, MatchSlot::GroupStage1)).unwrap();
    let m2 = h.create_match(match_in(c.id, MatchSlot::Knockout1)).unwrap();
    h.create_game(game_in(m1.id, 1, 21, 15)).unwrap();
    h.create_game(game_in(m1.id, 2, 19, 21)).unwrap();
    let g = h.create_game(game_in(m2.id, 1, 21, 21)).unwrap();
    h.add_video(g.id, MediaRef::new("videos/v1.mp4")).unwrap();
    h.add_photos(c.id, photos(4)).unwrap();
    (h, c.id)
}

#[test]
fn test_competition_delete_cascades_everything() {
    let (mut h, id) = populated();
    assert_eq!(h.match_count(), 2);
    assert_eq!(h.game_count(), 3);

    let report = h.delete_competition(id).unwrap();
    assert_eq!(report.competitions, 1);
    assert_eq!(report.matches, 2);
    assert_eq!(report.games, 3);
    assert_eq!(report.photos.len(), 4);
    assert_eq!(report.videos, vec![MediaRef::new("videos/v1.mp4")]);
    assert_eq!(report.media().count(), 5);

    assert_eq!(h.competition_count(), 0);
    assert_eq!(h.match_count(), 0);
    assert_eq!(h.game_count(), 0);
    assert!(matches!(h.get_competition(id), Err(Error::NotFound(_))));
}

#[test]
fn test_match_delete_removes_only_its_games() {
    let (mut h, id) = populated();
    let first = h.matches_of(id).unwrap()[0].clone();

    let report = h.delete_match(first.id).unwrap();
    assert_eq!(report.matches, 1);
    assert_eq!(report.games, 2);

    let tree = h.tree(id).unwrap();
    assert_eq!(tree.matches.len(), 1);
    assert_eq!(tree.game_count(), 1);
    assert_eq!(tree.photos().len(), 4);
}

#[test]
fn test_children_need_existing_parent() {
    let mut h = Hierarchy::new();
    let err = h.create_match(match_in(99, MatchSlot::Knockout1)).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = h.create_game(game_in(42, 1, 21, 10)).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_invalid_draft_is_rejected_before_parent_check() {
    let mut h = Hierarchy::new();
    let mut draft = match_in(99, MatchSlot::Knockout1);
    draft.score = Some(Score::new(1, 1));

    assert!(h.create_match(draft).unwrap_err().is_validation());
}

#[test]
fn test_counts_and_tree() {
    let (h, id) = populated();
    let competition = h.get_competition(id).unwrap();
    assert_eq!(competition.match_count, 2);

    let tree = h.tree(id).unwrap();
    let counts: Vec<u32> = tree.matches.iter().map(|m| m.record.game_count).collect();
    assert_eq!(counts, vec![2, 1]);
    let tied = tree.matches[1].games[0].clone();
    assert_eq!(tied.result, None);
    assert!(tree.find_game(tied.id).is_some());
}

#[test]
fn test_games_ordered_by_number() {
    let mut h = Hierarchy::new();
    let c = h.create_competition(competition("Cup", (2024, 1, 1))).unwrap();
    let m = h.create_match(match_in(c.id, MatchSlot::Knockout3)).unwrap();
    h.create_game(game_in(m.id, 3, 21, 5)).unwrap();
    h.create_game(game_in(m.id, 1, 5, 21)).unwrap();

    let numbers: Vec<u8> = h
        .games_of(m.id)
        .unwrap()
        .iter()
        .map(|g| g.game_number.get())
        .collect();
    assert_eq!(numbers, vec![1, 3]);
}

#[test]
fn test_listing_newest_first_and_paged() {
    let mut h = Hierarchy::new();
    h.create_competition(competition("Old", (2023, 1, 1))).unwrap();
    h.create_competition(competition("New", (2024, 6, 1))).unwrap();
    h.create_competition(competition("Mid", (2023, 9, 1))).unwrap();

    let page = h.competitions(0, 2);
    let names: Vec<&str> = page.content.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["New", "Mid"]);
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages, 2);

    let page = h.competitions(1, 2);
    assert_eq!(page.content[0].name, "Old");
    assert!(page.is_last());
}

#[test]
fn test_update_keeps_photos_and_does_not_touch_children() {
    let (mut h, id) = populated();
    let mut draft = competition("Spring Open 2024", (2024, 4, 1));
    draft.result = Some(CompetitionResult::Champion);

    let updated = h.update_competition(id, draft).unwrap();
    assert_eq!(updated.name, "Spring Open 2024");
    assert_eq!(updated.photos.len(), 4);
    assert_eq!(h.game_count(), 3);
}

#[test]
fn test_match_edit_does_not_change_competition_result() {
    let (mut h, id) = populated();
    let first = h.matches_of(id).unwrap()[0].clone();

    let mut draft = match_in(id, first.match_type);
    draft.score = Some(Score::new(0, 2));
    draft.result = Verdict::Lose;
    h.update_match(first.id, draft).unwrap();

    assert_eq!(
        h.get_competition(id).unwrap().result,
        Some(CompetitionResult::Top8)
    );
}

#[test]
fn test_batch_photo_removal_is_atomic() {
    let (mut h, id) = populated();
    let all = photos(4);

    let err = h
        .remove_photos(id, &[all[0].clone(), MediaRef::new("photos/missing.jpg")])
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(h.get_competition(id).unwrap().photos.len(), 4);

    let remaining = h.remove_photos(id, &all[1..3]).unwrap().photos;
    assert_eq!(remaining, vec![all[0].clone(), all[3].clone()]);
}

#[test]
fn test_video_removal() {
    let (mut h, id) = populated();
    let game = h.tree(id).unwrap().matches[1].games[0].clone();

    assert!(h.remove_video(game.id, &MediaRef::new("videos/other.mp4")).is_err());
    let game = h.remove_video(game.id, &MediaRef::new("videos/v1.mp4")).unwrap();
    assert!(game.videos.is_empty());

    let report = h.delete_game(game.id).unwrap();
    assert_eq!(report.games, 1);
    assert!(report.videos.is_empty());
}
