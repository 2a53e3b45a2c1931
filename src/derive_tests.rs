use super::*;
use crate::test_fixtures::{derived, Game};

#[test]
fn strength_boundaries_map_to_the_higher_category() {
    let cases = [
        (3000, StrengthCategory::Master),
        (2400, StrengthCategory::Master),
        (2399, StrengthCategory::Expert),
        (2000, StrengthCategory::Expert),
        (1999, StrengthCategory::Club),
        (1600, StrengthCategory::Club),
        (1599, StrengthCategory::Beginner),
        (0, StrengthCategory::Beginner),
        (-5, StrengthCategory::Beginner),
    ];
    for (elo, want) in cases {
        assert_eq!(StrengthCategory::classify(elo), want, "elo {}", elo);
    }
}

#[test]
fn strength_expression_agrees_with_rule_table() {
    let elos = ["2400", "2399", "2000", "1999", "1600", "1599", "", "850"];
    let games: Vec<Game> = elos.iter().map(|e| Game::new(*e, "Sicilian Defense")).collect();
    let recs = derived(&games).records().unwrap();
    for r in &recs {
        assert_eq!(r.strength_category, StrengthCategory::classify(r.game.white_elo));
    }
    assert_eq!(recs[0].strength_category, StrengthCategory::Master);
    assert_eq!(recs[6].strength_category, StrengthCategory::Beginner, "missing rating is 0");
}

#[test]
fn opening_family_truncates_at_first_colon() {
    let d = derived(&[
        Game::new("1500", "Italian Game: Evans Gambit"),
        Game::new("1500", "Sicilian Defense"),
        Game::new("1500", "Queen's Gambit Declined: Exchange Variation: Positional Line"),
    ]);
    let fam = d.frame().column(OPENING_FAMILY).unwrap().str().unwrap();
    assert_eq!(fam.get(0), Some("Italian Game"));
    assert_eq!(fam.get(1), Some("Sicilian Defense"));
    assert_eq!(fam.get(2), Some("Queen's Gambit Declined"));
}

#[test]
fn time_format_priority_rules() {
    let cases = [
        ("600+5", TimeFormat::Increment),
        ("40|120", TimeFormat::Tournament),
        ("600", TimeFormat::Standard),
        ("40|120+5", TimeFormat::Increment),
        ("-", TimeFormat::Standard),
    ];
    for (tc, want) in cases {
        assert_eq!(TimeFormat::classify(Some(tc)), want, "time control {}", tc);
    }
    assert_eq!(TimeFormat::classify(None), TimeFormat::Standard);

    let games: Vec<Game> = cases.iter().map(|(tc, _)| Game::new("1500", "Bird Opening").time_control(*tc)).collect();
    let recs = derived(&games).records().unwrap();
    for (r, (tc, want)) in recs.iter().zip(cases.iter()) {
        assert_eq!(r.time_format, *want, "derived time control {}", tc);
    }
}

#[test]
fn unparsable_dates_become_null_without_failing() {
    let d = derived(&[
        Game::new("1500", "Bird Opening").date("2016.06.30"),
        Game::new("1500", "Bird Opening").date("30/06/2016"),
        Game::new("1500", "Bird Opening").date("2016.13.40"),
        Game::new("1500", "Bird Opening").date("????.??.??"),
        Game::new("1500", "Bird Opening").date("2016.6.3"),
        Game::new("1500", "Bird Opening").date("2016.06.3"),
    ]);
    let recs = d.records().unwrap();
    assert_eq!(recs[0].date, NaiveDate::from_ymd_opt(2016, 6, 30));
    assert!(recs[1].date.is_none());
    assert!(recs[2].date.is_none());
    assert!(recs[3].date.is_none());
    assert!(recs[4].date.is_none(), "single-digit month and day");
    assert!(recs[5].date.is_none(), "single-digit day");
    assert_eq!(d.frame().column(DATE).unwrap().null_count(), 5);
}

#[test]
fn derivation_keeps_rows_and_adds_four_columns() {
    let d = derived(&[Game::new("2100", "French Defense"), Game::new("1700", "Caro-Kann Defense")]);
    assert_eq!(d.height(), 2);
    for name in [STRENGTH_CATEGORY, OPENING_FAMILY, DATE, TIME_FORMAT] {
        assert!(d.frame().column(name).is_ok(), "missing {}", name);
    }
    assert_eq!(d.frame().column(DATE).unwrap().dtype(), &DataType::Date);
}

#[test]
fn epoch_day_conversion() {
    assert_eq!(date_from_epoch_days(0), NaiveDate::from_ymd_opt(1970, 1, 1));
    assert_eq!(date_from_epoch_days(16_982), NaiveDate::from_ymd_opt(2016, 6, 30));
}
