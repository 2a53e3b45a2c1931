//! Shared fixtures for unit tests: small CSV sources built row by row.

use crate::derive::{derive_features, DerivedGames};
use crate::schema::read_games;

pub const HEADER: &str = "Event,White,Black,Result,UTCDate,UTCTime,WhiteElo,BlackElo,WhiteRatingDiff,BlackRatingDiff,ECO,Opening,TimeControl,Termination";

/// The columns the derivation and aggregation tests care about; everything
/// else gets a fixed filler value.
#[derive(Debug, Clone)]
pub struct Game {
    pub result: &'static str,
    pub utc_date: &'static str,
    pub white_elo: &'static str,
    pub opening: &'static str,
    pub time_control: &'static str,
}

impl Game {
    pub fn new(white_elo: &'static str, opening: &'static str) -> Self {
        Game { result: "1-0", utc_date: "2016.06.30", white_elo, opening, time_control: "300+0" }
    }

    pub fn result(mut self, r: &'static str) -> Self { self.result = r; self }
    pub fn date(mut self, d: &'static str) -> Self { self.utc_date = d; self }
    pub fn time_control(mut self, tc: &'static str) -> Self { self.time_control = tc; self }

    fn to_row(&self, i: usize) -> String {
        format!(
            "Rated Blitz game,w{i},b{i},{},{},12:00:00,{},1500,0,0,C00,\"{}\",\"{}\",Normal",
            self.result, self.utc_date, self.white_elo, self.opening, self.time_control
        )
    }
}

pub fn games_csv(games: &[Game]) -> Vec<u8> {
    let mut s = String::from(HEADER);
    for (i, g) in games.iter().enumerate() {
        s.push('\n');
        s.push_str(&g.to_row(i));
    }
    s.push('\n');
    s.into_bytes()
}

pub fn derived(games: &[Game]) -> DerivedGames {
    let validated = read_games(games_csv(games)).expect("fixture csv should validate");
    derive_features(&validated).expect("derivation should succeed")
}
