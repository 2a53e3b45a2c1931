use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};

use chesslens::aggregate::analyze_playing_patterns;
use chesslens::derive::derive_features;
use chesslens::report::build_report;
use chesslens::schema::read_games;

const OPENINGS: [&str; 8] = [
    "Sicilian Defense: Najdorf Variation",
    "Sicilian Defense",
    "French Defense: Winawer Variation",
    "Queen's Gambit Declined",
    "Italian Game: Evans Gambit",
    "Caro-Kann Defense",
    "King's Indian Defense: Normal Variation",
    "Scandinavian Defense",
];
const TIME_CONTROLS: [&str; 5] = ["60+0", "180+2", "600+5", "40|120", "-"];
const RESULTS: [&str; 3] = ["1-0", "0-1", "1/2-1/2"];

fn gen_games_csv(n: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut s = String::with_capacity(n * 120);
    s.push_str("Event,White,Black,Result,UTCDate,UTCTime,WhiteElo,BlackElo,WhiteRatingDiff,BlackRatingDiff,ECO,Opening,TimeControl,Termination\n");
    for i in 0..n {
        let white_elo = 800 + rng.gen::<u32>() % 2000;
        let black_elo = 800 + rng.gen::<u32>() % 2000;
        // roughly one game in fifty has no rating
        let white = if rng.gen::<u32>() % 50 == 0 { String::new() } else { white_elo.to_string() };
        s.push_str(&format!(
            "Rated Blitz game,w{},b{},{},2016.{:02}.{:02},12:00:00,{},{},{},{},C00,\"{}\",{},Normal\n",
            i,
            i,
            RESULTS[rng.gen::<usize>() % RESULTS.len()],
            1 + rng.gen::<u32>() % 12,
            1 + rng.gen::<u32>() % 28,
            white,
            black_elo,
            rng.gen::<i32>() % 20,
            rng.gen::<i32>() % 20,
            OPENINGS[rng.gen::<usize>() % OPENINGS.len()],
            TIME_CONTROLS[rng.gen::<usize>() % TIME_CONTROLS.len()],
        ));
    }
    s.into_bytes()
}

fn bench_pipeline(c: &mut Criterion) {
    let ns = [10_000usize, 100_000usize];
    let mut group = c.benchmark_group("pipeline");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(20);

    for &n in &ns {
        let csv = gen_games_csv(n, 0xC0FF_EE42);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("read_validate", n.to_string()), &n, |b, _| {
            b.iter(|| read_games(csv.clone()).unwrap());
        });

        let validated = read_games(csv.clone()).unwrap();
        group.bench_with_input(BenchmarkId::new("derive", n.to_string()), &n, |b, _| {
            b.iter(|| derive_features(&validated).unwrap());
        });

        let games = derive_features(&validated).unwrap();
        group.bench_with_input(BenchmarkId::new("patterns_and_report", n.to_string()), &n, |b, _| {
            b.iter(|| {
                let patterns = analyze_playing_patterns(&games).unwrap();
                build_report(&games, &patterns, 10, 50).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
