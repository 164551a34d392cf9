use coup_rooms::{ActionKind, ActionRequest, Engine, GameStatus, Seat};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn seats(num_players: usize) -> Vec<Seat> {
    (0..num_players)
        .map(|i| Seat::new(format!("p{i}"), format!("Player {i}")))
        .collect()
}

/// Drive a game to completion with incomes and coups only, so the bench
/// exercises validation, elimination and turn advancement without any
/// window resolution.
fn complete_game(num_players: usize) {
    let seats = seats(num_players);
    let mut engine = black_box(Engine::seeded("bench", &seats, 1234).unwrap());
    engine.start().unwrap();

    for _ in 0..1000 {
        if engine.game().status() == GameStatus::Finished {
            break;
        }
        let actor = engine.game().current_player().unwrap();
        let actor_id = actor.id.clone();

        let request = if actor.coins >= 7 {
            let target_id = engine
                .game()
                .players()
                .iter()
                .find(|p| p.is_alive && p.id != actor_id)
                .unwrap()
                .id
                .clone();
            ActionRequest::targeting(ActionKind::Coup, target_id)
        } else {
            ActionRequest::of(ActionKind::Income)
        };
        engine.act(&actor_id, &request).unwrap();
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_game");
    for num_players in 3..=6usize {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_players),
            &num_players,
            |b, &num_players| b.iter(|| complete_game(num_players)),
        );
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
