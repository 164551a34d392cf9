use coup_rooms::{ActionKind, ActionRequest, CounterKind, CounterRequest, Rooms, Seat};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let rooms = Rooms::new();
    let seats = vec![
        Seat::new("p1", "Alice"),
        Seat::new("p2", "Bob"),
        Seat::new("p3", "Carol"),
    ];
    if let Err(err) = rooms.create("demo", &seats) {
        eprintln!("could not create room: {err}");
        return;
    }
    println!("{}", rooms.start("demo").message);

    // a short scripted round: income, a blocked foreign aid, a challenged tax
    let outcome = rooms.act("demo", "p1", &ActionRequest::of(ActionKind::Income));
    println!("{}", outcome.message);

    let outcome = rooms.act("demo", "p2", &ActionRequest::of(ActionKind::ForeignAid));
    println!("{}", outcome.message);
    let outcome = rooms.counter("demo", "p3", &CounterRequest::of(CounterKind::BlockForeignAid));
    println!("{}", outcome.message);
    let outcome = rooms.pass_challenge("demo", "p2");
    println!("{}", outcome.message);

    let outcome = rooms.act("demo", "p3", &ActionRequest::of(ActionKind::Tax));
    println!("{}", outcome.message);
    let outcome = rooms.challenge("demo", "p1", None);
    println!("{}", outcome.message);

    if let Some(view) = rooms.player_view("demo", "p1") {
        match serde_json::to_string_pretty(&view) {
            Ok(json) => println!("\nAlice's view:\n{json}"),
            Err(err) => eprintln!("could not serialize view: {err}"),
        }
    }
}
