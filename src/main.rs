use kismet::{roll_with, EntropySource, Error, RandomnessSource, SeededSource};
use rustyline::{error::ReadlineError, Editor};

const GREETING: &str = "Greetings, human! I am Kismet <3
Input a roll and press ENTER.
Exit with 'exit' or CTRL-D.";

fn main() -> rustyline::Result<()> {
    pretty_env_logger::init();

    let seed = match seed_from_args(std::env::args().skip(1)) {
        Ok(seed) => seed,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: kismet [--seed <u64>]");
            std::process::exit(2);
        }
    };
    let mut source: Box<dyn RandomnessSource> = match seed {
        Some(seed) => Box::new(SeededSource::seeded(seed)),
        None => Box::new(EntropySource::entropy()),
    };

    let mut rl = Editor::<()>::new()?;
    println!("{GREETING}");

    loop {
        let line = match rl.readline("$ ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        rl.add_history_entry(input);

        if input.eq_ignore_ascii_case("exit") {
            break;
        }

        match roll_with(input, source.as_mut()) {
            Ok(rolled) => println!("{rolled}"),
            Err(err) if err.is_defect() => {
                log::error!("{err}");
                println!("Something went wrong on my side, sorry! ({err})");
            }
            Err(err) => println!("{}", describe(input, &err)),
        }
    }

    Ok(())
}

/// The error message, with a caret under the offending input when there is one.
fn describe(input: &str, err: &Error) -> String {
    match err.position() {
        Some(position) => {
            let column = input
                .get(..position)
                .map_or(position, |before| before.chars().count());
            format!("{input}\n{}^\n{err}", " ".repeat(column))
        }
        None => err.to_string(),
    }
}

fn seed_from_args(mut args: impl Iterator<Item = String>) -> Result<Option<u64>, String> {
    let mut seed = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                let value = value
                    .parse::<u64>()
                    .map_err(|_| format!("--seed expects a whole number, got '{value}'"))?;
                seed = Some(value);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(seed)
}
