use chrono::Utc;
use std::io::{self, Write};
use vocab_srs::{
    AppConfig, Card, CardId, Learner, NewLearner, NewVocabulary, ReviewOutcome, ReviewSummary,
    SqliteVocabularyStore, VocabularyEdit, VocabularyStore, load_deck_from_csv,
    load_deck_from_json, save_deck_to_csv, save_deck_to_json, telemetry,
};

const HEADERS: [&str; 7] = ["id", "word", "meaning", "level", "streak", "interval", "next_review"];

fn card_row(card: &Card) -> [String; 7] {
    [
        card.id.to_string(),
        card.word.clone(),
        card.meaning.clone(),
        card.level.to_string(),
        card.consecutive_correct_count.to_string(),
        format!("{}d", card.current_interval_days),
        card.next_review_date.to_string(),
    ]
}

fn render_cards_as_text_table(cards: &[Card]) -> String {
    let rows: Vec<[String; 7]> = cards.iter().map(card_row).collect();

    // Column widths in chars so Hangul and Hanja line up with ASCII headers
    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, HEADERS.iter().copied(), &widths);
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    out.push('|');
    for (cell, width) in cells.zip(widths) {
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(width.saturating_sub(cell.chars().count())));
        out.push_str(" |");
    }
    out.push('\n');
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  register <email> <full name...>    Register a learner and select it\n  learners                           List registered learners\n  use <email>                        Select a learner\n  add <word> <meaning...>            Add a word for the selected learner\n  edit <id> <word> <meaning...>      Replace a word and its meaning\n  hanja <id> <text>                  Set hanja for a word\n  example <id> <text...>             Set example sentence (rest of line)\n  notes <id> <text...>               Set notes (rest of line)\n  delete <id>                        Delete a word\n  list                               Show all words, newest first\n  due                                Show words due today\n  next                               Show the next word to review\n  review <id> <correct|incorrect>    Record a review result\n  stats                              Show totals for the selected learner\n  export <json|csv> <path>           Write the selected learner's deck\n  import <json|csv> <path>           Add cards from a deck file\n  quit|exit                          Exit"
    );
}

fn print_card(card: &Card) {
    println!("Word       : {}", card.word);
    println!("Meaning    : {}", card.meaning);
    if let Some(hanja) = &card.hanja {
        println!("Hanja      : {}", hanja);
    }
    if let Some(example) = &card.example_sentence {
        println!("Example    : {}", example);
    }
    if let Some(notes) = &card.notes {
        println!("Notes      : {}", notes);
    }
    println!("Level      : {}", card.level);
    println!("Next review: {}", card.next_review_date);
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn parse_id(s: Option<&str>) -> Option<CardId> {
    s.and_then(|s| s.parse::<CardId>().ok())
}

fn edit_from(card: &Card) -> VocabularyEdit {
    VocabularyEdit {
        word: card.word.clone(),
        meaning: card.meaning.clone(),
        hanja: card.hanja.clone(),
        example_sentence: card.example_sentence.clone(),
        notes: card.notes.clone(),
    }
}

fn update_field(
    store: &SqliteVocabularyStore,
    learner: &Learner,
    id: CardId,
    apply: impl FnOnce(&mut VocabularyEdit),
) {
    match store.card(learner.id, id) {
        Ok(Some(card)) => {
            let mut edit = edit_from(&card);
            apply(&mut edit);
            match store.edit_card(learner.id, id, edit) {
                Ok(card) => println!("Word {} updated.", card.id),
                Err(e) => println!("Error: {}", e),
            }
        }
        Ok(None) => println!("Word {id} not found."),
        Err(e) => println!("Error: {}", e),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();
    let config = AppConfig::from_env()?;
    let store = SqliteVocabularyStore::open(&config.database)?;
    let mut current: Option<Learner> = None;

    println!("Vocabulary SRS (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "register" => {
                let email = parts.next();
                let full_name = rest_of_line(parts);
                match email {
                    Some(email) if !full_name.is_empty() => {
                        match store.register_learner(NewLearner::new(email, full_name), Utc::now())
                        {
                            Ok(learner) => {
                                println!(
                                    "Registered learner {} ({}).",
                                    learner.id, learner.email
                                );
                                current = Some(learner);
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: register <email> <full name...>"),
                }
            }
            "learners" => match store.learners() {
                Ok(learners) if learners.is_empty() => println!("No learners registered."),
                Ok(learners) => {
                    for learner in learners {
                        println!("  {:<4} {:<32} {}", learner.id, learner.email, learner.full_name);
                    }
                }
                Err(e) => println!("Error: {}", e),
            },
            "use" => match parts.next() {
                Some(email) => match store.learner_by_email(email) {
                    Ok(Some(learner)) => {
                        println!("Using learner {}.", learner.display_name());
                        current = Some(learner);
                    }
                    Ok(None) => println!("No learner with email {email}."),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: use <email>"),
            },
            _ => {
                let Some(learner) = current.as_ref() else {
                    if matches!(
                        cmd,
                        "add" | "edit" | "hanja" | "example" | "notes" | "delete" | "list"
                            | "due" | "next" | "review" | "stats" | "export" | "import"
                    ) {
                        println!("No learner selected. Use 'register' or 'use <email>' first.");
                    } else {
                        println!("Unknown command. Type 'help'.");
                    }
                    continue;
                };
                run_learner_command(&store, learner, cmd, parts);
            }
        }
    }
    Ok(())
}

fn run_learner_command<'a>(
    store: &SqliteVocabularyStore,
    learner: &Learner,
    cmd: &str,
    mut parts: impl Iterator<Item = &'a str>,
) {
    let today = Utc::now().date_naive();
    match cmd {
        "add" => {
            let word = parts.next();
            let meaning = rest_of_line(parts);
            match word {
                Some(word) if !meaning.is_empty() => {
                    match store.add_card(learner.id, NewVocabulary::new(word, meaning), Utc::now()) {
                        Ok(card) => println!("Added word {} ({}).", card.id, card.word),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: add <word> <meaning...>"),
            }
        }
        "edit" => {
            let id = parse_id(parts.next());
            let word = parts.next().map(str::to_string);
            let meaning = rest_of_line(parts);
            match (id, word) {
                (Some(id), Some(word)) if !meaning.is_empty() => {
                    update_field(store, learner, id, |edit| {
                        edit.word = word;
                        edit.meaning = meaning;
                    });
                }
                _ => println!("Usage: edit <id> <word> <meaning...>"),
            }
        }
        "hanja" | "example" | "notes" => {
            let id = parse_id(parts.next());
            let text = rest_of_line(parts);
            match id {
                Some(id) => update_field(store, learner, id, |edit| {
                    let value = Some(text);
                    match cmd {
                        "hanja" => edit.hanja = value,
                        "example" => edit.example_sentence = value,
                        _ => edit.notes = value,
                    }
                }),
                None => println!("Usage: {} <id> <text...>", cmd),
            }
        }
        "delete" => match parse_id(parts.next()) {
            Some(id) => match store.delete_card(learner.id, id) {
                Ok(true) => println!("Deleted word {id}."),
                Ok(false) => println!("Word {id} not found."),
                Err(e) => println!("Error deleting word: {}", e),
            },
            None => println!("Usage: delete <id>"),
        },
        "list" => match store.cards(learner.id) {
            Ok(cards) => println!("{}", render_cards_as_text_table(&cards)),
            Err(e) => println!("Error: {}", e),
        },
        "due" => match store.due_cards(learner.id, today) {
            Ok(cards) => println!(
                "{} word(s) due.\n{}",
                cards.len(),
                render_cards_as_text_table(&cards)
            ),
            Err(e) => println!("Error: {}", e),
        },
        "next" => match store.review_queue(learner.id, today) {
            Ok(queue) => match queue.card {
                Some(card) => {
                    println!("Next word (id {}), {} more after it:", card.id, queue.remaining_count);
                    print_card(&card);
                }
                None => println!("Nothing to review today."),
            },
            Err(e) => println!("Error: {}", e),
        },
        "review" => {
            let id = parse_id(parts.next());
            let result = parts.next();
            match (id, result) {
                (Some(id), Some(result)) => {
                    let outcome = match result.parse::<ReviewOutcome>() {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            println!("Error: {}", e);
                            return;
                        }
                    };
                    match store.review_card(learner.id, id, outcome, Utc::now()) {
                        Ok(card) => println!("{}", ReviewSummary::from(&card).message()),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: review <id> <correct|incorrect>"),
            }
        }
        "stats" => match store.dashboard(learner.id, today) {
            Ok(dashboard) => {
                println!("Learner       : {}", dashboard.learner_name);
                println!("Total words   : {}", dashboard.total_words);
                println!("Due for review: {}", dashboard.words_to_review_count);
            }
            Err(e) => println!("Error: {}", e),
        },
        "export" => {
            let format = parts.next();
            let path = parts.next();
            match (format, path) {
                (Some(format @ ("json" | "csv")), Some(path)) => {
                    let result = store.cards(learner.id).and_then(|cards| {
                        if format == "json" {
                            save_deck_to_json(&cards, path)
                        } else {
                            save_deck_to_csv(&cards, path)
                        }
                    });
                    match result {
                        Ok(()) => println!("Deck exported to {}", path),
                        Err(e) => println!("Error exporting deck: {}", e),
                    }
                }
                _ => println!("Usage: export <json|csv> <path>"),
            }
        }
        "import" => {
            let format = parts.next();
            let path = parts.next();
            match (format, path) {
                (Some(format @ ("json" | "csv")), Some(path)) => {
                    let entries = if format == "json" {
                        load_deck_from_json(path)
                    } else {
                        load_deck_from_csv(path)
                    };
                    match entries.and_then(|entries| store.import_entries(learner.id, &entries)) {
                        Ok(count) => println!("Imported {} word(s) from {}", count, path),
                        Err(e) => println!("Error importing deck: {}", e),
                    }
                }
                _ => println!("Usage: import <json|csv> <path>"),
            }
        }
        _ => println!("Unknown command. Type 'help'."),
    }
}
