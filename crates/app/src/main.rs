mod args;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use kanji_core::catalog::{KanjiCatalog, StaticCatalog};
use kanji_core::model::DrillSettings;
use kanji_core::snapshot::StudyState;
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{AppServices, Clock, DrillSession, DrillSource, QuestionMode};

use args::{Args, ArgsError, ClearTarget, Command, MistakesCommand, SourceArg, print_usage};

const BUNDLED_CATALOG: &str = include_str!("../data/catalog_sample.json");

fn load_catalog(args: &Args) -> Result<Arc<dyn KanjiCatalog>, Box<dyn std::error::Error>> {
    let catalog = match &args.catalog {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let catalog = StaticCatalog::from_json(&raw)?;
            log::info!("loaded {} kanji from {}", catalog.len(), path.display());
            catalog
        }
        None => StaticCatalog::from_json(BUNDLED_CATALOG)?,
    };
    Ok(Arc::new(catalog))
}

fn drill_settings(questions: Option<usize>) -> Result<DrillSettings, Box<dyn std::error::Error>> {
    let defaults = DrillSettings::default();
    Ok(DrillSettings::new(
        questions.unwrap_or(defaults.questions_per_session()),
        defaults.choices_per_question(),
    )?)
}

fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn read_answer(stdin: &mut impl BufRead) -> io::Result<Option<String>> {
    print!("> ");
    io::stdout().flush()?;
    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn print_question(session: &DrillSession) {
    let Some(current) = session.current_item() else {
        return;
    };
    let progress = session.progress();
    let item = &current.item;
    println!();
    println!("[{}/{}]", progress.answered + 1, progress.total);
    match session.current_mode().unwrap_or(session.mode()) {
        QuestionMode::Reading => println!("「{}」の よみかたは？", item.character),
        QuestionMode::Meaning => println!("「{}」の いみは？", item.character),
        QuestionMode::Writing => println!(
            "「{}」（{}）を かんじで かこう",
            item.primary_reading().unwrap_or("?"),
            item.meaning
        ),
    }
}

async fn run_drill(
    services: &AppServices,
    state: &mut StudyState,
    source: SourceArg,
    mode: QuestionMode,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let drill = services.drill_loop();
    let source = match source {
        SourceArg::Grade => DrillSource::Grade(state.profile.selected_grade),
        SourceArg::Focused => DrillSource::Focused,
        SourceArg::Extracted => DrillSource::Extracted,
    };
    let mut rng = build_rng(seed);
    let mut session = drill.start_session(state, source, mode, &mut rng)?;

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    while let Some(expected) = session.correct_answer() {
        print_question(&session);
        let choices = drill.choices_for_current(&session, &mut rng);
        for (idx, choice) in choices.iter().enumerate() {
            println!("  {}. {choice}", idx + 1);
        }

        let Some(input) = read_answer(&mut stdin)? else {
            println!("ドリルを ちゅうだんしました");
            break;
        };
        if input == "q" {
            println!("ドリルを ちゅうだんしました");
            break;
        }
        let picked = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| choices.get(idx))
            .cloned()
            .unwrap_or(input);

        let result = drill.answer_choice(&mut session, state, &picked).await?;
        if result.answer.is_correct {
            println!("⭕ せいかい！");
        } else {
            println!("❌ こたえ：{expected}");
        }
        if let Some(summary) = result.summary {
            println!();
            println!(
                "{}/{} もん せいかい（{}%） {}",
                summary.correct,
                summary.total,
                summary.percentage(),
                summary.rating.message()
            );
        }
    }
    Ok(())
}

fn print_study(
    services: &AppServices,
    state: &StudyState,
    character: Option<&str>,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let study = services.study();
    let Some(character) = character else {
        match state.profile.selected_grade {
            Some(grade) => println!("{grade}生の漢字"),
            None => println!("全学年"),
        }
        let list: Vec<&str> = study
            .study_list(state)
            .into_iter()
            .map(|item| item.character.as_str())
            .collect();
        if list.is_empty() {
            println!("漢字が見つかりません");
        } else {
            println!("{}", list.join(" "));
        }
        return Ok(());
    };

    let card = study.study_card(character, &mut build_rng(seed))?;
    println!("{}", card.detail);
    println!();
    println!("📖 {}", card.story);
    Ok(())
}

fn print_status(services: &AppServices, state: &StudyState) {
    let study = services.study();
    let report = study.progress(state);
    if let Some(name) = state.profile.display_name() {
        println!("{name}");
    }
    match report.grade {
        Some(grade) => println!("学年: {grade}"),
        None => println!("学年: ぜんぶ"),
    }
    println!(
        "おぼえた漢字: {}/{} ({}%)",
        report.mastered, report.total, report.mastery_percentage
    );
    for (level, count) in report.level_counts.iter().enumerate() {
        println!("  box {level}: {count}");
    }
    println!(
        "きょう: ⭕ {} ❌ {} ({}%)  連続 {} / 最大 {}",
        report.today_correct,
        report.today_incorrect,
        report.accuracy_percentage,
        report.current_streak,
        report.max_streak
    );
    println!("ふくしゅう: {} 枚", study.due_cards(state).len());
    println!("にがて: {} 字", state.mistakes.characters().len());
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let catalog = load_catalog(&args)?;
    let questions = match &args.command {
        Command::Drill { questions, .. } => *questions,
        _ => None,
    };
    let services = AppServices::new_sqlite(
        &args.db_url,
        Clock::system(),
        catalog,
        drill_settings(questions)?,
    )
    .await?;
    let study = services.study();
    let mut state = study.load().await?;

    match args.command {
        Command::Status => print_status(&services, &state),
        Command::Due => {
            let due = study.due_cards(&state);
            if due.is_empty() {
                println!("いまは ふくしゅうする 漢字が ありません");
            }
            for card in due {
                println!(
                    "{}  box {}  ⭕{} ❌{}",
                    card.character(),
                    card.box_level(),
                    card.correct_count(),
                    card.incorrect_count()
                );
            }
        }
        Command::Study(character) => {
            print_study(&services, &state, character.as_deref(), args.seed)?;
        }
        Command::Drill { source, mode, .. } => {
            run_drill(&services, &mut state, source, mode, args.seed).await?;
        }
        Command::Mistakes(MistakesCommand::Add { text, grade }) => {
            let added = study.add_school_mistakes(&mut state, &text, grade);
            study.save(&state).await?;
            println!("{added} 字を にがてリストに ついかしました");
        }
        Command::Mistakes(MistakesCommand::List) => {
            for candidate in study.focused_candidates(&state) {
                let grade = candidate
                    .target_grade
                    .map_or_else(|| "-".to_owned(), |g| g.to_string());
                let marker = if candidate.in_catalog { "" } else { " *" };
                println!(
                    "{} [{grade}] {}{marker}",
                    candidate.item.character, candidate.item.meaning
                );
            }
        }
        Command::Mistakes(MistakesCommand::Clear(target)) => {
            match target {
                ClearTarget::All => {
                    state.mistakes.clear_external_mistakes();
                    state.mistakes.clear_drill_mistakes();
                }
                ClearTarget::School => state.mistakes.clear_external_mistakes(),
                ClearTarget::Drill => state.mistakes.clear_drill_mistakes(),
            }
            study.save(&state).await?;
        }
        Command::Capture { path, toggle } => {
            let image = std::fs::read(&path)?;
            let capture = services.capture();
            let mut result = capture
                .capture(&image, &|percent: u8| log::debug!("recognition {percent}%"))
                .await?;
            for character in toggle.iter().flat_map(|t| kanji_core::capture::parse_kanji_input(t)) {
                result.toggle_selection(&character);
            }
            for found in &result.found {
                let mark = if result.selected.contains(&found.character) {
                    "✔"
                } else {
                    " "
                };
                let known = if found.item.is_some() { "" } else { " (じしょにない)" };
                println!("{mark} {}{known}", found.character);
            }
            capture.apply_selection(&mut state, &result);
            study.save(&state).await?;
        }
        Command::Grade(grade) => {
            study.set_selected_grade(&mut state, grade);
            study.save(&state).await?;
            print_status(&services, &state);
        }
        Command::Profile { name, honorific } => {
            if let Some(name) = name {
                state.profile.user_name = name.trim().to_owned();
            }
            if let Some(honorific) = honorific {
                state.profile.honorific = honorific;
            }
            study.save(&state).await?;
            if let Some(display) = state.profile.display_name() {
                println!("{display}");
            }
        }
        Command::Reset => {
            study.reset().await?;
            println!("きろくを けしました");
        }
    }

    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
