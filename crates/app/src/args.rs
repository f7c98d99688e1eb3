use std::fmt;
use std::path::PathBuf;

use kanji_core::model::{Grade, Honorific};
use services::QuestionMode;

pub const DEFAULT_DB_URL: &str = "sqlite://kanji.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidGrade { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidChoice { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    MissingInput { command: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidGrade { raw } => {
                write!(f, "invalid grade: {raw} (expected 1-6 or \"all\")")
            }
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidChoice { flag, raw } => write!(f, "unsupported {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingInput { command } => write!(f, "{command} needs an argument"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  kanji-drill [status]                          progress for the selected grade");
    eprintln!("  kanji-drill due                               cards due for review");
    eprintln!("  kanji-drill drill [--source grade|focused|extracted] [--mode reading|meaning|writing]");
    eprintln!("                    [--questions <n>] [--seed <n>]");
    eprintln!("  kanji-drill study [<kanji>] [--seed <n>]        kanji list, or one kanji with a story");
    eprintln!("  kanji-drill mistakes add <kanji...> [--grade <1-6>]");
    eprintln!("  kanji-drill mistakes list");
    eprintln!("  kanji-drill mistakes clear [--school|--drill]");
    eprintln!("  kanji-drill capture <text-file> [--toggle <kanji>]");
    eprintln!("  kanji-drill grade <1-6|all>");
    eprintln!("  kanji-drill profile [--name <name>] [--honorific chan|kun]");
    eprintln!("  kanji-drill reset");
    eprintln!();
    eprintln!("Options for every command:");
    eprintln!("  --db <sqlite_url>     default {DEFAULT_DB_URL}");
    eprintln!("  --catalog <json>      kanji catalog; a bundled sample is used otherwise");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  KANJI_DB_URL, KANJI_CATALOG, KANJI_SEED, RUST_LOG");
}

/// Which pool a drill draws from; `Grade` resolves against the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceArg {
    #[default]
    Grade,
    Focused,
    Extracted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearTarget {
    #[default]
    All,
    School,
    Drill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MistakesCommand {
    Add {
        text: String,
        grade: Option<Grade>,
    },
    List,
    Clear(ClearTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Due,
    Drill {
        source: SourceArg,
        mode: QuestionMode,
        questions: Option<usize>,
    },
    /// `None` lists the study kanji; `Some` opens one of them.
    Study(Option<String>),
    Mistakes(MistakesCommand),
    Capture {
        path: PathBuf,
        toggle: Option<String>,
    },
    Grade(Option<Grade>),
    Profile {
        name: Option<String>,
        honorific: Option<Honorific>,
    },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub db_url: String,
    pub catalog: Option<PathBuf>,
    pub seed: Option<u64>,
    pub command: Command,
}

impl Args {
    /// Parse everything after the program name. Flags win over environment
    /// variables, which win over defaults.
    pub fn parse(argv: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        Self::parse_with_env(argv, |key| std::env::var(key).ok())
    }

    pub fn parse_with_env(
        argv: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("KANJI_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut catalog = env("KANJI_CATALOG")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let mut seed = env("KANJI_SEED").and_then(|value| value.trim().parse::<u64>().ok());

        let mut args = argv.into_iter().peekable();
        let has_command = args.peek().is_some_and(|first| !first.starts_with('-'));
        let name = if has_command {
            args.next().unwrap_or_default()
        } else {
            "status".to_owned()
        };
        let mut sub = None;
        if name == "mistakes" {
            sub = args.next();
        }

        let mut positionals: Vec<String> = Vec::new();
        let mut source = SourceArg::default();
        let mut mode = QuestionMode::default();
        let mut questions = None;
        let mut grade_flag = None;
        let mut clear = ClearTarget::default();
        let mut toggle = None;
        let mut user_name = None;
        let mut honorific = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--catalog" => catalog = Some(PathBuf::from(require_value(&mut args, "--catalog")?)),
                "--seed" => {
                    let value = require_value(&mut args, "--seed")?;
                    seed = Some(value.trim().parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--seed",
                        raw: value.clone(),
                    })?);
                }
                "--source" => {
                    let value = require_value(&mut args, "--source")?;
                    source = match value.as_str() {
                        "grade" => SourceArg::Grade,
                        "focused" | "mistakes" => SourceArg::Focused,
                        "extracted" | "capture" => SourceArg::Extracted,
                        _ => {
                            return Err(ArgsError::InvalidChoice {
                                flag: "--source",
                                raw: value.clone(),
                            });
                        }
                    };
                }
                "--mode" => {
                    let value = require_value(&mut args, "--mode")?;
                    mode = QuestionMode::parse(&value).ok_or(ArgsError::InvalidChoice {
                        flag: "--mode",
                        raw: value.clone(),
                    })?;
                }
                "--questions" => {
                    let value = require_value(&mut args, "--questions")?;
                    let parsed: usize = value.trim().parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--questions",
                        raw: value.clone(),
                    })?;
                    questions = Some(parsed);
                }
                "--grade" => grade_flag = Some(parse_grade(&require_value(&mut args, "--grade")?)?),
                "--school" => clear = ClearTarget::School,
                "--drill" => clear = ClearTarget::Drill,
                "--toggle" => toggle = Some(require_value(&mut args, "--toggle")?),
                "--name" => user_name = Some(require_value(&mut args, "--name")?),
                "--honorific" => {
                    let value = require_value(&mut args, "--honorific")?;
                    honorific = Some(Honorific::parse(&value).ok_or(ArgsError::InvalidChoice {
                        flag: "--honorific",
                        raw: value.clone(),
                    })?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        let command = match name.as_str() {
            "status" | "progress" => Command::Status,
            "due" => Command::Due,
            "drill" => Command::Drill {
                source,
                mode,
                questions,
            },
            "study" => Command::Study(positionals.first().cloned()),
            "mistakes" => match sub.as_deref() {
                Some("add") => {
                    if positionals.is_empty() {
                        return Err(ArgsError::MissingInput {
                            command: "mistakes add",
                        });
                    }
                    Command::Mistakes(MistakesCommand::Add {
                        text: positionals.join(" "),
                        grade: grade_flag.flatten(),
                    })
                }
                Some("list") | None => Command::Mistakes(MistakesCommand::List),
                Some("clear") => Command::Mistakes(MistakesCommand::Clear(clear)),
                Some(other) => return Err(ArgsError::UnknownCommand(format!("mistakes {other}"))),
            },
            "capture" => {
                let Some(path) = positionals.first() else {
                    return Err(ArgsError::MissingInput { command: "capture" });
                };
                Command::Capture {
                    path: PathBuf::from(path),
                    toggle,
                }
            }
            "grade" => {
                let Some(raw) = positionals.first() else {
                    return Err(ArgsError::MissingInput { command: "grade" });
                };
                Command::Grade(parse_grade(raw)?)
            }
            "profile" => Command::Profile {
                name: user_name,
                honorific,
            },
            "reset" => Command::Reset,
            other => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };

        Ok(Self {
            db_url,
            catalog,
            seed,
            command,
        })
    }
}

/// `"all"` selects every grade.
fn parse_grade(raw: &str) -> Result<Option<Grade>, ArgsError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    trimmed
        .parse::<u8>()
        .ok()
        .and_then(|value| Grade::new(value).ok())
        .map(Some)
        .ok_or_else(|| ArgsError::InvalidGrade { raw: raw.to_owned() })
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
