use std::fmt;
use std::sync::Arc;

use course_core::{CourseError, CourseName, CourseSlug, LessonId, User, UserId};
use remote::{HttpRemoteClient, InMemoryRemote, RemoteConfig, RemoteStateClient};
use services::{
    Clock, MutationOutcome, NotificationLevel, NotificationLog, TracingAnalytics, UserSession,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    Invalid(CourseError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<CourseError> for ArgsError {
    fn from(err: CourseError) -> Self {
        ArgsError::Invalid(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  course-sync [options] saved");
    eprintln!("  course-sync [options] toggle <course name>");
    eprintln!("  course-sync [options] enroll <course-slug>");
    eprintln!("  course-sync [options] complete <course-slug> <lesson-id>");
    eprintln!("  course-sync [options] progress [course-slug]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --api <url>        backend base url (default http://localhost:3000)");
    eprintln!("  --cookie <value>   session cookie sent with every request");
    eprintln!("  --user <id>        signed-in user id (omit to act signed out)");
    eprintln!("  --offline          use an in-process backend instead of HTTP");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSES_API_URL, COURSES_SESSION_COOKIE, COURSES_HTTP_TIMEOUT_SECS, COURSES_USER");
    eprintln!("  RUST_LOG (default: warn)");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Saved,
    Toggle(CourseName),
    Enroll(CourseSlug),
    Complete(CourseSlug, LessonId),
    Progress(Option<CourseSlug>),
}

struct Args {
    remote: RemoteConfig,
    user: Option<UserId>,
    offline: bool,
    command: Command,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut remote = RemoteConfig::from_env();
        let mut user = std::env::var("COURSES_USER")
            .ok()
            .filter(|u| !u.trim().is_empty());
        let mut offline = false;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => remote.base_url = require_value(&mut args, "--api")?,
                "--cookie" => {
                    remote.session_cookie = Some(require_value(&mut args, "--cookie")?);
                }
                "--user" => user = Some(require_value(&mut args, "--user")?),
                "--offline" => offline = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        Ok(Self {
            remote,
            user: user.map(UserId::new).transpose()?,
            offline,
            command: parse_command(positional)?,
        })
    }
}

fn parse_command(positional: Vec<String>) -> Result<Command, ArgsError> {
    let mut words = positional.into_iter();
    let Some(cmd) = words.next() else {
        return Err(ArgsError::MissingArgument { what: "command" });
    };
    let command = match cmd.as_str() {
        "saved" => Command::Saved,
        "toggle" => {
            // Course names may contain spaces; take the rest of the line.
            let rest: Vec<String> = words.by_ref().collect();
            if rest.is_empty() {
                return Err(ArgsError::MissingArgument { what: "course name" });
            }
            Command::Toggle(CourseName::new(rest.join(" "))?)
        }
        "enroll" => Command::Enroll(next_slug(&mut words)?),
        "complete" => {
            let slug = next_slug(&mut words)?;
            let lesson = words
                .next()
                .ok_or(ArgsError::MissingArgument { what: "lesson id" })?;
            Command::Complete(slug, LessonId::new(lesson)?)
        }
        "progress" => Command::Progress(words.next().map(CourseSlug::new).transpose()?),
        _ => return Err(ArgsError::UnknownCommand(cmd)),
    };
    if let Some(extra) = words.next() {
        return Err(ArgsError::UnknownArg(extra));
    }
    Ok(command)
}

fn next_slug(words: &mut impl Iterator<Item = String>) -> Result<CourseSlug, ArgsError> {
    let raw = words
        .next()
        .ok_or(ArgsError::MissingArgument { what: "course slug" })?;
    Ok(CourseSlug::new(raw)?)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn describe(outcome: &MutationOutcome) -> String {
    match outcome {
        MutationOutcome::Committed => "ok".to_string(),
        MutationOutcome::RolledBack(err) => format!("rolled back: {err}"),
        MutationOutcome::Refused => "refused: not signed in".to_string(),
        MutationOutcome::AlreadyEnrolled => "already enrolled".to_string(),
        MutationOutcome::Busy => "busy: another update is in flight".to_string(),
        MutationOutcome::Discarded => "discarded: session changed".to_string(),
    }
}

async fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).inspect_err(|_| print_usage())?;

    let remote: Arc<dyn RemoteStateClient> = if args.offline {
        Arc::new(InMemoryRemote::new())
    } else {
        tracing::debug!(config = ?args.remote, "using http backend");
        Arc::new(HttpRemoteClient::new(&args.remote)?)
    };

    let notes = NotificationLog::new();
    let session = UserSession::new(
        remote,
        Arc::new(notes.clone()),
        Arc::new(TracingAnalytics),
        Clock::system(),
    );
    if let Some(id) = args.user {
        session.start(User::new(id)).await?;
    }

    let saved = session.saved_courses();
    let progress = session.progress();
    let outcome = match &args.command {
        Command::Saved => {
            for name in saved.saved_courses() {
                println!("{name}");
            }
            None
        }
        Command::Toggle(name) => Some(saved.toggle_save(name).await),
        Command::Enroll(slug) => Some(progress.enroll(slug).await),
        Command::Complete(slug, lesson) => {
            Some(progress.mark_lesson_complete(slug, lesson).await)
        }
        Command::Progress(Some(slug)) => {
            println!("{slug}\t{}%", progress.get_course_progress(slug));
            None
        }
        Command::Progress(None) => {
            for record in progress.enrollments() {
                println!(
                    "{}\t{}\t{} lessons",
                    record.course_slug(),
                    record.progress(),
                    record.completed_count()
                );
            }
            None
        }
    };

    for note in notes.drain() {
        let tag = match note.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "done",
            NotificationLevel::Error => "error",
        };
        println!("[{tag}] {}", note.message);
    }

    let succeeded = match &outcome {
        Some(outcome) => {
            println!("{}", describe(outcome));
            matches!(
                outcome,
                MutationOutcome::Committed | MutationOutcome::AlreadyEnrolled
            )
        }
        None => true,
    };
    session.end();
    Ok(succeeded)
}

#[tokio::main]
async fn main() {
    init_tracing();
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    }
}
