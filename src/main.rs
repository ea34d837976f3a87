//! CLI entry point for the gradebook analytics dashboard.
//!
//! Each subcommand loads one dashboard page (courses, assignments,
//! submissions, a single submission) or performs one action (sign in, import a
//! roster, post a grade) and prints the result as text.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use gradebook_analytics::config::AppConfig;
use gradebook_analytics::controllers::{
    AssignmentsController, CoursesController, GradingController, PageState, SubmissionsController,
};
use gradebook_analytics::export::{ExportKind, write_export};
use gradebook_analytics::infra::canvas::CanvasClient;
use gradebook_analytics::infra::proxy::ProxyClient;
use gradebook_analytics::roster::Roster;
use gradebook_analytics::services::gradebook_api::GradebookApi;
use gradebook_analytics::session::SessionContext;
use gradebook_analytics::views::assignments::{AssignmentTab, assignment_list};
use gradebook_analytics::views::courses::course_list;
use gradebook_analytics::views::grading::grading_page;
use gradebook_analytics::views::submissions::submissions_page;
use gradebook_analytics::views::{Node, render_text};
use std::ffi::OsStr;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gradebook_analytics")]
#[command(about = "Canvas grading dashboard with program analytics", long_about = None)]
struct Cli {
    /// Backend to load data from
    #[arg(long, value_enum, default_value_t = Source::Proxy, global = true)]
    source: Source,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    /// The dashboard REST proxy (GRADEBOOK_API_URL)
    Proxy,
    /// Canvas directly (CANVAS_BASE_URL)
    Canvas,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportArg {
    Analytics,
    Submissions,
    SubmissionsNoNames,
}

impl From<ExportArg> for ExportKind {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Analytics => ExportKind::ProgramAnalytics,
            ExportArg::Submissions => ExportKind::Submissions,
            ExportArg::SubmissionsNoNames => ExportKind::SubmissionsNoNames,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Store a Canvas access token for later commands
    Login {
        #[arg(long)]
        token: String,
    },
    /// Forget the token and every imported roster
    Logout,
    /// List the courses you teach
    Courses,
    /// List a course's assignments
    Assignments {
        #[arg(long)]
        course_id: u64,

        /// Which tab to show
        #[arg(long, value_enum, default_value_t = AssignmentTab::Needs)]
        tab: AssignmentTab,
    },
    /// Show submissions and analytics for one assignment
    Submissions {
        #[arg(long)]
        course_id: u64,

        #[arg(long)]
        assignment_id: u64,

        /// Also write a CSV export
        #[arg(long, value_enum)]
        export: Option<ExportArg>,

        /// Directory for CSV exports (defaults to GRADEBOOK_EXPORT_DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Show one student's submission
    Submission {
        #[arg(long)]
        course_id: u64,

        #[arg(long)]
        assignment_id: u64,

        #[arg(long)]
        user_id: u64,
    },
    /// Post a score (and optional comment) for one student
    Grade {
        #[arg(long)]
        course_id: u64,

        #[arg(long)]
        assignment_id: u64,

        #[arg(long)]
        user_id: u64,

        #[arg(long)]
        score: String,

        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Import a roster JSON file (SIS id to name and major) for a course
    Roster {
        #[arg(long)]
        course_id: u64,

        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let config = AppConfig::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = config
        .log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = config
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("gradebook_analytics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let session = SessionContext::open(&config.session_path)?;

    match cli.command {
        Commands::Login { token } => {
            if !session.set_token(&token) {
                bail!("Token must not be blank");
            }
            let api = backend(cli.source, &config, &session)?;
            match CoursesController::new(api.as_ref(), &session).load().await {
                PageState::Ready(courses) => {
                    info!(courses = courses.len(), "Signed in");
                }
                PageState::Failed(msg) => {
                    warn!(%msg, "Token stored but courses could not be loaded");
                }
                PageState::SignedOut => {
                    session.save()?;
                    bail!("The token was rejected");
                }
            }
            session.save()?;
            println!("Signed in.");
        }
        Commands::Logout => {
            session.clear();
            session.save()?;
            println!("Signed out.");
        }
        Commands::Courses => {
            let api = backend(cli.source, &config, &session)?;
            let controller = CoursesController::new(api.as_ref(), &session);
            let courses = finish(&session, load_with_retry(|| controller.load()).await?)?;
            print_page(&course_list(&courses));
        }
        Commands::Assignments { course_id, tab } => {
            let api = backend(cli.source, &config, &session)?;
            let controller = AssignmentsController::new(api.as_ref(), &session, course_id);
            let page = finish(&session, load_with_retry(|| controller.load()).await?)?;
            print_page(&assignment_list(&page, tab));
        }
        Commands::Submissions {
            course_id,
            assignment_id,
            export,
            out_dir,
        } => {
            let api = backend(cli.source, &config, &session)?;
            let controller =
                SubmissionsController::new(api.as_ref(), &session, course_id, assignment_id);
            let page = finish(&session, load_with_retry(|| controller.load()).await?)?;
            print_page(&submissions_page(&page));

            if let Some(kind) = export {
                let today = chrono::Local::now().date_naive();
                let csv = page.export(today, kind.into())?;
                let dir = out_dir.unwrap_or_else(|| config.export_dir.clone());
                let path = write_export(&dir, &csv.filename, &csv.contents)?;
                println!("\nExported {}", path.display());
            }
        }
        Commands::Submission {
            course_id,
            assignment_id,
            user_id,
        } => {
            let api = backend(cli.source, &config, &session)?;
            let controller =
                GradingController::new(api.as_ref(), &session, course_id, assignment_id, user_id);
            let detail = finish(&session, load_with_retry(|| controller.load()).await?)?;
            print_page(&grading_page(&detail));
        }
        Commands::Grade {
            course_id,
            assignment_id,
            user_id,
            score,
            comment,
        } => {
            let api = backend(cli.source, &config, &session)?;
            let controller =
                GradingController::new(api.as_ref(), &session, course_id, assignment_id, user_id);
            let update = finish(&session, controller.submit(&score, &comment).await)?;
            println!("Grade saved: {}", update.score);
        }
        Commands::Roster { course_id, file } => {
            let roster = Roster::load(&file)?;
            let students = roster.len();
            session.set_roster(course_id, roster);
            session.save()?;
            info!(course_id, students, file = %file.display(), "Roster imported");
            println!("Imported roster for {students} students.");
        }
    }

    Ok(())
}

/// Builds the selected backend around the stored token.
fn backend(
    source: Source,
    config: &AppConfig,
    session: &SessionContext,
) -> Result<Box<dyn GradebookApi>> {
    let Some(token) = session.token() else {
        bail!("Not signed in. Run `gradebook_analytics login --token <TOKEN>` first.");
    };
    let api: Box<dyn GradebookApi> = match source {
        Source::Proxy => Box::new(ProxyClient::with_token(
            &config.api_base_url,
            &token,
            config.http_timeout,
        )?),
        Source::Canvas => Box::new(CanvasClient::with_token(
            &config.canvas_base_url,
            &token,
            config.http_timeout,
        )?),
    };
    Ok(api)
}

/// Loads a page, offering a manual retry after each failure when attached to
/// a terminal.
async fn load_with_retry<T, F, Fut>(mut load: F) -> Result<PageState<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PageState<T>>,
{
    loop {
        let state = load().await;
        if let PageState::Failed(msg) = &state {
            if offer_retry(msg)? {
                continue;
            }
        }
        return Ok(state);
    }
}

fn offer_retry(msg: &str) -> Result<bool> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Ok(false);
    }
    eprint!("{msg}\nRetry? [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Unwraps a settled page, persisting the session when the token was dropped.
fn finish<T>(session: &SessionContext, state: PageState<T>) -> Result<T> {
    match state {
        PageState::Ready(value) => Ok(value),
        PageState::Failed(msg) => bail!(msg),
        PageState::SignedOut => {
            session.save()?;
            bail!("Not signed in. Run `gradebook_analytics login --token <TOKEN>` first.");
        }
    }
}

fn print_page(nodes: &[Node]) {
    println!("{}", render_text(nodes));
}
