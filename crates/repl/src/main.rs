use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread::JoinHandle;

use clap::Parser;
use color_eyre::eyre::{self, Context};
use config::Settings;
use crossbeam_channel::Receiver;
use replay::{Breakpoint, ReplayEngine, Trace};
use session::{
    Command, DocumentCache, DocumentWorkspace, Notification, Orchestrator, Tabs, Toolbar,
};
use state::{Persistence, StateManager};
use tracing_subscriber::filter::EnvFilter;

mod render;

type Session = Orchestrator<ReplayEngine, Tabs, Toolbar>;

const HELP: &str = "\
commands:
  start | stop | run | over | in | out   drive the debugger
  open PATH                              open a document
  close PATH                             close a document
  tabs                                   list open documents
  w                                      where is execution suspended
  q                                      quit";

struct App {
    session: Session,
    notifications: Receiver<Notification>,
    input_rx: Receiver<String>,
    context_lines: usize,

    #[allow(dead_code)]
    input_thread: JoinHandle<()>,
}

impl App {
    fn new(session: Session, context_lines: usize) -> Self {
        let notifications = session.notifications();

        // handle input
        let (input_tx, input_rx) = crossbeam_channel::unbounded();
        let input_thread = std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if input_tx.send(line.trim().to_owned()).is_err() {
                    break;
                }
            }
            tracing::debug!("stdin closed");
        });

        Self {
            session,
            notifications,
            input_rx,
            context_lines,
            input_thread,
        }
    }

    /// Reopen the documents from a previous run
    fn restore(&mut self, state: &Persistence) {
        for path in &state.open_documents {
            let result = self.session.open_document(path).map(|_| ());
            self.session.report(result);
        }
        if let Some(focused) = &state.focused {
            let result = self.session.open_document(focused).map(|_| ());
            self.session.report(result);
        }
    }

    fn loop_step(&mut self) -> eyre::Result<ShouldQuit> {
        print!("> ");
        std::io::stdout().flush()?;

        crossbeam_channel::select! {
            recv(self.input_rx) -> input => match input {
                Ok(input) => self.handle_input(&input).context("handling command"),
                Err(_) => Ok(ShouldQuit::True),
            },
            recv(self.notifications) -> notification => if let Ok(notification) = notification {
                self.handle_notification(notification).context("handling debugger notification")
            } else {
                Ok(ShouldQuit::False)
            },
        }
    }

    #[tracing::instrument(skip(self))]
    fn handle_notification(&mut self, notification: Notification) -> eyre::Result<ShouldQuit> {
        println!();
        self.session.handle(notification);
        self.render()?;
        Ok(ShouldQuit::False)
    }

    fn handle_input(&mut self, input: &str) -> eyre::Result<ShouldQuit> {
        let (word, argument) = match input.split_once(' ') {
            Some((word, argument)) => (word, argument.trim()),
            None => (input, ""),
        };

        match word {
            "" => return Ok(ShouldQuit::False),
            "q" | "quit" => return Ok(ShouldQuit::True),
            "help" | "?" => {
                println!("{HELP}");
                return Ok(ShouldQuit::False);
            }
            "tabs" => {
                for view in self.session.workspace().iter() {
                    println!("{}", view.path().display());
                }
                return Ok(ShouldQuit::False);
            }
            "w" => {
                match self.session.workspace().current_document() {
                    Some(view) if self.session.is_running() => match view.line() {
                        Some(line) => println!("{}:{line}", view.path().display()),
                        None => println!("{}", view.path().display()),
                    },
                    _ => println!("not suspended"),
                }
                return Ok(ShouldQuit::False);
            }
            "open" | "close" if argument.is_empty() => {
                println!("usage: {word} PATH");
                return Ok(ShouldQuit::False);
            }
            "open" => {
                let result = self.session.open_document(argument).map(|_| ());
                self.session.report(result);
            }
            "close" => {
                let result = self.session.close_document(argument);
                self.session.report(result);
            }
            other => match other.parse::<Command>() {
                Ok(command) => {
                    tracing::debug!(%command, "executing command");
                    self.session.dispatch(command);
                }
                Err(e) => {
                    println!("{e}, try 'help'");
                    return Ok(ShouldQuit::False);
                }
            },
        }

        self.render()?;
        Ok(ShouldQuit::False)
    }

    fn render(&self) -> eyre::Result<()> {
        let screen = render::screen(
            self.session.actions(),
            self.session.workspace(),
            self.session.status(),
            self.context_lines,
        );
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(screen.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Step through a recorded execution trace")]
struct Args {
    /// Execution trace to replay
    trace: PathBuf,

    /// Settings file, defaults to the user configuration directory
    #[clap(short, long)]
    settings: Option<PathBuf>,

    /// Where to remember open documents between runs
    #[clap(long)]
    state: Option<PathBuf>,

    /// Breakpoints for `run`, as FILE:LINE
    #[clap(short, long)]
    breakpoints: Vec<Breakpoint>,

    #[clap(long, default_value = "pugdebug.log")]
    log_file: PathBuf,
}

fn main() -> eyre::Result<()> {
    color_eyre::install().context("installing color_eyre")?;

    let args = Args::parse();
    let log_file = std::fs::File::create(&args.log_file).context("creating log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let settings = match args.settings.clone().or_else(Settings::default_path) {
        Some(path) => Settings::load(path).context("loading settings")?,
        None => Settings::default(),
    };
    tracing::debug!(?settings, "settings");

    let trace = Trace::from_path(&args.trace).context("loading trace")?;
    let engine = ReplayEngine::new(trace).with_breakpoints(args.breakpoints);

    let mut documents = DocumentCache::new();
    if let Some(root) = &settings.project_root {
        documents = documents.with_project_root(root);
    }
    let session = Orchestrator::with_documents(engine, Tabs::new(), Toolbar::new(), documents);

    let state_path = args
        .state
        .or(settings.state_file)
        .or_else(StateManager::default_path);
    let state = state_path
        .map(StateManager::new)
        .transpose()
        .context("loading workspace state")?;

    let mut app = App::new(session, settings.context_lines);
    if let Some(state) = &state {
        app.restore(state.current());
    }
    tracing::debug!("front-end set up");
    app.render()?;

    loop {
        match app.loop_step() {
            Ok(ShouldQuit::True) => break,
            Ok(ShouldQuit::False) => {}
            Err(e) => eyre::bail!("Error running command: {e}"),
        }
    }

    if let Some(mut state) = state {
        state.record(app.session.workspace());
        state.save().context("saving workspace state")?;
    }

    Ok(())
}

enum ShouldQuit {
    True,
    False,
}
