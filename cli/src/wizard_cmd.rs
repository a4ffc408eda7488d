//! Interactive, line-oriented walk through the form.
//!
//! Each form step prompts for its fields in order. An empty answer keeps
//! the current value. The issue step then takes local files: a path
//! attaches a file, `screenshot <path>` adds an image as an error
//! screenshot, and `remove <n>` / `remove s<n>` drop a listed entry.
//! Lines starting with `:` are commands:
//!
//! - `:back` go to the previous step
//! - `:goto <step>` jump to an earlier step (`client`, `device`, ...)
//! - `:restart` discard everything and start over
//! - `:quit` leave without submitting

use std::io::BufRead;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use support_core::RelayGateway;
use support_core::FileKind;
use support_core::Step;
use support_core::SubmitError;
use support_core::SupportSession;
use support_core::attachments::attach;
use support_core::attachments::detach;
use support_core::config::ConfigLoader;
use support_core::summary::write_summary;
use support_core::views::FieldView;
use support_core::views::StepView;
use tracing::debug;
use tracing::warn;

/// Arguments for `wizard`
#[derive(Debug, Parser)]
pub struct WizardArgs {
    /// Client configuration file (defaults to ./support-form.toml)
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl WizardArgs {
    pub async fn run(self) -> anyhow::Result<i32> {
        let config = ConfigLoader::load_from(self.config.as_deref())?;
        let gateway = RelayGateway::new(&config.relay_url, config.request_timeout())?;
        let session = SupportSession::new(config.flow_options(), Arc::new(gateway));

        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        Wizard::new(&session, &config.summary_dir, stdin.lock(), stdout.lock())
            .run()
            .await?;
        Ok(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Back,
    Goto(Step),
    Restart,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Answer(String),
    Command(Command),
    Unknown(String),
    Eof,
}

/// Accepts the wire name (`deviceInfo`) or the progress label (`device`).
fn parse_step(raw: &str) -> Option<Step> {
    let raw = raw.trim();
    raw.parse::<Step>().ok().or_else(|| {
        [
            Step::ClientInfo,
            Step::DeviceInfo,
            Step::IssueDescription,
            Step::SupportRequest,
            Step::Review,
        ]
        .into_iter()
        .find(|step| step.label().eq_ignore_ascii_case(raw))
    })
}

fn parse_input(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.trim().strip_prefix(':') else {
        return Input::Answer(line.to_string());
    };
    let mut parts = command.splitn(2, char::is_whitespace);
    match (parts.next().unwrap_or_default(), parts.next()) {
        ("back", None) => Input::Command(Command::Back),
        ("restart", None) => Input::Command(Command::Restart),
        ("quit" | "q", None) => Input::Command(Command::Quit),
        ("goto", Some(step)) => match parse_step(step) {
            Some(step) => Input::Command(Command::Goto(step)),
            None => Input::Unknown(line.to_string()),
        },
        _ => Input::Unknown(line.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FileAction<'a> {
    Attach(FileKind, &'a Path),
    Remove(FileKind, usize),
}

/// `None` for a `remove` without a listed position.
fn parse_file_action(answer: &str) -> Option<FileAction<'_>> {
    if let Some(path) = answer.strip_prefix("screenshot ") {
        return Some(FileAction::Attach(FileKind::Screenshot, Path::new(path.trim())));
    }
    if let Some(target) = answer.strip_prefix("remove ") {
        let target = target.trim();
        let (kind, number) = match target.strip_prefix('s') {
            Some(number) => (FileKind::Screenshot, number),
            None => (FileKind::Attachment, target),
        };
        return number
            .parse()
            .ok()
            .map(|index| FileAction::Remove(kind, index));
    }
    Some(FileAction::Attach(FileKind::Attachment, Path::new(answer)))
}

/// What to do after a step has been handled.
enum Flow {
    Continue,
    Quit,
}

pub struct Wizard<'a, R, W> {
    session: &'a SupportSession,
    summary_dir: &'a Path,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Wizard<'a, R, W> {
    pub fn new(session: &'a SupportSession, summary_dir: &'a Path, input: R, out: W) -> Self {
        Self {
            session,
            summary_dir,
            input,
            out,
        }
    }

    /// Run until the user quits or input ends.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            let view = self.session.view().await;
            self.header(&view).await?;
            let flow = match view.step {
                Step::Review => self.review(&view).await?,
                Step::Confirmation => self.confirmation(&view).await?,
                _ => self.form(&view).await?,
            };
            if let Flow::Quit = flow {
                self.out.flush()?;
                return Ok(());
            }
        }
    }

    fn read(&mut self, prompt: &str) -> anyhow::Result<Input> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(Input::Eof);
        }
        Ok(parse_input(&line))
    }

    async fn header(&mut self, view: &StepView) -> anyhow::Result<()> {
        let statuses = self.session.step_statuses().await;
        let bar: Vec<String> = statuses
            .iter()
            .map(|status| {
                if status.active {
                    format!("[{}]", status.label)
                } else if status.completed {
                    format!("{}*", status.label)
                } else {
                    status.label.to_string()
                }
            })
            .collect();
        writeln!(self.out)?;
        if !bar.is_empty() {
            writeln!(
                self.out,
                "{}  ({}%)",
                bar.join(" > "),
                self.session.progress().await
            )?;
        }
        writeln!(self.out, "== {} ==", view.title)?;
        Ok(())
    }

    async fn form(&mut self, view: &StepView) -> anyhow::Result<Flow> {
        for field in &view.fields {
            if let Some(flow) = self.field(field).await? {
                return Ok(flow);
            }
        }
        let files = if view.step == Step::IssueDescription {
            self.files().await?
        } else {
            None
        };
        if let Some(flow) = files {
            return Ok(flow);
        }

        match self.session.advance().await {
            Ok(step) => debug!(%step, "advanced"),
            Err(err) => {
                writeln!(self.out, "Cannot continue: {err}")?;
                for field in self.session.view().await.fields {
                    if let Some(error) = field.error {
                        writeln!(self.out, "  - {}: {error}", field.label)?;
                    }
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Prompt for one field. Returns a flow when a command ended the step.
    async fn field(&mut self, field: &FieldView) -> anyhow::Result<Option<Flow>> {
        let choices = field.key.choices();
        for (index, (_, label)) in choices.iter().enumerate() {
            writeln!(self.out, "  {}. {label}", index + 1)?;
        }
        let marker = if field.required { "*" } else { "" };
        let prompt = if field.value.is_empty() {
            format!("{}{marker}: ", field.label)
        } else {
            format!("{}{marker} [{}]: ", field.label, field.value)
        };

        loop {
            match self.read(&prompt)? {
                Input::Eof => return Ok(Some(Flow::Quit)),
                Input::Command(command) => return self.command(command).await.map(Some),
                Input::Unknown(line) => {
                    writeln!(self.out, "Unknown command {line:?}")?;
                }
                Input::Answer(answer) if answer.trim().is_empty() => return Ok(None),
                Input::Answer(answer) => match field.key.patch(&answer) {
                    Ok(patch) => {
                        self.session.update(patch).await;
                        return Ok(None);
                    }
                    Err(err) => writeln!(self.out, "{err}")?,
                },
            }
        }
    }

    /// Attach and remove files until an empty answer.
    async fn files(&mut self) -> anyhow::Result<Option<Flow>> {
        loop {
            let record = self.session.record().await;
            for kind in [FileKind::Attachment, FileKind::Screenshot] {
                let marker = if kind == FileKind::Screenshot { "s" } else { "" };
                for (index, file) in kind.files(&record).iter().enumerate() {
                    writeln!(
                        self.out,
                        "  {marker}{}. {} ({}) [{kind}]",
                        index + 1,
                        file.name,
                        file.size_kb()
                    )?;
                }
            }

            let answer = match self.read(
                "Attach a file path, 'screenshot <path>', 'remove <n>' or 'remove s<n>' (Enter to continue): ",
            )? {
                Input::Eof => return Ok(Some(Flow::Quit)),
                Input::Command(command) => return self.command(command).await.map(Some),
                Input::Unknown(line) => {
                    writeln!(self.out, "Unknown command {line:?}")?;
                    continue;
                }
                Input::Answer(answer) => answer,
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(None);
            }

            let patch = match parse_file_action(answer) {
                Some(FileAction::Attach(kind, path)) => attach(&record, kind, path),
                Some(FileAction::Remove(kind, index)) => detach(&record, kind, index),
                None => {
                    writeln!(self.out, "Type 'remove <n>' or 'remove s<n>' using a listed number.")?;
                    continue;
                }
            };
            match patch {
                Ok(patch) => self.session.update(patch).await,
                Err(err) => writeln!(self.out, "{err}")?,
            }
        }
    }

    async fn command(&mut self, command: Command) -> anyhow::Result<Flow> {
        let result = match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Back => self.session.retreat().await,
            Command::Goto(step) => self.session.jump_to(step).await,
            Command::Restart => {
                let first = self.first_step().await;
                self.session.jump_to(first).await
            }
        };
        if let Err(err) = result {
            writeln!(self.out, "{err}")?;
        }
        Ok(Flow::Continue)
    }

    async fn first_step(&self) -> Step {
        self.session
            .step_statuses()
            .await
            .first()
            .map_or(Step::ClientInfo, |status| status.step)
    }

    async fn review(&mut self, view: &StepView) -> anyhow::Result<Flow> {
        for section in &view.sections {
            writeln!(self.out, "-- {} --", section.title)?;
            for (label, value) in &section.rows {
                writeln!(self.out, "  {label}: {value}")?;
            }
        }

        loop {
            match self.read("Type 'submit' to send, 'summary' to save a copy, or a command: ")? {
                Input::Eof => return Ok(Flow::Quit),
                Input::Command(command) => return self.command(command).await,
                Input::Unknown(line) => writeln!(self.out, "Unknown command {line:?}")?,
                Input::Answer(answer) => match answer.trim() {
                    "submit" => return self.submit().await,
                    "summary" => {
                        let record = self.session.record().await;
                        match write_summary(&record, self.summary_dir) {
                            Ok(path) => writeln!(self.out, "Summary saved to {}", path.display())?,
                            Err(err) => {
                                warn!(error = %err, "failed to save summary");
                                writeln!(self.out, "{err}; your answers are kept.")?;
                            }
                        }
                    }
                    _ => writeln!(self.out, "Please type 'submit' or 'summary'.")?,
                },
            }
        }
    }

    async fn submit(&mut self) -> anyhow::Result<Flow> {
        writeln!(self.out, "Submitting...")?;
        match self.session.submit().await {
            Ok(receipt) => writeln!(self.out, "{}", receipt.message)?,
            Err(SubmitError::Rejected(err)) => {
                writeln!(self.out, "{}", err.message)?;
                if err.is_retryable() {
                    writeln!(self.out, "Your answers are kept; type 'submit' to try again.")?;
                }
            }
            Err(err) => writeln!(self.out, "{err}")?,
        }
        Ok(Flow::Continue)
    }

    async fn confirmation(&mut self, view: &StepView) -> anyhow::Result<Flow> {
        for notice in &view.notices {
            writeln!(self.out, "{notice}")?;
        }
        match self.read("Submit Another Request? [y/N]: ")? {
            Input::Answer(answer) if matches!(answer.trim(), "y" | "Y" | "yes") => {
                let first = self.first_step().await;
                if let Err(err) = self.session.jump_to(first).await {
                    writeln!(self.out, "{err}")?;
                }
                Ok(Flow::Continue)
            }
            _ => Ok(Flow::Quit),
        }
    }
}
